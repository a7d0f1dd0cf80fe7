#![cfg(feature = "persistent")]
//! Property-based tests for Array laws.
//!
//! Every operation is checked against `Vec` as a reference model, and the
//! structural invariants are verified after each step.

use fingerarray::persistent::{Array, Storage, UnboxedArray};
use proptest::prelude::*;

// =============================================================================
// Model-Based Operations
// =============================================================================

#[derive(Debug, Clone)]
enum Operation {
    Cons(i32),
    Snoc(i32),
    Tail,
    Init,
    Insert(usize, i32),
    Remove(usize),
    Slice(usize, usize),
    ConcatSelf,
    Reverse,
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        any::<i32>().prop_map(Operation::Cons),
        any::<i32>().prop_map(Operation::Snoc),
        Just(Operation::Tail),
        Just(Operation::Init),
        (any::<usize>(), any::<i32>()).prop_map(|(position, value)| Operation::Insert(position, value)),
        any::<usize>().prop_map(Operation::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(start, length)| Operation::Slice(start, length)),
        Just(Operation::ConcatSelf),
        Just(Operation::Reverse),
    ]
}

fn apply<S: Storage<i32>>(array: &Array<i32, S>, model: &mut Vec<i32>, operation: &Operation) -> Array<i32, S> {
    match *operation {
        Operation::Cons(value) => {
            model.insert(0, value);
            array.cons(value)
        }
        Operation::Snoc(value) => {
            model.push(value);
            array.snoc(value)
        }
        Operation::Tail if !model.is_empty() => {
            model.remove(0);
            array.tail().unwrap()
        }
        Operation::Init if !model.is_empty() => {
            model.pop();
            array.init().unwrap()
        }
        Operation::Tail | Operation::Init => array.clone(),
        Operation::Insert(position, value) => {
            let position = position % (model.len() + 1);
            model.insert(position, value);
            array.insert_before(position, value).unwrap()
        }
        Operation::Remove(_) if model.is_empty() => array.clone(),
        Operation::Remove(position) => {
            let position = position % model.len();
            model.remove(position);
            array.remove(position).unwrap()
        }
        Operation::Slice(start, length) => {
            let start = start % (model.len() + 1);
            let length = length % (model.len() - start + 1);
            *model = model[start..start + length].to_vec();
            array.sub_array(start, length).unwrap()
        }
        Operation::ConcatSelf if model.len() > 2_000 => array.clone(),
        Operation::ConcatSelf => {
            model.extend_from_within(..);
            array.concat(array)
        }
        Operation::Reverse => {
            model.reverse();
            array.reverse()
        }
    }
}

fn run<S: Storage<i32>>(initial: &[i32], operations: &[Operation]) -> Result<(), TestCaseError> {
    let mut model = initial.to_vec();
    let mut array: Array<i32, S> = initial.iter().copied().collect();
    for operation in operations {
        array = apply(&array, &mut model, operation);
        array.check_invariants();
        prop_assert_eq!(array.len(), model.len());
        prop_assert!(array.iter().eq(model.iter()), "after {:?}", operation);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Random operation sequences match the model (boxed leaves)
    #[test]
    fn prop_boxed_operations_match_model(
        initial in prop::collection::vec(any::<i32>(), 0..120),
        operations in prop::collection::vec(operation(), 1..40)
    ) {
        run::<fingerarray::persistent::Boxed>(&initial, &operations)?;
    }

    /// Random operation sequences match the model (unboxed leaves)
    #[test]
    fn prop_unboxed_operations_match_model(
        initial in prop::collection::vec(any::<i32>(), 0..120),
        operations in prop::collection::vec(operation(), 1..40)
    ) {
        run::<fingerarray::persistent::Unboxed>(&initial, &operations)?;
    }
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    /// Indexing returns exactly the element the model holds
    #[test]
    fn prop_get_matches_model(elements in prop::collection::vec(any::<i32>(), 0..500)) {
        let array: Array<i32> = elements.iter().copied().collect();
        for (index, element) in elements.iter().enumerate() {
            prop_assert_eq!(array.get(index), Ok(element));
        }
        prop_assert!(array.get(elements.len()).is_err());
    }

    /// Concatenation adds lengths and keeps order
    #[test]
    fn prop_concat_is_additive(
        first in prop::collection::vec(any::<i32>(), 0..200),
        second in prop::collection::vec(any::<i32>(), 0..200)
    ) {
        let left: UnboxedArray<i32> = first.iter().copied().collect();
        let right: UnboxedArray<i32> = second.iter().copied().collect();
        let joined = left.concat(&right);
        joined.check_invariants();
        prop_assert_eq!(joined.len(), first.len() + second.len());
        prop_assert!(joined.iter().eq(first.iter().chain(second.iter())));
    }

    /// Slicing at any split point and concatenating restores the array
    #[test]
    fn prop_slice_concat_roundtrip(
        elements in prop::collection::vec(any::<i32>(), 0..300),
        split in any::<usize>()
    ) {
        let array: Array<i32> = elements.iter().copied().collect();
        let split = split % (elements.len() + 1);
        let front = array.sub_array(0, split).unwrap();
        let back = array.sub_array(split, elements.len() - split).unwrap();
        front.check_invariants();
        back.check_invariants();
        prop_assert_eq!(front.concat(&back), array);
    }

    /// Reversing twice is the identity and backward iteration mirrors forward
    #[test]
    fn prop_reverse_involution(elements in prop::collection::vec(any::<i32>(), 0..300)) {
        let array: UnboxedArray<i32> = elements.iter().copied().collect();
        let reversed = array.reverse();
        reversed.check_invariants();
        prop_assert!(reversed.iter().eq(array.iter().rev()));
        prop_assert_eq!(reversed.reverse(), array);
    }

    /// Operations never change their receiver
    #[test]
    fn prop_persistence(
        elements in prop::collection::vec(any::<i32>(), 1..200),
        position in any::<usize>()
    ) {
        let array: Array<i32> = elements.iter().copied().collect();
        let position = position % elements.len();
        let _removed = array.remove(position).unwrap();
        let _inserted = array.insert_before(position, 0).unwrap();
        let _extended = array.cons(1).snoc(2);
        prop_assert!(array.iter().eq(elements.iter()));
    }
}

// =============================================================================
// Cursor Walks
// =============================================================================

fn walk<S: Storage<i32>>(
    insertions: &[usize],
    start: usize,
    moves: &[(bool, usize)],
) -> Result<(), TestCaseError> {
    let mut array: Array<i32, S> = Array::new();
    let mut model = Vec::new();
    for (value, &position) in (0_i32..).zip(insertions) {
        let position = position % (model.len() + 1);
        array = array.insert_before(position, value).unwrap();
        model.insert(position, value);
    }

    let mut position = start % (model.len() + 1);
    let mut cursor = array.iter_from(position).unwrap();
    for &(forward, steps) in moves {
        for _ in 0..steps % (model.len() + 1) {
            prop_assert_eq!(cursor.next_index(), position);
            prop_assert_eq!(cursor.previous_index(), position.checked_sub(1));
            if forward {
                prop_assert_eq!(cursor.has_next(), position < model.len());
                let expected = model.get(position);
                prop_assert_eq!(cursor.next(), expected);
                if expected.is_some() {
                    position += 1;
                }
            } else {
                prop_assert_eq!(cursor.has_previous(), position > 0);
                let expected = position.checked_sub(1).map(|index| &model[index]);
                prop_assert_eq!(cursor.previous(), expected);
                position = position.saturating_sub(1);
            }
        }
    }
    prop_assert_eq!(cursor.len(), model.len() - position);
    Ok(())
}

proptest! {
    /// Random cursor moves agree with indexing into the model (boxed leaves)
    #[test]
    fn prop_boxed_cursor_walk_matches_model(
        insertions in prop::collection::vec(any::<usize>(), 0..400),
        start in any::<usize>(),
        moves in prop::collection::vec((any::<bool>(), any::<usize>()), 0..100)
    ) {
        walk::<fingerarray::persistent::Boxed>(&insertions, start, &moves)?;
    }

    /// Random cursor moves agree with indexing into the model (unboxed leaves)
    #[test]
    fn prop_unboxed_cursor_walk_matches_model(
        insertions in prop::collection::vec(any::<usize>(), 0..400),
        start in any::<usize>(),
        moves in prop::collection::vec((any::<bool>(), any::<usize>()), 0..100)
    ) {
        walk::<fingerarray::persistent::Unboxed>(&insertions, start, &moves)?;
    }
}
