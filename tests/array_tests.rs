//! Integration tests for Array.
//!
//! Every scenario runs against both leaf layouts.

#![cfg(feature = "persistent")]

use fingerarray::persistent::{Array, ArrayBuilder, ArrayError, Boxed, Unboxed};
use rstest::rstest;

macro_rules! storage_tests {
    ($module:ident, $storage:ty) => {
        mod $module {
            use super::*;

            type TestArray = Array<i32, $storage>;

            fn range(values: std::ops::Range<i32>) -> TestArray {
                values.collect()
            }

            fn assert_elements(array: &TestArray, expected: &[i32]) {
                array.check_invariants();
                assert_eq!(array.len(), expected.len());
                assert!(array.iter().eq(expected.iter()));
            }

            // =================================================================
            // Scenarios
            // =================================================================

            #[rstest]
            fn test_snoc_onto_empty() {
                let array = TestArray::new().snoc(5);
                assert_eq!(array.len(), 1);
                assert_eq!(array.get(0), Ok(&5));
            }

            #[rstest]
            fn test_removing_the_left_digit() {
                let mut array = range(0..9);
                for _ in 0..4 {
                    array = array.remove(0).unwrap();
                }
                assert_eq!(array, TestArray::from([4, 5, 6, 7, 8]));
            }

            #[rstest]
            fn test_decreasing_removals_in_the_left_half() {
                let mut array = range(0..25);
                let mut model: Vec<i32> = (0..25).collect();
                for position in [9, 6, 5, 4, 3, 3] {
                    array = array.remove(position).unwrap();
                    model.remove(position);
                    assert_elements(&array, &model);
                }
                let mut expected = vec![0, 1, 2, 8];
                expected.extend(10..25);
                assert_elements(&array, &expected);
            }

            #[rstest]
            fn test_removing_the_right_digit() {
                let mut array = range(0..9);
                for position in (5..9).rev() {
                    array = array.remove(position).unwrap();
                }
                assert_eq!(array, TestArray::from([0, 1, 2, 3, 4]));
            }

            #[rstest]
            fn test_removals_collapsing_the_middle() {
                let mut array = range(0..27);
                for position in (6..=8).rev() {
                    array = array.remove(position).unwrap();
                }
                for position in (9..=15).rev() {
                    array = array.remove(position - 3).unwrap();
                }
                let expected: Vec<i32> = (0..6).chain(16..27).collect();
                assert_elements(&array, &expected);
            }

            #[rstest]
            fn test_concat_small_arrays() {
                let first = TestArray::from([1, 2, 3]);
                let second = TestArray::from([4, 5, 6]);
                assert_eq!(first.concat(&second), TestArray::from([1, 2, 3, 4, 5, 6]));
            }

            #[rstest]
            #[case(0)]
            #[case(1)]
            #[case(7)]
            #[case(8)]
            #[case(20)]
            #[case(64)]
            fn test_insert_before_every_position(#[case] count: i32) {
                let array = range(0..count);
                for position in 0..=count as usize {
                    let inserted = array.insert_before(position, count).unwrap();
                    let mut model: Vec<i32> = (0..count).collect();
                    model.insert(position, count);
                    assert_elements(&inserted, &model);
                    assert_eq!(inserted.get(position), Ok(&count));
                }
                assert_eq!(array.len(), count as usize);
            }

            // =================================================================
            // Ends
            // =================================================================

            #[rstest]
            fn test_head_and_last() {
                let array = range(0..100);
                assert_eq!(array.head(), Ok(&0));
                assert_eq!(array.last(), Ok(&99));
                assert_eq!(array.tail().unwrap().head(), Ok(&1));
                assert_eq!(array.init().unwrap().last(), Ok(&98));
            }

            #[rstest]
            fn test_cons_and_snoc_keep_original() {
                let array = range(0..50);
                let both = array.cons(-1).snoc(50);
                assert_eq!(array.len(), 50);
                assert_elements(&both, &(-1..51).collect::<Vec<_>>());
            }

            #[rstest]
            fn test_singleton_tail_is_empty() {
                let array = TestArray::singleton(42);
                assert!(array.tail().unwrap().is_empty());
                assert!(array.init().unwrap().is_empty());
                assert!(array.remove(0).unwrap().is_empty());
            }

            // =================================================================
            // Slicing and Reversal
            // =================================================================

            #[rstest]
            fn test_sub_array_then_concat_restores() {
                let array = range(0..200);
                for split in [0, 1, 5, 19, 100, 199, 200] {
                    let front = array.sub_array(0, split).unwrap();
                    let back = array.sub_array(split, 200 - split).unwrap();
                    assert_eq!(front.concat(&back), array);
                }
            }

            #[rstest]
            fn test_reverse_and_backward_iteration() {
                let array = range(0..77);
                let reversed = array.reverse();
                assert!(reversed.iter().eq(array.iter().rev()));
                assert_eq!(reversed.reverse(), array);
            }

            #[rstest]
            fn test_iter_from_walks_both_ways() {
                let array = range(0..40);
                let mut cursor = array.iter_from(20).unwrap();
                assert_eq!(cursor.previous(), Some(&19));
                assert_eq!(cursor.next(), Some(&19));
                assert_eq!(cursor.next(), Some(&20));
                assert_eq!(cursor.next_index(), 21);
                assert_eq!(cursor.previous_index(), Some(20));
                assert_eq!(cursor.len(), 19);

                let mut at_end = array.iter_from(40).unwrap();
                assert!(!at_end.has_next());
                assert_eq!(at_end.next(), None);
                assert_eq!(at_end.previous(), Some(&39));
                assert_eq!(at_end.next_index(), 39);

                let mut at_start = array.iter_from(0).unwrap();
                assert!(!at_start.has_previous());
                assert_eq!(at_start.previous(), None);
                assert_eq!(at_start.previous_index(), None);
                assert_eq!(at_start.next(), Some(&0));
            }

            // =================================================================
            // Errors
            // =================================================================

            #[rstest]
            fn test_empty_array_errors() {
                let empty = TestArray::new();
                assert_eq!(empty.head(), Err(ArrayError::EmptyArray { operation: "head" }));
                assert_eq!(empty.last(), Err(ArrayError::EmptyArray { operation: "last" }));
                assert_eq!(
                    empty.tail().map(|array| array.len()),
                    Err(ArrayError::EmptyArray { operation: "tail" })
                );
                assert_eq!(
                    empty.init().map(|array| array.len()),
                    Err(ArrayError::EmptyArray { operation: "init" })
                );
            }

            #[rstest]
            fn test_out_of_range_errors() {
                let array = range(0..10);
                assert_eq!(
                    array.get(10),
                    Err(ArrayError::IndexOutOfBounds { index: 10, len: 10 })
                );
                assert_eq!(
                    array.remove(10).map(|array| array.len()),
                    Err(ArrayError::IndexOutOfBounds { index: 10, len: 10 })
                );
                assert_eq!(
                    array.insert_before(11, 0).map(|array| array.len()),
                    Err(ArrayError::PositionOutOfBounds { position: 11, len: 10 })
                );
                assert_eq!(
                    array.sub_array(8, 3).map(|array| array.len()),
                    Err(ArrayError::RangeOutOfBounds { position: 8, length: 3, len: 10 })
                );
                assert!(array.iter_from(11).is_err());
            }

            // =================================================================
            // Builder
            // =================================================================

            #[rstest]
            fn test_builder_from_both_ends() {
                let mut builder: ArrayBuilder<i32, $storage> = TestArray::builder();
                for value in 0..100 {
                    builder.append(value);
                    builder.prepend(-value - 1);
                }
                let array = builder.freeze();
                assert_elements(&array, &(-100..100).collect::<Vec<_>>());
            }
        }
    };
}

storage_tests!(boxed, Boxed);
storage_tests!(unboxed, Unboxed);

// =============================================================================
// Formatting and Standard Traits
// =============================================================================

#[rstest]
fn test_display_and_debug() {
    let array: Array<i32> = Array::from_slice(&[1, 2]);
    assert_eq!(array.to_string(), "Array[1, 2]");
    assert_eq!(format!("{array:?}"), "[1, 2]");
    assert_eq!(Array::<i32>::new().to_string(), "Array[]");
}

#[rstest]
fn test_error_messages() {
    let array: Array<i32> = Array::from_slice(&[1, 2, 3]);
    assert_eq!(
        array.get(7).unwrap_err().to_string(),
        "index out of bounds: 7 >= 3"
    );
    assert_eq!(
        Array::<i32>::new().head().unwrap_err().to_string(),
        "head called on an empty array"
    );
}

#[rstest]
fn test_equal_arrays_hash_equally() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(array: &Array<i32>) -> u64 {
        let mut hasher = DefaultHasher::new();
        array.hash(&mut hasher);
        hasher.finish()
    }

    let built: Array<i32> = (0..30).collect();
    let consed = (0..30).rev().fold(Array::new(), |array, value| array.cons(value));
    assert_eq!(built, consed);
    assert_eq!(hash_of(&built), hash_of(&consed));
}

#[rstest]
fn test_boxed_array_holds_non_clone_elements() {
    struct Token(u32);

    let array: Array<Token> = (0..20).map(Token).collect();
    let shorter = array.remove(3).unwrap();
    assert_eq!(shorter.get(3).map(|token| token.0), Ok(4));
    assert_eq!(array.get(3).map(|token| token.0), Ok(3));
}

#[rstest]
fn test_owned_iteration_clones_elements() {
    let array: Array<String> = ["x", "y", "z"].into_iter().map(String::from).collect();
    let joined: String = array.clone().into_iter().collect();
    assert_eq!(joined, "xyz");
    assert_eq!(array.len(), 3);
}

#[rstest]
fn test_structural_sharing() {
    let array: Array<i32> = (0..1_000).collect();
    let same = array.clone();
    assert!(array.ptr_eq(&same));
    assert!(!array.ptr_eq(&array.snoc(1_000)));
    assert!(array.concat(&Array::new()).ptr_eq(&array));
    assert!(array.sub_array(0, 1_000).unwrap().ptr_eq(&array));
}

#[rstest]
#[should_panic(expected = "index out of bounds: 5 >= 2")]
fn test_index_out_of_range_panics() {
    let array: Array<i32> = Array::from_slice(&[1, 2]);
    let _element = array[5];
}
