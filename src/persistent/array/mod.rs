//! Persistent (immutable) random-access array.
//!
//! This module provides [`Array`], a sequence based on a 2-3 finger tree with
//! cached sizes, as described in Hinze & Paterson's "Finger Trees: A Simple
//! General-purpose Data Structure" (2006). Elements live in leaves of several
//! elements each, so the tree stays shallow and iteration works on whole
//! leaves.
//!
//! # Overview
//!
//! | Operation | Complexity |
//! |---|---|
//! | `len`, `is_empty`, `head`, `last` | O(1) |
//! | `cons`, `snoc`, `tail`, `init` | amortized O(1) |
//! | `get`, `insert_before`, `remove` | O(log n) |
//! | `sub_array` | O(log n) |
//! | `concat` | O(log min(n, m)) |
//! | `reverse` | O(n) |
//! | building from an iterator | amortized O(1) per element |
//!
//! All operations return new arrays without modifying the original, and
//! untouched subtrees are shared between versions.
//!
//! # Layout
//!
//! An array is either empty, a single flat buffer of at most `MAX_SMALL`
//! elements, or deep: two digits of raw elements around a finger tree of
//! leaves. The [`Storage`] parameter selects how elements are stored:
//! [`Boxed`] (the default) keeps every element behind its own reference
//! counter, [`Unboxed`] stores `Copy` elements inline in wide leaves.
//!
//! # Examples
//!
//! ```rust
//! use fingerarray::persistent::{Array, UnboxedArray};
//!
//! let array: Array<i32> = (0..10).collect();
//! let changed = array.remove(0).unwrap().snoc(10);
//!
//! assert_eq!(array.head(), Ok(&0));   // Original unchanged
//! assert_eq!(changed.head(), Ok(&1)); // New version
//! assert_eq!(changed.last(), Ok(&10));
//!
//! let numbers: UnboxedArray<u64> = (1..=100).collect();
//! let middle = numbers.sub_array(10, 5).unwrap();
//! assert_eq!(middle.iter().sum::<u64>(), 11 + 12 + 13 + 14 + 15);
//! ```

mod builder;
mod error;
mod finger_tree;
mod iter;
mod node;
mod storage;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::Index;

pub use builder::ArrayBuilder;
pub use error::ArrayError;
pub use iter::{ArrayCursor, ArrayIntoIterator, ArrayIterator};
pub use storage::{Boxed, Storage, Unboxed};

use super::ReferenceCounter;
use finger_tree::{FingerTree, TreeSlice};
use node::Node;
use storage::Chunk;

/// An [`Array`] storing `Copy` elements inline.
pub type UnboxedArray<T> = Array<T, Unboxed>;

// =============================================================================
// Array Definition
// =============================================================================

/// A persistent random-access sequence.
///
/// # Examples
///
/// ```rust
/// use fingerarray::persistent::Array;
///
/// let array: Array<&str> = Array::new().snoc("b").cons("a").snoc("c");
/// assert_eq!(array.to_string(), "Array[a, b, c]");
///
/// let inserted = array.insert_before(1, "x").unwrap();
/// assert_eq!(inserted.to_string(), "Array[a, x, b, c]");
/// assert_eq!(array.len(), 3);
/// ```
pub struct Array<T, S: Storage<T> = Boxed> {
    repr: Repr<T, S>,
}

enum Repr<T, S: Storage<T>> {
    Empty,
    Small(Chunk<T, S>),
    Deep(ReferenceCounter<DeepArray<T, S>>),
}

/// Element digits around a tree of leaves.
struct DeepArray<T, S: Storage<T>> {
    size: usize,
    left: Chunk<T, S>,
    middle: FingerTree<T, S>,
    right: Chunk<T, S>,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(Array<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(UnboxedArray<i32>: Send, Sync);
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(Array<i32>: Send, Sync);

impl<T, S: Storage<T>> Clone for Array<T, S> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Empty => Repr::Empty,
            Repr::Small(slots) => Repr::Small(slots.clone()),
            Repr::Deep(deep) => Repr::Deep(deep.clone()),
        };
        Self { repr }
    }
}

// =============================================================================
// Construction
// =============================================================================

impl<T, S: Storage<T>> Array<T, S> {
    /// Creates an empty array.
    #[must_use]
    pub const fn new() -> Self {
        Self { repr: Repr::Empty }
    }

    /// Creates an array holding a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::small(vec![S::wrap(element)])
    }

    /// Creates an array from a slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fingerarray::persistent::Array;
    ///
    /// let array: Array<i32> = Array::from_slice(&[1, 2, 3]);
    /// assert_eq!(array.len(), 3);
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self
    where
        T: Clone,
    {
        slice.iter().cloned().collect()
    }

    /// Returns a builder for incremental construction.
    #[must_use]
    pub fn builder() -> ArrayBuilder<T, S> {
        ArrayBuilder::new()
    }

    fn small(slots: Vec<S::Slot>) -> Self {
        if slots.is_empty() {
            Self::new()
        } else {
            Self {
                repr: Repr::Small(slots.into()),
            }
        }
    }

    fn deep(left: Chunk<T, S>, middle: FingerTree<T, S>, right: Chunk<T, S>) -> Self {
        let size = left.len() + middle.size() + right.len();
        Self {
            repr: Repr::Deep(ReferenceCounter::new(DeepArray {
                size,
                left,
                middle,
                right,
            })),
        }
    }

    /// Builds an array from a flat run of slots.
    pub(crate) fn from_flat(mut slots: Vec<S::Slot>) -> Self {
        let length = slots.len();
        if length <= S::MAX_SMALL {
            Self::small(slots)
        } else if length <= 2 * S::MAX_DIGIT {
            let right = slots.split_off(length / 2);
            Self::deep(slots.into(), FingerTree::Empty, right.into())
        } else {
            Self::from_parts(slots, FingerTree::Empty, Vec::new())
        }
    }

    /// Builds an array from digits of any length around a tree of leaves.
    ///
    /// Long digits are cut into leaves that move into the tree, short ones
    /// take a leaf from the tree. Without a tree, short digits are merged.
    pub(crate) fn from_parts(
        mut left: Vec<S::Slot>,
        mut middle: FingerTree<T, S>,
        mut right: Vec<S::Slot>,
    ) -> Self {
        while left.len() > S::MAX_DIGIT {
            let leaf = left.split_off(left.len() - leaf_cut::<T, S>(left.len()));
            middle = middle.cons(Node::leaf(leaf));
        }
        while right.len() > S::MAX_DIGIT {
            let rest = right.split_off(leaf_cut::<T, S>(right.len()));
            middle = middle.snoc(Node::leaf(mem::replace(&mut right, rest)));
        }
        if left.len() < S::MIN_DIGIT && !middle.is_empty() {
            left.extend_from_slice(middle.head().slots());
            middle = middle.tail();
        }
        if right.len() < S::MIN_DIGIT && !middle.is_empty() {
            let mut digit = middle.last().slots().to_vec();
            digit.append(&mut right);
            right = digit;
            middle = middle.init();
        }
        if middle.is_empty()
            && (left.len() < S::MIN_DIGIT
                || right.len() < S::MIN_DIGIT
                || left.len() + right.len() <= S::MAX_SMALL)
        {
            left.append(&mut right);
            return Self::from_flat(left);
        }
        Self::deep(left.into(), middle, right.into())
    }
}

/// Size of the next leaf cut from a digit of `length` slots.
fn leaf_cut<T, S: Storage<T>>(length: usize) -> usize {
    length.div_ceil(2).clamp(S::MIN_LEAF, S::MAX_LEAF)
}

/// Splits `slots` into the fewest leaves, with sizes differing by at most one.
fn balanced_leaves<T, S: Storage<T>>(slots: &[S::Slot]) -> Vec<Node<T, S>> {
    let count = slots.len().div_ceil(S::MAX_LEAF);
    let base = slots.len() / count;
    let extra = slots.len() % count;
    let mut leaves = Vec::with_capacity(count);
    let mut start = 0;
    for index in 0..count {
        let size = base + usize::from(index < extra);
        leaves.push(Node::leaf(slots[start..start + size].to_vec()));
        start += size;
    }
    leaves
}

fn joined<Slot: Clone>(first: &[Slot], second: &[Slot]) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(first.len() + second.len());
    slots.extend_from_slice(first);
    slots.extend_from_slice(second);
    slots
}

// =============================================================================
// Element Operations
// =============================================================================

impl<T, S: Storage<T>> Array<T, S> {
    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Small(slots) => slots.len(),
            Repr::Deep(deep) => deep.size,
        }
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::IndexOutOfBounds`] if `index >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n), O(1) near both ends
    pub fn get(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len();
        if index >= len {
            return Err(ArrayError::IndexOutOfBounds { index, len });
        }
        Ok(match &self.repr {
            Repr::Empty => unreachable!("index checked against an empty array"),
            Repr::Small(slots) => S::peek(&slots[index]),
            Repr::Deep(deep) => deep.get(index),
        })
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::EmptyArray`] if the array is empty.
    pub fn head(&self) -> Result<&T, ArrayError> {
        self.get(0)
            .map_err(|_| ArrayError::EmptyArray { operation: "head" })
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::EmptyArray`] if the array is empty.
    pub fn last(&self) -> Result<&T, ArrayError> {
        let len = self.len();
        if len == 0 {
            return Err(ArrayError::EmptyArray { operation: "last" });
        }
        self.get(len - 1)
    }

    /// Returns a new array with `element` in front.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    #[must_use]
    pub fn cons(&self, element: T) -> Self {
        let slot = S::wrap(element);
        match &self.repr {
            Repr::Empty => Self::small(vec![slot]),
            Repr::Small(slots) => Self::from_flat(joined(&[slot], slots)),
            Repr::Deep(deep) => deep.cons(slot),
        }
    }

    /// Returns a new array with `element` at the back.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    #[must_use]
    pub fn snoc(&self, element: T) -> Self {
        let slot = S::wrap(element);
        match &self.repr {
            Repr::Empty => Self::small(vec![slot]),
            Repr::Small(slots) => Self::from_flat(joined(slots, &[slot])),
            Repr::Deep(deep) => deep.snoc(slot),
        }
    }

    /// Returns the array without its first element.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::EmptyArray`] if the array is empty.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn tail(&self) -> Result<Self, ArrayError> {
        match &self.repr {
            Repr::Empty => Err(ArrayError::EmptyArray { operation: "tail" }),
            Repr::Small(slots) => Ok(Self::small(slots[1..].to_vec())),
            Repr::Deep(deep) => {
                let left = deep.left[1..].to_vec();
                if left.len() >= S::MIN_DIGIT {
                    Ok(Self::deep(left.into(), deep.middle.clone(), deep.right.clone()))
                } else {
                    Ok(deep.refill_left(left))
                }
            }
        }
    }

    /// Returns the array without its last element.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::EmptyArray`] if the array is empty.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn init(&self) -> Result<Self, ArrayError> {
        match &self.repr {
            Repr::Empty => Err(ArrayError::EmptyArray { operation: "init" }),
            Repr::Small(slots) => Ok(Self::small(slots[..slots.len() - 1].to_vec())),
            Repr::Deep(deep) => {
                let right = deep.right[..deep.right.len() - 1].to_vec();
                if right.len() >= S::MIN_DIGIT {
                    Ok(Self::deep(deep.left.clone(), deep.middle.clone(), right.into()))
                } else {
                    Ok(deep.refill_right(right))
                }
            }
        }
    }

    /// Returns a new array with `element` inserted before `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::PositionOutOfBounds`] if `position > len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_before(&self, position: usize, element: T) -> Result<Self, ArrayError> {
        let len = self.len();
        if position > len {
            return Err(ArrayError::PositionOutOfBounds { position, len });
        }
        let slot = S::wrap(element);
        Ok(match &self.repr {
            Repr::Empty => Self::small(vec![slot]),
            Repr::Small(slots) => {
                let mut slots = slots.to_vec();
                slots.insert(position, slot);
                Self::from_flat(slots)
            }
            Repr::Deep(deep) => deep.insert(position, slot),
        })
    }

    /// Returns a new array without the element at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::IndexOutOfBounds`] if `position >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&self, position: usize) -> Result<Self, ArrayError> {
        let len = self.len();
        if position >= len {
            return Err(ArrayError::IndexOutOfBounds {
                index: position,
                len,
            });
        }
        Ok(match &self.repr {
            Repr::Empty => unreachable!("position checked against an empty array"),
            Repr::Small(slots) => {
                let mut slots = slots.to_vec();
                slots.remove(position);
                Self::small(slots)
            }
            Repr::Deep(deep) => deep.remove(position),
        })
    }
}

// =============================================================================
// Structural Operations
// =============================================================================

impl<T, S: Storage<T>> Array<T, S> {
    /// Concatenates two arrays.
    ///
    /// If either operand is empty, the other one is returned unchanged.
    ///
    /// # Complexity
    ///
    /// O(log min(n, m))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fingerarray::persistent::Array;
    ///
    /// let first: Array<i32> = Array::from_slice(&[1, 2, 3]);
    /// let second: Array<i32> = Array::from_slice(&[4, 5, 6]);
    /// let joined = first.concat(&second);
    /// assert!(joined.iter().copied().eq(1..=6));
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::Empty, _) => other.clone(),
            (_, Repr::Empty) => self.clone(),
            (Repr::Small(first), Repr::Small(second)) => Self::from_flat(joined(first, second)),
            (Repr::Small(first), Repr::Deep(second)) => Self::from_parts(
                joined(first, &second.left),
                second.middle.clone(),
                second.right.to_vec(),
            ),
            (Repr::Deep(first), Repr::Small(second)) => Self::from_parts(
                first.left.to_vec(),
                first.middle.clone(),
                joined(&first.right, second),
            ),
            (Repr::Deep(first), Repr::Deep(second)) => {
                let leaves = balanced_leaves::<T, S>(&joined(&first.right, &second.left));
                Self::deep(
                    first.left.clone(),
                    first.middle.concat(leaves, &second.middle),
                    second.right.clone(),
                )
            }
        }
    }

    /// Returns the `length` elements starting at `position`.
    ///
    /// An empty range yields the empty array; the full range yields `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::RangeOutOfBounds`] if the range exceeds the array.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn sub_array(&self, position: usize, length: usize) -> Result<Self, ArrayError> {
        let len = self.len();
        if position.checked_add(length).is_none_or(|end| end > len) {
            return Err(ArrayError::RangeOutOfBounds {
                position,
                length,
                len,
            });
        }
        if length == 0 {
            return Ok(Self::new());
        }
        if length == len {
            return Ok(self.clone());
        }
        Ok(match &self.repr {
            Repr::Empty => unreachable!("range checked against an empty array"),
            Repr::Small(slots) => Self::small(slots[position..position + length].to_vec()),
            Repr::Deep(deep) => deep.slice(position, position + length),
        })
    }

    /// Returns an array with the elements in reverse order.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn reverse(&self) -> Self {
        match &self.repr {
            Repr::Empty => Self::new(),
            Repr::Small(slots) => Self::small(reversed(slots)),
            Repr::Deep(deep) => Self::deep(
                reversed(&deep.right).into(),
                deep.middle.reverse(),
                reversed(&deep.left).into(),
            ),
        }
    }
}

fn reversed<Slot: Clone>(slots: &[Slot]) -> Vec<Slot> {
    slots.iter().rev().cloned().collect()
}

// =============================================================================
// Iteration and Inspection
// =============================================================================

impl<T, S: Storage<T>> Array<T, S> {
    /// Returns an iterator over the elements.
    pub fn iter(&self) -> ArrayIterator<'_, T, S> {
        ArrayIterator::new(self)
    }

    /// Returns a cursor placed before the element at `start`.
    ///
    /// Iterating the cursor yields the elements `start..len`, and
    /// [`ArrayCursor::previous`] walks back through `0..start`. A cursor at
    /// `start == len` has no next element but can still move backwards.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::IndexOutOfBounds`] if `start > len`.
    pub fn iter_from(&self, start: usize) -> Result<ArrayCursor<'_, T, S>, ArrayError> {
        let len = self.len();
        if start > len {
            return Err(ArrayError::IndexOutOfBounds { index: start, len });
        }
        Ok(ArrayCursor::new(self, start))
    }

    /// Returns the run of slots containing `index` and the offset of
    /// `index` within it.
    pub(crate) fn chunk_at(&self, index: usize) -> (&[S::Slot], usize) {
        match &self.repr {
            Repr::Empty => unreachable!("lookup in an empty array"),
            Repr::Small(slots) => (&slots[..], index),
            Repr::Deep(deep) => deep.chunk_at(index),
        }
    }

    /// Returns `true` if both arrays share the same root.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Empty, Repr::Empty) => true,
            (Repr::Small(first), Repr::Small(second)) => ReferenceCounter::ptr_eq(first, second),
            (Repr::Deep(first), Repr::Deep(second)) => ReferenceCounter::ptr_eq(first, second),
            _ => false,
        }
    }

    /// Checks all structural invariants.
    ///
    /// # Panics
    ///
    /// Panics if a digit, node or cached size is malformed.
    pub fn check_invariants(&self) {
        match &self.repr {
            Repr::Empty => {}
            Repr::Small(slots) => assert!(
                (1..=S::MAX_SMALL).contains(&slots.len()),
                "small array holds {} elements",
                slots.len()
            ),
            Repr::Deep(deep) => {
                for (side, digit) in [("left", &deep.left), ("right", &deep.right)] {
                    assert!(
                        (S::MIN_DIGIT..=S::MAX_DIGIT).contains(&digit.len()),
                        "{side} digit holds {} elements",
                        digit.len()
                    );
                }
                let middle = deep.middle.check_invariants(0);
                assert_eq!(
                    deep.size,
                    deep.left.len() + middle + deep.right.len(),
                    "cached array size is stale"
                );
            }
        }
    }

    /// Returns the number of elements stored at each depth.
    ///
    /// Index 0 counts the outer digits (or the flat buffer), index `d + 1`
    /// the elements below the digits of tree level `d`.
    #[must_use]
    pub fn level_sizes(&self) -> Vec<usize> {
        match &self.repr {
            Repr::Empty => Vec::new(),
            Repr::Small(slots) => vec![slots.len()],
            Repr::Deep(deep) => {
                let mut levels = vec![deep.left.len() + deep.right.len()];
                deep.middle.level_sizes(&mut levels);
                levels
            }
        }
    }
}

// =============================================================================
// DeepArray
// =============================================================================

impl<T, S: Storage<T>> DeepArray<T, S> {
    fn get(&self, index: usize) -> &T {
        if index < self.left.len() {
            return S::peek(&self.left[index]);
        }
        let index = index - self.left.len();
        let middle = self.middle.size();
        if index < middle {
            self.middle.get(index)
        } else {
            S::peek(&self.right[index - middle])
        }
    }

    fn chunk_at(&self, index: usize) -> (&[S::Slot], usize) {
        if index < self.left.len() {
            return (&self.left[..], index);
        }
        let index = index - self.left.len();
        let middle = self.middle.size();
        if index < middle {
            self.middle.chunk_at(index)
        } else {
            (&self.right[..], index - middle)
        }
    }

    fn cons(&self, slot: S::Slot) -> Array<T, S> {
        if self.left.len() < S::MAX_DIGIT {
            return Array::deep(
                joined(&[slot], &self.left).into(),
                self.middle.clone(),
                self.right.clone(),
            );
        }
        let half = S::MAX_DIGIT / 2;
        let leaf = Node::leaf(self.left[half..].to_vec());
        Array::deep(
            joined(&[slot], &self.left[..half]).into(),
            self.middle.cons(leaf),
            self.right.clone(),
        )
    }

    fn snoc(&self, slot: S::Slot) -> Array<T, S> {
        if self.right.len() < S::MAX_DIGIT {
            return Array::deep(
                self.left.clone(),
                self.middle.clone(),
                joined(&self.right, &[slot]).into(),
            );
        }
        let half = S::MAX_DIGIT.div_ceil(2);
        let leaf = Node::leaf(self.right[..half].to_vec());
        Array::deep(
            self.left.clone(),
            self.middle.snoc(leaf),
            joined(&self.right[half..], &[slot]).into(),
        )
    }

    /// Rebuilds the array after the left digit fell below its minimum.
    fn refill_left(&self, mut left: Vec<S::Slot>) -> Array<T, S> {
        if self.middle.is_empty() {
            left.extend_from_slice(&self.right);
            return Array::from_flat(left);
        }
        let slots = self.middle.head().slots();
        if slots.len() > S::MIN_LEAF {
            let moved = (slots.len() - S::MIN_LEAF + 1) / 2;
            left.extend_from_slice(&slots[..moved]);
            let middle = self.middle.replace_head(Node::leaf(slots[moved..].to_vec()));
            return Array::deep(left.into(), middle, self.right.clone());
        }
        left.extend_from_slice(slots);
        Array::deep(left.into(), self.middle.tail(), self.right.clone())
    }

    /// Rebuilds the array after the right digit fell below its minimum.
    fn refill_right(&self, right: Vec<S::Slot>) -> Array<T, S> {
        if self.middle.is_empty() {
            return Array::from_flat(joined(&self.left, &right));
        }
        let slots = self.middle.last().slots();
        if slots.len() > S::MIN_LEAF {
            let keep = slots.len() - (slots.len() - S::MIN_LEAF + 1) / 2;
            let middle = self.middle.replace_last(Node::leaf(slots[..keep].to_vec()));
            return Array::deep(
                self.left.clone(),
                middle,
                joined(&slots[keep..], &right).into(),
            );
        }
        Array::deep(
            self.left.clone(),
            self.middle.init(),
            joined(slots, &right).into(),
        )
    }

    fn insert(&self, position: usize, slot: S::Slot) -> Array<T, S> {
        let left_len = self.left.len();
        if position <= left_len {
            let mut left = self.left.to_vec();
            left.insert(position, slot);
            if left.len() <= S::MAX_DIGIT {
                return Array::deep(left.into(), self.middle.clone(), self.right.clone());
            }
            let leaf = left.split_off(left.len() / 2);
            return Array::deep(
                left.into(),
                self.middle.cons(Node::leaf(leaf)),
                self.right.clone(),
            );
        }
        let offset = position - left_len;
        let middle_size = self.middle.size();
        if offset < middle_size {
            return Array::deep(
                self.left.clone(),
                self.middle.insert(offset, slot),
                self.right.clone(),
            );
        }
        let mut right = self.right.to_vec();
        right.insert(offset - middle_size, slot);
        if right.len() <= S::MAX_DIGIT {
            return Array::deep(self.left.clone(), self.middle.clone(), right.into());
        }
        let rest = right.split_off(right.len() / 2);
        Array::deep(
            self.left.clone(),
            self.middle.snoc(Node::leaf(right)),
            rest.into(),
        )
    }

    fn remove(&self, position: usize) -> Array<T, S> {
        let left_len = self.left.len();
        if position < left_len {
            let mut left = self.left.to_vec();
            left.remove(position);
            if left.len() >= S::MIN_DIGIT {
                return Array::deep(left.into(), self.middle.clone(), self.right.clone());
            }
            return self.refill_left(left);
        }
        let offset = position - left_len;
        let middle_size = self.middle.size();
        if offset < middle_size {
            return match self.middle.remove(offset) {
                TreeSlice::Tree(middle) => Array::deep(self.left.clone(), middle, self.right.clone()),
                TreeSlice::Partial(partial) => {
                    let mut slots = joined(&self.left, partial.slots());
                    slots.extend_from_slice(&self.right);
                    Array::from_flat(slots)
                }
            };
        }
        let mut right = self.right.to_vec();
        right.remove(offset - middle_size);
        if right.len() >= S::MIN_DIGIT {
            return Array::deep(self.left.clone(), self.middle.clone(), right.into());
        }
        self.refill_right(right)
    }

    /// Slices the elements in `from..to`, which is neither empty nor the
    /// whole array.
    fn slice(&self, from: usize, to: usize) -> Array<T, S> {
        let left_len = self.left.len();
        let right_start = left_len + self.middle.size();
        let mut left = self.left[from.min(left_len)..to.min(left_len)].to_vec();
        let right =
            self.right[from.max(right_start) - right_start..to.max(right_start) - right_start].to_vec();
        let middle_from = from.clamp(left_len, right_start);
        let middle_to = to.clamp(left_len, right_start);
        let mut middle = FingerTree::Empty;
        if middle_from < middle_to {
            match self
                .middle
                .slice(middle_from - left_len, middle_to - middle_from)
            {
                TreeSlice::Tree(tree) => middle = tree,
                TreeSlice::Partial(partial) => left.extend_from_slice(partial.slots()),
            }
        }
        Array::from_parts(left, middle, right)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Storage<T>> Default for Array<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, S: Storage<T>> PartialEq for Array<T, S> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.ptr_eq(other) || self.iter().eq(other.iter())
    }
}

impl<T: Eq, S: Storage<T>> Eq for Array<T, S> {}

impl<T: Hash, S: Storage<T>> Hash for Array<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug, S: Storage<T>> fmt::Debug for Array<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S: Storage<T>> fmt::Display for Array<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Array[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

impl<T, S: Storage<T>> Index<usize> for Array<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T, S: Storage<T>> FromIterator<T> for Array<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = ArrayBuilder::new();
        builder.extend(iter);
        builder.freeze()
    }
}

impl<T, S: Storage<T>> From<Vec<T>> for Array<T, S> {
    fn from(vector: Vec<T>) -> Self {
        vector.into_iter().collect()
    }
}

impl<T, S: Storage<T>, const N: usize> From<[T; N]> for Array<T, S> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<'a, T, S: Storage<T>> IntoIterator for &'a Array<T, S> {
    type Item = &'a T;
    type IntoIter = ArrayIterator<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone, S: Storage<T>> IntoIterator for Array<T, S> {
    type Item = T;
    type IntoIter = ArrayIntoIterator<T, S>;

    fn into_iter(self) -> Self::IntoIter {
        ArrayIntoIterator::new(self)
    }
}
