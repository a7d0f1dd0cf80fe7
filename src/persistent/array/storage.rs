//! Payload specializations for [`Array`](super::Array).
//!
//! The finger tree machinery is written once and monomorphized for two
//! element layouts:
//!
//! - [`Boxed`]: every element lives behind its own reference counter. Nodes
//!   are narrow (2..3 elements) and rebuilding a node only bumps reference
//!   counts, so elements do not need to implement `Clone`.
//! - [`Unboxed`]: `Copy` elements are stored inline in wide leaves
//!   (8..15 elements) which keeps leaves cache-dense.

use static_assertions::const_assert;

use super::super::ReferenceCounter;

mod sealed {
    pub trait Sealed {}
}

/// Describes how elements are stored inside the leaves of an array.
///
/// This trait is sealed; it is implemented by [`Boxed`] and [`Unboxed`] only.
pub trait Storage<T>: sealed::Sealed {
    /// The value stored in a leaf slot for one element.
    #[doc(hidden)]
    type Slot: Clone;

    /// Minimum number of elements in a leaf.
    const MIN_LEAF: usize;
    /// Maximum number of elements in a leaf.
    const MAX_LEAF: usize;
    /// Minimum number of elements in a facade digit.
    const MIN_DIGIT: usize;
    /// Maximum number of elements in a facade digit.
    const MAX_DIGIT: usize;
    /// Largest array stored as a single flat buffer.
    const MAX_SMALL: usize;

    #[doc(hidden)]
    fn wrap(element: T) -> Self::Slot;

    #[doc(hidden)]
    fn peek(slot: &Self::Slot) -> &T;
}

/// Elements are reference counted individually.
///
/// This is the default storage of [`Array`](super::Array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Boxed;

/// `Copy` elements are stored inline in wide leaves.
///
/// Used by [`UnboxedArray`](super::UnboxedArray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Unboxed;

impl sealed::Sealed for Boxed {}
impl sealed::Sealed for Unboxed {}

const BOXED_MIN_LEAF: usize = 2;
const BOXED_MAX_LEAF: usize = 3;
const BOXED_MIN_DIGIT: usize = 1;
const BOXED_MAX_DIGIT: usize = 4;
const BOXED_MAX_SMALL: usize = 6;

const UNBOXED_MIN_LEAF: usize = 8;
const UNBOXED_MAX_LEAF: usize = 2 * UNBOXED_MIN_LEAF - 1;
const UNBOXED_MIN_DIGIT: usize = UNBOXED_MIN_LEAF / 2;
const UNBOXED_MAX_DIGIT: usize = UNBOXED_MAX_LEAF + UNBOXED_MIN_DIGIT;
const UNBOXED_MAX_SMALL: usize = 2 * UNBOXED_MIN_DIGIT - 1;

// Splitting an overfull leaf must yield two legal leaves.
const_assert!(BOXED_MAX_LEAF == 2 * BOXED_MIN_LEAF - 1);
const_assert!(UNBOXED_MAX_LEAF == 2 * UNBOXED_MIN_LEAF - 1);
// The two facing digits of a concatenation always fill at least one leaf.
const_assert!(2 * BOXED_MIN_DIGIT >= BOXED_MIN_LEAF);
const_assert!(2 * UNBOXED_MIN_DIGIT >= UNBOXED_MIN_LEAF);
// A digit that is one short of its minimum can always absorb a whole leaf.
const_assert!(BOXED_MIN_DIGIT - 1 + BOXED_MAX_LEAF <= BOXED_MAX_DIGIT);
const_assert!(UNBOXED_MIN_DIGIT - 1 + UNBOXED_MAX_LEAF <= UNBOXED_MAX_DIGIT);
// Halving a flat buffer that just outgrew `MAX_SMALL` yields two legal digits.
const_assert!((BOXED_MAX_SMALL + 1) / 2 >= BOXED_MIN_DIGIT);
const_assert!((UNBOXED_MAX_SMALL + 1) / 2 >= UNBOXED_MIN_DIGIT);
// The builder's ring holds both digits.
const_assert!(BOXED_MAX_SMALL < 2 * BOXED_MAX_DIGIT);
const_assert!(UNBOXED_MAX_SMALL < 2 * UNBOXED_MAX_DIGIT);

impl<T> Storage<T> for Boxed {
    type Slot = ReferenceCounter<T>;

    const MIN_LEAF: usize = BOXED_MIN_LEAF;
    const MAX_LEAF: usize = BOXED_MAX_LEAF;
    const MIN_DIGIT: usize = BOXED_MIN_DIGIT;
    const MAX_DIGIT: usize = BOXED_MAX_DIGIT;
    const MAX_SMALL: usize = BOXED_MAX_SMALL;

    #[inline]
    fn wrap(element: T) -> Self::Slot {
        ReferenceCounter::new(element)
    }

    #[inline]
    fn peek(slot: &Self::Slot) -> &T {
        slot
    }
}

impl<T: Copy> Storage<T> for Unboxed {
    type Slot = T;

    const MIN_LEAF: usize = UNBOXED_MIN_LEAF;
    const MAX_LEAF: usize = UNBOXED_MAX_LEAF;
    const MIN_DIGIT: usize = UNBOXED_MIN_DIGIT;
    const MAX_DIGIT: usize = UNBOXED_MAX_DIGIT;
    const MAX_SMALL: usize = UNBOXED_MAX_SMALL;

    #[inline]
    fn wrap(element: T) -> Self::Slot {
        element
    }

    #[inline]
    fn peek(slot: &Self::Slot) -> &T {
        slot
    }
}

/// Shared, immutable run of slots. Used for leaves and facade digits.
pub(crate) type Chunk<T, S> = ReferenceCounter<[<S as Storage<T>>::Slot]>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_unboxed_constants() {
        assert_eq!(<Unboxed as Storage<i32>>::MIN_LEAF, 8);
        assert_eq!(<Unboxed as Storage<i32>>::MAX_LEAF, 15);
        assert_eq!(<Unboxed as Storage<i32>>::MIN_DIGIT, 4);
        assert_eq!(<Unboxed as Storage<i32>>::MAX_DIGIT, 19);
        assert_eq!(<Unboxed as Storage<i32>>::MAX_SMALL, 7);
    }

    #[rstest]
    fn test_boxed_wrap_and_peek() {
        let slot = <Boxed as Storage<String>>::wrap("finger".to_string());
        assert_eq!(<Boxed as Storage<String>>::peek(&slot), "finger");
    }

    #[rstest]
    fn test_unboxed_wrap_is_identity() {
        let slot = <Unboxed as Storage<u8>>::wrap(7);
        assert_eq!(slot, 7);
    }
}
