//! Persistent (immutable) data structures.
//!
//! This module provides [`Array`], a random-access sequence based on a 2-3
//! finger tree, together with its [`ArrayBuilder`].
//!
//! # Structural Sharing
//!
//! Every operation returns a new array and leaves the receiver untouched.
//! Unchanged digits and subtrees are shared between the old and the new
//! version, so a `snoc` copies only a handful of elements.
//!
//! # Examples
//!
//! ```rust
//! use fingerarray::persistent::Array;
//!
//! let array: Array<i32> = Array::from_slice(&[1, 2, 3]);
//! let extended = array.snoc(4);
//!
//! assert_eq!(array.len(), 3);    // Original unchanged
//! assert_eq!(extended.len(), 4); // New array
//! assert_eq!(extended.get(3), Ok(&4));
//! ```
//!
//! Arrays of `Copy` elements can store them inline:
//!
//! ```rust
//! use fingerarray::persistent::UnboxedArray;
//!
//! let bytes: UnboxedArray<u8> = (0..=255).collect();
//! assert_eq!(bytes.sub_array(250, 6).unwrap().to_string(), "Array[250, 251, 252, 253, 254, 255]");
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled (default), this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled, this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod array;

pub use array::Array;
pub use array::ArrayBuilder;
pub use array::ArrayCursor;
pub use array::ArrayError;
pub use array::ArrayIntoIterator;
pub use array::ArrayIterator;
pub use array::Boxed;
pub use array::Storage;
pub use array::Unboxed;
pub use array::UnboxedArray;

// =============================================================================
// Tests
// =============================================================================
