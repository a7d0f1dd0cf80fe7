//! Error type for fallible [`Array`](super::Array) operations.

use std::fmt;

/// Represents a failed operation on an [`Array`](super::Array).
///
/// Errors are detected before any structural work is done, so a failed
/// call leaves every array (including the receiver) untouched.
///
/// # Examples
///
/// ```rust
/// use fingerarray::persistent::{Array, ArrayError};
///
/// let array: Array<i32> = Array::from_slice(&[1, 2, 3]);
/// assert_eq!(
///     array.get(3),
///     Err(ArrayError::IndexOutOfBounds { index: 3, len: 3 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    /// An element index was not in `0..len`.
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// The length of the array.
        len: usize,
    },
    /// An insertion position was not in `0..=len`.
    PositionOutOfBounds {
        /// The rejected position.
        position: usize,
        /// The length of the array.
        len: usize,
    },
    /// A sub-array range exceeded the array.
    RangeOutOfBounds {
        /// The first index of the range.
        position: usize,
        /// The length of the range.
        length: usize,
        /// The length of the array.
        len: usize,
    },
    /// An end-oriented operation was called on an empty array.
    EmptyArray {
        /// The name of the rejected operation.
        operation: &'static str,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(formatter, "index out of bounds: {index} >= {len}")
            }
            Self::PositionOutOfBounds { position, len } => {
                write!(formatter, "position out of bounds: {position} > {len}")
            }
            Self::RangeOutOfBounds {
                position,
                length,
                len,
            } => write!(
                formatter,
                "range out of bounds: {position} + {length} > {len}"
            ),
            Self::EmptyArray { operation } => {
                write!(formatter, "{operation} called on an empty array")
            }
        }
    }
}

impl std::error::Error for ArrayError {}
