//! # fingerarray
//!
//! A persistent random-access array for Rust, built on a 2-3 finger tree
//! with cached sizes.
//!
//! ## Overview
//!
//! [`persistent::Array`] is an immutable sequence: every operation returns a
//! new array and leaves the original untouched, sharing all unchanged
//! structure. It offers:
//!
//! - amortized O(1) access and updates at both ends
//! - O(log n) indexing, insertion, removal and slicing
//! - O(log min(n, m)) concatenation
//! - leaf-wise bidirectional iteration
//!
//! Two leaf layouts are available: [`persistent::Boxed`] for arbitrary
//! element types and [`persistent::Unboxed`] for `Copy` elements stored
//! inline.
//!
//! ## Feature Flags
//!
//! - `persistent`: The array and its builder
//! - `arc`: Share structure through `Arc` instead of `Rc`, making arrays
//!   `Send + Sync` (enabled by default)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use fingerarray::prelude::*;
//!
//! let array: Array<i32> = (1..=5).collect();
//! let longer = array.concat(&array.reverse());
//! assert_eq!(longer.to_string(), "Array[1, 2, 3, 4, 5, 5, 4, 3, 2, 1]");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use fingerarray::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

#[cfg(feature = "persistent")]
pub mod persistent;
