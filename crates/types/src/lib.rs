//! Foundation types for lintkit.
//!
//! This crate provides the location types shared across the lintkit stack.
//! It has zero external dependencies, making it suitable as a foundation layer.
//!
//! - [`OffsetRange`]: byte range in a source text
//! - [`LineColumn`]: 1-based line/column position for reporting
//! - [`LineIndex`]: converts byte offsets to [`LineColumn`]s

mod position;

pub use position::{LineColumn, LineIndex, OffsetRange};
