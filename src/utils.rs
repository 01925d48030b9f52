//! # Utility Functions Module
//!
//! This module provides utility functions that improve code readability
//! and reduce boilerplate across the application.

/// Converts an iterable of string-like items to Vec<String>.
///
/// Accepts any iterable of items that can be converted to String,
/// eliminating repetitive `.to_string()` calls when building
/// encoder argument lists.
///
/// # Example
/// ```rust
/// use video_compressor::utils::to_string_vec;
///
/// let args = to_string_vec(["-crf", "28", "-preset", "medium"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Macro for convenient argument-vector building.
///
/// Each item is stringified individually, so string literals and
/// numeric values can be mixed freely.
///
/// # Example
/// ```rust
/// use video_compressor::args;
///
/// let crf = 28;
/// let args = args!["-crf", crf, "-preset", "medium"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}
