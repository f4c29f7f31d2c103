//! Capability contracts for cache providers.
//!
//! A provider implements whichever of these it supports; calling code takes
//! `&dyn RemoveByPattern` or `impl DeflateProvider` and does not care which
//! store sits behind it.
//!
//! - [`RemoveByPattern`]: evict every key matching a glob or a regex
//! - [`DeflateProvider`]: transcode strings to and from a compressed buffer
//!
//! [`FlateProvider`] is a ready-made [`DeflateProvider`]; [`KeyMatcher`] does the
//! pattern compilation a [`RemoveByPattern`] implementation needs.

mod deflate;
mod error;
pub mod pattern;

pub use deflate::{FlateFormat, FlateProvider};
pub use error::CacheError;
pub use pattern::KeyMatcher;

/// Pattern-based eviction.
///
/// # Pattern semantics
///
/// - [`remove_by_pattern`](Self::remove_by_pattern) takes a glob where `*`
///   matches any run of characters (including none), `?` matches exactly one
///   character, and everything else is literal. The glob must match the whole
///   key: `user:*` removes `user:1` but not `olduser:1`.
/// - [`remove_by_regex`](Self::remove_by_regex) takes a [`regex`] expression
///   that may match anywhere in the key. Anchor with `^` and `$` for
///   whole-key matching.
///
/// Removing nothing is not an error; both methods return how many entries
/// were evicted. A pattern that fails to compile yields
/// [`CacheError::InvalidPattern`] and evicts nothing.
pub trait RemoveByPattern {
    /// Remove every entry whose key matches the glob `pattern`.
    fn remove_by_pattern(&self, pattern: &str) -> Result<usize, CacheError>;

    /// Remove every entry whose key contains a match for `regex`.
    fn remove_by_regex(&self, regex: &str) -> Result<usize, CacheError>;
}

/// String compression.
///
/// Implementations must satisfy `inflate(&deflate(s)?)? == s` for every
/// string `s`, the empty string included. Text is UTF-8 on both sides.
pub trait DeflateProvider {
    /// Compress `text` into the provider's binary format.
    fn deflate(&self, text: &str) -> Result<Vec<u8>, CacheError>;

    /// Decompress a buffer produced by [`deflate`](Self::deflate).
    fn inflate(&self, buffer: &[u8]) -> Result<String, CacheError>;
}

impl<T: RemoveByPattern + ?Sized> RemoveByPattern for &T {
    fn remove_by_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        (**self).remove_by_pattern(pattern)
    }

    fn remove_by_regex(&self, regex: &str) -> Result<usize, CacheError> {
        (**self).remove_by_regex(regex)
    }
}

impl<T: DeflateProvider + ?Sized> DeflateProvider for &T {
    fn deflate(&self, text: &str) -> Result<Vec<u8>, CacheError> {
        (**self).deflate(text)
    }

    fn inflate(&self, buffer: &[u8]) -> Result<String, CacheError> {
        (**self).inflate(buffer)
    }
}
