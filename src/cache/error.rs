//! Errors raised by cache capability implementations.

use std::string::FromUtf8Error;

/// Error returned by [`RemoveByPattern`](super::RemoveByPattern) and
/// [`DeflateProvider`](super::DeflateProvider) implementations.
#[derive(Debug)]
pub enum CacheError {
    /// A glob or regex pattern failed to compile.
    InvalidPattern(regex::Error),
    /// Compressing or decompressing failed, usually because the buffer is
    /// corrupt or was produced in another format.
    Compression(std::io::Error),
    /// The decompressed payload is not valid UTF-8.
    InvalidUtf8(FromUtf8Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern(e) => write!(f, "invalid key pattern: {}", e),
            Self::Compression(e) => write!(f, "compression failed: {}", e),
            Self::InvalidUtf8(e) => write!(f, "inflated payload is not UTF-8: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern(e) => Some(e),
            Self::Compression(e) => Some(e),
            Self::InvalidUtf8(e) => Some(e),
        }
    }
}

impl From<regex::Error> for CacheError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern(e)
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Compression(e)
    }
}

impl From<FromUtf8Error> for CacheError {
    fn from(e: FromUtf8Error) -> Self {
        Self::InvalidUtf8(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_and_source() {
        let err = CacheError::from(regex::Regex::new("(").unwrap_err());
        assert!(err.to_string().starts_with("invalid key pattern"));
        assert!(err.source().is_some());

        let err = CacheError::from(std::io::Error::other("corrupt deflate stream"));
        assert_eq!(err.to_string(), "compression failed: corrupt deflate stream");

        let err = CacheError::from(String::from_utf8(vec![0xff]).unwrap_err());
        assert!(matches!(err, CacheError::InvalidUtf8(_)));
    }
}
