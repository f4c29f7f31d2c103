//! Key pattern compilation for [`RemoveByPattern`](super::RemoveByPattern)
//! implementations.
//!
//! Globs are translated to anchored regular expressions so both eviction
//! methods share one matcher type.
//!
//! # Examples
//!
//! ```rust
//! use cachelite::cache::KeyMatcher;
//!
//! let users = KeyMatcher::glob("user:*").unwrap();
//! assert!(users.is_match("user:1"));
//! assert!(!users.is_match("order:1"));
//!
//! let sessions = KeyMatcher::regex(r"session:\d+").unwrap();
//! assert!(sessions.is_match("tenant-a:session:42"));
//! ```

use regex::Regex;

use super::CacheError;

/// A compiled key pattern.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    regex: Regex,
}

impl KeyMatcher {
    /// Compile a glob. `*` matches any run of characters, `?` exactly one,
    /// everything else literally. The whole key must match.
    pub fn glob(pattern: &str) -> Result<Self, CacheError> {
        Ok(Self {
            regex: glob_to_regex(pattern)?,
        })
    }

    /// Compile a regular expression that may match anywhere in the key.
    pub fn regex(pattern: &str) -> Result<Self, CacheError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// True if `key` matches.
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// The regular expression the pattern compiled to.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Translate a glob into an anchored regular expression.
///
/// ```rust
/// use cachelite::cache::pattern::glob_to_regex;
///
/// let re = glob_to_regex("user:?.name").unwrap();
/// assert!(re.is_match("user:7.name"));
/// assert!(!re.is_match("user:7xname"));
/// assert!(!re.is_match("user:77.name"));
/// ```
pub fn glob_to_regex(glob: &str) -> Result<Regex, CacheError> {
    let mut source = String::with_capacity(glob.len() + 8);
    // (?s) so wildcards also cover newlines inside keys
    source.push_str("^(?s:");
    let mut buf = [0u8; 4];
    for c in glob.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            c => source.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    source.push_str(")$");
    Ok(Regex::new(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_star_matches_empty_run() {
        let m = KeyMatcher::glob("user:*").unwrap();
        assert!(m.is_match("user:"));
        assert!(m.is_match("user:1"));
        assert!(m.is_match("user:1:profile"));
        assert!(!m.is_match("olduser:1"));
    }

    #[test]
    fn test_question_mark_matches_exactly_one_char() {
        let m = KeyMatcher::glob("k?").unwrap();
        assert!(m.is_match("k1"));
        assert!(m.is_match("kä"));
        assert!(!m.is_match("k"));
        assert!(!m.is_match("k12"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal_in_globs() {
        let m = KeyMatcher::glob("a.b+(c)").unwrap();
        assert!(m.is_match("a.b+(c)"));
        assert!(!m.is_match("axb+(c)"));
    }

    #[test]
    fn test_regex_is_unanchored() {
        let m = KeyMatcher::regex("order").unwrap();
        assert!(m.is_match("archived:order:1"));
        let anchored = KeyMatcher::regex("^order").unwrap();
        assert!(!anchored.is_match("archived:order:1"));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = KeyMatcher::regex("user:(").unwrap_err();
        assert!(matches!(err, CacheError::InvalidPattern(_)));
    }

    #[test]
    fn test_star_spans_newlines() {
        let m = KeyMatcher::glob("a*b").unwrap();
        assert!(m.is_match("a\nb"));
    }

    proptest! {
        #[test]
        fn prop_literal_glob_matches_only_itself(
            key in "[a-z:0-9.]{0,16}",
            other in "[a-z:0-9.]{0,16}",
        ) {
            let m = KeyMatcher::glob(&key).unwrap();
            prop_assert!(m.is_match(&key));
            prop_assert_eq!(m.is_match(&other), key == other);
        }

        #[test]
        fn prop_prefix_star_matches_any_suffix(prefix in "[a-z:]{0,8}", suffix in "\\PC{0,12}") {
            let m = KeyMatcher::glob(&format!("{}*", prefix)).unwrap();
            let key = format!("{}{}", prefix, suffix);
            prop_assert!(m.is_match(&key));
        }
    }
}
