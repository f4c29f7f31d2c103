//! Fan a single operation out over several cache targets.
//!
//! A logical cache operation often has to reach more than one provider
//! instance: a write that must land on every replica, a read that should be
//! served by the first replica that has the key. The functions here visit
//! targets strictly in the order the iterator yields them, on the calling
//! thread, one at a time.
//!
//! # Examples
//!
//! ```
//! use cachelite::dispatch::{exec_all, exec_return_first_with_result};
//! use std::collections::HashMap;
//!
//! let mut eu = HashMap::new();
//! let mut us = HashMap::new();
//!
//! // Write-through to every replica
//! exec_all([&mut eu, &mut us], |replica| {
//!     replica.insert("user:1", "ada");
//!     Ok::<_, String>(())
//! })
//! .unwrap();
//!
//! eu.remove("user:1");
//!
//! // Read from the first replica that has it
//! let hit = exec_return_first_with_result([&eu, &us], |replica| {
//!     replica.get("user:1").copied()
//! });
//! assert_eq!(hit, Some("ada"));
//! ```

/// Run `action` against every target in order, stopping at the first error.
///
/// There is no partial-failure aggregation: the first error is returned as
/// is and the remaining targets are never visited.
pub fn exec_all<I, E, F>(targets: I, mut action: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<(), E>,
{
    for (_index, target) in targets.into_iter().enumerate() {
        if let Err(e) = action(target) {
            #[cfg(feature = "tracing")]
            tracing::debug!(target_index = _index, "dispatch aborted on error");
            return Err(e);
        }
    }
    Ok(())
}

/// Run `action` against every target and keep the first non-default result
/// in `first`.
///
/// Every target is visited, whatever it returns. `first` is overwritten by a
/// target's result only while it still equals `R::default()`, so once some
/// target produced a non-default value later targets cannot replace it. If
/// `first` already holds a non-default value on entry it is left untouched.
///
/// # Examples
///
/// ```
/// use cachelite::dispatch::exec_all_with_first_out;
///
/// let mut visited = Vec::new();
/// let mut first = None;
/// exec_all_with_first_out(
///     [None, Some("eu"), Some("us"), None],
///     |result| {
///         visited.push(result);
///         result
///     },
///     &mut first,
/// );
///
/// assert_eq!(first, Some("eu"));
/// assert_eq!(visited.len(), 4);
/// ```
pub fn exec_all_with_first_out<I, R, F>(targets: I, mut action: F, first: &mut R)
where
    I: IntoIterator,
    R: Default + PartialEq,
    F: FnMut(I::Item) -> R,
{
    let default = R::default();
    for target in targets {
        let result = action(target);
        if *first == default {
            *first = result;
        }
    }
}

/// Return the first non-default result, visiting targets in order.
///
/// Stops at the first target whose result differs from `R::default()`; later
/// targets are not visited. If every target yields the default, the whole
/// sequence is consumed and the default is returned. This is a search, so
/// "nothing found" is not an error.
pub fn exec_return_first_with_result<I, R, F>(targets: I, mut action: F) -> R
where
    I: IntoIterator,
    R: Default + PartialEq,
    F: FnMut(I::Item) -> R,
{
    let default = R::default();
    for target in targets {
        let result = action(target);
        if result != default {
            return result;
        }
    }
    default
}

/// Method syntax for the dispatch functions on any collection of targets.
///
/// ```
/// use cachelite::dispatch::ExecExt;
///
/// let replicas = vec![vec![], vec![7u8], vec![9u8]];
/// let first = replicas
///     .iter()
///     .exec_return_first_with_result(|r| r.first().copied());
/// assert_eq!(first, Some(7));
/// ```
pub trait ExecExt: IntoIterator + Sized {
    /// See [`exec_all`].
    fn exec_all<E, F>(self, action: F) -> Result<(), E>
    where
        F: FnMut(Self::Item) -> Result<(), E>,
    {
        exec_all(self, action)
    }

    /// See [`exec_all_with_first_out`].
    fn exec_all_with_first_out<R, F>(self, action: F, first: &mut R)
    where
        R: Default + PartialEq,
        F: FnMut(Self::Item) -> R,
    {
        exec_all_with_first_out(self, action, first)
    }

    /// See [`exec_return_first_with_result`].
    fn exec_return_first_with_result<R, F>(self, action: F) -> R
    where
        R: Default + PartialEq,
        F: FnMut(Self::Item) -> R,
    {
        exec_return_first_with_result(self, action)
    }
}

impl<I: IntoIterator> ExecExt for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_all_visits_in_order() {
        let mut seen = Vec::new();
        let result: Result<(), ()> = exec_all(["a", "b", "c"], |t| {
            seen.push(t);
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_exec_all_aborts_on_first_error() {
        let mut seen = Vec::new();
        let result = exec_all(["a", "b", "c"], |t| {
            seen.push(t);
            if t == "b" {
                Err(format!("{} failed", t))
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("b failed".to_string()));
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_exec_all_empty_is_ok() {
        let result: Result<(), String> = exec_all(Vec::<u8>::new(), |_| unreachable!());
        assert!(result.is_ok());
    }

    #[test]
    fn test_first_out_keeps_first_non_default() {
        let mut first = String::new();
        exec_all_with_first_out(["", "x", "", "y"], |t| t.to_string(), &mut first);
        assert_eq!(first, "x");
    }

    #[test]
    fn test_first_out_visits_every_target() {
        let mut calls = 0;
        let mut first = 0;
        exec_all_with_first_out(
            [1, 2, 3],
            |t| {
                calls += 1;
                t * 10
            },
            &mut first,
        );

        assert_eq!(first, 10);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_first_out_all_defaults_leave_default() {
        let mut first: Option<u8> = None;
        exec_all_with_first_out([1, 2], |_| None, &mut first);
        assert_eq!(first, None);
    }

    #[test]
    fn test_first_out_preserves_non_default_seed() {
        let mut first = 42;
        exec_all_with_first_out([1, 2], |t| t, &mut first);
        assert_eq!(first, 42);
    }

    #[test]
    fn test_return_first_short_circuits() {
        let mut visited = Vec::new();
        let result = exec_return_first_with_result(["t1", "t2", "t3"], |t| {
            visited.push(t);
            match t {
                "t1" => String::new(),
                "t2" => "X".to_string(),
                _ => panic!("t3 must not be visited"),
            }
        });

        assert_eq!(result, "X");
        assert_eq!(visited, vec!["t1", "t2"]);
    }

    #[test]
    fn test_return_first_all_defaults() {
        let mut calls = 0;
        let result: Option<&str> = exec_return_first_with_result([1, 2, 3], |_| {
            calls += 1;
            None
        });

        assert_eq!(result, None);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_ext_trait_methods() {
        let mut first = 0;
        vec![0, 0, 5, 6]
            .into_iter()
            .exec_all_with_first_out(|t| t, &mut first);
        assert_eq!(first, 5);

        let err = [1, 2, 3].exec_all(|t| if t == 2 { Err(t) } else { Ok(()) });
        assert_eq!(err, Err(2));
    }
}
