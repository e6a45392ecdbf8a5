//! Expand/collapse flags.
//!
//! Three independent flag maps exist: per list, per list's task panel, and
//! per date bucket. A key with no entry reads as [`DEFAULT_EXPANDED`]
//! everywhere.

use std::borrow::Borrow;
use std::collections::BTreeMap;

/// State of a flag that has never been written.
pub const DEFAULT_EXPANDED: bool = true;

/// Read a flag.
#[must_use]
pub fn is_expanded<K, Q>(flags: &BTreeMap<K, bool>, key: &Q) -> bool
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    flags.get(key).copied().unwrap_or(DEFAULT_EXPANDED)
}

/// Flip a flag and return its new state.
pub fn toggle<K: Ord + Clone>(flags: &mut BTreeMap<K, bool>, key: &K) -> bool {
    let next = !is_expanded(flags, key);
    flags.insert(key.clone(), next);
    next
}

/// The state a "collapse/expand all" action moves every key to.
///
/// Collapse if every key is currently expanded, otherwise expand.
#[must_use]
pub fn bulk_target<'a, K: Ord + 'a>(
    flags: &BTreeMap<K, bool>,
    keys: impl IntoIterator<Item = &'a K>,
) -> bool {
    !keys.into_iter().all(|key| is_expanded(flags, key))
}

/// Set every key to `target`.
pub fn apply<'a, K: Ord + Clone + 'a>(
    flags: &mut BTreeMap<K, bool>,
    keys: impl IntoIterator<Item = &'a K>,
    target: bool,
) {
    for key in keys {
        flags.insert(key.clone(), target);
    }
}
