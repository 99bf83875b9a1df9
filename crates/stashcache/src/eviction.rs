//! Least-used eviction
//!
//! Full scan for the entry with the fewest recorded hits. Ties go to the
//! oldest entry, then to the smallest key, so the victim is deterministic.

use crate::entry::CacheEntry;

/// Pick the key to evict from `entries`, if any
pub fn least_used<'a, V, I>(entries: I) -> Option<&'a str>
where
    V: 'a,
    I: IntoIterator<Item = (&'a String, &'a CacheEntry<V>)>,
{
    entries
        .into_iter()
        .min_by(|(ka, a), (kb, b)| {
            a.hit_count
                .cmp(&b.hit_count)
                .then(a.created_at.cmp(&b.created_at))
                .then(ka.cmp(kb))
        })
        .map(|(key, _)| key.as_str())
}
