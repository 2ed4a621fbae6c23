// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visible-row derivation: bucket filtering composed with free-text
//! search.
//!
//! The engine is pure: identical inputs always yield identical output,
//! so callers may recompute it whenever any input changes. Search is the
//! deliberate "search everything" admin-tool semantics: every non-null
//! field value is a haystack, which makes the cost O(records x fields).

use comreg_domain::{BucketId, Record};

/// Returns the records visible under a bucket filter and a search term.
///
/// # Arguments
///
/// * `records` - The fetched record snapshot
/// * `search_term` - Free text; empty means no text filtering
/// * `active_bucket` - `None` is the "show all" sentinel
/// * `buckets_of` - Maps a record to every bucket it belongs to
///   (computed by the caller so classification happens once per record;
///   ISO records carry one bucket per milestone field)
///
/// A record passes the bucket filter when the active bucket matches ANY
/// of its buckets. Bucket filtering applies first, then text filtering;
/// with both inputs at their identity values every record is returned.
pub fn visible<'a, F>(
    records: &'a [Record],
    search_term: &str,
    active_bucket: Option<BucketId>,
    buckets_of: F,
) -> Vec<&'a Record>
where
    F: Fn(&Record) -> Vec<BucketId>,
{
    let needle: String = search_term.trim().to_lowercase();

    records
        .iter()
        .filter(|record| {
            active_bucket.is_none_or(|bucket| buckets_of(record).contains(&bucket))
        })
        .filter(|record| needle.is_empty() || matches_search(record, &needle))
        .collect()
}

/// Case-insensitive substring match of a lowercased needle against every
/// non-null field value and attachment identifier of a record.
#[must_use]
pub fn matches_search(record: &Record, lowercase_needle: &str) -> bool {
    record
        .searchable_values()
        .any(|value| value.to_lowercase().contains(lowercase_needle))
}
