// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only record projections.
//!
//! A projection bundles everything a list page derives from one record:
//! the day count, the bucket, and the shared status text. Classification
//! runs exactly once per record per date field; stat counters and row
//! cells both read the projection instead of re-deriving it.

use chrono::NaiveDate;
use comreg_domain::{
    BucketId, Classification, DayCount, IsoMilestone, Record, classify, days_until, expiry_field,
    iso_milestone_thresholds, threshold_table_for,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// The derived expiry view of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordProjection {
    /// The record's persisted ID, if any.
    pub record_id: Option<i64>,
    /// The assigned bucket for the entity's primary expiry field.
    pub bucket: BucketId,
    /// Shared status text for counters and row cells.
    pub status: String,
    /// Signed days remaining; `None` when the record has no usable date.
    pub days_remaining: Option<i64>,
}

/// The derived view of one ISO milestone date field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneProjection {
    /// The milestone's field name on the record.
    pub field: &'static str,
    /// The assigned bucket.
    pub bucket: BucketId,
    /// Shared status text.
    pub status: String,
}

/// Projects a record's primary expiry field against its entity table.
#[must_use]
pub fn project_record(record: &Record, today: NaiveDate) -> RecordProjection {
    let raw: Option<String> = record.field_text(expiry_field(record.entity));
    let days: DayCount = days_until(raw.as_deref(), today);
    let classification: Classification = classify(days, &threshold_table_for(record.entity));

    RecordProjection {
        record_id: record.id,
        bucket: classification.bucket,
        status: classification.status,
        days_remaining: match days {
            DayCount::Days(d) => Some(d),
            DayCount::NoDate => None,
        },
    }
}

/// Convenience wrapper returning only the bucket for a record.
#[must_use]
pub fn bucket_of(record: &Record, today: NaiveDate) -> BucketId {
    project_record(record, today).bucket
}

/// Projects each ISO milestone date field against its own 180-day table.
///
/// Non-ISO records produce an empty list.
#[must_use]
pub fn iso_milestone_projections(record: &Record, today: NaiveDate) -> Vec<MilestoneProjection> {
    if record.entity != comreg_domain::EntityKind::IsoDocument {
        return Vec::new();
    }

    [
        IsoMilestone::FirstSurveillance,
        IsoMilestone::SecondSurveillance,
        IsoMilestone::Expiry,
    ]
    .into_iter()
    .map(|milestone| {
        let raw: Option<String> = record.field_text(milestone.field_name());
        let days: DayCount = days_until(raw.as_deref(), today);
        let classification: Classification =
            classify(days, &iso_milestone_thresholds(milestone));
        MilestoneProjection {
            field: milestone.field_name(),
            bucket: classification.bucket,
            status: classification.status,
        }
    })
    .collect()
}

/// The set of buckets a record belongs to, deduplicated.
///
/// Non-ISO records sit in exactly one bucket, their primary
/// projection's. ISO documents belong to the bucket of every milestone
/// field, so a certificate whose first surveillance is inside its
/// window lands in `first_surveillance` even while its expiry is still
/// `normal`.
#[must_use]
pub fn record_buckets(record: &Record, today: NaiveDate) -> Vec<BucketId> {
    if record.entity == comreg_domain::EntityKind::IsoDocument {
        let mut buckets: Vec<BucketId> = iso_milestone_projections(record, today)
            .iter()
            .map(|milestone| milestone.bucket)
            .collect();
        buckets.sort_unstable();
        buckets.dedup();
        return buckets;
    }
    vec![bucket_of(record, today)]
}

/// Tallies records per bucket for the stat boxes.
///
/// Buckets with no records are absent from the map; callers render those
/// as zero. An ISO record is counted once per distinct milestone bucket,
/// so ISO tallies may sum past the record count.
#[must_use]
pub fn bucket_counts(records: &[Record], today: NaiveDate) -> BTreeMap<BucketId, usize> {
    let mut counts: BTreeMap<BucketId, usize> = BTreeMap::new();
    for record in records {
        for bucket in record_buckets(record, today) {
            *counts.entry(bucket).or_insert(0) += 1;
        }
    }
    counts
}
