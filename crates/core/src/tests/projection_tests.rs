// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{bucket_counts, iso_milestone_projections, project_record, record_buckets};
use chrono::NaiveDate;
use comreg_domain::{BucketId, EntityKind, FieldValue, Record};
use std::collections::BTreeMap;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn record_with(entity: EntityKind, pairs: &[(&str, &str)]) -> Record {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    for (name, value) in pairs {
        fields.insert(String::from(*name), FieldValue::Text(String::from(*value)));
    }
    Record::with_id(1, entity, fields)
}

#[test]
fn mcu_projection_carries_days_and_status() {
    let record: Record = record_with(EntityKind::Mcu, &[("akhir_mcu", "15/06/2025")]);
    let projection = project_record(&record, today());
    assert_eq!(projection.bucket, BucketId::DueDate);
    assert_eq!(projection.days_remaining, Some(14));
    assert_eq!(projection.status, "14 days left");
}

#[test]
fn missing_expiry_field_projects_no_date() {
    let record: Record = record_with(EntityKind::Contract, &[("full_name", "Budi")]);
    let projection = project_record(&record, today());
    assert_eq!(projection.bucket, BucketId::NoDate);
    assert_eq!(projection.days_remaining, None);
    assert_eq!(projection.status, "No date");
}

#[test]
fn contract_day_zero_is_duedate_not_expired() {
    let record: Record = record_with(EntityKind::Contract, &[("kontrak_akhir", "2025-06-01")]);
    assert_eq!(project_record(&record, today()).bucket, BucketId::DueDate);

    let mcu: Record = record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-06-01")]);
    assert_eq!(project_record(&mcu, today()).bucket, BucketId::Expired);
}

#[test]
fn iso_milestones_project_independently() {
    let record: Record = record_with(
        EntityKind::IsoDocument,
        &[
            ("first_surveillance_date", "2025-06-20"),
            ("second_surveillance_date", "2026-06-20"),
            ("expiry_date", "2025-05-01"),
        ],
    );
    let milestones = iso_milestone_projections(&record, today());
    assert_eq!(milestones.len(), 3);
    assert_eq!(milestones[0].field, "first_surveillance_date");
    assert_eq!(milestones[0].bucket, BucketId::FirstSurveillance);
    assert_eq!(milestones[1].bucket, BucketId::Normal);
    assert_eq!(milestones[2].bucket, BucketId::Expired);
}

#[test]
fn non_iso_records_have_no_milestones() {
    let record: Record = record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-06-20")]);
    assert!(iso_milestone_projections(&record, today()).is_empty());
}

#[test]
fn bucket_counts_tally_every_record() {
    let records: Vec<Record> = vec![
        record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-05-01")]),
        record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-05-20")]),
        record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-06-10")]),
        record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-12-01")]),
        record_with(EntityKind::Mcu, &[]),
    ];
    let counts = bucket_counts(&records, today());

    assert_eq!(counts.get(&BucketId::Expired), Some(&2));
    assert_eq!(counts.get(&BucketId::DueDate), Some(&1));
    assert_eq!(counts.get(&BucketId::Normal), Some(&1));
    assert_eq!(counts.get(&BucketId::NoDate), Some(&1));
    assert_eq!(counts.values().sum::<usize>(), records.len());
}

#[test]
fn non_iso_records_have_exactly_one_bucket() {
    let record: Record = record_with(EntityKind::Mcu, &[("akhir_mcu", "2025-06-10")]);
    assert_eq!(record_buckets(&record, today()), vec![BucketId::DueDate]);
}

#[test]
fn iso_record_buckets_union_the_milestones() {
    let record: Record = record_with(
        EntityKind::IsoDocument,
        &[
            ("first_surveillance_date", "2025-08-30"),
            ("second_surveillance_date", "2025-10-30"),
            ("expiry_date", "2027-06-20"),
        ],
    );
    let buckets = record_buckets(&record, today());
    assert!(buckets.contains(&BucketId::FirstSurveillance));
    assert!(buckets.contains(&BucketId::SecondSurveillance));
    assert!(!buckets.contains(&BucketId::ExpiryWindow));
    assert!(buckets.contains(&BucketId::Normal));
}

#[test]
fn iso_bucket_counts_tally_milestone_windows() {
    let records: Vec<Record> = vec![record_with(
        EntityKind::IsoDocument,
        &[
            ("first_surveillance_date", "2025-08-30"),
            ("second_surveillance_date", "2025-10-30"),
            ("expiry_date", "2027-06-20"),
        ],
    )];
    let counts = bucket_counts(&records, today());

    assert_eq!(counts.get(&BucketId::FirstSurveillance), Some(&1));
    assert_eq!(counts.get(&BucketId::SecondSurveillance), Some(&1));
    assert_eq!(counts.get(&BucketId::ExpiryWindow), None);
    assert_eq!(counts.get(&BucketId::Normal), Some(&1));
}
