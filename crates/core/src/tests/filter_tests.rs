// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{record_buckets, visible};
use chrono::NaiveDate;
use comreg_domain::{BucketId, EntityKind, FieldValue, Record};
use std::collections::BTreeMap;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn mcu_record(id: i64, name: &str, akhir_mcu: Option<&str>) -> Record {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("full_name"),
        FieldValue::Text(String::from(name)),
    );
    fields.insert(
        String::from("department"),
        FieldValue::Text(String::from("Operations")),
    );
    match akhir_mcu {
        Some(d) => fields.insert(
            String::from("akhir_mcu"),
            FieldValue::Text(String::from(d)),
        ),
        None => fields.insert(String::from("akhir_mcu"), FieldValue::Null),
    };
    Record::with_id(id, EntityKind::Mcu, fields)
}

fn iso_record(id: i64, name: &str, first: &str, second: &str, expiry: &str) -> Record {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("document_name"),
        FieldValue::Text(String::from(name)),
    );
    fields.insert(
        String::from("first_surveillance_date"),
        FieldValue::Text(String::from(first)),
    );
    fields.insert(
        String::from("second_surveillance_date"),
        FieldValue::Text(String::from(second)),
    );
    fields.insert(
        String::from("expiry_date"),
        FieldValue::Text(String::from(expiry)),
    );
    Record::with_id(id, EntityKind::IsoDocument, fields)
}

fn fixture() -> Vec<Record> {
    vec![
        mcu_record(1, "Budi Santoso", Some("2025-05-01")),  // expired
        mcu_record(2, "Siti Rahayu", Some("10/06/2025")),   // duedate (9d)
        mcu_record(3, "Agus Wijaya", Some("2025-12-01")),   // normal
        mcu_record(4, "Dewi Lestari", None),                // no date
    ]
}

#[test]
fn identity_inputs_return_every_record() {
    let records: Vec<Record> = fixture();
    let result = visible(&records, "", None, |r| record_buckets(r, today()));
    assert_eq!(result.len(), records.len());
}

#[test]
fn bucket_filter_keeps_matching_records_only() {
    let records: Vec<Record> = fixture();
    let result = visible(&records, "", Some(BucketId::Expired), |r| {
        record_buckets(r, today())
    });
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, Some(1));
}

#[test]
fn no_date_records_are_their_own_bucket() {
    let records: Vec<Record> = fixture();
    let result = visible(&records, "", Some(BucketId::NoDate), |r| {
        record_buckets(r, today())
    });
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, Some(4));
}

#[test]
fn iso_records_are_visible_under_each_milestone_bucket() {
    // First surveillance 90 days out, everything else beyond its window.
    let records: Vec<Record> = vec![iso_record(
        9,
        "ISO 9001",
        "2025-08-30",
        "2026-08-30",
        "2027-08-30",
    )];

    let by_first = visible(&records, "", Some(BucketId::FirstSurveillance), |r| {
        record_buckets(r, today())
    });
    assert_eq!(by_first.len(), 1);
    assert_eq!(by_first[0].id, Some(9));

    let by_expiry_window = visible(&records, "", Some(BucketId::ExpiryWindow), |r| {
        record_buckets(r, today())
    });
    assert!(by_expiry_window.is_empty());

    // The out-of-window milestones still place the record under normal.
    let by_normal = visible(&records, "", Some(BucketId::Normal), |r| {
        record_buckets(r, today())
    });
    assert_eq!(by_normal.len(), 1);
}

#[test]
fn search_is_case_insensitive_across_all_fields() {
    let records: Vec<Record> = fixture();
    let by_name = visible(&records, "SITI", None, |r| record_buckets(r, today()));
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, Some(2));

    // Hidden/secondary fields are searchable too.
    let by_department = visible(&records, "operations", None, |r| record_buckets(r, today()));
    assert_eq!(by_department.len(), records.len());
}

#[test]
fn search_composes_after_bucket_filter() {
    let records: Vec<Record> = fixture();
    let result = visible(&records, "budi", Some(BucketId::Expired), |r| {
        record_buckets(r, today())
    });
    assert_eq!(result.len(), 1);

    let mismatch = visible(&records, "budi", Some(BucketId::DueDate), |r| {
        record_buckets(r, today())
    });
    assert!(mismatch.is_empty());
}

#[test]
fn refiltering_with_identity_inputs_is_idempotent() {
    let records: Vec<Record> = fixture();
    let once = visible(&records, "santoso", None, |r| record_buckets(r, today()));
    let narrowed: Vec<Record> = once.iter().map(|r| (*r).clone()).collect();
    let twice = visible(&narrowed, "", None, |r| record_buckets(r, today()));
    assert_eq!(twice.len(), once.len());
}

#[test]
fn same_inputs_same_output() {
    let records: Vec<Record> = fixture();
    let a: Vec<Option<i64>> = visible(&records, "a", None, |r| record_buckets(r, today()))
        .iter()
        .map(|r| r.id)
        .collect();
    let b: Vec<Option<i64>> = visible(&records, "a", None, |r| record_buckets(r, today()))
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(a, b);
}
