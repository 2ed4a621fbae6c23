// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use comreg_domain::{BucketId, EntityKind};
use comreg_persistence::SqlitePersistence;

use crate::error::ApiError;
use crate::export::{export_records, history_export_filename};
use crate::handlers::{ListRecordsResponse, list_records};
use crate::import::{ImportBatch, ParsedRow, ValidationReport, parse_rows, submit_rows, validate_rows};
use crate::tests::helpers::{persistence, today};

const MCU_HEADER: &str = "full_name,awal_mcu,akhir_mcu,hasil_mcu";

fn mcu_csv(rows: &[&str]) -> String {
    let mut csv: String = String::from(MCU_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv
}

#[test]
fn test_import_lands_records_in_listing() {
    let mut db: SqlitePersistence = persistence();

    let csv: String = mcu_csv(&[
        "Budi Santoso,2024-06-01,2025-05-01,Fit",
        "Siti Rahayu,2024-06-01,10/06/2025,Fit",
    ]);
    let rows: Vec<ParsedRow> = parse_rows(&csv, EntityKind::Mcu).unwrap();
    let report: ValidationReport = validate_rows(rows, EntityKind::Mcu);
    assert!(report.warnings.is_empty());

    let batch: ImportBatch = submit_rows(&mut db, &report, "admin").unwrap();
    assert_eq!(batch.success, 2);

    let listing: ListRecordsResponse =
        list_records(&mut db, EntityKind::Mcu, "", None, today()).unwrap();
    assert_eq!(listing.total, 2);
    assert_eq!(listing.counts.get(&BucketId::Expired), Some(&1));
    assert_eq!(listing.counts.get(&BucketId::DueDate), Some(&1));
}

#[test]
fn test_import_partial_failure_is_authoritative() {
    let mut db: SqlitePersistence = persistence();

    // Row 2 carries a date persistence rejects; the warning at
    // validation time does not remove it from the batch.
    let csv: String = mcu_csv(&[
        "Budi,2024-06-01,2025-05-01,Fit",
        "Siti,2024-06-01,13/13/2025,Fit",
        "Agus,2024-06-01,2025-12-01,Fit",
    ]);
    let rows: Vec<ParsedRow> = parse_rows(&csv, EntityKind::Mcu).unwrap();
    let report: ValidationReport = validate_rows(rows, EntityKind::Mcu);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.rows.len(), 3);

    let batch: ImportBatch = submit_rows(&mut db, &report, "admin").unwrap();
    assert_eq!(batch.total, 3);
    assert_eq!(batch.success, 2);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].row, 2);
    assert_eq!(batch.success + batch.errors.len(), batch.total);
}

#[test]
fn test_import_then_export_reformats_dates() {
    let mut db: SqlitePersistence = persistence();

    let csv: String = mcu_csv(&["Budi,2024-06-01,2025-12-31,Fit"]);
    let rows: Vec<ParsedRow> = parse_rows(&csv, EntityKind::Mcu).unwrap();
    let report: ValidationReport = validate_rows(rows, EntityKind::Mcu);
    submit_rows(&mut db, &report, "admin").unwrap();

    let listing: ListRecordsResponse =
        list_records(&mut db, EntityKind::Mcu, "", None, today()).unwrap();
    let records: Vec<_> = listing
        .records
        .into_iter()
        .map(|view| view.record)
        .collect();

    let exported: String = export_records(&records, EntityKind::Mcu, today()).unwrap();
    assert!(exported.contains("31/12/2025"));
    assert!(exported.contains("days left"));
}

#[test]
fn test_export_empty_entity_is_no_data() {
    let result = export_records(&[], EntityKind::HseDocument, today());
    match result {
        Err(ApiError::NoDataToExport { entity }) => assert_eq!(entity, "hse"),
        other => panic!("Expected NoDataToExport, got {other:?}"),
    }
}

#[test]
fn test_history_filename_slug() {
    assert_eq!(
        history_export_filename(EntityKind::Mcu, "Budi Santoso (2025)"),
        "mcu-history-budi-santoso--2025-.csv"
    );
}
