// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export serialization.
//!
//! Flattens a record snapshot into a tabular sheet using the entity's
//! column allow-list, reapplying `DD/MM/YYYY` display formatting to
//! date columns and appending the computed expiry status as the last
//! column. Absent values export as empty cells, never as literal null
//! text.

use chrono::NaiveDate;
use comreg::project_record;
use comreg_audit::ChangeEvent;
use comreg_domain::{EntityKind, Record, date_columns, format_display_date, tracked_fields};

use crate::error::ApiError;

/// The header of the computed status column appended to every export.
const STATUS_COLUMN: &str = "status";

/// Serializes records to CSV using the entity's column allow-list.
///
/// Columns outside the allow-list never export, whatever extra fields a
/// record carries. Date columns are reformatted for display; all other
/// values export as entered.
///
/// # Errors
///
/// Returns [`ApiError::NoDataToExport`] when the snapshot is empty, and
/// an internal error if CSV serialization itself fails.
pub fn export_records(
    records: &[Record],
    entity: EntityKind,
    today: NaiveDate,
) -> Result<String, ApiError> {
    if records.is_empty() {
        return Err(ApiError::NoDataToExport {
            entity: String::from(entity.as_str()),
        });
    }

    let columns: &[&str] = tracked_fields(entity);
    let dates: &[&str] = date_columns(entity);

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = columns.to_vec();
    header.push(STATUS_COLUMN);
    writer
        .write_record(&header)
        .map_err(|e| ApiError::Internal {
            message: format!("CSV serialization failed: {e}"),
        })?;

    for record in records {
        let mut row: Vec<String> = Vec::with_capacity(columns.len() + 1);
        for column in columns {
            let cell: String = record.field_text(column).unwrap_or_default();
            if dates.contains(column) && !cell.is_empty() {
                row.push(format_display_date(&cell));
            } else {
                row.push(cell);
            }
        }
        row.push(project_record(record, today).status);

        writer.write_record(&row).map_err(|e| ApiError::Internal {
            message: format!("CSV serialization failed: {e}"),
        })?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("CSV serialization failed: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV output was not valid UTF-8: {e}"),
    })
}

/// Serializes a record's change history to CSV.
///
/// One row per changed tracked field per event; an event that changed
/// nothing tracked still exports one placeholder row so the history
/// stays complete.
///
/// # Errors
///
/// Returns [`ApiError::NoDataToExport`] when the history is empty, and
/// an internal error if CSV serialization fails.
pub fn export_history(
    events: &[ChangeEvent],
    entity: EntityKind,
) -> Result<String, ApiError> {
    if events.is_empty() {
        return Err(ApiError::NoDataToExport {
            entity: String::from(entity.as_str()),
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["actor", "action", "change"])
        .map_err(|e| ApiError::Internal {
            message: format!("CSV serialization failed: {e}"),
        })?;

    for event in events {
        for line in event.summary_lines(tracked_fields(entity)) {
            writer
                .write_record([&event.actor, event.action.as_str(), &line])
                .map_err(|e| ApiError::Internal {
                    message: format!("CSV serialization failed: {e}"),
                })?;
        }
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| ApiError::Internal {
        message: format!("CSV serialization failed: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal {
        message: format!("CSV output was not valid UTF-8: {e}"),
    })
}

/// The download filename for an entity export.
#[must_use]
pub fn export_filename(entity: EntityKind) -> String {
    format!("{}_data.csv", entity.as_str())
}

/// The download filename for a record's history export.
#[must_use]
pub fn history_export_filename(entity: EntityKind, record_name: &str) -> String {
    let slug: String = record_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}-history-{slug}.csv", entity.as_str())
}
