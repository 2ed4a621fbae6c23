// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV bulk-import pipeline: parse, validate, preview, submit.
//!
//! Parsing and validation never mutate canonical state. A header-level
//! failure (missing required columns) rejects the whole file with one
//! aggregate error; per-row findings are warnings that keep the row in
//! the batch, and the authoritative per-row verdict comes from
//! persistence at submit time.

use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use comreg_domain::{
    EntityKind, FieldValue, Record, date_columns, is_import_date_format, required_columns,
};
use comreg_persistence::SqlitePersistence;

use crate::error::{ApiError, Severity};

/// Maximum number of rows shown in the on-screen preview.
pub const PREVIEW_ROW_CAP: usize = 5;

/// Maximum number of row issues shown before summarizing the rest.
pub const ERROR_DISPLAY_CAP: usize = 5;

/// One issue tied to a specific data row (1-based, excluding header).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowIssue {
    /// The 1-based data row number.
    pub row: usize,
    /// A human-readable message.
    pub message: String,
}

/// A parsed data row keyed by normalized column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// The 1-based data row number.
    pub row_number: usize,
    /// The cell values; empty cells are absent from the map.
    pub fields: BTreeMap<String, FieldValue>,
}

/// The outcome of parsing and validating one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// The entity kind the file targets.
    pub entity: EntityKind,
    /// Every parsed row, warnings or not.
    pub rows: Vec<ParsedRow>,
    /// Per-row warnings; rows with warnings stay in the batch.
    pub warnings: Vec<RowIssue>,
}

impl ValidationReport {
    /// Returns the first [`PREVIEW_ROW_CAP`] rows for display.
    #[must_use]
    pub fn preview(&self) -> &[ParsedRow] {
        let cap: usize = self.rows.len().min(PREVIEW_ROW_CAP);
        &self.rows[..cap]
    }
}

/// The aggregate result of one submitted batch.
///
/// Ephemeral: exists only for the upload round-trip and its report.
/// A batch with row-level failures is still a successful batch at the
/// transport level.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImportBatch {
    /// Total rows submitted.
    pub total: usize,
    /// Rows persisted successfully.
    pub success: usize,
    /// Per-row failures, in row order.
    pub errors: Vec<RowIssue>,
}

impl ImportBatch {
    /// The feedback severity for this batch result.
    #[must_use]
    pub fn severity(&self) -> Severity {
        if self.errors.is_empty() {
            Severity::Success
        } else if self.success > 0 {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

/// Normalizes a CSV header for case-insensitive, whitespace-tolerant
/// matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required columns are present in the CSV header.
fn validate_headers(
    headers: &StringRecord,
    entity: EntityKind,
) -> Result<HashMap<String, usize>, ApiError> {
    let mut header_map: HashMap<String, usize> = HashMap::new();

    for (idx, header) in headers.iter().enumerate() {
        let normalized: String = normalize_header(header);
        header_map.insert(normalized, idx);
    }

    let mut missing: Vec<String> = Vec::new();
    for required in required_columns(entity) {
        if !header_map.contains_key(*required) {
            missing.push(String::from(*required));
        }
    }

    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Required columns not found: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Parses CSV content into rows keyed by normalized column name.
///
/// Empty cells are omitted from the row's field map. Numeric-looking
/// cells stay textual; persistence stores field values as entered.
///
/// # Errors
///
/// Returns an error if the header row cannot be read or any required
/// column is absent. Missing columns are reported as one aggregate
/// error, never per-row.
pub fn parse_rows(csv_content: &str, entity: EntityKind) -> Result<Vec<ParsedRow>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();

    let header_map: HashMap<String, usize> = validate_headers(&headers, entity)?;

    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = result.map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to parse row {row_number}: {e}"),
        })?;

        let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
        for (name, &col_idx) in &header_map {
            let cell: Option<&str> = record.get(col_idx).map(str::trim).filter(|s| !s.is_empty());
            if let Some(value) = cell {
                fields.insert(name.clone(), FieldValue::Text(String::from(value)));
            }
        }

        rows.push(ParsedRow { row_number, fields });
    }

    Ok(rows)
}

/// Validates parsed rows against the entity's column configuration.
///
/// Every configured date column must hold `YYYY-MM-DD` or `DD/MM/YYYY`
/// when populated; a failing cell produces one warning entry. Warnings
/// never remove a row from the batch - the user may submit anyway and
/// persistence renders the authoritative verdict.
#[must_use]
pub fn validate_rows(rows: Vec<ParsedRow>, entity: EntityKind) -> ValidationReport {
    let mut warnings: Vec<RowIssue> = Vec::new();

    for row in &rows {
        for column in date_columns(entity) {
            if let Some(FieldValue::Text(value)) = row.fields.get(*column)
                && !is_import_date_format(value)
            {
                warnings.push(RowIssue {
                    row: row.row_number,
                    message: format!(
                        "{column}: invalid date '{value}' (expected DD/MM/YYYY or YYYY-MM-DD)"
                    ),
                });
            }
        }
    }

    ValidationReport {
        entity,
        rows,
        warnings,
    }
}

/// Submits a validated batch to persistence, one row at a time.
///
/// Row-level failures are collected, never propagated: the batch result
/// reports `success + errors.len() == total` and the caller surfaces
/// the per-row messages verbatim.
///
/// # Errors
///
/// This function itself never fails; the `Result` is kept for parity
/// with the other submit paths and future transactional backends.
#[allow(clippy::unnecessary_wraps)]
pub fn submit_rows(
    persistence: &mut SqlitePersistence,
    report: &ValidationReport,
    actor: &str,
) -> Result<ImportBatch, ApiError> {
    let mut success: usize = 0;
    let mut errors: Vec<RowIssue> = Vec::new();

    for row in &report.rows {
        let record: Record = Record::new(report.entity, row.fields.clone());
        match persistence.insert_record(&record, actor) {
            Ok(_) => success += 1,
            Err(e) => errors.push(RowIssue {
                row: row.row_number,
                message: e.to_string(),
            }),
        }
    }

    let batch: ImportBatch = ImportBatch {
        total: report.rows.len(),
        success,
        errors,
    };

    info!(
        entity = report.entity.as_str(),
        total = batch.total,
        success = batch.success,
        failed = batch.errors.len(),
        "bulk import batch submitted"
    );

    Ok(batch)
}

/// Renders row issues for display, capped at [`ERROR_DISPLAY_CAP`]
/// lines with the remainder summarized as a count.
///
/// The full issue list stays in the batch result; only the rendering is
/// capped.
#[must_use]
pub fn display_issues(issues: &[RowIssue]) -> Vec<String> {
    let mut lines: Vec<String> = issues
        .iter()
        .take(ERROR_DISPLAY_CAP)
        .map(|issue| format!("Row {}: {}", issue.row, issue.message))
        .collect();

    if issues.len() > ERROR_DISPLAY_CAP {
        lines.push(format!(
            "... and {} more",
            issues.len() - ERROR_DISPLAY_CAP
        ));
    }

    lines
}
