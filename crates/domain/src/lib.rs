// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod date;
mod error;
mod expiry;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use date::{
    DayCount, days_until, format_display_date, is_import_date_format, parse_flexible_date,
};
pub use error::DomainError;
pub use expiry::{
    BucketId, Classification, ExpiredCutoff, IsoMilestone, ThresholdRule, ThresholdTable, classify,
    contract_thresholds, hse_document_thresholds, iso_milestone_thresholds, mcu_thresholds,
    threshold_table_for,
};
pub use types::{AttachmentSlot, EntityKind, FieldValue, FileMetadata, Record};
pub use validation::{
    date_columns, expiry_field, required_columns, tracked_fields, validate_record_fields,
};
