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

mod auth;
mod error;
mod export;
mod handlers;
mod import;
mod normalize;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{ApiError, AuthError, Severity, translate_domain_error};
pub use export::{export_filename, export_history, export_records, history_export_filename};
pub use handlers::{
    HistoryEntry, ListRecordsResponse, RecordView, create_record, delete_record, get_record,
    list_records, parse_entity, record_history, update_record,
};
pub use import::{
    ERROR_DISPLAY_CAP, ImportBatch, PREVIEW_ROW_CAP, ParsedRow, RowIssue, ValidationReport,
    display_issues, parse_rows, submit_rows, validate_rows,
};
pub use normalize::normalize_list;
