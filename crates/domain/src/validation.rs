// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-entity column configuration and record field validation.
//!
//! The column lists drive bulk-import validation, history diffing, and
//! the export allow-lists. Field names are the legacy wire names and
//! must not be "translated" during migration.

use crate::date::is_import_date_format;
use crate::error::DomainError;
use crate::types::{EntityKind, FieldValue};
use std::collections::BTreeMap;

/// Required columns per entity kind for bulk import and record creation.
#[must_use]
pub const fn required_columns(entity: EntityKind) -> &'static [&'static str] {
    match entity {
        EntityKind::Mcu => &["full_name", "awal_mcu", "akhir_mcu"],
        EntityKind::Contract => &["full_name", "kontrak_awal", "kontrak_akhir"],
        EntityKind::HseDocument => &["document_name", "awal_berlaku", "akhir_berlaku"],
        EntityKind::IsoDocument => &["document_name", "expiry_date"],
        EntityKind::ManagementDocument => &["document_name"],
    }
}

/// Date-typed columns per entity kind.
///
/// Values in these columns must match `DD/MM/YYYY` or `YYYY-MM-DD` when
/// present.
#[must_use]
pub const fn date_columns(entity: EntityKind) -> &'static [&'static str] {
    match entity {
        EntityKind::Mcu => &["tanggal_lahir", "awal_mcu", "akhir_mcu"],
        EntityKind::Contract => &["tanggal_lahir", "kontrak_awal", "kontrak_akhir"],
        EntityKind::HseDocument => &["awal_berlaku", "akhir_berlaku"],
        EntityKind::IsoDocument => &[
            "issue_date",
            "first_surveillance_date",
            "second_surveillance_date",
            "expiry_date",
        ],
        EntityKind::ManagementDocument => &["issue_date", "expiry_date"],
    }
}

/// The primary expiry-relevant date field per entity kind.
#[must_use]
pub const fn expiry_field(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Mcu => "akhir_mcu",
        EntityKind::Contract => "kontrak_akhir",
        EntityKind::HseDocument => "akhir_berlaku",
        EntityKind::IsoDocument | EntityKind::ManagementDocument => "expiry_date",
    }
}

/// Fields tracked by change-history diffing per entity kind.
#[must_use]
pub const fn tracked_fields(entity: EntityKind) -> &'static [&'static str] {
    match entity {
        EntityKind::Mcu => &[
            "full_name",
            "employee_id",
            "department",
            "tanggal_lahir",
            "awal_mcu",
            "akhir_mcu",
            "hasil_mcu",
        ],
        EntityKind::Contract => &[
            "full_name",
            "employee_id",
            "department",
            "position",
            "no_kontrak",
            "kontrak_awal",
            "kontrak_akhir",
        ],
        EntityKind::HseDocument => &[
            "document_name",
            "document_number",
            "issuer",
            "awal_berlaku",
            "akhir_berlaku",
        ],
        EntityKind::IsoDocument => &[
            "document_name",
            "certificate_number",
            "issuer",
            "issue_date",
            "first_surveillance_date",
            "second_surveillance_date",
            "expiry_date",
        ],
        EntityKind::ManagementDocument => &[
            "document_name",
            "document_number",
            "category",
            "issue_date",
            "expiry_date",
        ],
    }
}

/// Validates a record's field map against its entity kind.
///
/// Checks that every required field is present and non-empty and that
/// every populated date column matches an accepted format. Validation
/// never reaches the persistence layer; callers surface the first error
/// inline.
///
/// # Errors
///
/// Returns the first [`DomainError`] encountered.
pub fn validate_record_fields(
    entity: EntityKind,
    fields: &BTreeMap<String, FieldValue>,
) -> Result<(), DomainError> {
    for required in required_columns(entity) {
        let present: bool = fields.get(*required).is_some_and(|v| !v.is_empty());
        if !present {
            return Err(DomainError::MissingRequiredField {
                field: String::from(*required),
            });
        }
    }

    for column in date_columns(entity) {
        if let Some(FieldValue::Text(value)) = fields.get(*column) {
            let trimmed: &str = value.trim();
            if !trimmed.is_empty() && !is_import_date_format(trimmed) {
                return Err(DomainError::InvalidDateFormat {
                    field: String::from(*column),
                    value: value.clone(),
                });
            }
        }
    }

    Ok(())
}
