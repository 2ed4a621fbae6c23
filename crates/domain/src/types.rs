// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The kind of compliance record an entity represents.
///
/// Each kind carries its own expiry threshold table and import/export
/// column configuration. The tables are intentionally NOT uniform across
/// kinds; see the expiry module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Employee medical check-up record.
    Mcu,
    /// Employee work contract.
    Contract,
    /// Health, Safety, Environment compliance document.
    HseDocument,
    /// ISO certification document with surveillance milestones.
    IsoDocument,
    /// Generic management document.
    ManagementDocument,
}

impl EntityKind {
    /// Converts this entity kind to its URL/storage slug.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mcu => "mcu",
            Self::Contract => "contract",
            Self::HseDocument => "hse",
            Self::IsoDocument => "iso",
            Self::ManagementDocument => "management",
        }
    }

    /// Returns every entity kind.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Mcu,
            Self::Contract,
            Self::HseDocument,
            Self::IsoDocument,
            Self::ManagementDocument,
        ]
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcu" => Ok(Self::Mcu),
            "contract" => Ok(Self::Contract),
            "hse" => Ok(Self::HseDocument),
            "iso" => Ok(Self::IsoDocument),
            "management" => Ok(Self::ManagementDocument),
            _ => Err(DomainError::UnknownEntityKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single field value on a record.
///
/// Records are schema-light: a field is text, a number, or null. The
/// on-wire JSON representation is the bare value (untagged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A textual value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// An explicit null.
    Null,
}

impl FieldValue {
    /// Returns the textual content if this value is non-null.
    ///
    /// Numbers are rendered with their shortest display form.
    #[must_use]
    pub fn as_display(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Null => None,
        }
    }

    /// Returns true if the value is null or an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
            Self::Null => true,
        }
    }
}

/// Renders a float without a trailing `.0` for whole numbers.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Stored file metadata for an attachment slot.
///
/// All four fields are populated together; a slot without a file carries
/// no `FileMetadata` at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// The stored (generated) filename.
    pub filename: String,
    /// The storage path relative to the upload root.
    pub filepath: String,
    /// The MIME type recorded at upload time.
    pub mimetype: String,
    /// The file size in bytes.
    pub filesize: i64,
}

impl FileMetadata {
    /// Creates new `FileMetadata`.
    #[must_use]
    pub const fn new(filename: String, filepath: String, mimetype: String, filesize: i64) -> Self {
        Self {
            filename,
            filepath,
            mimetype,
            filesize,
        }
    }

    /// Builds metadata from individually-nullable columns.
    ///
    /// # Errors
    ///
    /// Returns an error if only some of the four columns are populated,
    /// which violates the all-or-none attachment invariant.
    pub fn from_columns(
        slot: &str,
        filename: Option<String>,
        filepath: Option<String>,
        mimetype: Option<String>,
        filesize: Option<i64>,
    ) -> Result<Option<Self>, DomainError> {
        match (filename, filepath, mimetype, filesize) {
            (None, None, None, None) => Ok(None),
            (Some(filename), Some(filepath), Some(mimetype), Some(filesize)) => {
                Ok(Some(Self::new(filename, filepath, mimetype, filesize)))
            }
            _ => Err(DomainError::AttachmentMetadataIncomplete {
                slot: slot.to_string(),
            }),
        }
    }
}

/// A logical document-upload field on a record (e.g., KTP, BPJS).
///
/// The slot may carry a textual identifier independently of whether a
/// file has been uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSlot {
    /// The slot name (e.g., "ktp", "bpjs_kesehatan").
    pub slot: String,
    /// Optional textual identifier entered for this slot.
    pub value: Option<String>,
    /// File metadata, present only when a file was uploaded.
    pub file: Option<FileMetadata>,
}

impl AttachmentSlot {
    /// Creates a slot with no uploaded file.
    #[must_use]
    pub const fn new(slot: String, value: Option<String>) -> Self {
        Self {
            slot,
            value,
            file: None,
        }
    }

    /// Creates a slot with an uploaded file.
    #[must_use]
    pub const fn with_file(slot: String, value: Option<String>, file: FileMetadata) -> Self {
        Self {
            slot,
            value,
            file: Some(file),
        }
    }

    /// Returns whether a file is attached to this slot.
    #[must_use]
    pub const fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

/// A generic compliance record.
///
/// A record is a mapping from field name to value plus attachment slots.
/// The `id` is server-assigned and immutable; `modified_by` and the
/// timestamps are populated by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The server-assigned identifier. `None` before first persistence.
    pub id: Option<i64>,
    /// The entity kind of this record.
    pub entity: EntityKind,
    /// The field map. Ordered for deterministic serialization and diffing.
    pub fields: BTreeMap<String, FieldValue>,
    /// Attachment slots.
    pub attachments: Vec<AttachmentSlot>,
    /// The operator who last modified this record (persistence-assigned).
    pub modified_by: Option<String>,
    /// Creation timestamp (persistence-assigned, ISO 8601).
    pub created_at: Option<String>,
    /// Last-update timestamp (persistence-assigned, ISO 8601).
    pub updated_at: Option<String>,
}

impl Record {
    /// Creates a new, unpersisted record.
    #[must_use]
    pub const fn new(entity: EntityKind, fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            id: None,
            entity,
            fields,
            attachments: Vec::new(),
            modified_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Creates a record with an existing persisted ID.
    #[must_use]
    pub const fn with_id(
        id: i64,
        entity: EntityKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            id: Some(id),
            entity,
            fields,
            attachments: Vec::new(),
            modified_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns a field's display text, or `None` for null/missing fields.
    #[must_use]
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(FieldValue::as_display)
    }

    /// Iterates the display text of every non-null field value plus every
    /// attachment slot identifier.
    ///
    /// This is the haystack for the "search everything" filter semantics.
    pub fn searchable_values(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .values()
            .filter_map(FieldValue::as_display)
            .chain(self.attachments.iter().filter_map(|a| a.value.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in EntityKind::all() {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_entity_kind_unknown() {
        let result: Result<EntityKind, DomainError> = "payroll".parse();
        assert_eq!(
            result,
            Err(DomainError::UnknownEntityKind(String::from("payroll")))
        );
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(
            FieldValue::Text(String::from("A1")).as_display(),
            Some(String::from("A1"))
        );
        assert_eq!(FieldValue::Number(42.0).as_display(), Some(String::from("42")));
        assert_eq!(FieldValue::Number(2.5).as_display(), Some(String::from("2.5")));
        assert_eq!(FieldValue::Null.as_display(), None);
    }

    #[test]
    fn test_file_metadata_all_or_none() {
        let none = FileMetadata::from_columns("ktp", None, None, None, None).unwrap();
        assert!(none.is_none());

        let all = FileMetadata::from_columns(
            "ktp",
            Some(String::from("a.pdf")),
            Some(String::from("ktp/a.pdf")),
            Some(String::from("application/pdf")),
            Some(1024),
        )
        .unwrap();
        assert!(all.is_some());

        let partial = FileMetadata::from_columns(
            "ktp",
            Some(String::from("a.pdf")),
            None,
            Some(String::from("application/pdf")),
            Some(1024),
        );
        assert_eq!(
            partial,
            Err(DomainError::AttachmentMetadataIncomplete {
                slot: String::from("ktp")
            })
        );
    }

    #[test]
    fn test_searchable_values_skip_nulls() {
        let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
        fields.insert(String::from("full_name"), FieldValue::Text(String::from("Budi")));
        fields.insert(String::from("notes"), FieldValue::Null);
        let mut record: Record = Record::new(EntityKind::Mcu, fields);
        record
            .attachments
            .push(AttachmentSlot::new(String::from("ktp"), Some(String::from("327001"))));

        let values: Vec<String> = record.searchable_values().collect();
        assert_eq!(values, vec![String::from("Budi"), String::from("327001")]);
    }
}
