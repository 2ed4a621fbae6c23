// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The entity kind string is not recognized.
    UnknownEntityKind(String),
    /// A required field is missing or empty.
    MissingRequiredField {
        /// The field name.
        field: String,
    },
    /// A date field does not match an accepted format.
    InvalidDateFormat {
        /// The field name.
        field: String,
        /// The rejected value.
        value: String,
    },
    /// A numeric field holds a non-numeric value.
    InvalidNumericValue {
        /// The field name.
        field: String,
        /// The rejected value.
        value: String,
    },
    /// A field name is empty.
    EmptyFieldName,
    /// An attachment slot has partial file metadata.
    AttachmentMetadataIncomplete {
        /// The slot name.
        slot: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntityKind(kind) => write!(f, "Unknown entity kind: {kind}"),
            Self::MissingRequiredField { field } => {
                write!(f, "Required field '{field}' is missing or empty")
            }
            Self::InvalidDateFormat { field, value } => {
                write!(
                    f,
                    "Field '{field}' has invalid date '{value}' (expected DD/MM/YYYY or YYYY-MM-DD)"
                )
            }
            Self::InvalidNumericValue { field, value } => {
                write!(f, "Field '{field}' has non-numeric value '{value}'")
            }
            Self::EmptyFieldName => write!(f, "Field name cannot be empty"),
            Self::AttachmentMetadataIncomplete { slot } => {
                write!(
                    f,
                    "Attachment slot '{slot}' has partial file metadata (must be all-present or all-absent)"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
