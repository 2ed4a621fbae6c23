// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use comreg_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The uploaded CSV is malformed at the file level.
    InvalidCsvFormat {
        /// The reason the CSV was rejected.
        reason: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An export was requested for an entity with no records.
    NoDataToExport {
        /// The entity slug the export was requested for.
        entity: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidCsvFormat { reason } => {
                write!(f, "Invalid CSV format: {reason}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::NoDataToExport { entity } => {
                write!(f, "No data available to export for '{entity}'")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Message severity for user-facing feedback payloads.
///
/// Mirrors the four feedback banners of the frontend; the API reports a
/// severity alongside each message so the client never has to infer it
/// from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation fully succeeded.
    Success,
    /// Neutral information.
    Info,
    /// The operation succeeded with caveats (e.g., partial import).
    Warning,
    /// The operation failed.
    Error,
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::UnknownEntityKind(kind) => ApiError::InvalidInput {
            field: String::from("entity"),
            message: format!("Unknown entity kind '{kind}'"),
        },
        DomainError::MissingRequiredField { field } => ApiError::InvalidInput {
            field: field.clone(),
            message: format!("Required field '{field}' is missing or empty"),
        },
        DomainError::InvalidDateFormat { field, value } => ApiError::InvalidInput {
            field,
            message: format!(
                "Invalid date '{value}' (expected YYYY-MM-DD or DD/MM/YYYY)"
            ),
        },
        DomainError::InvalidNumericValue { field, value } => ApiError::InvalidInput {
            field,
            message: format!("Invalid numeric value '{value}'"),
        },
        DomainError::EmptyFieldName => ApiError::InvalidInput {
            field: String::new(),
            message: String::from("Field name cannot be empty"),
        },
        DomainError::AttachmentMetadataIncomplete { slot } => ApiError::Internal {
            message: format!("Attachment slot '{slot}' has partial file metadata"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err1: ApiError = ApiError::InvalidCsvFormat {
            reason: String::from("Missing required headers: full_name"),
        };
        assert_eq!(
            format!("{err1}"),
            "Invalid CSV format: Missing required headers: full_name"
        );

        let err2: ApiError = ApiError::NoDataToExport {
            entity: String::from("mcu"),
        };
        assert_eq!(format!("{err2}"), "No data available to export for 'mcu'");
    }

    #[test]
    fn test_auth_error_converts_to_api_error() {
        let err: ApiError = AuthError::Unauthorized {
            action: String::from("delete_record"),
            required_role: String::from("Admin"),
        }
        .into();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[test]
    fn test_translate_missing_field() {
        let err: ApiError = translate_domain_error(DomainError::MissingRequiredField {
            field: String::from("full_name"),
        });
        assert!(matches!(err, ApiError::InvalidInput { .. }));
        if let ApiError::InvalidInput { field, message } = err {
            assert_eq!(field, "full_name");
            assert!(message.contains("missing or empty"));
        }
    }

    #[test]
    fn test_translate_invalid_date() {
        let err: ApiError = translate_domain_error(DomainError::InvalidDateFormat {
            field: String::from("akhir_mcu"),
            value: String::from("31-12-2025"),
        });
        if let ApiError::InvalidInput { field, message } = err {
            assert_eq!(field, "akhir_mcu");
            assert!(message.contains("31-12-2025"));
        } else {
            panic!("Expected InvalidInput error");
        }
    }
}
