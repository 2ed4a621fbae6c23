// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Defensive normalization of list-response payloads.
//!
//! Upstream list endpoints answer in three shapes: a bare array,
//! `{"data": [...]}`, or `{"success": true, "data": [...]}`. All three
//! normalize to the same `Vec`; absence of data is an empty list, never
//! an error.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Bare(Vec<T>),
    Enveloped {
        #[allow(dead_code)]
        success: bool,
        data: Vec<T>,
    },
    Wrapped {
        data: Vec<T>,
    },
}

/// Parses a list payload in any of the accepted shapes.
///
/// # Errors
///
/// Returns an error when the body matches none of the shapes.
pub fn normalize_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ApiError> {
    let payload: ListPayload<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Internal {
            message: format!("Unrecognized list payload shape: {e}"),
        })?;

    Ok(match payload {
        ListPayload::Bare(items)
        | ListPayload::Enveloped { data: items, .. }
        | ListPayload::Wrapped { data: items } => items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let items: Vec<i64> = normalize_list("[1, 2, 3]").unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_wrapped_data() {
        let items: Vec<i64> = normalize_list(r#"{"data": [4, 5]}"#).unwrap();
        assert_eq!(items, vec![4, 5]);
    }

    #[test]
    fn test_enveloped_success_data() {
        let items: Vec<i64> =
            normalize_list(r#"{"success": true, "data": [6], "pagination": {"page": 1}}"#)
                .unwrap();
        assert_eq!(items, vec![6]);
    }

    #[test]
    fn test_empty_data_is_not_an_error() {
        let items: Vec<i64> = normalize_list(r#"{"success": true, "data": []}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_unrecognized_shape_is_an_error() {
        let result: Result<Vec<i64>, ApiError> = normalize_list(r#"{"rows": [1]}"#);
        assert!(matches!(result, Err(ApiError::Internal { .. })));
    }
}
