// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer-token session extraction for the registry's protected routes.
//!
//! Handlers name [`SessionOperator`] as an argument; extraction resolves
//! the presented token against the session store and rejects the request
//! with the registry's JSON error envelope before the handler body runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use comreg_api::{AuthenticatedActor, AuthenticationService};
use comreg_persistence::OperatorData;
use tracing::{debug, warn};

use crate::AppState;

/// An authenticated operator resolved from the `Authorization` header.
///
/// Carries both the authorization-facing actor and the full operator
/// row, so handlers can check permissions and render display names
/// without a second lookup.
///
/// Every rejection is a 401: a missing or malformed header, an unknown
/// or expired token, or a disabled operator account.
pub struct SessionOperator(pub AuthenticatedActor, pub OperatorData);

/// Pulls the Bearer token out of the request headers.
fn bearer_token(parts: &Parts) -> Result<&str, SessionRejection> {
    let header: &str = parts
        .headers
        .get("Authorization")
        .ok_or(SessionRejection::NoToken)?
        .to_str()
        .map_err(|_| SessionRejection::MalformedHeader)?;

    header
        .strip_prefix("Bearer ")
        .ok_or(SessionRejection::MalformedHeader)
}

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(parts).inspect_err(|_| {
            debug!("Request carried no usable session token");
        })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, operator) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Rejected session token");
                SessionRejection::Denied(e.to_string())
            })?;
        drop(persistence);

        debug!(login_name = %operator.login_name, "Resolved operator session");

        Ok(Self(actor, operator))
    }
}

/// Why a request failed session extraction.
#[derive(Debug)]
pub enum SessionRejection {
    /// No `Authorization` header was sent.
    NoToken,
    /// The header was not of the form `Bearer <token>`.
    MalformedHeader,
    /// The token did not resolve to a live, enabled session.
    Denied(String),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::NoToken => String::from("Operator session required"),
            Self::MalformedHeader => {
                String::from("Authorization header must be 'Bearer <token>'")
            }
            Self::Denied(reason) => reason,
        };
        let body = Json(serde_json::json!({ "error": true, "message": message }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
