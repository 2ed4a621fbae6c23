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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use comreg_api::{
    ApiError, AuthError, AuthenticatedActor, AuthenticationService, AuthorizationService,
    HistoryEntry, ImportBatch, ListRecordsResponse, RecordView, Role, Severity, ValidationReport,
    display_issues, export_filename, export_history, export_records, history_export_filename,
    parse_entity, parse_rows, submit_rows, validate_rows,
};
use comreg_domain::{AttachmentSlot, BucketId, EntityKind, FieldValue, FileMetadata, Record};
use comreg_persistence::{OperatorData, PersistenceError, SqlitePersistence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

mod session;
mod upload;

use session::SessionOperator;
use upload::UploadError;

/// Compliance Record Registry - HTTP server for record tracking and expiry monitoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Directory where attachment files are stored
    #[arg(short, long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Create an operator account with this login name, then exit.
    ///
    /// Requires `--operator-password`. Used to bootstrap the first admin
    /// account; there are no built-in credentials.
    #[arg(long)]
    create_operator: Option<String>,

    /// Display name for the operator created via `--create-operator`
    #[arg(long, default_value = "Operator")]
    operator_display_name: String,

    /// Password for the operator created via `--create-operator`
    #[arg(long)]
    operator_password: Option<String>,

    /// Role for the operator created via `--create-operator` (Admin or Staff)
    #[arg(long, default_value = "Admin")]
    operator_role: String,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access, plus the attachment storage root.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for records, operators, and sessions.
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// The root directory for stored attachment files.
    upload_dir: Arc<PathBuf>,
}

/// API request for logging in.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoginRequest {
    /// The operator login name.
    login_name: String,
    /// The operator password.
    password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoginResponse {
    /// Success indicator.
    success: bool,
    /// The session token to present as `Authorization: Bearer <token>`.
    token: String,
    /// The operator's display name.
    display_name: String,
    /// The operator's role.
    role: String,
}

/// API request body for creating or updating a record.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RecordWriteRequest {
    /// The record field map.
    fields: BTreeMap<String, FieldValue>,
}

/// Query parameters for listing records.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Free-text filter over searchable values.
    #[serde(default)]
    search: String,
    /// Optional bucket filter.
    bucket: Option<BucketId>,
}

/// API response for write operations without a record payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Success indicator.
    success: bool,
    /// A human-readable outcome message.
    message: String,
}

/// One preview row of a parsed import file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImportPreviewRow {
    /// The 1-based data row number.
    row: usize,
    /// The parsed field map.
    fields: BTreeMap<String, FieldValue>,
}

/// API response for import validation.
#[derive(Debug, Clone, Serialize)]
struct ValidateImportResponse {
    /// The entity slug the file was validated against.
    entity: String,
    /// The total number of data rows in the file.
    total: usize,
    /// The first rows of the batch, capped for display.
    preview: Vec<ImportPreviewRow>,
    /// Rendered per-row warnings.
    warnings: Vec<String>,
    /// The severity classification of the validation outcome.
    severity: Severity,
}

/// API response for a submitted import batch.
#[derive(Debug, Clone, Serialize)]
struct ImportResponse {
    /// Whether every row was persisted.
    success: bool,
    /// The total number of rows in the batch.
    total: usize,
    /// The number of rows persisted.
    imported: usize,
    /// Rendered per-row failure messages.
    errors: Vec<String>,
    /// The severity classification of the batch outcome.
    severity: Severity,
}

/// API request for creating an operator.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateOperatorRequest {
    /// The login name.
    login_name: String,
    /// The display name.
    display_name: String,
    /// The plaintext password to hash and store.
    password: String,
    /// The role: "Admin" or "Staff".
    role: String,
}

/// API request for changing an operator's password.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ChangePasswordRequest {
    /// The new plaintext password.
    new_password: String,
}

/// Operator account data without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OperatorView {
    /// The operator ID.
    operator_id: i64,
    /// The login name.
    login_name: String,
    /// The display name.
    display_name: String,
    /// The role.
    role: String,
    /// Whether the account is disabled.
    is_disabled: bool,
    /// Creation timestamp.
    created_at: String,
    /// Last login timestamp, if the operator has ever logged in.
    last_login_at: Option<String>,
}

impl From<OperatorData> for OperatorView {
    fn from(operator: OperatorData) -> Self {
        Self {
            operator_id: operator.operator_id,
            login_name: operator.login_name,
            display_name: operator.display_name,
            role: operator.role,
            is_disabled: operator.is_disabled,
            created_at: operator.created_at,
            last_login_at: operator.last_login_at,
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidCsvFormat { .. } | ApiError::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } | ApiError::NoDataToExport { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        let status: StatusCode = match err {
            AuthError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for HttpError {
    fn from(err: PersistenceError) -> Self {
        error!(error = %err, "Persistence error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Persistence error: {err}"),
        }
    }
}

impl From<UploadError> for HttpError {
    fn from(err: UploadError) -> Self {
        let response: Response = err.into_response();
        Self {
            status: response.status(),
            message: String::from("Attachment storage failed"),
        }
    }
}

/// The date used for all expiry projections in request handling.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Converts a role to its stored text form.
const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::Staff => "Staff",
    }
}

/// Extracts the Bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, HttpError> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Missing or invalid Authorization header"),
        })
}

/// Reads an uploaded file (and optional "value" text part) out of a
/// multipart body.
///
/// Returns the text value and, if present, `(filename, content_type, data)`.
async fn read_upload_parts(
    multipart: &mut Multipart,
) -> Result<(Option<String>, Option<(String, String, Vec<u8>)>), HttpError> {
    let mut value: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: format!("Invalid multipart payload: {e}"),
    })? {
        match field.name() {
            Some("value") => {
                let text: String = field.text().await.map_err(|e| HttpError {
                    status: StatusCode::BAD_REQUEST,
                    message: format!("Invalid multipart payload: {e}"),
                })?;
                value = Some(text);
            }
            Some("file") => {
                let filename: String = field.file_name().unwrap_or("upload").to_string();
                let content_type: String = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| HttpError {
                    status: StatusCode::BAD_REQUEST,
                    message: format!("Invalid multipart payload: {e}"),
                })?;
                file = Some((filename, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok((value, file))
}

/// Reads the CSV content of the "file" part of a multipart body.
async fn read_csv_upload(multipart: &mut Multipart) -> Result<String, HttpError> {
    let (_, file) = read_upload_parts(multipart).await?;
    let (_, _, data) = file.ok_or_else(|| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: String::from("Missing 'file' field in multipart body"),
    })?;

    String::from_utf8(data).map_err(|_| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: String::from("Uploaded file is not valid UTF-8 text"),
    })
}

/// Builds a CSV download response with the standard headers.
fn csv_download(filename: &str, content: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, String::from("text/csv")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        content,
    )
        .into_response()
}

/// Handler for POST /api/login endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let (token, actor, operator): (String, AuthenticatedActor, OperatorData) =
        AuthenticationService::login(&mut persistence, &req.login_name, &req.password)?;
    drop(persistence);

    info!(login_name = %operator.login_name, "Operator logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        display_name: operator.display_name,
        role: String::from(role_label(actor.role)),
    }))
}

/// Handler for POST /api/logout endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<WriteResponse>, HttpError> {
    let token: &str = bearer_token(&headers)?;

    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, token)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/api/records/{entity}` endpoint.
///
/// Lists records with optional text and bucket filtering. An empty table
/// is an empty listing, never an error.
async fn handle_list_records(
    AxumState(app_state): AxumState<AppState>,
    Path(entity_slug): Path<String>,
    Query(query): Query<ListQuery>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Json<ListRecordsResponse>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ListRecordsResponse = comreg_api::list_records(
        &mut persistence,
        entity,
        &query.search,
        query.bucket,
        today(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/api/records/{entity}` endpoint.
async fn handle_create_record(
    AxumState(app_state): AxumState<AppState>,
    Path(entity_slug): Path<String>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<RecordWriteRequest>,
) -> Result<Json<RecordView>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    info!(
        actor = %actor.id,
        entity = entity.as_str(),
        "Handling create_record request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let view: RecordView =
        comreg_api::create_record(&mut persistence, &actor, entity, req.fields, today())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/api/records/{entity}/{id}` endpoint.
async fn handle_get_record(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id)): Path<(String, i64)>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Json<RecordView>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let mut persistence = app_state.persistence.lock().await;
    let view: RecordView = comreg_api::get_record(&mut persistence, entity, id, today())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for PUT `/api/records/{entity}/{id}` endpoint.
async fn handle_update_record(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id)): Path<(String, i64)>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<RecordWriteRequest>,
) -> Result<Json<RecordView>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    info!(
        actor = %actor.id,
        entity = entity.as_str(),
        record_id = id,
        "Handling update_record request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let view: RecordView =
        comreg_api::update_record(&mut persistence, &actor, entity, id, req.fields, today())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for DELETE `/api/records/{entity}/{id}` endpoint.
async fn handle_delete_record(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id)): Path<(String, i64)>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<WriteResponse>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    info!(
        actor = %actor.id,
        entity = entity.as_str(),
        record_id = id,
        "Handling delete_record request"
    );

    let mut persistence = app_state.persistence.lock().await;
    comreg_api::delete_record(&mut persistence, &actor, entity, id)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: format!("Deleted record {id}"),
    }))
}

/// Handler for GET `/api/records/{entity}/{id}/history` endpoint.
async fn handle_record_history(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id)): Path<(String, i64)>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Json<Vec<HistoryEntry>>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let mut persistence = app_state.persistence.lock().await;
    let entries: Vec<HistoryEntry> = comreg_api::record_history(&mut persistence, entity, id)?;
    drop(persistence);

    Ok(Json(entries))
}

/// Handler for GET `/api/records/{entity}/export` endpoint.
///
/// Streams the full table as a CSV download.
async fn handle_export_records(
    AxumState(app_state): AxumState<AppState>,
    Path(entity_slug): Path<String>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Response, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let mut persistence = app_state.persistence.lock().await;
    let records: Vec<Record> = persistence.list_records(entity)?;
    drop(persistence);

    let csv: String = export_records(&records, entity, today())?;

    Ok(csv_download(&export_filename(entity), csv))
}

/// Handler for GET `/api/records/{entity}/{id}/history/export` endpoint.
///
/// History outlives its record row, so a deleted record's trail still
/// exports; the filename falls back to the record ID.
async fn handle_export_history(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id)): Path<(String, i64)>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Response, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let mut persistence = app_state.persistence.lock().await;
    let record: Option<Record> = persistence.get_record(entity, id)?;
    let events = persistence.record_history(entity, id)?;
    drop(persistence);

    let record_name: String = record
        .as_ref()
        .and_then(|r| r.field_text("full_name"))
        .unwrap_or_else(|| id.to_string());
    let csv: String = export_history(&events, entity)?;

    Ok(csv_download(
        &history_export_filename(entity, &record_name),
        csv,
    ))
}

/// Handler for POST `/api/records/{entity}/import/validate` endpoint.
///
/// Parses and validates an uploaded CSV without persisting anything.
async fn handle_validate_import(
    Path(entity_slug): Path<String>,
    SessionOperator(actor, _): SessionOperator,
    mut multipart: Multipart,
) -> Result<Json<ValidateImportResponse>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    AuthorizationService::authorize_import(&actor)?;

    let csv_content: String = read_csv_upload(&mut multipart).await?;
    let rows = parse_rows(&csv_content, entity)?;
    let report: ValidationReport = validate_rows(rows, entity);

    let severity: Severity = if report.warnings.is_empty() {
        Severity::Success
    } else {
        Severity::Warning
    };

    Ok(Json(ValidateImportResponse {
        entity: String::from(entity.as_str()),
        total: report.rows.len(),
        preview: report
            .preview()
            .iter()
            .map(|row| ImportPreviewRow {
                row: row.row_number,
                fields: row.fields.clone(),
            })
            .collect(),
        warnings: display_issues(&report.warnings),
        severity,
    }))
}

/// Handler for POST `/api/records/{entity}/import` endpoint.
///
/// Parses, validates, and persists an uploaded CSV. Row failures never
/// abort the batch; the response reports the partial outcome.
async fn handle_import_records(
    AxumState(app_state): AxumState<AppState>,
    Path(entity_slug): Path<String>,
    SessionOperator(actor, _): SessionOperator,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    AuthorizationService::authorize_import(&actor)?;

    let csv_content: String = read_csv_upload(&mut multipart).await?;
    let rows = parse_rows(&csv_content, entity)?;
    let report: ValidationReport = validate_rows(rows, entity);

    let mut persistence = app_state.persistence.lock().await;
    let batch: ImportBatch = submit_rows(&mut persistence, &report, &actor.id)?;
    drop(persistence);

    Ok(Json(ImportResponse {
        success: batch.errors.is_empty(),
        total: batch.total,
        imported: batch.success,
        errors: display_issues(&batch.errors),
        severity: batch.severity(),
    }))
}

/// Handler for POST `/api/records/{entity}/{id}/attachments/{slot}` endpoint.
///
/// Stores the uploaded file and binds it to the record's slot. The
/// optional "value" part carries the slot's textual identifier.
async fn handle_upload_attachment(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, id, slot)): Path<(String, i64, String)>,
    SessionOperator(actor, _): SessionOperator,
    mut multipart: Multipart,
) -> Result<Json<RecordView>, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;
    AuthorizationService::authorize_write_record(&actor)?;

    let (value, file) = read_upload_parts(&mut multipart).await?;
    let (filename, content_type, data) = file.ok_or_else(|| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: String::from("Missing 'file' field in multipart body"),
    })?;

    let metadata: FileMetadata = upload::store_attachment(
        &app_state.upload_dir,
        entity,
        &slot,
        &filename,
        &content_type,
        &data,
    )
    .await?;

    let attachment: AttachmentSlot = AttachmentSlot::with_file(slot, value, metadata);

    let mut persistence = app_state.persistence.lock().await;
    persistence.set_attachment(entity, id, attachment, &actor.id)?;
    let view: RecordView = comreg_api::get_record(&mut persistence, entity, id, today())?;
    drop(persistence);

    Ok(Json(view))
}

/// Handler for GET `/api/files/{entity}/{slot}/{filename}` endpoint.
async fn handle_download_attachment(
    AxumState(app_state): AxumState<AppState>,
    Path((entity_slug, slot, filename)): Path<(String, String, String)>,
    SessionOperator(_, _): SessionOperator,
) -> Result<Response, HttpError> {
    let entity: EntityKind = parse_entity(&entity_slug)?;

    let data: Vec<u8> =
        upload::read_attachment(&app_state.upload_dir, entity, &slot, &filename).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                String::from("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response())
}

/// Handler for POST /api/operators endpoint.
async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> Result<Json<OperatorView>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    if req.role != "Admin" && req.role != "Staff" {
        return Err(HttpError {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid role: '{}'. Must be 'Admin' or 'Staff'", req.role),
        });
    }

    let mut persistence = app_state.persistence.lock().await;
    let operator_id: i64 = persistence.create_operator(
        &req.login_name,
        &req.display_name,
        &req.password,
        &req.role,
    )?;
    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)?
        .ok_or_else(|| HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::from("Operator vanished after creation"),
        })?;
    drop(persistence);

    info!(
        actor = %actor.id,
        login_name = %operator.login_name,
        role = %operator.role,
        "Created operator account"
    );

    Ok(Json(OperatorView::from(operator)))
}

/// Handler for GET /api/operators endpoint.
async fn handle_list_operators(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<Vec<OperatorView>>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    let mut persistence = app_state.persistence.lock().await;
    let operators: Vec<OperatorData> = persistence.list_operators()?;
    drop(persistence);

    Ok(Json(operators.into_iter().map(OperatorView::from).collect()))
}

/// Handler for POST `/api/operators/{id}/disable` endpoint.
async fn handle_disable_operator(
    AxumState(app_state): AxumState<AppState>,
    Path(operator_id): Path<i64>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<WriteResponse>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    let mut persistence = app_state.persistence.lock().await;
    persistence.disable_operator(operator_id)?;
    let revoked: usize = persistence.delete_sessions_for_operator(operator_id)?;
    drop(persistence);

    info!(
        actor = %actor.id,
        operator_id,
        revoked_sessions = revoked,
        "Disabled operator account"
    );

    Ok(Json(WriteResponse {
        success: true,
        message: format!("Disabled operator {operator_id}"),
    }))
}

/// Handler for POST `/api/operators/{id}/enable` endpoint.
async fn handle_enable_operator(
    AxumState(app_state): AxumState<AppState>,
    Path(operator_id): Path<i64>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<WriteResponse>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    let mut persistence = app_state.persistence.lock().await;
    persistence.enable_operator(operator_id)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: format!("Enabled operator {operator_id}"),
    }))
}

/// Handler for PUT `/api/operators/{id}/password` endpoint.
///
/// Existing sessions for the operator are revoked.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    Path(operator_id): Path<i64>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    let mut persistence = app_state.persistence.lock().await;
    persistence.update_password(operator_id, &req.new_password)?;
    persistence.delete_sessions_for_operator(operator_id)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: format!("Password updated for operator {operator_id}"),
    }))
}

/// Handler for DELETE `/api/operators/{id}` endpoint.
async fn handle_delete_operator(
    AxumState(app_state): AxumState<AppState>,
    Path(operator_id): Path<i64>,
    SessionOperator(actor, _): SessionOperator,
) -> Result<Json<WriteResponse>, HttpError> {
    AuthorizationService::authorize_manage_operators(&actor)?;

    let mut persistence = app_state.persistence.lock().await;
    persistence
        .delete_operator(operator_id)
        .map_err(|e| match e {
            PersistenceError::OperatorNotFound(message) => HttpError {
                status: StatusCode::NOT_FOUND,
                message,
            },
            other => HttpError::from(other),
        })?;
    drop(persistence);

    info!(actor = %actor.id, operator_id, "Deleted operator account");

    Ok(Json(WriteResponse {
        success: true,
        message: format!("Deleted operator {operator_id}"),
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(handle_login))
        .route("/api/logout", post(handle_logout))
        .route(
            "/api/records/{entity}",
            get(handle_list_records).post(handle_create_record),
        )
        .route(
            "/api/records/{entity}/{id}",
            get(handle_get_record)
                .put(handle_update_record)
                .delete(handle_delete_record),
        )
        .route(
            "/api/records/{entity}/{id}/history",
            get(handle_record_history),
        )
        .route(
            "/api/records/{entity}/{id}/history/export",
            get(handle_export_history),
        )
        .route("/api/records/{entity}/export", get(handle_export_records))
        .route(
            "/api/records/{entity}/import/validate",
            post(handle_validate_import),
        )
        .route("/api/records/{entity}/import", post(handle_import_records))
        .route(
            "/api/records/{entity}/{id}/attachments/{slot}",
            post(handle_upload_attachment),
        )
        .route(
            "/api/files/{entity}/{slot}/{filename}",
            get(handle_download_attachment),
        )
        .route(
            "/api/operators",
            get(handle_list_operators).post(handle_create_operator),
        )
        .route(
            "/api/operators/{id}/disable",
            post(handle_disable_operator),
        )
        .route("/api/operators/{id}/enable", post(handle_enable_operator))
        .route("/api/operators/{id}/password", put(handle_change_password))
        .route("/api/operators/{id}", delete(handle_delete_operator))
        .layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Compliance Record Registry server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    // Bootstrap mode: create an operator account, then exit.
    if let Some(login_name) = &args.create_operator {
        let password: &String = args
            .operator_password
            .as_ref()
            .ok_or("--create-operator requires --operator-password")?;
        if args.operator_role != "Admin" && args.operator_role != "Staff" {
            return Err("--operator-role must be 'Admin' or 'Staff'".into());
        }

        let operator_id: i64 = persistence.create_operator(
            login_name,
            &args.operator_display_name,
            password,
            &args.operator_role,
        )?;
        info!(
            operator_id,
            login_name = %login_name.to_uppercase(),
            role = %args.operator_role,
            "Created operator account"
        );
        return Ok(());
    }

    let purged: usize = persistence.delete_expired_sessions()?;
    if purged > 0 {
        info!(purged, "Purged expired sessions");
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        upload_dir: Arc::new(args.upload_dir.clone()),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
