// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Compliance Record Registry.
//!
//! This crate stores compliance records, their change history, operator
//! accounts, and sessions. It is built on Diesel over `SQLite`.
//!
//! `SQLite` is the only backend:
//! - In-memory databases back unit and integration tests
//! - File-based databases (with WAL mode) back deployments
//!
//! Every record mutation writes the record row and one change event in
//! the same transaction, so the history a reader derives diffs from can
//! never disagree with the stored state.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use comreg_audit::ChangeEvent;
use comreg_domain::{AttachmentSlot, EntityKind, FieldValue, Record};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{OperatorData, SessionData};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// concurrently-running tests never share a database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias kept for call sites that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter for records, change history, operators, and sessions.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_test_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Inserts a new record and its create event.
    ///
    /// Fields are validated against the record's entity kind before
    /// anything is written; a rejected row leaves no trace.
    ///
    /// # Arguments
    ///
    /// * `record` - The record to insert (its `id` is ignored)
    /// * `actor` - The operator login performing the insert
    ///
    /// # Returns
    ///
    /// The server-assigned record ID.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the fields violate domain rules, or a
    /// database error if the insert fails.
    pub fn insert_record(
        &mut self,
        record: &Record,
        actor: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::insert_record(&mut self.conn, record, actor)
    }

    /// Replaces a record's fields and writes its update event.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind the record must belong to
    /// * `record_id` - The record ID
    /// * `fields` - The complete replacement field map
    /// * `actor` - The operator login performing the update
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record does not exist under this entity,
    /// or `Validation` if the new fields violate domain rules.
    pub fn update_record(
        &mut self,
        entity: EntityKind,
        record_id: i64,
        fields: BTreeMap<String, FieldValue>,
        actor: &str,
    ) -> Result<Record, PersistenceError> {
        mutations::update_record(&mut self.conn, entity, record_id, fields, actor)
    }

    /// Deletes a record, leaving its history and a final delete event.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind the record must belong to
    /// * `record_id` - The record ID
    /// * `actor` - The operator login performing the delete
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record does not exist under this entity.
    pub fn delete_record(
        &mut self,
        entity: EntityKind,
        record_id: i64,
        actor: &str,
    ) -> Result<(), PersistenceError> {
        mutations::delete_record(&mut self.conn, entity, record_id, actor)
    }

    /// Upserts one attachment slot on a record.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind the record must belong to
    /// * `record_id` - The record ID
    /// * `slot` - The attachment slot to add or replace, matched by name
    /// * `actor` - The operator login performing the upload
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record does not exist under this entity.
    pub fn set_attachment(
        &mut self,
        entity: EntityKind,
        record_id: i64,
        slot: AttachmentSlot,
        actor: &str,
    ) -> Result<Record, PersistenceError> {
        mutations::set_attachment(&mut self.conn, entity, record_id, slot, actor)
    }

    /// Retrieves a record by entity kind and ID.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind the record must belong to
    /// * `record_id` - The record ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    /// Returns `Ok(None)` if the record is not found.
    pub fn get_record(
        &mut self,
        entity: EntityKind,
        record_id: i64,
    ) -> Result<Option<Record>, PersistenceError> {
        queries::get_record(&mut self.conn, entity, record_id)
    }

    /// Lists all records of an entity kind, oldest first.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind to list
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_records(
        &mut self,
        entity: EntityKind,
    ) -> Result<Vec<Record>, PersistenceError> {
        queries::list_records(&mut self.conn, entity)
    }

    /// Retrieves the change history for a record, newest first.
    ///
    /// History survives record deletion.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity kind
    /// * `record_id` - The record ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn record_history(
        &mut self,
        entity: EntityKind,
        record_id: i64,
    ) -> Result<Vec<ChangeEvent>, PersistenceError> {
        queries::record_history(&mut self.conn, entity, record_id)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Creates a new operator.
    ///
    /// # Arguments
    ///
    /// * `login_name` - The login name (will be normalized)
    /// * `display_name` - The display name
    /// * `password` - The plain-text password (will be hashed)
    /// * `role` - The role (Admin or Staff)
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be created.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(&mut self.conn, login_name, display_name, password, role)
    }

    /// Retrieves an operator by login name.
    ///
    /// # Arguments
    ///
    /// * `login_name` - The login name to search for
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an operator by ID.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// Lists all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_operators(&mut self) -> Result<Vec<OperatorData>, PersistenceError> {
        queries::operators::list_operators(&mut self.conn)
    }

    /// Updates the last login timestamp for an operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id)
    }

    /// Disables an operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn disable_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::disable_operator(&mut self.conn, operator_id)
    }

    /// Re-enables a disabled operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn enable_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::enable_operator(&mut self.conn, operator_id)
    }

    /// Deletes an operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    ///
    /// # Errors
    ///
    /// Returns an error if the operator doesn't exist.
    pub fn delete_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::delete_operator(&mut self.conn, operator_id)
    }

    /// Updates an operator's password.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID
    /// * `new_password` - The new password (will be hashed)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_password(
        &mut self,
        operator_id: i64,
        new_password: &str,
    ) -> Result<(), PersistenceError> {
        mutations::operators::update_password(&mut self.conn, operator_id, new_password)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a new session for an operator.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The unique session token
    /// * `operator_id` - The operator ID
    /// * `expires_at` - The expiration timestamp (ISO 8601 format)
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        operator_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(&mut self.conn, session_token, operator_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The session token
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The session token to delete
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        mutations::operators::delete_expired_sessions(&mut self.conn)
    }

    /// Deletes all sessions for a specific operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator ID whose sessions should be deleted
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_sessions_for_operator(
        &mut self,
        operator_id: i64,
    ) -> Result<usize, PersistenceError> {
        mutations::operators::delete_sessions_for_operator(&mut self.conn, operator_id)
    }
}
