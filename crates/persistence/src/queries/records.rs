// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record and change-history queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use comreg_audit::{ChangeAction, ChangeEvent};
use comreg_domain::{AttachmentSlot, EntityKind, FieldValue, Record};

use crate::diesel_schema::{change_events, records};
use crate::error::PersistenceError;

/// Diesel Queryable struct for record rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = records)]
pub(crate) struct RecordRow {
    pub(crate) record_id: i64,
    pub(crate) entity: String,
    pub(crate) fields_json: String,
    pub(crate) attachments_json: String,
    pub(crate) modified_by: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

/// Diesel Queryable struct for change event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = change_events)]
struct ChangeEventRow {
    actor: String,
    action: String,
    before_json: String,
    after_json: String,
}

/// Reconstructs a domain [`Record`] from a stored row.
pub(crate) fn record_from_row(row: RecordRow) -> Result<Record, PersistenceError> {
    let entity: EntityKind = EntityKind::from_str(&row.entity)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let fields: BTreeMap<String, FieldValue> = serde_json::from_str(&row.fields_json)?;
    let attachments: Vec<AttachmentSlot> = serde_json::from_str(&row.attachments_json)?;

    let mut record: Record = Record::with_id(row.record_id, entity, fields);
    record.attachments = attachments;
    record.modified_by = row.modified_by;
    record.created_at = Some(row.created_at);
    record.updated_at = Some(row.updated_at);
    Ok(record)
}

/// Parses a stored action slug back into a [`ChangeAction`].
fn parse_action(action: &str) -> Result<ChangeAction, PersistenceError> {
    match action {
        "create" => Ok(ChangeAction::Create),
        "update" => Ok(ChangeAction::Update),
        "delete" => Ok(ChangeAction::Delete),
        other => Err(PersistenceError::SerializationError(format!(
            "Unknown change action: {other}"
        ))),
    }
}

/// Retrieves a record by entity kind and ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind the record must belong to
/// * `record_id` - The record ID
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the record is not found.
pub fn get_record(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    record_id: i64,
) -> Result<Option<Record>, PersistenceError> {
    debug!("Looking up {} record ID: {}", entity, record_id);

    let result: Result<RecordRow, diesel::result::Error> = records::table
        .filter(records::record_id.eq(record_id))
        .filter(records::entity.eq(entity.as_str()))
        .select(RecordRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(record_from_row(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists all records of an entity kind, oldest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind to list
///
/// # Errors
///
/// Returns an error if the database query fails or a row cannot be
/// deserialized.
pub fn list_records(
    conn: &mut SqliteConnection,
    entity: EntityKind,
) -> Result<Vec<Record>, PersistenceError> {
    debug!("Listing {} records", entity);

    let rows: Vec<RecordRow> = records::table
        .filter(records::entity.eq(entity.as_str()))
        .order(records::record_id.asc())
        .select(RecordRow::as_select())
        .load(conn)?;

    rows.into_iter().map(record_from_row).collect()
}

/// Retrieves the change history for a record, newest first.
///
/// History survives record deletion, so this returns events even for
/// record IDs that no longer resolve via [`get_record`].
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind
/// * `record_id` - The record ID
///
/// # Errors
///
/// Returns an error if the database query fails or an event cannot be
/// deserialized.
pub fn record_history(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    record_id: i64,
) -> Result<Vec<ChangeEvent>, PersistenceError> {
    debug!("Loading history for {} record ID: {}", entity, record_id);

    let rows: Vec<ChangeEventRow> = change_events::table
        .filter(change_events::entity.eq(entity.as_str()))
        .filter(change_events::record_id.eq(record_id))
        .order(change_events::change_id.desc())
        .select(ChangeEventRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let action: ChangeAction = parse_action(&row.action)?;
            let before: BTreeMap<String, FieldValue> = serde_json::from_str(&row.before_json)?;
            let after: BTreeMap<String, FieldValue> = serde_json::from_str(&row.after_json)?;
            Ok(ChangeEvent::new(row.actor, action, before, after))
        })
        .collect()
}
