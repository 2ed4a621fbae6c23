// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record mutations.
//!
//! Every mutation writes the record row and its change event in one
//! transaction, so history and state can never drift apart.

use diesel::prelude::*;
use diesel::SqliteConnection;
use std::collections::BTreeMap;
use tracing::{debug, info};

use comreg_audit::ChangeAction;
use comreg_domain::{
    AttachmentSlot, EntityKind, FieldValue, Record, validate_record_fields,
};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{change_events, records};
use crate::error::PersistenceError;
use crate::queries::records::get_record;

/// Writes one change event row for a record mutation.
fn record_change_event(
    conn: &mut SqliteConnection,
    record_id: i64,
    entity: EntityKind,
    actor: &str,
    action: ChangeAction,
    before: &BTreeMap<String, FieldValue>,
    after: &BTreeMap<String, FieldValue>,
) -> Result<(), PersistenceError> {
    let before_json: String = serde_json::to_string(before)?;
    let after_json: String = serde_json::to_string(after)?;

    diesel::insert_into(change_events::table)
        .values((
            change_events::record_id.eq(record_id),
            change_events::entity.eq(entity.as_str()),
            change_events::actor.eq(actor),
            change_events::action.eq(action.as_str()),
            change_events::before_json.eq(&before_json),
            change_events::after_json.eq(&after_json),
        ))
        .execute(conn)?;

    Ok(())
}

/// Inserts a new record and its create event.
///
/// Field validation runs here, not only at the API boundary: bulk import
/// submits rows one by one and relies on this insert as the authoritative
/// per-row verdict.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `record` - The record to insert (its `id` is ignored)
/// * `actor` - The operator login performing the insert
///
/// # Returns
///
/// The server-assigned record ID.
///
/// # Errors
///
/// Returns `Validation` if the record's fields violate domain rules, or
/// a database error if the insert fails.
pub fn insert_record(
    conn: &mut SqliteConnection,
    record: &Record,
    actor: &str,
) -> Result<i64, PersistenceError> {
    validate_record_fields(record.entity, &record.fields)
        .map_err(|e| PersistenceError::Validation(e.to_string()))?;

    let fields_json: String = serde_json::to_string(&record.fields)?;
    let attachments_json: String = serde_json::to_string(&record.attachments)?;

    let record_id: i64 = conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(records::table)
            .values((
                records::entity.eq(record.entity.as_str()),
                records::fields_json.eq(&fields_json),
                records::attachments_json.eq(&attachments_json),
                records::modified_by.eq(actor),
            ))
            .execute(conn)?;

        let record_id: i64 = get_last_insert_rowid(conn)?;

        record_change_event(
            conn,
            record_id,
            record.entity,
            actor,
            ChangeAction::Create,
            &BTreeMap::new(),
            &record.fields,
        )?;

        Ok(record_id)
    })?;

    info!(
        "Created {} record with ID: {}",
        record.entity.as_str(),
        record_id
    );
    Ok(record_id)
}

/// Replaces a record's fields and writes its update event.
///
/// The event carries full before/after snapshots; whether anything
/// actually changed is decided at read time by the diff rules.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind the record must belong to
/// * `record_id` - The record ID
/// * `fields` - The complete replacement field map
/// * `actor` - The operator login performing the update
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist under this entity,
/// `Validation` if the new fields violate domain rules, or a database
/// error if the update fails.
pub fn update_record(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    record_id: i64,
    fields: BTreeMap<String, FieldValue>,
    actor: &str,
) -> Result<Record, PersistenceError> {
    let existing: Record = get_record(conn, entity, record_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "{} record with ID {record_id} not found",
            entity.as_str()
        ))
    })?;

    validate_record_fields(entity, &fields)
        .map_err(|e| PersistenceError::Validation(e.to_string()))?;

    let fields_json: String = serde_json::to_string(&fields)?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::update(records::table)
            .filter(records::record_id.eq(record_id))
            .set((
                records::fields_json.eq(&fields_json),
                records::modified_by.eq(actor),
                records::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                    "CURRENT_TIMESTAMP",
                )),
            ))
            .execute(conn)?;

        record_change_event(
            conn,
            record_id,
            entity,
            actor,
            ChangeAction::Update,
            &existing.fields,
            &fields,
        )?;

        Ok(())
    })?;

    debug!("Updated {} record ID: {}", entity.as_str(), record_id);

    get_record(conn, entity, record_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "{} record with ID {record_id} not found",
            entity.as_str()
        ))
    })
}

/// Deletes a record, leaving its history and a final delete event behind.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind the record must belong to
/// * `record_id` - The record ID
/// * `actor` - The operator login performing the delete
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist under this entity, or
/// a database error if the delete fails.
pub fn delete_record(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    record_id: i64,
    actor: &str,
) -> Result<(), PersistenceError> {
    let existing: Record = get_record(conn, entity, record_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "{} record with ID {record_id} not found",
            entity.as_str()
        ))
    })?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        diesel::delete(records::table)
            .filter(records::record_id.eq(record_id))
            .execute(conn)?;

        record_change_event(
            conn,
            record_id,
            entity,
            actor,
            ChangeAction::Delete,
            &existing.fields,
            &BTreeMap::new(),
        )?;

        Ok(())
    })?;

    info!("Deleted {} record ID: {}", entity.as_str(), record_id);
    Ok(())
}

/// Upserts one attachment slot on a record.
///
/// Fields are untouched, so no change event is written; only
/// `modified_by` and `updated_at` move.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `entity` - The entity kind the record must belong to
/// * `record_id` - The record ID
/// * `slot` - The attachment slot to add or replace, matched by name
/// * `actor` - The operator login performing the upload
///
/// # Errors
///
/// Returns `NotFound` if the record does not exist under this entity, or
/// a database error if the update fails.
pub fn set_attachment(
    conn: &mut SqliteConnection,
    entity: EntityKind,
    record_id: i64,
    slot: AttachmentSlot,
    actor: &str,
) -> Result<Record, PersistenceError> {
    let mut existing: Record = get_record(conn, entity, record_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "{} record with ID {record_id} not found",
            entity.as_str()
        ))
    })?;

    match existing.attachments.iter_mut().find(|a| a.slot == slot.slot) {
        Some(current) => *current = slot,
        None => existing.attachments.push(slot),
    }

    let attachments_json: String = serde_json::to_string(&existing.attachments)?;

    diesel::update(records::table)
        .filter(records::record_id.eq(record_id))
        .set((
            records::attachments_json.eq(&attachments_json),
            records::modified_by.eq(actor),
            records::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        ))
        .execute(conn)?;

    get_record(conn, entity, record_id)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "{} record with ID {record_id} not found",
            entity.as_str()
        ))
    })
}
