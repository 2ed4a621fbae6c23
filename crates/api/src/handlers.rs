// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record CRUD, listing, and history operations at the API boundary.
//!
//! Each operation enforces authorization, validates input against the
//! domain rules, delegates to persistence, and translates every failure
//! into an [`ApiError`]. Domain and persistence errors never leak
//! through this boundary.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use comreg::{MilestoneProjection, RecordProjection, bucket_counts, record_buckets, visible};
use comreg_audit::ChangeEvent;
use comreg_domain::{
    BucketId, EntityKind, FieldValue, Record, tracked_fields, validate_record_fields,
};
use comreg_persistence::{PersistenceError, SqlitePersistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error};

/// A record together with its derived expiry view.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecordView {
    /// The stored record.
    pub record: Record,
    /// The derived bucket/status projection.
    pub projection: RecordProjection,
    /// Per-milestone projections; empty for non-ISO entities.
    pub milestones: Vec<MilestoneProjection>,
}

/// API response for a record listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ListRecordsResponse {
    /// The entity slug.
    pub entity: String,
    /// The visible records after bucket and text filtering.
    pub records: Vec<RecordView>,
    /// Bucket tallies over the FULL snapshot, not the filtered subset.
    pub counts: BTreeMap<BucketId, usize>,
    /// The size of the full snapshot.
    pub total: usize,
}

/// One change-history entry rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HistoryEntry {
    /// The operator that made the change.
    pub actor: String,
    /// The mutation kind slug.
    pub action: String,
    /// One line per changed field, or the placeholder line.
    pub changes: Vec<String>,
}

/// Parses an entity slug from a request path.
///
/// # Errors
///
/// Returns an invalid-input error for unknown slugs.
pub fn parse_entity(slug: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_str(slug).map_err(translate_domain_error)
}

fn view_of(record: Record, today: NaiveDate) -> RecordView {
    let projection: RecordProjection = comreg::project_record(&record, today);
    let milestones: Vec<MilestoneProjection> =
        comreg::iso_milestone_projections(&record, today);
    RecordView {
        record,
        projection,
        milestones,
    }
}

fn map_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::Validation(message) => ApiError::InvalidInput {
            field: String::new(),
            message,
        },
        other => ApiError::Internal {
            message: format!("Persistence error: {other}"),
        },
    }
}

/// Creates a record.
///
/// # Errors
///
/// Returns an error if the actor is not authorized, a required field is
/// missing or malformed, or persistence fails.
pub fn create_record(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    entity: EntityKind,
    fields: BTreeMap<String, FieldValue>,
    today: NaiveDate,
) -> Result<RecordView, ApiError> {
    AuthorizationService::authorize_write_record(actor)?;
    validate_record_fields(entity, &fields).map_err(translate_domain_error)?;

    let record: Record = Record::new(entity, fields);
    let id: i64 = persistence
        .insert_record(&record, &actor.id)
        .map_err(map_persistence_error)?;

    debug!(entity = entity.as_str(), id, "record created");

    let stored: Record = persistence
        .get_record(entity, id)
        .map_err(map_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Record {id} vanished after insert"),
        })?;

    Ok(view_of(stored, today))
}

/// Updates a record's fields.
///
/// # Errors
///
/// Returns an error if the actor is not authorized, the record does not
/// exist, validation fails, or persistence fails.
pub fn update_record(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    entity: EntityKind,
    id: i64,
    fields: BTreeMap<String, FieldValue>,
    today: NaiveDate,
) -> Result<RecordView, ApiError> {
    AuthorizationService::authorize_write_record(actor)?;
    validate_record_fields(entity, &fields).map_err(translate_domain_error)?;

    let updated: Record = persistence
        .update_record(entity, id, fields, &actor.id)
        .map_err(map_persistence_error)?;

    debug!(entity = entity.as_str(), id, "record updated");

    Ok(view_of(updated, today))
}

/// Deletes a record. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the record does not
/// exist, or persistence fails.
pub fn delete_record(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    entity: EntityKind,
    id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_delete_record(actor)?;

    persistence
        .delete_record(entity, id, &actor.id)
        .map_err(map_persistence_error)?;

    debug!(entity = entity.as_str(), id, "record deleted");

    Ok(())
}

/// Fetches one record with its derived expiry view.
///
/// # Errors
///
/// Returns a not-found error if the record does not exist.
pub fn get_record(
    persistence: &mut SqlitePersistence,
    entity: EntityKind,
    id: i64,
    today: NaiveDate,
) -> Result<RecordView, ApiError> {
    let record: Record = persistence
        .get_record(entity, id)
        .map_err(map_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: format!("No {} record with id {id}", entity.as_str()),
        })?;

    Ok(view_of(record, today))
}

/// Lists an entity's records under a bucket filter and a search term.
///
/// An empty result is an empty list, never an error. Bucket counts are
/// computed over the full snapshot so the stat boxes stay stable while
/// the user filters.
///
/// # Errors
///
/// Returns an error only when persistence fails.
pub fn list_records(
    persistence: &mut SqlitePersistence,
    entity: EntityKind,
    search_term: &str,
    active_bucket: Option<BucketId>,
    today: NaiveDate,
) -> Result<ListRecordsResponse, ApiError> {
    let snapshot: Vec<Record> = persistence
        .list_records(entity)
        .map_err(map_persistence_error)?;

    let counts: BTreeMap<BucketId, usize> = bucket_counts(&snapshot, today);
    let total: usize = snapshot.len();

    let records: Vec<RecordView> = visible(&snapshot, search_term, active_bucket, |r| {
        record_buckets(r, today)
    })
    .into_iter()
    .map(|record| view_of(record.clone(), today))
    .collect();

    Ok(ListRecordsResponse {
        entity: String::from(entity.as_str()),
        records,
        counts,
        total,
    })
}

/// Fetches a record's change history, newest first.
///
/// Diff lines cover the entity's tracked fields only.
///
/// # Errors
///
/// Returns an error only when persistence fails; a record with no
/// history yields an empty list.
pub fn record_history(
    persistence: &mut SqlitePersistence,
    entity: EntityKind,
    id: i64,
) -> Result<Vec<HistoryEntry>, ApiError> {
    let events: Vec<ChangeEvent> = persistence
        .record_history(entity, id)
        .map_err(map_persistence_error)?;

    Ok(events
        .iter()
        .map(|event| HistoryEntry {
            actor: event.actor.clone(),
            action: String::from(event.action.as_str()),
            changes: event.summary_lines(tracked_fields(entity)),
        })
        .collect())
}
