// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for record persistence and change-history capture.

use crate::{PersistenceError, SqlitePersistence};
use crate::tests::mcu_record;
use comreg_audit::ChangeAction;
use comreg_domain::{
    AttachmentSlot, EntityKind, FieldValue, FileMetadata, Record,
};
use std::collections::BTreeMap;

#[test]
fn test_insert_and_get_round_trip() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let record_id = persistence
        .insert_record(&mcu_record("Budi Santoso", "2025-06-10"), "admin")
        .unwrap();

    let fetched: Record = persistence
        .get_record(EntityKind::Mcu, record_id)
        .unwrap()
        .unwrap();

    assert_eq!(fetched.id, Some(record_id));
    assert_eq!(fetched.entity, EntityKind::Mcu);
    assert_eq!(
        fetched.field_text("full_name"),
        Some(String::from("Budi Santoso"))
    );
    assert_eq!(fetched.modified_by, Some(String::from("admin")));
    assert!(fetched.created_at.is_some());
    assert!(fetched.updated_at.is_some());
}

#[test]
fn test_insert_rejects_invalid_fields_without_trace() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("awal_mcu"),
        FieldValue::Text(String::from("2024-06-01")),
    );
    fields.insert(
        String::from("akhir_mcu"),
        FieldValue::Text(String::from("2025-06-10")),
    );
    let record: Record = Record::new(EntityKind::Mcu, fields);

    let result = persistence.insert_record(&record, "admin");
    assert!(matches!(result, Err(PersistenceError::Validation(_))));

    // A rejected insert must not leave a partial row or event behind.
    assert!(persistence.list_records(EntityKind::Mcu).unwrap().is_empty());
}

#[test]
fn test_number_fields_round_trip() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let mut record: Record = mcu_record("Budi", "2025-06-10");
    record.fields.insert(
        String::from("base_salary"),
        FieldValue::Number(5000.0),
    );

    let record_id = persistence.insert_record(&record, "admin").unwrap();
    let fetched: Record = persistence
        .get_record(EntityKind::Mcu, record_id)
        .unwrap()
        .unwrap();

    assert_eq!(
        fetched.fields.get("base_salary"),
        Some(&FieldValue::Number(5000.0))
    );
}

#[test]
fn test_update_writes_history_newest_first() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let record_id = persistence
        .insert_record(&mcu_record("Budi", "2025-06-10"), "admin")
        .unwrap();

    let updated_fields = mcu_record("Budi", "2026-06-10").fields;
    let updated: Record = persistence
        .update_record(EntityKind::Mcu, record_id, updated_fields, "staff")
        .unwrap();
    assert_eq!(
        updated.field_text("akhir_mcu"),
        Some(String::from("2026-06-10"))
    );
    assert_eq!(updated.modified_by, Some(String::from("staff")));

    let history = persistence
        .record_history(EntityKind::Mcu, record_id)
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, ChangeAction::Update);
    assert_eq!(history[0].actor, "staff");
    assert_eq!(
        history[0].before.get("akhir_mcu"),
        Some(&FieldValue::Text(String::from("2025-06-10")))
    );
    assert_eq!(
        history[0].after.get("akhir_mcu"),
        Some(&FieldValue::Text(String::from("2026-06-10")))
    );
    assert_eq!(history[1].action, ChangeAction::Create);
    assert!(history[1].before.is_empty());
}

#[test]
fn test_update_missing_record_is_not_found() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.update_record(
        EntityKind::Mcu,
        999,
        mcu_record("Budi", "2025-06-10").fields,
        "admin",
    );
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_delete_keeps_history() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let record_id = persistence
        .insert_record(&mcu_record("Budi", "2025-06-10"), "admin")
        .unwrap();
    persistence
        .delete_record(EntityKind::Mcu, record_id, "admin")
        .unwrap();

    assert!(
        persistence
            .get_record(EntityKind::Mcu, record_id)
            .unwrap()
            .is_none()
    );

    let history = persistence
        .record_history(EntityKind::Mcu, record_id)
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, ChangeAction::Delete);
    assert!(history[0].after.is_empty());
}

#[test]
fn test_records_are_scoped_by_entity() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let record_id = persistence
        .insert_record(&mcu_record("Budi", "2025-06-10"), "admin")
        .unwrap();

    // The same ID under a different entity kind does not resolve.
    assert!(
        persistence
            .get_record(EntityKind::Contract, record_id)
            .unwrap()
            .is_none()
    );
    assert!(
        persistence
            .list_records(EntityKind::Contract)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_set_attachment_upserts_by_slot() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let record_id = persistence
        .insert_record(&mcu_record("Budi", "2025-06-10"), "admin")
        .unwrap();

    let first = AttachmentSlot::with_file(
        String::from("ktp"),
        Some(String::from("327001")),
        FileMetadata::new(
            String::from("a.pdf"),
            String::from("ktp/a.pdf"),
            String::from("application/pdf"),
            1024,
        ),
    );
    let with_first: Record = persistence
        .set_attachment(EntityKind::Mcu, record_id, first, "admin")
        .unwrap();
    assert_eq!(with_first.attachments.len(), 1);
    assert!(with_first.attachments[0].has_file());

    // Re-uploading to the same slot replaces, not appends.
    let second = AttachmentSlot::with_file(
        String::from("ktp"),
        Some(String::from("327001")),
        FileMetadata::new(
            String::from("b.pdf"),
            String::from("ktp/b.pdf"),
            String::from("application/pdf"),
            2048,
        ),
    );
    let with_second: Record = persistence
        .set_attachment(EntityKind::Mcu, record_id, second, "admin")
        .unwrap();
    assert_eq!(with_second.attachments.len(), 1);
    assert_eq!(
        with_second.attachments[0].file.as_ref().unwrap().filename,
        "b.pdf"
    );

    // Attachment writes do not add change events.
    let history = persistence
        .record_history(EntityKind::Mcu, record_id)
        .unwrap();
    assert_eq!(history.len(), 1);
}
