// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for operator and session persistence operations.

use crate::{PersistenceError, SqlitePersistence};

#[test]
fn test_create_operator_hashes_password() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Admin")
        .unwrap();

    let operator = persistence
        .get_operator_by_id(operator_id)
        .unwrap()
        .unwrap();
    assert_eq!(operator.role, "Admin");
    assert_ne!(operator.password_hash, "password");
    assert!(bcrypt::verify("password", &operator.password_hash).unwrap());
}

#[test]
fn test_operator_login_lookup_is_case_insensitive() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    persistence
        .create_operator("TestOp", "Test Operator", "password", "Staff")
        .unwrap();

    let operator = persistence.get_operator_by_login("testop").unwrap();
    assert!(operator.is_some());
    assert_eq!(operator.unwrap().login_name, "TESTOP");
}

#[test]
fn test_enable_operator_succeeds() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Admin")
        .unwrap();

    persistence.disable_operator(operator_id).unwrap();

    let operator = persistence
        .get_operator_by_id(operator_id)
        .unwrap()
        .unwrap();
    assert!(operator.is_disabled);
    assert!(operator.disabled_at.is_some());

    persistence.enable_operator(operator_id).unwrap();

    let operator = persistence
        .get_operator_by_id(operator_id)
        .unwrap()
        .unwrap();
    assert!(!operator.is_disabled);
    assert!(operator.disabled_at.is_none());
}

#[test]
fn test_delete_nonexistent_operator_fails() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.delete_operator(999);
    assert!(result.is_err());
    match result.unwrap_err() {
        PersistenceError::OperatorNotFound(msg) => {
            assert!(msg.contains("999"));
        }
        other => panic!("Expected OperatorNotFound error, got: {other:?}"),
    }
}

#[test]
fn test_session_round_trip() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Staff")
        .unwrap();

    let session_id = persistence
        .create_session("token-abc", operator_id, "2099-01-01T00:00:00Z")
        .unwrap();

    let session = persistence
        .get_session_by_token("token-abc")
        .unwrap()
        .unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.operator_id, operator_id);
    assert_eq!(session.expires_at, "2099-01-01T00:00:00Z");

    persistence.update_session_activity(session_id).unwrap();

    persistence.delete_session("token-abc").unwrap();
    assert!(
        persistence
            .get_session_by_token("token-abc")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_expired_session_purge_uses_iso_timestamps() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Staff")
        .unwrap();

    // Expired moments ago, on the same day the purge runs.
    let just_expired: String = (chrono::Utc::now() - chrono::Duration::seconds(30))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();
    persistence
        .create_session("stale-token", operator_id, &just_expired)
        .unwrap();
    persistence
        .create_session("live-token", operator_id, "2099-01-01T00:00:00Z")
        .unwrap();

    let purged = persistence.delete_expired_sessions().unwrap();
    assert_eq!(purged, 1);
    assert!(
        persistence
            .get_session_by_token("stale-token")
            .unwrap()
            .is_none()
    );
    assert!(
        persistence
            .get_session_by_token("live-token")
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_password_update_and_session_invalidation() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "old-password", "Admin")
        .unwrap();
    persistence
        .create_session("token-1", operator_id, "2099-01-01T00:00:00Z")
        .unwrap();
    persistence
        .create_session("token-2", operator_id, "2099-01-01T00:00:00Z")
        .unwrap();

    persistence
        .update_password(operator_id, "new-password")
        .unwrap();
    let deleted = persistence
        .delete_sessions_for_operator(operator_id)
        .unwrap();
    assert_eq!(deleted, 2);

    let operator = persistence
        .get_operator_by_id(operator_id)
        .unwrap()
        .unwrap();
    assert!(bcrypt::verify("new-password", &operator.password_hash).unwrap());
    assert!(!bcrypt::verify("old-password", &operator.password_hash).unwrap());
}

#[test]
fn test_deleting_operator_cascades_sessions() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let operator_id = persistence
        .create_operator("testop", "Test Operator", "password", "Staff")
        .unwrap();
    persistence
        .create_session("token-abc", operator_id, "2099-01-01T00:00:00Z")
        .unwrap();

    persistence.delete_operator(operator_id).unwrap();

    assert!(
        persistence
            .get_session_by_token("token-abc")
            .unwrap()
            .is_none()
    );
}
