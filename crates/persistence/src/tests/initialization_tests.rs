// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for database initialization and isolation.

use crate::SqlitePersistence;
use crate::tests::mcu_record;
use comreg_domain::EntityKind;

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first = SqlitePersistence::new_in_memory().unwrap();
    let mut second = SqlitePersistence::new_in_memory().unwrap();

    first
        .insert_record(&mcu_record("Budi", "2025-06-10"), "admin")
        .unwrap();

    assert_eq!(first.list_records(EntityKind::Mcu).unwrap().len(), 1);
    assert!(second.list_records(EntityKind::Mcu).unwrap().is_empty());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    // Sessions reference operators; an orphan session must be rejected.
    let result = persistence.create_session("token", 999, "2099-01-01T00:00:00Z");
    assert!(result.is_err());
}
