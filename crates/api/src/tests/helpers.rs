// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;
use comreg_domain::FieldValue;
use comreg_persistence::SqlitePersistence;
use std::collections::BTreeMap;

use crate::auth::{AuthenticatedActor, Role};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

pub fn admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin"), Role::Admin)
}

pub fn staff() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("staff"), Role::Staff)
}

pub fn persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().unwrap()
}

pub fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, FieldValue> {
    pairs
        .iter()
        .map(|(name, value)| {
            (
                String::from(*name),
                FieldValue::Text(String::from(*value)),
            )
        })
        .collect()
}

pub fn mcu_fields(name: &str, akhir_mcu: &str) -> BTreeMap<String, FieldValue> {
    fields(&[
        ("full_name", name),
        ("awal_mcu", "2024-06-01"),
        ("akhir_mcu", akhir_mcu),
    ])
}
