// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

mod initialization_tests;
mod operator_tests;
mod record_tests;

use comreg_domain::{EntityKind, FieldValue, Record};
use std::collections::BTreeMap;

pub fn mcu_record(full_name: &str, akhir_mcu: &str) -> Record {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("full_name"),
        FieldValue::Text(String::from(full_name)),
    );
    fields.insert(
        String::from("awal_mcu"),
        FieldValue::Text(String::from("2024-06-01")),
    );
    fields.insert(
        String::from("akhir_mcu"),
        FieldValue::Text(String::from(akhir_mcu)),
    );
    Record::new(EntityKind::Mcu, fields)
}
