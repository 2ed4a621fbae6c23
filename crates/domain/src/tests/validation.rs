// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, EntityKind, FieldValue, validate_record_fields};
use std::collections::BTreeMap;

fn contract_fields() -> BTreeMap<String, FieldValue> {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("full_name"),
        FieldValue::Text(String::from("Budi Santoso")),
    );
    fields.insert(
        String::from("kontrak_awal"),
        FieldValue::Text(String::from("01/01/2025")),
    );
    fields.insert(
        String::from("kontrak_akhir"),
        FieldValue::Text(String::from("2025-12-31")),
    );
    fields
}

#[test]
fn valid_contract_fields_pass() {
    assert_eq!(
        validate_record_fields(EntityKind::Contract, &contract_fields()),
        Ok(())
    );
}

#[test]
fn missing_required_field_is_rejected() {
    let mut fields = contract_fields();
    fields.remove("kontrak_akhir");
    assert_eq!(
        validate_record_fields(EntityKind::Contract, &fields),
        Err(DomainError::MissingRequiredField {
            field: String::from("kontrak_akhir")
        })
    );
}

#[test]
fn empty_required_field_is_rejected() {
    let mut fields = contract_fields();
    fields.insert(String::from("full_name"), FieldValue::Text(String::new()));
    assert_eq!(
        validate_record_fields(EntityKind::Contract, &fields),
        Err(DomainError::MissingRequiredField {
            field: String::from("full_name")
        })
    );
}

#[test]
fn null_required_field_is_rejected() {
    let mut fields = contract_fields();
    fields.insert(String::from("full_name"), FieldValue::Null);
    assert!(validate_record_fields(EntityKind::Contract, &fields).is_err());
}

#[test]
fn bad_date_in_optional_column_is_rejected() {
    let mut fields = contract_fields();
    fields.insert(
        String::from("tanggal_lahir"),
        FieldValue::Text(String::from("13/13/2025")),
    );
    assert_eq!(
        validate_record_fields(EntityKind::Contract, &fields),
        Err(DomainError::InvalidDateFormat {
            field: String::from("tanggal_lahir"),
            value: String::from("13/13/2025")
        })
    );
}

#[test]
fn empty_optional_date_column_is_allowed() {
    let mut fields = contract_fields();
    fields.insert(String::from("tanggal_lahir"), FieldValue::Text(String::new()));
    assert_eq!(
        validate_record_fields(EntityKind::Contract, &fields),
        Ok(())
    );
}

#[test]
fn management_document_requires_only_name() {
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
    fields.insert(
        String::from("document_name"),
        FieldValue::Text(String::from("Emergency Response Plan")),
    );
    assert_eq!(
        validate_record_fields(EntityKind::ManagementDocument, &fields),
        Ok(())
    );
}
