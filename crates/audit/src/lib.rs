// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Change-history capture for compliance records.
//!
//! Every mutation of a record produces exactly one [`ChangeEvent`]
//! carrying who did it, what kind of mutation it was, and full
//! before/after field snapshots. Field-level diffs are derived from the
//! snapshots at read time against the entity's tracked-field list,
//! never stored, so the diff rules can evolve without rewriting
//! history.

use comreg_domain::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The placeholder text shown for an update event whose snapshots
/// differ in no displayed field.
pub const NO_CHANGES_PLACEHOLDER: &str = "no changes detected";

/// The kind of mutation a change event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// A record was created, manually or via bulk import.
    Create,
    /// A record's fields were edited.
    Update,
    /// A record was deleted.
    Delete,
}

impl ChangeAction {
    /// Converts this action to its storage slug.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field whose displayed value differs between the snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The field name.
    pub field: String,
    /// The displayed value before the change; `None` when absent/null.
    pub old: Option<String>,
    /// The displayed value after the change; `None` when absent/null.
    pub new: Option<String>,
}

/// An immutable record-mutation event with before/after snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The operator username that performed the mutation.
    pub actor: String,
    /// The kind of mutation.
    pub action: ChangeAction,
    /// The field map before the mutation. Empty for creates.
    pub before: BTreeMap<String, FieldValue>,
    /// The field map after the mutation. Empty for deletes.
    pub after: BTreeMap<String, FieldValue>,
}

impl ChangeEvent {
    /// Creates a new `ChangeEvent`. Once created, an event is immutable.
    #[must_use]
    pub const fn new(
        actor: String,
        action: ChangeAction,
        before: BTreeMap<String, FieldValue>,
        after: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            actor,
            action,
            before,
            after,
        }
    }

    /// Derives the field-level diff between this event's snapshots,
    /// limited to the entity's tracked fields.
    #[must_use]
    pub fn changes(&self, tracked: &[&str]) -> Vec<FieldChange> {
        diff_fields(&self.before, &self.after, tracked)
    }

    /// Renders the diff as one line per change for the history view.
    ///
    /// An update that changed nothing tracked still yields a single
    /// line, the [`NO_CHANGES_PLACEHOLDER`], so the event stays visible
    /// in the history rather than silently disappearing.
    #[must_use]
    pub fn summary_lines(&self, tracked: &[&str]) -> Vec<String> {
        let changes: Vec<FieldChange> = self.changes(tracked);
        if changes.is_empty() {
            return vec![String::from(NO_CHANGES_PLACEHOLDER)];
        }
        changes
            .iter()
            .map(|change| {
                format!(
                    "{}: '{}' -> '{}'",
                    change.field,
                    change.old.as_deref().unwrap_or(""),
                    change.new.as_deref().unwrap_or(""),
                )
            })
            .collect()
    }
}

/// Diffs two field snapshots over a tracked-field list.
///
/// Only the named fields are compared, in list order; any other key a
/// snapshot carries is invisible to history. A tracked field counts as
/// changed only when its displayed values differ AND the two sides are
/// not both empty. A transition between `Null`, a missing key, and an
/// empty string is therefore NOT a change; noise from form round-trips
/// stays out of the history.
///
/// The tracked lists are fixed per entity, so identical snapshots
/// always produce an identical diff.
#[must_use]
pub fn diff_fields(
    before: &BTreeMap<String, FieldValue>,
    after: &BTreeMap<String, FieldValue>,
    tracked: &[&str],
) -> Vec<FieldChange> {
    tracked
        .iter()
        .filter_map(|name| {
            let old: Option<String> = before.get(*name).and_then(FieldValue::as_display);
            let new: Option<String> = after.get(*name).and_then(FieldValue::as_display);

            let old_empty: bool = old.as_deref().is_none_or(|s| s.trim().is_empty());
            let new_empty: bool = new.as_deref().is_none_or(|s| s.trim().is_empty());
            if old_empty && new_empty {
                return None;
            }
            if old == new {
                return None;
            }

            Some(FieldChange {
                field: String::from(*name),
                old,
                new,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use comreg_domain::{EntityKind, tracked_fields};

    fn snapshot(pairs: &[(&str, FieldValue)]) -> BTreeMap<String, FieldValue> {
        pairs
            .iter()
            .map(|(name, value)| (String::from(*name), value.clone()))
            .collect()
    }

    #[test]
    fn test_changed_text_field_is_reported() {
        let before = snapshot(&[("full_name", FieldValue::Text(String::from("Budi")))]);
        let after = snapshot(&[("full_name", FieldValue::Text(String::from("Budi S.")))]);

        let changes: Vec<FieldChange> = diff_fields(&before, &after, &["full_name"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "full_name");
        assert_eq!(changes[0].old, Some(String::from("Budi")));
        assert_eq!(changes[0].new, Some(String::from("Budi S.")));
    }

    #[test]
    fn test_both_empty_is_not_a_change() {
        let before = snapshot(&[("notes", FieldValue::Null)]);
        let after = snapshot(&[("notes", FieldValue::Text(String::new()))]);

        assert!(diff_fields(&before, &after, &["notes"]).is_empty());
    }

    #[test]
    fn test_missing_key_vs_empty_string_is_not_a_change() {
        let before = snapshot(&[]);
        let after = snapshot(&[("notes", FieldValue::Text(String::from("  ")))]);

        assert!(diff_fields(&before, &after, &["notes"]).is_empty());
    }

    #[test]
    fn test_empty_to_populated_is_a_change() {
        let before = snapshot(&[("department", FieldValue::Null)]);
        let after = snapshot(&[("department", FieldValue::Text(String::from("HSE")))]);

        let changes: Vec<FieldChange> = diff_fields(&before, &after, &["department"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old, None);
        assert_eq!(changes[0].new, Some(String::from("HSE")));
    }

    #[test]
    fn test_populated_to_empty_is_a_change() {
        let before = snapshot(&[("department", FieldValue::Text(String::from("HSE")))]);
        let after = snapshot(&[("department", FieldValue::Null)]);

        let changes: Vec<FieldChange> = diff_fields(&before, &after, &["department"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new, None);
    }

    #[test]
    fn test_diff_follows_tracked_list_order() {
        let before = snapshot(&[
            ("b_field", FieldValue::Text(String::from("1"))),
            ("a_field", FieldValue::Text(String::from("1"))),
        ]);
        let after = snapshot(&[
            ("b_field", FieldValue::Text(String::from("2"))),
            ("a_field", FieldValue::Text(String::from("2"))),
        ]);

        let first: Vec<FieldChange> = diff_fields(&before, &after, &["b_field", "a_field"]);
        let second: Vec<FieldChange> = diff_fields(&before, &after, &["b_field", "a_field"]);
        assert_eq!(first, second);
        assert_eq!(first[0].field, "b_field");
        assert_eq!(first[1].field, "a_field");
    }

    #[test]
    fn test_untracked_field_changes_are_invisible() {
        let before = snapshot(&[
            ("full_name", FieldValue::Text(String::from("Budi"))),
            ("catatan_internal", FieldValue::Text(String::from("draft"))),
        ]);
        let after = snapshot(&[
            ("full_name", FieldValue::Text(String::from("Budi"))),
            ("catatan_internal", FieldValue::Text(String::from("final"))),
        ]);
        let event: ChangeEvent =
            ChangeEvent::new(String::from("admin"), ChangeAction::Update, before, after);

        assert!(event.changes(tracked_fields(EntityKind::Mcu)).is_empty());
        assert_eq!(
            event.summary_lines(tracked_fields(EntityKind::Mcu)),
            vec![String::from(NO_CHANGES_PLACEHOLDER)]
        );
    }

    #[test]
    fn test_numeric_display_comparison() {
        let before = snapshot(&[("salary", FieldValue::Number(5000.0))]);
        let after = snapshot(&[("salary", FieldValue::Text(String::from("5000")))]);

        // Same displayed value, different representation: not a change.
        assert!(diff_fields(&before, &after, &["salary"]).is_empty());
    }

    #[test]
    fn test_no_change_update_keeps_placeholder_line() {
        let fields = snapshot(&[("full_name", FieldValue::Text(String::from("Budi")))]);
        let event: ChangeEvent = ChangeEvent::new(
            String::from("admin"),
            ChangeAction::Update,
            fields.clone(),
            fields,
        );

        assert_eq!(
            event.summary_lines(&["full_name"]),
            vec![String::from(NO_CHANGES_PLACEHOLDER)]
        );
    }

    #[test]
    fn test_summary_lines_render_old_and_new() {
        let before = snapshot(&[("akhir_mcu", FieldValue::Text(String::from("2025-01-01")))]);
        let after = snapshot(&[("akhir_mcu", FieldValue::Text(String::from("2026-01-01")))]);
        let event: ChangeEvent =
            ChangeEvent::new(String::from("admin"), ChangeAction::Update, before, after);

        assert_eq!(
            event.summary_lines(&["akhir_mcu"]),
            vec![String::from("akhir_mcu: '2025-01-01' -> '2026-01-01'")]
        );
    }
}
