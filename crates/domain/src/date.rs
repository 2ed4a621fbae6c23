// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar-day arithmetic over loosely-encoded date strings.
//!
//! Records arrive with dates in three encodings: `YYYY-MM-DD`,
//! `DD/MM/YYYY`, and full ISO-8601 timestamps. All three must normalize
//! to the same calendar day before any day-difference is computed.
//!
//! ## Invariants
//!
//! - Both "today" and the target are midnight-normalized; a target of
//!   today yields `0`, tomorrow yields `1`.
//! - Missing or unparseable input yields [`DayCount::NoDate`], never an
//!   error or a panic.

use chrono::NaiveDate;

/// The result of a day-difference computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCount {
    /// Whole calendar days between today and the target. Negative means
    /// the target is in the past.
    Days(i64),
    /// The target date is absent or unparseable.
    NoDate,
}

/// Parses a date string in any of the three supported encodings.
///
/// Supported encodings:
/// - `YYYY-MM-DD`
/// - `DD/MM/YYYY`
/// - ISO-8601 timestamps (`YYYY-MM-DDTHH:MM:SS...`); the time and offset
///   are discarded and only the calendar date is kept.
///
/// Returns `None` for anything else. Never panics.
#[must_use]
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ISO timestamp: keep the date part only.
    if let Some((date_part, _)) = trimmed.split_once('T') {
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }

    if trimmed.contains('/') {
        return NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok();
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Computes the calendar-day difference from `today` to a raw date string.
///
/// # Arguments
///
/// * `raw` - The target date string, possibly absent
/// * `today` - The midnight-normalized current date
///
/// # Returns
///
/// [`DayCount::Days`] with the signed whole-day difference, or
/// [`DayCount::NoDate`] when the input is absent or unparseable.
#[must_use]
pub fn days_until(raw: Option<&str>, today: NaiveDate) -> DayCount {
    let Some(raw) = raw else {
        return DayCount::NoDate;
    };
    parse_flexible_date(raw).map_or(DayCount::NoDate, |target| {
        DayCount::Days(target.signed_duration_since(today).num_days())
    })
}

/// Checks whether a string matches one of the two formats accepted by the
/// bulk import validator (`DD/MM/YYYY` or `YYYY-MM-DD`).
///
/// Stricter than [`parse_flexible_date`]: ISO timestamps are not accepted
/// in import files.
#[must_use]
pub fn is_import_date_format(raw: &str) -> bool {
    let trimmed: &str = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").is_ok()
        || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
}

/// Reformats a stored date string to the `DD/MM/YYYY` display format.
///
/// Unparseable input is passed through unchanged so exports never lose
/// data silently.
#[must_use]
pub fn format_display_date(raw: &str) -> String {
    parse_flexible_date(raw).map_or_else(|| raw.to_string(), |d| d.format("%d/%m/%Y").to_string())
}
