// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Expiry-window classification.
//!
//! Maps a day-difference to a named urgency bucket per an ordered
//! threshold table. Each entity kind carries its OWN table; the tables
//! are deliberately not unified because the source systems disagree on
//! boundary semantics:
//!
//! - MCU treats day zero as expired (`days <= 0`).
//! - Contracts treat day zero as the first warning tier (`days < 0`
//!   is the expiry cutoff).
//! - HSE documents fold 0-30 days remaining into the "expired" bucket
//!   with no separate past-date cutoff at all.
//!
//! Preserving these divergences is a requirement, not an oversight. Any
//! unification is a product decision, not a migration step.

use crate::date::DayCount;
use serde::{Deserialize, Serialize};

/// A named expiry-urgency bucket.
///
/// The union of every entity kind's bucket vocabulary. A given threshold
/// table only ever produces a subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketId {
    /// Past the expiry cutoff for the entity kind.
    Expired,
    /// MCU/contract: 0-14 days remaining.
    DueDate,
    /// MCU/contract: 15-30 days remaining.
    Call2,
    /// MCU/contract: 31-45 days remaining.
    Call1,
    /// HSE: 31-60 days remaining.
    Reminder2,
    /// HSE: 61-90 days remaining.
    Reminder1,
    /// ISO: first surveillance due within 180 days.
    FirstSurveillance,
    /// ISO: second surveillance due within 180 days.
    SecondSurveillance,
    /// ISO: certificate expiry within 180 days.
    ExpiryWindow,
    /// No urgency.
    Normal,
    /// The record has no usable date.
    NoDate,
}

impl BucketId {
    /// Converts this bucket to its wire/display slug.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::DueDate => "duedate",
            Self::Call2 => "call2",
            Self::Call1 => "call1",
            Self::Reminder2 => "reminder2",
            Self::Reminder1 => "reminder1",
            Self::FirstSurveillance => "first_surveillance",
            Self::SecondSurveillance => "second_surveillance",
            Self::ExpiryWindow => "expiry_window",
            Self::Normal => "normal",
            Self::NoDate => "no_date",
        }
    }
}

impl std::fmt::Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a table decides that a day count is past expiry, checked before
/// any threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiredCutoff {
    /// `days <= 0` is expired (MCU semantics).
    Inclusive,
    /// `days < 0` is expired (contract semantics).
    Exclusive,
    /// No separate cutoff; negative days fall through to the first rule
    /// (HSE semantics, where the first rule's bucket IS "expired").
    None,
}

/// One `(max_days, bucket)` threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRule {
    /// The largest day count (inclusive) this rule covers.
    pub max_days: i64,
    /// The bucket assigned when the rule matches.
    pub bucket: BucketId,
}

/// An ordered threshold table for one entity kind (or ISO milestone).
///
/// Rules are ascending by `max_days`; the first rule with
/// `max_days >= days` wins. Day counts beyond every rule fall into
/// `fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    /// The expiry-cutoff mode, checked before the rules.
    pub cutoff: ExpiredCutoff,
    /// Ascending threshold rules.
    pub rules: Vec<ThresholdRule>,
    /// The bucket for day counts beyond every rule.
    pub fallback: BucketId,
}

/// The outcome of classifying one day count.
///
/// The status string is computed here, once, and reused by both the
/// stat-box counters and the per-row status cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The assigned bucket.
    pub bucket: BucketId,
    /// Presentation-free status text ("N days left", "Expired N days
    /// ago", "Expires today", "No date").
    pub status: String,
}

/// ISO certification milestone date fields, each classified against its
/// own 180-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoMilestone {
    /// First surveillance audit date.
    FirstSurveillance,
    /// Second surveillance audit date.
    SecondSurveillance,
    /// Certificate expiry date.
    Expiry,
}

impl IsoMilestone {
    /// The record field name holding this milestone's date.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::FirstSurveillance => "first_surveillance_date",
            Self::SecondSurveillance => "second_surveillance_date",
            Self::Expiry => "expiry_date",
        }
    }

    const fn bucket(self) -> BucketId {
        match self {
            Self::FirstSurveillance => BucketId::FirstSurveillance,
            Self::SecondSurveillance => BucketId::SecondSurveillance,
            Self::Expiry => BucketId::ExpiryWindow,
        }
    }
}

/// The MCU threshold table.
///
/// Day zero counts as expired. The source removed the `days >= 0` guard
/// deliberately; keep it that way.
#[must_use]
pub fn mcu_thresholds() -> ThresholdTable {
    ThresholdTable {
        cutoff: ExpiredCutoff::Inclusive,
        rules: vec![
            ThresholdRule {
                max_days: 14,
                bucket: BucketId::DueDate,
            },
            ThresholdRule {
                max_days: 30,
                bucket: BucketId::Call2,
            },
            ThresholdRule {
                max_days: 45,
                bucket: BucketId::Call1,
            },
        ],
        fallback: BucketId::Normal,
    }
}

/// The contract threshold table.
///
/// Same tiers as MCU but day zero is `duedate`, not expired.
#[must_use]
pub fn contract_thresholds() -> ThresholdTable {
    ThresholdTable {
        cutoff: ExpiredCutoff::Exclusive,
        rules: vec![
            ThresholdRule {
                max_days: 14,
                bucket: BucketId::DueDate,
            },
            ThresholdRule {
                max_days: 30,
                bucket: BucketId::Call2,
            },
            ThresholdRule {
                max_days: 45,
                bucket: BucketId::Call1,
            },
        ],
        fallback: BucketId::Normal,
    }
}

/// The HSE document threshold table.
///
/// "Expired" covers everything up to 30 days remaining, negatives
/// included; there is no separate past-date cutoff.
#[must_use]
pub fn hse_document_thresholds() -> ThresholdTable {
    ThresholdTable {
        cutoff: ExpiredCutoff::None,
        rules: vec![
            ThresholdRule {
                max_days: 30,
                bucket: BucketId::Expired,
            },
            ThresholdRule {
                max_days: 60,
                bucket: BucketId::Reminder2,
            },
            ThresholdRule {
                max_days: 90,
                bucket: BucketId::Reminder1,
            },
        ],
        fallback: BucketId::Normal,
    }
}

/// The per-milestone ISO threshold table: a single 180-day window per
/// milestone field.
#[must_use]
pub fn iso_milestone_thresholds(milestone: IsoMilestone) -> ThresholdTable {
    ThresholdTable {
        cutoff: ExpiredCutoff::Exclusive,
        rules: vec![ThresholdRule {
            max_days: 180,
            bucket: milestone.bucket(),
        }],
        fallback: BucketId::Normal,
    }
}

/// Returns the threshold table for an entity kind's primary expiry field.
///
/// ISO documents use the certificate-expiry milestone table here; the
/// surveillance milestones are classified per-field by callers that need
/// them.
#[must_use]
pub fn threshold_table_for(entity: crate::types::EntityKind) -> ThresholdTable {
    use crate::types::EntityKind;
    match entity {
        EntityKind::Mcu => mcu_thresholds(),
        EntityKind::Contract => contract_thresholds(),
        EntityKind::HseDocument | EntityKind::ManagementDocument => hse_document_thresholds(),
        EntityKind::IsoDocument => iso_milestone_thresholds(IsoMilestone::Expiry),
    }
}

/// Classifies a day count against a threshold table.
///
/// Every integer maps to exactly one bucket: the cutoff check runs
/// first, then the ascending rules, then the fallback. [`DayCount::NoDate`]
/// always maps to [`BucketId::NoDate`].
#[must_use]
pub fn classify(days: DayCount, table: &ThresholdTable) -> Classification {
    let DayCount::Days(days) = days else {
        return Classification {
            bucket: BucketId::NoDate,
            status: String::from("No date"),
        };
    };

    let status: String = status_text(days);

    let expired: bool = match table.cutoff {
        ExpiredCutoff::Inclusive => days <= 0,
        ExpiredCutoff::Exclusive => days < 0,
        ExpiredCutoff::None => false,
    };
    if expired {
        return Classification {
            bucket: BucketId::Expired,
            status,
        };
    }

    for rule in &table.rules {
        if days <= rule.max_days {
            return Classification {
                bucket: rule.bucket,
                status,
            };
        }
    }

    Classification {
        bucket: table.fallback,
        status,
    }
}

/// Renders the day count as human-readable status text.
fn status_text(days: i64) -> String {
    if days < 0 {
        format!("Expired {} days ago", -days)
    } else if days == 0 {
        String::from("Expires today")
    } else {
        format!("{days} days left")
    }
}
