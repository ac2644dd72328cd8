/*
Doorman: a membership and media bot for a community Discord server.
Copyright (C) 2024 Doorman Contributors

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Membership ledger: classify subjects from the spreadsheet snapshot and
//! reconcile the member role against it. The snapshot is re-fetched for
//! every invocation and never mutated; role changes go through the
//! injected [`RoleSync`] collaborator only.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{trace, warn};

use crate::error::Fault;

/// Members with this many days or fewer left are flagged for renewal.
pub const SOON_WINDOW_DAYS: i64 = 10;

/// Expired members inside this window are still called out in sweep reports.
pub const LAPSE_WINDOW_DAYS: i64 = 20;

// Column layout of the sheet export.
const NAME_COLUMN: usize = 0;
const END_DATE_COLUMN: usize = 1;
const EXTERNAL_REF_COLUMN: usize = 2;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The parsed membership sheet at the moment of one command's execution.
#[derive(Debug, Clone)]
pub struct Snapshot {
    rows: Vec<Vec<String>>,
}

impl Snapshot {
    /// Splits a sheet CSV export into cell rows, dropping `header_offset`
    /// leading rows. The export carries no quoted cells.
    pub fn parse(text: &str, header_offset: usize) -> Self {
        let rows = text
            .lines()
            .skip(header_offset)
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split(',')
                    .map(|cell| cell.trim().to_string())
                    .collect()
            })
            .collect();
        Snapshot { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First row whose name cell equals `subject` exactly. Lookups are
    /// case-sensitive; duplicate names resolve to the first occurrence.
    pub fn find(&self, subject: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.get(NAME_COLUMN).map(String::as_str) == Some(subject))
            .map(Vec::as_slice)
    }
}

/// One parsed ledger row. A row whose end-date cell is missing or
/// unparseable is a [`Fault::MalformedRecord`], never a silently
/// skipped row.
#[derive(Debug, Clone)]
pub struct MembershipRecord {
    pub subject_id: String,
    pub end_date: NaiveDate,
    /// Platform user id column, used by the sweep's role side effects.
    pub external_ref: Option<String>,
}

impl MembershipRecord {
    pub fn from_row(row: &[String]) -> Result<Self, Fault> {
        let subject_id = row.get(NAME_COLUMN).cloned().unwrap_or_default();
        let cell = row.get(END_DATE_COLUMN).map(String::as_str).unwrap_or("");
        if cell.is_empty() {
            return Err(Fault::MalformedRecord {
                subject: subject_id,
                detail: "end date cell is empty".to_string(),
            });
        }
        let end_date =
            NaiveDate::parse_from_str(cell, DATE_FORMAT).map_err(|e| Fault::MalformedRecord {
                subject: subject_id.clone(),
                detail: format!("bad end date '{cell}': {e}"),
            })?;
        let external_ref = row
            .get(EXTERNAL_REF_COLUMN)
            .filter(|cell| !cell.is_empty())
            .cloned();
        Ok(MembershipRecord {
            subject_id,
            end_date,
            external_ref,
        })
    }
}

/// A subject's standing, recomputed from scratch on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Active { days_remaining: i64 },
    /// Still active, but inside the renewal window.
    ExpiringSoon { days_remaining: i64 },
    Expired { days_since: i64 },
    /// No ledger row, but the subject holds the privileged marker.
    Lifetime,
    NotFound,
}

impl MembershipStatus {
    /// Whether the subject should currently hold the member role.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Active { .. } | Self::ExpiringSoon { .. } | Self::Lifetime
        )
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Active { days_remaining } => {
                format!("Active, {days_remaining} days remaining")
            }
            Self::ExpiringSoon { days_remaining } => {
                format!("Active, {days_remaining} days remaining (renewal due soon)")
            }
            Self::Expired { days_since } => format!("Expired {days_since} days ago"),
            Self::Lifetime => "Lifetime member".to_string(),
            Self::NotFound => "No membership record found".to_string(),
        }
    }
}

/// Whole days between `now` and the end of membership, floored. Negative
/// deltas floor downwards, so one second past midnight is already day -1.
fn day_delta(end: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (end - now).num_seconds().div_euclid(86_400)
}

/// Classifies a subject from an already-located record. `now` and the
/// privileged flag are supplied by the caller so the computation stays
/// deterministic under test; ledger dates are local dates, so `now` is
/// expected in the ledger's timezone.
///
/// Day counts are inclusive of the boundary day: a membership ending
/// today is still active with zero days remaining.
pub fn classify(
    record: Option<&MembershipRecord>,
    now: NaiveDateTime,
    privileged: bool,
) -> MembershipStatus {
    let Some(record) = record else {
        return if privileged {
            MembershipStatus::Lifetime
        } else {
            MembershipStatus::NotFound
        };
    };
    let end = record.end_date.and_time(NaiveTime::MIN);
    let raw = day_delta(end, now);
    if raw >= -1 {
        let days_remaining = raw + 1;
        if days_remaining <= SOON_WINDOW_DAYS {
            MembershipStatus::ExpiringSoon { days_remaining }
        } else {
            MembershipStatus::Active { days_remaining }
        }
    } else {
        MembershipStatus::Expired {
            days_since: -(raw + 1),
        }
    }
}

/// The role side effects a sweep is allowed to perform. The classifier
/// itself never touches external state.
#[async_trait]
pub trait RoleSync: Send + Sync {
    async fn grant(&self, record: &MembershipRecord) -> Result<(), Fault>;
    async fn revoke(&self, record: &MembershipRecord) -> Result<(), Fault>;
    async fn notify_expired(&self, record: &MembershipRecord, days_since: i64)
        -> Result<(), Fault>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub active: u32,
    pub expiring_soon: u32,
    pub expired: u32,
    pub lapsed_recently: u32,
    pub malformed: u32,
}

impl SweepReport {
    pub fn summary(&self) -> String {
        format!(
            "Sweep complete: {} active ({} due for renewal), {} expired ({} lapsed within {} days), {} malformed rows.",
            self.active,
            self.expiring_soon,
            self.expired,
            self.lapsed_recently,
            LAPSE_WINDOW_DAYS,
            self.malformed
        )
    }
}

/// Reclassifies every ledger row and reconciles the member role through
/// `roles`. Malformed rows are counted and logged, never abort the scan;
/// a failed role mutation does, so every applied side effect corresponds
/// to a fully classified row.
pub async fn sweep(
    snapshot: &Snapshot,
    now: NaiveDateTime,
    roles: &dyn RoleSync,
) -> Result<SweepReport, Fault> {
    trace!("starting ledger sweep");
    let mut report = SweepReport::default();
    for row in snapshot.rows() {
        let record = match MembershipRecord::from_row(row) {
            Ok(record) => record,
            Err(fault) => {
                warn!(%fault, "skipping malformed ledger row");
                report.malformed += 1;
                continue;
            }
        };
        match classify(Some(&record), now, false) {
            MembershipStatus::Active { .. } => {
                roles.grant(&record).await?;
                report.active += 1;
            }
            MembershipStatus::ExpiringSoon { .. } => {
                roles.grant(&record).await?;
                report.active += 1;
                report.expiring_soon += 1;
            }
            MembershipStatus::Expired { days_since } => {
                roles.revoke(&record).await?;
                roles.notify_expired(&record, days_since).await?;
                report.expired += 1;
                if days_since <= LAPSE_WINDOW_DAYS {
                    report.lapsed_recently += 1;
                }
            }
            MembershipStatus::Lifetime | MembershipStatus::NotFound => {}
        }
    }
    Ok(report)
}
