//! Sandwich-leave deduction.
//!
//! Leave that wraps a weekend (Friday + Saturday + Sunday, Saturday +
//! Sunday + Monday, Friday through Monday, or a Friday and the following
//! Monday applied separately) is charged more than the working days it
//! covers. Rules are evaluated in a fixed order and the first match wins.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::PolicyError;
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LeaveApplication, LeaveStatus};
use crate::utils::timezone::to_civil_date;

/// Charge for any 3 or 4 day block that wraps a weekend.
const WEEKEND_BLOCK_CHARGE: f64 = 4.0;
/// Charge for each half of a separately applied Friday/Monday pair.
const SPLIT_PAIR_CHARGE: f64 = 2.0;
/// Charge for an approved, planned single Friday or Monday.
const PLANNED_BRIDGE_CHARGE: f64 = 1.0;
/// Penalty for a sudden or unapproved single Friday or Monday.
const SUDDEN_BRIDGE_CHARGE: f64 = 3.0;
const HALF_DAY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeductionDetails {
    #[schema(example = 1)]
    pub weekdays: u32,
    #[schema(example = 2)]
    pub weekends: u32,
    #[schema(example = 0)]
    pub holidays: u32,
    /// Days charged beyond `actual_days` by a sandwich rule.
    #[schema(example = 3.0)]
    pub sandwich_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SandwichLeaveResult {
    #[schema(example = 1.0)]
    pub actual_days: f64,
    #[schema(example = 4.0)]
    pub deducted_days: f64,
    pub is_sandwich_leave: bool,
    #[schema(example = "Friday + Saturday + Sunday counted as sandwich leave")]
    pub reason: String,
    pub details: DeductionDetails,
}

/// Day counts over an inclusive date range.
struct DayCounts {
    weekdays: u32,
    weekends: u32,
    holidays: u32,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn count_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> DayCounts {
    let mut counts = DayCounts {
        weekdays: 0,
        weekends: 0,
        holidays: 0,
    };

    for date in start.iter_days().take_while(|d| *d <= end) {
        if is_weekend(date) {
            counts.weekends += 1;
        } else {
            counts.weekdays += 1;
            if holidays.contains(&date) {
                counts.holidays += 1;
            }
        }
    }

    counts
}

/// Filed on or after the civil day the leave starts.
pub fn is_sudden(application: &LeaveApplication) -> bool {
    to_civil_date(application.applied_at) >= application.start_date
}

fn is_single_day(application: &LeaveApplication) -> bool {
    application.start_date == application.end_date
}

/// A separately applied single day exactly three days away, i.e. the
/// Monday after a Friday or the Friday before a Monday.
fn find_split_partner<'a>(
    application: &LeaveApplication,
    siblings: &'a [LeaveApplication],
) -> Option<&'a LeaveApplication> {
    let partner_date = match application.start_date.weekday() {
        Weekday::Fri => application.start_date + Duration::days(3),
        Weekday::Mon => application.start_date - Duration::days(3),
        _ => return None,
    };

    siblings.iter().find(|sibling| {
        let is_self = application.id.is_some() && sibling.id == application.id;
        !is_self && is_single_day(sibling) && sibling.start_date == partner_date
    })
}

/// Computes how many days `application` charges against the leave balance.
///
/// `siblings` are the same employee's other applications; they are only
/// consulted to detect a Friday and the following Monday applied as two
/// single-day requests. Callers decide which statuses count as siblings.
pub fn calculate_sandwich_leave(
    application: &LeaveApplication,
    holidays: &[Holiday],
    siblings: &[LeaveApplication],
) -> Result<SandwichLeaveResult, PolicyError> {
    let start = application.start_date;
    let end = application.end_date;

    if end < start {
        return Err(PolicyError::InvalidDateRange { start, end });
    }

    let holiday_dates: HashSet<NaiveDate> = holidays
        .iter()
        .filter(|h| !h.is_optional)
        .map(|h| h.date)
        .collect();

    let counts = count_days(start, end, &holiday_dates);
    let actual_days = if application.is_half_day {
        HALF_DAY
    } else {
        f64::from(counts.weekdays - counts.holidays)
    };

    let span = (end - start).num_days() + 1;
    let (start_day, end_day) = (start.weekday(), end.weekday());

    let (deducted, is_sandwich, reason) = match (start_day, span, end_day) {
        (Weekday::Fri, 3, Weekday::Sun) => (
            WEEKEND_BLOCK_CHARGE,
            true,
            "Friday + Saturday + Sunday counted as sandwich leave".to_string(),
        ),
        (Weekday::Sat, 3, Weekday::Mon) => (
            WEEKEND_BLOCK_CHARGE,
            true,
            "Saturday + Sunday + Monday counted as sandwich leave".to_string(),
        ),
        (Weekday::Fri, 4, Weekday::Mon) => (
            WEEKEND_BLOCK_CHARGE,
            true,
            "Friday through Monday counted as sandwich leave".to_string(),
        ),
        (Weekday::Fri | Weekday::Mon, 1, _) => {
            bridge_day_charge(application, start_day, siblings)
        }
        (_, 1, _) => (
            actual_days,
            false,
            "Single day leave charged as working days".to_string(),
        ),
        _ => (
            actual_days,
            false,
            format!(
                "Charged {} working day(s) excluding weekends and holidays",
                actual_days
            ),
        ),
    };

    let deducted_days = if application.is_half_day {
        deducted.max(HALF_DAY)
    } else {
        deducted.max(0.0)
    };

    let sandwich_days = if is_sandwich {
        (deducted_days - actual_days).max(0.0)
    } else {
        0.0
    };

    debug!(
        start = %start,
        end = %end,
        actual_days,
        deducted_days,
        is_sandwich,
        reason = %reason,
        "Leave deduction evaluated"
    );

    Ok(SandwichLeaveResult {
        actual_days,
        deducted_days,
        is_sandwich_leave: is_sandwich,
        reason,
        details: DeductionDetails {
            weekdays: counts.weekdays,
            weekends: counts.weekends,
            holidays: counts.holidays,
            sandwich_days,
        },
    })
}

/// A lone Friday or Monday either pairs with its counterpart, or is
/// charged by how it was applied.
fn bridge_day_charge(
    application: &LeaveApplication,
    day: Weekday,
    siblings: &[LeaveApplication],
) -> (f64, bool, String) {
    if find_split_partner(application, siblings).is_some() {
        return (
            SPLIT_PAIR_CHARGE,
            true,
            "Friday and the following Monday applied separately; counted as sandwich leave"
                .to_string(),
        );
    }

    let day_name = if day == Weekday::Fri { "Friday" } else { "Monday" };

    if application.status == LeaveStatus::Approved && !is_sudden(application) {
        (
            PLANNED_BRIDGE_CHARGE,
            false,
            format!("Approved {day_name} leave applied in advance"),
        )
    } else {
        (
            SUDDEN_BRIDGE_CHARGE,
            true,
            format!("Sudden or unapproved {day_name} leave charged as sandwich penalty"),
        )
    }
}
