use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HalfDayPeriod {
    FirstHalf,
    SecondHalf,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Casual,
    Unpaid,
}

/// A leave request as seen by the deduction policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveApplication {
    /// Set for stored applications; lets a sibling list contain the
    /// application itself without it pairing with itself.
    #[schema(example = 42, nullable = true)]
    #[serde(default)]
    pub id: Option<u64>,
    #[schema(example = "2024-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
    pub status: LeaveStatus,
    #[schema(example = "2023-12-29T04:30:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
}

/// A stored leave request row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2024-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: String,
    pub is_half_day: bool,
    #[schema(example = "first_half", nullable = true)]
    pub half_day_period: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2023-12-29T04:30:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
    #[schema(example = 1.0)]
    pub actual_days: f64,
    #[schema(example = 4.0)]
    pub deducted_days: f64,
    pub is_sandwich_leave: bool,
    #[schema(example = "Friday + Saturday + Sunday counted as sandwich leave", nullable = true)]
    pub deduction_reason: Option<String>,
}

impl LeaveRequest {
    /// Policy view of the row. Unknown status strings are treated as pending.
    pub fn to_application(&self) -> LeaveApplication {
        LeaveApplication {
            id: Some(self.id),
            start_date: self.start_date,
            end_date: self.end_date,
            is_half_day: self.is_half_day,
            half_day_period: self
                .half_day_period
                .as_deref()
                .and_then(|p| p.parse().ok()),
            status: self.status.parse().unwrap_or(LeaveStatus::Pending),
            applied_at: self.applied_at,
        }
    }
}
