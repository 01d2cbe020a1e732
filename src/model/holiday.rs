use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Holiday {
    #[schema(example = 1, nullable = true)]
    #[serde(default)]
    #[sqlx(default)]
    pub id: Option<u64>,
    #[schema(example = "2024-01-26", format = "date", value_type = String)]
    #[sqlx(rename = "holiday_date")]
    pub date: NaiveDate,
    #[schema(example = "Republic Day")]
    pub name: String,
    /// Optional holidays never reduce a leave deduction.
    #[serde(default)]
    pub is_optional: bool,
}
