use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One scored goal in a KRA evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KraGoalEvaluation {
    #[schema(example = "Quarterly hiring target")]
    #[serde(default)]
    pub goal: String,
    #[schema(example = 25.0)]
    pub weight: f64,
    #[schema(example = 30.0)]
    pub awarded_points: f64,
    #[schema(example = 35.0)]
    pub max_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KraScore {
    /// Overall weighted percentage, 0..=100 when points stay within their maxima.
    #[schema(example = 62.1)]
    pub percentage: f64,
    #[schema(example = 1925.0)]
    pub weighted_awarded: f64,
    #[schema(example = 3100.0)]
    pub weighted_max: f64,
    #[schema(example = 5)]
    pub goal_count: usize,
}
