use tracing::debug;

use crate::error::PolicyError;
use crate::model::kra::{KraGoalEvaluation, KraScore};

fn check(goal: &KraGoalEvaluation, field: &'static str, value: f64) -> Result<(), PolicyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PolicyError::InvalidKraValue {
            goal: goal.goal.clone(),
            field,
            value,
        })
    }
}

/// Weighted score over a set of goal evaluations:
/// `sum(awarded * weight) / sum(max * weight) * 100`.
///
/// An empty set, or one whose weighted maximum is zero, scores 0.
pub fn score_evaluations(evaluations: &[KraGoalEvaluation]) -> Result<KraScore, PolicyError> {
    let mut weighted_awarded = 0.0;
    let mut weighted_max = 0.0;

    for goal in evaluations {
        check(goal, "weight", goal.weight)?;
        check(goal, "awarded_points", goal.awarded_points)?;
        check(goal, "max_points", goal.max_points)?;

        weighted_awarded += goal.awarded_points * goal.weight;
        weighted_max += goal.max_points * goal.weight;
    }

    let percentage = if weighted_max > 0.0 {
        weighted_awarded / weighted_max * 100.0
    } else {
        0.0
    };

    debug!(
        goals = evaluations.len(),
        weighted_awarded, weighted_max, percentage, "KRA evaluation scored"
    );

    Ok(KraScore {
        percentage,
        weighted_awarded,
        weighted_max,
        goal_count: evaluations.len(),
    })
}

pub fn calculate_weighted_percentage(evaluations: &[KraGoalEvaluation]) -> Result<f64, PolicyError> {
    score_evaluations(evaluations).map(|score| score.percentage)
}
