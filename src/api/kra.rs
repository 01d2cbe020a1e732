use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::kra::{KraGoalEvaluation, KraScore};
use crate::policy::score_evaluations;

#[derive(Deserialize, ToSchema)]
pub struct ScoreKra {
    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,
    pub evaluations: Vec<KraGoalEvaluation>,
}

/// Scores a KRA evaluation; nothing is stored.
#[utoipa::path(
    post,
    path = "/api/kra/score",
    request_body = ScoreKra,
    responses(
        (status = 200, description = "Weighted score", body = KraScore),
        (status = 400, description = "Negative or non-numeric weights or points"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "KRA"
)]
pub async fn score_kra(
    auth: AuthUser,
    payload: web::Json<ScoreKra>,
) -> Result<impl Responder, AppError> {
    let score = score_evaluations(&payload.evaluations)?;

    tracing::info!(
        scored_by = auth.user_id,
        employee_id = ?payload.employee_id,
        percentage = score.percentage,
        "KRA evaluation scored"
    );

    Ok(HttpResponse::Ok().json(score))
}
