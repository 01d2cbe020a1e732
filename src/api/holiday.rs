use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::holiday::Holiday;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::holiday_cache;
use crate::utils::timezone::{format_civil_date, parse_civil_date, to_civil_date};

const UPDATABLE_COLUMNS: &[&str] = &["holiday_date", "name", "is_optional"];

/// Maps an update body written with the `Holiday` field names onto table
/// columns. `date` becomes `holiday_date` and must be a `YYYY-MM-DD` date.
fn holiday_update_columns(payload: &serde_json::Value) -> Result<serde_json::Value, AppError> {
    let mut fields = payload
        .as_object()
        .cloned()
        .ok_or_else(|| AppError::BadRequest("Payload must be a JSON object".into()))?;

    if let Some(date) = fields.remove("date") {
        if fields.contains_key("holiday_date") {
            return Err(AppError::BadRequest(
                "Use either 'date' or 'holiday_date', not both".into(),
            ));
        }
        fields.insert("holiday_date".to_string(), date);
    }

    if let Some(date) = fields.get("holiday_date") {
        let parsed = date.as_str().map(parse_civil_date);
        let Some(Ok(date)) = parsed else {
            return Err(AppError::BadRequest("date must be a YYYY-MM-DD date".into()));
        };
        fields.insert(
            "holiday_date".to_string(),
            serde_json::Value::String(date.format("%Y-%m-%d").to_string()),
        );
    }

    Ok(serde_json::Value::Object(fields))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2026-01-26", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Republic Day")]
    pub name: String,
    #[serde(default)]
    pub is_optional: bool,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    /// Civil year; defaults to the current one
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/holidays",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holidays of the year", body = [Holiday]),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayQuery>,
) -> Result<impl Responder, AppError> {
    let year = query
        .year
        .unwrap_or_else(|| to_civil_date(Utc::now()).year());

    let holidays = holiday_cache::holidays_for_year(pool.get_ref(), year).await?;

    Ok(HttpResponse::Ok().json(holidays.as_ref()))
}

#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created"),
        (status = 400),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Holiday name must not be empty".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO holidays (holiday_date, name, is_optional)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(payload.date)
    .bind(name)
    .bind(payload.is_optional)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, date = %payload.date, "Failed to create holiday");
        AppError::from(e)
    })?;

    holiday_cache::invalidate_year(payload.date.year()).await;
    tracing::info!(
        holiday_id = result.last_insert_id(),
        date = %format_civil_date(payload.date),
        name,
        "Holiday created"
    );

    Ok(HttpResponse::Created().json(Holiday {
        id: Some(result.last_insert_id()),
        date: payload.date,
        name: name.to_string(),
        is_optional: payload.is_optional,
    }))
}

async fn holiday_year(pool: &MySqlPool, holiday_id: u64) -> Result<Option<i32>, AppError> {
    let date = sqlx::query_scalar::<_, NaiveDate>("SELECT holiday_date FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .fetch_optional(pool)
        .await?;
    Ok(date.map(|d| d.year()))
}

/// Partial update; accepts any subset of `date`, `name`, `is_optional`.
/// The column name `holiday_date` is accepted in place of `date`.
#[utoipa::path(
    put,
    path = "/api/holidays/{holiday_id}",
    request_body(content = Object, example = json!({"date": "2026-01-26", "is_optional": true})),
    params(
        ("holiday_id" = u64, Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Holiday updated"),
        (status = 400),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<serde_json::Value>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let holiday_id = path.into_inner();
    let old_year = holiday_year(pool.get_ref(), holiday_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Holiday not found".into()))?;

    let columns = holiday_update_columns(&payload)?;
    let update = build_update_sql("holidays", &columns, UPDATABLE_COLUMNS, "id", holiday_id)?;
    execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, holiday_id, "Failed to update holiday");
        AppError::from(e)
    })?;

    // the date may have moved across years
    holiday_cache::invalidate_year(old_year).await;
    if let Some(new_year) = holiday_year(pool.get_ref(), holiday_id).await? {
        holiday_cache::invalidate_year(new_year).await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday updated"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/holidays/{holiday_id}",
    params(
        ("holiday_id" = u64, Path, description = "Holiday ID")
    ),
    responses(
        (status = 204, description = "Holiday deleted"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    let holiday_id = path.into_inner();
    let year = holiday_year(pool.get_ref(), holiday_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Holiday not found".into()))?;

    sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await?;

    holiday_cache::invalidate_year(year).await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn date_field_maps_to_column() {
        let columns = holiday_update_columns(&json!({"date": " 2026-01-26 "})).unwrap();
        assert_eq!(columns, json!({"holiday_date": "2026-01-26"}));

        let columns = holiday_update_columns(&json!({"holiday_date": "2026-08-15"})).unwrap();
        assert_eq!(columns, json!({"holiday_date": "2026-08-15"}));

        let columns = holiday_update_columns(&json!({"name": "Diwali"})).unwrap();
        assert_eq!(columns, json!({"name": "Diwali"}));
    }

    #[test]
    fn bad_dates_are_rejected() {
        for body in [
            json!({"date": "26/01/2026"}),
            json!({"date": 20260126}),
            json!({"date": "2026-01-26", "holiday_date": "2026-01-27"}),
            json!(["date"]),
        ] {
            assert!(matches!(
                holiday_update_columns(&body),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
