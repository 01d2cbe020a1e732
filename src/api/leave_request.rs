use crate::api::permissions::load_permission_set;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::holiday::Holiday;
use crate::model::leave_request::{
    HalfDayPeriod, LeaveApplication, LeaveRequest, LeaveStatus, LeaveType,
};
use crate::policy::{SandwichLeaveResult, calculate_sandwich_leave};
use crate::utils::holiday_cache;
use crate::utils::timezone::format_civil_datetime;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, start_date, end_date, leave_type, is_half_day, half_day_period,
    status, applied_at, actual_days, deducted_days, is_sandwich_leave, deduction_reason
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeductionPreviewRequest {
    pub application: LeaveApplication,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    /// Other applications of the same employee, used for Friday/Monday pairing.
    #[serde(default)]
    pub siblings: Vec<LeaveApplication>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveSubmitted {
    #[schema(example = "Leave request submitted")]
    pub message: String,
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    pub deduction: SandwichLeaveResult,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>, // items per page
}

const MAX_PER_PAGE: u32 = 100;

/// Resolves the requested page into `(page, per_page, offset)`.
fn page_window(page: Option<u64>, per_page: Option<u32>) -> Result<(u32, u32, u64), AppError> {
    let per_page = per_page.unwrap_or(10).clamp(1, MAX_PER_PAGE);
    let page = u32::try_from(page.unwrap_or(1).max(1))
        .map_err(|_| AppError::BadRequest("page is out of range".into()))?;
    let offset = u64::from(page - 1) * u64::from(per_page);
    Ok((page, per_page, offset))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

fn validate_half_day(
    is_half_day: bool,
    start: NaiveDate,
    end: NaiveDate,
    period: Option<HalfDayPeriod>,
) -> Result<(), AppError> {
    if !is_half_day {
        return Ok(());
    }
    if start != end {
        return Err(AppError::BadRequest(
            "Half-day leave must start and end on the same date".into(),
        ));
    }
    if period.is_none() {
        return Err(AppError::BadRequest(
            "half_day_period is required for half-day leave".into(),
        ));
    }
    Ok(())
}

/// The employee's live applications near `[start, end]`, close enough to
/// form a Friday/Monday pair.
async fn load_siblings(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LeaveRequest>, AppError> {
    let sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE employee_id = ?
        AND status NOT IN ('rejected', 'cancelled')
        AND start_date <= ?
        AND end_date >= ?
        "#
    );

    let rows = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(employee_id)
        .bind(end + Duration::days(3))
        .bind(start - Duration::days(3))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> Result<Option<LeaveRequest>, AppError> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
    let row = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn evaluate(
    pool: &MySqlPool,
    employee_id: u64,
    application: &LeaveApplication,
) -> Result<SandwichLeaveResult, AppError> {
    let holidays =
        holiday_cache::holidays_between(pool, application.start_date, application.end_date)
            .await?;
    let siblings: Vec<LeaveApplication> =
        load_siblings(pool, employee_id, application.start_date, application.end_date)
            .await?
            .iter()
            .map(LeaveRequest::to_application)
            .collect();

    Ok(calculate_sandwich_leave(application, &holidays, &siblings)?)
}

async fn store_deduction(
    pool: &MySqlPool,
    leave_id: u64,
    result: &SandwichLeaveResult,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE leave_requests
        SET actual_days = ?, deducted_days = ?, is_sandwich_leave = ?, deduction_reason = ?
        WHERE id = ?
        "#,
    )
    .bind(result.actual_days)
    .bind(result.deducted_days)
    .bind(result.is_sandwich_leave)
    .bind(&result.reason)
    .bind(leave_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Single-day applications exactly three days apart, such as a Friday and
/// the following Monday, affect each other's deduction.
fn is_pair_partner(changed: &LeaveApplication, candidate: &LeaveApplication) -> bool {
    let single_day = |app: &LeaveApplication| app.start_date == app.end_date;
    let same_request = changed.id.is_some() && candidate.id == changed.id;
    let gap = (candidate.start_date - changed.start_date).num_days().abs();

    single_day(changed) && single_day(candidate) && !same_request && gap == 3
}

/// Re-evaluates single-day Friday/Monday applications three days either
/// side of `changed`, whose pairing may have just appeared or vanished.
async fn refresh_partner_deductions(
    pool: &MySqlPool,
    employee_id: u64,
    changed: &LeaveApplication,
) -> Result<(), AppError> {
    if changed.start_date != changed.end_date {
        return Ok(());
    }

    let partners = load_siblings(pool, employee_id, changed.start_date, changed.end_date).await?;
    for partner in partners {
        let application = partner.to_application();
        if !is_pair_partner(changed, &application) {
            continue;
        }

        let result = evaluate(pool, employee_id, &application).await?;
        store_deduction(pool, partner.id, &result).await?;
        tracing::info!(
            leave_id = partner.id,
            deducted_days = result.deducted_days,
            "Partner leave deduction refreshed"
        );
    }

    Ok(())
}

/* =========================
Preview leave deduction
========================= */
/// Computes the deduction for a leave application without storing anything.
#[utoipa::path(
    post,
    path = "/api/leave/deduction",
    request_body = DeductionPreviewRequest,
    responses(
        (status = 200, description = "Deduction computed", body = SandwichLeaveResult),
        (status = 400, description = "Invalid application"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn preview_deduction(
    auth: AuthUser,
    payload: web::Json<DeductionPreviewRequest>,
) -> Result<impl Responder, AppError> {
    let result =
        calculate_sandwich_leave(&payload.application, &payload.holidays, &payload.siblings)?;

    tracing::debug!(
        user_id = auth.user_id,
        deducted_days = result.deducted_days,
        "Leave deduction previewed"
    );

    Ok(HttpResponse::Ok().json(result))
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveSubmitted),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, AppError> {
    let employee_id = auth.require_employee_profile()?;

    validate_half_day(
        payload.is_half_day,
        payload.start_date,
        payload.end_date,
        payload.half_day_period,
    )?;

    let mut application = LeaveApplication {
        id: None,
        start_date: payload.start_date,
        end_date: payload.end_date,
        is_half_day: payload.is_half_day,
        half_day_period: payload.half_day_period,
        status: LeaveStatus::Pending,
        applied_at: Utc::now(),
    };

    let deduction = evaluate(pool.get_ref(), employee_id, &application).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type, is_half_day, half_day_period,
             status, applied_at, actual_days, deducted_days, is_sandwich_leave, deduction_reason)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(application.start_date)
    .bind(application.end_date)
    .bind(payload.leave_type.to_string())
    .bind(application.is_half_day)
    .bind(application.half_day_period.map(|p| p.to_string()))
    .bind(application.status.to_string())
    .bind(application.applied_at)
    .bind(deduction.actual_days)
    .bind(deduction.deducted_days)
    .bind(deduction.is_sandwich_leave)
    .bind(&deduction.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        AppError::from(e)
    })?;

    let leave_id = inserted.last_insert_id();
    application.id = Some(leave_id);
    refresh_partner_deductions(pool.get_ref(), employee_id, &application).await?;

    tracing::info!(
        leave_id,
        employee_id,
        deducted_days = deduction.deducted_days,
        is_sandwich = deduction.is_sandwich_leave,
        "Leave request submitted"
    );

    Ok(HttpResponse::Created().json(LeaveSubmitted {
        message: "Leave request submitted".into(),
        id: leave_id,
        status: LeaveStatus::Pending,
        deduction,
    }))
}

/* =========================
Approve leave
========================= */
/// Approval re-evaluates the deduction, since a planned single Friday or
/// Monday is only charged one day once approved.
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = SandwichLeaveResult),
        (status = 400, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let permissions = load_permission_set(pool.get_ref(), &auth).await?;
    auth.require_page(&permissions, "hr", "leave")?;

    let leave_id = path.into_inner();
    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".into()))?;

    let mut application = leave.to_application();
    if application.status != LeaveStatus::Pending {
        return Err(AppError::BadRequest("Leave request already processed".into()));
    }
    application.status = LeaveStatus::Approved;

    let deduction = evaluate(pool.get_ref(), leave.employee_id, &application).await?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'approved', actual_days = ?, deducted_days = ?, is_sandwich_leave = ?,
            deduction_reason = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(deduction.actual_days)
    .bind(deduction.deducted_days)
    .bind(deduction.is_sandwich_leave)
    .bind(&deduction.reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Leave request already processed".into()));
    }

    refresh_partner_deductions(pool.get_ref(), leave.employee_id, &application).await?;

    tracing::info!(
        leave_id,
        approved_by = auth.user_id,
        applied_at = %format_civil_datetime(leave.applied_at),
        deducted_days = deduction.deducted_days,
        "Leave approved"
    );

    Ok(HttpResponse::Ok().json(deduction))
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let permissions = load_permission_set(pool.get_ref(), &auth).await?;
    auth.require_page(&permissions, "hr", "leave")?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'rejected'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Reject leave failed");
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Leave request not found or already processed".into(),
        ));
    }

    // a rejected half of a Friday/Monday pair no longer sandwiches the other
    if let Some(leave) = fetch_leave(pool.get_ref(), leave_id).await? {
        refresh_partner_deductions(pool.get_ref(), leave.employee_id, &leave.to_application())
            .await?;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".into()))?;

    // employees may read their own requests
    if auth.employee_id != Some(leave.employee_id) {
        auth.require_hr_or_admin()?;
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Page out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, AppError> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let (page, per_page, offset) = page_window(query.page, query.per_page)?;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_ref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.as_ref()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        AppError::from(e)
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        {where_sql}
        ORDER BY applied_at DESC
        LIMIT ? OFFSET ?
        "#
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            AppError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}
