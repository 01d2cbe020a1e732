use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::permission::{AccessDecision, PermissionMap};
use crate::model::role::Role;
use crate::policy::PermissionSet;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct EffectivePermissions {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "hr")]
    pub role: Role,
    /// dashboard -> page -> granted
    #[schema(value_type = Object, example = json!({"hr": {"leave": true}}))]
    pub permissions: PermissionMap,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PermissionQuery {
    #[schema(example = "hr")]
    pub dashboard: String,
    #[schema(example = "leave")]
    pub page: String,
}

fn parse_map(raw: Option<String>, owner: &str) -> PermissionMap {
    match raw {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            // unreadable grants fall through to the next tier
            tracing::warn!(error = %e, owner, "Ignoring malformed permission map");
            PermissionMap::new()
        }),
        None => PermissionMap::new(),
    }
}

/// Loads the role grants and user overrides of the acting user.
pub async fn load_permission_set(
    pool: &MySqlPool,
    auth: &AuthUser,
) -> Result<PermissionSet, AppError> {
    let role_raw = sqlx::query_scalar::<_, String>(
        "SELECT permissions FROM role_permissions WHERE role_id = ?",
    )
    .bind(auth.role.id())
    .fetch_optional(pool)
    .await?;

    let user_raw = sqlx::query_scalar::<_, String>(
        "SELECT permissions FROM user_permissions WHERE user_id = ?",
    )
    .bind(auth.user_id)
    .fetch_optional(pool)
    .await?;

    Ok(PermissionSet::new(
        auth.role,
        parse_map(role_raw, auth.role.name()),
        parse_map(user_raw, &auth.username),
    ))
}

/// Effective dashboard/page permissions of the caller.
#[utoipa::path(
    get,
    path = "/api/permissions/me",
    responses(
        (status = 200, description = "Resolved permissions", body = EffectivePermissions),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn my_permissions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, AppError> {
    let permissions = load_permission_set(pool.get_ref(), &auth).await?;

    Ok(HttpResponse::Ok().json(EffectivePermissions {
        user_id: auth.user_id,
        role: auth.role,
        permissions: permissions.effective_permissions(),
    }))
}

/// One access decision, with the tier that produced it.
#[utoipa::path(
    get,
    path = "/api/permissions/check",
    params(PermissionQuery),
    responses(
        (status = 200, description = "Access decision", body = AccessDecision),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn check_permission(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PermissionQuery>,
) -> Result<impl Responder, AppError> {
    let permissions = load_permission_set(pool.get_ref(), &auth).await?;
    let decision = permissions.resolve(&query.dashboard, &query.page);

    Ok(HttpResponse::Ok().json(decision))
}
