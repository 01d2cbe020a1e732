use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::policy::PermissionSet;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    dev::Payload,
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use futures::future::{Ready, ready};

/// The acting user, taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let result = req
            .app_data::<Data<Config>>()
            .ok_or_else(|| AppError::InternalServerError(Some("Config missing".into())))
            .and_then(|config| authenticate(req.headers(), config));
        ready(result)
    }
}

/// Resolves the bearer token in `headers` to the acting user.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<AuthUser, AppError> {
    let header_value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".into()))?;

    let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must start with Bearer".into())
    })?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    let role =
        Role::from_id(claims.role).ok_or_else(|| AppError::Unauthorized("Invalid role".into()))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR/Admin only".into()))
        }
    }

    pub fn require_employee_profile(&self) -> Result<u64, AppError> {
        self.employee_id
            .ok_or_else(|| AppError::Forbidden("No employee profile".into()))
    }

    /// Checks page access against the user's resolved permissions.
    pub fn require_page(
        &self,
        permissions: &PermissionSet,
        dashboard: &str,
        page: &str,
    ) -> Result<(), AppError> {
        if permissions.can_access_page(dashboard, page) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.user_id, dashboard, page, "Page access denied");
            Err(AppError::Forbidden(format!("No access to {}/{}", dashboard, page)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Claims, TokenType};
    use actix_web::test::TestRequest;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn config() -> Config {
        Config {
            database_url: "mysql://localhost/hrms".into(),
            jwt_secret: "unit-test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            rate_protected_per_min: 60,
            api_prefix: "/api".into(),
            holiday_cache_ttl_secs: 60,
            holiday_cache_capacity: 4,
            log_dir: "logs".into(),
            run_migrations: false,
        }
    }

    fn bearer(role: u8) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
        let claims = Claims {
            user_id: 3,
            sub: "meera".into(),
            role,
            exp: now + 600,
            token_type: TokenType::Access,
            employee_id: Some(1001),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        format!("Bearer {}", token)
    }

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 9,
            username: "ravi".into(),
            role,
            employee_id: None,
        }
    }

    #[test]
    fn hr_and_admin_pass_the_hr_guard() {
        assert!(user(Role::Admin).require_hr_or_admin().is_ok());
        assert!(user(Role::Hr).require_hr_or_admin().is_ok());
        assert!(user(Role::Manager).require_hr_or_admin().is_err());
    }

    #[test]
    fn page_guard_uses_resolved_permissions() {
        let manager = user(Role::Manager);
        let perms = PermissionSet::legacy(Role::Manager);
        assert!(manager.require_page(&perms, "manager", "leave_approvals").is_ok());
        assert!(manager.require_page(&perms, "hr", "leave").is_err());
        assert!(manager.require_employee_profile().is_err());
    }

    #[test]
    fn header_resolves_to_user() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, bearer(Role::Hr.id())))
            .to_http_request();
        let user = authenticate(req.headers(), &config()).unwrap();
        assert_eq!(user.role, Role::Hr);
        assert_eq!(user.employee_id, Some(1001));
    }

    #[test]
    fn malformed_headers_are_unauthorized() {
        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            authenticate(missing.headers(), &config()),
            Err(AppError::Unauthorized(_))
        ));

        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert!(matches!(
            authenticate(basic.headers(), &config()),
            Err(AppError::Unauthorized(_))
        ));

        let unknown_role = TestRequest::default()
            .insert_header((AUTHORIZATION, bearer(42)))
            .to_http_request();
        assert!(matches!(
            authenticate(unknown_role.headers(), &config()),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_prefers_user_set_by_middleware() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(user(Role::Manager));

        let extracted = AuthUser::extract(&req).await.unwrap();
        assert_eq!(extracted.role, Role::Manager);
        assert_eq!(extracted.user_id, 9);
    }
}
