use crate::api::holiday::{CreateHoliday, HolidayQuery};
use crate::api::kra::ScoreKra;
use crate::api::leave_request::{
    CreateLeave, DeductionPreviewRequest, LeaveFilter, LeaveListResponse, LeaveSubmitted,
};
use crate::api::permissions::{EffectivePermissions, PermissionQuery};
use crate::model::holiday::Holiday;
use crate::model::kra::{KraGoalEvaluation, KraScore};
use crate::model::leave_request::{
    HalfDayPeriod, LeaveApplication, LeaveRequest, LeaveStatus, LeaveType,
};
use crate::model::permission::{AccessDecision, PermissionSource};
use crate::model::role::Role;
use crate::policy::sandwich::{DeductionDetails, SandwichLeaveResult};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM System API",
        version = "1.0.0",
        description = r#"
## Human Resource Management (HRM) System

Leave policy, holiday calendar, KRA scoring and dashboard permissions.

### 🔹 Key Features
- **Leave Management**
  - Apply for leave with sandwich-leave deduction, approve/reject requests
  - Preview the deduction of any application without storing it
- **Holiday Calendar**
  - Yearly list of mandatory and optional holidays
- **KRA Evaluation**
  - Weighted percentage over scored goals
- **Permissions**
  - Dashboard/page access resolved from user overrides, role grants and legacy role defaults

### 🔐 Security
Endpoints expect a **JWT Bearer** access token issued by the identity provider.

### 📅 Dates
All civil dates are evaluated at UTC+05:30.
"#,
    ),
    paths(
        crate::api::leave_request::preview_deduction,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::kra::score_kra,

        crate::api::permissions::my_permissions,
        crate::api::permissions::check_permission
    ),
    components(
        schemas(
            LeaveApplication,
            LeaveStatus,
            LeaveType,
            HalfDayPeriod,
            LeaveRequest,
            CreateLeave,
            DeductionPreviewRequest,
            LeaveSubmitted,
            LeaveFilter,
            LeaveListResponse,
            SandwichLeaveResult,
            DeductionDetails,
            Holiday,
            CreateHoliday,
            HolidayQuery,
            KraGoalEvaluation,
            KraScore,
            ScoreKra,
            Role,
            AccessDecision,
            PermissionSource,
            EffectivePermissions,
            PermissionQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "KRA", description = "KRA evaluation APIs"),
        (name = "Permissions", description = "Dashboard permission APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
