use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `dashboard -> page -> granted`
pub type PermissionMap = BTreeMap<String, BTreeMap<String, bool>>;

/// Built-in dashboards and the pages each one exposes.
pub const DASHBOARD_CATALOGUE: &[(&str, &[&str])] = &[
    ("admin", &["users", "roles", "settings", "reports"]),
    (
        "hr",
        &[
            "employees",
            "documents",
            "incidents",
            "leave",
            "holidays",
            "assets",
            "kra",
            "learning",
            "reports",
        ],
    ),
    ("manager", &["team", "leave_approvals", "kra_reviews", "reports"]),
    ("employee", &["profile", "documents", "leave", "kra", "learning", "assets"]),
];

/// Which tier answered a permission lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    UserOverride,
    RoleGrant,
    LegacyDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessDecision {
    pub granted: bool,
    pub source: PermissionSource,
}
