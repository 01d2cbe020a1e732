//! Dashboard/page access resolution.
//!
//! Lookups go through three tiers in a fixed order:
//!
//! 1. the user's explicit override for the page,
//! 2. the role's grant for the page,
//! 3. the legacy default for the role name, which works per dashboard.
//!
//! The first tier holding an entry answers.

use std::collections::BTreeSet;

use crate::model::permission::{AccessDecision, DASHBOARD_CATALOGUE, PermissionMap, PermissionSource};
use crate::model::role::Role;

/// Dashboards a legacy role name opened before per-page grants existed.
pub fn legacy_dashboards(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &["admin", "hr", "manager", "employee"],
        Role::Hr => &["hr", "employee"],
        Role::Manager => &["manager", "employee"],
        Role::Employee => &["employee"],
    }
}

fn lookup(map: &PermissionMap, dashboard: &str, page: &str) -> Option<bool> {
    map.get(dashboard).and_then(|pages| pages.get(page)).copied()
}

/// Everything needed to answer access questions for one acting user.
#[derive(Debug, Clone)]
pub struct PermissionSet {
    pub role: Role,
    pub role_grants: PermissionMap,
    pub user_overrides: PermissionMap,
}

impl PermissionSet {
    pub fn new(role: Role, role_grants: PermissionMap, user_overrides: PermissionMap) -> Self {
        Self {
            role,
            role_grants,
            user_overrides,
        }
    }

    /// Only the legacy tier, for users with no stored grants.
    pub fn legacy(role: Role) -> Self {
        Self::new(role, PermissionMap::new(), PermissionMap::new())
    }

    pub fn resolve(&self, dashboard: &str, page: &str) -> AccessDecision {
        if let Some(granted) = lookup(&self.user_overrides, dashboard, page) {
            return AccessDecision {
                granted,
                source: PermissionSource::UserOverride,
            };
        }

        if let Some(granted) = lookup(&self.role_grants, dashboard, page) {
            return AccessDecision {
                granted,
                source: PermissionSource::RoleGrant,
            };
        }

        AccessDecision {
            granted: legacy_dashboards(self.role).contains(&dashboard),
            source: PermissionSource::LegacyDefault,
        }
    }

    pub fn can_access_page(&self, dashboard: &str, page: &str) -> bool {
        self.resolve(dashboard, page).granted
    }

    /// Pages named for `dashboard` in either explicit tier.
    fn explicit_pages(&self, dashboard: &str) -> BTreeSet<&str> {
        [&self.user_overrides, &self.role_grants]
            .into_iter()
            .filter_map(|map| map.get(dashboard))
            .flat_map(|pages| pages.keys().map(String::as_str))
            .collect()
    }

    /// A dashboard is open when any explicitly listed page resolves to
    /// granted. With no explicit entries the legacy default decides.
    pub fn can_access_dashboard(&self, dashboard: &str) -> bool {
        let pages = self.explicit_pages(dashboard);
        if pages.is_empty() {
            return legacy_dashboards(self.role).contains(&dashboard);
        }
        pages.into_iter().any(|page| self.can_access_page(dashboard, page))
    }

    /// Resolved access for every catalogue page plus any page named in
    /// the explicit tiers.
    pub fn effective_permissions(&self) -> PermissionMap {
        let mut effective = PermissionMap::new();
        let mut record = |dashboard: &str, page: &str| {
            let granted = self.can_access_page(dashboard, page);
            effective
                .entry(dashboard.to_string())
                .or_default()
                .insert(page.to_string(), granted);
        };

        for (dashboard, pages) in DASHBOARD_CATALOGUE {
            for page in pages.iter() {
                record(*dashboard, *page);
            }
        }

        for map in [&self.user_overrides, &self.role_grants] {
            for (dashboard, pages) in map {
                for page in pages.keys() {
                    record(dashboard.as_str(), page.as_str());
                }
            }
        }

        effective
    }
}
