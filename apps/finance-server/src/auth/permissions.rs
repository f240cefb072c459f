// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability strings and the role → permission table.
//!
//! Permissions are scoped to a resource and, for per-record actions, an
//! extent (`own` or `all`). The `users:*` and `system:config` permissions
//! are stored and reported but never evaluated by the engine.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthenticatedUser, Role};

/// A single capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Permission {
    #[serde(rename = "transactions:view:own")]
    TransactionsViewOwn,
    #[serde(rename = "transactions:view:all")]
    TransactionsViewAll,
    #[serde(rename = "transactions:create")]
    TransactionsCreate,
    #[serde(rename = "transactions:edit:own")]
    TransactionsEditOwn,
    #[serde(rename = "transactions:edit:all")]
    TransactionsEditAll,
    #[serde(rename = "transactions:delete:own")]
    TransactionsDeleteOwn,
    #[serde(rename = "transactions:delete:all")]
    TransactionsDeleteAll,
    #[serde(rename = "summary:view:own")]
    SummaryViewOwn,
    #[serde(rename = "summary:view:all")]
    SummaryViewAll,
    #[serde(rename = "users:view")]
    UsersView,
    #[serde(rename = "users:create")]
    UsersCreate,
    #[serde(rename = "users:edit")]
    UsersEdit,
    #[serde(rename = "users:delete")]
    UsersDelete,
    #[serde(rename = "system:config")]
    SystemConfig,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::TransactionsViewOwn,
        Permission::TransactionsViewAll,
        Permission::TransactionsCreate,
        Permission::TransactionsEditOwn,
        Permission::TransactionsEditAll,
        Permission::TransactionsDeleteOwn,
        Permission::TransactionsDeleteAll,
        Permission::SummaryViewOwn,
        Permission::SummaryViewAll,
        Permission::UsersView,
        Permission::UsersCreate,
        Permission::UsersEdit,
        Permission::UsersDelete,
        Permission::SystemConfig,
    ];

    /// Wire form, e.g. `transactions:edit:own`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TransactionsViewOwn => "transactions:view:own",
            Permission::TransactionsViewAll => "transactions:view:all",
            Permission::TransactionsCreate => "transactions:create",
            Permission::TransactionsEditOwn => "transactions:edit:own",
            Permission::TransactionsEditAll => "transactions:edit:all",
            Permission::TransactionsDeleteOwn => "transactions:delete:own",
            Permission::TransactionsDeleteAll => "transactions:delete:all",
            Permission::SummaryViewOwn => "summary:view:own",
            Permission::SummaryViewAll => "summary:view:all",
            Permission::UsersView => "users:view",
            Permission::UsersCreate => "users:create",
            Permission::UsersEdit => "users:edit",
            Permission::UsersDelete => "users:delete",
            Permission::SystemConfig => "system:config",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Immutable role → default permission table.
///
/// Built once at start-up and shared read-only; tests may build their own
/// via [`PermissionCatalog::from_table`].
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    table: HashMap<Role, BTreeSet<Permission>>,
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        use Permission::*;

        Self::from_table([
            (
                Role::Admin,
                vec![
                    TransactionsViewAll,
                    TransactionsCreate,
                    TransactionsEditAll,
                    TransactionsDeleteAll,
                    SummaryViewAll,
                    UsersView,
                    UsersCreate,
                    UsersEdit,
                    UsersDelete,
                    SystemConfig,
                ],
            ),
            (
                Role::User,
                vec![
                    TransactionsViewOwn,
                    TransactionsCreate,
                    TransactionsEditOwn,
                    TransactionsDeleteOwn,
                    SummaryViewOwn,
                ],
            ),
            (Role::Viewer, vec![TransactionsViewOwn, SummaryViewOwn]),
            (Role::Guest, vec![]),
        ])
    }
}

impl PermissionCatalog {
    pub fn from_table<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(role, perms)| (role, perms.into_iter().collect()))
                .collect(),
        }
    }

    /// Default permissions of a role. Roles missing from the table have none.
    pub fn role_defaults(&self, role: Role) -> BTreeSet<Permission> {
        self.table.get(&role).cloned().unwrap_or_default()
    }

    /// `role_defaults(role) ∪ custom_permissions`.
    pub fn effective_permissions(&self, user: &AuthenticatedUser) -> BTreeSet<Permission> {
        let mut effective = self.role_defaults(user.role);
        effective.extend(user.custom_permissions.iter().copied());
        effective
    }

    pub fn has_permission(&self, user: &AuthenticatedUser, permission: Permission) -> bool {
        user.custom_permissions.contains(&permission)
            || self
                .table
                .get(&user.role)
                .is_some_and(|defaults| defaults.contains(&permission))
    }

    /// True if any of `permissions` is held. False for an empty slice.
    pub fn has_any(&self, user: &AuthenticatedUser, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(user, *p))
    }

    /// True if every one of `permissions` is held. True for an empty slice.
    pub fn has_all(&self, user: &AuthenticatedUser, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(user, *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role, custom: &[Permission]) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 7,
            email: "someone@example.com".to_string(),
            role,
            custom_permissions: custom.iter().copied().collect(),
        }
    }

    #[test]
    fn guest_has_no_defaults() {
        let catalog = PermissionCatalog::default();
        assert!(catalog.role_defaults(Role::Guest).is_empty());
        assert!(catalog.effective_permissions(&user_with(Role::Guest, &[])).is_empty());
    }

    #[test]
    fn viewer_defaults_are_read_only() {
        let catalog = PermissionCatalog::default();
        let defaults = catalog.role_defaults(Role::Viewer);
        assert_eq!(
            defaults,
            BTreeSet::from([Permission::TransactionsViewOwn, Permission::SummaryViewOwn])
        );
    }

    #[test]
    fn missing_role_in_table_has_no_defaults() {
        let catalog = PermissionCatalog::from_table([(Role::Admin, vec![Permission::SystemConfig])]);
        assert!(catalog.role_defaults(Role::User).is_empty());
    }

    #[test]
    fn effective_permissions_is_superset_of_both_sources() {
        let catalog = PermissionCatalog::default();
        let custom = [Permission::TransactionsDeleteAll, Permission::SummaryViewAll];
        for role in Role::ALL {
            let user = user_with(role, &custom);
            let effective = catalog.effective_permissions(&user);
            assert!(effective.is_superset(&catalog.role_defaults(role)));
            assert!(effective.is_superset(&user.custom_permissions));
        }
    }

    #[test]
    fn effective_permissions_deduplicates() {
        let catalog = PermissionCatalog::default();
        let user = user_with(Role::Viewer, &[Permission::TransactionsViewOwn]);
        assert_eq!(catalog.effective_permissions(&user).len(), 2);
    }

    #[test]
    fn has_any_and_has_all() {
        let catalog = PermissionCatalog::default();
        let viewer = user_with(Role::Viewer, &[]);

        assert!(catalog.has_any(
            &viewer,
            &[Permission::TransactionsCreate, Permission::SummaryViewOwn]
        ));
        assert!(!catalog.has_all(
            &viewer,
            &[Permission::TransactionsCreate, Permission::SummaryViewOwn]
        ));
        assert!(catalog.has_all(
            &viewer,
            &[Permission::TransactionsViewOwn, Permission::SummaryViewOwn]
        ));
        assert!(!catalog.has_any(&viewer, &[]));
        assert!(catalog.has_all(&viewer, &[]));
    }

    #[test]
    fn custom_grants_are_additive() {
        let catalog = PermissionCatalog::default();
        let viewer = user_with(Role::Viewer, &[Permission::TransactionsCreate]);
        assert!(catalog.has_permission(&viewer, Permission::TransactionsCreate));
        assert!(catalog.has_permission(&viewer, Permission::TransactionsViewOwn));
    }

    #[test]
    fn permission_wire_form_round_trips() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>(), Ok(p));
            assert_eq!(serde_json::to_string(&p).unwrap(), format!("\"{}\"", p.as_str()));
        }
        assert!("transactions:fly".parse::<Permission>().is_err());
    }
}
