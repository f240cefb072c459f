// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership-aware authorization decisions.
//!
//! Every per-record decision follows the same order:
//!
//! 1. Admins are allowed.
//! 2. Holders of the `…:all` permission for the action are allowed.
//! 3. Holders of the `…:own` permission are allowed on their own records.
//! 4. Everyone else is denied.
//!
//! An `own` grant never reaches another user's record, whatever `all`
//! grants the identity holds for other actions.

use std::collections::BTreeSet;

use super::{AuthError, AuthenticatedUser, Permission, PermissionCatalog};

/// Resources that carry a single owning user.
pub trait OwnedResource {
    fn owner_id(&self) -> i64;
}

/// Per-record transaction action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Delete,
}

impl Action {
    /// `(all, own)` permissions governing this action.
    fn scopes(self) -> (Permission, Permission) {
        match self {
            Action::View => (Permission::TransactionsViewAll, Permission::TransactionsViewOwn),
            Action::Edit => (Permission::TransactionsEditAll, Permission::TransactionsEditOwn),
            Action::Delete => (
                Permission::TransactionsDeleteAll,
                Permission::TransactionsDeleteOwn,
            ),
        }
    }
}

/// Turns an identity and an owner id into allow/deny verdicts.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationEngine {
    catalog: PermissionCatalog,
}

impl AuthorizationEngine {
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn is_admin(&self, user: &AuthenticatedUser) -> bool {
        user.is_admin()
    }

    pub fn effective_permissions(&self, user: &AuthenticatedUser) -> BTreeSet<Permission> {
        self.catalog.effective_permissions(user)
    }

    pub fn can(&self, user: &AuthenticatedUser, action: Action, owner_id: i64) -> bool {
        let (all, own) = action.scopes();
        self.scoped(user, all, own, owner_id)
    }

    pub fn can_view(&self, user: &AuthenticatedUser, owner_id: i64) -> bool {
        self.can(user, Action::View, owner_id)
    }

    pub fn can_edit(&self, user: &AuthenticatedUser, owner_id: i64) -> bool {
        self.can(user, Action::Edit, owner_id)
    }

    pub fn can_delete(&self, user: &AuthenticatedUser, owner_id: i64) -> bool {
        self.can(user, Action::Delete, owner_id)
    }

    /// Whether `owner_id`'s records count towards `user`'s summary.
    pub fn can_view_summary(&self, user: &AuthenticatedUser, owner_id: i64) -> bool {
        self.scoped(
            user,
            Permission::SummaryViewAll,
            Permission::SummaryViewOwn,
            owner_id,
        )
    }

    /// Coarse gate used before any record is fetched.
    pub fn require_permission(&self, user: &AuthenticatedUser, permission: Permission) -> bool {
        self.is_admin(user) || self.catalog.has_permission(user, permission)
    }

    pub fn require(&self, user: &AuthenticatedUser, permission: Permission) -> Result<(), AuthError> {
        if self.require_permission(user, permission) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// Fine-grained check against a fetched resource.
    pub fn authorize<R: OwnedResource>(
        &self,
        user: &AuthenticatedUser,
        action: Action,
        resource: &R,
    ) -> Result<(), AuthError> {
        if self.can(user, action, resource.owner_id()) {
            Ok(())
        } else {
            tracing::info!(
                user_id = user.user_id,
                owner_id = resource.owner_id(),
                ?action,
                "Access to resource denied"
            );
            Err(AuthError::Forbidden)
        }
    }

    fn scoped(&self, user: &AuthenticatedUser, all: Permission, own: Permission, owner_id: i64) -> bool {
        if self.is_admin(user) {
            return true;
        }
        if self.catalog.has_permission(user, all) {
            return true;
        }
        self.catalog.has_permission(user, own) && owner_id == user.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    struct TestResource {
        owner: i64,
    }

    impl OwnedResource for TestResource {
        fn owner_id(&self) -> i64 {
            self.owner
        }
    }

    fn make_user(user_id: i64, role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(user_id, format!("user{user_id}@example.com"), role)
    }

    #[test]
    fn admin_bypasses_every_check() {
        let engine = AuthorizationEngine::default();
        let admin = make_user(1, Role::Admin);
        for owner in [1, 2, -5, i64::MAX] {
            assert!(engine.can_view(&admin, owner));
            assert!(engine.can_edit(&admin, owner));
            assert!(engine.can_delete(&admin, owner));
            assert!(engine.can_view_summary(&admin, owner));
        }
    }

    #[test]
    fn admin_bypass_does_not_depend_on_catalog() {
        let engine = AuthorizationEngine::new(PermissionCatalog::from_table(Vec::<(Role, Vec<Permission>)>::new()));
        let admin = make_user(1, Role::Admin);
        assert!(engine.can_delete(&admin, 99));
        assert!(engine.require_permission(&admin, Permission::TransactionsCreate));
    }

    #[test]
    fn user_is_limited_to_own_records() {
        let engine = AuthorizationEngine::default();
        let user = make_user(10, Role::User);

        assert!(engine.can_edit(&user, 10));
        assert!(!engine.can_edit(&user, 11));
        assert!(engine.can_view(&user, 10));
        assert!(!engine.can_view(&user, 11));
        assert!(engine.can_delete(&user, 10));
        assert!(!engine.can_delete(&user, 11));
    }

    #[test]
    fn viewer_can_only_view_own() {
        let engine = AuthorizationEngine::default();
        let viewer = make_user(3, Role::Viewer);

        assert!(engine.can_view(&viewer, 3));
        assert!(!engine.can_edit(&viewer, 3));
        assert!(!engine.can_delete(&viewer, 3));
        assert!(!engine.can_view(&viewer, 4));
    }

    #[test]
    fn all_scope_overrides_ownership() {
        let engine = AuthorizationEngine::default();
        let user = make_user(10, Role::User).with_permissions([Permission::TransactionsDeleteAll]);

        assert!(engine.can_delete(&user, 11));
        // Unrelated actions stay own-scoped.
        assert!(!engine.can_edit(&user, 11));
        assert!(!engine.can_view(&user, 11));
    }

    #[test]
    fn own_scope_without_all_denies_foreign_records() {
        let engine = AuthorizationEngine::default();
        let user = make_user(10, Role::Viewer).with_permissions([
            Permission::TransactionsEditOwn,
            Permission::SummaryViewAll,
        ]);

        assert!(engine.can_edit(&user, 10));
        assert!(!engine.can_edit(&user, 11));
        assert!(engine.can_view_summary(&user, 11));
    }

    #[test]
    fn guest_is_denied_everything() {
        let engine = AuthorizationEngine::default();
        let guest = make_user(5, Role::Guest);

        assert!(!engine.require_permission(&guest, Permission::TransactionsCreate));
        assert_eq!(
            engine.require(&guest, Permission::TransactionsCreate),
            Err(AuthError::Forbidden)
        );
        assert!(!engine.can_view(&guest, 5));
        assert!(!engine.can_view_summary(&guest, 5));
    }

    #[test]
    fn require_permission_uses_custom_grants() {
        let engine = AuthorizationEngine::default();
        let guest = make_user(5, Role::Guest).with_permissions([Permission::TransactionsCreate]);
        assert!(engine.require(&guest, Permission::TransactionsCreate).is_ok());
    }

    #[test]
    fn authorize_checks_resource_owner() {
        let engine = AuthorizationEngine::default();
        let user = make_user(10, Role::User);

        assert!(engine
            .authorize(&user, Action::Edit, &TestResource { owner: 10 })
            .is_ok());
        assert_eq!(
            engine.authorize(&user, Action::Edit, &TestResource { owner: 11 }),
            Err(AuthError::Forbidden)
        );
    }
}
