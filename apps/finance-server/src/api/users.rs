// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{ApiResponse, CurrentUserResponse, UserProfile},
    state::AppState,
    storage::UserRepository,
};

/// Profile and effective permissions of the caller.
///
/// Custom grants come from the stored user record; the token itself only
/// carries the role.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<CurrentUserResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CurrentUserResponse>>, ApiError> {
    let stored = {
        let storage = state.storage.read().await;
        UserRepository::new(&storage).find_by_id(user.user_id)?
    };

    // The token's role wins over the stored one until the token expires.
    let (identity, name) = match stored {
        Some(record) => (user.with_permissions(record.permissions), record.name),
        None => (user, None),
    };

    let permissions = state.engine().effective_permissions(&identity);
    let response = CurrentUserResponse {
        profile: UserProfile {
            id: identity.user_id,
            email: identity.email,
            name,
            role: identity.role,
        },
        permissions,
    };

    Ok(Json(ApiResponse::new(response, "User retrieved successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Permission, Role};
    use crate::storage::{repository::hash_password, StoredUser};
    use crate::test_support::test_state;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn returns_role_defaults_and_custom_grants() {
        let (state, _temp_dir) = test_state();
        {
            let storage = state.storage.read().await;
            UserRepository::new(&storage)
                .create(&StoredUser {
                    id: 4,
                    email: "vic@example.com".to_string(),
                    name: Some("Vic".to_string()),
                    role: Role::Viewer,
                    permissions: BTreeSet::from([Permission::TransactionsCreate]),
                    password_hash: hash_password("pw").unwrap(),
                })
                .unwrap();
        }

        let caller = AuthenticatedUser::new(4, "vic@example.com", Role::Viewer);
        let Json(response) = get_current_user(Auth(caller), State(state)).await.unwrap();

        assert_eq!(response.data.profile.name.as_deref(), Some("Vic"));
        assert_eq!(
            response.data.permissions,
            BTreeSet::from([
                Permission::TransactionsViewOwn,
                Permission::TransactionsCreate,
                Permission::SummaryViewOwn,
            ])
        );
    }

    #[tokio::test]
    async fn unknown_user_falls_back_to_token_identity() {
        let (state, _temp_dir) = test_state();

        let caller = AuthenticatedUser::new(99, "gone@example.com", Role::Guest);
        let Json(response) = get_current_user(Auth(caller), State(state)).await.unwrap();

        assert_eq!(response.data.profile.id, 99);
        assert_eq!(response.data.profile.role, Role::Guest);
        assert!(response.data.permissions.is_empty());
    }
}
