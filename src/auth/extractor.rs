// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! `AdminOnly` and `DecoratorOnly` additionally check the caller's role. The
//! role is read from the live user store, never from the token, so revoking a
//! role takes effect on the caller's very next request.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::{AuthError, AuthenticatedUser, Claims, Role};
use crate::state::AppState;
use crate::storage::repository::UserRepository;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for authenticated callers.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_token(token, &state.auth_config.jwt_secret)?;
        Ok(Auth(user))
    }
}

/// Verify the HS256 token and extract the caller identity.
fn verify_token(token: &str, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims.into())
}

/// Look up the caller's current role in the user store.
fn live_role(state: &AppState, email: &str) -> Result<Role, AuthError> {
    UserRepository::new(state.storage())
        .role_of(email)
        .map_err(|e| AuthError::InternalError(format!("role lookup failed: {e}")))
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if live_role(state, &user.email)? != Role::Admin {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Extractor that requires the decorator role.
pub struct DecoratorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for DecoratorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if live_role(state, &user.email)? != Role::Decorator {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(DecoratorOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::repository::StoredUser;
    use crate::storage::{DocumentStorage, StoragePaths};
    use axum::http::Request;
    use chrono::Utc;
    use tempfile::TempDir;

    const TEST_SECRET: &str = "extractor-test-secret";

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");

        let state = AppState::new(storage).with_auth_config(AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
        });
        (state, temp_dir)
    }

    fn seed_user(state: &AppState, email: &str, role: Role) {
        let repo = UserRepository::new(state.storage());
        repo.create(&StoredUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: "Test User".to_string(),
            photo_url: None,
            role,
            created_at: Utc::now(),
        })
        .expect("Failed to seed user");
    }

    fn request_parts(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = request_parts(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_valid_token() {
        let (state, _temp_dir) = create_test_state();
        let token = issue_token("alice@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.email, "alice@example.com");
    }

    #[tokio::test]
    async fn auth_extractor_rejects_wrong_secret() {
        let (state, _temp_dir) = create_test_state();
        let token = issue_token("alice@example.com", "some-other-secret").unwrap();
        let mut parts = request_parts(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = request_parts(None);
        parts.extensions.insert(AuthenticatedUser {
            email: "middleware@example.com".to_string(),
        });

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.email, "middleware@example.com");
    }

    #[tokio::test]
    async fn admin_only_checks_the_stored_role() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "admin@example.com", Role::Admin);
        seed_user(&state, "user@example.com", Role::User);

        let token = issue_token("admin@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));
        assert!(AdminOnly::from_request_parts(&mut parts, &state)
            .await
            .is_ok());

        let token = issue_token("user@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_rejects_unknown_emails() {
        // a valid token whose email has no stored account gets the default role
        let (state, _temp_dir) = create_test_state();
        let token = issue_token("ghost@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn decorator_only_rejects_admins_and_users() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "dana@example.com", Role::Decorator);
        seed_user(&state, "admin@example.com", Role::Admin);

        let token = issue_token("dana@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));
        assert!(DecoratorOnly::from_request_parts(&mut parts, &state)
            .await
            .is_ok());

        let token = issue_token("admin@example.com", TEST_SECRET).unwrap();
        let mut parts = request_parts(Some(&token));
        let result = DecoratorOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }
}
