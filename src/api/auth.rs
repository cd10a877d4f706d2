// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::issue_token;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Identity the token is issued for
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue an API token for the given email.
///
/// The token pins identity only; authorization is decided per request from
/// the stored role.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn issue_jwt(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }

    let token =
        issue_token(email, &state.auth_config.jwt_secret).map_err(ApiError::internal)?;
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AuthConfig;
    use crate::storage::{DocumentStorage, StoragePaths};
    use axum::http::StatusCode;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp_dir.path()));
        storage.initialize().unwrap();
        let state = AppState::new(storage).with_auth_config(AuthConfig {
            jwt_secret: "jwt-endpoint-test".to_string(),
        });
        (state, temp_dir)
    }

    #[tokio::test]
    async fn issues_a_decodable_token() {
        let (state, _dir) = test_state();
        let response = issue_jwt(
            State(state),
            Json(TokenRequest {
                email: "alice@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        // three dot-separated segments
        assert_eq!(response.token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn rejects_blank_or_invalid_emails() {
        let (state, _dir) = test_state();

        for email in ["", "   ", "not-an-email"] {
            let result = issue_jwt(
                State(state.clone()),
                Json(TokenRequest {
                    email: email.to_string(),
                }),
            )
            .await;
            let err = result.err().expect("should reject");
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
