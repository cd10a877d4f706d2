// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::repository::{
    ApplicationRepository, ApplicationStatus, DecoratorProfile, DecoratorRepository,
    StoredApplication, UserRepository,
};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRequest {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// "approved" or "rejected"
    pub status: String,
}

/// Apply to become a decorator.
///
/// The applicant is the authenticated caller; one pending application per
/// email at a time.
#[utoipa::path(
    post,
    path = "/decorator-applications",
    tag = "Applications",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted", body = StoredApplication),
        (status = 400, description = "Invalid input or a pending application exists")
    )
)]
pub async fn submit_application(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<StoredApplication>), ApiError> {
    if request.name.trim().is_empty() || request.specialty.trim().is_empty() {
        return Err(ApiError::bad_request("Name and specialty are required"));
    }

    let application = StoredApplication {
        id: Uuid::new_v4().to_string(),
        email: caller.email,
        name: request.name.trim().to_string(),
        specialty: request.specialty.trim().to_string(),
        experience_years: request.experience_years,
        bio: request.bio,
        status: ApplicationStatus::Pending,
        created_at: Utc::now(),
        reviewed_at: None,
        reviewed_by: None,
    };

    match ApplicationRepository::new(state.storage()).create(&application) {
        Ok(()) => Ok((StatusCode::CREATED, Json(application))),
        Err(StorageError::AlreadyExists(_)) => Err(ApiError::bad_request(
            "You already have a pending application",
        )),
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Review queue, newest first (admin).
#[utoipa::path(
    get,
    path = "/decorator-applications",
    tag = "Applications",
    responses(
        (status = 200, description = "All applications", body = [StoredApplication]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_applications(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredApplication>>, ApiError> {
    let applications = ApplicationRepository::new(state.storage())
        .list_all()
        .map_err(ApiError::internal)?;
    Ok(Json(applications))
}

/// Approve or reject a pending application (admin).
///
/// Approval enrols the applicant in the decorator roster and promotes their
/// account to the decorator role. Only pending applications are reviewable.
#[utoipa::path(
    patch,
    path = "/decorator-applications/{application_id}/review",
    tag = "Applications",
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Reviewed application", body = StoredApplication),
        (status = 400, description = "Invalid verdict or already reviewed"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn review_application(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<StoredApplication>, ApiError> {
    let verdict = match request.status.as_str() {
        "approved" => ApplicationStatus::Approved,
        "rejected" => ApplicationStatus::Rejected,
        other => {
            return Err(ApiError::bad_request(format!("Invalid verdict: {other}")));
        }
    };

    let repo = ApplicationRepository::new(state.storage());
    let mut application = match repo.get(&application_id) {
        Ok(application) => application,
        Err(StorageError::NotFound(_)) => {
            return Err(ApiError::not_found("Application not found"));
        }
        Err(e) => return Err(ApiError::internal(e)),
    };

    if application.status != ApplicationStatus::Pending {
        return Err(ApiError::bad_request("Application already reviewed"));
    }

    application.status = verdict;
    application.reviewed_at = Some(Utc::now());
    application.reviewed_by = Some(admin.email);
    repo.update(&application).map_err(ApiError::internal)?;

    if verdict == ApplicationStatus::Approved {
        enrol_decorator(&state, &application)?;
    }

    Ok(Json(application))
}

/// Put an approved applicant on the roster and promote their account.
fn enrol_decorator(state: &AppState, application: &StoredApplication) -> Result<(), ApiError> {
    DecoratorRepository::new(state.storage())
        .upsert_approved(&DecoratorProfile {
            email: application.email.clone(),
            name: application.name.clone(),
            specialty: application.specialty.clone(),
        })
        .map_err(ApiError::internal)?;

    let users = UserRepository::new(state.storage());
    if let Some(mut user) = users
        .find_by_email(&application.email)
        .map_err(ApiError::internal)?
    {
        user.role = Role::Decorator;
        users.update(&user).map_err(ApiError::internal)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::storage::repository::StoredUser;
    use crate::storage::{DocumentStorage, StoragePaths};
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp_dir.path()));
        storage.initialize().unwrap();
        (AppState::new(storage), temp_dir)
    }

    fn caller(email: &str) -> Auth {
        Auth(AuthenticatedUser {
            email: email.to_string(),
        })
    }

    fn admin() -> AdminOnly {
        AdminOnly(AuthenticatedUser {
            email: "admin@example.com".to_string(),
        })
    }

    fn apply_request() -> ApplyRequest {
        ApplyRequest {
            name: "Dana Decorator".to_string(),
            specialty: "wedding".to_string(),
            experience_years: Some(3),
            bio: None,
        }
    }

    async fn submit(state: &AppState, email: &str) -> StoredApplication {
        let (_, Json(application)) =
            submit_application(caller(email), State(state.clone()), Json(apply_request()))
                .await
                .unwrap();
        application
    }

    #[tokio::test]
    async fn second_pending_application_is_rejected() {
        let (state, _dir) = test_state();
        submit(&state, "dana@example.com").await;

        let result = submit_application(
            caller("dana@example.com"),
            State(state),
            Json(apply_request()),
        )
        .await;
        assert_eq!(result.err().unwrap().status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn approval_enrols_and_promotes() {
        let (state, _dir) = test_state();

        let users = UserRepository::new(state.storage());
        users
            .create(&StoredUser {
                id: "u-1".to_string(),
                email: "dana@example.com".to_string(),
                name: "Dana".to_string(),
                photo_url: None,
                role: Role::User,
                created_at: Utc::now(),
            })
            .unwrap();

        let application = submit(&state, "dana@example.com").await;

        let Json(reviewed) = review_application(
            admin(),
            State(state.clone()),
            Path(application.id),
            Json(ReviewRequest {
                status: "approved".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(reviewed.status, ApplicationStatus::Approved);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("admin@example.com"));

        // roster entry exists
        let roster = DecoratorRepository::new(state.storage());
        assert!(roster
            .find_by_email("dana@example.com")
            .unwrap()
            .is_some());

        // account promoted
        let users = UserRepository::new(state.storage());
        assert_eq!(users.role_of("dana@example.com").unwrap(), Role::Decorator);
    }

    #[tokio::test]
    async fn reviewed_applications_cannot_be_reviewed_again() {
        let (state, _dir) = test_state();
        let application = submit(&state, "dana@example.com").await;

        review_application(
            admin(),
            State(state.clone()),
            Path(application.id.clone()),
            Json(ReviewRequest {
                status: "rejected".to_string(),
            }),
        )
        .await
        .unwrap();

        let result = review_application(
            admin(),
            State(state),
            Path(application.id),
            Json(ReviewRequest {
                status: "approved".to_string(),
            }),
        )
        .await;
        assert_eq!(result.err().unwrap().status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_verdicts_are_rejected() {
        let (state, _dir) = test_state();
        let application = submit(&state, "dana@example.com").await;

        let result = review_application(
            admin(),
            State(state),
            Path(application.id),
            Json(ReviewRequest {
                status: "maybe".to_string(),
            }),
        )
        .await;
        assert_eq!(result.err().unwrap().status, StatusCode::BAD_REQUEST);
    }
}
