// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, DecoratorOnly};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::repository::{
    BookingRepository, DecoratorFilter, DecoratorRepository, DecoratorStatus, LifecycleError,
    StoredBooking, StoredDecorator, DEFAULT_RATING,
};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DecoratorQuery {
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Exact specialty match
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDecoratorRequest {
    pub email: String,
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Browse the active decorator roster (public).
#[utoipa::path(
    get,
    path = "/decorators",
    tag = "Decorators",
    params(DecoratorQuery),
    responses(
        (status = 200, description = "Active decorators, best rated first", body = [StoredDecorator])
    )
)]
pub async fn list_decorators(
    State(state): State<AppState>,
    Query(query): Query<DecoratorQuery>,
) -> Result<Json<Vec<StoredDecorator>>, ApiError> {
    let filter = DecoratorFilter {
        name: query.name,
        specialty: query.specialty,
    };
    let decorators = DecoratorRepository::new(state.storage())
        .list(&filter)
        .map_err(ApiError::internal)?;
    Ok(Json(decorators))
}

/// Add a decorator directly to the roster (admin).
#[utoipa::path(
    post,
    path = "/decorators",
    tag = "Decorators",
    request_body = CreateDecoratorRequest,
    responses(
        (status = 201, description = "Decorator added", body = StoredDecorator),
        (status = 400, description = "Invalid input or duplicate email")
    )
)]
pub async fn create_decorator(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateDecoratorRequest>,
) -> Result<(StatusCode, Json<StoredDecorator>), ApiError> {
    let email = request.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if request.name.trim().is_empty() || request.specialty.trim().is_empty() {
        return Err(ApiError::bad_request("Name and specialty are required"));
    }

    let decorator = StoredDecorator {
        id: Uuid::new_v4().to_string(),
        email,
        name: request.name.trim().to_string(),
        specialty: request.specialty.trim().to_string(),
        status: DecoratorStatus::Active,
        earnings: 0.0,
        rating: DEFAULT_RATING,
        created_at: Utc::now(),
    };

    match DecoratorRepository::new(state.storage()).create(&decorator) {
        Ok(()) => Ok((StatusCode::CREATED, Json(decorator))),
        Err(StorageError::AlreadyExists(_)) => {
            Err(ApiError::bad_request("Decorator already exists"))
        }
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// The caller's assigned bookings, soonest event first (decorator).
#[utoipa::path(
    get,
    path = "/decorator/bookings",
    tag = "Decorators",
    responses(
        (status = 200, description = "Assigned bookings", body = [StoredBooking]),
        (status = 403, description = "Not a decorator")
    )
)]
pub async fn assigned_bookings(
    DecoratorOnly(decorator): DecoratorOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredBooking>>, ApiError> {
    let bookings = BookingRepository::new(state.storage())
        .list_by_decorator(&decorator.email)
        .map_err(ApiError::internal)?;
    Ok(Json(bookings))
}

/// Move one of the caller's bookings along the workflow (decorator).
///
/// Only the assigned decorator may touch a booking, and only the operational
/// target states are reachable this way.
#[utoipa::path(
    patch,
    path = "/decorator/bookings/{booking_id}/status",
    tag = "Decorators",
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated booking", body = StoredBooking),
        (status = 400, description = "Invalid or disallowed status"),
        (status = 403, description = "Not the assigned decorator"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn update_booking_status(
    DecoratorOnly(decorator): DecoratorOnly,
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<StoredBooking>, ApiError> {
    let repo = BookingRepository::new(state.storage());
    let mut booking = match repo.get(&booking_id) {
        Ok(booking) => booking,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    let assigned = booking
        .decorator_email
        .as_deref()
        .is_some_and(|email| email.eq_ignore_ascii_case(&decorator.email));
    if !assigned {
        return Err(ApiError::forbidden("Forbidden access"));
    }

    booking
        .advance(&request.status)
        .map_err(|e| match e {
            LifecycleError::Terminal(_) | LifecycleError::InvalidTarget(_) => {
                ApiError::bad_request(e.to_string())
            }
            LifecycleError::MissingDecorator => ApiError::bad_request(e.to_string()),
        })?;

    repo.update(&booking).map_err(ApiError::internal)?;
    Ok(Json(booking))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::storage::repository::{BookingStatus, PaymentState};
    use crate::storage::{DocumentStorage, StoragePaths};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp_dir.path()));
        storage.initialize().unwrap();
        (AppState::new(storage), temp_dir)
    }

    fn admin() -> AdminOnly {
        AdminOnly(AuthenticatedUser {
            email: "admin@example.com".to_string(),
        })
    }

    fn as_decorator(email: &str) -> DecoratorOnly {
        DecoratorOnly(AuthenticatedUser {
            email: email.to_string(),
        })
    }

    fn seed_booking(state: &AppState, id: &str, decorator_email: Option<&str>) -> StoredBooking {
        let booking = StoredBooking {
            id: id.to_string(),
            user_email: "alice@example.com".to_string(),
            service_id: "s-1".to_string(),
            service_name: "Fairy Lights".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
            cost: 150.0,
            status: if decorator_email.is_some() {
                BookingStatus::Assigned
            } else {
                BookingStatus::PendingPayment
            },
            payment_status: PaymentState::Paid,
            decorator_id: decorator_email.map(|_| "d-1".to_string()),
            decorator_name: decorator_email.map(|_| "Dana".to_string()),
            decorator_email: decorator_email.map(str::to_string),
            tracking_id: None,
            created_at: Utc::now(),
        };
        BookingRepository::new(state.storage())
            .create(&booking)
            .unwrap();
        booking
    }

    #[tokio::test]
    async fn duplicate_roster_email_is_rejected() {
        let (state, _dir) = test_state();

        let request = || CreateDecoratorRequest {
            email: "dana@example.com".to_string(),
            name: "Dana".to_string(),
            specialty: "wedding".to_string(),
        };

        create_decorator(admin(), State(state.clone()), Json(request()))
            .await
            .unwrap();
        let result = create_decorator(admin(), State(state), Json(request())).await;
        assert_eq!(result.err().unwrap().status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_the_assigned_decorator_may_update() {
        let (state, _dir) = test_state();
        seed_booking(&state, "b-1", Some("dana@example.com"));

        let result = update_booking_status(
            as_decorator("eve@example.com"),
            State(state.clone()),
            Path("b-1".to_string()),
            Json(StatusUpdateRequest {
                status: "planning".to_string(),
            }),
        )
        .await;
        assert_eq!(result.err().unwrap().status, StatusCode::FORBIDDEN);

        let Json(updated) = update_booking_status(
            as_decorator("dana@example.com"),
            State(state),
            Path("b-1".to_string()),
            Json(StatusUpdateRequest {
                status: "planning".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, BookingStatus::Planning);
    }

    #[tokio::test]
    async fn disallowed_targets_return_400_without_mutation() {
        let (state, _dir) = test_state();
        seed_booking(&state, "b-1", Some("dana@example.com"));

        for target in ["cancelled", "assigned", "pending_payment", "half_done"] {
            let result = update_booking_status(
                as_decorator("dana@example.com"),
                State(state.clone()),
                Path("b-1".to_string()),
                Json(StatusUpdateRequest {
                    status: target.to_string(),
                }),
            )
            .await;
            assert_eq!(result.err().unwrap().status, StatusCode::BAD_REQUEST);
        }

        let stored = BookingRepository::new(state.storage()).get("b-1").unwrap();
        assert_eq!(stored.status, BookingStatus::Assigned);
    }

    #[tokio::test]
    async fn assigned_bookings_only_lists_the_callers() {
        let (state, _dir) = test_state();
        seed_booking(&state, "b-1", Some("dana@example.com"));
        seed_booking(&state, "b-2", Some("eve@example.com"));
        seed_booking(&state, "b-3", None);

        let Json(bookings) =
            assigned_bookings(as_decorator("dana@example.com"), State(state))
                .await
                .unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, "b-1");
    }
}
