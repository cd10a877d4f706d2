// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::repository::{
    BookingFilter, BookingRepository, BookingSort, BookingStatus, LifecycleError, PaymentState,
    ServiceRepository, StoredBooking, UserRepository,
};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub service_id: String,
    /// Date of the event (YYYY-MM-DD)
    pub event_date: NaiveDate,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct BookingQuery {
    /// Owner email filter. Admins may query any owner; others only themselves.
    pub email: Option<String>,
    /// Status filter
    pub status: Option<String>,
    /// "date" | "status" | anything else for creation order
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct AssignRequest {
    #[serde(default)]
    pub decorator_id: Option<String>,
    #[serde(default)]
    pub decorator_name: Option<String>,
    #[serde(default)]
    pub decorator_email: Option<String>,
}

fn map_lifecycle_error(e: LifecycleError) -> ApiError {
    ApiError::bad_request(e.to_string())
}

fn is_admin(state: &AppState, email: &str) -> Result<bool, ApiError> {
    Ok(UserRepository::new(state.storage())
        .role_of(email)
        .map_err(ApiError::internal)?
        == Role::Admin)
}

/// Book a service.
///
/// The price is read from the catalogue at booking time, never from the
/// request, and the booking starts unpaid.
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = StoredBooking),
        (status = 400, description = "Service not bookable"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn create_booking(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<StoredBooking>), ApiError> {
    let service = match ServiceRepository::new(state.storage()).get(&request.service_id) {
        Ok(service) => service,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Service not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    if !service.is_active {
        return Err(ApiError::bad_request("Service is not available"));
    }

    let booking = StoredBooking {
        id: Uuid::new_v4().to_string(),
        user_email: caller.email,
        service_id: service.id,
        service_name: service.name,
        event_date: request.event_date,
        cost: service.cost,
        status: BookingStatus::PendingPayment,
        payment_status: PaymentState::Pending,
        decorator_id: None,
        decorator_name: None,
        decorator_email: None,
        tracking_id: None,
        created_at: Utc::now(),
    };

    BookingRepository::new(state.storage())
        .create(&booking)
        .map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings.
///
/// Admins see everything and may filter by owner email; everyone else only
/// ever sees their own bookings.
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "Bookings",
    params(BookingQuery),
    responses(
        (status = 200, description = "Matching bookings", body = [StoredBooking]),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Asked for someone else's bookings")
    )
)]
pub async fn list_bookings(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<StoredBooking>>, ApiError> {
    let admin = is_admin(&state, &caller.email)?;

    let user_email = if admin {
        query.email
    } else {
        if let Some(requested) = &query.email {
            if !requested.eq_ignore_ascii_case(&caller.email) {
                return Err(ApiError::forbidden("Forbidden access"));
            }
        }
        Some(caller.email)
    };

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            BookingStatus::from_str(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid status: {raw}")))?,
        ),
        None => None,
    };

    let bookings = BookingRepository::new(state.storage())
        .list(
            &BookingFilter { user_email, status },
            BookingSort::from_query(query.sort_by.as_deref()),
        )
        .map_err(ApiError::internal)?;
    Ok(Json(bookings))
}

/// Cancel a booking (owner or admin).
///
/// Cancelling an already-cancelled booking is a no-op; a completed booking
/// cannot be cancelled.
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}/cancel",
    tag = "Bookings",
    responses(
        (status = 200, description = "Cancelled booking", body = StoredBooking),
        (status = 400, description = "Booking already completed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<StoredBooking>, ApiError> {
    let repo = BookingRepository::new(state.storage());
    let mut booking = match repo.get(&booking_id) {
        Ok(booking) => booking,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    let owner = booking.user_email.eq_ignore_ascii_case(&caller.email);
    if !owner && !is_admin(&state, &caller.email)? {
        return Err(ApiError::forbidden("Forbidden access"));
    }

    if booking.cancel().map_err(map_lifecycle_error)? {
        repo.update(&booking).map_err(ApiError::internal)?;
    }
    Ok(Json(booking))
}

/// Attach a decorator to a booking (admin).
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}/assign",
    tag = "Bookings",
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Booking with decorator attached", body = StoredBooking),
        (status = 400, description = "Missing decorator fields or terminal booking"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn assign_booking(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<StoredBooking>, ApiError> {
    let repo = BookingRepository::new(state.storage());
    let mut booking = match repo.get(&booking_id) {
        Ok(booking) => booking,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    booking
        .assign(
            request.decorator_id.as_deref().unwrap_or(""),
            request.decorator_name.as_deref().unwrap_or(""),
            request.decorator_email.as_deref().unwrap_or(""),
        )
        .map_err(map_lifecycle_error)?;

    repo.update(&booking).map_err(ApiError::internal)?;
    Ok(Json(booking))
}
