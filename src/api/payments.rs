// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Checkout bridge and payment reconciliation.
//!
//! Reconciliation is idempotent: the payment ledger is keyed by the
//! processor's transaction id and inserted with O_EXCL semantics, so a
//! replayed success redirect observes the existing record instead of
//! double-recording the payment.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth, Role};
use crate::error::ApiError;
use crate::providers::{CheckoutSession, CreateCheckoutRequest, StripeClient, StripeError};
use crate::providers::stripe::to_minor_units;
use crate::state::AppState;
use crate::storage::repository::{
    BookingRepository, PaymentRepository, PaymentState, StoredPayment, UserRepository,
};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub booking_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Checkout session id
    pub id: String,
    /// Hosted payment page URL to redirect the customer to
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ReconcileQuery {
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileResponse {
    pub paid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PaymentQuery {
    /// Customer email filter. Admins may query anyone; others only themselves.
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    /// Sum of all recorded payments, major units
    pub total_revenue: f64,
    pub total_payments: usize,
    pub total_bookings: usize,
    /// Booking count per service name
    pub bookings_by_service: BTreeMap<String, usize>,
}

fn map_stripe_error(e: StripeError) -> ApiError {
    match e {
        StripeError::MissingConfig(_) => {
            ApiError::service_unavailable("Payment provider not configured")
        }
        StripeError::Request(detail) | StripeError::InvalidResponse(detail) => {
            tracing::error!(error = %detail, "payment provider call failed");
            ApiError::new(StatusCode::BAD_GATEWAY, "Payment provider error")
        }
    }
}

/// Tracking id issued to paid bookings: STYL-YYYYMMDD-XXXXXX.
fn generate_tracking_id() -> String {
    let date = Utc::now().format("%Y%m%d");
    let bytes = *Uuid::new_v4().as_bytes();
    format!(
        "STYL-{date}-{:02X}{:02X}{:02X}",
        bytes[0], bytes[1], bytes[2]
    )
}

/// Start hosted checkout for a booking (owner or admin).
///
/// The charged amount comes from the stored booking, converted to minor
/// units server-side.
#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "Payments",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Booking not payable"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking not found"),
        (status = 503, description = "Payment provider not configured")
    )
)]
pub async fn create_checkout_session(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let booking = match BookingRepository::new(state.storage()).get(&request.booking_id) {
        Ok(booking) => booking,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    let owner = booking.user_email.eq_ignore_ascii_case(&caller.email);
    if !owner {
        let role = UserRepository::new(state.storage())
            .role_of(&caller.email)
            .map_err(ApiError::internal)?;
        if role != Role::Admin {
            return Err(ApiError::forbidden("Forbidden access"));
        }
    }

    if booking.status.is_terminal() {
        return Err(ApiError::bad_request("Booking is no longer payable"));
    }
    if booking.payment_status == PaymentState::Paid {
        return Err(ApiError::bad_request("Booking is already paid"));
    }

    let amount_minor = to_minor_units(booking.cost)
        .ok_or_else(|| ApiError::bad_request("Booking amount is not chargeable"))?;

    let stripe = StripeClient::from_env().map_err(map_stripe_error)?;
    let session = stripe
        .create_checkout_session(CreateCheckoutRequest {
            booking_id: &booking.id,
            service_name: &booking.service_name,
            amount_minor,
            customer_email: &booking.user_email,
        })
        .await
        .map_err(map_stripe_error)?;

    Ok(Json(CheckoutResponse {
        id: session.id,
        url: session.url,
    }))
}

/// Reconcile a checkout session after the processor redirect.
///
/// Unauthenticated by design: the processor sends the customer's browser
/// here, and everything trusted is re-fetched from the processor by id.
#[utoipa::path(
    patch,
    path = "/payment-success",
    tag = "Payments",
    params(ReconcileQuery),
    responses(
        (status = 200, description = "Reconciliation outcome", body = ReconcileResponse),
        (status = 404, description = "Booking from session metadata not found"),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn payment_success(
    State(state): State<AppState>,
    Query(query): Query<ReconcileQuery>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let stripe = StripeClient::from_env().map_err(map_stripe_error)?;
    let session = stripe
        .retrieve_checkout_session(&query.session_id)
        .await
        .map_err(map_stripe_error)?;

    let outcome = apply_paid_session(&state, &session)?;
    Ok(Json(outcome))
}

/// Apply a retrieved checkout session to the booking and payment ledger.
fn apply_paid_session(
    state: &AppState,
    session: &CheckoutSession,
) -> Result<ReconcileResponse, ApiError> {
    if !session.is_paid() {
        return Ok(ReconcileResponse {
            paid: false,
            message: "Payment not completed".to_string(),
            tracking_id: None,
            transaction_id: None,
        });
    }

    let transaction_id = session.payment_intent.clone().ok_or_else(|| {
        tracing::error!(session_id = %session.id, "paid session has no payment intent");
        ApiError::new(StatusCode::BAD_GATEWAY, "Payment provider error")
    })?;
    let booking_id = session
        .booking_id
        .clone()
        .ok_or_else(|| ApiError::bad_request("Checkout session has no booking metadata"))?;

    let bookings = BookingRepository::new(state.storage());
    let mut booking = match bookings.get(&booking_id) {
        Ok(booking) => booking,
        Err(StorageError::NotFound(_)) => return Err(ApiError::not_found("Booking not found")),
        Err(e) => return Err(ApiError::internal(e)),
    };

    let tracking_id = generate_tracking_id();
    let payment = StoredPayment {
        transaction_id: transaction_id.clone(),
        booking_id,
        service_name: session
            .service_name
            .clone()
            .unwrap_or_else(|| booking.service_name.clone()),
        amount: session
            .amount_total
            .map(|minor| minor as f64 / 100.0)
            .unwrap_or(booking.cost),
        currency: session.currency.clone(),
        customer_email: session
            .customer_email
            .clone()
            .unwrap_or_else(|| booking.user_email.clone()),
        payment_status: session.payment_status.clone(),
        tracking_id: tracking_id.clone(),
        paid_at: Utc::now(),
    };

    let payments = PaymentRepository::new(state.storage());
    match payments.create(&payment) {
        Ok(()) => {
            booking.confirm_payment(&tracking_id);
            bookings.update(&booking).map_err(ApiError::internal)?;
            Ok(ReconcileResponse {
                paid: true,
                message: "Payment recorded".to_string(),
                tracking_id: Some(tracking_id),
                transaction_id: Some(transaction_id),
            })
        }
        // a concurrent or repeated reconciliation already recorded this one
        Err(StorageError::AlreadyExists(_)) => {
            let stored = payments.get(&transaction_id).map_err(ApiError::internal)?;
            // the booking write can be lost between the two inserts (crash,
            // storage error); replay re-applies it from the stored row
            if booking.payment_status == PaymentState::Pending {
                booking.confirm_payment(&stored.tracking_id);
                bookings.update(&booking).map_err(ApiError::internal)?;
            }
            Ok(ReconcileResponse {
                paid: true,
                message: "Payment already recorded".to_string(),
                tracking_id: Some(stored.tracking_id),
                transaction_id: Some(transaction_id),
            })
        }
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Payment history (self, or anyone for admins).
#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    params(PaymentQuery),
    responses(
        (status = 200, description = "Payments, most recent first", body = [StoredPayment]),
        (status = 403, description = "Asked for someone else's payments")
    )
)]
pub async fn list_payments(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<Vec<StoredPayment>>, ApiError> {
    let admin = UserRepository::new(state.storage())
        .role_of(&caller.email)
        .map_err(ApiError::internal)?
        == Role::Admin;

    let repo = PaymentRepository::new(state.storage());
    let payments = if admin {
        match query.email {
            Some(email) => repo.list_by_customer(&email),
            None => repo.list_all(),
        }
    } else {
        if let Some(requested) = &query.email {
            if !requested.eq_ignore_ascii_case(&caller.email) {
                return Err(ApiError::forbidden("Forbidden access"));
            }
        }
        repo.list_by_customer(&caller.email)
    }
    .map_err(ApiError::internal)?;

    Ok(Json(payments))
}

/// Revenue and demand overview (admin).
#[utoipa::path(
    get,
    path = "/admin/analytics",
    tag = "Payments",
    responses(
        (status = 200, description = "Totals and per-service demand", body = AnalyticsResponse),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn analytics(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let payments = PaymentRepository::new(state.storage());
    let total_revenue = payments.total_revenue().map_err(ApiError::internal)?;
    let total_payments = payments.list_all().map_err(ApiError::internal)?.len();
    let bookings = BookingRepository::new(state.storage())
        .list_all()
        .map_err(ApiError::internal)?;

    let mut bookings_by_service = BTreeMap::new();
    for booking in &bookings {
        *bookings_by_service
            .entry(booking.service_name.clone())
            .or_insert(0usize) += 1;
    }

    Ok(Json(AnalyticsResponse {
        total_revenue,
        total_payments,
        total_bookings: bookings.len(),
        bookings_by_service,
    }))
}
