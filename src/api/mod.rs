// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{AuthenticatedUser, Role},
    state::AppState,
    storage::repository::{
        ApplicationStatus, BookingStatus, DecoratorStatus, PaymentState, ServiceUpdate,
        StoredApplication, StoredBooking, StoredDecorator, StoredPayment, StoredService,
        StoredUser,
    },
};

pub mod applications;
pub mod auth;
pub mod bookings;
pub mod decorators;
pub mod health;
pub mod payments;
pub mod services;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/jwt", post(auth::issue_jwt))
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{key}/role",
            get(users::get_user_role).patch(users::update_user_role),
        )
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/{service_id}",
            get(services::get_service)
                .patch(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/decorators",
            get(decorators::list_decorators).post(decorators::create_decorator),
        )
        .route("/decorator/bookings", get(decorators::assigned_bookings))
        .route(
            "/decorator/bookings/{booking_id}/status",
            patch(decorators::update_booking_status),
        )
        .route(
            "/decorator-applications",
            post(applications::submit_application).get(applications::list_applications),
        )
        .route(
            "/decorator-applications/{application_id}/review",
            patch(applications::review_application),
        )
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route("/bookings/{booking_id}/cancel", patch(bookings::cancel_booking))
        .route("/bookings/{booking_id}/assign", patch(bookings::assign_booking))
        .route(
            "/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/payment-success", patch(payments::payment_success))
        .route("/payments", get(payments::list_payments))
        .route("/admin/analytics", get(payments::analytics))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        auth::issue_jwt,
        users::create_user,
        users::list_users,
        users::update_user_role,
        users::get_user_role,
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        decorators::list_decorators,
        decorators::create_decorator,
        decorators::assigned_bookings,
        decorators::update_booking_status,
        applications::submit_application,
        applications::list_applications,
        applications::review_application,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::cancel_booking,
        bookings::assign_booking,
        payments::create_checkout_session,
        payments::payment_success,
        payments::list_payments,
        payments::analytics
    ),
    components(
        schemas(
            AuthenticatedUser,
            Role,
            StoredUser,
            StoredService,
            StoredDecorator,
            StoredApplication,
            StoredBooking,
            StoredPayment,
            BookingStatus,
            PaymentState,
            ApplicationStatus,
            DecoratorStatus,
            ServiceUpdate,
            health::HealthResponse,
            health::HealthChecks,
            auth::TokenRequest,
            auth::TokenResponse,
            users::CreateUserRequest,
            users::UpdateRoleRequest,
            users::RoleResponse,
            services::CreateServiceRequest,
            decorators::CreateDecoratorRequest,
            decorators::StatusUpdateRequest,
            applications::ApplyRequest,
            applications::ReviewRequest,
            bookings::CreateBookingRequest,
            bookings::AssignRequest,
            payments::CheckoutRequest,
            payments::CheckoutResponse,
            payments::ReconcileResponse,
            payments::AnalyticsResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Token issuing"),
        (name = "Users", description = "Accounts and roles"),
        (name = "Services", description = "Decoration service catalogue"),
        (name = "Decorators", description = "Roster and decorator workflow"),
        (name = "Applications", description = "Decorator applications and review"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Payments", description = "Checkout, reconciliation and analytics")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStorage, StoragePaths};
    use tempfile::TempDir;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp_dir.path()));
        storage.initialize().unwrap();

        let app = router(AppState::new(storage));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_document_is_generated() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/payment-success"));
        assert!(json.contains("/decorator-applications"));
    }
}
