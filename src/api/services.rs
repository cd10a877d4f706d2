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

use crate::auth::AdminOnly;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::repository::{ServiceFilter, ServiceRepository, ServiceUpdate, StoredService};
use crate::storage::StorageError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ServiceQuery {
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    /// Minimum cost, inclusive
    #[serde(rename = "minBudget")]
    pub min_budget: Option<f64>,
    /// Maximum cost, inclusive
    #[serde(rename = "maxBudget")]
    pub max_budget: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub category: String,
    pub cost: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Browse the service catalogue (public).
#[utoipa::path(
    get,
    path = "/services",
    tag = "Services",
    params(ServiceQuery),
    responses(
        (status = 200, description = "Matching services", body = [StoredService])
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceQuery>,
) -> Result<Json<Vec<StoredService>>, ApiError> {
    let filter = ServiceFilter {
        name: query.name,
        category: query.category,
        min_budget: query.min_budget,
        max_budget: query.max_budget,
    };
    let services = ServiceRepository::new(state.storage())
        .search(&filter)
        .map_err(ApiError::internal)?;
    Ok(Json(services))
}

/// Fetch a single service (public).
#[utoipa::path(
    get,
    path = "/services/{service_id}",
    tag = "Services",
    responses(
        (status = 200, description = "The service", body = StoredService),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<Json<StoredService>, ApiError> {
    match ServiceRepository::new(state.storage()).get(&service_id) {
        Ok(service) => Ok(Json(service)),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found("Service not found")),
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Add a service to the catalogue (admin).
#[utoipa::path(
    post,
    path = "/services",
    tag = "Services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = StoredService),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_service(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<StoredService>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Service name is required"));
    }
    if !request.cost.is_finite() || request.cost <= 0.0 {
        return Err(ApiError::bad_request("Cost must be a positive amount"));
    }

    let service = StoredService {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        category: request.category.trim().to_string(),
        cost: request.cost,
        is_active: request.is_active,
        created_at: Utc::now(),
    };
    ServiceRepository::new(state.storage())
        .create(&service)
        .map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Partially update a service (admin).
#[utoipa::path(
    patch,
    path = "/services/{service_id}",
    tag = "Services",
    request_body = ServiceUpdate,
    responses(
        (status = 200, description = "Updated service", body = StoredService),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn update_service(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Json(update): Json<ServiceUpdate>,
) -> Result<Json<StoredService>, ApiError> {
    if let Some(cost) = update.cost {
        if !cost.is_finite() || cost <= 0.0 {
            return Err(ApiError::bad_request("Cost must be a positive amount"));
        }
    }

    match ServiceRepository::new(state.storage()).update(&service_id, &update) {
        Ok(service) => Ok(Json(service)),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found("Service not found")),
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// Remove a service from the catalogue (admin).
#[utoipa::path(
    delete,
    path = "/services/{service_id}",
    tag = "Services",
    responses(
        (status = 204, description = "Service deleted"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn delete_service(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match ServiceRepository::new(state.storage()).delete(&service_id) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found("Service not found")),
        Err(e) => Err(ApiError::internal(e)),
    }
}
