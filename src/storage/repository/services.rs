// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Decoration service catalogue repository. Admin-owned CRUD entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Decoration service offered in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredService {
    /// Unique service identifier (UUID)
    pub id: String,
    /// Service name
    pub name: String,
    /// Category (e.g. "wedding", "birthday", "corporate")
    pub category: String,
    /// Price in major currency units
    pub cost: f64,
    /// Whether the service is currently bookable
    pub is_active: bool,
    /// When the service was added
    pub created_at: DateTime<Utc>,
}

/// Catalogue search filter. All fields are optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    /// Minimum cost (inclusive)
    pub min_budget: Option<f64>,
    /// Maximum cost (inclusive)
    pub max_budget: Option<f64>,
}

/// Fields an admin may change on an existing service.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost: Option<f64>,
    pub is_active: Option<bool>,
}

/// Repository for service catalogue operations.
pub struct ServiceRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> ServiceRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get a service by ID.
    pub fn get(&self, service_id: &str) -> StorageResult<StoredService> {
        let path = self.storage.paths().service(service_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Service {service_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new service.
    pub fn create(&self, service: &StoredService) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().service(&service.id), service)
    }

    /// Apply a partial update to an existing service.
    pub fn update(&self, service_id: &str, update: &ServiceUpdate) -> StorageResult<StoredService> {
        let mut service = self.get(service_id)?;

        if let Some(name) = &update.name {
            service.name = name.clone();
        }
        if let Some(category) = &update.category {
            service.category = category.clone();
        }
        if let Some(cost) = update.cost {
            service.cost = cost;
        }
        if let Some(is_active) = update.is_active {
            service.is_active = is_active;
        }

        self.storage
            .write_json(self.storage.paths().service(service_id), &service)?;
        Ok(service)
    }

    /// Delete a service.
    pub fn delete(&self, service_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().service(service_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Service {service_id}")));
        }
        self.storage.delete(path)
    }

    /// Search the catalogue. Results come back newest first.
    pub fn search(&self, filter: &ServiceFilter) -> StorageResult<Vec<StoredService>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().services_dir(), "json")?;

        let mut services = Vec::new();
        for id in ids {
            if let Ok(service) = self.get(&id) {
                services.push(service);
            }
        }

        if let Some(name) = &filter.name {
            let needle = name.to_lowercase();
            services.retain(|service| service.name.to_lowercase().contains(&needle));
        }
        if let Some(category) = &filter.category {
            services.retain(|service| &service.category == category);
        }
        if let Some(min) = filter.min_budget {
            services.retain(|service| service.cost >= min);
        }
        if let Some(max) = filter.max_budget {
            services.retain(|service| service.cost <= max);
        }

        services.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(services)
    }
}
