// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Decorator application repository.
//!
//! An email may have at most one pending application at a time. This is
//! enforced by a query-before-insert check; see DESIGN.md for the race
//! discussion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Review status of a decorator application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Decorator application stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredApplication {
    /// Unique application identifier (UUID)
    pub id: String,
    /// Applicant account email
    pub email: String,
    /// Applicant display name
    pub name: String,
    /// Claimed specialty
    pub specialty: String,
    /// Years of experience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    /// Free-form pitch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Review status
    pub status: ApplicationStatus,
    /// When the application was submitted
    pub created_at: DateTime<Utc>,
    /// When the application was reviewed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewing admin's email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

/// Repository for decorator application operations.
pub struct ApplicationRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get an application by ID.
    pub fn get(&self, application_id: &str) -> StorageResult<StoredApplication> {
        let path = self.storage.paths().application(application_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Application {application_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Create a new application, rejecting a second pending one per email.
    pub fn create(&self, application: &StoredApplication) -> StorageResult<()> {
        if self.has_pending(&application.email)? {
            return Err(StorageError::AlreadyExists(format!(
                "Pending application for {}",
                application.email
            )));
        }
        self.storage.write_json(
            self.storage.paths().application(&application.id),
            application,
        )
    }

    /// Persist a reviewed application.
    pub fn update(&self, application: &StoredApplication) -> StorageResult<()> {
        let path = self.storage.paths().application(&application.id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Application {}",
                application.id
            )));
        }
        self.storage.write_json(path, application)
    }

    /// Whether the email already has a pending application.
    pub fn has_pending(&self, email: &str) -> StorageResult<bool> {
        Ok(self.list_all()?.iter().any(|application| {
            application.email.eq_ignore_ascii_case(email)
                && application.status == ApplicationStatus::Pending
        }))
    }

    /// All applications, newest first (admin review queue).
    pub fn list_all(&self) -> StorageResult<Vec<StoredApplication>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().applications_dir(), "json")?;

        let mut applications = Vec::new();
        for id in ids {
            if let Ok(application) = self.get(&id) {
                applications.push(application);
            }
        }

        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }
}
