// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Path constants and utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Default root directory for all persistent documents.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the JSON document store.
///
/// One directory per collection, one JSON file per document:
///
/// ```text
/// data/
///   users/{user_id}.json
///   services/{service_id}.json
///   decorators/{decorator_id}.json
///   applications/{application_id}.json
///   bookings/{booking_id}.json
///   payments/{transaction_id}.json
/// ```
///
/// Payments are keyed by the external transaction id, so the filesystem
/// itself enforces at-most-once insertion during checkout reconciliation.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a document file inside a collection directory.
    ///
    /// Ids arrive straight from URL path segments. An id carrying path
    /// syntax (`/`, `\`, `..`) could otherwise address a file in another
    /// collection, so those resolve to a sentinel under `rejected/` that
    /// never holds documents and reads back as not-found.
    fn document(&self, dir: PathBuf, id: &str) -> PathBuf {
        if id.contains('/') || id.contains('\\') || id.contains("..") {
            return self.root.join("rejected").join("id.json");
        }
        dir.join(format!("{id}.json"))
    }

    // ========== User Paths ==========

    /// Directory containing all users.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user file.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.document(self.users_dir(), user_id)
    }

    // ========== Service Paths ==========

    /// Directory containing all decoration services.
    pub fn services_dir(&self) -> PathBuf {
        self.root.join("services")
    }

    /// Path to a specific service file.
    pub fn service(&self, service_id: &str) -> PathBuf {
        self.document(self.services_dir(), service_id)
    }

    // ========== Decorator Paths ==========

    /// Directory containing all decorators.
    pub fn decorators_dir(&self) -> PathBuf {
        self.root.join("decorators")
    }

    /// Path to a specific decorator file.
    pub fn decorator(&self, decorator_id: &str) -> PathBuf {
        self.document(self.decorators_dir(), decorator_id)
    }

    // ========== Decorator Application Paths ==========

    /// Directory containing all decorator applications.
    pub fn applications_dir(&self) -> PathBuf {
        self.root.join("applications")
    }

    /// Path to a specific application file.
    pub fn application(&self, application_id: &str) -> PathBuf {
        self.document(self.applications_dir(), application_id)
    }

    // ========== Booking Paths ==========

    /// Directory containing all bookings.
    pub fn bookings_dir(&self) -> PathBuf {
        self.root.join("bookings")
    }

    /// Path to a specific booking file.
    pub fn booking(&self, booking_id: &str) -> PathBuf {
        self.document(self.bookings_dir(), booking_id)
    }

    // ========== Payment Paths ==========

    /// Directory containing the payment ledger.
    pub fn payments_dir(&self) -> PathBuf {
        self.root.join("payments")
    }

    /// Path to a payment ledger row, keyed by external transaction id.
    pub fn payment(&self, transaction_id: &str) -> PathBuf {
        self.document(self.payments_dir(), transaction_id)
    }
}
