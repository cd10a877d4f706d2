// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Decorator roster repository.
//!
//! Decorators enter the roster either by direct admin creation or when an
//! admin approves a decorator application. Approval is an upsert: profile
//! fields are refreshed, but earnings and rating are only seeded on first
//! insert and survive a later re-approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Rating given to decorators on first approval.
pub const DEFAULT_RATING: f64 = 5.0;

/// Roster status. Only active decorators are listed publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecoratorStatus {
    Active,
}

/// Decorator stored in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredDecorator {
    /// Unique decorator identifier (UUID)
    pub id: String,
    /// Decorator account email (unique across the roster)
    pub email: String,
    /// Display name
    pub name: String,
    /// Area of expertise (e.g. "wedding", "corporate")
    pub specialty: String,
    /// Roster status
    pub status: DecoratorStatus,
    /// Accumulated earnings in major currency units
    pub earnings: f64,
    /// Average rating
    pub rating: f64,
    /// When the decorator joined the roster
    pub created_at: DateTime<Utc>,
}

/// Roster listing filter.
#[derive(Debug, Clone, Default)]
pub struct DecoratorFilter {
    /// Case-insensitive name substring
    pub name: Option<String>,
    /// Exact specialty match
    pub specialty: Option<String>,
}

/// Profile fields carried over from an approved application.
#[derive(Debug, Clone)]
pub struct DecoratorProfile {
    pub email: String,
    pub name: String,
    pub specialty: String,
}

/// Repository for decorator roster operations.
pub struct DecoratorRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> DecoratorRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get a decorator by ID.
    pub fn get(&self, decorator_id: &str) -> StorageResult<StoredDecorator> {
        let path = self.storage.paths().decorator(decorator_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Decorator {decorator_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new decorator (direct admin creation).
    pub fn create(&self, decorator: &StoredDecorator) -> StorageResult<()> {
        if self.find_by_email(&decorator.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Decorator {}",
                decorator.email
            )));
        }
        self.storage
            .write_json(self.storage.paths().decorator(&decorator.id), decorator)
    }

    /// Find a decorator by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredDecorator>> {
        for decorator in self.list_all()? {
            if decorator.email.eq_ignore_ascii_case(email) {
                return Ok(Some(decorator));
            }
        }
        Ok(None)
    }

    /// Upsert a decorator from an approved application.
    ///
    /// First approval inserts a fresh record with earnings 0 and the default
    /// rating. Re-approval only refreshes profile fields, leaving earnings
    /// and rating untouched.
    pub fn upsert_approved(&self, profile: &DecoratorProfile) -> StorageResult<StoredDecorator> {
        let decorator = match self.find_by_email(&profile.email)? {
            Some(mut existing) => {
                existing.name = profile.name.clone();
                existing.specialty = profile.specialty.clone();
                existing.status = DecoratorStatus::Active;
                existing
            }
            None => StoredDecorator {
                id: uuid::Uuid::new_v4().to_string(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                specialty: profile.specialty.clone(),
                status: DecoratorStatus::Active,
                earnings: 0.0,
                rating: DEFAULT_RATING,
                created_at: Utc::now(),
            },
        };

        self.storage
            .write_json(self.storage.paths().decorator(&decorator.id), &decorator)?;
        Ok(decorator)
    }

    /// List active decorators, best rated first, then newest.
    pub fn list(&self, filter: &DecoratorFilter) -> StorageResult<Vec<StoredDecorator>> {
        let mut decorators = self.list_all()?;

        decorators.retain(|decorator| decorator.status == DecoratorStatus::Active);

        if let Some(name) = &filter.name {
            let needle = name.to_lowercase();
            decorators.retain(|decorator| decorator.name.to_lowercase().contains(&needle));
        }
        if let Some(specialty) = &filter.specialty {
            decorators.retain(|decorator| &decorator.specialty == specialty);
        }

        decorators.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(decorators)
    }

    fn list_all(&self) -> StorageResult<Vec<StoredDecorator>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().decorators_dir(), "json")?;

        let mut decorators = Vec::new();
        for id in ids {
            if let Ok(decorator) = self.get(&id) {
                decorators.push(decorator);
            }
        }
        Ok(decorators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (DocumentStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize");
        (storage, temp_dir)
    }

    fn profile(email: &str) -> DecoratorProfile {
        DecoratorProfile {
            email: email.to_string(),
            name: "Dana Decorator".to_string(),
            specialty: "wedding".to_string(),
        }
    }

    #[test]
    fn first_approval_seeds_defaults() {
        let (storage, _dir) = test_storage();
        let repo = DecoratorRepository::new(&storage);

        let decorator = repo.upsert_approved(&profile("dana@example.com")).unwrap();
        assert_eq!(decorator.earnings, 0.0);
        assert_eq!(decorator.rating, DEFAULT_RATING);
        assert_eq!(decorator.status, DecoratorStatus::Active);
    }

    #[test]
    fn reapproval_keeps_earnings_and_rating() {
        let (storage, _dir) = test_storage();
        let repo = DecoratorRepository::new(&storage);

        let first = repo.upsert_approved(&profile("dana@example.com")).unwrap();

        // decorator earns money and gets rated over time
        let mut working = repo.get(&first.id).unwrap();
        working.earnings = 420.0;
        working.rating = 4.2;
        storage
            .write_json(storage.paths().decorator(&working.id), &working)
            .unwrap();

        let mut updated_profile = profile("dana@example.com");
        updated_profile.specialty = "corporate".to_string();
        let second = repo.upsert_approved(&updated_profile).unwrap();

        assert_eq!(second.id, first.id, "upsert targets the same record");
        assert_eq!(second.earnings, 420.0);
        assert_eq!(second.rating, 4.2);
        assert_eq!(second.specialty, "corporate", "profile fields refreshed");
    }

    #[test]
    fn list_filters_and_sorts_by_rating() {
        let (storage, _dir) = test_storage();
        let repo = DecoratorRepository::new(&storage);

        for (email, name, specialty, rating) in [
            ("a@example.com", "Amy", "wedding", 4.0),
            ("b@example.com", "Ben", "wedding", 4.8),
            ("c@example.com", "Cleo", "birthday", 4.5),
        ] {
            let mut decorator = repo
                .upsert_approved(&DecoratorProfile {
                    email: email.to_string(),
                    name: name.to_string(),
                    specialty: specialty.to_string(),
                })
                .unwrap();
            decorator.rating = rating;
            storage
                .write_json(storage.paths().decorator(&decorator.id), &decorator)
                .unwrap();
        }

        let weddings = repo
            .list(&DecoratorFilter {
                specialty: Some("wedding".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(weddings.len(), 2);
        assert_eq!(weddings[0].name, "Ben", "best rated first");

        let by_name = repo
            .list(&DecoratorFilter {
                name: Some("cle".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Cleo");
    }

    #[test]
    fn create_rejects_duplicate_email() {
        let (storage, _dir) = test_storage();
        let repo = DecoratorRepository::new(&storage);

        let decorator = StoredDecorator {
            id: "d-1".to_string(),
            email: "dana@example.com".to_string(),
            name: "Dana".to_string(),
            specialty: "wedding".to_string(),
            status: DecoratorStatus::Active,
            earnings: 0.0,
            rating: DEFAULT_RATING,
            created_at: Utc::now(),
        };
        repo.create(&decorator).unwrap();

        let mut dup = decorator.clone();
        dup.id = "d-2".to_string();
        assert!(matches!(
            repo.create(&dup),
            Err(StorageError::AlreadyExists(_))
        ));
    }
}
