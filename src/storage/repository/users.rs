// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! User repository.
//!
//! Users are created on first sign-in with the `user` role. The role is only
//! mutated by an admin action or a decorator application approval, and it is
//! this stored role (never a token claim) that authorization guards consult.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Maximum number of rows returned by the admin user search.
pub const USER_SEARCH_LIMIT: usize = 10;

/// User account stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Account email (unique across users)
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Authorization role
    pub role: Role,
    /// When the account was first seen
    pub created_at: DateTime<Utc>,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new user.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.find_by_email(&user.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("User {}", user.email)));
        }
        self.storage
            .write_json(self.storage.paths().user(&user.id), user)
    }

    /// Update an existing user.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        let path = self.storage.paths().user(&user.id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }
        self.storage.write_json(path, user)
    }

    /// Find a user by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        for user in self.list_all()? {
            if user.email.eq_ignore_ascii_case(email) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// The caller's current role, defaulting to `user` for unknown emails.
    pub fn role_of(&self, email: &str) -> StorageResult<Role> {
        Ok(self
            .find_by_email(email)?
            .map(|user| user.role)
            .unwrap_or_default())
    }

    /// Search users by name/email substring (case-insensitive).
    ///
    /// Results come back newest first, capped at [`USER_SEARCH_LIMIT`].
    pub fn search(&self, search_text: Option<&str>) -> StorageResult<Vec<StoredUser>> {
        let mut users = self.list_all()?;

        if let Some(text) = search_text {
            let needle = text.to_lowercase();
            users.retain(|user| {
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            });
        }

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users.truncate(USER_SEARCH_LIMIT);
        Ok(users)
    }

    fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in ids {
            if let Ok(user) = self.get(&id) {
                users.push(user);
            }
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_storage() -> (DocumentStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize");
        (storage, temp_dir)
    }

    fn test_user(id: &str, email: &str) -> StoredUser {
        StoredUser {
            id: id.to_string(),
            email: email.to_string(),
            name: "Test User".to_string(),
            photo_url: None,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_find_by_email() {
        let (storage, _dir) = test_storage();
        let repo = UserRepository::new(&storage);

        repo.create(&test_user("u-1", "alice@example.com")).unwrap();

        let found = repo.find_by_email("alice@example.com").unwrap();
        assert_eq!(found.unwrap().id, "u-1");

        let found = repo.find_by_email("ALICE@example.com").unwrap();
        assert!(found.is_some(), "email lookup is case-insensitive");

        assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn create_rejects_duplicate_email() {
        let (storage, _dir) = test_storage();
        let repo = UserRepository::new(&storage);

        repo.create(&test_user("u-1", "alice@example.com")).unwrap();
        let result = repo.create(&test_user("u-2", "alice@example.com"));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn role_of_defaults_to_user() {
        let (storage, _dir) = test_storage();
        let repo = UserRepository::new(&storage);

        assert_eq!(repo.role_of("ghost@example.com").unwrap(), Role::User);

        let mut admin = test_user("u-1", "admin@example.com");
        admin.role = Role::Admin;
        repo.create(&admin).unwrap();
        assert_eq!(repo.role_of("admin@example.com").unwrap(), Role::Admin);
    }

    #[test]
    fn search_filters_and_caps_results() {
        let (storage, _dir) = test_storage();
        let repo = UserRepository::new(&storage);

        let base = Utc::now();
        for i in 0..15 {
            let mut user = test_user(&format!("u-{i}"), &format!("user{i}@example.com"));
            user.name = format!("Person {i}");
            user.created_at = base + Duration::seconds(i);
            repo.create(&user).unwrap();
        }

        // substring match on email
        let hits = repo.search(Some("user1")).unwrap();
        assert!(hits
            .iter()
            .all(|user| user.email.contains("user1")));
        // user1, user10..user14
        assert_eq!(hits.len(), 6);

        // no filter: newest first, capped
        let all = repo.search(None).unwrap();
        assert_eq!(all.len(), USER_SEARCH_LIMIT);
        assert_eq!(all[0].email, "user14@example.com");
    }
}
