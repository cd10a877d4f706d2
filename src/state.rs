// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

use std::sync::Arc;

use tracing::warn;

use crate::config::JWT_SECRET_ENV;
use crate::storage::DocumentStorage;

/// Token verification configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for API tokens
    pub jwt_secret: String,
}

impl AuthConfig {
    /// Load the signing secret from the environment.
    ///
    /// Falls back to a fixed development secret when `JWT_SECRET` is unset,
    /// with a loud warning. Production deployments must set the variable.
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var(JWT_SECRET_ENV) {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, using development secret; tokens are NOT secure");
                "styledecor-dev-secret".to_string()
            }
        };
        Self { jwt_secret }
    }
}

#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStorage>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(storage: DocumentStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            auth_config: Arc::new(AuthConfig::from_env()),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = Arc::new(auth_config);
        self
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }
}
