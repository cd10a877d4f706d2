// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, manages services, users and booking assignment
/// - `Decorator` - Approved decorator, works assigned bookings
/// - `User` - Normal customer, books services and pays for them
///
/// Endpoint guards re-check the caller's role against the live user store
/// rather than trusting a role claim baked into the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Approved decorator (fulfils bookings)
    Decorator,
    /// Normal customer
    User,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "decorator" => Some(Role::Decorator),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl Default for Role {
    /// Default role is User (least privilege; assigned on first sign-in).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Decorator => write!(f, "decorator"),
            Role::User => write!(f, "user"),
        }
    }
}
