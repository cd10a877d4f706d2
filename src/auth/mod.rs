// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Token-based authentication and role guards.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::{issue_token, AuthenticatedUser, Claims, TOKEN_TTL_SECS};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, DecoratorOnly};
pub use roles::Role;
