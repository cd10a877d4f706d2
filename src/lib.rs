// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! StyleDecor - Event Decoration Booking Service
//!
//! Backend for a decoration booking marketplace: customers book decoration
//! services, pay through Stripe hosted checkout, and decorators work the
//! bookings through a fixed status workflow.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token authentication and role guards
//! - `providers` - Stripe hosted-checkout client
//! - `storage` - Filesystem JSON document store and repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod providers;
pub mod state;
pub mod storage;
