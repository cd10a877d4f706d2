// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! External payment provider clients.

pub mod stripe;

pub use stripe::{CheckoutSession, CreateCheckoutRequest, StripeClient, StripeError};
