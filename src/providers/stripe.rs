// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Stripe hosted-checkout integration.
//!
//! The server never touches card data: it creates a Checkout Session, sends
//! the customer to Stripe's hosted page, and later retrieves the session to
//! reconcile the payment. Amounts cross this boundary in minor units.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_SITE_DOMAIN: &str = "http://localhost:5173";
const DEFAULT_CURRENCY: &str = "usd";

/// Stripe's documented ceiling for a single charge, in minor units.
pub const MAX_AMOUNT_MINOR: u64 = 99_999_999;

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe configuration missing: {0}")]
    MissingConfig(String),

    #[error("Stripe request failed: {0}")]
    Request(String),

    #[error("Stripe response was invalid: {0}")]
    InvalidResponse(String),
}

/// Inputs for creating a Checkout Session.
pub struct CreateCheckoutRequest<'a> {
    pub booking_id: &'a str,
    pub service_name: &'a str,
    pub amount_minor: u64,
    pub customer_email: &'a str,
}

/// The slice of a Checkout Session the server cares about.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL. Present on freshly created sessions.
    pub url: Option<String>,
    /// "paid", "unpaid" or "no_payment_required"
    pub payment_status: String,
    /// Payment intent id, used as the transaction id
    pub payment_intent: Option<String>,
    /// Total charged, minor units
    pub amount_total: Option<i64>,
    pub currency: String,
    pub customer_email: Option<String>,
    pub booking_id: Option<String>,
    pub service_name: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    api_base_url: String,
    secret_key: String,
    site_domain: String,
    http: Client,
}

impl StripeClient {
    pub fn is_configured() -> bool {
        env_optional("STRIPE_SECRET_KEY").is_some()
    }

    pub fn from_env() -> Result<Self, StripeError> {
        let api_base_url = env_or_default("STRIPE_API_BASE_URL", DEFAULT_API_BASE_URL);
        let secret_key = env_optional("STRIPE_SECRET_KEY")
            .ok_or_else(|| StripeError::MissingConfig("STRIPE_SECRET_KEY".to_string()))?;
        let site_domain = env_or_default("SITE_DOMAIN", DEFAULT_SITE_DOMAIN);

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StripeError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            secret_key,
            site_domain,
            http,
        })
    }

    /// Create a hosted Checkout Session for a booking.
    pub async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let success_url = build_success_url(&self.site_domain);
        let cancel_url = format!(
            "{}/dashboard/payment-cancelled",
            self.site_domain.trim_end_matches('/')
        );

        let amount = request.amount_minor.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price_data][currency]", DEFAULT_CURRENCY),
            (
                "line_items[0][price_data][product_data][name]",
                request.service_name,
            ),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            ("line_items[0][quantity]", "1"),
            ("customer_email", request.customer_email),
            ("metadata[bookingId]", request.booking_id),
            ("metadata[serviceName]", request.service_name),
            ("success_url", success_url.as_str()),
            ("cancel_url", cancel_url.as_str()),
        ];

        let response = self.post_form("/v1/checkout/sessions", &form).await?;
        parse_checkout_session(&response)
    }

    /// Retrieve an existing Checkout Session by id.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .get_json(&format!("/v1/checkout/sessions/{session_id}"))
            .await?;
        parse_checkout_session(&response)
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Value, StripeError> {
        let response = self
            .http
            .post(format!(
                "{}{}",
                self.api_base_url.trim_end_matches('/'),
                path
            ))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| StripeError::Request(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Request(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
    }

    async fn get_json(&self, path: &str) -> Result<Value, StripeError> {
        let response = self
            .http
            .get(format!(
                "{}{}",
                self.api_base_url.trim_end_matches('/'),
                path
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| StripeError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Request(format!(
                "GET {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))
    }
}

/// Convert a price in major units to minor units, rejecting amounts Stripe
/// will not accept.
pub fn to_minor_units(cost: f64) -> Option<u64> {
    if !cost.is_finite() || cost <= 0.0 {
        return None;
    }
    let minor = (cost * 100.0).round();
    if minor < 1.0 || minor > MAX_AMOUNT_MINOR as f64 {
        return None;
    }
    Some(minor as u64)
}

fn build_success_url(site_domain: &str) -> String {
    format!(
        "{}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
        site_domain.trim_end_matches('/')
    )
}

fn parse_checkout_session(response: &Value) -> Result<CheckoutSession, StripeError> {
    let id = response
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StripeError::InvalidResponse("missing session id".to_string()))?
        .to_string();

    let payment_status = response
        .get("payment_status")
        .and_then(Value::as_str)
        .ok_or_else(|| StripeError::InvalidResponse("missing payment_status".to_string()))?
        .to_string();

    Ok(CheckoutSession {
        id,
        url: response.get("url").and_then(Value::as_str).map(str::to_string),
        payment_status,
        payment_intent: extract_payment_intent(response),
        amount_total: response.get("amount_total").and_then(Value::as_i64),
        currency: response
            .get("currency")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string(),
        customer_email: response
            .pointer("/customer_details/email")
            .and_then(Value::as_str)
            .or_else(|| response.get("customer_email").and_then(Value::as_str))
            .map(str::to_string),
        booking_id: response
            .pointer("/metadata/bookingId")
            .and_then(Value::as_str)
            .map(str::to_string),
        service_name: response
            .pointer("/metadata/serviceName")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn extract_payment_intent(response: &Value) -> Option<String> {
    // a plain string unless the caller asked Stripe to expand it
    response
        .get("payment_intent")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            response
                .pointer("/payment_intent/id")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
