//! # Stripe Checkout Sessions
//!
//! Stripe Checkout Sessions API client. Creates the hosted payment session
//! for a beat purchase and retrieves a session's record for the
//! confirmation page.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use beat_core::{
    CheckoutOrder, CheckoutSession, PaymentGateway, SessionRecord, StoreError, StoreResult,
    WebhookEvent,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe implementation of the payment gateway.
///
/// Uses Stripe's hosted checkout page; card data never touches this service.
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> StoreResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Build the flat form body Stripe's API expects for session creation
    fn build_form_params(
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                order.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                order.unit_amount().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                order.line_item_name(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                order.line_item_description(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "customer_email".to_string(),
                order.customer_email.clone(),
            ),
        ];

        for (key, value) in order.session_metadata() {
            params.push((format!("metadata[{}]", key), value));
        }

        params
    }

    /// Surface a non-2xx Stripe response as a typed error
    fn provider_error(status: reqwest::StatusCode, body: &str) -> StoreError {
        error!("Stripe API error: status={}, body={}", status, body);

        if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(body) {
            return StoreError::Provider {
                provider: "stripe".to_string(),
                message: error_response.error.message,
            };
        }

        StoreError::Provider {
            provider: "stripe".to_string(),
            message: format!("HTTP {}: {}", status, body),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, order), fields(beat_id = %order.beat_id))]
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> StoreResult<CheckoutSession> {
        order.validate()?;

        let form_params = Self::build_form_params(order, success_url, cancel_url);

        debug!(
            "Creating Stripe checkout session: beat={}, amount={}",
            order.beat_id,
            order.unit_amount()
        );

        let idempotency_key = order
            .idempotency_key
            .clone()
            .unwrap_or_else(|| order.beat_id.clone());

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, session.url
        );

        Ok(CheckoutSession {
            session_id: session.id,
            checkout_url: session.url,
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> StoreResult<SessionRecord> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let record: StripeSessionRecord = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        debug!(
            "Retrieved session {}: payment_status={}",
            record.id, record.payment_status
        );

        Ok(SessionRecord {
            session_id: record.id,
            payment_status: record.payment_status,
            customer_email: record
                .customer_email
                .or(record.customer_details.and_then(|d| d.email)),
            metadata: record.metadata,
        })
    }

    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> StoreResult<WebhookEvent> {
        webhook::verify_and_parse(&self.config.webhook_secret, payload, signature)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSessionRecord {
    id: String,
    payment_status: String,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> CheckoutOrder {
        CheckoutOrder::new("beat1", "GN1", 49.99, true, "buyer@example.com")
    }

    #[test]
    fn test_form_params_shape() {
        let params = StripeGateway::build_form_params(
            &order(),
            "https://store.example.com/success.html?session_id={CHECKOUT_SESSION_ID}",
            "https://store.example.com/beatstore.html",
        );

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("gbp"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("4999"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("GN1 - WAV + Stems")
        );
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
        assert_eq!(get("customer_email"), Some("buyer@example.com"));
        assert_eq!(get("metadata[productId]"), Some("beat1"));
        assert_eq!(get("metadata[displayName]"), Some("GN1"));
        assert_eq!(get("metadata[hasStems]"), Some("true"));
    }

    #[test]
    fn test_provider_error_parses_stripe_message() {
        let body = r#"{"error": {"message": "Invalid positive integer", "type": "invalid_request_error"}}"#;
        let err = StripeGateway::provider_error(reqwest::StatusCode::BAD_REQUEST, body);
        match err {
            StoreError::Provider { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid positive integer");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
