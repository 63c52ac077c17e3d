//! # Request Handlers
//!
//! Axum request handlers for the beat store. Each endpoint has an explicit
//! request/response schema validated at the boundary.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use beat_core::{CheckoutOrder, StoreError, WebhookEventKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout session request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Catalog id of the beat
    pub product_id: String,
    /// Display name shown on the payment page and in the email
    pub display_name: String,
    /// Price in major currency units (pounds)
    pub price: f64,
    /// Whether the stems archive is included
    #[serde(default)]
    pub has_stems: bool,
    /// Buyer email, prefilled on the payment page
    pub customer_email: String,
}

/// Create checkout session response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionResponse {
    /// Provider's session id
    pub session_id: String,
    /// Hosted payment page URL (redirect the buyer here)
    pub url: String,
}

/// Verify session query parameters
#[derive(Debug, Deserialize)]
pub struct VerifySessionQuery {
    pub session_id: String,
}

/// Verify session response (consumed by the success page)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySessionResponse {
    /// Payment status reported by the provider
    pub status: String,
    /// Buyer email, if captured
    pub customer_email: Option<String>,
    /// Display name from session metadata
    pub display_name: Option<String>,
}

/// Webhook acknowledgment
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "beat-store",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session for a single beat
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let order = CheckoutOrder::new(
        request.product_id,
        request.display_name,
        request.price,
        request.has_stems,
        request.customer_email,
    );

    order.validate().map_err(store_error_to_response)?;

    let session = state
        .gateway
        .create_checkout(&order, &state.config.success_url(), &state.config.cancel_url())
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            store_error_to_response(e)
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CreateCheckoutSessionResponse {
        session_id: session.session_id,
        url: session.checkout_url,
    }))
}

/// Handle a payment-event webhook from Stripe.
///
/// Verification failures reject the delivery outright. Once verified, the
/// delivery is always acknowledged, even when fulfillment fails, so the
/// provider does not redeliver into the same failure.
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, Json<ErrorResponse>)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing Stripe-Signature header", 400)),
            )
        })?;

    let event = state
        .gateway
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            store_error_to_response(e)
        })?;

    match event.kind {
        WebhookEventKind::CheckoutCompleted(completed) => {
            info!(
                "Checkout completed: session={}, payment_status={}",
                completed.session_id, completed.payment_status
            );

            match completed.fulfillment_order() {
                Some(order) => {
                    // The send finishes (or fails) before the acknowledgment
                    // goes out; a failed send is logged and dropped.
                    if let Err(e) = state.fulfillment.deliver(&order).await {
                        error!(
                            "Fulfillment failed for session {}: {}",
                            completed.session_id, e
                        );
                    }
                }
                None => {
                    warn!(
                        "Completed session {} missing beat id or buyer email, nothing to deliver",
                        completed.session_id
                    );
                }
            }
        }
        WebhookEventKind::Other(event_type) => {
            debug!("Ignoring webhook event type: {}", event_type);
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Report a session's payment status for the success page
#[instrument(skip(state))]
pub async fn verify_session(
    State(state): State<AppState>,
    Query(query): Query<VerifySessionQuery>,
) -> Result<Json<VerifySessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let record = state
        .gateway
        .retrieve_session(&query.session_id)
        .await
        .map_err(|e| {
            error!("Session verification failed: {}", e);
            store_error_to_response(e)
        })?;

    let display_name = record.beat_name().map(String::from);

    Ok(Json(VerifySessionResponse {
        status: record.payment_status,
        customer_email: record.customer_email,
        display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_store_error_conversion() {
        let err = StoreError::InvalidPrice {
            message: "price must be positive, got 0".to_string(),
        };
        let (status, _json) = store_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err = StoreError::WebhookVerification("Signature mismatch".to_string());
        let (status, _json) = store_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_request_field_names_are_camel_case() {
        let request: CreateCheckoutSessionRequest = serde_json::from_str(
            r#"{
                "productId": "beat1",
                "displayName": "GN1",
                "price": 49.99,
                "hasStems": true,
                "customerEmail": "buyer@example.com"
            }"#,
        )
        .unwrap();

        assert_eq!(request.product_id, "beat1");
        assert_eq!(request.display_name, "GN1");
        assert!(request.has_stems);
    }
}
