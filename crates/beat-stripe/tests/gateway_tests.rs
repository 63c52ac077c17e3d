//! Gateway tests against a mocked Stripe API.

use beat_core::{CheckoutOrder, PaymentGateway, StoreError};
use beat_stripe::{StripeConfig, StripeGateway};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> StripeGateway {
    let config =
        StripeConfig::new("sk_test_abc123", "whsec_test").with_api_base_url(server.uri());
    StripeGateway::new(config)
}

fn order() -> CheckoutOrder {
    CheckoutOrder::new("beat1", "GN1", 49.99, true, "buyer@example.com")
}

#[tokio::test]
async fn create_checkout_returns_session_id_and_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(header("Authorization", "Bearer sk_test_abc123"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains("customer_email=buyer%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_abc123",
            "url": "https://checkout.stripe.com/c/pay/cs_test_abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = gateway_for(&server)
        .create_checkout(
            &order(),
            "https://store.example.com/success.html?session_id={CHECKOUT_SESSION_ID}",
            "https://store.example.com/beatstore.html",
        )
        .await
        .unwrap();

    assert_eq!(session.session_id, "cs_test_abc123");
    assert!(session.checkout_url.contains("cs_test_abc123"));
}

#[tokio::test]
async fn create_checkout_rejects_non_positive_price_before_any_call() {
    let server = MockServer::start().await;
    // No mock mounted: a request would fail loudly.

    let mut bad = order();
    bad.price = 0.0;

    let err = gateway_for(&server)
        .create_checkout(&bad, "https://s.example.com", "https://c.example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidPrice { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_checkout_surfaces_stripe_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid positive integer", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .create_checkout(&order(), "https://s.example.com", "https://c.example.com")
        .await
        .unwrap_err();

    match err {
        StoreError::Provider { provider, message } => {
            assert_eq!(provider, "stripe");
            assert_eq!(message, "Invalid positive integer");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn retrieve_session_returns_status_and_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions/cs_test_abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_abc123",
            "payment_status": "paid",
            "customer_email": "buyer@example.com",
            "metadata": {
                "productId": "beat1",
                "displayName": "GN1",
                "hasStems": "true"
            }
        })))
        .mount(&server)
        .await;

    let record = gateway_for(&server)
        .retrieve_session("cs_test_abc123")
        .await
        .unwrap();

    assert_eq!(record.payment_status, "paid");
    assert_eq!(record.customer_email.as_deref(), Some("buyer@example.com"));
    assert_eq!(record.beat_name(), Some("GN1"));
}

#[tokio::test]
async fn retrieve_session_unknown_id_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checkout/sessions/cs_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "No such checkout.session: 'cs_missing'" }
        })))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .retrieve_session("cs_missing")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Provider { .. }));
    assert!(err.status_code() >= 500);
}
