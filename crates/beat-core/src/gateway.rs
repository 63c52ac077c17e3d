//! # Gateway and Fulfillment Traits
//!
//! Seams between the HTTP layer and the two external services. The payment
//! provider sits behind `PaymentGateway`, the mail transport behind
//! `Fulfillment`; both are held as trait objects so tests can swap in fakes.

use crate::checkout::{CheckoutOrder, CheckoutSession, FulfillmentOrder, SessionRecord, WebhookEvent};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Payment provider operations used by the store.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return its id and redirect URL.
    ///
    /// # Arguments
    /// * `order` - The single-beat order to check out
    /// * `success_url` - URL the buyer lands on after paying
    /// * `cancel_url` - URL the buyer lands on after abandoning checkout
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
        success_url: &str,
        cancel_url: &str,
    ) -> StoreResult<CheckoutSession>;

    /// Fetch the current record of a session for the confirmation page.
    async fn retrieve_session(&self, session_id: &str) -> StoreResult<SessionRecord>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> StoreResult<WebhookEvent>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Delivery of purchased files to the buyer.
#[async_trait]
pub trait Fulfillment: Send + Sync {
    /// Send the purchased files for `order` to the buyer.
    ///
    /// A missing catalog entry is logged and swallowed by implementations;
    /// transport failures propagate to the caller, which logs and drops them.
    async fn deliver(&self, order: &FulfillmentOrder) -> StoreResult<()>;
}

/// Type alias for a shared fulfillment implementation (dynamic dispatch)
pub type BoxedFulfillment = Arc<dyn Fulfillment>;
