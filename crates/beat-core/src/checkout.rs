//! # Checkout Types
//!
//! Checkout order and session types for the beat store, plus the parsed
//! webhook event a payment provider hands back after a buyer pays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Session metadata keys shared between checkout creation and the webhook.
///
/// The values are round-tripped through the payment provider, so both sides
/// must agree on the exact spelling.
pub mod metadata {
    /// Catalog id of the purchased beat
    pub const BEAT_ID: &str = "productId";
    /// Display name of the purchased beat
    pub const BEAT_NAME: &str = "displayName";
    /// "true" when the stems archive was purchased
    pub const HAS_STEMS: &str = "hasStems";
}

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    GBP,
    USD,
    EUR,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::GBP => "gbp",
            Currency::USD => "usd",
            Currency::EUR => "eur",
        }
    }

    /// Convert a decimal amount to the smallest currency unit (pence, cents)
    pub fn to_minor_units(&self, amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::GBP
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A single-beat order to be checked out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    /// Catalog id of the beat being purchased
    pub beat_id: String,

    /// Display name (denormalized; checkout does not consult the catalog)
    pub beat_name: String,

    /// Price in major currency units (pounds, not pence)
    pub price: f64,

    /// Whether the stems archive is included
    pub has_stems: bool,

    /// Buyer email, prefilled on the hosted payment page
    pub customer_email: String,

    /// Currency for the charge
    #[serde(default)]
    pub currency: Currency,

    /// Idempotency key (prevents duplicate charges on retried requests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl CheckoutOrder {
    /// Create a new order with a generated idempotency key
    pub fn new(
        beat_id: impl Into<String>,
        beat_name: impl Into<String>,
        price: f64,
        has_stems: bool,
        customer_email: impl Into<String>,
    ) -> Self {
        Self {
            beat_id: beat_id.into(),
            beat_name: beat_name.into(),
            price,
            has_stems,
            customer_email: customer_email.into(),
            currency: Currency::GBP,
            idempotency_key: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Validate the order before it is sent to a payment provider.
    ///
    /// The beat id is deliberately not checked against the catalog here;
    /// a mismatch surfaces during fulfillment.
    pub fn validate(&self) -> StoreResult<()> {
        if self.beat_id.is_empty() {
            return Err(StoreError::InvalidRequest(
                "productId must not be empty".to_string(),
            ));
        }
        if self.customer_email.is_empty() {
            return Err(StoreError::InvalidRequest(
                "customerEmail must not be empty".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(StoreError::InvalidPrice {
                message: format!("price must be positive, got {}", self.price),
            });
        }
        Ok(())
    }

    /// Amount to charge in the smallest currency unit
    pub fn unit_amount(&self) -> i64 {
        self.currency.to_minor_units(self.price)
    }

    /// Line-item name shown on the hosted payment page
    pub fn line_item_name(&self) -> String {
        let variant = if self.has_stems { "WAV + Stems" } else { "WAV Only" };
        format!("{} - {}", self.beat_name, variant)
    }

    /// Line-item description shown on the hosted payment page
    pub fn line_item_description(&self) -> String {
        format!("Exclusive license for {}", self.beat_name)
    }

    /// Session metadata round-tripped through the payment provider
    pub fn session_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (metadata::BEAT_ID.to_string(), self.beat_id.clone()),
            (metadata::BEAT_NAME.to_string(), self.beat_name.clone()),
            (metadata::HAS_STEMS.to_string(), self.has_stems.to_string()),
        ])
    }
}

/// A checkout session created by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's opaque session id
    pub session_id: String,

    /// URL to redirect the buyer to for payment
    pub checkout_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Current state of a session as reported by the provider.
///
/// Read-only view used by the success page; the provider owns the session
/// state machine, this type only observes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Provider's session id
    pub session_id: String,

    /// Payment status reported by the provider ("paid", "unpaid", ...)
    pub payment_status: String,

    /// Buyer email, if the provider captured one
    pub customer_email: Option<String>,

    /// Session metadata as supplied at creation
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SessionRecord {
    /// Display name of the purchased beat, from session metadata
    pub fn beat_name(&self) -> Option<&str> {
        self.metadata.get(metadata::BEAT_NAME).map(|s| s.as_str())
    }
}

/// A verified webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event id from the provider
    pub event_id: String,

    /// What happened
    pub kind: WebhookEventKind,

    /// Provider-side event timestamp
    pub created: DateTime<Utc>,
}

/// Webhook event kinds
#[derive(Debug, Clone)]
pub enum WebhookEventKind {
    /// A checkout session completed; the buyer has paid
    CheckoutCompleted(CheckoutCompleted),
    /// Any other event type (acknowledged, not acted on)
    Other(String),
}

/// Payload of a completed checkout session
#[derive(Debug, Clone)]
pub struct CheckoutCompleted {
    /// Provider's session id
    pub session_id: String,

    /// Payment status reported with the event
    pub payment_status: String,

    /// Buyer email captured by the provider
    pub customer_email: Option<String>,

    /// Session metadata as supplied at creation
    pub metadata: HashMap<String, String>,
}

impl CheckoutCompleted {
    /// Catalog id of the purchased beat, from session metadata
    pub fn beat_id(&self) -> Option<&str> {
        self.metadata.get(metadata::BEAT_ID).map(|s| s.as_str())
    }

    /// Display name of the purchased beat, from session metadata
    pub fn beat_name(&self) -> Option<&str> {
        self.metadata.get(metadata::BEAT_NAME).map(|s| s.as_str())
    }

    /// Whether the stems archive was purchased
    pub fn has_stems(&self) -> bool {
        self.metadata
            .get(metadata::HAS_STEMS)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Build the fulfillment order for this purchase.
    ///
    /// Returns `None` when the beat id or buyer email is missing, in which
    /// case there is nothing to deliver.
    pub fn fulfillment_order(&self) -> Option<FulfillmentOrder> {
        let beat_id = self.beat_id()?;
        let email = self.customer_email.as_deref()?;
        Some(FulfillmentOrder {
            customer_email: email.to_string(),
            beat_id: beat_id.to_string(),
            beat_name: self
                .beat_name()
                .unwrap_or(beat_id)
                .to_string(),
            include_stems: self.has_stems(),
        })
    }
}

/// Everything the mailer needs to deliver a purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentOrder {
    /// Where to send the files
    pub customer_email: String,

    /// Catalog id to look up
    pub beat_id: String,

    /// Display name used in the subject and body
    pub beat_name: String,

    /// Attach the stems archive as well as the WAV
    pub include_stems: bool,
}
