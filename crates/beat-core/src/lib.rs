//! # beat-core
//!
//! Core types and traits for the beat-store backend.
//!
//! This crate provides:
//! - `PaymentGateway` trait for the payment provider seam
//! - `Fulfillment` trait for the purchased-file delivery seam
//! - `Beat` and `BeatCatalog` for the sellable catalog
//! - `CheckoutOrder`, `CheckoutSession`, and `WebhookEvent` for the purchase flow
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use beat_core::{BeatCatalog, CheckoutOrder, PaymentGateway};
//!
//! // Build an order from a validated request
//! let order = CheckoutOrder::new("beat1", "GN1", 49.99, true, "buyer@example.com");
//! order.validate()?;
//!
//! // Create the hosted checkout session
//! let session = gateway.create_checkout(&order, &success_url, &cancel_url).await?;
//!
//! // Redirect the buyer to session.checkout_url
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod gateway;

// Re-exports for convenience
pub use catalog::{Beat, BeatCatalog};
pub use checkout::{
    metadata, CheckoutCompleted, CheckoutOrder, CheckoutSession, Currency, FulfillmentOrder,
    SessionRecord, WebhookEvent, WebhookEventKind,
};
pub use error::{StoreError, StoreResult};
pub use gateway::{BoxedFulfillment, BoxedPaymentGateway, Fulfillment, PaymentGateway};
