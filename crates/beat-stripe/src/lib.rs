//! # beat-stripe
//!
//! Stripe payment gateway for beat-store-rs.
//!
//! This crate implements the `PaymentGateway` trait against Stripe's
//! Checkout Sessions API:
//!
//! - **Session creation** - hosted payment page with the beat as a single
//!   line item and the purchase details round-tripped in session metadata
//! - **Session retrieval** - read-only lookup for the confirmation page
//! - **Webhook verification** - HMAC-SHA256 signature check before any
//!   event is acted on
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beat_stripe::StripeGateway;
//! use beat_core::{CheckoutOrder, PaymentGateway};
//!
//! // Create gateway from environment
//! let gateway = StripeGateway::from_env()?;
//!
//! // Create checkout session
//! let order = CheckoutOrder::new("beat1", "GN1", 49.99, true, "buyer@example.com");
//! let session = gateway.create_checkout(
//!     &order,
//!     "https://example.com/success.html?session_id={CHECKOUT_SESSION_ID}",
//!     "https://example.com/beatstore.html",
//! ).await?;
//!
//! // Redirect buyer to session.checkout_url
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeGateway;
pub use config::StripeConfig;
pub use webhook::{signature_header, SIGNATURE_TOLERANCE_SECS};
