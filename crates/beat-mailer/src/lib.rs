//! # beat-mailer
//!
//! SMTP fulfillment for beat-store-rs.
//!
//! After a checkout session completes, this crate delivers the purchased
//! files: it looks the beat up in the catalog, downloads the WAV (and the
//! stems archive when purchased), and sends one multipart email with the
//! files attached.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beat_mailer::FulfillmentMailer;
//! use beat_core::{Fulfillment, FulfillmentOrder};
//!
//! let mailer = FulfillmentMailer::from_env(catalog)?;
//!
//! mailer.deliver(&FulfillmentOrder {
//!     customer_email: "buyer@example.com".into(),
//!     beat_id: "beat1".into(),
//!     beat_name: "GN1".into(),
//!     include_stems: true,
//! }).await?;
//! ```
//!
//! Failure policy: a missing catalog entry is logged and dropped; transport
//! and download errors propagate to the caller, which logs and drops them.
//! There is no retry and no dead-letter path.

pub mod config;
pub mod mailer;
pub mod template;

// Re-exports
pub use config::MailerConfig;
pub use mailer::FulfillmentMailer;
