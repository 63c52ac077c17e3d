//! # beat-api
//!
//! HTTP API layer for beat-store-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout, webhook, and session-verification endpoints
//! - Static storefront asset serving
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session` | Create checkout session |
//! | POST | `/webhook` | Stripe payment-event webhook |
//! | GET | `/verify-session` | Session status for the success page |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
