//! # Application State
//!
//! Shared state for the Axum application: the payment gateway, the
//! fulfillment mailer, the beat catalog, and server configuration. The
//! catalog is loaded once at startup and shared read-only.

use beat_core::{BeatCatalog, BoxedFulfillment, BoxedPaymentGateway};
use beat_mailer::FulfillmentMailer;
use beat_stripe::StripeGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the storefront (used to build redirect URLs)
    pub frontend_url: String,
    /// Directory served for static assets
    pub static_dir: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// URL the buyer lands on after paying; the payment provider substitutes
    /// the session id into the placeholder.
    pub fn success_url(&self) -> String {
        format!(
            "{}/success.html?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        )
    }

    /// URL the buyer lands on after abandoning checkout
    pub fn cancel_url(&self) -> String {
        format!("{}/beatstore.html", self.frontend_url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Fulfillment mailer
    pub fulfillment: BoxedFulfillment,
    /// Beat catalog
    pub catalog: Arc<BeatCatalog>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the production state: Stripe gateway + SMTP mailer
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let catalog = Arc::new(load_catalog()?);

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let mailer = FulfillmentMailer::from_env(catalog.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize mailer: {}", e))?;

        Ok(Self {
            gateway: Arc::new(gateway),
            fulfillment: Arc::new(mailer),
            catalog,
            config,
        })
    }
}

/// Load the beat catalog from the config file
fn load_catalog() -> anyhow::Result<BeatCatalog> {
    let config_paths = [
        "config/catalog.toml",
        "../config/catalog.toml",
        "../../config/catalog.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = BeatCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} beats from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    // Fulfillment will drop deliveries for every beat id until a catalog
    // file is provided.
    tracing::warn!("No beat catalog found, using empty catalog");
    Ok(BeatCatalog::new())
}
