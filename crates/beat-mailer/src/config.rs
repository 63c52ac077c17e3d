//! # Mailer Configuration
//!
//! SMTP credentials and store branding, loaded from environment variables.

use beat_core::StoreError;
use std::env;

/// Outbound mail configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP relay host (e.g., "smtp.gmail.com")
    pub smtp_host: String,

    /// SMTP username
    pub username: String,

    /// SMTP password (app password for Gmail)
    pub password: String,

    /// From address; defaults to the SMTP username
    pub from_address: String,

    /// Store name shown in the email header
    pub store_name: String,

    /// Support address shown in the email footer
    pub support_email: String,
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SMTP_USERNAME`
    /// - `SMTP_PASSWORD`
    ///
    /// Optional: `SMTP_HOST`, `SMTP_FROM`, `STORE_NAME`, `SUPPORT_EMAIL`.
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let username = env::var("SMTP_USERNAME")
            .map_err(|_| StoreError::Configuration("SMTP_USERNAME not set".to_string()))?;

        let password = env::var("SMTP_PASSWORD")
            .map_err(|_| StoreError::Configuration("SMTP_PASSWORD not set".to_string()))?;

        let from_address = env::var("SMTP_FROM").unwrap_or_else(|_| username.clone());

        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            username,
            password,
            from_address,
            store_name: env::var("STORE_NAME").unwrap_or_else(|_| "MILLERS".to_string()),
            support_email: env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "contact@millersaudio.com".to_string()),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        smtp_host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let username: String = username.into();
        Self {
            smtp_host: smtp_host.into(),
            from_address: username.clone(),
            username,
            password: password.into(),
            store_name: "MILLERS".to_string(),
            support_email: "contact@millersaudio.com".to_string(),
        }
    }

    /// Builder: set an explicit from address
    pub fn with_from_address(mut self, address: impl Into<String>) -> Self {
        self.from_address = address.into();
        self
    }

    /// Builder: set the store branding
    pub fn with_branding(
        mut self,
        store_name: impl Into<String>,
        support_email: impl Into<String>,
    ) -> Self {
        self.store_name = store_name.into();
        self.support_email = support_email.into();
        self
    }
}
