//! # Fulfillment Mailer
//!
//! Delivers purchased beat files by email. Looks the beat up in the catalog,
//! downloads the file bytes from their storage locations, and sends a single
//! multipart message with the files attached.

use crate::config::MailerConfig;
use crate::template;
use async_trait::async_trait;
use beat_core::{Beat, BeatCatalog, Fulfillment, FulfillmentOrder, StoreError, StoreResult};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// SMTP-backed implementation of `Fulfillment`.
pub struct FulfillmentMailer {
    config: MailerConfig,
    catalog: Arc<BeatCatalog>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    http: Client,
}

impl FulfillmentMailer {
    /// Create a new mailer over an SMTP relay
    pub fn new(config: MailerConfig, catalog: Arc<BeatCatalog>) -> StoreResult<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                StoreError::Configuration(format!(
                    "SMTP relay {} unusable: {}",
                    config.smtp_host, e
                ))
            })?
            .credentials(credentials)
            .build();

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            config,
            catalog,
            transport,
            http,
        })
    }

    /// Create from environment variables
    pub fn from_env(catalog: Arc<BeatCatalog>) -> StoreResult<Self> {
        let config = MailerConfig::from_env()?;
        Self::new(config, catalog)
    }

    /// Download one attachment's bytes from its storage location
    async fn fetch_bytes(&self, url: &str) -> StoreResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Network(format!(
                "Fetching {} returned HTTP {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Build the purchase message with the WAV (and optionally stems) attached
    pub fn compose(
        &self,
        order: &FulfillmentOrder,
        beat: &Beat,
        wav: Vec<u8>,
        stems: Option<Vec<u8>>,
    ) -> StoreResult<Message> {
        let from: Mailbox = self
            .config
            .from_address
            .parse()
            .map_err(|e| StoreError::MailCompose(format!("Bad from address: {}", e)))?;

        let to: Mailbox = order
            .customer_email
            .parse()
            .map_err(|e| StoreError::MailCompose(format!("Bad recipient address: {}", e)))?;

        let html = template::purchase_html(
            &self.config.store_name,
            &self.config.support_email,
            &order.beat_name,
            stems.is_some(),
        );

        let wav_type = ContentType::parse("audio/wav")
            .map_err(|e| StoreError::MailCompose(e.to_string()))?;

        let mut body = MultiPart::mixed()
            .singlepart(SinglePart::html(html))
            .singlepart(Attachment::new(beat.wav_filename()).body(wav, wav_type));

        if let Some(stems_bytes) = stems {
            let zip_type = ContentType::parse("application/zip")
                .map_err(|e| StoreError::MailCompose(e.to_string()))?;
            body = body.singlepart(Attachment::new(beat.stems_filename()).body(stems_bytes, zip_type));
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(template::purchase_subject(&order.beat_name))
            .multipart(body)
            .map_err(|e| StoreError::MailCompose(e.to_string()))
    }
}

#[async_trait]
impl Fulfillment for FulfillmentMailer {
    #[instrument(skip(self, order), fields(beat_id = %order.beat_id, to = %order.customer_email))]
    async fn deliver(&self, order: &FulfillmentOrder) -> StoreResult<()> {
        // A paid session pointing at an unknown beat is an external error:
        // log it and drop the delivery rather than failing the webhook.
        let Some(beat) = self.catalog.get(&order.beat_id) else {
            error!("Beat not found: {}", order.beat_id);
            return Ok(());
        };

        let wav = self.fetch_bytes(&beat.wav_url).await?;

        // The stems archive ships only when it was purchased AND the catalog
        // defines one for this beat.
        let stems = match (order.include_stems, &beat.stems_url) {
            (true, Some(url)) => Some(self.fetch_bytes(url).await?),
            _ => None,
        };

        let message = self.compose(order, beat, wav, stems)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| StoreError::MailTransport(e.to_string()))?;

        info!(
            "Beat files sent to {} for {}",
            order.customer_email, order.beat_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer_with(catalog: BeatCatalog) -> FulfillmentMailer {
        let config = MailerConfig::new("smtp.gmail.com", "store@example.com", "app-password");
        FulfillmentMailer::new(config, Arc::new(catalog)).unwrap()
    }

    fn order(include_stems: bool) -> FulfillmentOrder {
        FulfillmentOrder {
            customer_email: "buyer@example.com".to_string(),
            beat_id: "beat1".to_string(),
            beat_name: "GN1".to_string(),
            include_stems,
        }
    }

    fn beat_with_stems() -> Beat {
        Beat::new("beat1", "GN1", "https://files.example.com/gn1.wav")
            .with_stems("https://files.example.com/gn1_stems.zip")
    }

    #[tokio::test]
    async fn test_compose_attaches_wav_and_stems() {
        let mailer = mailer_with(BeatCatalog::new().with_beat(beat_with_stems()));
        let message = mailer
            .compose(
                &order(true),
                &beat_with_stems(),
                vec![1, 2, 3],
                Some(vec![4, 5, 6]),
            )
            .unwrap();

        let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(rendered.contains("Your Exclusive Beat Purchase - GN1"));
        assert!(rendered.contains("GN1.wav"));
        assert!(rendered.contains("GN1_Stems.zip"));
    }

    #[tokio::test]
    async fn test_compose_wav_only() {
        let mailer = mailer_with(BeatCatalog::new().with_beat(beat_with_stems()));
        let message = mailer
            .compose(&order(false), &beat_with_stems(), vec![1, 2, 3], None)
            .unwrap();

        let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(rendered.contains("GN1.wav"));
        assert!(!rendered.contains("GN1_Stems.zip"));
    }

    #[tokio::test]
    async fn test_compose_rejects_bad_recipient() {
        let mailer = mailer_with(BeatCatalog::new().with_beat(beat_with_stems()));
        let mut bad = order(false);
        bad.customer_email = "not-an-address".to_string();

        let err = mailer
            .compose(&bad, &beat_with_stems(), vec![1, 2, 3], None)
            .unwrap_err();
        assert!(matches!(err, StoreError::MailCompose(_)));
    }

    #[tokio::test]
    async fn test_deliver_unknown_beat_is_silently_dropped() {
        // Empty catalog: the lookup fails before any network or SMTP work.
        let mailer = mailer_with(BeatCatalog::new());
        let result = mailer.deliver(&order(true)).await;
        assert!(result.is_ok());
    }
}
