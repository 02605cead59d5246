//! Task-board integration: feedback and image submissions become Trello cards.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, multipart, Client};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TrelloConfig;
use crate::models::{FeedbackSubmission, ImageSubmission};

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Relays user submissions to an external service
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward_feedback(&self, submission: &FeedbackSubmission) -> Result<(), ForwardError>;

    async fn submit_image(&self, submission: &ImageSubmission) -> Result<(), ForwardError>;
}

#[derive(Debug, Deserialize)]
struct CreatedCard {
    id: String,
    url: String,
}

/// Trello REST client
pub struct TrelloForwarder {
    client: Client,
    config: TrelloConfig,
}

impl TrelloForwarder {
    pub fn new(config: TrelloConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client for Trello")?;

        Ok(Self { client, config })
    }

    /// Create a card at the top of `list_id` and return its id and URL
    async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: &str,
    ) -> Result<CreatedCard, ForwardError> {
        let url = format!("{}/1/cards", self.config.api_base);
        let members = self.config.member_ids.join(",");

        let resp = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("idList", list_id),
                ("key", self.config.api_key.as_str()),
                ("token", self.config.api_token.as_str()),
                ("name", name),
                ("desc", desc),
                ("pos", "top"),
                ("idMembers", members.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            // Log size only; the body may echo credentials
            if let Ok(body) = resp.text().await {
                debug!(
                    "Trello card creation rejected (status: {}, bytes: {})",
                    status,
                    body.len()
                );
            }
            return Err(ForwardError::Api(format!("HTTP {} creating card", status)));
        }

        resp.json::<CreatedCard>()
            .await
            .map_err(|e| ForwardError::Parse(format!("unexpected card response: {}", e)))
    }

    async fn attach_image(
        &self,
        card_id: &str,
        submission: &ImageSubmission,
    ) -> Result<(), ForwardError> {
        let url = format!("{}/1/cards/{}/attachments", self.config.api_base, card_id);

        let file = multipart::Part::bytes(submission.bytes.clone())
            .file_name(submission.file_name.clone())
            .mime_str(&submission.content_type)?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("name", submission.file_name.clone())
            .text("mimeType", submission.content_type.clone())
            .text("setCover", "true");

        let resp = self
            .client
            .post(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("token", self.config.api_token.as_str()),
            ])
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ForwardError::Api(format!(
                "HTTP {} uploading attachment",
                status
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Forwarder for TrelloForwarder {
    async fn forward_feedback(&self, submission: &FeedbackSubmission) -> Result<(), ForwardError> {
        let name = format!("Feedback from: {}", submission.name);

        let card = self
            .create_card(&self.config.feedback_list_id, &name, &submission.feedback)
            .await?;

        info!("Feedback card created: {}", card.url);
        Ok(())
    }

    async fn submit_image(&self, submission: &ImageSubmission) -> Result<(), ForwardError> {
        let name = format!("New Image for Recipe #{}", submission.recipe_id);
        let desc = format!(
            "Original filename: {}\nMIME type: {}\nSize: {}",
            submission.file_name,
            submission.content_type,
            submission.size()
        );

        let card = self
            .create_card(&self.config.images_list_id, &name, &desc)
            .await?;
        self.attach_image(&card.id, submission).await?;

        info!("Image submission card created: {}", card.url);
        Ok(())
    }
}
