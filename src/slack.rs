// src/slack.rs
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info};

pub const SLACK_API_BASE_URL: &str = "https://slack.com/api";

const PAGE_LIMIT: u32 = 200;

// --- Slack API Data Structures ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackProfile {
    /// Bots and some guest accounts carry no email.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackMember {
    pub id: String,
    pub profile: SlackProfile,
}

// Slack wraps every response in an `ok` envelope; failures come back as
// HTTP 200 with `ok: false` and an `error` string.
#[derive(Debug, Clone, Deserialize)]
struct MembersResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    members: Vec<SlackMember>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

// --- Error type ---

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("Slack API returned HTTP {status}")]
    HttpStatus { status: StatusCode },

    #[error("Slack API call failed: {0}")]
    ApiError(String),
}

// --- Client ---

#[derive(Clone)]
pub struct SlackClient {
    http_client: Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(token: String) -> Self {
        Self {
            http_client: Client::new(),
            token,
            base_url: SLACK_API_BASE_URL.to_string(),
        }
    }

    /// Fetches the full member roster, following Slack's cursor pagination.
    pub async fn users_list(&self) -> Result<Vec<SlackMember>, SlackError> {
        info!("Fetching Slack member roster...");
        let mut all_members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }

            let response = self
                .http_client
                .get(format!("{}/users.list", self.base_url))
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                error!("Slack users.list returned HTTP {}", status);
                return Err(SlackError::HttpStatus { status });
            }

            let body: MembersResponse = response.json().await?;
            if !body.ok {
                let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
                error!("Slack users.list rejected: {}", reason);
                return Err(SlackError::ApiError(reason));
            }

            debug!("Fetched {} Slack members on this page", body.members.len());
            all_members.extend(body.members);

            // An empty next_cursor means the last page.
            cursor = body
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        info!("Fetched {} Slack members total.", all_members.len());
        Ok(all_members)
    }

    /// Posts a plain-text message to a channel.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        info!("Posting report message to Slack channel '{}'", channel);
        let payload = json!({
            "channel": channel,
            "text": text,
        });

        let response = self
            .http_client
            .post(format!("{}/chat.postMessage", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Slack chat.postMessage returned HTTP {}", status);
            return Err(SlackError::HttpStatus { status });
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            error!("Slack chat.postMessage rejected: {}", reason);
            return Err(SlackError::ApiError(reason));
        }

        Ok(())
    }
}
