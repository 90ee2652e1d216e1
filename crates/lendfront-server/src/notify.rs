//! Lead notifiers.
//!
//! [`TelegramNotifier`] posts the rendered lead to a Telegram chat through the
//! bot API's `sendMessage`. [`LogNotifier`] is used when no bot is configured
//! and only writes the lead to the log.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lendfront_core::error::LeadError;
use lendfront_core::lead::{LeadNotifier, LeadRequest, NotifyReceipt};

use crate::config::TelegramConfig;

/// Public Telegram bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Sends lead notifications to a Telegram chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
    timeout: Duration,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Notifier for the public bot API.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::NotConfigured`] if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self, LeadError> {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    /// Notifier for a bot API served at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::NotConfigured`] if the HTTP client cannot be built.
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Result<Self, LeadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LeadError::NotConfigured {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait::async_trait]
impl LeadNotifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, lead: &LeadRequest, received_at: DateTime<Utc>) -> Result<NotifyReceipt, LeadError> {
        let text = lead.render_message(received_at);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "Markdown",
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LeadError::Webhook {
                reason: if e.is_timeout() {
                    format!("timed out after {}s", self.timeout.as_secs())
                } else {
                    // The token is part of the URL, keep it out of the error.
                    e.without_url().to_string()
                },
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LeadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendMessageResponse = resp.json().await.map_err(|e| LeadError::Webhook {
            reason: format!("failed to parse response: {}", e.without_url()),
        })?;
        if !parsed.ok {
            return Err(LeadError::Rejected {
                status: status.as_u16(),
                body: parsed.description.unwrap_or_default(),
            });
        }

        let message_id = parsed.result.map(|m| m.message_id);
        info!(chat_id = %self.chat_id, ?message_id, "lead notification sent");
        Ok(NotifyReceipt { message_id })
    }
}

/// Writes leads to the log instead of notifying anyone.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl LeadNotifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, lead: &LeadRequest, received_at: DateTime<Utc>) -> Result<NotifyReceipt, LeadError> {
        warn!(
            name = %lead.name,
            amount = %lead.amount,
            purpose = %lead.purpose,
            %received_at,
            "lead received but no Telegram bot is configured"
        );
        Ok(NotifyReceipt::default())
    }
}
