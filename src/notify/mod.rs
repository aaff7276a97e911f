//! Telegram front-end
//!
//! Long-polls the Bot API for command messages, dispatches them through
//! `CommandHandler` one at a time and sends the replies back.

pub mod commands;
pub mod format;


pub use commands::{Command, CommandHandler, Reply};

use crate::config::TelegramConfig;
use crate::error::{BotError, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Pause after a failed poll before trying again
const RETRY_DELAY_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramBot {
    http: Client,
    bot_token: String,
    poll_timeout_secs: u64,
}

impl TelegramBot {
    pub fn new(bot_token: String, config: &TelegramConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;

        Ok(Self {
            http,
            bot_token,
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let response = self.http.post(self.api_url(method)).json(body).send().await?;
        let text = response.text().await?;
        parse_response(method, &text)
    }

    /// Wait for new updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &body).await
    }

    pub async fn send_reply(&self, chat_id: i64, reply_to: Option<i64>, reply: &Reply) -> Result<()> {
        let msg = OutgoingMessage {
            chat_id,
            text: &reply.text,
            parse_mode: reply.markdown.then_some("Markdown"),
            disable_web_page_preview: true,
            reply_to_message_id: reply_to,
        };
        let _: serde_json::Value = self.call("sendMessage", &msg).await?;
        Ok(())
    }

    /// Poll forever, answering each command before reading the next
    pub async fn run(&self, handler: &CommandHandler) -> Result<()> {
        tracing::info!("Starting bot");
        let mut offset = None;

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(u) => u,
                Err(e) => {
                    tracing::error!("Failed to get updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };
                let Some(text) = message.text.as_deref() else {
                    continue;
                };
                let Some(replies) = handler.handle(text).await else {
                    continue;
                };

                for reply in &replies {
                    if let Err(e) = self
                        .send_reply(message.chat.id, Some(message.message_id), reply)
                        .await
                    {
                        tracing::error!("Telegram send failed: {}", e);
                    }
                }
            }
        }
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let parsed: ApiResponse<T> = serde_json::from_str(body)?;
    decode_response(method, parsed)
}

fn decode_response<T>(method: &str, response: ApiResponse<T>) -> Result<T> {
    match response {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(BotError::Telegram(format!(
            "{} failed: {}",
            method,
            description.unwrap_or_else(|| "no description".to_string())
        ))),
    }
}
