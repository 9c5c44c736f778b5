//! Telegram Bot API delivery: plain sendMessage, optionally into a forum
//! topic via message_thread_id.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
    ) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = SendMessage {
            chat_id,
            text,
            message_thread_id: thread_id,
        };

        let resp: ApiResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("sendMessage to {chat_id}"))?
            .json()
            .await
            .context("decoding sendMessage response")?;

        if !resp.ok {
            bail!(
                "telegram rejected sendMessage to {chat_id}: {}",
                resp.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        Ok(())
    }

    /// Operator diagnostic sink. Best-effort: a failing error channel must
    /// not mask the original failure, so this only logs.
    pub async fn report_error(&self, error_chat_id: i64, text: &str) {
        if error_chat_id == 0 {
            error!("no error_chat_id configured; diagnostic dropped: {text}");
            return;
        }
        if let Err(err) = self.send_message(error_chat_id, None, text).await {
            error!(%err, "failed to deliver operator diagnostic: {text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_id_is_omitted_when_absent() {
        let msg = SendMessage {
            chat_id: -100,
            text: "hi",
            message_thread_id: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("message_thread_id").is_none());

        let msg = SendMessage {
            message_thread_id: Some(42),
            ..msg
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["message_thread_id"], 42);
    }
}
