//! Remote backend: Anthropic Messages API.
//!
//! API key: `ANTHROPIC_API_KEY` in the environment (or `.env`). Without it every call fails with
//! [`CoreError::MissingCredential`], which the adapter turns into the apology text.

use super::extract::extract_reply_text;
use crate::conversation::{ConversationTurn, GenerationRequest, Role};
use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub api_key: Option<String>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct MessageParam {
    role: &'static str,
    content: String,
}

pub struct RemoteBackend {
    settings: RemoteSettings,
    client: reqwest::Client,
}

impl RemoteBackend {
    /// Fails when the HTTP client cannot be built; a client without the configured timeout is
    /// never substituted.
    pub fn new(settings: RemoteSettings) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                tracing::error!(target: "synomind::generation", error = %e, "remote HTTP client could not be built");
                CoreError::Initialization(format!("remote HTTP client: {}", e))
            })?;
        let api_key = settings
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(Self {
            settings: RemoteSettings { api_key, ..settings },
            client,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.settings.api_url.trim_end_matches('/'))
    }

    pub(crate) async fn try_generate(&self, request: &GenerationRequest) -> CoreResult<String> {
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            CoreError::MissingCredential("ANTHROPIC_API_KEY is not set".to_string())
        })?;

        let messages = alternate_messages(&request.history, &request.message);
        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: TEMPERATURE,
            system: &request.system_prompt,
            messages,
        };

        let res = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let raw = res.text().await?;
        if !status.is_success() {
            return Err(CoreError::Generation(format!("remote API error {}: {}", status, raw)));
        }

        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Generation(format!("remote response is not JSON: {}", e)))?;

        match extract_reply_text(&parsed) {
            Some((text, stage)) => {
                tracing::debug!(target: "synomind::generation", stage = stage.as_str(), model = %self.settings.model, "remote reply extracted");
                Ok(text)
            }
            None => Err(CoreError::Generation("remote response carried no text".to_string())),
        }
    }
}

/// Maps history plus the new message onto the strictly alternating user/assistant list the
/// Messages API accepts: leading assistant turns are dropped, consecutive same-role turns are
/// joined with a blank line, and the new message merges into a trailing user turn.
pub(crate) fn alternate_messages(history: &[ConversationTurn], message: &str) -> Vec<MessageParam> {
    let turns = history
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(|turn| (turn.role, turn.content.trim()))
        .chain(std::iter::once((Role::User, message.trim())));

    let mut out: Vec<MessageParam> = Vec::new();
    for (role, content) in turns {
        let role = match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        if out.is_empty() && role == "assistant" {
            continue;
        }
        if let Some(last) = out.last_mut().filter(|last| last.role == role) {
            if !content.is_empty() {
                if !last.content.is_empty() {
                    last.content.push_str("\n\n");
                }
                last.content.push_str(content);
            }
            continue;
        }
        out.push(MessageParam {
            role,
            content: content.to_string(),
        });
    }
    out
}
