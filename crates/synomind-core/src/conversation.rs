//! Conversation types shared by the prompt composer, the generation backends and the gateway.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Returns `None` for anything outside the closed role set (e.g. "system", "tool").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("user") => Some(Role::User),
            s if s.eq_ignore_ascii_case("assistant") => Some(Role::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Platform module the user is currently in. Selects the prompt addendum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Environment,
    Wellness,
    Kitchen,
    Wardrobe,
    #[default]
    General,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Environment => "environment",
            Module::Wellness => "wellness",
            Module::Kitchen => "kitchen",
            Module::Wardrobe => "wardrobe",
            Module::General => "general",
        }
    }

    /// Unknown or empty names map to [`Module::General`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" => Module::Environment,
            "wellness" => Module::Wellness,
            "kitchen" => Module::Kitchen,
            "wardrobe" => Module::Wardrobe,
            _ => Module::General,
        }
    }
}

/// Per-request context. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    pub module: Module,
    /// Opaque user-data snapshot; serialized into the prompt when it carries anything.
    pub user_data: Option<serde_json::Value>,
}

impl ConversationContext {
    pub fn for_module(module: Module) -> Self {
        Self { module, user_data: None }
    }

    pub fn with_user_data(mut self, data: serde_json::Value) -> Self {
        self.user_data = Some(data);
        self
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    /// Chronological; order is preserved by every backend.
    pub history: Vec<ConversationTurn>,
    pub message: String,
}

impl GenerationRequest {
    pub fn new(
        system_prompt: impl Into<String>,
        history: Vec<ConversationTurn>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history,
            message: message.into(),
        }
    }
}
