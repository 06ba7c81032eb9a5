//! Generation Adapter: one contract over the local and the remote backend.
//!
//! [`GenerationAdapter::generate`] always returns displayable text. Timeouts, transport errors and
//! empty or malformed output are logged and replaced by [`FALLBACK_REPLY`] with `failed = true`.

mod extract;
mod local;
mod remote;

pub use extract::{extract_reply_text, ExtractionStage};
pub use local::{clean_local_output, render_turns, LocalBackend, LOCAL_STOP_MARKERS};
pub use remote::{RemoteBackend, RemoteSettings, ANTHROPIC_VERSION};

use crate::conversation::GenerationRequest;
use crate::error::CoreError;
use serde::Serialize;

/// Fixed user-facing apology used whenever a backend cannot produce text.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't generate a proper response right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Never empty.
    pub text: String,
    pub backend_used: BackendKind,
    /// True when `text` is the fallback apology.
    pub failed: bool,
}

impl GenerationResult {
    fn from_outcome(backend: BackendKind, outcome: Result<String, CoreError>) -> Self {
        match outcome {
            Ok(text) if !text.trim().is_empty() => Self {
                text,
                backend_used: backend,
                failed: false,
            },
            Ok(_) => {
                tracing::warn!(target: "synomind::generation", backend = backend.as_str(), "backend returned empty text");
                Self::apology(backend)
            }
            Err(e) => {
                tracing::warn!(target: "synomind::generation", backend = backend.as_str(), error = %e, "generation failed");
                Self::apology(backend)
            }
        }
    }

    pub fn apology(backend: BackendKind) -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            backend_used: backend,
            failed: true,
        }
    }
}

/// Closed set of backends, chosen once from configuration.
pub enum GenerationAdapter {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl GenerationAdapter {
    pub fn kind(&self) -> BackendKind {
        match self {
            GenerationAdapter::Local(_) => BackendKind::Local,
            GenerationAdapter::Remote(_) => BackendKind::Remote,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let outcome = match self {
            GenerationAdapter::Local(backend) => backend.try_generate(request).await,
            GenerationAdapter::Remote(backend) => backend.try_generate(request).await,
        };
        let result = GenerationResult::from_outcome(self.kind(), outcome);
        tracing::debug!(
            target: "synomind::generation",
            backend = result.backend_used.as_str(),
            failed = result.failed,
            history = request.history.len(),
            len = result.text.len(),
            "generation finished"
        );
        result
    }
}
