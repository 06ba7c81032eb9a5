//! Local backend: renders the conversation into one prompt for the gateway-owned engine.
//!
//! Generation calls against the shared engine are serialized behind `generation_lock`. The lock
//! is separate from the gateway's init lock, so a slow generation never blocks health checks
//! or a retrying initialization.

use crate::conversation::{GenerationRequest, Role};
use crate::error::{CoreError, CoreResult};
use crate::model_gateway::{ModelGateway, SamplingParams};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const LOCAL_STOP_MARKERS: [&str; 4] = ["<|user|>", "<|system|>", "User:", "</s>"];

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;

/// Role markers and speaker labels the model sometimes echoes back.
const ARTIFACT_MARKERS: [&str; 7] = [
    "<|assistant|>",
    "<|user|>",
    "<|system|>",
    "</s>",
    "SynoMind:",
    "Assistant:",
    "assistant:",
];

pub struct LocalBackend {
    gateway: Arc<ModelGateway>,
    sampling: SamplingParams,
    timeout: Duration,
    generation_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(gateway: Arc<ModelGateway>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            gateway,
            sampling: SamplingParams {
                max_tokens,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                stop: LOCAL_STOP_MARKERS.iter().map(|s| s.to_string()).collect(),
            },
            timeout,
            generation_lock: Mutex::new(()),
        }
    }

    pub fn gateway(&self) -> &Arc<ModelGateway> {
        &self.gateway
    }

    pub fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }

    pub(crate) async fn try_generate(&self, request: &GenerationRequest) -> CoreResult<String> {
        let engine = self.gateway.get_instance().await?;
        let prompt = render_turns(request);

        // The deadline covers the wait for the generation lock as well as the completion.
        let serialized = async {
            let _serialized = self.generation_lock.lock().await;
            engine.complete(&prompt, &self.sampling).await
        };
        let raw = tokio::time::timeout(self.timeout, serialized)
            .await
            .map_err(|_| {
                CoreError::Generation(format!(
                    "local generation timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        let cleaned = clean_local_output(&raw);
        if cleaned.is_empty() {
            return Err(CoreError::Generation("local engine produced no usable text".to_string()));
        }
        Ok(cleaned)
    }
}

/// Renders system prompt, history and the new message as one structured turn sequence,
/// ending on an open assistant turn.
pub fn render_turns(request: &GenerationRequest) -> String {
    let mut out = String::with_capacity(request.system_prompt.len() + request.message.len() + 256);
    out.push_str("<|system|>\n");
    out.push_str(request.system_prompt.trim());
    out.push('\n');
    for turn in &request.history {
        out.push_str(match turn.role {
            Role::User => "<|user|>\n",
            Role::Assistant => "<|assistant|>\n",
        });
        out.push_str(turn.content.trim());
        out.push('\n');
    }
    out.push_str("<|user|>\n");
    out.push_str(request.message.trim());
    out.push_str("\n<|assistant|>");
    out
}

/// Strips echoed role markers and speaker labels; cuts at any marker that opens a new turn.
pub fn clean_local_output(raw: &str) -> String {
    let mut text = raw.trim();

    // A new user/system turn means the model kept going past its own reply.
    for marker in ["<|user|>", "<|system|>", "\nUser:"] {
        if let Some(idx) = text.find(marker) {
            text = &text[..idx];
        }
    }

    let mut cleaned = text.to_string();
    for marker in ARTIFACT_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.trim().to_string()
}
