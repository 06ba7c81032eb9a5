//! SynoMind assistant: prompt composition plus generation, wired from configuration.

use crate::config::SynoConfig;
use crate::conversation::{ConversationContext, ConversationTurn, GenerationRequest};
use crate::error::CoreResult;
use crate::generation::{
    BackendKind, GenerationAdapter, GenerationResult, LocalBackend, RemoteBackend, RemoteSettings,
};
use crate::llama_sidecar::LlamaServerLoader;
use crate::model_gateway::{GatewayHealth, ModelGateway};
use crate::prompt::PromptComposer;
use serde::Serialize;
use std::sync::Arc;

/// Backend readiness as reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHealth {
    pub backend: BackendKind,
    pub model_exists: bool,
    pub model_loaded: bool,
    pub credential_present: bool,
}

impl BackendHealth {
    /// Whether the configured backend can serve requests (possibly after a lazy load).
    pub fn is_ready(&self) -> bool {
        match self.backend {
            BackendKind::Local => self.model_exists,
            BackendKind::Remote => self.credential_present,
        }
    }
}

pub struct Assistant {
    composer: PromptComposer,
    adapter: Arc<GenerationAdapter>,
}

impl Assistant {
    pub fn new(adapter: Arc<GenerationAdapter>) -> Self {
        Self {
            composer: PromptComposer::new(),
            adapter,
        }
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Builds the configured backend. The local model is not loaded until the first request.
    pub fn from_config(config: &SynoConfig) -> CoreResult<Self> {
        Ok(Self::new(Arc::new(build_adapter(config)?)))
    }

    pub fn adapter(&self) -> &Arc<GenerationAdapter> {
        &self.adapter
    }

    pub async fn reply(
        &self,
        message: &str,
        history: Vec<ConversationTurn>,
        context: &ConversationContext,
    ) -> GenerationResult {
        let system_prompt = self.composer.compose(context, &history);
        tracing::debug!(
            target: "synomind::assistant",
            module = context.module.as_str(),
            history = history.len(),
            "composing reply"
        );
        let request = GenerationRequest::new(system_prompt, history, message);
        self.adapter.generate(&request).await
    }

    pub fn health(&self) -> BackendHealth {
        match self.adapter.as_ref() {
            GenerationAdapter::Local(local) => {
                let GatewayHealth { model_exists, model_loaded } = local.gateway().health();
                BackendHealth {
                    backend: BackendKind::Local,
                    model_exists,
                    model_loaded,
                    credential_present: false,
                }
            }
            GenerationAdapter::Remote(remote) => BackendHealth {
                backend: BackendKind::Remote,
                model_exists: false,
                model_loaded: false,
                credential_present: remote.has_credential(),
            },
        }
    }
}

pub fn build_adapter(config: &SynoConfig) -> CoreResult<GenerationAdapter> {
    let adapter = match config.backend_kind() {
        BackendKind::Local => {
            let loader = LlamaServerLoader::new(
                &config.llama_server_bin,
                config.model_path(),
                config.llama_server_port,
            )
            .with_download_url(config.model_download_url.clone())
            .with_request_timeout(config.local_timeout());
            let gateway = Arc::new(ModelGateway::new(Arc::new(loader), config.engine_params()));
            GenerationAdapter::Local(LocalBackend::new(
                gateway,
                config.max_tokens,
                config.local_timeout(),
            ))
        }
        BackendKind::Remote => GenerationAdapter::Remote(RemoteBackend::new(RemoteSettings {
            api_url: config.remote_api_url.clone(),
            model: config.remote_model.clone(),
            timeout: config.remote_timeout(),
            max_tokens: config.max_tokens,
            api_key: SynoConfig::remote_api_key(),
        })?),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_health_does_not_load() {
        let mut config = SynoConfig::default();
        config.model_path = "/nonexistent/weights.gguf".to_string();
        let assistant = Assistant::from_config(&config).unwrap();
        let health = assistant.health();
        assert_eq!(health.backend, BackendKind::Local);
        assert!(!health.model_exists);
        assert!(!health.model_loaded);
        assert!(!health.is_ready());
    }

    #[test]
    fn remote_backend_is_selected_by_config() {
        let mut config = SynoConfig::default();
        config.backend = "remote".to_string();
        let assistant = Assistant::from_config(&config).unwrap();
        assert_eq!(assistant.adapter().kind(), BackendKind::Remote);
    }

    #[test]
    fn remote_backend_keeps_configured_timeout() {
        let config = SynoConfig {
            backend: "remote".to_string(),
            remote_timeout_secs: 3,
            ..SynoConfig::default()
        };
        let assistant = Assistant::from_config(&config).unwrap();
        match assistant.adapter().as_ref() {
            GenerationAdapter::Remote(remote) => {
                assert_eq!(remote.settings().timeout, std::time::Duration::from_secs(3))
            }
            GenerationAdapter::Local(_) => panic!("expected remote backend"),
        }
    }
}
