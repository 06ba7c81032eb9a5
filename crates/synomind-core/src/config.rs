//! SynoMind configuration.
//!
//! Precedence: `SYNO__*` environment > file at `SYNO_CONFIG` (default `config/synomind`) > defaults.
//! The remote credential never lives in the config file; it is read from `ANTHROPIC_API_KEY`.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | host | 127.0.0.1 | Gateway bind address. |
//! | port | 5000 | Gateway HTTP port. |
//! | storage_path | ./data | Base directory for the sled wellness store. |
//! | backend | local | `local` (llama.cpp sidecar) or `remote` (hosted API). |
//! | model_path | ./models/llama-3-8b-instruct.Q4_K_M.gguf | Weight artifact. |
//! | model_download_url | unset | Where to provision the artifact from when missing. |
//! | degraded | false | Start in degraded mode (synthetic data only). |

use crate::generation::BackendKind;
use crate::model_gateway::EngineParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "SYNO_CONFIG";
pub const ENV_REMOTE_API_KEY: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynoConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub storage_path: String,
    /// Generation backend: "local" or "remote".
    pub backend: String,

    pub model_path: String,
    #[serde(default)]
    pub model_download_url: Option<String>,
    /// llama.cpp server binary used as the local inference engine.
    pub llama_server_bin: String,
    pub llama_server_port: u16,
    pub context_window: u32,
    pub batch_size: u32,
    /// -1 offloads every layer the GPU can take.
    pub gpu_layers: i32,
    #[serde(default)]
    pub engine_verbose: bool,
    pub local_timeout_secs: u64,

    pub remote_api_url: String,
    pub remote_model: String,
    pub remote_timeout_secs: u64,

    pub max_tokens: u32,

    /// Forces degraded mode from startup (equivalent of skipping the database).
    #[serde(default)]
    pub degraded: bool,
}

impl Default for SynoConfig {
    fn default() -> Self {
        Self {
            app_name: "SynoMind".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            storage_path: "./data".to_string(),
            backend: "local".to_string(),
            model_path: "./models/llama-3-8b-instruct.Q4_K_M.gguf".to_string(),
            model_download_url: None,
            llama_server_bin: "llama-server".to_string(),
            llama_server_port: 8089,
            context_window: 2048,
            batch_size: 512,
            gpu_layers: -1,
            engine_verbose: false,
            local_timeout_secs: 60,
            remote_api_url: "https://api.anthropic.com".to_string(),
            remote_model: "claude-3-5-sonnet-20241022".to_string(),
            remote_timeout_secs: 8,
            max_tokens: 150,
            degraded: false,
        }
    }
}

impl SynoConfig {
    /// Load config from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config/synomind".to_string());
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", d.app_name)?
            .set_default("host", d.host)?
            .set_default("port", d.port as i64)?
            .set_default("storage_path", d.storage_path)?
            .set_default("backend", d.backend)?
            .set_default("model_path", d.model_path)?
            .set_default("llama_server_bin", d.llama_server_bin)?
            .set_default("llama_server_port", d.llama_server_port as i64)?
            .set_default("context_window", d.context_window as i64)?
            .set_default("batch_size", d.batch_size as i64)?
            .set_default("gpu_layers", d.gpu_layers as i64)?
            .set_default("engine_verbose", d.engine_verbose)?
            .set_default("local_timeout_secs", d.local_timeout_secs as i64)?
            .set_default("remote_api_url", d.remote_api_url)?
            .set_default("remote_model", d.remote_model)?
            .set_default("remote_timeout_secs", d.remote_timeout_secs as i64)?
            .set_default("max_tokens", d.max_tokens as i64)?
            .set_default("degraded", d.degraded)?;

        let path = Path::new(&config_path);
        let with_toml = path.with_extension("toml");
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else if with_toml.exists() {
            builder.add_source(config::File::from(with_toml.as_path()))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("SYNO").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Unknown values fall back to the local backend.
    pub fn backend_kind(&self) -> BackendKind {
        match self.backend.trim() {
            s if s.eq_ignore_ascii_case("remote") => BackendKind::Remote,
            _ => BackendKind::Local,
        }
    }

    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            context_window: self.context_window,
            batch_size: self.batch_size,
            gpu_layers: self.gpu_layers,
            verbose: self.engine_verbose,
        }
    }

    pub fn model_path(&self) -> PathBuf {
        PathBuf::from(&self.model_path)
    }

    pub fn store_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("wellness")
    }

    pub fn local_timeout(&self) -> Duration {
        Duration::from_secs(self.local_timeout_secs.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }

    /// Remote credential from the process environment; blank counts as missing.
    pub fn remote_api_key() -> Option<String> {
        std::env::var(ENV_REMOTE_API_KEY)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
