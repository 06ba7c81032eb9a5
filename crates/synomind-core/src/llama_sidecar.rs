//! llama.cpp sidecar: the concrete local inference engine.
//!
//! Launches `llama-server` against the GGUF weight artifact with the fixed engine parameters and
//! talks to it over loopback HTTP. The child process is killed when the engine is dropped.
//! When the artifact is missing and a download URL is configured, it is provisioned first.

use crate::error::{CoreError, CoreResult};
use crate::model_gateway::{EngineLoader, EngineParams, LocalEngine, SamplingParams};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);
const READY_MAX_WAIT: Duration = Duration::from_secs(120);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub struct LlamaServerLoader {
    binary: PathBuf,
    artifact: PathBuf,
    port: u16,
    download_url: Option<String>,
    request_timeout: Duration,
}

impl LlamaServerLoader {
    pub fn new(binary: impl Into<PathBuf>, artifact: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            binary: binary.into(),
            artifact: artifact.into(),
            port,
            download_url: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_download_url(mut self, url: Option<String>) -> Self {
        self.download_url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Command-line arguments for the fixed engine parameters.
    pub fn server_args(&self, artifact: &Path, params: &EngineParams) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            artifact.display().to_string(),
            "-c".to_string(),
            params.context_window.to_string(),
            "-b".to_string(),
            params.batch_size.to_string(),
            "-ngl".to_string(),
            params.gpu_layers.to_string(),
            "--host".to_string(),
            "127.0.0.1".to_string(),
            "--port".to_string(),
            self.port.to_string(),
        ];
        if !params.verbose {
            args.push("--log-disable".to_string());
        }
        args
    }

    async fn download_artifact(&self, url: &str) -> CoreResult<()> {
        let unavailable = |e: String| CoreError::ModelUnavailable(format!("download from {} failed: {}", url, e));

        if let Some(parent) = self.artifact.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::info!(target: "synomind::llama", url, dest = %self.artifact.display(), "provisioning weight artifact");

        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        // Write to a sibling temp file so a half-finished download never looks like weights.
        let partial = self.artifact.with_extension("partial");
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| unavailable(e.to_string()))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, &self.artifact).await?;
        tracing::info!(target: "synomind::llama", dest = %self.artifact.display(), "weight artifact provisioned");
        Ok(())
    }

    async fn wait_until_ready(&self, client: &reqwest::Client, child: &mut Child) -> CoreResult<()> {
        let url = format!("{}/health", self.base_url());
        let deadline = tokio::time::Instant::now() + READY_MAX_WAIT;
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(CoreError::Initialization(format!("llama-server exited early ({})", status)));
            }
            // 503 while the weights are still loading.
            if let Ok(res) = client.get(&url).send().await {
                if res.status().is_success() {
                    return Ok(());
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CoreError::Initialization(format!(
                    "llama-server not ready within {}s",
                    READY_MAX_WAIT.as_secs()
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl EngineLoader for LlamaServerLoader {
    fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    async fn ensure_artifact(&self) -> CoreResult<PathBuf> {
        if self.artifact.is_file() {
            return Ok(self.artifact.clone());
        }
        match &self.download_url {
            Some(url) => {
                self.download_artifact(url).await?;
                Ok(self.artifact.clone())
            }
            None => Err(CoreError::ModelUnavailable(format!(
                "weight artifact not found at {} and no download URL configured",
                self.artifact.display()
            ))),
        }
    }

    async fn load(&self, artifact: &Path, params: &EngineParams) -> CoreResult<Arc<dyn LocalEngine>> {
        let mut child = Command::new(&self.binary)
            .args(self.server_args(artifact, params))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(if params.verbose { Stdio::inherit() } else { Stdio::null() })
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CoreError::Initialization(format!("failed to start {}: {}", self.binary.display(), e))
            })?;

        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| CoreError::Initialization(e.to_string()))?;

        // Dropping `child` on error kills the half-started server.
        self.wait_until_ready(&client, &mut child).await?;

        Ok(Arc::new(LlamaServerEngine {
            base_url: self.base_url(),
            client,
            _child: tokio::sync::Mutex::new(child),
        }))
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    content: String,
}

pub struct LlamaServerEngine {
    base_url: String,
    client: reqwest::Client,
    _child: tokio::sync::Mutex<Child>,
}

#[async_trait]
impl LocalEngine for LlamaServerEngine {
    fn name(&self) -> &str {
        "llama-server"
    }

    async fn complete(&self, prompt: &str, sampling: &SamplingParams) -> CoreResult<String> {
        let body = CompletionRequest {
            prompt,
            n_predict: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stop: &sampling.stop,
            stream: false,
        };
        let res = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(CoreError::Generation(format!("llama-server error {}: {}", status, text)));
        }
        let parsed: CompletionResponse = res
            .json()
            .await
            .map_err(|e| CoreError::Generation(format!("malformed completion: {}", e)))?;
        Ok(parsed.content)
    }
}
