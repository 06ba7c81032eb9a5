//! Model Gateway: single owner of the local inference engine.
//!
//! The engine is loaded lazily on the first [`ModelGateway::get_instance`] call using
//! double-checked locking: a cheap read of the cached handle, then the init lock, then a second
//! read before loading. However many callers race on a cold gateway, the loader runs once.
//! A failed load is not cached, so the next caller retries.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// Fixed load-time parameters of the local engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub context_window: u32,
    pub batch_size: u32,
    pub gpu_layers: i32,
    pub verbose: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            context_window: 2048,
            batch_size: 512,
            gpu_layers: -1,
            verbose: false,
        }
    }
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

/// A loaded local model that can complete a raw prompt.
#[async_trait]
pub trait LocalEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the first completion for `prompt`. No chat template is applied.
    async fn complete(&self, prompt: &str, sampling: &SamplingParams) -> CoreResult<String>;
}

/// Knows where the weight artifact lives and how to turn it into a [`LocalEngine`].
#[async_trait]
pub trait EngineLoader: Send + Sync {
    fn artifact_path(&self) -> &Path;

    /// Locates (or provisions) the weight artifact.
    async fn ensure_artifact(&self) -> CoreResult<PathBuf> {
        let path = self.artifact_path();
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(CoreError::ModelUnavailable(format!(
                "weight artifact not found at {}",
                path.display()
            )))
        }
    }

    /// Loads the engine. May block on disk I/O for seconds.
    async fn load(&self, artifact: &Path, params: &EngineParams) -> CoreResult<Arc<dyn LocalEngine>>;
}

/// Health view of the gateway. Never triggers a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayHealth {
    pub model_exists: bool,
    pub model_loaded: bool,
}

pub struct ModelGateway {
    loader: Arc<dyn EngineLoader>,
    params: EngineParams,
    handle: RwLock<Option<Arc<dyn LocalEngine>>>,
    init_lock: Mutex<()>,
    load_attempts: AtomicU64,
}

impl ModelGateway {
    pub fn new(loader: Arc<dyn EngineLoader>, params: EngineParams) -> Self {
        Self {
            loader,
            params,
            handle: RwLock::new(None),
            init_lock: Mutex::new(()),
            load_attempts: AtomicU64::new(0),
        }
    }

    pub fn params(&self) -> EngineParams {
        self.params
    }

    /// Returns the ready engine, loading it on first use.
    pub async fn get_instance(&self) -> CoreResult<Arc<dyn LocalEngine>> {
        if let Some(engine) = self.cached() {
            return Ok(engine);
        }

        let _guard = self.init_lock.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(engine) = self.cached() {
            return Ok(engine);
        }

        let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let artifact = self.loader.ensure_artifact().await.map_err(|e| {
            tracing::warn!(target: "synomind::model_gateway", attempt, error = %e, "weight artifact unavailable");
            e
        })?;

        tracing::info!(
            target: "synomind::model_gateway",
            attempt,
            path = %artifact.display(),
            ctx = self.params.context_window,
            batch = self.params.batch_size,
            gpu_layers = self.params.gpu_layers,
            "loading local model"
        );
        let engine = match self.loader.load(&artifact, &self.params).await {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(target: "synomind::model_gateway", attempt, error = %e, "local model failed to load");
                return Err(match e {
                    CoreError::Initialization(_) | CoreError::ModelUnavailable(_) => e,
                    other => CoreError::Initialization(other.to_string()),
                });
            }
        };

        {
            let mut slot = self.handle.write().unwrap_or_else(|p| p.into_inner());
            *slot = Some(Arc::clone(&engine));
        }
        tracing::info!(target: "synomind::model_gateway", engine = engine.name(), "local model ready");
        Ok(engine)
    }

    pub fn health(&self) -> GatewayHealth {
        GatewayHealth {
            model_exists: self.loader.artifact_path().is_file(),
            model_loaded: self.is_loaded(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cached().is_some()
    }

    pub fn artifact_path(&self) -> &Path {
        self.loader.artifact_path()
    }

    /// Number of times initialization has actually been attempted.
    pub fn load_attempts(&self) -> u64 {
        self.load_attempts.load(Ordering::SeqCst)
    }

    fn cached(&self) -> Option<Arc<dyn LocalEngine>> {
        self.handle
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct EchoEngine;

    #[async_trait]
    impl LocalEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str, _sampling: &SamplingParams) -> CoreResult<String> {
            Ok(prompt.to_string())
        }
    }

    struct CountingLoader {
        path: PathBuf,
        loads: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl EngineLoader for CountingLoader {
        fn artifact_path(&self) -> &Path {
            &self.path
        }

        async fn ensure_artifact(&self) -> CoreResult<PathBuf> {
            Ok(self.path.clone())
        }

        async fn load(&self, _artifact: &Path, _params: &EngineParams) -> CoreResult<Arc<dyn LocalEngine>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail_first && n == 0 {
                return Err(CoreError::Initialization("corrupt weights".to_string()));
            }
            Ok(Arc::new(EchoEngine))
        }
    }

    fn loader(fail_first: bool) -> Arc<CountingLoader> {
        Arc::new(CountingLoader {
            path: PathBuf::from("unused.gguf"),
            loads: AtomicUsize::new(0),
            fail_first,
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_calls_load_once() {
        let loader = loader(false);
        let gateway = Arc::new(ModelGateway::new(loader.clone(), EngineParams::default()));

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let gw = Arc::clone(&gateway);
            tasks.push(tokio::spawn(async move { gw.get_instance().await.is_ok() }));
        }
        for t in tasks {
            assert!(t.await.unwrap());
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.load_attempts(), 1);
        assert!(gateway.is_loaded());
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let loader = loader(true);
        let gateway = ModelGateway::new(loader.clone(), EngineParams::default());

        let first = gateway.get_instance().await;
        assert!(matches!(first, Err(CoreError::Initialization(_))));
        assert!(!gateway.is_loaded());

        assert!(gateway.get_instance().await.is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    struct MissingArtifactLoader(PathBuf);

    #[async_trait]
    impl EngineLoader for MissingArtifactLoader {
        fn artifact_path(&self) -> &Path {
            &self.0
        }

        async fn load(&self, _artifact: &Path, _params: &EngineParams) -> CoreResult<Arc<dyn LocalEngine>> {
            panic!("load must not run without an artifact");
        }
    }

    #[tokio::test]
    async fn missing_artifact_is_model_unavailable() {
        let gateway = ModelGateway::new(
            Arc::new(MissingArtifactLoader(PathBuf::from("/nonexistent/model.gguf"))),
            EngineParams::default(),
        );
        let health = gateway.health();
        assert!(!health.model_exists);
        assert!(!health.model_loaded);

        let err = gateway.get_instance().await.err().unwrap();
        assert!(err.is_configuration());
    }
}
