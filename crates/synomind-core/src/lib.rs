//! synomind-core: the SynoMind assistant core (model gateway, generation backends, persona
//! prompts, wake word) plus the degraded-mode machinery the feature modules run on.
//!
//! The HTTP surface lives in the `synomind-gateway` add-on.

mod assistant;
mod config;
mod conversation;
mod degraded;
mod error;
mod llama_sidecar;
mod model_gateway;
mod prompt;
mod synth;
mod wake_word;
pub mod generation;
pub mod wellness;

pub use assistant::{build_adapter, Assistant, BackendHealth};
pub use config::{SynoConfig, ENV_CONFIG_PATH, ENV_REMOTE_API_KEY};
pub use conversation::{
    ConversationContext, ConversationTurn, GenerationRequest, Module, Role,
};
pub use degraded::{DataSource, DegradedMode, DegradedModeState, Sourced};
pub use error::{CoreError, CoreResult};
pub use llama_sidecar::{LlamaServerEngine, LlamaServerLoader};
pub use model_gateway::{
    EngineLoader, EngineParams, GatewayHealth, LocalEngine, ModelGateway, SamplingParams,
};
pub use prompt::{greeting_rule, module_addendum, PromptComposer, GREETING_TOKEN};
pub use synth::{suggestions_for, FallbackSynthesizer, MAX_SYNTHETIC_DAYS};
pub use wake_word::{WakeWordDetector, WakeWordResult, DEFAULT_WAKE_PHRASES};

// Generation (Local / Remote behind one contract)
pub use generation::{BackendKind, GenerationAdapter, GenerationResult, FALLBACK_REPLY};

// Wellness feature module
pub use wellness::records::{
    GoalCreated, GoalList, GoalRequest, MoodEntry, MoodHistory, MoodLogRequest, MoodLogged,
    MoodTrends, SleepHistory, SleepLogRequest, SleepLogged, SleepRecord, Suggestions,
    WellnessContext, WellnessGoal,
};
pub use wellness::store::{SledWellnessStore, UnavailableStore, WellnessStore};
pub use wellness::{WellnessService, DEFAULT_HISTORY_DAYS, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_DAYS};
