//! Prompt Composer: the SynoMind persona as a system prompt.
//!
//! Persona preamble + module addendum + optional user-data snapshot + the greeting rule.
//! The greeting rule is an instruction to the model, not something enforced here.

use crate::conversation::{ConversationContext, ConversationTurn, Module};
use chrono::NaiveDate;

/// Designated first-turn opener.
pub const GREETING_TOKEN: &str = "Namaste!";

const PERSONA_PREAMBLE: &str = "You are SynoMind, the assistant of the EcoSyno sustainable lifestyle platform. \
You have a warm, compassionate personality and speak in a supportive, encouraging tone. \
You specialize in four areas: Environment tracking (carbon footprint, water usage, energy consumption), \
Wellness (mood tracking, meditation, sleep, physical activity), Kitchen management (sustainable food choices, \
reducing waste, eco-friendly recipes) and Wardrobe (ethical fashion, capsule wardrobes, sustainable clothing). \
Keep responses concise (2-3 sentences), actionable and relevant to sustainable living. \
You are knowledgeable but humble. Remember details the user has shared earlier in the conversation \
and refer back to them when relevant.";

const ENVIRONMENT_ADDENDUM: &str = "The user is currently in the Environment module, which helps track \
carbon footprint, water usage, energy consumption, and other environmental metrics. \
Focus on practical advice for reducing environmental impact.";

const WELLNESS_ADDENDUM: &str = "The user is currently in the Wellness module, which helps track \
mood, sleep, meditation, and physical activity. \
Focus on mindfulness, mental health, and holistic wellbeing practices.";

const KITCHEN_ADDENDUM: &str = "The user is currently in the Kitchen module, which helps with \
sustainable food choices, reducing waste, and eco-friendly cooking. \
Focus on sustainable eating habits and reducing food-related environmental impact.";

const WARDROBE_ADDENDUM: &str = "The user is currently in the Wardrobe module, which helps with \
building a sustainable wardrobe, ethical fashion choices, and reducing textile waste. \
Focus on conscious consumption and sustainable fashion practices.";

const DEFAULT_ADDENDUM: &str = "The user may ask about any part of the platform. \
Guide them toward the module that fits their question when helpful.";

/// Module-specific addendum. The table is closed; anything unknown already parsed to `General`.
pub fn module_addendum(module: Module) -> &'static str {
    match module {
        Module::Environment => ENVIRONMENT_ADDENDUM,
        Module::Wellness => WELLNESS_ADDENDUM,
        Module::Kitchen => KITCHEN_ADDENDUM,
        Module::Wardrobe => WARDROBE_ADDENDUM,
        Module::General => DEFAULT_ADDENDUM,
    }
}

/// Greeting instruction for the current position in the conversation.
pub fn greeting_rule(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        format!(
            "This is the first turn of a new conversation: begin your reply with \"{}\".",
            GREETING_TOKEN
        )
    } else {
        format!(
            "The conversation is already under way: omit the \"{}\" opener and continue naturally.",
            GREETING_TOKEN
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    today: Option<NaiveDate>,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date stated in the prompt.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn compose(&self, context: &ConversationContext, history: &[ConversationTurn]) -> String {
        let today = self.today.unwrap_or_else(|| chrono::Local::now().date_naive());

        let mut prompt = String::with_capacity(1024);
        prompt.push_str(PERSONA_PREAMBLE);
        prompt.push_str("\n\n");
        prompt.push_str(module_addendum(context.module));

        if let Some(snippet) = context.user_data.as_ref().and_then(user_data_snippet) {
            prompt.push_str("\n\nRelevant user data: ");
            prompt.push_str(&snippet);
        }

        prompt.push_str(&format!("\n\nCurrent date: {}", today.format("%B %-d, %Y")));
        prompt.push_str("\n\nIMPORTANT: ");
        prompt.push_str(&greeting_rule(history));
        prompt
    }
}

/// Serialized user data, or `None` when there is nothing worth sending.
fn user_data_snippet(data: &serde_json::Value) -> Option<String> {
    let empty = match data {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if empty {
        return None;
    }
    serde_json::to_string_pretty(data).ok()
}
