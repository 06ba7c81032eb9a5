//! Wake-word detection over text transcripts.
//!
//! Pure text matching: speech recognition happens upstream. Phrases are tried in list order and
//! the first one found anywhere in the transcript wins, so longer variants must precede their
//! prefixes ("hey synomind" before "hey syno").

use serde::Serialize;

pub const DEFAULT_WAKE_PHRASES: [&str; 10] = [
    "hey synomind",
    "hey synod",
    "hey syno",
    "hey sino",
    "hey suno",
    "hey sync",
    "hi syno",
    "ok syno",
    "ok sino",
    "ok suno",
];

const SEPARATORS: [char; 4] = [',', '.', '!', '?'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakeWordResult {
    #[serde(rename = "wakeWordDetected")]
    pub detected: bool,
    pub command: Option<String>,
}

impl WakeWordResult {
    fn not_detected() -> Self {
        Self { detected: false, command: None }
    }
}

#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    /// Stored lowercased.
    phrases: Vec<String>,
}

impl Default for WakeWordDetector {
    fn default() -> Self {
        Self::with_phrases(DEFAULT_WAKE_PHRASES)
    }
}

impl WakeWordDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom phrase list; blank entries are ignored, order is kept.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn detect(&self, transcript: &str) -> WakeWordResult {
        // ASCII lowercasing keeps byte offsets aligned with the original transcript.
        let lowered = transcript.to_ascii_lowercase();
        for phrase in &self.phrases {
            if let Some(start) = lowered.find(phrase.as_str()) {
                let rest = &transcript[start + phrase.len()..];
                let command = rest
                    .trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
                    .trim();
                tracing::debug!(target: "synomind::wake_word", phrase = %phrase, has_command = !command.is_empty(), "wake phrase matched");
                return WakeWordResult {
                    detected: true,
                    command: (!command.is_empty()).then(|| command.to_string()),
                };
            }
        }
        WakeWordResult::not_detected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_follows_wake_phrase() {
        let result = WakeWordDetector::new().detect("hey syno turn off the lights");
        assert!(result.detected);
        assert_eq!(result.command.as_deref(), Some("turn off the lights"));
    }

    #[test]
    fn no_phrase_no_detection() {
        let result = WakeWordDetector::new().detect("turn off the lights");
        assert_eq!(result, WakeWordResult { detected: false, command: None });
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_command_case() {
        let result = WakeWordDetector::new().detect("Hey SynoMind, What's my Carbon score?");
        assert!(result.detected);
        assert_eq!(result.command.as_deref(), Some("What's my Carbon score?"));
    }

    #[test]
    fn bare_phrase_has_no_command() {
        let result = WakeWordDetector::new().detect("ok syno!  ");
        assert!(result.detected);
        assert_eq!(result.command, None);
    }

    #[test]
    fn first_phrase_in_list_order_wins() {
        // "ok syno" occurs earlier in the text, but "hey syno" comes first in the list.
        let result = WakeWordDetector::new().detect("ok syno hey syno lights");
        assert_eq!(result.command.as_deref(), Some("lights"));
    }

    #[test]
    fn longer_variant_is_not_shadowed() {
        let result = WakeWordDetector::new().detect("hey synomind play rain sounds");
        assert_eq!(result.command.as_deref(), Some("play rain sounds"));
    }

    #[test]
    fn leading_separators_are_stripped_with_default_phrases() {
        let detector = WakeWordDetector::new();
        let result = detector.detect("Hey Syno?! what time is it");
        assert_eq!(result.command.as_deref(), Some("what time is it"));

        // Only leading punctuation goes; the command's own casing and trailing stop stay.
        let result = detector.detect("OK Sino, Water the Plants.");
        assert_eq!(result.command.as_deref(), Some("Water the Plants."));
    }

    #[test]
    fn custom_phrases() {
        let detector = WakeWordDetector::with_phrases(["Namaste Syno", " "]);
        assert_eq!(detector.phrases().len(), 1);
        let result = detector.detect("namaste syno. log my mood");
        assert_eq!(result.command.as_deref(), Some("log my mood"));
    }
}
