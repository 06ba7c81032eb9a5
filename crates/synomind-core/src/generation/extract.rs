//! Reply extraction for remote response envelopes.
//!
//! The envelope shape is not guaranteed stable across API versions and proxies, so extraction
//! walks an ordered chain and the first stage yielding non-empty text wins.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// `content: [{type: "text", text}]`, text segments concatenated.
    ContentSegments,
    /// Plain top-level `text`.
    TopLevelText,
    /// Any text-bearing entry found walking the mapping.
    MappingScan,
    /// The body itself is a bare scalar.
    Stringified,
}

impl ExtractionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStage::ContentSegments => "content_segments",
            ExtractionStage::TopLevelText => "top_level_text",
            ExtractionStage::MappingScan => "mapping_scan",
            ExtractionStage::Stringified => "stringified",
        }
    }
}

/// Keys whose string values are treated as reply text during the mapping scan.
const TEXT_KEYS: [&str; 3] = ["text", "completion", "content"];

pub fn extract_reply_text(body: &Value) -> Option<(String, ExtractionStage)> {
    if let Some(text) = non_empty(content_segments(body)) {
        return Some((text, ExtractionStage::ContentSegments));
    }
    if let Some(text) = non_empty(body.get("text").and_then(Value::as_str).map(str::to_string)) {
        return Some((text, ExtractionStage::TopLevelText));
    }
    let mut found = Vec::new();
    scan_text_entries(body, &mut found);
    if let Some(text) = non_empty(Some(found.join(""))) {
        return Some((text, ExtractionStage::MappingScan));
    }
    let scalar = match body {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    non_empty(scalar).map(|text| (text, ExtractionStage::Stringified))
}

fn content_segments(body: &Value) -> Option<String> {
    let segments = body.get("content")?.as_array()?;
    let text: String = segments
        .iter()
        .filter(|seg| seg.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|seg| seg.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

/// Depth-first walk. Non-text segment objects (`type` other than "text") are skipped.
fn scan_text_entries(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(kind) = map.get("type").and_then(Value::as_str) {
                if kind != "text" && kind != "message" {
                    return;
                }
            }
            for (key, v) in map {
                match v {
                    Value::String(s) if TEXT_KEYS.contains(&key.as_str()) => {
                        if !s.trim().is_empty() {
                            out.push(s.clone());
                        }
                    }
                    Value::Object(_) | Value::Array(_) => scan_text_entries(v, out),
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_text_entries(item, out);
            }
        }
        _ => {}
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
