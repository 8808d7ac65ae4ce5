//! # Response parsing
//!
//! Turns a model reply into [`VideoIdea`] records.
//!
//! The strict path pulls the JSON payload out of the reply (code fences and
//! chatter around it are tolerated), drops stray control characters, and reads
//! either `{"ideas": [...]}` or a bare array. When the reply is not JSON at all,
//! a line-oriented fallback looks for `Title:`, `Hook:`, `Key Points:`, `CTA:`,
//! `Hashtags:` and `Target Audience:` markers.
//!
//! [`parse_ideas`] only returns `Ok` when every record has all required fields.
//! Anything less is a [`PartialParseError`] holding whatever was recovered, so
//! callers decide whether partial records are good enough (the generator logs a
//! warning and keeps them).
//!
//! The fallback is a heuristic. Free-form replies can still lose or misfile
//! fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::PartialParseError,
    idea::{Platform, VideoIdea},
    template::PromptSpec,
};

const PREVIEW_CHARS: usize = 500;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]").expect("valid regex"));

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*>#]+\s*|\d+[.)]\s*)*(?:\*\*|__)?\s*(title|hook|key[ _]points|cta|call[ _]to[ _]action|hashtags|target[ _]audience|audience)\s*(?:\*\*|__)?\s*[:\-–]\s*(?:\*\*|__)?\s*(.*)$",
    )
    .expect("valid regex")
});

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").expect("valid regex"));

/// Parses a model reply into ideas for `platform`.
///
/// `duration` is always taken from the platform's [`PromptSpec`](crate::template::PromptSpec).
pub fn parse_ideas(response: &str, platform: Platform) -> Result<Vec<VideoIdea>, PartialParseError> {
    let preview: String = response.chars().take(PREVIEW_CHARS).collect();

    match parse_json(response, platform) {
        Some(ideas) => {
            let missing = missing_fields(&ideas);
            if missing.is_empty() {
                debug!(count = ideas.len(), "Parsed ideas from JSON");
                Ok(ideas)
            } else {
                Err(PartialParseError {
                    reason: "some ideas are missing required fields".to_string(),
                    recovered: ideas,
                    missing_fields: missing,
                    preview,
                })
            }
        }
        None => {
            let ideas = segment_text(response, platform);
            let reason = if ideas.is_empty() {
                "no ideas could be recovered from the response"
            } else {
                "response was not valid JSON; recovered by text segmentation"
            };
            debug!(count = ideas.len(), "Fell back to text segmentation");
            Err(PartialParseError {
                reason: reason.to_string(),
                missing_fields: if ideas.is_empty() {
                    REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect()
                } else {
                    missing_fields(&ideas)
                },
                recovered: ideas,
                preview,
            })
        }
    }
}

const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "hook",
    "key_points",
    "cta",
    "hashtags",
    "target_audience",
];

/// Union of missing fields across `ideas`, in schema order.
fn missing_fields(ideas: &[VideoIdea]) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| ideas.iter().any(|idea| idea.missing_fields().contains(field)))
        .map(|field| field.to_string())
        .collect()
}

/// Locates the JSON payload inside a reply.
pub fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    // Prefer a fenced block when there is one.
    let body = match trimmed.find("```") {
        Some(start) => {
            let after = &trimmed[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => &after[..end],
                None => after,
            }
        }
        None => trimmed,
    };

    // Objects first, then arrays. Prose such as "ideas for [Budget Travel]:"
    // can put a bracket ahead of the payload, so a slice only wins once it
    // actually parses.
    let candidates: Vec<&str> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| {
            let start = body.find(open)?;
            let end = body.rfind(close)?;
            (end > start).then(|| &body[start..=end])
        })
        .collect();

    candidates
        .iter()
        .copied()
        .find(|slice| serde_json::from_str::<Value>(&CONTROL_CHARS.replace_all(slice, "")).is_ok())
        .or_else(|| candidates.first().copied())
}

fn parse_json(response: &str, platform: Platform) -> Option<Vec<VideoIdea>> {
    let raw = extract_json(response)?;
    let cleaned = CONTROL_CHARS.replace_all(raw, "");
    let value: Value = serde_json::from_str(&cleaned).ok()?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ideas").or_else(|| map.remove("scripts")) {
            Some(Value::Array(items)) => items,
            Some(_) => return None,
            // A single idea object.
            None if map.contains_key("title") => vec![Value::Object(map)],
            None => return None,
        },
        _ => return None,
    };

    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| idea_from_object(obj, platform))
            .collect(),
    )
}

fn idea_from_object(obj: &Map<String, Value>, platform: Platform) -> VideoIdea {
    VideoIdea {
        title: text_field(obj, &["title"]),
        hook: text_field(obj, &["hook"]),
        key_points: list_field(obj, &["key_points", "keyPoints", "points"], split_lines),
        cta: text_field(obj, &["cta", "call_to_action", "callToAction"]),
        duration: PromptSpec::get(platform).duration.to_string(),
        platform,
        hashtags: normalize_hashtags(list_field(obj, &["hashtags", "tags"], split_words)),
        target_audience: text_field(obj, &["target_audience", "targetAudience", "audience"]),
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .map(|value| match value {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn list_field(
    obj: &Map<String, Value>,
    keys: &[&str],
    split: fn(&str) -> Vec<String>,
) -> Vec<String> {
    match keys.iter().find_map(|key| obj.get(*key)) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => split(s),
        _ => Vec::new(),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .collect()
}

fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> String {
    BULLET.replace(line, "").trim().to_string()
}

/// Ensures every hashtag starts with `#` and drops empties.
pub fn normalize_hashtags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().trim_end_matches([',', ';']).to_string())
        .filter(|tag| !tag.trim_start_matches('#').is_empty())
        .map(|tag| {
            if tag.starts_with('#') {
                tag
            } else {
                format!("#{tag}")
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Hook,
    KeyPoints,
    Cta,
    Hashtags,
    Audience,
}

impl Field {
    fn from_marker(marker: &str) -> Field {
        let marker = marker.to_lowercase().replace(['_', ' '], "");
        match marker.as_str() {
            "title" => Field::Title,
            "hook" => Field::Hook,
            "keypoints" => Field::KeyPoints,
            "cta" | "calltoaction" => Field::Cta,
            "hashtags" => Field::Hashtags,
            _ => Field::Audience,
        }
    }
}

#[derive(Default)]
struct Draft {
    title: String,
    hook: String,
    key_points: Vec<String>,
    cta: String,
    hashtags: Vec<String>,
    target_audience: String,
}

impl Draft {
    fn push(&mut self, field: Field, text: &str) {
        let text = text.trim().trim_matches(['*', '_']).trim();
        if text.is_empty() {
            return;
        }
        let append = |target: &mut String, text: &str| {
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(text);
        };
        match field {
            Field::Title => append(&mut self.title, text.trim_matches('"')),
            Field::Hook => append(&mut self.hook, text.trim_matches('"')),
            Field::Cta => append(&mut self.cta, text),
            Field::Audience => append(&mut self.target_audience, text),
            Field::KeyPoints => {
                let point = strip_bullet(text);
                if !point.is_empty() {
                    self.key_points.push(point);
                }
            }
            Field::Hashtags => self.hashtags.extend(split_words(text)),
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.hook.is_empty()
            && self.key_points.is_empty()
            && self.cta.is_empty()
            && self.hashtags.is_empty()
            && self.target_audience.is_empty()
    }

    fn finish(self, platform: Platform) -> VideoIdea {
        VideoIdea {
            title: self.title,
            hook: self.hook,
            key_points: self.key_points,
            cta: self.cta,
            duration: PromptSpec::get(platform).duration.to_string(),
            platform,
            hashtags: normalize_hashtags(self.hashtags),
            target_audience: self.target_audience,
        }
    }
}

/// Best-effort recovery from marker-delimited prose.
///
/// Each `Title:` starts a new record. Lines without a marker continue the
/// most recent field; lines before the first marker are ignored.
fn segment_text(response: &str, platform: Platform) -> Vec<VideoIdea> {
    let mut ideas = Vec::new();
    let mut draft = Draft::default();
    let mut current: Option<Field> = None;

    for line in response.lines() {
        if let Some(caps) = MARKER.captures(line) {
            let field = Field::from_marker(&caps[1]);
            if field == Field::Title && !draft.is_empty() {
                ideas.push(std::mem::take(&mut draft).finish(platform));
            }
            draft.push(field, &caps[2]);
            current = Some(field);
        } else if let Some(field) = current {
            draft.push(field, line);
        }
    }

    if !draft.is_empty() {
        ideas.push(draft.finish(platform));
    }
    ideas
}
