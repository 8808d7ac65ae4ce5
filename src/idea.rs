//! Core records: the target [`Platform`] and the generated [`VideoIdea`].

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Supported social media platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Platform {
    Tiktok,
    InstagramReels,
    YoutubeShorts,
    Twitter,
}

impl Platform {
    /// All platforms in declaration order.
    pub const ALL: [Platform; 4] = [
        Platform::Tiktok,
        Platform::InstagramReels,
        Platform::YoutubeShorts,
        Platform::Twitter,
    ];

    /// The snake_case identifier used on the command line and in files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::InstagramReels => "instagram_reels",
            Platform::YoutubeShorts => "youtube_shorts",
            Platform::Twitter => "twitter",
        }
    }

    /// Title-cased name for humans, e.g. `Instagram Reels`.
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown platform: {s}")))
    }
}

/// A generated video idea or script.
///
/// Built once from a provider response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoIdea {
    pub title: String,
    pub hook: String,
    pub key_points: Vec<String>,
    /// Call to action.
    pub cta: String,
    pub duration: String,
    pub platform: Platform,
    pub hashtags: Vec<String>,
    pub target_audience: String,
}

impl VideoIdea {
    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.hook.trim().is_empty() {
            missing.push("hook");
        }
        if self.key_points.iter().all(|p| p.trim().is_empty()) {
            missing.push("key_points");
        }
        if self.cta.trim().is_empty() {
            missing.push("cta");
        }
        if self.hashtags.iter().all(|h| h.trim().is_empty()) {
            missing.push("hashtags");
        }
        if self.target_audience.trim().is_empty() {
            missing.push("target_audience");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl fmt::Display for VideoIdea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "━".repeat(34);
        writeln!(f, "VIDEO IDEA: {}", self.title)?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Platform: {}", self.platform.display_name())?;
        writeln!(f, "Duration: {}", self.duration)?;
        writeln!(f, "Target Audience: {}", self.target_audience)?;
        writeln!(f)?;
        writeln!(f, "HOOK:")?;
        writeln!(f, "{}", self.hook)?;
        writeln!(f)?;
        writeln!(f, "KEY POINTS:")?;
        for point in &self.key_points {
            writeln!(f, "  • {point}")?;
        }
        writeln!(f)?;
        writeln!(f, "CALL TO ACTION:")?;
        writeln!(f, "{}", self.cta)?;
        writeln!(f)?;
        writeln!(f, "HASHTAGS:")?;
        writeln!(f, "{}", self.hashtags.join(" "))?;
        write!(f, "{rule}")
    }
}

#[cfg(test)]
pub(crate) fn sample_idea(title: &str, platform: Platform) -> VideoIdea {
    VideoIdea {
        title: title.to_string(),
        hook: "Stop scrolling: this changes everything".to_string(),
        key_points: vec!["First".to_string(), "Second".to_string()],
        cta: "Follow for part two".to_string(),
        duration: "15-60 seconds".to_string(),
        platform,
        hashtags: vec!["#tips".to_string(), "#fyp".to_string()],
        target_audience: "Busy professionals".to_string(),
    }
}
