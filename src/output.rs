//! # Output files
//!
//! Script formatting and everything written under the output directories:
//!
//! - `scripts_<slug>_<ts>.txt` and `.json` from the `scripts` command,
//! - the `ideas --output` document,
//! - the batch documents (built in [`crate::batch`], written through
//!   [`write_json`]).
//!
//! JSON is pretty-printed UTF-8; non-ASCII text is written as-is.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::Local;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

use crate::{
    error::Result,
    idea::{Platform, VideoIdea},
    news::NewsArticle,
};

pub const SCRIPT_DURATION: &str = "30 seconds";
pub const DEFAULT_SCRIPTS_DIR: &str = "./generated_scripts";
pub const DEFAULT_IDEAS_DIR: &str = "./generated_ideas";

const SLUG_MAX_CHARS: usize = 50;

/// File-name stamp, e.g. `20250101_093000`.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Local time for the `generated_at` fields.
pub fn generated_at() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Spaces become `_`, `/` becomes `-`, capped at 50 characters.
pub fn slug(topic: &str) -> String {
    topic
        .replace(' ', "_")
        .replace('/', "-")
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect()
}

/// Writes `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Renders one idea as a 30-second script.
pub fn format_script(idea: &VideoIdea, index: usize) -> String {
    Script { idea, index }.to_string()
}

struct Script<'a> {
    idea: &'a VideoIdea,
    index: usize,
}

impl fmt::Display for Script<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let double = "=".repeat(70);
        let single = "━".repeat(68);
        let idea = self.idea;

        writeln!(f)?;
        writeln!(f, "{double}")?;
        writeln!(f, "SCRIPT #{} - {}", self.index, idea.title)?;
        writeln!(f, "{double}\n")?;
        writeln!(f, "DURATION: {SCRIPT_DURATION}")?;
        writeln!(f, "PLATFORM: {}", idea.platform.display_name())?;
        writeln!(f, "TARGET AUDIENCE: {}\n", idea.target_audience)?;
        writeln!(f, "{single}\n")?;
        writeln!(f, "SCRIPT:\n")?;
        writeln!(f, "[0-3 seconds] HOOK:")?;
        writeln!(f, "{}\n", idea.hook)?;
        writeln!(f, "[3-25 seconds] MAIN CONTENT:")?;
        for (i, point) in idea.key_points.iter().enumerate() {
            writeln!(f, "  {}. {point}", i + 1)?;
        }
        writeln!(f)?;
        writeln!(f, "[25-30 seconds] CALL TO ACTION:")?;
        writeln!(f, "{}\n", idea.cta)?;
        writeln!(f, "{single}\n")?;
        writeln!(f, "HASHTAGS: {}\n", idea.hashtags.join(" "))?;
        writeln!(f, "{double}")
    }
}

/// One numbered entry of a script document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub script_number: usize,
    pub title: String,
    pub hook: String,
    pub key_points: Vec<String>,
    pub cta: String,
    pub hashtags: Vec<String>,
    pub target_audience: String,
    pub platform: Platform,
}

impl ScriptRecord {
    pub fn new(script_number: usize, idea: &VideoIdea) -> Self {
        Self {
            script_number,
            title: idea.title.clone(),
            hook: idea.hook.clone(),
            key_points: idea.key_points.clone(),
            cta: idea.cta.clone(),
            hashtags: idea.hashtags.clone(),
            target_audience: idea.target_audience.clone(),
            platform: idea.platform,
        }
    }
}

/// The JSON written next to the script text file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub topic: String,
    pub generated_at: String,
    pub total_scripts: usize,
    pub duration: String,
    pub news_articles: Vec<NewsArticle>,
    pub news_context: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub scripts: Vec<ScriptRecord>,
}

/// Everything a `scripts` run produced.
#[derive(Debug, Clone, Default)]
pub struct ScriptRun {
    pub topic: String,
    pub ideas: Vec<VideoIdea>,
    pub news_articles: Vec<NewsArticle>,
    pub news_context: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
}

impl ScriptRun {
    pub fn scripts(&self) -> Vec<String> {
        self.ideas
            .iter()
            .enumerate()
            .map(|(i, idea)| format_script(idea, i + 1))
            .collect()
    }

    pub fn document(&self) -> ScriptDocument {
        ScriptDocument {
            topic: self.topic.clone(),
            generated_at: generated_at(),
            total_scripts: self.ideas.len(),
            duration: SCRIPT_DURATION.to_string(),
            news_articles: self.news_articles.clone(),
            news_context: self.news_context.clone(),
            system_prompt: self.system_prompt.clone(),
            user_prompt: self.user_prompt.clone(),
            scripts: self
                .ideas
                .iter()
                .enumerate()
                .map(|(i, idea)| ScriptRecord::new(i + 1, idea))
                .collect(),
        }
    }
}

/// The human-readable script file.
struct ScriptText<'a>(&'a ScriptRun);

impl fmt::Display for ScriptText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.0;
        let rule = "=".repeat(70);

        writeln!(f, "VIDEO SCRIPTS FOR: {}", run.topic)?;
        writeln!(f, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Total Scripts: {}", run.ideas.len())?;
        writeln!(f, "\n{rule}")?;

        if !run.news_articles.is_empty() {
            writeln!(f, "News Headlines Used:")?;
            for article in &run.news_articles {
                match &article.source {
                    Some(source) => writeln!(f, " - {} ({source})", article.title)?,
                    None => writeln!(f, " - {}", article.title)?,
                }
                if !article.description.is_empty() {
                    writeln!(f, "   Summary: {}", article.description)?;
                }
                if let Some(url) = &article.url {
                    writeln!(f, "   URL: {url}")?;
                }
            }
            writeln!(f, "\n{rule}")?;
        }

        let sections = [
            ("News Context Provided to AI:", &run.news_context),
            ("System Prompt:", &run.system_prompt),
            ("User Prompt:", &run.user_prompt),
        ];
        for (heading, body) in sections {
            if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                writeln!(f, "{heading}")?;
                writeln!(f, "{body}")?;
                writeln!(f, "\n{rule}")?;
            }
        }

        f.write_str(&run.scripts().join("\n"))
    }
}

/// Writes the `.txt` and `.json` files for a script run.
///
/// Returns `(text_path, json_path)`.
pub fn save_scripts(output_dir: &Path, run: &ScriptRun) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;

    let stem = format!("scripts_{}_{}", slug(&run.topic), timestamp());
    let txt_path = output_dir.join(format!("{stem}.txt"));
    let json_path = output_dir.join(format!("{stem}.json"));

    fs::write(&txt_path, ScriptText(run).to_string())?;
    write_json(&json_path, &run.document())?;

    info!(text = %txt_path.display(), json = %json_path.display(), "Saved scripts");
    Ok((txt_path, json_path))
}

/// The `ideas --output` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDocument {
    pub topic: String,
    pub platform: Platform,
    pub provider: String,
    pub model: String,
    pub ideas: Vec<VideoIdea>,
}

pub fn save_ideas(path: &Path, document: &IdeaDocument) -> Result<()> {
    write_json(path, document)?;
    info!(path = %path.display(), count = document.ideas.len(), "Saved ideas");
    Ok(())
}
