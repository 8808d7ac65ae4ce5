//! # TrendMine (library root)
//!
//! Generates short-form social video ideas and scripts with hosted LLMs.
//!
//! - Provider adapters for Mistral, Gemini and OpenAI behind one trait (`api`).
//! - Prompt construction (`prompt`) and tolerant reply parsing (`parser`).
//! - Single-call generation (`generator`) and batch runs over topics,
//!   platforms or calendar days (`batch`).
//! - Topic catalogue and YAML configuration (`topics`, `config`).
//! - Static platform templates (`template`).
//! - Optional NewsAPI grounding (`news`) and ElevenLabs voice-over clips for
//!   saved scripts (`audio`).
//! - File output, terminal rendering and the setup report (`output`,
//!   `pretty`, `check`).
//! - CLI parsing (`commands`).
//!
//! A typical single run:
//!
//! ```no_run
//! use trendmine::{
//!     api::{AiClient, Provider},
//!     config::{AiConfig, ProviderSettings},
//!     generator::IdeaGenerator,
//!     idea::Platform,
//!     prompt::IdeaRequest,
//! };
//!
//! # async fn example() -> trendmine::error::Result<()> {
//! let settings = ProviderSettings::from_env(Provider::Mistral, &AiConfig::default())?;
//! let generator = IdeaGenerator::new(AiClient::new(&settings)?);
//! let request = IdeaRequest::new("Budget meal prep", Platform::Tiktok, 3);
//! let generation = generator.generate_ideas(&request).await?;
//! for idea in &generation.ideas {
//!     println!("{idea}");
//! }
//! # Ok(())
//! # }
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

pub mod api;
pub mod audio;
pub mod batch;
pub mod check;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod idea;
pub mod news;
pub mod output;
pub mod parser;
pub mod pretty;
pub mod prompt;
pub mod template;
pub mod topics;

pub use error::{Error, Result};

/// Return the per-platform configuration directory used by TrendMine.
///
/// Uses [`directories::ProjectDirs`] with `("com", "trendmine", "trendmine")`,
/// e.g. `~/.config/trendmine` on Linux. The directory is not created here.
///
/// # Errors
/// Returns [`Error::Config`] if no home directory can be determined.
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "trendmine", "trendmine")
        .ok_or_else(|| Error::Config("unable to determine config directory".to_string()))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}
