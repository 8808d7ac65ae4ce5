//! Command-line interface definitions.
//!
//! [`Cli`] is parsed once in `main`; each [`Commands`] variant carries its own
//! argument struct. Argument combinations clap cannot express are checked by
//! the `validate` methods before any network call.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    api::Provider,
    audio::{DEFAULT_AUDIO_DIR, DEFAULT_VOICE_MODEL, VOICE_ID_VAR},
    batch::BatchMode,
    error::{Error, Result},
    idea::Platform,
    output::{DEFAULT_IDEAS_DIR, DEFAULT_SCRIPTS_DIR},
};

/// Generate short-form social video ideas and scripts with Mistral, Gemini or OpenAI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Auto)]
pub struct Cli {
    /// Configuration file (defaults to ./config.yaml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate 30-second scripts for a topic, grounded in recent headlines.
    #[clap(name = "scripts", alias = "s")]
    Scripts(ScriptsArgs),

    /// Generate video ideas for a topic.
    #[clap(name = "ideas", alias = "i")]
    Ideas(IdeasArgs),

    /// Generate ideas across topics, platforms or calendar days.
    #[clap(name = "batch", alias = "b")]
    Batch(BatchArgs),

    /// Browse the configured topics.
    Topics(TopicsArgs),

    /// Show platform templates.
    Templates(TemplatesArgs),

    /// Voice a saved script's hook and key points with ElevenLabs.
    #[clap(name = "audio", alias = "a")]
    Audio(AudioArgs),

    /// Report which API keys and configuration are available.
    Check,

    /// Write the default config.yaml to the user config directory.
    Init,
}

/// Provider selection shared by every generating subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// AI provider (falls back to DEFAULT_AI_PROVIDER, then the config file).
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name override.
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScriptsArgs {
    /// Topic for the video scripts.
    pub topic: String,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(long, value_enum, default_value_t = Platform::Tiktok)]
    pub platform: Platform,

    /// Number of scripts to generate.
    #[arg(long, default_value_t = 1)]
    pub num_ideas: usize,

    /// Only print the scripts.
    #[arg(long)]
    pub no_save: bool,

    #[arg(long, default_value = DEFAULT_SCRIPTS_DIR)]
    pub output_dir: PathBuf,

    /// Skip the NewsAPI lookup.
    #[arg(long)]
    pub no_news: bool,

    #[arg(long, default_value_t = 5)]
    pub news_max_articles: usize,

    /// Two-letter country code for top headlines (e.g. us, fr).
    #[arg(long)]
    pub news_country: Option<String>,
}

impl ScriptsArgs {
    pub fn validate(&self) -> Result<()> {
        if self.num_ideas == 0 {
            return Err(Error::InvalidArgument(
                "number of ideas must be at least 1".to_string(),
            ));
        }
        if !self.no_news && self.news_max_articles == 0 {
            return Err(Error::InvalidArgument(
                "number of news articles must be at least 1 when using NewsAPI".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct IdeasArgs {
    /// Topic for the video ideas.
    pub topic: String,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(long, value_enum, default_value_t = Platform::Tiktok)]
    pub platform: Platform,

    #[arg(long, default_value_t = 3)]
    pub num_ideas: usize,

    /// Target audience description.
    #[arg(long)]
    pub audience: Option<String>,

    /// Tone of the content (defaults to the configured tone).
    #[arg(long)]
    pub tone: Option<String>,

    /// Extra context passed to the model.
    #[arg(long)]
    pub context: Option<String>,

    /// Also write the ideas to this JSON file.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl IdeasArgs {
    pub fn validate(&self) -> Result<()> {
        if self.num_ideas == 0 {
            return Err(Error::InvalidArgument(
                "number of ideas must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(long, value_enum)]
    pub mode: BatchMode,

    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Platform (required for all-topics, defaults to tiktok for calendar).
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Topic name (required for cross-platform).
    #[arg(long)]
    pub topic: Option<String>,

    /// Ideas per topic or platform.
    #[arg(long, default_value_t = 2)]
    pub ideas_per: usize,

    /// Days to plan in calendar mode.
    #[arg(long, default_value_t = 7)]
    pub days: usize,

    #[arg(long, default_value = DEFAULT_IDEAS_DIR)]
    pub output_dir: PathBuf,
}

impl BatchArgs {
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            BatchMode::AllTopics if self.platform.is_none() => Err(Error::InvalidArgument(
                "--platform is required for all-topics mode".to_string(),
            )),
            BatchMode::CrossPlatform if self.topic.is_none() => Err(Error::InvalidArgument(
                "--topic is required for cross-platform mode".to_string(),
            )),
            BatchMode::AllTopics | BatchMode::CrossPlatform if self.ideas_per == 0 => Err(
                Error::InvalidArgument("--ideas-per must be at least 1".to_string()),
            ),
            BatchMode::Calendar if self.days == 0 => Err(Error::InvalidArgument(
                "--days must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AudioArgs {
    /// A scripts_*.json file written by `trendmine scripts`.
    pub script_json: PathBuf,

    #[arg(long, default_value_t = 1)]
    pub script_number: usize,

    /// ElevenLabs voice ID.
    #[arg(long, env = VOICE_ID_VAR)]
    pub voice_id: Option<String>,

    #[arg(long, default_value = DEFAULT_AUDIO_DIR)]
    pub output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_VOICE_MODEL)]
    pub model_id: String,
}

impl AudioArgs {
    /// The voice to use; there is no default voice.
    pub fn voice(&self) -> Result<&str> {
        self.voice_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "missing voice ID: pass --voice-id or set {VOICE_ID_VAR}"
                ))
            })
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TopicsArgs {
    /// List every topic (the default).
    #[arg(long)]
    pub list: bool,

    /// Search names, descriptions and keywords.
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Show one topic in detail.
    #[arg(long, value_name = "NAME")]
    pub topic: Option<String>,
}

impl TopicsArgs {
    /// `--list`, or no other selector given.
    pub fn wants_listing(&self) -> bool {
        self.list || (self.search.is_none() && self.topic.is_none())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TemplatesArgs {
    /// Show one platform's template.
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Compare several platforms side by side.
    #[arg(long, value_enum, num_args = 1.., value_name = "PLATFORM")]
    pub compare: Vec<Platform>,

    /// Show every template (the default).
    #[arg(long)]
    pub list_all: bool,
}

impl TemplatesArgs {
    /// `--list-all`, or no platform selected.
    pub fn wants_all(&self) -> bool {
        self.list_all || (self.platform.is_none() && self.compare.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trendmine").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scripts_defaults() {
        let cli = parse(&["scripts", "AI tools"]);
        let Commands::Scripts(args) = cli.command else {
            panic!("expected scripts");
        };
        assert_eq!(args.topic, "AI tools");
        assert_eq!(args.platform, Platform::Tiktok);
        assert_eq!(args.num_ideas, 1);
        assert_eq!(args.news_max_articles, 5);
        assert_eq!(args.output_dir, PathBuf::from("./generated_scripts"));
        assert!(!args.no_save && !args.no_news);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_ideas_flags() {
        let cli = parse(&[
            "--config",
            "my.yaml",
            "ideas",
            "Budget travel",
            "--provider",
            "openai",
            "--platform",
            "instagram_reels",
            "--num-ideas",
            "5",
            "--tone",
            "funny",
            "-o",
            "out.json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("my.yaml")));
        let Commands::Ideas(args) = cli.command else {
            panic!("expected ideas");
        };
        assert_eq!(args.provider.provider, Some(Provider::OpenAi));
        assert_eq!(args.platform, Platform::InstagramReels);
        assert_eq!(args.num_ideas, 5);
        assert_eq!(args.tone.as_deref(), Some("funny"));
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let Commands::Scripts(args) = parse(&["scripts", "x", "--num-ideas", "0"]).command else {
            panic!("expected scripts");
        };
        assert!(matches!(args.validate(), Err(Error::InvalidArgument(_))));

        let Commands::Scripts(args) =
            parse(&["scripts", "x", "--news-max-articles", "0", "--no-news"]).command
        else {
            panic!("expected scripts");
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_batch_mode_requirements() {
        let Commands::Batch(args) = parse(&["batch", "--mode", "all-topics"]).command else {
            panic!("expected batch");
        };
        assert!(args.validate().is_err());

        let Commands::Batch(args) =
            parse(&["batch", "--mode", "cross-platform", "--topic", "Budget Travel"]).command
        else {
            panic!("expected batch");
        };
        assert!(args.validate().is_ok());

        let Commands::Batch(args) = parse(&["batch", "--mode", "calendar"]).command else {
            panic!("expected batch");
        };
        assert_eq!(args.days, 7);
        assert_eq!(args.output_dir, PathBuf::from("./generated_ideas"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_templates_compare_takes_many() {
        let Commands::Templates(args) =
            parse(&["templates", "--compare", "tiktok", "twitter"]).command
        else {
            panic!("expected templates");
        };
        assert_eq!(args.compare, vec![Platform::Tiktok, Platform::Twitter]);
    }

    #[test]
    fn test_audio_defaults() {
        let Commands::Audio(args) = parse(&[
            "audio",
            "generated_scripts/scripts_x.json",
            "--voice-id",
            "voice-1",
        ])
        .command
        else {
            panic!("expected audio");
        };
        assert_eq!(args.script_number, 1);
        assert_eq!(args.model_id, "eleven_multilingual_v2");
        assert_eq!(args.output_dir, PathBuf::from("./generated_audio"));
        assert_eq!(args.voice().unwrap(), "voice-1");

        let blank = AudioArgs {
            voice_id: Some(" ".to_string()),
            ..args
        };
        assert!(matches!(blank.voice(), Err(Error::Config(_))));
    }

    #[test]
    fn test_listing_flags() {
        let Commands::Topics(args) = parse(&["topics"]).command else {
            panic!("expected topics");
        };
        assert!(args.wants_listing());

        let Commands::Topics(args) = parse(&["topics", "--search", "travel"]).command else {
            panic!("expected topics");
        };
        assert!(!args.wants_listing());

        let Commands::Topics(args) =
            parse(&["topics", "--search", "travel", "--list"]).command
        else {
            panic!("expected topics");
        };
        assert!(args.wants_listing());

        let Commands::Templates(args) = parse(&["templates", "--platform", "tiktok"]).command
        else {
            panic!("expected templates");
        };
        assert!(!args.wants_all());

        let Commands::Templates(args) =
            parse(&["templates", "--platform", "tiktok", "--list-all"]).command
        else {
            panic!("expected templates");
        };
        assert!(args.wants_all());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["trendmine", "ideas", "x", "--provider", "claude"]).is_err());
    }
}
