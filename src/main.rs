//! Entry point for the `trendmine` CLI.
//!
//! ```sh
//! trendmine scripts "5 productivity hacks for remote work" --provider gemini
//! trendmine ideas "Budget meal prep" --platform instagram_reels --num-ideas 5
//! trendmine batch --mode calendar --days 14
//! trendmine audio generated_scripts/scripts_<topic>_<ts>.json --script-number 2
//! trendmine check
//! ```

use std::{
    env,
    error::Error,
    fs,
    io::{self, stdout},
    path::Path,
};

use clap::Parser;
use once_cell::sync::OnceCell;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use trendmine::{
    api::{AiClient, TextGenerator},
    audio::{SpeechClient, clip_dir_name, find_script, generate_tracks},
    batch::{BatchDriver, BatchMode, CROSS_PLATFORM_DEFAULTS, save_document},
    check::run_check,
    commands::{
        AudioArgs, BatchArgs, Cli, Commands, IdeasArgs, ProviderArgs, ScriptsArgs, TemplatesArgs,
        TopicsArgs,
    },
    config::{self, AppConfig, ProviderSettings, resolve_config, select_provider},
    config_dir,
    generator::IdeaGenerator,
    idea::Platform,
    news::{NewsClient, NewsQuery, build_news_context},
    output::{IdeaDocument, ScriptDocument, ScriptRun, read_json, save_ideas, save_scripts, timestamp},
    pretty::{print_banner, print_ideas, print_listing, print_script, print_success, print_warning},
    prompt::IdeaRequest,
    template::{PlatformTemplate, compare_platforms},
    topics::TopicCatalogue,
};

static TRACING: OnceCell<()> = OnceCell::new();

const KEY_HELP: &str = "\
Make sure you have set the appropriate API key:
  Mistral: export MISTRAL_API_KEY='your-key'
  Gemini:  export GEMINI_API_KEY='your-key'  (or GOOGLE_API_KEY)
  OpenAI:  export OPENAI_API_KEY='your-key'
  Audio:   export ELEVENLABS_API_KEY='your-key'
Keys can also be placed in a .env file in the current directory.";

fn main() -> Result<(), Box<dyn Error>> {
    // Before tracing, so RUST_LOG may come from .env.
    config::load_dotenv();
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .init();
    });

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("\nError: {e}");
        if matches!(e, trendmine::Error::Authentication { .. }) {
            eprintln!("\n{KEY_HELP}");
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> trendmine::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scripts(args) => scripts(&resolve_config(config_path)?, args).await,
        Commands::Ideas(args) => ideas(&resolve_config(config_path)?, args).await,
        Commands::Batch(args) => batch(&resolve_config(config_path)?, args).await,
        Commands::Topics(args) => topics(&resolve_config(config_path)?, args),
        Commands::Templates(args) => templates(args),
        Commands::Audio(args) => audio(args).await,
        Commands::Check => {
            let report = run_check(resolve_config(config_path), |name| env::var(name).ok());
            print_listing(&mut stdout(), &report.to_string())?;
            Ok(())
        }
        Commands::Init => init(),
    }
}

/// Builds the adapter for this run. Missing keys fail here, before any request.
fn client(args: &ProviderArgs, config: &AppConfig) -> trendmine::Result<AiClient> {
    let provider = select_provider(args.provider, &config.ai_config, |name| env::var(name).ok())?;
    let settings =
        ProviderSettings::from_env(provider, &config.ai_config)?.with_model(args.model.clone());
    debug!(provider = %settings.provider, model = %settings.model, "Provider settings resolved");
    AiClient::new(&settings)
}

async fn scripts(config: &AppConfig, args: ScriptsArgs) -> trendmine::Result<()> {
    args.validate()?;
    let mut out = stdout();

    print_banner(
        &mut out,
        &format!("GENERATING {} VIDEO SCRIPT(S) (30 seconds each)", args.num_ideas),
    )?;
    let generator = IdeaGenerator::new(client(&args.provider, config)?);
    println!("\nTopic: {}", args.topic);
    println!("AI Provider: {}", generator.client().provider());
    println!("Platform: {}\n", args.platform.display_name());

    let mut news_articles = Vec::new();
    if !args.no_news {
        let news = NewsClient::from_env()?;
        if news.has_key() {
            println!("Fetching latest headlines for context...");
            news_articles = news
                .fetch_headlines(&NewsQuery {
                    topic: args.topic.clone(),
                    max_articles: args.news_max_articles,
                    country: args.news_country.clone(),
                })
                .await;
            if news_articles.is_empty() {
                print_warning(&mut out, "No matching headlines retrieved, continuing without news context.")?;
            } else {
                println!("Found {} relevant headline(s):", news_articles.len());
                for article in &news_articles {
                    match &article.source {
                        Some(source) => println!("  • {} ({source})", article.title),
                        None => println!("  • {}", article.title),
                    }
                }
            }
        } else {
            print_warning(
                &mut out,
                "Missing NEWS_API_KEY/NEW_API_KEY. Set it to ground scripts in current news.",
            )?;
        }
    }

    let news_context = (!news_articles.is_empty()).then(|| build_news_context(&news_articles));

    let request = IdeaRequest::new(args.topic.clone(), args.platform, args.num_ideas)
        .tone(config.default_tone())
        .context(news_context.clone());
    println!("Generating scripts...");
    let generation = generator.generate_ideas(&request).await?;

    let run = ScriptRun {
        topic: args.topic.clone(),
        ideas: generation.ideas,
        news_articles,
        news_context,
        system_prompt: Some(generation.system_prompt),
        user_prompt: Some(generation.user_prompt),
    };

    if run.ideas.is_empty() {
        print_warning(&mut out, "The model reply contained no usable scripts.")?;
    } else {
        print_success(&mut out, &format!("Generated {} script(s)", run.ideas.len()))?;
    }
    for script in run.scripts() {
        print_script(&mut out, &script)?;
    }

    if !args.no_save {
        let (txt, json) = save_scripts(&args.output_dir, &run)?;
        println!("\nScripts saved to:");
        println!("  Text: {}", txt.display());
        println!("  JSON: {}", json.display());
    }
    Ok(())
}

async fn ideas(config: &AppConfig, args: IdeasArgs) -> trendmine::Result<()> {
    args.validate()?;
    let mut out = stdout();
    let generator = IdeaGenerator::new(client(&args.provider, config)?);

    let request = IdeaRequest::new(args.topic.clone(), args.platform, args.num_ideas)
        .audience(args.audience.clone())
        .tone(args.tone.clone().unwrap_or_else(|| config.default_tone()))
        .context(args.context.clone());

    print_banner(
        &mut out,
        &format!("{} IDEAS FOR {}", args.num_ideas, args.platform.display_name().to_uppercase()),
    )?;
    let generation = generator.generate_ideas(&request).await?;
    print_ideas(&mut out, &generation.ideas)?;

    if let Some(path) = &args.output {
        let document = IdeaDocument {
            topic: args.topic.clone(),
            platform: args.platform,
            provider: generator.client().provider().to_string(),
            model: generator.client().model_name().to_string(),
            ideas: generation.ideas,
        };
        save_ideas(path, &document)?;
        print_success(&mut out, &format!("Ideas saved to {}", path.display()))?;
    }
    Ok(())
}

async fn batch(config: &AppConfig, args: BatchArgs) -> trendmine::Result<()> {
    args.validate()?;
    let mut out = stdout();
    let generator = IdeaGenerator::new(client(&args.provider, config)?);
    let driver = BatchDriver::new(
        generator,
        TopicCatalogue::from_config(config),
        config.default_tone(),
    );
    let stamp = timestamp();

    let path = match args.mode {
        BatchMode::AllTopics => {
            let platform = args.platform.unwrap_or(Platform::Tiktok);
            print_banner(
                &mut out,
                &format!("GENERATING IDEAS FOR {} TOPICS ON {platform}", config.topics.len()),
            )?;
            let document = driver.all_topics(platform, args.ideas_per).await?;
            for (topic, ideas) in &document.results {
                println!("  {topic}: {} idea(s)", ideas.len());
            }
            print_success(
                &mut out,
                &format!(
                    "Generated {} ideas for {} topics",
                    document.total_ideas, document.total_topics
                ),
            )?;
            save_document(&args.output_dir, &document.file_name(&stamp), &document)?
        }
        BatchMode::CrossPlatform => {
            let topic = args.topic.as_deref().unwrap_or_default();
            print_banner(&mut out, &format!("GENERATING IDEAS FOR '{topic}' ACROSS PLATFORMS"))?;
            let document = driver
                .cross_platform(topic, &CROSS_PLATFORM_DEFAULTS, args.ideas_per)
                .await?;
            for (platform, ideas) in &document.results {
                println!("  {}: {} idea(s)", platform.display_name(), ideas.len());
            }
            print_success(
                &mut out,
                &format!(
                    "Generated {} ideas across {} platforms",
                    document.total_ideas,
                    document.platforms.len()
                ),
            )?;
            save_document(&args.output_dir, &document.file_name(&stamp), &document)?
        }
        BatchMode::Calendar => {
            let platform = args.platform.unwrap_or(Platform::Tiktok);
            print_banner(
                &mut out,
                &format!("{}-DAY CONTENT CALENDAR FOR {}", args.days, platform.display_name().to_uppercase()),
            )?;
            let document = driver.calendar(args.days, platform).await?;
            for entry in &document.calendar {
                let date = entry.date.get(..10).unwrap_or(&entry.date);
                match &entry.idea {
                    Some(idea) => println!("  Day {} ({date}) {}: {}", entry.day, entry.topic, idea.title),
                    None => println!("  Day {} ({date}) {}: (not generated)", entry.day, entry.topic),
                }
            }
            print_success(
                &mut out,
                &format!("Planned {} of {} days", document.planned(), document.days),
            )?;
            save_document(&args.output_dir, &document.file_name(&stamp), &document)?
        }
    };

    println!("\nResults saved to: {}", path.display());
    Ok(())
}

fn topics(config: &AppConfig, args: TopicsArgs) -> trendmine::Result<()> {
    let catalogue = TopicCatalogue::from_config(config);
    let mut out = stdout();

    if args.wants_listing() {
        let mut listing = catalogue.list();
        if !catalogue.tone_options().is_empty() {
            listing.push_str("TONE OPTIONS:\n");
            for tone in catalogue.tone_options() {
                listing.push_str(&format!("  - {tone}\n"));
            }
        }
        print_listing(&mut out, &listing)?;
    }

    if let Some(name) = &args.topic {
        let topic = catalogue.require(name)?;
        let text = format!(
            "\nTOPIC:\n{}\n  {}\n  Audience: {}\n  Keywords: {}\n",
            topic.name,
            topic.description,
            topic.target_audience,
            topic.keywords.join(", ")
        );
        print_listing(&mut out, &text)?;
    } else if let Some(query) = &args.search {
        let hits = catalogue.search(query);
        if hits.is_empty() {
            print_warning(&mut out, &format!("No topics match '{query}'"))?;
        }
        for topic in hits {
            println!("  {topic}");
        }
    }
    Ok(())
}

fn templates(args: TemplatesArgs) -> trendmine::Result<()> {
    let mut out = stdout();
    if args.wants_all() {
        for template in PlatformTemplate::all() {
            print_listing(&mut out, &template.format_info())?;
        }
    } else if !args.compare.is_empty() {
        print_listing(&mut out, &compare_platforms(&args.compare))?;
    } else if let Some(platform) = args.platform {
        print_listing(&mut out, &PlatformTemplate::get(platform).format_info())?;
    }
    Ok(())
}

async fn audio(args: AudioArgs) -> trendmine::Result<()> {
    let client = SpeechClient::from_env()?;
    let voice_id = args.voice()?;
    let document: ScriptDocument = read_json(&args.script_json)?;
    let script = find_script(&document, args.script_number)?;
    let destination = args.output_dir.join(clip_dir_name(script));

    let mut out = stdout();
    print_banner(&mut out, &format!("VOICING SCRIPT #{}: {}", script.script_number, script.title))?;
    let written = generate_tracks(&client, script, &destination, voice_id, &args.model_id).await?;
    if written.is_empty() {
        print_warning(&mut out, "No hook or key points to process.")?;
        return Ok(());
    }
    for path in &written {
        println!("  {}", path.display());
    }
    print_success(
        &mut out,
        &format!("{} audio clip(s) stored in {}", written.len(), destination.display()),
    )?;
    Ok(())
}

/// Writes the built-in configuration to the user config directory.
fn init() -> trendmine::Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join("config.yaml");
    write_default_config(&path)
}

fn write_default_config(path: &Path) -> trendmine::Result<()> {
    let mut out = stdout();
    if path.exists() {
        print_warning(
            &mut out,
            &format!("{} already exists, leaving it unchanged", path.display()),
        )?;
        return Ok(());
    }
    info!("Creating config file: {}", path.display());
    fs::write(path, config::DEFAULT_CONFIG_YAML)?;
    print_success(&mut out, &format!("Wrote {}", path.display()))?;
    Ok(())
}
