mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use istpbot_config::{AppConfig, GenderPreference, PreferenceStore, Preferences};
use istpbot_llm::{GeminiClient, RemoteConfig};
use istpbot_runtime::personalize::quick_questions;
use istpbot_runtime::{ResponseResolver, plain_text, user_facing_message};

#[derive(Debug, Parser)]
#[command(name = "istpbot", version, about = "ISTP 유형 전문 챗봇 (MBTI persona chat bot)")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config/istpbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive chat session (the default).
    Chat,
    /// Resolve a single question and print the final response.
    Ask {
        question: String,
    },
    /// Record the gender preference used for personalization.
    Setup {
        #[arg(long, value_enum)]
        gender: CliGender,
    },
    /// Clear the stored preference.
    Reset,
    /// Show credential, mode, and preference state.
    Status,
    /// Print the personalized starter questions.
    Questions,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliGender {
    Male,
    Female,
    Other,
}

impl From<CliGender> for GenderPreference {
    fn from(gender: CliGender) -> Self {
        match gender {
            CliGender::Male => GenderPreference::Male,
            CliGender::Female => GenderPreference::Female,
            CliGender::Other => GenderPreference::Other,
        }
    }
}

/// The preference store lives next to the config file.
fn preference_store(config_path: &Path) -> PreferenceStore {
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    PreferenceStore::new(dir.join("preferences.toml"))
}

/// Wire up the resolver from config: a Gemini client when any credential is
/// set, the local template path otherwise.
fn build_resolver(config: &AppConfig) -> Result<ResponseResolver> {
    let remote: Option<Arc<dyn istpbot_llm::RemoteResponder>> = if config.api.has_usable_credential()
    {
        let client = GeminiClient::new(RemoteConfig {
            endpoint: config.api.base_url.clone(),
            api_key: config.api.api_key.clone(),
            temperature: config.api.temperature,
            top_k: config.api.top_k,
            top_p: config.api.top_p,
            max_output_tokens: config.api.max_output_tokens,
            timeout: Duration::from_secs(config.api.timeout_secs),
        })?;
        Some(Arc::new(client))
    } else {
        None
    };

    Ok(ResponseResolver::new(
        remote,
        config.api.force_mock,
        config.delivery.think_delay_min_ms..=config.delivery.think_delay_max_ms,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = preference_store(&cli.config);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => session::run_chat(&config, &store).await,
        Commands::Ask { question } => run_ask(&config, &store, &question).await,
        Commands::Setup { gender } => run_setup(&store, gender.into()),
        Commands::Reset => run_reset(&store),
        Commands::Status => run_status(&config, &store),
        Commands::Questions => run_questions(&store),
    }
}

async fn run_ask(config: &AppConfig, store: &PreferenceStore, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("question cannot be empty");
    }
    if question.chars().count() > config.chat.max_message_length {
        anyhow::bail!(
            "question exceeds the {}-character limit",
            config.chat.max_message_length
        );
    }

    let prefs = store.load()?;
    let resolver = build_resolver(config)?;

    match resolver.resolve(question, prefs.gender).await {
        Ok(result) => {
            println!("{}", plain_text(&result.text));
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "resolution failed");
            println!("{}", user_facing_message(&err));
            Ok(())
        }
    }
}

fn run_setup(store: &PreferenceStore, gender: GenderPreference) -> Result<()> {
    store.save(&Preferences {
        gender,
        setup_completed: true,
    })?;
    println!("preference saved: gender = {}", gender.as_str());
    Ok(())
}

fn run_reset(store: &PreferenceStore) -> Result<()> {
    store.clear()?;
    println!("preference cleared");
    Ok(())
}

fn run_status(config: &AppConfig, store: &PreferenceStore) -> Result<()> {
    let prefs = store.load()?;
    let mode = if config.api.has_usable_credential() && !config.api.force_mock {
        "remote"
    } else {
        "local-template"
    };
    println!("bot: {} ({})", config.bot.name, config.bot.type_code);
    println!("credential usable: {}", config.api.has_usable_credential());
    println!("response mode: {mode}");
    println!("gender preference: {}", prefs.gender.as_str());
    println!("setup completed: {}", prefs.setup_completed);
    Ok(())
}

fn run_questions(store: &PreferenceStore) -> Result<()> {
    let prefs = store.load()?;
    for question in quick_questions(prefs.gender) {
        println!("- {question}");
    }
    Ok(())
}
