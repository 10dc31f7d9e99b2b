use clap::{Parser, Subcommand};
use std::sync::Arc;

use gauntly_bot::application::errors::{BotError, ConfigError};
use gauntly_bot::application::services::Bot;
use gauntly_bot::domain::traits::{ChatTransport, PlatformApi};
use gauntly_bot::infrastructure::adapters::{ConsoleTransport, IrcTransport};
use gauntly_bot::infrastructure::config::Config;
use gauntly_bot::infrastructure::helix::HelixClient;
use gauntly_bot::infrastructure::llm::{OpenAiProvider, LLM};
use gauntly_bot::plugins::{
    AskPlugin, BasicCommandsPlugin, DicePlugin, PluginRegistry, RaidPalPlugin, UptimePlugin,
};

#[derive(Parser)]
#[command(name = "gauntly-bot")]
#[command(about = "A Twitch chat bot built around plugins", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Channel to join (overrides config)
    #[arg(long)]
    channel: Option<String>,

    /// Read chat from stdin instead of connecting to Twitch
    #[arg(long)]
    console: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.channel, cli.console).await {
                tracing::error!("Error starting bot: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("gauntly-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(),
    }
}

fn load_config(path: &str, channel: Option<String>) -> Result<Config, BotError> {
    let mut config = if std::path::Path::new(path).exists() {
        Config::load(path)?
    } else {
        tracing::warn!("Config file {} not found, using defaults", path);
        Config::default()
    };
    config.apply_env();
    if let Some(channel) = channel {
        config.bot.channel_name = channel;
    }
    Ok(config)
}

/// Plugins in the order they see each message
fn build_registry(config: &Config) -> Result<PluginRegistry, BotError> {
    let mut registry = PluginRegistry::new();
    registry.register(BasicCommandsPlugin::new())?;
    registry.register(DicePlugin::new())?;
    registry.register(UptimePlugin::new())?;

    if config.raidpal.enabled {
        registry.register(RaidPalPlugin::new(config.raidpal_settings()))?;
    }

    match config.ai_key() {
        Some(key) => {
            let mut provider = OpenAiProvider::new(key, config.ai.model.as_deref())
                .map_err(|e| BotError::Internal(e.to_string()))?;
            if let Some(base_url) = &config.ai.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            let llm: Arc<dyn LLM> = Arc::new(provider);
            registry.register(
                AskPlugin::new(llm, config.ai.system_prompt.clone())
                    .with_limits(config.ai.temperature, config.ai.max_tokens),
            )?;
        }
        None => tracing::info!("No OpenAI key configured, !ask is disabled"),
    }

    tracing::info!("Loaded plugins: {}", registry.names().join(", "));
    Ok(registry)
}

async fn run_bot(config_path: &str, channel: Option<String>, console: bool) -> Result<(), BotError> {
    let config = load_config(config_path, channel)?;

    let transport: Arc<dyn ChatTransport> = if console {
        if config.bot.channel_name.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.channel-name".to_string()).into());
        }
        Arc::new(ConsoleTransport::new(&config.bot.channel_name))
    } else {
        config.validate()?;
        Arc::new(IrcTransport::new(config.irc_settings()))
    };

    let platform: Arc<dyn PlatformApi> = Arc::new(
        HelixClient::new(config.api_token(), config.bot.client_id.clone(), config.helix_timeout())?
            .with_base_url(config.helix.base_url.clone()),
    );

    let registry = build_registry(&config)?;
    let mut bot = Bot::new(config.bot_settings(), transport, platform, registry)?;
    bot.start().await?;

    tokio::select! {
        result = bot.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
    bot.shutdown().await;
    Ok(())
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render config: {}", e),
    }
}
