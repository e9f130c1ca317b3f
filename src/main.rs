use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

mod application;
mod domain;
mod infrastructure;
mod plugins;
#[cfg(test)]
mod testing;

use application::errors::ConfigError;
use application::messaging::Dispatcher;
use application::registry::{Registrar, Registry};
use domain::traits::{ChatClient, Store};
use infrastructure::adapters::telegram::TelegramAdapter;
use infrastructure::config::Config;
use infrastructure::database::SqliteStore;
use infrastructure::plugins::PluginLoader;

/// Long-poll timeout passed to getUpdates.
const POLL_TIMEOUT_SECS: i64 = 30;

/// Pause before retrying a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "warden-bot")]
#[command(about = "A plugin-driven chat moderation bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
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

fn main() {
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
            let config_path = if cli.config == "config.yaml" {
                std::env::var("CONFIG_PATH").unwrap_or(cli.config)
            } else {
                cli.config
            };
            if let Err(e) = run_bot(config_path, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("warden-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(
    config_path: String,
    token_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path)?
    } else {
        tracing::warn!("Config file {} not found, using environment", config_path);
        let config = Config::load_env();
        config.validate()?;
        config
    };

    tracing::info!("Starting {}", config.bot.name);

    let token = token_override
        .or_else(|| config.telegram_token().map(|s| s.to_string()))
        .ok_or_else(|| {
            ConfigError::MissingField("adapters.telegram.token (or BOT_TOKEN)".to_string())
        })?;

    // Storage
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&config.storage.path)?);
    tracing::info!("Storage ready at {}", config.storage.path.display());

    // Load phase: every unit appends its registrations, then the store
    // freezes. Any registration or import failure aborts startup here.
    let mut registrar = Registrar::new();
    plugins::register_builtin(&mut registrar)?;
    let mut loader = PluginLoader::new(&config.plugins.directory);
    if config.plugins.auto_load {
        let imported = loader.load_into(&mut registrar)?;
        if imported > 0 {
            tracing::info!("Imported {} dynamic plugin units", imported);
        }
    }
    let registry = registrar.freeze();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config, token, store, registry))
}

async fn run(
    config: Config,
    token: String,
    store: Arc<dyn Store>,
    registry: Registry,
) -> Result<(), Box<dyn std::error::Error>> {
    let adapter = Arc::new(TelegramAdapter::new(token));
    let client: Arc<dyn ChatClient> = adapter.clone();
    let me = client.me().await?;
    tracing::info!("Running as {} ({})", me.display_name(), me.id);

    let dispatcher = Arc::new(Dispatcher::new(
        &registry,
        &config.bot.prefix,
        client,
        store,
    )?);

    let mut offset: i64 = 0;
    loop {
        match adapter.poll_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                offset = TelegramAdapter::next_offset(&updates, offset);
                // Updates spawn in delivery order; registrations for one
                // update still run sequentially inside its dispatch.
                for update in updates {
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move { dispatcher.dispatch(update).await });
                }
            }
            Err(e) => match e.flood_wait() {
                Some(wait) => {
                    tracing::warn!("Flood wait on getUpdates, sleeping {}s", wait.as_secs());
                    tokio::time::sleep(wait).await;
                }
                None => {
                    tracing::error!("Polling failed: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            },
        }
    }
}

fn init_config() {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}
