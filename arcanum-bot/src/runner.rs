//! Start-up: logging, database, Gemini client, Telegram bot, then the REPL.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arcanum_core::init_tracing;
use llm_client::GeminiClient;
use storage::Database;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, instrument};

use crate::commands::Command;
use crate::components::AppState;
use crate::config::BotConfig;
use crate::telegram::{run_repl, TelegramMessenger};

/// Main entry: validate config, init logging, connect the database, register commands, run REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    create_log_dir(config.log_file())?;
    init_tracing(config.log_file(), config.log_level())?;

    info!(
        database_url = %config.database_url(),
        model = %config.model(),
        "Initializing bot"
    );

    let db = Database::connect(config.database_url())
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url()))?;
    if let Err(e) = db.ping().await {
        error!(error = %e, "Database check failed");
        return Err(e).context("Database is not reachable");
    }

    let llm = GeminiClient::new(&config.gemini);
    let bot = build_teloxide_bot(&config);

    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("Failed to delete webhook")?;
    bot.set_my_commands(Command::bot_commands())
        .await
        .context("Failed to register bot commands")?;

    let state = AppState::new(
        Arc::new(TelegramMessenger::new(bot.clone())),
        Arc::new(llm),
        db.clone(),
        config.stream_settings(),
        config.model(),
    );

    info!("Bot started successfully");
    let result = run_repl(bot, state).await;

    db.close().await;
    info!("Bot stopped");
    result
}

/// Creates the database schema and exits.
pub async fn init_db(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to open database {database_url}"))?;
    db.ping().await?;
    db.close().await;
    println!("Database ready: {database_url}");
    Ok(())
}

fn create_log_dir(log_file: &str) -> Result<()> {
    if let Some(dir) = Path::new(log_file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn build_teloxide_bot(config: &BotConfig) -> Bot {
    let bot = Bot::new(config.bot_token());
    match config.telegram_api_url() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}
