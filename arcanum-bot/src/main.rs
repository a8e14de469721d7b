//! arcanum CLI: run the Telegram bot or initialize the database. Config from env and optional CLI args.

use anyhow::Result;
use arcanum_bot::cli::{Cli, Commands};
use arcanum_bot::{init_db, run_bot, BotConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = BotConfig::load(token)?;
            run_bot(config).await
        }
        Commands::InitDb => {
            let database_url =
                std::env::var("DATABASE_URL").unwrap_or_else(|_| "./arcanum.db".to_string());
            init_db(&database_url).await
        }
    }
}
