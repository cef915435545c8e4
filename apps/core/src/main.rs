// Wellness chatbot console entry point

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use wellness_core::commands::{parse_command, Console, Outcome, HELP_TEXT};
use wellness_core::config::AppConfig;
use wellness_core::error::AppError;
use wellness_core::fs_manager::PortablePathManager;
use wellness_core::store::SqliteStore;
use wellness_core::{database, seed, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Invalid configuration")?;
    telemetry::init_tracing(config.log_format)?;

    PortablePathManager::init().context("Failed to initialize data directories")?;

    let pool = database::init_db(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    if config.seed_content {
        seed::seed_content(&pool).await.context("Failed to seed content")?;
    }

    let user = database::ensure_user(&pool, &config.user_name, &config.user_email).await?;
    info!("Chatting as user {} ({})", user.id, user.email);

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut console = Console::new(SqliteStore::new(pool.clone()), user, rng);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("Hi {}. {}\n\n> ", console.user().name, HELP_TEXT).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Ok(None) => None,
            Ok(Some(command)) => match console.execute(command).await {
                Ok(Outcome::Reply(text)) => Some(text),
                Ok(Outcome::Quit) => break,
                Err(e @ (AppError::Validation(_) | AppError::NotFound(_) | AppError::Conflict(_))) => {
                    Some(e.to_string())
                }
                Err(e) => {
                    error!("Command failed: {}", e);
                    Some("Something went wrong, please try again.".to_string())
                }
            },
            Err(e) => Some(e.to_string()),
        };

        if let Some(text) = reply {
            stdout.write_all(format!("{}\n", text).as_bytes()).await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    info!("Session {} closed", console.session().session_key);
    pool.close().await;
    Ok(())
}
