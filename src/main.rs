//! mtgbot - card and spell lookup bot for Discord
//!
//! Watches chat for `[[Card Name]]` and `<Spell Name>` references and
//! answers with the card image or the spell text. Custom trigger patterns
//! can answer with canned responses instead.

mod bot;
mod cards;
mod common;
mod config;
mod discord;
mod spells;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use bot::{Dispatcher, TriggerMatcher};
use cards::{CardEndpoints, CardResolver, HttpCardApi};
use common::IncomingMessage;
use config::{env::get_config_path, load_and_validate};
use discord::{run_dispatch_loop, ChatBot, DiscordReplySink};
use spells::{SpellResolver, SqliteSpellStore};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "mtgbot", version, about)]
struct Cli {
    /// Path to the configuration file (defaults to $MTGBOT_CONFIG or ./config.json).
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("mtgbot v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path(cli.config);
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    let triggers = match config.custom_path() {
        Some(path) => {
            info!("Loading custom responses from {}...", path);
            let triggers = TriggerMatcher::load(path).map_err(|e| {
                error!("Failed to load custom responses: {}", e);
                e
            })?;
            info!("Loaded {} custom triggers", triggers.len());
            triggers
        }
        None => {
            info!("No custom response file configured");
            TriggerMatcher::empty()
        }
    };

    info!("Spell database: {}", config.spell_db_path);

    let cards = CardResolver::new(
        Arc::new(HttpCardApi::new()?),
        CardEndpoints::from_config(&config),
    );
    let spells = SpellResolver::new(Arc::new(SqliteSpellStore::open(&config.spell_db_path)));
    let dispatcher = Dispatcher::new(triggers, cards, spells);

    // ============================================================
    // Wire gateway -> dispatcher
    // ============================================================
    let (events_tx, events_rx) = mpsc::unbounded_channel::<IncomingMessage>();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let chat_bot = ChatBot::build(config.discord_token.clone(), events_tx).await?;
    let sink = DiscordReplySink::new(chat_bot.http());

    let mut discord_task = tokio::spawn(chat_bot.run(shutdown_rx));
    let dispatch_task = tokio::spawn(run_dispatch_loop(events_rx, dispatcher, sink));

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received...");
            true
        }
        _ = &mut discord_task => false,
        _ = dispatch_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (Discord task already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, discord_task).await {
            Ok(Ok(())) => info!("Discord client stopped gracefully"),
            Ok(Err(e)) => warn!("Discord task panicked: {}", e),
            Err(_) => warn!("Discord shutdown timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
