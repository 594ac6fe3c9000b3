//! Discord gateway client.
//!
//! Wraps serenity so the rest of the bot only sees a stream of
//! [`IncomingMessage`]s and an HTTP handle for posting replies.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::common::IncomingMessage;
use crate::discord::handler::escape_html;

/// Forwards gateway messages into the dispatch channel.
struct ChatEvents {
    events_tx: mpsc::UnboundedSender<IncomingMessage>,
}

impl ChatEvents {
    fn new(events_tx: mpsc::UnboundedSender<IncomingMessage>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl EventHandler for ChatEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
    }

    async fn message(&self, context: Context, message: Message) {
        // Ignore our own messages
        if message.author.id == context.cache.current_user().id {
            return;
        }

        // Ignore bots
        if message.author.bot {
            return;
        }

        if message.content.trim().is_empty() {
            return;
        }

        let incoming = IncomingMessage {
            channel_id: message.channel_id.get(),
            user: message.author.name.clone(),
            text: escape_html(&message.content),
        };

        if let Err(error) = self.events_tx.send(incoming) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

async fn build_client(
    token: &str,
    events_tx: mpsc::UnboundedSender<IncomingMessage>,
) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    let client = Client::builder(token, intents)
        .event_handler(ChatEvents::new(events_tx))
        .await?;
    Ok(client)
}

/// Exponential backoff for rebuilding the Discord client.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(Duration::from_secs(300))
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

/// The Discord connection.
pub struct ChatBot {
    client: Option<Client>,
    token: String,
    http: Arc<Http>,
    events_tx: mpsc::UnboundedSender<IncomingMessage>,
}

impl ChatBot {
    /// Build the client. Messages are delivered on `events_tx` once running.
    pub async fn build(
        token: String,
        events_tx: mpsc::UnboundedSender<IncomingMessage>,
    ) -> anyhow::Result<Self> {
        let client = build_client(&token, events_tx.clone()).await?;
        let http = client.http.clone();

        Ok(Self {
            client: Some(client),
            token,
            http,
            events_tx,
        })
    }

    /// HTTP handle for posting messages.
    pub fn http(&self) -> Arc<Http> {
        self.http.clone()
    }

    /// Run the gateway until shutdown is signalled.
    ///
    /// serenity reconnects shards by itself; if the client stops with an
    /// error it is rebuilt after a backoff delay.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match self.client.take() {
                Some(client) => client,
                None => match build_client(&self.token, self.events_tx.clone()).await {
                    Ok(client) => {
                        backoff = discord_backoff();
                        client
                    }
                    Err(e) => {
                        error!("Failed to rebuild Discord client: {}", e);
                        let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                        warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                        tokio::select! {
                            _ = sleep(delay) => continue,
                            _ = shutdown_rx.changed() => break,
                        }
                    }
                },
            };

            let shard_manager = client.shard_manager.clone();

            tokio::select! {
                result = client.start() => match result {
                    Ok(()) => {
                        info!("Discord client disconnected normally");
                        break;
                    }
                    Err(e) => {
                        error!("Discord client error: {}", e);
                        let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                        warn!(
                            "Discord disconnected. Reconnecting in {:.1}s...",
                            delay.as_secs_f64(),
                        );
                        tokio::select! {
                            _ = sleep(delay) => {}
                            _ = shutdown_rx.changed() => break,
                        }
                    }
                },
                _ = shutdown_rx.changed() => {
                    info!("Initiating graceful Discord shutdown...");
                    shard_manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                    break;
                }
            }
        }

        info!("Discord task ended");
    }
}
