//! Dispatch loop and reply posting.
//!
//! Messages are taken off the gateway channel one at a time; each is fully
//! processed, lookups included, before the next is read.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::bot::Dispatcher;
use crate::common::error::{DiscordError, DiscordResult};
use crate::common::IncomingMessage;

/// Discord's per-message character limit.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Escape `&`, `<` and `>` as HTML entities.
///
/// Reference extraction works on entity-escaped text, so raw gateway text is
/// normalised here.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Split a reply into chunks no longer than `limit` characters, breaking at
/// line boundaries where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Destination for replies.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn post(&self, channel_id: u64, text: &str) -> DiscordResult<()>;
}

/// Posts replies to Discord as the bot user.
pub struct DiscordReplySink {
    http: Arc<Http>,
}

impl DiscordReplySink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReplySink for DiscordReplySink {
    async fn post(&self, channel_id: u64, text: &str) -> DiscordResult<()> {
        let channel = ChannelId::new(channel_id);
        for chunk in split_message(text, DISCORD_MESSAGE_LIMIT) {
            channel
                .say(&self.http, chunk)
                .await
                .map_err(|source| DiscordError::SendFailed { channel_id, source })?;
        }
        Ok(())
    }
}

/// Consume incoming messages until the channel closes.
///
/// A failed lookup or post is logged and never ends the loop.
pub async fn run_dispatch_loop<S: ReplySink>(
    mut events_rx: mpsc::UnboundedReceiver<IncomingMessage>,
    mut dispatcher: Dispatcher,
    sink: S,
) {
    while let Some(message) = events_rx.recv().await {
        debug!(
            "Message from {} in {}: {}",
            message.user, message.channel_id, message.text
        );

        let reply = dispatcher.process_message(&message.text).await;
        if reply.is_empty() {
            continue;
        }

        match sink.post(message.channel_id, &reply.render()).await {
            Ok(()) => info!(
                "Replied in {} with {} fragment(s)",
                message.channel_id,
                reply.fragments().len()
            ),
            Err(e) => error!("{}", e),
        }
    }

    info!("Dispatch loop ended");
}
