//! Message types passed between the chat adapter and the dispatcher.

/// A chat message delivered by the gateway.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel the message was posted in.
    pub channel_id: u64,
    /// Author's user name.
    pub user: String,
    /// Message text, HTML-entity escaped (`&`, `<`, `>`).
    pub text: String,
}

/// Reply assembled for a single message.
///
/// Blank fragments are dropped on insert, so rendering never produces an
/// empty line between lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    fragments: Vec<String>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment unless it is blank.
    pub fn push(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if !fragment.trim().is_empty() {
            self.fragments.push(fragment);
        }
    }

    /// Returns true if nothing should be posted.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Join the fragments with newlines.
    pub fn render(&self) -> String {
        self.fragments.join("\n")
    }
}
