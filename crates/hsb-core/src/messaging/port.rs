use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::MessagingCapabilities,
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; tests plug in in-memory recorders.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send `text` verbatim (no markup parsing).
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}
