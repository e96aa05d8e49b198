use std::sync::Arc;

use tracing::info;

use crate::{
    domain::{ChatId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// Sends plain-text notifications to the single configured chat.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Any messenger failure comes back as [`Error::Sending`].
    pub async fn send(&self, text: &str) -> Result<MessageRef> {
        let max_len = self.messenger.capabilities().max_message_len;
        let text = truncate(text, max_len);

        info!("Sending message to chat {}: \"{text}\"", self.chat_id.0);
        match self.messenger.send_text(self.chat_id, &text).await {
            Ok(msg) => {
                info!("Message {} delivered", msg.message_id.0);
                Ok(msg)
            }
            Err(e) => Err(Error::Sending {
                reason: e.to_string(),
            }),
        }
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if max_len < 3 {
        return text.chars().take(max_len).collect();
    }
    format!("{}...", text.chars().take(max_len - 3).collect::<String>())
}
