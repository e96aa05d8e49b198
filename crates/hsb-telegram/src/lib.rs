//! Telegram adapter (teloxide).
//!
//! This crate implements the `hsb-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::prelude::*;

use hsb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    /// `@username` of the bot, used for the startup banner.
    pub async fn username(&self) -> Result<String> {
        let me = self.bot.get_me().await.map_err(Self::map_err)?;
        Ok(format!("@{}", me.username()))
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_ids_map_one_to_one() {
        assert_eq!(
            TelegramMessenger::tg_chat(ChatId(-1001234)),
            teloxide::types::ChatId(-1001234)
        );
    }

    #[test]
    fn request_errors_map_to_external() {
        let err = TelegramMessenger::map_err(teloxide::RequestError::Api(
            teloxide::ApiError::BotBlocked,
        ));
        assert!(matches!(err, Error::External(ref m) if m.starts_with("telegram error:")));
    }
}
