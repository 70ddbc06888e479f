//! Telegram client using teloxide.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::quotes::Command;
use crate::quotes::outbox::Outbox;

/// Telegram API client.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Bot username, used to accept `/cmd@username`.
    pub async fn username(&self) -> Result<String, String> {
        let me = self.bot.get_me().await.map_err(|e| {
            let msg = format!("Failed to get bot info: {e}");
            warn!("{}", msg);
            msg
        })?;
        info!("Bot user ID: {}, username: @{}", me.id, me.username());
        Ok(me.username().to_string())
    }

    /// Publish the command list shown in Telegram's command menu.
    pub async fn register_commands(&self) -> Result<(), String> {
        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map_err(|e| {
                let msg = format!("Failed to register commands: {e}");
                warn!("{}", msg);
                msg
            })?;
        info!("Registered {} commands", Command::bot_commands().len());
        Ok(())
    }
}

#[async_trait]
impl Outbox for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i32>,
    ) -> Result<i32, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Telegram only allows this once the user has opened a chat with the bot.
    async fn send_direct(&self, user_id: u64, text: &str) -> Result<i32, String> {
        self.bot
            .send_message(ChatId(user_id as i64), text)
            .await
            .map(|msg| msg.id.0)
            .map_err(|e| format!("Failed to message user {user_id}: {e}"))
    }

    async fn chat_exists(&self, chat_id: i64) -> bool {
        match self.bot.get_chat(ChatId(chat_id)).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Chat {} not resolvable: {e}", chat_id);
                false
            }
        }
    }
}

/// Run `op` up to `attempts` times, waiting `delay * attempt` between tries.
pub async fn with_retries<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                tokio::time::sleep(delay * attempt).await;
                attempt += 1;
            }
        }
    }
}
