//! Outbound side of the chat gateway.

use async_trait::async_trait;

/// What the bot needs from the chat platform to deliver quotes.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Send `text` to a chat, optionally threaded to a message. Returns the new message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i32>,
    ) -> Result<i32, String>;

    /// Send `text` to the private chat with `user_id`.
    async fn send_direct(&self, user_id: u64, text: &str) -> Result<i32, String>;

    /// Whether `chat_id` can currently be posted to.
    async fn chat_exists(&self, chat_id: i64) -> bool;
}
