//! In-memory stand-ins for the chat platform.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::quotes::outbox::Outbox;
use crate::quotes::reactor::Inbound;

pub const GROUP_CHAT: i64 = -100_200_300;

/// One delivery recorded by [`FakeOutbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Chat { chat_id: i64, text: String, reply_to: Option<i32> },
    Direct { user_id: u64, text: String },
}

pub struct FakeOutbox {
    pub resolvable: bool,
    pub direct_open: bool,
    sent: Mutex<Vec<Sent>>,
}

impl FakeOutbox {
    pub fn new() -> Self {
        Self { resolvable: true, direct_open: true, sent: Mutex::new(Vec::new()) }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbox for FakeOutbox {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i32>,
    ) -> Result<i32, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Chat { chat_id, text: text.to_string(), reply_to: reply_to_message_id });
        Ok(sent.len() as i32)
    }

    async fn send_direct(&self, user_id: u64, text: &str) -> Result<i32, String> {
        if !self.direct_open {
            return Err("Forbidden: bot can't initiate conversation with a user".to_string());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Direct { user_id, text: text.to_string() });
        Ok(sent.len() as i32)
    }

    async fn chat_exists(&self, _chat_id: i64) -> bool {
        self.resolvable
    }
}

pub struct FakeMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: Option<u64>,
    pub from_bot: bool,
    pub text: Option<String>,
}

impl FakeMessage {
    /// A message from user `sender_id` in [`GROUP_CHAT`].
    pub fn group(sender_id: u64, text: &str) -> Self {
        Self {
            chat_id: GROUP_CHAT,
            message_id: 41,
            sender_id: Some(sender_id),
            from_bot: false,
            text: Some(text.to_string()),
        }
    }

    /// A message in the sender's private chat with the bot.
    pub fn private(sender_id: u64, text: &str) -> Self {
        Self { chat_id: sender_id as i64, ..Self::group(sender_id, text) }
    }

    pub fn from_bot(mut self) -> Self {
        self.from_bot = true;
        self
    }

    pub fn without_text(mut self) -> Self {
        self.text = None;
        self
    }
}

impl Inbound for FakeMessage {
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn is_bot_author(&self) -> bool {
        self.from_bot
    }

    fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn message_id(&self) -> i32 {
        self.message_id
    }

    fn sender_id(&self) -> Option<u64> {
        self.sender_id
    }
}
