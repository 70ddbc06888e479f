//! Passive keyword replies.
//!
//! Any message mentioning a hard feeling gets a quote back in the same chat.
//! Matching is plain substring search on the lowercased text, so "tiredness"
//! counts as "tired".

use teloxide::types::Message;

use crate::quotes::store::QuoteStore;

pub const KEYWORDS: [&str; 9] = [
    "sad",
    "depressed",
    "anxious",
    "anxiety",
    "panic",
    "stress",
    "lonely",
    "tired",
    "overwhelmed",
];

pub const KEYWORD_REPLY_PREFIX: &str = "💛 ";

/// What the reactor needs to know about an inbound message.
pub trait Inbound {
    fn text(&self) -> Option<&str>;
    fn is_bot_author(&self) -> bool;
    fn chat_id(&self) -> i64;
    fn message_id(&self) -> i32;
    fn sender_id(&self) -> Option<u64>;
}

impl Inbound for Message {
    fn text(&self) -> Option<&str> {
        Message::text(self)
    }

    fn is_bot_author(&self) -> bool {
        self.from.as_ref().is_some_and(|u| u.is_bot)
    }

    fn chat_id(&self) -> i64 {
        self.chat.id.0
    }

    fn message_id(&self) -> i32 {
        self.id.0
    }

    fn sender_id(&self) -> Option<u64> {
        self.from.as_ref().map(|u| u.id.0)
    }
}

pub fn mentions_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    KEYWORDS.iter().any(|k| lower.contains(*k))
}

/// The reply to send for `msg`, if it should get one.
pub fn react<M: Inbound + ?Sized>(msg: &M, store: &QuoteStore) -> Option<String> {
    if msg.is_bot_author() {
        return None;
    }
    let text = msg.text()?;
    if !mentions_keyword(text) {
        return None;
    }
    Some(format!("{KEYWORD_REPLY_PREFIX}{}", store.random_quote()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::testing::FakeMessage;
    use tempfile::TempDir;

    #[test]
    fn test_mentions_keyword() {
        assert!(mentions_keyword("I feel really anxious today"));
        assert!(mentions_keyword("SO STRESSED"));
        assert!(mentions_keyword("the tiredness is real"));
        assert!(!mentions_keyword("I love sunny days"));
        assert!(!mentions_keyword(""));
    }

    #[test]
    fn test_react_keyword_reply() {
        let dir = TempDir::new().unwrap();
        let store = QuoteStore::open(dir.path().join("quotes.json"));

        let reply = react(&FakeMessage::group(7, "I feel really anxious today"), &store).unwrap();
        assert!(reply.starts_with(KEYWORD_REPLY_PREFIX));
        let quote = reply.strip_prefix(KEYWORD_REPLY_PREFIX).unwrap();
        assert!(store.snapshot().iter().any(|q| q == quote));
    }

    #[test]
    fn test_react_no_keyword() {
        let dir = TempDir::new().unwrap();
        let store = QuoteStore::open(dir.path().join("quotes.json"));

        assert_eq!(react(&FakeMessage::group(7, "I love sunny days"), &store), None);
    }

    #[test]
    fn test_react_ignores_bots_and_non_text() {
        let dir = TempDir::new().unwrap();
        let store = QuoteStore::open(dir.path().join("quotes.json"));

        let bot = FakeMessage::group(9, "so lonely").from_bot();
        assert_eq!(react(&bot, &store), None);

        let photo = FakeMessage::group(7, "").without_text();
        assert_eq!(react(&photo, &store), None);
    }
}
