//! Supportive quotes - storage, selection and the three ways they get sent.

pub mod commands;
pub mod dispatch;
pub mod outbox;
pub mod reactor;
pub mod schedule;
pub mod selector;
pub mod store;

#[cfg(test)]
mod testing;

pub use commands::{Command, Reply};
pub use dispatch::handle_message;
pub use outbox::Outbox;
pub use reactor::{react, Inbound};
pub use schedule::{DailyPost, DailyPosts};
pub use store::{AddOutcome, QuoteStore, StoreError};
