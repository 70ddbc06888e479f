//! `/quote` and `/add_quote` command handling.

use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::quotes::store::{AddOutcome, QuoteStore};

pub const QUOTE_PREFIX: &str = "🌟 ";
pub const ADD_REJECTED: &str = "Please write a slightly longer quote 🙏";
pub const ADD_SAVED: &str = "Thanks! Your quote was saved permanently ✨";
pub const ADD_FAILED: &str = "Sorry, I couldn't save your quote just now. Please try again a bit later 💛";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Supportive quotes, on request:")]
pub enum Command {
    #[command(description = "get an encouraging quote")]
    Quote,
    #[command(description = "add your own quote (saved permanently)")]
    AddQuote(String),
}

/// Where a command reply goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Into the chat the command came from.
    Public(String),
    /// Only to the user who sent the command.
    Private(String),
}

pub async fn handle(command: Command, store: &QuoteStore) -> Reply {
    match command {
        Command::Quote => Reply::Public(format!("{QUOTE_PREFIX}{}", store.random_quote())),
        Command::AddQuote(text) => match store.add(&text).await {
            Ok(AddOutcome::Rejected) => Reply::Private(ADD_REJECTED.to_string()),
            Ok(AddOutcome::Added) => Reply::Private(ADD_SAVED.to_string()),
            Ok(AddOutcome::AlreadyPresent) => {
                info!("Quote already stored, nothing to write");
                Reply::Private(ADD_SAVED.to_string())
            }
            // already logged by the store; keep the detail away from users
            Err(_) => Reply::Private(ADD_FAILED.to_string()),
        },
    }
}
