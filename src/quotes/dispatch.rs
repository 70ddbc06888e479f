//! Routing of one inbound message: keyword reply first, then commands.

use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::quotes::commands::{self, Command, Reply};
use crate::quotes::outbox::Outbox;
use crate::quotes::reactor::{react, Inbound};
use crate::quotes::store::QuoteStore;

/// Posted in the group when a private reply cannot be delivered.
pub const OPEN_CHAT_HINT: &str = "I couldn't reach you privately 💛 Please open a chat with me, then try again.";

pub async fn handle_message<M, O>(msg: &M, store: &QuoteStore, outbox: &O, bot_username: &str)
where
    M: Inbound + Sync + ?Sized,
    O: Outbox + ?Sized,
{
    let chat_id = msg.chat_id();

    // a message may both earn a keyword reply and be a command
    if let Some(reply) = react(msg, store) {
        info!("💛 Keyword reply in chat {}", chat_id);
        outbox.send_message(chat_id, &reply, None).await.ok();
    }

    if msg.is_bot_author() {
        return;
    }
    let Some(text) = msg.text() else {
        return;
    };
    let Ok(command) = Command::parse(text, bot_username) else {
        return;
    };
    let Some(user_id) = msg.sender_id() else {
        return;
    };
    info!("Command {:?} from user {} in chat {}", command, user_id, chat_id);

    match commands::handle(command, store).await {
        Reply::Public(reply) => {
            outbox.send_message(chat_id, &reply, Some(msg.message_id())).await.ok();
        }
        Reply::Private(reply) => {
            deliver_private(outbox, user_id, chat_id, msg.message_id(), &reply).await;
        }
    }
}

/// Send `text` to the requester only. If that is impossible, the group gets a
/// content-free hint instead of the reply itself.
async fn deliver_private<O: Outbox + ?Sized>(
    outbox: &O,
    user_id: u64,
    chat_id: i64,
    message_id: i32,
    text: &str,
) {
    if user_id as i64 == chat_id {
        outbox.send_message(chat_id, text, Some(message_id)).await.ok();
        return;
    }
    if let Err(e) = outbox.send_direct(user_id, text).await {
        info!("Cannot message user {} privately ({e}), posting hint in chat {}", user_id, chat_id);
        outbox.send_message(chat_id, OPEN_CHAT_HINT, Some(message_id)).await.ok();
    }
}
