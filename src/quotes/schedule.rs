//! Daily morning and evening posts.
//!
//! Fire times are cron expressions evaluated in UK civil time, so 09:00 stays
//! 09:00 on the wall clock across daylight-saving changes.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::quotes::outbox::Outbox;
use crate::quotes::store::QuoteStore;

pub const TIMEZONE: Tz = chrono_tz::Europe::London;

/// One of the two daily posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyPost {
    Morning,
    Evening,
}

impl DailyPost {
    pub const ALL: [DailyPost; 2] = [DailyPost::Morning, DailyPost::Evening];

    /// Seven-field cron expression: sec min hour day month dow year.
    pub fn cron(self) -> &'static str {
        match self {
            Self::Morning => "0 0 9 * * * *",
            Self::Evening => "0 0 21 * * * *",
        }
    }

    fn greeting(self) -> &'static str {
        match self {
            Self::Morning => "🌅 Good morning! Here's your daily reminder:",
            Self::Evening => "🌙 Good evening! Before you rest, remember:",
        }
    }

    pub fn message(self, quote: &str) -> String {
        format!("@here {}\n> {}", self.greeting(), quote)
    }

    /// First fire time strictly after `after`.
    pub fn next_fire(self, after: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>, String> {
        let schedule = Schedule::from_str(self.cron()).map_err(|e| format!("Invalid cron: {}", e))?;
        schedule
            .after(&after.with_timezone(&tz))
            .next()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| "No future occurrence for cron".to_string())
    }
}

/// Running daily post tasks. Dropping this stops them.
pub struct DailyPosts {
    tasks: Vec<JoinHandle<()>>,
}

impl DailyPosts {
    /// Arm both posts for `chat_id`.
    pub fn start<O: Outbox + 'static>(outbox: Arc<O>, store: Arc<QuoteStore>, chat_id: i64) -> Self {
        let tasks = DailyPost::ALL
            .into_iter()
            .map(|post| {
                let outbox = outbox.clone();
                let store = store.clone();
                tokio::spawn(run(post, outbox, store, chat_id))
            })
            .collect();
        info!("Daily posts armed for chat {} ({})", chat_id, TIMEZONE);
        Self { tasks }
    }
}

impl Drop for DailyPosts {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn run<O: Outbox>(post: DailyPost, outbox: Arc<O>, store: Arc<QuoteStore>, chat_id: i64) {
    let mut last = Utc::now();
    loop {
        // never schedule behind the clock, e.g. after a suspend
        let after = last.max(Utc::now());
        let next = match post.next_fire(after, TIMEZONE) {
            Ok(next) => next,
            Err(e) => {
                warn!("Failed to compute next {:?} post: {}", post, e);
                return;
            }
        };
        debug!("Next {:?} post at {}", post, next.with_timezone(&TIMEZONE));

        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;
        last = next;

        fire(post, outbox.as_ref(), &store, chat_id).await;
    }
}

/// Send one post now, or nothing if the chat cannot be resolved.
pub async fn fire<O: Outbox + ?Sized>(post: DailyPost, outbox: &O, store: &QuoteStore, chat_id: i64) {
    if !outbox.chat_exists(chat_id).await {
        debug!("Skipping {:?} post, chat {} not available", post, chat_id);
        return;
    }
    let text = post.message(&store.random_quote());
    match outbox.send_message(chat_id, &text, None).await {
        Ok(msg_id) => info!("Sent {:?} post to chat {} (msg {})", post, chat_id, msg_id),
        Err(e) => warn!("Failed to send {:?} post: {}", post, e),
    }
}
