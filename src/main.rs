use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use kindwords::config::Config;
use kindwords::quotes::{self, DailyPosts, QuoteStore};
use kindwords::telegram::{with_retries, TelegramClient};

struct BotState {
    store: Arc<QuoteStore>,
    telegram: Arc<TelegramClient>,
    bot_username: String,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "kindwords.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kindwords: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("kindwords.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("kindwords: failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting kindwords...");
    info!("Loaded config from {config_path}");

    let bot = Bot::new(&config.telegram_bot_token);
    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    let store = Arc::new(QuoteStore::open(&config.quotes_path));

    // without the username, `/cmd@username` would never match
    let client = telegram.as_ref();
    let bot_username = match with_retries(5, Duration::from_secs(2), || client.username()).await {
        Ok(username) => username,
        Err(e) => {
            error!("Cannot reach Telegram, giving up: {e}");
            std::process::exit(1);
        }
    };
    telegram.register_commands().await.ok();

    // held for the life of the dispatcher; dropping it stops the posts
    let _daily_posts = match config.daily_chat_id {
        Some(chat_id) => Some(DailyPosts::start(telegram.clone(), store.clone(), chat_id)),
        None => {
            info!("Daily posts disabled (no daily_chat_id)");
            None
        }
    };

    let state = Arc::new(BotState {
        store,
        telegram,
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    quotes::handle_message(&msg, &state.store, state.telegram.as_ref(), &state.bot_username).await;
    Ok(())
}
