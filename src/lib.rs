pub mod config;
pub mod quotes;
pub mod telegram;
