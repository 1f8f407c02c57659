pub mod catalog;
pub mod config;
pub mod difficulty_sync;
pub mod health;
pub mod logger;
pub mod monitor;
pub mod pagination;
pub mod purge;
pub mod reminder;
pub mod score_range;
