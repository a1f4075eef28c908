pub mod classifier;
pub mod config;
pub mod content;
pub mod history;
pub mod http;
pub mod message_log;
pub mod model;
pub mod modes;
pub mod places;
pub mod profile;
pub mod registry;
pub mod reminders;
pub mod session;
pub mod types;
