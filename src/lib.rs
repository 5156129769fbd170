pub mod commands;
pub mod config;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::config::ClientConfig;
pub use crate::core::registry::AppRegistry;
pub use crate::models::error::SError;
