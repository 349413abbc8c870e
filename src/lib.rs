//! 抖音短链解析中转

pub mod client;
pub mod config;
pub mod resolver;
pub mod state;
pub mod web;

pub use config::Config;
pub use state::AppState;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
