/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml and the environment
pub mod settings;

/// Startup seeding of the bootstrap super-admin
pub mod bootstrap;

pub use settings::{AppConfig, LedgerPolicy, load_app_configuration};
