//! Command implementations for the survey CLI

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

/// Database used when neither --database-url nor DATABASE_URL is given
pub const DEFAULT_DATABASE_URL: &str = "sqlite://survey.db";
