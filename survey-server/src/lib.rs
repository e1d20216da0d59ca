//! survey-server: HTTP API for surveys
//!
//! Categories group questions, questions collect agree/disagree responses,
//! and every response mutation keeps a per-question statistic in step
//! within the same database transaction.

pub mod db;
pub mod http;
pub mod models;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
