//! Route handlers organized by resource

use std::future::Future;

use serde::Serialize;

use crate::db::repos::DbError;
use super::error::ApiError;

pub mod health;
pub mod categories;
pub mod questions;
pub mod responses;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error for a request whose body was rejected.
///
/// A missing target is reported ahead of the body problem, so the lookup
/// runs first and its error wins.
pub(crate) async fn rejected_body<T>(
    target: impl Future<Output = Result<T, DbError>>,
    body_error: ApiError,
) -> ApiError {
    match target.await {
        Ok(_) => body_error,
        Err(e) => e.into(),
    }
}
