//! Response endpoints
//!
//! Listing returns the per-question statistics; mutations go through the
//! response repository, which keeps the statistics in step.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::repos::{QuestionRepo, ResponseRepo, Statistic, SurveyResponse};
use crate::http::error::ApiError;
use crate::http::extractors::{EntityId, ValidJson};
use crate::http::server::AppState;
use crate::models::ValidationError;
use super::{rejected_body, MessageResponse};

/// Create response request
///
/// `is_agree` is kept raw so a missing question can be reported before a
/// malformed answer.
#[derive(Deserialize)]
pub struct CreateResponseRequest {
    pub question_id: i64,
    pub is_agree: Option<Value>,
}

/// Update response request
#[derive(Deserialize)]
pub struct UpdateResponseRequest {
    pub is_agree: Option<Value>,
}

/// Read a JSON boolean answer.
fn parse_answer(value: Option<&Value>) -> Result<bool, ValidationError> {
    match value {
        Some(Value::Bool(answer)) => Ok(*answer),
        Some(Value::Null) | None => Err(ValidationError::Missing { field: "is_agree" }),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "is_agree",
            reason: "must be a boolean",
        }),
    }
}

/// Statistic of one question
#[derive(Debug, Serialize)]
pub struct StatisticResponse {
    pub question_id: i64,
    pub agree_count: i64,
    pub disagree_count: i64,
}

impl From<Statistic> for StatisticResponse {
    fn from(s: Statistic) -> Self {
        Self {
            question_id: s.question_id,
            agree_count: s.agree_count,
            disagree_count: s.disagree_count,
        }
    }
}

/// Single response
#[derive(Debug, Serialize)]
pub struct SurveyResponseBody {
    pub id: i64,
    pub question_id: i64,
    pub is_agree: bool,
}

impl From<SurveyResponse> for SurveyResponseBody {
    fn from(r: SurveyResponse) -> Self {
        Self {
            id: r.id,
            question_id: r.question_id,
            is_agree: r.is_agree,
        }
    }
}

/// Acknowledgement of a recorded response
#[derive(Debug, Serialize)]
pub struct ResponseCreated {
    pub message: String,
    pub id: i64,
}

/// GET /responses - statistics for every answered question
async fn list_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StatisticResponse>>, ApiError> {
    let stats = ResponseRepo::new(&state.pool).list_statistics().await?;
    Ok(Json(stats.into_iter().map(StatisticResponse::from).collect()))
}

/// POST /responses - record an answer
async fn create_response(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateResponseRequest>,
) -> Result<(StatusCode, Json<ResponseCreated>), ApiError> {
    let is_agree = match parse_answer(req.is_agree.as_ref()) {
        Ok(answer) => answer,
        Err(err) => {
            let questions = QuestionRepo::new(&state.pool);
            let question = questions.get(req.question_id);
            return Err(rejected_body(question, err.into()).await);
        }
    };

    let response = ResponseRepo::new(&state.pool)
        .create(req.question_id, is_agree)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResponseCreated {
            message: format!("Response to question {} recorded", response.question_id),
            id: response.id,
        }),
    ))
}

/// GET /responses/{id} - read back a single answer
async fn get_response(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<SurveyResponseBody>, ApiError> {
    let response = ResponseRepo::new(&state.pool).get(id).await?;
    Ok(Json(SurveyResponseBody::from(response)))
}

/// PUT /responses/{id} - change an answer
async fn update_response(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    body: Result<ValidJson<UpdateResponseRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ResponseRepo::new(&state.pool);

    let is_agree = match body.and_then(|ValidJson(req)| {
        parse_answer(req.is_agree.as_ref()).map_err(ApiError::from)
    }) {
        Ok(answer) => answer,
        Err(err) => return Err(rejected_body(repo.get(id), err).await),
    };
    repo.update(id, is_agree).await?;
    Ok(Json(MessageResponse::new(format!("Response {} updated", id))))
}

/// DELETE /responses/{id} - withdraw an answer
async fn delete_response(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<MessageResponse>, ApiError> {
    ResponseRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new(format!("Response {} deleted", id))))
}

/// Response routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/responses", get(list_statistics).post(create_response))
        .route("/responses/", get(list_statistics).post(create_response))
        .route(
            "/responses/{id}",
            get(get_response)
                .put(update_response)
                .delete(delete_response),
        )
}
