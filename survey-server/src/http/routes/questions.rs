//! Question endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Question, QuestionRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{double_option, EntityId, ValidJson};
use crate::http::server::AppState;
use crate::models::{QuestionPatch, QuestionText};
use super::categories::CategoryResponse;
use super::{rejected_body, MessageResponse};

/// Create question request
///
/// The text may arrive as `question` or as `text`.
#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub question: Option<String>,
    pub text: Option<String>,
    pub category_id: Option<i64>,
}

impl CreateQuestionRequest {
    /// The first non-blank of `question` and `text`.
    fn text(&self) -> &str {
        [self.question.as_deref(), self.text.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("")
    }
}

/// Update question request
#[derive(Deserialize)]
pub struct UpdateQuestionRequest {
    pub question: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
}

/// Question response with embedded category
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub question: String,
    pub category: Option<CategoryResponse>,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question: q.question,
            category: q.category.map(CategoryResponse::from),
        }
    }
}

/// GET /questions - list all questions
async fn list_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = QuestionRepo::new(&state.pool).list().await?;
    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

/// POST /questions - create a question
async fn create_question(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let text = QuestionText::new(req.text())?;
    let question = QuestionRepo::new(&state.pool)
        .create(text, req.category_id)
        .await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// GET /questions/{id} - get a single question
async fn get_question(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = QuestionRepo::new(&state.pool).get(id).await?;
    Ok(Json(QuestionResponse::from(question)))
}

/// PUT /questions/{id} - update text and/or category
async fn update_question(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    body: Result<ValidJson<UpdateQuestionRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = QuestionRepo::new(&state.pool);

    let patch = match body.and_then(|ValidJson(req)| {
        QuestionPatch::new(req.question.as_deref(), req.category_id).map_err(ApiError::from)
    }) {
        Ok(patch) => patch,
        Err(err) => return Err(rejected_body(repo.get(id), err).await),
    };
    repo.update(id, patch).await?;

    Ok(Json(MessageResponse::new("Question updated successfully")))
}

/// DELETE /questions/{id} - delete a question with its responses
async fn delete_question(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<MessageResponse>, ApiError> {
    QuestionRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new("Question deleted successfully")))
}

/// Question routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/", get(list_questions).post(create_question))
        .route(
            "/questions/{id}",
            get(get_question)
                .put(update_question)
                .delete(delete_question),
        )
}
