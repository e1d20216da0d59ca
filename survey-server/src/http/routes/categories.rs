//! Category endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Category, CategoryRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{EntityId, ValidJson};
use crate::http::server::AppState;
use crate::models::CategoryName;
use super::{rejected_body, MessageResponse};

/// Create/rename category request
#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// Category response, also embedded in question responses
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

/// GET /categories - list all categories
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = CategoryRepo::new(&state.pool).list().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// POST /categories - create a category
async fn create_category(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let name = CategoryName::new(&req.name)?;
    let category = CategoryRepo::new(&state.pool).create(name).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// PUT /categories/{id} - rename a category
async fn update_category(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    body: Result<ValidJson<CategoryRequest>, ApiError>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let repo = CategoryRepo::new(&state.pool);

    let name = match body
        .and_then(|ValidJson(req)| CategoryName::new(&req.name).map_err(ApiError::from))
    {
        Ok(name) => name,
        Err(err) => return Err(rejected_body(repo.get(id), err).await),
    };
    let category = repo.update(id, name).await?;

    Ok(Json(CategoryResponse::from(category)))
}

/// DELETE /categories/{id} - delete a category, detaching its questions
async fn delete_category(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<MessageResponse>, ApiError> {
    CategoryRepo::new(&state.pool).delete(id).await?;
    Ok(Json(MessageResponse::new(format!("Category {} deleted", id))))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
}
