//! School endpoints
//!
//! One path, dispatched on method:
//! - GET    /schools          list, newest first
//! - POST   /schools          create
//! - PUT    /schools          update (id in body)
//! - DELETE /schools?id=N     delete (id in query, or `{"id": N}` body)
//!
//! Input is validated before the pool is requested, so malformed requests
//! never touch the database.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::SchoolRepo;
use crate::http::error::{ApiError, QueryOp};
use crate::http::server::AppState;
use crate::models::{NewSchool, School, SchoolId, SchoolPayload, SchoolUpdate, ValidationError};

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i32,
    pub message: String,
}

/// Update/delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    id: Option<SchoolId>,
}

/// GET /schools - all schools, newest first
async fn list_schools(State(state): State<Arc<AppState>>) -> Result<Json<Vec<School>>, ApiError> {
    let pool = state.db.acquire().await?;
    let schools = SchoolRepo::new(&pool)
        .list()
        .await
        .map_err(ApiError::query(QueryOp::Fetch))?;

    Ok(Json(schools))
}

/// POST /schools - create a school
async fn create_school(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SchoolPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(payload) = payload?;
    let school = NewSchool::from_payload(payload)?;

    let pool = state.db.acquire().await?;
    let id = SchoolRepo::new(&pool)
        .create(&school)
        .await
        .map_err(ApiError::query(QueryOp::Add))?;

    tracing::info!(id, name = %school.name, "school added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "School added successfully".to_string(),
        }),
    ))
}

/// PUT /schools - replace a school's fields; image kept unless supplied
async fn update_school(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SchoolPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload?;
    let update = SchoolUpdate::from_payload(payload)?;

    let pool = state.db.acquire().await?;
    let affected = SchoolRepo::new(&pool)
        .update(&update)
        .await
        .map_err(ApiError::query(QueryOp::Update))?;

    if affected == 0 {
        tracing::debug!(id = update.id, "update matched no school");
    } else {
        tracing::info!(id = update.id, image_replaced = update.fields.image.is_some(), "school updated");
    }
    Ok(MessageResponse::new("School updated successfully"))
}

/// DELETE /schools - delete by id from the query string or JSON body
async fn delete_school(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteQuery>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = delete_target(query, &body)?;

    let pool = state.db.acquire().await?;
    let affected = SchoolRepo::new(&pool)
        .delete(id)
        .await
        .map_err(ApiError::query(QueryOp::Delete))?;

    if affected == 0 {
        tracing::debug!(id, "delete matched no school");
    } else {
        tracing::info!(id, "school deleted");
    }
    Ok(MessageResponse::new("School deleted successfully"))
}

/// Query parameter wins; an unreadable body counts as no id.
fn delete_target(query: DeleteQuery, body: &[u8]) -> Result<i32, ValidationError> {
    let from_query = query
        .id
        .filter(|id| !id.trim().is_empty())
        .map(SchoolId::Text);

    let id = match from_query {
        Some(id) => id,
        None => serde_json::from_slice::<DeleteBody>(body)
            .ok()
            .and_then(|b| b.id)
            .ok_or(ValidationError::MissingId)?,
    };

    id.resolve()
}

/// School routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/schools",
        get(list_schools)
            .post(create_school)
            .put(update_school)
            .delete(delete_school),
    )
}
