//! Handlers for `/believers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/believers` | Active only; `?include_inactive=true` lists everyone |
//! | `POST`   | `/believers` | Body: [`CreateBody`]; 409 on a duplicate email |
//! | `GET`    | `/believers/{id}` | Record plus attendance `stats`; 404 if not found |
//! | `PUT`    | `/believers/{id}` | Body: [`BelieverPatch`]; only supplied fields change |
//! | `DELETE` | `/believers/{id}` | Also deletes the believer's attendance |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use flock_core::{
  believer::{Believer, BelieverDetail, BelieverId, BelieverPatch, NewBeliever},
  store::RecordStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /believers[?include_inactive=true]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Believer>>, ApiError> {
  let believers = store
    .list_believers(params.include_inactive)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(believers))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub first_name:  String,
  pub last_name:   String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub address:     Option<String>,
  /// `YYYY-MM-DD`; defaults to today.
  pub date_joined: Option<NaiveDate>,
}

impl From<CreateBody> for NewBeliever {
  fn from(body: CreateBody) -> Self {
    Self {
      first_name:  body.first_name,
      last_name:   body.last_name,
      email:       body.email,
      phone:       body.phone,
      address:     body.address,
      date_joined: body.date_joined,
    }
  }
}

/// `POST /believers`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
    return Err(ApiError::BadRequest("first_name and last_name are required".into()));
  }
  let believer = store
    .add_believer(body.into())
    .await
    .map_err(ApiError::store)?;
  info!(believer_id = %believer.id, "registered believer");
  Ok((StatusCode::CREATED, Json(believer)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /believers/{id}`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<BelieverId>,
) -> Result<Json<BelieverDetail>, ApiError> {
  let detail = store
    .believer_detail(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("believer {id} not found")))?;
  Ok(Json(detail))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /believers/{id}`
pub async fn update<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<BelieverId>,
  ApiJson(patch): ApiJson<BelieverPatch>,
) -> Result<Json<Believer>, ApiError> {
  let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
  if blank(&patch.first_name) || blank(&patch.last_name) {
    return Err(ApiError::BadRequest("names cannot be blank".into()));
  }
  if patch.is_empty() {
    let believer = store
      .get_believer(id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("believer {id} not found")))?;
    return Ok(Json(believer));
  }
  let believer = store
    .update_believer(id, patch)
    .await
    .map_err(ApiError::store)?;
  info!(believer_id = %id, "updated believer");
  Ok(Json(believer))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /believers/{id}`
pub async fn delete_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<BelieverId>,
) -> Result<StatusCode, ApiError> {
  store.delete_believer(id).await.map_err(ApiError::store)?;
  info!(believer_id = %id, "deleted believer and their attendance");
  Ok(StatusCode::NO_CONTENT)
}
