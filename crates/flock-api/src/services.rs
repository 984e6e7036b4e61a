//! Handlers for `/services` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/services` | Newest first; optional `service_type`, `from`, `to` |
//! | `POST`   | `/services` | Body: [`CreateBody`] |
//! | `GET`    | `/services/{id}` | Record plus `attendees`; 404 if not found |
//! | `PUT`    | `/services/{id}` | Body: [`ServicePatch`] |
//! | `DELETE` | `/services/{id}` | Also deletes the service's attendance |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use flock_core::{
  service::{NewService, Service, ServiceDetail, ServiceId, ServicePatch, ServiceQuery, ServiceType},
  store::RecordStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /services[?service_type=sunday|midweek][&from=YYYY-MM-DD][&to=YYYY-MM-DD]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(query): ApiQuery<ServiceQuery>,
) -> Result<Json<Vec<Service>>, ApiError> {
  let services = store.list_services(&query).await.map_err(ApiError::store)?;
  Ok(Json(services))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub service_type: ServiceType,
  /// `YYYY-MM-DD`.
  pub service_date: NaiveDate,
  pub service_time: Option<String>,
  pub description:  Option<String>,
}

impl From<CreateBody> for NewService {
  fn from(body: CreateBody) -> Self {
    Self {
      service_type: body.service_type,
      service_date: body.service_date,
      service_time: body.service_time,
      description:  body.description,
    }
  }
}

/// `POST /services`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let service = store.add_service(body.into()).await.map_err(ApiError::store)?;
  info!(
    service_id = %service.id,
    service_type = %service.service_type,
    date = %service.service_date,
    "scheduled service"
  );
  Ok((StatusCode::CREATED, Json(service)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /services/{id}`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<ServiceId>,
) -> Result<Json<ServiceDetail>, ApiError> {
  let detail = store
    .service_detail(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("service {id} not found")))?;
  Ok(Json(detail))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /services/{id}`
pub async fn update<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<ServiceId>,
  ApiJson(patch): ApiJson<ServicePatch>,
) -> Result<Json<Service>, ApiError> {
  let service = store
    .update_service(id, patch)
    .await
    .map_err(ApiError::store)?;
  info!(service_id = %id, "updated service");
  Ok(Json(service))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /services/{id}`
pub async fn delete_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<ServiceId>,
) -> Result<StatusCode, ApiError> {
  store.delete_service(id).await.map_err(ApiError::store)?;
  info!(service_id = %id, "deleted service and its attendance");
  Ok(StatusCode::NO_CONTENT)
}
