//! Handlers for `/attendance` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/attendance` | Optional `service_id`, `believer_id` |
//! | `POST`   | `/attendance` | Body: [`CreateBody`]; 404 if either party is missing, 409 if already recorded |
//! | `DELETE` | `/attendance/{id}` | |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use flock_core::{
  attendance::{Attendance, AttendanceId, AttendanceQuery, NewAttendance},
  believer::BelieverId,
  service::ServiceId,
  store::RecordStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

/// `GET /attendance[?service_id=<id>][&believer_id=<id>]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
  let records = store.list_attendance(&query).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub believer_id: BelieverId,
  pub service_id:  ServiceId,
  pub notes:       Option<String>,
}

/// `POST /attendance`
pub async fn create<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewAttendance {
    notes: body.notes,
    ..NewAttendance::new(body.believer_id, body.service_id)
  };
  let record = store.record_attendance(input).await.map_err(ApiError::store)?;
  info!(
    attendance_id = %record.id,
    believer_id = %record.believer_id,
    service_id = %record.service_id,
    "recorded attendance"
  );
  Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /attendance/{id}`
pub async fn delete_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiPath(id): ApiPath<AttendanceId>,
) -> Result<StatusCode, ApiError> {
  store.delete_attendance(id).await.map_err(ApiError::store)?;
  info!(attendance_id = %id, "deleted attendance");
  Ok(StatusCode::NO_CONTENT)
}
