//! Handlers for `/statistics` endpoints. All figures are computed on read.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/statistics/dashboard` | Optional `as_of=YYYY-MM-DD` |
//! | `GET`  | `/statistics/attendance-trends` | Optional `as_of=YYYY-MM-DD` |
//! | `GET`  | `/statistics/top-attendees` | Optional `limit` (default 10, negative = all) |

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use flock_core::{
  stats::{AttendanceTrends, DEFAULT_TOP_ATTENDEES, DashboardSummary, TopAttendee},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{error::ApiError, extract::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct AsOfParams {
  /// Reference date for the reporting windows. Defaults to today (UTC).
  pub as_of: Option<NaiveDate>,
}

/// `GET /statistics/dashboard`
pub async fn dashboard<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<AsOfParams>,
) -> Result<Json<DashboardSummary>, ApiError> {
  let summary = store.dashboard(params.as_of).await.map_err(ApiError::store)?;
  Ok(Json(summary))
}

/// `GET /statistics/attendance-trends`
pub async fn attendance_trends<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<AsOfParams>,
) -> Result<Json<AttendanceTrends>, ApiError> {
  let trends = store
    .attendance_trends(params.as_of)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(trends))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
  /// Kept as raw text: anything that is not an integer falls back to the
  /// default, and a negative value lifts the cap.
  pub limit: Option<String>,
}

impl TopParams {
  fn limit(&self) -> usize {
    match self.limit.as_deref().map(str::trim).map(str::parse::<i64>) {
      Some(Ok(n)) => usize::try_from(n).unwrap_or(usize::MAX),
      _ => DEFAULT_TOP_ATTENDEES,
    }
  }
}

/// `GET /statistics/top-attendees[?limit=N]`
pub async fn top_attendees<S: RecordStore>(
  State(store): State<Arc<S>>,
  ApiQuery(params): ApiQuery<TopParams>,
) -> Result<Json<Vec<TopAttendee>>, ApiError> {
  let ranked = store
    .top_attendees(params.limit())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ranked))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn limit(raw: Option<&str>) -> usize {
    TopParams { limit: raw.map(str::to_owned) }.limit()
  }

  #[test]
  fn limit_falls_back_to_default() {
    assert_eq!(limit(None), DEFAULT_TOP_ATTENDEES);
    assert_eq!(limit(Some("")), DEFAULT_TOP_ATTENDEES);
    assert_eq!(limit(Some("abc")), DEFAULT_TOP_ATTENDEES);
    assert_eq!(limit(Some("2.5")), DEFAULT_TOP_ATTENDEES);
  }

  #[test]
  fn negative_limit_is_unbounded() {
    assert_eq!(limit(Some("-1")), usize::MAX);
    assert_eq!(limit(Some("0")), 0);
    assert_eq!(limit(Some("3")), 3);
  }
}
