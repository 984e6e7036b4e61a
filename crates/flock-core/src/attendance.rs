//! Attendance: the association between a believer and a service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{believer::BelieverId, params::blank_as_none, service::ServiceId};

/// Store-assigned identifier of an [`Attendance`] record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AttendanceId(pub i64);

impl fmt::Display for AttendanceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A record that a believer attended a service. At most one exists per
/// (believer, service) pair. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
  pub id:          AttendanceId,
  pub believer_id: BelieverId,
  pub service_id:  ServiceId,
  /// Server-assigned timestamp; never changes after creation.
  pub attended_at: DateTime<Utc>,
  pub notes:       Option<String>,
}

/// Input to [`crate::store::RecordStore::record_attendance`].
/// `attended_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewAttendance {
  pub believer_id: BelieverId,
  pub service_id:  ServiceId,
  pub notes:       Option<String>,
}

impl NewAttendance {
  pub fn new(believer_id: BelieverId, service_id: ServiceId) -> Self {
    Self { believer_id, service_id, notes: None }
  }
}

/// Filters for [`crate::store::RecordStore::list_attendance`]; both are
/// optional and combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
  #[serde(default, deserialize_with = "blank_as_none")]
  pub service_id:  Option<ServiceId>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub believer_id: Option<BelieverId>,
}
