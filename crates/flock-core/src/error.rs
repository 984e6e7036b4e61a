//! Error types for `flock-core`.

use thiserror::Error;

use crate::{attendance::AttendanceId, believer::BelieverId, service::ServiceId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("believer not found: {0}")]
  BelieverNotFound(BelieverId),

  #[error("service not found: {0}")]
  ServiceNotFound(ServiceId),

  #[error("attendance not found: {0}")]
  AttendanceNotFound(AttendanceId),

  #[error("attendance already recorded for believer {believer_id} at service {service_id}")]
  DuplicateAttendance {
    believer_id: BelieverId,
    service_id:  ServiceId,
  },

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("unknown service type: {0:?}")]
  UnknownServiceType(String),

  /// A failure inside the storage backend that is not part of the domain
  /// taxonomy (I/O, SQL, row decoding).
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::BelieverNotFound(_) | Self::ServiceNotFound(_) | Self::AttendanceNotFound(_)
    )
  }

  pub fn is_conflict(&self) -> bool {
    matches!(self, Self::DuplicateAttendance { .. } | Self::DuplicateEmail(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
