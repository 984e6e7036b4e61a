//! Services: dated worship or study gatherings.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  believer::BelieverId,
  params::blank_as_none,
  patch::{merge, nullable},
};

/// Store-assigned identifier of a [`Service`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ServiceId(pub i64);

impl fmt::Display for ServiceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for ServiceId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> { s.parse().map(Self) }
}

// ─── ServiceType ─────────────────────────────────────────────────────────────

/// The closed set of gathering kinds. The lowercase name is both the JSON
/// representation and the value stored in the `service_type` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceType {
  /// Sunday worship.
  Sunday,
  /// Midweek study.
  Midweek,
}

impl ServiceType {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownServiceType(s.to_owned()))
  }
}

impl fmt::Display for ServiceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// A single dated gathering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
  pub id:               ServiceId,
  pub service_type:     ServiceType,
  pub service_date:     NaiveDate,
  /// Free-text time of day, e.g. `"10:00"`.
  pub service_time:     Option<String>,
  pub description:      Option<String>,
  /// Number of attendance records for this service; computed on read.
  pub attendance_count: u64,
}

/// Input to [`crate::store::RecordStore::add_service`].
#[derive(Debug, Clone)]
pub struct NewService {
  pub service_type: ServiceType,
  pub service_date: NaiveDate,
  pub service_time: Option<String>,
  pub description:  Option<String>,
}

impl NewService {
  pub fn new(service_type: ServiceType, service_date: NaiveDate) -> Self {
    Self { service_type, service_date, service_time: None, description: None }
  }
}

/// Partial update of a [`Service`]; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServicePatch {
  pub service_type: Option<ServiceType>,
  pub service_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "nullable")]
  pub service_time: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub description:  Option<Option<String>>,
}

impl ServicePatch {
  pub fn apply(self, service: &mut Service) {
    merge(&mut service.service_type, self.service_type);
    merge(&mut service.service_date, self.service_date);
    merge(&mut service.service_time, self.service_time);
    merge(&mut service.description, self.description);
  }
}

/// Filters for [`crate::store::RecordStore::list_services`]. Date bounds are
/// inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceQuery {
  #[serde(default, deserialize_with = "blank_as_none")]
  pub service_type: Option<ServiceType>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub from:         Option<NaiveDate>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub to:           Option<NaiveDate>,
}

// ─── Detail view ─────────────────────────────────────────────────────────────

/// A believer who attended a service, as listed in [`ServiceDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
  pub id:   BelieverId,
  pub name: String,
}

/// A service enriched with its attendee list. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDetail {
  #[serde(flatten)]
  pub service:   Service,
  pub attendees: Vec<Attendee>,
}
