//! Derived statistics. Never stored; always computed from attendance rows.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap as _};
use strum::IntoEnumIterator as _;

use crate::{believer::BelieverId, service::ServiceType};

/// Services dated on or after `as_of - RECENT_SERVICE_WINDOW_DAYS` count as
/// recent on the dashboard.
pub const RECENT_SERVICE_WINDOW_DAYS: i64 = 30;

/// Attendance trends cover services dated on or after
/// `as_of - TREND_WINDOW_DAYS` (roughly six months).
pub const TREND_WINDOW_DAYS: i64 = 180;

pub const DEFAULT_TOP_ATTENDEES: usize = 10;

// ─── Result types ────────────────────────────────────────────────────────────

/// Attendance counts for a single believer.
///
/// Serialises flat: `{"total": 7, "sunday": 5, "midweek": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
  pub total:   u64,
  #[serde(flatten)]
  pub by_type: BTreeMap<ServiceType, u64>,
}

impl Default for AttendanceStats {
  fn default() -> Self { Self { total: 0, by_type: zeroed_by_type() } }
}

impl AttendanceStats {
  /// Build from per-type counts; types missing from `counts` report zero.
  pub fn from_counts(counts: impl IntoIterator<Item = (ServiceType, u64)>) -> Self {
    let mut stats = Self::default();
    for (ty, n) in counts {
      *stats.by_type.entry(ty).or_default() += n;
      stats.total += n;
    }
    stats
  }

  pub fn for_type(&self, ty: ServiceType) -> u64 {
    self.by_type.get(&ty).copied().unwrap_or(0)
  }
}

/// The dashboard summary.
///
/// Per-type service counts serialise as flat `<type>_services` fields:
/// `{"total_believers": 4, ..., "sunday_services": 2, "midweek_services": 1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
  /// Active believers only.
  pub total_believers:    u64,
  pub total_services:     u64,
  pub recent_services:    u64,
  /// Mean attendance per service, one decimal place.
  pub average_attendance: f64,
  #[serde(flatten)]
  pub services_by_type:   ServiceCounts,
}

/// Number of services of each type. Every type is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCounts(pub BTreeMap<ServiceType, u64>);

impl Default for ServiceCounts {
  fn default() -> Self { Self(zeroed_by_type()) }
}

impl ServiceCounts {
  pub fn get(&self, ty: ServiceType) -> u64 { self.0.get(&ty).copied().unwrap_or(0) }

  pub fn add(&mut self, ty: ServiceType, n: u64) { *self.0.entry(ty).or_default() += n; }

  fn key(ty: ServiceType) -> String { format!("{ty}_services") }
}

impl Serialize for ServiceCounts {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (ty, n) in &self.0 {
      map.serialize_entry(&Self::key(*ty), n)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for ServiceCounts {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = BTreeMap::<String, u64>::deserialize(deserializer)?;
    let mut counts = Self::default();
    for (key, n) in raw {
      let ty = key.strip_suffix("_services").and_then(|t| ServiceType::parse(t).ok());
      if let Some(ty) = ty {
        counts.0.insert(ty, n);
      }
    }
    Ok(counts)
  }
}

/// Attendance at services of one type within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
  pub year:  i32,
  pub month: u32,
  pub count: u64,
}

/// Monthly buckets per service type, chronological within each type.
/// Every service type is present, possibly with no buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceTrends(pub BTreeMap<ServiceType, Vec<TrendBucket>>);

impl Default for AttendanceTrends {
  fn default() -> Self {
    Self(ServiceType::iter().map(|ty| (ty, Vec::new())).collect())
  }
}

impl AttendanceTrends {
  pub fn buckets(&self, ty: ServiceType) -> &[TrendBucket] {
    self.0.get(&ty).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Append a bucket for `ty`. Callers push in chronological order.
  pub fn push(&mut self, ty: ServiceType, bucket: TrendBucket) {
    self.0.entry(ty).or_default().push(bucket);
  }
}

/// One row of the top-attendee ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopAttendee {
  pub id:               BelieverId,
  pub name:             String,
  pub attendance_count: u64,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A zero count for every service type.
pub fn zeroed_by_type() -> BTreeMap<ServiceType, u64> {
  ServiceType::iter().map(|ty| (ty, 0)).collect()
}

/// First day of a reporting window of `days` ending at `as_of`.
pub fn window_start(as_of: NaiveDate, days: i64) -> NaiveDate {
  as_of - Duration::days(days)
}

/// Mean of per-service attendance counts, rounded to one decimal place.
///
/// Every service contributes to the denominator, including those with no
/// attendance. An empty slice averages to `0.0`.
pub fn average_attendance(per_service: &[u64]) -> f64 {
  if per_service.is_empty() {
    return 0.0;
  }
  let sum: u64 = per_service.iter().sum();
  round_to_tenth(sum as f64 / per_service.len() as f64)
}

/// Round to one decimal place, ties to even.
///
/// Rounds the exact binary value of `x`, so `0.35` (stored just below the
/// half) becomes `0.3` while a true tie such as `0.25` becomes `0.2`.
pub fn round_to_tenth(x: f64) -> f64 { format!("{x:.1}").parse().unwrap_or(x) }

pub fn full_name(first: &str, last: &str) -> String { format!("{first} {last}") }
