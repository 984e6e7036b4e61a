//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`, which sorts and compares
//! correctly as text. Timestamps are stored as RFC 3339 strings. Service types
//! are stored as their lowercase names.

use chrono::{DateTime, NaiveDate, Utc};
use flock_core::{
  attendance::{Attendance, AttendanceId},
  believer::{Believer, BelieverId},
  service::{Service, ServiceId, ServiceType},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ServiceType ─────────────────────────────────────────────────────────────

pub fn encode_service_type(t: ServiceType) -> &'static str { t.as_str() }

pub fn decode_service_type(s: &str) -> Result<ServiceType> {
  Ok(ServiceType::parse(s)?)
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub const BELIEVER_COLUMNS: &str =
  "id, first_name, last_name, email, phone, address, date_joined, is_active";

/// Undecoded `believers` row.
pub struct RawBeliever {
  pub id:          i64,
  pub first_name:  String,
  pub last_name:   String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub address:     Option<String>,
  pub date_joined: String,
  pub is_active:   bool,
}

impl RawBeliever {
  /// Map a row selected with [`BELIEVER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      first_name:  row.get(1)?,
      last_name:   row.get(2)?,
      email:       row.get(3)?,
      phone:       row.get(4)?,
      address:     row.get(5)?,
      date_joined: row.get(6)?,
      is_active:   row.get(7)?,
    })
  }

  pub fn into_believer(self) -> Result<Believer> {
    Ok(Believer {
      id:          BelieverId(self.id),
      first_name:  self.first_name,
      last_name:   self.last_name,
      email:       self.email,
      phone:       self.phone,
      address:     self.address,
      date_joined: decode_date(&self.date_joined)?,
      is_active:   self.is_active,
    })
  }
}

/// Selects every service column plus the computed attendance count; the
/// table alias must be `s`.
pub const SERVICE_COLUMNS: &str =
  "s.id, s.service_type, s.service_date, s.service_time, s.description,
   (SELECT COUNT(*) FROM attendance a WHERE a.service_id = s.id)";

/// Undecoded `services` row with its attendance count.
pub struct RawService {
  pub id:               i64,
  pub service_type:     String,
  pub service_date:     String,
  pub service_time:     Option<String>,
  pub description:      Option<String>,
  pub attendance_count: i64,
}

impl RawService {
  /// Map a row selected with [`SERVICE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      service_type:     row.get(1)?,
      service_date:     row.get(2)?,
      service_time:     row.get(3)?,
      description:      row.get(4)?,
      attendance_count: row.get(5)?,
    })
  }

  pub fn into_service(self) -> Result<Service> {
    Ok(Service {
      id:               ServiceId(self.id),
      service_type:     decode_service_type(&self.service_type)?,
      service_date:     decode_date(&self.service_date)?,
      service_time:     self.service_time,
      description:      self.description,
      attendance_count: count(self.attendance_count),
    })
  }
}

pub const ATTENDANCE_COLUMNS: &str =
  "id, believer_id, service_id, attended_at, notes";

/// Undecoded `attendance` row.
pub struct RawAttendance {
  pub id:          i64,
  pub believer_id: i64,
  pub service_id:  i64,
  pub attended_at: String,
  pub notes:       Option<String>,
}

impl RawAttendance {
  /// Map a row selected with [`ATTENDANCE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      believer_id: row.get(1)?,
      service_id:  row.get(2)?,
      attended_at: row.get(3)?,
      notes:       row.get(4)?,
    })
  }

  pub fn into_attendance(self) -> Result<Attendance> {
    Ok(Attendance {
      id:          AttendanceId(self.id),
      believer_id: BelieverId(self.believer_id),
      service_id:  ServiceId(self.service_id),
      attended_at: decode_dt(&self.attended_at)?,
      notes:       self.notes,
    })
  }
}

/// Convert a SQL `COUNT(*)` into an unsigned count.
pub fn count(n: i64) -> u64 { n.max(0) as u64 }
