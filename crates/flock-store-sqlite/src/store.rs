//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use flock_core::{
  attendance::{Attendance, AttendanceId, AttendanceQuery, NewAttendance},
  believer::{Believer, BelieverDetail, BelieverId, BelieverPatch, NewBeliever},
  service::{NewService, Service, ServiceDetail, ServiceId, ServicePatch, ServiceQuery},
  stats::{AttendanceTrends, DashboardSummary, TopAttendee},
  store::RecordStore,
};
use tracing::debug;

use crate::{Result, queries, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Flock record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread. Domain errors raised inside `f` come
  /// back unchanged.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

fn today() -> NaiveDate { Utc::now().date_naive() }

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Believers ─────────────────────────────────────────────────────────────

  async fn add_believer(&self, input: NewBeliever) -> Result<Believer> {
    let date_joined = input.date_joined.unwrap_or_else(today);
    self
      .run(move |conn| queries::insert_believer(conn, input, date_joined))
      .await
  }

  async fn get_believer(&self, id: BelieverId) -> Result<Option<Believer>> {
    self.run(move |conn| queries::fetch_believer(conn, id)).await
  }

  async fn list_believers(&self, include_inactive: bool) -> Result<Vec<Believer>> {
    self
      .run(move |conn| queries::list_believers(conn, include_inactive))
      .await
  }

  async fn update_believer(&self, id: BelieverId, patch: BelieverPatch) -> Result<Believer> {
    self
      .run(move |conn| queries::update_believer(conn, id, patch))
      .await
  }

  async fn delete_believer(&self, id: BelieverId) -> Result<()> {
    let removed = self.run(move |conn| queries::delete_believer(conn, id)).await?;
    debug!(believer_id = %id, attendance_removed = removed, "deleted believer");
    Ok(())
  }

  async fn believer_detail(&self, id: BelieverId) -> Result<Option<BelieverDetail>> {
    self.run(move |conn| queries::believer_detail(conn, id)).await
  }

  // ── Services ──────────────────────────────────────────────────────────────

  async fn add_service(&self, input: NewService) -> Result<Service> {
    self.run(move |conn| queries::insert_service(conn, input)).await
  }

  async fn get_service(&self, id: ServiceId) -> Result<Option<Service>> {
    self.run(move |conn| queries::fetch_service(conn, id)).await
  }

  async fn list_services(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
    let query = query.clone();
    self.run(move |conn| queries::list_services(conn, query)).await
  }

  async fn update_service(&self, id: ServiceId, patch: ServicePatch) -> Result<Service> {
    self
      .run(move |conn| queries::update_service(conn, id, patch))
      .await
  }

  async fn delete_service(&self, id: ServiceId) -> Result<()> {
    let removed = self.run(move |conn| queries::delete_service(conn, id)).await?;
    debug!(service_id = %id, attendance_removed = removed, "deleted service");
    Ok(())
  }

  async fn service_detail(&self, id: ServiceId) -> Result<Option<ServiceDetail>> {
    self.run(move |conn| queries::service_detail(conn, id)).await
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn record_attendance(&self, input: NewAttendance) -> Result<Attendance> {
    let attended_at = Utc::now();
    self
      .run(move |conn| queries::insert_attendance(conn, input, attended_at))
      .await
  }

  async fn list_attendance(&self, query: &AttendanceQuery) -> Result<Vec<Attendance>> {
    let query = query.clone();
    self.run(move |conn| queries::list_attendance(conn, query)).await
  }

  async fn delete_attendance(&self, id: AttendanceId) -> Result<()> {
    self.run(move |conn| queries::delete_attendance(conn, id)).await
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn dashboard(&self, as_of: Option<NaiveDate>) -> Result<DashboardSummary> {
    let as_of = as_of.unwrap_or_else(today);
    self.run(move |conn| queries::dashboard(conn, as_of)).await
  }

  async fn attendance_trends(&self, as_of: Option<NaiveDate>) -> Result<AttendanceTrends> {
    let as_of = as_of.unwrap_or_else(today);
    self
      .run(move |conn| queries::attendance_trends(conn, as_of))
      .await
  }

  async fn top_attendees(&self, limit: usize) -> Result<Vec<TopAttendee>> {
    self.run(move |conn| queries::top_attendees(conn, limit)).await
  }
}
