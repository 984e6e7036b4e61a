//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `flock-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  attendance::{Attendance, AttendanceId, AttendanceQuery, NewAttendance},
  believer::{Believer, BelieverDetail, BelieverId, BelieverPatch, NewBeliever},
  service::{NewService, Service, ServiceDetail, ServiceId, ServicePatch, ServiceQuery},
  stats::{AttendanceTrends, DashboardSummary, TopAttendee},
};

/// Abstraction over a Flock record store backend.
///
/// Every operation either fully succeeds or leaves the store unchanged.
/// Deleting a believer or a service also deletes the attendance records that
/// reference it.
///
/// Backend errors convert into [`crate::Error`] so callers can tell missing
/// resources and conflicts apart from storage failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Believers ─────────────────────────────────────────────────────────

  /// Register a believer. `date_joined` defaults to today (UTC).
  ///
  /// Fails with `DuplicateEmail` if another believer already has the email.
  fn add_believer(
    &self,
    input: NewBeliever,
  ) -> impl Future<Output = Result<Believer, Self::Error>> + Send + '_;

  /// Retrieve a believer by id, active or not. Returns `None` if not found.
  fn get_believer(
    &self,
    id: BelieverId,
  ) -> impl Future<Output = Result<Option<Believer>, Self::Error>> + Send + '_;

  /// List believers in registration order. Inactive believers are skipped
  /// unless `include_inactive` is set.
  fn list_believers(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<Believer>, Self::Error>> + Send + '_;

  /// Merge `patch` into an existing believer and return the result.
  fn update_believer(
    &self,
    id: BelieverId,
    patch: BelieverPatch,
  ) -> impl Future<Output = Result<Believer, Self::Error>> + Send + '_;

  /// Permanently delete a believer and all of their attendance records.
  fn delete_believer(
    &self,
    id: BelieverId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A believer with per-type attendance statistics. `None` if not found.
  fn believer_detail(
    &self,
    id: BelieverId,
  ) -> impl Future<Output = Result<Option<BelieverDetail>, Self::Error>> + Send + '_;

  // ── Services ──────────────────────────────────────────────────────────

  fn add_service(
    &self,
    input: NewService,
  ) -> impl Future<Output = Result<Service, Self::Error>> + Send + '_;

  fn get_service(
    &self,
    id: ServiceId,
  ) -> impl Future<Output = Result<Option<Service>, Self::Error>> + Send + '_;

  /// Services matching `query`, most recent date first.
  fn list_services<'a>(
    &'a self,
    query: &'a ServiceQuery,
  ) -> impl Future<Output = Result<Vec<Service>, Self::Error>> + Send + 'a;

  fn update_service(
    &self,
    id: ServiceId,
    patch: ServicePatch,
  ) -> impl Future<Output = Result<Service, Self::Error>> + Send + '_;

  /// Delete a service and all attendance records that reference it.
  fn delete_service(
    &self,
    id: ServiceId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A service with the names of everyone who attended. `None` if not found.
  fn service_detail(
    &self,
    id: ServiceId,
  ) -> impl Future<Output = Result<Option<ServiceDetail>, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Mark a believer as present at a service.
  ///
  /// Fails with `BelieverNotFound`/`ServiceNotFound` if either party is
  /// missing and with `DuplicateAttendance` if the pair is already recorded;
  /// nothing is written in either case.
  fn record_attendance(
    &self,
    input: NewAttendance,
  ) -> impl Future<Output = Result<Attendance, Self::Error>> + Send + '_;

  /// Attendance records matching `query`, in recording order.
  fn list_attendance<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<Attendance>, Self::Error>> + Send + 'a;

  fn delete_attendance(
    &self,
    id: AttendanceId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Dashboard summary relative to `as_of` (defaults to today, UTC).
  fn dashboard(
    &self,
    as_of: Option<NaiveDate>,
  ) -> impl Future<Output = Result<DashboardSummary, Self::Error>> + Send + '_;

  /// Monthly attendance per service type over the trend window ending at
  /// `as_of` (defaults to today, UTC).
  fn attendance_trends(
    &self,
    as_of: Option<NaiveDate>,
  ) -> impl Future<Output = Result<AttendanceTrends, Self::Error>> + Send + '_;

  /// Active believers ranked by attendance count, highest first. Ties go to
  /// the lower believer id. Believers with no attendance are not ranked.
  fn top_attendees(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TopAttendee>, Self::Error>> + Send + '_;
}
