//! Synchronous query bodies executed on the `tokio_rusqlite` connection
//! thread.
//!
//! Every function that reads before it writes opens its own transaction, so
//! the check and the write are atomic. Returning early with an error drops the
//! transaction, which rolls it back.

use chrono::{DateTime, NaiveDate, Utc};
use flock_core::{
  Error as CoreError,
  attendance::{Attendance, AttendanceId, AttendanceQuery, NewAttendance},
  believer::{Believer, BelieverDetail, BelieverId, BelieverPatch, NewBeliever},
  patch::non_blank,
  service::{
    Attendee, NewService, Service, ServiceDetail, ServiceId, ServicePatch,
    ServiceQuery,
  },
  stats::{
    AttendanceStats, AttendanceTrends, DashboardSummary, RECENT_SERVICE_WINDOW_DAYS,
    ServiceCounts, TREND_WINDOW_DAYS, TopAttendee, TrendBucket, average_attendance,
    full_name, window_start,
  },
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  encode::{
    ATTENDANCE_COLUMNS, BELIEVER_COLUMNS, RawAttendance, RawBeliever, RawService,
    SERVICE_COLUMNS, count, decode_service_type, encode_date, encode_dt,
    encode_service_type,
  },
};

// ─── Shared lookups ──────────────────────────────────────────────────────────

fn row_exists(conn: &Connection, table: &'static str, id: i64) -> Result<bool> {
  let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
  Ok(conn.query_row(&sql, params![id], |_| Ok(())).optional()?.is_some())
}

/// Is `email` registered to any believer other than `except`?
fn email_taken(conn: &Connection, email: &str, except: Option<BelieverId>) -> Result<bool> {
  let hit = conn
    .query_row(
      "SELECT 1 FROM believers WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
      params![email, except.map(|id| id.0)],
      |_| Ok(()),
    )
    .optional()?;
  Ok(hit.is_some())
}

// ─── Believers ───────────────────────────────────────────────────────────────

pub fn fetch_believer(conn: &Connection, id: BelieverId) -> Result<Option<Believer>> {
  let sql = format!("SELECT {BELIEVER_COLUMNS} FROM believers WHERE id = ?1");
  conn
    .query_row(&sql, params![id.0], RawBeliever::from_row)
    .optional()?
    .map(RawBeliever::into_believer)
    .transpose()
}

pub fn insert_believer(
  conn: &mut Connection,
  mut input: NewBeliever,
  date_joined: NaiveDate,
) -> Result<Believer> {
  input.email = non_blank(input.email);
  input.phone = non_blank(input.phone);
  input.address = non_blank(input.address);

  let tx = conn.transaction()?;

  if let Some(email) = input.email.as_deref()
    && email_taken(&tx, email, None)?
  {
    return Err(CoreError::DuplicateEmail(email.to_owned()).into());
  }

  tx.execute(
    "INSERT INTO believers (first_name, last_name, email, phone, address, date_joined, is_active)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
    params![
      input.first_name,
      input.last_name,
      input.email,
      input.phone,
      input.address,
      encode_date(date_joined),
    ],
  )?;
  let id = BelieverId(tx.last_insert_rowid());
  tx.commit()?;

  Ok(Believer {
    id,
    first_name: input.first_name,
    last_name: input.last_name,
    email: input.email,
    phone: input.phone,
    address: input.address,
    date_joined,
    is_active: true,
  })
}

pub fn list_believers(conn: &Connection, include_inactive: bool) -> Result<Vec<Believer>> {
  let sql = format!(
    "SELECT {BELIEVER_COLUMNS} FROM believers WHERE (?1 OR is_active = 1) ORDER BY id"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![include_inactive], RawBeliever::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawBeliever::into_believer).collect()
}

pub fn update_believer(
  conn: &mut Connection,
  id: BelieverId,
  patch: BelieverPatch,
) -> Result<Believer> {
  let tx = conn.transaction()?;

  let mut believer =
    fetch_believer(&tx, id)?.ok_or(CoreError::BelieverNotFound(id))?;
  patch.apply(&mut believer);
  believer.email = non_blank(believer.email.take());
  believer.phone = non_blank(believer.phone.take());
  believer.address = non_blank(believer.address.take());

  if let Some(email) = believer.email.as_deref()
    && email_taken(&tx, email, Some(id))?
  {
    return Err(CoreError::DuplicateEmail(email.to_owned()).into());
  }

  tx.execute(
    "UPDATE believers
        SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5,
            address = ?6, is_active = ?7
      WHERE id = ?1",
    params![
      id.0,
      believer.first_name,
      believer.last_name,
      believer.email,
      believer.phone,
      believer.address,
      believer.is_active,
    ],
  )?;
  tx.commit()?;

  Ok(believer)
}

/// Delete a believer and their attendance. Returns the number of attendance
/// rows removed.
pub fn delete_believer(conn: &mut Connection, id: BelieverId) -> Result<usize> {
  let tx = conn.transaction()?;
  if !row_exists(&tx, "believers", id.0)? {
    return Err(CoreError::BelieverNotFound(id).into());
  }
  let removed =
    tx.execute("DELETE FROM attendance WHERE believer_id = ?1", params![id.0])?;
  tx.execute("DELETE FROM believers WHERE id = ?1", params![id.0])?;
  tx.commit()?;
  Ok(removed)
}

pub fn believer_detail(conn: &mut Connection, id: BelieverId) -> Result<Option<BelieverDetail>> {
  let tx = conn.transaction()?;

  let Some(believer) = fetch_believer(&tx, id)? else {
    return Ok(None);
  };

  let rows = {
    let mut stmt = tx.prepare(
      "SELECT s.service_type, COUNT(a.id)
         FROM attendance a
         JOIN services s ON s.id = a.service_id
        WHERE a.believer_id = ?1
        GROUP BY s.service_type",
    )?;
    stmt
      .query_map(params![id.0], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  tx.commit()?;

  let counts = rows
    .into_iter()
    .map(|(ty, n)| -> Result<_> { Ok((decode_service_type(&ty)?, count(n))) })
    .collect::<Result<Vec<_>>>()?;

  Ok(Some(BelieverDetail { believer, stats: AttendanceStats::from_counts(counts) }))
}

// ─── Services ────────────────────────────────────────────────────────────────

pub fn fetch_service(conn: &Connection, id: ServiceId) -> Result<Option<Service>> {
  let sql = format!("SELECT {SERVICE_COLUMNS} FROM services s WHERE s.id = ?1");
  conn
    .query_row(&sql, params![id.0], RawService::from_row)
    .optional()?
    .map(RawService::into_service)
    .transpose()
}

pub fn insert_service(conn: &Connection, mut input: NewService) -> Result<Service> {
  input.service_time = non_blank(input.service_time);
  input.description = non_blank(input.description);

  conn.execute(
    "INSERT INTO services (service_type, service_date, service_time, description)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      encode_service_type(input.service_type),
      encode_date(input.service_date),
      input.service_time,
      input.description,
    ],
  )?;

  Ok(Service {
    id:               ServiceId(conn.last_insert_rowid()),
    service_type:     input.service_type,
    service_date:     input.service_date,
    service_time:     input.service_time,
    description:      input.description,
    attendance_count: 0,
  })
}

pub fn list_services(conn: &Connection, query: ServiceQuery) -> Result<Vec<Service>> {
  let sql = format!(
    "SELECT {SERVICE_COLUMNS}
       FROM services s
      WHERE (?1 IS NULL OR s.service_type = ?1)
        AND (?2 IS NULL OR s.service_date >= ?2)
        AND (?3 IS NULL OR s.service_date <= ?3)
      ORDER BY s.service_date DESC, s.id DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(
      params![
        query.service_type.map(encode_service_type),
        query.from.map(encode_date),
        query.to.map(encode_date),
      ],
      RawService::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawService::into_service).collect()
}

pub fn update_service(
  conn: &mut Connection,
  id: ServiceId,
  patch: ServicePatch,
) -> Result<Service> {
  let tx = conn.transaction()?;

  let mut service = fetch_service(&tx, id)?.ok_or(CoreError::ServiceNotFound(id))?;
  patch.apply(&mut service);
  service.service_time = non_blank(service.service_time.take());
  service.description = non_blank(service.description.take());

  tx.execute(
    "UPDATE services
        SET service_type = ?2, service_date = ?3, service_time = ?4, description = ?5
      WHERE id = ?1",
    params![
      id.0,
      encode_service_type(service.service_type),
      encode_date(service.service_date),
      service.service_time,
      service.description,
    ],
  )?;
  tx.commit()?;

  Ok(service)
}

/// Delete a service and its attendance. Returns the number of attendance rows
/// removed.
pub fn delete_service(conn: &mut Connection, id: ServiceId) -> Result<usize> {
  let tx = conn.transaction()?;
  if !row_exists(&tx, "services", id.0)? {
    return Err(CoreError::ServiceNotFound(id).into());
  }
  let removed =
    tx.execute("DELETE FROM attendance WHERE service_id = ?1", params![id.0])?;
  tx.execute("DELETE FROM services WHERE id = ?1", params![id.0])?;
  tx.commit()?;
  Ok(removed)
}

pub fn service_detail(conn: &mut Connection, id: ServiceId) -> Result<Option<ServiceDetail>> {
  let tx = conn.transaction()?;

  let Some(service) = fetch_service(&tx, id)? else {
    return Ok(None);
  };

  let attendees = {
    let mut stmt = tx.prepare(
      "SELECT b.id, b.first_name, b.last_name
         FROM attendance a
         JOIN believers b ON b.id = a.believer_id
        WHERE a.service_id = ?1
        ORDER BY a.id",
    )?;
    stmt
      .query_map(params![id.0], |r| {
        Ok(Attendee {
          id:   BelieverId(r.get(0)?),
          name: full_name(&r.get::<_, String>(1)?, &r.get::<_, String>(2)?),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  tx.commit()?;

  Ok(Some(ServiceDetail { service, attendees }))
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub fn insert_attendance(
  conn: &mut Connection,
  mut input: NewAttendance,
  attended_at: DateTime<Utc>,
) -> Result<Attendance> {
  input.notes = non_blank(input.notes);
  let tx = conn.transaction()?;

  if !row_exists(&tx, "believers", input.believer_id.0)? {
    return Err(CoreError::BelieverNotFound(input.believer_id).into());
  }
  if !row_exists(&tx, "services", input.service_id.0)? {
    return Err(CoreError::ServiceNotFound(input.service_id).into());
  }

  let existing: Option<i64> = tx
    .query_row(
      "SELECT id FROM attendance WHERE believer_id = ?1 AND service_id = ?2",
      params![input.believer_id.0, input.service_id.0],
      |r| r.get(0),
    )
    .optional()?;
  if existing.is_some() {
    return Err(
      CoreError::DuplicateAttendance {
        believer_id: input.believer_id,
        service_id:  input.service_id,
      }
      .into(),
    );
  }

  tx.execute(
    "INSERT INTO attendance (believer_id, service_id, attended_at, notes)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      input.believer_id.0,
      input.service_id.0,
      encode_dt(attended_at),
      input.notes,
    ],
  )?;
  let id = AttendanceId(tx.last_insert_rowid());
  tx.commit()?;

  Ok(Attendance {
    id,
    believer_id: input.believer_id,
    service_id: input.service_id,
    attended_at,
    notes: input.notes,
  })
}

pub fn list_attendance(conn: &Connection, query: AttendanceQuery) -> Result<Vec<Attendance>> {
  let sql = format!(
    "SELECT {ATTENDANCE_COLUMNS}
       FROM attendance
      WHERE (?1 IS NULL OR service_id = ?1)
        AND (?2 IS NULL OR believer_id = ?2)
      ORDER BY id"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(
      params![query.service_id.map(|id| id.0), query.believer_id.map(|id| id.0)],
      RawAttendance::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawAttendance::into_attendance).collect()
}

pub fn delete_attendance(conn: &Connection, id: AttendanceId) -> Result<()> {
  let deleted = conn.execute("DELETE FROM attendance WHERE id = ?1", params![id.0])?;
  if deleted == 0 {
    return Err(CoreError::AttendanceNotFound(id).into());
  }
  Ok(())
}

// ─── Reports ─────────────────────────────────────────────────────────────────

fn scalar_count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<u64> {
  let n: i64 = conn.query_row(sql, params, |r| r.get(0))?;
  Ok(count(n))
}

pub fn dashboard(conn: &mut Connection, as_of: NaiveDate) -> Result<DashboardSummary> {
  let tx = conn.transaction()?;

  let total_believers =
    scalar_count(&tx, "SELECT COUNT(*) FROM believers WHERE is_active = 1", [])?;
  let total_services = scalar_count(&tx, "SELECT COUNT(*) FROM services", [])?;
  let recent_services = scalar_count(
    &tx,
    "SELECT COUNT(*) FROM services WHERE service_date >= ?1",
    params![encode_date(window_start(as_of, RECENT_SERVICE_WINDOW_DAYS))],
  )?;

  // Every service appears in the outer join, so zero-attendance services
  // count toward the denominator.
  let per_service = {
    let mut stmt = tx.prepare(
      "SELECT COUNT(a.id)
         FROM services s
         LEFT JOIN attendance a ON a.service_id = s.id
        GROUP BY s.id",
    )?;
    stmt
      .query_map([], |r| r.get::<_, i64>(0))?
      .map(|n| n.map(count))
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let by_type = {
    let mut stmt =
      tx.prepare("SELECT service_type, COUNT(*) FROM services GROUP BY service_type")?;
    stmt
      .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  tx.commit()?;

  let mut services_by_type = ServiceCounts::default();
  for (ty, n) in by_type {
    services_by_type.add(decode_service_type(&ty)?, count(n));
  }

  Ok(DashboardSummary {
    total_believers,
    total_services,
    recent_services,
    average_attendance: average_attendance(&per_service),
    services_by_type,
  })
}

pub fn attendance_trends(conn: &Connection, as_of: NaiveDate) -> Result<AttendanceTrends> {
  let mut stmt = conn.prepare(
    "SELECT s.service_type,
            CAST(strftime('%Y', s.service_date) AS INTEGER) AS year,
            CAST(strftime('%m', s.service_date) AS INTEGER) AS month,
            COUNT(a.id)
       FROM services s
       JOIN attendance a ON a.service_id = s.id
      WHERE s.service_date >= ?1
      GROUP BY s.service_type, year, month
      ORDER BY s.service_type, year, month",
  )?;
  let rows = stmt
    .query_map(
      params![encode_date(window_start(as_of, TREND_WINDOW_DAYS))],
      |r| {
        Ok((
          r.get::<_, String>(0)?,
          r.get::<_, i32>(1)?,
          r.get::<_, u32>(2)?,
          r.get::<_, i64>(3)?,
        ))
      },
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut trends = AttendanceTrends::default();
  for (ty, year, month, n) in rows {
    trends.push(decode_service_type(&ty)?, TrendBucket { year, month, count: count(n) });
  }
  Ok(trends)
}

pub fn top_attendees(conn: &Connection, limit: usize) -> Result<Vec<TopAttendee>> {
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let mut stmt = conn.prepare(
    "SELECT b.id, b.first_name, b.last_name, COUNT(a.id) AS attendance_count
       FROM believers b
       JOIN attendance a ON a.believer_id = b.id
      WHERE b.is_active = 1
      GROUP BY b.id
      ORDER BY attendance_count DESC, b.id ASC
      LIMIT ?1",
  )?;
  let ranked = stmt
    .query_map(params![limit], |r| {
      Ok(TopAttendee {
        id:               BelieverId(r.get(0)?),
        name:             full_name(&r.get::<_, String>(1)?, &r.get::<_, String>(2)?),
        attendance_count: count(r.get(3)?),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ranked)
}
