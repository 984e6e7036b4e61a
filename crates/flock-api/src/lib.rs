//! JSON REST API for Flock.
//!
//! Exposes an axum [`Router`] backed by any [`flock_core::store::RecordStore`].
//! Static files, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", flock_api::api_router(store.clone()))
//! ```

pub mod attendance;
pub mod believers;
pub mod error;
pub mod extract;
pub mod services;
pub mod statistics;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use flock_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Believers
    .route("/believers", get(believers::list::<S>).post(believers::create::<S>))
    .route(
      "/believers/{id}",
      get(believers::get_one::<S>)
        .put(believers::update::<S>)
        .delete(believers::delete_one::<S>),
    )
    // Services
    .route("/services", get(services::list::<S>).post(services::create::<S>))
    .route(
      "/services/{id}",
      get(services::get_one::<S>)
        .put(services::update::<S>)
        .delete(services::delete_one::<S>),
    )
    // Attendance
    .route("/attendance", get(attendance::list::<S>).post(attendance::create::<S>))
    .route("/attendance/{id}", delete(attendance::delete_one::<S>))
    // Statistics
    .route("/statistics/dashboard", get(statistics::dashboard::<S>))
    .route("/statistics/attendance-trends", get(statistics::attendance_trends::<S>))
    .route("/statistics/top-attendees", get(statistics::top_attendees::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use flock_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        req = req.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  async fn create_believer(app: &Router, first: &str, last: &str) -> i64 {
    let body = json!({
      "first_name": first,
      "last_name": last,
      "email": format!("{}@example.com", first.to_lowercase()),
    });
    let (status, json) = send(app, "POST", "/believers", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
  }

  async fn create_service(app: &Router, ty: &str, date: &str) -> i64 {
    let body = json!({ "service_type": ty, "service_date": date });
    let (status, json) = send(app, "POST", "/services", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
  }

  async fn record(app: &Router, believer: i64, service: i64) -> StatusCode {
    let body = json!({ "believer_id": believer, "service_id": service });
    send(app, "POST", "/attendance", Some(body)).await.0
  }

  // ─── Believers ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_believer_returns_full_record() {
    let app = app().await;
    let body = json!({
      "first_name": "John",
      "last_name": "Smith",
      "email": "john@example.com",
      "date_joined": "2023-01-15",
    });
    let (status, json) = send(&app, "POST", "/believers", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["first_name"], "John");
    assert_eq!(json["date_joined"], "2023-01-15");
    assert_eq!(json["is_active"], true);
    assert_eq!(json["phone"], Value::Null);
  }

  #[tokio::test]
  async fn create_believer_rejects_malformed_input() {
    let app = app().await;

    let (status, json) = send(&app, "POST", "/believers", Some(json!({ "first_name": "X" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let body = json!({ "first_name": "X", "last_name": "Y", "date_joined": "15/01/2023" });
    let (status, _) = send(&app, "POST", "/believers", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "first_name": " ", "last_name": "Y" });
    let (status, _) = send(&app, "POST", "/believers", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn duplicate_email_conflicts() {
    let app = app().await;
    create_believer(&app, "Mary", "Johnson").await;

    let body = json!({ "first_name": "Mary", "last_name": "Other", "email": "mary@example.com" });
    let (status, json) = send(&app, "POST", "/believers", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("mary@example.com"));
  }

  #[tokio::test]
  async fn blank_emails_do_not_conflict() {
    let app = app().await;
    for first in ["Ann", "Ben"] {
      let body = json!({ "first_name": first, "last_name": "Lee", "email": "", "phone": " " });
      let (status, json) = send(&app, "POST", "/believers", Some(body)).await;
      assert_eq!(status, StatusCode::CREATED);
      assert_eq!(json["email"], Value::Null);
      assert_eq!(json["phone"], Value::Null);
    }
  }

  #[tokio::test]
  async fn get_believer_includes_stats() {
    let app = app().await;
    let b = create_believer(&app, "David", "Williams").await;
    let sun = create_service(&app, "sunday", "2024-06-02").await;
    let mid = create_service(&app, "midweek", "2024-06-05").await;
    record(&app, b, sun).await;
    record(&app, b, mid).await;

    let (status, json) = send(&app, "GET", &format!("/believers/{b}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["first_name"], "David");
    assert_eq!(json["stats"], json!({ "total": 2, "sunday": 1, "midweek": 1 }));
  }

  #[tokio::test]
  async fn unknown_and_malformed_ids() {
    let app = app().await;
    let (status, json) = send(&app, "GET", "/believers/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, "GET", "/believers/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/services/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/attendance/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn partial_update_changes_only_supplied_fields() {
    let app = app().await;
    let body = json!({
      "first_name": "Sarah",
      "last_name": "Brown",
      "email": "sarah@example.com",
      "phone": "555-0100",
      "address": "1 Church St",
    });
    let (_, created) = send(&app, "POST", "/believers", Some(body)).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) =
      send(&app, "PUT", &format!("/believers/{id}"), Some(json!({ "phone": "555-9999" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "555-9999");
    for field in ["first_name", "last_name", "email", "address", "date_joined", "is_active"] {
      assert_eq!(updated[field], created[field], "{field} changed");
    }

    let (status, cleared) =
      send(&app, "PUT", &format!("/believers/{id}"), Some(json!({ "address": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["address"], Value::Null);
    assert_eq!(cleared["phone"], "555-9999");
  }

  #[tokio::test]
  async fn update_missing_believer_is_not_found() {
    let app = app().await;
    let (status, _) = send(&app, "PUT", "/believers/5", Some(json!({ "phone": "1" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn deactivated_believer_leaves_listing() {
    let app = app().await;
    let a = create_believer(&app, "Robert", "Taylor").await;
    create_believer(&app, "Linda", "Anderson").await;

    let (status, _) =
      send(&app, "PUT", &format!("/believers/{a}"), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/believers", None).await;
    let ids: Vec<_> = list.as_array().unwrap().iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert!(!ids.contains(&a));
    assert_eq!(ids.len(), 1);

    let (_, all) = send(&app, "GET", "/believers?include_inactive=true", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "GET", &format!("/believers/{a}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn delete_believer_cascades() {
    let app = app().await;
    let b = create_believer(&app, "James", "Wilson").await;
    let s = create_service(&app, "sunday", "2024-06-02").await;
    record(&app, b, s).await;

    let (status, body) = send(&app, "DELETE", &format!("/believers/{b}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, list) = send(&app, "GET", "/attendance", None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (_, service) = send(&app, "GET", &format!("/services/{s}"), None).await;
    assert_eq!(service["attendance_count"], 0);
  }

  // ─── Services ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn services_list_and_filter() {
    let app = app().await;
    create_service(&app, "sunday", "2024-01-07").await;
    create_service(&app, "midweek", "2024-02-07").await;
    create_service(&app, "sunday", "2024-03-03").await;

    let (status, list) = send(&app, "GET", "/services", None).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> =
      list.as_array().unwrap().iter().map(|s| s["service_date"].as_str().unwrap()).collect();
    assert_eq!(dates, ["2024-03-03", "2024-02-07", "2024-01-07"]);

    let (_, sundays) = send(&app, "GET", "/services?service_type=sunday", None).await;
    assert_eq!(sundays.as_array().unwrap().len(), 2);

    let (_, ranged) = send(&app, "GET", "/services?from=2024-02-01&to=2024-02-29", None).await;
    assert_eq!(ranged.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/services?service_type=friday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, inverted) = send(&app, "GET", "/services?from=2024-03-01&to=2024-02-01", None).await;
    assert!(inverted.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn blank_service_filters_are_ignored() {
    let app = app().await;
    create_service(&app, "sunday", "2024-01-07").await;
    create_service(&app, "midweek", "2024-02-07").await;

    let (status, list) = send(&app, "GET", "/services?service_type=&from=&to=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, list) = send(&app, "GET", "/services?service_type=midweek&to=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn create_service_rejects_unknown_type() {
    let app = app().await;
    let body = json!({ "service_type": "friday", "service_date": "2024-06-07" });
    let (status, _) = send(&app, "POST", "/services", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn service_detail_lists_attendees() {
    let app = app().await;
    let a = create_believer(&app, "John", "Smith").await;
    let b = create_believer(&app, "Mary", "Johnson").await;
    let s = create_service(&app, "sunday", "2024-06-02").await;
    record(&app, a, s).await;
    record(&app, b, s).await;

    let (status, json) = send(&app, "GET", &format!("/services/{s}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["attendance_count"], 2);
    assert_eq!(
      json["attendees"],
      json!([{ "id": a, "name": "John Smith" }, { "id": b, "name": "Mary Johnson" }])
    );
  }

  #[tokio::test]
  async fn update_service_clears_description() {
    let app = app().await;
    let body = json!({
      "service_type": "midweek",
      "service_date": "2024-06-05",
      "service_time": "19:00",
      "description": "Bible study",
    });
    let (_, created) = send(&app, "POST", "/services", Some(body)).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) =
      send(&app, "PUT", &format!("/services/{id}"), Some(json!({ "description": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["service_time"], "19:00");
    assert_eq!(updated["service_type"], "midweek");
  }

  // ─── Attendance ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_attendance_conflicts() {
    let app = app().await;
    let b = create_believer(&app, "Michael", "Davis").await;
    let s = create_service(&app, "sunday", "2024-06-02").await;

    assert_eq!(record(&app, b, s).await, StatusCode::CREATED);
    assert_eq!(record(&app, b, s).await, StatusCode::CONFLICT);

    let (_, list) = send(&app, "GET", "/attendance", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn attendance_for_missing_parent_is_not_found() {
    let app = app().await;
    let b = create_believer(&app, "Michael", "Davis").await;
    let s = create_service(&app, "sunday", "2024-06-02").await;

    assert_eq!(record(&app, 999, s).await, StatusCode::NOT_FOUND);
    assert_eq!(record(&app, b, 999).await, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn attendance_list_filters_and_delete() {
    let app = app().await;
    let a = create_believer(&app, "A", "One").await;
    let b = create_believer(&app, "B", "Two").await;
    let s1 = create_service(&app, "sunday", "2024-06-02").await;
    let s2 = create_service(&app, "midweek", "2024-06-05").await;
    record(&app, a, s1).await;
    record(&app, b, s1).await;
    record(&app, a, s2).await;

    let (_, by_service) = send(&app, "GET", &format!("/attendance?service_id={s1}"), None).await;
    assert_eq!(by_service.as_array().unwrap().len(), 2);

    let (_, by_believer) =
      send(&app, "GET", &format!("/attendance?believer_id={a}"), None).await;
    let records = by_believer.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0]["attended_at"].is_string());

    let id = records[0]["id"].as_i64().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/attendance/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after) = send(&app, "GET", &format!("/attendance?believer_id={a}"), None).await;
    assert_eq!(after.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn blank_attendance_filter_lists_everything() {
    let app = app().await;
    let a = create_believer(&app, "A", "One").await;
    let s1 = create_service(&app, "sunday", "2024-06-02").await;
    let s2 = create_service(&app, "midweek", "2024-06-05").await;
    record(&app, a, s1).await;
    record(&app, a, s2).await;

    let (status, all) = send(&app, "GET", "/attendance?service_id=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, one) =
      send(&app, "GET", &format!("/attendance?service_id={s1}&believer_id="), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/attendance?service_id=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ─── Statistics ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_summary_shape() {
    let app = app().await;
    let believers = [
      create_believer(&app, "A", "One").await,
      create_believer(&app, "B", "Two").await,
      create_believer(&app, "C", "Three").await,
    ];
    let s1 = create_service(&app, "sunday", "2024-06-23").await;
    create_service(&app, "midweek", "2024-06-19").await;
    for b in believers {
      record(&app, b, s1).await;
    }

    let (status, json) = send(&app, "GET", "/statistics/dashboard?as_of=2024-06-30", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      json,
      json!({
        "total_believers": 3,
        "total_services": 2,
        "recent_services": 2,
        "average_attendance": 1.5,
        "sunday_services": 1,
        "midweek_services": 1,
      })
    );
  }

  #[tokio::test]
  async fn attendance_trends_shape() {
    let app = app().await;
    let a = create_believer(&app, "A", "One").await;
    let b = create_believer(&app, "B", "Two").await;
    let s1 = create_service(&app, "sunday", "2024-05-05").await;
    let s2 = create_service(&app, "sunday", "2024-05-19").await;
    record(&app, a, s1).await;
    record(&app, b, s2).await;

    let (status, json) =
      send(&app, "GET", "/statistics/attendance-trends?as_of=2024-06-30", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      json,
      json!({
        "sunday":  [{ "year": 2024, "month": 5, "count": 2 }],
        "midweek": [],
      })
    );
  }

  #[tokio::test]
  async fn top_attendees_respects_limit() {
    let app = app().await;
    let a = create_believer(&app, "Alice", "A").await;
    let b = create_believer(&app, "Bob", "B").await;
    let c = create_believer(&app, "Carol", "C").await;
    for day in 1..=5 {
      let s = create_service(&app, "sunday", &format!("2024-06-0{day}")).await;
      record(&app, a, s).await;
      record(&app, c, s).await;
      if day <= 3 {
        record(&app, b, s).await;
      }
    }

    let (status, json) = send(&app, "GET", "/statistics/top-attendees?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      json,
      json!([
        { "id": a, "name": "Alice A", "attendance_count": 5 },
        { "id": c, "name": "Carol C", "attendance_count": 5 },
      ])
    );

    let (_, all) = send(&app, "GET", "/statistics/top-attendees", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, unbounded) =
      send(&app, "GET", "/statistics/top-attendees?limit=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unbounded.as_array().unwrap().len(), 3);

    let (status, fallback) =
      send(&app, "GET", "/statistics/top-attendees?limit=abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn top_attendees_default_limit_is_ten() {
    let app = app().await;
    let s = create_service(&app, "sunday", "2024-06-02").await;
    for n in 0..12 {
      let b = create_believer(&app, &format!("B{n}"), "X").await;
      record(&app, b, s).await;
    }

    for uri in ["/statistics/top-attendees", "/statistics/top-attendees?limit=ten"] {
      let (_, json) = send(&app, "GET", uri, None).await;
      assert_eq!(json.as_array().unwrap().len(), 10);
    }
    let (_, json) = send(&app, "GET", "/statistics/top-attendees?limit=-5", None).await;
    assert_eq!(json.as_array().unwrap().len(), 12);
  }
}
