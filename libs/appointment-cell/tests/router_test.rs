use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveTime;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentQuery};
use appointment_cell::router::appointment_routes;
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};
use appointment_cell::AppointmentCellState;
use shared_database::StoreError;
use doctor_cell::models::AvailabilityRule;
use doctor_cell::store::{AvailabilityRuleStore, InMemoryAvailabilityRuleStore, InMemoryTimeOffStore};
use shared_utils::test_utils::TestConfig;

/// Reads see an empty calendar, but every insert loses to a concurrent
/// booking of the same start.
struct LosingInsertStore {
    inner: InMemoryAppointmentStore,
}

#[async_trait]
impl AppointmentStore for LosingInsertStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.inner.find_overlapping(doctor_id, start, end).await
    }

    async fn find_by_doctor_and_start(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        self.inner.find_by_doctor_and_start(doctor_id, start).await
    }

    async fn search(&self, query: AppointmentQuery) -> Result<Vec<Appointment>, StoreError> {
        self.inner.search(query).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        Err(StoreError::UniqueViolation(format!(
            "doctor {} already booked at {}",
            appointment.doctor_id, appointment.start
        )))
    }

    async fn update(&self, appointment: Appointment, expected_version: i64) -> Result<Appointment, StoreError> {
        self.inner.update(appointment, expected_version).await
    }
}

async fn create_test_app(doctor_id: Uuid) -> Router {
    create_test_app_with_store(doctor_id, Arc::new(InMemoryAppointmentStore::new())).await
}

async fn create_test_app_with_store(doctor_id: Uuid, appointments: Arc<dyn AppointmentStore>) -> Router {
    let config = TestConfig::default().to_app_config();
    let rules = Arc::new(InMemoryAvailabilityRuleStore::new());
    rules
        .save(AvailabilityRule {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: 1,
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            work_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            slot_minutes: 30,
            buffer_before_minutes: 0,
            buffer_after_minutes: 0,
            breaks: vec![],
        })
        .await
        .unwrap();

    let state = AppointmentCellState::new(
        &config,
        appointments,
        rules,
        Arc::new(InMemoryTimeOffStore::new()),
    );
    appointment_routes(Arc::new(state))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn booking(doctor_id: Uuid, start: &str, end: &str) -> Value {
    json!({
        "doctor_id": doctor_id,
        "patient_id": Uuid::new_v4(),
        "start": start,
        "end": end,
        "concern": "check-up"
    })
}

#[tokio::test]
async fn test_book_and_fetch_appointment() {
    let doctor_id = Uuid::new_v4();
    let app = create_test_app(doctor_id).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["status"], "scheduled");
    assert_eq!(created["version"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["concern"], "check-up");

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/doctors/{}/by-start?start=2026-01-05T09:00:00Z", doctor_id),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["id"], id.as_str());
}

#[tokio::test]
async fn test_business_rejections_map_to_status_codes() {
    let doctor_id = Uuid::new_v4();
    let app = create_test_app(doctor_id).await;

    app.clone()
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
        .await
        .unwrap();

    let overlap = app
        .clone()
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
        .await
        .unwrap();
    assert_eq!(overlap.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(overlap).await["kind"], "overlap");

    let no_rule = app
        .clone()
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-06T09:00:00Z", "2026-01-06T09:30:00Z")))
        .await
        .unwrap();
    assert_eq!(no_rule.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .oneshot(empty_request("GET", &format!("/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lost_insert_race_is_reported_apart_from_overlap() {
    let doctor_id = Uuid::new_v4();
    let store = Arc::new(LosingInsertStore { inner: InMemoryAppointmentStore::new() });
    let app = create_test_app_with_store(doctor_id, store).await;

    let response = app
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "duplicate_booking");
}

#[tokio::test]
async fn test_reschedule_cancel_and_attend() {
    let doctor_id = Uuid::new_v4();
    let app = create_test_app(doctor_id).await;

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/{}/reschedule", id),
            json!({ "new_start": "2026-01-05T10:00:00Z", "new_end": "2026-01-05T10:30:00Z" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["version"], 1);

    let response = app
        .clone()
        .oneshot(empty_request("POST", &format!("/{}/cancel", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["status"], "cancelled");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/{}/reschedule", id),
            json!({ "new_start": "2026-01-05T11:00:00Z", "new_end": "2026-01-05T11:30:00Z" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(empty_request("POST", &format!("/{}/attend", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_conflict_check_and_search() {
    let doctor_id = Uuid::new_v4();
    let app = create_test_app(doctor_id).await;

    app.clone()
        .oneshot(json_request("POST", "/", booking(doctor_id, "2026-01-05T09:00:00Z", "2026-01-05T09:30:00Z")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!(
                "/conflicts/check?doctor_id={}&start=2026-01-05T09:15:00Z&end=2026-01-05T09:45:00Z",
                doctor_id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["has_conflict"], true);
    assert_eq!(report["kind"], "overlap");

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/search?doctor_id={}&status=scheduled", doctor_id),
        ))
        .await
        .unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["limit"], 50);
}
