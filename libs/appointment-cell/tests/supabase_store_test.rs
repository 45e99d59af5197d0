use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::store::{AppointmentStore, SupabaseAppointmentStore};
use shared_database::{StoreError, SupabaseClient};
use shared_utils::test_utils::{utc, MockSupabaseResponses, TestConfig};

fn store(server: &MockServer) -> SupabaseAppointmentStore {
    SupabaseAppointmentStore::new(SupabaseClient::new(
        &TestConfig::with_supabase_url(&server.uri()).to_app_config(),
    ))
}

fn appointment(version: i64) -> Appointment {
    let row = MockSupabaseResponses::appointment_row(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        utc(2026, 1, 5, 9, 0),
        utc(2026, 1, 5, 9, 30),
        "scheduled",
        version,
    );
    serde_json::from_value(row).unwrap()
}

#[tokio::test]
async fn test_overlap_query_uses_strict_filters() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("start", "lt.2026-01-05T10:00:00.000Z"))
        .and(query_param("end", "gt.2026-01-05T09:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                Uuid::new_v4(),
                doctor_id,
                Uuid::new_v4(),
                utc(2026, 1, 5, 9, 30),
                utc(2026, 1, 5, 10, 0),
                "cancelled",
                2,
            )
        ])))
        .mount(&mock_server)
        .await;

    let rows = store(&mock_server)
        .find_overlapping(doctor_id, utc(2026, 1, 5, 9, 0), utc(2026, 1, 5, 10, 0))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AppointmentStatus::Cancelled);
    assert_eq!(rows[0].version, 2);
}

#[tokio::test]
async fn test_insert_conflict_is_unique_violation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::unique_violation()))
        .mount(&mock_server)
        .await;

    let result = store(&mock_server).insert(appointment(0)).await;
    assert_matches!(result, Err(StoreError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_update_is_conditional_on_version() {
    let mock_server = MockServer::start().await;
    let current = appointment(4);

    let mut stored = serde_json::to_value(&current).unwrap();
    stored["version"] = json!(5);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", current.id)))
        .and(query_param("version", "eq.4"))
        .and(body_partial_json(json!({ "version": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updated = store(&mock_server).update(current, 4).await.unwrap();
    assert_eq!(updated.version, 5);
}

#[tokio::test]
async fn test_update_matching_nothing_is_version_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = store(&mock_server).update(appointment(1), 1).await;
    assert_matches!(result, Err(StoreError::VersionMismatch { expected: 1 }));
}

#[tokio::test]
async fn test_lookup_by_start_skips_cancelled_rows() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("start", "eq.2026-01-05T09:00:00.000Z"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let found = store(&mock_server)
        .find_by_doctor_and_start(doctor_id, utc(2026, 1, 5, 9, 0))
        .await
        .unwrap();
    assert!(found.is_none());
}
