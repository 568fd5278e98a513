use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::{Duration, SecondsFormat, Utc};
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::vital::VitalType;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};
use vitals_cell::handlers::*;
use vitals_cell::models::*;

fn config_for(server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_supabase_url(&server.uri()).to_arc()
}

fn create_auth_header(user: &TestUser) -> TypedHeader<Authorization<Bearer>> {
    let token = JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None);
    TypedHeader(Authorization::bearer(&token).unwrap())
}

async fn mount_membership(server: &MockServer, user_id: &str, member_id: Uuid, family_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/family_members"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": member_id, "family_id": family_id }])),
        )
        .mount(server)
        .await;
}

fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn test_create_vital_derives_unit() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    let (member_id, family_id) = (Uuid::new_v4(), Uuid::new_v4());
    mount_membership(&server, &user.id, member_id, family_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/vitals"))
        .and(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
            body["unit"] == "mmHg" && body["type"] == "blood_pressure" && body["measured_at"].is_string()
        })
        .respond_with(|req: &Request| {
            let mut row: Value = serde_json::from_slice(&req.body).unwrap();
            row["id"] = json!(Uuid::new_v4());
            row["created_at"] = row["measured_at"].clone();
            ResponseTemplate::new(201).set_body_json(json!([row]))
        })
        .expect(1)
        .mount(&server)
        .await;

    let (status, Json(vital)) = create_vital(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Json(CreateVitalRequest {
            member_id: None,
            vital_type: VitalType::BloodPressure,
            value: " 150/95 ".to_string(),
            measured_at: None,
            notes: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vital["value"], "150/95");
    assert_eq!(vital["member_id"], json!(member_id));
    assert_eq!(vital["in_normal_range"], false);
}

#[tokio::test]
async fn test_create_vital_rejects_malformed_reading() {
    let server = MockServer::start().await;
    let user = TestUser::default();

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = create_vital(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Json(CreateVitalRequest {
            member_id: None,
            vital_type: VitalType::HeartRate,
            value: "fast".to_string(),
            measured_at: None,
            notes: None,
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(fields)) if fields.contains("value"));
}

#[tokio::test]
async fn test_list_vitals_filters_and_flags_range() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    let (member_id, family_id) = (Uuid::new_v4(), Uuid::new_v4());
    mount_membership(&server, &user.id, member_id, family_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/vitals"))
        .and(query_param("type", "eq.blood_pressure"))
        .and(query_param("family_id", format!("in.({})", family_id)))
        .and(query_param("order", "measured_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::vital_row(Uuid::new_v4(), family_id, member_id, "blood_pressure", "120/80", &hours_ago(1)),
            MockSupabaseResponses::vital_row(Uuid::new_v4(), family_id, member_id, "blood_pressure", "200/80", &hours_ago(30)),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let Json(vitals) = list_vitals(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Query(VitalListQuery {
            vital_type: Some(VitalType::BloodPressure),
            days: Some(7),
            member_id: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(vitals[0]["in_normal_range"], true);
    assert_eq!(vitals[1]["in_normal_range"], false);
    assert_eq!(vitals[0]["unit"], "mmHg");
}

#[tokio::test]
async fn test_chart_groups_by_day_oldest_first() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    let (member_id, family_id) = (Uuid::new_v4(), Uuid::new_v4());
    mount_membership(&server, &user.id, member_id, family_id).await;

    let two_days_ago = (Utc::now() - Duration::days(2)).date_naive();
    let morning = two_days_ago.and_hms_opt(8, 0, 0).unwrap().and_utc();
    let evening = two_days_ago.and_hms_opt(20, 0, 0).unwrap().and_utc();
    let yesterday = (Utc::now() - Duration::days(1)).date_naive().and_hms_opt(9, 0, 0).unwrap().and_utc();
    let stamp = |at: chrono::DateTime<Utc>| at.to_rfc3339_opts(SecondsFormat::Secs, true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/vitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::vital_row(Uuid::new_v4(), family_id, member_id, "weight", "71.0", &stamp(yesterday)),
            MockSupabaseResponses::vital_row(Uuid::new_v4(), family_id, member_id, "blood_pressure", "130/85", &stamp(evening)),
            MockSupabaseResponses::vital_row(Uuid::new_v4(), family_id, member_id, "blood_pressure", "118/76", &stamp(morning)),
        ])))
        .mount(&server)
        .await;

    let Json(points) = get_vitals_chart(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Query(ChartQuery::default()),
    )
    .await
    .unwrap();

    let points = points.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["date"], json!(two_days_ago));
    assert_eq!(points[0]["systolic"], 130.0);
    assert_eq!(points[0]["diastolic"], 85.0);
    assert_eq!(points[1]["weight"], 71.0);
}

/// Row policies hide other families' vitals; the owner lookup still tells
/// them apart from missing rows.
#[tokio::test]
async fn test_delete_vital_of_other_family_is_forbidden() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    let vital_id = Uuid::new_v4();
    let foreign_family = Uuid::new_v4();
    mount_membership(&server, &user.id, Uuid::new_v4(), Uuid::new_v4()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/vitals"))
        .and(query_param("id", format!("eq.{}", vital_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/record_family_id"))
        .and(move |req: &Request| {
            let args: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
            args == json!({ "p_table": "vitals", "p_id": vital_id })
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(foreign_family)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = delete_vital(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Path(vital_id),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_delete_visible_vital_of_other_family_is_forbidden() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    let vital_id = Uuid::new_v4();
    mount_membership(&server, &user.id, Uuid::new_v4(), Uuid::new_v4()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/vitals"))
        .and(query_param("id", format!("eq.{}", vital_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::vital_row(vital_id, Uuid::new_v4(), Uuid::new_v4(), "weight", "80", &hours_ago(2))
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = delete_vital(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Path(vital_id),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_delete_missing_vital_is_not_found() {
    let server = MockServer::start().await;
    let user = TestUser::default();
    mount_membership(&server, &user.id, Uuid::new_v4(), Uuid::new_v4()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/vitals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/record_family_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let result = delete_vital(
        State(config_for(&server)),
        create_auth_header(&user),
        Extension(user.to_user()),
        Path(Uuid::new_v4()),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
