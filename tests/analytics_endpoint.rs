mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};

use common::{body_json, bearer_get, json_request, login_token, new_submission, send, spawn_app};

async fn seed(t: &common::TestApp) {
    let rows = [
        new_submission("SUV", "Personal", &["home", "work"]),
        new_submission("SUV", "Comercial", &["work"]),
        new_submission("Sedan", "Personal", &["gym", "home", "work"]),
    ];
    for row in &rows {
        t.state.submissions.insert(row).await.expect("seed submission");
    }
}

#[tokio::test]
async fn analytics_without_session_requires_authentication() {
    let t = spawn_app().await;
    let resp = send(
        &t.app,
        Request::builder()
            .uri("/api/analytics")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn analytics_with_user_role_is_forbidden() {
    let t = spawn_app().await;
    let token = login_token(&t.app, "demo", "demo123").await;
    let resp = send(&t.app, bearer_get("/api/analytics", &token)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Admin access required");
}

#[tokio::test]
async fn unfiltered_analytics_counts_everything() {
    let t = spawn_app().await;
    seed(&t).await;
    let token = login_token(&t.app, "admin", "admin123").await;

    let resp = send(&t.app, bearer_get("/api/analytics", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let data = &json["data"];
    assert_eq!(data["totalSubmissions"], 3);
    assert_eq!(data["totalLocations"], 6);
    assert_eq!(data["vehicleTypes"][0]["vehicle_type"], "SUV");
    assert_eq!(data["vehicleTypes"][0]["count"], 2);
    assert_eq!(data["desiredLocationCounts"][0]["identifier"], "work");
    assert_eq!(data["desiredLocationCounts"][0]["count"], 3);
    assert_eq!(data["kmRanges"][0]["average_kms_per_day"], "Menos de 10Km");
    assert_eq!(data["monthlyData"].as_array().map(Vec::len), Some(1));
    assert_eq!(data["monthlyData"][0]["count"], 3);
    assert_eq!(json["meta"]["totalSubmissions"], 3);
}

#[tokio::test]
async fn vehicle_filter_restricts_every_aggregate() {
    let t = spawn_app().await;
    seed(&t).await;
    let token = login_token(&t.app, "admin", "admin123").await;

    let resp = send(&t.app, bearer_get("/api/analytics?vehicleType=SUV", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let data = &json["data"];
    assert_eq!(data["totalSubmissions"], 2);
    assert_eq!(data["totalLocations"], 3);

    let vehicles = data["vehicleTypes"].as_array().expect("array");
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["vehicle_type"], "SUV");

    let identifiers: Vec<&str> = data["desiredLocationCounts"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|v| v["identifier"].as_str())
        .collect();
    assert!(!identifiers.contains(&"gym"));
    assert_eq!(data["desiredLocationCounts"][0]["identifier"], "work");
    assert_eq!(data["desiredLocationCounts"][0]["count"], 2);

    assert_eq!(json["filters"]["vehicleType"], "SUV");
}

#[tokio::test]
async fn all_sentinel_and_post_body_filters_are_honoured() {
    let t = spawn_app().await;
    seed(&t).await;
    let token = login_token(&t.app, "admin", "admin123").await;

    let resp = send(
        &t.app,
        bearer_get("/api/analytics?vehicleType=all&usageType=all", &token),
    )
    .await;
    assert_eq!(body_json(resp).await["data"]["totalSubmissions"], 3);

    let mut req = json_request(
        "POST",
        "/api/analytics",
        serde_json::json!({ "filters": { "vehicleType": "SUV", "usageType": "Personal" } }),
    );
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let json = body_json(send(&t.app, req).await).await;
    assert_eq!(json["data"]["totalSubmissions"], 1);
    assert_eq!(json["data"]["totalLocations"], 2);
}

#[tokio::test]
async fn raw_submissions_follow_the_same_gate_and_filters() {
    let t = spawn_app().await;
    seed(&t).await;

    let user = login_token(&t.app, "demo", "demo123").await;
    let resp = send(&t.app, bearer_get("/api/analytics/submissions", &user)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = login_token(&t.app, "admin", "admin123").await;
    let resp = send(
        &t.app,
        bearer_get("/api/analytics/submissions?vehicleType=Sedan", &admin),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["meta"]["submissionCount"], 1);
    assert_eq!(json["meta"]["locationCount"], 3);
    let submission_id = json["data"]["submissions"][0]["id"].clone();
    for loc in json["data"]["locations"].as_array().expect("array") {
        assert_eq!(loc["submission_id"], submission_id);
    }
}

#[tokio::test]
async fn type_submissions_on_analytics_returns_raw_rows() {
    let t = spawn_app().await;
    seed(&t).await;
    let admin = login_token(&t.app, "admin", "admin123").await;

    let resp = send(
        &t.app,
        bearer_get("/api/analytics?type=submissions&vehicleType=SUV", &admin),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["meta"]["submissionCount"], 2);
    assert_eq!(json["meta"]["locationCount"], 3);
    assert!(json["data"].get("totalSubmissions").is_none());

    let user = login_token(&t.app, "demo", "demo123").await;
    let resp = send(&t.app, bearer_get("/api/analytics?type=submissions", &user)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
