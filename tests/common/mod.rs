#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use tower::ServiceExt;
use uuid::Uuid;

use ev_charging_backend::{
    app::build_app,
    config::DatabaseConfig,
    database::Database,
    features::auth::{
        repository::InMemoryAccountRepository, session::SessionSettings, token::TokenCodec,
    },
    features::submissions::models::{NewDesiredLocation, NewSubmission},
    state::AppState,
};

pub const SECRET: &str = "integration-secret";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(
        SECRET,
        "ev-charging-network",
        "ev-charging-users",
        Duration::from_secs(7 * 24 * 60 * 60),
    )
}

pub async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("ev_charging_it_{}.db", Uuid::new_v4().simple()));
    let cfg = DatabaseConfig {
        path: db_path.to_string_lossy().into_owned(),
        wal: false,
        max_connections: 4,
        acquire_timeout_secs: 5,
    };
    let db = Database::connect(&cfg).await.expect("connect sqlite");
    db.init_schema().await.expect("init schema");

    let accounts =
        InMemoryAccountRepository::from_seeds(&InMemoryAccountRepository::demo_seeds())
            .expect("seed accounts");
    let state = AppState::new(
        db,
        Arc::new(codec()),
        Arc::new(accounts),
        SessionSettings {
            cookie_name: "auth-token".into(),
            cookie_secure: false,
        },
    );
    let app = build_app(state.clone(), "/api", false);
    TestApp {
        app,
        state,
        db_path,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("call app")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn bearer_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("build request")
}

pub async fn login_token(app: &Router, identifier: &str, password: &str) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "identifier": identifier, "password": password }),
        ),
    )
    .await;
    assert!(resp.status().is_success(), "login failed for {identifier}");
    let json = body_json(resp).await;
    json["token"].as_str().expect("token in body").to_string()
}

pub fn new_submission(vehicle: &str, usage: &str, identifiers: &[&str]) -> NewSubmission {
    NewSubmission {
        vehicle_type: vehicle.into(),
        brand_model: "BYD Dolphin".into(),
        usage_type: usage.into(),
        average_kms_per_day: "Menos de 10Km".into(),
        preference_connector: Some("CCS2".into()),
        usual_charging_schedule: None,
        primary_charging_location: "Casa".into(),
        charging_address: "Calle Falsa 123".into(),
        charging_latitude: Some(19.43),
        charging_longitude: Some(-99.13),
        charger_type: "Nivel 2".into(),
        cost_per_km_charged: None,
        full_name: "Luis Gómez".into(),
        phone: "5512345678".into(),
        email: "luis@example.com".into(),
        desired_locations: identifiers
            .iter()
            .map(|id| NewDesiredLocation {
                identifier: (*id).to_string(),
                address: format!("{id} address"),
                latitude: None,
                longitude: None,
            })
            .collect(),
    }
}
