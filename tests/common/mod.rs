#![allow(dead_code)]

use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use careers_backend::{
    config::{parse_utc_offset, Config, DEFAULT_EXPIRY_SWEEP_CRON},
    database::pool::{create_pool, run_migrations},
    routes,
    utils::time::FixedClock,
    AppState,
};
use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio_test::assert_ok;
use tower::ServiceExt;

pub const HR_TOKEN: &str = "hr-test-token";
pub const HR_EMPLOYEE_ID: &str = "EMP-077";

pub struct TestApp {
    pub app: Router,
    pub pool: PgPool,
    pub state: AppState,
}

#[derive(Debug, Clone, Copy)]
pub struct Lookups {
    pub department_id: i64,
    pub employment_id: i64,
    pub experience_id: i64,
}

pub struct SeedVacancy {
    pub title: String,
    pub posted: NaiveDate,
    pub closed: Option<NaiveDate>,
    pub urgent: bool,
    pub active: bool,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Suffix keeping titles distinct across parallel tests sharing one database.
pub fn unique(base: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{} {}{}", base, nanos, n)
}

async fn me(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {}", HR_TOKEN);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({
            "success": true,
            "data": { "id": 77, "name": "HR Tester", "u_employee_id": HR_EMPLOYEE_ID }
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        )
            .into_response(),
    }
}

/// Stand-in identity service answering `GET /api/me`.
pub async fn spawn_identity_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().route("/api/me", get(me)))
            .await
            .unwrap();
    });
    format!("http://{}/api", addr)
}

pub fn test_config(auth_api_base_url: &str) -> Config {
    dotenvy::dotenv().ok();
    Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests"),
        database_max_connections: 5,
        auth_api_base_url: auth_api_base_url.to_string(),
        auth_timeout_secs: 2,
        business_utc_offset: parse_utc_offset("+07:00").unwrap(),
        expiry_sweep_cron: DEFAULT_EXPIRY_SWEEP_CRON.to_string(),
        scheduler_enabled: false,
    }
}

pub async fn spawn_app_with(today: NaiveDate, config: Config) -> TestApp {
    let pool = assert_ok!(create_pool(&config).await);
    assert_ok!(run_migrations(&pool).await);
    let state = assert_ok!(AppState::new(
        pool.clone(),
        &config,
        Arc::new(FixedClock::on(today))
    ));
    let app = routes::app_router(state.clone());
    TestApp { app, pool, state }
}

/// App whose clock is pinned to `today`, wired to a local identity server.
pub async fn spawn_app(today: NaiveDate) -> TestApp {
    let auth = spawn_identity_server().await;
    spawn_app_with(today, test_config(&auth)).await
}

pub async fn seed_lookups(pool: &PgPool) -> Lookups {
    async fn insert(pool: &PgPool, table: &str, title: String) -> i64 {
        let sql = format!(
            "INSERT INTO {} (title_en, title_id, created_by) VALUES ($1, $1, 'seed') RETURNING id",
            table
        );
        sqlx::query_scalar(&sql)
            .bind(title)
            .fetch_one(pool)
            .await
            .expect("seed lookup")
    }

    Lookups {
        department_id: insert(pool, "departments", unique("Engineering")).await,
        employment_id: insert(pool, "employments", unique("Full Time")).await,
        experience_id: insert(pool, "experiences", unique("Senior")).await,
    }
}

pub async fn insert_vacancy(pool: &PgPool, lookups: &Lookups, seed: SeedVacancy) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO vacancies (
            title_en, title_id, department_id, employment_id, experience_id,
            work_mode, posted_date, closed_date, urgent, is_active, created_by
        ) VALUES ($1, $1, $2, $3, $4, 'Onsite', $5, $6, $7, $8, 'seed')
        RETURNING id
        "#,
    )
    .bind(seed.title)
    .bind(lookups.department_id)
    .bind(lookups.employment_id)
    .bind(lookups.experience_id)
    .bind(seed.posted)
    .bind(seed.closed)
    .bind(seed.urgent)
    .bind(seed.active)
    .fetch_one(pool)
    .await
    .expect("seed vacancy")
}

pub fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn authed(method: &str, uri: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", HR_TOKEN));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}
