// In-process mock of the console backend for integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use voter_console::ConsoleConfig;

pub const PASSWORD: &str = "secret";
pub const VOTER_TOTAL: usize = 23;
pub const REPORT_BYTES: &[u8] = b"PK\x03\x04mock-xlsx";

#[derive(Default)]
pub struct MockState {
    // Authorization header of every request, in arrival order.
    pub authorizations: Mutex<Vec<Option<String>>>,
    pub fail_chief_stats: AtomicBool,
    // Hits on the /leaders and /chiefs lookup lists.
    pub lookup_calls: AtomicUsize,
    pub report_queries: Mutex<Vec<HashMap<String, String>>>,
}

impl MockState {
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.authorizations.lock().expect("mutex poisoned").clone()
    }

    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.authorizations.lock().expect("mutex poisoned").push(value);
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn config(&self) -> ConsoleConfig {
        config_for(&self.base_url)
    }
}

pub fn config_for(base_url: &str) -> ConsoleConfig {
    let base_url = base_url.to_string();
    ConsoleConfig::from_sources(None, move |key| match key {
        "API_BASE_URL" => Some(base_url.clone()),
        "REQUEST_TIMEOUT_MS" => Some("2000".to_string()),
        _ => None,
    })
    .expect("valid test config")
}

// Binds an ephemeral port and serves the mock on the current runtime.
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/digitadores", get(agents))
        .route("/dashboard/leaders", get(leader_stats))
        .route("/dashboard/chiefs", get(chief_stats))
        .route("/leaders", get(leaders))
        .route("/leaders/{id}", delete(delete_leader))
        .route("/chiefs", get(chiefs))
        .route("/voters", post(register_voter))
        .route("/voters/my-records", get(my_records))
        .route("/users", post(create_user))
        .route("/reports/leader", get(report))
        .route("/reports/chief", get(report))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend failed");
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

// Address that refuses connections.
pub async fn closed_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn token_for(username: &str, role: &str, exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "sub": 7,
        "username": username,
        "fullName": format!("{username} full"),
        "role": role,
        "exp": exp,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.mock-signature")
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(status: StatusCode, message: Value) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(Json(credentials): Json<Credentials>) -> Response {
    if credentials.password != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, json!("Credenciales invalidas"));
    }
    let role = match credentials.username.as_str() {
        "admin" => "admin",
        "viewer" => "viewer",
        _ => "digitador",
    };
    let token = token_for(&credentials.username, role, now() + 3600);
    ok(json!({ "access_token": token }))
}

async fn stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    ok(json!({ "total": 40, "success": 20, "pending": 10, "failed": 6, "error": 4 }))
}

async fn agents(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    ok(json!([{ "id": 3, "username": "dig01", "fullName": "Digitador Uno", "total": 40 }]))
}

async fn leader_stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    let rows: Vec<Value> = (1..=7)
        .map(|n| json!({ "id": format!("l-{n}"), "nombre": format!("Leader {n}"), "totalVoters": n }))
        .collect();
    ok(Value::Array(rows))
}

async fn chief_stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    if state.fail_chief_stats.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    ok(json!([{ "id": "c-1", "nombre": "Jefe Norte", "leaderCount": 2, "voterCount": 30 }]))
}

// Lookup lists are served without the envelope.
async fn leaders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    state.lookup_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        { "id": "l-1", "cedula": "100200", "nombre": "Leader One", "telefono": "3000000001" },
        { "id": "l-2", "cedula": "100300", "nombre": "Leader Two", "telefono": "3000000002" }
    ]))
    .into_response()
}

async fn chiefs(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record(&headers);
    state.lookup_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([{ "id": "c-1", "nombre": "Jefe Norte", "cedula": "900100" }])).into_response()
}

async fn delete_leader(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn register_voter(Json(body): Json<Value>) -> Response {
    if body["cedula"] == "111111" {
        return fail(StatusCode::CONFLICT, json!("Cedula duplicada"));
    }
    let mut voter = body;
    voter["id"] = json!("v-new");
    voter["verification_status"] = json!("PENDING");
    (StatusCode::CREATED, Json(json!({ "success": true, "data": voter }))).into_response()
}

async fn create_user() -> Response {
    fail(
        StatusCode::BAD_REQUEST,
        json!(["username must be unique", "password is too weak"]),
    )
}

#[derive(Deserialize)]
struct RecordsQuery {
    page: u32,
    limit: u32,
    search: Option<String>,
}

async fn my_records(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<RecordsQuery>,
) -> Response {
    state.record(&headers);
    let voters: Vec<Value> = (1..=VOTER_TOTAL)
        .map(|n| {
            json!({
                "id": format!("v-{n}"),
                "cedula": format!("{}", 1_000_000 + n),
                "nombre": format!("Voter {n}"),
                "telefono": "3001112233",
                "leader_id": "l-1",
                "verification_status": "SUCCESS"
            })
        })
        .filter(|voter| match &query.search {
            Some(search) => voter["cedula"]
                .as_str()
                .is_some_and(|cedula| cedula.contains(search.as_str())),
            None => true,
        })
        .collect();

    let limit = query.limit.max(1) as usize;
    let start = (query.page.saturating_sub(1) as usize) * limit;
    let items: Vec<Value> = voters.iter().skip(start).take(limit).cloned().collect();
    ok(json!({
        "items": items,
        "total": voters.len(),
        "page": query.page,
        "limit": query.limit,
        // Deliberately wrong; the client recomputes it.
        "totalPages": 99
    }))
}

async fn report(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.report_queries.lock().expect("mutex poisoned").push(query);
    (
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        REPORT_BYTES,
    )
        .into_response()
}
