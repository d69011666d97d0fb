//! HttpGateway against an in-process axum backend

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use student_portal::api::{ApiGateway, HttpGateway, ProfileUpdate, RecordPatch};
use student_portal::auth::{LoginRequest, MemoryTokenStore, SessionStore, Status, TokenStore};
use student_portal::core::ErrorKind;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Backend {
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Backend {
    fn record(&self, what: impl Into<String>, body: Value) {
        self.seen.lock().unwrap().push((what.into(), body));
    }

    fn seen(&self) -> Vec<(String, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer T")
}

fn unauthorized() -> axum::response::Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Not authorized" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == "a@x.com" && body["password"] == "secret" {
        Json(json!({
            "token": "T",
            "user": { "_id": "u1", "fullName": "A", "email": "a@x.com", "role": "student" }
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response()
    }
}

async fn list_users(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "_id": "s1", "fullName": "Ada", "email": "ada@x.com", "phone": "555",
          "role": "student", "course": "Maths", "enrollmentYear": 2021, "status": "Active" },
        { "_id": "s2", "fullName": "Bob", "email": "bob@x.com",
          "role": "student", "status": "Dropped" }
    ]))
    .into_response()
}

async fn stats(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "total": 2, "active": 1, "graduated": 0, "dropped": 1 })).into_response()
}

async fn update_user(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.record(format!("PUT {}", id), body);
    Json(json!({ "message": "User updated" })).into_response()
}

async fn delete_user(Path(id): Path<String>) -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": format!("User {} not found", id) }))).into_response()
}

async fn update_profile(State(backend): State<Backend>, Json(body): Json<Value>) -> impl IntoResponse {
    backend.record("PROFILE", body.clone());
    Json(json!({
        "user": {
            "id": "u1",
            "fullName": body["fullName"],
            "email": "a@x.com",
            "phone": body["phone"],
            "role": "student",
            "course": body["course"],
            "enrollmentYear": body["enrollmentYear"]
        }
    }))
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id", put(update_user).delete(delete_user))
        .route("/api/admin/stats", get(stats))
        .route("/api/users/profile", put(update_profile))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

fn gateway(base: &str, tokens: Arc<dyn TokenStore>) -> HttpGateway {
    HttpGateway::with_client(reqwest::Client::new(), base, tokens).unwrap()
}

#[tokio::test]
async fn test_login_then_authenticated_list() {
    let (base, _) = spawn_backend().await;
    let session = SessionStore::new(Arc::new(MemoryTokenStore::new()));
    let gw = gateway(&base, session.token_store());

    let response = gw
        .login(&LoginRequest {
            email: "a@x.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, "u1");
    session.begin(&response.token, response.user).unwrap();

    let records = gw.list_records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "s1");
    assert_eq!(records[1].status, Status::Dropped);
    assert_eq!(records[1].course, None);

    let stats = gw.fetch_stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.dropped, 1);
}

#[tokio::test]
async fn test_rejected_login_carries_server_message() {
    let (base, _) = spawn_backend().await;
    let gw = gateway(&base, Arc::new(MemoryTokenStore::new()));

    let err = gw
        .login(&LoginRequest {
            email: "a@x.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (base, _) = spawn_backend().await;
    let gw = gateway(&base, Arc::new(MemoryTokenStore::new()));

    let err = gw.list_records().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.user_message("Failed to fetch students"), "Not authorized");
}

#[tokio::test]
async fn test_status_patch_sends_single_field() {
    let (base, backend) = spawn_backend().await;
    let gw = gateway(&base, Arc::new(MemoryTokenStore::with_token("T")));

    gw.update_record("s1", &RecordPatch::status(Status::Graduated))
        .await
        .unwrap();

    assert_eq!(
        backend.seen(),
        vec![("PUT s1".to_string(), json!({ "status": "Graduated" }))]
    );
}

#[tokio::test]
async fn test_delete_not_found() {
    let (base, _) = spawn_backend().await;
    let gw = gateway(&base, Arc::new(MemoryTokenStore::with_token("T")));

    let err = gw.delete_record("s9").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.user_message("Failed to delete student"), "User s9 not found");
}

#[tokio::test]
async fn test_profile_update_returns_new_identity() {
    let (base, backend) = spawn_backend().await;
    let gw = gateway(&base, Arc::new(MemoryTokenStore::with_token("T")));

    let identity = gw
        .update_profile(&ProfileUpdate {
            full_name: "Ada King".into(),
            phone: "555".into(),
            course: String::new(),
            enrollment_year: 2022,
        })
        .await
        .unwrap();

    assert_eq!(identity.full_name, "Ada King");
    assert_eq!(identity.enrollment_year, Some(2022));
    let (_, sent) = backend.seen().pop().unwrap();
    assert_eq!(sent["course"], "");
}
