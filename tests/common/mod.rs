//! Shared fixtures: an in-process mock backend and recording test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use snapconsole::api::Notifier;
use snapconsole::auth::{HttpIdentityProbe, Identity, IdentityProbe, MemoryStorage, ProbeOutcome, Role};
use snapconsole::config::Config;
use snapconsole::App;

/// Backend double speaking the `{code, message, data}` envelope
#[derive(Default)]
pub struct MockBackend {
    /// username -> (password, role)
    users: Mutex<HashMap<String, (String, String)>>,
    /// token -> username
    tokens: Mutex<HashMap<String, String>>,
    /// (path, Authorization header) for every request received
    requests: Mutex<Vec<(String, Option<String>)>>,
    profile_hits: AtomicUsize,
}

impl MockBackend {
    pub fn add_user(&self, username: &str, password: &str, role: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), (password.to_string(), role.to_string()));
    }

    /// Register a token the backend will accept without a login round trip
    pub fn issue_token(&self, token: &str, username: &str) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), username.to_string());
    }

    pub fn revoke_all(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn profile_hits(&self) -> usize {
        self.profile_hits.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Authorization header sent with the most recent request to `path`
    pub fn last_auth_for(&self, path: &str) -> Option<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
    }

    fn record(&self, path: &str, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        self.requests.lock().unwrap().push((path.to_string(), auth));
    }

    /// Resolve the bearer token to (username, role)
    fn caller(&self, headers: &HeaderMap) -> Option<(String, String)> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .to_string();
        let username = self.tokens.lock().unwrap().get(&token)?.clone();
        let role = self.users.lock().unwrap().get(&username)?.1.clone();
        Some((username, role))
    }
}

type Reply = (StatusCode, Json<Value>);

fn ok(data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"code": 200, "message": "success", "data": data})),
    )
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({"code": status.as_u16(), "message": message})),
    )
}

fn unauthorized() -> Reply {
    fail(StatusCode::UNAUTHORIZED, "invalid token")
}

async fn login(State(mock): State<Arc<MockBackend>>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    mock.record("/auth/login", &headers);
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let role = match mock.users.lock().unwrap().get(&username) {
        Some((expected, role)) if expected == password => role.clone(),
        _ => return fail(StatusCode::UNAUTHORIZED, "invalid username or password"),
    };

    let token = format!("token-{}", username);
    mock.issue_token(&token, &username);
    ok(json!({
        "token": token,
        "user": {"id": "1", "username": username, "role": role}
    }))
}

async fn register(State(mock): State<Arc<MockBackend>>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    mock.record("/auth/register", &headers);
    let username = body["username"].as_str().unwrap_or_default();
    if mock.users.lock().unwrap().contains_key(username) {
        return fail(StatusCode::BAD_REQUEST, "user already exists");
    }
    mock.add_user(
        username,
        body["password"].as_str().unwrap_or_default(),
        body["role"].as_str().unwrap_or("readonly"),
    );
    ok(json!({"username": username}))
}

async fn profile(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/user/profile", &headers);
    mock.profile_hits.fetch_add(1, Ordering::SeqCst);
    match mock.caller(&headers) {
        Some((username, role)) => ok(json!({"username": username, "role": role})),
        None => unauthorized(),
    }
}

async fn change_password(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    mock.record("/user/change-password", &headers);
    let Some((username, _)) = mock.caller(&headers) else {
        return unauthorized();
    };
    let mut users = mock.users.lock().unwrap();
    let entry = users.get_mut(&username).expect("caller exists");
    if body["oldPassword"].as_str() != Some(entry.0.as_str()) {
        return ok_logical(400, "old password is incorrect");
    }
    entry.0 = body["newPassword"].as_str().unwrap_or_default().to_string();
    ok(Value::Null)
}

fn ok_logical(code: i64, message: &str) -> Reply {
    (StatusCode::OK, Json(json!({"code": code, "message": message})))
}

async fn snapshots(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    mock.record("/volumesnapshots", &headers);
    if mock.caller(&headers).is_none() {
        return unauthorized();
    }
    let namespace = query.get("namespace").cloned().unwrap_or_default();
    ok(json!([
        {"metadata": {"name": "snap-1", "namespace": namespace}, "readyToUse": true}
    ]))
}

/// Echoes the decoded name so callers can check what the backend saw
async fn snapshot_content(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Reply {
    mock.record("/volumesnapshotcontents", &headers);
    if mock.caller(&headers).is_none() {
        return unauthorized();
    }
    ok(json!({"metadata": {"name": name}}))
}

async fn list_of(path: &'static str, mock: &MockBackend, headers: &HeaderMap) -> Reply {
    mock.record(path, headers);
    if mock.caller(headers).is_none() {
        return unauthorized();
    }
    ok(json!([]))
}

async fn snapshot_classes(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    list_of("/volumesnapshotclasses", &mock, &headers).await
}

async fn scheduled(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    list_of("/scheduled-snapshots", &mock, &headers).await
}

async fn namespaces(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    list_of("/namespaces", &mock, &headers).await
}

async fn current_cluster(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/clusters/current", &headers);
    if mock.caller(&headers).is_none() {
        return unauthorized();
    }
    ok(json!({"name": "primary"}))
}

async fn clusters(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    list_of("/clusters", &mock, &headers).await
}

async fn all_users(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/user/all", &headers);
    match mock.caller(&headers) {
        None => unauthorized(),
        Some((_, role)) if role != "admin" => fail(StatusCode::FORBIDDEN, "permission denied"),
        Some(_) => ok(json!([{"username": "admin", "role": "admin"}])),
    }
}

/// Answers HTTP 200 with a failing envelope
async fn pvcs(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/pvcs", &headers);
    ok_logical(500, "bad request")
}

/// Always 401, whatever credential is sent
async fn storage_classes(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/storageclasses", &headers);
    unauthorized()
}

async fn ceph_status(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Reply {
    mock.record("/ceph/cluster/status", &headers);
    fail(StatusCode::INTERNAL_SERVER_ERROR, "ceph unreachable")
}

/// Start the mock backend on an ephemeral port
pub async fn spawn_backend() -> (Arc<MockBackend>, SocketAddr) {
    let mock = Arc::new(MockBackend::default());

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/user/profile", get(profile))
        .route("/api/user/change-password", post(change_password))
        .route("/api/user/all", get(all_users))
        .route("/api/volumesnapshots", get(snapshots))
        .route("/api/volumesnapshotclasses", get(snapshot_classes))
        .route("/api/volumesnapshotcontents/{name}", get(snapshot_content))
        .route("/api/scheduled-snapshots", get(scheduled))
        .route("/api/namespaces", get(namespaces))
        .route("/api/clusters", get(clusters))
        .route("/api/clusters/current", get(current_cluster))
        .route("/api/pvcs", get(pvcs))
        .route("/api/storageclasses", get(storage_classes))
        .route("/api/ceph/cluster/status", get(ceph_status))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (mock, addr)
}

pub fn config_for(addr: SocketAddr) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("http://{}/api", addr);
    config.api.timeout_secs = 5;
    config
}

/// Notifier that remembers what it was asked to show
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Probe that never touches the network and counts how often it is asked
pub struct CountingProbe {
    pub outcome: ProbeOutcome,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl CountingProbe {
    pub fn valid(username: &str, role: Role) -> Arc<Self> {
        Self::answering(ProbeOutcome::Valid(Identity::new(username, role)), None)
    }

    pub fn rejecting() -> Arc<Self> {
        Self::answering(ProbeOutcome::Rejected("HTTP 401".to_string()), None)
    }

    /// Rejects every credential after `delay`
    pub fn slow_rejecting(delay: Duration) -> Arc<Self> {
        Self::answering(ProbeOutcome::Rejected("HTTP 401".to_string()), Some(delay))
    }

    fn answering(outcome: ProbeOutcome, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProbe for CountingProbe {
    async fn probe(&self, _credential: &str) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// App wired to the mock backend with in-memory snapshot storage
pub struct Harness {
    pub app: App,
    pub addr: SocketAddr,
    pub mock: Arc<MockBackend>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub async fn start() -> Self {
        let (mock, addr) = spawn_backend().await;
        Self::with_storage(mock, addr, Arc::new(MemoryStorage::new()))
    }

    /// A second app sharing the same backend and storage, like a page reload
    pub fn reload(&self) -> Self {
        Self::with_storage(self.mock.clone(), self.addr, self.storage.clone())
    }

    pub fn with_storage(mock: Arc<MockBackend>, addr: SocketAddr, storage: Arc<MemoryStorage>) -> Self {
        let config = config_for(addr);
        let probe = Arc::new(HttpIdentityProbe::new(&config.api).expect("probe"));
        let notifier = Arc::new(RecordingNotifier::default());
        let app = App::with_parts(config, storage.clone(), probe, notifier.clone()).expect("app");
        Self {
            app,
            addr,
            mock,
            storage,
            notifier,
        }
    }
}
