//! Integration tests for the hrms-client gateway.
//!
//! These tests run the client against an in-process axum backend that
//! validates bearer tokens, so 401 recovery, refresh sharing and session
//! teardown go through real HTTP.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use hrms_client::{
    ApiRequest, AuthService, ClientConfig, Credential, Gateway, GatewayError, Session,
    SessionEndReason,
};
use jsonwebtoken::{EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{Value, json};

const SIGNING_SECRET: &[u8] = b"integration-test-secret";
const EMAIL: &str = "hr@thrivebrands.example";
const PASSWORD: &str = "correct horse";

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: Option<String>,
    bearer: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

/// What `/auth/refresh` does.
#[derive(Debug, Clone, Copy)]
enum RefreshMode {
    Issue,
    Reject(StatusCode),
    /// 200 without an access token.
    Malformed,
}

struct Backend {
    accepted: Mutex<HashSet<String>>,
    refresh_tokens: Mutex<HashSet<String>>,
    forced: Mutex<HashMap<String, StatusCode>>,
    delays: Mutex<HashMap<String, Duration>>,
    refresh_mode: Mutex<RefreshMode>,
    refresh_delay: Mutex<Duration>,
    refresh_calls: AtomicUsize,
    issued: AtomicUsize,
    logout_status: Mutex<StatusCode>,
    seen: Mutex<Vec<Seen>>,
}

impl Backend {
    fn new() -> Self {
        Self {
            accepted: Mutex::new(HashSet::new()),
            refresh_tokens: Mutex::new(HashSet::new()),
            forced: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            refresh_mode: Mutex::new(RefreshMode::Issue),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            issued: AtomicUsize::new(0),
            logout_status: Mutex::new(StatusCode::OK),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn accept_refresh_token(&self, token: &str) {
        self.refresh_tokens.lock().insert(token.to_string());
    }

    /// Respond with `status` on `path` even to authorized callers.
    fn force(&self, path: &str, status: StatusCode) {
        self.forced.lock().insert(path.to_string(), status);
    }

    /// Hold every response on `path` for `delay`.
    fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().insert(path.to_string(), delay);
    }

    fn seen_on(&self, path: &str) -> Vec<Seen> {
        self.seen
            .lock()
            .iter()
            .filter(|s| s.path == path)
            .cloned()
            .collect()
    }

    /// Mint and accept a fresh token pair.
    fn issue_pair(&self) -> (String, String) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = mint_token(3600, n);
        let refresh = format!("refresh-{n}");
        self.accepted.lock().insert(access.clone());
        self.refresh_tokens.lock().insert(refresh.clone());
        (access, refresh)
    }
}

fn mint_token(expires_in_secs: i64, serial: usize) -> String {
    let claims = json!({
        "exp": chrono::Utc::now().timestamp() + expires_in_secs,
        "jti": serial,
        "user": { "email": EMAIL, "role": "admin" },
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .expect("Failed to sign test token")
}

async fn handle(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let path = uri.path().to_string();
    backend.seen.lock().push(Seen {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        bearer: bearer.clone(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    });

    let delay = backend.delays.lock().get(&path).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    match path.as_str() {
        "/auth/login" => login(&backend, &body),
        "/auth/refresh" => refresh(&backend, &body).await,
        "/auth/logout" => (*backend.logout_status.lock()).into_response(),
        _ => {
            let authorized = bearer
                .as_ref()
                .is_some_and(|token| backend.accepted.lock().contains(token));
            if !authorized {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" })))
                    .into_response();
            }
            if let Some(status) = backend.forced.lock().get(&path).copied() {
                return (status, Json(json!({ "message": "Forbidden by test" }))).into_response();
            }
            Json(json!({ "path": path, "query": uri.query(), "token": bearer })).into_response()
        }
    }
}

fn login(backend: &Backend, body: &[u8]) -> Response {
    let body: Value = serde_json::from_slice(body).unwrap_or_default();
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response();
    }
    let (access, refresh) = backend.issue_pair();
    Json(json!({
        "accessToken": access,
        "refreshToken": refresh,
        "user": { "email": EMAIL, "name": "HR Admin" },
    }))
    .into_response()
}

async fn refresh(backend: &Backend, body: &[u8]) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = *backend.refresh_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mode = *backend.refresh_mode.lock();
    match mode {
        RefreshMode::Issue => {}
        RefreshMode::Reject(status) => {
            return (status, Json(json!({ "message": "Refresh token expired" }))).into_response();
        }
        RefreshMode::Malformed => {
            return Json(json!({ "refreshToken": "refresh-orphan" })).into_response();
        }
    }

    let body: Value = serde_json::from_slice(body).unwrap_or_default();
    let known = body["refreshToken"]
        .as_str()
        .is_some_and(|t| backend.refresh_tokens.lock().contains(t));
    if !known {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let (access, refresh) = backend.issue_pair();
    Json(json!({ "accessToken": access, "refreshToken": refresh })).into_response()
}

/// Helper to start the mock backend on an ephemeral port.
async fn spawn_backend() -> (Arc<Backend>, SocketAddr) {
    let backend = Arc::new(Backend::new());
    let app = Router::new()
        .fallback(handle)
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    (backend, addr)
}

/// Helper to build a gateway whose session holds an access token the backend
/// no longer accepts plus a valid refresh token.
async fn setup_expired_session() -> (Arc<Backend>, Gateway) {
    let (backend, addr) = spawn_backend().await;
    backend.accept_refresh_token("refresh-0");

    let config = ClientConfig::new(&format!("http://{addr}/")).expect("Invalid test base URL");
    let session = Arc::new(Session::in_memory());
    session
        .establish(Credential::new(mint_token(-60, 0), Some("refresh-0".to_string())))
        .await;

    (backend, Gateway::new(config, session))
}

fn bearer_of(gateway: &Gateway) -> String {
    gateway
        .session()
        .current_credential()
        .expect("Session should be active")
        .access_token
}

mod recovery_tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let (backend, gateway) = setup_expired_session().await;
        *backend.refresh_delay.lock() = Duration::from_millis(200);

        let requests = [
            ApiRequest::get("/employee/getAllEmployees"),
            ApiRequest::get("/attendance/getAllAttendances"),
            ApiRequest::get("/employee/getEmployeeById").query("id", 5),
        ]
        .map(|request| {
            let gateway = gateway.clone();
            async move { gateway.send_json::<Value>(request).await }
        });
        let results = futures::future::join_all(requests).await;

        assert_eq!(backend.refresh_calls(), 1);
        let new_token = bearer_of(&gateway);
        for result in results {
            let body = result.expect("Request should succeed after refresh");
            assert_eq!(body["token"], new_token.as_str());
        }
        assert_eq!(
            backend.seen_on("/employee/getEmployeeById")[1].query.as_deref(),
            Some("id=5")
        );

        let stats = gateway.refresh_stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.succeeded, 1);
        assert!(!gateway.refresh_in_flight());
    }

    #[tokio::test]
    async fn test_retry_outcome_is_final() {
        let (backend, gateway) = setup_expired_session().await;
        backend.force("/employee/updateEmployee", StatusCode::FORBIDDEN);

        let request = ApiRequest::put("/employee/updateEmployee")
            .query("id", "7")
            .json_value(json!({ "designation": "Lead" }));
        let err = gateway
            .send(request)
            .await
            .expect_err("Forbidden retry should surface");

        assert!(matches!(
            err,
            GatewayError::Rejected { status, ref message }
                if status == StatusCode::FORBIDDEN && message == "Forbidden by test"
        ));
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(backend.seen_on("/employee/updateEmployee").len(), 2);
        assert!(gateway.session().current_credential().is_some());
    }

    #[tokio::test]
    async fn test_second_401_does_not_refresh_again() {
        let (backend, gateway) = setup_expired_session().await;
        backend.force("/attendance/markAttendance", StatusCode::UNAUTHORIZED);

        let request = ApiRequest::post("/attendance/markAttendance")
            .json_value(json!({ "status": "present" }));
        let err = gateway
            .send(request)
            .await
            .expect_err("Still unauthorized after refresh");

        assert!(matches!(
            err,
            GatewayError::AuthenticationExpired { ref path } if path == "/attendance/markAttendance"
        ));
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(backend.seen_on("/attendance/markAttendance").len(), 2);
    }

    #[tokio::test]
    async fn test_retry_carries_replacement_token_and_body() {
        let (backend, gateway) = setup_expired_session().await;
        let stale = gateway
            .session()
            .current_credential()
            .expect("Session should be established")
            .access_token;

        gateway
            .send(
                ApiRequest::put("/employee/updateEmployee")
                    .query("id", "12")
                    .json_value(json!({ "designation": "Lead" })),
            )
            .await
            .expect("Retry should succeed");

        let seen = backend.seen_on("/employee/updateEmployee");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].bearer.as_deref(), Some(stale.as_str()));
        assert_ne!(seen[1].bearer, seen[0].bearer);
        assert_eq!(seen[1].method, Method::PUT);
        assert_eq!(seen[1].query.as_deref(), Some("id=12"));
        assert_eq!(seen[0].body, seen[1].body);
    }

    #[tokio::test]
    async fn test_late_401_reuses_rotated_credential() {
        let (backend, gateway) = setup_expired_session().await;
        let stale = bearer_of(&gateway);
        // The slow request's 401 lands after the fast one has refreshed.
        backend.delay("/attendance/getAllAttendances", Duration::from_millis(300));

        let slow = {
            let gateway = gateway.clone();
            async move {
                gateway
                    .send_json::<Value>(ApiRequest::get("/attendance/getAllAttendances"))
                    .await
            }
        };
        let fast = {
            let gateway = gateway.clone();
            async move {
                let body = gateway
                    .send_json::<Value>(ApiRequest::get("/employee/getEmployeeById").query("id", 5))
                    .await;
                assert!(!gateway.refresh_in_flight());
                body
            }
        };
        let (slow, fast) = tokio::join!(slow, fast);
        fast.expect("Fast request recovers");
        let slow = slow.expect("Slow request recovers without a second refresh");

        let new_token = bearer_of(&gateway);
        assert_eq!(slow["token"], new_token.as_str());
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(gateway.refresh_stats().started, 1);

        let seen = backend.seen_on("/attendance/getAllAttendances");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].bearer.as_deref(), Some(stale.as_str()));
        assert_eq!(seen[1].bearer.as_deref(), Some(new_token.as_str()));
    }

    #[tokio::test]
    async fn test_401_on_auth_route_is_not_recovered() {
        let (backend, gateway) = setup_expired_session().await;

        let err = gateway
            .send(ApiRequest::get("/auth/profile"))
            .await
            .expect_err("Auth route 401 surfaces unchanged");

        assert!(matches!(err, GatewayError::AuthenticationExpired { .. }));
        assert_eq!(backend.refresh_calls(), 0);
        assert!(gateway.session().current_credential().is_some());
    }

    #[tokio::test]
    async fn test_non_401_errors_pass_through() {
        let (backend, gateway) = setup_expired_session().await;
        // Valid credential, so the first response is final.
        let (access, refresh) = backend.issue_pair();
        gateway
            .session()
            .establish(Credential::new(access, Some(refresh)))
            .await;
        backend.force("/employee/getEmployeeById", StatusCode::INTERNAL_SERVER_ERROR);

        let err = gateway
            .send(ApiRequest::get("/employee/getEmployeeById").query("id", "1"))
            .await
            .expect_err("500 should surface");

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(backend.refresh_calls(), 0);
        assert_eq!(backend.seen_on("/employee/getEmployeeById").len(), 1);
    }
}

mod session_end_tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_refresh_ends_session_for_every_waiter() {
        let (backend, gateway) = setup_expired_session().await;
        *backend.refresh_mode.lock() = RefreshMode::Reject(StatusCode::UNAUTHORIZED);
        *backend.refresh_delay.lock() = Duration::from_millis(200);

        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        gateway.session().on_session_ended(move |reason| {
            assert!(matches!(reason, SessionEndReason::RefreshFailed(_)));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut events = gateway.session().subscribe();

        let requests = (0..3).map(|i| {
            let gateway = gateway.clone();
            let request =
                ApiRequest::get("/attendance/getEmployeeAttendance").query("employeeId", i);
            async move { gateway.send(request).await }
        });
        let results = futures::future::join_all(requests).await;

        for result in results {
            let err = result.expect_err("Every waiter should fail");
            assert!(err.is_session_ended(), "unexpected error: {err:?}");
            assert!(err.requires_relogin());
        }
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert!(gateway.session().current_credential().is_none());
        assert!(!gateway.session().is_authenticated());

        let event = events.recv().await.expect("Ended event expected");
        assert!(matches!(event, hrms_client::SessionEvent::Ended { .. }));

        // No request was retried.
        assert_eq!(backend.seen_on("/attendance/getEmployeeAttendance").len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_without_access_token_ends_session() {
        let (backend, gateway) = setup_expired_session().await;
        *backend.refresh_mode.lock() = RefreshMode::Malformed;

        let err = gateway
            .send(ApiRequest::get("/employee/getAllEmployees"))
            .await
            .expect_err("Malformed refresh reply");

        match err {
            GatewayError::SessionEnded(SessionEndReason::RefreshFailed(message)) => {
                assert!(message.contains("No access token received"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.refresh_calls(), 1);
        assert!(gateway.session().current_credential().is_none());
        assert_eq!(backend.seen_on("/employee/getAllEmployees").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_ends_session_without_exchange() {
        let (backend, gateway) = setup_expired_session().await;
        gateway
            .session()
            .establish(Credential::new(mint_token(-60, 0), None))
            .await;

        let err = gateway
            .send(ApiRequest::get("/attendance/getAllAttendances"))
            .await
            .expect_err("Nothing to refresh with");

        assert!(err.is_session_ended(), "unexpected error: {err:?}");
        assert_eq!(backend.refresh_calls(), 0);
        assert!(backend.seen_on("/auth/refresh").is_empty());
        assert!(gateway.session().current_credential().is_none());
        assert_eq!(gateway.refresh_stats().failed, 1);
    }

    #[tokio::test]
    async fn test_late_401_after_failed_refresh_does_not_end_again() {
        let (backend, gateway) = setup_expired_session().await;
        *backend.refresh_mode.lock() = RefreshMode::Reject(StatusCode::UNAUTHORIZED);
        backend.delay("/attendance/getAllAttendances", Duration::from_millis(300));

        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        gateway.session().on_session_ended(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (slow, fast) = tokio::join!(
            gateway.send(ApiRequest::get("/attendance/getAllAttendances")),
            gateway.send(ApiRequest::get("/employee/getAllEmployees")),
        );

        assert!(fast.expect_err("Refresh rejected").is_session_ended());
        assert!(slow.expect_err("Session already over").is_session_ended());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(gateway.refresh_stats().started, 1);
    }

    #[tokio::test]
    async fn test_new_episode_after_failure() {
        let (backend, gateway) = setup_expired_session().await;
        *backend.refresh_mode.lock() = RefreshMode::Reject(StatusCode::BAD_REQUEST);

        let err = gateway
            .send(ApiRequest::get("/employee/getAllEmployees"))
            .await
            .expect_err("Refresh rejected");
        assert!(err.is_session_ended());

        // Logging in again starts a fresh session that can recover on its own.
        *backend.refresh_mode.lock() = RefreshMode::Issue;
        let auth = AuthService::new(gateway.clone());
        auth.login(EMAIL, PASSWORD).await.expect("Login should succeed");
        gateway
            .send(ApiRequest::get("/employee/getAllEmployees"))
            .await
            .expect("Fresh session works");

        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(gateway.refresh_stats().failed, 1);
    }
}

mod auth_tests {
    use super::*;
    use hrms_client::{CredentialStore, FileCredentialStore};

    async fn setup_auth() -> (Arc<Backend>, AuthService) {
        let (backend, addr) = spawn_backend().await;
        let config = ClientConfig::new(&format!("http://{addr}")).expect("Invalid test base URL");
        let gateway = Gateway::new(config, Arc::new(Session::in_memory()));
        (backend, AuthService::new(gateway))
    }

    #[tokio::test]
    async fn test_login_installs_credential() {
        let (_backend, auth) = setup_auth().await;
        assert!(!auth.is_authenticated());

        let outcome = auth.login(EMAIL, PASSWORD).await.expect("Login failed");

        assert_eq!(outcome.user.expect("user")["name"], "HR Admin");
        assert!(auth.is_authenticated());
        assert!(auth.is_token_valid());
        assert_eq!(auth.access_token(), Some(outcome.credential.access_token));
        assert_eq!(auth.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(auth.current_user().expect("decoded user")["role"], "admin");
    }

    #[tokio::test]
    async fn test_login_rejection_is_invalid_credentials() {
        let (backend, auth) = setup_auth().await;
        // A stale session must not turn a bad password into a refresh.
        auth.gateway()
            .session()
            .establish(Credential::new(mint_token(-60, 0), Some("refresh-0".to_string())))
            .await;
        backend.accept_refresh_token("refresh-0");

        let err = auth
            .login(EMAIL, "wrong")
            .await
            .expect_err("Bad password must fail");

        assert!(matches!(err, hrms_client::AuthError::InvalidCredentials(_)));
        assert_eq!(backend.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let (backend, auth) = setup_auth().await;
        auth.login(EMAIL, PASSWORD).await.expect("Login failed");
        *backend.logout_status.lock() = StatusCode::INTERNAL_SERVER_ERROR;

        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        auth.gateway().session().on_session_ended(move |reason| {
            assert_eq!(reason, &SessionEndReason::LoggedOut);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        auth.logout().await;

        assert!(!auth.is_authenticated());
        assert!(auth.access_token().is_none());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert_eq!(backend.seen_on("/auth/logout").len(), 1);
        assert_eq!(backend.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_refreshed_credential_is_persisted() {
        let (backend, addr) = spawn_backend().await;
        backend.accept_refresh_token("refresh-0");
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FileCredentialStore::new(dir.path().join("session.json")));

        let session = Arc::new(Session::new(store.clone()));
        session
            .establish(Credential::new(mint_token(-60, 0), Some("refresh-0".to_string())))
            .await;
        let config = ClientConfig::new(&format!("http://{addr}/")).expect("Invalid test base URL");
        let gateway = Gateway::new(config, session);

        gateway
            .send(ApiRequest::get("/employee/getAllEmployees"))
            .await
            .expect("Recovered request");

        let persisted = store.load().await.expect("load").expect("credential");
        assert_eq!(persisted.refresh_token.as_deref(), Some("refresh-1"));

        // A new process picks the refreshed credential up again.
        let restored = Session::new(store);
        assert!(restored.restore().await.expect("restore"));
        assert_eq!(
            restored.current_credential().map(|c| c.access_token),
            Some(persisted.access_token)
        );
    }
}

mod service_tests {
    use super::*;
    use chrono::NaiveDate;
    use hrms_client::{AttendanceService, Company, EmployeeService, MultipartPart};

    async fn setup_logged_in() -> (Arc<Backend>, Gateway) {
        let (backend, addr) = spawn_backend().await;
        let config = ClientConfig::new(&format!("http://{addr}/")).expect("Invalid test base URL");
        let gateway = Gateway::new(config, Arc::new(Session::in_memory()));
        AuthService::new(gateway.clone())
            .login(EMAIL, PASSWORD)
            .await
            .expect("Login failed");
        (backend, gateway)
    }

    #[tokio::test]
    async fn test_employee_endpoints() {
        let (backend, gateway) = setup_logged_in().await;
        let employees = EmployeeService::new(gateway);

        let body: Value = employees.get_employee_by_id("42").await.expect("get");
        assert_eq!(body["path"], "/employee/getEmployeeById");
        assert_eq!(body["query"], "id=42");

        let _: Value = employees
            .get_company_employees(Company::ThriveBrands)
            .await
            .expect("company list");
        assert_eq!(backend.seen_on("/employee/getThriveBrandsEmployees").len(), 1);

        let _: Value = employees.toggle_active("42").await.expect("toggle");
        let toggle = &backend.seen_on("/employee/isActiveToggle")[0];
        assert_eq!(toggle.method, Method::PUT);
        assert_eq!(toggle.query.as_deref(), Some("id=42"));
    }

    #[tokio::test]
    async fn test_profile_pic_is_multipart() {
        let (backend, gateway) = setup_logged_in().await;
        let employees = EmployeeService::new(gateway);

        let picture = MultipartPart::file("profilePic", "avatar.png", b"\x89PNG".to_vec())
            .mime("image/png");
        let _: Value = employees
            .update_profile_pic("42", picture)
            .await
            .expect("upload");

        let seen = &backend.seen_on("/employee/updateProfilePic")[0];
        assert!(
            seen.content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("multipart/form-data")),
            "content type: {:?}",
            seen.content_type
        );
        let body = String::from_utf8_lossy(&seen.body);
        assert!(body.contains("name=\"profilePic\""));
        assert!(body.contains("filename=\"avatar.png\""));
    }

    #[tokio::test]
    async fn test_attendance_query_parameters() {
        let (backend, gateway) = setup_logged_in().await;
        let attendance = AttendanceService::new(gateway);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");

        let _: Value = attendance
            .get_daily_attendance(date, Some(Company::EcoSoul))
            .await
            .expect("daily");
        let _: Value = attendance
            .update_attendance("E-9", date, "absent")
            .await
            .expect("update");

        let daily = &backend.seen_on("/attendance/getDailyAttendance")[0];
        assert_eq!(daily.query.as_deref(), Some("date=2024-05-01&company=EcoSoul"));

        let update = &backend.seen_on("/attendance/updateAttendance")[0];
        assert_eq!(update.query.as_deref(), Some("employeeId=E-9"));
        let sent: Value = serde_json::from_slice(&update.body).expect("json body");
        assert_eq!(sent, json!({ "status": "absent", "date": "2024-05-01" }));
    }
}
