use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::{REFRESH_PATH, LISTINGS_PATH};
use super::*;
use crate::listing::{DraftPatch, DraftSection, DraftStore, SubmissionStatus};

/// In-memory backend that honours a single valid access token.
struct FakeBackend {
    valid_access: Mutex<String>,
    refresh_failure: Mutex<Option<BackendResponse>>,
    reject_everything: bool,
    routes: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new("fresh".to_string()),
            refresh_failure: Mutex::new(None),
            reject_everything: false,
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn route(self, key: &str, body: Value) -> Self {
        self.routes
            .lock()
            .expect("routes mutex poisoned")
            .insert(key.to_string(), body);
        self
    }

    fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.path).collect()
    }

    fn refresh_count(&self) -> usize {
        self.paths().iter().filter(|path| *path == REFRESH_PATH).count()
    }

    fn route_key(request: &BackendRequest) -> String {
        match request.query.iter().find(|(key, _)| key == "cursor") {
            Some((_, cursor)) => format!("{}?cursor={cursor}", request.path),
            None => request.path.clone(),
        }
    }
}

fn respond(status: u16, body: Value) -> BackendResponse {
    BackendResponse { status, body }
}

#[async_trait]
impl BackendTransport for FakeBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());

        match request.path.as_str() {
            REFRESH_PATH => {
                if let Some(failure) = self
                    .refresh_failure
                    .lock()
                    .expect("refresh mutex poisoned")
                    .clone()
                {
                    return Ok(failure);
                }
                *self.valid_access.lock().expect("token mutex poisoned") = "rotated".to_string();
                return Ok(respond(
                    200,
                    json!({ "accessToken": "rotated", "refreshToken": "r2" }),
                ));
            }
            OTP_REQUEST_PATH => return Ok(respond(200, json!({ "sent": true }))),
            OTP_VERIFY_PATH => {
                let code = request
                    .body
                    .as_ref()
                    .and_then(|body| body["otp"].as_str())
                    .unwrap_or_default();
                return Ok(if code == "123456" {
                    respond(
                        200,
                        json!({ "data": {
                            "accessToken": "fresh",
                            "refreshToken": "r1",
                            "user": { "id": "u-1", "name": "Asha", "phone": "+919800000000" }
                        }}),
                    )
                } else {
                    respond(400, json!({ "message": "Invalid OTP" }))
                });
            }
            _ => {}
        }

        let valid = self.valid_access.lock().expect("token mutex poisoned").clone();
        if self.reject_everything || request.bearer.as_deref() != Some(valid.as_str()) {
            return Ok(respond(401, json!({ "message": "jwt expired" })));
        }

        let routes = self.routes.lock().expect("routes mutex poisoned");
        Ok(match routes.get(&Self::route_key(&request)) {
            Some(body) => respond(200, body.clone()),
            None => respond(404, json!({ "error": "not found" })),
        })
    }
}

fn signed_in(access: &str) -> Arc<Session> {
    Arc::new(Session::with_tokens(SessionTokens {
        access_token: access.to_string(),
        refresh_token: format!("{access}-refresh"),
    }))
}

fn connect(backend: FakeBackend, session: Arc<Session>) -> (ApiClient<FakeBackend>, Arc<FakeBackend>) {
    let backend = Arc::new(backend);
    (ApiClient::new(Arc::clone(&backend), session), backend)
}

fn favorites_page() -> Value {
    json!({ "items": [{ "id": "p-1", "title": "2 BHK in Baner" }], "nextCursor": null })
}

#[tokio::test]
async fn attaches_bearer_token() {
    let backend = FakeBackend::new().route("/users/me/favorites", favorites_page());
    let (client, backend) = connect(backend, signed_in("fresh"));

    client
        .get_json(BackendRequest::get("/users/me/favorites"))
        .await
        .expect("favorites");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn unauthorized_refreshes_and_retries_once() {
    let backend = FakeBackend::new().route("/users/me/favorites", favorites_page());
    *backend.valid_access.lock().expect("token mutex poisoned") = "rotated".to_string();
    let session = signed_in("stale");
    let (client, backend) = connect(backend, Arc::clone(&session));

    let body = client
        .get_json(BackendRequest::get("/users/me/favorites"))
        .await
        .expect("retried");

    assert_eq!(body["items"][0]["id"], json!("p-1"));
    assert_eq!(
        backend.paths(),
        vec!["/users/me/favorites", REFRESH_PATH, "/users/me/favorites"]
    );
    let requests = backend.requests();
    assert_eq!(requests[1].body, Some(json!({ "refreshToken": "stale-refresh" })));
    assert_eq!(requests[2].bearer.as_deref(), Some("rotated"));
    assert_eq!(session.access_token().as_deref(), Some("rotated"));
    assert_eq!(session.refresh_token().as_deref(), Some("r2"));
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let backend = FakeBackend::new()
        .route("/users/me/favorites", favorites_page())
        .route("/users/me/visits", json!({ "items": [] }));
    *backend.valid_access.lock().expect("token mutex poisoned") = "rotated".to_string();
    let (client, backend) = connect(backend, signed_in("stale"));

    let (favorites, visits) = tokio::join!(
        client.get_json(BackendRequest::get("/users/me/favorites")),
        client.get_json(BackendRequest::get("/users/me/visits")),
    );

    assert!(favorites.is_ok());
    assert!(visits.is_ok());
    assert_eq!(backend.refresh_count(), 1);
}

#[tokio::test]
async fn failed_refresh_clears_session() {
    let backend = FakeBackend::new();
    *backend.refresh_failure.lock().expect("refresh mutex poisoned") =
        Some(respond(401, json!({ "message": "refresh token revoked" })));
    let session = signed_in("stale");
    let (client, backend) = connect(backend, Arc::clone(&session));

    let result = client.get_json(BackendRequest::get("/users/me/enquiries")).await;

    assert_eq!(result, Err(ApiError::SessionExpired));
    assert!(!session.is_authenticated());
    assert_eq!(backend.paths(), vec!["/users/me/enquiries", REFRESH_PATH]);
}

#[tokio::test]
async fn second_unauthorized_gives_up() {
    let mut backend = FakeBackend::new();
    backend.reject_everything = true;
    let session = signed_in("stale");
    let (client, backend) = connect(backend, Arc::clone(&session));

    let result = client.get_json(BackendRequest::get("/users/me/visits")).await;

    assert_eq!(result, Err(ApiError::SessionExpired));
    assert!(!session.is_authenticated());
    assert_eq!(backend.paths().len(), 3);
    assert_eq!(backend.refresh_count(), 1);
}

#[tokio::test]
async fn anonymous_session_cannot_refresh() {
    let (client, backend) = connect(FakeBackend::new(), Arc::new(Session::new()));

    let result = client.get_json(BackendRequest::get("/users/me/visits")).await;

    assert_eq!(result, Err(ApiError::SessionExpired));
    assert_eq!(backend.refresh_count(), 0);
}

#[tokio::test]
async fn error_message_comes_from_body() {
    let (client, _) = connect(FakeBackend::new(), signed_in("fresh"));

    let result = client.get_json(BackendRequest::get("/properties/unknown")).await;

    assert_eq!(
        result,
        Err(ApiError::Status {
            status: 404,
            message: "not found".to_string()
        })
    );
}

#[tokio::test]
async fn favorites_follow_cursors_through_client() {
    let backend = FakeBackend::new()
        .route(
            "/users/me/favorites",
            json!({ "items": [{ "id": "p-1" }, { "id": "p-2" }], "nextCursor": "c2" }),
        )
        .route(
            "/users/me/favorites?cursor=c2",
            json!({ "data": { "items": [{ "id": "p-3", "bedrooms": 3 }] } }),
        );
    let (client, backend) = connect(backend, signed_in("fresh"));

    let mut favorites = client.favorites();
    favorites.fetch_all(5).await.expect("all favorites");

    let ids: Vec<&str> = favorites.items().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["p-1", "p-2", "p-3"]);
    assert!(!favorites.has_next_page());
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn boxed_transport_pages_search_results() {
    let backend = Arc::new(FakeBackend::new().route(
        "/properties/search",
        json!({ "items": [{ "id": "p-9" }], "nextCursor": null }),
    ));
    let transport: Arc<dyn BackendTransport> = backend.clone();
    let client = ApiClient::new(transport, signed_in("fresh"));

    let mut results = client.search(SearchFilters {
        city: Some("Pune".to_string()),
        ..SearchFilters::default()
    });
    assert_eq!(results.fetch_next().await, Ok(1));

    let ids: Vec<&str> = results.items().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["p-9"]);
    assert!(!results.has_next_page());
    assert_eq!(backend.paths(), vec!["/properties/search"]);
}

#[tokio::test]
async fn malformed_page_is_a_decode_error() {
    let backend = FakeBackend::new().route("/users/me/visits", json!({ "items": "nope" }));
    let (client, _) = connect(backend, signed_in("fresh"));

    let mut visits = client.visits();
    let result = visits.fetch_next().await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
    assert!(visits.has_next_page());
}

#[tokio::test]
async fn otp_verification_signs_session_in() {
    let session = Arc::new(Session::new());
    let (client, backend) = connect(FakeBackend::new(), Arc::clone(&session));

    client.request_otp(" +919800000000 ").await.expect("otp sent");
    let profile = client
        .verify_otp("+919800000000", "123456")
        .await
        .expect("verified");

    assert_eq!(profile.map(|user| user.id), Some("u-1".to_string()));
    assert_eq!(session.access_token().as_deref(), Some("fresh"));
    assert_eq!(
        session.profile().and_then(|user| user.name),
        Some("Asha".to_string())
    );
    let requests = backend.requests();
    assert_eq!(requests[0].body, Some(json!({ "phone": "+919800000000" })));
    assert!(requests.iter().all(|request| request.bearer.is_none()));
}

#[tokio::test]
async fn wrong_otp_leaves_session_signed_out() {
    let session = Arc::new(Session::new());
    let (client, _) = connect(FakeBackend::new(), Arc::clone(&session));

    let result = client.verify_otp("+919800000000", "000000").await;

    assert_eq!(
        result,
        Err(ApiError::Status {
            status: 400,
            message: "Invalid OTP".to_string()
        })
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn client_submits_listing_and_keeps_echo() {
    let backend = FakeBackend::new().route(
        LISTINGS_PATH,
        json!({ "data": { "id": "listing-42", "meta": { "title": "Sunny 2 BHK" } } }),
    );
    let (client, backend) = connect(backend, signed_in("fresh"));

    let mut store = DraftStore::new();
    store.save_draft(
        &DraftPatch::section(DraftSection::Meta, json!({ "title": "Sunny 2 BHK" }))
            .expect("object patch"),
    );
    store.submit(&client).await.expect("submitted");

    assert_eq!(store.status(), SubmissionStatus::Submitted);
    assert_eq!(store.draft().text("id"), Some("listing-42"));
    let sent = &backend.requests()[0];
    assert_eq!(sent.path, LISTINGS_PATH);
    assert_eq!(
        sent.body.as_ref().map(|body| body["meta"]["title"].clone()),
        Some(json!("Sunny 2 BHK"))
    );
}

#[tokio::test]
async fn rejected_listing_marks_store_failed() {
    let (client, _) = connect(FakeBackend::new(), signed_in("fresh"));
    let mut store = DraftStore::new();

    let result = store.submit(&client).await;

    assert!(result.is_err());
    assert_eq!(store.status(), SubmissionStatus::Failed);
    assert_eq!(store.error(), Some("backend returned 404: not found"));
}
