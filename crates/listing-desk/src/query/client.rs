use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::session::{Session, SessionTokens};
use super::transport::{BackendRequest, BackendResponse, BackendTransport, TransportError};
use crate::listing::{ListingDraft, ListingSubmitter, SubmitError};

pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LISTINGS_PATH: &str = "/properties";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("session expired; sign in again")]
    SessionExpired,
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

impl ApiError {
    fn from_response(response: BackendResponse) -> Self {
        let message = ["message", "error"]
            .iter()
            .find_map(|key| response.body.get(key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| "request failed".to_string());
        ApiError::Status {
            status: response.status,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Bearer-authenticated client for the marketplace REST API.
///
/// A 401 triggers one token refresh shared by every concurrent caller, then a
/// single retry. A failed refresh signs the session out.
pub struct ApiClient<T: ?Sized> {
    transport: Arc<T>,
    session: Arc<Session>,
}

impl<T: ?Sized> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
        }
    }
}

impl<T> ApiClient<T>
where
    T: BackendTransport + ?Sized,
{
    pub fn new(transport: Arc<T>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn get_json(&self, request: BackendRequest) -> Result<Value, ApiError> {
        self.execute(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(BackendRequest::post(path, body)).await
    }

    /// Sends without credentials (OTP sign-in endpoints).
    pub(crate) async fn execute_anonymous(&self, request: BackendRequest) -> Result<Value, ApiError> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(unwrap_data(response.body))
        } else {
            Err(ApiError::from_response(response))
        }
    }

    pub async fn execute(&self, request: BackendRequest) -> Result<Value, ApiError> {
        let seen_generation = self.session.generation();
        let response = self.send_authorized(request.clone()).await?;
        if response.status != 401 {
            return into_body(response);
        }

        debug!(path = %request.path, "access token rejected; refreshing");
        self.refresh(seen_generation).await?;

        let retried = self.send_authorized(request).await?;
        if retried.status == 401 {
            warn!("access token rejected after refresh; clearing session");
            self.session.clear();
            return Err(ApiError::SessionExpired);
        }
        into_body(retried)
    }

    async fn send_authorized(&self, mut request: BackendRequest) -> Result<BackendResponse, ApiError> {
        request.bearer = self.session.access_token();
        Ok(self.transport.send(request).await?)
    }

    async fn refresh(&self, seen_generation: u64) -> Result<(), ApiError> {
        let _gate = self.session.refresh_gate().lock().await;
        if self.session.generation() != seen_generation {
            // Another caller rotated (or cleared) the tokens while we waited.
            return if self.session.is_authenticated() {
                Ok(())
            } else {
                Err(ApiError::SessionExpired)
            };
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            self.session.clear();
            return Err(ApiError::SessionExpired);
        };

        let outcome = self
            .transport
            .send(BackendRequest::post(
                REFRESH_PATH,
                json!({ "refreshToken": refresh_token }),
            ))
            .await;

        let payload = match outcome {
            Ok(response) if response.is_success() => {
                serde_json::from_value::<RefreshPayload>(unwrap_data(response.body)).ok()
            }
            Ok(response) => {
                debug!(status = response.status, "token refresh rejected");
                None
            }
            Err(err) => {
                debug!(error = %err, "token refresh unreachable");
                None
            }
        };

        match payload {
            Some(payload) => {
                self.session.rotate(SessionTokens {
                    access_token: payload.access_token,
                    refresh_token: payload.refresh_token.unwrap_or(refresh_token),
                });
                info!("session tokens refreshed");
                Ok(())
            }
            None => {
                self.session.clear();
                Err(ApiError::SessionExpired)
            }
        }
    }
}

/// Backend payloads are either bare or wrapped as `{ "data": ... }`.
pub(crate) fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut fields) if fields.contains_key("data") => {
            fields.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn into_body(response: BackendResponse) -> Result<Value, ApiError> {
    if response.is_success() {
        Ok(unwrap_data(response.body))
    } else if response.status == 401 {
        Err(ApiError::SessionExpired)
    } else {
        Err(ApiError::from_response(response))
    }
}

#[async_trait]
impl<T> ListingSubmitter for ApiClient<T>
where
    T: BackendTransport + ?Sized + 'static,
{
    async fn submit_listing(&self, draft: &ListingDraft) -> Result<ListingDraft, SubmitError> {
        let echoed = self
            .post_json(LISTINGS_PATH, draft.to_json())
            .await
            .map_err(|err| match err {
                ApiError::Transport(err) => SubmitError::Unavailable(err.0),
                other => SubmitError::Rejected(other.to_string()),
            })?;

        ListingDraft::from_json(echoed).map_err(|err| SubmitError::Rejected(err.to_string()))
    }
}
