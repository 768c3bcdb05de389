use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::client::{ApiClient, ApiError};
use super::session::{SessionTokens, UserProfile};
use super::transport::{BackendRequest, BackendTransport};

pub const OTP_REQUEST_PATH: &str = "/auth/otp/request";
pub const OTP_VERIFY_PATH: &str = "/auth/otp/verify";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifiedSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl<T> ApiClient<T>
where
    T: BackendTransport + ?Sized,
{
    /// Asks the backend to text a one-time code to `phone`.
    pub async fn request_otp(&self, phone: &str) -> Result<(), ApiError> {
        self.execute_anonymous(BackendRequest::post(
            OTP_REQUEST_PATH,
            json!({ "phone": phone.trim() }),
        ))
        .await?;
        Ok(())
    }

    /// Exchanges a one-time code for tokens and signs the session in.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<Option<UserProfile>, ApiError> {
        let body = self
            .execute_anonymous(BackendRequest::post(
                OTP_VERIFY_PATH,
                json!({ "phone": phone.trim(), "otp": code.trim() }),
            ))
            .await?;
        let verified: VerifiedSession =
            serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;

        self.session().sign_in(
            SessionTokens {
                access_token: verified.access_token,
                refresh_token: verified.refresh_token,
            },
            verified.user.clone(),
        );
        info!("signed in with one-time code");
        Ok(verified.user)
    }

    pub fn sign_out(&self) {
        self.session().clear();
    }
}
