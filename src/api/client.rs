//! HTTP client with bearer token injection and automatic token refresh.
//!
//! Every feature module sends its requests through [`ApiClient::send`], which:
//! - attaches `Authorization: Bearer <accessToken>` from the session unless
//!   the request already has an Authorization header or is public,
//! - on the first 401 for a request, refreshes the access token (one refresh
//!   at a time, shared by all failing requests) and re-sends the request once,
//! - on refresh failure, clears the session and redirects to the login route.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::error::{error_message, ApiError, RefreshError};
use super::refresh::{RefreshResult, RefreshSlot};
use super::request::OutboundRequest;
use super::types::{RefreshRequest, RefreshResponse};
use crate::routes::{Navigator, Route};
use crate::session::Session;

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// HTTP client wrapper for docvault API communication.
///
/// Holds the base URL, the session it reads tokens from, the navigator used
/// for the login redirect, and the single in-flight refresh slot.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
    navigator: Arc<dyn Navigator>,
    refresh: RefreshSlot,
}

impl ApiClient {
    /// Create a new API client with the given base URL.
    pub fn new(base_url: &str, session: Session, navigator: Arc<dyn Navigator>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, base_url, session, navigator)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
            refresh: RefreshSlot::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Whether a token refresh is in flight right now.
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_pending()
    }

    /// Send a request, recovering from one expired access token.
    ///
    /// Returns the response for 2xx statuses. Any other status becomes
    /// [`ApiError::RequestFailed`]; a failed refresh becomes
    /// [`ApiError::AuthInvalid`].
    pub async fn send(&self, mut request: OutboundRequest) -> Result<Response, ApiError> {
        self.authorize(&mut request);
        let response = self.dispatch(&request).await?;

        if response.status() != StatusCode::UNAUTHORIZED
            || request.is_retried()
            || request.is_public()
        {
            return check_status(response).await;
        }

        request.mark_retried();
        log::info!(
            "{} {} returned 401, refreshing access token",
            request.method(),
            request.path()
        );
        if request.bearer_token().is_none() {
            log::debug!("{} was sent without a bearer token", request.path());
        }

        let token = self.refreshed_token().await?;
        request.set_bearer(&token)?;
        let retried = self.dispatch(&request).await?;
        check_status(retried).await
    }

    /// Send and decode a JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        decode_json(response).await
    }

    /// Send and return the raw response bytes.
    pub async fn send_bytes(&self, request: OutboundRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Attach the stored access token unless the caller set Authorization
    /// or the request is public. Store failures leave the request as-is.
    fn authorize(&self, request: &mut OutboundRequest) {
        if request.is_public() || request.has_authorization() {
            return;
        }
        match self.session.access_token() {
            Ok(Some(token)) => {
                if let Err(e) = request.set_bearer(&token) {
                    log::warn!("Stored access token unusable: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Failed to read access token: {}", e),
        }
    }

    async fn dispatch(&self, request: &OutboundRequest) -> Result<Response, ApiError> {
        log::debug!("{} {}{}", request.method(), self.base_url, request.path());
        let builder = request.to_builder(&self.client, &self.base_url)?;
        Ok(builder.send().await?)
    }

    /// Join the in-flight refresh or start one, and wait for its token.
    async fn refreshed_token(&self) -> Result<String, ApiError> {
        let pending = self.refresh.join_or_start(|| self.start_refresh());
        Ok(pending.await?)
    }

    /// Build the refresh future. It persists the new token on success and
    /// tears the session down on failure, once, for all waiters.
    fn start_refresh(&self) -> BoxFuture<'static, RefreshResult> {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let session = self.session.clone();
        let navigator = Arc::clone(&self.navigator);

        async move {
            let outcome = match exchange_refresh_token(&client, &url, &session).await {
                Ok(token) => session
                    .set_access_token(&token)
                    .map(|()| token)
                    .map_err(|e| RefreshError::Store(e.to_string())),
                Err(e) => Err(e),
            };

            match &outcome {
                Ok(_) => log::info!("Access token refreshed"),
                Err(e) => {
                    log::warn!("Token refresh failed, signing out: {}", e);
                    session.clear();
                    navigator.replace(Route::Login);
                }
            }
            outcome
        }
        .boxed()
    }
}

/// POST the stored refresh token and return the new access token.
///
/// Sent directly on the transport: the refresh call is never decorated and
/// never itself refreshed.
async fn exchange_refresh_token(client: &Client, url: &str, session: &Session) -> RefreshResult {
    let refresh_token = session
        .refresh_token()
        .map_err(|e| RefreshError::Store(e.to_string()))?
        .ok_or(RefreshError::MissingRefreshToken)?;

    let resp = client
        .post(url)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| RefreshError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RefreshError::Rejected {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    let body = resp.text().await.map_err(|e| RefreshError::Transport(e.to_string()))?;
    let parsed: Option<RefreshResponse> = serde_json::from_str(&body).ok();
    parsed
        .and_then(|r| r.access_token)
        .filter(|t| !t.is_empty())
        .ok_or(RefreshError::MissingAccessToken)
}

/// Turn a non-2xx response into [`ApiError::RequestFailed`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::RequestFailed {
        status,
        message: error_message(status, &body),
    })
}

/// Decode a JSON body; an empty body decodes from `{}` so bodiless
/// responses (204) map onto types whose fields all have defaults.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &body
    };
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}
