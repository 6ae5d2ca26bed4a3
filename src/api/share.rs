//! Public share links.

use super::client::ApiClient;
use super::error::ApiError;
use super::request::OutboundRequest;
use super::segment;
use super::types::{ShareLink, ShareRequest};

/// Link lifetime when the caller does not pick one.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;

/// POST /documents/{id}/share
pub async fn create(client: &ApiClient, document_id: &str, expires_in_hours: u32) -> Result<ShareLink, ApiError> {
    if expires_in_hours == 0 {
        return Err(ApiError::Invalid("Expiry must be at least one hour".to_string()));
    }
    let request = OutboundRequest::post(format!("/documents/{}/share", segment(document_id)))
        .json(&ShareRequest { expires_in_hours })?;
    let link: ShareLink = client.send_json(request).await?;
    log::info!("Shared document {} for {}h", document_id, expires_in_hours);
    Ok(link)
}

/// Public preview URL for a share token.
pub fn public_url(base_url: &str, token: &str) -> String {
    format!("{}/public/{}", base_url.trim_end_matches('/'), token)
}

/// Fetch a shared document without credentials.
///
/// GET /public/{token}
pub async fn fetch_public(client: &ApiClient, token: &str) -> Result<Vec<u8>, ApiError> {
    client
        .send_bytes(OutboundRequest::get(format!("/public/{}", segment(token))).public())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RecordingNavigator;
    use crate::session::{Session, ACCESS_TOKEN_KEY};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn setup() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let session = Session::in_memory();
        session.store().set(ACCESS_TOKEN_KEY, "A1").unwrap();
        let client = ApiClient::new(&server.uri(), session, Arc::new(RecordingNavigator::default()));
        (server, client)
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("http://localhost:5000/api/", "tok"),
            "http://localhost:5000/api/public/tok"
        );
        assert_eq!(public_url("https://docs.example.com/api", "t1"), "https://docs.example.com/api/public/t1");
    }

    #[tokio::test]
    async fn test_create_share_link() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/documents/d1/share"))
            .and(body_json(json!({"expiresInHours": 24})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "token": "tok",
                "url": "http://host/public/tok",
                "expiresAt": "2026-10-20T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let link = create(&client, "d1", DEFAULT_EXPIRY_HOURS).await.unwrap();
        assert_eq!(link.token, "tok");
        assert_eq!(link.expires_at.as_deref(), Some("2026-10-20T10:00:00Z"));
        assert!(create(&client, "d1", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_public_sends_no_token_and_never_refreshes() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/public/gone"))
            .respond_with(|req: &Request| {
                assert!(!req.headers.contains_key("authorization"));
                ResponseTemplate::new(401).set_body_json(json!({"message": "Link expired"}))
            })
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = fetch_public(&client, "gone").await.unwrap_err();
        assert!(matches!(
            &err,
            ApiError::RequestFailed { status, message }
                if status.as_u16() == 401 && message == "Link expired"
        ));
        assert!(client.session().is_authenticated());
    }
}
