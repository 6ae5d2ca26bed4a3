use super::client::ApiClient;
use super::error::ApiError;
use super::request::OutboundRequest;
use super::types::SearchResults;

/// Full-text search over documents and folders.
///
/// GET /search?q={query}. A blank query is rejected without a request.
pub async fn search(client: &ApiClient, query: &str) -> Result<SearchResults, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::Invalid("Search query is required".to_string()));
    }
    log::debug!("Searching for {:?}", query);
    client
        .send_json(OutboundRequest::get("/search").query("q", query))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RecordingNavigator;
    use crate::session::{Session, ACCESS_TOKEN_KEY};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let session = Session::in_memory();
        session.store().set(ACCESS_TOKEN_KEY, "A1").unwrap();
        let client = ApiClient::new(&server.uri(), session, Arc::new(RecordingNavigator::default()));
        (server, client)
    }

    #[tokio::test]
    async fn test_search_trims_query() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "tax 2024"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{"_id": "d1", "title": "Tax 2024"}],
                "folders": [{"_id": "f1", "name": "Taxes"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = search(&client, "  tax 2024 ").await.unwrap();
        assert_eq!(results.documents[0].title, "Tax 2024");
        assert_eq!(results.folders[0].name, "Taxes");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_locally() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(matches!(search(&client, "   ").await, Err(ApiError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_missing_sections_default_to_empty() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let results = search(&client, "nothing").await.unwrap();
        assert!(results.documents.is_empty() && results.folders.is_empty());
    }
}
