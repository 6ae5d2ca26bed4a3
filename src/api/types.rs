//! Request and response types for the docvault backend API.
//!
//! All structs use camelCase serialization to match the API's JSON format.
//! The backend is Mongo-backed, so record ids arrive as `_id`; tree nodes
//! use plain `id`. Both spellings are accepted everywhere.

use serde::{Deserialize, Serialize};

/// Signed-in user as returned by signin/signup and stored in the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Signin request body sent to POST /auth/signin.
#[derive(Debug, Serialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Signup request body sent to POST /auth/signup.
#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response from POST /auth/signin and POST /auth/signup.
///
/// Every field is optional: a 200 without an access token is a failed login
/// and `message` carries the reason.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Refresh request body sent to POST /auth/refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response from POST /auth/refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// One node of the folder tree from GET /folders?tree=true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

#[derive(Debug, Deserialize)]
pub struct FolderList {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub struct FolderTree {
    #[serde(default)]
    pub tree: Vec<FolderNode>,
}

#[derive(Debug, Deserialize)]
pub struct FolderResponse {
    pub folder: Folder,
}

/// Body for POST /folders. Root folders omit `parentFolderId`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenameFolderRequest {
    pub name: String,
}

/// Response from DELETE endpoints; a 204 with no body reads as success.
#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    #[serde(default = "default_true")]
    pub success: bool,
}

impl Default for DeleteResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Size of the latest version in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub version_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentResponse {
    pub document: Document,
}

#[derive(Debug, Deserialize)]
pub struct VersionList {
    #[serde(default)]
    pub versions: Vec<DocumentVersion>,
}

#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub version: DocumentVersion,
}

/// Response from POST /documents.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub document: Document,
    #[serde(default)]
    pub version: Option<DocumentVersion>,
}

/// Body for PATCH /documents/:id.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMetaRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Body for POST /documents/:id/share.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub expires_in_hours: u32,
}

/// Share link from POST /documents/:id/share.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub token: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Response from GET /search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_accepts_mongo_and_plain_ids() {
        let mongo: Folder =
            serde_json::from_str(r#"{"_id":"f1","name":"Invoices","parentFolderId":"f0"}"#)
                .unwrap();
        assert_eq!(mongo.id, "f1");
        assert_eq!(mongo.parent_folder_id.as_deref(), Some("f0"));

        let plain: Folder = serde_json::from_str(r#"{"id":"f2","name":"Taxes"}"#).unwrap();
        assert_eq!(plain.id, "f2");
        assert_eq!(plain.parent_folder_id, None);
    }

    #[test]
    fn test_folder_tree_deserialization() {
        let json = r#"{
            "success": true,
            "tree": [
                {"id": "a", "name": "A", "children": [{"id": "b", "name": "B"}]},
                {"id": "c", "name": "C", "children": []}
            ]
        }"#;
        let tree: FolderTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.tree.len(), 2);
        assert_eq!(tree.tree[0].children[0].id, "b");
        assert!(tree.tree[0].children[0].children.is_empty());
    }

    #[test]
    fn test_create_folder_request_omits_root_parent() {
        let root = CreateFolderRequest {
            name: "Docs".to_string(),
            parent_folder_id: None,
        };
        assert_eq!(serde_json::to_string(&root).unwrap(), r#"{"name":"Docs"}"#);

        let nested = CreateFolderRequest {
            name: "Docs".to_string(),
            parent_folder_id: Some("f1".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&nested).unwrap(),
            r#"{"name":"Docs","parentFolderId":"f1"}"#
        );
    }

    #[test]
    fn test_login_response_without_tokens() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"success":false,"message":"Invalid credentials"}"#).unwrap();
        assert!(resp.access_token.is_none());
        assert_eq!(resp.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_refresh_request_is_camel_case() {
        let req = RefreshRequest {
            refresh_token: "R1".to_string(),
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"refreshToken":"R1"}"#);
    }

    #[test]
    fn test_delete_response_defaults_to_success() {
        let resp: DeleteResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.success);
        let resp: DeleteResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_document_version_fields() {
        let v: DocumentVersion = serde_json::from_str(
            r#"{"_id":"v9","versionNumber":3,"size":2048,"createdAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(v.id, "v9");
        assert_eq!(v.version_number, 3);
        assert_eq!(v.size, Some(2048));
    }
}
