//! Folder hierarchy operations.
//!
//! The top level is addressed as `root` on the client side; the backend
//! knows it as "no parent", so root never goes over the wire as an id.

use super::client::ApiClient;
use super::error::ApiError;
use super::request::OutboundRequest;
use super::segment;
use super::types::{
    CreateFolderRequest, DeleteResponse, Document, DocumentList, Folder, FolderList, FolderNode,
    FolderResponse, FolderTree, RenameFolderRequest,
};
use crate::tree::{self, ROOT_ID};

fn is_root(id: Option<&str>) -> bool {
    matches!(id.map(str::trim), None | Some("") | Some(ROOT_ID))
}

fn folder_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Invalid("Folder name is required".to_string()));
    }
    Ok(name.to_string())
}

/// List the direct subfolders of `parent` (top level for `None`/`root`).
///
/// GET /folders?parent={id}
pub async fn list(client: &ApiClient, parent: Option<&str>) -> Result<Vec<Folder>, ApiError> {
    let mut request = OutboundRequest::get("/folders");
    if let Some(parent) = parent.filter(|p| !is_root(Some(*p))) {
        request = request.query("parent", parent.trim());
    }
    let list: FolderList = client.send_json(request).await?;
    Ok(list.folders)
}

/// Whole folder hierarchy.
///
/// GET /folders?tree=true
pub async fn tree(client: &ApiClient) -> Result<Vec<FolderNode>, ApiError> {
    let tree: FolderTree = client
        .send_json(OutboundRequest::get("/folders").query("tree", "true"))
        .await?;
    Ok(tree.tree)
}

/// POST /folders
pub async fn create(client: &ApiClient, name: &str, parent: Option<&str>) -> Result<Folder, ApiError> {
    let body = CreateFolderRequest {
        name: folder_name(name)?,
        parent_folder_id: parent
            .filter(|p| !is_root(Some(*p)))
            .map(|p| p.trim().to_string()),
    };
    let created: FolderResponse = client
        .send_json(OutboundRequest::post("/folders").json(&body)?)
        .await?;
    log::info!("Created folder {} ({})", created.folder.name, created.folder.id);
    Ok(created.folder)
}

/// PATCH /folders/{id}
pub async fn rename(client: &ApiClient, id: &str, name: &str) -> Result<Folder, ApiError> {
    let body = RenameFolderRequest {
        name: folder_name(name)?,
    };
    let renamed: FolderResponse = client
        .send_json(OutboundRequest::patch(format!("/folders/{}", segment(id))).json(&body)?)
        .await?;
    Ok(renamed.folder)
}

/// DELETE /folders/{id}. Accepts both `204 No Content` and `{success}`.
pub async fn remove(client: &ApiClient, id: &str) -> Result<bool, ApiError> {
    let resp: DeleteResponse = client
        .send_json(OutboundRequest::delete(format!("/folders/{}", segment(id))))
        .await?;
    Ok(resp.success)
}

/// GET /folders/{id}/documents
pub async fn list_documents(client: &ApiClient, id: &str) -> Result<Vec<Document>, ApiError> {
    let list: DocumentList = client
        .send_json(OutboundRequest::get(format!("/folders/{}/documents", segment(id))))
        .await?;
    Ok(list.documents)
}

/// Everything a folder page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderView {
    pub id: String,
    /// Display name; empty for root, the id itself if the tree lookup fails.
    pub name: String,
    /// Where "up" leads; `root` for root and top-level folders.
    pub parent_id: String,
    pub folders: Vec<Folder>,
    pub documents: Vec<Document>,
}

/// Load a folder page: subfolders, and for non-root folders also the
/// documents and the name/parent looked up in the tree.
///
/// A failing tree lookup is not fatal; the view falls back to the id.
pub async fn open(client: &ApiClient, id: &str) -> Result<FolderView, ApiError> {
    let folders = list(client, Some(id)).await?;
    if is_root(Some(id)) {
        return Ok(FolderView {
            id: ROOT_ID.to_string(),
            name: String::new(),
            parent_id: ROOT_ID.to_string(),
            folders,
            documents: Vec::new(),
        });
    }

    let documents = list_documents(client, id).await?;
    let (name, parent_id) = match tree(client).await {
        Ok(nodes) => (
            tree::find_name(&nodes, id).unwrap_or(id).to_string(),
            tree::find_parent_id(&nodes, id).unwrap_or_else(|| ROOT_ID.to_string()),
        ),
        Err(e) => {
            log::warn!("Folder tree unavailable, showing raw id: {}", e);
            (id.to_string(), ROOT_ID.to_string())
        }
    };

    Ok(FolderView {
        id: id.to_string(),
        name,
        parent_id,
        folders,
        documents,
    })
}
