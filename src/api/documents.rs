//! Documents, versions and downloads.

use std::path::Path;
use std::sync::Arc;

use super::client::ApiClient;
use super::error::ApiError;
use super::progress::UploadProgress;
use super::request::{FormField, OutboundRequest};
use super::segment;
use super::types::{
    Document, DocumentResponse, DocumentVersion, UpdateMetaRequest, UploadResponse, VersionList,
    VersionResponse,
};

pub const PDF_MIME: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A PDF ready to be uploaded.
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub file_name: String,
    pub content: Arc<Vec<u8>>,
}

impl PdfFile {
    /// Accept `content` if it carries the PDF signature or a `.pdf` name.
    pub fn from_bytes(file_name: &str, content: Vec<u8>) -> Result<Self, ApiError> {
        let has_extension = Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !content.starts_with(PDF_MAGIC) && !has_extension {
            return Err(ApiError::Invalid("PDF files only".to_string()));
        }
        Ok(Self {
            file_name: file_name.to_string(),
            content: Arc::new(content),
        })
    }

    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::Invalid(format!("not a file: {}", path.display())))?;
        let content = tokio::fs::read(path).await?;
        Self::from_bytes(&file_name, content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn field(&self) -> FormField {
        FormField::file("file", &self.file_name, PDF_MIME, self.content.clone())
    }
}

/// A new document for [`upload`].
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub folder_id: String,
    /// Falls back to the file name when blank.
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub file: PdfFile,
}

impl NewDocument {
    fn fields(&self) -> Vec<FormField> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.file.file_name.as_str());

        let mut fields = vec![
            FormField::text("folderId", self.folder_id.clone()),
            FormField::text("title", title),
        ];
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            fields.push(FormField::text("description", description));
        }
        fields.extend(self.tags.iter().map(|tag| FormField::text("tags", tag.clone())));
        fields.push(self.file.field());
        fields
    }
}

/// GET /documents/{id}
pub async fn detail(client: &ApiClient, id: &str) -> Result<Document, ApiError> {
    let resp: DocumentResponse = client
        .send_json(OutboundRequest::get(format!("/documents/{}", segment(id))))
        .await?;
    Ok(resp.document)
}

/// PATCH /documents/{id}
pub async fn update_meta(
    client: &ApiClient,
    id: &str,
    title: &str,
    description: &str,
    tags: Vec<String>,
) -> Result<Document, ApiError> {
    let body = UpdateMetaRequest {
        title: title.to_string(),
        description: description.to_string(),
        tags,
    };
    let resp: DocumentResponse = client
        .send_json(OutboundRequest::patch(format!("/documents/{}", segment(id))).json(&body)?)
        .await?;
    Ok(resp.document)
}

/// Upload a new document. `progress` is settled before this returns, on
/// success and on failure alike.
///
/// POST /documents (multipart)
pub async fn upload(
    client: &ApiClient,
    document: &NewDocument,
    progress: Option<UploadProgress>,
) -> Result<UploadResponse, ApiError> {
    let mut request = OutboundRequest::post("/documents").multipart(document.fields());
    if let Some(progress) = &progress {
        request = request.with_progress(progress.clone());
    }
    let result = client.send_json::<UploadResponse>(request).await;
    if let Some(progress) = &progress {
        progress.settle();
    }

    let uploaded = result?;
    log::info!(
        "Uploaded {} as {} ({})",
        document.file.file_name,
        uploaded.document.title,
        uploaded.document.id
    );
    Ok(uploaded)
}

/// GET /documents/{id}/download
pub async fn download_latest(client: &ApiClient, id: &str) -> Result<Vec<u8>, ApiError> {
    client
        .send_bytes(OutboundRequest::get(format!("/documents/{}/download", segment(id))))
        .await
}

/// GET /documents/{id}/versions
pub async fn list_versions(client: &ApiClient, id: &str) -> Result<Vec<DocumentVersion>, ApiError> {
    let list: VersionList = client
        .send_json(OutboundRequest::get(format!("/documents/{}/versions", segment(id))))
        .await?;
    Ok(list.versions)
}

/// POST /documents/{id}/versions (multipart). Settles `progress` like [`upload`].
pub async fn add_version(
    client: &ApiClient,
    id: &str,
    file: &PdfFile,
    progress: Option<UploadProgress>,
) -> Result<DocumentVersion, ApiError> {
    let mut request = OutboundRequest::post(format!("/documents/{}/versions", segment(id)))
        .multipart(vec![file.field()]);
    if let Some(progress) = &progress {
        request = request.with_progress(progress.clone());
    }
    let result = client.send_json::<VersionResponse>(request).await;
    if let Some(progress) = &progress {
        progress.settle();
    }
    Ok(result?.version)
}

/// GET /documents/versions/{versionId}/download
pub async fn download_version(client: &ApiClient, version_id: &str) -> Result<Vec<u8>, ApiError> {
    client
        .send_bytes(OutboundRequest::get(format!(
            "/documents/versions/{}/download",
            segment(version_id)
        )))
        .await
}

/// Split a comma-separated tag list, dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_or_default(title: Option<&str>) -> &str {
    title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("document")
}

/// File name for a latest-version download.
pub fn download_file_name(title: Option<&str>) -> String {
    format!("{}.pdf", title_or_default(title))
}

/// File name for a specific version download.
pub fn version_file_name(title: Option<&str>, version_id: &str) -> String {
    format!("{}-v{}.pdf", title_or_default(title), version_id)
}

/// Human-readable size: two decimals below 10, one below 100, none above.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let decimals = if value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*} {}", decimals, value, UNITS[unit])
}
