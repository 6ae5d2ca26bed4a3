//! Outbound request description.
//!
//! Unlike `reqwest::Request`, an [`OutboundRequest`] can always be dispatched
//! again: bodies are kept as JSON values or multipart field lists and turned
//! into a transport request per attempt. It also carries the single-shot
//! retry flag used by the 401 handling in [`super::client`].

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use serde::Serialize;

use super::error::ApiError;
use super::progress::{self, UploadProgress};

/// One multipart form field.
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        content: Arc<Vec<u8>>,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, file_name: &str, mime: &str, content: Arc<Vec<u8>>) -> Self {
        FormField::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: RequestBody,
    public: bool,
    retried: bool,
    progress: Option<UploadProgress>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            public: false,
            retried: false,
            progress: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Invalid(format!("unserializable request body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Never attach the stored token and never refresh on 401.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Report multipart file upload progress to `progress`.
    pub fn with_progress(mut self, progress: UploadProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// The bearer token currently attached, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Set (or replace) the `Authorization: Bearer` header.
    pub fn set_bearer(&mut self, token: &str) -> Result<(), ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Invalid("access token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Build the transport request for one dispatch attempt.
    pub(crate) fn to_builder(
        &self,
        client: &reqwest::Client,
        base_url: &str,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = format!("{}{}", base_url, self.path);
        let mut builder = client
            .request(self.method.clone(), &url)
            .headers(self.headers.clone());
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(self.form(fields)?),
        };
        Ok(builder)
    }

    fn form(&self, fields: &[FormField]) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in fields {
            form = match field {
                FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                FormField::File {
                    name,
                    file_name,
                    mime,
                    content,
                } => {
                    let part = match &self.progress {
                        Some(progress) => Part::stream_with_length(
                            Body::wrap_stream(progress::chunked(content.clone(), progress.clone())),
                            content.len() as u64,
                        ),
                        None => Part::bytes(content.to_vec()),
                    };
                    let part = part
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::Invalid(format!("invalid MIME type '{}': {}", mime, e)))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
