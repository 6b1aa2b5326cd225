//! Request and response types.
//!
//! An [`ApiRequest`] is a plain description rather than a built
//! `reqwest::Request`, so it can be dispatched a second time after a refresh.

use std::path::Path;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AUTH_ROUTE_PREFIX;
use super::error::GatewayError;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<MultipartPart>),
}

/// One field of a multipart form, kept as owned data so the form can be rebuilt.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    name: String,
    content: PartContent,
}

#[derive(Debug, Clone)]
enum PartContent {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Bytes,
    },
}

impl MultipartPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                mime: None,
                bytes: bytes.into(),
            },
        }
    }

    /// Read a file from disk into a part, guessing its MIME type from the extension.
    pub async fn from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let part = Self::file(name, file_name, bytes);
        Ok(match mime_for_extension(path) {
            Some(mime) => part.mime(mime),
            None => part,
        })
    }

    /// Set the content type of a file part. No effect on text parts.
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        if let PartContent::File { mime: slot, .. } = &mut self.content {
            *slot = Some(mime.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_part(&self) -> Result<Part, GatewayError> {
        match &self.content {
            PartContent::Text(value) => Ok(Part::text(value.clone())),
            PartContent::File {
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                match mime {
                    Some(mime) => part.mime_str(mime).map_err(|e| {
                        GatewayError::InvalidRequest(format!("invalid MIME type '{mime}': {e}"))
                    }),
                    None => Ok(part),
                }
            }
        }
    }
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "csv" => "text/csv",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// A request to the backend, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter. Values are percent-encoded on dispatch.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body)
            .map_err(|e| GatewayError::InvalidRequest(format!("unserializable body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as given, including any inline query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path without its query string, always starting with `/`.
    pub fn route(&self) -> String {
        let route = self.path.split(['?', '#']).next().unwrap_or_default();
        format!("/{}", route.trim_start_matches('/'))
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this request is part of the credential exchange itself.
    pub fn is_auth_route(&self) -> bool {
        self.route().starts_with(AUTH_ROUTE_PREFIX)
    }

    pub(crate) fn build_form(&self) -> Result<Option<Form>, GatewayError> {
        let RequestBody::Multipart(parts) = &self.body else {
            return Ok(None);
        };
        let mut form = Form::new();
        for part in parts {
            form = form.part(part.name.clone(), part.to_part()?);
        }
        Ok(Some(form))
    }
}

/// A fully buffered backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    path: String,
}

impl ApiResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes, path: String) -> Self {
        Self {
            status,
            headers,
            body,
            path,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body. An empty body reads as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|source| GatewayError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}
