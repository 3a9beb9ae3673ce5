use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{AstrometryError, Result};
use crate::transport::{
    FILE_FIELD, FilePart, HttpRequest, RequestBody, Transport, request_json_form,
};
use crate::urls::validate_image_url;

use super::AstrometryClient;

impl<T: Transport> AstrometryClient<T> {
    /// Asks the service to fetch and solve the image at `url`.
    ///
    /// `options` are forwarded as solve hints; `session` and `url` are written
    /// last and cannot be overridden by them. No request is made for an invalid URL.
    pub fn submit_url(&self, url: &str, options: &Map<String, Value>) -> Result<Value> {
        validate_image_url(url)?;
        let session = self.require_session()?;

        let data = merge_protected(
            options,
            [("session", session.to_string()), ("url", url.to_string())],
        );
        self.post(&self.config.endpoints.url_upload, &data)
    }

    /// Uploads a local image file for solving.
    pub fn upload_file(&self, path: &Path, options: &Map<String, Value>) -> Result<Value> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AstrometryError::Config(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        self.upload_bytes(&file_name, bytes, options)
    }

    /// Uploads in-memory image bytes as a multipart form with a `file` part.
    pub fn upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        options: &Map<String, Value>,
    ) -> Result<Value> {
        if file_name.trim().is_empty() {
            return Err(AstrometryError::Config(
                "upload file name must not be empty".to_string(),
            ));
        }
        let session = self.require_session()?;

        let data = merge_protected(options, [("session", session.to_string())]);
        let body = RequestBody::Multipart {
            fields: request_json_form(&data)?,
            file: FilePart {
                field_name: FILE_FIELD.to_string(),
                file_name: file_name.to_string(),
                bytes,
            },
        };
        self.submit(HttpRequest::post(&self.config.endpoints.file_upload, body))
    }
}

/// Caller options first, reserved keys last so they always win.
pub(super) fn merge_protected<const N: usize>(
    options: &Map<String, Value>,
    reserved: [(&str, String); N],
) -> Value {
    let mut merged = options.clone();
    for (key, value) in reserved {
        merged.insert(key.to_string(), Value::String(value));
    }
    Value::Object(merged)
}
