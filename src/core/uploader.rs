//! Image host upload
//!
//! One authenticated multipart POST per file, no retries. A shareable link is
//! produced only when the host answers `200 OK`; everything else is a
//! definite failure that is handed back to the caller.

use crate::core::config::Config;
use crate::error::{PaxError, Result};
use crate::platform::Clipboard;
use reqwest::blocking::{multipart, Client};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Multipart field the host expects the image bytes under.
pub const IMAGE_FIELD: &str = "image";

/// Anything that turns a local file into a shareable URL
pub trait ImageHost {
    fn upload(&self, file: &Path) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: String,
}

/// Blocking client for the Imgur upload API
pub struct ImgurClient {
    client: Client,
    endpoint: String,
    client_id: String,
}

impl ImgurClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("paxss/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| PaxError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            client_id: config.client_id.clone(),
        })
    }
}

impl ImageHost for ImgurClient {
    fn upload(&self, file: &Path) -> Result<String> {
        let bytes = fs::read(file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PaxError::transient_file(file),
            _ => PaxError::Io(e),
        })?;

        let original_name = file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let upload_name = transport_safe_name(&original_name);
        log::debug!("file_path: {:?}", file);
        log::debug!("upload name: {:?}", upload_name);

        let part = multipart::Part::bytes(bytes)
            .file_name(upload_name)
            .mime_str(mime_for(file))?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .map_err(|e| PaxError::upload(format!("request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(PaxError::upload(format!(
                "image host returned status {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .map_err(|e| PaxError::upload(format!("unexpected response body: {}", e)))?;

        Ok(parsed.data.link)
    }
}

/// Uploads a file and publishes the resulting link to the clipboard
pub struct Uploader {
    host: Box<dyn ImageHost>,
    clipboard: Box<dyn Clipboard>,
}

impl Uploader {
    pub fn new(host: Box<dyn ImageHost>, clipboard: Box<dyn Clipboard>) -> Self {
        Self { host, clipboard }
    }

    /// Upload `file` and copy the returned URL to the clipboard.
    ///
    /// A clipboard failure is logged; the upload itself still counts as done.
    pub fn upload(&mut self, file: &Path) -> Result<String> {
        let url = self.host.upload(file)?;
        log::info!("Successful upload: {}", url);

        if let Err(e) = self.clipboard.set_text(&url) {
            log::warn!("Uploaded but could not copy link to clipboard: {}", e);
        }

        Ok(url)
    }
}

/// Name declared for the file in the upload request.
///
/// Compatibility-decomposes the name and drops everything that is not ASCII,
/// so "café.png" becomes "cafe.png". Only the request artifact uses this; the
/// file on disk keeps its name.
pub fn transport_safe_name(file_name: &str) -> String {
    let ascii: String = file_name
        .nfkd()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect();

    let trimmed = ascii.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        format!("image{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn mime_for(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
