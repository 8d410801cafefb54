//! Upload media assets for onward reference in messages.
//!
//! The upload endpoints want a `multipart/form-data` body and infer nothing
//! themselves: the media category travels as a `type` query parameter,
//! derived here from the file extension.

use crate::{api, api::WorkClient, error::WorkError};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// The part filename stands in for the real one: non-ASCII names can break
/// the transport encoding, so the real name travels in the `filename` form
/// field instead.
const PART_FILENAME: &str = "media";

/// A server-issued handle to an uploaded asset. Temporary uploads expire
/// after three days.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MediaId(pub String);

/// The media categories the upload endpoint distinguishes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MediaKind {
    Image,
    Voice,
    Video,
    File,
}

impl MediaKind {
    /// The category as it appears in the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Voice => "voice",
            MediaKind::Video => "video",
            MediaKind::File => "file",
        }
    }
}

/// Infer the media category and content type from a file extension.
/// Anything outside the fixed table, including a missing extension, is a
/// generic file.
fn classify(extension: Option<&str>) -> (MediaKind, &'static str) {
    match extension {
        Some("jpg") => (MediaKind::Image, "image/jpg"),
        Some("png") => (MediaKind::Image, "image/png"),
        Some("bmp") => (MediaKind::Image, "image/bmp"),
        Some("amr") => (MediaKind::Voice, "voice/amr"),
        Some("mp4") => (MediaKind::Video, "video/mp4"),
        _ => (MediaKind::File, "application/octet-stream"),
    }
}

/// <https://developer.work.weixin.qq.com/document/path/90253>
#[derive(Deserialize)]
pub struct MediaReceipt {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub media_id: MediaId,
    pub created_at: String,
}

/// <https://developer.work.weixin.qq.com/document/path/90256>
#[derive(Deserialize)]
pub struct ImageReceipt {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    pub url: Url,
}

impl WorkClient {
    /// Upload a temporary media asset, referenceable by messages until it
    /// expires.
    pub async fn upload_media(&self, path: &Path) -> Result<MediaReceipt, WorkError> {
        let (kind, form) = read_multipart(path).await?;

        api::dispatch(
            self.post("/cgi-bin/media/upload")
                .query(&[("type", kind.as_str())])
                .multipart(form),
        )
        .await
    }

    /// Upload a permanent image, returning a URL usable inside mpnews
    /// article content.
    pub async fn upload_image(&self, path: &Path) -> Result<ImageReceipt, WorkError> {
        let (_, form) = read_multipart(path).await?;

        api::dispatch(self.post("/cgi-bin/media/uploadimg").multipart(form)).await
    }
}

/// Read a file fully into memory and shape it into the upload form of
/// fields `name`, `filename` and `file`.
async fn read_multipart(path: &Path) -> Result<(MediaKind, Form), WorkError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(WorkError::MediaUnreadable)?;

    let (kind, content_type) = classify(path.extension().and_then(|e| e.to_str()));

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let form = Form::new().text("name", "media").text("filename", name).part(
        "file",
        Part::bytes(bytes)
            .file_name(PART_FILENAME)
            .mime_str(content_type)?,
    );

    Ok((kind, form))
}
