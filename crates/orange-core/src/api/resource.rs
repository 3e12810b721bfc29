//! Description of the REST collections the client talks to.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Mime type sent when the caller did not specify one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A local image file attached to a multipart form as the `image` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub path: PathBuf,
    pub mime: Option<String>,
}

impl ImageUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// File name sent with the part (last path component)
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string())
    }

    pub fn mime(&self) -> &str {
        self.mime.as_deref().unwrap_or(DEFAULT_IMAGE_MIME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// How a form is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FormBody {
    Json(serde_json::Value),
    Multipart {
        fields: Vec<(&'static str, String)>,
        image: Option<ImageUpload>,
    },
}

/// A REST collection with list/create/update/delete endpoints.
///
/// Paths are relative to the configured API URL and keep the trailing slash
/// the server expects.
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Clone + Send + Sync + 'static;
    type Form: Clone + Send + Sync + 'static;

    /// Human-readable singular name, e.g. "Book"
    const LABEL: &'static str;

    /// Collection path, e.g. "/book/"
    const COLLECTION: &'static str;

    fn record_id(record: &Self::Record) -> i64;

    fn encode(form: &Self::Form) -> FormBody;

    fn update_path(id: i64) -> String {
        format!("{}{}/", Self::COLLECTION, id)
    }

    fn delete_path(id: i64) -> String {
        format!("{}{}/", Self::COLLECTION, id)
    }

    /// Notice shown after a record was created
    fn created_message() -> String {
        format!("{} added successfully", Self::LABEL)
    }

    fn updated_message() -> String {
        format!("{} updated successfully", Self::LABEL)
    }

    fn deleted_message() -> String {
        format!("{} deleted successfully", Self::LABEL)
    }
}
