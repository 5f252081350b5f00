//! UI document resource

use crate::config::ui_document_path;
use crate::error::{Error, Result};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::debug;

/// URI hosts use to fetch the UI document
pub const UI_RESOURCE_URI: &str = "ui://github-pr/mcp-app.html";

/// MIME type marking an HTML document as an embeddable app
pub const UI_MIME_TYPE: &str = "text/html;profile=mcp-app";

/// The static UI document on disk
#[derive(Debug, Clone)]
pub struct UiResource {
    dir: PathBuf,
}

impl UiResource {
    /// Resource reading `mcp-app.html` from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document on disk
    pub fn path(&self) -> PathBuf {
        ui_document_path(&self.dir)
    }

    /// Read the document. Nothing is cached; every call hits the filesystem.
    pub async fn read(&self) -> Result<String> {
        let path = self.path();
        debug!(path = %path.display(), "reading UI document");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::UiDocument { path, source })
    }

    /// Read the document wrapped as a `resources/read` result
    pub async fn read_contents(&self, uri: &str) -> Result<Value> {
        if uri != UI_RESOURCE_URI {
            return Err(Error::UnknownResource(uri.to_string()));
        }
        let text = self.read().await?;
        Ok(json!({
            "contents": [{
                "uri": UI_RESOURCE_URI,
                "mimeType": UI_MIME_TYPE,
                "text": text,
            }]
        }))
    }
}

/// Entries for `resources/list`
pub fn resource_descriptors() -> Value {
    json!([{
        "uri": UI_RESOURCE_URI,
        "name": UI_RESOURCE_URI,
        "mimeType": UI_MIME_TYPE,
        "description": "GitHub PR List UI",
    }])
}
