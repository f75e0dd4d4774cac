//! File picker and file saver collaborators.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::data_url::encode_text_data_url;
use crate::error::DocumentError;

/// A file chosen by the user, content already read as a data URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub content: String,
}

/// A plain-text download handed to the saver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Single-file selection surface. `None` means the user cancelled.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick_one(&self) -> Result<Option<PickedFile>, DocumentError>;
}

/// Browser-level "save as" action. Success is not reported back.
pub trait FileSaver: Send + Sync {
    fn save(&self, request: SaveRequest);
}

/// Picker backed by an optional path on disk; no path behaves as a cancel.
#[derive(Clone, Debug, Default)]
pub struct PathFilePicker {
    path: Option<PathBuf>,
}

impl PathFilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FilePicker for PathFilePicker {
    async fn pick_one(&self) -> Result<Option<PickedFile>, DocumentError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let text = tokio::fs::read_to_string(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(PickedFile {
            name,
            content: encode_text_data_url(&text),
        }))
    }
}

/// Saver writing downloads into a directory. Failures are logged only.
#[derive(Clone, Debug)]
pub struct DirFileSaver {
    dir: PathBuf,
}

impl DirFileSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSaver for DirFileSaver {
    fn save(&self, request: SaveRequest) {
        let path = self.dir.join(&request.filename);
        match std::fs::write(&path, &request.bytes) {
            Ok(()) => info!("💾 [DOCUMENT] Saved {} ({} bytes)", path.display(), request.bytes.len()),
            Err(e) => tracing::warn!("⚠️ [DOCUMENT] Failed to save {}: {}", path.display(), e),
        }
    }
}
