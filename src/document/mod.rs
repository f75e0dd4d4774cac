//! Strategy document source: editor buffer, file load and file save.

pub mod data_url;
pub mod files;

use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::constants::document::SAVE_MIME;
use crate::error::DocumentError;
use crate::types::StrategySource;

pub use data_url::{decode_text_data_url, encode_text_data_url};
pub use files::{DirFileSaver, FilePicker, FileSaver, PathFilePicker, PickedFile, SaveRequest};

/// Live editor buffer.
pub trait EditorSource: Send + Sync {
    fn current_text(&self) -> StrategySource;
    fn set_text(&self, source: StrategySource);
}

/// Editor buffer held in memory.
#[derive(Debug, Default)]
pub struct MemoryEditor {
    buffer: RwLock<StrategySource>,
}

impl MemoryEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            buffer: RwLock::new(StrategySource::new(text)),
        }
    }
}

impl EditorSource for MemoryEditor {
    fn current_text(&self) -> StrategySource {
        self.buffer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_text(&self, source: StrategySource) {
        *self.buffer.write().unwrap_or_else(PoisonError::into_inner) = source;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(StrategySource),
    /// The user closed the picker; the editor was left alone.
    Cancelled,
}

#[derive(Clone)]
pub struct StrategyDocuments {
    editor: Arc<dyn EditorSource>,
    saver: Arc<dyn FileSaver>,
    default_filename: String,
}

impl StrategyDocuments {
    pub fn new(
        editor: Arc<dyn EditorSource>,
        saver: Arc<dyn FileSaver>,
        default_filename: impl Into<String>,
    ) -> Self {
        Self {
            editor,
            saver,
            default_filename: default_filename.into(),
        }
    }

    pub fn current_text(&self) -> StrategySource {
        self.editor.current_text()
    }

    pub fn default_filename(&self) -> &str {
        &self.default_filename
    }

    /// Let the user pick one file and replace the editor content with it.
    pub async fn load_from_file(&self, picker: &dyn FilePicker) -> Result<LoadOutcome, DocumentError> {
        let Some(file) = picker.pick_one().await? else {
            info!("[DOCUMENT] User cancelled file load");
            return Ok(LoadOutcome::Cancelled);
        };

        let text = decode_text_data_url(&file.content)?;
        let source = StrategySource::new(text);
        info!("📂 [DOCUMENT] Loaded '{}' ({} bytes)", file.name, source.as_str().len());
        self.editor.set_text(source.clone());
        Ok(LoadOutcome::Loaded(source))
    }

    pub fn save_to_file(&self, source: &StrategySource, filename: &str) {
        self.saver.save(SaveRequest {
            filename: filename.to_string(),
            mime: SAVE_MIME.to_string(),
            bytes: source.as_str().as_bytes().to_vec(),
        });
    }

    /// Save the current editor content under the default filename.
    pub fn save_current(&self) {
        let source = self.current_text();
        self.save_to_file(&source, &self.default_filename);
    }
}
