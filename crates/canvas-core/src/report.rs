//! Output of the capture and status commands.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::{CaptureMethod, EnvironmentContext};
use crate::ingest::SavedDiagram;

/// Result of a successful capture, printed as text or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub path: PathBuf,
    pub method: CaptureMethod,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Ready to paste into a Markdown cell.
    pub markdown: String,
}

impl CaptureReport {
    pub fn new(saved: SavedDiagram, method: CaptureMethod, source_path: Option<PathBuf>) -> Self {
        let markdown = markdown_for(&saved.path);
        Self {
            path: saved.path,
            method,
            timestamp: saved.timestamp,
            source_path,
            markdown,
        }
    }
}

/// Environment and configuration as seen by the capture command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub context: EnvironmentContext,
    pub url: String,
    pub screenshot_dir: PathBuf,
    pub diagram_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_serial: Option<String>,
    pub instructions: String,
}

/// Markdown image reference for a saved diagram.
pub fn markdown_for(path: &Path) -> String {
    format!("![Diagram]({})", path.display())
}

/// What the user should do before capturing, given the environment.
pub fn instructions(context: &EnvironmentContext) -> String {
    if context.is_remote {
        "Draw on your Supernote, take a screenshot, then run \
         'supernote-canvas capture --upload <FILE>'."
            .to_string()
    } else if context.usb_ready() {
        "Draw on your Supernote, then run 'supernote-canvas capture' to capture via USB."
            .to_string()
    } else {
        "Draw on your Supernote, then take an OS screenshot (Cmd/Ctrl+Shift+4) \
         and run 'supernote-canvas capture'."
            .to_string()
    }
}
