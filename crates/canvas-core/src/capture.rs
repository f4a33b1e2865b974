//! Capture types shared by the orchestrator and the reports.
//!
//! Capture strategies, in priority order:
//!
//! | Method | Environment | Source |
//! |--------|-------------|--------|
//! | **Usb** | local | `adb exec-out screencap -p` |
//! | **Upload** | remote | file supplied by the user |
//! | **Folder** | local | newest screenshot in the screenshot folder |

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How an image was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMethod {
    Usb,
    Upload,
    Folder,
}

impl fmt::Display for CaptureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMethod::Usb => write!(f, "USB (ADB)"),
            CaptureMethod::Upload => write!(f, "file upload"),
            CaptureMethod::Folder => write!(f, "folder"),
        }
    }
}

/// Raw image bytes from one successful strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub bytes: Vec<u8>,
    /// Origin of the bytes, used as the extension hint during ingestion.
    pub source_path: Option<PathBuf>,
    pub method: CaptureMethod,
}

/// Probe results for one capture invocation. Never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentContext {
    pub is_remote: bool,
    pub device_bridge_available: bool,
    pub device_connected: bool,
}

impl EnvironmentContext {
    /// True when the USB strategy may run.
    pub fn usb_ready(&self) -> bool {
        !self.is_remote && self.device_bridge_available && self.device_connected
    }
}

/// A file handed over by the user in place of a device capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSource {
    pub content: Vec<u8>,
    pub name: Option<String>,
}

impl UploadSource {
    pub fn new(content: Vec<u8>, name: Option<String>) -> Self {
        Self {
            content,
            name: name.filter(|n| !n.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
