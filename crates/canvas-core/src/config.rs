//! Runtime configuration resolved from the environment.
//!
//! Variables (empty values are ignored):
//! - `SUPERNOTE_CANVAS_URL`: web UI of the tablet
//! - `SUPERNOTE_CANVAS_SCREENSHOT_DIR`: folder scanned for OS screenshots
//! - `SUPERNOTE_CANVAS_ADB_DEVICE`: serial passed to the bridge as `-s <serial>`
//! - `SUPERNOTE_CANVAS_ADB`: bridge executable (default `adb`)
//!
//! Captured images always land in `./diagrams`.

use std::env;
use std::path::PathBuf;

/// Placeholder private-LAN address; most users override it.
pub const DEFAULT_URL: &str = "http://192.168.0.100:8080";

/// Output folder, relative to the working directory.
pub const DIAGRAM_DIR: &str = "diagrams";

/// Bridge executable looked up on `PATH` when not overridden.
pub const DEFAULT_BRIDGE_PROGRAM: &str = "adb";

/// Immutable settings shared by every capture component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    pub url: String,
    pub screenshot_dir: PathBuf,
    pub diagram_dir: PathBuf,
    pub device_serial: Option<String>,
    pub bridge_program: PathBuf,
}

impl CanvasConfig {
    /// Build the configuration once from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: non_empty_var("SUPERNOTE_CANVAS_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
            screenshot_dir: non_empty_var("SUPERNOTE_CANVAS_SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_screenshot_dir),
            diagram_dir: PathBuf::from(DIAGRAM_DIR),
            device_serial: non_empty_var("SUPERNOTE_CANVAS_ADB_DEVICE"),
            bridge_program: non_empty_var("SUPERNOTE_CANVAS_ADB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BRIDGE_PROGRAM)),
        }
    }

    pub fn with_screenshot_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: dir.into(),
            ..self
        }
    }

    pub fn with_device_serial(self, serial: Option<String>) -> Self {
        Self {
            device_serial: serial.filter(|s| !s.is_empty()),
            ..self
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Desktop folder, where macOS and most Linux desktops drop screenshots.
///
/// Priority:
/// 1. Platform desktop directory
/// 2. `~/Desktop`
/// 3. `./Desktop`
pub fn default_screenshot_dir() -> PathBuf {
    if let Some(desktop) = dirs::desktop_dir() {
        return desktop;
    }
    if let Some(home) = dirs::home_dir() {
        return home.join("Desktop");
    }
    PathBuf::from("Desktop")
}
