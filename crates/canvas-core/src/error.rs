//! User-facing error types with suggestions.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error codes for capture reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoImage,
    IoFailed,
    InvalidInput,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::NoImage => write!(f, "NO_IMAGE"),
            ErrorCode::IoFailed => write!(f, "IO_FAILED"),
            ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// A failure reason that can be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasError {
    pub code: ErrorCode,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for CanvasError {}

impl CanvasError {
    /// Nothing was uploaded while running in a hosted environment.
    pub fn no_image_remote() -> Self {
        Self {
            code: ErrorCode::NoImage,
            message: "No screenshot uploaded".to_string(),
            suggestion: Some(
                "Upload a screenshot file with 'supernote-canvas capture --upload <FILE>'".into(),
            ),
        }
    }

    /// Neither USB capture nor the screenshot folder produced an image.
    ///
    /// `usb_attempted` selects the wording: when a device was connected the
    /// USB connection is worth checking too.
    pub fn no_image_local(screenshot_dir: &Path, usb_attempted: bool) -> Self {
        let message = if usb_attempted {
            format!(
                "USB capture failed. No screenshot files found in '{}'",
                screenshot_dir.display()
            )
        } else {
            format!(
                "No screenshot files found in '{}'",
                screenshot_dir.display()
            )
        };
        let suggestion = if usb_attempted {
            "Take a screenshot as .png, .jpg, or .jpeg, or check your USB connection"
        } else {
            "Take a screenshot as .png, .jpg, or .jpeg"
        };
        Self {
            code: ErrorCode::NoImage,
            message,
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn create_dir_failed(dir: &Path, error: &str) -> Self {
        Self {
            code: ErrorCode::IoFailed,
            message: format!(
                "Could not create diagrams directory '{}': {}",
                dir.display(),
                error
            ),
            suggestion: Some(
                "Check that the working directory is writable and run the command again".into(),
            ),
        }
    }

    pub fn write_failed(path: &Path, error: &str) -> Self {
        Self {
            code: ErrorCode::IoFailed,
            message: format!("Failed to save image to '{}': {}", path.display(), error),
            suggestion: Some("Check free disk space and permissions of the diagrams folder".into()),
        }
    }

    /// The file passed as an upload could not be read.
    pub fn upload_unreadable(path: &Path, error: &str) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: format!("Could not read uploaded file '{}': {}", path.display(), error),
            suggestion: Some("Pass the path of an existing .png or .jpg file to --upload".into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: message.into(),
            suggestion: Some("This is an internal error. Please report it if it persists.".into()),
        }
    }
}
