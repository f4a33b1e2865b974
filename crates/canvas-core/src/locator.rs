//! Finds the newest screenshot in a folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// Extensions considered screenshots (compared case-insensitively).
pub const SCREENSHOT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Return the most recently modified screenshot in `dir`.
///
/// Missing, non-directory, or unreadable folders yield `None`, as do entries
/// whose metadata can't be read. Equal modification times resolve to the
/// lexicographically smallest path.
pub fn latest_screenshot(dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot scan '{}': {}", dir.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_screenshot_extension(path))
        .filter_map(|path| {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .collect();

    // Stable sorts: path order first, then newest first.
    candidates.sort_by(|a, b| a.1.cmp(&b.1));
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    let (_, newest) = candidates.into_iter().next()?;
    Some(absolute(newest))
}

fn has_screenshot_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SCREENSHOT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
