//! Capture strategy selection.
//!
//! Strategies run in a fixed order and the first one yielding bytes wins:
//! 1. USB, when local and a device is connected
//! 2. Upload, when remote and the user supplied a non-empty file
//! 3. Folder, when local
//!
//! The environment is re-probed on every call.

use std::fs;
use std::path::PathBuf;

use supernote_canvas_core::capture::{
    CaptureMethod, CaptureResult, EnvironmentContext, UploadSource,
};
use supernote_canvas_core::config::CanvasConfig;
use supernote_canvas_core::environment::EnvironmentClassifier;
use supernote_canvas_core::error::CanvasError;
use supernote_canvas_core::ingest::Ingestion;
use supernote_canvas_core::locator::latest_screenshot;
use supernote_canvas_core::report::{instructions, CaptureReport, StatusReport};
use tracing::{debug, info, warn};

use crate::bridge::DeviceBridge;

pub struct CaptureOrchestrator {
    config: CanvasConfig,
    classifier: Box<dyn EnvironmentClassifier>,
    bridge: DeviceBridge,
}

impl CaptureOrchestrator {
    pub fn new(config: CanvasConfig, classifier: impl EnvironmentClassifier + 'static) -> Self {
        let bridge = DeviceBridge::new(&config);
        Self {
            config,
            classifier: Box::new(classifier),
            bridge,
        }
    }

    /// Classify the environment and probe the bridge.
    ///
    /// Hosted kernels have no USB access, so the bridge is only probed locally.
    pub async fn probe(&self) -> EnvironmentContext {
        let is_remote = self.classifier.is_remote();
        let (device_bridge_available, device_connected) = if is_remote {
            (false, false)
        } else {
            self.bridge.probe().await
        };
        let context = EnvironmentContext {
            is_remote,
            device_bridge_available,
            device_connected,
        };
        debug!("Environment: {:?}", context);
        context
    }

    pub async fn status(&self) -> StatusReport {
        let context = self.probe().await;
        StatusReport {
            context,
            url: self.config.url.clone(),
            screenshot_dir: self.config.screenshot_dir.clone(),
            diagram_dir: self.config.diagram_dir.clone(),
            device_serial: self.config.device_serial.clone(),
            instructions: instructions(&context),
        }
    }

    /// Probe the environment, then run the strategies.
    pub async fn capture(&self, upload: Option<UploadSource>) -> Result<CaptureResult, CanvasError> {
        let context = self.probe().await;
        self.capture_in(&context, upload).await
    }

    /// Run the strategies against an already probed `context`.
    pub async fn capture_in(
        &self,
        context: &EnvironmentContext,
        upload: Option<UploadSource>,
    ) -> Result<CaptureResult, CanvasError> {
        if context.usb_ready() {
            info!("Capturing via USB (ADB)...");
            if let Some(bytes) = self.bridge.screencap(context).await {
                return Ok(CaptureResult {
                    bytes,
                    source_path: None,
                    method: CaptureMethod::Usb,
                });
            }
        }

        if context.is_remote {
            if let Some(upload) = upload.filter(|u| !u.is_empty()) {
                return Ok(CaptureResult {
                    bytes: upload.content,
                    source_path: upload.name.map(PathBuf::from),
                    method: CaptureMethod::Upload,
                });
            }
            return Err(CanvasError::no_image_remote());
        }

        if upload_ignored(context, upload.as_ref()) {
            warn!("Ignoring uploaded file: uploads are only used in a remote environment (pass --remote)");
        }

        info!("Trying folder-based capture...");
        if let Some(src) = latest_screenshot(&self.config.screenshot_dir) {
            match fs::read(&src) {
                Ok(bytes) => {
                    return Ok(CaptureResult {
                        bytes,
                        source_path: Some(src),
                        method: CaptureMethod::Folder,
                    });
                }
                Err(e) => warn!("Failed to read screenshot file '{}': {}", src.display(), e),
            }
        }

        Err(CanvasError::no_image_local(
            &self.config.screenshot_dir,
            context.usb_ready(),
        ))
    }

    /// Capture and persist in one step.
    pub async fn capture_to(
        &self,
        ingestion: &Ingestion,
        upload: Option<UploadSource>,
    ) -> Result<CaptureReport, CanvasError> {
        let result = self.capture(upload).await?;
        info!("Captured via {}", result.method);
        let saved = ingestion.save(&result.bytes, result.source_path.as_deref())?;
        Ok(CaptureReport::new(saved, result.method, result.source_path))
    }
}

/// True when a non-empty upload was supplied but the environment is local.
fn upload_ignored(context: &EnvironmentContext, upload: Option<&UploadSource>) -> bool {
    !context.is_remote && upload.is_some_and(|u| !u.is_empty())
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime};

    use supernote_canvas_core::capture::{CaptureMethod, EnvironmentContext, UploadSource};
    use supernote_canvas_core::config::CanvasConfig;
    use supernote_canvas_core::environment::FixedEnvironment;
    use supernote_canvas_core::error::ErrorCode;
    use supernote_canvas_core::ingest::{Ingestion, NoopPostProcessor};

    use super::{upload_ignored, CaptureOrchestrator};
    use crate::bridge::testing::{calls, fake_bridge, HEALTHY};

    fn config(root: &Path, program: PathBuf) -> CanvasConfig {
        CanvasConfig {
            url: "http://tablet".into(),
            screenshot_dir: root.join("Desktop"),
            diagram_dir: root.join("diagrams"),
            device_serial: None,
            bridge_program: program,
        }
    }

    fn screenshot(root: &Path, name: &str, contents: &[u8], age_secs: u64) -> PathBuf {
        let desktop = root.join("Desktop");
        fs::create_dir_all(&desktop).unwrap();
        let path = desktop.join(name);
        fs::write(&path, contents).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_local_prefers_usb() {
        let root = tempfile::tempdir().unwrap();
        let program = fake_bridge(root.path(), HEALTHY);
        screenshot(root.path(), "shot.png", b"FOLDER", 1);
        let orchestrator =
            CaptureOrchestrator::new(config(root.path(), program), FixedEnvironment::local());

        let result = orchestrator.capture(None).await.unwrap();

        assert_eq!(result.method, CaptureMethod::Usb);
        assert_eq!(result.bytes, b"PNGDATA");
        assert_eq!(result.source_path, None);
    }

    #[tokio::test]
    async fn test_local_falls_back_to_folder_when_usb_fails() {
        let root = tempfile::tempdir().unwrap();
        let program = fake_bridge(
            root.path(),
            r#"case "$1" in
  version) exit 0 ;;
  devices) printf 'List of devices attached\nSN1\tdevice\n' ;;
  *) exit 1 ;;
esac"#,
        );
        let newest = screenshot(root.path(), "new.jpg", b"NEW", 5);
        screenshot(root.path(), "old.png", b"OLD", 500);
        let orchestrator =
            CaptureOrchestrator::new(config(root.path(), program), FixedEnvironment::local());

        let result = orchestrator.capture(None).await.unwrap();

        assert_eq!(result.method, CaptureMethod::Folder);
        assert_eq!(result.bytes, b"NEW");
        assert_eq!(
            result.source_path.unwrap().file_name(),
            newest.file_name()
        );
    }

    #[tokio::test]
    async fn test_local_without_bridge_or_screenshots() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = CaptureOrchestrator::new(
            config(root.path(), root.path().join("no-such-adb")),
            FixedEnvironment::local(),
        );

        let err = orchestrator.capture(None).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NoImage);
        assert!(err.message.starts_with("No screenshot files found"));
        assert!(err.message.contains("Desktop"));
    }

    #[tokio::test]
    async fn test_local_usb_attempted_message() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = CaptureOrchestrator::new(
            config(root.path(), root.path().join("no-such-adb")),
            FixedEnvironment::local(),
        );
        let context = EnvironmentContext {
            is_remote: false,
            device_bridge_available: true,
            device_connected: true,
        };

        let err = orchestrator.capture_in(&context, None).await.unwrap_err();

        assert!(err.message.starts_with("USB capture failed"));
    }

    #[tokio::test]
    async fn test_local_ignores_upload() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = CaptureOrchestrator::new(
            config(root.path(), root.path().join("no-such-adb")),
            FixedEnvironment::local(),
        );
        let upload = UploadSource::new(b"UPLOADED".to_vec(), Some("up.png".into()));

        let err = orchestrator.capture(Some(upload)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NoImage);
    }

    #[test]
    fn test_upload_ignored_only_when_local() {
        let upload = UploadSource::new(b"UPLOADED".to_vec(), None);
        let local = EnvironmentContext::default();
        let remote = EnvironmentContext {
            is_remote: true,
            ..Default::default()
        };

        assert!(upload_ignored(&local, Some(&upload)));
        assert!(!upload_ignored(&remote, Some(&upload)));
        assert!(!upload_ignored(&local, None));
        assert!(!upload_ignored(&local, Some(&UploadSource::default())));
    }

    #[tokio::test]
    async fn test_remote_uses_upload() {
        let root = tempfile::tempdir().unwrap();
        let program = fake_bridge(root.path(), HEALTHY);
        let orchestrator =
            CaptureOrchestrator::new(config(root.path(), program), FixedEnvironment::remote());
        let upload = UploadSource::new(b"UPLOADED".to_vec(), Some("sketch.jpg".into()));

        let result = orchestrator.capture(Some(upload)).await.unwrap();

        assert_eq!(result.method, CaptureMethod::Upload);
        assert_eq!(result.bytes, b"UPLOADED");
        assert_eq!(result.source_path, Some(PathBuf::from("sketch.jpg")));
        assert!(calls(root.path()).is_empty());
    }

    #[tokio::test]
    async fn test_remote_without_upload_never_tries_usb_or_folder() {
        let root = tempfile::tempdir().unwrap();
        let program = fake_bridge(root.path(), HEALTHY);
        screenshot(root.path(), "shot.png", b"FOLDER", 1);
        let orchestrator =
            CaptureOrchestrator::new(config(root.path(), program), FixedEnvironment::remote());

        let err = orchestrator.capture(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoImage);
        assert_eq!(err.message, "No screenshot uploaded");

        let err = orchestrator
            .capture(Some(UploadSource::default()))
            .await
            .unwrap_err();
        assert_eq!(err.message, "No screenshot uploaded");

        assert!(calls(root.path()).is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_probe() {
        let root = tempfile::tempdir().unwrap();
        let program = fake_bridge(root.path(), HEALTHY);
        let orchestrator =
            CaptureOrchestrator::new(config(root.path(), program), FixedEnvironment::local());

        let status = orchestrator.status().await;

        assert!(status.context.usb_ready());
        assert_eq!(status.url, "http://tablet");
        assert!(status.instructions.contains("via USB"));
    }

    #[tokio::test]
    async fn test_capture_to_writes_diagram() {
        let root = tempfile::tempdir().unwrap();
        screenshot(root.path(), "Screen Shot.jpg", b"JPEGISH", 1);
        let config = config(root.path(), root.path().join("no-such-adb"));
        let ingestion =
            Ingestion::new(config.diagram_dir.clone()).with_post_processor(NoopPostProcessor);
        let orchestrator = CaptureOrchestrator::new(config, FixedEnvironment::local());

        let report = orchestrator.capture_to(&ingestion, None).await.unwrap();

        assert_eq!(report.method, CaptureMethod::Folder);
        assert_eq!(report.path.extension().unwrap(), "jpg");
        assert!(report.path.starts_with(root.path().join("diagrams")));
        assert_eq!(fs::read(&report.path).unwrap(), b"JPEGISH");
        assert_eq!(report.markdown, format!("![Diagram]({})", report.path.display()));
    }

    #[tokio::test]
    async fn test_capture_to_reports_io_failure() {
        let root = tempfile::tempdir().unwrap();
        screenshot(root.path(), "shot.png", b"PNG", 1);
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let config = config(root.path(), root.path().join("no-such-adb"));
        let ingestion =
            Ingestion::new(blocker.join("diagrams")).with_post_processor(NoopPostProcessor);
        let orchestrator = CaptureOrchestrator::new(config, FixedEnvironment::local());

        let err = orchestrator.capture_to(&ingestion, None).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::IoFailed);
        assert!(err.message.contains("Could not create diagrams directory"));
    }
}
