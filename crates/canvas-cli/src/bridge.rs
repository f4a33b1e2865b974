//! Device bridge (adb) probing and screen capture.
//!
//! Every invocation is bounded by a timeout and kills the child when it
//! expires. Failures of any kind degrade to "not available" or "no data";
//! nothing here returns an error.
//!
//! Invocations:
//! - `<tool> version`
//! - `<tool> [-s <serial>] devices`
//! - `<tool> [-s <serial>] exec-out screencap -p`

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use supernote_canvas_core::capture::EnvironmentContext;
use supernote_canvas_core::config::CanvasConfig;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Bound for `version` and `devices`.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound for `exec-out screencap`.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to the external bridge executable.
#[derive(Debug, Clone)]
pub struct DeviceBridge {
    program: PathBuf,
    serial: Option<String>,
    probe_timeout: Duration,
    capture_timeout: Duration,
}

impl DeviceBridge {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            program: config.bridge_program.clone(),
            serial: config.device_serial.clone(),
            probe_timeout: PROBE_TIMEOUT,
            capture_timeout: CAPTURE_TIMEOUT,
        }
    }

    #[cfg(test)]
    pub fn with_timeouts(self, probe_timeout: Duration, capture_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            capture_timeout,
            ..self
        }
    }

    /// True if `<tool> version` exits successfully.
    pub async fn is_available(&self) -> bool {
        match self.run(&["version"], false, self.probe_timeout).await {
            Some(output) => output.status.success(),
            None => false,
        }
    }

    /// True if `<tool> devices` lists at least one ready device, or the
    /// configured serial as ready when one is set.
    ///
    /// Only meaningful once [`is_available`](Self::is_available) succeeded.
    pub async fn is_device_connected(&self) -> bool {
        let Some(output) = self.run(&["devices"], true, self.probe_timeout).await else {
            return false;
        };
        if !output.status.success() {
            debug!("'devices' exited with {}", output.status);
            return false;
        }
        count_devices(&String::from_utf8_lossy(&output.stdout), self.serial.as_deref()) > 0
    }

    /// Probe availability, then connection. Returns `(available, connected)`.
    pub async fn probe(&self) -> (bool, bool) {
        if !self.is_available().await {
            return (false, false);
        }
        (true, self.is_device_connected().await)
    }

    /// Pull a PNG of the device screen.
    ///
    /// Returns `None` without spawning anything unless `context` reports a
    /// present bridge and a connected device.
    pub async fn screencap(&self, context: &EnvironmentContext) -> Option<Vec<u8>> {
        if !context.device_bridge_available || !context.device_connected {
            return None;
        }

        let output = self
            .run(&["exec-out", "screencap", "-p"], true, self.capture_timeout)
            .await?;
        if !output.status.success() {
            warn!(
                "screencap exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        if output.stdout.is_empty() {
            warn!("screencap produced no data");
            return None;
        }

        info!("Captured {} bytes over USB", output.stdout.len());
        Some(output.stdout)
    }

    async fn run(&self, args: &[&str], scoped: bool, limit: Duration) -> Option<Output> {
        let mut cmd = Command::new(&self.program);
        if scoped {
            if let Some(serial) = &self.serial {
                cmd.arg("-s").arg(serial);
            }
        }
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                debug!("Failed to run '{}': {}", self.program.display(), e);
                None
            }
            Err(_) => {
                warn!(
                    "'{} {}' timed out after {:?}",
                    self.program.display(),
                    args.join(" "),
                    limit
                );
                None
            }
        }
    }
}

/// Count ready devices in `devices` output, skipping the header line.
///
/// `devices` lists every attached device even with `-s`, so a serial
/// restricts the count to lines reading `<serial> device`.
pub fn count_devices(stdout: &str, serial: Option<&str>) -> usize {
    stdout
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| match serial {
            Some(serial) => {
                let mut fields = line.split_whitespace();
                fields.next() == Some(serial) && fields.next() == Some("device")
            }
            None => line.contains("device"),
        })
        .count()
}
