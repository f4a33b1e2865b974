//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Capture Supernote sketches into a local `diagrams/` folder.
///
/// Screenshots are taken over USB with adb when a tablet is attached,
/// taken from an uploaded file in hosted notebooks, or picked up from the
/// newest screenshot on your desktop.
#[derive(Debug, Parser)]
#[command(name = "supernote-canvas", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Capture the latest screenshot and print Markdown referencing it
    #[command(after_help = "\
Examples:
  supernote-canvas capture                       # USB, then newest desktop screenshot
  supernote-canvas capture --json                # Machine-readable report
  supernote-canvas capture --upload sketch.png   # Hosted notebook: use an uploaded file
  supernote-canvas capture --screenshot-dir ~/Pictures/Screenshots")]
    Capture(CaptureArgs),

    /// Show the detected environment and configuration
    Status(StatusArgs),

    /// Print the newest screenshot in a folder
    Latest(LatestArgs),
}

/// Per-invocation overrides of the environment configuration.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// Folder scanned for screenshots [env: SUPERNOTE_CANVAS_SCREENSHOT_DIR]
    #[arg(long, value_name = "DIR")]
    pub screenshot_dir: Option<PathBuf>,

    /// Device serial passed to adb [env: SUPERNOTE_CANVAS_ADB_DEVICE]
    #[arg(long, value_name = "SERIAL")]
    pub serial: Option<String>,

    /// Treat this machine as a hosted notebook (upload only)
    #[arg(long, conflicts_with = "local")]
    pub remote: bool,

    /// Treat this machine as local (USB and folder capture)
    #[arg(long)]
    pub local: bool,
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Screenshot file to use in a hosted environment
    #[arg(long, value_name = "FILE")]
    pub upload: Option<PathBuf>,

    /// Print the capture report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Folder to scan [default: configured screenshot folder]
    pub dir: Option<PathBuf>,
}
