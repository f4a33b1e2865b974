//! supernote-canvas entry point.

mod args;
mod bridge;
mod orchestrator;

use std::fs;
use std::path::Path;

use clap::Parser;
use supernote_canvas_core::capture::UploadSource;
use supernote_canvas_core::config::CanvasConfig;
use supernote_canvas_core::environment::{
    EnvironmentClassifier, FixedEnvironment, HostedEnvironment,
};
use supernote_canvas_core::error::CanvasError;
use supernote_canvas_core::ingest::Ingestion;
use supernote_canvas_core::locator::latest_screenshot;
use tracing::error;

use crate::args::{CaptureArgs, Cli, Commands, ConfigArgs, LatestArgs, StatusArgs};
use crate::orchestrator::CaptureOrchestrator;

fn main() {
    // Logs go to stderr; stdout carries only command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Latest(args) => run_latest(args),
        Commands::Capture(args) => block_on(run_capture(args)),
        Commands::Status(args) => block_on(run_status(args)),
    }
}

/// Run a future on a single-threaded runtime.
fn block_on<F: std::future::Future<Output = anyhow::Result<()>>>(future: F) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(runtime_failed)?;
    runtime.block_on(future)
}

fn runtime_failed(e: std::io::Error) -> CanvasError {
    CanvasError::internal(format!("Failed to create tokio runtime: {}", e))
}

/// Apply CLI overrides on top of the environment configuration.
fn resolve_config(args: &ConfigArgs) -> CanvasConfig {
    let mut config = CanvasConfig::from_env();
    if let Some(dir) = &args.screenshot_dir {
        config = config.with_screenshot_dir(dir.clone());
    }
    if args.serial.is_some() {
        config = config.with_device_serial(args.serial.clone());
    }
    config
}

fn classifier(args: &ConfigArgs) -> Box<dyn EnvironmentClassifier> {
    if args.remote {
        Box::new(FixedEnvironment::remote())
    } else if args.local {
        Box::new(FixedEnvironment::local())
    } else {
        Box::new(HostedEnvironment)
    }
}

fn read_upload(path: &Path) -> Result<UploadSource, CanvasError> {
    let content =
        fs::read(path).map_err(|e| CanvasError::upload_unreadable(path, &e.to_string()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(UploadSource::new(content, name))
}

async fn run_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config);
    let ingestion = Ingestion::new(config.diagram_dir.clone());
    let orchestrator = CaptureOrchestrator::new(config, classifier(&args.config));

    let upload = match args.upload.as_deref().map(read_upload).transpose() {
        Ok(upload) => upload,
        Err(err) => fail(&err, args.json)?,
    };

    match orchestrator.capture_to(&ingestion, upload).await {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Captured via {}", report.method);
                println!("{}", report.markdown);
            }
            Ok(())
        }
        Err(err) => fail(&err, args.json),
    }
}

async fn run_status(args: StatusArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config);
    let orchestrator = CaptureOrchestrator::new(config, classifier(&args.config));
    let status = orchestrator.status().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    println!("URL:              {}", status.url);
    println!(
        "Environment:      {}",
        if status.context.is_remote { "remote" } else { "local" }
    );
    println!(
        "Bridge available: {}",
        yes_no(status.context.device_bridge_available)
    );
    println!("Device connected: {}", yes_no(status.context.device_connected));
    if let Some(serial) = &status.device_serial {
        println!("Device serial:    {}", serial);
    }
    println!("Screenshot dir:   {}", status.screenshot_dir.display());
    println!("Diagrams dir:     {}", status.diagram_dir.display());
    println!();
    println!("{}", status.instructions);
    Ok(())
}

fn run_latest(args: LatestArgs) -> anyhow::Result<()> {
    let dir = args
        .dir
        .unwrap_or_else(|| CanvasConfig::from_env().screenshot_dir);
    match latest_screenshot(&dir) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            eprintln!("No screenshot files found in '{}'", dir.display());
            std::process::exit(1);
        }
    }
}

/// Report a capture failure and exit with status 1.
fn fail<T>(err: &CanvasError, json: bool) -> anyhow::Result<T> {
    if json {
        println!("{}", serde_json::to_string_pretty(err)?);
    } else {
        eprintln!("Error: {}", err);
    }
    std::process::exit(1);
}
