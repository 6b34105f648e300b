use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vmbframe_core::fake::FakeSdk;
use vmbframe_core::{ErrorCode, PixelFormat};
use vmbframe_hw::{Camera, VimbaLibrary};

mod capture;
mod config;

use capture::{run_capture, CaptureOptions, CaptureSummary};
use config::Config;

#[derive(Parser)]
#[command(name = "vmbframe", about = "Vimba frame capture CLI")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported pixel formats
    Formats,
    /// Describe an SDK status code
    Error {
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },
    /// List cameras seen by the native library
    Cameras {
        #[arg(long)]
        json: bool,
    },
    /// Run the capture loop against a camera
    Capture {
        /// Camera id (default: first listed camera)
        #[arg(long)]
        camera: Option<String>,
        /// Number of frame waits
        #[arg(short = 'n', long)]
        frames: Option<usize>,
        /// Number of announced buffers
        #[arg(short, long)]
        buffers: Option<usize>,
        /// Wait timeout in milliseconds
        #[arg(short, long)]
        timeout: Option<u32>,
        /// Directory to write frames to as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Run the capture loop against the built-in fake SDK
    Selftest {
        #[arg(long, default_value_t = 64)]
        width: u32,
        #[arg(long, default_value_t = 48)]
        height: u32,
        #[arg(long, default_value = "Mono8")]
        format: String,
        /// Number of waits the fake should time out
        #[arg(long, default_value_t = 1)]
        timeouts: usize,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Formats => {
            println!("{:<8} {:>5} {:>10}", "FORMAT", "BYTES", "PFNC");
            for format in PixelFormat::ALL {
                println!(
                    "{:<8} {:>5} {:#010x}",
                    format.name(),
                    format.bytes_per_pixel(),
                    format.code()
                );
            }
        }
        Commands::Error { code } => {
            println!("{}", ErrorCode(code));
        }
        Commands::Cameras { json } => {
            let lib = VimbaLibrary::load(&config.lib_path)?;
            let cameras = lib.cameras()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cameras)?);
            } else if cameras.is_empty() {
                println!("No cameras found");
            } else {
                for cam in &cameras {
                    println!("{}  {} ({}, serial {})", cam.id, cam.name, cam.model, cam.serial);
                }
            }
        }
        Commands::Capture {
            camera,
            frames,
            buffers,
            timeout,
            output,
            json,
        } => {
            config.camera_id = camera.or(config.camera_id);
            config.frame_count = frames.unwrap_or(config.frame_count);
            config.buffer_count = buffers.unwrap_or(config.buffer_count);
            config.wait_timeout_ms = timeout.unwrap_or(config.wait_timeout_ms);
            config.output_dir = output.or(config.output_dir);

            let lib = VimbaLibrary::load(&config.lib_path)?;
            let id = match &config.camera_id {
                Some(id) => id.clone(),
                None => lib
                    .cameras()?
                    .into_iter()
                    .next()
                    .map(|c| c.id)
                    .context("no cameras found")?,
            };
            let camera = Camera::open(&lib, &id)?;
            let attrs = camera.attributes()?;

            let summary = run_capture(&lib, &camera, &attrs, &options(&config))?;
            camera.close()?;
            print_summary(&summary, json)?;
        }
        Commands::Selftest {
            width,
            height,
            format,
            timeouts,
            json,
        } => {
            let format: PixelFormat = format.parse()?;
            let sdk = FakeSdk::new();
            let attrs = sdk.attributes(width, height, format);
            sdk.time_out_waits(timeouts);

            let summary = run_capture(&sdk, &sdk, &attrs, &options(&config))?;
            anyhow::ensure!(
                sdk.announced_count() == 0,
                "{} frame(s) left registered after teardown",
                sdk.announced_count()
            );
            anyhow::ensure!(
                summary.wait_error.is_none(),
                "unexpected wait failure against the fake SDK"
            );
            print_summary(&summary, json)?;
        }
    }

    Ok(())
}

fn options(config: &Config) -> CaptureOptions {
    CaptureOptions {
        buffer_count: config.buffer_count,
        frame_count: config.frame_count,
        wait_timeout_ms: config.wait_timeout_ms,
        output_dir: config.output_dir.clone(),
    }
}

fn print_summary(summary: &CaptureSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!(
        "waits: {}  filled: {}  incomplete: {}  timeouts: {}",
        summary.waits, summary.filled, summary.incomplete, summary.timeouts
    );
    if let Some(code) = summary.wait_error {
        println!("stopped on: {code}");
    }
    for path in &summary.saved {
        println!("saved {}", path.display());
    }
    Ok(())
}
