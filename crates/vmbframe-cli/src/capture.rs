//! Steady-state capture loop over announced frames.

use anyhow::{anyhow, Context};
use image::{ImageBuffer, Luma};
use serde::Serialize;
use std::path::{Path, PathBuf};
use vmbframe_core::{
    AcquisitionControl, CameraAttributes, ErrorCode, Frame, FrameInfo, FrameSdk, PixelFormat,
};

/// Parameters of one capture run.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub buffer_count: usize,
    pub frame_count: usize,
    pub wait_timeout_ms: u32,
    pub output_dir: Option<PathBuf>,
}

/// What happened during a capture run.
#[derive(Debug, Default, Serialize)]
pub struct CaptureSummary {
    pub waits: usize,
    pub filled: usize,
    /// Filled frames whose receive status was not complete.
    pub incomplete: usize,
    pub timeouts: usize,
    /// Wait codes other than success and timeout; the loop stops on the first.
    pub wait_error: Option<ErrorCode>,
    pub frames: Vec<FrameInfo>,
    pub saved: Vec<PathBuf>,
}

/// Announce `buffer_count` frames, run `frame_count` waits, then tear down.
///
/// Follows the SDK's documented order: announce, capture start, queue,
/// acquisition start, wait/requeue, acquisition stop, capture end, flush,
/// revoke. Teardown runs even if the loop fails; its failures are logged.
pub fn run_capture<S, A>(
    sdk: &S,
    control: &A,
    attrs: &CameraAttributes,
    options: &CaptureOptions,
) -> anyhow::Result<CaptureSummary>
where
    S: FrameSdk + ?Sized,
    A: AcquisitionControl + ?Sized,
{
    if options.buffer_count == 0 {
        return Err(anyhow!("buffer_count must be at least 1"));
    }
    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut frames = (0..options.buffer_count)
        .map(|_| Frame::new(sdk, attrs))
        .collect::<Result<Vec<_>, _>>()?;
    for frame in frames.iter_mut() {
        frame.announce()?;
    }
    tracing::info!(
        buffers = frames.len(),
        payload_size = attrs.payload_size,
        "frames announced"
    );

    let result = acquire(control, &mut frames, options);

    teardown(control, &mut frames);
    result
}

fn acquire<S, A>(
    control: &A,
    frames: &mut [Frame<'_, S>],
    options: &CaptureOptions,
) -> anyhow::Result<CaptureSummary>
where
    S: FrameSdk + ?Sized,
    A: AcquisitionControl + ?Sized,
{
    control
        .capture_start()
        .map_err(|code| anyhow!("VmbCaptureStart failed: {code}"))?;
    for frame in frames.iter_mut() {
        frame.enqueue()?;
    }
    control
        .acquisition_start()
        .map_err(|code| anyhow!("AcquisitionStart failed: {code}"))?;

    let mut summary = CaptureSummary::default();
    let buffers = frames.len();
    for n in 0..options.frame_count {
        let frame = &mut frames[n % buffers];
        let code = frame.wait_timeout(options.wait_timeout_ms);
        summary.waits += 1;

        if code.is_timeout() {
            // Still queued; a later wait on this frame may fill it.
            summary.timeouts += 1;
            tracing::warn!(wait = n, timeout_ms = options.wait_timeout_ms, "frame wait timed out");
            continue;
        }
        if !code.is_success() {
            tracing::warn!(wait = n, code = %code, "frame wait failed; stopping");
            summary.wait_error = Some(code);
            break;
        }

        summary.filled += 1;
        if let Some(info) = frame.info() {
            if !info.is_complete() {
                summary.incomplete += 1;
                tracing::debug!(frame_id = info.frame_id, status = info.receive_status, "incomplete frame");
            }
            if let Some(dir) = &options.output_dir {
                let path = dir.join(format!("frame_{:06}.png", info.frame_id));
                save_png(frame, &path)?;
                summary.saved.push(path);
            }
            summary.frames.push(info);
        }
        frame.enqueue()?;
    }

    tracing::info!(
        waits = summary.waits,
        filled = summary.filled,
        timeouts = summary.timeouts,
        "capture loop finished"
    );
    Ok(summary)
}

fn teardown<S, A>(control: &A, frames: &mut [Frame<'_, S>])
where
    S: FrameSdk + ?Sized,
    A: AcquisitionControl + ?Sized,
{
    let steps = [
        ("AcquisitionStop", control.acquisition_stop()),
        ("VmbCaptureEnd", control.capture_end()),
        ("VmbCaptureQueueFlush", control.capture_queue_flush()),
    ];
    for (name, result) in steps {
        if let Err(code) = result {
            tracing::warn!(step = name, code = %code, "teardown step failed");
        }
    }
    for frame in frames.iter_mut() {
        if let Err(e) = frame.revoke() {
            tracing::warn!(error = %e, "frame revoke failed");
        }
    }
}

/// Write a filled frame as grayscale PNG: 8-bit for Mono8, 16-bit otherwise
/// with the significant bits shifted to the top.
pub fn save_png<S: FrameSdk + ?Sized>(frame: &Frame<'_, S>, path: &Path) -> anyhow::Result<()> {
    let rows = frame.read_rows()?;
    let (width, height) = (frame.width(), frame.height());
    let bytes: Vec<u8> = rows.iter().copied().collect();

    match frame.pixel_format() {
        PixelFormat::Mono8 => {
            let img = ImageBuffer::<Luma<u8>, _>::from_raw(width, height, bytes)
                .context("frame buffer does not match its geometry")?;
            img.save(path)?;
        }
        format => {
            let shift = match format {
                PixelFormat::Mono12 => 4,
                PixelFormat::Mono14 => 2,
                _ => 0,
            };
            // Bits above the format's depth are padding and discarded.
            let depth_mask = u16::MAX >> shift;
            let pixels: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| (u16::from_le_bytes([c[0], c[1]]) & depth_mask) << shift)
                .collect();
            let img = ImageBuffer::<Luma<u16>, _>::from_raw(width, height, pixels)
                .context("frame buffer does not match its geometry")?;
            img.save(path)?;
        }
    }
    tracing::debug!(path = %path.display(), "frame saved");
    Ok(())
}
