//! Live loudness monitor.
//!
//! Plays a decoded file through a [`RealtimeSession`] in display-frame sized
//! blocks and draws the input and output meters in the terminal. Nothing is
//! sent to an audio device; pacing comes from the frame clock.

use std::fmt::Write as _;
use std::io::{IsTerminal, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Args;
use squash_core::display::{CanvasTarget, FrameScheduler, ManualClock, PixelSurface, SystemClock};
use squash_core::{AudioGraph, RealtimeSession};
use squash_io::Decoder;

use super::common::{CompressorArgs, FileDecoder, format_db, format_duration, load_settings};

/// Display frames per second.
const FPS: f64 = 60.0;

#[derive(Args)]
pub struct MonitorArgs {
    /// Input audio file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Start with compression off
    #[arg(long)]
    no_compression: bool,

    /// Flip compression on/off every SECS seconds of audio
    #[arg(long, value_name = "SECS")]
    toggle_every: Option<f64>,

    /// Run as fast as possible on a simulated clock
    #[arg(long)]
    fast: bool,

    /// Meter width in columns
    #[arg(long)]
    width: Option<u32>,

    /// Meter height in rows
    #[arg(long)]
    height: Option<u32>,

    #[command(flatten)]
    compressor: CompressorArgs,
}

pub fn run(args: MonitorArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let mut options = settings.session_options()?;
    options.params = args.compressor.apply(options.params);
    options.compression = !args.no_compression;
    let width = args.width.unwrap_or(settings.display.width).max(1);
    let height = args.height.unwrap_or(settings.display.height).max(1);

    let bytes = std::fs::read(&args.input)?;
    let hint = args.input.extension().and_then(|e| e.to_str());
    let audio = FileDecoder::default().decode(&bytes, hint)?;
    let sample_rate = audio.sample_rate;
    let samples = audio.into_stereo();
    let total_frames = samples.len();
    println!(
        "Monitoring {} ({}, {} Hz)",
        args.input.display(),
        format_duration(total_frames as f64 / f64::from(sample_rate)),
        sample_rate
    );

    let mut graph = AudioGraph::new(sample_rate as f32);
    let source = graph.add_buffer_source(samples);
    graph.start_source(source)?;

    let input_canvas = CanvasTarget::with(PixelSurface::new(width, height));
    let output_canvas = CanvasTarget::with(PixelSurface::new(width, height));
    let manual_clock = args.fast.then(|| ManualClock::new(0.0));
    let scheduler = match &manual_clock {
        Some(clock) => FrameScheduler::new(clock.clone()),
        None => FrameScheduler::new(SystemClock::new()),
    };

    let mut session = RealtimeSession::new(
        graph,
        input_canvas.clone(),
        output_canvas.clone(),
        scheduler,
        options,
    )?;
    session.attach_source(source)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let frame_ms = 1000.0 / FPS;
    let block = ((f64::from(sample_rate) / FPS).ceil() as usize).max(1);
    let mut left = vec![0.0; block];
    let mut right = vec![0.0; block];
    let toggle_frames = args
        .toggle_every
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| ((s * f64::from(sample_rate)) as usize).max(1));
    let mut next_toggle = toggle_frames;
    let mut toggles = 0usize;

    let live = !args.fast && std::io::stdout().is_terminal();
    let mut drawn_lines = 0;
    let started = Instant::now();
    let mut frames_drawn = 0u64;

    while running.load(Ordering::SeqCst)
        && (session.graph().frames_rendered() as usize) < total_frames
    {
        session.process_block(&mut left, &mut right);
        let position = session.graph().frames_rendered() as usize;

        if let (Some(at), Some(step)) = (next_toggle, toggle_frames)
            && position >= at
        {
            let on = !session.is_compression_on();
            session.set_compression(on)?;
            tracing::info!(
                at = %format_duration(position as f64 / f64::from(sample_rate)),
                compression = on,
                "toggled"
            );
            next_toggle = Some(at + step);
            toggles += 1;
        }

        if let Some(clock) = &manual_clock {
            clock.advance(frame_ms);
        }
        session.on_frame();
        frames_drawn += 1;

        if live {
            let status = format!(
                "{}  compression {}  reduction {}",
                format_duration(position as f64 / f64::from(sample_rate)),
                if session.is_compression_on() { "on " } else { "off" },
                format_db(session.reduction_db())
            );
            drawn_lines = redraw(drawn_lines, &status, &input_canvas, &output_canvas)?;

            let deadline = started + Duration::from_secs_f64(frames_drawn as f64 / FPS);
            if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
        }
    }

    let rendered = (session.graph().frames_rendered() as usize).min(total_frames);
    println!(
        "Monitored {} in {} frames, {} toggles, compression {}, last reduction {}",
        format_duration(rendered as f64 / f64::from(sample_rate)),
        frames_drawn,
        toggles,
        if session.is_compression_on() { "on" } else { "off" },
        format_db(session.reduction_db())
    );
    Ok(())
}

/// Redraw the status line and both meters in place. Returns the number of
/// lines written.
fn redraw(
    previous_lines: usize,
    status: &str,
    input: &CanvasTarget,
    output: &CanvasTarget,
) -> anyhow::Result<usize> {
    let mut frame = String::new();
    if previous_lines > 0 {
        write!(frame, "\x1b[{previous_lines}A")?;
    }
    let mut lines = 0;
    writeln!(frame, "\x1b[2K{status}")?;
    lines += 1;
    for (label, canvas) in [("in ", input), ("out", output)] {
        lines += canvas
            .with_pixels(|p| draw_meter(&mut frame, label, p))
            .transpose()?
            .unwrap_or(0);
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(frame.as_bytes())?;
    stdout.flush()?;
    Ok(lines)
}

/// Append one meter as rows of colored block characters.
fn draw_meter(
    out: &mut String,
    label: &str,
    surface: &PixelSurface,
) -> Result<usize, std::fmt::Error> {
    use squash_core::display::Surface;

    let (width, height) = (surface.width(), surface.height());
    for y in 0..height {
        let prefix = if y == 0 { label } else { "   " };
        write!(out, "\x1b[2K{prefix} |")?;
        for x in 0..width {
            let px = surface.pixel(x, y);
            if px.is_transparent() {
                out.push(' ');
            } else {
                write!(out, "\x1b[38;2;{};{};{}m\u{2588}\x1b[0m", px.r, px.g, px.b)?;
            }
        }
        out.push_str("|\n");
    }
    Ok(height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squash_core::display::{Rgba, Surface};

    #[test]
    fn meter_rows_follow_pixels() {
        let mut surface = PixelSurface::new(3, 2);
        let red = Rgba::rgb(255, 0, 0);
        if let Some(ctx) = surface.context() {
            ctx.fill_rect(1.0, 1.0, 1.0, 1.0, red);
        }

        let mut out = String::new();
        assert_eq!(draw_meter(&mut out, "in ", &surface), Ok(2));
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with("in  |   |"));
        assert!(rows[1].contains("\x1b[38;2;255;0;0m\u{2588}"));
    }
}
