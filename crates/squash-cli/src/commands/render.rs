//! Offline render command.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use squash_io::{DirectorySink, HEADER_LEN, OfflineRenderPipeline, WavHeader};

use super::common::{CompressorArgs, FileDecoder, format_duration, load_settings};

#[derive(Args)]
pub struct RenderArgs {
    /// Input audio file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (defaults to the settings' render.output_dir, then
    /// the current directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Frames between progress updates
    #[arg(long)]
    block_size: Option<usize>,

    #[command(flatten)]
    compressor: CompressorArgs,
}

pub fn run(args: RenderArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let params = args.compressor.apply(settings.compressor);
    let out_dir = args
        .output_dir
        .or(settings.render.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let block_size = args.block_size.unwrap_or(settings.render.block_size);

    println!("Rendering {}...", args.input.display());
    println!(
        "  threshold {:.1} dB, knee {:.1} dB, ratio {:.1}:1, attack {:.3}s, release {:.3}s",
        params.threshold, params.knee, params.ratio, params.attack, params.release
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")?
            .progress_chars("##-"),
    );

    let sink = DirectorySink::new(&out_dir);
    let mut pipeline =
        OfflineRenderPipeline::new(params, FileDecoder::default(), sink).with_block_size(block_size);
    let result = pipeline.render_file_with_progress(&args.input, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    let file_name = match result {
        Ok(name) => name,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };
    pb.finish_with_message("done");

    let path = pipeline.sink().path_for(&file_name);
    let header = read_header(&path)?;
    let secs = f64::from(header.frames()) / f64::from(header.sample_rate.max(1));
    println!(
        "Wrote {} ({}, {} Hz, {} ch)",
        path.display(),
        format_duration(secs),
        header.sample_rate,
        header.channels
    );
    Ok(())
}

fn read_header(path: &Path) -> anyhow::Result<WavHeader> {
    let mut bytes = [0u8; HEADER_LEN];
    std::fs::File::open(path)?.read_exact(&mut bytes)?;
    Ok(WavHeader::from_bytes(&bytes)?)
}
