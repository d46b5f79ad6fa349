use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ffmpeg_types::CodecId;
use vidrotate::{
    CancellationToken, Overlay, PipelineError, SessionConfig, TransformSpec, probe, transcode,
};

#[derive(Parser, Debug)]
#[command(name = "vidrotate")]
#[command(about = "Rotate or watermark the video stream of a media file")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep the unfinished output file when a run fails
    #[arg(long, global = true)]
    keep_partial: bool,

    /// Encode video with this codec instead of the input's (e.g. "rawvideo")
    #[arg(long, global = true)]
    codec: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rotate the video clockwise
    Rotate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// 90, 180 or 270
        #[arg(short, long, allow_negative_numbers = true)]
        degrees: i32,
    },
    /// Composite a watermark image onto the video (not functional yet)
    Watermark {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        watermark: PathBuf,

        #[arg(long, default_value_t = Overlay::DEFAULT_POSITION.0, allow_negative_numbers = true)]
        x: i32,

        #[arg(long, default_value_t = Overlay::DEFAULT_POSITION.1, allow_negative_numbers = true)]
        y: i32,

        #[arg(long, default_value_t = Overlay::DEFAULT_SIZE.0)]
        width: u32,

        #[arg(long, default_value_t = Overlay::DEFAULT_SIZE.1)]
        height: u32,
    },
    /// List the streams of a media file
    Probe { input: PathBuf },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = e
                .downcast_ref::<PipelineError>()
                .map_or(1, |e| e.status_code().unsigned_abs());
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let (input, output, transform) = match args.command {
        Command::Probe { input } => return print_probe(&input),
        Command::Rotate {
            input,
            output,
            degrees,
        } => (input, output, TransformSpec::rotate(degrees)?),
        Command::Watermark {
            input,
            output,
            watermark,
            x,
            y,
            width,
            height,
        } => {
            let overlay = Overlay::new(watermark).at(x, y).scaled_to(width, height);
            (input, output, TransformSpec::Overlay(overlay))
        }
    };

    let mut config = SessionConfig {
        keep_partial_output: args.keep_partial,
        ..SessionConfig::default()
    };
    if let Some(name) = args.codec.as_deref() {
        let codec = CodecId::from_name(name)
            .ok_or_else(|| PipelineError::invalid_argument(format!("unknown codec {name:?}")))?;
        config.encoder = config.encoder.with_codec(codec);
    }

    let cancel = config.cancel.clone();
    install_ctrlc(cancel)?;

    let report = transcode(&input, &output, transform, config)?;
    info!(
        frames = report.frames_encoded,
        width = report.output.width,
        height = report.output.height,
        "wrote {}",
        output.display()
    );
    Ok(())
}

fn install_ctrlc(cancel: CancellationToken) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        eprintln!("Cancelling...");
        cancel.cancel();
    })
    .context("failed to install Ctrl-C handler")
}

fn print_probe(input: &Path) -> anyhow::Result<()> {
    let info = probe(input)?;
    println!("{}: {}", input.display(), info.format_name);
    if let Some(duration) = info.duration {
        println!("  duration: {:.3}s", duration.as_secs_f64());
    }
    for stream in &info.streams {
        let best = if info.best_video == Some(stream.index) {
            " (best)"
        } else {
            ""
        };
        match &stream.video {
            Some(video) => println!(
                "  #{} {} {} {}x{} {} time_base={}/{}{best}",
                stream.index,
                stream.stream_type.name(),
                stream.codec.name(),
                video.width,
                video.height,
                video.format.name(),
                stream.time_base.num,
                stream.time_base.den,
            ),
            None => println!(
                "  #{} {} {} time_base={}/{}",
                stream.index,
                stream.stream_type.name(),
                stream.codec.name(),
                stream.time_base.num,
                stream.time_base.den,
            ),
        }
    }
    Ok(())
}
