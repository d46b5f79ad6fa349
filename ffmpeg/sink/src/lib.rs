/*!
    Media output and muxing for the ffmpeg crate ecosystem.

    This crate handles the output side of the media pipeline. It takes
    encoded packets from the encoder (or copied straight from the input)
    and writes them into a container.

    # Basic Usage

    ```ignore
    use ffmpeg_sink::{create, Muxer, SinkConfig};

    let mut muxer = create("output.y4m", &SinkConfig::new())?;
    let video = muxer.add_stream(&encoder.codec_config())?;
    muxer.write_header()?;

    for mut packet in encoded_packets {
        packet.stream_index = video;
        muxer.write_packet(packet)?;
    }

    // Finalize the file (critical!)
    muxer.write_trailer()?;
    ```

    # Container Formats

    - **Y4M**: written natively, one raw video stream
    - **MP4 / MOV / MKV / WebM / MPEG-TS / AVI**: need the `ffmpeg` feature

    # Features

    - `ffmpeg`: Write containers through libavformat.
*/

use std::path::Path;

pub use ffmpeg_source::CodecConfig;
pub use ffmpeg_types::{Error, Packet, Rational, Result};

mod config;
#[cfg(feature = "ffmpeg")]
mod ffmpeg;
mod muxer;
mod y4m;

pub use config::{ContainerFormat, SinkConfig};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegMuxer;
pub use muxer::Muxer;
pub use y4m::Y4mMuxer;

/**
    Create a muxer writing to `path`.

    The file is created immediately; if writing fails later it is left
    behind for the caller to remove.
*/
pub fn create(path: impl AsRef<Path>, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
    let path = path.as_ref();
    if config.resolve(path) == Some(ContainerFormat::Y4m) {
        return Ok(Box::new(Y4mMuxer::create(path)?));
    }
    create_ffmpeg(path, config)
}

#[cfg(feature = "ffmpeg")]
fn create_ffmpeg(path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
    Ok(Box::new(FfmpegMuxer::create(path, config)?))
}

#[cfg(not(feature = "ffmpeg"))]
fn create_ffmpeg(path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
    let name = match config.resolve(path) {
        Some(format) => format.ffmpeg_format_name().to_string(),
        None => path.display().to_string(),
    };
    Err(Error::unsupported_format(format!(
        "cannot write {name} without the ffmpeg feature"
    )))
}
