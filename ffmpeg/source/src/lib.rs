/*!
    Media input and demuxing for the ffmpeg crate ecosystem.

    This crate is the input side of the media pipeline. It opens a container,
    describes its streams, and reads encoded packets in container order.

    # Backends

    - **YUV4MPEG2** (always available): uncompressed `.y4m` files, read by
      [`Y4mDemuxer`] without any native dependency.
    - **FFmpeg** (`ffmpeg` feature): every container libavformat can open,
      read by `FfmpegDemuxer`.

    [`open`] picks the backend by sniffing the file signature.

    # Example

    ```ignore
    use ffmpeg_source::{open, Demuxer};

    let mut input = open("input.y4m")?;
    let video = input.best_video_stream().expect("no video");
    let config = input.codec_config(video).unwrap();

    while let Some(packet) = input.read_packet()? {
        if packet.stream_index == video {
            // Decode packet
        }
    }
    ```
*/

use std::path::Path;

pub use ffmpeg_types::{
    CodecId, Error, MediaInfo, Packet, PixelFormat, Rational, Result, StreamDescriptor, StreamInfo,
    StreamType,
};

mod config;
mod demuxer;
pub mod y4m;

#[cfg(feature = "ffmpeg")]
pub mod convert;
#[cfg(feature = "ffmpeg")]
mod ffmpeg;

pub use config::CodecConfig;
pub use demuxer::Demuxer;
pub use y4m::{Y4mDemuxer, Y4mHeader};

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegDemuxer;

/**
    Open the media file at `path` with the backend that understands it.

    Fails with [`Error::Io`] if the file cannot be read, and with
    [`Error::UnsupportedFormat`] if no enabled backend can demux it.
*/
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn Demuxer>> {
    let path = path.as_ref();

    if y4m::sniff(path)? {
        return Ok(Box::new(Y4mDemuxer::open(path)?));
    }

    #[cfg(feature = "ffmpeg")]
    {
        Ok(Box::new(FfmpegDemuxer::open(path)?))
    }

    #[cfg(not(feature = "ffmpeg"))]
    {
        Err(Error::unsupported_format(format!(
            "{} is not a YUV4MPEG2 file and FFmpeg support is disabled",
            path.display()
        )))
    }
}

/**
    Describe the streams of the media file at `path`.
*/
pub fn probe(path: impl AsRef<Path>) -> Result<MediaInfo> {
    Ok(open(path)?.media_info())
}
