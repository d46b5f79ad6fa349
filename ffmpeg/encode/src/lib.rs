/*!
    Media encoding for the ffmpeg crate ecosystem.

    This crate transforms raw frames into encoded video packets.

    # Features

    - `ffmpeg`: Encode compressed codecs through libavcodec. Without it only
      `rawvideo` can be produced.

    # Example

    ```ignore
    use ffmpeg_encode::{open, Encoder, VideoEncoderConfig};

    let mut encoder = open(descriptor, VideoEncoderConfig::new())?;
    for frame in frames {
        for packet in encoder.encode(&frame)? {
            // Write packet
        }
    }
    let remaining = encoder.flush()?;
    ```
*/

pub use ffmpeg_source::CodecConfig;
pub use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

mod config;
mod encoder;
mod raw;
#[cfg(feature = "ffmpeg")]
mod video;

pub use config::VideoEncoderConfig;
pub use encoder::Encoder;
pub use raw::RawVideoEncoder;
#[cfg(feature = "ffmpeg")]
pub use video::VideoEncoder;

use ffmpeg_types::CodecId;

/**
    Open an encoder producing `descriptor`.

    The configured codec, if any, replaces the descriptor's codec.
    `rawvideo` is always encoded natively; everything else needs the
    `ffmpeg` feature.
*/
pub fn open(descriptor: StreamDescriptor, config: VideoEncoderConfig) -> Result<Box<dyn Encoder>> {
    let mut descriptor = descriptor;
    if let Some(codec) = config.codec {
        descriptor.codec = codec;
    }

    if descriptor.codec == CodecId::RawVideo && config.encoder_name.is_none() {
        return Ok(Box::new(RawVideoEncoder::new(descriptor)));
    }
    if descriptor.codec.is_audio() {
        return Err(Error::codec(format!(
            "{} is not a video codec",
            descriptor.codec.name()
        )));
    }

    open_compressed(descriptor, config)
}

#[cfg(feature = "ffmpeg")]
fn open_compressed(
    descriptor: StreamDescriptor,
    config: VideoEncoderConfig,
) -> Result<Box<dyn Encoder>> {
    Ok(Box::new(VideoEncoder::new(descriptor, config)?))
}

#[cfg(not(feature = "ffmpeg"))]
fn open_compressed(
    descriptor: StreamDescriptor,
    _config: VideoEncoderConfig,
) -> Result<Box<dyn Encoder>> {
    Err(Error::unsupported_format(format!(
        "no encoder available for {}",
        descriptor.codec.name()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Rational};

    fn descriptor(codec: CodecId) -> StreamDescriptor {
        StreamDescriptor::new(16, 8, PixelFormat::Yuv420p, Rational::new(1, 25), codec).unwrap()
    }

    #[test]
    fn open_raw_video() {
        let encoder = open(descriptor(CodecId::RawVideo), VideoEncoderConfig::new()).unwrap();
        assert_eq!(encoder.descriptor().codec, CodecId::RawVideo);
        assert_eq!(encoder.descriptor().width, 16);
    }

    #[test]
    fn codec_override_wins() {
        let encoder = open(
            descriptor(CodecId::H264),
            VideoEncoderConfig::new().with_codec(CodecId::RawVideo),
        )
        .unwrap();
        assert_eq!(encoder.descriptor().codec, CodecId::RawVideo);
    }

    #[test]
    fn audio_codecs_are_rejected() {
        assert!(matches!(
            open(descriptor(CodecId::Aac), VideoEncoderConfig::new()),
            Err(Error::Codec { .. })
        ));
    }

    #[cfg(not(feature = "ffmpeg"))]
    #[test]
    fn compressed_codecs_need_ffmpeg() {
        assert!(matches!(
            open(descriptor(CodecId::H264), VideoEncoderConfig::new()),
            Err(Error::UnsupportedFormat { .. })
        ));
    }
}
