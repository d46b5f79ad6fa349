/*!
    Media decoding for the ffmpeg crate ecosystem.

    This crate transforms encoded video packets into raw frames.

    # Features

    - `ffmpeg`: Decode compressed codecs through libavcodec. Without it only
      `rawvideo` streams can be decoded.

    # Example

    ```ignore
    use ffmpeg_source::{open as open_input, Demuxer};
    use ffmpeg_decode::{open, Decoder, VideoDecoderConfig};

    let mut input = open_input("input.y4m")?;
    let video = input.best_video_stream().unwrap();
    let mut decoder = open(input.codec_config(video).unwrap(), VideoDecoderConfig::new())?;

    while let Some(packet) = input.read_packet()? {
        if packet.stream_index == video {
            for frame in decoder.decode(&packet)? {
                // Process frame
            }
        }
    }

    // Flush remaining frames
    let remaining = decoder.flush()?;
    ```

    # Send / receive

    [`Decoder`] mirrors libavcodec: feed with `send_packet`, drain with
    `receive_frame` until it reports [`Error::Again`]. The `decode` and
    `flush` helpers do the draining for you.
*/

pub use ffmpeg_source::CodecConfig;
pub use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

mod config;
mod decoder;
mod raw;
#[cfg(feature = "ffmpeg")]
mod video;

pub use config::VideoDecoderConfig;
pub use decoder::Decoder;
pub use raw::RawVideoDecoder;
#[cfg(feature = "ffmpeg")]
pub use video::VideoDecoder;

use ffmpeg_types::CodecId;

/**
    Open a decoder for the stream described by `codec_config`.

    Streams read through FFmpeg are decoded by libavcodec. Streams from the
    native demuxer must be `rawvideo`.
*/
pub fn open(codec_config: CodecConfig, config: VideoDecoderConfig) -> Result<Box<dyn Decoder>> {
    #[cfg(feature = "ffmpeg")]
    {
        if codec_config.parameters().is_some() {
            return Ok(Box::new(VideoDecoder::new(codec_config, config)?));
        }
    }

    let _ = config;
    match codec_config.video {
        Some(descriptor) if codec_config.codec == CodecId::RawVideo => {
            Ok(Box::new(RawVideoDecoder::new(descriptor)))
        }
        Some(_) => Err(Error::unsupported_format(format!(
            "no decoder available for {}",
            codec_config.codec.name()
        ))),
        None => Err(Error::codec("stream is not a decodable video stream")),
    }
}
