/*!
    Video encoder implementation backed by libavcodec.
*/

use ffmpeg_next::{
    Dictionary,
    codec::{self, encoder::video::Encoder as VideoEncoderFFmpeg},
};

use ffmpeg_source::{CodecConfig, convert};
use ffmpeg_types::{Error, MediaDuration, Packet, Pts, Result, StreamDescriptor, StreamType, VideoFrame};

use crate::config::VideoEncoderConfig;

/**
    Video encoder for any codec libavcodec can produce.
*/
pub struct VideoEncoder {
    encoder: VideoEncoderFFmpeg,
    descriptor: StreamDescriptor,
    encoded: ffmpeg_next::Packet,
}

impl VideoEncoder {
    /**
        Open an encoder producing the stream described by `descriptor`.
    */
    pub fn new(descriptor: StreamDescriptor, config: VideoEncoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(convert::error)?;

        let codec = match config.encoder_name.as_deref() {
            Some(name) => codec::encoder::find_by_name(name)
                .ok_or_else(|| Error::codec(format!("encoder {name:?} not found")))?,
            None => {
                let id = convert::codec_to_ffmpeg(descriptor.codec).ok_or_else(|| {
                    Error::unsupported_format(format!("codec {}", descriptor.codec.name()))
                })?;
                codec::encoder::find(id).ok_or_else(|| {
                    Error::unsupported_format(format!(
                        "no encoder available for {}",
                        descriptor.codec.name()
                    ))
                })?
            }
        };
        let pixel = convert::pixel_to_ffmpeg(descriptor.format).ok_or_else(|| {
            Error::unsupported_format(format!("pixel format {}", descriptor.format.name()))
        })?;

        let mut encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(convert::error)?;
        encoder.set_width(descriptor.width);
        encoder.set_height(descriptor.height);
        encoder.set_format(pixel);
        encoder.set_time_base(convert::rational_to_ffmpeg(descriptor.time_base));
        if let Some(rate) = descriptor.frame_rate {
            encoder.set_frame_rate(Some(convert::rational_to_ffmpeg(rate)));
        }
        if let Some(bit_rate) = config.bit_rate {
            encoder.set_bit_rate(bit_rate);
        }
        if let Some(gop) = config.gop_size {
            encoder.set_gop(gop);
        }
        if config.global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut options = Dictionary::new();
        for (key, value) in &config.options {
            options.set(key, value);
        }
        let encoder = encoder
            .open_as_with(codec, options)
            .map_err(convert::error)?;

        Ok(Self {
            encoder,
            descriptor,
            encoded: ffmpeg_next::Packet::empty(),
        })
    }
}

impl crate::Encoder for VideoEncoder {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn codec_config(&self) -> CodecConfig {
        CodecConfig::video(self.descriptor)
            .with_parameters(codec::Parameters::from(&self.encoder))
    }

    fn send_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        let mut ffmpeg_frame = convert::frame_to_ffmpeg(frame)?;
        ffmpeg_frame.set_pts(
            frame
                .pts
                .map(|pts| pts.rescale(frame.time_base, self.descriptor.time_base).0),
        );
        self.encoder
            .send_frame(&ffmpeg_frame)
            .map_err(convert::error)
    }

    fn send_eof(&mut self) -> Result<()> {
        self.encoder.send_eof().map_err(convert::error)
    }

    fn receive_packet(&mut self) -> Result<Packet> {
        self.encoder
            .receive_packet(&mut self.encoded)
            .map_err(convert::error)?;

        let packet = &self.encoded;
        Ok(Packet::new(
            packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
            0,
            packet.pts().map(Pts),
            packet.dts().map(Pts),
            MediaDuration(packet.duration()),
            self.descriptor.time_base,
            packet.is_key(),
            StreamType::Video,
        ))
    }
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("descriptor", &self.descriptor)
            .field("codec", &self.encoder.id())
            .finish_non_exhaustive()
    }
}
