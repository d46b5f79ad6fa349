/*!
    Video decoder implementation backed by libavcodec.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg, threading},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::{CodecConfig, convert};
use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

use crate::config::VideoDecoderConfig;

/**
    Video decoder for any codec libavcodec supports.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    descriptor: StreamDescriptor,
    decoded: VideoFrameFFmpeg,
}

impl VideoDecoder {
    /**
        Create a new video decoder from codec configuration.

        The configuration must come from the FFmpeg demuxer, which attaches
        the codec parameters.
    */
    pub fn new(codec_config: CodecConfig, config: VideoDecoderConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(convert::error)?;

        let descriptor = codec_config
            .video
            .ok_or_else(|| Error::codec("stream has no video geometry"))?;
        let parameters = codec_config
            .parameters()
            .cloned()
            .ok_or_else(|| Error::codec("stream has no FFmpeg codec parameters"))?;

        let mut context =
            codec::context::Context::from_parameters(parameters).map_err(convert::error)?;
        if let Some(threads) = config.threads {
            context.set_threading(threading::Config {
                kind: threading::Type::Frame,
                count: threads,
                ..Default::default()
            });
        }

        let decoder = match config.decoder_name.as_deref() {
            Some(name) => {
                let codec = codec::decoder::find_by_name(name)
                    .ok_or_else(|| Error::codec(format!("decoder {name:?} not found")))?;
                context
                    .decoder()
                    .open_as(codec)
                    .and_then(|opened| opened.video())
                    .map_err(convert::error)?
            }
            None => context.decoder().video().map_err(convert::error)?,
        };

        Ok(Self {
            decoder,
            descriptor,
            decoded: VideoFrameFFmpeg::empty(),
        })
    }
}

impl crate::Decoder for VideoDecoder {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        // libavcodec reads an empty packet as the start of draining
        if packet.data.is_empty() {
            return Ok(());
        }
        let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);
        ffmpeg_pkt.set_pts(packet.pts.map(|pts| pts.0));
        ffmpeg_pkt.set_dts(packet.dts.map(|dts| dts.0));
        ffmpeg_pkt.set_duration(packet.duration.0);
        if packet.is_keyframe {
            ffmpeg_pkt.set_flags(ffmpeg_next::packet::Flags::KEY);
        }

        self.decoder
            .send_packet(&ffmpeg_pkt)
            .map_err(convert::error)
    }

    fn send_eof(&mut self) -> Result<()> {
        self.decoder.send_eof().map_err(convert::error)
    }

    fn receive_frame(&mut self) -> Result<VideoFrame> {
        self.decoder
            .receive_frame(&mut self.decoded)
            .map_err(convert::error)?;
        convert::frame_from_ffmpeg(&self.decoded, self.descriptor.time_base)
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("descriptor", &self.descriptor)
            .field("codec", &self.decoder.id())
            .finish_non_exhaustive()
    }
}
