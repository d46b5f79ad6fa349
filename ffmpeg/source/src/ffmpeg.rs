/*!
    Demuxing through libavformat.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{codec, format, media};

use ffmpeg_types::{
    Error, MediaDuration, Packet, Pts, Rational, Result, StreamDescriptor, StreamInfo, StreamType,
};

use crate::convert;
use crate::{CodecConfig, Demuxer};

/**
    Demuxer for any container libavformat can open.
*/
pub struct FfmpegDemuxer {
    input: format::context::Input,
    format_name: String,
    streams: Vec<StreamInfo>,
    configs: Vec<CodecConfig>,
    best_video: Option<usize>,
}

impl FfmpegDemuxer {
    /**
        Open `path` and read its stream information.
    */
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        ffmpeg_next::init().map_err(convert::error)?;

        let input = format::input(&path.as_ref()).map_err(convert::error)?;
        let format_name = input.format().name().to_owned();

        let mut streams = Vec::new();
        let mut configs = Vec::new();
        for stream in input.streams() {
            let parameters = stream.parameters();
            let stream_type = convert::stream_type_from_ffmpeg(parameters.medium());
            let codec = convert::codec_from_ffmpeg(parameters.id());
            // Streams without a usable time base get a millisecond clock
            let time_base =
                convert::rational_from_ffmpeg(stream.time_base()).unwrap_or(Rational::new(1, 1000));

            let video = if stream_type == StreamType::Video {
                describe_video(&parameters, time_base, codec)
                    .map(|d| match convert::rational_from_ffmpeg(stream.avg_frame_rate()) {
                        Some(rate) => d.with_frame_rate(rate),
                        None => d,
                    })
            } else {
                None
            };

            streams.push(StreamInfo {
                index: stream.index(),
                stream_type,
                codec,
                time_base,
                video,
            });

            let config = match video {
                Some(descriptor) => CodecConfig::video(descriptor),
                None => CodecConfig::opaque(stream_type, codec, time_base),
            };
            configs.push(config.with_parameters(parameters));
        }

        let best_video = input
            .streams()
            .best(media::Type::Video)
            .map(|stream| stream.index());

        Ok(Self {
            input,
            format_name,
            streams,
            configs,
            best_video,
        })
    }
}

/**
    Read the geometry of a video stream from its codec parameters.

    Returns `None` when the decoder is unavailable or reports a pixel format
    outside [`ffmpeg_types::PixelFormat`].
*/
fn describe_video(
    parameters: &codec::Parameters,
    time_base: Rational,
    codec: ffmpeg_types::CodecId,
) -> Option<StreamDescriptor> {
    let context = codec::context::Context::from_parameters(parameters.clone()).ok()?;
    let decoder = context.decoder().video().ok()?;
    let format = convert::pixel_from_ffmpeg(decoder.format())?;
    StreamDescriptor::new(decoder.width(), decoder.height(), format, time_base, codec).ok()
}

impl Demuxer for FfmpegDemuxer {
    fn format_name(&self) -> &str {
        &self.format_name
    }

    fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    fn best_video_stream(&self) -> Option<usize> {
        self.best_video
    }

    fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        self.configs.get(index).cloned()
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut packet = ffmpeg_next::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Eof) => return Ok(None),
            Err(e) => return Err(convert::error(e)),
        }

        let index = packet.stream();
        let info = self
            .streams
            .get(index)
            .ok_or_else(|| Error::invalid_data(format!("packet for unknown stream {index}")))?;

        Ok(Some(Packet::new(
            packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
            index,
            packet.pts().map(Pts),
            packet.dts().map(Pts),
            MediaDuration(packet.duration()),
            info.time_base,
            packet.is_key(),
            info.stream_type,
        )))
    }

    fn duration(&self) -> Option<Duration> {
        // Container duration is in AV_TIME_BASE (microsecond) units
        let micros = self.input.duration();
        (micros > 0).then(|| Duration::from_micros(micros as u64))
    }
}

impl std::fmt::Debug for FfmpegDemuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegDemuxer")
            .field("format_name", &self.format_name)
            .field("streams", &self.streams)
            .field("best_video", &self.best_video)
            .finish_non_exhaustive()
    }
}
