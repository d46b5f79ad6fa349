/*!
    Muxer implementation backed by libavformat.
*/

use std::path::Path;

use ffmpeg_next::{Dictionary, codec, ffi, format};

use ffmpeg_source::{CodecConfig, convert};
use ffmpeg_types::{Error, Packet, Rational, Result};

use crate::muxer::{MuxState, Muxer};
use crate::{ContainerFormat, SinkConfig};

/**
    Muxer for every container libavformat can write.
*/
pub struct FfmpegMuxer {
    output: format::context::Output,
    format: ContainerFormat,
    fast_start: bool,
    time_bases: Vec<Option<Rational>>,
    state: MuxState,
}

impl FfmpegMuxer {
    /**
        Create the output file. Without an explicit format, libavformat
        guesses from the extension.
    */
    pub fn create(path: impl AsRef<Path>, config: &SinkConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(convert::error)?;

        let path = path.as_ref();
        let output = match config.resolve(path) {
            Some(format) => format::output_as(path, format.ffmpeg_format_name()),
            None => format::output(path),
        }
        .map_err(convert::error)?;

        let format = config
            .resolve(path)
            .unwrap_or_else(|| ContainerFormat::Named(output.format().name().to_string()));

        Ok(Self {
            output,
            format,
            fast_start: config.fast_start,
            time_bases: Vec::new(),
            state: MuxState::Streams,
        })
    }

    fn can_carry(&self, id: codec::Id) -> bool {
        // 1 = supported, 0 = not, negative = unknown to the muxer
        let answer = unsafe {
            ffi::avformat_query_codec(
                self.output.format().as_ptr(),
                id.into(),
                ffi::FF_COMPLIANCE_NORMAL as i32,
            )
        };
        answer != 0
    }
}

impl Muxer for FfmpegMuxer {
    fn format(&self) -> &ContainerFormat {
        &self.format
    }

    fn needs_global_header(&self) -> bool {
        self.output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER)
    }

    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize> {
        if self.state != MuxState::Streams {
            return Err(Error::invalid_data("streams must be added before the header"));
        }

        let parameters = match (config.parameters(), config.video) {
            (Some(parameters), _) => parameters.clone(),
            (None, Some(descriptor)) => convert::video_parameters(&descriptor)?,
            (None, None) => {
                return Err(Error::unsupported_format(format!(
                    "{} stream has no codec parameters",
                    config.stream_type.name()
                )));
            }
        };
        if !self.can_carry(parameters.id()) {
            return Err(Error::unsupported_format(format!(
                "{} cannot carry {}",
                self.format.ffmpeg_format_name(),
                config.codec.name()
            )));
        }

        let mut stream = self
            .output
            .add_stream(codec::encoder::find(codec::Id::None))
            .map_err(convert::error)?;
        stream.set_parameters(parameters);
        stream.set_time_base(convert::rational_to_ffmpeg(config.time_base));
        unsafe {
            (*stream.parameters().as_mut_ptr()).codec_tag = 0;
        }

        self.time_bases.push(None);
        Ok(stream.index())
    }

    fn write_header(&mut self) -> Result<()> {
        if self.state != MuxState::Streams {
            return Err(Error::invalid_data("header already written"));
        }
        if self.time_bases.is_empty() {
            return Err(Error::invalid_data("output has no streams"));
        }

        let mut options = Dictionary::new();
        if self.fast_start && matches!(self.format, ContainerFormat::Mp4 | ContainerFormat::Mov) {
            options.set("movflags", "+faststart");
        }
        self.output
            .write_header_with(options)
            .map_err(convert::error)?;

        for (index, time_base) in self.time_bases.iter_mut().enumerate() {
            *time_base = self
                .output
                .stream(index)
                .and_then(|stream| convert::rational_from_ffmpeg(stream.time_base()));
        }
        self.state = MuxState::Packets;
        Ok(())
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.time_bases.get(index).copied().flatten()
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        if self.state != MuxState::Packets {
            return Err(Error::invalid_data("packet written outside header and trailer"));
        }
        let target = self
            .stream_time_base(packet.stream_index)
            .ok_or_else(|| {
                Error::invalid_data(format!("no output stream {}", packet.stream_index))
            })?;

        let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);
        ffmpeg_pkt.set_stream(packet.stream_index);
        ffmpeg_pkt.set_pts(packet.pts.map(|pts| pts.0));
        ffmpeg_pkt.set_dts(packet.dts.map(|dts| dts.0));
        ffmpeg_pkt.set_duration(packet.duration.0);
        if packet.is_keyframe {
            ffmpeg_pkt.set_flags(ffmpeg_next::packet::Flags::KEY);
        }
        ffmpeg_pkt.rescale_ts(
            convert::rational_to_ffmpeg(packet.time_base),
            convert::rational_to_ffmpeg(target),
        );

        ffmpeg_pkt
            .write_interleaved(&mut self.output)
            .map_err(convert::error)
    }

    fn write_trailer(&mut self) -> Result<()> {
        if self.state != MuxState::Packets {
            return Err(Error::invalid_data("trailer written before header"));
        }
        self.output.write_trailer().map_err(convert::error)?;
        self.state = MuxState::Finished;
        Ok(())
    }
}

impl std::fmt::Debug for FfmpegMuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegMuxer")
            .field("format", &self.format)
            .field("streams", &self.time_bases.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
