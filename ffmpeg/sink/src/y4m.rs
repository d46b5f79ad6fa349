/*!
    Native YUV4MPEG2 writer.
*/

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ffmpeg_source::{CodecConfig, Y4mHeader, y4m::format_to_colorspace};
use ffmpeg_types::{CodecId, Error, Packet, Rational, Result};

use crate::ContainerFormat;
use crate::muxer::{MuxState, Muxer};

static FORMAT: ContainerFormat = ContainerFormat::Y4m;

/**
    Muxer for YUV4MPEG2 output.

    Accepts exactly one `rawvideo` stream in a pixel format Y4M can name.
    Each packet must hold one whole picture.
*/
#[derive(Debug)]
pub struct Y4mMuxer<W: Write> {
    writer: W,
    header: Option<Y4mHeader>,
    state: MuxState,
}

impl Y4mMuxer<BufWriter<File>> {
    /**
        Create (or truncate) the file at `path`.
    */
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> Y4mMuxer<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer,
            header: None,
            state: MuxState::Streams,
        }
    }

    pub fn header(&self) -> Option<&Y4mHeader> {
        self.header.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Muxer for Y4mMuxer<W> {
    fn format(&self) -> &ContainerFormat {
        &FORMAT
    }

    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize> {
        if self.state != MuxState::Streams {
            return Err(Error::invalid_data("streams must be added before the header"));
        }
        let descriptor = match config.video {
            Some(descriptor) if config.codec == CodecId::RawVideo => descriptor,
            _ => {
                return Err(Error::unsupported_format(format!(
                    "Y4M cannot carry {} {} streams",
                    config.codec.name(),
                    config.stream_type.name()
                )));
            }
        };
        if self.header.is_some() {
            return Err(Error::unsupported_format(
                "Y4M carries a single video stream",
            ));
        }
        if format_to_colorspace(descriptor.format).is_none() {
            return Err(Error::unsupported_format(format!(
                "Y4M cannot carry {} pictures",
                descriptor.format.name()
            )));
        }

        let frame_rate = match descriptor.frame_rate {
            Some(rate) if rate.num > 0 && rate.den > 0 => rate,
            _ => descriptor.time_base.invert(),
        };
        self.header = Some(Y4mHeader::new(
            descriptor.width,
            descriptor.height,
            frame_rate,
            descriptor.format,
        ));
        Ok(0)
    }

    fn write_header(&mut self) -> Result<()> {
        if self.state != MuxState::Streams {
            return Err(Error::invalid_data("header already written"));
        }
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::invalid_data("Y4M output has no video stream"))?;
        writeln!(self.writer, "{header}")?;
        self.state = MuxState::Packets;
        Ok(())
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        match (&self.header, index) {
            (Some(header), 0) => Some(header.time_base()),
            _ => None,
        }
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        if self.state != MuxState::Packets {
            return Err(Error::invalid_data("packet written outside header and trailer"));
        }
        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::invalid_data("Y4M output has no video stream"))?;
        if packet.stream_index != 0 {
            return Err(Error::invalid_data(format!(
                "no output stream {}",
                packet.stream_index
            )));
        }
        if packet.data.len() != header.frame_size() {
            return Err(Error::invalid_data(format!(
                "Y4M frame must be {} bytes, got {}",
                header.frame_size(),
                packet.data.len()
            )));
        }

        self.writer.write_all(b"FRAME\n")?;
        self.writer.write_all(&packet.data)?;
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<()> {
        if self.state != MuxState::Packets {
            return Err(Error::invalid_data("trailer written before header"));
        }
        self.writer.flush()?;
        self.state = MuxState::Finished;
        Ok(())
    }
}
