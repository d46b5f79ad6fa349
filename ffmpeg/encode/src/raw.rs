/*!
    Encoder for uncompressed video.
*/

use ffmpeg_source::CodecConfig;
use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, StreamType, VideoFrame};

/**
    Encoder for `rawvideo` streams: one tightly packed picture per packet.
*/
#[derive(Debug)]
pub struct RawVideoEncoder {
    descriptor: StreamDescriptor,
    pending: Option<Packet>,
    eof: bool,
}

impl RawVideoEncoder {
    /**
        Create an encoder producing pictures described by `descriptor`.
    */
    pub fn new(descriptor: StreamDescriptor) -> Self {
        Self {
            descriptor,
            pending: None,
            eof: false,
        }
    }
}

impl crate::Encoder for RawVideoEncoder {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn codec_config(&self) -> CodecConfig {
        CodecConfig::video(self.descriptor)
    }

    fn send_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        if self.eof {
            return Err(Error::Eof);
        }
        if self.pending.is_some() {
            return Err(Error::Again);
        }

        let d = &self.descriptor;
        if (frame.width, frame.height, frame.format) != (d.width, d.height, d.format) {
            return Err(Error::codec(format!(
                "rawvideo encoder expects {}x{} {}, got {}x{} {}",
                d.width,
                d.height,
                d.format.name(),
                frame.width,
                frame.height,
                frame.format.name()
            )));
        }
        frame.validate()?;

        let pts = frame
            .pts
            .map(|pts| pts.rescale(frame.time_base, d.time_base));
        self.pending = Some(Packet::new(
            frame.data.clone(),
            0,
            pts,
            pts,
            d.frame_duration(),
            d.time_base,
            true,
            StreamType::Video,
        ));
        Ok(())
    }

    fn send_eof(&mut self) -> Result<()> {
        self.eof = true;
        Ok(())
    }

    fn receive_packet(&mut self) -> Result<Packet> {
        match self.pending.take() {
            Some(packet) => Ok(packet),
            None if self.eof => Err(Error::Eof),
            None => Err(Error::Again),
        }
    }
}
