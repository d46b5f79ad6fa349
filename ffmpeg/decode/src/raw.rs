/*!
    Decoder for uncompressed video.
*/

use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

/**
    Decoder for `rawvideo` streams.

    Every packet holds exactly one tightly packed picture, so decoding is a
    size check plus a copy. At most one frame is buffered at a time.
*/
#[derive(Debug)]
pub struct RawVideoDecoder {
    descriptor: StreamDescriptor,
    pending: Option<VideoFrame>,
    eof: bool,
}

impl RawVideoDecoder {
    /**
        Create a decoder for pictures described by `descriptor`.
    */
    pub fn new(descriptor: StreamDescriptor) -> Self {
        Self {
            descriptor,
            pending: None,
            eof: false,
        }
    }
}

impl crate::Decoder for RawVideoDecoder {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        if self.eof {
            return Err(Error::Eof);
        }
        if self.pending.is_some() {
            return Err(Error::Again);
        }

        let d = &self.descriptor;
        let frame = VideoFrame::new(
            packet.data.clone(),
            d.width,
            d.height,
            d.format,
            packet.pts.or(packet.dts),
            packet.time_base,
        );
        frame
            .validate()
            .map_err(|e| Error::codec(format!("rawvideo packet rejected: {e}")))?;

        self.pending = Some(frame);
        Ok(())
    }

    fn send_eof(&mut self) -> Result<()> {
        self.eof = true;
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<VideoFrame> {
        match self.pending.take() {
            Some(frame) => Ok(frame),
            None if self.eof => Err(Error::Eof),
            None => Err(Error::Again),
        }
    }
}
