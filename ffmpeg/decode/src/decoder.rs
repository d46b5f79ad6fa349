/*!
    The decoder abstraction shared by every decoding backend.
*/

use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

/**
    A video decoder with libavcodec's send/receive contract.

    - [`Decoder::send_packet`] fails with [`Error::Again`] while decoded
      frames are waiting; drain them with [`Decoder::receive_frame`] first.
    - [`Decoder::receive_frame`] fails with [`Error::Again`] when it needs
      more input and with [`Error::Eof`] once it was flushed and drained.
*/
pub trait Decoder {
    /**
        The stream this decoder was opened for.
    */
    fn descriptor(&self) -> &StreamDescriptor;

    /**
        Feed one encoded packet.
    */
    fn send_packet(&mut self, packet: &Packet) -> Result<()>;

    /**
        Signal end of input, so buffered frames become available.
    */
    fn send_eof(&mut self) -> Result<()>;

    /**
        Take the next decoded frame.
    */
    fn receive_frame(&mut self) -> Result<VideoFrame>;

    /**
        Decode a packet, returning every frame that became available.
    */
    fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        self.send_packet(packet)?;
        drain(self)
    }

    /**
        Flush the decoder to get any remaining buffered frames.
    */
    fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        self.send_eof()?;
        drain(self)
    }
}

fn drain<D: Decoder + ?Sized>(decoder: &mut D) -> Result<Vec<VideoFrame>> {
    let mut frames = Vec::new();
    loop {
        match decoder.receive_frame() {
            Ok(frame) => frames.push(frame),
            Err(Error::Again | Error::Eof) => return Ok(frames),
            Err(e) => return Err(e),
        }
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn descriptor(&self) -> &StreamDescriptor {
        (**self).descriptor()
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        (**self).send_packet(packet)
    }

    fn send_eof(&mut self) -> Result<()> {
        (**self).send_eof()
    }

    fn receive_frame(&mut self) -> Result<VideoFrame> {
        (**self).receive_frame()
    }
}
