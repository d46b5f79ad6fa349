/*!
    The encoder abstraction shared by every encoding backend.
*/

use ffmpeg_source::CodecConfig;
use ffmpeg_types::{Error, Packet, Result, StreamDescriptor, VideoFrame};

/**
    A video encoder with libavcodec's send/receive contract.

    Frames must match the encoder's [`StreamDescriptor`] in size and pixel
    format, with timestamps in its time base. Packets come out in the same
    time base with `stream_index` 0; the muxer assigns the real index.
*/
pub trait Encoder {
    /**
        The stream this encoder produces.
    */
    fn descriptor(&self) -> &StreamDescriptor;

    /**
        Codec configuration a muxer needs to declare the output stream.
    */
    fn codec_config(&self) -> CodecConfig;

    /**
        Feed one frame.
    */
    fn send_frame(&mut self, frame: &VideoFrame) -> Result<()>;

    /**
        Signal end of input, so buffered packets become available.
    */
    fn send_eof(&mut self) -> Result<()>;

    /**
        Take the next encoded packet. Fails with [`Error::Again`] when more
        input is needed and with [`Error::Eof`] once flushed and drained.
    */
    fn receive_packet(&mut self) -> Result<Packet>;

    /**
        Encode a frame, returning every packet that became available.
    */
    fn encode(&mut self, frame: &VideoFrame) -> Result<Vec<Packet>> {
        self.send_frame(frame)?;
        drain(self)
    }

    /**
        Flush the encoder to get any remaining buffered packets.
    */
    fn flush(&mut self) -> Result<Vec<Packet>> {
        self.send_eof()?;
        drain(self)
    }
}

fn drain<E: Encoder + ?Sized>(encoder: &mut E) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();
    loop {
        match encoder.receive_packet() {
            Ok(packet) => packets.push(packet),
            Err(Error::Again | Error::Eof) => return Ok(packets),
            Err(e) => return Err(e),
        }
    }
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn descriptor(&self) -> &StreamDescriptor {
        (**self).descriptor()
    }

    fn codec_config(&self) -> CodecConfig {
        (**self).codec_config()
    }

    fn send_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        (**self).send_frame(frame)
    }

    fn send_eof(&mut self) -> Result<()> {
        (**self).send_eof()
    }

    fn receive_packet(&mut self) -> Result<Packet> {
        (**self).receive_packet()
    }
}
