/*!
    The muxer abstraction shared by every container backend.
*/

use ffmpeg_source::CodecConfig;
use ffmpeg_types::{Packet, Rational, Result};

use crate::ContainerFormat;

/**
    Writes encoded packets into a container.

    The lifecycle is fixed: add every stream, write the header, write
    packets, write the trailer. Calls out of order fail with
    [`ffmpeg_types::Error::InvalidData`].
*/
pub trait Muxer {
    fn format(&self) -> &ContainerFormat;

    /**
        Returns true if encoders feeding this container must put codec
        headers in extradata instead of the bitstream.
    */
    fn needs_global_header(&self) -> bool {
        false
    }

    /**
        Declare an output stream and return its index.

        Fails with [`ffmpeg_types::Error::UnsupportedFormat`] when the
        container cannot carry the codec.
    */
    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize>;

    fn write_header(&mut self) -> Result<()>;

    /**
        The time base the container chose for `index`. Only meaningful
        once the header has been written.
    */
    fn stream_time_base(&self, index: usize) -> Option<Rational>;

    /**
        Write one packet. `stream_index` must name an output stream;
        timestamps are rescaled from the packet's own time base.
    */
    fn write_packet(&mut self, packet: Packet) -> Result<()>;

    /**
        Finalize the container. Without this the output may be unreadable.
    */
    fn write_trailer(&mut self) -> Result<()>;
}

impl<M: Muxer + ?Sized> Muxer for Box<M> {
    fn format(&self) -> &ContainerFormat {
        (**self).format()
    }

    fn needs_global_header(&self) -> bool {
        (**self).needs_global_header()
    }

    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize> {
        (**self).add_stream(config)
    }

    fn write_header(&mut self) -> Result<()> {
        (**self).write_header()
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        (**self).stream_time_base(index)
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn write_trailer(&mut self) -> Result<()> {
        (**self).write_trailer()
    }
}

/**
    Where a muxer is in its lifecycle.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MuxState {
    Streams,
    Packets,
    Finished,
}
