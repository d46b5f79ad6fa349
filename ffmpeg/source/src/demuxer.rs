/*!
    The demuxer abstraction shared by every input backend.
*/

use std::time::Duration;

use ffmpeg_types::{MediaInfo, Packet, Result, StreamInfo};

use crate::CodecConfig;

/**
    An opened input container.

    A demuxer owns its input handle; dropping it closes the input.
*/
pub trait Demuxer {
    /**
        Short name of the container format.
    */
    fn format_name(&self) -> &str;

    /**
        Metadata of every stream in the container, ordered by index.
    */
    fn streams(&self) -> &[StreamInfo];

    /**
        Index of the video stream a player would pick, if any.
    */
    fn best_video_stream(&self) -> Option<usize>;

    /**
        Codec configuration of the stream at `index`.
    */
    fn codec_config(&self, index: usize) -> Option<CodecConfig>;

    /**
        Read the next packet in container order.

        Returns `Ok(None)` at end of input.
    */
    fn read_packet(&mut self) -> Result<Option<Packet>>;

    /**
        Total duration, when the container declares one.
    */
    fn duration(&self) -> Option<Duration> {
        None
    }

    /**
        Summarize the container as a [`MediaInfo`].
    */
    fn media_info(&self) -> MediaInfo {
        MediaInfo {
            format_name: self.format_name().to_owned(),
            streams: self.streams().to_vec(),
            best_video: self.best_video_stream(),
            duration: self.duration(),
        }
    }
}

impl<D: Demuxer + ?Sized> Demuxer for Box<D> {
    fn format_name(&self) -> &str {
        (**self).format_name()
    }

    fn streams(&self) -> &[StreamInfo] {
        (**self).streams()
    }

    fn best_video_stream(&self) -> Option<usize> {
        (**self).best_video_stream()
    }

    fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        (**self).codec_config(index)
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        (**self).read_packet()
    }

    fn duration(&self) -> Option<Duration> {
        (**self).duration()
    }
}
