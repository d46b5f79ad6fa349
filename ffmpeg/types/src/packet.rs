/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    Type of media stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// Video stream
    Video,
    /// Audio stream
    Audio,
    /// Subtitle stream
    Subtitle,
    /// Data, attachment, or anything else
    Other,
}

impl StreamType {
    /**
        Lower-case name, as printed by `probe`.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Other => "data",
        }
    }
}

/**
    An encoded media packet.

    Packets are the unit of data between demuxer and decoder, between
    encoder and muxer, and between demuxer and muxer for stream-copied
    streams. `stream_index` always refers to the container the packet was
    last read from or is about to be written to.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Index of the stream inside its container.
    pub stream_index: usize,
    /// Presentation timestamp (when to display/play).
    pub pts: Option<Pts>,
    /// Decode timestamp, may differ from PTS when frames are reordered.
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe (can be decoded independently).
    pub is_keyframe: bool,
    /// Type of stream this packet belongs to.
    pub stream_type: StreamType,
}

impl Packet {
    /**
        Create a new packet.
    */
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data: Vec<u8>,
        stream_index: usize,
        pts: Option<Pts>,
        dts: Option<Pts>,
        duration: MediaDuration,
        time_base: Rational,
        is_keyframe: bool,
        stream_type: StreamType,
    ) -> Self {
        Self {
            data,
            stream_index,
            pts,
            dts,
            duration,
            time_base,
            is_keyframe,
            stream_type,
        }
    }

    /**
        Convert every timestamp of this packet into `time_base`.
    */
    pub fn rescale_ts(&mut self, time_base: Rational) {
        if self.time_base == time_base {
            return;
        }
        let from = self.time_base;
        self.pts = self.pts.map(|pts| pts.rescale(from, time_base));
        self.dts = self.dts.map(|dts| dts.rescale(from, time_base));
        self.duration = self.duration.rescale(from, time_base);
        self.time_base = time_base;
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /**
        Returns true if this packet contains video data.
    */
    pub fn is_video(&self) -> bool {
        self.stream_type == StreamType::Video
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);
