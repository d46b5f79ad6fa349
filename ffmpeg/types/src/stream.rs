/*!
    Stream and file metadata.
*/

use std::time::Duration;

use crate::{
    CodecId, Error, MediaDuration, PixelFormat, Rational, Result, StreamType, check_picture_size,
};

/**
    Immutable description of one video stream.

    Built once when a stream is opened and never mutated afterwards; a
    transform that changes geometry produces a new descriptor instead.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Picture width in pixels, always non-zero.
    pub width: u32,
    /// Picture height in pixels, always non-zero.
    pub height: u32,
    pub format: PixelFormat,
    /// Unit of the stream's timestamps.
    pub time_base: Rational,
    pub codec: CodecId,
    /// Nominal frame rate, when the container declares one.
    pub frame_rate: Option<Rational>,
}

impl StreamDescriptor {
    /**
        Create a descriptor, rejecting empty or oversized pictures and
        non-positive time bases.
    */
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        time_base: Rational,
        codec: CodecId,
    ) -> Result<Self> {
        check_picture_size(width, height)?;
        if !time_base.is_positive() {
            return Err(Error::invalid_data(format!(
                "stream has invalid time base {time_base}"
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            time_base,
            codec,
            frame_rate: None,
        })
    }

    /**
        Attach a frame rate. Non-positive rates are ignored.
    */
    pub fn with_frame_rate(mut self, frame_rate: Rational) -> Self {
        self.frame_rate = frame_rate.is_positive().then_some(frame_rate);
        self
    }

    /**
        Returns the same stream with width and height exchanged.
    */
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..self
        }
    }

    /**
        Duration of one frame in this stream's time base, falling back to a
        single tick when no frame rate is known.
    */
    pub fn frame_duration(&self) -> MediaDuration {
        match self.frame_rate {
            Some(rate) => MediaDuration(Rational::rescale(1, rate.invert(), self.time_base).max(1)),
            None => MediaDuration(1),
        }
    }
}

/**
    Metadata of one stream inside a container.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    /// Index of the stream inside its container.
    pub index: usize,
    pub stream_type: StreamType,
    pub codec: CodecId,
    pub time_base: Rational,
    /// Present for video streams whose geometry is known.
    pub video: Option<StreamDescriptor>,
}

/**
    Metadata of a whole container, as reported by a probe.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Container format name.
    pub format_name: String,
    pub streams: Vec<StreamInfo>,
    /// Index of the stream a transcode would pick.
    pub best_video: Option<usize>,
    pub duration: Option<Duration>,
}

impl MediaInfo {
    /**
        Returns the metadata of the best video stream, if there is one.
    */
    pub fn best_video_stream(&self) -> Option<&StreamInfo> {
        let index = self.best_video?;
        self.streams.iter().find(|s| s.index == index)
    }
}
