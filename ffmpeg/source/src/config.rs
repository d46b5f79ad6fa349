/*!
    Codec configuration handed from a demuxer to decoders and muxers.
*/

use ffmpeg_types::{CodecId, Rational, StreamDescriptor, StreamType};

/**
    Everything needed to open a decoder for a stream, or to declare a
    stream-copied output stream.

    Streams read by the native demuxer are fully described by their
    [`StreamDescriptor`]. Streams read through FFmpeg additionally carry
    the opaque codec parameters (extradata, profile, sample rate, ...).
*/
#[derive(Clone, Debug)]
pub struct CodecConfig {
    pub stream_type: StreamType,
    pub codec: CodecId,
    pub time_base: Rational,
    /// Geometry and pixel format, for video streams.
    pub video: Option<StreamDescriptor>,
    #[cfg(feature = "ffmpeg")]
    parameters: Option<ffmpeg_next::codec::Parameters>,
}

impl CodecConfig {
    /**
        Configuration of a video stream described entirely by its descriptor.
    */
    pub fn video(descriptor: StreamDescriptor) -> Self {
        Self {
            stream_type: StreamType::Video,
            codec: descriptor.codec,
            time_base: descriptor.time_base,
            video: Some(descriptor),
            #[cfg(feature = "ffmpeg")]
            parameters: None,
        }
    }

    /**
        Configuration of a stream known only by type and codec.
    */
    pub fn opaque(stream_type: StreamType, codec: CodecId, time_base: Rational) -> Self {
        Self {
            stream_type,
            codec,
            time_base,
            video: None,
            #[cfg(feature = "ffmpeg")]
            parameters: None,
        }
    }

    /**
        Attach FFmpeg codec parameters.
    */
    #[cfg(feature = "ffmpeg")]
    pub fn with_parameters(mut self, parameters: ffmpeg_next::codec::Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /**
        FFmpeg codec parameters, if the stream was read through FFmpeg.
    */
    #[cfg(feature = "ffmpeg")]
    pub fn parameters(&self) -> Option<&ffmpeg_next::codec::Parameters> {
        self.parameters.as_ref()
    }

    /**
        Returns true if this is a video stream.
    */
    pub fn is_video(&self) -> bool {
        self.stream_type == StreamType::Video
    }
}
