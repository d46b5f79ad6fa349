/*!
    Codec identification.
*/

/**
    Codec identifiers.

    This is a subset of codecs commonly used in media pipelines.
    Anything else is reported as [`CodecId::Other`]; such streams can still
    be stream-copied or handled by the FFmpeg backend through their opaque
    codec parameters.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video codecs
    /// Uncompressed pictures, one frame per packet
    RawVideo,
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
    /// AV1
    Av1,
    /// MPEG-4 Part 2
    Mpeg4,
    /// MPEG-2 Video
    Mpeg2Video,
    /// Motion JPEG
    Mjpeg,
    /// Apple ProRes
    ProRes,

    // Audio codecs
    /// AAC (Advanced Audio Coding)
    Aac,
    /// Opus
    Opus,
    /// MP3 (MPEG Audio Layer 3)
    Mp3,
    /// Vorbis
    Vorbis,
    /// FLAC (Free Lossless Audio Codec)
    Flac,
    /// PCM signed 16-bit little-endian
    PcmS16Le,
    /// AC-3 (Dolby Digital)
    Ac3,

    /// Any codec not listed above
    Other,
}

impl CodecId {
    /**
        Returns true if this is a video codec.
    */
    pub const fn is_video(self) -> bool {
        matches!(
            self,
            Self::RawVideo
                | Self::H264
                | Self::H265
                | Self::Vp8
                | Self::Vp9
                | Self::Av1
                | Self::Mpeg4
                | Self::Mpeg2Video
                | Self::Mjpeg
                | Self::ProRes
        )
    }

    /**
        Returns true if this is an audio codec.
    */
    pub const fn is_audio(self) -> bool {
        matches!(
            self,
            Self::Aac
                | Self::Opus
                | Self::Mp3
                | Self::Vorbis
                | Self::Flac
                | Self::PcmS16Le
                | Self::Ac3
        )
    }

    /**
        Returns true if every packet decodes independently of its neighbours.
    */
    pub const fn is_intra_only(self) -> bool {
        matches!(self, Self::RawVideo | Self::Mjpeg | Self::ProRes)
    }

    /**
        Returns the short FFmpeg-style name of this codec.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::RawVideo => "rawvideo",
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Vp8 => "vp8",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Mpeg4 => "mpeg4",
            Self::Mpeg2Video => "mpeg2video",
            Self::Mjpeg => "mjpeg",
            Self::ProRes => "prores",
            Self::Aac => "aac",
            Self::Opus => "opus",
            Self::Mp3 => "mp3",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::PcmS16Le => "pcm_s16le",
            Self::Ac3 => "ac3",
            Self::Other => "other",
        }
    }

    /**
        Look up a codec by its short name. Unknown names yield `None`.
    */
    pub fn from_name(name: &str) -> Option<Self> {
        let codec = match name.to_ascii_lowercase().as_str() {
            "rawvideo" | "raw" => Self::RawVideo,
            "h264" | "avc" => Self::H264,
            "hevc" | "h265" => Self::H265,
            "vp8" => Self::Vp8,
            "vp9" => Self::Vp9,
            "av1" => Self::Av1,
            "mpeg4" => Self::Mpeg4,
            "mpeg2video" | "mpeg2" => Self::Mpeg2Video,
            "mjpeg" => Self::Mjpeg,
            "prores" => Self::ProRes,
            "aac" => Self::Aac,
            "opus" => Self::Opus,
            "mp3" => Self::Mp3,
            "vorbis" => Self::Vorbis,
            "flac" => Self::Flac,
            "pcm_s16le" => Self::PcmS16Le,
            "ac3" => Self::Ac3,
            _ => return None,
        };
        Some(codec)
    }
}
