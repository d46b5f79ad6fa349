/*!
    Sink configuration types.
*/

use std::path::Path;

/**
    Container format for output.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    /// YUV4MPEG2, written natively. Carries one raw video stream.
    Y4m,
    /// MP4 container (most compatible).
    Mp4,
    /// QuickTime container.
    Mov,
    /// Matroska container (most flexible).
    Mkv,
    /// WebM, the Matroska subset for VP8/VP9/AV1.
    WebM,
    /// MPEG transport stream.
    MpegTs,
    /// Audio Video Interleave.
    Avi,
    /// Any other libavformat muxer, by short name.
    Named(String),
}

impl ContainerFormat {
    /**
        Guess the container from the extension of `path`.
    */
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        let format = match extension.as_str() {
            "y4m" => Self::Y4m,
            "mp4" | "m4v" => Self::Mp4,
            "mov" => Self::Mov,
            "mkv" => Self::Mkv,
            "webm" => Self::WebM,
            "ts" | "m2ts" => Self::MpegTs,
            "avi" => Self::Avi,
            _ => return None,
        };
        Some(format)
    }

    /**
        Get the FFmpeg format name for this container.
    */
    pub fn ffmpeg_format_name(&self) -> &str {
        match self {
            Self::Y4m => "yuv4mpegpipe",
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Mkv => "matroska",
            Self::WebM => "webm",
            Self::MpegTs => "mpegts",
            Self::Avi => "avi",
            Self::Named(name) => name,
        }
    }

    /**
        Returns true if this container is written without libavformat.
    */
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Y4m)
    }
}

/**
    Configuration for a media sink.
*/
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Container format to use (None = guess from the output path).
    pub format: Option<ContainerFormat>,
    /// Enable "fast start" for MP4 (moves moov atom to beginning).
    pub fast_start: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            format: None,
            fast_start: true,
        }
    }
}

impl SinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Force the container format instead of guessing from the path.
    */
    pub fn with_format(mut self, format: ContainerFormat) -> Self {
        self.format = Some(format);
        self
    }

    /**
        Enable or disable fast start for MP4.
    */
    pub fn with_fast_start(mut self, enabled: bool) -> Self {
        self.fast_start = enabled;
        self
    }

    /**
        The container to write `path` as, if it can be determined.
    */
    pub fn resolve(&self, path: &Path) -> Option<ContainerFormat> {
        self.format
            .clone()
            .or_else(|| ContainerFormat::from_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_from_extensions() {
        assert_eq!(
            ContainerFormat::from_path(Path::new("out.y4m")),
            Some(ContainerFormat::Y4m)
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("/tmp/OUT.MP4")),
            Some(ContainerFormat::Mp4)
        );
        assert_eq!(
            ContainerFormat::from_path(Path::new("clip.webm")),
            Some(ContainerFormat::WebM)
        );
        assert_eq!(ContainerFormat::from_path(Path::new("noext")), None);
        assert_eq!(ContainerFormat::from_path(Path::new("a.xyz")), None);
    }

    #[test]
    fn explicit_format_wins() {
        let config = SinkConfig::new().with_format(ContainerFormat::Mkv);
        assert_eq!(
            config.resolve(Path::new("out.y4m")),
            Some(ContainerFormat::Mkv)
        );
        assert_eq!(
            SinkConfig::new().resolve(Path::new("out.y4m")),
            Some(ContainerFormat::Y4m)
        );
    }

    #[test]
    fn only_y4m_is_native() {
        assert!(ContainerFormat::Y4m.is_native());
        assert!(!ContainerFormat::Mp4.is_native());
        assert_eq!(
            ContainerFormat::Named("flv".into()).ffmpeg_format_name(),
            "flv"
        );
    }
}
