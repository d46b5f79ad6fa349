use std::path::PathBuf;

use thiserror::Error;

use ffmpeg_types::Error as MediaError;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/**
    Terminal failure of a pipeline run.

    Every variant maps to a stable negative status code, see
    [`PipelineError::status_code`].
*/
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("no video stream in {}", path.display())]
    StreamNotFound { path: PathBuf },

    #[error("failed to build filter graph: {0}")]
    GraphBuild(#[source] MediaError),

    #[error("{stage} failed: {source}")]
    Codec {
        stage: &'static str,
        #[source]
        source: MediaError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Mux {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    pub const INVALID_ARGUMENT: i32 = -22;
    pub const IO: i32 = -5;
    pub const STREAM_NOT_FOUND: i32 = -2;
    pub const GRAPH_BUILD: i32 = -3;
    pub const CODEC: i32 = -4;
    pub const MUX: i32 = -6;
    pub const CANCELLED: i32 = -125;

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: impl Into<MediaError>) -> Self {
        Self::Io {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn codec(stage: &'static str, source: MediaError) -> Self {
        Self::Codec { stage, source }
    }

    pub(crate) fn mux(path: impl Into<PathBuf>, source: MediaError) -> Self {
        Self::Mux {
            path: path.into(),
            source,
        }
    }

    /**
        The status code reported for this failure. Always negative.
    */
    pub fn status_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => Self::INVALID_ARGUMENT,
            Self::Io { .. } => Self::IO,
            Self::StreamNotFound { .. } => Self::STREAM_NOT_FOUND,
            Self::GraphBuild(_) => Self::GRAPH_BUILD,
            Self::Codec { .. } => Self::CODEC,
            Self::Mux { .. } => Self::MUX,
            Self::Cancelled => Self::CANCELLED,
        }
    }
}
