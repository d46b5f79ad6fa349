/*!
    Rotate the video stream of a media file by a multiple of 90 degrees,
    copying every other stream unchanged.

    A [`TranscodeSession`] demuxes the input, decodes the best video stream,
    pushes each frame through a filter graph built for the requested
    [`TransformSpec`], encodes the result and muxes it into the output next
    to the copied streams.

    ```ignore
    let status = vidrotate::rotate_video("in.y4m", "out.y4m", 90);
    assert_eq!(status, 0);
    ```

    # Features

    - `ffmpeg`: Read and write every container and codec FFmpeg supports.
      Without it only YUV4MPEG2 files with raw video are handled.
*/

mod backend;
mod cancel;
mod driver;
mod error;
mod graph;
mod rebase;
mod session;
mod transform;

pub use backend::{DefaultBackend, MediaBackend};
pub use cancel::CancellationToken;
pub use driver::{apply_watermark, probe, rotate_video, status, transcode, transcode_with};
pub use error::{PipelineError, Result};
pub use graph::{BuiltGraph, build as build_graph};
pub use rebase::{DtsGuard, VideoTimestamps};
pub use session::{SessionConfig, SessionReport, SessionState, TranscodeSession};
pub use transform::{Overlay, Rotation, TransformSpec};
