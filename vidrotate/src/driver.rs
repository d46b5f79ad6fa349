/*!
    Entry points: validate arguments, run one session, report a status.
*/

use std::path::Path;

use tracing::error;

use ffmpeg_types::MediaInfo;

use crate::backend::{DefaultBackend, MediaBackend};
use crate::error::{PipelineError, Result};
use crate::session::{SessionConfig, SessionReport, TranscodeSession};
use crate::transform::{Overlay, TransformSpec};

/**
    Rotate the video stream of `input` clockwise by `degrees` (90, 180 or
    270) and write the result to `output`.

    Returns 0 on success and a negative status code on failure.
*/
pub fn rotate_video(input: impl AsRef<Path>, output: impl AsRef<Path>, degrees: i32) -> i32 {
    status(
        TransformSpec::rotate(degrees)
            .and_then(|spec| transcode(input, output, spec, SessionConfig::default())),
    )
}

/**
    Composite `watermark` onto the video stream of `input`.

    Watermarking is not realizable yet: the run always fails while
    building the filter graph, leaving no output behind.
*/
pub fn apply_watermark(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    watermark: impl AsRef<Path>,
) -> i32 {
    let spec = TransformSpec::Overlay(Overlay::new(watermark.as_ref()));
    status(transcode(input, output, spec, SessionConfig::default()))
}

/**
    Validate the request and run one session with the default backend.
*/
pub fn transcode(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    transform: TransformSpec,
    config: SessionConfig,
) -> Result<SessionReport> {
    transcode_with(DefaultBackend, input, output, transform, config)
}

/**
    Validate the request and run one session with `backend`.

    Nothing is opened unless the transform is valid, the input is a
    readable file and the output can be created next to an existing
    directory.
*/
pub fn transcode_with<B: MediaBackend>(
    backend: B,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    transform: TransformSpec,
    config: SessionConfig,
) -> Result<SessionReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    transform.validate()?;
    validate_paths(input, output)?;

    TranscodeSession::with_backend(backend, input, output, transform, config).execute()
}

/**
    Describe the streams of a media file.
*/
pub fn probe(path: impl AsRef<Path>) -> Result<MediaInfo> {
    let path = path.as_ref();
    ffmpeg_source::probe(path).map_err(|e| PipelineError::io(path, e))
}

/**
    Map a result to a status code, logging the failure.
*/
pub fn status<T>(result: Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            error!(error = %e, code = e.status_code(), "pipeline failed");
            e.status_code()
        }
    }
}

fn validate_paths(input: &Path, output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        return Err(PipelineError::invalid_argument("output path is empty"));
    }
    if input == output {
        return Err(PipelineError::invalid_argument(
            "input and output must be different files",
        ));
    }

    let metadata = std::fs::metadata(input).map_err(|e| PipelineError::io(input, e))?;
    if !metadata.is_file() {
        return Err(PipelineError::io(
            input,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(PipelineError::io(
            output,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "output directory does not exist",
            ),
        ));
    }
    Ok(())
}
