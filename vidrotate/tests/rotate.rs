mod common;

use std::path::Path;

use ffmpeg_types::{PixelFormat, Rational};
use tempfile::tempdir;
use vidrotate::{PipelineError, SessionConfig, TransformSpec, rotate_video, transcode_with};

use common::{CountingBackend, fixture, read_y4m};

fn frames_of(path: &Path) -> Vec<Vec<u8>> {
    read_y4m(path).1.into_iter().map(|p| p.data).collect()
}

#[test]
fn rotate_90_two_seconds_of_qvga() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 320, 240, PixelFormat::Yuv420p, 50);
    let output = dir.path().join("out.y4m");

    let backend = CountingBackend::new();
    let report = transcode_with(
        &backend,
        &input,
        &output,
        TransformSpec::rotate(90).unwrap(),
        SessionConfig::default(),
    )
    .unwrap();

    assert_eq!((report.output.width, report.output.height), (240, 320));
    assert_eq!(report.frames_decoded, 50);
    assert_eq!(report.frames_encoded, 50);
    assert_eq!(report.packets_written, 50);

    let pts = backend.written_pts(0);
    assert_eq!(pts.len(), 50);
    assert!(pts.windows(2).all(|w| w[0] < w[1]), "{pts:?}");
    assert_eq!(backend.live_handles(), 0);

    let (header, packets) = read_y4m(&output);
    assert_eq!((header.width, header.height), (240, 320));
    assert_eq!(header.frame_rate, Rational::new(25, 1));
    assert_eq!(header.format, PixelFormat::Yuv420p);
    assert_eq!(packets.len(), 50);
}

#[test]
fn rotate_video_reports_success() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 32, 16, PixelFormat::Yuv420p, 3);
    let output = dir.path().join("out.y4m");

    assert_eq!(rotate_video(&input, &output, 270), 0);
    let (header, packets) = read_y4m(&output);
    assert_eq!((header.width, header.height), (16, 32));
    assert_eq!(packets.len(), 3);
}

#[test]
fn rotate_180_keeps_dimensions() {
    let dir = tempdir().unwrap();
    let (input, frames) = fixture(dir.path(), "in.y4m", 6, 4, PixelFormat::Gray8, 2);
    let output = dir.path().join("out.y4m");

    assert_eq!(rotate_video(&input, &output, 180), 0);
    let (header, packets) = read_y4m(&output);
    assert_eq!((header.width, header.height), (6, 4));

    // 180 degrees reverses the pixel order of a single plane
    let mut expected = frames[0].clone();
    expected.reverse();
    assert_eq!(packets[0].data, expected);
}

#[test]
fn rotate_90_moves_pixels_clockwise() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.y4m");
    // 3x2 mono: a b c / d e f
    common::write_y4m(&input, 3, 2, 25, PixelFormat::Gray8, &[vec![1, 2, 3, 4, 5, 6]]);
    let output = dir.path().join("out.y4m");

    assert_eq!(rotate_video(&input, &output, 90), 0);
    let (header, packets) = read_y4m(&output);
    assert_eq!((header.width, header.height), (2, 3));
    // d a / e b / f c
    assert_eq!(packets[0].data, vec![4, 1, 5, 2, 6, 3]);
}

#[test]
fn quarter_turns_summing_to_a_full_turn_are_lossless() {
    let dir = tempdir().unwrap();
    for format in [PixelFormat::Yuv420p, PixelFormat::Yuv444p, PixelFormat::Gray8] {
        let (input, frames) = fixture(dir.path(), "in.y4m", 12, 8, format, 4);

        for turns in [&[90, 90, 90, 90][..], &[90, 270], &[180, 180], &[270, 180, 270]] {
            let mut current = input.clone();
            for (i, degrees) in turns.iter().enumerate() {
                let next = dir.path().join(format!("step{i}.y4m"));
                assert_eq!(rotate_video(&current, &next, *degrees), 0);
                current = next;
            }
            assert_eq!(frames_of(&current), frames, "{format:?} {turns:?}");
        }
    }
}

#[test]
fn invalid_degrees_create_no_output() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 8, 8, PixelFormat::Yuv420p, 1);
    let output = dir.path().join("out.y4m");

    for degrees in [999, 0, 45, -90, 360] {
        assert_eq!(
            rotate_video(&input, &output, degrees),
            PipelineError::INVALID_ARGUMENT
        );
        assert!(!output.exists());
    }
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.y4m");

    let code = rotate_video(dir.path().join("missing.y4m"), &output, 90);
    assert_eq!(code, PipelineError::IO);
    assert!(!output.exists());
}

#[test]
fn missing_output_directory_is_an_io_error() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 8, 8, PixelFormat::Yuv420p, 1);

    let code = rotate_video(&input, dir.path().join("nope").join("out.y4m"), 90);
    assert_eq!(code, PipelineError::IO);
}

#[test]
fn unreadable_container_is_an_io_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.y4m");
    std::fs::write(&input, b"YUV4MPEG2 W0 H0\n").unwrap();
    let output = dir.path().join("out.y4m");

    assert_eq!(rotate_video(&input, &output, 90), PipelineError::IO);
    assert!(!output.exists());
}

#[test]
fn absurd_dimensions_are_an_io_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.y4m");

    for header in [
        "YUV4MPEG2 W4000000000 H4000000000 F25:1 C444",
        "YUV4MPEG2 W3000000 H3000000 F25:1 C444",
    ] {
        let input = dir.path().join("in.y4m");
        std::fs::write(&input, format!("{header}\nFRAME\n").as_bytes()).unwrap();

        assert_eq!(rotate_video(&input, &output, 90), PipelineError::IO, "{header}");
        assert!(!output.exists());
    }
}

#[test]
fn watermark_is_not_realizable() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 16, 16, PixelFormat::Yuv420p, 2);
    let (watermark, _) = fixture(dir.path(), "wm.y4m", 4, 4, PixelFormat::Yuv420p, 1);
    let output = dir.path().join("out.y4m");

    let code = vidrotate::apply_watermark(&input, &output, &watermark);
    assert_ne!(code, 0);
    assert_eq!(code, PipelineError::GRAPH_BUILD);
    assert!(!output.exists());
}
