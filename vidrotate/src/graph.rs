/*!
    Builds the filter graph realizing a [`TransformSpec`] for one stream.
*/

use ffmpeg_filter::{FilterGraph, FramePump, NodeId};
use ffmpeg_types::StreamDescriptor;

use crate::error::{PipelineError, Result};
use crate::transform::TransformSpec;

/**
    A configured graph ready to move frames, and what comes out of it.
*/
#[derive(Debug)]
pub struct BuiltGraph {
    pub pump: FramePump,
    /// Geometry of the filtered frames; codec and frame rate follow the input.
    pub output: StreamDescriptor,
    pub description: String,
}

/**
    Build and configure the graph for `transform` applied to `input`.

    Nodes are created source first, then sink, then the transform steps,
    before anything is linked. Any failure drops the partial graph and is
    reported as [`PipelineError::GraphBuild`].
*/
pub fn build(input: &StreamDescriptor, transform: &TransformSpec) -> Result<BuiltGraph> {
    transform.validate()?;

    let mut graph = FilterGraph::new();
    let source = graph
        .create_filter("buffer", "in", &buffer_args(input))
        .map_err(PipelineError::GraphBuild)?;
    let sink = graph
        .create_filter("buffersink", "out", "")
        .map_err(PipelineError::GraphBuild)?;

    let steps = create_steps(&mut graph, transform).map_err(PipelineError::GraphBuild)?;

    let mut prev = source;
    for step in steps {
        graph
            .link(prev, 0, step, 0)
            .map_err(PipelineError::GraphBuild)?;
        prev = step;
    }
    graph
        .link(prev, 0, sink, 0)
        .map_err(PipelineError::GraphBuild)?;
    graph.configure().map_err(PipelineError::GraphBuild)?;

    let pump = FramePump::new(graph, source, sink).map_err(PipelineError::GraphBuild)?;
    let props = pump.output();
    let mut output = *input;
    output.width = props.width;
    output.height = props.height;
    output.format = props.format;

    Ok(BuiltGraph {
        pump,
        output,
        description: transform.filter_description(),
    })
}

fn buffer_args(input: &StreamDescriptor) -> String {
    format!(
        "video_size={}x{}:pix_fmt={}:time_base={}/{}",
        input.width,
        input.height,
        input.format.name(),
        input.time_base.num,
        input.time_base.den
    )
}

fn create_steps(
    graph: &mut FilterGraph,
    transform: &TransformSpec,
) -> ffmpeg_types::Result<Vec<NodeId>> {
    match transform {
        TransformSpec::Rotate(rotation) => rotation
            .transposes()
            .iter()
            .enumerate()
            .map(|(i, dir)| {
                graph.create_filter("transpose", &format!("transpose{i}"), &format!("dir={dir}"))
            })
            .collect(),
        TransformSpec::Overlay(overlay) => {
            // Input 1 would be the scaled watermark; nothing feeds it.
            let node = graph.create_filter(
                "overlay",
                "overlay",
                &format!("x={}:y={}", overlay.x, overlay.y),
            )?;
            Ok(vec![node])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Overlay;
    use ffmpeg_types::{CodecId, PixelFormat, Pts, Rational, VideoFrame};

    fn descriptor(format: PixelFormat) -> StreamDescriptor {
        StreamDescriptor::new(4, 2, format, Rational::new(1, 25), CodecId::RawVideo)
            .unwrap()
            .with_frame_rate(Rational::new(25, 1))
    }

    #[test]
    fn rotation_swaps_output_geometry() {
        for (degrees, size) in [(90, (2, 4)), (180, (4, 2)), (270, (2, 4))] {
            let built = build(
                &descriptor(PixelFormat::Gray8),
                &TransformSpec::rotate(degrees).unwrap(),
            )
            .unwrap();
            assert_eq!((built.output.width, built.output.height), size, "{degrees}");
            assert_eq!(built.output.codec, CodecId::RawVideo);
            assert_eq!(built.output.frame_rate, Some(Rational::new(25, 1)));
        }
    }

    #[test]
    fn graph_topology_is_a_chain() {
        let built = build(
            &descriptor(PixelFormat::Yuv420p),
            &TransformSpec::rotate(180).unwrap(),
        )
        .unwrap();
        let graph = built.pump.graph();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.link_count(), 3);
        assert_eq!(built.description, "transpose=clock,transpose=clock");
    }

    #[test]
    fn rotate_90_moves_pixels_clockwise() {
        let mut built = build(
            &descriptor(PixelFormat::Gray8),
            &TransformSpec::rotate(90).unwrap(),
        )
        .unwrap();
        // 4x2: row 0 = 0 1 2 3, row 1 = 4 5 6 7
        let frame = VideoFrame::new(
            (0..8).collect(),
            4,
            2,
            PixelFormat::Gray8,
            Some(Pts(0)),
            Rational::new(1, 25),
        );
        built.pump.push(frame).unwrap();
        let out = built.pump.pull_all().next().unwrap().unwrap();
        assert_eq!((out.width, out.height), (2, 4));
        assert_eq!(out.data, vec![4, 0, 5, 1, 6, 2, 7, 3]);
    }

    #[test]
    fn unsupported_pixel_format_is_a_graph_error() {
        let err = build(
            &descriptor(PixelFormat::Yuv422p),
            &TransformSpec::rotate(90).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::GraphBuild(_)));
    }

    #[test]
    fn overlay_fails_with_unwired_input() {
        let err = build(
            &descriptor(PixelFormat::Yuv420p),
            &TransformSpec::Overlay(Overlay::new("wm.png")),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::GraphBuild(_)));
        assert!(err.to_string().contains("not connected"));
    }
}
