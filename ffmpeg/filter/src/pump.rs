/*!
    Pushing frames into a configured graph and draining its output.
*/

use ffmpeg_types::{Error, Result, VideoFrame};

use crate::{FilterGraph, LinkProps, NodeId};

/**
    Moves frames through a configured [`FilterGraph`] with one source and
    one sink.

    The pump holds no frames of its own; everything pushed and not yet
    pulled is buffered inside the graph. One push may make zero, one or
    several frames available.
*/
#[derive(Debug)]
pub struct FramePump {
    graph: FilterGraph,
    source: NodeId,
    sink: NodeId,
    output: LinkProps,
}

impl FramePump {
    /**
        Take ownership of a configured graph, pushing into `source` and
        pulling from `sink`.
    */
    pub fn new(graph: FilterGraph, source: NodeId, sink: NodeId) -> Result<Self> {
        if !graph.is_configured() {
            return Err(Error::invalid_data("filter graph is not configured"));
        }
        if graph.source_props(source).is_none() {
            return Err(Error::invalid_data("pump source must be a buffer node"));
        }
        let output = graph
            .sink_props(sink)
            .ok_or_else(|| Error::invalid_data("pump sink must be a buffersink node"))?;

        Ok(Self {
            graph,
            source,
            sink,
            output,
        })
    }

    /**
        Feed one frame into the source.
    */
    pub fn push(&mut self, frame: VideoFrame) -> Result<()> {
        self.graph.push(self.source, Some(frame))
    }

    /**
        Signal end of input so the graph releases what it still holds.
    */
    pub fn push_eof(&mut self) -> Result<()> {
        self.graph.push(self.source, None)
    }

    /**
        Lazily drain every frame currently available at the sink.

        The iterator ends when the sink reports "no frame available" or end
        of stream; neither is an error. Any other failure is yielded once
        and ends the iteration.
    */
    pub fn pull_all(&mut self) -> PullAll<'_> {
        PullAll {
            graph: &mut self.graph,
            sink: self.sink,
            done: false,
        }
    }

    /**
        Properties of the frames coming out of the sink.
    */
    pub fn output(&self) -> LinkProps {
        self.output
    }

    pub fn graph(&self) -> &FilterGraph {
        &self.graph
    }
}

/**
    Iterator returned by [`FramePump::pull_all`].
*/
#[derive(Debug)]
pub struct PullAll<'a> {
    graph: &'a mut FilterGraph,
    sink: NodeId,
    done: bool,
}

impl Iterator for PullAll<'_> {
    type Item = Result<VideoFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.graph.pull(self.sink) {
            Ok(frame) => Some(Ok(frame)),
            Err(Error::Again | Error::Eof) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    fn pump(filters: &[(&str, &str)]) -> FramePump {
        let mut graph = FilterGraph::new();
        let src = graph
            .create_filter("buffer", "in", "video_size=2x2:pix_fmt=gray:time_base=1/25")
            .unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        let mut prev = src;
        for (i, (name, args)) in filters.iter().enumerate() {
            let node = graph.create_filter(name, &format!("f{i}"), args).unwrap();
            graph.link(prev, 0, node, 0).unwrap();
            prev = node;
        }
        graph.link(prev, 0, sink, 0).unwrap();
        graph.configure().unwrap();
        FramePump::new(graph, src, sink).unwrap()
    }

    fn frame(pts: i64) -> VideoFrame {
        VideoFrame::new(
            vec![1, 2, 3, 4],
            2,
            2,
            PixelFormat::Gray8,
            Some(Pts(pts)),
            Rational::new(1, 25),
        )
    }

    #[test]
    fn one_push_one_frame() {
        let mut pump = pump(&[("transpose", "clock")]);
        pump.push(frame(0)).unwrap();

        let frames: Vec<_> = pump.pull_all().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, vec![3, 1, 4, 2]);
        assert_eq!(pump.pull_all().count(), 0);
    }

    #[test]
    fn pull_all_drains_everything_queued() {
        let mut pump = pump(&[]);
        for pts in 0..3 {
            pump.push(frame(pts)).unwrap();
        }
        let pts: Vec<_> = pump.pull_all().map(|f| f.unwrap().pts).collect();
        assert_eq!(pts, vec![Some(Pts(0)), Some(Pts(1)), Some(Pts(2))]);
    }

    #[test]
    fn pull_all_ends_at_eof() {
        let mut pump = pump(&[("vflip", "")]);
        pump.push(frame(0)).unwrap();
        pump.push_eof().unwrap();
        assert_eq!(pump.pull_all().count(), 1);
        assert_eq!(pump.pull_all().count(), 0);
    }

    #[test]
    fn pull_all_yields_hard_errors_once() {
        let mut pump = pump(&[]);
        let bad = VideoFrame::blank(3, 3, PixelFormat::Gray8, Rational::new(1, 25));
        assert!(pump.push(bad).is_err());
        assert_eq!(pump.pull_all().count(), 0);
    }

    #[test]
    fn output_reflects_negotiation() {
        let pump = pump(&[("transpose", "cclock")]);
        let out = pump.output();
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.format, PixelFormat::Gray8);
    }

    #[test]
    fn new_requires_configured_graph() {
        let mut graph = FilterGraph::new();
        let src = graph
            .create_filter("buffer", "in", "video_size=2x2:pix_fmt=gray:time_base=1/25")
            .unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        graph.link(src, 0, sink, 0).unwrap();
        assert!(FramePump::new(graph, src, sink).is_err());
    }
}
