/*!
    Filter graph arena.
*/

use std::collections::VecDeque;

use ffmpeg_types::{Error, Result, VideoFrame};

use crate::filters::{Filter, LinkProps};
use crate::kernels;

/**
    Stable handle to a node of a [`FilterGraph`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /**
        Position of the node in creation order.
    */
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node {
    name: String,
    filter: Filter,
    inputs: Vec<Option<usize>>,
    outputs: Vec<Option<usize>>,
    // Last picture seen on the second overlay input
    held: Option<VideoFrame>,
}

#[derive(Debug)]
struct Link {
    src: NodeId,
    dst: NodeId,
    props: Option<LinkProps>,
    queue: VecDeque<VideoFrame>,
    eof: bool,
}

/**
    A graph of video filters.

    Nodes live in an arena and are addressed by [`NodeId`]; links are pairs
    of (node, pad) indices. The graph is built with
    [`FilterGraph::create_filter`] and [`FilterGraph::link`], then sealed by
    [`FilterGraph::configure`], which checks that every pad is connected
    and negotiates the picture size and pixel format on every link. After
    that the topology is fixed and frames can flow.

    Frames pushed into a `buffer` node are filtered eagerly and queue up in
    front of the `buffersink` nodes until pulled. Dropping the graph
    releases every node, link and queued frame.
*/
#[derive(Debug, Default)]
pub struct FilterGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    order: Vec<NodeId>,
    configured: bool,
}

impl FilterGraph {
    /**
        Allocate an empty graph.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create a node running the filter registered as `filter`, configured
        with FFmpeg-style `args`. `name` must be unique within the graph.
    */
    pub fn create_filter(&mut self, filter: &str, name: &str, args: &str) -> Result<NodeId> {
        self.ensure_unconfigured()?;
        if self.nodes.iter().any(|n| n.name == name) {
            return Err(Error::invalid_data(format!(
                "filter instance {name:?} already exists"
            )));
        }

        let filter = Filter::create(filter, args)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_owned(),
            inputs: vec![None; filter.input_pads()],
            outputs: vec![None; filter.output_pads()],
            filter,
            held: None,
        });
        Ok(id)
    }

    /**
        Connect output pad `src_pad` of `src` to input pad `dst_pad` of `dst`.
    */
    pub fn link(&mut self, src: NodeId, src_pad: usize, dst: NodeId, dst_pad: usize) -> Result<()> {
        self.ensure_unconfigured()?;
        if src == dst {
            return Err(Error::invalid_data("cannot link a filter to itself"));
        }

        let free_output = self
            .node(src)?
            .outputs
            .get(src_pad)
            .is_some_and(Option::is_none);
        let free_input = self
            .node(dst)?
            .inputs
            .get(dst_pad)
            .is_some_and(Option::is_none);
        if !free_output {
            return Err(Error::invalid_data(format!(
                "output pad {src_pad} of {:?} does not exist or is already linked",
                self.nodes[src.0].name
            )));
        }
        if !free_input {
            return Err(Error::invalid_data(format!(
                "input pad {dst_pad} of {:?} does not exist or is already linked",
                self.nodes[dst.0].name
            )));
        }

        let link = self.links.len();
        self.links.push(Link {
            src,
            dst,
            props: None,
            queue: VecDeque::new(),
            eof: false,
        });
        self.nodes[src.0].outputs[src_pad] = Some(link);
        self.nodes[dst.0].inputs[dst_pad] = Some(link);
        Ok(())
    }

    /**
        Validate the topology and negotiate link properties.

        Fails if any pad is unconnected, if the graph has no `buffer` or no
        `buffersink`, if it contains a cycle, or if a filter cannot accept
        the pixel format reaching it. A graph that failed to configure can
        still be inspected, but only dropped.
    */
    pub fn configure(&mut self) -> Result<()> {
        self.ensure_unconfigured()?;

        for node in &self.nodes {
            if let Some(pad) = node.inputs.iter().position(Option::is_none) {
                return Err(Error::invalid_data(format!(
                    "input pad {pad} of {} filter {:?} is not connected",
                    node.filter.name(),
                    node.name
                )));
            }
            if let Some(pad) = node.outputs.iter().position(Option::is_none) {
                return Err(Error::invalid_data(format!(
                    "output pad {pad} of {} filter {:?} is not connected",
                    node.filter.name(),
                    node.name
                )));
            }
        }
        if !self.nodes.iter().any(|n| matches!(n.filter, Filter::Buffer(_))) {
            return Err(Error::invalid_data("filter graph has no buffer source"));
        }
        if !self.nodes.iter().any(|n| n.filter == Filter::BufferSink) {
            return Err(Error::invalid_data("filter graph has no buffersink"));
        }

        let order = self.topological_order()?;
        for &id in &order {
            let props = self.negotiate(id)?;
            for &link in self.nodes[id.0].outputs.iter().flatten() {
                self.links[link].props = props;
            }
        }

        self.order = order;
        self.configured = true;
        Ok(())
    }

    /**
        Returns true once [`FilterGraph::configure`] succeeded.
    */
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /**
        Number of nodes in the graph.
    */
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /**
        Number of links in the graph.
    */
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /**
        Iterate over `(id, instance name, filter name)` for every node.
    */
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str, &'static str)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i), n.name.as_str(), n.filter.name()))
    }

    /**
        Index pairs `(source node, destination node)` of every link.
    */
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> {
        self.links.iter().map(|l| (l.src, l.dst))
    }

    /**
        Properties of the pictures a `buffer` node accepts.
    */
    pub fn source_props(&self, source: NodeId) -> Option<LinkProps> {
        match self.nodes.get(source.0)?.filter {
            Filter::Buffer(props) => Some(props),
            _ => None,
        }
    }

    /**
        Properties of the pictures a `buffersink` node hands out. Known only
        after configuration.
    */
    pub fn sink_props(&self, sink: NodeId) -> Option<LinkProps> {
        let node = self.nodes.get(sink.0)?;
        if node.filter != Filter::BufferSink {
            return None;
        }
        let link = (*node.inputs.first()?)?;
        self.links[link].props
    }

    /**
        Feed a frame into `source`, or signal end of input with `None`.

        The frame must match the size and pixel format the source was
        created with. Its timestamp is rescaled to the source time base if
        needed.
    */
    pub fn push(&mut self, source: NodeId, frame: Option<VideoFrame>) -> Result<()> {
        self.ensure_configured()?;
        let props = self
            .source_props(source)
            .ok_or_else(|| Error::invalid_data("frames can only be pushed into a buffer"))?;
        let link = self.output_link(source)?;
        if self.links[link].eof {
            return Err(Error::Eof);
        }

        match frame {
            Some(mut frame) => {
                if (frame.width, frame.height, frame.format)
                    != (props.width, props.height, props.format)
                {
                    return Err(Error::invalid_data(format!(
                        "{}x{} {} frame pushed into a {}x{} {} buffer",
                        frame.width,
                        frame.height,
                        frame.format.name(),
                        props.width,
                        props.height,
                        props.format.name()
                    )));
                }
                if frame.time_base != props.time_base {
                    let from = frame.time_base;
                    frame.pts = frame.pts.map(|pts| pts.rescale(from, props.time_base));
                    frame.time_base = props.time_base;
                }
                self.links[link].queue.push_back(frame);
            }
            None => self.links[link].eof = true,
        }

        self.run()
    }

    /**
        Take the next filtered frame from `sink`.

        Fails with [`Error::Again`] when nothing is ready yet and with
        [`Error::Eof`] once the end of input reached the sink and every
        frame was taken.
    */
    pub fn pull(&mut self, sink: NodeId) -> Result<VideoFrame> {
        self.ensure_configured()?;
        let node = self.node(sink)?;
        if node.filter != Filter::BufferSink {
            return Err(Error::invalid_data("frames can only be pulled from a buffersink"));
        }
        let link = node.inputs[0].ok_or_else(|| Error::invalid_data("sink is not connected"))?;

        let link = &mut self.links[link];
        match link.queue.pop_front() {
            Some(frame) => Ok(frame),
            None if link.eof => Err(Error::Eof),
            None => Err(Error::Again),
        }
    }

    /**
        Move every queued frame as far downstream as it can go.
    */
    fn run(&mut self) -> Result<()> {
        for i in 0..self.order.len() {
            let id = self.order[i];
            let filter = self.nodes[id.0].filter.clone();
            match filter {
                Filter::Buffer(_) | Filter::BufferSink => {}
                Filter::Transpose(dir) => self.run_simple(id, |f| kernels::transpose(f, dir))?,
                Filter::HFlip => self.run_simple(id, kernels::hflip)?,
                Filter::VFlip => self.run_simple(id, kernels::vflip)?,
                Filter::Overlay { x, y } => self.run_overlay(id, x, y)?,
            }
        }
        Ok(())
    }

    fn run_simple(
        &mut self,
        id: NodeId,
        kernel: impl Fn(&VideoFrame) -> Result<VideoFrame>,
    ) -> Result<()> {
        let input = self.input_link(id, 0)?;
        let output = self.output_link(id)?;

        while let Some(frame) = self.links[input].queue.pop_front() {
            let filtered = kernel(&frame)?;
            self.links[output].queue.push_back(filtered);
        }
        if self.links[input].eof {
            self.links[output].eof = true;
        }
        Ok(())
    }

    fn run_overlay(&mut self, id: NodeId, x: u32, y: u32) -> Result<()> {
        let main = self.input_link(id, 0)?;
        let over = self.input_link(id, 1)?;
        let output = self.output_link(id)?;

        while !self.links[main].queue.is_empty() {
            if let Some(frame) = self.links[over].queue.pop_front() {
                self.nodes[id.0].held = Some(frame);
            } else if self.nodes[id.0].held.is_none() && !self.links[over].eof {
                // Wait for the first overlay picture
                break;
            }

            let Some(mut frame) = self.links[main].queue.pop_front() else {
                break;
            };
            if let Some(held) = &self.nodes[id.0].held {
                kernels::overlay(&mut frame, held, x, y)?;
            }
            self.links[output].queue.push_back(frame);
        }
        if self.links[main].eof && self.links[main].queue.is_empty() {
            self.links[output].eof = true;
        }
        Ok(())
    }

    /**
        Kahn's algorithm over the links. Fails if the graph has a cycle.
    */
    fn topological_order(&self) -> Result<Vec<NodeId>> {
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.inputs.len()).collect();
        let mut ready: VecDeque<NodeId> = (0..self.nodes.len())
            .filter(|&i| pending[i] == 0)
            .map(NodeId)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_front() {
            order.push(id);
            for &link in self.nodes[id.0].outputs.iter().flatten() {
                let dst = self.links[link].dst;
                pending[dst.0] -= 1;
                if pending[dst.0] == 0 {
                    ready.push_back(dst);
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(Error::invalid_data("filter graph contains a cycle"));
        }
        Ok(order)
    }

    /**
        Output properties of node `id`, given that every upstream link was
        already negotiated.
    */
    fn negotiate(&self, id: NodeId) -> Result<Option<LinkProps>> {
        let node = &self.nodes[id.0];
        let input = |pad: usize| -> Result<LinkProps> {
            node.inputs
                .get(pad)
                .copied()
                .flatten()
                .and_then(|link| self.links[link].props)
                .ok_or_else(|| {
                    Error::invalid_data(format!("input {pad} of {:?} is not negotiated", node.name))
                })
        };

        let props = match node.filter {
            Filter::Buffer(props) => props,
            Filter::BufferSink => return Ok(None),
            Filter::Transpose(_) => {
                let props = input(0)?;
                if !props.format.is_transposable() {
                    return Err(Error::unsupported_format(format!(
                        "transpose filter {:?} cannot handle {} input",
                        node.name,
                        props.format.name()
                    )));
                }
                props.transposed()
            }
            Filter::HFlip | Filter::VFlip => input(0)?,
            Filter::Overlay { .. } => {
                let main = input(0)?;
                let over = input(1)?;
                if main.format != over.format {
                    return Err(Error::unsupported_format(format!(
                        "overlay filter {:?} needs matching formats, got {} and {}",
                        node.name,
                        main.format.name(),
                        over.format.name()
                    )));
                }
                main
            }
        };
        Ok(Some(props))
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| Error::invalid_data(format!("no filter node {}", id.0)))
    }

    fn input_link(&self, id: NodeId, pad: usize) -> Result<usize> {
        self.node(id)?
            .inputs
            .get(pad)
            .copied()
            .flatten()
            .ok_or_else(|| Error::invalid_data("input pad is not connected"))
    }

    fn output_link(&self, id: NodeId) -> Result<usize> {
        self.node(id)?
            .outputs
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| Error::invalid_data("output pad is not connected"))
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(Error::invalid_data("filter graph is not configured"))
        }
    }

    fn ensure_unconfigured(&self) -> Result<()> {
        if self.configured {
            Err(Error::invalid_data("filter graph is already configured"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    const SRC_ARGS: &str = "video_size=4x2:pix_fmt=gray:time_base=1/25";

    fn frame(pts: i64) -> VideoFrame {
        VideoFrame::new(
            vec![1, 2, 3, 4, 5, 6, 7, 8],
            4,
            2,
            PixelFormat::Gray8,
            Some(Pts(pts)),
            Rational::new(1, 25),
        )
    }

    fn chain(filters: &[(&str, &str)]) -> (FilterGraph, NodeId, NodeId) {
        let mut graph = FilterGraph::new();
        let src = graph.create_filter("buffer", "in", SRC_ARGS).unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        let mut prev = src;
        for (i, (name, args)) in filters.iter().enumerate() {
            let node = graph.create_filter(name, &format!("f{i}"), args).unwrap();
            graph.link(prev, 0, node, 0).unwrap();
            prev = node;
        }
        graph.link(prev, 0, sink, 0).unwrap();
        (graph, src, sink)
    }

    #[test]
    fn passthrough_graph() {
        let (mut graph, src, sink) = chain(&[]);
        graph.configure().unwrap();
        assert_eq!(graph.sink_props(sink), graph.source_props(src));

        graph.push(src, Some(frame(0))).unwrap();
        assert_eq!(graph.pull(sink).unwrap().data, frame(0).data);
        assert!(matches!(graph.pull(sink), Err(Error::Again)));
    }

    #[test]
    fn transpose_swaps_negotiated_size() {
        let (mut graph, _, sink) = chain(&[("transpose", "dir=clock")]);
        graph.configure().unwrap();
        let props = graph.sink_props(sink).unwrap();
        assert_eq!((props.width, props.height), (2, 4));
    }

    #[test]
    fn two_transposes_keep_size() {
        let (mut graph, _, sink) = chain(&[("transpose", "clock"), ("transpose", "clock")]);
        graph.configure().unwrap();
        let props = graph.sink_props(sink).unwrap();
        assert_eq!((props.width, props.height), (4, 2));
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.link_count(), 3);
    }

    #[test]
    fn frames_flow_through_chain() {
        let (mut graph, src, sink) = chain(&[("transpose", "clock"), ("transpose", "clock")]);
        graph.configure().unwrap();

        graph.push(src, Some(frame(7))).unwrap();
        let out = graph.pull(sink).unwrap();
        assert_eq!(out.data, vec![8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(out.pts, Some(Pts(7)));
    }

    #[test]
    fn eof_reaches_sink_after_queued_frames() {
        let (mut graph, src, sink) = chain(&[("hflip", "")]);
        graph.configure().unwrap();

        graph.push(src, Some(frame(0))).unwrap();
        graph.push(src, Some(frame(1))).unwrap();
        graph.push(src, None).unwrap();

        assert_eq!(graph.pull(sink).unwrap().pts, Some(Pts(0)));
        assert_eq!(graph.pull(sink).unwrap().pts, Some(Pts(1)));
        assert!(matches!(graph.pull(sink), Err(Error::Eof)));
        assert!(matches!(graph.push(src, Some(frame(2))), Err(Error::Eof)));
    }

    #[test]
    fn push_rescales_foreign_time_base() {
        let (mut graph, src, sink) = chain(&[]);
        graph.configure().unwrap();

        let mut f = frame(0);
        f.pts = Some(Pts(2000));
        f.time_base = Rational::new(1, 1000);
        graph.push(src, Some(f)).unwrap();

        let out = graph.pull(sink).unwrap();
        assert_eq!(out.pts, Some(Pts(50)));
        assert_eq!(out.time_base, Rational::new(1, 25));
    }

    #[test]
    fn push_rejects_mismatched_frame() {
        let (mut graph, src, _) = chain(&[]);
        graph.configure().unwrap();
        let wrong = VideoFrame::blank(2, 4, PixelFormat::Gray8, Rational::new(1, 25));
        assert!(graph.push(src, Some(wrong)).is_err());
    }

    #[test]
    fn push_before_configure_fails() {
        let (mut graph, src, sink) = chain(&[]);
        assert!(graph.push(src, Some(frame(0))).is_err());
        assert!(graph.pull(sink).is_err());
    }

    #[test]
    fn unconnected_overlay_input_fails_configure() {
        let mut graph = FilterGraph::new();
        let src = graph.create_filter("buffer", "in", SRC_ARGS).unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        let overlay = graph.create_filter("overlay", "ov", "x=1:y=1").unwrap();
        graph.link(src, 0, overlay, 0).unwrap();
        graph.link(overlay, 0, sink, 0).unwrap();

        let err = graph.configure().unwrap_err();
        assert!(err.to_string().contains("input pad 1 of overlay"), "{err}");
        assert!(!graph.is_configured());
    }

    #[test]
    fn wired_overlay_composites() {
        let mut graph = FilterGraph::new();
        let main = graph.create_filter("buffer", "main", SRC_ARGS).unwrap();
        let logo = graph
            .create_filter("buffer", "logo", "video_size=1x1:pix_fmt=gray:time_base=1/25")
            .unwrap();
        let overlay = graph.create_filter("overlay", "ov", "x=3:y=1").unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        graph.link(main, 0, overlay, 0).unwrap();
        graph.link(logo, 0, overlay, 1).unwrap();
        graph.link(overlay, 0, sink, 0).unwrap();
        graph.configure().unwrap();

        // Main frames wait for the first overlay picture
        graph.push(main, Some(frame(0))).unwrap();
        assert!(matches!(graph.pull(sink), Err(Error::Again)));

        let dot = VideoFrame::new(vec![99], 1, 1, PixelFormat::Gray8, None, Rational::new(1, 25));
        graph.push(logo, Some(dot)).unwrap();
        assert_eq!(graph.pull(sink).unwrap().data, vec![1, 2, 3, 4, 5, 6, 7, 99]);

        // The last overlay picture is reused
        graph.push(main, Some(frame(1))).unwrap();
        assert_eq!(graph.pull(sink).unwrap().data[7], 99);
    }

    #[test]
    fn transpose_rejects_422_at_configure() {
        let mut graph = FilterGraph::new();
        let src = graph
            .create_filter("buffer", "in", "video_size=4x4:pix_fmt=yuv422p:time_base=1/25")
            .unwrap();
        let t = graph.create_filter("transpose", "t", "clock").unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();
        graph.link(src, 0, t, 0).unwrap();
        graph.link(t, 0, sink, 0).unwrap();

        assert!(matches!(
            graph.configure(),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn link_validation() {
        let mut graph = FilterGraph::new();
        let src = graph.create_filter("buffer", "in", SRC_ARGS).unwrap();
        let t = graph.create_filter("hflip", "flip", "").unwrap();
        let sink = graph.create_filter("buffersink", "out", "").unwrap();

        assert!(graph.link(src, 1, t, 0).is_err());
        assert!(graph.link(t, 0, t, 0).is_err());
        assert!(graph.link(sink, 0, t, 0).is_err());
        graph.link(src, 0, t, 0).unwrap();
        assert!(graph.link(src, 0, sink, 0).is_err());
        assert!(graph.create_filter("vflip", "flip", "").is_err());
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(src, t)]);
    }

    #[test]
    fn graph_needs_source_and_sink() {
        let mut graph = FilterGraph::new();
        graph.create_filter("buffersink", "out", "").ok();
        assert!(graph.configure().is_err());
    }

    #[test]
    fn configured_graph_is_sealed() {
        let (mut graph, _, _) = chain(&[]);
        graph.configure().unwrap();
        assert!(graph.create_filter("hflip", "late", "").is_err());
        assert!(graph.configure().is_err());
    }
}
