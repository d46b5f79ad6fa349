/*!
    Video filter graphs for the ffmpeg crate ecosystem.

    This crate sits between decoder and encoder. It builds a small graph of
    named filters, negotiates the picture geometry on every link, and moves
    decoded frames through it.

    # Filters

    Filters are created by name with FFmpeg-style arguments:

    - `buffer`: graph input, `video_size=WxH:pix_fmt=NAME:time_base=N/D`
    - `buffersink`: graph output
    - `transpose`: `dir=cclock_flip|clock|cclock|clock_flip` (or `0..3`)
    - `hflip`, `vflip`: mirror horizontally or vertically
    - `overlay`: `x=X:y=Y`, composites its second input onto its first

    # Example

    ```ignore
    use ffmpeg_filter::{FilterGraph, FramePump};

    let mut graph = FilterGraph::new();
    let src = graph.create_filter("buffer", "in", "video_size=320x240:pix_fmt=yuv420p:time_base=1/25")?;
    let sink = graph.create_filter("buffersink", "out", "")?;
    let rotate = graph.create_filter("transpose", "rotate", "dir=clock")?;
    graph.link(src, 0, rotate, 0)?;
    graph.link(rotate, 0, sink, 0)?;
    graph.configure()?;

    let mut pump = FramePump::new(graph, src, sink)?;
    pump.push(frame)?;
    for filtered in pump.pull_all() {
        let filtered = filtered?;
        // 240x320 frame
    }
    ```
*/

pub use ffmpeg_types::{Error, PixelFormat, Result, VideoFrame};

mod filters;
mod graph;
mod kernels;
mod pump;

pub use filters::{LinkProps, TransposeDir};
pub use graph::{FilterGraph, NodeId};
pub use pump::{FramePump, PullAll};
