#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ffmpeg_decode::{Decoder, VideoDecoderConfig};
use ffmpeg_encode::{Encoder, VideoEncoderConfig};
use ffmpeg_sink::{ContainerFormat, Muxer, SinkConfig};
use ffmpeg_source::{CodecConfig, Demuxer, Y4mDemuxer, Y4mHeader, y4m::format_to_colorspace};
use ffmpeg_types::{Error, Packet, PixelFormat, Rational, Result, StreamDescriptor, StreamInfo};
use vidrotate::{DefaultBackend, MediaBackend};

/**
    A deterministic test clip: every byte differs from its neighbours and
    from the same byte in the previous frame.
*/
pub fn clip(width: u32, height: u32, format: PixelFormat, frames: usize) -> Vec<Vec<u8>> {
    let size = format.frame_size(width, height);
    (0..frames)
        .map(|frame| {
            (0..size)
                .map(|i| ((i * 31 + frame * 7) % 251) as u8)
                .collect()
        })
        .collect()
}

pub fn write_y4m(
    path: &Path,
    width: u32,
    height: u32,
    fps: i32,
    format: PixelFormat,
    frames: &[Vec<u8>],
) {
    let colorspace = format_to_colorspace(format).unwrap();
    let mut bytes = format!("YUV4MPEG2 W{width} H{height} F{fps}:1 Ip C{colorspace}\n").into_bytes();
    for frame in frames {
        bytes.extend_from_slice(b"FRAME\n");
        bytes.extend_from_slice(frame);
    }
    fs::write(path, bytes).unwrap();
}

/**
    Write a clip to `dir/name` and return its path and frames.
*/
pub fn fixture(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    format: PixelFormat,
    frames: usize,
) -> (PathBuf, Vec<Vec<u8>>) {
    let path = dir.join(name);
    let data = clip(width, height, format, frames);
    write_y4m(&path, width, height, 25, format, &data);
    (path, data)
}

pub fn read_y4m(path: &Path) -> (Y4mHeader, Vec<Packet>) {
    let mut demuxer = Y4mDemuxer::open(path).unwrap();
    let mut packets = Vec::new();
    while let Some(packet) = demuxer.read_packet().unwrap() {
        packets.push(packet);
    }
    (demuxer.header().clone(), packets)
}

/**
    Wraps [`DefaultBackend`], counting live handles and recording every
    packet written to the output.
*/
#[derive(Clone, Debug, Default)]
pub struct CountingBackend {
    pub inputs_opened: Arc<AtomicUsize>,
    pub inputs_live: Arc<AtomicUsize>,
    pub outputs_live: Arc<AtomicUsize>,
    /// (stream index, pts) of every packet that reached the muxer.
    pub written: Arc<Mutex<Vec<(usize, Option<i64>)>>>,
    /// Fail `write_packet` once this many packets were written.
    pub fail_after: Option<usize>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(packets: usize) -> Self {
        Self {
            fail_after: Some(packets),
            ..Self::default()
        }
    }

    pub fn live_handles(&self) -> usize {
        self.inputs_live.load(Ordering::SeqCst) + self.outputs_live.load(Ordering::SeqCst)
    }

    pub fn written_pts(&self, stream: usize) -> Vec<i64> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .filter(|(index, _)| *index == stream)
            .filter_map(|(_, pts)| *pts)
            .collect()
    }
}

impl MediaBackend for CountingBackend {
    fn open_input(&self, path: &Path) -> Result<Box<dyn Demuxer>> {
        let inner = DefaultBackend.open_input(path)?;
        self.inputs_opened.fetch_add(1, Ordering::SeqCst);
        self.inputs_live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountedInput {
            inner,
            live: Arc::clone(&self.inputs_live),
        }))
    }

    fn open_decoder(
        &self,
        stream: CodecConfig,
        config: &VideoDecoderConfig,
    ) -> Result<Box<dyn Decoder>> {
        DefaultBackend.open_decoder(stream, config)
    }

    fn open_encoder(
        &self,
        descriptor: StreamDescriptor,
        config: &VideoEncoderConfig,
    ) -> Result<Box<dyn Encoder>> {
        DefaultBackend.open_encoder(descriptor, config)
    }

    fn create_output(&self, path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
        let inner = DefaultBackend.create_output(path, config)?;
        self.outputs_live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountedOutput {
            inner,
            live: Arc::clone(&self.outputs_live),
            written: Arc::clone(&self.written),
            fail_after: self.fail_after,
        }))
    }
}

struct CountedInput {
    inner: Box<dyn Demuxer>,
    live: Arc<AtomicUsize>,
}

impl Drop for CountedInput {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Demuxer for CountedInput {
    fn format_name(&self) -> &str {
        self.inner.format_name()
    }

    fn streams(&self) -> &[StreamInfo] {
        self.inner.streams()
    }

    fn best_video_stream(&self) -> Option<usize> {
        self.inner.best_video_stream()
    }

    fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        self.inner.codec_config(index)
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        self.inner.read_packet()
    }
}

struct CountedOutput {
    inner: Box<dyn Muxer>,
    live: Arc<AtomicUsize>,
    written: Arc<Mutex<Vec<(usize, Option<i64>)>>>,
    fail_after: Option<usize>,
}

impl Drop for CountedOutput {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Muxer for CountedOutput {
    fn format(&self) -> &ContainerFormat {
        self.inner.format()
    }

    fn needs_global_header(&self) -> bool {
        self.inner.needs_global_header()
    }

    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize> {
        self.inner.add_stream(config)
    }

    fn write_header(&mut self) -> Result<()> {
        self.inner.write_header()
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.inner.stream_time_base(index)
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        let mut written = self.written.lock().unwrap();
        if self.fail_after.is_some_and(|limit| written.len() >= limit) {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        written.push((packet.stream_index, packet.pts.map(|pts| pts.0)));
        drop(written);
        self.inner.write_packet(packet)
    }

    fn write_trailer(&mut self) -> Result<()> {
        self.inner.write_trailer()
    }
}
