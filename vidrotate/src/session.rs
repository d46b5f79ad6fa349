/*!
    One transcode run: input, decoder, filter graph, encoder and output,
    driven packet by packet.
*/

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use ffmpeg_decode::{Decoder, VideoDecoderConfig};
use ffmpeg_encode::{Encoder, VideoEncoderConfig};
use ffmpeg_filter::FramePump;
use ffmpeg_sink::{Muxer, SinkConfig};
use ffmpeg_source::Demuxer;
use ffmpeg_types::{Error as MediaError, Packet, StreamDescriptor, StreamType, VideoFrame};

use crate::backend::{DefaultBackend, MediaBackend};
use crate::cancel::CancellationToken;
use crate::error::{PipelineError, Result};
use crate::graph;
use crate::rebase::{DtsGuard, VideoTimestamps};
use crate::transform::TransformSpec;

/**
    Lifecycle of a [`TranscodeSession`].

    `Failed` is reachable from every state except `Closed` and carries the
    [`PipelineError::status_code`] of the failure. A session closed or
    dropped before it finished fails with [`PipelineError::CANCELLED`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Opened,
    Configured,
    Running,
    Finalized,
    Closed,
    Failed(i32),
}

impl SessionState {
    /// Resources may be held and the output is not complete.
    fn is_in_progress(self) -> bool {
        matches!(self, Self::Opened | Self::Configured | Self::Running)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub decoder: VideoDecoderConfig,
    pub encoder: VideoEncoderConfig,
    pub sink: SinkConfig,
    /// Leave an unfinished output file behind when the run fails.
    pub keep_partial_output: bool,
    /// Checked between packets.
    pub cancel: CancellationToken,
}

/**
    Summary of a finished run.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub frames_decoded: u64,
    pub frames_encoded: u64,
    /// Encoded video packets written to the output.
    pub packets_written: u64,
    /// Packets of non-video streams written unchanged.
    pub packets_copied: u64,
    /// Copied packets dropped because their dts went backwards.
    pub packets_dropped: u64,
    pub output: StreamDescriptor,
}

#[derive(Debug, Default)]
struct Stats {
    frames_decoded: u64,
    frames_encoded: u64,
    packets_written: u64,
    packets_copied: u64,
    packets_dropped: u64,
}

/// What happens to packets of one input stream.
#[derive(Debug)]
enum Route {
    Video,
    Copy { output: usize, guard: DtsGuard },
    Discard,
}

struct OutputFile {
    muxer: Box<dyn Muxer>,
    path: PathBuf,
}

impl OutputFile {
    fn write(&mut self, packet: Packet) -> Result<()> {
        self.muxer
            .write_packet(packet)
            .map_err(|e| PipelineError::mux(&self.path, e))
    }
}

/**
    The decode, filter and encode chain of the transformed video stream.
*/
struct VideoChain {
    decoder: Box<dyn Decoder>,
    pump: FramePump,
    encoder: Box<dyn Encoder>,
    timestamps: VideoTimestamps,
    output_index: usize,
}

impl VideoChain {
    fn decode(&mut self, packet: &Packet, out: &mut OutputFile, stats: &mut Stats) -> Result<()> {
        if packet.data.is_empty() {
            debug!(pts = ?packet.pts, "skipping empty video packet");
            return Ok(());
        }
        loop {
            match self.decoder.send_packet(packet) {
                Ok(()) => break,
                Err(MediaError::Again) => {
                    if self.drain_decoder(out, stats)? == 0 {
                        return Err(PipelineError::codec(
                            "decode",
                            MediaError::codec("decoder refused input without producing output"),
                        ));
                    }
                }
                Err(e) => return Err(PipelineError::codec("decode", e)),
            }
        }
        self.drain_decoder(out, stats)?;
        Ok(())
    }

    fn drain_decoder(&mut self, out: &mut OutputFile, stats: &mut Stats) -> Result<usize> {
        let mut count = 0;
        loop {
            let frame = match self.decoder.receive_frame() {
                Ok(frame) => frame,
                Err(e) if e.is_transient() => return Ok(count),
                Err(e) => return Err(PipelineError::codec("decode", e)),
            };
            count += 1;
            stats.frames_decoded += 1;

            self.pump
                .push(frame)
                .map_err(|e| PipelineError::codec("filter", e))?;
            self.drain_graph(out, stats)?;
        }
    }

    fn drain_graph(&mut self, out: &mut OutputFile, stats: &mut Stats) -> Result<()> {
        let Self {
            pump,
            encoder,
            timestamps,
            output_index,
            ..
        } = self;
        for frame in pump.pull_all() {
            let mut frame = frame.map_err(|e| PipelineError::codec("filter", e))?;
            timestamps.rebase(&mut frame);
            encode_frame(encoder.as_mut(), &frame, *output_index, out, stats)?;
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut OutputFile, stats: &mut Stats) -> Result<()> {
        self.decoder
            .send_eof()
            .map_err(|e| PipelineError::codec("decode", e))?;
        self.drain_decoder(out, stats)?;

        self.pump
            .push_eof()
            .map_err(|e| PipelineError::codec("filter", e))?;
        self.drain_graph(out, stats)?;

        self.encoder
            .send_eof()
            .map_err(|e| PipelineError::codec("encode", e))?;
        drain_encoder(self.encoder.as_mut(), self.output_index, out, stats)?;
        Ok(())
    }
}

fn encode_frame(
    encoder: &mut dyn Encoder,
    frame: &VideoFrame,
    output_index: usize,
    out: &mut OutputFile,
    stats: &mut Stats,
) -> Result<()> {
    loop {
        match encoder.send_frame(frame) {
            Ok(()) => break,
            Err(MediaError::Again) => {
                if drain_encoder(encoder, output_index, out, stats)? == 0 {
                    return Err(PipelineError::codec(
                        "encode",
                        MediaError::codec("encoder refused input without producing output"),
                    ));
                }
            }
            Err(e) => return Err(PipelineError::codec("encode", e)),
        }
    }
    stats.frames_encoded += 1;
    drain_encoder(encoder, output_index, out, stats)?;
    Ok(())
}

fn drain_encoder(
    encoder: &mut dyn Encoder,
    output_index: usize,
    out: &mut OutputFile,
    stats: &mut Stats,
) -> Result<usize> {
    let mut count = 0;
    loop {
        let mut packet = match encoder.receive_packet() {
            Ok(packet) => packet,
            Err(e) if e.is_transient() => return Ok(count),
            Err(e) => return Err(PipelineError::codec("encode", e)),
        };
        packet.stream_index = output_index;
        out.write(packet)?;
        count += 1;
        stats.packets_written += 1;
    }
}

/**
    Transforms the best video stream of one input into one output file.

    Drive it step by step with [`open`](Self::open),
    [`configure`](Self::configure), [`run`](Self::run) and
    [`close`](Self::close), or all at once with [`execute`](Self::execute).
    A failing step releases every handle the session holds and removes the
    unfinished output file; the session is then `Failed`.
*/
pub struct TranscodeSession<B = DefaultBackend> {
    backend: B,
    input_path: PathBuf,
    output_path: PathBuf,
    transform: TransformSpec,
    config: SessionConfig,
    state: SessionState,
    input: Option<Box<dyn Demuxer>>,
    video: Option<VideoChain>,
    output: Option<OutputFile>,
    output_descriptor: Option<StreamDescriptor>,
    output_created: bool,
    routes: Vec<Route>,
    stats: Stats,
}

impl TranscodeSession<DefaultBackend> {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        transform: TransformSpec,
        config: SessionConfig,
    ) -> Self {
        Self::with_backend(DefaultBackend, input, output, transform, config)
    }
}

impl<B: MediaBackend> TranscodeSession<B> {
    pub fn with_backend(
        backend: B,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        transform: TransformSpec,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            input_path: input.into(),
            output_path: output.into(),
            transform,
            config,
            state: SessionState::Created,
            input: None,
            video: None,
            output: None,
            output_descriptor: None,
            output_created: false,
            routes: Vec::new(),
            stats: Stats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /**
        Run every step to completion and close the session.
    */
    #[instrument(
        name = "session",
        skip_all,
        fields(
            input = %self.input_path.display(),
            output = %self.output_path.display(),
            transform = %self.transform,
        )
    )]
    pub fn execute(mut self) -> Result<SessionReport> {
        self.open()?;
        self.configure()?;
        self.run()?;
        let report = self.report()?;
        self.close();
        Ok(report)
    }

    /**
        `Created -> Opened`: open the input container.
    */
    pub fn open(&mut self) -> Result<()> {
        self.step(SessionState::Created, SessionState::Opened, Self::open_input)
    }

    /**
        `Opened -> Configured`: open decoder, filter graph, output and
        encoder, declare the output streams and write the header.
    */
    pub fn configure(&mut self) -> Result<()> {
        self.step(
            SessionState::Opened,
            SessionState::Configured,
            Self::configure_pipeline,
        )
    }

    /**
        `Configured -> Finalized`: move every packet, flush all stages and
        write the trailer.
    */
    pub fn run(&mut self) -> Result<()> {
        self.step(SessionState::Configured, SessionState::Finalized, |s| {
            s.transition(SessionState::Running);
            s.process_packets()?;
            s.finish()
        })
    }

    /**
        Release every handle. Closing an unfinished session removes its
        output, like a failure would.
    */
    pub fn close(&mut self) {
        match self.state {
            SessionState::Closed | SessionState::Failed(_) => {}
            state if state.is_in_progress() => self.abort(PipelineError::CANCELLED),
            _ => {
                self.release();
                self.transition(SessionState::Closed);
            }
        }
    }

    /**
        The summary of a finalized session.
    */
    pub fn report(&self) -> Result<SessionReport> {
        let output = match (self.state, self.output_descriptor) {
            (SessionState::Finalized | SessionState::Closed, Some(output)) => output,
            _ => return Err(self.out_of_order("report")),
        };
        Ok(SessionReport {
            frames_decoded: self.stats.frames_decoded,
            frames_encoded: self.stats.frames_encoded,
            packets_written: self.stats.packets_written,
            packets_copied: self.stats.packets_copied,
            packets_dropped: self.stats.packets_dropped,
            output,
        })
    }

    fn step(
        &mut self,
        from: SessionState,
        to: SessionState,
        f: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if self.state != from {
            return Err(self.out_of_order(&to.to_string()));
        }
        match f(self) {
            Ok(()) => {
                self.transition(to);
                Ok(())
            }
            Err(e) => {
                warn!(state = %self.state, error = %e, "session failed");
                self.abort(e.status_code());
                Err(e)
            }
        }
    }

    fn out_of_order(&self, action: &str) -> PipelineError {
        PipelineError::invalid_argument(format!(
            "session cannot go to {action} while {}",
            self.state
        ))
    }

    fn transition(&mut self, to: SessionState) {
        debug!(from = %self.state, %to, "session transition");
        self.state = to;
    }

    fn open_input(&mut self) -> Result<()> {
        let input = self
            .backend
            .open_input(&self.input_path)
            .map_err(|e| PipelineError::io(&self.input_path, e))?;
        info!(
            format = input.format_name(),
            streams = input.streams().len(),
            "opened input"
        );
        self.input = Some(input);
        Ok(())
    }

    fn configure_pipeline(&mut self) -> Result<()> {
        let Some(input) = self.input.as_ref() else {
            return Err(self.out_of_order("configure"));
        };
        let not_found = || PipelineError::StreamNotFound {
            path: self.input_path.clone(),
        };

        let video_index = input.best_video_stream().ok_or_else(not_found)?;
        let stream = input
            .codec_config(video_index)
            .filter(|config| config.video.is_some())
            .ok_or_else(not_found)?;
        let input_descriptor = stream.video.ok_or_else(not_found)?;
        info!(
            index = video_index,
            codec = input_descriptor.codec.name(),
            width = input_descriptor.width,
            height = input_descriptor.height,
            pix_fmt = input_descriptor.format.name(),
            "selected video stream"
        );

        let decoder = self
            .backend
            .open_decoder(stream, &self.config.decoder)
            .map_err(|e| PipelineError::codec("open decoder", e))?;

        let built = graph::build(&input_descriptor, &self.transform)?;
        info!(filters = %built.description, "filter graph configured");

        let muxer = self
            .backend
            .create_output(&self.output_path, &self.config.sink)
            .map_err(|e| PipelineError::mux(&self.output_path, e))?;
        self.output_created = true;
        let mut out = OutputFile {
            muxer,
            path: self.output_path.clone(),
        };

        let mut target = built.output;
        if let Some(rate) = target.frame_rate.filter(|r| r.num > 0 && r.den > 0) {
            target.time_base = rate.invert();
        }
        let mut encoder_config = self.config.encoder.clone();
        encoder_config.global_header = out.muxer.needs_global_header();
        let encoder = self
            .backend
            .open_encoder(target, &encoder_config)
            .map_err(|e| PipelineError::codec("open encoder", e))?;
        let output_descriptor = *encoder.descriptor();

        let output_index = out
            .muxer
            .add_stream(&encoder.codec_config())
            .map_err(|e| PipelineError::mux(&self.output_path, e))?;

        let mut routes = Vec::with_capacity(input.streams().len());
        for info in input.streams() {
            let route = if info.index == video_index {
                Route::Video
            } else if info.stream_type == StreamType::Video {
                debug!(index = info.index, "ignoring additional video stream");
                Route::Discard
            } else {
                match input.codec_config(info.index) {
                    None => Route::Discard,
                    Some(config) => match out.muxer.add_stream(&config) {
                        Ok(output) => {
                            debug!(
                                index = info.index,
                                output,
                                codec = config.codec.name(),
                                "copying stream"
                            );
                            Route::Copy {
                                output,
                                guard: DtsGuard::new(),
                            }
                        }
                        Err(MediaError::UnsupportedFormat { message }) => {
                            warn!(
                                index = info.index,
                                kind = info.stream_type.name(),
                                reason = %message,
                                "dropping stream the output cannot carry"
                            );
                            Route::Discard
                        }
                        Err(e) => return Err(PipelineError::mux(&self.output_path, e)),
                    },
                }
            };
            routes.push(route);
        }

        out.muxer
            .write_header()
            .map_err(|e| PipelineError::mux(&self.output_path, e))?;
        info!(
            codec = output_descriptor.codec.name(),
            width = output_descriptor.width,
            height = output_descriptor.height,
            "wrote output header"
        );

        self.video = Some(VideoChain {
            timestamps: VideoTimestamps::new(
                output_descriptor.time_base,
                output_descriptor.frame_duration(),
            ),
            decoder,
            pump: built.pump,
            encoder,
            output_index,
        });
        self.output = Some(out);
        self.output_descriptor = Some(output_descriptor);
        self.routes = routes;
        Ok(())
    }

    fn process_packets(&mut self) -> Result<()> {
        loop {
            if self.config.cancel.is_cancelled() {
                info!("cancelled");
                return Err(PipelineError::Cancelled);
            }

            let Self {
                input,
                video,
                output,
                routes,
                stats,
                input_path,
                ..
            } = self;
            let (Some(input), Some(video), Some(out)) = (input, video, output) else {
                return Err(PipelineError::invalid_argument("session is not configured"));
            };

            let Some(mut packet) = input
                .read_packet()
                .map_err(|e| PipelineError::io(input_path.as_path(), e))?
            else {
                return Ok(());
            };

            match routes.get_mut(packet.stream_index) {
                Some(Route::Video) => video.decode(&packet, out, stats)?,
                Some(Route::Copy { output, guard }) => {
                    if !guard.admit(&packet) {
                        warn!(
                            stream = packet.stream_index,
                            dts = ?packet.dts,
                            "dropping packet with non-monotonic dts"
                        );
                        stats.packets_dropped += 1;
                        continue;
                    }
                    packet.stream_index = *output;
                    out.write(packet)?;
                    stats.packets_copied += 1;
                }
                Some(Route::Discard) | None => {}
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        let (Some(video), Some(out)) = (self.video.as_mut(), self.output.as_mut()) else {
            return Err(PipelineError::invalid_argument("session is not configured"));
        };
        video.flush(out, &mut self.stats)?;
        out.muxer
            .write_trailer()
            .map_err(|e| PipelineError::mux(&self.output_path, e))?;

        info!(
            frames_decoded = self.stats.frames_decoded,
            frames_encoded = self.stats.frames_encoded,
            packets_written = self.stats.packets_written,
            packets_copied = self.stats.packets_copied,
            "finalized output"
        );
        Ok(())
    }
}

impl<B> TranscodeSession<B> {
    fn release(&mut self) {
        // Output first, so the file is closed before it may be removed
        self.output = None;
        self.video = None;
        self.input = None;
        self.routes.clear();
    }

    fn abort(&mut self, status: i32) {
        self.release();

        if self.output_created && !self.config.keep_partial_output {
            match std::fs::remove_file(&self.output_path) {
                Ok(()) => debug!(path = %self.output_path.display(), "removed partial output"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %self.output_path.display(),
                    error = %e,
                    "failed to remove partial output"
                ),
            }
        }
        self.output_created = false;
        self.state = SessionState::Failed(status);
    }
}

impl<B> Drop for TranscodeSession<B> {
    fn drop(&mut self) {
        if self.state.is_in_progress() {
            self.abort(PipelineError::CANCELLED);
        }
    }
}

impl<B> fmt::Debug for TranscodeSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeSession")
            .field("input", &self.input_path)
            .field("output", &self.output_path)
            .field("transform", &self.transform)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
