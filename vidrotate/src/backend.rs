/*!
    The media I/O collaborators a session is built from.
*/

use std::path::Path;

use ffmpeg_decode::{Decoder, VideoDecoderConfig};
use ffmpeg_encode::{Encoder, VideoEncoderConfig};
use ffmpeg_sink::{Muxer, SinkConfig};
use ffmpeg_source::{CodecConfig, Demuxer};
use ffmpeg_types::{Result, StreamDescriptor};

/**
    Opens the handles a [`TranscodeSession`](crate::TranscodeSession) owns.

    Every handle is released by dropping it.
*/
pub trait MediaBackend {
    fn open_input(&self, path: &Path) -> Result<Box<dyn Demuxer>>;

    fn open_decoder(
        &self,
        stream: CodecConfig,
        config: &VideoDecoderConfig,
    ) -> Result<Box<dyn Decoder>>;

    fn open_encoder(
        &self,
        descriptor: StreamDescriptor,
        config: &VideoEncoderConfig,
    ) -> Result<Box<dyn Encoder>>;

    fn create_output(&self, path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>>;
}

/**
    Native Y4M and rawvideo support, plus FFmpeg when the `ffmpeg`
    feature is enabled.
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBackend;

impl MediaBackend for DefaultBackend {
    fn open_input(&self, path: &Path) -> Result<Box<dyn Demuxer>> {
        ffmpeg_source::open(path)
    }

    fn open_decoder(
        &self,
        stream: CodecConfig,
        config: &VideoDecoderConfig,
    ) -> Result<Box<dyn Decoder>> {
        ffmpeg_decode::open(stream, config.clone())
    }

    fn open_encoder(
        &self,
        descriptor: StreamDescriptor,
        config: &VideoEncoderConfig,
    ) -> Result<Box<dyn Encoder>> {
        ffmpeg_encode::open(descriptor, config.clone())
    }

    fn create_output(&self, path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
        ffmpeg_sink::create(path, config)
    }
}

impl<B: MediaBackend + ?Sized> MediaBackend for &B {
    fn open_input(&self, path: &Path) -> Result<Box<dyn Demuxer>> {
        (**self).open_input(path)
    }

    fn open_decoder(
        &self,
        stream: CodecConfig,
        config: &VideoDecoderConfig,
    ) -> Result<Box<dyn Decoder>> {
        (**self).open_decoder(stream, config)
    }

    fn open_encoder(
        &self,
        descriptor: StreamDescriptor,
        config: &VideoEncoderConfig,
    ) -> Result<Box<dyn Encoder>> {
        (**self).open_encoder(descriptor, config)
    }

    fn create_output(&self, path: &Path, config: &SinkConfig) -> Result<Box<dyn Muxer>> {
        (**self).create_output(path, config)
    }
}
