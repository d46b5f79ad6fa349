mod common;

use std::path::Path;
use std::sync::{Arc, Mutex};

use ffmpeg_decode::{Decoder, VideoDecoderConfig};
use ffmpeg_encode::{Encoder, VideoEncoderConfig};
use ffmpeg_sink::{ContainerFormat, Muxer, SinkConfig};
use ffmpeg_source::{CodecConfig, Demuxer};
use ffmpeg_types::{
    CodecId, MediaDuration, Packet, PixelFormat, Pts, Rational, Result, StreamDescriptor,
    StreamInfo, StreamType,
};
use tempfile::tempdir;
use vidrotate::{DefaultBackend, MediaBackend, SessionConfig, TransformSpec, transcode_with};

use common::fixture;

const AUDIO_TB: Rational = Rational::new(1, 48000);

static FORMAT: ContainerFormat = ContainerFormat::Mkv;

/// (output stream, pts, dts, kind) of every packet the muxer received.
type Log = Arc<Mutex<Vec<(usize, Option<i64>, Option<i64>, StreamType)>>>;

/**
    A Y4M clip whose container also holds an AAC stream at index 0, so the
    video is input stream 1. One audio packet follows every picture, with
    the given dts values.
*/
struct AudioFirstInput {
    video: Box<dyn Demuxer>,
    streams: Vec<StreamInfo>,
    audio_dts: std::vec::IntoIter<i64>,
    pending: Option<Packet>,
}

impl Demuxer for AudioFirstInput {
    fn format_name(&self) -> &str {
        "matroska"
    }

    fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    fn best_video_stream(&self) -> Option<usize> {
        Some(1)
    }

    fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        match index {
            0 => Some(CodecConfig::opaque(StreamType::Audio, CodecId::Aac, AUDIO_TB)),
            1 => self.video.codec_config(0),
            _ => None,
        }
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        if let Some(packet) = self.pending.take() {
            return Ok(Some(packet));
        }
        let Some(mut packet) = self.video.read_packet()? else {
            return Ok(None);
        };
        packet.stream_index = 1;
        self.pending = self.audio_dts.next().map(|dts| {
            Packet::new(
                vec![0xA5; 8],
                0,
                Some(Pts(dts)),
                Some(Pts(dts)),
                MediaDuration(1024),
                AUDIO_TB,
                true,
                StreamType::Audio,
            )
        });
        Ok(Some(packet))
    }
}

/// Accepts any stream and logs what it is given.
struct RecordingMuxer {
    time_bases: Vec<Rational>,
    log: Log,
}

impl Muxer for RecordingMuxer {
    fn format(&self) -> &ContainerFormat {
        &FORMAT
    }

    fn add_stream(&mut self, config: &CodecConfig) -> Result<usize> {
        self.time_bases.push(config.time_base);
        Ok(self.time_bases.len() - 1)
    }

    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn stream_time_base(&self, index: usize) -> Option<Rational> {
        self.time_bases.get(index).copied()
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        self.log.lock().unwrap().push((
            packet.stream_index,
            packet.pts.map(|p| p.0),
            packet.dts.map(|p| p.0),
            packet.stream_type,
        ));
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<()> {
        Ok(())
    }
}

struct CopyBackend {
    audio_dts: Vec<i64>,
    log: Log,
}

impl MediaBackend for CopyBackend {
    fn open_input(&self, path: &Path) -> Result<Box<dyn Demuxer>> {
        let video = DefaultBackend.open_input(path)?;
        let mut video_info = video.streams()[0].clone();
        video_info.index = 1;
        let audio_info = StreamInfo {
            index: 0,
            stream_type: StreamType::Audio,
            codec: CodecId::Aac,
            time_base: AUDIO_TB,
            video: None,
        };
        Ok(Box::new(AudioFirstInput {
            video,
            streams: vec![audio_info, video_info],
            audio_dts: self.audio_dts.clone().into_iter(),
            pending: None,
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

    fn create_output(&self, _path: &Path, _config: &SinkConfig) -> Result<Box<dyn Muxer>> {
        Ok(Box::new(RecordingMuxer {
            time_bases: Vec::new(),
            log: Arc::clone(&self.log),
        }))
    }
}

#[test]
fn audio_is_copied_next_to_the_rotated_video() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 8, 4, PixelFormat::Yuv420p, 5);
    let log = Log::default();
    let backend = CopyBackend {
        audio_dts: vec![0, 1024, 2048, 3072, 4096],
        log: Arc::clone(&log),
    };

    let report = transcode_with(
        backend,
        &input,
        dir.path().join("out.mkv"),
        TransformSpec::rotate(90).unwrap(),
        SessionConfig::default(),
    )
    .unwrap();

    assert_eq!(report.frames_encoded, 5);
    assert_eq!(report.packets_written, 5);
    assert_eq!(report.packets_copied, 5);
    assert_eq!(report.packets_dropped, 0);

    // The encoded video is declared first, so input audio 0 becomes output 1
    let log = log.lock().unwrap();
    let expected: Vec<_> = (0..5)
        .flat_map(|i| {
            [
                (0, Some(i), Some(i), StreamType::Video),
                (1, Some(i * 1024), Some(i * 1024), StreamType::Audio),
            ]
        })
        .collect();
    assert_eq!(*log, expected);
}

#[test]
fn copied_packets_with_backwards_dts_are_dropped() {
    let dir = tempdir().unwrap();
    let (input, _) = fixture(dir.path(), "in.y4m", 8, 4, PixelFormat::Gray8, 5);
    let log = Log::default();
    let backend = CopyBackend {
        audio_dts: vec![0, 1024, 2048, 1024, 3072],
        log: Arc::clone(&log),
    };

    let report = transcode_with(
        backend,
        &input,
        dir.path().join("out.mkv"),
        TransformSpec::rotate(270).unwrap(),
        SessionConfig::default(),
    )
    .unwrap();

    assert_eq!(report.packets_copied, 4);
    assert_eq!(report.packets_dropped, 1);
    assert_eq!(report.packets_written, 5);

    let log = log.lock().unwrap();
    let audio: Vec<_> = log
        .iter()
        .filter(|(_, _, _, kind)| *kind == StreamType::Audio)
        .map(|(index, _, dts, _)| (*index, *dts))
        .collect();
    assert_eq!(
        audio,
        vec![(1, Some(0)), (1, Some(1024)), (1, Some(2048)), (1, Some(3072))]
    );

    let video_pts: Vec<_> = log
        .iter()
        .filter(|(index, ..)| *index == 0)
        .map(|(_, pts, ..)| pts.unwrap())
        .collect();
    assert_eq!(video_pts, vec![0, 1, 2, 3, 4]);
}
