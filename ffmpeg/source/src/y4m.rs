/*!
    YUV4MPEG2 demuxing.

    A Y4M file is a single text header line followed by frames, each one
    a `FRAME` line and the raw planes of one picture:

    ```text
    YUV4MPEG2 W320 H240 F25:1 Ip A1:1 C420jpeg
    FRAME
    <width * height * 3 / 2 bytes>
    FRAME
    ...
    ```
*/

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use ffmpeg_types::{
    CodecId, Error, MediaDuration, Packet, PixelFormat, Pts, Rational, Result, StreamDescriptor,
    StreamInfo, StreamType, check_picture_size,
};

use crate::{CodecConfig, Demuxer};

/// Signature every Y4M file starts with.
pub const MAGIC: &[u8] = b"YUV4MPEG2";

const FRAME_TAG: &[u8] = b"FRAME";

// Header and frame lines are short; anything longer is not Y4M
const MAX_LINE_LEN: usize = 4096;

/**
    Parsed stream header of a YUV4MPEG2 file.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Y4mHeader {
    pub width: u32,
    pub height: u32,
    /// Frames per second, as declared by the `F` field.
    pub frame_rate: Rational,
    pub format: PixelFormat,
    /// Interlacing mode character from the `I` field (`p`, `t`, `b`, `m`).
    pub interlace: Option<char>,
    /// Pixel aspect ratio from the `A` field.
    pub aspect: Option<Rational>,
    /// `X` fields, kept verbatim without the leading `X`.
    pub extensions: Vec<String>,
}

impl Y4mHeader {
    /**
        Header for a progressive stream with no other optional fields.
    */
    pub fn new(width: u32, height: u32, frame_rate: Rational, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            frame_rate,
            format,
            interlace: Some('p'),
            aspect: None,
            extensions: Vec::new(),
        }
    }

    /**
        Parse a header line, with or without its trailing newline.
    */
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.trim_end_matches(['\n', '\r']).split(' ');
        if tokens.next().map(str::as_bytes) != Some(MAGIC) {
            return Err(Error::invalid_data("missing YUV4MPEG2 signature"));
        }

        let mut width = None;
        let mut height = None;
        let mut frame_rate = None;
        let mut format = PixelFormat::Yuv420p;
        let mut interlace = None;
        let mut aspect = None;
        let mut extensions = Vec::new();

        for token in tokens.filter(|t| !t.is_empty()) {
            let mut chars = token.chars();
            let tag = chars.next();
            let value = chars.as_str();
            match tag {
                Some('W') => width = Some(parse_dimension("width", value)?),
                Some('H') => height = Some(parse_dimension("height", value)?),
                Some('F') => frame_rate = Some(value.parse::<Rational>()?),
                Some('I') => interlace = value.chars().next(),
                Some('A') => {
                    // A0:0 means unknown
                    let ratio = value.parse::<Rational>().ok();
                    aspect = ratio.filter(|r| r.is_positive());
                }
                Some('C') => format = colorspace_to_format(value)?,
                Some('X') => extensions.push(value.to_owned()),
                _ => {
                    return Err(Error::invalid_data(format!(
                        "unknown Y4M header field {token:?}"
                    )));
                }
            }
        }

        let width = width.ok_or_else(|| Error::invalid_data("Y4M header has no width"))?;
        let height = height.ok_or_else(|| Error::invalid_data("Y4M header has no height"))?;
        check_picture_size(width, height)?;
        let frame_rate =
            frame_rate.ok_or_else(|| Error::invalid_data("Y4M header has no frame rate"))?;
        if !frame_rate.is_positive() {
            return Err(Error::invalid_data(format!(
                "Y4M frame rate {frame_rate} is not positive"
            )));
        }

        Ok(Self {
            width,
            height,
            frame_rate,
            format,
            interlace,
            aspect,
            extensions,
        })
    }

    /**
        Timestamps in a Y4M stream count frames, so the time base is the
        inverse of the frame rate.

        # Panics

        Panics if the frame rate is zero. Parsed headers never are.
    */
    pub fn time_base(&self) -> Rational {
        self.frame_rate.invert()
    }

    /**
        Size in bytes of one frame payload.
    */
    pub fn frame_size(&self) -> usize {
        self.format.frame_size(self.width, self.height)
    }

    /**
        Describe the stream this header declares.
    */
    pub fn descriptor(&self) -> Result<StreamDescriptor> {
        if !self.frame_rate.is_positive() {
            return Err(Error::invalid_data(format!(
                "Y4M frame rate {} is not positive",
                self.frame_rate
            )));
        }
        let descriptor = StreamDescriptor::new(
            self.width,
            self.height,
            self.format,
            self.time_base(),
            CodecId::RawVideo,
        )?;
        Ok(descriptor.with_frame_rate(self.frame_rate))
    }
}

impl fmt::Display for Y4mHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "YUV4MPEG2 W{} H{} F{}:{}",
            self.width, self.height, self.frame_rate.num, self.frame_rate.den
        )?;
        if let Some(interlace) = self.interlace {
            write!(f, " I{interlace}")?;
        }
        if let Some(aspect) = self.aspect {
            write!(f, " A{}:{}", aspect.num, aspect.den)?;
        }
        // Formats without a Y4M name are rejected before a header is written
        if let Some(colorspace) = format_to_colorspace(self.format) {
            write!(f, " C{colorspace}")?;
        }
        for extension in &self.extensions {
            write!(f, " X{extension}")?;
        }
        Ok(())
    }
}

fn parse_dimension(name: &str, value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::invalid_data(format!("invalid Y4M {name} {value:?}"))),
    }
}

/**
    Map a Y4M `C` value to a pixel format.
*/
pub fn colorspace_to_format(colorspace: &str) -> Result<PixelFormat> {
    let format = match colorspace {
        "420jpeg" | "420paldv" | "420mpeg2" | "420" => PixelFormat::Yuv420p,
        "422" => PixelFormat::Yuv422p,
        "444" => PixelFormat::Yuv444p,
        "mono" => PixelFormat::Gray8,
        "420p10" => PixelFormat::Yuv420p10,
        other => {
            return Err(Error::unsupported_format(format!(
                "Y4M colour space {other:?}"
            )));
        }
    };
    Ok(format)
}

/**
    Map a pixel format to its Y4M `C` value, if Y4M can carry it.
*/
pub fn format_to_colorspace(format: PixelFormat) -> Option<&'static str> {
    match format {
        PixelFormat::Yuv420p => Some("420jpeg"),
        PixelFormat::Yuv422p => Some("422"),
        PixelFormat::Yuv444p => Some("444"),
        PixelFormat::Gray8 => Some("mono"),
        PixelFormat::Yuv420p10 => Some("420p10"),
        _ => None,
    }
}

/**
    Returns true if the file at `path` starts with the Y4M signature.

    Fails with an I/O error if the file cannot be opened.
*/
pub fn sniff(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; MAGIC.len()];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == MAGIC),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/**
    Demuxer for YUV4MPEG2 input.

    Exposes a single raw video stream. Every frame becomes one keyframe
    packet whose pts and dts equal the frame index.
*/
pub struct Y4mDemuxer<R> {
    reader: R,
    header: Y4mHeader,
    streams: Vec<StreamInfo>,
    descriptor: StreamDescriptor,
    next_frame: i64,
    line: Vec<u8>,
}

impl Y4mDemuxer<BufReader<File>> {
    /**
        Open a Y4M file.
    */
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> Y4mDemuxer<R> {
    /**
        Read the stream header from `reader` and prepare to read frames.
    */
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let mut line = Vec::new();
        if !read_line(&mut reader, &mut line)? {
            return Err(Error::invalid_data("empty Y4M input"));
        }
        let text = std::str::from_utf8(&line)
            .map_err(|_| Error::invalid_data("Y4M header is not valid UTF-8"))?;
        let header = Y4mHeader::parse(text)?;
        let descriptor = header.descriptor()?;

        let streams = vec![StreamInfo {
            index: 0,
            stream_type: StreamType::Video,
            codec: CodecId::RawVideo,
            time_base: descriptor.time_base,
            video: Some(descriptor),
        }];

        Ok(Self {
            reader,
            header,
            streams,
            descriptor,
            next_frame: 0,
            line,
        })
    }

    /**
        The parsed stream header.
    */
    pub fn header(&self) -> &Y4mHeader {
        &self.header
    }
}

impl<R: BufRead> Demuxer for Y4mDemuxer<R> {
    fn format_name(&self) -> &str {
        "yuv4mpegpipe"
    }

    fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    fn best_video_stream(&self) -> Option<usize> {
        Some(0)
    }

    fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        (index == 0).then(|| CodecConfig::video(self.descriptor))
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        if !read_line(&mut self.reader, &mut self.line)? {
            return Ok(None);
        }
        if !self.line.starts_with(FRAME_TAG) {
            return Err(Error::invalid_data(format!(
                "expected FRAME marker before frame {}",
                self.next_frame
            )));
        }

        let frame_size = self
            .header
            .format
            .checked_frame_size(self.header.width, self.header.height)
            .ok_or_else(|| Error::invalid_data("Y4M frame size overflows"))?;

        // Grow with the data actually present instead of trusting the header
        let mut data = Vec::new();
        self.reader
            .by_ref()
            .take(frame_size as u64)
            .read_to_end(&mut data)?;
        if data.len() != frame_size {
            return Err(Error::invalid_data(format!(
                "truncated Y4M frame {}",
                self.next_frame
            )));
        }

        let pts = Pts(self.next_frame);
        self.next_frame += 1;

        Ok(Some(Packet::new(
            data,
            0,
            Some(pts),
            Some(pts),
            MediaDuration(1),
            self.descriptor.time_base,
            true,
            StreamType::Video,
        )))
    }
}

/**
    Read one `\n` terminated line into `line`, without the terminator.

    Returns `Ok(false)` if the input was already exhausted.
*/
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> Result<bool> {
    line.clear();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64 + 1)
        .read_until(b'\n', line)?;
    if read == 0 {
        return Ok(false);
    }
    if line.last() != Some(&b'\n') {
        return Err(Error::invalid_data("unterminated or oversized Y4M line"));
    }
    line.pop();
    Ok(true)
}
