/*!
    Named filters and their argument strings.

    Arguments follow FFmpeg's syntax: `key=value` pairs separated by `:`,
    where leading values may omit their key and are assigned in the
    filter's positional order.
*/

use std::fmt;
use std::str::FromStr;

use ffmpeg_types::{Error, PixelFormat, Rational, Result};

/**
    Video properties carried by a link between two filters.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkProps {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub time_base: Rational,
}

impl LinkProps {
    /**
        The same properties with width and height exchanged.
    */
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..self
        }
    }
}

/**
    Direction of a `transpose` filter, numbered as FFmpeg numbers them.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransposeDir {
    /// Rotate counter-clockwise and flip vertically.
    CclockFlip = 0,
    /// Rotate 90 degrees clockwise.
    Clock = 1,
    /// Rotate 90 degrees counter-clockwise.
    Cclock = 2,
    /// Rotate clockwise and flip vertically.
    ClockFlip = 3,
}

impl TransposeDir {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CclockFlip => "cclock_flip",
            Self::Clock => "clock",
            Self::Cclock => "cclock",
            Self::ClockFlip => "clock_flip",
        }
    }
}

impl fmt::Display for TransposeDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransposeDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let dir = match s {
            "cclock_flip" | "0" => Self::CclockFlip,
            "clock" | "1" => Self::Clock,
            "cclock" | "2" => Self::Cclock,
            "clock_flip" | "3" => Self::ClockFlip,
            _ => {
                return Err(Error::invalid_data(format!(
                    "invalid transpose direction {s:?}"
                )));
            }
        };
        Ok(dir)
    }
}

/**
    A filter instance inside a graph.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Filter {
    /// Graph input fed by the caller.
    Buffer(LinkProps),
    /// Graph output drained by the caller.
    BufferSink,
    Transpose(TransposeDir),
    HFlip,
    VFlip,
    /// Composites input 1 onto input 0 at the given offset.
    Overlay { x: u32, y: u32 },
}

impl Filter {
    /**
        Instantiate the filter registered as `name` with FFmpeg-style `args`.
    */
    pub fn create(name: &str, args: &str) -> Result<Self> {
        let filter = match name {
            "buffer" => {
                let options = parse_options(
                    name,
                    args,
                    &["video_size", "pix_fmt", "time_base", "width", "height"],
                    3,
                )?;
                Self::Buffer(buffer_props(&options)?)
            }
            "buffersink" => {
                parse_options(name, args, &[], 0)?;
                Self::BufferSink
            }
            "transpose" => {
                let options = parse_options(name, args, &["dir"], 1)?;
                let dir = match lookup(&options, "dir") {
                    Some(value) => value.parse()?,
                    None => TransposeDir::CclockFlip,
                };
                Self::Transpose(dir)
            }
            "hflip" => {
                parse_options(name, args, &[], 0)?;
                Self::HFlip
            }
            "vflip" => {
                parse_options(name, args, &[], 0)?;
                Self::VFlip
            }
            "overlay" => {
                let options = parse_options(name, args, &["x", "y"], 2)?;
                let x = parse_offset(name, "x", lookup(&options, "x"))?;
                let y = parse_offset(name, "y", lookup(&options, "y"))?;
                Self::Overlay { x, y }
            }
            _ => return Err(Error::invalid_data(format!("no such filter: {name:?}"))),
        };
        Ok(filter)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::BufferSink => "buffersink",
            Self::Transpose(_) => "transpose",
            Self::HFlip => "hflip",
            Self::VFlip => "vflip",
            Self::Overlay { .. } => "overlay",
        }
    }

    pub fn input_pads(&self) -> usize {
        match self {
            Self::Buffer(_) => 0,
            Self::Overlay { .. } => 2,
            _ => 1,
        }
    }

    pub fn output_pads(&self) -> usize {
        match self {
            Self::BufferSink => 0,
            _ => 1,
        }
    }
}

type Options<'a> = Vec<(&'a str, &'a str)>;

fn lookup<'a>(options: &Options<'a>, key: &str) -> Option<&'a str> {
    options.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/**
    Split `args` into key/value pairs, naming positional values after the
    first `positional` entries of `keys`.
*/
fn parse_options<'a>(
    filter: &str,
    args: &'a str,
    keys: &[&'a str],
    positional: usize,
) -> Result<Options<'a>> {
    let mut options = Options::new();
    if args.trim().is_empty() {
        return Ok(options);
    }

    let mut seen_named = false;
    for (index, part) in args.split(':').enumerate() {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => {
                seen_named = true;
                let key = keys.iter().find(|k| **k == key.trim()).ok_or_else(|| {
                    Error::invalid_data(format!("{filter}: unknown option {:?}", key.trim()))
                })?;
                (*key, value.trim())
            }
            None if !seen_named && index < positional => (keys[index], part.trim()),
            None => {
                return Err(Error::invalid_data(format!(
                    "{filter}: unexpected argument {part:?}"
                )));
            }
        };
        if lookup(&options, key).is_some() {
            return Err(Error::invalid_data(format!(
                "{filter}: option {key:?} given twice"
            )));
        }
        options.push((key, value));
    }
    Ok(options)
}

fn buffer_props(options: &Options<'_>) -> Result<LinkProps> {
    let (width, height) = match lookup(options, "video_size") {
        Some(size) => parse_size(size)?,
        None => {
            let width = lookup(options, "width").map(parse_u32).transpose()?;
            let height = lookup(options, "height").map(parse_u32).transpose()?;
            match (width, height) {
                (Some(w), Some(h)) => (w, h),
                _ => return Err(Error::invalid_data("buffer: video size not set")),
            }
        }
    };
    if width == 0 || height == 0 {
        return Err(Error::invalid_data(format!(
            "buffer: invalid video size {width}x{height}"
        )));
    }

    let format = lookup(options, "pix_fmt")
        .ok_or_else(|| Error::invalid_data("buffer: pixel format not set"))?;
    let format = PixelFormat::from_name(format)
        .ok_or_else(|| Error::unsupported_format(format!("buffer: pixel format {format:?}")))?;

    let time_base = lookup(options, "time_base")
        .ok_or_else(|| Error::invalid_data("buffer: time base not set"))?
        .parse::<Rational>()?;
    if !time_base.is_positive() {
        return Err(Error::invalid_data(format!(
            "buffer: invalid time base {time_base}"
        )));
    }

    Ok(LinkProps {
        width,
        height,
        format,
        time_base,
    })
}

fn parse_size(size: &str) -> Result<(u32, u32)> {
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| Error::invalid_data(format!("invalid video size {size:?}")))?;
    Ok((parse_u32(w)?, parse_u32(h)?))
}

fn parse_u32(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_data(format!("invalid integer {value:?}")))
}

fn parse_offset(filter: &str, key: &str, value: Option<&str>) -> Result<u32> {
    match value {
        None => Ok(0),
        Some(v) => v.parse().map_err(|_| {
            Error::invalid_data(format!(
                "{filter}: {key} must be a non-negative integer, got {v:?}"
            ))
        }),
    }
}
