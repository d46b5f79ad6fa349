/*!
    The transforms a session can apply to a video stream.
*/

use std::fmt;
use std::path::PathBuf;

use ffmpeg_filter::TransposeDir;
use ffmpeg_types::StreamDescriptor;

use crate::error::{PipelineError, Result};

/**
    Clockwise rotation by a multiple of 90 degrees.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /**
        Parse a rotation in degrees. Only 90, 180 and 270 are accepted.
    */
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees {
            90 => Ok(Self::Rotate90),
            180 => Ok(Self::Rotate180),
            270 => Ok(Self::Rotate270),
            other => Err(PipelineError::invalid_argument(format!(
                "rotation must be 90, 180 or 270 degrees, got {other}"
            ))),
        }
    }

    pub const fn degrees(self) -> i32 {
        match self {
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    /**
        Returns true if the rotated picture has width and height swapped.
    */
    pub const fn swaps_dimensions(self) -> bool {
        !matches!(self, Self::Rotate180)
    }

    /**
        The `transpose` steps that realize this rotation, in order.
    */
    pub const fn transposes(self) -> &'static [TransposeDir] {
        match self {
            Self::Rotate90 => &[TransposeDir::Clock],
            Self::Rotate180 => &[TransposeDir::Clock, TransposeDir::Clock],
            Self::Rotate270 => &[TransposeDir::Cclock],
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = PipelineError;

    fn try_from(degrees: i32) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/**
    Composite a scaled watermark image onto the video.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub watermark: PathBuf,
    /// Position of the watermark's top-left corner.
    pub x: i32,
    pub y: i32,
    /// Size the watermark is scaled to.
    pub width: u32,
    pub height: u32,
}

impl Overlay {
    pub const DEFAULT_POSITION: (i32, i32) = (10, 10);
    pub const DEFAULT_SIZE: (u32, u32) = (100, 100);

    pub fn new(watermark: impl Into<PathBuf>) -> Self {
        let (x, y) = Self::DEFAULT_POSITION;
        let (width, height) = Self::DEFAULT_SIZE;
        Self {
            watermark: watermark.into(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn scaled_to(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.watermark.as_os_str().is_empty() {
            return Err(PipelineError::invalid_argument("watermark path is empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::invalid_argument(format!(
                "watermark size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/**
    What a session does to the video stream.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformSpec {
    Rotate(Rotation),
    /// Declared but not realizable: the watermark input is never wired
    /// into the graph, so configuring fails.
    Overlay(Overlay),
}

impl TransformSpec {
    pub fn rotate(degrees: i32) -> Result<Self> {
        Rotation::from_degrees(degrees).map(Self::Rotate)
    }

    /**
        Check the parameters without touching any file.
    */
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rotate(_) => Ok(()),
            Self::Overlay(overlay) => overlay.validate(),
        }
    }

    /**
        The geometry `input` has after this transform.
    */
    pub fn output_descriptor(&self, input: &StreamDescriptor) -> StreamDescriptor {
        match self {
            Self::Rotate(rotation) if rotation.swaps_dimensions() => input.transposed(),
            _ => *input,
        }
    }

    /**
        The equivalent FFmpeg filter description.
    */
    pub fn filter_description(&self) -> String {
        match self {
            Self::Rotate(rotation) => rotation
                .transposes()
                .iter()
                .map(|dir| format!("transpose={dir}"))
                .collect::<Vec<_>>()
                .join(","),
            Self::Overlay(overlay) => format!(
                "[1]scale={}:{}[wm];[0][wm]overlay={}:{}",
                overlay.width, overlay.height, overlay.x, overlay.y
            ),
        }
    }
}

impl fmt::Display for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotate(rotation) => write!(f, "rotate {rotation}"),
            Self::Overlay(overlay) => write!(f, "overlay {}", overlay.watermark.display()),
        }
    }
}
