/*!
    Decoded frame types.
*/

use crate::{Error, PixelFormat, Plane, Pts, Rational, Result};

/**
    A decoded video frame.

    Pixel data is stored tightly packed, one plane after another in the
    order reported by [`PixelFormat::planes`]. Packed formats have a single
    plane; planar formats have one plane per component.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            time_base,
        }
    }

    /**
        Create a zero-filled frame with the given geometry.
    */
    pub fn blank(width: u32, height: u32, format: PixelFormat, time_base: Rational) -> Self {
        let data = vec![0u8; format.frame_size(width, height)];
        Self::new(data, width, height, format, None, time_base)
    }

    /**
        Returns the number of bytes the pixel data should occupy.
    */
    pub fn expected_data_len(&self) -> usize {
        self.format.frame_size(self.width, self.height)
    }

    /**
        Checks that the buffer length matches the frame geometry.
    */
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_data(format!(
                "frame has empty dimensions {}x{}",
                self.width, self.height
            )));
        }
        let expected = self.expected_data_len();
        if self.data.len() != expected {
            return Err(Error::invalid_data(format!(
                "{}x{} {} frame needs {expected} bytes, got {}",
                self.width,
                self.height,
                self.format.name(),
                self.data.len()
            )));
        }
        Ok(())
    }

    /**
        Returns the plane layout of this frame.
    */
    pub fn planes(&self) -> Vec<Plane> {
        self.format.planes(self.width, self.height)
    }

    /**
        Returns the bytes of plane `index`, or `None` if the index is out of
        range or the buffer is too short.
    */
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let (start, len) = self.plane_range(index)?;
        self.data.get(start..start + len)
    }

    /**
        Mutable variant of [`VideoFrame::plane`].
    */
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let (start, len) = self.plane_range(index)?;
        self.data.get_mut(start..start + len)
    }

    fn plane_range(&self, index: usize) -> Option<(usize, usize)> {
        let planes = self.planes();
        let plane = planes.get(index)?;
        let start = planes[..index].iter().map(Plane::len).sum();
        Some((start, plane.len()))
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

// Frames move between pipeline stages by value
static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
