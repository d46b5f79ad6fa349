/*!
    Pixel formats and plane geometry.
*/

use crate::{Error, Result};

/**
    Video pixel formats.

    This is a subset of formats commonly encountered in media pipelines.
    Not all FFmpeg pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Packed BGRA, 32bpp (common for display on macOS/Windows)
    Bgra,
    /// Packed RGBA, 32bpp (common for display)
    Rgba,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit little-endian samples in 16-bit words
    Yuv420p10,
    /// Single luma plane, 8bpp
    Gray8,
}

/**
    Geometry of one plane of a picture.

    Planes are stored tightly packed: a row is `width * bytes_per_pixel`
    bytes with no padding.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Plane {
    /// Width of the plane in pixels.
    pub width: u32,
    /// Height of the plane in rows.
    pub height: u32,
    /// Bytes occupied by one pixel of this plane.
    pub bytes_per_pixel: u32,
}

impl Plane {
    /**
        Number of bytes in one row, saturating at `usize::MAX`.
    */
    #[inline]
    pub const fn row_len(&self) -> usize {
        (self.width as usize).saturating_mul(self.bytes_per_pixel as usize)
    }

    /**
        Number of bytes in the whole plane, saturating at `usize::MAX`.
    */
    #[inline]
    pub const fn len(&self) -> usize {
        self.row_len().saturating_mul(self.height as usize)
    }

    /**
        Number of bytes in the whole plane, or `None` if it overflows `usize`.
    */
    #[inline]
    pub fn checked_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.bytes_per_pixel as usize)?
            .checked_mul(self.height as usize)
    }

    /**
        Returns true if the plane holds no pixels.
    */
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv420p | Self::Nv12 => 12,
            Self::Yuv420p10 => 24, // 4:2:0 with 16-bit storage per sample
            Self::Yuv422p => 16,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p => 24,
            Self::Bgra | Self::Rgba => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p | Self::Yuv420p10 => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Gray8 => true,
            Self::Bgra | Self::Rgba | Self::Rgb24 | Self::Bgr24 => false,
        }
    }

    /**
        Returns the log2 horizontal and vertical chroma subsampling.

        Formats without chroma planes report `(0, 0)`.
    */
    pub const fn chroma_shift(self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Nv12 | Self::Yuv420p10 => (1, 1),
            Self::Yuv422p => (1, 0),
            _ => (0, 0),
        }
    }

    /**
        Returns true if the chroma planes are subsampled equally in both
        directions. Only such formats survive a transpose without changing
        their subsampling.
    */
    pub const fn is_transposable(self) -> bool {
        let (x, y) = self.chroma_shift();
        x == y
    }

    /**
        Returns the plane layout of a `width` x `height` picture in this format.
    */
    pub fn planes(self, width: u32, height: u32) -> Vec<Plane> {
        let (sx, sy) = self.chroma_shift();
        let cw = width.div_ceil(1 << sx);
        let ch = height.div_ceil(1 << sy);
        let plane = |width, height, bytes_per_pixel| Plane {
            width,
            height,
            bytes_per_pixel,
        };

        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => vec![
                plane(width, height, 1),
                plane(cw, ch, 1),
                plane(cw, ch, 1),
            ],
            Self::Yuv420p10 => vec![
                plane(width, height, 2),
                plane(cw, ch, 2),
                plane(cw, ch, 2),
            ],
            Self::Nv12 => vec![plane(width, height, 1), plane(cw, ch, 2)],
            Self::Gray8 => vec![plane(width, height, 1)],
            Self::Rgb24 | Self::Bgr24 => vec![plane(width, height, 3)],
            Self::Bgra | Self::Rgba => vec![plane(width, height, 4)],
        }
    }

    /**
        Returns the number of bytes a tightly packed picture occupies.

        Saturates at `usize::MAX`; geometry read from a file goes through
        [`check_picture_size`] first, or uses [`Self::checked_frame_size`].
    */
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        self.planes(width, height)
            .iter()
            .fold(0usize, |total, plane| total.saturating_add(plane.len()))
    }

    /**
        Like [`Self::frame_size`], but `None` if the size overflows `usize`.
    */
    pub fn checked_frame_size(self, width: u32, height: u32) -> Option<usize> {
        self.planes(width, height)
            .iter()
            .try_fold(0usize, |total, plane| total.checked_add(plane.checked_len()?))
    }

    /**
        Returns the FFmpeg name of this format (as used in filter arguments).
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Nv12 => "nv12",
            Self::Bgra => "bgra",
            Self::Rgba => "rgba",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv420p10 => "yuv420p10le",
            Self::Gray8 => "gray",
        }
    }

    /**
        Look up a format by its FFmpeg name.
    */
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "yuv420p" | "yuvj420p" => Self::Yuv420p,
            "nv12" => Self::Nv12,
            "bgra" => Self::Bgra,
            "rgba" => Self::Rgba,
            "rgb24" => Self::Rgb24,
            "bgr24" => Self::Bgr24,
            "yuv422p" | "yuvj422p" => Self::Yuv422p,
            "yuv444p" | "yuvj444p" => Self::Yuv444p,
            "yuv420p10" | "yuv420p10le" => Self::Yuv420p10,
            "gray" | "gray8" => Self::Gray8,
            _ => return None,
        };
        Some(format)
    }
}

/**
    Reject picture sizes no decoder or filter should be asked to allocate.

    Same bound as libavutil's `av_image_check_size`: both sides non-zero and
    `(width + 128) * (height + 128)` below `i32::MAX / 8`.
*/
pub fn check_picture_size(width: u32, height: u32) -> Result<()> {
    let area = (u64::from(width) + 128) * (u64::from(height) + 128);
    if width == 0 || height == 0 || area >= (i32::MAX / 8) as u64 {
        return Err(Error::invalid_data(format!(
            "picture size {width}x{height} is invalid"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_bits_per_pixel() {
        assert_eq!(PixelFormat::Yuv420p.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Bgra.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Gray8.bits_per_pixel(), 8);
    }

    #[test]
    fn pixel_format_is_planar() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Bgra.is_planar());
        assert!(!PixelFormat::Rgb24.is_planar());
    }

    #[test]
    fn yuv420p_planes_round_up_odd_dimensions() {
        let planes = PixelFormat::Yuv420p.planes(5, 3);
        assert_eq!(planes.len(), 3);
        assert_eq!((planes[0].width, planes[0].height), (5, 3));
        assert_eq!((planes[1].width, planes[1].height), (3, 2));
        assert_eq!((planes[2].width, planes[2].height), (3, 2));
        assert_eq!(PixelFormat::Yuv420p.frame_size(5, 3), 15 + 6 + 6);
    }

    #[test]
    fn frame_size_matches_bits_per_pixel_for_even_sizes() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Nv12,
            PixelFormat::Yuv422p,
            PixelFormat::Yuv444p,
            PixelFormat::Rgb24,
            PixelFormat::Rgba,
            PixelFormat::Gray8,
        ] {
            let expected = 320 * 240 * format.bits_per_pixel() as usize / 8;
            assert_eq!(format.frame_size(320, 240), expected, "{format:?}");
        }
    }

    #[test]
    fn oversized_pictures_do_not_overflow() {
        let huge = u32::MAX;
        assert_eq!(PixelFormat::Yuv444p.frame_size(huge, huge), usize::MAX);
        assert_eq!(PixelFormat::Bgra.checked_frame_size(huge, huge), None);
        assert_eq!(PixelFormat::Gray8.checked_frame_size(4, 2), Some(8));
    }

    #[test]
    fn picture_size_limits() {
        assert!(check_picture_size(320, 240).is_ok());
        assert!(check_picture_size(7680, 4320).is_ok());
        assert!(check_picture_size(0, 240).is_err());
        assert!(check_picture_size(320, 0).is_err());
        assert!(matches!(
            check_picture_size(3_000_000, 3_000_000),
            Err(Error::InvalidData { .. })
        ));
        assert!(check_picture_size(4_000_000_000, 4_000_000_000).is_err());
        assert!(check_picture_size(u32::MAX, 1).is_err());
    }

    #[test]
    fn nv12_has_interleaved_chroma_plane() {
        let planes = PixelFormat::Nv12.planes(4, 4);
        assert_eq!(planes.len(), 2);
        assert_eq!(planes[1].bytes_per_pixel, 2);
        assert_eq!(planes[1].row_len(), 4);
    }

    #[test]
    fn transposable_formats() {
        assert!(PixelFormat::Yuv420p.is_transposable());
        assert!(PixelFormat::Yuv444p.is_transposable());
        assert!(PixelFormat::Nv12.is_transposable());
        assert!(PixelFormat::Rgba.is_transposable());
        assert!(!PixelFormat::Yuv422p.is_transposable());
    }

    #[test]
    fn names_round_trip() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Nv12,
            PixelFormat::Bgra,
            PixelFormat::Rgba,
            PixelFormat::Rgb24,
            PixelFormat::Bgr24,
            PixelFormat::Yuv422p,
            PixelFormat::Yuv444p,
            PixelFormat::Yuv420p10,
            PixelFormat::Gray8,
        ] {
            assert_eq!(PixelFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(PixelFormat::from_name("yuvj420p"), Some(PixelFormat::Yuv420p));
        assert_eq!(PixelFormat::from_name("p010le"), None);
    }
}
