/*!
    Pixel kernels behind the geometric filters.

    Every kernel works plane by plane on tightly packed data and treats a
    pixel as an opaque run of `bytes_per_pixel` bytes, so interleaved chroma
    (NV12) and high bit depth samples move as a unit.
*/

use ffmpeg_types::{Error, Plane, Result, VideoFrame};

use crate::TransposeDir;

/**
    Transpose one plane. `dst` receives a `src.height` x `src.width` plane.
*/
pub(crate) fn transpose_plane(src: &[u8], plane: Plane, dst: &mut [u8], dir: TransposeDir) {
    let bpp = plane.bytes_per_pixel as usize;
    let (w, h) = (plane.width as usize, plane.height as usize);
    let src_stride = w * bpp;
    let dst_stride = h * bpp;

    // Output is h pixels wide and w rows tall
    for y in 0..w {
        for x in 0..h {
            let (sy, sx) = match dir {
                TransposeDir::CclockFlip => (x, y),
                TransposeDir::Clock => (h - 1 - x, y),
                TransposeDir::Cclock => (x, w - 1 - y),
                TransposeDir::ClockFlip => (h - 1 - x, w - 1 - y),
            };
            let s = sy * src_stride + sx * bpp;
            let d = y * dst_stride + x * bpp;
            dst[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
        }
    }
}

/**
    Mirror one plane left to right.
*/
pub(crate) fn hflip_plane(src: &[u8], plane: Plane, dst: &mut [u8]) {
    let bpp = plane.bytes_per_pixel as usize;
    let row_len = plane.row_len();
    for (src_row, dst_row) in src.chunks_exact(row_len).zip(dst.chunks_exact_mut(row_len)) {
        for (s, d) in src_row
            .chunks_exact(bpp)
            .rev()
            .zip(dst_row.chunks_exact_mut(bpp))
        {
            d.copy_from_slice(s);
        }
    }
}

/**
    Mirror one plane top to bottom.
*/
pub(crate) fn vflip_plane(src: &[u8], plane: Plane, dst: &mut [u8]) {
    let row_len = plane.row_len();
    for (src_row, dst_row) in src
        .chunks_exact(row_len)
        .rev()
        .zip(dst.chunks_exact_mut(row_len))
    {
        dst_row.copy_from_slice(src_row);
    }
}

/**
    Apply a per-plane kernel to every plane of `frame`, producing a frame of
    `out_width` x `out_height`. Timing is carried over unchanged.
*/
fn map_planes(
    frame: &VideoFrame,
    out_width: u32,
    out_height: u32,
    kernel: impl Fn(&[u8], Plane, &mut [u8]),
) -> Result<VideoFrame> {
    frame.validate()?;

    let mut out = VideoFrame::new(
        vec![0u8; frame.format.frame_size(out_width, out_height)],
        out_width,
        out_height,
        frame.format,
        frame.pts,
        frame.time_base,
    );
    for (index, plane) in frame.planes().into_iter().enumerate() {
        let src = frame.plane(index).ok_or_else(|| Error::invalid_data("missing plane"))?;
        let dst = out
            .plane_mut(index)
            .ok_or_else(|| Error::invalid_data("missing plane"))?;
        kernel(src, plane, dst);
    }
    Ok(out)
}

pub(crate) fn transpose(frame: &VideoFrame, dir: TransposeDir) -> Result<VideoFrame> {
    if !frame.format.is_transposable() {
        return Err(Error::unsupported_format(format!(
            "cannot transpose {} pictures",
            frame.format.name()
        )));
    }
    map_planes(frame, frame.height, frame.width, |src, plane, dst| {
        transpose_plane(src, plane, dst, dir)
    })
}

pub(crate) fn hflip(frame: &VideoFrame) -> Result<VideoFrame> {
    map_planes(frame, frame.width, frame.height, hflip_plane)
}

pub(crate) fn vflip(frame: &VideoFrame) -> Result<VideoFrame> {
    map_planes(frame, frame.width, frame.height, vflip_plane)
}

/**
    Copy `overlay` onto `main` with its top-left corner at (`x`, `y`),
    clipping whatever falls outside `main`. Both frames must share a pixel
    format.
*/
pub(crate) fn overlay(main: &mut VideoFrame, overlay: &VideoFrame, x: u32, y: u32) -> Result<()> {
    if main.format != overlay.format {
        return Err(Error::unsupported_format(format!(
            "cannot overlay {} onto {}",
            overlay.format.name(),
            main.format.name()
        )));
    }
    main.validate()?;
    overlay.validate()?;

    let (sx, sy) = main.format.chroma_shift();
    let main_planes = main.planes();
    for (index, (mp, op)) in main_planes.iter().zip(overlay.planes()).enumerate() {
        // Chroma planes are addressed in subsampled coordinates
        let (px, py) = if index == 0 {
            (x as usize, y as usize)
        } else {
            ((x >> sx) as usize, (y >> sy) as usize)
        };
        if px >= mp.width as usize || py >= mp.height as usize {
            continue;
        }

        let bpp = mp.bytes_per_pixel as usize;
        let cols = (op.width as usize).min(mp.width as usize - px);
        let rows = (op.height as usize).min(mp.height as usize - py);
        let src = overlay
            .plane(index)
            .ok_or_else(|| Error::invalid_data("missing plane"))?;
        let dst = main
            .plane_mut(index)
            .ok_or_else(|| Error::invalid_data("missing plane"))?;

        for row in 0..rows {
            let s = row * op.row_len();
            let d = (py + row) * mp.row_len() + px * bpp;
            dst[d..d + cols * bpp].copy_from_slice(&src[s..s + cols * bpp]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    const TB: Rational = Rational { num: 1, den: 25 };

    fn numbered(width: u32, height: u32, format: PixelFormat) -> VideoFrame {
        let mut frame = VideoFrame::blank(width, height, format, TB);
        for (i, byte) in frame.data.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        frame.pts = Some(Pts(9));
        frame
    }

    fn gray(width: u32, height: u32, pixels: &[u8]) -> VideoFrame {
        VideoFrame::new(pixels.to_vec(), width, height, PixelFormat::Gray8, None, TB)
    }

    #[test]
    fn transpose_directions_on_2x3() {
        // 1 2 3
        // 4 5 6
        let frame = gray(3, 2, &[1, 2, 3, 4, 5, 6]);

        let clock = transpose(&frame, TransposeDir::Clock).unwrap();
        assert_eq!((clock.width, clock.height), (2, 3));
        assert_eq!(clock.data, vec![4, 1, 5, 2, 6, 3]);

        let cclock = transpose(&frame, TransposeDir::Cclock).unwrap();
        assert_eq!(cclock.data, vec![3, 6, 2, 5, 1, 4]);

        let cclock_flip = transpose(&frame, TransposeDir::CclockFlip).unwrap();
        assert_eq!(cclock_flip.data, vec![1, 4, 2, 5, 3, 6]);

        let clock_flip = transpose(&frame, TransposeDir::ClockFlip).unwrap();
        assert_eq!(clock_flip.data, vec![6, 3, 5, 2, 4, 1]);
    }

    #[test]
    fn four_clockwise_turns_are_identity() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Nv12,
            PixelFormat::Yuv444p,
            PixelFormat::Yuv420p10,
            PixelFormat::Rgb24,
            PixelFormat::Bgra,
        ] {
            let frame = numbered(6, 4, format);
            let mut turned = frame.clone();
            for _ in 0..4 {
                turned = transpose(&turned, TransposeDir::Clock).unwrap();
            }
            assert_eq!(turned.data, frame.data, "{format:?}");
            assert_eq!((turned.width, turned.height), (6, 4));
        }
    }

    #[test]
    fn clock_then_cclock_is_identity() {
        let frame = numbered(8, 6, PixelFormat::Yuv420p);
        let there = transpose(&frame, TransposeDir::Clock).unwrap();
        let back = transpose(&there, TransposeDir::Cclock).unwrap();
        assert_eq!(back.data, frame.data);
    }

    #[test]
    fn half_turn_equals_both_flips() {
        let frame = numbered(6, 4, PixelFormat::Yuv420p);
        let half = transpose(&transpose(&frame, TransposeDir::Clock).unwrap(), TransposeDir::Clock)
            .unwrap();
        let flipped = vflip(&hflip(&frame).unwrap()).unwrap();
        assert_eq!(half.data, flipped.data);
        assert_eq!((half.width, half.height), (6, 4));
    }

    #[test]
    fn odd_dimensions_transpose_chroma_consistently() {
        let frame = numbered(5, 3, PixelFormat::Yuv420p);
        let turned = transpose(&frame, TransposeDir::Clock).unwrap();
        assert_eq!((turned.width, turned.height), (3, 5));
        assert_eq!(turned.data.len(), PixelFormat::Yuv420p.frame_size(3, 5));
        assert!(turned.validate().is_ok());
    }

    #[test]
    fn transpose_keeps_timing() {
        let frame = numbered(4, 2, PixelFormat::Gray8);
        let turned = transpose(&frame, TransposeDir::Cclock).unwrap();
        assert_eq!(turned.pts, Some(Pts(9)));
        assert_eq!(turned.time_base, TB);
    }

    #[test]
    fn transpose_rejects_422() {
        let frame = numbered(4, 4, PixelFormat::Yuv422p);
        assert!(matches!(
            transpose(&frame, TransposeDir::Clock),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn flips_on_gray() {
        let frame = gray(3, 2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(hflip(&frame).unwrap().data, vec![3, 2, 1, 6, 5, 4]);
        assert_eq!(vflip(&frame).unwrap().data, vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn hflip_moves_whole_pixels() {
        let frame = VideoFrame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelFormat::Rgb24, None, TB);
        assert_eq!(hflip(&frame).unwrap().data, vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn overlay_clips_to_main() {
        let mut main = gray(4, 3, &[0; 12]);
        let logo = gray(2, 2, &[1, 2, 3, 4]);

        overlay(&mut main, &logo, 3, 2).unwrap();
        assert_eq!(main.data, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

        overlay(&mut main, &logo, 0, 0).unwrap();
        assert_eq!(&main.data[..6], &[1, 2, 0, 0, 3, 4]);

        // Entirely outside is a no-op
        let before = main.data.clone();
        overlay(&mut main, &logo, 10, 10).unwrap();
        assert_eq!(main.data, before);
    }

    #[test]
    fn overlay_subsamples_chroma_offsets() {
        let mut main = VideoFrame::blank(4, 4, PixelFormat::Yuv420p, TB);
        let mut logo = VideoFrame::blank(2, 2, PixelFormat::Yuv420p, TB);
        logo.data.fill(9);

        overlay(&mut main, &logo, 2, 2).unwrap();
        // Chroma planes are 2x2; the logo's 1x1 chroma lands at (1, 1)
        assert_eq!(main.plane(1).unwrap(), &[0, 0, 0, 9]);
        assert_eq!(main.plane(2).unwrap(), &[0, 0, 0, 9]);
    }

    #[test]
    fn overlay_requires_matching_formats() {
        let mut main = VideoFrame::blank(4, 4, PixelFormat::Yuv420p, TB);
        let logo = VideoFrame::blank(2, 2, PixelFormat::Rgba, TB);
        assert!(overlay(&mut main, &logo, 0, 0).is_err());
    }
}
