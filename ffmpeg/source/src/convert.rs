/*!
    Conversions between `ffmpeg-next` values and the ecosystem types.
*/

use ffmpeg_next::{
    codec::Id, format::Pixel, media, util::error::EAGAIN,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::{
    CodecId, Error, PixelFormat, Pts, Rational, Result, StreamDescriptor, StreamType, VideoFrame,
};

/**
    Convert an FFmpeg error, keeping the "try again" and "end of stream"
    conditions distinguishable.
*/
pub fn error(e: ffmpeg_next::Error) -> Error {
    match e {
        ffmpeg_next::Error::Eof => Error::Eof,
        ffmpeg_next::Error::Other { errno } if errno == EAGAIN => Error::Again,
        ffmpeg_next::Error::Other { errno } => Error::Io(std::io::Error::from_raw_os_error(errno)),
        ffmpeg_next::Error::InvalidData => Error::invalid_data(e.to_string()),
        ffmpeg_next::Error::DemuxerNotFound | ffmpeg_next::Error::MuxerNotFound => {
            Error::unsupported_format(e.to_string())
        }
        _ => Error::codec(e.to_string()),
    }
}

/**
    Convert an FFmpeg rational, rejecting a zero denominator.
*/
pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Option<Rational> {
    Rational::checked_new(r.numerator(), r.denominator())
}

pub fn rational_to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

/**
    Convert an FFmpeg pixel format. Full-range JPEG variants map to their
    limited-range counterparts.
*/
pub fn pixel_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    let format = match format {
        Pixel::YUV420P | Pixel::YUVJ420P => PixelFormat::Yuv420p,
        Pixel::NV12 => PixelFormat::Nv12,
        Pixel::BGRA => PixelFormat::Bgra,
        Pixel::RGBA => PixelFormat::Rgba,
        Pixel::RGB24 => PixelFormat::Rgb24,
        Pixel::BGR24 => PixelFormat::Bgr24,
        Pixel::YUV422P | Pixel::YUVJ422P => PixelFormat::Yuv422p,
        Pixel::YUV444P | Pixel::YUVJ444P => PixelFormat::Yuv444p,
        Pixel::YUV420P10LE => PixelFormat::Yuv420p10,
        Pixel::GRAY8 => PixelFormat::Gray8,
        _ => return None,
    };
    Some(format)
}

pub fn pixel_to_ffmpeg(format: PixelFormat) -> Option<Pixel> {
    let pixel = match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuv420p10 => Pixel::YUV420P10LE,
        PixelFormat::Gray8 => Pixel::GRAY8,
        _ => return None,
    };
    Some(pixel)
}

pub fn codec_from_ffmpeg(id: Id) -> CodecId {
    match id {
        Id::RAWVIDEO => CodecId::RawVideo,
        Id::H264 => CodecId::H264,
        Id::HEVC => CodecId::H265,
        Id::VP8 => CodecId::Vp8,
        Id::VP9 => CodecId::Vp9,
        Id::AV1 => CodecId::Av1,
        Id::MPEG4 => CodecId::Mpeg4,
        Id::MPEG2VIDEO => CodecId::Mpeg2Video,
        Id::MJPEG => CodecId::Mjpeg,
        Id::PRORES => CodecId::ProRes,
        Id::AAC => CodecId::Aac,
        Id::OPUS => CodecId::Opus,
        Id::MP3 => CodecId::Mp3,
        Id::VORBIS => CodecId::Vorbis,
        Id::FLAC => CodecId::Flac,
        Id::PCM_S16LE => CodecId::PcmS16Le,
        Id::AC3 => CodecId::Ac3,
        _ => CodecId::Other,
    }
}

/**
    Convert a codec id back to FFmpeg. [`CodecId::Other`] has no FFmpeg
    counterpart.
*/
pub fn codec_to_ffmpeg(codec: CodecId) -> Option<Id> {
    let id = match codec {
        CodecId::RawVideo => Id::RAWVIDEO,
        CodecId::H264 => Id::H264,
        CodecId::H265 => Id::HEVC,
        CodecId::Vp8 => Id::VP8,
        CodecId::Vp9 => Id::VP9,
        CodecId::Av1 => Id::AV1,
        CodecId::Mpeg4 => Id::MPEG4,
        CodecId::Mpeg2Video => Id::MPEG2VIDEO,
        CodecId::Mjpeg => Id::MJPEG,
        CodecId::ProRes => Id::PRORES,
        CodecId::Aac => Id::AAC,
        CodecId::Opus => Id::OPUS,
        CodecId::Mp3 => Id::MP3,
        CodecId::Vorbis => Id::VORBIS,
        CodecId::Flac => Id::FLAC,
        CodecId::PcmS16Le => Id::PCM_S16LE,
        CodecId::Ac3 => Id::AC3,
        _ => return None,
    };
    Some(id)
}

pub fn stream_type_from_ffmpeg(medium: media::Type) -> StreamType {
    match medium {
        media::Type::Video => StreamType::Video,
        media::Type::Audio => StreamType::Audio,
        media::Type::Subtitle => StreamType::Subtitle,
        _ => StreamType::Other,
    }
}

/**
    Copy a decoded FFmpeg picture into a tightly packed [`VideoFrame`].
*/
pub fn frame_from_ffmpeg(frame: &VideoFrameFFmpeg, time_base: Rational) -> Result<VideoFrame> {
    let format = pixel_from_ffmpeg(frame.format()).ok_or_else(|| {
        Error::unsupported_format(format!("pixel format {:?}", frame.format()))
    })?;
    let (width, height) = (frame.width(), frame.height());

    let mut data = Vec::with_capacity(format.frame_size(width, height));
    for (index, plane) in format.planes(width, height).iter().enumerate() {
        let src = frame.data(index);
        let stride = frame.stride(index);
        let row_len = plane.row_len();
        for row in 0..plane.height as usize {
            let start = row * stride;
            let bytes = src
                .get(start..start + row_len)
                .ok_or_else(|| Error::invalid_data("decoded plane is shorter than its geometry"))?;
            data.extend_from_slice(bytes);
        }
    }

    let pts = frame.timestamp().or_else(|| frame.pts()).map(Pts);
    Ok(VideoFrame::new(data, width, height, format, pts, time_base))
}

/**
    Copy a [`VideoFrame`] into a freshly allocated FFmpeg picture.
*/
pub fn frame_to_ffmpeg(frame: &VideoFrame) -> Result<VideoFrameFFmpeg> {
    frame.validate()?;

    let pixel = pixel_to_ffmpeg(frame.format).ok_or_else(|| {
        Error::unsupported_format(format!("pixel format {}", frame.format.name()))
    })?;
    let mut out = VideoFrameFFmpeg::new(pixel, frame.width, frame.height);
    for (index, plane) in frame.planes().iter().enumerate() {
        let src = frame
            .plane(index)
            .ok_or_else(|| Error::invalid_data("frame buffer is shorter than its geometry"))?;
        let stride = out.stride(index);
        let dst = out.data_mut(index);
        let row_len = plane.row_len();
        for (row, bytes) in src.chunks_exact(row_len).enumerate() {
            dst[row * stride..row * stride + row_len].copy_from_slice(bytes);
        }
    }
    out.set_pts(frame.pts.map(|pts| pts.0));
    Ok(out)
}

/**
    Codec parameters for a stream that has no FFmpeg context of its own,
    such as one produced by a native encoder.
*/
pub fn video_parameters(descriptor: &StreamDescriptor) -> Result<ffmpeg_next::codec::Parameters> {
    let id = codec_to_ffmpeg(descriptor.codec).ok_or_else(|| {
        Error::unsupported_format(format!("codec {}", descriptor.codec.name()))
    })?;
    let pixel = pixel_to_ffmpeg(descriptor.format).ok_or_else(|| {
        Error::unsupported_format(format!("pixel format {}", descriptor.format.name()))
    })?;

    let mut parameters = ffmpeg_next::codec::Parameters::new();
    unsafe {
        let raw = parameters.as_mut_ptr();
        (*raw).codec_type = ffmpeg_next::ffi::AVMediaType::AVMEDIA_TYPE_VIDEO;
        (*raw).codec_id = id.into();
        (*raw).width = descriptor.width as i32;
        (*raw).height = descriptor.height as i32;
        (*raw).format = ffmpeg_next::ffi::AVPixelFormat::from(pixel) as i32;
    }
    Ok(parameters)
}
