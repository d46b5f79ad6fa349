/*!
    Shared types for the ffmpeg crate ecosystem.

    This crate defines the types that cross crate boundaries. It has no dependency on FFmpeg, making it lightweight and enabling
    consumers to depend on it without pulling in FFmpeg bindings.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`VideoFrame`] - Decoded picture data, planes stored back to back
    - [`Packet`] - Encoded packet data

    # Format Types

    - [`PixelFormat`] and [`Plane`] - Video pixel formats and their plane geometry
    - [`CodecId`] - Codec identifiers

    # Stream Information

    - [`StreamDescriptor`] - Immutable description of a video stream
    - [`StreamInfo`] and [`MediaInfo`] - Per-stream and per-file metadata

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod codec;
mod error;
mod format;
mod frame;
mod packet;
mod rational;
mod stream;
mod timestamp;

pub use codec::CodecId;
pub use error::{Error, Result};
pub use format::{PixelFormat, Plane, check_picture_size};
pub use frame::VideoFrame;
pub use packet::{Packet, StreamType};
pub use rational::Rational;
pub use stream::{MediaInfo, StreamDescriptor, StreamInfo};
pub use timestamp::{MediaDuration, Pts};
