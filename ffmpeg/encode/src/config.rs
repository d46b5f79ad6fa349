/*!
    Encoder configuration types.
*/

use ffmpeg_types::CodecId;

/**
    Configuration for video encoder.
*/
#[derive(Clone, Debug, Default)]
pub struct VideoEncoderConfig {
    /// Output codec (None = keep the input stream's codec).
    pub codec: Option<CodecId>,
    /// Force an encoder implementation by name, e.g. `libx264`.
    pub encoder_name: Option<String>,
    /// Target bit rate in bits per second.
    pub bit_rate: Option<usize>,
    /// Maximum distance between keyframes.
    pub gop_size: Option<u32>,
    /// Place codec headers in the container instead of the bitstream.
    pub global_header: bool,
    /// Private encoder options, passed through verbatim.
    pub options: Vec<(String, String)>,
}

impl VideoEncoderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Encode with `codec` instead of the input codec.
    */
    pub fn with_codec(mut self, codec: CodecId) -> Self {
        self.codec = Some(codec);
        self
    }

    /**
        Use the encoder registered under `name`.
    */
    pub fn with_encoder(mut self, name: impl Into<String>) -> Self {
        self.encoder_name = Some(name.into());
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: usize) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    pub fn with_gop_size(mut self, gop_size: u32) -> Self {
        self.gop_size = Some(gop_size);
        self
    }

    /**
        Add a private encoder option such as `preset=fast`.
    */
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}
