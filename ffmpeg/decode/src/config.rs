/*!
    Decoder configuration types.
*/

/**
    Configuration for video decoder.
*/
#[derive(Clone, Debug, Default)]
pub struct VideoDecoderConfig {
    /// Force a decoder by name (None = pick by codec id).
    pub decoder_name: Option<String>,
    /// Decoding threads (None = let the codec decide).
    pub threads: Option<usize>,
}

impl VideoDecoderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Use the decoder registered under `name`.
    */
    pub fn with_decoder(mut self, name: impl Into<String>) -> Self {
        self.decoder_name = Some(name.into());
        self
    }

    /**
        Decode with a fixed number of threads.
    */
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }
}
