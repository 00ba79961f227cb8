cfg_if! {
    if #[cfg(feature = "zstd_support")]
    {
        use zstd::bulk::Compressor;

        use super::compression_config::CompressionMode;
        use super::error::EncoderError;

        pub struct Encoder {
            result: Vec<u8>,
            encoder: Option<Compressor<'static>>,
        }

        impl Encoder {
            /// Try to create a new Encoder with the specified compression mode
            pub fn try_new(compression_mode: Option<CompressionMode>) -> Result<Self, EncoderError> {
                let encoder = match compression_mode {
                    None => None,
                    Some(CompressionMode::Default(compression_level)) => Some(
                        Compressor::new(compression_level).map_err(|_| EncoderError::CompressorCreationFailed {
                            level: compression_level,
                        })?,
                    ),
                    Some(CompressionMode::Dictionary(compression_level, dictionary)) => Some(
                        Compressor::with_dictionary(compression_level, &dictionary)
                            .map_err(|_| EncoderError::CompressorCreationFailed {
                                level: compression_level,
                            })?,
                    ),
                };

                Ok(Self {
                    result: Vec::new(),
                    encoder,
                })
            }

            /// Create a new Encoder with the specified compression mode
            ///
            /// # Panics
            /// Panics if the compressor cannot be created with the given configuration
            pub fn new(compression_mode: Option<CompressionMode>) -> Self {
                Self::try_new(compression_mode).expect("Failed to create Encoder")
            }

            /// Try to encode a payload, returning error on compression failure
            pub fn try_encode(&mut self, payload: &[u8]) -> Result<&[u8], EncoderError> {
                match &mut self.encoder {
                    None => {
                        self.result = payload.to_vec();
                        Ok(&self.result)
                    }
                    Some(encoder) => {
                        self.result = encoder.compress(payload).map_err(|_| EncoderError::CompressionFailed {
                            payload_size: payload.len(),
                        })?;
                        Ok(&self.result)
                    }
                }
            }
        }
    }
    else
    {
        use super::compression_config::CompressionMode;
        use super::error::EncoderError;

        pub struct Encoder {
            result: Vec<u8>,
        }

        impl Encoder {
            pub fn try_new(_: Option<CompressionMode>) -> Result<Self, EncoderError> {
                Ok(Self::new(None))
            }

            pub fn new(_: Option<CompressionMode>) -> Self {
                Self {
                    result: Vec::new(),
                }
            }

            pub fn try_encode(&mut self, payload: &[u8]) -> Result<&[u8], EncoderError> {
                self.result = payload.to_vec();
                Ok(&self.result)
            }
        }
    }
}
