cfg_if! {
    if #[cfg(feature = "zstd_support")]
    {
        use zstd::bulk::Decompressor;

        use super::compression_config::CompressionMode;
        use super::error::DecoderError;

        pub struct Decoder {
            result: Vec<u8>,
            decoder: Option<Decompressor<'static>>,
        }

        impl Decoder {
            /// Try to create a new Decoder with the specified compression mode
            pub fn try_new(compression_mode: Option<CompressionMode>) -> Result<Self, DecoderError> {
                let decoder = match compression_mode {
                    None => None,
                    Some(CompressionMode::Default(_)) => {
                        Some(Decompressor::new().map_err(|_| DecoderError::DecompressorCreationFailed)?)
                    }
                    Some(CompressionMode::Dictionary(_, dictionary)) => Some(
                        Decompressor::with_dictionary(&dictionary)
                            .map_err(|_| DecoderError::DecompressorCreationFailed)?,
                    ),
                };

                Ok(Self {
                    decoder,
                    result: Vec::new(),
                })
            }

            /// Create a new Decoder with the specified compression mode
            ///
            /// # Panics
            /// Panics if the decompressor cannot be created with the given configuration
            pub fn new(compression_mode: Option<CompressionMode>) -> Self {
                Self::try_new(compression_mode).expect("Failed to create Decoder")
            }

            /// Try to decode a payload, returning error on decompression failure
            ///
            /// This method processes untrusted network data: any malformed or
            /// malicious payload returns an error instead of panicking.
            pub fn try_decode(&mut self, payload: &[u8]) -> Result<&[u8], DecoderError> {
                if let Some(decoder) = &mut self.decoder {
                    let upper_bound = Decompressor::<'static>::upper_bound(payload)
                        .map_err(|_| DecoderError::UpperBoundCalculationFailed {
                            payload_size: payload.len(),
                        })?;

                    self.result = decoder
                        .decompress(payload, upper_bound)
                        .map_err(|_| DecoderError::DecompressionFailed {
                            payload_size: payload.len(),
                        })?;
                    Ok(&self.result)
                } else {
                    self.result = payload.to_vec();
                    Ok(&self.result)
                }
            }
        }
    }
    else
    {
        use super::compression_config::CompressionMode;
        use super::error::DecoderError;

        pub struct Decoder {
            result: Vec<u8>,
        }

        impl Decoder {
            pub fn try_new(_: Option<CompressionMode>) -> Result<Self, DecoderError> {
                Ok(Self::new(None))
            }

            pub fn new(_: Option<CompressionMode>) -> Self {
                Self {
                    result: Vec::new(),
                }
            }

            pub fn try_decode(&mut self, payload: &[u8]) -> Result<&[u8], DecoderError> {
                self.result = payload.to_vec();
                Ok(&self.result)
            }
        }
    }
}
