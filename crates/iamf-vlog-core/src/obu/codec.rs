//! Codec configuration OBU and codec-specific decoder configs.

use bytes::Buf;
use serde::{Deserialize, Serialize};

/// A four-character code such as `Opus` or `iamf`.
///
/// Rendered in the log as the decimal value of its bytes read big-endian, so
/// `Opus` is written as `1332770163`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const OPUS: FourCc = FourCc(*b"Opus");
    pub const DOPS: FourCc = FourCc(*b"dOps");
    pub const IPCM: FourCc = FourCc(*b"ipcm");
    pub const MP4A: FourCc = FourCc(*b"mp4a");
    pub const ESDS: FourCc = FourCc(*b"esds");
    pub const IAMF: FourCc = FourCc(*b"iamf");

    /// Numeric value as printed in the log.
    pub fn value(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Build from the value a decoder holds after a little-endian load of the
    /// four bytes.
    pub fn from_le_value(value: u32) -> Self {
        FourCc(value.to_le_bytes())
    }
}

impl TryFrom<String> for FourCc {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| format!("four-character code must be 4 bytes, got {:?}", s))?;
        Ok(FourCc(bytes))
    }
}

impl From<FourCc> for String {
    fn from(code: FourCc) -> Self {
        String::from_utf8_lossy(&code.0).into_owned()
    }
}

impl std::fmt::Display for FourCc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Codec configuration OBU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    pub codec_config_id: u64,
    pub codec_id: FourCc,
    pub num_samples_per_frame: u64,
    pub roll_distance: i16,
    /// Raw codec-specific decoder config bytes.
    #[serde(default)]
    pub decoder_config: Vec<u8>,
}

/// Opus `dOps` decoder config fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusDecoderConfig {
    pub version: u8,
    pub output_channel_count: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: u16,
    pub mapping_family: u8,
}

/// LPCM decoder config fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpcmDecoderConfig {
    pub sample_format_flags: u8,
    pub sample_size: u8,
    pub sample_rate: u32,
}

/// Result of interpreting [`CodecConfig::decoder_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderConfig {
    Opus(OpusDecoderConfig),
    Lpcm(LpcmDecoderConfig),
    /// Codec whose decoder config is not traced (AAC, FLAC, unknown).
    Opaque,
    /// Fewer bytes than the codec's fixed layout requires.
    Truncated { needed: usize, got: usize },
}

const OPUS_CONFIG_LEN: usize = 11;
const LPCM_CONFIG_LEN: usize = 6;

impl CodecConfig {
    /// Interpret the raw decoder config bytes for the codecs the log traces.
    pub fn parse_decoder_config(&self) -> DecoderConfig {
        let mut buf = self.decoder_config.as_slice();
        match self.codec_id {
            FourCc::OPUS | FourCc::DOPS => {
                if buf.remaining() < OPUS_CONFIG_LEN {
                    return DecoderConfig::Truncated {
                        needed: OPUS_CONFIG_LEN,
                        got: buf.remaining(),
                    };
                }
                DecoderConfig::Opus(OpusDecoderConfig {
                    version: buf.get_u8(),
                    output_channel_count: buf.get_u8(),
                    pre_skip: buf.get_u16(),
                    input_sample_rate: buf.get_u32(),
                    output_gain: buf.get_u16(),
                    mapping_family: buf.get_u8(),
                })
            }
            FourCc::IPCM => {
                if buf.remaining() < LPCM_CONFIG_LEN {
                    return DecoderConfig::Truncated {
                        needed: LPCM_CONFIG_LEN,
                        got: buf.remaining(),
                    };
                }
                DecoderConfig::Lpcm(LpcmDecoderConfig {
                    sample_format_flags: buf.get_u8(),
                    sample_size: buf.get_u8(),
                    sample_rate: buf.get_u32(),
                })
            }
            _ => DecoderConfig::Opaque,
        }
    }
}
