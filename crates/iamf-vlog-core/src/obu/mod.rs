//! Decoded OBU fields, as handed over by the decoder.
//!
//! These types are a read-only view of records the decoder has already
//! parsed. Nothing here touches raw bitstream bytes except the codec
//! decoder config, which the log interprets itself for Opus and LPCM.

pub mod codec;
pub mod element;
pub mod mix;
pub mod parameter;

use serde::{Deserialize, Serialize};

pub use codec::{CodecConfig, DecoderConfig, FourCc, LpcmDecoderConfig, OpusDecoderConfig};
pub use element::{AmbisonicsConfig, AudioElement, AudioElementConfig, ChannelLayerConfig};
pub use mix::{
    LoudnessInfo, LoudnessLayout, MixGain, MixLayout, MixPresentation, ParamDefinition, SubMix,
    SubMixElement,
};
pub use parameter::{MixGainAnimation, ParameterBlock, ParameterSubblock};

/// One decoded OBU of any traced kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Obu {
    IaSequenceHeader(IaSequenceHeader),
    CodecConfig(CodecConfig),
    AudioElement(AudioElement),
    MixPresentation(MixPresentation),
    ParameterBlock(ParameterBlock),
    AudioFrame(AudioFrame),
    TemporalDelimiter,
    Sync(SyncObu),
}

/// Kind tag of an [`Obu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObuKind {
    IaSequenceHeader,
    CodecConfig,
    AudioElement,
    MixPresentation,
    ParameterBlock,
    AudioFrame,
    TemporalDelimiter,
    Sync,
}

impl ObuKind {
    /// Prefix of the record header line, `<prefix>_<key>:`.
    pub fn header_name(self) -> &'static str {
        match self {
            ObuKind::IaSequenceHeader => "MagicCodeOBU",
            ObuKind::CodecConfig => "CodecConfigOBU",
            ObuKind::AudioElement => "AudioElementOBU",
            ObuKind::MixPresentation => "MixPresentationOBU",
            ObuKind::ParameterBlock => "ParameterBlockOBU",
            ObuKind::AudioFrame => "AudioFrameOBU",
            ObuKind::TemporalDelimiter => "TemporalDelimiterOBU",
            ObuKind::Sync => "SyncOBU",
        }
    }
}

impl Obu {
    pub fn kind(&self) -> ObuKind {
        match self {
            Obu::IaSequenceHeader(_) => ObuKind::IaSequenceHeader,
            Obu::CodecConfig(_) => ObuKind::CodecConfig,
            Obu::AudioElement(_) => ObuKind::AudioElement,
            Obu::MixPresentation(_) => ObuKind::MixPresentation,
            Obu::ParameterBlock(_) => ObuKind::ParameterBlock,
            Obu::AudioFrame(_) => ObuKind::AudioFrame,
            Obu::TemporalDelimiter => ObuKind::TemporalDelimiter,
            Obu::Sync(_) => ObuKind::Sync,
        }
    }
}

/// IA sequence header ("magic code") OBU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IaSequenceHeader {
    pub ia_code: FourCc,
    pub version: u8,
    pub profile_version: u8,
}

/// Audio frame OBU. Trimming comes from the container, see [`SampleTrim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFrame {
    pub audio_substream_id: u64,
    /// Size of the coded frame in bytes.
    pub size: u32,
}

/// Sync OBU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncObu {
    pub global_offset: u64,
    #[serde(default)]
    pub sync_array: Vec<SyncEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEntry {
    pub obu_id: u64,
    pub obu_data_type: u8,
    #[serde(default)]
    pub reinitialize_decoder: bool,
    pub relative_offset: i32,
}

/// Samples to trim from an audio frame, supplied alongside the OBU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTrim {
    #[serde(default)]
    pub at_start: u64,
    #[serde(default)]
    pub at_end: u64,
}

impl SampleTrim {
    pub fn new(at_start: u64, at_end: u64) -> Self {
        Self { at_start, at_end }
    }
}
