//! Mix presentation OBU and the parameter definitions it embeds.

use serde::{Deserialize, Serialize};

/// Mix presentation OBU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixPresentation {
    pub mix_presentation_id: u64,
    #[serde(default)]
    pub friendly_label: String,
    pub sub_mixes: Vec<SubMix>,
}

/// One sub-mix of a mix presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMix {
    pub audio_elements: Vec<SubMixElement>,
    pub output_mix_gain: MixGain,
    #[serde(default)]
    pub layouts: Vec<MixLayout>,
}

/// Rendering config of one audio element inside a sub-mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMixElement {
    pub audio_element_id: u64,
    #[serde(default)]
    pub friendly_label: String,
    pub mix_gain: MixGain,
}

/// Mix gain: a parameter definition plus the gain used when no parameter
/// block applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixGain {
    pub param_definition: ParamDefinition,
    pub default_mix_gain: i16,
}

/// Parameter definition shared by mix gain, demixing and recon gain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub parameter_id: u64,
    pub parameter_rate: u64,
    /// 0 when the timing fields below are present in the definition.
    pub param_definition_mode: u8,
    #[serde(default)]
    pub duration: u64,
    /// Used as given with a constant subblock duration; otherwise the
    /// length of `subblock_durations` is rendered.
    #[serde(default)]
    pub num_subblocks: u64,
    #[serde(default)]
    pub constant_subblock_duration: u64,
    /// Only meaningful when `constant_subblock_duration` is 0.
    #[serde(default)]
    pub subblock_durations: Vec<u64>,
}

impl ParamDefinition {
    pub fn has_timing(&self) -> bool {
        self.param_definition_mode == 0
    }
}

/// A loudness layout and the loudness measured for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixLayout {
    pub layout: LoudnessLayout,
    pub loudness: LoudnessInfo,
}

/// Playback layout a loudness measurement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout_type", rename_all = "snake_case")]
pub enum LoudnessLayout {
    /// Loudspeaker positions given as labels.
    SpLabel { sp_labels: Vec<u8> },
    /// Loudspeaker layout given as an ITU-R BS.2051 sound system.
    SoundSystem { sound_system: u8 },
    Binaural,
    Reserved { value: u8 },
}

impl LoudnessLayout {
    /// `layout_type` as coded in the bitstream.
    pub fn layout_type(&self) -> u8 {
        match self {
            LoudnessLayout::SpLabel { .. } => 1,
            LoudnessLayout::SoundSystem { .. } => 2,
            LoudnessLayout::Binaural => 3,
            LoudnessLayout::Reserved { value } => *value,
        }
    }
}

/// Loudness info of one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoudnessInfo {
    pub info_type: u8,
    pub integrated_loudness: i16,
    pub digital_peak: i16,
}
