//! Audio element OBU.

use serde::{Deserialize, Serialize};

/// Audio element OBU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioElement {
    pub audio_element_id: u64,
    pub codec_config_id: u64,
    #[serde(default)]
    pub audio_substream_ids: Vec<u64>,
    #[serde(default)]
    pub num_parameters: u64,
    pub config: AudioElementConfig,
}

impl AudioElement {
    /// `audio_element_type` as coded in the bitstream.
    pub fn element_type(&self) -> u8 {
        self.config.element_type()
    }
}

/// Type-specific part of an audio element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioElementConfig {
    ChannelBased {
        layers: Vec<ChannelLayerConfig>,
    },
    SceneBased {
        ambisonics: AmbisonicsConfig,
    },
    /// Reserved element type; only the type number is traced.
    Reserved {
        element_type: u8,
    },
}

impl AudioElementConfig {
    pub fn element_type(&self) -> u8 {
        match self {
            AudioElementConfig::ChannelBased { .. } => 0,
            AudioElementConfig::SceneBased { .. } => 1,
            AudioElementConfig::Reserved { element_type } => *element_type,
        }
    }
}

/// One layer of a scalable channel layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLayerConfig {
    pub loudspeaker_layout: u8,
    #[serde(default)]
    pub output_gain_is_present_flag: bool,
    #[serde(default)]
    pub recon_gain_is_present_flag: bool,
    pub substream_count: u8,
    pub coupled_substream_count: u8,
}

/// Ambisonics configuration of a scene-based element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AmbisonicsConfig {
    Mono {
        output_channel_count: u8,
        substream_count: u8,
        channel_mapping: Vec<u8>,
    },
    Projection {
        output_channel_count: u8,
        substream_count: u8,
        coupled_substream_count: u8,
        /// Demixing matrix coefficients in coded order.
        demixing_matrix: Vec<i16>,
    },
}

impl AmbisonicsConfig {
    /// `ambisonics_mode` as coded in the bitstream.
    pub fn mode(&self) -> u8 {
        match self {
            AmbisonicsConfig::Mono { .. } => 0,
            AmbisonicsConfig::Projection { .. } => 1,
        }
    }
}
