//! Parameter block OBU.

use serde::{Deserialize, Serialize};

/// Parameter block OBU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBlock {
    pub parameter_id: u64,
    pub duration: u64,
    pub constant_subblock_duration: u64,
    pub subblocks: Vec<ParameterSubblock>,
}

/// One subblock; the variant follows the type of the parameter definition
/// the block refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterSubblock {
    MixGain {
        subblock_duration: u64,
        animation: MixGainAnimation,
    },
    Demixing {
        subblock_duration: u64,
        dmixp_mode: u8,
    },
    ReconGain {
        subblock_duration: u64,
    },
}

/// Mix gain animation of one subblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "animation_type", rename_all = "snake_case")]
pub enum MixGainAnimation {
    Step {
        start_point_value: i16,
    },
    Linear {
        start_point_value: i16,
        end_point_value: i16,
    },
    Bezier {
        start_point_value: i16,
        end_point_value: i16,
        control_point_value: i16,
        control_point_relative_time: u8,
    },
}

impl MixGainAnimation {
    /// `animation_type` as coded in the bitstream.
    pub fn animation_type(&self) -> u8 {
        match self {
            MixGainAnimation::Step { .. } => 0,
            MixGainAnimation::Linear { .. } => 1,
            MixGainAnimation::Bezier { .. } => 2,
        }
    }

    /// Key of the nested `param_data` group.
    pub fn name(&self) -> &'static str {
        match self {
            MixGainAnimation::Step { .. } => "step",
            MixGainAnimation::Linear { .. } => "linear",
            MixGainAnimation::Bezier { .. } => "bezier",
        }
    }
}
