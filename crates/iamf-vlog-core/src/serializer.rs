//! Renders decoded OBUs into record-trace blocks.
//!
//! Every OBU becomes one `#0` ... `##` block whose first line is
//! `<Kind>OBU_<key>:`. The first field is written as a list item and the
//! remaining top-level fields hang off it one level deeper. Rendering is a
//! pure function of its input.

use tracing::warn;

use crate::category::Category;
use crate::error::VlogResult;
use crate::line::TraceBlock;
use crate::obu::{
    AmbisonicsConfig, AudioElement, AudioElementConfig, AudioFrame, CodecConfig, DecoderConfig,
    IaSequenceHeader, LoudnessLayout, MixGain, MixGainAnimation, MixPresentation, Obu,
    ParamDefinition, ParameterBlock, ParameterSubblock, SampleTrim, SyncObu,
};

/// Render `obu` as the record-trace block with emission key `key`.
///
/// `trim` only affects audio frames. Fails with
/// [`VlogError::SerializationOverflow`](crate::VlogError::SerializationOverflow)
/// if the block would exceed `limit` bytes.
pub fn render_obu(obu: &Obu, key: u64, trim: SampleTrim, limit: usize) -> VlogResult<String> {
    let mut block = TraceBlock::new(Category::Record, limit);
    block.line(0, format_args!("{}_{}:", obu.kind().header_name(), key));

    match obu {
        Obu::IaSequenceHeader(header) => write_sequence_header(&mut block, header),
        Obu::CodecConfig(config) => write_codec_config(&mut block, config),
        Obu::AudioElement(element) => write_audio_element(&mut block, element),
        Obu::MixPresentation(mix) => write_mix_presentation(&mut block, mix),
        Obu::ParameterBlock(params) => write_parameter_block(&mut block, params),
        Obu::AudioFrame(frame) => write_audio_frame(&mut block, frame, trim),
        Obu::TemporalDelimiter => {}
        Obu::Sync(sync) => write_sync(&mut block, sync),
    }

    block.finish()
}

fn write_sequence_header(block: &mut TraceBlock, header: &IaSequenceHeader) {
    block
        .item_field(0, "ia_code", header.ia_code.value())
        .field(1, "version", header.version)
        .field(1, "profile_version", header.profile_version);
}

fn write_codec_config(block: &mut TraceBlock, config: &CodecConfig) {
    block
        .item_field(0, "codec_config_id", config.codec_config_id)
        .key(1, "codec_config")
        .field(2, "codec_id", config.codec_id.value())
        .field(2, "num_samples_per_frame", config.num_samples_per_frame)
        .field(2, "roll_distance", config.roll_distance);

    match config.parse_decoder_config() {
        DecoderConfig::Opus(opus) => {
            block
                .key(2, "decoder_config_opus")
                .field(3, "version", opus.version)
                .field(3, "output_channel_count", opus.output_channel_count)
                .field(3, "pre_skip", opus.pre_skip)
                .field(3, "input_sample_rate", opus.input_sample_rate)
                .field(3, "output_gain", opus.output_gain)
                .field(3, "mapping_family", opus.mapping_family);
        }
        DecoderConfig::Lpcm(lpcm) => {
            block
                .key(2, "decoder_config_lpcm")
                .field(3, "sample_format_flags", lpcm.sample_format_flags)
                .field(3, "sample_size", lpcm.sample_size)
                .field(3, "sample_rate", lpcm.sample_rate);
        }
        DecoderConfig::Truncated { needed, got } => {
            warn!(
                codec_config_id = config.codec_config_id,
                codec_id = %config.codec_id,
                needed,
                got,
                "Decoder config too short, omitting it from the log"
            );
        }
        DecoderConfig::Opaque => {}
    }
}

fn write_audio_element(block: &mut TraceBlock, element: &AudioElement) {
    block
        .item_field(0, "audio_element_id", element.audio_element_id)
        .field(1, "audio_element_type", element.element_type())
        .field(1, "codec_config_id", element.codec_config_id)
        .field(1, "num_substreams", element.audio_substream_ids.len())
        .key(1, "audio_substream_ids");
    for id in &element.audio_substream_ids {
        block.item(1, id);
    }
    block.field(1, "num_parameters", element.num_parameters);

    match &element.config {
        AudioElementConfig::ChannelBased { layers } => {
            block
                .key(1, "scalable_channel_layout_config")
                .field(2, "num_layers", layers.len())
                .key(2, "channel_audio_layer_configs");
            for layer in layers {
                block
                    .item_field(2, "loudspeaker_layout", layer.loudspeaker_layout)
                    .field(3, "output_gain_is_present_flag", u8::from(layer.output_gain_is_present_flag))
                    .field(3, "recon_gain_is_present_flag", u8::from(layer.recon_gain_is_present_flag))
                    .field(3, "substream_count", layer.substream_count)
                    .field(3, "coupled_substream_count", layer.coupled_substream_count);
            }
        }
        AudioElementConfig::SceneBased { ambisonics } => {
            block
                .key(1, "ambisonics_config")
                .field(2, "ambisonics_mode", ambisonics.mode());
            match ambisonics {
                AmbisonicsConfig::Mono {
                    output_channel_count,
                    substream_count,
                    channel_mapping,
                } => {
                    block
                        .key(2, "ambisonics_mono_config")
                        .field(3, "output_channel_count", output_channel_count)
                        .field(3, "substream_count", substream_count)
                        .key(3, "channel_mapping");
                    for channel in channel_mapping {
                        block.item(3, channel);
                    }
                }
                AmbisonicsConfig::Projection {
                    output_channel_count,
                    substream_count,
                    coupled_substream_count,
                    demixing_matrix,
                } => {
                    block
                        .key(2, "ambisonics_projection_config")
                        .field(3, "output_channel_count", output_channel_count)
                        .field(3, "substream_count", substream_count)
                        .field(3, "coupled_substream_count", coupled_substream_count)
                        .key(3, "demixing_matrix");
                    for coefficient in demixing_matrix {
                        block.item(3, coefficient);
                    }
                }
            }
        }
        AudioElementConfig::Reserved { .. } => {}
    }
}

fn write_mix_presentation(block: &mut TraceBlock, mix: &MixPresentation) {
    block
        .item_field(0, "mix_presentation_id", mix.mix_presentation_id)
        .key(1, "mix_presentation_annotations")
        .quoted(2, "mix_presentation_friendly_label", &mix.friendly_label)
        .field(1, "num_sub_mixes", mix.sub_mixes.len())
        .key(1, "sub_mixes");

    for sub_mix in &mix.sub_mixes {
        block
            .item_field(1, "num_audio_elements", sub_mix.audio_elements.len())
            .key(2, "audio_elements");
        for element in &sub_mix.audio_elements {
            block
                .item_field(2, "audio_element_id", element.audio_element_id)
                .key(3, "mix_presentation_element_annotations")
                .quoted(4, "audio_element_friendly_label", &element.friendly_label)
                .key(3, "element_mix_config");
            write_mix_gain(block, 4, "mix_gain", &element.mix_gain);
        }

        block.key(2, "output_mix_config");
        write_mix_gain(block, 3, "output_mix_gain", &sub_mix.output_mix_gain);

        block
            .field(2, "num_layouts", sub_mix.layouts.len())
            .key(2, "layouts");
        for layout in &sub_mix.layouts {
            block
                .item_key(2, "loudness_layout")
                .field(4, "layout_type", layout.layout.layout_type());
            match &layout.layout {
                LoudnessLayout::SpLabel { sp_labels } => {
                    block
                        .key(4, "sp_layout")
                        .field(5, "num_loudspeakers", sp_labels.len())
                        .key(5, "sp_labels");
                    for label in sp_labels {
                        block.item(5, label);
                    }
                }
                LoudnessLayout::SoundSystem { sound_system } => {
                    block.key(4, "ss_layout").field(5, "sound_system", sound_system);
                }
                LoudnessLayout::Binaural | LoudnessLayout::Reserved { .. } => {}
            }

            block
                .key(3, "loudness")
                .field(4, "info_type", layout.loudness.info_type)
                .field(4, "integrated_loudness", layout.loudness.integrated_loudness)
                .field(4, "digital_peak", layout.loudness.digital_peak);
        }
    }
}

/// `key:` / `param_definition:` / fields / `default_mix_gain`, used for both
/// element and output mix gains.
fn write_mix_gain(block: &mut TraceBlock, indent: usize, key: &str, gain: &MixGain) {
    block.key(indent, key).key(indent + 1, "param_definition");
    write_param_definition(block, indent + 2, &gain.param_definition);
    block.field(indent + 1, "default_mix_gain", gain.default_mix_gain);
}

fn write_param_definition(block: &mut TraceBlock, indent: usize, def: &ParamDefinition) {
    block
        .field(indent, "parameter_id", def.parameter_id)
        .field(indent, "parameter_rate", def.parameter_rate)
        .field(indent, "param_definition_mode", def.param_definition_mode);
    if !def.has_timing() {
        return;
    }
    // With explicit durations the count is whatever is listed
    let num_subblocks = match def.constant_subblock_duration {
        0 => def.subblock_durations.len() as u64,
        _ => def.num_subblocks,
    };
    block
        .field(indent, "duration", def.duration)
        .field(indent, "num_subblocks", num_subblocks)
        .field(indent, "constant_subblock_duration", def.constant_subblock_duration);
    if def.constant_subblock_duration == 0 {
        block.key(indent, "subblock_durations");
        for duration in &def.subblock_durations {
            block.item(indent, duration);
        }
    }
}

fn write_parameter_block(block: &mut TraceBlock, params: &ParameterBlock) {
    block
        .item_field(0, "parameter_id", params.parameter_id)
        .field(1, "duration", params.duration)
        .field(1, "num_subblocks", params.subblocks.len())
        .field(1, "constant_subblock_duration", params.constant_subblock_duration)
        .key(1, "subblocks");

    for subblock in &params.subblocks {
        match subblock {
            ParameterSubblock::MixGain {
                subblock_duration,
                animation,
            } => {
                block
                    .item_key(1, "mix_gain_parameter_data")
                    .field(3, "subblock_duration", subblock_duration)
                    .field(3, "animation_type", animation.animation_type())
                    .key(3, "param_data")
                    .key(4, animation.name());
                write_animation(block, 5, animation);
            }
            ParameterSubblock::Demixing {
                subblock_duration,
                dmixp_mode,
            } => {
                block
                    .item_key(1, "demixing_info_parameter_data")
                    .field(3, "subblock_duration", subblock_duration)
                    .field(3, "dmixp_mode", dmixp_mode);
            }
            ParameterSubblock::ReconGain { subblock_duration } => {
                block
                    .item_key(1, "recon_gain_parameter_data")
                    .field(3, "subblock_duration", subblock_duration);
            }
        }
    }
}

fn write_animation(block: &mut TraceBlock, indent: usize, animation: &MixGainAnimation) {
    match *animation {
        MixGainAnimation::Step { start_point_value } => {
            block.field(indent, "start_point_value", start_point_value);
        }
        MixGainAnimation::Linear {
            start_point_value,
            end_point_value,
        } => {
            block
                .field(indent, "start_point_value", start_point_value)
                .field(indent, "end_point_value", end_point_value);
        }
        MixGainAnimation::Bezier {
            start_point_value,
            end_point_value,
            control_point_value,
            control_point_relative_time,
        } => {
            block
                .field(indent, "start_point_value", start_point_value)
                .field(indent, "end_point_value", end_point_value)
                .field(indent, "control_point_value", control_point_value)
                .field(indent, "control_point_relative_time", control_point_relative_time);
        }
    }
}

fn write_audio_frame(block: &mut TraceBlock, frame: &AudioFrame, trim: SampleTrim) {
    block
        .item_field(0, "audio_substream_id", frame.audio_substream_id)
        .field(1, "num_samples_to_trim_at_start", trim.at_start)
        .field(1, "num_samples_to_trim_at_end", trim.at_end)
        .field(1, "size_of(audio_frame)", frame.size);
}

fn write_sync(block: &mut TraceBlock, sync: &SyncObu) {
    block
        .item_field(0, "global_offset", sync.global_offset)
        .field(1, "num_obu_ids", sync.sync_array.len())
        .key(1, "sync_array");
    for entry in &sync.sync_array {
        block
            .item_field(1, "obu_id", entry.obu_id)
            .field(2, "obu_data_type", entry.obu_data_type)
            .field(2, "reinitialize_decoder", u8::from(entry.reinitialize_decoder))
            .field(2, "relative_offset", entry.relative_offset);
    }
}
