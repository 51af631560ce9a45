//! Descriptor prefetch: bindless `CP_LOAD_STATE6` packets that warm the descriptor caches
//! for every binding of the descriptor sets a pipeline uses.
//!
//! Sizing and emission walk the layout with the same rules; the emitted block is an exact
//! draw state, so any disagreement between the two panics.

use a6xx_protocol::pm4::{
    load_state6_bindless_addr, CpOpcode, LoadState6Dw0, StateBlock, StateSrc, StateType, LOAD_STATE6_MAX_UNITS,
};
use a6xx_protocol::{CmdStream, CsWriter, DrawState};

use crate::config::{MAX_SETS, TEX_CONST_DWORDS};
use crate::layout::{DescriptorBinding, DescriptorType, PipelineLayout};
use crate::types::ShaderStageFlags;

const LOAD_STATE_DWORDS: u32 = 4;

fn binding_stages(binding: &DescriptorBinding, compute: bool) -> ShaderStageFlags {
    // Some applications pass stage bits the hardware does not have.
    if compute {
        binding.stages & ShaderStageFlags::COMPUTE
    } else {
        binding.stages & ShaderStageFlags::ALL_GRAPHICS
    }
}

fn is_storage(ty: DescriptorType) -> bool {
    matches!(
        ty,
        DescriptorType::StorageBuffer
            | DescriptorType::StorageBufferDynamic
            | DescriptorType::StorageImage
            | DescriptorType::StorageTexelBuffer
    )
}

fn packet_count(binding: &DescriptorBinding, stages: ShaderStageFlags) -> u32 {
    let stage_count = stages.bits().count_ones();
    match binding.descriptor_type {
        // IBO-backed resources take one packet for all graphics stages.
        ty if is_storage(ty) => {
            u32::from(stages.intersects(!ShaderStageFlags::COMPUTE))
                + u32::from(stages.contains(ShaderStageFlags::COMPUTE))
        }
        DescriptorType::Sampler
        | DescriptorType::SampledImage
        | DescriptorType::UniformTexelBuffer
        | DescriptorType::UniformBuffer
        | DescriptorType::UniformBufferDynamic => stage_count,
        // Texture and sampler descriptors are interleaved, so each element needs two packets.
        DescriptorType::CombinedImageSampler => stage_count * binding.array_size * 2,
        _ => 0,
    }
}

fn active_bindings<'a>(
    layout: &'a PipelineLayout,
    active_desc_sets: u32,
) -> impl Iterator<Item = (usize, u32, &'a DescriptorBinding)> + 'a {
    layout
        .sets()
        .iter()
        .enumerate()
        .filter(move |(i, _)| active_desc_sets & (1 << i) != 0)
        .flat_map(|(i, set)| {
            set.layout
                .bindings()
                .iter()
                .map(move |b| (i, set.dynamic_offset_start, b))
        })
}

/// Dwords of prefetch packets needed for the active sets of `layout`.
pub fn load_state_size(layout: &PipelineLayout, active_desc_sets: u32, compute: bool) -> u32 {
    active_bindings(layout, active_desc_sets)
        .filter(|(_, _, b)| b.array_size != 0)
        .map(|(_, _, b)| packet_count(b, binding_stages(b, compute)) * LOAD_STATE_DWORDS)
        .sum()
}

fn emit_packet(cs: &mut CsWriter, opcode: CpOpcode, st: StateType, sb: StateBlock, base: u32, offset: u32, count: u32) {
    // A single packet even if the count overflows NUM_UNIT.
    cs.emit_pkt7(opcode, 3);
    cs.emit(
        LoadState6Dw0 {
            dst_off: 0,
            state_type: st,
            state_src: StateSrc::Bindless,
            state_block: sb,
            num_unit: count.min(LOAD_STATE6_MAX_UNITS),
        }
        .value(),
    );
    cs.emit_qw(load_state6_bindless_addr(offset, base));
}

/// Emits the prefetch packets sized by [`load_state_size`].
pub fn emit_load_state(cs: &mut CsWriter, layout: &PipelineLayout, active_desc_sets: u32, compute: bool) {
    for (set, dynamic_offset_start, binding) in active_bindings(layout, active_desc_sets) {
        let stages = binding_stages(binding, compute);
        let count = binding.array_size;
        if count == 0 || stages.is_empty() {
            continue;
        }

        let (base, offset) = if binding.descriptor_type.is_dynamic() {
            (MAX_SETS, (dynamic_offset_start + binding.dynamic_offset_offset) * TEX_CONST_DWORDS)
        } else {
            (set as u32, binding.offset / 4)
        };

        match binding.descriptor_type {
            ty if is_storage(ty) => {
                if stages.intersects(!ShaderStageFlags::COMPUTE) {
                    emit_packet(cs, CpOpcode::LoadState6, StateType::Shader, StateBlock::Ibo, base, offset, count);
                }
                if stages.contains(ShaderStageFlags::COMPUTE) {
                    let (opcode, sb) = (CpOpcode::LoadState6Frag, StateBlock::CsShader);
                    emit_packet(cs, opcode, StateType::Ibo, sb, base, offset, count);
                }
            }
            DescriptorType::Sampler | DescriptorType::SampledImage | DescriptorType::UniformTexelBuffer => {
                let st = if binding.descriptor_type == DescriptorType::Sampler {
                    StateType::Shader
                } else {
                    StateType::Constants
                };
                for stage in stages.stages() {
                    emit_packet(cs, stage.load_state_opcode(), st, stage.tex_state_block(), base, offset, count);
                }
            }
            DescriptorType::UniformBuffer | DescriptorType::UniformBufferDynamic => {
                for stage in stages.stages() {
                    emit_packet(
                        cs,
                        stage.load_state_opcode(),
                        StateType::Ubo,
                        stage.shader_state_block(),
                        base,
                        offset,
                        count,
                    );
                }
            }
            DescriptorType::CombinedImageSampler => {
                for stage in stages.stages() {
                    for i in 0..count {
                        let tex_offset = offset + 2 * i * TEX_CONST_DWORDS;
                        let sam_offset = offset + (2 * i + 1) * TEX_CONST_DWORDS;
                        let opcode = stage.load_state_opcode();
                        let sb = stage.tex_state_block();
                        emit_packet(cs, opcode, StateType::Constants, sb, base, tex_offset, 1);
                        emit_packet(cs, opcode, StateType::Shader, sb, base, sam_offset, 1);
                    }
                }
            }
            // Input attachments are not bindless.
            _ => {}
        }
    }
}

/// Records the prefetch block into `stream`. Returns an empty draw state when there is
/// nothing to prefetch.
pub fn build_load_state(
    stream: &mut CmdStream,
    layout: &PipelineLayout,
    active_desc_sets: u32,
    compute: bool,
) -> DrawState {
    let size = load_state_size(layout, active_desc_sets, compute);
    if size == 0 {
        return DrawState::default();
    }
    let mut cs = stream.draw_state(size as usize);
    emit_load_state(&mut cs, layout, active_desc_sets, compute);
    stream.end_sub_stream(cs)
}
