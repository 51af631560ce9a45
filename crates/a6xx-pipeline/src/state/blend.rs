//! Per-render-target blending and the global blend controls.

use a6xx_protocol::regs::{
    rb_mrt_control, RbBlendCntl, RbMrtBlendControl, RbMrtControl, Reg, RopCode, SpBlendCntl, RB_BLEND_CNTL,
    RB_BLEND_RED_F32, SP_BLEND_CNTL,
};
use a6xx_protocol::CsWriter;

use super::{blend_factor, blend_op, rop};
use crate::format::Format;
use crate::types::{BlendFactor, ColorBlendAttachmentState, ColorBlendState, MultisampleState};

pub const BLEND_CONSTANTS_DWORDS: u32 = 5;

/// Exact size of [`emit_blend`] for `attachment_count` attachments.
pub const fn blend_dwords(attachment_count: u32) -> u32 {
    attachment_count * 3 + 4
}

pub fn mrt_blend_control(att: &ColorBlendAttachmentState, has_alpha: bool) -> u32 {
    let color_factor = |f: BlendFactor| {
        if has_alpha {
            blend_factor(f)
        } else {
            blend_factor(f.without_dst_alpha())
        }
    };
    RbMrtBlendControl {
        rgb_src_factor: color_factor(att.src_color_blend_factor) as u32,
        rgb_blend_opcode: blend_op(att.color_blend_op) as u32,
        rgb_dest_factor: color_factor(att.dst_color_blend_factor) as u32,
        alpha_src_factor: blend_factor(att.src_alpha_blend_factor) as u32,
        alpha_blend_opcode: blend_op(att.alpha_blend_op) as u32,
        alpha_dest_factor: blend_factor(att.dst_alpha_blend_factor) as u32,
    }
    .value()
}

/// `rop` is `Some` when logic ops are enabled.
pub fn mrt_control(att: &ColorBlendAttachmentState, rop: Option<RopCode>, is_int: bool, has_alpha: bool) -> u32 {
    let component_enable = att.color_write_mask.bits();
    // Integer targets ignore blending and logic ops.
    if is_int {
        return RbMrtControl {
            rop_code: RopCode::Copy as u32,
            component_enable,
            ..Default::default()
        }
        .value();
    }
    RbMrtControl {
        blend: att.blend_enable,
        blend2: att.blend_enable && has_alpha,
        rop_enable: rop.is_some(),
        rop_code: rop.map_or(0, |r| r as u32),
        component_enable,
    }
    .value()
}

fn sample_mask(msaa: &MultisampleState) -> u32 {
    match msaa.sample_mask {
        Some(mask) => mask & 0xffff,
        None => (1u32 << msaa.rasterization_samples) - 1,
    }
}

/// Records the MRT controls and blend enables. `formats[i]` is `None` for an unused
/// attachment, which keeps blending off for it.
///
/// Returns the mask of render targets that read the destination.
pub fn emit_blend(
    cs: &mut CsWriter,
    blend: &ColorBlendState,
    formats: &[Option<Format>],
    dual_src_blend: bool,
    msaa: &MultisampleState,
) -> u32 {
    let (rop_code, rop_reads_dst) = if blend.logic_op_enable {
        (Some(rop(blend.logic_op)), blend.logic_op.reads_dst())
    } else {
        (None, false)
    };

    let mut blend_enable_mask = 0u32;
    for (i, att) in blend.attachments.iter().enumerate() {
        let (control, blend_control) = match formats.get(i).copied().flatten() {
            Some(format) => {
                let has_alpha = format.has_alpha();
                if att.blend_enable || rop_reads_dst {
                    blend_enable_mask |= 1 << i;
                }
                (
                    mrt_control(att, rop_code, format.is_int(), has_alpha),
                    mrt_blend_control(att, has_alpha),
                )
            }
            None => (0, 0),
        };
        cs.emit_pkt4(rb_mrt_control(i as u32), 2);
        cs.emit(control);
        cs.emit(blend_control);
    }

    cs.emit_regs(&[Reg::new(
        SP_BLEND_CNTL,
        SpBlendCntl {
            enabled: blend_enable_mask,
            unk8: true,
            dual_color_in_enable: dual_src_blend,
            alpha_to_coverage: msaa.alpha_to_coverage_enable,
        }
        .value(),
    )]);
    cs.emit_regs(&[Reg::new(
        RB_BLEND_CNTL,
        RbBlendCntl {
            enable_blend: blend_enable_mask,
            independent_blend: true,
            dual_color_in_enable: dual_src_blend,
            alpha_to_coverage: msaa.alpha_to_coverage_enable,
            alpha_to_one: msaa.alpha_to_one_enable,
            sample_mask: sample_mask(msaa),
        }
        .value(),
    )]);

    blend_enable_mask
}

pub fn emit_blend_constants(cs: &mut CsWriter, constants: &[f32; 4]) {
    cs.emit_pkt4(RB_BLEND_RED_F32, 4);
    for c in constants {
        cs.emit(c.to_bits());
    }
}
