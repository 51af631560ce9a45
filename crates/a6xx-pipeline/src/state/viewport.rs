//! Viewport transform, guardband and scissor.

use a6xx_protocol::regs::{
    guardband_clip_adj, scissor_xy, Reg, GRAS_CL_GUARDBAND_CLIP_ADJ, GRAS_CL_VPORT_XOFFSET0, GRAS_CL_VPORT_XSCALE0,
    GRAS_CL_VPORT_YOFFSET0, GRAS_CL_VPORT_YSCALE0, GRAS_CL_VPORT_ZOFFSET0, GRAS_CL_VPORT_ZSCALE0,
    GRAS_CL_Z_CLAMP_MAX0, GRAS_CL_Z_CLAMP_MIN0, GRAS_SC_SCREEN_SCISSOR_BR0, GRAS_SC_SCREEN_SCISSOR_TL0,
    GRAS_SC_VIEWPORT_SCISSOR_TL0, RB_Z_CLAMP_MAX, RB_Z_CLAMP_MIN,
};
use a6xx_protocol::CsWriter;

use crate::types::{Offset2D, Rect2D, Viewport};

pub const VIEWPORT_DWORDS: u32 = 18;
pub const SCISSOR_DWORDS: u32 = 3;

/// Largest screen coordinate the scissor registers hold.
pub const MAX_SCISSOR_COORD: i64 = (1 << 15) - 1;

const GUARDBAND_MIN: f32 = -32768.0;
const GUARDBAND_MAX: f32 = 32767.0;
const GUARDBAND_ADJ_MAX: u32 = 0x1ff;

/// Clip adjustment for one axis of the viewport transform.
///
/// The guardband is the largest range `[-adj, adj]` in normalized coordinates that stays
/// inside the rasterizer's coordinate range. The result is the unsigned 3.6 float
/// `GRAS_CL_GUARDBAND_CLIP_ADJ` expects, rounded down and saturated.
pub fn calc_guardband(offset: f32, scale: f32) -> u32 {
    let scale = scale.abs();
    let min_ndc = (GUARDBAND_MIN - offset) / scale;
    let max_ndc = (GUARDBAND_MAX - offset) / scale;
    let adj = (-min_ndc).min(max_ndc);

    if adj.is_nan() || adj < 1.0 {
        return 0;
    }
    if adj.is_infinite() {
        return GUARDBAND_ADJ_MAX;
    }

    let exponent = adj.log2().floor() as u32;
    if exponent > 7 {
        return GUARDBAND_ADJ_MAX;
    }
    let mantissa = ((adj / (1u32 << exponent) as f32 - 1.0) * 64.0) as u32;
    (exponent << 6) | mantissa.min(63)
}

/// Integer bounding box of `vp`, min inclusive and max exclusive.
///
/// Negative heights flip the box. Both corners are clamped to the window scissor range, and
/// each axis is at least one pixel wide so that `max - 1` never drops below `min`.
pub fn viewport_bounds(vp: &Viewport) -> (Offset2D, Offset2D) {
    let (y0, y1) = if vp.height >= 0.0 {
        (vp.y, vp.y + vp.height)
    } else {
        (vp.y + vp.height, vp.y)
    };

    let limit = MAX_SCISSOR_COORD as i32;
    let axis = |lo: f32, hi: f32| {
        let min = (lo as i32).clamp(0, limit);
        let max = (hi.ceil() as i32).clamp(min + 1, limit + 1);
        (min, max)
    };
    let (min_x, max_x) = axis(vp.x, vp.x + vp.width);
    let (min_y, max_y) = axis(y0, y1);
    (Offset2D { x: min_x, y: min_y }, Offset2D { x: max_x, y: max_y })
}

pub fn emit_viewport(cs: &mut CsWriter, vp: &Viewport) {
    let scale = [vp.width / 2.0, vp.height / 2.0, vp.max_depth - vp.min_depth];
    let offset = [vp.x + scale[0], vp.y + scale[1], vp.min_depth];

    let (min, max) = viewport_bounds(vp);

    cs.emit_regs(&[
        Reg::float(GRAS_CL_VPORT_XOFFSET0, offset[0]),
        Reg::float(GRAS_CL_VPORT_XSCALE0, scale[0]),
        Reg::float(GRAS_CL_VPORT_YOFFSET0, offset[1]),
        Reg::float(GRAS_CL_VPORT_YSCALE0, scale[1]),
        Reg::float(GRAS_CL_VPORT_ZOFFSET0, offset[2]),
        Reg::float(GRAS_CL_VPORT_ZSCALE0, scale[2]),
    ]);

    cs.emit_pkt4(GRAS_SC_VIEWPORT_SCISSOR_TL0, 2);
    cs.emit(scissor_xy(min.x as u32, min.y as u32));
    cs.emit(scissor_xy((max.x - 1) as u32, (max.y - 1) as u32));

    cs.emit_write_reg(
        GRAS_CL_GUARDBAND_CLIP_ADJ,
        guardband_clip_adj(calc_guardband(offset[0], scale[0]), calc_guardband(offset[1], scale[1])),
    );

    let z_clamp_min = vp.min_depth.min(vp.max_depth);
    let z_clamp_max = vp.min_depth.max(vp.max_depth);
    cs.emit_regs(&[
        Reg::float(GRAS_CL_Z_CLAMP_MIN0, z_clamp_min),
        Reg::float(GRAS_CL_Z_CLAMP_MAX0, z_clamp_max),
    ]);
    cs.emit_regs(&[
        Reg::float(RB_Z_CLAMP_MIN, z_clamp_min),
        Reg::float(RB_Z_CLAMP_MAX, z_clamp_max),
    ]);
}

/// Screen scissor corners `(tl, br)` as written to the hardware, br inclusive.
pub fn scissor_bounds(rect: &Rect2D) -> ((u32, u32), (u32, u32)) {
    let mut min = (i64::from(rect.offset.x), i64::from(rect.offset.y));
    let mut max = (
        min.0 + i64::from(rect.extent.width),
        min.1 + i64::from(rect.extent.height),
    );

    // An empty scissor at the origin would underflow max - 1.
    if max.0 == 0 {
        min.0 = 1;
        max.0 = 1;
    }
    if max.1 == 0 {
        min.1 = 1;
        max.1 = 1;
    }

    let clamp = |v: i64| v.clamp(0, MAX_SCISSOR_COORD);
    let (min_x, min_y) = (clamp(min.0), clamp(min.1));
    let (max_x, max_y) = (clamp(max.0), clamp(max.1));
    (
        (min_x as u32, min_y as u32),
        ((max_x - 1).max(0) as u32, (max_y - 1).max(0) as u32),
    )
}

pub fn emit_scissor(cs: &mut CsWriter, rect: &Rect2D) {
    let ((tl_x, tl_y), (br_x, br_y)) = scissor_bounds(rect);
    cs.emit_regs(&[
        Reg::new(GRAS_SC_SCREEN_SCISSOR_TL0, scissor_xy(tl_x, tl_y)),
        Reg::new(GRAS_SC_SCREEN_SCISSOR_BR0, scissor_xy(br_x, br_y)),
    ]);
}
