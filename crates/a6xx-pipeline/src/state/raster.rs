//! Rasterizer: clipping, polygon mode, culling, line width and depth bias.

use a6xx_protocol::regs::{
    gras_su_point_minmax, sfixed_12_4, GrasClCntl, GrasSuCntl, Reg, GRAS_CL_CNTL, GRAS_SU_CNTL, GRAS_SU_POINT_MINMAX,
    GRAS_SU_POINT_SIZE, GRAS_SU_POLY_OFFSET_SCALE, PC_POLYGON_MODE, VPC_POLYGON_MODE,
};
use a6xx_protocol::CsWriter;

use super::polygon_mode;
use crate::types::{CullMode, FrontFace, RasterizationState};

pub const RAST_DWORDS: u32 = 9;
pub const LINE_WIDTH_DWORDS: u32 = 2;
pub const DEPTH_BIAS_DWORDS: u32 = 4;

const POINT_SIZE_MIN: f32 = 1.0 / 16.0;
const POINT_SIZE_MAX: f32 = 4092.0;

/// Depth clipping follows depth clamping unless the depth-clip override is present.
pub fn depth_clip_disable(rast: &RasterizationState) -> bool {
    match rast.depth_clip_enable {
        Some(enable) => !enable,
        None => rast.depth_clamp_enable,
    }
}

pub fn emit_rast(cs: &mut CsWriter, rast: &RasterizationState) {
    let clip_disable = depth_clip_disable(rast);
    let mut cl = GrasClCntl::ZERO_GB_SCALE_Z | GrasClCntl::VP_CLIP_CODE_IGNORE;
    cl.set(GrasClCntl::ZNEAR_CLIP_DISABLE | GrasClCntl::ZFAR_CLIP_DISABLE, clip_disable);
    cl.set(GrasClCntl::UNK5, rast.depth_clamp_enable);
    cs.emit_regs(&[Reg::new(GRAS_CL_CNTL, cl.bits())]);

    let mode = polygon_mode(rast.polygon_mode) as u32;
    cs.emit_regs(&[Reg::new(VPC_POLYGON_MODE, mode)]);
    cs.emit_regs(&[Reg::new(PC_POLYGON_MODE, mode)]);

    cs.emit_regs(&[
        Reg::new(GRAS_SU_POINT_MINMAX, gras_su_point_minmax(POINT_SIZE_MIN, POINT_SIZE_MAX)),
        Reg::new(GRAS_SU_POINT_SIZE, sfixed_12_4(1.0)),
    ]);
}

/// `GRAS_SU_CNTL` without the line width, which is either baked or supplied per draw.
pub fn gras_su_cntl(rast: &RasterizationState, samples: u32) -> u32 {
    GrasSuCntl {
        cull_front: rast.cull_mode.contains(CullMode::FRONT),
        cull_back: rast.cull_mode.contains(CullMode::BACK),
        front_cw: rast.front_face == FrontFace::Clockwise,
        linehalfwidth: 0.0,
        poly_offset: rast.depth_bias_enable,
        msaa_enable: samples > 1,
    }
    .value()
}

/// Writes `GRAS_SU_CNTL` with the line width folded into `su`.
pub fn emit_line_width(cs: &mut CsWriter, su: u32, width: f32) {
    let su = (su & !GrasSuCntl::LINEHALFWIDTH_MASK) | GrasSuCntl::linehalfwidth(width / 2.0);
    cs.emit_regs(&[Reg::new(GRAS_SU_CNTL, su)]);
}

pub fn emit_depth_bias(cs: &mut CsWriter, constant: f32, clamp: f32, slope: f32) {
    cs.emit_pkt4(GRAS_SU_POLY_OFFSET_SCALE, 3);
    cs.emit(slope.to_bits());
    cs.emit(constant.to_bits());
    cs.emit(clamp.to_bits());
}

#[cfg(test)]
mod tests {
    use a6xx_protocol::decode::RegisterWrites;
    use a6xx_protocol::regs::{
        PolygonMode as HwPolygonMode, GRAS_SU_POLY_OFFSET_OFFSET, GRAS_SU_POLY_OFFSET_OFFSET_CLAMP,
    };

    use super::*;
    use crate::types::PolygonMode;

    #[test]
    fn rast_block_has_fixed_size() {
        let rast = RasterizationState {
            polygon_mode: PolygonMode::Line,
            ..Default::default()
        };
        let mut cs = CsWriter::unbounded();
        emit_rast(&mut cs, &rast);
        assert_eq!(cs.len() as u32, RAST_DWORDS);

        let regs = RegisterWrites::decode(cs.words()).unwrap();
        assert_eq!(regs.get(VPC_POLYGON_MODE), Some(HwPolygonMode::Lines as u32));
        assert_eq!(regs.get(PC_POLYGON_MODE), Some(HwPolygonMode::Lines as u32));
        assert_eq!(
            regs.get(GRAS_CL_CNTL),
            Some((GrasClCntl::ZERO_GB_SCALE_Z | GrasClCntl::VP_CLIP_CODE_IGNORE).bits())
        );
        assert_eq!(regs.get(GRAS_SU_POINT_SIZE), Some(16));
    }

    #[test]
    fn depth_clip_override_wins_over_clamp() {
        let clamp = RasterizationState {
            depth_clamp_enable: true,
            ..Default::default()
        };
        assert!(depth_clip_disable(&clamp));

        let clamp_but_clip = RasterizationState {
            depth_clip_enable: Some(true),
            ..clamp
        };
        assert!(!depth_clip_disable(&clamp_but_clip));

        let mut cs = CsWriter::unbounded();
        emit_rast(&mut cs, &clamp_but_clip);
        let cl = RegisterWrites::decode(cs.words()).unwrap().get(GRAS_CL_CNTL).unwrap();
        assert_eq!(cl & GrasClCntl::ZNEAR_CLIP_DISABLE.bits(), 0);
        assert_ne!(cl & GrasClCntl::UNK5.bits(), 0);
    }

    #[test]
    fn su_cntl_from_cull_and_samples() {
        let rast = RasterizationState {
            cull_mode: CullMode::BACK,
            front_face: FrontFace::Clockwise,
            depth_bias_enable: true,
            ..Default::default()
        };
        let su = gras_su_cntl(&rast, 4);
        assert_eq!(
            su,
            GrasSuCntl {
                cull_back: true,
                front_cw: true,
                poly_offset: true,
                msaa_enable: true,
                ..Default::default()
            }
            .value()
        );
        assert_eq!(su & GrasSuCntl::LINEHALFWIDTH_MASK, 0);
    }

    #[test]
    fn line_width_replaces_previous_width() {
        let su = GrasSuCntl::linehalfwidth(8.0) | 1;
        let mut cs = CsWriter::unbounded();
        emit_line_width(&mut cs, su, 1.0);
        assert_eq!(cs.len() as u32, LINE_WIDTH_DWORDS);
        let regs = RegisterWrites::decode(cs.words()).unwrap();
        assert_eq!(regs.get(GRAS_SU_CNTL), Some(1 | GrasSuCntl::linehalfwidth(0.5)));
    }

    #[test]
    fn depth_bias_order_is_slope_constant_clamp() {
        let mut cs = CsWriter::unbounded();
        emit_depth_bias(&mut cs, 1.0, 2.0, 3.0);
        assert_eq!(cs.len() as u32, DEPTH_BIAS_DWORDS);
        let regs = RegisterWrites::decode(cs.words()).unwrap();
        assert_eq!(regs.get(GRAS_SU_POLY_OFFSET_SCALE), Some(3.0f32.to_bits()));
        assert_eq!(regs.get(GRAS_SU_POLY_OFFSET_OFFSET), Some(1.0f32.to_bits()));
        assert_eq!(regs.get(GRAS_SU_POLY_OFFSET_OFFSET_CLAMP), Some(2.0f32.to_bits()));
    }
}
