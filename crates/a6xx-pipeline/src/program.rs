//! Program state: every stage's configuration plus the fragment interface, recorded once
//! for the draw pass and once for the binning pass.

use std::sync::Arc;

use a6xx_protocol::regs::{
    coord_mask, fs_output_cntl1_mrt, hlsq_control_2, hlsq_control_3, hlsq_control_4, regid, sp_fs_bindless_prefetch_cmd,
    sp_fs_output_reg, sp_fs_prefetch_cntl, valid_reg, FragInterpCntl, HlsqInvalidate, RbFsOutputCntl0,
    RbRenderControl1, Reg, SpFsOutputCntl0, SpFsPrefetchCmd, ZMode, GRAS_CNTL, GRAS_SAMPLE_CNTL,
    GRAS_SU_DEPTH_PLANE_CNTL, GRAS_UNKNOWN_8101, HLSQ_CONTROL_1_REG, HLSQ_INVALIDATE_CMD, HLSQ_UNKNOWN_B980,
    INVALID_REG, RB_DEPTH_PLANE_CNTL, RB_FS_OUTPUT_CNTL0, RB_RENDER_COMPONENTS, RB_RENDER_CONTROL0, RB_SAMPLE_CNTL,
    SAMPLE_CNTL_PER_SAMP_MODE, SP_FS_BINDLESS_PREFETCH_CMD0, SP_FS_OUTPUT_CNTL0, SP_FS_OUTPUT_REG0,
    SP_FS_PREFETCH_CNTL, SP_FS_RENDER_COMPONENTS, SP_HS_UNKNOWN_A831,
};
use a6xx_protocol::CsWriter;
use tracing::warn;

use crate::config::MAX_RTS;
use crate::shader::{FragResult, OutputSlot, ShaderVariant, SystemValue};
use crate::types::{ShaderStage, SHADER_STAGE_COUNT};
use crate::vpc::{emit_geom_tess_consts, emit_varying_modes, emit_vpc, Stages};
use crate::xs_config::emit_xs_config;

/// Everything the program emitter needs beyond the shaders themselves.
#[derive(Clone, Debug)]
pub struct ProgramContext<'a> {
    pub variants: &'a [Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT],
    /// Position-only vertex shader for the binning pass; the regular one when absent.
    pub binning_variant: Option<&'a ShaderVariant>,
    pub shader_iova: [u64; SHADER_STAGE_COUNT],
    pub binning_vs_iova: u64,
    pub patch_control_points: u32,
    pub vshs_workgroup: bool,
    pub color_attachment_count: u32,
    pub dual_src_blend: bool,
    pub render_components: u32,
    pub depth_is_s8: bool,
}

impl<'a> ProgramContext<'a> {
    fn variant(&self, stage: ShaderStage) -> Option<&'a ShaderVariant> {
        self.variants[stage.index()].as_deref()
    }
}

/// System-value registers and interpolation setup the fragment stage needs.
pub fn emit_fs_inputs(cs: &mut CsWriter, fs: &ShaderVariant) {
    let sample_shading = fs.per_samp || fs.key.sample_shading;
    let enable_varyings = fs.total_in > 0;

    let samp_id_regid = fs.find_sysval_regid(SystemValue::SampleId);
    let smask_in_regid = fs.find_sysval_regid(SystemValue::SampleMaskIn);
    let face_regid = fs.find_sysval_regid(SystemValue::FrontFace);
    let coord_regid = fs.find_sysval_regid(SystemValue::FragCoord);
    let zwcoord_regid = if valid_reg(coord_regid) {
        coord_regid + 2
    } else {
        INVALID_REG
    };
    let [persp_pixel, persp_sample, persp_centroid, persp_size, linear_pixel, linear_centroid, linear_sample] =
        SystemValue::BARYCENTRICS.map(|sv| fs.find_sysval_regid(sv));

    if valid_reg(linear_sample) {
        warn!("linear sample varyings are not supported");
    }
    if valid_reg(linear_centroid) {
        warn!("linear centroid varyings are not supported");
    }

    let prefetch = &fs.sampler_prefetch;
    if !prefetch.is_empty() {
        // Prefetched coordinates are read from r0.x.
        assert_eq!(persp_pixel, regid(0, 0), "sampler prefetch needs the pixel barycentrics in r0.x");
    }

    cs.emit_pkt4(SP_FS_PREFETCH_CNTL, 1 + prefetch.len() as u32);
    cs.emit(sp_fs_prefetch_cntl(prefetch.len() as u32, INVALID_REG));
    for p in prefetch {
        cs.emit(
            SpFsPrefetchCmd {
                src: p.src,
                samp_id: p.samp_id,
                tex_id: p.tex_id,
                dst: p.dst,
                wrmask: p.wrmask,
                half: p.half_precision,
                cmd: p.cmd,
            }
            .value(),
        );
    }
    if !prefetch.is_empty() {
        cs.emit_pkt4(SP_FS_BINDLESS_PREFETCH_CMD0, prefetch.len() as u32);
        for p in prefetch {
            cs.emit(sp_fs_bindless_prefetch_cmd(p.samp_bindless_id, p.tex_bindless_id));
        }
    }

    cs.emit_pkt4(HLSQ_CONTROL_1_REG, 5);
    cs.emit(0x7);
    cs.emit(hlsq_control_2(face_regid, samp_id_regid, smask_in_regid, persp_size));
    cs.emit(hlsq_control_3(persp_pixel, linear_pixel, persp_centroid, linear_centroid));
    cs.emit(hlsq_control_4(persp_sample, linear_sample, coord_regid, zwcoord_regid));
    cs.emit(0xfc);

    cs.emit_write_reg(HLSQ_UNKNOWN_B980, if enable_varyings { 3 } else { 1 });

    let mut need_size = fs.frag_face || fs.fragcoord_compmask != 0;
    let mut need_size_persamp = false;
    if valid_reg(persp_size) {
        if sample_shading {
            need_size_persamp = true;
        } else {
            need_size = true;
        }
    }
    if valid_reg(linear_pixel) {
        need_size = true;
    }

    let mut interp = FragInterpCntl::empty();
    interp.set(FragInterpCntl::IJ_PERSP_PIXEL, valid_reg(persp_pixel));
    interp.set(FragInterpCntl::IJ_PERSP_CENTROID, valid_reg(persp_centroid));
    interp.set(FragInterpCntl::IJ_PERSP_SAMPLE, valid_reg(persp_sample));
    interp.set(FragInterpCntl::SIZE, need_size);
    interp.set(FragInterpCntl::SIZE_PERSAMP, need_size_persamp);
    let coord = if fs.fragcoord_compmask != 0 {
        coord_mask(fs.fragcoord_compmask)
    } else {
        0
    };

    cs.emit_write_reg(GRAS_CNTL, interp.bits() | coord);

    let mut control1 = RbRenderControl1::empty();
    // Without these fragcoord is the same for every sample.
    control1.set(RbRenderControl1::UNK4 | RbRenderControl1::UNK5, sample_shading);
    control1.set(RbRenderControl1::SAMPLEMASK, valid_reg(smask_in_regid));
    control1.set(RbRenderControl1::SAMPLEID, valid_reg(samp_id_regid));
    control1.set(RbRenderControl1::SIZE, valid_reg(persp_size));
    control1.set(RbRenderControl1::FACENESS, fs.frag_face);

    let mut control0 = interp;
    control0.set(FragInterpCntl::UNK10, enable_varyings);
    cs.emit_pkt4(RB_RENDER_CONTROL0, 2);
    cs.emit(control0.bits() | coord);
    cs.emit(control1.bits());

    let per_samp = if sample_shading { SAMPLE_CNTL_PER_SAMP_MODE } else { 0 };
    cs.emit_write_reg(RB_SAMPLE_CNTL, per_samp);
    cs.emit_write_reg(GRAS_UNKNOWN_8101, if sample_shading { 0x6 } else { 0 });
    cs.emit_write_reg(GRAS_SAMPLE_CNTL, per_samp);
}

/// Depth test placement: late whenever the shader can change coverage or depth.
pub fn fs_z_mode(fs: &ShaderVariant, depth_is_s8: bool) -> ZMode {
    if fs.no_earlyz || fs.has_kill || fs.writes_pos || fs.writes_stencilref || depth_is_s8 {
        ZMode::LateZ
    } else {
        ZMode::EarlyZ
    }
}

/// Fragment output routing to the render targets.
pub fn emit_fs_outputs(
    cs: &mut CsWriter,
    fs: &ShaderVariant,
    mrt_count: u32,
    dual_src_blend: bool,
    render_components: u32,
    depth_is_s8: bool,
) {
    let frag = |r| fs.find_output_regid(OutputSlot::Frag(r));
    let posz_regid = frag(FragResult::Depth);
    let smask_regid = frag(FragResult::SampleMask);
    let stencilref_regid = frag(FragResult::Stencil);

    let fragdata_regid: [u8; MAX_RTS] = if fs.color0_mrt {
        [frag(FragResult::Color); MAX_RTS]
    } else {
        std::array::from_fn(|i| frag(FragResult::Data(i as u8)))
    };

    cs.emit_pkt4(SP_FS_OUTPUT_CNTL0, 2);
    cs.emit(
        SpFsOutputCntl0 {
            dual_color_in_enable: dual_src_blend,
            depth_regid: posz_regid,
            sampmask_regid: smask_regid,
            stencilref_regid,
        }
        .value(),
    );
    cs.emit(fs_output_cntl1_mrt(mrt_count));

    cs.emit_pkt4(SP_FS_OUTPUT_REG0, MAX_RTS as u32);
    for regid in fragdata_regid {
        // Half-precision outputs are not tracked per render target.
        cs.emit(sp_fs_output_reg(regid, false));
    }

    cs.emit_regs(&[Reg::new(SP_FS_RENDER_COMPONENTS, render_components)]);

    let mut output = RbFsOutputCntl0::empty();
    output.set(RbFsOutputCntl0::FRAG_WRITES_Z, fs.writes_pos);
    output.set(RbFsOutputCntl0::FRAG_WRITES_SAMPMASK, fs.writes_smask);
    output.set(RbFsOutputCntl0::FRAG_WRITES_STENCILREF, fs.writes_stencilref);
    output.set(RbFsOutputCntl0::DUAL_COLOR_IN_ENABLE, dual_src_blend);
    cs.emit_pkt4(RB_FS_OUTPUT_CNTL0, 2);
    cs.emit(output.bits());
    cs.emit(fs_output_cntl1_mrt(mrt_count));

    cs.emit_regs(&[Reg::new(RB_RENDER_COMPONENTS, render_components)]);

    let zmode = fs_z_mode(fs, depth_is_s8) as u32;
    cs.emit_write_reg(GRAS_SU_DEPTH_PLANE_CNTL, zmode);
    cs.emit_write_reg(RB_DEPTH_PLANE_CNTL, zmode);
}

/// Records the whole program. The binning pass runs the binning vertex shader when there is
/// no geometry stage and never runs the fragment stage.
///
/// Panics if the context has no vertex stage.
pub fn emit_program(cs: &mut CsWriter, ctx: &ProgramContext<'_>, binning_pass: bool) {
    let Some(mut vs) = ctx.variant(ShaderStage::Vertex) else {
        panic!("graphics program without a vertex stage");
    };
    let hs = ctx.variant(ShaderStage::TessCtrl);
    let ds = ctx.variant(ShaderStage::TessEval);
    let gs = ctx.variant(ShaderStage::Geometry);
    let mut fs = ctx.variant(ShaderStage::Fragment);

    cs.emit_regs(&[Reg::new(
        HLSQ_INVALIDATE_CMD,
        (HlsqInvalidate::VS_STATE
            | HlsqInvalidate::HS_STATE
            | HlsqInvalidate::DS_STATE
            | HlsqInvalidate::GS_STATE
            | HlsqInvalidate::FS_STATE
            | HlsqInvalidate::GFX_IBO)
            .bits(),
    )]);

    // A correct binning variant cannot be built alongside a geometry shader.
    let mut first = 0;
    if binning_pass && gs.is_none() {
        vs = ctx.binning_variant.unwrap_or(vs);
        emit_xs_config(cs, ShaderStage::Vertex, Some(vs), ctx.binning_vs_iova);
        first = 1;
    }

    for stage in &ShaderStage::ALL[first..] {
        let mut xs = ctx.variant(*stage);
        if *stage == ShaderStage::Fragment && binning_pass {
            fs = None;
            xs = None;
        }
        emit_xs_config(cs, *stage, xs, ctx.shader_iova[stage.index()]);
    }

    cs.emit_write_reg(SP_HS_UNKNOWN_A831, 0);

    let stages = Stages { vs, hs, ds, gs, fs };
    emit_vpc(cs, &stages, ctx.patch_control_points, ctx.vshs_workgroup);
    emit_varying_modes(cs, fs);

    // The fragment registers are programmed even when the stage does not run.
    let dummy;
    let fs_or_dummy = match fs {
        Some(fs) => fs,
        None => {
            dummy = ShaderVariant::default();
            &dummy
        }
    };
    emit_fs_inputs(cs, fs_or_dummy);
    emit_fs_outputs(
        cs,
        fs_or_dummy,
        ctx.color_attachment_count,
        ctx.dual_src_blend,
        ctx.render_components,
        ctx.depth_is_s8,
    );

    if gs.is_some() || hs.is_some() {
        emit_geom_tess_consts(cs, &stages, ctx.patch_control_points);
    }
}

#[cfg(test)]
mod tests {
    use a6xx_protocol::decode::RegisterWrites;
    use a6xx_protocol::regs::{
        HLSQ_FS_CNTL, HLSQ_VS_CNTL, SP_FS_CONFIG, SP_FS_PREFETCH_CMD0, SP_GS_CONFIG, SP_VS_OBJ_START_LO,
        SP_VS_OUT_REG0,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::shader::{SamplerPrefetch, ShaderInput, ShaderKey, ShaderOutput, VaryingSlot};

    fn decode(cs: &CsWriter) -> RegisterWrites {
        RegisterWrites::decode(cs.words()).unwrap()
    }

    fn fragment() -> ShaderVariant {
        ShaderVariant {
            stage: ShaderStage::Fragment,
            inputs: vec![
                ShaderInput::sysval(SystemValue::BaryPerspPixel, regid(0, 0)),
                ShaderInput::sysval(SystemValue::FragCoord, regid(1, 0)),
                ShaderInput::varying(VaryingSlot::Var(0), regid(2, 0), 0xf, 0),
            ],
            outputs: vec![ShaderOutput::frag(FragResult::Data(0), regid(3, 0))],
            total_in: 4,
            fragcoord_compmask: 0x3,
            ..Default::default()
        }
    }

    #[test]
    fn fs_inputs_enable_interpolation_and_coords() {
        let fs = fragment();
        let mut cs = CsWriter::unbounded();
        emit_fs_inputs(&mut cs, &fs);
        let regs = decode(&cs);

        assert_eq!(regs.get(SP_FS_PREFETCH_CNTL), Some(sp_fs_prefetch_cntl(0, INVALID_REG)));
        assert!(!regs.contains(SP_FS_BINDLESS_PREFETCH_CMD0));
        assert_eq!(
            regs.get(HLSQ_CONTROL_1_REG + 3),
            Some(hlsq_control_4(INVALID_REG, INVALID_REG, regid(1, 0), regid(1, 2)))
        );
        assert_eq!(regs.get(HLSQ_UNKNOWN_B980), Some(3));

        let interp = (FragInterpCntl::IJ_PERSP_PIXEL | FragInterpCntl::SIZE).bits() | coord_mask(0x3);
        assert_eq!(regs.get(GRAS_CNTL), Some(interp));
        assert_eq!(regs.get(RB_RENDER_CONTROL0), Some(interp | FragInterpCntl::UNK10.bits()));
        assert_eq!(regs.get(RB_RENDER_CONTROL0 + 1), Some(0));
        assert_eq!(regs.get(RB_SAMPLE_CNTL), Some(0));
        assert_eq!(regs.get(GRAS_UNKNOWN_8101), Some(0));
    }

    #[test]
    fn sample_shading_moves_size_per_sample() {
        let fs = ShaderVariant {
            inputs: vec![
                ShaderInput::sysval(SystemValue::BaryPerspSize, regid(0, 2)),
                ShaderInput::sysval(SystemValue::SampleId, regid(4, 0)),
            ],
            key: ShaderKey {
                sample_shading: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut cs = CsWriter::unbounded();
        emit_fs_inputs(&mut cs, &fs);
        let regs = decode(&cs);

        assert_eq!(regs.get(GRAS_CNTL), Some(FragInterpCntl::SIZE_PERSAMP.bits()));
        assert_eq!(
            regs.get(RB_RENDER_CONTROL0 + 1),
            Some(
                (RbRenderControl1::UNK4
                    | RbRenderControl1::UNK5
                    | RbRenderControl1::SAMPLEID
                    | RbRenderControl1::SIZE)
                    .bits()
            )
        );
        assert_eq!(regs.get(RB_SAMPLE_CNTL), Some(SAMPLE_CNTL_PER_SAMP_MODE));
        assert_eq!(regs.get(GRAS_UNKNOWN_8101), Some(0x6));
        assert_eq!(regs.get(GRAS_SAMPLE_CNTL), Some(SAMPLE_CNTL_PER_SAMP_MODE));
        assert_eq!(regs.get(HLSQ_UNKNOWN_B980), Some(1));
    }

    #[test]
    fn prefetches_are_listed_twice() {
        let fs = ShaderVariant {
            sampler_prefetch: vec![SamplerPrefetch {
                samp_id: 1,
                tex_id: 2,
                samp_bindless_id: 3,
                tex_bindless_id: 4,
                wrmask: 0xf,
                ..Default::default()
            }],
            ..fragment()
        };
        let mut cs = CsWriter::unbounded();
        emit_fs_inputs(&mut cs, &fs);
        let regs = decode(&cs);
        assert_eq!(regs.get(SP_FS_PREFETCH_CNTL), Some(sp_fs_prefetch_cntl(1, INVALID_REG)));
        assert_eq!(
            regs.get(SP_FS_PREFETCH_CMD0),
            Some(
                SpFsPrefetchCmd {
                    samp_id: 1,
                    tex_id: 2,
                    wrmask: 0xf,
                    ..Default::default()
                }
                .value()
            )
        );
        assert_eq!(regs.get(SP_FS_BINDLESS_PREFETCH_CMD0), Some(sp_fs_bindless_prefetch_cmd(3, 4)));
    }

    #[test]
    #[should_panic(expected = "r0.x")]
    fn prefetch_requires_pixel_barycentrics_in_r0() {
        let fs = ShaderVariant {
            inputs: vec![ShaderInput::sysval(SystemValue::BaryPerspPixel, regid(1, 0))],
            sampler_prefetch: vec![SamplerPrefetch::default()],
            ..Default::default()
        };
        emit_fs_inputs(&mut CsWriter::unbounded(), &fs);
    }

    #[test]
    fn outputs_route_render_targets() {
        let fs = fragment();
        let mut cs = CsWriter::unbounded();
        emit_fs_outputs(&mut cs, &fs, 2, false, 0xff, false);
        let regs = decode(&cs);

        assert_eq!(regs.get(SP_FS_OUTPUT_REG0), Some(sp_fs_output_reg(regid(3, 0), false)));
        assert_eq!(regs.get(SP_FS_OUTPUT_REG0 + 1), Some(sp_fs_output_reg(INVALID_REG, false)));
        assert_eq!(regs.get(SP_FS_OUTPUT_CNTL0 + 1), Some(fs_output_cntl1_mrt(2)));
        assert_eq!(regs.get(RB_FS_OUTPUT_CNTL0), Some(0));
        assert_eq!(regs.get(SP_FS_RENDER_COMPONENTS), Some(0xff));
        assert_eq!(regs.get(RB_RENDER_COMPONENTS), Some(0xff));
        assert_eq!(regs.get(GRAS_SU_DEPTH_PLANE_CNTL), Some(ZMode::EarlyZ as u32));
        assert_eq!(regs.get(RB_DEPTH_PLANE_CNTL), Some(ZMode::EarlyZ as u32));
    }

    #[test]
    fn broadcast_color_fills_every_target() {
        let fs = ShaderVariant {
            outputs: vec![
                ShaderOutput::frag(FragResult::Color, regid(2, 0)),
                ShaderOutput::frag(FragResult::Depth, regid(3, 2)),
            ],
            color0_mrt: true,
            writes_pos: true,
            ..Default::default()
        };
        let mut cs = CsWriter::unbounded();
        emit_fs_outputs(&mut cs, &fs, 4, true, 0xffff, false);
        let regs = decode(&cs);

        for i in 0..MAX_RTS as u16 {
            assert_eq!(regs.get(SP_FS_OUTPUT_REG0 + i), Some(sp_fs_output_reg(regid(2, 0), false)));
        }
        assert_eq!(
            regs.get(SP_FS_OUTPUT_CNTL0),
            Some(
                SpFsOutputCntl0 {
                    dual_color_in_enable: true,
                    depth_regid: regid(3, 2),
                    sampmask_regid: INVALID_REG,
                    stencilref_regid: INVALID_REG,
                }
                .value()
            )
        );
        assert_eq!(
            regs.get(RB_FS_OUTPUT_CNTL0),
            Some((RbFsOutputCntl0::FRAG_WRITES_Z | RbFsOutputCntl0::DUAL_COLOR_IN_ENABLE).bits())
        );
        assert_eq!(regs.get(RB_DEPTH_PLANE_CNTL), Some(ZMode::LateZ as u32));
    }

    #[test]
    fn late_z_triggers() {
        let base = ShaderVariant::default();
        assert_eq!(fs_z_mode(&base, false), ZMode::EarlyZ);
        assert_eq!(fs_z_mode(&base, true), ZMode::LateZ);
        for fs in [
            ShaderVariant {
                has_kill: true,
                ..Default::default()
            },
            ShaderVariant {
                no_earlyz: true,
                ..Default::default()
            },
            ShaderVariant {
                writes_stencilref: true,
                ..Default::default()
            },
        ] {
            assert_eq!(fs_z_mode(&fs, false), ZMode::LateZ);
        }
    }

    fn program_variants() -> [Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT] {
        let vs = ShaderVariant {
            stage: ShaderStage::Vertex,
            outputs: vec![
                ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 0),
                ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 4),
            ],
            instrlen: 1,
            constlen: 4,
            ..Default::default()
        };
        let mut variants: [Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT] = Default::default();
        variants[ShaderStage::Vertex.index()] = Some(Arc::new(vs));
        variants[ShaderStage::Fragment.index()] = Some(Arc::new(fragment()));
        variants
    }

    fn context<'a>(
        variants: &'a [Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT],
        binning: Option<&'a ShaderVariant>,
    ) -> ProgramContext<'a> {
        let mut shader_iova = [0; SHADER_STAGE_COUNT];
        shader_iova[ShaderStage::Vertex.index()] = 0x1000;
        shader_iova[ShaderStage::Fragment.index()] = 0x1080;
        ProgramContext {
            variants,
            binning_variant: binning,
            shader_iova,
            binning_vs_iova: 0x2000,
            patch_control_points: 0,
            vshs_workgroup: false,
            color_attachment_count: 1,
            dual_src_blend: false,
            render_components: 0xf,
            depth_is_s8: false,
        }
    }

    #[test]
    fn draw_program_runs_every_stage() {
        let variants = program_variants();
        let ctx = context(&variants, None);
        let mut cs = CsWriter::unbounded();
        emit_program(&mut cs, &ctx, false);
        let regs = decode(&cs);

        assert_eq!(regs.writes[0].0, HLSQ_INVALIDATE_CMD);
        assert_eq!(regs.get(SP_VS_OBJ_START_LO), Some(0x1000));
        assert_ne!(regs.get(HLSQ_FS_CNTL), Some(0));
        assert_eq!(regs.get(SP_GS_CONFIG), Some(0));
        assert_eq!(regs.get(SP_HS_UNKNOWN_A831), Some(0));
        // Var(0) reaches the fragment shader ahead of position.
        assert_eq!(regs.get(SP_VS_OUT_REG0).map(|v| v & 0xff), Some(u32::from(regid(1, 0))));
        assert_eq!(regs.get(HLSQ_UNKNOWN_B980), Some(3));
    }

    #[test]
    fn binning_program_swaps_vs_and_drops_fs() {
        let variants = program_variants();
        let binning = ShaderVariant {
            stage: ShaderStage::Vertex,
            outputs: vec![ShaderOutput::varying(VaryingSlot::Pos, regid(2, 0), 0)],
            instrlen: 1,
            constlen: 4,
            binning_pass: true,
            ..Default::default()
        };
        let ctx = context(&variants, Some(&binning));
        let mut cs = CsWriter::unbounded();
        emit_program(&mut cs, &ctx, true);
        let regs = decode(&cs);

        assert_eq!(regs.get(SP_VS_OBJ_START_LO), Some(0x2000));
        assert_ne!(regs.get(HLSQ_VS_CNTL), Some(0));
        assert_eq!(regs.get(SP_FS_CONFIG), Some(0));
        assert_eq!(regs.get(HLSQ_FS_CNTL), Some(0));
        // Only position is linked, from the binning shader.
        assert_eq!(regs.get(SP_VS_OUT_REG0), Some(a6xx_protocol::regs::sp_out_half(regid(2, 0), 0xf)));
        // The dummy fragment interface has no varyings.
        assert_eq!(regs.get(HLSQ_UNKNOWN_B980), Some(1));
    }
}
