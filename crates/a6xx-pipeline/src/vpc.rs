//! Varying routing between the last geometry stage and the rasterizer, plus the
//! local-memory maps and parameters the tessellation and geometry stages read.

use a6xx_protocol::pm4::{CpOpcode, LoadState6Dw0, StateBlock, StateSrc, StateType};
use a6xx_protocol::regs::{
    pc_primitive_cntl_5, pc_primitive_cntl_6, pc_tess_cntl, regid, sp_out_half, sp_xs_primitive_cntl, valid_reg,
    vfd_control_1, vfd_control_2, vfd_control_3, vfd_control_5, vpc_xs_layer_cntl, vpc_xs_pack, PcXsOutCntl,
    Reg, TessOutput, VpcCntl0, GRAS_DS_CL_CNTL, GRAS_DS_LAYER_CNTL, GRAS_GS_CL_CNTL, GRAS_GS_LAYER_CNTL,
    GRAS_VS_CL_CNTL, GRAS_VS_LAYER_CNTL, GRAS_XS_LAYER_CNTL_WRITES_LAYER, INVALID_REG, PC_DS_OUT_CNTL,
    PC_GS_OUT_CNTL, PC_HS_INPUT_SIZE, PC_PRIMID_PASSTHRU, PC_PRIMITIVE_CNTL_3, PC_PRIMITIVE_CNTL_5,
    PC_PRIMITIVE_CNTL_6, PC_TESS_CNTL, PC_TESS_NUM_VERTEX, PC_UNKNOWN_9B07, PC_VS_OUT_CNTL, SP_DS_OUT_REG0,
    SP_DS_PRIMITIVE_CNTL, SP_DS_VPC_DST_REG0, SP_GS_OUT_REG0, SP_GS_PRIMITIVE_CNTL, SP_GS_PRIM_SIZE,
    SP_GS_VPC_DST_REG0, SP_HS_UNKNOWN_A831, SP_VS_OUT_REG0, SP_VS_PRIMITIVE_CNTL, SP_VS_VPC_DST_REG0,
    VFD_CONTROL_1, VFD_CONTROL_4_VALUE, VFD_CONTROL_6_PRIMID_PASSTHRU, VPC_CNTL_0, VPC_DS_CLIP_CNTL,
    VPC_DS_LAYER_CNTL, VPC_DS_PACK, VPC_GS_CLIP_CNTL, VPC_GS_LAYER_CNTL, VPC_GS_PACK, VPC_UNKNOWN_9100,
    VPC_VARYING_INTERP_MODE0, VPC_VARYING_PS_REPL_MODE0, VPC_VAR_DISABLE0, VPC_VS_CLIP_CNTL, VPC_VS_LAYER_CNTL,
    VPC_VS_PACK,
};
use a6xx_protocol::CsWriter;

use crate::linkage::{emit_streamout, link_geometry_stages, Linkage, NO_LOC};
use crate::shader::{
    GsOutputPrimitive, InputSlot, InterpMode, OutputSlot, ShaderInput, ShaderVariant, SystemValue, TessInfo,
    TessPrimitiveMode, TessSpacing, VaryingSlot,
};
use crate::types::ShaderStage;

/// The graphics stages taking part in one program. `ds` is present whenever `hs` is.
#[derive(Clone, Copy, Debug)]
pub struct Stages<'a> {
    pub vs: &'a ShaderVariant,
    pub hs: Option<&'a ShaderVariant>,
    pub ds: Option<&'a ShaderVariant>,
    pub gs: Option<&'a ShaderVariant>,
    pub fs: Option<&'a ShaderVariant>,
}

impl<'a> Stages<'a> {
    /// The stage whose outputs reach the rasterizer.
    pub fn last_geometry_stage(&self) -> &'a ShaderVariant {
        match (self.gs, self.hs, self.ds) {
            (Some(gs), _, _) => gs,
            (None, Some(_), Some(ds)) => ds,
            _ => self.vs,
        }
    }
}

/// Per-stage register block of the last geometry stage.
struct OutputRegs {
    out_reg: u16,
    vpc_dst_reg: u16,
    vpc_pack: u16,
    vpc_clip_cntl: u16,
    gras_cl_cntl: u16,
    pc_out_cntl: u16,
    primitive_cntl: u16,
    vpc_layer_cntl: u16,
    gras_layer_cntl: u16,
}

const VS_OUTPUT_REGS: OutputRegs = OutputRegs {
    out_reg: SP_VS_OUT_REG0,
    vpc_dst_reg: SP_VS_VPC_DST_REG0,
    vpc_pack: VPC_VS_PACK,
    vpc_clip_cntl: VPC_VS_CLIP_CNTL,
    gras_cl_cntl: GRAS_VS_CL_CNTL,
    pc_out_cntl: PC_VS_OUT_CNTL,
    primitive_cntl: SP_VS_PRIMITIVE_CNTL,
    vpc_layer_cntl: VPC_VS_LAYER_CNTL,
    gras_layer_cntl: GRAS_VS_LAYER_CNTL,
};

const DS_OUTPUT_REGS: OutputRegs = OutputRegs {
    out_reg: SP_DS_OUT_REG0,
    vpc_dst_reg: SP_DS_VPC_DST_REG0,
    vpc_pack: VPC_DS_PACK,
    vpc_clip_cntl: VPC_DS_CLIP_CNTL,
    gras_cl_cntl: GRAS_DS_CL_CNTL,
    pc_out_cntl: PC_DS_OUT_CNTL,
    primitive_cntl: SP_DS_PRIMITIVE_CNTL,
    vpc_layer_cntl: VPC_DS_LAYER_CNTL,
    gras_layer_cntl: GRAS_DS_LAYER_CNTL,
};

const GS_OUTPUT_REGS: OutputRegs = OutputRegs {
    out_reg: SP_GS_OUT_REG0,
    vpc_dst_reg: SP_GS_VPC_DST_REG0,
    vpc_pack: VPC_GS_PACK,
    vpc_clip_cntl: VPC_GS_CLIP_CNTL,
    gras_cl_cntl: GRAS_GS_CL_CNTL,
    pc_out_cntl: PC_GS_OUT_CNTL,
    primitive_cntl: SP_GS_PRIMITIVE_CNTL,
    vpc_layer_cntl: VPC_GS_LAYER_CNTL,
    gras_layer_cntl: GRAS_GS_LAYER_CNTL,
};

fn output_regs(stage: ShaderStage) -> &'static OutputRegs {
    match stage {
        ShaderStage::Vertex => &VS_OUTPUT_REGS,
        ShaderStage::TessEval => &DS_OUTPUT_REGS,
        ShaderStage::Geometry => &GS_OUTPUT_REGS,
        stage => panic!("{stage:?} cannot feed the rasterizer"),
    }
}

/// Tells the vertex fetcher which registers receive the built-in inputs of each stage.
pub fn emit_vs_system_values(cs: &mut CsWriter, stages: &Stages<'_>, primid_passthru: bool) {
    let vs = stages.vs;
    let sysval = |v: Option<&ShaderVariant>, sv| v.map_or(INVALID_REG, |v| v.find_sysval_regid(sv));

    // Tessellation registers only mean something with a control stage present.
    let tess_ds = stages.hs.and(stages.ds);
    let tess_coord_x = sysval(tess_ds, SystemValue::TessCoord);
    let tess_coord_y = if valid_reg(tess_coord_x) {
        tess_coord_x + 1
    } else {
        INVALID_REG
    };

    cs.emit_pkt4(VFD_CONTROL_1, 6);
    cs.emit(vfd_control_1(
        vs.find_sysval_regid(SystemValue::VertexId),
        vs.find_sysval_regid(SystemValue::InstanceId),
        sysval(stages.gs, SystemValue::PrimitiveId),
    ));
    cs.emit(vfd_control_2(
        sysval(stages.hs, SystemValue::PrimitiveId),
        sysval(stages.hs, SystemValue::TcsHeader),
    ));
    cs.emit(vfd_control_3(
        sysval(tess_ds, SystemValue::PrimitiveId),
        tess_coord_x,
        tess_coord_y,
    ));
    cs.emit(VFD_CONTROL_4_VALUE);
    cs.emit(vfd_control_5(sysval(stages.gs, SystemValue::GsHeader)));
    cs.emit(if primid_passthru { VFD_CONTROL_6_PRIMID_PASSTHRU } else { 0 });
}

/// Loads `dwords` into the constant file of `sb` at vec4 offset `base`.
///
/// Panics unless `dwords` is a whole number of vec4s.
pub fn emit_const(cs: &mut CsWriter, opcode: CpOpcode, base: u32, sb: StateBlock, dwords: &[u32]) {
    assert!(dwords.len() % 4 == 0, "constant upload of {} dwords is not vec4 aligned", dwords.len());
    let len = dwords.len() as u32;

    cs.emit_pkt7(opcode, 3 + len);
    cs.emit(
        LoadState6Dw0 {
            dst_off: base,
            state_type: StateType::Constants,
            state_src: StateSrc::Direct,
            state_block: sb,
            num_unit: len / 4,
        }
        .value(),
    );
    cs.emit(0);
    cs.emit(0);
    cs.emit_array(dwords);
}

/// Uploads the primitive map of `consumer`, clipped to its constant length.
pub fn emit_link_map(cs: &mut CsWriter, producer: &ShaderVariant, consumer: &ShaderVariant, sb: StateBlock) {
    let base = i64::from(consumer.const_state.offsets.primitive_map);
    let mut locs = link_geometry_stages(producer, consumer);

    let vec4s = locs.len().div_ceil(4) as i64;
    let size = ((vec4s + base).min(i64::from(consumer.constlen)) - base) * 4;
    if size <= 0 {
        return;
    }

    locs.resize(size as usize, 0);
    emit_const(cs, CpOpcode::LoadState6Geom, base as u32, sb, &locs);
}

/// Tessellation parameters come from the evaluation shader unless it left the spacing
/// unspecified, in which case the control shader supplies them.
pub fn tess_info<'a>(hs: &'a ShaderVariant, ds: &'a ShaderVariant) -> &'a TessInfo {
    if ds.info.tess.spacing == TessSpacing::Unspecified {
        &hs.info.tess
    } else {
        &ds.info.tess
    }
}

fn hw_tess_spacing(spacing: TessSpacing) -> a6xx_protocol::regs::TessSpacing {
    use a6xx_protocol::regs::TessSpacing as Hw;
    match spacing {
        TessSpacing::Equal => Hw::Equal,
        TessSpacing::FractionalOdd => Hw::FractionalOdd,
        TessSpacing::FractionalEven => Hw::FractionalEven,
        TessSpacing::Unspecified => panic!("tessellation spacing left unspecified by both stages"),
    }
}

fn tess_output(info: &TessInfo) -> TessOutput {
    if info.point_mode {
        TessOutput::Points
    } else if info.primitive_mode == TessPrimitiveMode::Isolines {
        TessOutput::Lines
    } else if info.ccw {
        TessOutput::CcwTris
    } else {
        TessOutput::CwTris
    }
}

fn gs_output(prim: GsOutputPrimitive) -> TessOutput {
    match prim {
        GsOutputPrimitive::Points => TessOutput::Points,
        GsOutputPrimitive::LineStrip => TessOutput::Lines,
        GsOutputPrimitive::TriangleStrip => TessOutput::CwTris,
    }
}

/// Links the last geometry stage to the fragment shader and programs output packing,
/// stream-out and the tessellation/geometry primitive controllers.
pub fn emit_vpc(cs: &mut CsWriter, stages: &Stages<'_>, patch_control_points: u32, vshs_workgroup: bool) {
    let last = stages.last_geometry_stage();
    let regs = output_regs(last.stage);
    let vs = stages.vs;

    let mut linkage = Linkage::new();
    if let Some(fs) = stages.fs {
        linkage.link_shaders(last, fs);
    }
    if !last.stream_output.is_empty() {
        linkage.link_streamout(last);
    }

    // Only known once the fragment inputs have been matched.
    let primid_passthru = linkage.primid_loc != NO_LOC;
    emit_vs_system_values(cs, stages, primid_passthru);

    cs.emit_pkt4(VPC_VAR_DISABLE0, 4);
    for mask in linkage.varmask {
        cs.emit(!mask);
    }

    let position_regid = last.find_varying_output_regid(VaryingSlot::Pos);
    let pointsize_regid = last.find_varying_output_regid(VaryingSlot::Psiz);
    let layer_regid = last.find_varying_output_regid(VaryingSlot::Layer);
    let primitive_regid = stages
        .gs
        .map_or(INVALID_REG, |gs| gs.find_sysval_regid(SystemValue::PrimitiveId));
    let flags_regid = stages
        .gs
        .map_or(0, |gs| gs.find_output_regid(OutputSlot::Varying(VaryingSlot::GsVertexFlags)));

    // The hardware expects position and point size after every other varying.
    let mut append = |regid: u8, compmask: u8| {
        if !valid_reg(regid) {
            return NO_LOC;
        }
        let loc = linkage.max_loc;
        linkage.add(regid, compmask, loc);
        loc
    };
    let layer_loc = append(layer_regid, 0x1);
    let position_loc = append(position_regid, 0xf);
    let pointsize_loc = append(pointsize_regid, 0x1);

    emit_streamout(cs, last, &linkage);

    // Some parts hang with zero outputs, so keep a dummy one.
    if linkage.is_empty() {
        let loc = linkage.max_loc;
        linkage.add(regid(0, 0), 0x1, loc);
    }

    let cnt = linkage.len();
    let mut sp_out = vec![0u32; cnt.div_ceil(2)];
    let mut sp_vpc_dst = vec![0u32; cnt.div_ceil(4)];
    for (i, var) in linkage.vars.iter().enumerate() {
        sp_out[i / 2] |= sp_out_half(var.regid, var.compmask) << (16 * (i % 2));
        sp_vpc_dst[i / 4] |= (var.loc & 0xff) << (8 * (i % 4));
    }

    cs.emit_pkt4(regs.out_reg, sp_out.len() as u32);
    cs.emit_array(&sp_out);
    cs.emit_pkt4(regs.vpc_dst_reg, sp_vpc_dst.len() as u32);
    cs.emit_array(&sp_vpc_dst);

    cs.emit_write_reg(regs.vpc_pack, vpc_xs_pack(linkage.max_loc, position_loc, pointsize_loc, 0));
    cs.emit_write_reg(regs.vpc_clip_cntl, 0xffff00);
    cs.emit_write_reg(regs.gras_cl_cntl, 0);
    cs.emit_write_reg(
        regs.pc_out_cntl,
        PcXsOutCntl {
            stride_in_vpc: linkage.max_loc,
            psize: valid_reg(pointsize_regid),
            layer: valid_reg(layer_regid),
            primitive_id: valid_reg(primitive_regid),
            clip_mask: 0,
        }
        .value(),
    );
    cs.emit_write_reg(regs.primitive_cntl, sp_xs_primitive_cntl(cnt as u32, flags_regid));
    cs.emit_write_reg(regs.vpc_layer_cntl, vpc_xs_layer_cntl(layer_loc));
    cs.emit_write_reg(
        regs.gras_layer_cntl,
        if valid_reg(layer_regid) {
            GRAS_XS_LAYER_CNTL_WRITES_LAYER
        } else {
            0
        },
    );

    cs.emit_regs(&[Reg::new(PC_PRIMID_PASSTHRU, u32::from(primid_passthru))]);

    let total_in = stages.fs.map_or(0, |fs| fs.total_in);
    cs.emit_write_reg(
        VPC_CNTL_0,
        VpcCntl0 {
            numnonposvar: total_in,
            primidloc: linkage.primid_loc,
            varying: total_in > 0,
            unkloc: NO_LOC,
        }
        .value(),
    );

    if let (Some(hs), Some(ds)) = (stages.hs, stages.ds) {
        let tcs_vertices_out = hs.info.tess.tcs_vertices_out;
        cs.emit_write_reg(PC_TESS_NUM_VERTEX, tcs_vertices_out);
        // Attribute slots of one incoming patch.
        cs.emit_write_reg(PC_HS_INPUT_SIZE, patch_control_points * vs.output_size / 4);

        let unknown_a831 = if vshs_workgroup {
            const WAVESIZE: u32 = 64;
            let prims_per_wave = WAVESIZE / tcs_vertices_out.max(1);
            (vs.output_size * patch_control_points * prims_per_wave).div_ceil(WAVESIZE)
        } else {
            vs.output_size
        };
        cs.emit_write_reg(SP_HS_UNKNOWN_A831, unknown_a831);

        let info = tess_info(hs, ds);
        cs.emit_write_reg(
            PC_TESS_CNTL,
            pc_tess_cntl(hw_tess_spacing(info.spacing), tess_output(info)),
        );

        emit_link_map(cs, vs, hs, StateBlock::HsShader);
        emit_link_map(cs, hs, ds, StateBlock::DsShader);
    }

    if let Some(gs) = stages.gs {
        let producer = match (stages.hs, stages.ds) {
            (Some(_), Some(ds)) => ds,
            _ => vs,
        };
        emit_link_map(cs, producer, gs, StateBlock::GsShader);

        let info = &gs.info.gs;
        cs.emit_write_reg(
            PC_PRIMITIVE_CNTL_5,
            pc_primitive_cntl_5(
                info.vertices_out.saturating_sub(1),
                gs_output(info.output_primitive),
                info.invocations.saturating_sub(1),
            ),
        );
        cs.emit_write_reg(PC_PRIMITIVE_CNTL_3, 0);
        cs.emit_write_reg(VPC_UNKNOWN_9100, 0xff);
        // Per-primitive local memory, in vec4s.
        cs.emit_write_reg(
            PC_PRIMITIVE_CNTL_6,
            pc_primitive_cntl_6(info.vertices_in * vs.output_size.div_ceil(4)),
        );
        cs.emit_write_reg(PC_UNKNOWN_9B07, 0);
        cs.emit_write_reg(SP_GS_PRIM_SIZE, vs.output_size);
    }
}

const INTERP_FLAT: u32 = 1;
const INTERP_ZERO: u32 = 2;
const INTERP_ONE: u32 = 3;
const PS_REPL_S: u32 = 1;
const PS_REPL_T: u32 = 2;

/// Interpolation and point-sprite replacement modes of one input, two bits per packed
/// component. Returns `(interp, repl, bits)`.
fn varying_mode(input: &ShaderInput) -> (u32, u32, u32) {
    let compmask = input.compmask;
    let mut shift = 0;
    let mut interp = 0;
    let mut repl = 0;

    if input.slot == InputSlot::Varying(VaryingSlot::Pntc) {
        if compmask & 0x1 != 0 {
            repl |= PS_REPL_S << shift;
            shift += 2;
        }
        if compmask & 0x2 != 0 {
            repl |= PS_REPL_T << shift;
            shift += 2;
        }
        if compmask & 0x4 != 0 {
            interp |= INTERP_ZERO << shift;
            shift += 2;
        }
        if compmask & 0x8 != 0 {
            interp |= INTERP_ONE << 6;
            shift += 2;
        }
    } else if input.interpolate == InterpMode::Flat || input.rasterflat {
        for i in 0..4 {
            if compmask & (1 << i) != 0 {
                interp |= INTERP_FLAT << shift;
                shift += 2;
            }
        }
    }

    (interp, repl, shift)
}

/// Interpolation and replacement mode tables for the fragment inputs; all zero without a
/// fragment shader.
pub fn varying_mode_tables(fs: Option<&ShaderVariant>) -> ([u32; 8], [u32; 8]) {
    let mut interp_modes = [0u32; 8];
    let mut repl_modes = [0u32; 8];

    if let Some(fs) = fs {
        for idx in fs.varyings() {
            let input = &fs.inputs[idx];
            let (interp, repl, bits) = varying_mode(input);

            let inloc = input.inloc * 2;
            let n = (inloc / 32) as usize;
            let shift = inloc % 32;
            let (Some(i), Some(r)) = (interp_modes.get_mut(n), repl_modes.get_mut(n)) else {
                continue;
            };
            *i |= interp << shift;
            *r |= repl << shift;

            if shift + bits > 32 {
                if let (Some(i), Some(r)) = (interp_modes.get_mut(n + 1), repl_modes.get_mut(n + 1)) {
                    *i |= interp >> (32 - shift);
                    *r |= repl >> (32 - shift);
                }
            }
        }
    }

    (interp_modes, repl_modes)
}

pub fn emit_varying_modes(cs: &mut CsWriter, fs: Option<&ShaderVariant>) {
    let (interp_modes, repl_modes) = varying_mode_tables(fs);
    cs.emit_pkt4(VPC_VARYING_INTERP_MODE0, 8);
    cs.emit_array(&interp_modes);
    cs.emit_pkt4(VPC_VARYING_PS_REPL_MODE0, 8);
    cs.emit_array(&repl_modes);
}

/// Strides the tessellation and geometry stages use to address their local-memory inputs.
///
/// Panics if neither a control nor a geometry stage is present.
pub fn emit_geom_tess_consts(cs: &mut CsWriter, stages: &Stages<'_>, patch_control_points: u32) {
    let vs = stages.vs;
    let mut num_vertices = match (stages.hs, stages.gs) {
        (Some(_), _) => patch_control_points,
        (None, Some(gs)) => gs.info.gs.vertices_in,
        (None, None) => panic!("geometry constants need a tessellation or geometry stage"),
    };

    let params = |v: &ShaderVariant, n: u32, c: u32, d: u32| [v.output_size * n * 4, v.output_size * 4, c, d];
    let emit = |cs: &mut CsWriter, v: &ShaderVariant, p: [u32; 4]| {
        emit_const(
            cs,
            CpOpcode::LoadState6Geom,
            v.const_state.offsets.primitive_param,
            v.stage.shader_state_block(),
            &p,
        );
    };

    emit(cs, vs, params(vs, num_vertices, 0, 0));

    if let Some(hs) = stages.hs {
        let Some(ds) = stages.ds else {
            panic!("tessellation control stage without an evaluation stage");
        };
        emit(cs, hs, params(vs, num_vertices, hs.output_size, patch_control_points));

        if let Some(gs) = stages.gs {
            num_vertices = gs.info.gs.vertices_in;
        }
        emit(
            cs,
            ds,
            params(ds, num_vertices, hs.output_size, hs.info.tess.tcs_vertices_out),
        );
    }

    if let Some(gs) = stages.gs {
        let prev = stages.ds.unwrap_or(vs);
        let p = params(prev, num_vertices, 0, 0);
        emit(cs, gs, p);
    }
}

#[cfg(test)]
mod tests {
    use a6xx_protocol::decode::RegisterWrites;
    use a6xx_protocol::regs::{VFD_CONTROL_2, VFD_CONTROL_3, VFD_CONTROL_5, VFD_CONTROL_6};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::shader::{ConstOffsets, ConstState, GsInfo, ShaderInfo, ShaderOutput};

    fn vs() -> ShaderVariant {
        ShaderVariant {
            stage: ShaderStage::Vertex,
            outputs: vec![
                ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 0),
                ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 4),
            ],
            inputs: vec![ShaderInput::sysval(SystemValue::VertexId, regid(5, 0))],
            output_size: 8,
            constlen: 16,
            ..Default::default()
        }
    }

    fn fs(total_in: u32) -> ShaderVariant {
        ShaderVariant {
            stage: ShaderStage::Fragment,
            inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(0, 0), 0xf, 0)],
            total_in,
            ..Default::default()
        }
    }

    fn stages<'a>(vs: &'a ShaderVariant, fs: Option<&'a ShaderVariant>) -> Stages<'a> {
        Stages {
            vs,
            hs: None,
            ds: None,
            gs: None,
            fs,
        }
    }

    fn decode(cs: &CsWriter) -> RegisterWrites {
        RegisterWrites::decode(cs.words()).unwrap()
    }

    #[test]
    fn system_values_without_tessellation_are_invalid() {
        let vs = vs();
        let mut cs = CsWriter::unbounded();
        emit_vs_system_values(&mut cs, &stages(&vs, None), false);
        assert_eq!(cs.len(), 7);
        let regs = decode(&cs);
        assert_eq!(
            regs.get(VFD_CONTROL_1),
            Some(vfd_control_1(regid(5, 0), INVALID_REG, INVALID_REG))
        );
        assert_eq!(regs.get(VFD_CONTROL_2), Some(vfd_control_2(INVALID_REG, INVALID_REG)));
        assert_eq!(
            regs.get(VFD_CONTROL_3),
            Some(vfd_control_3(INVALID_REG, INVALID_REG, INVALID_REG))
        );
        assert_eq!(regs.get(VFD_CONTROL_5), Some(vfd_control_5(INVALID_REG)));
        assert_eq!(regs.get(VFD_CONTROL_6), Some(0));
    }

    #[test]
    fn tess_coord_y_follows_x() {
        let vs = vs();
        let hs = ShaderVariant {
            stage: ShaderStage::TessCtrl,
            inputs: vec![ShaderInput::sysval(SystemValue::TcsHeader, regid(0, 1))],
            ..Default::default()
        };
        let ds = ShaderVariant {
            stage: ShaderStage::TessEval,
            inputs: vec![
                ShaderInput::sysval(SystemValue::TessCoord, regid(0, 0)),
                ShaderInput::sysval(SystemValue::PrimitiveId, regid(0, 2)),
            ],
            ..Default::default()
        };
        let s = Stages {
            hs: Some(&hs),
            ds: Some(&ds),
            ..stages(&vs, None)
        };
        let mut cs = CsWriter::unbounded();
        emit_vs_system_values(&mut cs, &s, true);
        let regs = decode(&cs);
        assert_eq!(regs.get(VFD_CONTROL_2), Some(vfd_control_2(INVALID_REG, regid(0, 1))));
        assert_eq!(
            regs.get(VFD_CONTROL_3),
            Some(vfd_control_3(regid(0, 2), regid(0, 0), regid(0, 1)))
        );
        assert_eq!(regs.get(VFD_CONTROL_6), Some(VFD_CONTROL_6_PRIMID_PASSTHRU));
    }

    #[test]
    fn vpc_packs_position_after_varyings() {
        let vs = vs();
        let fs = fs(4);
        let mut cs = CsWriter::unbounded();
        emit_vpc(&mut cs, &stages(&vs, Some(&fs)), 0, false);
        let regs = decode(&cs);

        // Var(0) at 0..4, position appended at 4..8.
        // Position is appended after the disable mask is written.
        assert_eq!(regs.get(VPC_VAR_DISABLE0), Some(!0xf));
        assert_eq!(regs.get(VPC_VAR_DISABLE0 + 1), Some(!0));
        assert_eq!(
            regs.get(SP_VS_OUT_REG0),
            Some(sp_out_half(regid(1, 0), 0xf) | (sp_out_half(regid(0, 0), 0xf) << 16))
        );
        assert_eq!(regs.get(SP_VS_VPC_DST_REG0), Some(4 << 8));
        assert_eq!(regs.get(VPC_VS_PACK), Some(vpc_xs_pack(8, 4, NO_LOC, 0)));
        assert_eq!(regs.get(VPC_VS_CLIP_CNTL), Some(0xffff00));
        assert_eq!(
            regs.get(PC_VS_OUT_CNTL),
            Some(PcXsOutCntl {
                stride_in_vpc: 8,
                ..Default::default()
            }
            .value())
        );
        assert_eq!(regs.get(SP_VS_PRIMITIVE_CNTL), Some(sp_xs_primitive_cntl(2, 0)));
        assert_eq!(regs.get(VPC_VS_LAYER_CNTL), Some(vpc_xs_layer_cntl(NO_LOC)));
        assert_eq!(regs.get(PC_PRIMID_PASSTHRU), Some(0));
        assert_eq!(
            regs.get(VPC_CNTL_0),
            Some(
                VpcCntl0 {
                    numnonposvar: 4,
                    primidloc: NO_LOC,
                    varying: true,
                    unkloc: NO_LOC
                }
                .value()
            )
        );
        assert!(!regs.contains(PC_TESS_CNTL));
        assert!(!regs.contains(PC_PRIMITIVE_CNTL_5));
    }

    #[test]
    fn empty_linkage_gets_a_dummy_output() {
        let vs = ShaderVariant {
            stage: ShaderStage::Vertex,
            ..Default::default()
        };
        let mut cs = CsWriter::unbounded();
        emit_vpc(&mut cs, &stages(&vs, None), 0, false);
        let regs = decode(&cs);
        assert_eq!(regs.get(SP_VS_OUT_REG0), Some(sp_out_half(regid(0, 0), 0x1)));
        assert_eq!(regs.get(SP_VS_PRIMITIVE_CNTL), Some(sp_xs_primitive_cntl(1, 0)));
        assert_eq!(regs.get(VPC_CNTL_0).map(|v| v & (1 << 16)), Some(0));
    }

    #[test]
    fn geometry_stage_owns_the_output_registers() {
        let vs = vs();
        let gs = ShaderVariant {
            stage: ShaderStage::Geometry,
            inputs: vec![
                ShaderInput::varying(VaryingSlot::Pos, regid(0, 0), 0xf, 0),
                ShaderInput::sysval(SystemValue::PrimitiveId, regid(2, 0)),
                ShaderInput::sysval(SystemValue::GsHeader, regid(2, 1)),
            ],
            outputs: vec![
                ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 0),
                ShaderOutput::varying(VaryingSlot::Layer, regid(1, 0), 4),
                ShaderOutput::varying(VaryingSlot::GsVertexFlags, regid(3, 0), 0),
            ],
            constlen: 8,
            const_state: ConstState {
                offsets: ConstOffsets {
                    primitive_map: 2,
                    ..Default::default()
                },
                ..Default::default()
            },
            info: ShaderInfo {
                gs: GsInfo {
                    vertices_in: 3,
                    vertices_out: 4,
                    invocations: 2,
                    output_primitive: GsOutputPrimitive::LineStrip,
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let s = Stages {
            gs: Some(&gs),
            ..stages(&vs, None)
        };
        let mut cs = CsWriter::unbounded();
        emit_vpc(&mut cs, &s, 0, false);
        let regs = decode(&cs);

        assert!(!regs.contains(SP_VS_OUT_REG0));
        // Layer first, then position.
        assert_eq!(regs.get(VPC_GS_PACK), Some(vpc_xs_pack(5, 1, NO_LOC, 0)));
        assert_eq!(regs.get(VPC_GS_LAYER_CNTL), Some(vpc_xs_layer_cntl(0)));
        assert_eq!(regs.get(GRAS_GS_LAYER_CNTL), Some(GRAS_XS_LAYER_CNTL_WRITES_LAYER));
        assert_eq!(
            regs.get(PC_GS_OUT_CNTL),
            Some(
                PcXsOutCntl {
                    stride_in_vpc: 5,
                    layer: true,
                    primitive_id: true,
                    ..Default::default()
                }
                .value()
            )
        );
        assert_eq!(regs.get(SP_GS_PRIMITIVE_CNTL), Some(sp_xs_primitive_cntl(2, regid(3, 0))));
        assert_eq!(
            regs.get(PC_PRIMITIVE_CNTL_5),
            Some(pc_primitive_cntl_5(3, TessOutput::Lines, 1))
        );
        // 3 vertices of 2 vec4s each.
        assert_eq!(regs.get(PC_PRIMITIVE_CNTL_6), Some(pc_primitive_cntl_6(6)));
        assert_eq!(regs.get(SP_GS_PRIM_SIZE), Some(8));
        assert_eq!(regs.get(VPC_UNKNOWN_9100), Some(0xff));

        // The GS primitive map: Pos is at loc 4 in the VS, 16 bytes.
        let maps: Vec<_> = regs.packets_of(CpOpcode::LoadState6Geom).collect();
        assert_eq!(maps.len(), 1);
        let dw0 = LoadState6Dw0::decode(maps[0][0]).unwrap();
        assert_eq!((dw0.dst_off, dw0.state_block, dw0.num_unit), (2, StateBlock::GsShader, 1));
        assert_eq!(maps[0][3..], [16, 0, 0, 0]);
    }

    fn tess_stages() -> (ShaderVariant, ShaderVariant, ShaderVariant) {
        let vs = ShaderVariant {
            outputs: vec![ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 2)],
            ..vs()
        };
        let hs = ShaderVariant {
            stage: ShaderStage::TessCtrl,
            inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(0, 0), 0xf, 0)],
            outputs: vec![ShaderOutput::varying(VaryingSlot::Var(0), regid(0, 0), 1)],
            output_size: 4,
            constlen: 8,
            info: ShaderInfo {
                tess: TessInfo {
                    spacing: TessSpacing::FractionalOdd,
                    primitive_mode: TessPrimitiveMode::Triangles,
                    ccw: true,
                    tcs_vertices_out: 4,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let ds = ShaderVariant {
            stage: ShaderStage::TessEval,
            inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(0, 0), 0xf, 0)],
            outputs: vec![ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 0)],
            output_size: 4,
            constlen: 8,
            ..Default::default()
        };
        (vs, hs, ds)
    }

    #[test]
    fn tessellation_controls() {
        let (vs, hs, ds) = tess_stages();
        let s = Stages {
            hs: Some(&hs),
            ds: Some(&ds),
            ..stages(&vs, None)
        };

        let mut cs = CsWriter::unbounded();
        emit_vpc(&mut cs, &s, 3, false);
        let regs = decode(&cs);
        assert!(regs.contains(SP_DS_OUT_REG0));
        assert_eq!(regs.get(PC_TESS_NUM_VERTEX), Some(4));
        assert_eq!(regs.get(PC_HS_INPUT_SIZE), Some(3 * 8 / 4));
        assert_eq!(regs.get(SP_HS_UNKNOWN_A831), Some(8));
        // The evaluation stage left spacing unspecified, so the control stage decides.
        assert_eq!(
            regs.get(PC_TESS_CNTL),
            Some(pc_tess_cntl(
                a6xx_protocol::regs::TessSpacing::FractionalOdd,
                TessOutput::CcwTris
            ))
        );

        let maps: Vec<_> = regs.packets_of(CpOpcode::LoadState6Geom).collect();
        assert_eq!(maps.len(), 2);
        assert_eq!(LoadState6Dw0::decode(maps[0][0]).unwrap().state_block, StateBlock::HsShader);
        assert_eq!(maps[0][3], 8);
        assert_eq!(LoadState6Dw0::decode(maps[1][0]).unwrap().state_block, StateBlock::DsShader);
        assert_eq!(maps[1][3], 1);

        let mut cs = CsWriter::unbounded();
        emit_vpc(&mut cs, &s, 3, true);
        // 8 dwords * 3 points * 16 patches per wave, over 64 lanes.
        assert_eq!(decode(&cs).get(SP_HS_UNKNOWN_A831), Some(6));
    }

    #[test]
    fn evaluation_stage_spacing_wins() {
        let (_, hs, mut ds) = tess_stages();
        ds.info.tess = TessInfo {
            spacing: TessSpacing::Equal,
            point_mode: true,
            ..Default::default()
        };
        let info = tess_info(&hs, &ds);
        assert_eq!(info.spacing, TessSpacing::Equal);
        assert_eq!(tess_output(info), TessOutput::Points);
    }

    #[test]
    fn link_map_is_clipped_to_constlen() {
        let (vs, mut hs, _) = tess_stages();
        hs.const_state.offsets.primitive_map = 8;
        let mut cs = CsWriter::unbounded();
        emit_link_map(&mut cs, &vs, &hs, StateBlock::HsShader);
        assert!(cs.is_empty());
    }

    #[test]
    #[should_panic(expected = "not vec4 aligned")]
    fn const_upload_must_be_whole_vec4s() {
        let mut cs = CsWriter::unbounded();
        emit_const(&mut cs, CpOpcode::LoadState6Geom, 0, StateBlock::VsShader, &[1, 2, 3]);
    }

    #[test]
    fn flat_and_point_coord_modes() {
        let mut flat = ShaderInput::varying(VaryingSlot::Var(0), regid(0, 0), 0x5, 0);
        flat.interpolate = InterpMode::Flat;
        assert_eq!(varying_mode(&flat), (0b0101, 0, 4));

        let pntc = ShaderInput::varying(VaryingSlot::Pntc, regid(0, 0), 0xf, 0);
        assert_eq!(varying_mode(&pntc), ((2 << 4) | (3 << 6), 1 | (2 << 2), 8));

        let smooth = ShaderInput::varying(VaryingSlot::Var(1), regid(0, 0), 0xf, 0);
        assert_eq!(varying_mode(&smooth), (0, 0, 0));
    }

    #[test]
    fn modes_straddling_a_word_spill_into_the_next() {
        let mut input = ShaderInput::varying(VaryingSlot::Var(0), regid(0, 0), 0xf, 14);
        input.rasterflat = true;
        let fs = ShaderVariant {
            inputs: vec![input],
            total_in: 18,
            ..Default::default()
        };
        let (interp, repl) = varying_mode_tables(Some(&fs));
        // inloc 14 -> bit 28; four flat components take bits 28..36.
        assert_eq!(interp[0], 0b0101 << 28);
        assert_eq!(interp[1], 0b0101);
        assert_eq!(repl, [0; 8]);

        let mut cs = CsWriter::unbounded();
        emit_varying_modes(&mut cs, None);
        let regs = decode(&cs);
        assert_eq!(regs.writes.len(), 16);
        assert!(regs.writes.iter().all(|(_, v)| *v == 0));
    }

    #[test]
    fn geometry_constants_for_tessellation_and_gs() {
        let (vs, mut hs, mut ds) = tess_stages();
        hs.const_state.offsets.primitive_param = 3;
        ds.const_state.offsets.primitive_param = 5;
        let gs = ShaderVariant {
            stage: ShaderStage::Geometry,
            const_state: ConstState {
                offsets: ConstOffsets {
                    primitive_param: 7,
                    ..Default::default()
                },
                ..Default::default()
            },
            info: ShaderInfo {
                gs: GsInfo {
                    vertices_in: 2,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let s = Stages {
            hs: Some(&hs),
            ds: Some(&ds),
            gs: Some(&gs),
            ..stages(&vs, None)
        };
        let mut cs = CsWriter::unbounded();
        emit_geom_tess_consts(&mut cs, &s, 3);
        let regs = decode(&cs);
        let consts: Vec<_> = regs
            .packets_of(CpOpcode::LoadState6Geom)
            .map(|p| {
                let dw0 = LoadState6Dw0::decode(p[0]).unwrap();
                (dw0.state_block, dw0.dst_off, p[3..].to_vec())
            })
            .collect();
        assert_eq!(
            consts,
            vec![
                (StateBlock::VsShader, 0, vec![8 * 3 * 4, 32, 0, 0]),
                (StateBlock::HsShader, 3, vec![8 * 3 * 4, 32, 4, 3]),
                (StateBlock::DsShader, 5, vec![4 * 2 * 4, 16, 4, 4]),
                (StateBlock::GsShader, 7, vec![4 * 2 * 4, 16, 0, 0]),
            ]
        );
    }
}
