//! a6xx register map.
//!
//! Register addresses are plain `u16` constants. Registers that pack several fields carry a
//! small value-builder struct with a `value()` encoder; registers made only of booleans use
//! `bitflags`. Field positions for a number of registers were inferred from observed vendor
//! driver streams and are reproduced as-is.

use bitflags::bitflags;

/// A single register write: `addr <- value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reg {
    pub addr: u16,
    pub value: u32,
}

impl Reg {
    pub const fn new(addr: u16, value: u32) -> Self {
        Self { addr, value }
    }

    pub fn float(addr: u16, value: f32) -> Self {
        Self::new(addr, value.to_bits())
    }
}

const fn field(v: u32, shift: u32, width: u32) -> u32 {
    (v & ((1u32 << width) - 1)) << shift
}

const fn bit(b: bool, shift: u32) -> u32 {
    (b as u32) << shift
}

/// Encodes a shader register id (`r<num>.<comp>`).
pub const fn regid(num: u32, comp: u32) -> u8 {
    ((num << 2) | (comp & 0x3)) as u8
}

/// `r63.x`, the "no register" sentinel.
pub const INVALID_REG: u8 = regid(63, 0);

pub const fn valid_reg(r: u8) -> bool {
    r != INVALID_REG
}

// ---------------------------------------------------------------------------------------------
// VFD
// ---------------------------------------------------------------------------------------------

pub const VFD_CONTROL_0: u16 = 0xa000;
pub const VFD_CONTROL_1: u16 = 0xa001;
pub const VFD_CONTROL_2: u16 = 0xa002;
pub const VFD_CONTROL_3: u16 = 0xa003;
pub const VFD_CONTROL_4: u16 = 0xa004;
pub const VFD_CONTROL_5: u16 = 0xa005;
pub const VFD_CONTROL_6: u16 = 0xa006;

pub const fn vfd_fetch_stride(i: u32) -> u16 {
    (0xa010 + 4 * i + 3) as u16
}

pub const fn vfd_decode_instr(i: u32) -> u16 {
    (0xa090 + 2 * i) as u16
}

pub const fn vfd_decode_step_rate(i: u32) -> u16 {
    (0xa091 + 2 * i) as u16
}

pub const fn vfd_dest_cntl(i: u32) -> u16 {
    (0xa0d0 + i) as u16
}

pub const fn vfd_control_0(fetch_cnt: u32, decode_cnt: u32) -> u32 {
    field(fetch_cnt, 0, 6) | field(decode_cnt, 8, 6)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VfdDecodeInstr {
    pub idx: u32,
    pub offset: u32,
    pub instanced: bool,
    pub format: u32,
    pub swap: u32,
    pub unk30: bool,
    pub float: bool,
}

impl VfdDecodeInstr {
    pub const fn value(&self) -> u32 {
        field(self.idx, 0, 5)
            | field(self.offset, 5, 12)
            | bit(self.instanced, 17)
            | field(self.format, 20, 8)
            | field(self.swap, 28, 2)
            | bit(self.unk30, 30)
            | bit(self.float, 31)
    }
}

pub const fn vfd_dest_cntl_instr(writemask: u32, regid: u8) -> u32 {
    field(writemask, 0, 4) | field(regid as u32, 4, 8)
}

pub const fn vfd_control_1(vertex_id: u8, instance_id: u8, primitive_id: u8) -> u32 {
    (vertex_id as u32) | ((instance_id as u32) << 8) | ((primitive_id as u32) << 16) | 0xfc00_0000
}

pub const fn vfd_control_2(hs_patch_id: u8, invocation_id: u8) -> u32 {
    (hs_patch_id as u32) | ((invocation_id as u32) << 8)
}

pub const fn vfd_control_3(ds_patch_id: u8, tess_x: u8, tess_y: u8) -> u32 {
    0xfc | ((ds_patch_id as u32) << 8) | ((tess_x as u32) << 16) | ((tess_y as u32) << 24)
}

pub const VFD_CONTROL_4_VALUE: u32 = 0xfc;

pub const fn vfd_control_5(gs_header: u8) -> u32 {
    (gs_header as u32) | 0xfc00
}

pub const VFD_CONTROL_6_PRIMID_PASSTHRU: u32 = 1 << 0;

// ---------------------------------------------------------------------------------------------
// SP / HLSQ per-stage registers
// ---------------------------------------------------------------------------------------------

pub const SP_VS_CTRL_REG0: u16 = 0xa800;
pub const SP_VS_PRIMITIVE_CNTL: u16 = 0xa802;
pub const SP_VS_OUT_REG0: u16 = 0xa803;
pub const SP_VS_VPC_DST_REG0: u16 = 0xa813;
pub const SP_VS_OBJ_START_LO: u16 = 0xa81c;
pub const SP_VS_CONFIG: u16 = 0xa823;

pub const SP_HS_CTRL_REG0: u16 = 0xa830;
pub const SP_HS_UNKNOWN_A831: u16 = 0xa831;
pub const SP_HS_OBJ_START_LO: u16 = 0xa834;
pub const SP_HS_CONFIG: u16 = 0xa83b;

pub const SP_DS_CTRL_REG0: u16 = 0xa840;
pub const SP_DS_PRIMITIVE_CNTL: u16 = 0xa842;
pub const SP_DS_OUT_REG0: u16 = 0xa843;
pub const SP_DS_VPC_DST_REG0: u16 = 0xa853;
pub const SP_DS_OBJ_START_LO: u16 = 0xa85c;
pub const SP_DS_CONFIG: u16 = 0xa863;

pub const SP_GS_CTRL_REG0: u16 = 0xa870;
pub const SP_GS_PRIM_SIZE: u16 = 0xa871;
pub const SP_GS_PRIMITIVE_CNTL: u16 = 0xa873;
pub const SP_GS_OUT_REG0: u16 = 0xa874;
pub const SP_GS_VPC_DST_REG0: u16 = 0xa884;
pub const SP_GS_OBJ_START_LO: u16 = 0xa88d;
pub const SP_GS_CONFIG: u16 = 0xa894;

pub const SP_FS_CTRL_REG0: u16 = 0xa980;
pub const SP_FS_OBJ_START_LO: u16 = 0xa983;
pub const SP_BLEND_CNTL: u16 = 0xa989;
pub const SP_FS_RENDER_COMPONENTS: u16 = 0xa98b;
pub const SP_FS_OUTPUT_CNTL0: u16 = 0xa98c;
pub const SP_FS_OUTPUT_CNTL1: u16 = 0xa98d;
pub const SP_FS_OUTPUT_REG0: u16 = 0xa98e;
pub const SP_FS_PREFETCH_CNTL: u16 = 0xa99e;
pub const SP_FS_PREFETCH_CMD0: u16 = 0xa99f;
pub const SP_FS_BINDLESS_PREFETCH_CMD0: u16 = 0xa9a3;
pub const SP_FS_CONFIG: u16 = 0xab04;

pub const SP_CS_CTRL_REG0: u16 = 0xa9b0;
pub const SP_CS_UNKNOWN_A9B1: u16 = 0xa9b1;
pub const SP_CS_OBJ_START_LO: u16 = 0xa9b4;
pub const SP_CS_CONFIG: u16 = 0xa9bb;

pub const SP_TP_SAMPLE_CONFIG: u16 = 0xb304;
pub const SP_TP_SAMPLE_LOCATION_0: u16 = 0xb305;

pub const HLSQ_VS_CNTL: u16 = 0xb800;
pub const HLSQ_HS_CNTL: u16 = 0xb801;
pub const HLSQ_DS_CNTL: u16 = 0xb802;
pub const HLSQ_GS_CNTL: u16 = 0xb803;
pub const HLSQ_UNKNOWN_B980: u16 = 0xb980;
pub const HLSQ_CONTROL_1_REG: u16 = 0xb982;
pub const HLSQ_CS_CNTL: u16 = 0xb987;
pub const HLSQ_CS_CNTL_0: u16 = 0xb997;
pub const HLSQ_INVALIDATE_CMD: u16 = 0xbb08;
pub const HLSQ_FS_CNTL: u16 = 0xbb10;

#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThreadSize {
    TwoQuads = 0,
    #[default]
    FourQuads = 1,
}

/// `SP_xS_CTRL_REG0`. `varying`, `diff_fine`, `pixlodenable` and `unk24` only exist in the
/// fragment-stage flavour of the register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpXsCtrlReg0 {
    pub threadsize: ThreadSize,
    pub halfregfootprint: u32,
    pub fullregfootprint: u32,
    pub branchstack: u32,
    pub mergedregs: bool,
    pub varying: bool,
    pub diff_fine: bool,
    pub pixlodenable: bool,
    pub unk24: bool,
}

impl SpXsCtrlReg0 {
    pub const fn value(&self) -> u32 {
        field(self.threadsize as u32, 0, 1)
            | field(self.halfregfootprint, 1, 6)
            | field(self.fullregfootprint, 7, 6)
            | field(self.branchstack, 14, 6)
            | bit(self.varying, 20)
            | bit(self.diff_fine, 21)
            | bit(self.pixlodenable, 22)
            | bit(self.unk24, 24)
            | bit(self.mergedregs, 31)
    }
}

/// `SP_xS_CONFIG`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpXsConfig {
    pub enabled: bool,
    pub bindless_tex: bool,
    pub bindless_samp: bool,
    pub bindless_ibo: bool,
    pub bindless_ubo: bool,
    pub ntex: u32,
    pub nsamp: u32,
    pub nibo: u32,
}

impl SpXsConfig {
    pub const fn value(&self) -> u32 {
        bit(self.bindless_tex, 0)
            | bit(self.bindless_samp, 1)
            | bit(self.bindless_ibo, 2)
            | bit(self.bindless_ubo, 3)
            | bit(self.enabled, 8)
            | field(self.ntex, 9, 8)
            | field(self.nsamp, 17, 5)
            | field(self.nibo, 22, 7)
    }
}

/// `HLSQ_xS_CNTL`. The constant length is programmed in units of four vec4s.
pub const fn hlsq_xs_cntl(constlen: u32, enabled: bool) -> u32 {
    field(constlen >> 2, 0, 8) | bit(enabled, 8)
}

/// One 16-bit half of `SP_xS_OUT_REG`.
pub const fn sp_out_half(regid: u8, compmask: u8) -> u32 {
    field(regid as u32, 0, 8) | field(compmask as u32, 8, 4)
}

pub const fn sp_xs_primitive_cntl(out: u32, flags_regid: u8) -> u32 {
    field(out, 0, 6) | field(flags_regid as u32, 6, 8)
}

pub const fn sp_fs_prefetch_cntl(count: u32, unk4: u8) -> u32 {
    field(count, 0, 3) | field(unk4 as u32, 4, 8) | 0x7000
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpFsPrefetchCmd {
    pub src: u32,
    pub samp_id: u32,
    pub tex_id: u32,
    pub dst: u8,
    pub wrmask: u32,
    pub half: bool,
    pub cmd: u32,
}

impl SpFsPrefetchCmd {
    pub const fn value(&self) -> u32 {
        field(self.src, 0, 7)
            | field(self.samp_id, 7, 4)
            | field(self.tex_id, 11, 5)
            | field(self.dst as u32, 16, 6)
            | field(self.wrmask, 22, 4)
            | bit(self.half, 26)
            | field(self.cmd, 27, 5)
    }
}

pub const fn sp_fs_bindless_prefetch_cmd(samp_id: u32, tex_id: u32) -> u32 {
    field(samp_id, 0, 16) | field(tex_id, 16, 16)
}

pub const fn hlsq_control_2(face: u8, sampleid: u8, samplemask: u8, size: u8) -> u32 {
    (face as u32) | ((sampleid as u32) << 8) | ((samplemask as u32) << 16) | ((size as u32) << 24)
}

pub const fn hlsq_control_3(persp_pixel: u8, linear_pixel: u8, persp_centroid: u8, linear_centroid: u8) -> u32 {
    (persp_pixel as u32)
        | ((linear_pixel as u32) << 8)
        | ((persp_centroid as u32) << 16)
        | ((linear_centroid as u32) << 24)
}

pub const fn hlsq_control_4(persp_sample: u8, linear_sample: u8, xycoord: u8, zwcoord: u8) -> u32 {
    (persp_sample as u32) | ((linear_sample as u32) << 8) | ((xycoord as u32) << 16) | ((zwcoord as u32) << 24)
}

pub const fn hlsq_cs_cntl_0(wgid: u8, localid: u8) -> u32 {
    (wgid as u32) | (0xfc << 8) | (0xfc << 16) | ((localid as u32) << 24)
}

bitflags! {
    /// `HLSQ_INVALIDATE_CMD`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HlsqInvalidate: u32 {
        const VS_STATE = 1 << 0;
        const HS_STATE = 1 << 1;
        const DS_STATE = 1 << 2;
        const GS_STATE = 1 << 3;
        const FS_STATE = 1 << 4;
        const CS_STATE = 1 << 5;
        const CS_IBO = 1 << 6;
        const GFX_IBO = 1 << 7;
        const CS_SHARED_CONST = 1 << 19;
        const GFX_SHARED_CONST = 1 << 8;
        const CS_BINDLESS = 0x1f << 9;
        const GFX_BINDLESS = 0x1f << 14;
    }
}

// ---------------------------------------------------------------------------------------------
// SP fragment outputs and blending
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpFsOutputCntl0 {
    pub dual_color_in_enable: bool,
    pub depth_regid: u8,
    pub sampmask_regid: u8,
    pub stencilref_regid: u8,
}

impl SpFsOutputCntl0 {
    pub const fn value(&self) -> u32 {
        bit(self.dual_color_in_enable, 0)
            | field(self.depth_regid as u32, 8, 8)
            | field(self.sampmask_regid as u32, 16, 8)
            | field(self.stencilref_regid as u32, 24, 8)
    }
}

pub const fn sp_fs_output_reg(regid: u8, half_precision: bool) -> u32 {
    field(regid as u32, 0, 8) | bit(half_precision, 8)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpBlendCntl {
    pub enabled: u32,
    pub unk8: bool,
    pub dual_color_in_enable: bool,
    pub alpha_to_coverage: bool,
}

impl SpBlendCntl {
    pub const fn value(&self) -> u32 {
        field(self.enabled, 0, 8)
            | bit(self.unk8, 8)
            | bit(self.dual_color_in_enable, 9)
            | bit(self.alpha_to_coverage, 10)
    }
}

// ---------------------------------------------------------------------------------------------
// VPC
// ---------------------------------------------------------------------------------------------

pub const VPC_UNKNOWN_9100: u16 = 0x9100;
pub const VPC_VS_CLIP_CNTL: u16 = 0x9101;
pub const VPC_GS_CLIP_CNTL: u16 = 0x9102;
pub const VPC_DS_CLIP_CNTL: u16 = 0x9103;
pub const VPC_VS_LAYER_CNTL: u16 = 0x9104;
pub const VPC_GS_LAYER_CNTL: u16 = 0x9105;
pub const VPC_DS_LAYER_CNTL: u16 = 0x9106;
pub const VPC_POLYGON_MODE: u16 = 0x9108;
pub const VPC_VARYING_INTERP_MODE0: u16 = 0x9200;
pub const VPC_VARYING_PS_REPL_MODE0: u16 = 0x9208;
pub const VPC_VAR_DISABLE0: u16 = 0x9212;
pub const VPC_SO_BUF_CNTL: u16 = 0x9214;
pub const VPC_SO_CNTL: u16 = 0x9216;
pub const VPC_SO_PROG: u16 = 0x9217;
pub const VPC_VS_PACK: u16 = 0x9301;
pub const VPC_GS_PACK: u16 = 0x9302;
pub const VPC_DS_PACK: u16 = 0x9303;
pub const VPC_CNTL_0: u16 = 0x9304;

pub const fn vpc_so_ncomp(buf: u32) -> u16 {
    (0x921d + 7 * buf) as u16
}

pub const VPC_SO_CNTL_ENABLE: u32 = 1 << 16;

pub const fn vpc_so_buf_cntl_buf(buf: u32) -> u32 {
    1 << (3 * buf)
}

pub const VPC_SO_BUF_CNTL_ENABLE: u32 = 1 << 15;

/// One half of a `VPC_SO_PROG` entry. `off` is a byte offset into the output buffer.
pub const fn vpc_so_prog_a(buf: u32, off: u32) -> u32 {
    field(buf, 0, 2) | (((off >> 2) << 2) & 0x7fc) | (1 << 11)
}

pub const fn vpc_so_prog_b(buf: u32, off: u32) -> u32 {
    field(buf, 12, 2) | ((((off >> 2) << 2) & 0x7fc) << 12) | (1 << 23)
}

/// `VPC_xS_PACK`.
pub const fn vpc_xs_pack(stride_in_vpc: u32, positionloc: u32, psizeloc: u32, extrapos: u32) -> u32 {
    field(stride_in_vpc, 0, 8) | field(positionloc, 8, 8) | field(psizeloc, 16, 8) | field(extrapos, 24, 4)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VpcCntl0 {
    pub numnonposvar: u32,
    pub primidloc: u32,
    pub varying: bool,
    pub unkloc: u32,
}

impl VpcCntl0 {
    pub const fn value(&self) -> u32 {
        field(self.numnonposvar, 0, 8)
            | field(self.primidloc, 8, 8)
            | bit(self.varying, 16)
            | field(self.unkloc, 24, 8)
    }
}

/// `VPC_xS_LAYER_CNTL`; the view location is always left unassigned.
pub const fn vpc_xs_layer_cntl(layerloc: u32) -> u32 {
    field(layerloc, 0, 8) | 0xff00
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolygonMode {
    Points = 1,
    Lines = 2,
    Triangles = 3,
}

// ---------------------------------------------------------------------------------------------
// PC
// ---------------------------------------------------------------------------------------------

pub const PC_TESS_NUM_VERTEX: u16 = 0x9800;
pub const PC_HS_INPUT_SIZE: u16 = 0x9801;
pub const PC_TESS_CNTL: u16 = 0x9802;
pub const PC_PRIMID_PASSTHRU: u16 = 0x9806;
pub const PC_POLYGON_MODE: u16 = 0x9981;
pub const PC_VS_OUT_CNTL: u16 = 0x9b01;
pub const PC_GS_OUT_CNTL: u16 = 0x9b02;
pub const PC_PRIMITIVE_CNTL_3: u16 = 0x9b03;
pub const PC_DS_OUT_CNTL: u16 = 0x9b04;
pub const PC_PRIMITIVE_CNTL_5: u16 = 0x9b05;
pub const PC_PRIMITIVE_CNTL_6: u16 = 0x9b06;
pub const PC_UNKNOWN_9B07: u16 = 0x9b07;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PcXsOutCntl {
    pub stride_in_vpc: u32,
    pub psize: bool,
    pub layer: bool,
    pub primitive_id: bool,
    pub clip_mask: u32,
}

impl PcXsOutCntl {
    pub const fn value(&self) -> u32 {
        field(self.stride_in_vpc, 0, 8)
            | bit(self.psize, 8)
            | bit(self.layer, 9)
            | bit(self.primitive_id, 11)
            | field(self.clip_mask, 16, 8)
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TessSpacing {
    Equal = 0,
    FractionalOdd = 2,
    FractionalEven = 3,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TessOutput {
    Points = 0,
    Lines = 1,
    CwTris = 2,
    CcwTris = 3,
}

pub const fn pc_tess_cntl(spacing: TessSpacing, output: TessOutput) -> u32 {
    field(spacing as u32, 0, 2) | field(output as u32, 2, 2)
}

pub const fn pc_primitive_cntl_5(vertices_out: u32, output: TessOutput, invocations: u32) -> u32 {
    field(vertices_out, 0, 8) | field(invocations, 10, 5) | field(output as u32, 16, 2)
}

pub const fn pc_primitive_cntl_6(stride_in_vpc: u32) -> u32 {
    field(stride_in_vpc, 0, 11)
}

/// `DI_PT_*` primitive types.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriList = 4,
    TriStrip = 5,
    TriFan = 6,
    LineListAdj = 0xa,
    LineStripAdj = 0xb,
    TriListAdj = 0xc,
    TriStripAdj = 0xd,
    Patches0 = 0x1f,
}

// ---------------------------------------------------------------------------------------------
// GRAS
// ---------------------------------------------------------------------------------------------

pub const GRAS_CL_CNTL: u16 = 0x8000;
pub const GRAS_VS_CL_CNTL: u16 = 0x8001;
pub const GRAS_DS_CL_CNTL: u16 = 0x8002;
pub const GRAS_GS_CL_CNTL: u16 = 0x8003;
pub const GRAS_CNTL: u16 = 0x8005;
pub const GRAS_CL_GUARDBAND_CLIP_ADJ: u16 = 0x8006;
pub const GRAS_CL_VPORT_XOFFSET0: u16 = 0x8010;
pub const GRAS_CL_VPORT_XSCALE0: u16 = 0x8011;
pub const GRAS_CL_VPORT_YOFFSET0: u16 = 0x8012;
pub const GRAS_CL_VPORT_YSCALE0: u16 = 0x8013;
pub const GRAS_CL_VPORT_ZOFFSET0: u16 = 0x8014;
pub const GRAS_CL_VPORT_ZSCALE0: u16 = 0x8015;
pub const GRAS_CL_Z_CLAMP_MIN0: u16 = 0x8070;
pub const GRAS_CL_Z_CLAMP_MAX0: u16 = 0x8071;
pub const GRAS_SU_CNTL: u16 = 0x8090;
pub const GRAS_SU_POINT_MINMAX: u16 = 0x8091;
pub const GRAS_SU_POINT_SIZE: u16 = 0x8092;
pub const GRAS_SU_DEPTH_PLANE_CNTL: u16 = 0x8094;
pub const GRAS_SU_POLY_OFFSET_SCALE: u16 = 0x8095;
pub const GRAS_SU_POLY_OFFSET_OFFSET: u16 = 0x8096;
pub const GRAS_SU_POLY_OFFSET_OFFSET_CLAMP: u16 = 0x8097;
pub const GRAS_VS_LAYER_CNTL: u16 = 0x809b;
pub const GRAS_GS_LAYER_CNTL: u16 = 0x809c;
pub const GRAS_DS_LAYER_CNTL: u16 = 0x809d;
pub const GRAS_SC_SCREEN_SCISSOR_TL0: u16 = 0x80b0;
pub const GRAS_SC_SCREEN_SCISSOR_BR0: u16 = 0x80b1;
pub const GRAS_SC_VIEWPORT_SCISSOR_TL0: u16 = 0x80d0;
pub const GRAS_SC_VIEWPORT_SCISSOR_BR0: u16 = 0x80d1;
pub const GRAS_UNKNOWN_8101: u16 = 0x8101;
pub const GRAS_SAMPLE_CNTL: u16 = 0x8109;
pub const GRAS_SAMPLE_CONFIG: u16 = 0x8104;
pub const GRAS_SAMPLE_LOCATION_0: u16 = 0x8105;

bitflags! {
    /// `GRAS_CL_CNTL`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct GrasClCntl: u32 {
        const ZNEAR_CLIP_DISABLE = 1 << 0;
        const ZFAR_CLIP_DISABLE = 1 << 1;
        const UNK5 = 1 << 5;
        const ZERO_GB_SCALE_Z = 1 << 6;
        const VP_CLIP_CODE_IGNORE = 1 << 7;
    }
}

bitflags! {
    /// `GRAS_CNTL` and the low bits of `RB_RENDER_CONTROL0`, which share a layout.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FragInterpCntl: u32 {
        const IJ_PERSP_PIXEL = 1 << 0;
        const IJ_PERSP_CENTROID = 1 << 1;
        const IJ_PERSP_SAMPLE = 1 << 2;
        const SIZE = 1 << 3;
        const SIZE_PERSAMP = 1 << 5;
        const UNK10 = 1 << 10;
    }
}

pub const GRAS_XS_LAYER_CNTL_WRITES_LAYER: u32 = 1 << 0;
pub const SAMPLE_CNTL_PER_SAMP_MODE: u32 = 1 << 0;

/// `COORD_MASK` field of `GRAS_CNTL` / `RB_RENDER_CONTROL0`.
pub const fn coord_mask(mask: u32) -> u32 {
    field(mask, 6, 4)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrasSuCntl {
    pub cull_front: bool,
    pub cull_back: bool,
    pub front_cw: bool,
    pub linehalfwidth: f32,
    pub poly_offset: bool,
    pub msaa_enable: bool,
}

impl GrasSuCntl {
    pub const LINEHALFWIDTH_MASK: u32 = 0xff << 3;

    pub fn value(&self) -> u32 {
        bit(self.cull_front, 0)
            | bit(self.cull_back, 1)
            | bit(self.front_cw, 2)
            | Self::linehalfwidth(self.linehalfwidth)
            | bit(self.poly_offset, 11)
            | bit(self.msaa_enable, 13)
    }

    /// Line half width in 6.2 fixed point.
    pub fn linehalfwidth(v: f32) -> u32 {
        (((v * 4.0) as i32 as u32) << 3) & Self::LINEHALFWIDTH_MASK
    }
}

/// Unsigned 12.4 fixed point, as used by the point size registers.
pub fn ufixed_12_4(v: f32) -> u32 {
    ((v * 16.0) as u32) & 0xffff
}

pub fn sfixed_12_4(v: f32) -> u32 {
    ((v * 16.0) as i32 as u32) & 0xffff
}

pub fn gras_su_point_minmax(min: f32, max: f32) -> u32 {
    ufixed_12_4(min) | (ufixed_12_4(max) << 16)
}

pub const fn scissor_xy(x: u32, y: u32) -> u32 {
    field(x, 0, 15) | field(y, 16, 15)
}

pub const fn guardband_clip_adj(horz: u32, vert: u32) -> u32 {
    field(horz, 0, 9) | field(vert, 10, 9)
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZMode {
    EarlyZ = 0,
    LateZ = 1,
}

/// 4.4 fixed-point sample position packed into the per-sample byte of `*_SAMPLE_LOCATION`.
pub fn sample_location(x: f32, y: f32) -> u32 {
    let fx = ((x * 16.0) as i32 as u32) & 0xf;
    let fy = ((y * 16.0) as i32 as u32) & 0xf;
    fx | (fy << 4)
}

pub const SAMPLE_CONFIG_LOCATION_ENABLE: u32 = 1 << 1;

// ---------------------------------------------------------------------------------------------
// RB
// ---------------------------------------------------------------------------------------------

pub const RB_RENDER_COMPONENTS: u16 = 0x8807;
pub const RB_RENDER_CONTROL0: u16 = 0x8809;
pub const RB_RENDER_CONTROL1: u16 = 0x880a;
pub const RB_FS_OUTPUT_CNTL0: u16 = 0x880b;
pub const RB_FS_OUTPUT_CNTL1: u16 = 0x880c;
pub const RB_SAMPLE_CNTL: u16 = 0x8810;
pub const RB_BLEND_RED_F32: u16 = 0x8860;
pub const RB_ALPHA_CONTROL: u16 = 0x8864;
pub const RB_BLEND_CNTL: u16 = 0x8865;
pub const RB_DEPTH_PLANE_CNTL: u16 = 0x8870;
pub const RB_DEPTH_CNTL: u16 = 0x8871;
pub const RB_Z_BOUNDS_MIN: u16 = 0x8874;
pub const RB_Z_BOUNDS_MAX: u16 = 0x8875;
pub const RB_Z_CLAMP_MIN: u16 = 0x8878;
pub const RB_Z_CLAMP_MAX: u16 = 0x8879;
pub const RB_STENCIL_CONTROL: u16 = 0x8880;
pub const RB_STENCILREF: u16 = 0x8887;
pub const RB_STENCILMASK: u16 = 0x8888;
pub const RB_STENCILWRMASK: u16 = 0x8889;
pub const RB_SAMPLE_CONFIG: u16 = 0x88f0;
pub const RB_SAMPLE_LOCATION_0: u16 = 0x88f1;

pub const fn rb_mrt_control(i: u32) -> u16 {
    (0x8820 + 8 * i) as u16
}

pub const fn rb_mrt_blend_control(i: u32) -> u16 {
    (0x8821 + 8 * i) as u16
}

bitflags! {
    /// `RB_RENDER_CONTROL1`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RbRenderControl1: u32 {
        const SAMPLEMASK = 1 << 0;
        const FACENESS = 1 << 2;
        const SAMPLEID = 1 << 3;
        const UNK4 = 1 << 4;
        const UNK5 = 1 << 5;
        const SIZE = 1 << 6;
    }
}

bitflags! {
    /// `RB_FS_OUTPUT_CNTL0`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RbFsOutputCntl0: u32 {
        const DUAL_COLOR_IN_ENABLE = 1 << 0;
        const FRAG_WRITES_Z = 1 << 1;
        const FRAG_WRITES_SAMPMASK = 1 << 2;
        const FRAG_WRITES_STENCILREF = 1 << 3;
    }
}

bitflags! {
    /// `RB_DEPTH_CNTL`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RbDepthCntl: u32 {
        const Z_ENABLE = 1 << 0;
        const Z_WRITE_ENABLE = 1 << 1;
        const Z_CLAMP_ENABLE = 1 << 5;
        const Z_TEST_ENABLE = 1 << 6;
        const Z_BOUNDS_ENABLE = 1 << 7;
    }
}

pub const fn rb_depth_cntl_zfunc(func: u32) -> u32 {
    field(func, 2, 3)
}

/// `RB_STENCIL_CONTROL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RbStencilControl {
    pub stencil_enable: bool,
    pub stencil_enable_bf: bool,
    pub stencil_read: bool,
    pub func: u32,
    pub fail: u32,
    pub zpass: u32,
    pub zfail: u32,
    pub func_bf: u32,
    pub fail_bf: u32,
    pub zpass_bf: u32,
    pub zfail_bf: u32,
}

impl RbStencilControl {
    pub const fn value(&self) -> u32 {
        bit(self.stencil_enable, 0)
            | bit(self.stencil_enable_bf, 1)
            | bit(self.stencil_read, 2)
            | field(self.func, 8, 3)
            | field(self.fail, 11, 3)
            | field(self.zpass, 14, 3)
            | field(self.zfail, 17, 3)
            | field(self.func_bf, 20, 3)
            | field(self.fail_bf, 23, 3)
            | field(self.zpass_bf, 26, 3)
            | field(self.zfail_bf, 29, 3)
    }
}

/// MRT count field shared by `SP_FS_OUTPUT_CNTL1` and `RB_FS_OUTPUT_CNTL1`.
pub const fn fs_output_cntl1_mrt(count: u32) -> u32 {
    field(count, 0, 4)
}

/// `adreno_compare_func`; same order as the portable compare ops.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareFunc {
    Never = 0,
    Less = 1,
    Equal = 2,
    LEqual = 3,
    Greater = 4,
    NotEqual = 5,
    GEqual = 6,
    Always = 7,
}

/// `adreno_stencil_op`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilOpCode {
    Keep = 0,
    Zero = 1,
    Replace = 2,
    IncrClamp = 3,
    DecrClamp = 4,
    Invert = 5,
    IncrWrap = 6,
    DecrWrap = 7,
}

/// `adreno_rb_blend_factor`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RbBlendFactor {
    Zero = 0,
    One = 1,
    SrcColor = 4,
    OneMinusSrcColor = 5,
    SrcAlpha = 6,
    OneMinusSrcAlpha = 7,
    DstColor = 8,
    OneMinusDstColor = 9,
    DstAlpha = 10,
    OneMinusDstAlpha = 11,
    ConstantColor = 12,
    OneMinusConstantColor = 13,
    ConstantAlpha = 14,
    OneMinusConstantAlpha = 15,
    SrcAlphaSaturate = 16,
    Src1Color = 20,
    OneMinusSrc1Color = 21,
    Src1Alpha = 22,
    OneMinusSrc1Alpha = 23,
}

/// `a3xx_rb_blend_opcode`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOpcode {
    DstPlusSrc = 0,
    SrcMinusDst = 1,
    MinDstSrc = 2,
    MaxDstSrc = 3,
    DstMinusSrc = 4,
}

/// `a3xx_rop_code`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RopCode {
    Clear = 0,
    Nor = 1,
    AndInverted = 2,
    CopyInverted = 3,
    AndReverse = 4,
    Invert = 5,
    Xor = 6,
    Nand = 7,
    And = 8,
    Equiv = 9,
    Noop = 10,
    OrInverted = 11,
    Copy = 12,
    OrReverse = 13,
    Or = 14,
    Set = 15,
}

/// Front/back byte pair used by `RB_STENCILREF`, `RB_STENCILMASK` and `RB_STENCILWRMASK`.
pub const fn rb_stencil_pair(front: u32, back: u32) -> u32 {
    field(front, 0, 8) | field(back, 8, 8)
}

/// `RB_MRT_CONTROL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RbMrtControl {
    pub blend: bool,
    pub blend2: bool,
    pub rop_enable: bool,
    pub rop_code: u32,
    pub component_enable: u32,
}

impl RbMrtControl {
    pub const fn value(&self) -> u32 {
        bit(self.blend, 0)
            | bit(self.blend2, 1)
            | bit(self.rop_enable, 2)
            | field(self.rop_code, 3, 4)
            | field(self.component_enable, 7, 4)
    }
}

/// `RB_MRT_BLEND_CONTROL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RbMrtBlendControl {
    pub rgb_src_factor: u32,
    pub rgb_blend_opcode: u32,
    pub rgb_dest_factor: u32,
    pub alpha_src_factor: u32,
    pub alpha_blend_opcode: u32,
    pub alpha_dest_factor: u32,
}

impl RbMrtBlendControl {
    pub const fn value(&self) -> u32 {
        field(self.rgb_src_factor, 0, 5)
            | field(self.rgb_blend_opcode, 5, 3)
            | field(self.rgb_dest_factor, 8, 5)
            | field(self.alpha_src_factor, 16, 5)
            | field(self.alpha_blend_opcode, 21, 3)
            | field(self.alpha_dest_factor, 24, 5)
    }
}

/// `RB_BLEND_CNTL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RbBlendCntl {
    pub enable_blend: u32,
    pub independent_blend: bool,
    pub dual_color_in_enable: bool,
    pub alpha_to_coverage: bool,
    pub alpha_to_one: bool,
    pub sample_mask: u32,
}

impl RbBlendCntl {
    pub const fn value(&self) -> u32 {
        field(self.enable_blend, 0, 8)
            | bit(self.independent_blend, 8)
            | bit(self.dual_color_in_enable, 9)
            | bit(self.alpha_to_coverage, 10)
            | bit(self.alpha_to_one, 11)
            | field(self.sample_mask, 16, 16)
    }
}
