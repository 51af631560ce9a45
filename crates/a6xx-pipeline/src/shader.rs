//! Interface to the shader compiler and the variant metadata the emitters read.
//!
//! Compilation itself happens elsewhere. The builder only asks a [`ShaderCompiler`] for a
//! [`Shader`] per stage and for [`ShaderVariant`]s of it under a [`ShaderKey`].

use std::fmt;
use std::sync::Arc;

use a6xx_protocol::regs::INVALID_REG;

use crate::error::Result;
use crate::layout::PipelineLayout;
use crate::types::{ShaderStage, ShaderStageDesc};

/// Semantic slot of a varying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VaryingSlot {
    Pos,
    Psiz,
    Layer,
    Col0,
    Col1,
    Bfc0,
    Bfc1,
    /// Point sprite coordinate.
    Pntc,
    PrimitiveId,
    /// GS-internal vertex flags output.
    GsVertexFlags,
    /// Generic varying `n`.
    Var(u8),
}

impl VaryingSlot {
    /// Front/back color counterpart used when the producer only writes one of the pair.
    fn color_pair(self) -> Option<Self> {
        match self {
            VaryingSlot::Bfc0 => Some(VaryingSlot::Col0),
            VaryingSlot::Bfc1 => Some(VaryingSlot::Col1),
            VaryingSlot::Col0 => Some(VaryingSlot::Bfc0),
            VaryingSlot::Col1 => Some(VaryingSlot::Bfc1),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragResult {
    Depth,
    Stencil,
    SampleMask,
    /// Broadcast color output (`color0_mrt`).
    Color,
    Data(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemValue {
    VertexId,
    InstanceId,
    PrimitiveId,
    TessCoord,
    TcsHeader,
    GsHeader,
    SampleId,
    SampleMaskIn,
    FrontFace,
    FragCoord,
    BaryPerspPixel,
    BaryPerspSample,
    BaryPerspCentroid,
    BaryPerspSize,
    BaryLinearPixel,
    BaryLinearCentroid,
    BaryLinearSample,
    LocalInvocationId,
    WorkGroupId,
}

impl SystemValue {
    /// Barycentric inputs in hardware `IJ_*` order.
    pub const BARYCENTRICS: [SystemValue; 7] = [
        SystemValue::BaryPerspPixel,
        SystemValue::BaryPerspSample,
        SystemValue::BaryPerspCentroid,
        SystemValue::BaryPerspSize,
        SystemValue::BaryLinearPixel,
        SystemValue::BaryLinearCentroid,
        SystemValue::BaryLinearSample,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputSlot {
    /// Generic vertex attribute at `location`.
    Attrib(u32),
    Varying(VaryingSlot),
    SysVal(SystemValue),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpMode {
    #[default]
    Smooth,
    Flat,
    NoPerspective,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderInput {
    pub slot: InputSlot,
    pub regid: u8,
    pub compmask: u8,
    /// Packed varying location (driver location for stage-to-stage inputs).
    pub inloc: u32,
    /// Fetched with a `bary.f`, i.e. a real fragment varying.
    pub bary: bool,
    pub interpolate: InterpMode,
    pub rasterflat: bool,
}

impl ShaderInput {
    pub fn new(slot: InputSlot, regid: u8, compmask: u8) -> Self {
        Self {
            slot,
            regid,
            compmask,
            inloc: 0,
            bary: false,
            interpolate: InterpMode::Smooth,
            rasterflat: false,
        }
    }

    pub fn sysval(sv: SystemValue, regid: u8) -> Self {
        Self::new(InputSlot::SysVal(sv), regid, 0x1)
    }

    pub fn varying(slot: VaryingSlot, regid: u8, compmask: u8, inloc: u32) -> Self {
        Self {
            inloc,
            bary: true,
            ..Self::new(InputSlot::Varying(slot), regid, compmask)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputSlot {
    Varying(VaryingSlot),
    Frag(FragResult),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderOutput {
    pub slot: OutputSlot,
    pub regid: u8,
    /// Location in the stage's local-memory output block, used by geometry/tessellation links.
    pub loc: u32,
}

impl ShaderOutput {
    pub fn varying(slot: VaryingSlot, regid: u8, loc: u32) -> Self {
        Self {
            slot: OutputSlot::Varying(slot),
            regid,
            loc,
        }
    }

    pub fn frag(slot: FragResult, regid: u8) -> Self {
        Self {
            slot: OutputSlot::Frag(slot),
            regid,
            loc: 0,
        }
    }
}

/// Texture fetch issued before the fragment shader starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerPrefetch {
    pub src: u32,
    pub samp_id: u32,
    pub tex_id: u32,
    pub samp_bindless_id: u32,
    pub tex_bindless_id: u32,
    pub dst: u8,
    pub wrmask: u32,
    pub half_precision: bool,
    pub cmd: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamOutput {
    /// Index into the producing variant's `outputs`.
    pub register_index: u32,
    pub start_component: u32,
    pub num_components: u32,
    pub output_buffer: u32,
    /// Offset in dwords inside the output buffer.
    pub dst_offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamOutputInfo {
    pub outputs: Vec<StreamOutput>,
    pub stride: [u32; 4],
}

impl StreamOutputInfo {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Constant-file layout, in vec4 units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConstOffsets {
    pub immediate: u32,
    pub primitive_map: u32,
    pub primitive_param: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstState {
    pub offsets: ConstOffsets,
    /// Compile-time constants, in dwords.
    pub immediates: Vec<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TessPrimitiveMode {
    #[default]
    None,
    Isolines,
    Triangles,
    Quads,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TessSpacing {
    #[default]
    Unspecified,
    Equal,
    FractionalOdd,
    FractionalEven,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TessInfo {
    pub primitive_mode: TessPrimitiveMode,
    pub spacing: TessSpacing,
    pub point_mode: bool,
    pub ccw: bool,
    pub tcs_vertices_out: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GsOutputPrimitive {
    Points,
    LineStrip,
    #[default]
    TriangleStrip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GsInfo {
    pub vertices_in: u32,
    pub vertices_out: u32,
    pub invocations: u32,
    pub output_primitive: GsOutputPrimitive,
}

impl Default for GsInfo {
    fn default() -> Self {
        Self {
            vertices_in: 3,
            vertices_out: 3,
            invocations: 1,
            output_primitive: GsOutputPrimitive::TriangleStrip,
        }
    }
}

/// Source-level facts about a shader, independent of the variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShaderInfo {
    pub tess: TessInfo,
    pub gs: GsInfo,
    pub cs_local_size: [u32; 3],
    pub writes_layer: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PushConstRange {
    pub lo: u32,
    pub count: u32,
}

/// A shader module specialised for one stage of one pipeline layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shader {
    pub stage: ShaderStage,
    pub info: ShaderInfo,
    pub stream_output: StreamOutputInfo,
    /// Descriptor sets the shader statically uses.
    pub active_desc_sets: u32,
    pub push_consts: PushConstRange,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderKey {
    pub has_gs: bool,
    pub msaa: bool,
    pub sample_shading: bool,
    pub tessellation: TessPrimitiveMode,
    pub layer_zero: bool,
    pub safe_constlen: bool,
}

impl ShaderKey {
    /// A separate binning-pass vertex shader is only possible without tessellation or GS.
    pub fn has_binning_vs(&self) -> bool {
        self.tessellation == TessPrimitiveMode::None && !self.has_gs
    }
}

/// Compiled shader plus everything the state emitters need to know about it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderVariant {
    pub stage: ShaderStage,
    pub key: ShaderKey,
    pub binning_pass: bool,

    pub binary: Vec<u32>,
    /// Instruction length in 128-byte units.
    pub instrlen: u32,
    pub sizedwords: u32,

    /// Highest full/half register used, `-1` if none.
    pub max_reg: i32,
    pub max_half_reg: i32,
    pub mergedregs: bool,
    pub branchstack: u32,
    pub need_pixlod: bool,
    pub need_fine_derivatives: bool,

    pub bindless_tex: bool,
    pub bindless_samp: bool,
    pub bindless_ibo: bool,
    pub bindless_ubo: bool,
    pub num_samp: u32,

    /// Constant file length in vec4 units.
    pub constlen: u32,
    pub const_state: ConstState,

    pub inputs: Vec<ShaderInput>,
    pub outputs: Vec<ShaderOutput>,
    /// Number of packed varying components consumed (fragment).
    pub total_in: u32,
    /// Per-vertex output size in dwords, for stages feeding tessellation or GS.
    pub output_size: u32,

    pub sampler_prefetch: Vec<SamplerPrefetch>,
    pub per_samp: bool,
    pub frag_face: bool,
    pub fragcoord_compmask: u32,
    pub color0_mrt: bool,
    pub writes_pos: bool,
    pub writes_smask: bool,
    pub writes_stencilref: bool,
    pub no_earlyz: bool,
    pub has_kill: bool,

    pub info: ShaderInfo,
    pub stream_output: StreamOutputInfo,
}

impl ShaderVariant {
    pub fn find_sysval_regid(&self, sv: SystemValue) -> u8 {
        self.inputs
            .iter()
            .find(|i| i.slot == InputSlot::SysVal(sv))
            .map_or(INVALID_REG, |i| i.regid)
    }

    pub fn find_output_regid(&self, slot: OutputSlot) -> u8 {
        self.outputs
            .iter()
            .find(|o| o.slot == slot)
            .map_or(INVALID_REG, |o| o.regid)
    }

    pub fn find_varying_output_regid(&self, slot: VaryingSlot) -> u8 {
        self.find_output_regid(OutputSlot::Varying(slot))
    }

    /// Index of the output feeding `slot`, falling back across the front/back color pair.
    pub fn find_output(&self, slot: VaryingSlot) -> Option<usize> {
        let position = |s: VaryingSlot| self.outputs.iter().position(|o| o.slot == OutputSlot::Varying(s));
        position(slot).or_else(|| slot.color_pair().and_then(position))
    }

    /// Indices of the inputs that are real interpolated varyings.
    pub fn varyings(&self) -> impl Iterator<Item = usize> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, i)| i.compmask != 0 && i.bary)
            .map(|(idx, _)| idx)
    }
}

/// External shader compiler and variant cache.
///
/// Implementations must tolerate concurrent calls; the builder treats both methods as
/// blocking.
pub trait ShaderCompiler: fmt::Debug + Send + Sync {
    /// Lowers the module of `desc` for `stage`. `desc` is `None` only for the fragment stage,
    /// which must then produce an empty shader.
    fn create_shader(
        &self,
        stage: ShaderStage,
        desc: Option<&ShaderStageDesc>,
        layout: &PipelineLayout,
    ) -> Result<Arc<Shader>>;

    /// Returns the variant of `shader` for `key`, compiling it if needed. The flag reports
    /// whether it was newly created.
    fn get_or_compile(
        &self,
        shader: &Shader,
        key: &ShaderKey,
        binning_pass: bool,
    ) -> Result<(Arc<ShaderVariant>, bool)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use a6xx_protocol::regs::regid;

    #[test]
    fn back_color_falls_back_to_front_color() {
        let v = ShaderVariant {
            outputs: vec![
                ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 0),
                ShaderOutput::varying(VaryingSlot::Col0, regid(1, 0), 4),
            ],
            ..Default::default()
        };
        assert_eq!(v.find_output(VaryingSlot::Bfc0), Some(1));
        assert_eq!(v.find_output(VaryingSlot::Col1), None);
        assert_eq!(v.find_output(VaryingSlot::Var(3)), None);
    }

    #[test]
    fn varyings_skip_sysvals_and_empty_masks() {
        let mut empty = ShaderInput::varying(VaryingSlot::Var(1), regid(2, 0), 0xf, 4);
        empty.compmask = 0;
        let v = ShaderVariant {
            inputs: vec![
                ShaderInput::sysval(SystemValue::FragCoord, regid(0, 0)),
                ShaderInput::varying(VaryingSlot::Var(0), regid(1, 0), 0x3, 0),
                empty,
                ShaderInput::varying(VaryingSlot::Var(2), regid(3, 0), 0x1, 8),
            ],
            ..Default::default()
        };
        assert_eq!(v.varyings().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(v.find_sysval_regid(SystemValue::FragCoord), regid(0, 0));
        assert_eq!(v.find_sysval_regid(SystemValue::SampleId), INVALID_REG);
    }

    #[test]
    fn binning_vs_needs_plain_vertex_pipeline() {
        assert!(ShaderKey::default().has_binning_vs());
        let gs = ShaderKey {
            has_gs: true,
            ..Default::default()
        };
        assert!(!gs.has_binning_vs());
        let tess = ShaderKey {
            tessellation: TessPrimitiveMode::Quads,
            ..Default::default()
        };
        assert!(!tess.has_binning_vs());
    }
}
