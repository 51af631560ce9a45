//! Declarative pipeline description accepted by [`crate::Device`].
//!
//! The enums follow the portable (Vulkan) value space; translation into the compact hardware
//! encodings lives next to the emitters in [`crate::state`].

use std::sync::Arc;

use a6xx_protocol::pm4::{CpOpcode, StateBlock};
use bitflags::bitflags;

use crate::dynamic::DynamicState;
use crate::format::Format;
use crate::layout::PipelineLayout;

#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    #[default]
    Vertex = 0,
    TessCtrl = 1,
    TessEval = 2,
    Geometry = 3,
    Fragment = 4,
    Compute = 5,
}

pub const SHADER_STAGE_COUNT: usize = 6;

impl ShaderStage {
    pub const ALL: [ShaderStage; SHADER_STAGE_COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::TessCtrl,
        ShaderStage::TessEval,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn flag(self) -> ShaderStageFlags {
        ShaderStageFlags::from_bits_truncate(1 << self as u32)
    }

    /// `CP_LOAD_STATE6` flavour that feeds this stage.
    pub const fn load_state_opcode(self) -> CpOpcode {
        match self {
            ShaderStage::Vertex | ShaderStage::TessCtrl | ShaderStage::TessEval | ShaderStage::Geometry => {
                CpOpcode::LoadState6Geom
            }
            ShaderStage::Fragment | ShaderStage::Compute => CpOpcode::LoadState6Frag,
        }
    }

    pub const fn tex_state_block(self) -> StateBlock {
        match self {
            ShaderStage::Vertex => StateBlock::VsTex,
            ShaderStage::TessCtrl => StateBlock::HsTex,
            ShaderStage::TessEval => StateBlock::DsTex,
            ShaderStage::Geometry => StateBlock::GsTex,
            ShaderStage::Fragment => StateBlock::FsTex,
            ShaderStage::Compute => StateBlock::CsTex,
        }
    }

    pub const fn shader_state_block(self) -> StateBlock {
        match self {
            ShaderStage::Vertex => StateBlock::VsShader,
            ShaderStage::TessCtrl => StateBlock::HsShader,
            ShaderStage::TessEval => StateBlock::DsShader,
            ShaderStage::Geometry => StateBlock::GsShader,
            ShaderStage::Fragment => StateBlock::FsShader,
            ShaderStage::Compute => StateBlock::CsShader,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const TESS_CTRL = 1 << 1;
        const TESS_EVAL = 1 << 2;
        const GEOMETRY = 1 << 3;
        const FRAGMENT = 1 << 4;
        const COMPUTE = 1 << 5;
        const ALL_GRAPHICS = 0x1f;
        /// Also covers stage bits this hardware does not have.
        const ALL = 0x7fff_ffff;
    }
}

impl ShaderStageFlags {
    /// Stages present in the mask, in pipeline order.
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        ShaderStage::ALL.into_iter().filter(move |s| self.contains(s.flag()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShaderModuleId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderStageDesc {
    pub stage: ShaderStage,
    pub module: ShaderModuleId,
    pub entry_point: String,
}

impl ShaderStageDesc {
    pub fn new(stage: ShaderStage, module: ShaderModuleId) -> Self {
        Self {
            stage,
            module,
            entry_point: "main".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompareOp {
    #[default]
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
    Src1Color,
    OneMinusSrc1Color,
    Src1Alpha,
    OneMinusSrc1Alpha,
}

impl BlendFactor {
    pub fn is_dual_src(self) -> bool {
        matches!(
            self,
            BlendFactor::Src1Color
                | BlendFactor::OneMinusSrc1Color
                | BlendFactor::Src1Alpha
                | BlendFactor::OneMinusSrc1Alpha
        )
    }

    /// Reading destination alpha from a format without alpha yields 1.0.
    pub fn without_dst_alpha(self) -> Self {
        match self {
            BlendFactor::DstAlpha => BlendFactor::One,
            BlendFactor::OneMinusDstAlpha => BlendFactor::Zero,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogicOp {
    Clear,
    And,
    AndReverse,
    #[default]
    Copy,
    AndInverted,
    NoOp,
    Xor,
    Or,
    Nor,
    Equivalent,
    Invert,
    OrReverse,
    CopyInverted,
    OrInverted,
    Nand,
    Set,
}

impl LogicOp {
    pub fn reads_dst(self) -> bool {
        !matches!(self, LogicOp::Clear | LogicOp::Copy | LogicOp::CopyInverted | LogicOp::Set)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CullMode: u32 {
        const FRONT = 1 << 0;
        const BACK = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
    LineListWithAdjacency,
    LineStripWithAdjacency,
    TriangleListWithAdjacency,
    TriangleStripWithAdjacency,
    PatchList,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexInputRate {
    #[default]
    Vertex,
    Instance,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ColorComponentFlags: u32 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TessDomainOrigin {
    #[default]
    UpperLeft,
    LowerLeft,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset2D {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect2D {
    pub offset: Offset2D,
    pub extent: Extent2D,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewportState {
    pub viewports: Vec<Viewport>,
    pub scissors: Vec<Rect2D>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexInputBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexInputAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: Format,
    pub offset: u32,
}

/// Per-instance step rate for an instanced binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexBindingDivisor {
    pub binding: u32,
    pub divisor: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexInputState {
    pub bindings: Vec<VertexInputBinding>,
    pub attributes: Vec<VertexInputAttribute>,
    pub divisors: Vec<VertexBindingDivisor>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputAssemblyState {
    pub topology: PrimitiveTopology,
    pub primitive_restart_enable: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TessellationState {
    pub patch_control_points: u32,
    /// `None` keeps the default upper-left origin.
    pub domain_origin: Option<TessDomainOrigin>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizationState {
    pub depth_clamp_enable: bool,
    pub rasterizer_discard_enable: bool,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias_enable: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_factor: f32,
    pub line_width: f32,
    /// Explicit depth clip control; overrides the clamp-derived default when set.
    pub depth_clip_enable: Option<bool>,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            depth_clamp_enable: false,
            rasterizer_discard_enable: false,
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::empty(),
            front_face: FrontFace::CounterClockwise,
            depth_bias_enable: false,
            depth_bias_constant_factor: 0.0,
            depth_bias_clamp: 0.0,
            depth_bias_slope_factor: 0.0,
            line_width: 1.0,
            depth_clip_enable: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleLocation {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleLocationsInfo {
    pub per_pixel: u32,
    pub grid_size: Extent2D,
    pub locations: Vec<SampleLocation>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleLocationsState {
    pub enable: bool,
    pub info: SampleLocationsInfo,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultisampleState {
    pub rasterization_samples: u32,
    pub sample_shading_enable: bool,
    pub min_sample_shading: f32,
    pub sample_mask: Option<u32>,
    pub alpha_to_coverage_enable: bool,
    pub alpha_to_one_enable: bool,
    pub sample_locations: Option<SampleLocationsState>,
}

impl MultisampleState {
    /// Custom sample locations, if enabled.
    pub fn enabled_sample_locations(&self) -> Option<&SampleLocationsInfo> {
        self.sample_locations.as_ref().filter(|s| s.enable).map(|s| &s.info)
    }
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            rasterization_samples: 1,
            sample_shading_enable: false,
            min_sample_shading: 0.0,
            sample_mask: None,
            alpha_to_coverage_enable: false,
            alpha_to_one_enable: false,
            sample_locations: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StencilOpState {
    pub fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub compare_op: CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub depth_bounds_test_enable: bool,
    pub stencil_test_enable: bool,
    pub front: StencilOpState,
    pub back: StencilOpState,
    pub min_depth_bounds: f32,
    pub max_depth_bounds: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorBlendAttachmentState {
    pub blend_enable: bool,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorComponentFlags,
}

impl ColorBlendAttachmentState {
    pub fn is_dual_src(&self) -> bool {
        self.src_color_blend_factor.is_dual_src()
            || self.dst_color_blend_factor.is_dual_src()
            || self.src_alpha_blend_factor.is_dual_src()
            || self.dst_alpha_blend_factor.is_dual_src()
    }
}

impl Default for ColorBlendAttachmentState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorComponentFlags::all(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorBlendState {
    pub logic_op_enable: bool,
    pub logic_op: LogicOp,
    pub attachments: Vec<ColorBlendAttachmentState>,
    pub blend_constants: [f32; 4],
}

impl ColorBlendState {
    pub fn is_dual_src(&self) -> bool {
        self.attachments.iter().any(ColorBlendAttachmentState::is_dual_src)
    }
}

/// Attachment formats of the subpass the pipeline renders into.
///
/// `None` entries are unused color attachments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubpassInfo {
    pub color_formats: Vec<Option<Format>>,
    pub depth_stencil_format: Option<Format>,
}

#[derive(Clone, Debug, Default)]
pub struct GraphicsPipelineCreateInfo {
    pub stages: Vec<ShaderStageDesc>,
    pub vertex_input: VertexInputState,
    pub input_assembly: InputAssemblyState,
    pub tessellation: Option<TessellationState>,
    pub viewport: Option<ViewportState>,
    pub rasterization: RasterizationState,
    /// Missing state behaves as single-sampled defaults.
    pub multisample: Option<MultisampleState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub color_blend: Option<ColorBlendState>,
    pub dynamic_states: Vec<DynamicState>,
    pub layout: Arc<PipelineLayout>,
    pub subpass: SubpassInfo,
}

impl GraphicsPipelineCreateInfo {
    pub fn stage(&self, stage: ShaderStage) -> Option<&ShaderStageDesc> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.stage(stage).is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ComputePipelineCreateInfo {
    pub stage: ShaderStageDesc,
    pub layout: Arc<PipelineLayout>,
}
