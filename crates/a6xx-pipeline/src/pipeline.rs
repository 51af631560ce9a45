//! The built pipeline object and the device entry points that create and destroy it.

use std::sync::Arc;

use a6xx_protocol::{BufferAllocator, CmdStream, CsWriter, DrawState};
use tracing::{debug, warn};

use crate::builder::GraphicsBuilder;
use crate::compute::build_compute;
use crate::config::{DeviceInfo, PipelineConfig};
use crate::dynamic::{emit_dynamic_state, DynamicState, DynamicStateMask, DynamicStateValue, DYNAMIC_STATE_COUNT};
use crate::error::{PipelineError, Result};
use crate::shader::{ConstState, PushConstRange, ShaderCompiler};
use crate::types::{
    ComputePipelineCreateInfo, GraphicsPipelineCreateInfo, ShaderStage, ShaderStageFlags, SHADER_STAGE_COUNT,
};

/// What later command recording needs to know about one stage's constants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageLink {
    pub const_state: ConstState,
    pub constlen: u32,
    pub push_consts: PushConstRange,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TessParams {
    pub upper_left_domain_origin: bool,
    /// Per-vertex HS output stride in bytes.
    pub param_stride: u32,
    /// Constant registers the HS/DS expect the tessellation buffer addresses in.
    pub hs_bo_regid: u32,
    pub ds_bo_regid: u32,
}

/// An immutable, fully recorded pipeline.
///
/// Every state block lives in the pipeline's own command buffer. The buffer is returned to
/// the device allocator by [`Device::destroy_pipeline`] or when the pipeline is dropped.
#[derive(Debug)]
pub struct Pipeline {
    pub(crate) cs: CmdStream,

    pub(crate) active_stages: ShaderStageFlags,
    pub(crate) active_desc_sets: u32,
    pub(crate) dynamic_state_mask: DynamicStateMask,
    pub(crate) static_state: [DrawState; DYNAMIC_STATE_COUNT],

    pub(crate) program: DrawState,
    pub(crate) program_binning: DrawState,
    pub(crate) link: [StageLink; SHADER_STAGE_COUNT],
    pub(crate) shader_iova: [u64; SHADER_STAGE_COUNT],
    pub(crate) binning_vs_iova: u64,

    pub(crate) vertex_input: DrawState,
    pub(crate) vertex_input_binning: DrawState,
    pub(crate) bindings_used: u32,

    pub(crate) primtype: u32,
    pub(crate) primitive_restart: bool,
    pub(crate) tess: TessParams,

    pub(crate) rast: DrawState,
    pub(crate) gras_su_cntl: u32,
    pub(crate) depth_stencil: DrawState,
    pub(crate) blend: DrawState,
    pub(crate) blend_enable_mask: u32,
    pub(crate) load_state: DrawState,

    pub(crate) local_size: [u32; 3],
}

impl Pipeline {
    pub(crate) fn new(cs: CmdStream) -> Self {
        Self {
            cs,
            active_stages: ShaderStageFlags::empty(),
            active_desc_sets: 0,
            dynamic_state_mask: DynamicStateMask::empty(),
            static_state: [DrawState::default(); DYNAMIC_STATE_COUNT],
            program: DrawState::default(),
            program_binning: DrawState::default(),
            link: Default::default(),
            shader_iova: [0; SHADER_STAGE_COUNT],
            binning_vs_iova: 0,
            vertex_input: DrawState::default(),
            vertex_input_binning: DrawState::default(),
            bindings_used: 0,
            primtype: 0,
            primitive_restart: false,
            tess: TessParams::default(),
            rast: DrawState::default(),
            gras_su_cntl: 0,
            depth_stencil: DrawState::default(),
            blend: DrawState::default(),
            blend_enable_mask: 0,
            load_state: DrawState::default(),
            local_size: [0; 3],
        }
    }

    /// Records a baked state block for `state` unless the pipeline leaves it dynamic.
    pub(crate) fn static_state_writer(&mut self, state: DynamicState, size: u32) -> Option<CsWriter> {
        if self.dynamic_state_mask.is_dynamic(state) {
            return None;
        }
        Some(self.cs.draw_state(size as usize))
    }

    pub(crate) fn end_static_state(&mut self, state: DynamicState, w: CsWriter) {
        self.static_state[state.index()] = self.cs.end_sub_stream(w);
    }

    pub fn program(&self) -> DrawState {
        self.program
    }

    pub fn program_binning(&self) -> DrawState {
        self.program_binning
    }

    pub fn vertex_input(&self) -> DrawState {
        self.vertex_input
    }

    pub fn vertex_input_binning(&self) -> DrawState {
        self.vertex_input_binning
    }

    pub fn rast(&self) -> DrawState {
        self.rast
    }

    pub fn depth_stencil(&self) -> DrawState {
        self.depth_stencil
    }

    pub fn blend(&self) -> DrawState {
        self.blend
    }

    pub fn load_state(&self) -> DrawState {
        self.load_state
    }

    /// The baked block for `state`. Empty when the state is dynamic or was never recorded
    /// (rasterizer discard skips viewport, scissor and blend related state).
    pub fn static_state(&self, state: DynamicState) -> DrawState {
        self.static_state[state.index()]
    }

    pub fn words(&self, ds: DrawState) -> &[u32] {
        self.cs.words_of(ds)
    }

    /// The whole command buffer as recorded, shader binaries included.
    pub fn command_words(&self) -> &[u32] {
        self.cs.as_words()
    }

    pub fn active_stages(&self) -> ShaderStageFlags {
        self.active_stages
    }

    pub fn active_desc_sets(&self) -> u32 {
        self.active_desc_sets
    }

    pub fn dynamic_state_mask(&self) -> DynamicStateMask {
        self.dynamic_state_mask
    }

    /// `DI_PT_*` primitive type, with the patch control points folded in for patch lists.
    pub fn primtype(&self) -> u32 {
        self.primtype
    }

    pub fn primitive_restart(&self) -> bool {
        self.primitive_restart
    }

    pub fn tess(&self) -> &TessParams {
        &self.tess
    }

    pub fn link(&self, stage: ShaderStage) -> &StageLink {
        &self.link[stage.index()]
    }

    pub fn bindings_used(&self) -> u32 {
        self.bindings_used
    }

    /// Device address of the uploaded binary for `stage`, 0 when the stage has none.
    pub fn shader_iova(&self, stage: ShaderStage) -> u64 {
        self.shader_iova[stage.index()]
    }

    pub fn binning_vs_iova(&self) -> u64 {
        self.binning_vs_iova
    }

    /// `GRAS_SU_CNTL` with the baked line width, or without one when line width is dynamic.
    pub fn gras_su_cntl(&self) -> u32 {
        self.gras_su_cntl
    }

    pub fn blend_enable_mask(&self) -> u32 {
        self.blend_enable_mask
    }

    pub fn local_size(&self) -> [u32; 3] {
        self.local_size
    }

    /// Records `value` for a state this pipeline declared dynamic.
    pub fn emit_dynamic_state(&self, cs: &mut CsWriter, value: &DynamicStateValue) -> Result<()> {
        let state = value.state();
        if !self.dynamic_state_mask.is_dynamic(state) {
            return Err(PipelineError::invalid(format!("{state:?} is baked into the pipeline")));
        }
        emit_dynamic_state(cs, value, self.gras_su_cntl);
        Ok(())
    }
}

/// Outcome of a batch creation call.
///
/// Every entry is attempted. `pipelines[i]` is `None` exactly when entry `i` failed, and
/// `result` carries the first failure. Created pipelines free their buffers when dropped, so
/// unwanted entries can simply be discarded.
#[derive(Debug)]
pub struct BatchResult {
    pub pipelines: Vec<Option<Pipeline>>,
    pub result: Result<()>,
}

fn collect_batch(results: impl Iterator<Item = Result<Pipeline>>) -> BatchResult {
    let mut result = Ok(());
    let pipelines = results
        .enumerate()
        .map(|(index, r)| match r {
            Ok(p) => Some(p),
            Err(err) => {
                warn!(index, error = %err, "pipeline creation failed");
                if result.is_ok() {
                    result = Err(err);
                }
                None
            }
        })
        .collect();
    BatchResult { pipelines, result }
}

/// Pipeline factory for one GPU.
#[derive(Clone, Debug)]
pub struct Device {
    info: DeviceInfo,
    config: PipelineConfig,
    compiler: Arc<dyn ShaderCompiler>,
    allocator: Arc<dyn BufferAllocator>,
}

impl Device {
    pub fn new(
        info: DeviceInfo,
        config: PipelineConfig,
        compiler: Arc<dyn ShaderCompiler>,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            info,
            config,
            compiler,
            allocator,
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub(crate) fn compiler(&self) -> &dyn ShaderCompiler {
        self.compiler.as_ref()
    }

    pub(crate) fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    pub fn create_graphics_pipeline(&self, create_info: &GraphicsPipelineCreateInfo) -> Result<Pipeline> {
        GraphicsBuilder::new(self, create_info)?.build()
    }

    pub fn create_graphics_pipelines(&self, create_infos: &[GraphicsPipelineCreateInfo]) -> BatchResult {
        debug!(count = create_infos.len(), "creating graphics pipelines");
        collect_batch(create_infos.iter().map(|ci| self.create_graphics_pipeline(ci)))
    }

    pub fn create_compute_pipeline(&self, create_info: &ComputePipelineCreateInfo) -> Result<Pipeline> {
        build_compute(self, create_info)
    }

    pub fn create_compute_pipelines(&self, create_infos: &[ComputePipelineCreateInfo]) -> BatchResult {
        debug!(count = create_infos.len(), "creating compute pipelines");
        collect_batch(create_infos.iter().map(|ci| self.create_compute_pipeline(ci)))
    }

    /// Returns the pipeline's command buffer to the allocator. Dropping the pipeline does the
    /// same; this only adds the log line.
    pub fn destroy_pipeline(&self, mut pipeline: Pipeline) {
        debug!(iova = pipeline.cs.bo().map(|bo| bo.iova), "destroying pipeline");
        pipeline.cs.release();
    }
}
