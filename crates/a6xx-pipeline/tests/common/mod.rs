//! Shared helpers for `a6xx-pipeline` integration tests.
//!
//! [`MockCompiler`] serves canned variants per shader module and records every variant
//! request, so tests can check which keys the builder asked for.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use a6xx_pipeline::layout::{DescriptorSetLayout, DescriptorSetLayoutBinding, DescriptorType, PipelineLayout};
use a6xx_pipeline::shader::{
    ConstOffsets, ConstState, InputSlot, Shader, ShaderCompiler, ShaderInput, ShaderKey, ShaderOutput, ShaderVariant,
    SystemValue, TessInfo, TessPrimitiveMode, TessSpacing, VaryingSlot, FragResult,
};
use a6xx_pipeline::{
    ColorBlendAttachmentState, ColorBlendState, Device, DeviceInfo, Format, GraphicsPipelineCreateInfo,
    LinearAllocator, PipelineConfig, PipelineError, Rect2D, ShaderModuleId, ShaderStage, ShaderStageDesc,
    ShaderStageFlags, SubpassInfo, VertexInputAttribute, VertexInputBinding, VertexInputState, Viewport, ViewportState,
    Extent2D,
};
use a6xx_protocol::regs::regid;

pub const VS: ShaderModuleId = ShaderModuleId(1);
pub const FS: ShaderModuleId = ShaderModuleId(2);
pub const GS: ShaderModuleId = ShaderModuleId(3);
pub const HS: ShaderModuleId = ShaderModuleId(4);
pub const DS: ShaderModuleId = ShaderModuleId(5);
pub const CS: ShaderModuleId = ShaderModuleId(6);

/// Constant length every variant shrinks to when compiled with `safe_constlen`.
pub const SAFE_CONSTLEN: u32 = 128;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A canned shader module: its source-level facts and the variants it compiles to.
#[derive(Clone, Debug)]
pub struct Module {
    pub shader: Shader,
    pub variant: ShaderVariant,
    /// Served for binning-pass requests; the regular variant otherwise.
    pub binning: Option<ShaderVariant>,
}

impl Module {
    pub fn new(variant: ShaderVariant) -> Self {
        let shader = Shader {
            stage: variant.stage,
            info: variant.info,
            stream_output: variant.stream_output.clone(),
            ..Default::default()
        };
        Self {
            shader,
            variant,
            binning: None,
        }
    }

    pub fn with_desc_sets(mut self, sets: u32) -> Self {
        self.shader.active_desc_sets = sets;
        self
    }

    pub fn with_binning(mut self, binning: ShaderVariant) -> Self {
        self.binning = Some(binning);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompileCall {
    pub stage: ShaderStage,
    pub key: ShaderKey,
    pub binning_pass: bool,
}

#[derive(Debug, Default)]
struct State {
    created: Vec<(Arc<Shader>, Option<ShaderModuleId>)>,
    cache: Vec<(Option<ShaderModuleId>, ShaderKey, bool)>,
    calls: Vec<CompileCall>,
}

#[derive(Debug, Default)]
pub struct MockCompiler {
    modules: HashMap<ShaderModuleId, Module>,
    state: Mutex<State>,
}

impl MockCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, id: ShaderModuleId, module: Module) -> Self {
        self.modules.insert(id, module);
        self
    }

    /// The modules every basic graphics and compute test uses.
    pub fn standard() -> Self {
        Self::new()
            .with_module(VS, Module::new(vertex_variant()).with_binning(binning_vertex_variant()))
            .with_module(FS, Module::new(fragment_variant()))
            .with_module(GS, Module::new(geometry_variant()))
            .with_module(HS, Module::new(tess_ctrl_variant(TessSpacing::Unspecified)))
            .with_module(DS, Module::new(tess_eval_variant(TessSpacing::Equal)))
            .with_module(CS, Module::new(compute_variant()))
    }

    pub fn calls(&self) -> Vec<CompileCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn binning_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.binning_pass).count()
    }

    fn module_of(&self, shader: &Shader) -> Option<Option<ShaderModuleId>> {
        let state = self.state.lock().unwrap();
        state
            .created
            .iter()
            .find(|(s, _)| std::ptr::eq(s.as_ref(), shader))
            .map(|(_, id)| *id)
    }
}

impl ShaderCompiler for MockCompiler {
    fn create_shader(
        &self,
        stage: ShaderStage,
        desc: Option<&ShaderStageDesc>,
        _layout: &PipelineLayout,
    ) -> a6xx_pipeline::Result<Arc<Shader>> {
        let (shader, id) = match desc {
            None => (
                Shader {
                    stage,
                    ..Default::default()
                },
                None,
            ),
            Some(desc) => {
                let module = self.modules.get(&desc.module).ok_or_else(|| {
                    PipelineError::InvalidDescription(format!("unknown shader module {:?}", desc.module))
                })?;
                (module.shader.clone(), Some(desc.module))
            }
        };
        let shader = Arc::new(shader);
        self.state.lock().unwrap().created.push((shader.clone(), id));
        Ok(shader)
    }

    fn get_or_compile(
        &self,
        shader: &Shader,
        key: &ShaderKey,
        binning_pass: bool,
    ) -> a6xx_pipeline::Result<(Arc<ShaderVariant>, bool)> {
        let id = self.module_of(shader).ok_or(PipelineError::OutOfHostMemory)?;

        let mut variant = match id {
            None => ShaderVariant {
                stage: shader.stage,
                ..Default::default()
            },
            Some(id) => {
                let module = &self.modules[&id];
                match (&module.binning, binning_pass) {
                    (Some(binning), true) => binning.clone(),
                    _ => module.variant.clone(),
                }
            }
        };
        variant.key = key.clone();
        variant.binning_pass = binning_pass;
        if key.safe_constlen {
            variant.constlen = variant.constlen.min(SAFE_CONSTLEN);
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(CompileCall {
            stage: shader.stage,
            key: key.clone(),
            binning_pass,
        });
        let entry = (id, key.clone(), binning_pass);
        let created = !state.cache.contains(&entry);
        if created {
            state.cache.push(entry);
        }
        Ok((Arc::new(variant), created))
    }
}

/// Instruction words of a fake binary; `sizedwords` always matches.
fn binary(stage: ShaderStage, dwords: u32) -> Vec<u32> {
    (0..dwords).map(|i| 0x5000_0000 | ((stage as u32) << 16) | i).collect()
}

fn sized(mut v: ShaderVariant, dwords: u32) -> ShaderVariant {
    v.binary = binary(v.stage, dwords);
    v.sizedwords = dwords;
    v.instrlen = dwords.div_ceil(32);
    v
}

/// Writes position and one vec4 varying, reads attribute 0 and the vertex id.
pub fn vertex_variant() -> ShaderVariant {
    sized(
        ShaderVariant {
            stage: ShaderStage::Vertex,
            inputs: vec![
                ShaderInput::new(InputSlot::Attrib(0), regid(2, 0), 0xf),
                ShaderInput::sysval(SystemValue::VertexId, regid(5, 0)),
            ],
            outputs: vec![
                ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 0),
                ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 4),
            ],
            output_size: 8,
            max_reg: 5,
            constlen: 16,
            const_state: ConstState {
                offsets: ConstOffsets {
                    immediate: 4,
                    primitive_map: 8,
                    primitive_param: 12,
                },
                immediates: vec![0x3f80_0000, 0, 0, 0x3f80_0000],
            },
            ..Default::default()
        },
        40,
    )
}

/// Position-only variant for the binning pass.
pub fn binning_vertex_variant() -> ShaderVariant {
    let v = vertex_variant();
    sized(
        ShaderVariant {
            outputs: vec![ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 0)],
            ..v
        },
        8,
    )
}

pub fn fragment_variant() -> ShaderVariant {
    sized(
        ShaderVariant {
            stage: ShaderStage::Fragment,
            inputs: vec![
                ShaderInput::sysval(SystemValue::BaryPerspPixel, regid(0, 0)),
                ShaderInput::varying(VaryingSlot::Var(0), regid(2, 0), 0xf, 0),
            ],
            outputs: vec![ShaderOutput::frag(FragResult::Data(0), regid(3, 0))],
            total_in: 4,
            max_reg: 3,
            constlen: 8,
            ..Default::default()
        },
        16,
    )
}

pub fn geometry_variant() -> ShaderVariant {
    let mut v = ShaderVariant {
        stage: ShaderStage::Geometry,
        inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(1, 0), 0xf, 0)],
        outputs: vec![
            ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 0),
            ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 4),
        ],
        output_size: 8,
        max_reg: 4,
        constlen: 24,
        const_state: ConstState {
            offsets: ConstOffsets {
                immediate: 0,
                primitive_map: 8,
                primitive_param: 16,
            },
            immediates: Vec::new(),
        },
        ..Default::default()
    };
    v.info.gs.vertices_out = 6;
    sized(v, 64)
}

pub fn tess_ctrl_variant(spacing: TessSpacing) -> ShaderVariant {
    let mut v = ShaderVariant {
        stage: ShaderStage::TessCtrl,
        inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(1, 0), 0xf, 0)],
        outputs: vec![ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 0)],
        output_size: 4,
        max_reg: 2,
        constlen: 20,
        const_state: ConstState {
            offsets: ConstOffsets {
                immediate: 0,
                primitive_map: 8,
                primitive_param: 4,
            },
            immediates: Vec::new(),
        },
        ..Default::default()
    };
    v.info.tess = TessInfo {
        primitive_mode: TessPrimitiveMode::Triangles,
        spacing,
        point_mode: false,
        ccw: false,
        tcs_vertices_out: 3,
    };
    sized(v, 48)
}

pub fn tess_eval_variant(spacing: TessSpacing) -> ShaderVariant {
    let mut v = ShaderVariant {
        stage: ShaderStage::TessEval,
        inputs: vec![ShaderInput::varying(VaryingSlot::Var(0), regid(1, 0), 0xf, 0)],
        outputs: vec![
            ShaderOutput::varying(VaryingSlot::Var(0), regid(1, 0), 0),
            ShaderOutput::varying(VaryingSlot::Pos, regid(0, 0), 4),
        ],
        output_size: 8,
        max_reg: 3,
        constlen: 20,
        const_state: ConstState {
            offsets: ConstOffsets {
                immediate: 0,
                primitive_map: 4,
                primitive_param: 8,
            },
            immediates: Vec::new(),
        },
        ..Default::default()
    };
    v.info.tess = TessInfo {
        primitive_mode: TessPrimitiveMode::Triangles,
        spacing,
        point_mode: false,
        ccw: true,
        tcs_vertices_out: 0,
    };
    sized(v, 40)
}

pub fn compute_variant() -> ShaderVariant {
    let mut v = ShaderVariant {
        stage: ShaderStage::Compute,
        inputs: vec![
            ShaderInput::sysval(SystemValue::LocalInvocationId, regid(0, 0)),
            ShaderInput::sysval(SystemValue::WorkGroupId, regid(1, 0)),
        ],
        max_reg: 3,
        constlen: 32,
        ..Default::default()
    };
    v.info.cs_local_size = [8, 4, 1];
    sized(v, 96)
}

pub fn device_with(compiler: Arc<MockCompiler>, allocator: Arc<LinearAllocator>) -> Device {
    init_tracing();
    Device::new(DeviceInfo::a630(), PipelineConfig::default(), compiler, allocator)
}

pub fn device() -> (Device, Arc<MockCompiler>, Arc<LinearAllocator>) {
    let compiler = Arc::new(MockCompiler::standard());
    let allocator = Arc::new(LinearAllocator::new());
    (device_with(compiler.clone(), allocator.clone()), compiler, allocator)
}

pub fn stages(modules: &[(ShaderStage, ShaderModuleId)]) -> Vec<ShaderStageDesc> {
    modules.iter().map(|&(stage, id)| ShaderStageDesc::new(stage, id)).collect()
}

pub fn uniform_buffer_set(stages: ShaderStageFlags) -> Arc<DescriptorSetLayout> {
    Arc::new(DescriptorSetLayout::new(vec![DescriptorSetLayoutBinding {
        binding: 0,
        descriptor_type: DescriptorType::UniformBuffer,
        descriptor_count: 1,
        stages,
    }]))
}

pub fn viewport_state() -> ViewportState {
    ViewportState {
        viewports: vec![Viewport {
            x: 0.0,
            y: 0.0,
            width: 256.0,
            height: 128.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }],
        scissors: vec![Rect2D {
            extent: Extent2D {
                width: 256,
                height: 128,
            },
            ..Default::default()
        }],
    }
}

/// Vertex and fragment stage rendering into one RGBA8 attachment, fed by one vec4 attribute.
pub fn basic_create_info() -> GraphicsPipelineCreateInfo {
    GraphicsPipelineCreateInfo {
        stages: stages(&[(ShaderStage::Vertex, VS), (ShaderStage::Fragment, FS)]),
        vertex_input: VertexInputState {
            bindings: vec![VertexInputBinding {
                binding: 0,
                stride: 16,
                ..Default::default()
            }],
            attributes: vec![VertexInputAttribute {
                location: 0,
                binding: 0,
                format: Format::R32G32B32A32Float,
                offset: 0,
            }],
            divisors: Vec::new(),
        },
        viewport: Some(viewport_state()),
        color_blend: Some(ColorBlendState {
            attachments: vec![ColorBlendAttachmentState::default()],
            ..Default::default()
        }),
        layout: Arc::new(PipelineLayout::default()),
        subpass: SubpassInfo {
            color_formats: vec![Some(Format::R8G8B8A8Unorm)],
            depth_stencil_format: None,
        },
        ..Default::default()
    }
}
