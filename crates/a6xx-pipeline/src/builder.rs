//! Graphics pipeline construction.
//!
//! [`GraphicsBuilder`] runs a fixed sequence of phases. [`GraphicsBuilder::new`] validates
//! the description and derives the attachment flags, [`GraphicsBuilder::build`] selects the
//! shader variants, reserves the command buffer once, uploads the binaries and records
//! every state block into it. Nothing after the reservation can fail.

use std::sync::Arc;

use a6xx_protocol::regs::GrasSuCntl;
use a6xx_protocol::CmdStream;
use tracing::{debug, trace};

use crate::config::{MAX_RTS, MAX_VBS, MAX_VERTEX_ATTRIBS};
use crate::constlen::trim_constlen;
use crate::dynamic::{DynamicState, DynamicStateMask};
use crate::error::{PipelineError, Result};
use crate::format::Format;
use crate::load_state::{build_load_state, load_state_size};
use crate::pipeline::{Device, Pipeline, StageLink};
use crate::program::{emit_program, ProgramContext};
use crate::shader::{Shader, ShaderKey, ShaderVariant, TessPrimitiveMode, TessSpacing};
use crate::state::depth_stencil::{self, EffectiveDepthStencil};
use crate::state::{blend, multisample, primtype, raster, vertex_input, viewport};
use crate::types::{
    ColorBlendState, GraphicsPipelineCreateInfo, MultisampleState, PrimitiveTopology, ShaderStage, ShaderStageFlags,
    TessDomainOrigin, SHADER_STAGE_COUNT,
};
use crate::vpc::tess_info;
use crate::xs_config::SHADER_ALIGN_BYTES;

const SHADER_ALIGN_DWORDS: u32 = (SHADER_ALIGN_BYTES / 4) as u32;
const MAX_PATCH_CONTROL_POINTS: u32 = 32;

const GRAPHICS_STAGES: [ShaderStage; 5] = [
    ShaderStage::Vertex,
    ShaderStage::TessCtrl,
    ShaderStage::TessEval,
    ShaderStage::Geometry,
    ShaderStage::Fragment,
];

/// Space a variant takes in the command buffer once padded to the fetch alignment.
pub(crate) fn upload_dwords(v: &ShaderVariant) -> u32 {
    v.sizedwords.next_multiple_of(SHADER_ALIGN_DWORDS)
}

/// Copies the binary of `v` into `cs` at the next fetch-aligned offset.
pub(crate) fn upload_variant(cs: &mut CmdStream, v: &ShaderVariant) -> u64 {
    assert_eq!(
        v.binary.len(),
        v.sizedwords as usize,
        "{:?} variant binary does not match its size",
        v.stage
    );
    cs.align(SHADER_ALIGN_DWORDS as usize);
    cs.upload(&v.binary)
}

/// Rejects descriptions the state emitters cannot encode.
fn validate(ci: &GraphicsPipelineCreateInfo, dynamic: DynamicStateMask) -> Result<()> {
    let mut seen = ShaderStageFlags::empty();
    for desc in &ci.stages {
        if desc.stage == ShaderStage::Compute {
            return Err(PipelineError::invalid("compute stage in a graphics pipeline"));
        }
        if seen.contains(desc.stage.flag()) {
            return Err(PipelineError::invalid(format!("{:?} stage listed twice", desc.stage)));
        }
        seen |= desc.stage.flag();
    }
    if !seen.contains(ShaderStageFlags::VERTEX) {
        return Err(PipelineError::invalid("graphics pipeline without a vertex stage"));
    }

    let has_hs = seen.contains(ShaderStageFlags::TESS_CTRL);
    let has_ds = seen.contains(ShaderStageFlags::TESS_EVAL);
    if has_hs != has_ds {
        return Err(PipelineError::invalid("tessellation needs both control and evaluation stages"));
    }
    match (&ci.tessellation, has_hs) {
        (Some(ts), true) => {
            if !(1..=MAX_PATCH_CONTROL_POINTS).contains(&ts.patch_control_points) {
                return Err(PipelineError::invalid(format!(
                    "{} patch control points outside 1..={MAX_PATCH_CONTROL_POINTS}",
                    ts.patch_control_points
                )));
            }
        }
        (None, false) => {}
        (Some(_), false) => return Err(PipelineError::invalid("tessellation state without tessellation stages")),
        (None, true) => return Err(PipelineError::invalid("tessellation stages without tessellation state")),
    }
    if (ci.input_assembly.topology == PrimitiveTopology::PatchList) != has_hs {
        return Err(PipelineError::invalid("patch lists are drawn exactly when tessellating"));
    }

    let vi = &ci.vertex_input;
    if vi.attributes.len() > MAX_VERTEX_ATTRIBS as usize {
        return Err(PipelineError::invalid(format!("{} vertex attributes", vi.attributes.len())));
    }
    let mut declared = 0u32;
    for binding in &vi.bindings {
        if binding.binding >= MAX_VBS {
            return Err(PipelineError::invalid(format!("vertex binding {} out of range", binding.binding)));
        }
        declared |= 1 << binding.binding;
    }
    for attr in &vi.attributes {
        if attr.binding >= MAX_VBS || declared & (1 << attr.binding) == 0 {
            return Err(PipelineError::invalid(format!(
                "attribute {} reads undeclared binding {}",
                attr.location, attr.binding
            )));
        }
        if attr.format.vertex_format().is_none() {
            return Err(PipelineError::invalid(format!(
                "{:?} is not a vertex format",
                attr.format
            )));
        }
    }
    if let Some(div) = vi.divisors.iter().find(|d| d.binding >= MAX_VBS) {
        return Err(PipelineError::invalid(format!("divisor for binding {} out of range", div.binding)));
    }

    if ci.rasterization.rasterizer_discard_enable {
        return Ok(());
    }

    let samples = ci.multisample.as_ref().map_or(1, |ms| ms.rasterization_samples);
    if !matches!(samples, 1 | 2 | 4 | 8 | 16) {
        return Err(PipelineError::invalid(format!("unsupported sample count {samples}")));
    }

    let vp = ci.viewport.as_ref();
    if !dynamic.is_dynamic(DynamicState::Viewport) && vp.map_or(true, |vp| vp.viewports.is_empty()) {
        return Err(PipelineError::invalid("static viewport state without a viewport"));
    }
    if !dynamic.is_dynamic(DynamicState::Scissor) && vp.map_or(true, |vp| vp.scissors.is_empty()) {
        return Err(PipelineError::invalid("static scissor state without a scissor"));
    }

    let color_count = ci.subpass.color_formats.len();
    let dual_src = ci.color_blend.as_ref().is_some_and(ColorBlendState::is_dual_src);
    if color_count + usize::from(dual_src) > MAX_RTS {
        return Err(PipelineError::invalid(format!("{color_count} color attachments")));
    }
    if ci.subpass.color_formats.iter().any(Option::is_some) {
        match &ci.color_blend {
            Some(blend) if blend.attachments.len() == color_count => {}
            Some(blend) => {
                return Err(PipelineError::invalid(format!(
                    "{} blend attachments for {color_count} color attachments",
                    blend.attachments.len()
                )))
            }
            None => return Err(PipelineError::invalid("color attachments without blend state")),
        }
    }
    Ok(())
}

/// Transient state of one graphics pipeline build.
pub(crate) struct GraphicsBuilder<'a> {
    device: &'a Device,
    create_info: &'a GraphicsPipelineCreateInfo,
    dynamic_state_mask: DynamicStateMask,

    rasterizer_discard: bool,
    samples: u32,
    depth_attachment_format: Option<Format>,
    color_attachment_count: u32,
    use_color_attachments: bool,
    use_dual_src_blend: bool,
    render_components: u32,
    msaa: MultisampleState,

    shaders: [Option<Arc<Shader>>; SHADER_STAGE_COUNT],
    variants: [Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT],
    binning_variant: Option<Arc<ShaderVariant>>,
    shader_iova: [u64; SHADER_STAGE_COUNT],
    binning_vs_iova: u64,
    active_desc_sets: u32,
}

impl<'a> GraphicsBuilder<'a> {
    pub(crate) fn new(device: &'a Device, create_info: &'a GraphicsPipelineCreateInfo) -> Result<Self> {
        let dynamic_state_mask = DynamicStateMask::from_states(&create_info.dynamic_states);
        validate(create_info, dynamic_state_mask)?;

        let mut builder = Self {
            device,
            create_info,
            dynamic_state_mask,
            rasterizer_discard: create_info.rasterization.rasterizer_discard_enable,
            samples: 1,
            depth_attachment_format: None,
            color_attachment_count: 0,
            use_color_attachments: false,
            use_dual_src_blend: false,
            render_components: 0,
            msaa: create_info.multisample.clone().unwrap_or_default(),
            shaders: Default::default(),
            variants: Default::default(),
            binning_variant: None,
            shader_iova: [0; SHADER_STAGE_COUNT],
            binning_vs_iova: 0,
            active_desc_sets: 0,
        };

        if builder.rasterizer_discard {
            return Ok(builder);
        }

        builder.samples = builder.msaa.rasterization_samples;
        let subpass = &create_info.subpass;
        builder.depth_attachment_format = subpass.depth_stencil_format;
        builder.color_attachment_count = subpass.color_formats.len() as u32;
        for (i, format) in subpass.color_formats.iter().enumerate() {
            if format.is_some() {
                builder.use_color_attachments = true;
                builder.render_components |= 0xf << (i * 4);
            }
        }

        if create_info.color_blend.as_ref().is_some_and(ColorBlendState::is_dual_src) {
            builder.color_attachment_count += 1;
            builder.use_dual_src_blend = true;
            // The second source is an extra fragment output in the second slot.
            if subpass.color_formats.first().copied().flatten().is_some() {
                builder.render_components |= 0xf << 4;
            }
        }
        Ok(builder)
    }

    fn shader_key(&self) -> ShaderKey {
        let mut key = ShaderKey {
            has_gs: self.create_info.has_stage(ShaderStage::Geometry),
            ..Default::default()
        };
        if !self.rasterizer_discard {
            // Custom sample positions change varying interpolation as well.
            key.msaa = self.msaa.rasterization_samples > 1 || self.msaa.enabled_sample_locations().is_some();
            key.sample_shading = self.msaa.sample_shading_enable;
        }
        key
    }

    fn select_variant(&self, shader: &Shader, key: &ShaderKey, binning_pass: bool) -> Result<Arc<ShaderVariant>> {
        let (variant, created) = self.device.compiler().get_or_compile(shader, key, binning_pass)?;
        trace!(stage = ?shader.stage, binning_pass, created, constlen = variant.constlen, "selected variant");
        Ok(variant)
    }

    fn compile_shaders(&mut self) -> Result<()> {
        let ci = self.create_info;
        let compiler = self.device.compiler();
        let mut key = self.shader_key();

        for stage in GRAPHICS_STAGES {
            let desc = ci.stage(stage);
            if desc.is_none() && stage != ShaderStage::Fragment {
                continue;
            }
            let shader = compiler.create_shader(stage, desc, &ci.layout)?;
            // The primitive mode may come from either tessellation stage.
            if matches!(stage, ShaderStage::TessCtrl | ShaderStage::TessEval)
                && key.tessellation == TessPrimitiveMode::None
            {
                key.tessellation = shader.info.tess.primitive_mode;
            }
            self.shaders[stage.index()] = Some(shader);
        }

        key.layer_zero = self.shaders[ShaderStage::Geometry.index()]
            .as_ref()
            .map_or(true, |gs| !gs.info.writes_layer);

        for stage in GRAPHICS_STAGES {
            if let Some(shader) = &self.shaders[stage.index()] {
                let variant = self.select_variant(shader, &key, false)?;
                self.variants[stage.index()] = Some(variant);
            }
        }

        let safe_constlens = trim_constlen(&self.variants, self.device.info());
        key.safe_constlen = true;
        for stage in safe_constlens.stages() {
            if let Some(shader) = &self.shaders[stage.index()] {
                let variant = self.select_variant(shader, &key, false)?;
                self.variants[stage.index()] = Some(variant);
            }
        }

        let Some(vs) = &self.shaders[ShaderStage::Vertex.index()] else {
            return Err(PipelineError::invalid("graphics pipeline without a vertex stage"));
        };
        let binning = if !vs.stream_output.is_empty() || !key.has_binning_vs() {
            self.variants[ShaderStage::Vertex.index()].clone()
        } else {
            key.safe_constlen = safe_constlens.contains(ShaderStageFlags::VERTEX);
            Some(self.select_variant(vs, &key, true)?)
        };
        self.binning_variant = binning;

        if let (Some(hs), Some(ds)) = (self.variant(ShaderStage::TessCtrl), self.variant(ShaderStage::TessEval)) {
            if tess_info(hs, ds).spacing == TessSpacing::Unspecified {
                return Err(PipelineError::invalid("neither tessellation stage specifies a spacing"));
            }
        }

        self.active_desc_sets = self.shaders.iter().flatten().fold(0, |sets, s| sets | s.active_desc_sets);
        Ok(())
    }

    fn variant(&self, stage: ShaderStage) -> Option<&ShaderVariant> {
        self.variants[stage.index()].as_deref()
    }

    fn cs_size(&self) -> u32 {
        let shaders: u32 = self.variants.iter().flatten().map(|v| upload_dwords(v)).sum();
        let binning = self.binning_variant.as_deref().map_or(0, upload_dwords);
        self.device.config().cs_overhead_dwords
            + load_state_size(&self.create_info.layout, self.active_desc_sets, false)
            + shaders
            + binning
    }

    fn upload_shaders(&mut self, cs: &mut CmdStream) {
        for (iova, v) in self.shader_iova.iter_mut().zip(&self.variants) {
            if let Some(v) = v {
                *iova = upload_variant(cs, v);
            }
        }
        if let Some(v) = &self.binning_variant {
            self.binning_vs_iova = upload_variant(cs, v);
        }
    }

    pub(crate) fn build(mut self) -> Result<Pipeline> {
        self.compile_shaders()?;

        let size = self.cs_size();
        let mut cs = CmdStream::new();
        cs.reserve(self.device.allocator().clone(), size)?;
        self.upload_shaders(&mut cs);

        let mut p = Pipeline::new(cs);
        p.dynamic_state_mask = self.dynamic_state_mask;
        p.shader_iova = self.shader_iova;
        p.binning_vs_iova = self.binning_vs_iova;

        self.parse_shader_stages(&mut p);
        self.parse_vertex_input(&mut p);
        self.parse_input_assembly(&mut p);
        self.parse_tessellation(&mut p);
        self.parse_viewport(&mut p);
        self.parse_rasterization(&mut p);
        self.parse_depth_stencil(&mut p);
        self.parse_multisample_and_color_blend(&mut p);
        p.load_state = build_load_state(&mut p.cs, &self.create_info.layout, p.active_desc_sets, false);

        assert_eq!(p.cs.bo_count(), 1, "pipeline command stream outgrew its reservation");
        debug!(
            reserved_dwords = size,
            used_dwords = p.cs.used(),
            stages = ?p.active_stages,
            dynamic = ?p.dynamic_state_mask,
            "built graphics pipeline"
        );
        Ok(p)
    }

    fn parse_shader_stages(&self, p: &mut Pipeline) {
        let ctx = ProgramContext {
            variants: &self.variants,
            binning_variant: self.binning_variant.as_deref(),
            shader_iova: self.shader_iova,
            binning_vs_iova: self.binning_vs_iova,
            patch_control_points: self.create_info.tessellation.map_or(0, |ts| ts.patch_control_points),
            vshs_workgroup: self.device.info().vshs_workgroup(),
            color_attachment_count: self.color_attachment_count,
            dual_src_blend: self.use_dual_src_blend,
            render_components: self.render_components,
            depth_is_s8: self.depth_attachment_format.is_some_and(Format::is_s8),
        };
        let program_dwords = self.device.config().program_state_dwords as usize;

        let mut w = p.cs.begin_sub_stream(program_dwords);
        emit_program(&mut w, &ctx, false);
        p.program = p.cs.end_sub_stream(w);

        let mut w = p.cs.begin_sub_stream(program_dwords);
        emit_program(&mut w, &ctx, true);
        p.program_binning = p.cs.end_sub_stream(w);

        p.active_stages = self
            .create_info
            .stages
            .iter()
            .fold(ShaderStageFlags::empty(), |flags, s| flags | s.stage.flag());

        for (link, (shader, variant)) in p.link.iter_mut().zip(self.shaders.iter().zip(&self.variants)) {
            if let (Some(shader), Some(variant)) = (shader, variant) {
                *link = StageLink {
                    const_state: variant.const_state.clone(),
                    constlen: variant.constlen,
                    push_consts: shader.push_consts,
                };
            }
        }
        p.active_desc_sets = self.active_desc_sets;
    }

    fn parse_vertex_input(&self, p: &mut Pipeline) {
        let Some(vs) = self.variant(ShaderStage::Vertex) else {
            panic!("graphics pipeline without a vertex variant");
        };
        let vi = &self.create_info.vertex_input;
        let vi_dwords = self.device.config().vertex_input_dwords as usize;

        let mut w = p.cs.begin_sub_stream(vi_dwords);
        p.bindings_used = vertex_input::emit_vertex_input(&mut w, vs, vi);
        p.vertex_input = p.cs.end_sub_stream(w);

        if let Some(bs) = self.binning_variant.as_deref() {
            let mut w = p.cs.begin_sub_stream(vi_dwords);
            p.bindings_used |= vertex_input::emit_vertex_input(&mut w, bs, vi);
            p.vertex_input_binning = p.cs.end_sub_stream(w);
        }
    }

    fn parse_input_assembly(&self, p: &mut Pipeline) {
        let ia = &self.create_info.input_assembly;
        p.primtype = primtype(ia.topology) as u32;
        p.primitive_restart = ia.primitive_restart_enable;
    }

    fn parse_tessellation(&self, p: &mut Pipeline) {
        let Some(ts) = &self.create_info.tessellation else {
            return;
        };
        let (Some(hs), Some(ds)) = (self.variant(ShaderStage::TessCtrl), self.variant(ShaderStage::TessEval)) else {
            panic!("tessellation state without tessellation variants");
        };

        p.primtype += ts.patch_control_points;
        p.tess.upper_left_domain_origin = ts.domain_origin.unwrap_or_default() == TessDomainOrigin::UpperLeft;
        p.tess.param_stride = hs.output_size * 4;
        p.tess.hs_bo_regid = hs.const_state.offsets.primitive_param + 1;
        p.tess.ds_bo_regid = ds.const_state.offsets.primitive_param + 1;
    }

    /// Viewport state is ignored, and its registers left stale, when rasterization is off.
    fn parse_viewport(&self, p: &mut Pipeline) {
        if self.rasterizer_discard {
            return;
        }
        let vp = self.create_info.viewport.as_ref();

        if let Some(mut w) = p.static_state_writer(DynamicState::Viewport, viewport::VIEWPORT_DWORDS) {
            if let Some(first) = vp.and_then(|vp| vp.viewports.first()) {
                viewport::emit_viewport(&mut w, first);
            }
            p.end_static_state(DynamicState::Viewport, w);
        }
        if let Some(mut w) = p.static_state_writer(DynamicState::Scissor, viewport::SCISSOR_DWORDS) {
            if let Some(first) = vp.and_then(|vp| vp.scissors.first()) {
                viewport::emit_scissor(&mut w, first);
            }
            p.end_static_state(DynamicState::Scissor, w);
        }
    }

    fn parse_rasterization(&self, p: &mut Pipeline) {
        let rast = &self.create_info.rasterization;

        let mut w = p.cs.draw_state(raster::RAST_DWORDS as usize);
        raster::emit_rast(&mut w, rast);
        p.rast = p.cs.end_sub_stream(w);

        p.gras_su_cntl = raster::gras_su_cntl(rast, self.samples);

        if let Some(mut w) = p.static_state_writer(DynamicState::LineWidth, raster::LINE_WIDTH_DWORDS) {
            p.gras_su_cntl |= GrasSuCntl::linehalfwidth(rast.line_width / 2.0);
            raster::emit_line_width(&mut w, p.gras_su_cntl, rast.line_width);
            p.end_static_state(DynamicState::LineWidth, w);
        }

        if let Some(mut w) = p.static_state_writer(DynamicState::DepthBias, raster::DEPTH_BIAS_DWORDS) {
            raster::emit_depth_bias(
                &mut w,
                rast.depth_bias_constant_factor,
                rast.depth_bias_clamp,
                rast.depth_bias_slope_factor,
            );
            p.end_static_state(DynamicState::DepthBias, w);
        }
    }

    fn parse_depth_stencil(&self, p: &mut Pipeline) {
        let ds = EffectiveDepthStencil::new(self.create_info.depth_stencil.as_ref(), self.depth_attachment_format);

        let mut w = p.cs.draw_state(depth_stencil::DEPTH_STENCIL_DWORDS as usize);
        depth_stencil::emit_depth_stencil(&mut w, &ds, &self.create_info.rasterization);
        p.depth_stencil = p.cs.end_sub_stream(w);

        let state = &ds.stencil;
        if let Some(mut w) = p.static_state_writer(DynamicState::DepthBounds, depth_stencil::DEPTH_BOUNDS_DWORDS) {
            depth_stencil::emit_depth_bounds(&mut w, state.min_depth_bounds, state.max_depth_bounds);
            p.end_static_state(DynamicState::DepthBounds, w);
        }
        let pair = depth_stencil::STENCIL_PAIR_DWORDS;
        if let Some(mut w) = p.static_state_writer(DynamicState::StencilCompareMask, pair) {
            depth_stencil::emit_stencil_compare_mask(&mut w, state.front.compare_mask, state.back.compare_mask);
            p.end_static_state(DynamicState::StencilCompareMask, w);
        }
        if let Some(mut w) = p.static_state_writer(DynamicState::StencilWriteMask, pair) {
            depth_stencil::emit_stencil_write_mask(&mut w, state.front.write_mask, state.back.write_mask);
            p.end_static_state(DynamicState::StencilWriteMask, w);
        }
        if let Some(mut w) = p.static_state_writer(DynamicState::StencilReference, pair) {
            depth_stencil::emit_stencil_reference(&mut w, state.front.reference, state.back.reference);
            p.end_static_state(DynamicState::StencilReference, w);
        }
    }

    /// Multisample and blend state is ignored when rasterization is off, and blend state
    /// when the subpass writes no color.
    fn parse_multisample_and_color_blend(&self, p: &mut Pipeline) {
        if self.rasterizer_discard {
            return;
        }

        let dummy = ColorBlendState::default();
        let blend_state = match &self.create_info.color_blend {
            Some(blend_state) if self.use_color_attachments => blend_state,
            _ => &dummy,
        };

        let mut w = p.cs.draw_state(blend::blend_dwords(blend_state.attachments.len() as u32) as usize);
        p.blend_enable_mask = blend::emit_blend(
            &mut w,
            blend_state,
            &self.create_info.subpass.color_formats,
            self.use_dual_src_blend,
            &self.msaa,
        );
        p.blend = p.cs.end_sub_stream(w);

        if let Some(mut w) = p.static_state_writer(DynamicState::BlendConstants, blend::BLEND_CONSTANTS_DWORDS) {
            blend::emit_blend_constants(&mut w, &blend_state.blend_constants);
            p.end_static_state(DynamicState::BlendConstants, w);
        }

        let locations = self.msaa.enabled_sample_locations();
        let size = multisample::sample_locations_dwords(locations.is_some());
        if let Some(mut w) = p.static_state_writer(DynamicState::SampleLocations, size) {
            multisample::emit_sample_locations(&mut w, locations);
            p.end_static_state(DynamicState::SampleLocations, w);
        }
    }
}
