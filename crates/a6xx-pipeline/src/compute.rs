//! Compute pipelines: one stage, its program block and the compute descriptor prefetch.

use a6xx_protocol::CmdStream;
use tracing::debug;

use crate::builder::{upload_dwords, upload_variant};
use crate::error::{PipelineError, Result};
use crate::load_state::{build_load_state, load_state_size};
use crate::pipeline::{Device, Pipeline, StageLink};
use crate::shader::ShaderKey;
use crate::types::{ComputePipelineCreateInfo, ShaderStage};
use crate::xs_config::emit_cs_config;

pub(crate) fn build_compute(device: &Device, create_info: &ComputePipelineCreateInfo) -> Result<Pipeline> {
    if create_info.stage.stage != ShaderStage::Compute {
        return Err(PipelineError::invalid(format!(
            "{:?} stage in a compute pipeline",
            create_info.stage.stage
        )));
    }
    let layout = &create_info.layout;
    let compiler = device.compiler();

    let shader = compiler.create_shader(ShaderStage::Compute, Some(&create_info.stage), layout)?;
    let active_desc_sets = shader.active_desc_sets;
    let (v, _) = compiler.get_or_compile(&shader, &ShaderKey::default(), false)?;

    let size = device.config().cs_overhead_dwords + load_state_size(layout, active_desc_sets, true) + upload_dwords(&v);
    let mut cs = CmdStream::new();
    cs.reserve(device.allocator().clone(), size)?;
    let shader_iova = upload_variant(&mut cs, &v);

    let mut p = Pipeline::new(cs);
    p.active_stages = ShaderStage::Compute.flag();
    p.active_desc_sets = active_desc_sets;
    p.link[ShaderStage::Compute.index()] = StageLink {
        const_state: v.const_state.clone(),
        constlen: v.constlen,
        push_consts: shader.push_consts,
    };
    p.shader_iova[ShaderStage::Compute.index()] = shader_iova;
    p.local_size = shader.info.cs_local_size;

    let mut w = p.cs.begin_sub_stream(device.config().program_state_dwords as usize);
    emit_cs_config(&mut w, &v, shader_iova);
    p.program = p.cs.end_sub_stream(w);

    p.load_state = build_load_state(&mut p.cs, layout, active_desc_sets, true);

    debug!(
        reserved_dwords = size,
        used_dwords = p.cs.used(),
        local_size = ?p.local_size,
        "built compute pipeline"
    );
    Ok(p)
}
