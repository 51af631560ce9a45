//! Constant-file budgeting across the stages of a pipeline.

use std::sync::Arc;

use tracing::trace;

use crate::config::DeviceInfo;
use crate::shader::ShaderVariant;
use crate::types::{ShaderStage, ShaderStageFlags, SHADER_STAGE_COUNT};

/// Shrinks the largest stages to the safe length until `first..=last` fits `limit`.
fn trim_range(
    constlens: &mut [u32; SHADER_STAGE_COUNT],
    first: ShaderStage,
    last: ShaderStage,
    limit: u32,
    safe: u32,
) -> ShaderStageFlags {
    let range = first.index()..=last.index();
    let mut total: u32 = constlens[range.clone()].iter().sum();
    let mut trimmed = ShaderStageFlags::empty();

    while total > limit {
        let mut max_stage = first.index();
        let mut max_const = 0;
        for i in range.clone() {
            // Later stages win ties.
            if constlens[i] >= max_const {
                max_stage = i;
                max_const = constlens[i];
            }
        }
        if max_const <= safe {
            // Nothing left that recompiling would shrink.
            break;
        }

        trace!(stage = max_stage, from = max_const, to = safe, "trimming constlen");
        trimmed |= ShaderStage::ALL[max_stage].flag();
        total = total - max_const + safe;
        constlens[max_stage] = safe;
    }

    trimmed
}

/// Stages that must be recompiled with `safe_constlen` for the pipeline to fit the
/// combined constant limits.
pub fn trim_constlen(
    variants: &[Option<Arc<ShaderVariant>>; SHADER_STAGE_COUNT],
    device: &DeviceInfo,
) -> ShaderStageFlags {
    let mut constlens = [0u32; SHADER_STAGE_COUNT];
    for (len, v) in constlens.iter_mut().zip(variants) {
        if let Some(v) = v {
            *len = v.constlen;
        }
    }

    let limits = &device.const_limits;
    let mut trimmed = ShaderStageFlags::empty();
    // The fragment limit only ever concerns a single stage, which the first compile
    // already honours.
    if device.gpu_id >= 600 {
        trimmed |= trim_range(
            &mut constlens,
            ShaderStage::Vertex,
            ShaderStage::Geometry,
            limits.max_const_geom,
            limits.max_const_safe,
        );
    }
    trimmed |= trim_range(
        &mut constlens,
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        limits.max_const_pipeline,
        limits.max_const_safe,
    );
    trimmed
}
