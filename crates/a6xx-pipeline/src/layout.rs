//! Descriptor set and pipeline layouts, as far as descriptor prefetch needs them.

use std::sync::Arc;

use crate::config::{MAX_SETS, TEX_CONST_DWORDS};
use crate::error::{PipelineError, Result};
use crate::types::ShaderStageFlags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    Sampler,
    CombinedImageSampler,
    SampledImage,
    StorageImage,
    UniformTexelBuffer,
    StorageTexelBuffer,
    UniformBuffer,
    StorageBuffer,
    UniformBufferDynamic,
    StorageBufferDynamic,
    InputAttachment,
}

impl DescriptorType {
    pub fn is_dynamic(self) -> bool {
        matches!(self, DescriptorType::UniformBufferDynamic | DescriptorType::StorageBufferDynamic)
    }

    /// Bytes one array element occupies in the set's descriptor memory.
    ///
    /// Combined image/samplers store the texture and the sampler descriptor back to back;
    /// dynamic buffers live outside the set.
    pub fn descriptor_size(self) -> u32 {
        match self {
            DescriptorType::CombinedImageSampler => 2 * TEX_CONST_DWORDS * 4,
            DescriptorType::UniformBufferDynamic | DescriptorType::StorageBufferDynamic => 0,
            _ => TEX_CONST_DWORDS * 4,
        }
    }
}

/// Binding as declared by the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub descriptor_count: u32,
    pub stages: ShaderStageFlags,
}

/// Binding with its resolved placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub array_size: u32,
    pub stages: ShaderStageFlags,
    /// Byte offset inside the set.
    pub offset: u32,
    /// Index among the set's dynamic buffers.
    pub dynamic_offset_offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorSetLayout {
    bindings: Vec<DescriptorBinding>,
    size: u32,
    dynamic_offset_count: u32,
}

impl DescriptorSetLayout {
    pub fn new(mut decl: Vec<DescriptorSetLayoutBinding>) -> Self {
        decl.sort_by_key(|b| b.binding);

        let mut size = 0;
        let mut dynamic_offset_count = 0;
        let bindings = decl
            .into_iter()
            .map(|b| {
                let out = DescriptorBinding {
                    binding: b.binding,
                    descriptor_type: b.descriptor_type,
                    array_size: b.descriptor_count,
                    stages: b.stages,
                    offset: size,
                    dynamic_offset_offset: dynamic_offset_count,
                };
                size += b.descriptor_type.descriptor_size() * b.descriptor_count;
                if b.descriptor_type.is_dynamic() {
                    dynamic_offset_count += b.descriptor_count;
                }
                out
            })
            .collect();

        Self {
            bindings,
            size,
            dynamic_offset_count,
        }
    }

    pub fn bindings(&self) -> &[DescriptorBinding] {
        &self.bindings
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn dynamic_offset_count(&self) -> u32 {
        self.dynamic_offset_count
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetEntry {
    pub layout: Arc<DescriptorSetLayout>,
    /// First slot of this set's dynamic buffers in the dynamic pseudo-set.
    pub dynamic_offset_start: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineLayout {
    sets: Vec<SetEntry>,
    push_constant_size: u32,
}

impl PipelineLayout {
    pub fn new(set_layouts: Vec<Arc<DescriptorSetLayout>>, push_constant_size: u32) -> Result<Self> {
        if set_layouts.len() > MAX_SETS as usize {
            return Err(PipelineError::invalid(format!(
                "{} descriptor sets exceed the limit of {MAX_SETS}",
                set_layouts.len()
            )));
        }

        let mut dynamic_offset_start = 0;
        let sets = set_layouts
            .into_iter()
            .map(|layout| {
                let entry = SetEntry {
                    dynamic_offset_start,
                    layout,
                };
                dynamic_offset_start += entry.layout.dynamic_offset_count();
                entry
            })
            .collect();

        Ok(Self {
            sets,
            push_constant_size,
        })
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn set(&self, index: usize) -> Option<&SetEntry> {
        self.sets.get(index)
    }

    pub fn sets(&self) -> &[SetEntry] {
        &self.sets
    }

    pub fn push_constant_size(&self) -> u32 {
        self.push_constant_size
    }
}
