//! `a6xx-pipeline` turns graphics and compute pipeline descriptions into a6xx command
//! streams.
//!
//! A [`Device`] selects shader variants through a [`ShaderCompiler`], reserves one command
//! buffer per pipeline from a [`BufferAllocator`], uploads the shader binaries into it and
//! records every piece of pipeline state as a separately addressable draw state:
//! - program state for the draw and binning passes (see [`program`]),
//! - vertex fetch, rasterizer, depth/stencil and blend blocks (see [`state`]),
//! - bindless descriptor prefetch (see [`load_state`]),
//! - one baked block per piece of state that is not left dynamic (see [`dynamic`]).

mod builder;
mod compute;
mod error;
mod pipeline;

pub mod config;
pub mod constlen;
pub mod dynamic;
pub mod format;
pub mod layout;
pub mod linkage;
pub mod load_state;
pub mod program;
pub mod shader;
pub mod state;
pub mod types;
pub mod vpc;
pub mod xs_config;

pub use a6xx_protocol::{BufferAllocator, DrawState, LinearAllocator};
pub use config::{ConstLimits, DeviceInfo, PipelineConfig};
pub use dynamic::{DynamicState, DynamicStateMask, DynamicStateValue};
pub use error::{PipelineError, Result};
pub use format::Format;
pub use layout::{DescriptorSetLayout, DescriptorSetLayoutBinding, DescriptorType, PipelineLayout};
pub use pipeline::{BatchResult, Device, Pipeline, StageLink, TessParams};
pub use shader::{Shader, ShaderCompiler, ShaderKey, ShaderVariant};
pub use types::*;
