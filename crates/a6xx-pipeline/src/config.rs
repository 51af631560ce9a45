//! Device description and builder sizing knobs.

/// Maximum number of bound descriptor sets. Dynamic buffer descriptors live in a pseudo-set
/// with this index.
pub const MAX_SETS: u32 = 4;
pub const MAX_VBS: u32 = 32;
pub const MAX_VERTEX_ATTRIBS: u32 = 32;
pub const MAX_RTS: usize = 8;

/// Dwords per texture/buffer descriptor (`A6XX_TEX_CONST_DWORDS`).
pub const TEX_CONST_DWORDS: u32 = 16;

/// Constant file limits, in vec4 units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstLimits {
    /// Combined limit over every graphics stage.
    pub max_const_pipeline: u32,
    /// Combined limit over the geometry stages (VS through GS).
    pub max_const_geom: u32,
    pub max_const_frag: u32,
    /// Length every stage can be shrunk to by recompiling with `safe_constlen`.
    pub max_const_safe: u32,
}

impl Default for ConstLimits {
    fn default() -> Self {
        Self {
            max_const_pipeline: 640,
            max_const_geom: 512,
            max_const_frag: 512,
            max_const_safe: 128,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub gpu_id: u32,
    pub const_limits: ConstLimits,
}

impl DeviceInfo {
    pub fn a630() -> Self {
        Self {
            gpu_id: 630,
            const_limits: ConstLimits::default(),
        }
    }

    pub fn a650() -> Self {
        Self {
            gpu_id: 650,
            const_limits: ConstLimits::default(),
        }
    }

    /// a650 sizes the HS local memory per VS+HS workgroup.
    pub fn vshs_workgroup(&self) -> bool {
        self.gpu_id == 650
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::a630()
    }
}

/// Command-buffer sizing used by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Fixed overhead reserved on top of shader binaries and descriptor prefetch.
    pub cs_overhead_dwords: u32,
    /// Bound for each program sub-stream (draw and binning).
    pub program_state_dwords: u32,
    /// Bound for each vertex input sub-stream.
    pub vertex_input_dwords: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cs_overhead_dwords: 2048,
            program_state_dwords: 512,
            vertex_input_dwords: MAX_VERTEX_ATTRIBS * 7 + 2,
        }
    }
}
