//! State that a pipeline may leave unresolved and have supplied at draw time.
//!
//! A pipeline bakes one draw state per [`DynamicState`] it does not list as dynamic. For the
//! ones it does list, callers record the registers themselves with [`emit_dynamic_state`].

use a6xx_protocol::CsWriter;
use bitflags::bitflags;

use crate::error::{PipelineError, Result};
use crate::state::{blend, depth_stencil, multisample, raster, viewport};
use crate::types::{Rect2D, SampleLocationsInfo, Viewport};

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DynamicState {
    Viewport = 0,
    Scissor = 1,
    LineWidth = 2,
    DepthBias = 3,
    BlendConstants = 4,
    DepthBounds = 5,
    StencilCompareMask = 6,
    StencilWriteMask = 7,
    StencilReference = 8,
    SampleLocations = 9,
}

pub const DYNAMIC_STATE_COUNT: usize = 10;

impl DynamicState {
    pub const ALL: [DynamicState; DYNAMIC_STATE_COUNT] = [
        DynamicState::Viewport,
        DynamicState::Scissor,
        DynamicState::LineWidth,
        DynamicState::DepthBias,
        DynamicState::BlendConstants,
        DynamicState::DepthBounds,
        DynamicState::StencilCompareMask,
        DynamicState::StencilWriteMask,
        DynamicState::StencilReference,
        DynamicState::SampleLocations,
    ];

    /// Raw value of the sample-locations extension state.
    pub const SAMPLE_LOCATIONS_RAW: u32 = 1_000_143_000;

    /// Accepts the core values `0..=8` and the sample-locations extension value.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0..=8 => Ok(Self::ALL[raw as usize]),
            Self::SAMPLE_LOCATIONS_RAW => Ok(DynamicState::SampleLocations),
            _ => Err(PipelineError::invalid(format!("unsupported dynamic state {raw}"))),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn mask(self) -> DynamicStateMask {
        DynamicStateMask::from_bits_truncate(1 << self as u32)
    }

    /// Dwords of the baked draw state. Sample locations take six dwords when the default
    /// pattern is programmed and nine for a custom one.
    pub const fn static_size(self) -> u32 {
        match self {
            DynamicState::Viewport => 18,
            DynamicState::Scissor => 3,
            DynamicState::LineWidth => 2,
            DynamicState::DepthBias => 4,
            DynamicState::BlendConstants => 5,
            DynamicState::DepthBounds => 3,
            DynamicState::StencilCompareMask | DynamicState::StencilWriteMask | DynamicState::StencilReference => 2,
            DynamicState::SampleLocations => 9,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DynamicStateMask: u32 {
        const VIEWPORT = 1 << 0;
        const SCISSOR = 1 << 1;
        const LINE_WIDTH = 1 << 2;
        const DEPTH_BIAS = 1 << 3;
        const BLEND_CONSTANTS = 1 << 4;
        const DEPTH_BOUNDS = 1 << 5;
        const STENCIL_COMPARE_MASK = 1 << 6;
        const STENCIL_WRITE_MASK = 1 << 7;
        const STENCIL_REFERENCE = 1 << 8;
        const SAMPLE_LOCATIONS = 1 << 9;
    }
}

impl DynamicStateMask {
    pub fn from_states(states: &[DynamicState]) -> Self {
        states.iter().fold(Self::empty(), |mask, s| mask | s.mask())
    }

    pub fn is_dynamic(self, state: DynamicState) -> bool {
        self.contains(state.mask())
    }
}

/// A value for one piece of dynamic state.
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicStateValue {
    Viewport(Viewport),
    Scissor(Rect2D),
    LineWidth(f32),
    DepthBias { constant: f32, clamp: f32, slope: f32 },
    BlendConstants([f32; 4]),
    DepthBounds { min: f32, max: f32 },
    StencilCompareMask { front: u32, back: u32 },
    StencilWriteMask { front: u32, back: u32 },
    StencilReference { front: u32, back: u32 },
    /// `None` restores the default sample pattern.
    SampleLocations(Option<SampleLocationsInfo>),
}

impl DynamicStateValue {
    pub fn state(&self) -> DynamicState {
        match self {
            DynamicStateValue::Viewport(_) => DynamicState::Viewport,
            DynamicStateValue::Scissor(_) => DynamicState::Scissor,
            DynamicStateValue::LineWidth(_) => DynamicState::LineWidth,
            DynamicStateValue::DepthBias { .. } => DynamicState::DepthBias,
            DynamicStateValue::BlendConstants(_) => DynamicState::BlendConstants,
            DynamicStateValue::DepthBounds { .. } => DynamicState::DepthBounds,
            DynamicStateValue::StencilCompareMask { .. } => DynamicState::StencilCompareMask,
            DynamicStateValue::StencilWriteMask { .. } => DynamicState::StencilWriteMask,
            DynamicStateValue::StencilReference { .. } => DynamicState::StencilReference,
            DynamicStateValue::SampleLocations(_) => DynamicState::SampleLocations,
        }
    }
}

/// Records the registers for `value`.
///
/// `gras_su_cntl` is the pipeline's `GRAS_SU_CNTL` without a line width; only
/// [`DynamicStateValue::LineWidth`] reads it.
pub fn emit_dynamic_state(cs: &mut CsWriter, value: &DynamicStateValue, gras_su_cntl: u32) {
    match value {
        DynamicStateValue::Viewport(vp) => viewport::emit_viewport(cs, vp),
        DynamicStateValue::Scissor(rect) => viewport::emit_scissor(cs, rect),
        DynamicStateValue::LineWidth(width) => raster::emit_line_width(cs, gras_su_cntl, *width),
        DynamicStateValue::DepthBias { constant, clamp, slope } => {
            raster::emit_depth_bias(cs, *constant, *clamp, *slope)
        }
        DynamicStateValue::BlendConstants(c) => blend::emit_blend_constants(cs, c),
        DynamicStateValue::DepthBounds { min, max } => depth_stencil::emit_depth_bounds(cs, *min, *max),
        DynamicStateValue::StencilCompareMask { front, back } => {
            depth_stencil::emit_stencil_compare_mask(cs, *front, *back)
        }
        DynamicStateValue::StencilWriteMask { front, back } => {
            depth_stencil::emit_stencil_write_mask(cs, *front, *back)
        }
        DynamicStateValue::StencilReference { front, back } => {
            depth_stencil::emit_stencil_reference(cs, *front, *back)
        }
        DynamicStateValue::SampleLocations(info) => multisample::emit_sample_locations(cs, info.as_ref()),
    }
}
