//! Fixed-function state blocks.
//!
//! Every emitter here records a block of known size so the builder can bake it as its own
//! draw state, and so the blocks that may be dynamic can be re-recorded per draw.

pub mod blend;
pub mod depth_stencil;
pub mod multisample;
pub mod raster;
pub mod vertex_input;
pub mod viewport;

use a6xx_protocol::regs::{
    BlendOpcode, CompareFunc, PolygonMode as HwPolygonMode, PrimType, RbBlendFactor, RopCode, StencilOpCode,
};

use crate::types::{BlendFactor, BlendOp, CompareOp, LogicOp, PolygonMode, PrimitiveTopology, StencilOp};

pub fn compare_func(op: CompareOp) -> CompareFunc {
    match op {
        CompareOp::Never => CompareFunc::Never,
        CompareOp::Less => CompareFunc::Less,
        CompareOp::Equal => CompareFunc::Equal,
        CompareOp::LessOrEqual => CompareFunc::LEqual,
        CompareOp::Greater => CompareFunc::Greater,
        CompareOp::NotEqual => CompareFunc::NotEqual,
        CompareOp::GreaterOrEqual => CompareFunc::GEqual,
        CompareOp::Always => CompareFunc::Always,
    }
}

pub fn stencil_op(op: StencilOp) -> StencilOpCode {
    match op {
        StencilOp::Keep => StencilOpCode::Keep,
        StencilOp::Zero => StencilOpCode::Zero,
        StencilOp::Replace => StencilOpCode::Replace,
        StencilOp::IncrementAndClamp => StencilOpCode::IncrClamp,
        StencilOp::DecrementAndClamp => StencilOpCode::DecrClamp,
        StencilOp::Invert => StencilOpCode::Invert,
        StencilOp::IncrementAndWrap => StencilOpCode::IncrWrap,
        StencilOp::DecrementAndWrap => StencilOpCode::DecrWrap,
    }
}

pub fn blend_factor(factor: BlendFactor) -> RbBlendFactor {
    match factor {
        BlendFactor::Zero => RbBlendFactor::Zero,
        BlendFactor::One => RbBlendFactor::One,
        BlendFactor::SrcColor => RbBlendFactor::SrcColor,
        BlendFactor::OneMinusSrcColor => RbBlendFactor::OneMinusSrcColor,
        BlendFactor::DstColor => RbBlendFactor::DstColor,
        BlendFactor::OneMinusDstColor => RbBlendFactor::OneMinusDstColor,
        BlendFactor::SrcAlpha => RbBlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => RbBlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => RbBlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => RbBlendFactor::OneMinusDstAlpha,
        BlendFactor::ConstantColor => RbBlendFactor::ConstantColor,
        BlendFactor::OneMinusConstantColor => RbBlendFactor::OneMinusConstantColor,
        BlendFactor::ConstantAlpha => RbBlendFactor::ConstantAlpha,
        BlendFactor::OneMinusConstantAlpha => RbBlendFactor::OneMinusConstantAlpha,
        BlendFactor::SrcAlphaSaturate => RbBlendFactor::SrcAlphaSaturate,
        BlendFactor::Src1Color => RbBlendFactor::Src1Color,
        BlendFactor::OneMinusSrc1Color => RbBlendFactor::OneMinusSrc1Color,
        BlendFactor::Src1Alpha => RbBlendFactor::Src1Alpha,
        BlendFactor::OneMinusSrc1Alpha => RbBlendFactor::OneMinusSrc1Alpha,
    }
}

pub fn blend_op(op: BlendOp) -> BlendOpcode {
    match op {
        BlendOp::Add => BlendOpcode::DstPlusSrc,
        BlendOp::Subtract => BlendOpcode::SrcMinusDst,
        BlendOp::ReverseSubtract => BlendOpcode::DstMinusSrc,
        BlendOp::Min => BlendOpcode::MinDstSrc,
        BlendOp::Max => BlendOpcode::MaxDstSrc,
    }
}

pub fn rop(op: LogicOp) -> RopCode {
    match op {
        LogicOp::Clear => RopCode::Clear,
        LogicOp::And => RopCode::And,
        LogicOp::AndReverse => RopCode::AndReverse,
        LogicOp::Copy => RopCode::Copy,
        LogicOp::AndInverted => RopCode::AndInverted,
        LogicOp::NoOp => RopCode::Noop,
        LogicOp::Xor => RopCode::Xor,
        LogicOp::Or => RopCode::Or,
        LogicOp::Nor => RopCode::Nor,
        LogicOp::Equivalent => RopCode::Equiv,
        LogicOp::Invert => RopCode::Invert,
        LogicOp::OrReverse => RopCode::OrReverse,
        LogicOp::CopyInverted => RopCode::CopyInverted,
        LogicOp::OrInverted => RopCode::OrInverted,
        LogicOp::Nand => RopCode::Nand,
        LogicOp::Set => RopCode::Set,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> HwPolygonMode {
    match mode {
        PolygonMode::Fill => HwPolygonMode::Triangles,
        PolygonMode::Line => HwPolygonMode::Lines,
        PolygonMode::Point => HwPolygonMode::Points,
    }
}

/// Patch lists map to `PATCHES0`; the control point count is added once tessellation
/// state is parsed.
pub fn primtype(topology: PrimitiveTopology) -> PrimType {
    match topology {
        PrimitiveTopology::PointList => PrimType::PointList,
        PrimitiveTopology::LineList => PrimType::LineList,
        PrimitiveTopology::LineStrip => PrimType::LineStrip,
        PrimitiveTopology::TriangleList => PrimType::TriList,
        PrimitiveTopology::TriangleStrip => PrimType::TriStrip,
        PrimitiveTopology::TriangleFan => PrimType::TriFan,
        PrimitiveTopology::LineListWithAdjacency => PrimType::LineListAdj,
        PrimitiveTopology::LineStripWithAdjacency => PrimType::LineStripAdj,
        PrimitiveTopology::TriangleListWithAdjacency => PrimType::TriListAdj,
        PrimitiveTopology::TriangleStripWithAdjacency => PrimType::TriStripAdj,
        PrimitiveTopology::PatchList => PrimType::Patches0,
    }
}
