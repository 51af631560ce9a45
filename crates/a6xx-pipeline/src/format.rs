//! Portable formats and their a6xx vertex-fetch encodings.

use a6xx_protocol::fmt::{Fmt6, Swap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    R8Unorm,
    R8Snorm,
    R8Uint,
    R8Sint,
    R8G8Unorm,
    R8G8Snorm,
    R8G8Uint,
    R8G8Sint,
    R8G8B8A8Unorm,
    R8G8B8A8Snorm,
    R8G8B8A8Uint,
    R8G8B8A8Sint,
    R8G8B8A8Srgb,
    B8G8R8A8Unorm,
    B8G8R8A8Srgb,
    B5G6R5Unorm,
    A2B10G10R10Unorm,
    A2B10G10R10Uint,
    B10G11R11Ufloat,
    R16Unorm,
    R16Float,
    R16Uint,
    R16Sint,
    R16G16Unorm,
    R16G16Float,
    R16G16Uint,
    R16G16Sint,
    R16G16B16A16Unorm,
    R16G16B16A16Float,
    R16G16B16A16Uint,
    R16G16B16A16Sint,
    R32Float,
    R32Uint,
    R32Sint,
    R32G32Float,
    R32G32Uint,
    R32G32Sint,
    R32G32B32Float,
    R32G32B32Uint,
    R32G32B32Sint,
    R32G32B32A32Float,
    R32G32B32A32Uint,
    R32G32B32A32Sint,
    D16Unorm,
    X8D24Unorm,
    D32Sfloat,
    S8Uint,
    D24UnormS8Uint,
    D32SfloatS8Uint,
}

impl Format {
    pub fn is_int(self) -> bool {
        use Format::*;
        matches!(
            self,
            R8Uint
                | R8Sint
                | R8G8Uint
                | R8G8Sint
                | R8G8B8A8Uint
                | R8G8B8A8Sint
                | A2B10G10R10Uint
                | R16Uint
                | R16Sint
                | R16G16Uint
                | R16G16Sint
                | R16G16B16A16Uint
                | R16G16B16A16Sint
                | R32Uint
                | R32Sint
                | R32G32Uint
                | R32G32Sint
                | R32G32B32Uint
                | R32G32B32Sint
                | R32G32B32A32Uint
                | R32G32B32A32Sint
                | S8Uint
        )
    }

    pub fn has_alpha(self) -> bool {
        use Format::*;
        matches!(
            self,
            R8G8B8A8Unorm
                | R8G8B8A8Snorm
                | R8G8B8A8Uint
                | R8G8B8A8Sint
                | R8G8B8A8Srgb
                | B8G8R8A8Unorm
                | B8G8R8A8Srgb
                | A2B10G10R10Unorm
                | A2B10G10R10Uint
                | R16G16B16A16Unorm
                | R16G16B16A16Float
                | R16G16B16A16Uint
                | R16G16B16A16Sint
                | R32G32B32A32Float
                | R32G32B32A32Uint
                | R32G32B32A32Sint
        )
    }

    pub fn has_depth(self) -> bool {
        matches!(
            self,
            Format::D16Unorm | Format::X8D24Unorm | Format::D32Sfloat | Format::D24UnormS8Uint | Format::D32SfloatS8Uint
        )
    }

    /// Stencil-only.
    pub fn is_s8(self) -> bool {
        self == Format::S8Uint
    }

    /// Hardware format and swap for vertex fetch; `None` if the format cannot be fetched.
    pub fn vertex_format(self) -> Option<(Fmt6, Swap)> {
        use Format::*;
        let wzyx = |f| Some((f, Swap::Wzyx));
        match self {
            R8Unorm => wzyx(Fmt6::R8Unorm),
            R8Snorm => wzyx(Fmt6::R8Snorm),
            R8Uint => wzyx(Fmt6::R8Uint),
            R8Sint => wzyx(Fmt6::R8Sint),
            R8G8Unorm => wzyx(Fmt6::R8G8Unorm),
            R8G8Snorm => wzyx(Fmt6::R8G8Snorm),
            R8G8Uint => wzyx(Fmt6::R8G8Uint),
            R8G8Sint => wzyx(Fmt6::R8G8Sint),
            R8G8B8A8Unorm => wzyx(Fmt6::R8G8B8A8Unorm),
            R8G8B8A8Snorm => wzyx(Fmt6::R8G8B8A8Snorm),
            R8G8B8A8Uint => wzyx(Fmt6::R8G8B8A8Uint),
            R8G8B8A8Sint => wzyx(Fmt6::R8G8B8A8Sint),
            B8G8R8A8Unorm => Some((Fmt6::R8G8B8A8Unorm, Swap::Wxyz)),
            B5G6R5Unorm => Some((Fmt6::R5G6B5Unorm, Swap::Wxyz)),
            A2B10G10R10Unorm => wzyx(Fmt6::R10G10B10A2Unorm),
            A2B10G10R10Uint => wzyx(Fmt6::R10G10B10A2Uint),
            B10G11R11Ufloat => wzyx(Fmt6::R11G11B10Float),
            R16Unorm => wzyx(Fmt6::R16Unorm),
            R16Float => wzyx(Fmt6::R16Float),
            R16Uint => wzyx(Fmt6::R16Uint),
            R16Sint => wzyx(Fmt6::R16Sint),
            R16G16Unorm => wzyx(Fmt6::R16G16Unorm),
            R16G16Float => wzyx(Fmt6::R16G16Float),
            R16G16Uint => wzyx(Fmt6::R16G16Uint),
            R16G16Sint => wzyx(Fmt6::R16G16Sint),
            R16G16B16A16Unorm => wzyx(Fmt6::R16G16B16A16Unorm),
            R16G16B16A16Float => wzyx(Fmt6::R16G16B16A16Float),
            R16G16B16A16Uint => wzyx(Fmt6::R16G16B16A16Uint),
            R16G16B16A16Sint => wzyx(Fmt6::R16G16B16A16Sint),
            R32Float => wzyx(Fmt6::R32Float),
            R32Uint => wzyx(Fmt6::R32Uint),
            R32Sint => wzyx(Fmt6::R32Sint),
            R32G32Float => wzyx(Fmt6::R32G32Float),
            R32G32Uint => wzyx(Fmt6::R32G32Uint),
            R32G32Sint => wzyx(Fmt6::R32G32Sint),
            R32G32B32Float => wzyx(Fmt6::R32G32B32Float),
            R32G32B32Uint => wzyx(Fmt6::R32G32B32Uint),
            R32G32B32Sint => wzyx(Fmt6::R32G32B32Sint),
            R32G32B32A32Float => wzyx(Fmt6::R32G32B32A32Float),
            R32G32B32A32Uint => wzyx(Fmt6::R32G32B32A32Uint),
            R32G32B32A32Sint => wzyx(Fmt6::R32G32B32A32Sint),
            R8G8B8A8Srgb | B8G8R8A8Srgb | D16Unorm | X8D24Unorm | D32Sfloat | S8Uint | D24UnormS8Uint
            | D32SfloatS8Uint => None,
        }
    }
}
