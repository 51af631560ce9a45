//! a6xx hardware format codes (`FMT6_*`) and component swaps.

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fmt6 {
    A8Unorm = 0x02,
    R8Unorm = 0x03,
    R8Snorm = 0x04,
    R8Uint = 0x05,
    R8Sint = 0x06,
    R4G4B4A4Unorm = 0x08,
    R5G5B5A1Unorm = 0x0a,
    R5G6B5Unorm = 0x0e,
    R8G8Unorm = 0x0f,
    R8G8Snorm = 0x10,
    R8G8Uint = 0x11,
    R8G8Sint = 0x12,
    R16Unorm = 0x15,
    R16Snorm = 0x16,
    R16Float = 0x17,
    R16Uint = 0x18,
    R16Sint = 0x19,
    R8G8B8Unorm = 0x21,
    R8G8B8A8Unorm = 0x30,
    R8G8B8X8Unorm = 0x31,
    R8G8B8A8Snorm = 0x32,
    R8G8B8A8Uint = 0x33,
    R8G8B8A8Sint = 0x34,
    R10G10B10A2Unorm = 0x36,
    R10G10B10A2Snorm = 0x39,
    R10G10B10A2Uint = 0x3a,
    R10G10B10A2Sint = 0x3b,
    R11G11B10Float = 0x42,
    R16G16Unorm = 0x43,
    R16G16Snorm = 0x44,
    R16G16Float = 0x45,
    R16G16Uint = 0x46,
    R16G16Sint = 0x47,
    R32Float = 0x4a,
    R32Uint = 0x4b,
    R32Sint = 0x4c,
    R16G16B16A16Unorm = 0x60,
    R16G16B16A16Snorm = 0x61,
    R16G16B16A16Float = 0x62,
    R16G16B16A16Uint = 0x63,
    R16G16B16A16Sint = 0x64,
    R32G32Float = 0x67,
    R32G32Uint = 0x68,
    R32G32Sint = 0x69,
    R32G32B32Float = 0x70,
    R32G32B32Uint = 0x71,
    R32G32B32Sint = 0x72,
    R32G32B32A32Float = 0x82,
    R32G32B32A32Uint = 0x83,
    R32G32B32A32Sint = 0x84,
    Z24UnormS8Uint = 0xa0,
}

/// Component swap applied on fetch.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Swap {
    #[default]
    Wzyx = 0,
    Wxyz = 1,
    Zyxw = 2,
    Xyzw = 3,
}
