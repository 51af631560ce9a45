//! PM4 packet layouts consumed by the a6xx command processor (CP).
//!
//! Only two packet types are produced on a6xx:
//! * type 4: write `cnt` consecutive registers starting at `reg`;
//! * type 7: opcode packet carrying `cnt` payload dwords.
//!
//! Both headers carry odd-parity bits over their count and register/opcode fields.

pub const CP_TYPE4_PKT: u32 = 4 << 28;
pub const CP_TYPE7_PKT: u32 = 7 << 28;

/// Largest payload a type-4 header can describe.
pub const PKT4_MAX_COUNT: u32 = 0x7f;
/// Largest payload a type-7 header can describe.
pub const PKT7_MAX_COUNT: u32 = 0x3fff;

/// Odd parity of the nibbles of `val`, as required by the packet headers.
pub const fn odd_parity_bit(val: u32) -> u32 {
    let mut v = val;
    v ^= v >> 16;
    v ^= v >> 8;
    v ^= v >> 4;
    v &= 0xf;
    (!0x6996u32 >> v) & 1
}

pub const fn pkt4_hdr(reg: u16, cnt: u32) -> u32 {
    let reg = reg as u32;
    CP_TYPE4_PKT
        | (cnt & PKT4_MAX_COUNT)
        | (odd_parity_bit(cnt) << 7)
        | ((reg & 0x3ffff) << 8)
        | (odd_parity_bit(reg) << 27)
}

pub const fn pkt7_hdr(opcode: CpOpcode, cnt: u32) -> u32 {
    let op = opcode as u32;
    CP_TYPE7_PKT
        | (cnt & PKT7_MAX_COUNT)
        | (odd_parity_bit(cnt) << 15)
        | ((op & 0x7f) << 16)
        | (odd_parity_bit(op) << 23)
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CpOpcode {
    Nop = 0x10,
    LoadState6Geom = 0x32,
    LoadState6Frag = 0x34,
    LoadState6 = 0x36,
    SetDrawState = 0x43,
    ContextRegBunch = 0x5c,
}

impl CpOpcode {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x10 => Some(Self::Nop),
            0x32 => Some(Self::LoadState6Geom),
            0x34 => Some(Self::LoadState6Frag),
            0x36 => Some(Self::LoadState6),
            0x43 => Some(Self::SetDrawState),
            0x5c => Some(Self::ContextRegBunch),
            _ => None,
        }
    }
}

/// `CP_LOAD_STATE6` state type.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateType {
    Shader = 0,
    Constants = 1,
    Ubo = 2,
    Ibo = 3,
}

/// `CP_LOAD_STATE6` state source.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateSrc {
    Direct = 0,
    Bindless = 1,
    Indirect = 2,
    Ubo = 3,
}

/// `CP_LOAD_STATE6` destination state block.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateBlock {
    VsTex = 0,
    HsTex = 1,
    DsTex = 2,
    GsTex = 3,
    FsTex = 4,
    CsTex = 5,
    VsShader = 8,
    HsShader = 9,
    DsShader = 10,
    GsShader = 11,
    FsShader = 12,
    CsShader = 13,
    Ibo = 14,
    CsIbo = 15,
}

impl StateBlock {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::VsTex),
            1 => Some(Self::HsTex),
            2 => Some(Self::DsTex),
            3 => Some(Self::GsTex),
            4 => Some(Self::FsTex),
            5 => Some(Self::CsTex),
            8 => Some(Self::VsShader),
            9 => Some(Self::HsShader),
            10 => Some(Self::DsShader),
            11 => Some(Self::GsShader),
            12 => Some(Self::FsShader),
            13 => Some(Self::CsShader),
            14 => Some(Self::Ibo),
            15 => Some(Self::CsIbo),
            _ => None,
        }
    }
}

/// Largest unit count dword 0 of `CP_LOAD_STATE6` can carry.
pub const LOAD_STATE6_MAX_UNITS: u32 = 0x3ff;

/// Dword 0 of a `CP_LOAD_STATE6*` packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadState6Dw0 {
    pub dst_off: u32,
    pub state_type: StateType,
    pub state_src: StateSrc,
    pub state_block: StateBlock,
    pub num_unit: u32,
}

impl LoadState6Dw0 {
    pub const fn value(&self) -> u32 {
        (self.dst_off & 0x3fff)
            | ((self.state_type as u32) << 14)
            | ((self.state_src as u32) << 16)
            | ((self.state_block as u32) << 18)
            | ((self.num_unit & LOAD_STATE6_MAX_UNITS) << 22)
    }

    pub fn decode(v: u32) -> Option<Self> {
        let state_type = match (v >> 14) & 0x3 {
            0 => StateType::Shader,
            1 => StateType::Constants,
            2 => StateType::Ubo,
            _ => StateType::Ibo,
        };
        let state_src = match (v >> 16) & 0x3 {
            0 => StateSrc::Direct,
            1 => StateSrc::Bindless,
            2 => StateSrc::Indirect,
            _ => StateSrc::Ubo,
        };
        Some(Self {
            dst_off: v & 0x3fff,
            state_type,
            state_src,
            state_block: StateBlock::from_u32((v >> 18) & 0xf)?,
            num_unit: v >> 22,
        })
    }
}

/// Bindless/indirect source address of a `CP_LOAD_STATE6` packet (dwords 1 and 2).
///
/// For bindless loads the upper bits select the descriptor set the offset is relative to.
pub const fn load_state6_bindless_addr(offset: u32, base: u32) -> u64 {
    (offset as u64) | ((base as u64) << 28)
}
