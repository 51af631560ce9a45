//! Stream inspection: walk PM4 packets and replay register writes.
//!
//! Used by tests and tooling to check what a state block programs without depending on its
//! exact packet grouping.

use thiserror::Error;

use crate::pm4::{odd_parity_bit, CpOpcode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown packet type {found:#x} at dword {offset}")]
    UnknownPacketType { offset: usize, found: u32 },
    #[error("bad header parity at dword {offset}")]
    BadParity { offset: usize },
    #[error("packet at dword {offset} overruns the stream ({count} payload dwords, {available} left)")]
    Overrun {
        offset: usize,
        count: usize,
        available: usize,
    },
    #[error("odd CP_CONTEXT_REG_BUNCH payload at dword {offset}")]
    OddRegBunch { offset: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Packet<'a> {
    Type4 { reg: u16, payload: &'a [u32] },
    Type7 { opcode: u8, payload: &'a [u32] },
}

impl Packet<'_> {
    pub fn opcode(&self) -> Option<CpOpcode> {
        match self {
            Packet::Type7 { opcode, .. } => CpOpcode::from_u8(*opcode),
            Packet::Type4 { .. } => None,
        }
    }

    pub fn payload(&self) -> &[u32] {
        match self {
            Packet::Type4 { payload, .. } | Packet::Type7 { payload, .. } => payload,
        }
    }
}

/// Iterator over the packets of a dword stream.
#[derive(Clone, Debug)]
pub struct PacketIter<'a> {
    words: &'a [u32],
    pos: usize,
}

impl<'a> PacketIter<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, pos: 0 }
    }

    fn next_packet(&mut self) -> Result<Packet<'a>, DecodeError> {
        let offset = self.pos;
        let hdr = self.words[offset];
        let (count, packet) = match hdr >> 28 {
            4 => {
                let count = hdr & 0x7f;
                let reg = (hdr >> 8) & 0x3ffff;
                if (hdr >> 7) & 1 != odd_parity_bit(count) || (hdr >> 27) & 1 != odd_parity_bit(reg) {
                    return Err(DecodeError::BadParity { offset });
                }
                (count as usize, PacketKind::Type4(reg as u16))
            }
            7 => {
                let count = hdr & 0x3fff;
                let opcode = (hdr >> 16) & 0x7f;
                if (hdr >> 15) & 1 != odd_parity_bit(count) || (hdr >> 23) & 1 != odd_parity_bit(opcode) {
                    return Err(DecodeError::BadParity { offset });
                }
                (count as usize, PacketKind::Type7(opcode as u8))
            }
            found => return Err(DecodeError::UnknownPacketType { offset, found }),
        };

        let available = self.words.len() - offset - 1;
        if count > available {
            return Err(DecodeError::Overrun {
                offset,
                count,
                available,
            });
        }
        let payload = &self.words[offset + 1..offset + 1 + count];
        self.pos = offset + 1 + count;
        Ok(match packet {
            PacketKind::Type4(reg) => Packet::Type4 { reg, payload },
            PacketKind::Type7(opcode) => Packet::Type7 { opcode, payload },
        })
    }
}

enum PacketKind {
    Type4(u16),
    Type7(u8),
}

impl<'a> Iterator for PacketIter<'a> {
    type Item = Result<Packet<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.words.len() {
            return None;
        }
        let res = self.next_packet();
        if res.is_err() {
            // Stop after the first malformed packet.
            self.pos = self.words.len();
        }
        Some(res)
    }
}

/// Register writes and opcode packets of a stream, in order.
///
/// `CP_CONTEXT_REG_BUNCH` payloads are expanded into individual register writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterWrites {
    pub writes: Vec<(u16, u32)>,
    pub packets: Vec<(u8, Vec<u32>)>,
}

impl RegisterWrites {
    pub fn decode(words: &[u32]) -> Result<Self, DecodeError> {
        let mut out = Self::default();
        let mut offset = 0usize;
        for pkt in PacketIter::new(words) {
            let pkt = pkt?;
            match pkt {
                Packet::Type4 { reg, payload } => {
                    out.writes
                        .extend(payload.iter().enumerate().map(|(i, &v)| (reg + i as u16, v)));
                }
                Packet::Type7 { opcode, payload } => {
                    if CpOpcode::from_u8(opcode) == Some(CpOpcode::ContextRegBunch) {
                        if payload.len() % 2 != 0 {
                            return Err(DecodeError::OddRegBunch { offset });
                        }
                        out.writes
                            .extend(payload.chunks_exact(2).map(|p| (p[0] as u16, p[1])));
                    } else {
                        out.packets.push((opcode, payload.to_vec()));
                    }
                }
            }
            offset += 1 + pkt.payload().len();
        }
        Ok(out)
    }

    /// Last value written to `reg`.
    pub fn get(&self, reg: u16) -> Option<u32> {
        self.writes.iter().rev().find(|(r, _)| *r == reg).map(|(_, v)| *v)
    }

    pub fn contains(&self, reg: u16) -> bool {
        self.writes.iter().any(|(r, _)| *r == reg)
    }

    /// Payloads of every opcode packet matching `opcode`.
    pub fn packets_of(&self, opcode: CpOpcode) -> impl Iterator<Item = &[u32]> + '_ {
        self.packets
            .iter()
            .filter(move |(op, _)| *op == opcode as u8)
            .map(|(_, p)| p.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_writer::CsWriter;
    use crate::regs::Reg;

    #[test]
    fn walks_mixed_packets() {
        let mut w = CsWriter::unbounded();
        w.emit_regs(&[Reg::new(0x8010, 1), Reg::new(0x8011, 2)]);
        w.emit_pkt7(CpOpcode::ContextRegBunch, 2);
        w.emit(0x9216);
        w.emit(0);
        w.emit_pkt7(CpOpcode::LoadState6, 1);
        w.emit(0xdead);

        let regs = RegisterWrites::decode(w.words()).unwrap();
        assert_eq!(regs.writes, vec![(0x8010, 1), (0x8011, 2), (0x9216, 0)]);
        assert_eq!(regs.packets_of(CpOpcode::LoadState6).count(), 1);
        assert_eq!(regs.get(0x8011), Some(2));
    }

    #[test]
    fn truncated_packet_is_an_overrun() {
        let mut w = CsWriter::unbounded();
        w.emit_write_reg(0x8000, 5);
        let words = &w.words()[..1];
        let err = PacketIter::new(words).next().unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::Overrun { offset: 0, count: 1, .. }));
    }
}
