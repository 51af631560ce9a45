//! Packing of producer outputs into the varying locations the next stage reads.

use a6xx_protocol::pm4::CpOpcode;
use a6xx_protocol::regs::{
    valid_reg, vpc_so_buf_cntl_buf, vpc_so_ncomp, vpc_so_prog_a, vpc_so_prog_b, INVALID_REG, VPC_SO_BUF_CNTL,
    VPC_SO_BUF_CNTL_ENABLE, VPC_SO_CNTL, VPC_SO_CNTL_ENABLE, VPC_SO_PROG,
};
use a6xx_protocol::CsWriter;

use crate::shader::{InputSlot, OutputSlot, ShaderVariant, VaryingSlot};
use crate::types::ShaderStage;

/// Hardware limit on output registers routed to the VPC.
pub const MAX_LINKAGE_VARS: usize = 32;
/// Location value meaning "not linked".
pub const NO_LOC: u32 = 0xff;

const MAX_SO_BUFFERS: usize = 4;

pub(crate) fn last_bit(x: u32) -> u32 {
    u32::BITS - x.leading_zeros()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkVar {
    pub regid: u8,
    pub compmask: u8,
    pub loc: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Linkage {
    pub vars: Vec<LinkVar>,
    /// One past the highest location in use.
    pub max_loc: u32,
    /// Locations read by the consumer, one bit per component.
    pub varmask: [u32; 4],
    /// Location of a primitive id the producer does not write, or [`NO_LOC`].
    pub primid_loc: u32,
}

impl Default for Linkage {
    fn default() -> Self {
        Self {
            vars: Vec::new(),
            max_loc: 0,
            varmask: [0; 4],
            primid_loc: NO_LOC,
        }
    }
}

impl Linkage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Reserves `compmask`'s components at `loc` and routes `regid` there. An invalid
    /// register only reserves the locations.
    pub fn add(&mut self, regid: u8, compmask: u8, loc: u32) {
        let width = last_bit(u32::from(compmask));
        for comp in loc..loc + width {
            self.varmask[(comp / 32) as usize] |= 1 << (comp % 32);
        }
        self.max_loc = self.max_loc.max(loc + width);

        if valid_reg(regid) {
            assert!(self.vars.len() < MAX_LINKAGE_VARS, "linkage has more than {MAX_LINKAGE_VARS} outputs");
            self.vars.push(LinkVar { regid, compmask, loc });
        }
    }

    fn position_of(&self, regid: u8) -> Option<usize> {
        self.vars.iter().position(|v| v.regid == regid)
    }

    /// Routes every varying `fs` reads to the matching output of `producer`.
    pub fn link_shaders(&mut self, producer: &ShaderVariant, fs: &ShaderVariant) {
        self.primid_loc = NO_LOC;

        for j in fs.varyings() {
            if self.vars.len() >= MAX_LINKAGE_VARS {
                break;
            }
            let input = &fs.inputs[j];
            if input.inloc >= fs.total_in {
                continue;
            }

            let k = match input.slot {
                InputSlot::Varying(slot) => producer.find_output(slot),
                _ => None,
            };
            if k.is_none() && input.slot == InputSlot::Varying(VaryingSlot::PrimitiveId) {
                self.primid_loc = input.inloc;
            }

            let regid = k.map_or(INVALID_REG, |k| producer.outputs[k].regid);
            self.add(regid, input.compmask, input.inloc);
        }
    }

    /// Makes sure every streamed-out output of `v` is linked with at least the components
    /// stream-out reads, even if the fragment shader does not consume it.
    pub fn link_streamout(&mut self, v: &ShaderVariant) {
        for out in &v.stream_output.outputs {
            let Some(output) = v.outputs.get(out.register_index as usize) else {
                continue;
            };
            // Position and point size are appended last by the caller.
            if matches!(
                output.slot,
                OutputSlot::Varying(VaryingSlot::Pos) | OutputSlot::Varying(VaryingSlot::Psiz)
            ) {
                continue;
            }

            let compmask = ((1u32 << (out.num_components + out.start_component)) - 1) as u8;

            let idx = match self.position_of(output.regid) {
                Some(idx) => idx,
                None => {
                    let nextloc = self.vars.iter().map(|v| v.loc + 4).max().unwrap_or(0);
                    let idx = self.vars.len();
                    self.add(output.regid, compmask, nextloc);
                    idx
                }
            };

            let Some(var) = self.vars.get_mut(idx) else {
                continue;
            };
            if compmask & !var.compmask != 0 {
                var.compmask |= compmask;
                self.max_loc = self.max_loc.max(var.loc + last_bit(u32::from(var.compmask)));
            }
        }
    }
}

/// Local-memory locations of `producer` outputs, indexed by the driver location of the
/// matching `consumer` input.
///
/// HS and GS read their inputs with byte offsets, DS with dword offsets.
pub fn link_geometry_stages(producer: &ShaderVariant, consumer: &ShaderVariant) -> Vec<u32> {
    let factor = match consumer.stage {
        ShaderStage::TessCtrl | ShaderStage::Geometry => 4,
        ShaderStage::TessEval => 1,
        stage => panic!("{stage:?} does not read a primitive map"),
    };

    let mut locs = Vec::new();
    for input in &consumer.inputs {
        let InputSlot::Varying(slot) = input.slot else {
            continue;
        };
        for output in &producer.outputs {
            if output.slot != OutputSlot::Varying(slot) {
                continue;
            }
            let idx = input.inloc as usize;
            if locs.len() <= idx {
                locs.resize(idx + 1, 0);
            }
            locs[idx] = output.loc * factor;
        }
    }
    locs
}

/// Stream-out programming for the last geometry stage. Without stream-out the unit is
/// switched off.
pub fn emit_streamout(cs: &mut CsWriter, v: &ShaderVariant, l: &Linkage) {
    let info = &v.stream_output;

    if info.outputs.is_empty() {
        cs.emit_pkt7(CpOpcode::ContextRegBunch, 4);
        cs.emit(u32::from(VPC_SO_CNTL));
        cs.emit(0);
        cs.emit(u32::from(VPC_SO_BUF_CNTL));
        cs.emit(0);
        return;
    }

    let prog_count = l.max_loc.next_multiple_of(2) / 2;
    let mut prog = vec![0u32; prog_count as usize];
    let mut ncomp = [0u32; MAX_SO_BUFFERS];

    for out in &info.outputs {
        let Some(output) = v.outputs.get(out.register_index as usize) else {
            continue;
        };
        if !valid_reg(output.regid) {
            continue;
        }
        ncomp[out.output_buffer as usize] += out.num_components;

        let Some(var) = l.vars.iter().find(|var| var.regid == output.regid) else {
            continue;
        };

        for j in 0..out.num_components {
            let loc = var.loc + j + out.start_component;
            let off = (j + out.dst_offset) * 4;
            let entry = &mut prog[(loc / 2) as usize];
            if loc & 1 != 0 {
                *entry |= vpc_so_prog_b(out.output_buffer, off);
            } else {
                *entry |= vpc_so_prog_a(out.output_buffer, off);
            }
        }
    }

    let buf_cntl = ncomp
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .fold(VPC_SO_BUF_CNTL_ENABLE, |acc, (i, _)| acc | vpc_so_buf_cntl_buf(i as u32));

    cs.emit_pkt7(CpOpcode::ContextRegBunch, 12 + 2 * prog_count);
    cs.emit(u32::from(VPC_SO_BUF_CNTL));
    cs.emit(buf_cntl);
    for (i, n) in ncomp.iter().enumerate() {
        cs.emit(u32::from(vpc_so_ncomp(i as u32)));
        cs.emit(*n);
    }
    // Writing SO_CNTL resets the program pointer.
    cs.emit(u32::from(VPC_SO_CNTL));
    cs.emit(VPC_SO_CNTL_ENABLE);
    for p in prog {
        cs.emit(u32::from(VPC_SO_PROG));
        cs.emit(p);
    }
}
