//! Vertex fetch: strides per binding and one decode slot per consumed attribute.

use a6xx_protocol::regs::{
    vfd_control_0, vfd_decode_instr, vfd_decode_step_rate, vfd_dest_cntl, vfd_dest_cntl_instr, vfd_fetch_stride,
    Reg, VfdDecodeInstr, VFD_CONTROL_0,
};
use a6xx_protocol::CsWriter;

use crate::config::MAX_VBS;
use crate::shader::{InputSlot, ShaderVariant};
use crate::types::{VertexInputRate, VertexInputState};

/// Records the fetch state of `vs` and returns the mask of bindings the description declares.
///
/// Attributes the shader does not read get no decode slot. Formats and binding indices are
/// expected to have been validated.
pub fn emit_vertex_input(cs: &mut CsWriter, vs: &ShaderVariant, info: &VertexInputState) -> u32 {
    let mut bindings_used = 0u32;
    let mut binding_instanced = 0u32;
    let mut step_rate = [1u32; MAX_VBS as usize];

    for binding in &info.bindings {
        cs.emit_regs(&[Reg::new(vfd_fetch_stride(binding.binding), binding.stride)]);
        if binding.input_rate == VertexInputRate::Instance {
            binding_instanced |= 1 << binding.binding;
        }
        bindings_used |= 1 << binding.binding;
        step_rate[binding.binding as usize] = 1;
    }

    for div in &info.divisors {
        step_rate[div.binding as usize] = div.divisor;
    }

    let mut decode_idx = 0u32;
    for attr in &info.attributes {
        assert!(
            bindings_used & (1 << attr.binding) != 0,
            "attribute {} reads undeclared binding {}",
            attr.location,
            attr.binding
        );

        let Some(input) = vs.inputs.iter().find(|i| i.slot == InputSlot::Attrib(attr.location)) else {
            continue;
        };
        let Some((fmt, swap)) = attr.format.vertex_format() else {
            panic!("{:?} cannot be fetched as a vertex attribute", attr.format);
        };

        cs.emit_regs(&[
            Reg::new(
                vfd_decode_instr(decode_idx),
                VfdDecodeInstr {
                    idx: attr.binding,
                    offset: attr.offset,
                    instanced: binding_instanced & (1 << attr.binding) != 0,
                    format: fmt as u32,
                    swap: swap as u32,
                    unk30: true,
                    float: !attr.format.is_int(),
                }
                .value(),
            ),
            Reg::new(vfd_decode_step_rate(decode_idx), step_rate[attr.binding as usize]),
        ]);
        cs.emit_regs(&[Reg::new(
            vfd_dest_cntl(decode_idx),
            vfd_dest_cntl_instr(u32::from(input.compmask), input.regid),
        )]);

        decode_idx += 1;
    }

    cs.emit_regs(&[Reg::new(VFD_CONTROL_0, vfd_control_0(decode_idx, decode_idx))]);
    bindings_used
}
