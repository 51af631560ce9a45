//! Depth and stencil test state.

use a6xx_protocol::regs::{
    rb_depth_cntl_zfunc, rb_stencil_pair, RbDepthCntl, RbStencilControl, Reg, RB_ALPHA_CONTROL, RB_DEPTH_CNTL,
    RB_STENCILMASK, RB_STENCILREF, RB_STENCILWRMASK, RB_STENCIL_CONTROL, RB_Z_BOUNDS_MAX, RB_Z_BOUNDS_MIN,
};
use a6xx_protocol::CsWriter;

use super::{compare_func, stencil_op};
use crate::format::Format;
use crate::types::{DepthStencilState, RasterizationState};

pub const DEPTH_STENCIL_DWORDS: u32 = 6;
pub const DEPTH_BOUNDS_DWORDS: u32 = 3;
pub const STENCIL_PAIR_DWORDS: u32 = 2;

/// Depth and stencil state as the attachment allows it to apply.
///
/// Without an attachment both tests are off. A stencil-only attachment keeps the stencil
/// state but drops every depth test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveDepthStencil {
    pub stencil: DepthStencilState,
    pub depth: DepthStencilState,
}

impl EffectiveDepthStencil {
    pub fn new(state: Option<&DepthStencilState>, attachment: Option<Format>) -> Self {
        let stencil = match attachment {
            Some(_) => state.copied().unwrap_or_default(),
            None => DepthStencilState::default(),
        };
        let depth = match attachment {
            Some(f) if f.is_s8() => DepthStencilState::default(),
            _ => stencil,
        };
        Self { stencil, depth }
    }
}

pub fn rb_depth_cntl(ds: &DepthStencilState, rast: &RasterizationState) -> u32 {
    let mut cntl = RbDepthCntl::empty();
    let mut zfunc = 0;
    if ds.depth_test_enable {
        cntl |= RbDepthCntl::Z_ENABLE | RbDepthCntl::Z_TEST_ENABLE;
        zfunc = rb_depth_cntl_zfunc(compare_func(ds.depth_compare_op) as u32);
        cntl.set(RbDepthCntl::Z_CLAMP_ENABLE, rast.depth_clamp_enable);
        cntl.set(RbDepthCntl::Z_WRITE_ENABLE, ds.depth_write_enable);
    }
    if ds.depth_bounds_test_enable {
        cntl |= RbDepthCntl::Z_BOUNDS_ENABLE | RbDepthCntl::Z_TEST_ENABLE;
    }
    cntl.bits() | zfunc
}

pub fn rb_stencil_control(ds: &DepthStencilState) -> u32 {
    if !ds.stencil_test_enable {
        return 0;
    }
    let (front, back) = (&ds.front, &ds.back);
    RbStencilControl {
        stencil_enable: true,
        stencil_enable_bf: true,
        stencil_read: true,
        func: compare_func(front.compare_op) as u32,
        fail: stencil_op(front.fail_op) as u32,
        zpass: stencil_op(front.pass_op) as u32,
        zfail: stencil_op(front.depth_fail_op) as u32,
        func_bf: compare_func(back.compare_op) as u32,
        fail_bf: stencil_op(back.fail_op) as u32,
        zpass_bf: stencil_op(back.pass_op) as u32,
        zfail_bf: stencil_op(back.depth_fail_op) as u32,
    }
    .value()
}

pub fn emit_depth_stencil(cs: &mut CsWriter, ds: &EffectiveDepthStencil, rast: &RasterizationState) {
    cs.emit_regs(&[Reg::new(RB_ALPHA_CONTROL, 0)]);
    cs.emit_pkt4(RB_DEPTH_CNTL, 1);
    cs.emit(rb_depth_cntl(&ds.depth, rast));
    cs.emit_pkt4(RB_STENCIL_CONTROL, 1);
    cs.emit(rb_stencil_control(&ds.stencil));
}

pub fn emit_depth_bounds(cs: &mut CsWriter, min: f32, max: f32) {
    cs.emit_regs(&[Reg::float(RB_Z_BOUNDS_MIN, min), Reg::float(RB_Z_BOUNDS_MAX, max)]);
}

pub fn emit_stencil_compare_mask(cs: &mut CsWriter, front: u32, back: u32) {
    cs.emit_regs(&[Reg::new(RB_STENCILMASK, rb_stencil_pair(front & 0xff, back & 0xff))]);
}

pub fn emit_stencil_write_mask(cs: &mut CsWriter, front: u32, back: u32) {
    cs.emit_regs(&[Reg::new(RB_STENCILWRMASK, rb_stencil_pair(front & 0xff, back & 0xff))]);
}

pub fn emit_stencil_reference(cs: &mut CsWriter, front: u32, back: u32) {
    cs.emit_regs(&[Reg::new(RB_STENCILREF, rb_stencil_pair(front & 0xff, back & 0xff))]);
}
