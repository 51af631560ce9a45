//! Per-stage shader configuration: control/config registers, the binary address and the
//! compile-time immediates.

use a6xx_protocol::pm4::{LoadState6Dw0, StateSrc, StateType};
use a6xx_protocol::regs::{
    hlsq_cs_cntl_0, hlsq_xs_cntl, HlsqInvalidate, SpXsConfig, SpXsCtrlReg0, ThreadSize, HLSQ_CS_CNTL,
    HLSQ_CS_CNTL_0, HLSQ_DS_CNTL, HLSQ_FS_CNTL, HLSQ_GS_CNTL, HLSQ_HS_CNTL, HLSQ_INVALIDATE_CMD, HLSQ_VS_CNTL,
    SP_CS_CONFIG, SP_CS_CTRL_REG0, SP_CS_OBJ_START_LO, SP_CS_UNKNOWN_A9B1, SP_DS_CONFIG, SP_DS_CTRL_REG0,
    SP_DS_OBJ_START_LO, SP_FS_CONFIG, SP_FS_CTRL_REG0, SP_FS_OBJ_START_LO, SP_GS_CONFIG, SP_GS_CTRL_REG0,
    SP_GS_OBJ_START_LO, SP_HS_CONFIG, SP_HS_CTRL_REG0, SP_HS_OBJ_START_LO, SP_VS_CONFIG, SP_VS_CTRL_REG0,
    SP_VS_OBJ_START_LO,
};
use a6xx_protocol::{CsWriter, Reg};

use crate::shader::{ShaderVariant, SystemValue};
use crate::types::{ShaderStage, SHADER_STAGE_COUNT};

/// Shader binaries must start on an instruction-fetch unit.
pub const SHADER_ALIGN_BYTES: u64 = 128;

struct XsRegs {
    ctrl: u16,
    config: u16,
    hlsq_cntl: u16,
    obj_start: u16,
}

const XS_REGS: [XsRegs; SHADER_STAGE_COUNT] = [
    XsRegs {
        ctrl: SP_VS_CTRL_REG0,
        config: SP_VS_CONFIG,
        hlsq_cntl: HLSQ_VS_CNTL,
        obj_start: SP_VS_OBJ_START_LO,
    },
    XsRegs {
        ctrl: SP_HS_CTRL_REG0,
        config: SP_HS_CONFIG,
        hlsq_cntl: HLSQ_HS_CNTL,
        obj_start: SP_HS_OBJ_START_LO,
    },
    XsRegs {
        ctrl: SP_DS_CTRL_REG0,
        config: SP_DS_CONFIG,
        hlsq_cntl: HLSQ_DS_CNTL,
        obj_start: SP_DS_OBJ_START_LO,
    },
    XsRegs {
        ctrl: SP_GS_CTRL_REG0,
        config: SP_GS_CONFIG,
        hlsq_cntl: HLSQ_GS_CNTL,
        obj_start: SP_GS_OBJ_START_LO,
    },
    XsRegs {
        ctrl: SP_FS_CTRL_REG0,
        config: SP_FS_CONFIG,
        hlsq_cntl: HLSQ_FS_CNTL,
        obj_start: SP_FS_OBJ_START_LO,
    },
    XsRegs {
        ctrl: SP_CS_CTRL_REG0,
        config: SP_CS_CONFIG,
        hlsq_cntl: HLSQ_CS_CNTL,
        obj_start: SP_CS_OBJ_START_LO,
    },
];

/// Programs `stage` to run `xs` from `binary_iova`, or switches it off when `xs` is `None`.
///
/// Panics if `binary_iova` is not aligned to [`SHADER_ALIGN_BYTES`].
pub fn emit_xs_config(cs: &mut CsWriter, stage: ShaderStage, xs: Option<&ShaderVariant>, binary_iova: u64) {
    let cfg = &XS_REGS[stage.index()];

    let Some(xs) = xs else {
        // Disabled stages are still programmed; later units read the enable bits.
        cs.emit_write_reg(cfg.config, 0);
        cs.emit_write_reg(cfg.hlsq_cntl, 0);
        return;
    };

    let is_fs = xs.stage == ShaderStage::Fragment;
    // Matches what the vendor driver programs; the field's meaning is not known.
    let threadsize = if xs.stage == ShaderStage::Geometry {
        ThreadSize::TwoQuads
    } else {
        ThreadSize::FourQuads
    };

    cs.emit_write_reg(
        cfg.ctrl,
        SpXsCtrlReg0 {
            threadsize,
            fullregfootprint: (xs.max_reg + 1) as u32,
            halfregfootprint: (xs.max_half_reg + 1) as u32,
            mergedregs: xs.mergedregs,
            branchstack: xs.branchstack,
            pixlodenable: xs.need_pixlod,
            diff_fine: xs.need_fine_derivatives,
            varying: is_fs && xs.total_in > 0,
            unk24: is_fs,
        }
        .value(),
    );

    cs.emit_pkt4(cfg.config, 2);
    cs.emit(
        SpXsConfig {
            enabled: true,
            bindless_tex: xs.bindless_tex,
            bindless_samp: xs.bindless_samp,
            bindless_ibo: xs.bindless_ibo,
            bindless_ubo: xs.bindless_ubo,
            ntex: xs.num_samp,
            nsamp: xs.num_samp,
            nibo: 0,
        }
        .value(),
    );
    cs.emit(xs.instrlen);

    cs.emit_write_reg(cfg.hlsq_cntl, hlsq_xs_cntl(xs.constlen, true));

    assert!(
        binary_iova % SHADER_ALIGN_BYTES == 0,
        "shader binary at {binary_iova:#x} is not aligned to {SHADER_ALIGN_BYTES} bytes"
    );
    cs.emit_pkt4(cfg.obj_start, 2);
    cs.emit_qw(binary_iova);

    cs.emit_pkt7(stage.load_state_opcode(), 3);
    cs.emit(
        LoadState6Dw0 {
            dst_off: 0,
            state_type: StateType::Shader,
            state_src: StateSrc::Indirect,
            state_block: stage.shader_state_block(),
            num_unit: xs.instrlen,
        }
        .value(),
    );
    cs.emit_qw(binary_iova);

    emit_immediates(cs, stage, xs);
}

fn emit_immediates(cs: &mut CsWriter, stage: ShaderStage, xs: &ShaderVariant) {
    let const_state = &xs.const_state;
    let base = const_state.offsets.immediate as i64;
    let size = const_state.immediates.len().div_ceil(4) as i64;
    // Never write constants past what the shader declared.
    let size = (size + base).min(i64::from(xs.constlen)) - base;
    if size <= 0 {
        return;
    }
    let size = size as u32;

    cs.emit_pkt7(stage.load_state_opcode(), 3 + size * 4);
    cs.emit(
        LoadState6Dw0 {
            dst_off: base as u32,
            state_type: StateType::Constants,
            state_src: StateSrc::Direct,
            state_block: stage.shader_state_block(),
            num_unit: size,
        }
        .value(),
    );
    cs.emit(0);
    cs.emit(0);
    let n = (size * 4) as usize;
    let imm = &const_state.immediates;
    cs.emit_array(&imm[..n.min(imm.len())]);
    for _ in imm.len()..n {
        cs.emit(0);
    }
}

/// Full compute program: invalidation, stage config and work-group id wiring.
pub fn emit_cs_config(cs: &mut CsWriter, v: &ShaderVariant, binary_iova: u64) {
    cs.emit_regs(&[Reg::new(
        HLSQ_INVALIDATE_CMD,
        (HlsqInvalidate::CS_STATE | HlsqInvalidate::CS_IBO).bits(),
    )]);

    emit_xs_config(cs, ShaderStage::Compute, Some(v), binary_iova);

    cs.emit_write_reg(SP_CS_UNKNOWN_A9B1, 0x41);

    let local_invocation_id = v.find_sysval_regid(SystemValue::LocalInvocationId);
    let work_group_id = v.find_sysval_regid(SystemValue::WorkGroupId);

    cs.emit_pkt4(HLSQ_CS_CNTL_0, 2);
    cs.emit(hlsq_cs_cntl_0(work_group_id, local_invocation_id));
    // HLSQ_CS_UNKNOWN_B998
    cs.emit(0x2fc);
}
