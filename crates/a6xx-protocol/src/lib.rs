//! Adreno a6xx command-processor vocabulary.
//!
//! This crate knows how to encode PM4 packets and a6xx register values, and owns the
//! command-stream primitive that pipeline state is recorded into. It has no notion of
//! pipelines or shaders; see `a6xx-pipeline` for that.

pub mod cmd_writer;
pub mod decode;
pub mod fmt;
pub mod pm4;
pub mod regs;

pub use cmd_writer::{
    AllocError, BufferAllocator, BufferObject, CmdStream, CsWriter, DrawState, LinearAllocator,
};
pub use regs::Reg;
