//! Command-stream writer and the pipeline-owned command buffer.
//!
//! A [`CmdStream`] owns exactly one buffer object, reserved once with its final size. State
//! blocks are recorded through [`CsWriter`] sub-streams carved out of that reservation, and
//! each finished sub-stream is referenced afterwards by a [`DrawState`].
//!
//! Writing past a sub-stream's bound, or reserving past the end of the buffer, is an
//! internal sizing bug and panics; nothing here reallocates.

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::pm4::{pkt4_hdr, pkt7_hdr, CpOpcode, PKT4_MAX_COUNT, PKT7_MAX_COUNT};
use crate::regs::Reg;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("out of device memory (requested {requested} bytes, {available} available)")]
    OutOfDeviceMemory { requested: u64, available: u64 },
}

/// A device-addressable allocation handed out by a [`BufferAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferObject {
    pub id: u32,
    pub iova: u64,
    pub size_bytes: u64,
}

/// Device memory provider for command buffers.
///
/// Returned buffers must be aligned to at least 128 bytes, the instruction-fetch granularity.
pub trait BufferAllocator: fmt::Debug + Send + Sync {
    fn allocate(&self, size_bytes: u64) -> Result<BufferObject, AllocError>;
    fn free(&self, bo: BufferObject);
}

#[derive(Debug)]
struct LinearAllocatorState {
    next_id: u32,
    next_iova: u64,
    live_bytes: u64,
    live: Vec<BufferObject>,
}

/// Bump allocator over a fake device address space with an optional byte budget.
///
/// Freed ranges are not reused; only the live byte count is returned to the budget.
#[derive(Debug)]
pub struct LinearAllocator {
    budget: Option<u64>,
    state: Mutex<LinearAllocatorState>,
}

impl LinearAllocator {
    pub const BASE_IOVA: u64 = 0x1_0000_0000;
    pub const ALIGNMENT: u64 = 4096;

    pub fn new() -> Self {
        Self::with_budget(None)
    }

    pub fn with_budget(budget: Option<u64>) -> Self {
        Self {
            budget,
            state: Mutex::new(LinearAllocatorState {
                next_id: 1,
                next_iova: Self::BASE_IOVA,
                live_bytes: 0,
                live: Vec::new(),
            }),
        }
    }

    pub fn live_bytes(&self) -> u64 {
        self.lock().live_bytes
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LinearAllocatorState> {
        // A panic while holding the lock leaves the bookkeeping consistent; keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for LinearAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferAllocator for LinearAllocator {
    fn allocate(&self, size_bytes: u64) -> Result<BufferObject, AllocError> {
        let mut st = self.lock();
        if let Some(budget) = self.budget {
            let available = budget.saturating_sub(st.live_bytes);
            if size_bytes > available {
                return Err(AllocError::OutOfDeviceMemory {
                    requested: size_bytes,
                    available,
                });
            }
        }

        let bo = BufferObject {
            id: st.next_id,
            iova: st.next_iova,
            size_bytes,
        };
        st.next_id += 1;
        st.next_iova += size_bytes.div_ceil(Self::ALIGNMENT).max(1) * Self::ALIGNMENT;
        st.live_bytes += size_bytes;
        st.live.push(bo);
        Ok(bo)
    }

    fn free(&self, bo: BufferObject) {
        let mut st = self.lock();
        if let Some(pos) = st.live.iter().position(|b| b.id == bo.id) {
            st.live.swap_remove(pos);
            st.live_bytes -= bo.size_bytes;
        }
    }
}

/// Reference to a finished block of commands inside a [`CmdStream`].
///
/// `size == 0` means "nothing recorded" (an empty or skipped state block).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawState {
    pub iova: u64,
    /// Offset in dwords from the start of the owning stream.
    pub offset: u32,
    /// Size in dwords.
    pub size: u32,
}

impl DrawState {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Packet writer with a hard dword bound.
#[derive(Debug, Clone)]
pub struct CsWriter {
    words: Vec<u32>,
    limit: usize,
    exact: bool,
    base: usize,
    iova: u64,
}

impl CsWriter {
    /// A writer not backed by any stream, for callers that record state outside a pipeline
    /// (per-draw dynamic state, tests).
    pub fn unbounded() -> Self {
        Self {
            words: Vec::new(),
            limit: usize::MAX,
            exact: false,
            base: 0,
            iova: 0,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            words: Vec::with_capacity(limit),
            limit,
            ..Self::unbounded()
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.words.len()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    fn ensure(&self, n: usize) {
        assert!(
            n <= self.remaining(),
            "command stream overflow: {} dwords written, {} more requested, limit {}",
            self.words.len(),
            n,
            self.limit
        );
    }

    pub fn emit(&mut self, v: u32) {
        self.ensure(1);
        self.words.push(v);
    }

    pub fn emit_qw(&mut self, v: u64) {
        self.ensure(2);
        self.words.push(v as u32);
        self.words.push((v >> 32) as u32);
    }

    pub fn emit_array(&mut self, v: &[u32]) {
        self.ensure(v.len());
        self.words.extend_from_slice(v);
    }

    /// Type-4 header; the caller follows with `cnt` register values.
    pub fn emit_pkt4(&mut self, reg: u16, cnt: u32) {
        assert!(cnt <= PKT4_MAX_COUNT, "pkt4 count {cnt} too large");
        self.ensure(1 + cnt as usize);
        self.words.push(pkt4_hdr(reg, cnt));
    }

    /// Type-7 header; the caller follows with `cnt` payload dwords.
    pub fn emit_pkt7(&mut self, opcode: CpOpcode, cnt: u32) {
        assert!(cnt <= PKT7_MAX_COUNT, "pkt7 count {cnt} too large");
        self.ensure(1 + cnt as usize);
        self.words.push(pkt7_hdr(opcode, cnt));
    }

    /// Writes a run of consecutive registers as a single type-4 packet.
    pub fn emit_regs(&mut self, regs: &[Reg]) {
        let Some(first) = regs.first() else {
            return;
        };
        for (i, r) in regs.iter().enumerate() {
            assert_eq!(
                r.addr as usize,
                first.addr as usize + i,
                "emit_regs needs consecutive registers"
            );
        }
        self.emit_pkt4(first.addr, regs.len() as u32);
        for r in regs {
            self.words.push(r.value);
        }
    }

    pub fn emit_write_reg(&mut self, addr: u16, value: u32) {
        self.emit_pkt4(addr, 1);
        self.words.push(value);
    }
}

/// Exclusively owned command buffer of one pipeline.
///
/// The backing buffer goes back to its allocator on [`CmdStream::release`] or on drop.
#[derive(Debug, Default)]
pub struct CmdStream {
    bo: Option<BufferObject>,
    allocator: Option<Arc<dyn BufferAllocator>>,
    words: Vec<u32>,
    cur: usize,
    open: bool,
}

impl CmdStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the backing buffer. May be called once per stream.
    pub fn reserve(&mut self, allocator: Arc<dyn BufferAllocator>, size_dwords: u32) -> Result<(), AllocError> {
        assert!(self.bo.is_none(), "command stream reserved twice");
        let bo = allocator.allocate(u64::from(size_dwords) * 4)?;
        tracing::trace!(iova = bo.iova, size_dwords, "reserved command stream");
        self.bo = Some(bo);
        self.allocator = Some(allocator);
        self.words = vec![0; size_dwords as usize];
        self.cur = 0;
        Ok(())
    }

    /// Returns the backing buffer to the allocator it came from. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if let (Some(bo), Some(allocator)) = (self.bo.take(), self.allocator.take()) {
            tracing::trace!(iova = bo.iova, "released command stream");
            allocator.free(bo);
        }
        self.words = Vec::new();
        self.cur = 0;
    }

    /// Number of buffer objects backing this stream (never more than one).
    pub fn bo_count(&self) -> usize {
        usize::from(self.bo.is_some())
    }

    pub fn bo(&self) -> Option<&BufferObject> {
        self.bo.as_ref()
    }

    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    pub fn used(&self) -> usize {
        self.cur
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.cur
    }

    fn iova_at(&self, offset: usize) -> u64 {
        let base = self.bo.map(|bo| bo.iova).unwrap_or(0);
        base + (offset as u64) * 4
    }

    fn claim(&mut self, size: usize) -> usize {
        assert!(!self.open, "a sub-stream is still open");
        assert!(
            size <= self.remaining(),
            "command stream reservation exceeded: {} dwords requested, {} remaining",
            size,
            self.remaining()
        );
        self.cur
    }

    /// Pads with zeros up to the next multiple of `align_dwords`.
    pub fn align(&mut self, align_dwords: usize) {
        let pad = self.cur.next_multiple_of(align_dwords) - self.cur;
        let offset = self.claim(pad);
        self.words[offset..offset + pad].fill(0);
        self.cur += pad;
    }

    /// Copies `data` into the stream and returns its device address.
    pub fn upload(&mut self, data: &[u32]) -> u64 {
        let offset = self.claim(data.len());
        self.words[offset..offset + data.len()].copy_from_slice(data);
        self.cur += data.len();
        self.iova_at(offset)
    }

    /// Opens a writer bounded by `max_dwords`; only the dwords actually written are consumed.
    pub fn begin_sub_stream(&mut self, max_dwords: usize) -> CsWriter {
        let base = self.claim(max_dwords);
        self.open = true;
        CsWriter {
            words: Vec::with_capacity(max_dwords),
            limit: max_dwords,
            exact: false,
            base,
            iova: self.iova_at(base),
        }
    }

    /// Opens a writer that must be filled with exactly `size_dwords` dwords.
    pub fn draw_state(&mut self, size_dwords: usize) -> CsWriter {
        let mut w = self.begin_sub_stream(size_dwords);
        w.exact = true;
        w
    }

    pub fn end_sub_stream(&mut self, w: CsWriter) -> DrawState {
        assert!(self.open, "no sub-stream open");
        assert_eq!(w.base, self.cur, "sub-stream ended out of order");
        if w.exact {
            assert_eq!(
                w.words.len(),
                w.limit,
                "draw state size mismatch: sized {} dwords, emitted {}",
                w.limit,
                w.words.len()
            );
        }
        self.open = false;

        let len = w.words.len();
        self.words[w.base..w.base + len].copy_from_slice(&w.words);
        self.cur += len;
        DrawState {
            iova: w.iova,
            offset: w.base as u32,
            size: len as u32,
        }
    }

    /// Contents of a finished draw state.
    pub fn words_of(&self, ds: DrawState) -> &[u32] {
        let start = ds.offset as usize;
        &self.words[start..start + ds.size as usize]
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words[..self.cur]
    }
}

impl Drop for CmdStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_exhaustion_reports_oom() {
        let alloc = Arc::new(LinearAllocator::with_budget(Some(64)));
        let mut cs = CmdStream::new();
        let err = cs.reserve(alloc.clone(), 32).unwrap_err();
        assert_eq!(
            err,
            AllocError::OutOfDeviceMemory {
                requested: 128,
                available: 64
            }
        );
        assert_eq!(cs.bo_count(), 0);
    }

    #[test]
    fn release_returns_bytes_to_budget() {
        let alloc = Arc::new(LinearAllocator::with_budget(Some(1024)));
        let mut cs = CmdStream::new();
        cs.reserve(alloc.clone(), 256).unwrap();
        assert_eq!(alloc.live_bytes(), 1024);
        cs.release();
        assert_eq!(alloc.live_bytes(), 0);
        assert_eq!(alloc.live_count(), 0);

        cs.release();
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn dropping_a_stream_frees_its_buffer() {
        let alloc = Arc::new(LinearAllocator::with_budget(Some(1024)));
        {
            let mut cs = CmdStream::new();
            cs.reserve(alloc.clone(), 256).unwrap();
            assert_eq!(alloc.live_count(), 1);
        }
        assert_eq!(alloc.live_count(), 0);
        assert_eq!(alloc.live_bytes(), 0);

        // An unreserved stream has nothing to hand back.
        drop(CmdStream::new());
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn sub_stream_only_consumes_what_was_written() {
        let alloc = Arc::new(LinearAllocator::new());
        let mut cs = CmdStream::new();
        cs.reserve(alloc.clone(), 64).unwrap();

        let mut w = cs.begin_sub_stream(32);
        w.emit_write_reg(0x8000, 1);
        let ds = cs.end_sub_stream(w);
        assert_eq!(ds.size, 2);
        assert_eq!(cs.used(), 2);
        assert_eq!(ds.iova, LinearAllocator::BASE_IOVA);

        let mut w = cs.draw_state(3);
        w.emit_regs(&[Reg::new(0x8001, 2), Reg::new(0x8002, 3)]);
        let ds2 = cs.end_sub_stream(w);
        assert_eq!(ds2.offset, 2);
        assert_eq!(cs.words_of(ds2)[1..], [2, 3]);
    }

    #[test]
    #[should_panic(expected = "draw state size mismatch")]
    fn exact_draw_state_rejects_short_fill() {
        let alloc = Arc::new(LinearAllocator::new());
        let mut cs = CmdStream::new();
        cs.reserve(alloc.clone(), 16).unwrap();
        let mut w = cs.draw_state(4);
        w.emit_write_reg(0x8000, 0);
        cs.end_sub_stream(w);
    }

    #[test]
    #[should_panic(expected = "command stream overflow")]
    fn bounded_writer_panics_on_overflow() {
        let mut w = CsWriter::with_limit(2);
        w.emit_write_reg(0x8000, 0);
        w.emit(0);
    }

    #[test]
    fn align_pads_to_the_next_boundary() {
        let alloc = Arc::new(LinearAllocator::new());
        let mut cs = CmdStream::new();
        cs.reserve(alloc.clone(), 64).unwrap();
        cs.upload(&[1, 2, 3]);
        cs.align(32);
        assert_eq!(cs.used(), 32);
        cs.align(32);
        assert_eq!(cs.used(), 32);
        let iova = cs.upload(&[4]);
        assert_eq!(iova % 128, 0);
        assert_eq!(cs.as_words()[3..32], [0; 29]);
    }

    #[test]
    #[should_panic(expected = "reservation exceeded")]
    fn upload_past_reservation_panics() {
        let alloc = Arc::new(LinearAllocator::new());
        let mut cs = CmdStream::new();
        cs.reserve(alloc.clone(), 4).unwrap();
        cs.upload(&[0; 8]);
    }
}
