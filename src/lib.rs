//! A CFI-driven stack frame unwinding core.
//!
//! Given a current frame — a program counter and a set of architectural
//! registers — and access to a module's Call Frame Information (CFI)
//! and a read-only view of the target's memory, [`unwind_step`] computes
//! the previous (caller) frame, reports that the outermost frame has
//! been reached, or reports that unwinding failed.
//!
//! This crate does not parse `.eh_frame`/`.debug_frame` bytes, walk ELF
//! program headers, or resolve symbols; those are external collaborators
//! described here only by the traits in [`cfi`] and [`module`] that this
//! engine consumes. What lives here is the part that's hard to get
//! right: the DWARF expression interpreter ([`expr`]), the per-register
//! recovery state machine ([`apply`]), the entry-function termination
//! heuristic ([`entry`]), and the orchestration that ties them together
//! ([`unwinder`]).

mod apply;
mod entry;
mod expr;
mod frame;
mod regs;
mod unwinder;

pub mod cfi;
pub mod error;
pub mod memory;
pub mod module;

pub use error::Error;
pub use expr::{evaluate, Atom, EvalResult, Op};
pub use frame::{FrameState, PcState, SessionConfig, UnwindSession};
pub use memory::{CoreImageMemory, CoreSegment, Endian, LiveTask, LiveTaskMemory, MemoryView, WordWidth};
pub use regs::RegisterFile;
pub use unwinder::{unwind_step, StepOutcome, UnwindIterator};
