//! The data model: [`FrameState`], [`PcState`], and the session that
//! owns a frame chain plus the target-wide configuration it was
//! unwound against.
//!
//! Source expresses the frame chain via raw back-pointers and a
//! session-owned `unwound` field (`Dwarf_Frame_State` in the ancestor
//! this is grounded on). We keep the chain as a straight `Box` link
//! (each frame owns the next-outer one once computed) and pass session
//! data — word width, register count, memory, module lookup — as
//! function parameters instead of a back-reference, which sidesteps the
//! aliasing a back-pointer would need while keeping the same
//! owns-the-next-frame-once-computed semantics.

use crate::error::ExpressionError;
use crate::memory::{Endian, MemoryView, WordWidth};
use crate::module::ModuleLookup;
use crate::regs::RegisterFile;

/// Classification of a [`FrameState`]'s PC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcState {
    /// The state is unusable for further unwinding.
    Error,
    /// `pc` is valid; unwinding may continue from here.
    PcSet,
    /// This is the outermost frame; unwinding terminates here.
    PcUndefined,
}

/// A complete snapshot of one logical stack frame.
pub struct FrameState {
    pub(crate) regs: RegisterFile,
    pub(crate) pc: u64,
    pub(crate) pc_state: PcState,
    pub(crate) signal_frame: bool,
    /// True only for the frame created directly from the caller-supplied
    /// initial registers; false for every frame produced by unwinding.
    /// Used by the return-address adjustment in
    /// [`crate::unwinder::unwind_step`].
    pub(crate) is_innermost: bool,
    pub(crate) unwound: Option<Box<FrameState>>,
    /// Set only when `pc_state` is [`PcState::Error`]: the expression
    /// failure that made the return-address register unrecoverable.
    pub(crate) error: Option<ExpressionError>,
}

impl FrameState {
    /// Construct the innermost frame of a new unwind from a PC and a
    /// register file. `signal_frame` should be set if this frame was
    /// entered via signal delivery (in which case no return-address
    /// adjustment is applied when unwinding from it).
    pub fn new_innermost(pc: u64, regs: RegisterFile, signal_frame: bool) -> Self {
        Self {
            regs,
            pc,
            pc_state: PcState::PcSet,
            signal_frame,
            is_innermost: true,
            unwound: None,
            error: None,
        }
    }

    pub(crate) fn new_unwound(regs: RegisterFile, signal_frame: bool) -> Self {
        Self {
            regs,
            pc: 0,
            pc_state: PcState::Error,
            signal_frame,
            is_innermost: false,
            unwound: None,
            error: None,
        }
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn pc_state(&self) -> PcState {
        self.pc_state
    }

    /// The expression failure that produced [`PcState::Error`], if any.
    pub fn error(&self) -> Option<ExpressionError> {
        self.error
    }

    pub fn signal_frame(&self) -> bool {
        self.signal_frame
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// The already-unwound caller frame, if `unwind_step` has been
    /// called on this frame before.
    pub fn unwound(&self) -> Option<&FrameState> {
        self.unwound.as_deref()
    }
}

/// Target-wide configuration fixed before an [`UnwindSession`] is built:
/// architecture word width, endianness, and register count, plus an
/// optional depth guard for the convenience iterator.
///
/// Grounded on the `AllocationPolicy`/`Cache` configuration surface in
/// this lineage, generalized from "how should the cache allocate" to
/// "what target is this session unwinding".
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub word_width: WordWidth,
    pub endian: Endian,
    pub register_count: usize,
    pub max_depth: Option<usize>,
}

impl SessionConfig {
    pub fn new(word_width: WordWidth, register_count: usize) -> Self {
        Self {
            word_width,
            endian: Endian::Little,
            register_count,
            max_depth: None,
        }
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Owns the target-wide data an unwind needs: the session configuration,
/// a read-only memory view, and a module lookup. Does not itself own a
/// particular frame chain — callers hold their own root [`FrameState`]
/// and advance it by calling [`crate::unwinder::unwind_step`].
pub struct UnwindSession<Mem, Mods> {
    pub config: SessionConfig,
    pub memory: Mem,
    pub modules: Mods,
}

impl<Mem: MemoryView, Mods: ModuleLookup> UnwindSession<Mem, Mods> {
    pub fn new(config: SessionConfig, memory: Mem, modules: Mods) -> Self {
        Self {
            config,
            memory,
            modules,
        }
    }

    pub fn new_root_frame(&self, pc: u64, regs: RegisterFile, signal_frame: bool) -> FrameState {
        debug_assert_eq!(regs.len(), self.config.register_count);
        FrameState::new_innermost(pc, regs, signal_frame)
    }
}
