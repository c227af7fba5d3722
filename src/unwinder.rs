//! The Unwinder: orchestrates one unwind step.
//!
//! Grounded on `dwfl_frame_unwind`/`handle_cfi` in this lineage's
//! `dwfl_frame_unwind.c` ancestor: resolve the module, try the
//! exception-handling CFI then the debug CFI, fall back to the
//! Entry-Function Oracle, and classify the Frame Rule Applier's result.

use fallible_iterator::FallibleIterator;
use log::{debug, trace};

use crate::apply::apply_frame_rules;
use crate::cfi::CfiProvider;
use crate::entry::is_in_entry_function;
use crate::error::{Error, ProviderError};
use crate::frame::{FrameState, PcState, UnwindSession};
use crate::module::Module;
use crate::memory::MemoryView;
use crate::module::ModuleLookup;

/// The outcome of one [`unwind_step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new current frame was produced; `state.unwound()` now holds it.
    Stepped,
    /// The previous frame was the outermost one.
    Terminal,
}

/// Compute the previous (caller) frame for `state`, updating
/// `state.unwound` in place.
///
/// If `state` already has an unwound child (a second call on the same
/// state), this short-circuits straight to classification without
/// touching the CFI or memory view again, so repeated calls are
/// idempotent.
pub fn unwind_step<Mem, Mods>(
    session: &UnwindSession<Mem, Mods>,
    state: &mut FrameState,
) -> Result<StepOutcome, Error>
where
    Mem: MemoryView,
    Mods: ModuleLookup,
{
    if let Some(unwound) = state.unwound.as_deref() {
        return classify(unwound.pc_state, unwound.error);
    }

    let mut pc = state.pc;
    if !state.is_innermost && !state.signal_frame {
        // The saved return address points at the instruction after the
        // call; the call site's unwind rules are keyed by the call
        // instruction itself.
        pc = pc.wrapping_sub(1);
    }

    let module = session.modules.module_of(pc).ok_or_else(|| {
        debug!("no module contains pc 0x{pc:x}");
        Error::NoDwarf
    })?;

    if let Some((cfi, bias)) = module.eh_cfi() {
        trace!("trying eh_frame CFI at pc 0x{pc:x}");
        if let Some(outcome) = try_cfi(session, state, cfi, bias, pc)? {
            return Ok(outcome);
        }
    }

    if let Some((cfi, bias)) = module.dwarf_cfi() {
        trace!("trying debug_frame CFI at pc 0x{pc:x}");
        if let Some(outcome) = try_cfi(session, state, cfi, bias, pc)? {
            return Ok(outcome);
        }
    }

    debug!("no CFI source covers pc 0x{pc:x}, consulting entry-function oracle");
    if is_in_entry_function(pc, module) {
        Ok(StepOutcome::Terminal)
    } else {
        Err(Error::NoDwarf)
    }
}

/// Try one CFI source. `Ok(Some(outcome))` means this source resolved
/// the step (successfully or terminally); `Ok(None)` means it had no
/// entry for this PC and the caller should fall through to the next
/// source; `Err` is terminal for the whole step (either a malformed CFI
/// table, or the Frame Rule Applier producing an unrecoverable frame).
fn try_cfi<Mem, Mods, C>(
    session: &UnwindSession<Mem, Mods>,
    state: &mut FrameState,
    cfi: &C,
    bias: u64,
    pc: u64,
) -> Result<Option<StepOutcome>, Error>
where
    Mem: MemoryView,
    Mods: ModuleLookup,
    C: CfiProvider,
{
    let frame = match cfi.addrframe(pc - bias) {
        Ok(Some(frame)) => frame,
        Ok(None) => return Ok(None),
        Err(ProviderError::Dwarf) => return Err(Error::Libdw),
        Err(ProviderError::Elf) => return Err(Error::Libelf),
    };

    let unwound = apply_frame_rules(state, &frame, &session.memory, &session.config);
    let pc_state = unwound.pc_state;
    let error = unwound.error;
    state.unwound = Some(Box::new(unwound));
    classify(pc_state, error).map(Some)
}

/// Turn a Frame Rule Applier result into a step outcome. `error` is only
/// consulted for [`PcState::Error`], where it holds the expression
/// failure that made the return-address register unrecoverable.
fn classify(pc_state: PcState, error: Option<crate::error::ExpressionError>) -> Result<StepOutcome, Error> {
    match pc_state {
        PcState::PcSet => Ok(StepOutcome::Stepped),
        PcState::PcUndefined => Ok(StepOutcome::Terminal),
        PcState::Error => Err(Error::UnknownError(error.unwrap_or(
            crate::error::ExpressionError::UnsetRegister(0),
        ))),
    }
}

/// A convenience iterator over an entire stack, applying the session's
/// configured `max_depth` if any. Grounded on this lineage's own
/// `UnwindIterator`; unlike that one, which is generic over a raw
/// `read_stack` closure, this one drives [`unwind_step`] directly since
/// the memory view lives on the session.
pub struct UnwindIterator<'s, Mem, Mods> {
    session: &'s UnwindSession<Mem, Mods>,
    current: Option<FrameState>,
    depth: usize,
    done: bool,
}

impl<'s, Mem: MemoryView, Mods: ModuleLookup> UnwindIterator<'s, Mem, Mods> {
    pub fn new(session: &'s UnwindSession<Mem, Mods>, root: FrameState) -> Self {
        Self {
            session,
            current: Some(root),
            depth: 0,
            done: false,
        }
    }
}

impl<'s, Mem: MemoryView, Mods: ModuleLookup> FallibleIterator for UnwindIterator<'s, Mem, Mods> {
    type Item = u64;
    type Error = Error;

    fn next(&mut self) -> Result<Option<u64>, Error> {
        if self.done {
            return Ok(None);
        }
        let Some(mut state) = self.current.take() else {
            self.done = true;
            return Ok(None);
        };
        let pc = state.pc();

        if let Some(max_depth) = self.session.config.max_depth {
            if self.depth >= max_depth {
                self.done = true;
                return Ok(Some(pc));
            }
        }

        match unwind_step(self.session, &mut state) {
            Ok(StepOutcome::Stepped) => {
                let next = *state.unwound.take().expect("Stepped implies unwound is set");
                self.current = Some(next);
                self.depth += 1;
                Ok(Some(pc))
            }
            Ok(StepOutcome::Terminal) => {
                self.done = true;
                Ok(Some(pc))
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }
}
