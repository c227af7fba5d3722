//! The Frame Rule Applier: given a source [`FrameState`] and a CFI frame
//! covering its PC, produces the unwound [`FrameState`].
//!
//! Grounded on `handle_cfi` in this lineage's `dwfl_frame_unwind.c`
//! ancestor: iterate every register, apply its rule, then derive the
//! unwound PC from the return-address register.

use log::warn;

use crate::cfi::{CfiFrame, RegisterRule};
use crate::error::ExpressionError;
use crate::expr::{evaluate, EvalResult};
use crate::frame::{FrameState, PcState};
use crate::memory::MemoryView;
use crate::regs::RegisterFile;
use crate::SessionConfig;

/// Apply `frame`'s per-register rules to `source`, producing the
/// unwound frame. An individual register's *expression* failure is
/// swallowed (the register is left unset), except for the
/// return-address register, whose failure makes the whole frame
/// [`PcState::Error`]. A `SameValue` rule whose source register is
/// unset always fails the whole frame immediately, since there is no
/// fallback value to leave unset here — the rule asked for a specific
/// value that does not exist.
pub fn apply_frame_rules<F: CfiFrame>(
    source: &FrameState,
    frame: &F,
    memory: &dyn MemoryView,
    config: &SessionConfig,
) -> FrameState {
    let mut unwound = FrameState::new_unwound(
        RegisterFile::new(config.register_count),
        frame.signal_frame(),
    );

    let ra_reg = frame.return_address_register();
    let mut ra_failure = None;

    for regno in 0..config.register_count {
        match frame.register_rule(regno) {
            RegisterRule::Undefined => continue,
            RegisterRule::SameValue => match source.regs().get(regno) {
                Some(v) => unwound.regs.set(regno, v),
                None => {
                    warn!(
                        "register {regno} has a same-value rule but is unset in the source frame"
                    );
                    unwound.pc_state = PcState::Error;
                    unwound.error = Some(ExpressionError::UnsetRegister(regno as u16));
                    return unwound;
                }
            },
            RegisterRule::Expression(ops) => {
                match evaluate(
                    ops,
                    Some(frame.cfa_ops()),
                    source.regs(),
                    memory,
                    config.word_width,
                    config.endian,
                ) {
                    Ok(EvalResult { value, .. }) => unwound.regs.set(regno, value),
                    Err(e) if regno == ra_reg => ra_failure = Some(e),
                    Err(e) => {
                        warn!(
                            "register {regno} rule evaluation failed ({e}); leaving it unset"
                        );
                    }
                }
            }
        }
    }

    if let Some(e) = ra_failure {
        warn!("return-address register {ra_reg} evaluation failed ({e}); frame is unreliable");
        unwound.pc_state = PcState::Error;
        unwound.error = Some(e);
        return unwound;
    }

    match unwound.regs.get(ra_reg) {
        Some(pc) if frame.default_same_value() || pc != 0 => {
            unwound.pc = pc;
            unwound.pc_state = PcState::PcSet;
        }
        Some(_) | None => {
            unwound.pc_state = PcState::PcUndefined;
        }
    }

    unwound
}
