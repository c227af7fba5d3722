//! The CFI provider contract: the external collaborator that resolves a
//! PC to a frame descriptor. Parsing `.eh_frame`/`.debug_frame` bytes
//! into this shape is out of scope for this core; what's in scope is
//! the contract the Frame Rule Applier and Unwinder consume, modeled
//! directly on `dwarf_cfi_addrframe`/`dwarf_frame_cfa`/
//! `dwarf_frame_register` in this lineage's ancestor.

use crate::error::ProviderError;
use crate::expr::Op;

/// The per-register recovery rule shape a CFI frame reports for a given
/// register: no recovery, "same as the callee's value", or an
/// expression to evaluate.
#[derive(Debug, Clone, Copy)]
pub enum RegisterRule<'a> {
    Undefined,
    SameValue,
    Expression(&'a [Op]),
}

/// One CFI frame record: everything the Frame Rule Applier needs to
/// unwind a single frame at a given PC.
pub trait CfiFrame {
    /// The CFA expression for this frame.
    fn cfa_ops(&self) -> &[Op];

    /// The recovery rule for register `regno`.
    fn register_rule(&self, regno: usize) -> RegisterRule<'_>;

    /// The architectural register that holds the caller's resume PC.
    fn return_address_register(&self) -> usize;

    /// Whether this frame was created by kernel signal delivery.
    fn signal_frame(&self) -> bool;

    /// This table's tie-break policy for when a register has neither an
    /// explicit rule nor an "undefined" marker: some architectures (x86,
    /// x86-64) treat the gap as undefined, others (PowerPC 32) as
    /// same-value. This flag selects which, and is consulted only when
    /// deciding whether a zero return-address value means
    /// end-of-stack (`true`) or an explicit undefined marker (`false`).
    fn default_same_value(&self) -> bool;
}

/// A source of CFI frame records for a single unwind section (either the
/// exception-handling CFI or the debug CFI of a module).
pub trait CfiProvider {
    type Frame: CfiFrame;

    /// Resolve `pc` (already bias-adjusted) to a frame record.
    /// `Ok(None)` means this source has no entry for `pc` (`NO_MATCH`);
    /// the caller falls through to the next CFI source or the
    /// Entry-Function Oracle. `Err` means the table itself is malformed
    /// — that is terminal for the step.
    fn addrframe(&self, pc: u64) -> Result<Option<Self::Frame>, ProviderError>;
}
