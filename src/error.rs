//! The error taxonomy surfaced at the crate boundary.
//!
//! Two tiers, mirroring how this engine's DWARF evaluator keeps its own
//! error type distinct from the unwinder's: [`ExpressionError`] covers
//! failures inside a single expression evaluation, and [`Error`] covers
//! everything an [`crate::unwinder::unwind_step`] caller can observe.
//! Every internal-consistency failure (bad branch target, empty stack,
//! unset register, ...) collapses to [`Error::UnknownError`] at the
//! boundary; the originating [`ExpressionError`] variant survives as the
//! `source()` for anyone who wants to log more than "this frame is
//! unreliable".

/// Failure while evaluating a single DWARF expression.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("expression has no operations")]
    EmptyExpression,

    #[error("popped from an empty expression stack")]
    StackUnderflow,

    #[error("register {0} is not set in the source frame")]
    UnsetRegister(u16),

    #[error("could not read target memory at 0x{0:x}")]
    MemoryRead(u64),

    #[error("call_frame_cfa used but no CFA is available in this context")]
    MissingCfa,

    #[error("branch target 0x{0:x} does not match any operation offset")]
    UnresolvedBranchTarget(u32),
}

/// The errors observed at the core's public boundary.
///
/// `NoDwarf`, `Libdw`, and `Libelf` mirror the three externally-reported
/// kinds this lineage's unwinder already distinguishes; `UnknownError` is
/// the catch-all for internal consistency failures, most of which
/// originate in the expression interpreter.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("neither CFI source covers this address and it is not the entry function")]
    NoDwarf,

    #[error("CFI provider reported a malformed frame descriptor")]
    Libdw,

    #[error("module lookup reported a malformed or unreadable object")]
    Libelf,

    #[error("unreliable frame: {0}")]
    UnknownError(#[source] ExpressionError),
}

impl From<ExpressionError> for Error {
    fn from(e: ExpressionError) -> Self {
        Error::UnknownError(e)
    }
}

/// What a CFI provider reports when `addrframe` fails for a reason other
/// than "no entry for this PC" (that case is `Ok(None)`, see
/// [`crate::cfi::CfiProvider`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    /// The CFI table itself is malformed.
    Dwarf,
    /// The underlying object file could not be read.
    Elf,
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Dwarf => Error::Libdw,
            ProviderError::Elf => Error::Libelf,
        }
    }
}
