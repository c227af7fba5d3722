//! Module lookup: the external collaborator that maps a PC to the
//! executable module containing it, and exposes that module's CFI
//! sources, entry point, and nearest symbol. Grounded on
//! `dwfl_addrmodule`/`dwfl_module_eh_cfi`/`dwfl_module_dwarf_cfi`/
//! `dwfl_module_addrsym` in this lineage's ancestor.

use crate::cfi::CfiProvider;

/// The nearest symbol at or before a PC, as reported by symbol lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub value: u64,
    pub size: u64,
}

/// One executable module loaded into the target.
pub trait Module {
    type Cfi: CfiProvider;

    /// The module's ELF entry-point address, already adjusted by the
    /// module's load bias.
    fn entry_point(&self) -> u64;

    /// The nearest symbol at or before `pc`, if any.
    fn addrsym(&self, pc: u64) -> Option<Symbol>;

    /// The exception-handling CFI for this module (`.eh_frame`), if any,
    /// and the bias to subtract from an absolute PC before looking it up.
    fn eh_cfi(&self) -> Option<(&Self::Cfi, u64)>;

    /// The debug CFI for this module (`.debug_frame`), if any, and its
    /// bias.
    fn dwarf_cfi(&self) -> Option<(&Self::Cfi, u64)>;
}

/// Resolves a PC to the module containing it.
pub trait ModuleLookup {
    type Module: Module;

    fn module_of(&self, pc: u64) -> Option<&Self::Module>;
}
