//! The Entry-Function Oracle: decides whether a PC lies within the
//! program's entry routine, in which case unwinding should terminate
//! rather than report failure.
//!
//! Grounded on `no_fde` in this lineage's `dwfl_frame_unwind.c`
//! ancestor, which mirrors GDB's "inside entry func" heuristic: the
//! entry routine typically has no CFI because it has no meaningful
//! caller.

use crate::module::Module;

/// Returns `true` if `pc` lies within `module`'s entry function.
pub fn is_in_entry_function<M: Module>(pc: u64, module: &M) -> bool {
    let entry = module.entry_point();
    if pc < entry {
        return false;
    }
    let Some(sym) = module.addrsym(pc) else {
        return false;
    };
    if sym.value != entry {
        return false;
    }
    if sym.size != 0 && pc >= sym.value + sym.size {
        return false;
    }
    true
}
