//! Hand-built fakes of the external collaborators (`CfiProvider`,
//! `Module`, `MemoryView`) this crate's integration tests drive the
//! public API through. No real ELF/DWARF parsing lives here; these
//! fakes report exactly the frame records and memory contents each
//! test needs.

use std::collections::HashMap;

use cfiframe::cfi::{CfiFrame, CfiProvider, RegisterRule};
use cfiframe::error::ProviderError;
use cfiframe::module::{Module, ModuleLookup, Symbol};
use cfiframe::{Endian, MemoryView, Op, WordWidth};

pub enum RuleSpec {
    Undefined,
    SameValue,
    Expr(Vec<Op>),
}

pub struct FakeFrame {
    pub cfa_ops: Vec<Op>,
    pub ra_reg: usize,
    pub default_same_value: bool,
    pub signal_frame: bool,
    pub rules: HashMap<usize, RuleSpec>,
}

impl CfiFrame for FakeFrame {
    fn cfa_ops(&self) -> &[Op] {
        &self.cfa_ops
    }

    fn register_rule(&self, regno: usize) -> RegisterRule<'_> {
        match self.rules.get(&regno) {
            None | Some(RuleSpec::Undefined) => RegisterRule::Undefined,
            Some(RuleSpec::SameValue) => RegisterRule::SameValue,
            Some(RuleSpec::Expr(ops)) => RegisterRule::Expression(ops),
        }
    }

    fn return_address_register(&self) -> usize {
        self.ra_reg
    }

    fn signal_frame(&self) -> bool {
        self.signal_frame
    }

    fn default_same_value(&self) -> bool {
        self.default_same_value
    }
}

/// A CFI source keyed by exact PC. `Ok(None)` (no entry) is reported for
/// any PC not in the map, matching `DWARF_E_NO_MATCH`.
#[derive(Default)]
pub struct FakeCfi {
    pub frames: HashMap<u64, FakeFrame>,
    pub malformed: bool,
}

impl CfiProvider for FakeCfi {
    type Frame = FakeFrame;

    fn addrframe(&self, pc: u64) -> Result<Option<Self::Frame>, ProviderError> {
        if self.malformed {
            return Err(ProviderError::Dwarf);
        }
        Ok(self.frames.get(&pc).map(|f| FakeFrame {
            cfa_ops: f.cfa_ops.clone(),
            ra_reg: f.ra_reg,
            default_same_value: f.default_same_value,
            signal_frame: f.signal_frame,
            rules: f
                .rules
                .iter()
                .map(|(k, v)| {
                    (
                        *k,
                        match v {
                            RuleSpec::Undefined => RuleSpec::Undefined,
                            RuleSpec::SameValue => RuleSpec::SameValue,
                            RuleSpec::Expr(ops) => RuleSpec::Expr(ops.clone()),
                        },
                    )
                })
                .collect(),
        }))
    }
}

pub struct FakeModule {
    pub entry: u64,
    pub sym: Option<Symbol>,
    pub eh_cfi: Option<FakeCfi>,
    pub dwarf_cfi: Option<FakeCfi>,
}

impl Module for FakeModule {
    type Cfi = FakeCfi;

    fn entry_point(&self) -> u64 {
        self.entry
    }

    fn addrsym(&self, _pc: u64) -> Option<Symbol> {
        self.sym
    }

    fn eh_cfi(&self) -> Option<(&Self::Cfi, u64)> {
        self.eh_cfi.as_ref().map(|c| (c, 0))
    }

    fn dwarf_cfi(&self) -> Option<(&Self::Cfi, u64)> {
        self.dwarf_cfi.as_ref().map(|c| (c, 0))
    }
}

/// Resolves every PC to the single module it holds, or to none at all.
pub struct FakeModuleLookup {
    pub module: Option<FakeModule>,
}

impl ModuleLookup for FakeModuleLookup {
    type Module = FakeModule;

    fn module_of(&self, _pc: u64) -> Option<&Self::Module> {
        self.module.as_ref()
    }
}

pub struct FlatMemory(pub HashMap<u64, u64>);

impl MemoryView for FlatMemory {
    fn read_word(
        &self,
        addr: u64,
        _width: WordWidth,
        _endian: Endian,
    ) -> Result<u64, cfiframe::error::ExpressionError> {
        self.0
            .get(&addr)
            .copied()
            .ok_or(cfiframe::error::ExpressionError::MemoryRead(addr))
    }
}
