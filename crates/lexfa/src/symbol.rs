//! Alphabet symbols and the symbol interner.
//!
//! The engine never interprets symbol text; a symbol is an opaque label
//! compared for equality only. Labels are interned to dense `u32` ids so the
//! transition tables can key on integers, and the interning order (first
//! appearance) fixes the alphabet enumeration order everywhere downstream.

use indexmap::IndexSet;

/// An interned symbol identifier.
pub type SymbolId = u32;

/// Distinguished marker for epsilon (empty-input) transitions. Never interned
/// and never part of the alphabet.
pub const EPSILON: SymbolId = u32::MAX;

/// Check if a symbol id is the epsilon marker.
#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

/// A transition label as supplied at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// An alphabet symbol, e.g. a literal or a character-class name.
    Symbol(String),
    /// The empty-input transition.
    Epsilon,
}

impl Label {
    /// Shorthand for an alphabet symbol label.
    pub fn symbol(text: impl Into<String>) -> Self {
        Label::Symbol(text.into())
    }
}

/// Interns symbol strings to dense [`SymbolId`]s in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: IndexSet<String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol, returning its id. Re-interning returns the same id.
    pub fn intern(&mut self, text: &str) -> SymbolId {
        let (idx, _) = self.symbols.insert_full(text.to_owned());
        idx as SymbolId
    }

    /// Look up the id of an already-interned symbol.
    pub fn lookup(&self, text: &str) -> Option<SymbolId> {
        self.symbols.get_index_of(text).map(|idx| idx as SymbolId)
    }

    /// Resolve an id back to its text. Returns `None` for unknown ids and for
    /// [`EPSILON`].
    pub fn resolve(&self, symbol: SymbolId) -> Option<&str> {
        self.symbols.get_index(symbol as usize).map(String::as_str)
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no symbols have been interned.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over all symbol ids in interning order.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len()).map(|idx| idx as SymbolId)
    }
}
