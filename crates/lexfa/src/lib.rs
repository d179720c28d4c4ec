//! Builds one minimal deterministic recognizer from a set of independently
//! specified token-category NFAs.
//!
//! The pipeline:
//! - merge the named [`ComponentNfa`]s into a [`MergedNfa`] (qualified state
//!   names under a fresh epsilon-linked super-start);
//! - determinize with [`subset_construction`] (epsilon closure + move over
//!   the powerset lattice, reachable subsets only);
//! - collapse indistinguishable states with [`Dfa::minimize`] (partition
//!   refinement down to the Myhill-Nerode classes);
//! - hand the result to serialization or visualization collaborators through
//!   the read-only views ([`MinimizedReport`], [`dfa_edges`]).
//!
//! The engine is synchronous and pure: no I/O, no shared mutable state, and
//! every loop is bounded by the finite state space.

mod dfa;
mod export;
mod nfa;
mod state;
mod subset;
mod symbol;

pub use dfa::{BlockId, Dfa, MinimizedDfa};
pub use export::{BlockInfo, DfaEdge, MinimizedReport, TransitionRecord, dfa_edges};
pub use nfa::{ComponentNfa, MergeError, MergedNfa, SUPER_START};
pub use state::{StateId, StateSet};
pub use subset::subset_construction;
pub use symbol::{EPSILON, Label, SymbolId, SymbolTable, is_epsilon};
