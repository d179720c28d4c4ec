//! Read-only views of the engine's output for external collaborators.
//!
//! The serialization collaborator consumes [`MinimizedReport`], which mirrors
//! the minimized-DFA JSON document: block list, per-block membership for
//! human inspection, start and accept blocks, and the projected transition
//! list. The visualization collaborator consumes [`dfa_edges`], the
//! unminimized transition table with resolved names. Both only read; the
//! engine's structures are never handed out mutably.

use crate::dfa::{BlockId, Dfa, MinimizedDfa};
use crate::nfa::MergedNfa;
use crate::state::StateId;
use crate::symbol::SymbolId;
use indexmap::IndexMap;
use serde::Serialize;

/// One projected transition of the minimized DFA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub src: String,
    pub symbol: String,
    pub dst: String,
}

/// Membership of one block: each member DFA state as its sorted set of
/// qualified merged-NFA state names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub members: Vec<Vec<String>>,
}

/// The minimized DFA in its serialized shape.
///
/// `start` is optional defensively: under subset construction the start
/// block always resolves, so `None` here signals an internal inconsistency
/// upstream rather than a legitimate result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinimizedReport {
    pub states: Vec<String>,
    pub states_info: IndexMap<String, BlockInfo>,
    pub start: Option<String>,
    pub accepts: Vec<String>,
    pub transitions: Vec<TransitionRecord>,
}

impl MinimizedReport {
    /// Assemble the report. Enumeration order is deterministic: blocks by
    /// id, transitions by `(block, alphabet order)`.
    pub fn new(nfa: &MergedNfa, dfa: &Dfa, minimized: &MinimizedDfa) -> Self {
        let states: Vec<String> = (0..minimized.num_blocks()).map(block_label).collect();

        let mut states_info = IndexMap::new();
        for (idx, block) in minimized.blocks().iter().enumerate() {
            let members = block
                .iter()
                .map(|dfa_state| state_names(nfa, dfa, dfa_state))
                .collect();
            states_info.insert(block_label(idx as BlockId), BlockInfo { members });
        }

        let accepts = minimized.accept().iter().map(block_label).collect();

        let mut transitions = Vec::new();
        for block in 0..minimized.num_blocks() {
            for symbol in minimized.alphabet() {
                if let Some(dst) = minimized.transition(block, symbol) {
                    transitions.push(TransitionRecord {
                        src: block_label(block),
                        symbol: symbol_text(nfa, symbol),
                        dst: block_label(dst),
                    });
                }
            }
        }

        Self {
            states,
            states_info,
            start: minimized.start().map(block_label),
            accepts,
            transitions,
        }
    }
}

/// One edge of the unminimized DFA with all names resolved, for rendering a
/// transition graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DfaEdge {
    pub src: Vec<String>,
    pub symbol: String,
    pub dst: Vec<String>,
}

/// The unminimized DFA transition table, one row per edge, in `(state,
/// alphabet order)` order.
pub fn dfa_edges(nfa: &MergedNfa, dfa: &Dfa) -> Vec<DfaEdge> {
    let mut edges = Vec::new();
    for state in 0..dfa.num_states() {
        for symbol in dfa.alphabet() {
            if let Some(dst) = dfa.transition(state, symbol) {
                edges.push(DfaEdge {
                    src: state_names(nfa, dfa, state),
                    symbol: symbol_text(nfa, symbol),
                    dst: state_names(nfa, dfa, dst),
                });
            }
        }
    }
    edges
}

fn block_label(block: BlockId) -> String {
    format!("S{block}")
}

fn symbol_text(nfa: &MergedNfa, symbol: SymbolId) -> String {
    nfa.symbols()
        .resolve(symbol)
        .expect("symbol id missing from the merged NFA's table")
        .to_owned()
}

/// The qualified names behind one DFA state, sorted for stable output.
fn state_names(nfa: &MergedNfa, dfa: &Dfa, state: StateId) -> Vec<String> {
    let mut names: Vec<String> = dfa
        .members(state)
        .iter()
        .map(|nfa_state| {
            nfa.state_name(nfa_state)
                .expect("state id missing from the merged NFA")
                .to_owned()
        })
        .collect();
    names.sort_unstable();
    names
}
