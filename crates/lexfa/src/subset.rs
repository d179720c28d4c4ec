//! Subset construction: determinizing the merged NFA.

use crate::dfa::Dfa;
use crate::nfa::MergedNfa;
use crate::state::{StateId, StateSet};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Convert the merged NFA into an equivalent DFA by the powerset
/// construction, visiting only reachable subsets.
///
/// Every DFA state is the epsilon closure of some reachable configuration;
/// subsets are identified by value (their sorted member list), never by
/// reference. DFA state ids are assigned in first-discovery order and the
/// worklist is a FIFO, so the numbering is deterministic for a fixed
/// component declaration order. An empty alphabet yields a single-state DFA
/// with no transitions.
pub fn subset_construction(nfa: &MergedNfa) -> Dfa {
    let mut dfa = Dfa::new();
    let mut subset_ids: IndexMap<Vec<StateId>, StateId> = IndexMap::new();

    let start_set = nfa.closure(&StateSet::singleton(nfa.start(), nfa.num_states()));
    let start_id = dfa.add_state_with_members(start_set.clone());
    dfa.set_start(start_id);
    if start_set.intersects(nfa.accept()) {
        dfa.add_accept(start_id);
    }
    subset_ids.insert(start_set.to_vec(), start_id);

    let mut worklist = VecDeque::from([(start_set, start_id)]);
    while let Some((subset, dfa_state)) = worklist.pop_front() {
        for symbol in nfa.alphabet() {
            let next = nfa.closure(&nfa.move_set(&subset, symbol));
            if next.is_empty() {
                // No transition recorded; absence means "stuck", not error.
                continue;
            }

            let key = next.to_vec();
            let next_id = match subset_ids.get(&key) {
                Some(&seen) => seen,
                None => {
                    let id = dfa.add_state_with_members(next.clone());
                    if next.intersects(nfa.accept()) {
                        dfa.add_accept(id);
                    }
                    subset_ids.insert(key, id);
                    worklist.push_back((next, id));
                    id
                }
            };
            dfa.add_transition(dfa_state, symbol, next_id);
        }
    }

    dfa
}
