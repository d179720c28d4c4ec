//! Deterministic finite automaton and partition-refinement minimization.

use crate::state::{StateId, StateSet};
use crate::symbol::{SymbolId, is_epsilon};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Identifier of one block of the terminal partition.
pub type BlockId = u32;

/// A deterministic finite automaton over interned symbols.
///
/// The transition map is partial: an absent `(state, symbol)` pair means "no
/// transition", not an error. A reverse transition index is maintained for
/// the minimizer's predecessor queries.
#[derive(Debug, Clone)]
pub struct Dfa {
    num_states: u32,
    start: Option<StateId>,
    accept: StateSet,
    transitions: HashMap<(StateId, SymbolId), StateId>,
    reverse: HashMap<(StateId, SymbolId), StateSet>,
    /// Symbols in first-use order, which under subset construction is the
    /// merged NFA's interning order.
    alphabet: IndexSet<SymbolId>,
    /// Per DFA state, the merged-NFA states it stands for. Empty for states
    /// not produced by subset construction.
    members: Vec<StateSet>,
}

impl Dfa {
    /// Create an empty DFA.
    pub fn new() -> Self {
        Self {
            num_states: 0,
            start: None,
            accept: StateSet::with_capacity(16),
            transitions: HashMap::new(),
            reverse: HashMap::new(),
            alphabet: IndexSet::new(),
            members: Vec::new(),
        }
    }

    /// Add a new state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.add_state_with_members(StateSet::with_capacity(0))
    }

    /// Add a new state carrying the merged-NFA states it represents.
    pub fn add_state_with_members(&mut self, members: StateSet) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.members.push(members);
        id
    }

    /// Set the start state.
    pub fn set_start(&mut self, state: StateId) {
        self.start = Some(state);
    }

    /// Mark a state as accepting.
    pub fn add_accept(&mut self, state: StateId) {
        self.accept.insert(state);
    }

    /// Add a transition.
    ///
    /// # Panics
    ///
    /// If the symbol is epsilon, or if the `(source, symbol)` pair already
    /// maps to a different destination. A DFA transition table is a partial
    /// function; a second destination is a precondition violation, not input
    /// to be repaired.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        assert!(!is_epsilon(symbol), "a DFA has no epsilon transitions");
        let prev = self.transitions.insert((source, symbol), destination);
        assert!(
            prev.is_none() || prev == Some(destination),
            "transition ({source}, {symbol}) already maps to a different destination"
        );
        self.alphabet.insert(symbol);
        self.reverse
            .entry((destination, symbol))
            .or_insert_with(|| StateSet::with_capacity(self.num_states as usize))
            .insert(source);
    }

    /// The destination of `(source, symbol)`, if any.
    pub fn transition(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(source, symbol)).copied()
    }

    /// Number of states.
    pub fn num_states(&self) -> u32 {
        self.num_states
    }

    /// The start state.
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    /// The accepting states.
    pub fn accept(&self) -> &StateSet {
        &self.accept
    }

    /// Whether a state is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept.contains(state)
    }

    /// The symbols used by any transition, in first-use order.
    pub fn alphabet(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.alphabet.iter().copied()
    }

    /// The merged-NFA states a DFA state stands for.
    ///
    /// # Panics
    ///
    /// If the state id is out of range.
    pub fn members(&self, state: StateId) -> &StateSet {
        &self.members[state as usize]
    }

    /// All transitions as `(source, symbol, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .map(|(&(src, sym), &dst)| (src, sym, dst))
    }

    /// Run the DFA over a symbol sequence from the start state. `None` means
    /// the run got stuck; otherwise the final state is returned.
    pub fn run(&self, input: &[SymbolId]) -> Option<StateId> {
        self.run_from(self.start?, input)
    }

    /// Run the DFA from an arbitrary state.
    pub fn run_from(&self, state: StateId, input: &[SymbolId]) -> Option<StateId> {
        let mut state = state;
        for &symbol in input {
            state = self.transition(state, symbol)?;
        }
        Some(state)
    }

    /// Collapse states indistinguishable by any future input, by partition
    /// refinement with a splitter worklist.
    ///
    /// Starts from the accept / non-accept split and refines until no block
    /// can be split further; the surviving blocks are the Myhill-Nerode
    /// classes of the reachable state set. Block ids follow the terminal
    /// partition's order, which is deterministic for a fixed construction
    /// order of the DFA.
    pub fn minimize(&self) -> MinimizedDfa {
        if self.num_states == 0 || self.start.is_none() {
            return MinimizedDfa::empty();
        }

        let all: StateSet = (0..self.num_states).collect();
        if self.accept.is_empty() {
            // No accepting state: every state recognizes the empty language,
            // so the terminal partition is a single block. Refining would
            // tell states apart by transition presence, which no input can
            // observe here.
            return self.quotient(&[all]);
        }

        let accept = all.intersection(&self.accept);
        let non_accept = all.difference(&self.accept);

        let mut partition: Vec<StateSet> = vec![accept];
        if !non_accept.is_empty() {
            partition.push(non_accept);
        }

        // Every initial block starts out pending. With a partial transition
        // table the accept block alone is not a sufficient seed: a non-accept
        // block can split with the distinguishing destinations in its larger
        // half, and only the smaller half would ever act as a splitter.
        let mut worklist: Vec<StateSet> = partition.clone();

        while let Some(splitter) = worklist.pop() {
            // The popped splitter stays frozen for its whole round even if
            // the block it came from is split meanwhile.
            for symbol in self.alphabet() {
                let predecessors = self.predecessors(&splitter, symbol);
                if predecessors.is_empty() {
                    continue;
                }

                let mut refined = Vec::with_capacity(partition.len());
                for block in partition.drain(..) {
                    let inside = block.intersection(&predecessors);
                    let outside = block.difference(&predecessors);
                    if inside.is_empty() || outside.is_empty() {
                        refined.push(block);
                        continue;
                    }

                    if let Some(pos) = worklist.iter().position(|pending| *pending == block) {
                        // A pending splitter that split is replaced by both
                        // pieces; anything less loses distinctions.
                        worklist.remove(pos);
                        worklist.push(inside.clone());
                        worklist.push(outside.clone());
                    } else if inside.len() <= outside.len() {
                        worklist.push(inside.clone());
                    } else {
                        worklist.push(outside.clone());
                    }
                    refined.push(inside);
                    refined.push(outside);
                }
                partition = refined;
            }
        }

        debug_assert_eq!(
            partition.iter().map(StateSet::len).sum::<usize>(),
            self.num_states as usize,
            "terminal partition must cover every state exactly once"
        );

        self.quotient(&partition)
    }

    /// States with a `symbol`-transition landing inside `targets`.
    fn predecessors(&self, targets: &StateSet, symbol: SymbolId) -> StateSet {
        let mut predecessors = StateSet::with_capacity(self.num_states as usize);
        for target in targets.iter() {
            if let Some(sources) = self.reverse.get(&(target, symbol)) {
                predecessors.union_with(sources);
            }
        }
        predecessors
    }

    /// Project the DFA onto the blocks of the terminal partition.
    fn quotient(&self, partition: &[StateSet]) -> MinimizedDfa {
        let mut block_of: HashMap<StateId, BlockId> = HashMap::new();
        for (idx, block) in partition.iter().enumerate() {
            for state in block.iter() {
                block_of.insert(state, idx as BlockId);
            }
        }

        let mut accept = StateSet::with_capacity(partition.len());
        for (idx, block) in partition.iter().enumerate() {
            if block.intersects(&self.accept) {
                accept.insert(idx as BlockId);
            }
        }

        let mut transitions: HashMap<(BlockId, SymbolId), BlockId> = HashMap::new();
        for (&(src, symbol), &dst) in &self.transitions {
            let src_block = block_of[&src];
            let dst_block = block_of[&dst];
            let prev = transitions.insert((src_block, symbol), dst_block);
            // Blocks are equivalence classes under the refined relation, so
            // the projection must be single-valued.
            assert!(
                prev.is_none() || prev == Some(dst_block),
                "partition refinement produced an inconsistent projection for \
                 block {src_block} on symbol {symbol}"
            );
        }

        MinimizedDfa {
            start: self.start.map(|s| block_of[&s]),
            accept,
            transitions,
            alphabet: self.alphabet.clone(),
            blocks: partition.to_vec(),
        }
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

/// The quotient of a [`Dfa`] by its terminal partition.
#[derive(Debug, Clone)]
pub struct MinimizedDfa {
    /// Block holding the original start state. `None` only for the empty
    /// automaton; under subset construction the start block always exists.
    start: Option<BlockId>,
    accept: StateSet,
    transitions: HashMap<(BlockId, SymbolId), BlockId>,
    alphabet: IndexSet<SymbolId>,
    /// Per block, the original DFA states it contains.
    blocks: Vec<StateSet>,
}

impl MinimizedDfa {
    fn empty() -> Self {
        Self {
            start: None,
            accept: StateSet::with_capacity(0),
            transitions: HashMap::new(),
            alphabet: IndexSet::new(),
            blocks: Vec::new(),
        }
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// The start block.
    pub fn start(&self) -> Option<BlockId> {
        self.start
    }

    /// The accepting blocks.
    pub fn accept(&self) -> &StateSet {
        &self.accept
    }

    /// Whether a block is accepting.
    pub fn is_accepting(&self, block: BlockId) -> bool {
        self.accept.contains(block)
    }

    /// The destination of `(block, symbol)`, if any.
    pub fn transition(&self, block: BlockId, symbol: SymbolId) -> Option<BlockId> {
        self.transitions.get(&(block, symbol)).copied()
    }

    /// All projected transitions as `(source, symbol, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item = (BlockId, SymbolId, BlockId)> + '_ {
        self.transitions
            .iter()
            .map(|(&(src, sym), &dst)| (src, sym, dst))
    }

    /// The symbols used by any transition, in the original DFA's order.
    pub fn alphabet(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.alphabet.iter().copied()
    }

    /// The original DFA states of each block, indexed by [`BlockId`].
    pub fn blocks(&self) -> &[StateSet] {
        &self.blocks
    }

    /// Run the minimized DFA over a symbol sequence from the start block.
    pub fn run(&self, input: &[SymbolId]) -> Option<BlockId> {
        self.run_from(self.start?, input)
    }

    /// Run the minimized DFA from an arbitrary block.
    pub fn run_from(&self, block: BlockId, input: &[SymbolId]) -> Option<BlockId> {
        let mut block = block;
        for &symbol in input {
            block = self.transition(block, symbol)?;
        }
        Some(block)
    }
}
