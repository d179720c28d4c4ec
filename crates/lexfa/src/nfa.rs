//! Component NFAs and the merged-NFA model.
//!
//! Each token category (identifier, number, operator, ...) is specified as an
//! independent [`ComponentNfa`] under a unique component name. Merging unions
//! the components into one [`MergedNfa`]: every component state is renamed to
//! `component_state` and a fresh super-start state gains one epsilon edge to
//! each component's start. All configuration validation happens eagerly at
//! merge time; the merged structure itself is immutable.

use crate::state::{StateId, StateSet};
use crate::symbol::{EPSILON, Label, SymbolId, SymbolTable, is_epsilon};
use indexmap::IndexSet;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the super-start state in the merged NFA. Qualified component
/// states always contain an underscore separator, so this cannot collide.
pub const SUPER_START: &str = "START";

/// Configuration errors detected while merging component NFAs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("duplicate component name `{0}`")]
    DuplicateComponent(String),

    #[error("component `{component}` has no start state")]
    MissingStart { component: String },

    #[error("component `{component}`: start state `{state}` is not declared")]
    UndeclaredStart { component: String, state: String },

    #[error("component `{component}`: accept state `{state}` is not declared")]
    UndeclaredAccept { component: String, state: String },

    #[error("component `{component}`: transition endpoint `{state}` is not declared")]
    UndeclaredEndpoint { component: String, state: String },

    #[error("qualified state name `{0}` collides with an existing state")]
    QualifiedCollision(String),
}

/// One token category's NFA, specified over plain state names.
///
/// Plain data: nothing is validated until the component is merged, and the
/// merge reports the first violation it finds instead of repairing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentNfa {
    states: IndexSet<String>,
    start: Option<String>,
    accept: IndexSet<String>,
    transitions: Vec<(String, Label, String)>,
}

impl ComponentNfa {
    /// Create an empty component.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state.
    pub fn add_state(&mut self, state: impl Into<String>) {
        self.states.insert(state.into());
    }

    /// Declare a state, chaining.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.add_state(state);
        self
    }

    /// Set the start state. Must also be declared via [`add_state`].
    ///
    /// [`add_state`]: ComponentNfa::add_state
    pub fn set_start(&mut self, state: impl Into<String>) {
        self.start = Some(state.into());
    }

    /// Set the start state, chaining.
    pub fn with_start(mut self, state: impl Into<String>) -> Self {
        self.set_start(state);
        self
    }

    /// Mark a declared state as accepting.
    pub fn add_accept(&mut self, state: impl Into<String>) {
        self.accept.insert(state.into());
    }

    /// Mark a state as accepting, chaining.
    pub fn with_accept(mut self, state: impl Into<String>) -> Self {
        self.add_accept(state);
        self
    }

    /// Record a transition. Duplicate triples are allowed (a multiset), as
    /// are multiple transitions from one `(state, label)` pair.
    pub fn add_transition(
        &mut self,
        src: impl Into<String>,
        label: Label,
        dst: impl Into<String>,
    ) {
        self.transitions.push((src.into(), label, dst.into()));
    }

    /// Record a transition, chaining.
    pub fn with_transition(
        mut self,
        src: impl Into<String>,
        label: Label,
        dst: impl Into<String>,
    ) -> Self {
        self.add_transition(src, label, dst);
        self
    }

    fn validate(&self, component: &str) -> Result<(), MergeError> {
        let start = self.start.as_ref().ok_or_else(|| MergeError::MissingStart {
            component: component.to_owned(),
        })?;
        if !self.states.contains(start) {
            return Err(MergeError::UndeclaredStart {
                component: component.to_owned(),
                state: start.clone(),
            });
        }
        for accept in &self.accept {
            if !self.states.contains(accept) {
                return Err(MergeError::UndeclaredAccept {
                    component: component.to_owned(),
                    state: accept.clone(),
                });
            }
        }
        for (src, _, dst) in &self.transitions {
            for endpoint in [src, dst] {
                if !self.states.contains(endpoint) {
                    return Err(MergeError::UndeclaredEndpoint {
                        component: component.to_owned(),
                        state: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The union of all component NFAs under a single super-start state.
#[derive(Debug, Clone)]
pub struct MergedNfa {
    /// Qualified state names; the index is the [`StateId`]. Index 0 is the
    /// super-start.
    state_names: Vec<String>,
    state_ids: HashMap<String, StateId>,
    accept: StateSet,
    /// `(source, symbol) -> destinations`; epsilon edges use [`EPSILON`].
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    symbols: SymbolTable,
}

impl MergedNfa {
    /// Merge the named components, consuming them.
    ///
    /// Declaration order is meaningful: it fixes state numbering and the
    /// symbol interning order, which in turn fixes every downstream
    /// enumeration order.
    pub fn merge(components: Vec<(String, ComponentNfa)>) -> Result<Self, MergeError> {
        let mut names_seen: IndexSet<&str> = IndexSet::new();
        for (name, _) in &components {
            if !names_seen.insert(name.as_str()) {
                return Err(MergeError::DuplicateComponent(name.clone()));
            }
        }
        for (name, component) in &components {
            component.validate(name)?;
        }

        let mut merged = Self {
            state_names: vec![SUPER_START.to_owned()],
            state_ids: HashMap::from([(SUPER_START.to_owned(), 0)]),
            accept: StateSet::with_capacity(16),
            transitions: HashMap::new(),
            symbols: SymbolTable::new(),
        };

        for (name, component) in components {
            for state in &component.states {
                merged.add_state(qualify(&name, state))?;
            }
            // Super-start reaches the component's start by an epsilon edge.
            let start = component.start.as_deref().expect("validated above");
            let start_id = merged.state_ids[&qualify(&name, start)];
            merged.add_edge(0, EPSILON, start_id);

            for state in &component.accept {
                let id = merged.state_ids[&qualify(&name, state)];
                merged.accept.insert(id);
            }
            for (src, label, dst) in &component.transitions {
                let src_id = merged.state_ids[&qualify(&name, src)];
                let dst_id = merged.state_ids[&qualify(&name, dst)];
                let symbol = match label {
                    Label::Symbol(text) => merged.symbols.intern(text),
                    Label::Epsilon => EPSILON,
                };
                merged.add_edge(src_id, symbol, dst_id);
            }
        }

        Ok(merged)
    }

    fn add_state(&mut self, qualified: String) -> Result<StateId, MergeError> {
        let id = self.state_names.len() as StateId;
        if self.state_ids.insert(qualified.clone(), id).is_some() {
            // Reachable when component names themselves contain the `_`
            // separator: `a` + `b_s` and `a_b` + `s` both qualify to `a_b_s`.
            return Err(MergeError::QualifiedCollision(qualified));
        }
        self.state_names.push(qualified);
        Ok(id)
    }

    fn add_edge(&mut self, src: StateId, symbol: SymbolId, dst: StateId) {
        let capacity = self.state_names.len();
        self.transitions
            .entry((src, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(dst);
    }

    /// The super-start state.
    pub fn start(&self) -> StateId {
        0
    }

    /// Number of states, super-start included.
    pub fn num_states(&self) -> usize {
        self.state_names.len()
    }

    /// The accepting states.
    pub fn accept(&self) -> &StateSet {
        &self.accept
    }

    /// The symbol interner.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The alphabet in interning order; epsilon is not part of it.
    pub fn alphabet(&self) -> impl Iterator<Item = SymbolId> {
        self.symbols.ids()
    }

    /// Resolve a state id to its qualified name.
    pub fn state_name(&self, state: StateId) -> Option<&str> {
        self.state_names.get(state as usize).map(String::as_str)
    }

    /// Look up a state id by qualified name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_ids.get(name).copied()
    }

    /// All transitions as `(source, symbol, destination)` triples; epsilon
    /// edges carry [`EPSILON`].
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(src, sym), dests)| dests.iter().map(move |dst| (src, sym, dst)))
    }

    /// The epsilon closure of a state set: the smallest superset closed under
    /// epsilon edges. Pure; result does not depend on traversal order.
    pub fn closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(state) = stack.pop() {
            if closure.contains(state) {
                continue;
            }
            closure.insert(state);

            if let Some(destinations) = self.transitions.get(&(state, EPSILON)) {
                for dest in destinations.iter() {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// The states reachable from `states` by one transition labeled exactly
    /// `symbol`. No epsilon closure is applied; the subset constructor
    /// composes [`closure`] on top.
    ///
    /// [`closure`]: MergedNfa::closure
    pub fn move_set(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        assert!(!is_epsilon(symbol), "move is defined over the real alphabet only");

        let mut reached = StateSet::with_capacity(self.num_states());
        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                reached.union_with(destinations);
            }
        }
        reached
    }
}

fn qualify(component: &str, state: &str) -> String {
    format!("{component}_{state}")
}
