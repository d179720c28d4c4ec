//! End-to-end scenarios through merge, subset construction, minimization and
//! the report boundary.

use lexfa::{
    ComponentNfa, Dfa, Label, MergedNfa, MinimizedDfa, MinimizedReport, StateSet, SymbolId,
    subset_construction,
};

fn operator(symbol: &str) -> ComponentNfa {
    ComponentNfa::new()
        .with_state("s0")
        .with_state("s1")
        .with_start("s0")
        .with_accept("s1")
        .with_transition("s0", Label::symbol(symbol), "s1")
}

/// identifier: letter (letter | digit)*
fn identifier() -> ComponentNfa {
    ComponentNfa::new()
        .with_state("s0")
        .with_state("s1")
        .with_start("s0")
        .with_accept("s1")
        .with_transition("s0", Label::symbol("letter"), "s1")
        .with_transition("s1", Label::symbol("letter"), "s1")
        .with_transition("s1", Label::symbol("digit"), "s1")
}

/// number: digit+
fn number() -> ComponentNfa {
    ComponentNfa::new()
        .with_state("s0")
        .with_state("s1")
        .with_start("s0")
        .with_accept("s1")
        .with_transition("s0", Label::symbol("digit"), "s1")
        .with_transition("s1", Label::symbol("digit"), "s1")
}

fn small_lexer() -> MergedNfa {
    MergedNfa::merge(vec![
        ("IDENT".to_owned(), identifier()),
        ("NUM".to_owned(), number()),
        ("PLUS".to_owned(), operator("+")),
    ])
    .unwrap()
}

/// Direct NFA simulation: closure of the super-start, then move-then-closure
/// per symbol; acceptance by intersection with the merged accept set.
fn nfa_accepts(nfa: &MergedNfa, input: &[SymbolId]) -> bool {
    let mut current = nfa.closure(&StateSet::singleton(nfa.start(), nfa.num_states()));
    for &symbol in input {
        current = nfa.closure(&nfa.move_set(&current, symbol));
        if current.is_empty() {
            return false;
        }
    }
    current.intersects(nfa.accept())
}

fn dfa_accepts(dfa: &Dfa, input: &[SymbolId]) -> bool {
    dfa.run(input).is_some_and(|state| dfa.is_accepting(state))
}

fn minimized_accepts(minimized: &MinimizedDfa, input: &[SymbolId]) -> bool {
    minimized
        .run(input)
        .is_some_and(|block| minimized.is_accepting(block))
}

/// All symbol sequences over `alphabet` with length at most `max_len`.
fn all_strings(alphabet: &[SymbolId], max_len: usize) -> Vec<Vec<SymbolId>> {
    let mut strings: Vec<Vec<SymbolId>> = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &symbol in alphabet {
                let mut extended = prefix.clone();
                extended.push(symbol);
                next.push(extended);
            }
        }
        strings.extend(next.iter().cloned());
        frontier = next;
    }
    strings
}

#[test]
fn plus_minus_scenario() {
    let nfa = MergedNfa::merge(vec![
        ("PLUS".to_owned(), operator("+")),
        ("MINUS".to_owned(), operator("-")),
    ])
    .unwrap();

    // Super-start reaches both component starts by epsilon.
    let start_closure = nfa.closure(&StateSet::singleton(nfa.start(), nfa.num_states()));
    assert!(start_closure.contains(nfa.state_id("PLUS_s0").unwrap()));
    assert!(start_closure.contains(nfa.state_id("MINUS_s0").unwrap()));

    // Exactly three DFA states: the shared start, and one per operator.
    let dfa = subset_construction(&nfa);
    assert_eq!(dfa.num_states(), 3);

    // The two accepting states are indistinguishable and collapse into one
    // block, leaving a two-state minimal recognizer.
    let minimized = dfa.minimize();
    assert_eq!(minimized.num_blocks(), 2);

    let start = minimized.start().unwrap();
    assert!(!minimized.is_accepting(start));
    let plus = nfa.symbols().lookup("+").unwrap();
    let minus = nfa.symbols().lookup("-").unwrap();
    let accept = minimized.transition(start, plus).unwrap();
    assert_eq!(minimized.transition(start, minus), Some(accept));
    assert!(minimized.is_accepting(accept));

    assert!(minimized_accepts(&minimized, &[plus]));
    assert!(minimized_accepts(&minimized, &[minus]));
    assert!(!minimized_accepts(&minimized, &[]));
    assert!(!minimized_accepts(&minimized, &[plus, plus]));
}

#[test]
fn empty_alphabet_scenario() {
    let component = ComponentNfa::new()
        .with_state("s0")
        .with_start("s0")
        .with_accept("s0");
    let nfa = MergedNfa::merge(vec![("EMPTY".to_owned(), component)]).unwrap();

    let dfa = subset_construction(&nfa);
    assert_eq!(dfa.num_states(), 1);
    assert!(dfa.is_accepting(dfa.start().unwrap()));
    assert_eq!(dfa.transitions().count(), 0);

    let minimized = dfa.minimize();
    assert_eq!(minimized.num_blocks(), 1);
    assert!(minimized_accepts(&minimized, &[]));
}

#[test]
fn subset_construction_preserves_language() {
    let nfa = small_lexer();
    let dfa = subset_construction(&nfa);
    let alphabet: Vec<SymbolId> = nfa.alphabet().collect();

    for input in all_strings(&alphabet, 3) {
        assert_eq!(
            nfa_accepts(&nfa, &input),
            dfa_accepts(&dfa, &input),
            "NFA and DFA disagree on {input:?}"
        );
    }
}

#[test]
fn minimization_preserves_language() {
    let nfa = small_lexer();
    let dfa = subset_construction(&nfa);
    let minimized = dfa.minimize();
    let alphabet: Vec<SymbolId> = nfa.alphabet().collect();

    for input in all_strings(&alphabet, 4) {
        assert_eq!(
            dfa_accepts(&dfa, &input),
            minimized_accepts(&minimized, &input),
            "DFA and minimized DFA disagree on {input:?}"
        );
    }
}

#[test]
fn minimization_keeps_dead_branches_rejecting() {
    // One branch out of the start reaches acceptance in two more steps, one
    // is stuck immediately, three accept after a single "b". The stuck
    // branch and the two-step branch must not collapse, or the minimized
    // recognizer accepts "d a b" while the DFA rejects it.
    let component = ComponentNfa::new()
        .with_state("s")
        .with_state("p")
        .with_state("r")
        .with_state("n1")
        .with_state("n3")
        .with_state("n4")
        .with_state("n5")
        .with_state("f")
        .with_start("s")
        .with_accept("f")
        .with_transition("s", Label::symbol("c"), "p")
        .with_transition("s", Label::symbol("d"), "r")
        .with_transition("s", Label::symbol("e"), "n3")
        .with_transition("s", Label::symbol("g"), "n4")
        .with_transition("s", Label::symbol("h"), "n5")
        .with_transition("p", Label::symbol("a"), "n1")
        .with_transition("n1", Label::symbol("b"), "f")
        .with_transition("n3", Label::symbol("b"), "f")
        .with_transition("n4", Label::symbol("b"), "f")
        .with_transition("n5", Label::symbol("b"), "f");
    let nfa = MergedNfa::merge(vec![("X".to_owned(), component)]).unwrap();
    let dfa = subset_construction(&nfa);
    let minimized = dfa.minimize();

    let sym = |text: &str| nfa.symbols().lookup(text).unwrap();
    let live = [sym("c"), sym("a"), sym("b")];
    let dead = [sym("d"), sym("a"), sym("b")];
    assert!(dfa_accepts(&dfa, &live));
    assert!(minimized_accepts(&minimized, &live));
    assert!(!dfa_accepts(&dfa, &dead));
    assert!(!minimized_accepts(&minimized, &dead));

    let alphabet: Vec<SymbolId> = nfa.alphabet().collect();
    for input in all_strings(&alphabet, 3) {
        assert_eq!(
            dfa_accepts(&dfa, &input),
            minimized_accepts(&minimized, &input),
            "DFA and minimized DFA disagree on {input:?}"
        );
    }
}

#[test]
fn unreachable_accept_state_minimizes_to_one_block() {
    // The accept state is declared but unreachable, so subset construction
    // yields an all-rejecting DFA and minimization collapses it entirely.
    let component = ComponentNfa::new()
        .with_state("s0")
        .with_state("s1")
        .with_state("s2")
        .with_start("s0")
        .with_accept("s2")
        .with_transition("s0", Label::symbol("a"), "s1");
    let nfa = MergedNfa::merge(vec![("X".to_owned(), component)]).unwrap();
    let dfa = subset_construction(&nfa);
    assert!(dfa.accept().is_empty());

    let minimized = dfa.minimize();
    assert_eq!(minimized.num_blocks(), 1);
    assert!(minimized.accept().is_empty());
    let a = nfa.symbols().lookup("a").unwrap();
    assert!(!minimized_accepts(&minimized, &[a]));
    assert!(!minimized_accepts(&minimized, &[]));
}

#[test]
fn minimized_blocks_are_pairwise_distinguishable() {
    let nfa = small_lexer();
    let minimized = subset_construction(&nfa).minimize();
    let alphabet: Vec<SymbolId> = nfa.alphabet().collect();
    let strings = all_strings(&alphabet, 4);

    let accepts_from = |block, input: &[SymbolId]| {
        minimized
            .run_from(block, input)
            .is_some_and(|b| minimized.is_accepting(b))
    };

    for first in 0..minimized.num_blocks() {
        for second in (first + 1)..minimized.num_blocks() {
            let distinguishable = strings
                .iter()
                .any(|input| accepts_from(first, input) != accepts_from(second, input));
            assert!(
                distinguishable,
                "blocks {first} and {second} agree on every tested string"
            );
        }
    }
}

#[test]
fn rerun_produces_identical_report() {
    let build = || {
        let nfa = small_lexer();
        let dfa = subset_construction(&nfa);
        let minimized = dfa.minimize();
        let report = MinimizedReport::new(&nfa, &dfa, &minimized);
        (dfa.num_states(), minimized.num_blocks(), report)
    };

    let (states_a, blocks_a, report_a) = build();
    let (states_b, blocks_b, report_b) = build();
    assert_eq!(states_a, states_b);
    assert_eq!(blocks_a, blocks_b);
    assert_eq!(report_a, report_b);
}

#[test]
fn epsilon_chains_reach_the_same_language() {
    // A component padded with epsilon hops recognizes the same single-symbol
    // language as the plain operator component.
    let padded = ComponentNfa::new()
        .with_state("s0")
        .with_state("s1")
        .with_state("s2")
        .with_state("s3")
        .with_start("s0")
        .with_accept("s3")
        .with_transition("s0", Label::Epsilon, "s1")
        .with_transition("s1", Label::symbol("+"), "s2")
        .with_transition("s2", Label::Epsilon, "s3");

    let nfa = MergedNfa::merge(vec![("PLUS".to_owned(), padded)]).unwrap();
    let dfa = subset_construction(&nfa);
    let minimized = dfa.minimize();
    let plus = nfa.symbols().lookup("+").unwrap();

    assert!(minimized_accepts(&minimized, &[plus]));
    assert!(!minimized_accepts(&minimized, &[]));
    assert!(!minimized_accepts(&minimized, &[plus, plus]));
    assert_eq!(minimized.num_blocks(), 2);
}
