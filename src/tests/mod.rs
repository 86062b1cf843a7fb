
use crate::sequitur::{Sequitur, START_RULE};
use crate::symbol::{DigramKey, RuleId, Symbol};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use slotmap::DefaultKey;
use std::fmt::Debug;
use std::hash::Hash;

/// Asserts every structural invariant of the grammar: list integrity,
/// call-site registration, rule utility, digram uniqueness, left
/// preference for overlapping runs, and full agreement between the rule
/// bodies and the digram index.
pub(crate) fn assert_grammar_integrity<T: Hash + Eq + Clone + Debug>(seq: &Sequitur<T>) {
    let grammar = &seq.grammar;

    // bodies are well-formed circular lists owning every non-guard node once
    let mut owned: HashSet<DefaultKey> = HashSet::new();
    for rule in grammar.rules.values() {
        let mut key = rule.guard;
        loop {
            let next = grammar.symbols[key].next;
            assert_eq!(grammar.symbols[next].prev, key, "broken body link");
            if next != rule.guard {
                assert!(owned.insert(next), "symbol owned by two bodies");
            }
            key = next;
            if key == rule.guard {
                break;
            }
        }
    }
    for (key, node) in grammar.symbols.iter() {
        if !matches!(node.symbol, Symbol::Guard(_)) {
            assert!(owned.contains(&key), "orphan symbol outside every body");
        }
    }

    // refs sets agree with the arena; rule utility holds
    for (&rule_id, rule) in grammar.rules.iter() {
        for &call in rule.refs.iter() {
            let registered = matches!(
                grammar.symbols.get(call).map(|node| &node.symbol),
                Some(Symbol::RuleRef(id)) if *id == rule_id
            );
            assert!(registered, "stale call-site registration for rule {rule_id}");
        }
        if rule_id != START_RULE {
            assert!(
                rule.refcount() >= 2,
                "rule {rule_id} referenced {} time(s)",
                rule.refcount()
            );
        }
    }
    for (key, node) in grammar.symbols.iter() {
        if let Symbol::RuleRef(rule_id) = node.symbol {
            let registered = grammar
                .rules
                .get(&rule_id)
                .is_some_and(|rule| rule.refs.contains(&key));
            assert!(registered, "call-site of rule {rule_id} not registered");
        }
    }

    // digram uniqueness and index agreement
    let mut occurrences: HashMap<DigramKey<T>, Vec<DefaultKey>> = HashMap::new();
    for rule in grammar.rules.values() {
        let mut key = grammar.symbols[rule.guard].next;
        while key != rule.guard {
            if let Some(digram) = grammar.ref_digram(key) {
                occurrences.entry(digram).or_default().push(key);
            }
            key = grammar.symbols[key].next;
        }
    }
    for (digram, positions) in occurrences.iter() {
        for (i, &a) in positions.iter().enumerate() {
            for &b in positions[i + 1..].iter() {
                let overlapping =
                    grammar.symbols[a].next == b || grammar.symbols[b].next == a;
                assert!(
                    overlapping,
                    "digram {digram:?} occurs twice without overlap"
                );
            }
        }
        let indexed = grammar
            .seen(digram)
            .unwrap_or_else(|| panic!("digram {digram:?} missing from the index"));
        assert!(
            positions.contains(&indexed),
            "index entry for {digram:?} points outside its occurrences"
        );
        assert!(
            !positions.contains(&grammar.symbols[indexed].prev),
            "indexed occurrence of {digram:?} is not the leftmost of its run"
        );
    }
    for (digram, &position) in grammar.digrams.iter() {
        assert!(
            grammar.symbols.contains_key(position),
            "index entry for {digram:?} points at a dead symbol"
        );
        assert_eq!(
            grammar.ref_digram(position).as_ref(),
            Some(digram),
            "index entry no longer represents its key"
        );
    }
}

/// Fully expands one rule to the terminal string it produces.
pub(crate) fn expand(seq: &Sequitur<char>, rule_id: RuleId) -> String {
    let grammar = &seq.grammar;
    let mut out = String::new();
    let mut stack = Vec::new();
    let guard = grammar.rules.get(&rule_id).unwrap().guard;
    let mut cursor = grammar.symbols[guard].next;
    loop {
        match &grammar.symbols[cursor].symbol {
            Symbol::Terminal(value) => {
                out.push(*value);
                cursor = grammar.symbols[cursor].next;
            }
            Symbol::RuleRef(id) => {
                stack.push(cursor);
                cursor = grammar.symbols[grammar.rules.get(id).unwrap().guard].next;
            }
            Symbol::Guard(_) => match stack.pop() {
                Some(parent) => cursor = grammar.symbols[parent].next,
                None => break,
            },
        }
    }
    out
}

/// Deterministic pseudo-random generator for the fuzzing campaigns.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
        self.0 >> 16
    }
}

/// An input made of `picks` runs: each pick draws a letter from the first
/// `alphabet` lowercase letters and repeats it one to `max_run` times.
pub(crate) fn run_length_input(
    rng: &mut Lcg,
    picks: usize,
    alphabet: u64,
    max_run: u64,
) -> Vec<u8> {
    let mut out = Vec::new();
    for _ in 0..picks {
        let letter = b'a' + (rng.next() % alphabet) as u8;
        let run = 1 + (rng.next() % max_run) as usize;
        out.extend(std::iter::repeat(letter).take(run));
    }
    out
}
