use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::symbol::{PairAtom, RuleId};
use std::hash::Hash;

/// The start rule's id; its body always expands to the whole input.
pub const START_RULE: RuleId = 0;

/// Online Sequitur grammar induction.
///
/// Maintains a context-free grammar whose start rule expands to exactly
/// the sequence consumed so far, enforcing after every appended terminal:
/// 1. Digram uniqueness: no pair of adjacent symbols occurs twice across
///    all rule bodies.
/// 2. Rule utility: every rule except the start rule is referenced at
///    least twice.
///
/// All state (symbol arena, digram index, rule table) is owned by the
/// instance; two instances never interact.
pub struct Sequitur<T> {
    pub(crate) grammar: Grammar<T>,

    /// Number of terminals consumed.
    length: usize,
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Creates an instance holding a single empty start rule.
    pub fn new() -> Self {
        Self {
            grammar: Grammar::new(),
            length: 0,
        }
    }

    /// Appends one terminal to the sequence.
    ///
    /// Every rewrite needed to restore the two invariants completes before
    /// this returns. An error means an internal invariant broke; the
    /// instance must be discarded.
    pub fn append(&mut self, value: T) -> Result<(), GrammarError> {
        self.grammar.append(START_RULE, PairAtom::Terminal(value))?;
        self.length += 1;
        Ok(())
    }

    /// Appends every terminal of an iterator, in order.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) -> Result<(), GrammarError> {
        for value in values {
            self.append(value)?;
        }
        Ok(())
    }

    /// Number of terminals consumed so far.
    pub fn len(&self) -> usize {
        self.length
    }

    /// True if no terminal has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of rules currently in the grammar, the start rule included.
    pub fn rule_count(&self) -> usize {
        self.grammar.rules.len()
    }

    /// Total number of symbols across all rule bodies.
    pub fn symbol_count(&self) -> usize {
        self.grammar
            .rules
            .values()
            .map(|rule| {
                let mut count = 0;
                let mut key = self.grammar.symbols[rule.guard].next;
                while key != rule.guard {
                    count += 1;
                    key = self.grammar.symbols[key].next;
                }
                count
            })
            .sum()
    }
}

impl<T: Hash + Eq + Clone> Default for Sequitur<T> {
    fn default() -> Self {
        Self::new()
    }
}
