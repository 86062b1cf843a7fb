use crate::sequitur::{Sequitur, START_RULE};
use crate::symbol::{RuleId, Symbol};
use slotmap::DefaultKey;
use std::hash::Hash;

/// Lazy traversal of the start rule with every rule reference inlined;
/// yields the full input sequence in order. Restartable: each call to
/// [`Sequitur::walk`] begins anew.
pub struct Walk<'a, T> {
    sequitur: &'a Sequitur<T>,
    cursor: DefaultKey,
    stack: Vec<DefaultKey>,
}

impl<'a, T: Hash + Eq + Clone> Iterator for Walk<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let grammar = &self.sequitur.grammar;
        loop {
            let node = &grammar.symbols[self.cursor];
            match &node.symbol {
                Symbol::Terminal(value) => {
                    self.cursor = node.next;
                    return Some(value);
                }
                Symbol::RuleRef(rule_id) => {
                    let guard = grammar
                        .rules
                        .get(rule_id)
                        .expect("referenced rule exists")
                        .guard;
                    self.stack.push(self.cursor);
                    self.cursor = grammar.symbols[guard].next;
                }
                Symbol::Guard(_) => {
                    // end of a body: resume behind the call-site, or stop
                    // when this was the start rule's guard
                    let parent = self.stack.pop()?;
                    self.cursor = grammar.symbols[parent].next;
                }
            }
        }
    }
}

/// One element of a rule body as reported by [`Sequitur::rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleItem<'a, T> {
    Terminal(&'a T),
    Rule(RuleId),
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Iterates over the reconstructed input sequence.
    pub fn walk(&self) -> Walk<'_, T> {
        let guard = self
            .grammar
            .rules
            .get(&START_RULE)
            .expect("start rule exists")
            .guard;
        Walk {
            sequitur: self,
            cursor: self.grammar.symbols[guard].next,
            stack: Vec::new(),
        }
    }

    /// Iterates over every rule and its body, start rule first, then
    /// ascending rule id.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, Vec<RuleItem<'_, T>>)> + '_ {
        let mut ids: Vec<RuleId> = self.grammar.rules.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| {
            let guard = self
                .grammar
                .rules
                .get(&id)
                .expect("listed rule exists")
                .guard;
            let mut body = Vec::new();
            let mut key = self.grammar.symbols[guard].next;
            while key != guard {
                body.push(match &self.grammar.symbols[key].symbol {
                    Symbol::Terminal(value) => RuleItem::Terminal(value),
                    Symbol::RuleRef(rule_id) => RuleItem::Rule(*rule_id),
                    Symbol::Guard(_) => unreachable!("guards only anchor bodies"),
                });
                key = self.grammar.symbols[key].next;
            }
            (id, body)
        })
    }
}
