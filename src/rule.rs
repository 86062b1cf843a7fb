use crate::error::GrammarError;
use crate::grammar::{Grammar, Rule};
use crate::symbol::{PairAtom, RuleId, Symbol, SymbolNode};
use ahash::AHashSet as HashSet;
use log::{debug, trace};
use slotmap::DefaultKey;
use std::hash::Hash;

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Creates an empty rule: a fresh id and a self-linked guard.
    pub(crate) fn new_rule(&mut self) -> RuleId {
        let rule_id = self.ids.get();
        let guard = self.symbols.insert_with_key(|k| SymbolNode {
            symbol: Symbol::Guard(rule_id),
            prev: k,
            next: k,
        });
        self.rules.insert(
            rule_id,
            Rule {
                guard,
                refs: HashSet::new(),
            },
        );
        debug!("created rule {rule_id}");
        rule_id
    }

    /// Appends a referent to a rule body and indexes the digram it forms
    /// with the previous last symbol.
    pub(crate) fn append(
        &mut self,
        rule_id: RuleId,
        atom: PairAtom<T>,
    ) -> Result<DefaultKey, GrammarError> {
        let key = self.append_unindexed(rule_id, atom)?;
        let left = self.symbols[key].prev;
        self.learn(left)?; // no-op when the body was empty
        Ok(key)
    }

    /// Appends without touching the digram index. Used while assembling a
    /// fresh rule body, whose internal digram is only learned after the
    /// body has replaced both of its occurrences.
    pub(crate) fn append_unindexed(
        &mut self,
        rule_id: RuleId,
        atom: PairAtom<T>,
    ) -> Result<DefaultKey, GrammarError> {
        let guard = self
            .rules
            .get(&rule_id)
            .ok_or(GrammarError::UnknownRef { rule: rule_id })?
            .guard;
        let last = self.symbols[guard].prev;
        let key = self.new_symbol(atom)?;
        self.insert_right(last, key)?;
        Ok(key)
    }

    /// Removes a symbol from the arena; a rule reference also gives up its
    /// registration, which may cascade into a dissolve or a destroy.
    pub(crate) fn destroy_symbol(&mut self, key: DefaultKey) -> Result<(), GrammarError> {
        let node = self
            .symbols
            .remove(key)
            .ok_or(GrammarError::Disconnected)?;
        if let Symbol::RuleRef(rule_id) = node.symbol {
            self.killref(rule_id, key)?;
        }
        Ok(())
    }

    /// Unregisters a call-site. A rule left with a single call-site is no
    /// longer pulling its weight and is dissolved back into it; a rule
    /// left with none is destroyed.
    pub(crate) fn killref(
        &mut self,
        rule_id: RuleId,
        sym: DefaultKey,
    ) -> Result<(), GrammarError> {
        let remaining = {
            let rule = self
                .rules
                .get_mut(&rule_id)
                .ok_or(GrammarError::UnknownRef { rule: rule_id })?;
            if !rule.refs.remove(&sym) {
                return Err(GrammarError::UnknownRef { rule: rule_id });
            }
            rule.refcount()
        };
        match remaining {
            1 => self.dissolve(rule_id),
            0 => self.destroy_rule(rule_id),
            _ => Ok(()),
        }
    }

    /// Drops an unreferenced rule. The body must already be empty.
    fn destroy_rule(&mut self, rule_id: RuleId) -> Result<(), GrammarError> {
        let rule = self
            .rules
            .remove(&rule_id)
            .ok_or(GrammarError::UnknownRef { rule: rule_id })?;
        if self.symbols[rule.guard].next != rule.guard {
            return Err(GrammarError::NonEmptyDestroy { rule: rule_id });
        }
        self.symbols.remove(rule.guard);
        self.ids.free(rule_id);
        trace!("destroyed rule {rule_id}");
        Ok(())
    }

    /// Replaces the digram occurrence starting at `first` with a reference
    /// to `rule_id`.
    ///
    /// The sequencing matters: the three digrams the window takes part in
    /// are forgotten and the index repaired for runs of equal referents
    /// before the splice, and only the call-site's own digram and its left
    /// neighbour are learned afterwards.
    pub(crate) fn apply(
        &mut self,
        rule_id: RuleId,
        first: DefaultKey,
    ) -> Result<DefaultKey, GrammarError> {
        let (first, second) = self.digram(first)?;
        let before = self.symbols[first].prev;
        let after = self.symbols[second].next;

        self.forget(before);
        self.forget(first);
        self.forget(second);
        self.reindex_runs(first, second, before, after);

        let call = self.new_symbol(PairAtom::Rule(rule_id))?;
        self.replace_digram(first, call)?;

        // the cascade from the removed symbols may already have consumed
        // the call-site; every learn re-checks
        if self.symbols.contains_key(call) {
            self.learn(call)?;
        }
        if self.symbols.contains_key(call) {
            let left = self.symbols[call].prev;
            self.learn(left)?;
        }
        Ok(call)
    }

    /// Splices a rule's body back in place of its sole remaining
    /// call-site, then destroys the rule.
    pub(crate) fn dissolve(&mut self, rule_id: RuleId) -> Result<(), GrammarError> {
        let (guard, call) = {
            let rule = self
                .rules
                .get(&rule_id)
                .ok_or(GrammarError::UnknownRef { rule: rule_id })?;
            debug_assert_eq!(rule.refcount(), 1, "dissolve requires exactly one call-site");
            let call = rule
                .refs
                .iter()
                .next()
                .copied()
                .ok_or(GrammarError::UnknownRef { rule: rule_id })?;
            (rule.guard, call)
        };
        if !self.symbols.contains_key(call) {
            return Err(GrammarError::UnknownRef { rule: rule_id });
        }
        debug!("dissolving rule {rule_id} into its last call-site");

        let before = self.symbols[call].prev;
        let after = self.symbols[call].next;
        self.forget(before);
        self.forget(call);

        let first = self.symbols[guard].next;
        let last = self.symbols[guard].prev;
        if first == guard {
            return Err(GrammarError::Disconnected);
        }
        // detach the body from its guard; the call-site stands on both
        // sides of the splice window
        self.link(guard, guard);
        self.reindex_runs(call, call, before, after);

        // destroys the call-site, dropping the refcount to zero and the
        // rule with it
        self.replace_symbol(call, first, last)?;

        if self.symbols.contains_key(last) {
            self.learn(last)?;
        }
        if self.symbols.contains_key(before) {
            self.learn(before)?;
        }
        Ok(())
    }

    /// Restores digram uniqueness after the index reported a second,
    /// non-overlapping occurrence of the digram at `prior`.
    pub(crate) fn make_unique(
        &mut self,
        prior: DefaultKey,
        fresh: DefaultKey,
    ) -> Result<(), GrammarError> {
        let (prior, second) = self.digram(prior)?;
        let before = self.symbols[prior].prev;
        let after = self.symbols[second].next;

        if self.is_guard(before) && self.is_guard(after) {
            // the prior occurrence is a complete rule body: reuse that rule
            let rule_id = match &self.symbols[before].symbol {
                Symbol::Guard(id) => *id,
                _ => return Err(GrammarError::Disconnected),
            };
            debug!("reusing rule {rule_id} for a repeated digram");
            self.apply(rule_id, fresh)?;
            return Ok(());
        }

        // abstract the digram into a fresh rule and rewrite both occurrences
        let left = self.atom(prior).ok_or(GrammarError::Disconnected)?;
        let right = self.atom(second).ok_or(GrammarError::Disconnected)?;
        let rule_id = self.new_rule();
        self.append_unindexed(rule_id, left)?;
        self.append_unindexed(rule_id, right)?;

        self.apply(rule_id, prior)?;
        if !self.symbols.contains_key(fresh) {
            return Err(GrammarError::IndexDesync);
        }
        self.apply(rule_id, fresh)?;

        // the body's internal digram is indexed once, after both rewrites;
        // the second rewrite's cascade may already have dissolved the rule
        if let Some(guard) = self.rules.get(&rule_id).map(|rule| rule.guard) {
            let body_first = self.symbols[guard].next;
            self.learn(body_first)?;
        }
        Ok(())
    }
}
