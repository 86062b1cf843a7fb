use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::symbol::DigramKey;
use slotmap::DefaultKey;
use std::hash::Hash;

/// What `learn` did with a candidate digram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LearnOutcome {
    /// The digram was new and is now indexed at this position.
    Learned,
    /// Guard-adjacent, already indexed here, or overlapping the indexed
    /// occurrence; nothing to do.
    Ignored,
    /// A prior non-overlapping occurrence existed; the grammar was
    /// rewritten to remove the duplicate.
    Triggered,
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Looks up the position currently indexed under a digram key.
    pub(crate) fn seen(&self, key: &DigramKey<T>) -> Option<DefaultKey> {
        self.digrams.get(key).copied()
    }

    /// Records the digram starting at `first`, or rewrites the grammar
    /// when a non-overlapping occurrence of it is already indexed.
    pub(crate) fn learn(&mut self, first: DefaultKey) -> Result<LearnOutcome, GrammarError> {
        let Some(key) = self.ref_digram(first) else {
            return Ok(LearnOutcome::Ignored);
        };
        let Some(prior) = self.seen(&key) else {
            self.digrams.insert(key, first);
            return Ok(LearnOutcome::Learned);
        };
        if prior == first {
            return Ok(LearnOutcome::Ignored);
        }
        if !self.symbols.contains_key(prior) || self.ref_digram(prior).as_ref() != Some(&key) {
            return Err(GrammarError::IndexDesync);
        }
        // occurrences sharing a symbol: keep the earlier, left-preferenced one
        if self.symbols[prior].next == first || self.symbols[first].next == prior {
            return Ok(LearnOutcome::Ignored);
        }
        self.make_unique(prior, first)?;
        Ok(LearnOutcome::Triggered)
    }

    /// Drops the index entry for the digram at `first`, but only when the
    /// entry still points at `first` itself. A mismatch means a rewrite
    /// already re-pointed the key at another occurrence, and the entry must
    /// be left alone.
    pub(crate) fn forget(&mut self, first: DefaultKey) {
        if let Some(key) = self.ref_digram(first) {
            if self.digrams.get(&key) == Some(&first) {
                self.digrams.remove(&key);
            }
        }
    }

    /// Repairs the index around a window that is about to be replaced.
    ///
    /// When the window sat inside a run of equal referents, the forgotten
    /// entry may have been the run's only indexed pair while an adjacent
    /// pair of the run survives unindexed. Re-point the key at the
    /// surviving pair so the left-preference for overlapping occurrences
    /// holds across rewrites. `left_sym`/`right_sym` are the window's
    /// outermost symbols, `before`/`after` its neighbours.
    pub(crate) fn reindex_runs(
        &mut self,
        left_sym: DefaultKey,
        right_sym: DefaultKey,
        before: DefaultKey,
        after: DefaultKey,
    ) {
        if !self.is_guard(after) {
            let beyond = self.symbols[after].next;
            if !self.is_guard(beyond)
                && self.same_referent(right_sym, after)
                && self.same_referent(after, beyond)
            {
                if let Some(key) = self.ref_digram(after) {
                    self.digrams.insert(key, after);
                }
            }
        }
        if !self.is_guard(before) {
            let ahead = self.symbols[before].prev;
            if !self.is_guard(ahead)
                && self.same_referent(ahead, before)
                && self.same_referent(before, left_sym)
            {
                if let Some(key) = self.ref_digram(ahead) {
                    self.digrams.insert(key, ahead);
                }
            }
        }
    }
}
