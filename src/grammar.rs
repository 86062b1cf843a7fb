use crate::error::GrammarError;
use crate::id_gen::IdGenerator;
use crate::symbol::{DigramKey, PairAtom, RuleId, Symbol, SymbolNode};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use slotmap::{DefaultKey, SlotMap};
use std::hash::Hash;

/// A production: the guard anchoring its circular body plus the set of live
/// call-sites. The refs set is a back-edge only; it owns nothing and never
/// keeps a rule alive.
#[derive(Debug)]
pub(crate) struct Rule {
    pub guard: DefaultKey,
    pub refs: HashSet<DefaultKey>,
}

impl Rule {
    pub fn refcount(&self) -> usize {
        self.refs.len()
    }
}

/// All grammar state owned by one `Sequitur` instance: the symbol arena,
/// the digram index, and the rule table. Slot keys double as the stable
/// identities the index's identity-equal checks rely on.
pub(crate) struct Grammar<T> {
    pub(crate) symbols: SlotMap<DefaultKey, SymbolNode<T>>,
    pub(crate) digrams: HashMap<DigramKey<T>, DefaultKey>,
    pub(crate) rules: HashMap<RuleId, Rule>,
    pub(crate) ids: IdGenerator,
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Fresh grammar holding a single empty start rule.
    pub(crate) fn new() -> Self {
        let mut grammar = Self {
            symbols: SlotMap::new(),
            digrams: HashMap::new(),
            rules: HashMap::new(),
            ids: IdGenerator::new(),
        };
        let rule_id = grammar.new_rule();
        assert_eq!(rule_id, 0, "first rule must be the start rule");
        grammar
    }

    /// Allocates a self-linked (disconnected) node for the given referent.
    /// A rule reference registers itself with its target rule for as long
    /// as it lives.
    pub(crate) fn new_symbol(&mut self, atom: PairAtom<T>) -> Result<DefaultKey, GrammarError> {
        let (symbol, target) = match atom {
            PairAtom::Terminal(value) => (Symbol::Terminal(value), None),
            PairAtom::Rule(id) => (Symbol::RuleRef(id), Some(id)),
        };
        let key = self.symbols.insert_with_key(|k| SymbolNode {
            symbol,
            prev: k,
            next: k,
        });
        if let Some(id) = target {
            self.rules
                .get_mut(&id)
                .ok_or(GrammarError::UnknownRef { rule: id })?
                .refs
                .insert(key);
        }
        Ok(key)
    }

    #[inline]
    pub(crate) fn is_guard(&self, key: DefaultKey) -> bool {
        matches!(self.symbols[key].symbol, Symbol::Guard(_))
    }

    /// Low-level pointer update; index maintenance is the caller's job.
    #[inline]
    pub(crate) fn link(&mut self, left: DefaultKey, right: DefaultKey) {
        self.symbols[left].next = right;
        self.symbols[right].prev = left;
    }

    /// Splices a disconnected node between `left` and its current right
    /// neighbour.
    pub(crate) fn insert_right(
        &mut self,
        left: DefaultKey,
        node: DefaultKey,
    ) -> Result<(), GrammarError> {
        if self.symbols[node].prev != node || self.symbols[node].next != node {
            return Err(GrammarError::Disconnected);
        }
        let right = self.symbols[left].next;
        self.link(left, node);
        self.link(node, right);
        Ok(())
    }

    /// The two-symbol window `(s, s.right)`, provided neither side is a
    /// guard and `s` is connected.
    pub(crate) fn digram(
        &self,
        first: DefaultKey,
    ) -> Result<(DefaultKey, DefaultKey), GrammarError> {
        let second = self.symbols[first].next;
        if second == first || self.is_guard(first) || self.is_guard(second) {
            return Err(GrammarError::Disconnected);
        }
        Ok((first, second))
    }

    /// The referent identity of a symbol; guards have none.
    pub(crate) fn atom(&self, key: DefaultKey) -> Option<PairAtom<T>> {
        match &self.symbols[key].symbol {
            Symbol::Terminal(value) => Some(PairAtom::Terminal(value.clone())),
            Symbol::RuleRef(id) => Some(PairAtom::Rule(*id)),
            Symbol::Guard(_) => None,
        }
    }

    /// The pair of referent identities keying the digram at `first`, or
    /// `None` when either side is a guard.
    pub(crate) fn ref_digram(&self, first: DefaultKey) -> Option<DigramKey<T>> {
        let left = self.atom(first)?;
        let right = self.atom(self.symbols[first].next)?;
        Some((left, right))
    }

    /// True when both symbols carry the same referent. Guards never match.
    pub(crate) fn same_referent(&self, a: DefaultKey, b: DefaultKey) -> bool {
        match (&self.symbols[a].symbol, &self.symbols[b].symbol) {
            (Symbol::Terminal(x), Symbol::Terminal(y)) => x == y,
            (Symbol::RuleRef(x), Symbol::RuleRef(y)) => x == y,
            _ => false,
        }
    }

    /// Replaces the two-node window at `first` with the disconnected node
    /// `with`. The removed nodes are destroyed, which cascades through
    /// killref. Callers forget the broken digrams beforehand and learn the
    /// newly formed ones afterwards.
    pub(crate) fn replace_digram(
        &mut self,
        first: DefaultKey,
        with: DefaultKey,
    ) -> Result<DefaultKey, GrammarError> {
        if self.symbols[with].prev != with || self.symbols[with].next != with {
            return Err(GrammarError::Disconnected);
        }
        let (first, second) = self.digram(first)?;
        let before = self.symbols[first].prev;
        let after = self.symbols[second].next;
        self.link(before, with);
        self.link(with, after);
        self.destroy_symbol(first)?;
        self.destroy_symbol(second)?;
        Ok(with)
    }

    /// Replaces the single symbol `at` with the detached chain
    /// `first..=last`, destroying `at`. Used when a rule body is spliced
    /// back into its last call-site.
    pub(crate) fn replace_symbol(
        &mut self,
        at: DefaultKey,
        first: DefaultKey,
        last: DefaultKey,
    ) -> Result<(), GrammarError> {
        let before = self.symbols[at].prev;
        let after = self.symbols[at].next;
        self.link(before, first);
        self.link(last, after);
        self.destroy_symbol(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminals(grammar: &mut Grammar<char>, values: &[char]) -> Vec<DefaultKey> {
        values
            .iter()
            .map(|&c| grammar.new_symbol(PairAtom::Terminal(c)).unwrap())
            .collect()
    }

    #[test]
    fn new_symbol_is_self_linked() {
        let mut grammar = Grammar::new();
        let key = grammar.new_symbol(PairAtom::Terminal('x')).unwrap();
        assert_eq!(grammar.symbols[key].prev, key);
        assert_eq!(grammar.symbols[key].next, key);
    }

    #[test]
    fn insert_right_splices() {
        let mut grammar = Grammar::new();
        let keys = terminals(&mut grammar, &['a', 'b', 'c']);
        grammar.insert_right(keys[0], keys[1]).unwrap();
        grammar.insert_right(keys[1], keys[2]).unwrap();

        assert_eq!(grammar.symbols[keys[0]].next, keys[1]);
        assert_eq!(grammar.symbols[keys[1]].next, keys[2]);
        assert_eq!(grammar.symbols[keys[2]].next, keys[0]);
        assert_eq!(grammar.symbols[keys[0]].prev, keys[2]);
    }

    #[test]
    fn insert_right_rejects_connected_node() {
        let mut grammar = Grammar::new();
        let keys = terminals(&mut grammar, &['a', 'b', 'c']);
        grammar.insert_right(keys[0], keys[1]).unwrap();
        assert_eq!(
            grammar.insert_right(keys[2], keys[1]),
            Err(GrammarError::Disconnected)
        );
    }

    #[test]
    fn digram_rejects_guards_and_disconnected() {
        let mut grammar = Grammar::<char>::new();
        let guard = grammar.rules.get(&0).unwrap().guard;
        assert_eq!(grammar.digram(guard), Err(GrammarError::Disconnected));

        let lone = grammar.new_symbol(PairAtom::Terminal('a')).unwrap();
        assert_eq!(grammar.digram(lone), Err(GrammarError::Disconnected));
    }

    #[test]
    fn ref_digram_keys_terminals_and_rules_apart() {
        let mut grammar = Grammar::new();
        let term = grammar.new_symbol(PairAtom::Terminal('z')).unwrap();
        let call = grammar.new_symbol(PairAtom::Rule(0)).unwrap();
        grammar.insert_right(term, call).unwrap();

        let key = grammar.ref_digram(term).unwrap();
        assert_eq!(key, (PairAtom::Terminal('z'), PairAtom::Rule(0)));
    }

    #[test]
    fn replace_digram_splices_in_place() {
        let mut grammar = Grammar::new();
        let keys = terminals(&mut grammar, &['a', 'b', 'c', 'd']);
        for pair in keys.windows(2) {
            grammar.insert_right(pair[0], pair[1]).unwrap();
        }
        let fresh = grammar.new_symbol(PairAtom::Terminal('e')).unwrap();

        let got = grammar.replace_digram(keys[1], fresh).unwrap();
        assert_eq!(got, fresh);
        assert_eq!(grammar.symbols[keys[0]].next, fresh);
        assert_eq!(grammar.symbols[fresh].next, keys[3]);
        assert_eq!(grammar.symbols[keys[3]].prev, fresh);
        assert!(!grammar.symbols.contains_key(keys[1]));
        assert!(!grammar.symbols.contains_key(keys[2]));
    }

    #[test]
    fn replace_symbol_splices_chain() {
        let mut grammar = Grammar::new();
        let keys = terminals(&mut grammar, &['a', 'b', 'c']);
        for pair in keys.windows(2) {
            grammar.insert_right(pair[0], pair[1]).unwrap();
        }
        let chain = terminals(&mut grammar, &['x', 'y']);
        grammar.insert_right(chain[0], chain[1]).unwrap();

        grammar.replace_symbol(keys[1], chain[0], chain[1]).unwrap();
        assert_eq!(grammar.symbols[keys[0]].next, chain[0]);
        assert_eq!(grammar.symbols[chain[0]].next, chain[1]);
        assert_eq!(grammar.symbols[chain[1]].next, keys[2]);
        assert!(!grammar.symbols.contains_key(keys[1]));
    }
}
