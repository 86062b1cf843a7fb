use slotmap::DefaultKey;

/// Rule identifiers. `0` is always the start rule.
pub type RuleId = u32;

/// Symbol variants making up rule bodies.
///
/// Replaces the dynamic dispatch of classic Sequitur implementations with a
/// tagged enum. The guard carries its owning rule's id so that a digram
/// spanning a whole body can be traced back to its rule without a table
/// lookup.
#[derive(Debug)]
pub(crate) enum Symbol<T> {
    /// A terminal from the input alphabet.
    Terminal(T),

    /// A non-terminal: one call-site of a rule.
    RuleRef(RuleId),

    /// The sentinel anchoring a circular rule body. `guard.next` is the
    /// first body symbol, `guard.prev` the last; `guard.next == guard`
    /// iff the body is empty.
    Guard(RuleId),
}

/// A node of the circular doubly-linked list representing a rule body.
///
/// A freshly allocated node is self-linked (`prev == next == self`); every
/// splice operation requires that disconnected state.
#[derive(Debug)]
pub(crate) struct SymbolNode<T> {
    pub symbol: Symbol<T>,
    pub prev: DefaultKey,
    pub next: DefaultKey,
}

/// One side of a digram key: the referent identity of a symbol.
///
/// The enum discriminant keeps rule identities apart from every possible
/// terminal, so a rule id can never collide with a terminal key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PairAtom<T> {
    Terminal(T),
    Rule(RuleId),
}

/// Index key for the digram starting at some symbol: the referent
/// identities of the symbol and its right neighbour.
pub(crate) type DigramKey<T> = (PairAtom<T>, PairAtom<T>);
