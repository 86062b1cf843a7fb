//! # sqt: online Sequitur grammar induction
//!
//! Incrementally maintains a context-free grammar whose start rule expands
//! to exactly the sequence consumed so far, while enforcing two invariants
//! after every appended terminal:
//!
//! 1. **Digram uniqueness**: no pair of adjacent symbols occurs more than
//!    once across all rule bodies.
//! 2. **Rule utility**: every rule except the start rule is referenced at
//!    least twice.
//!
//! Repeated digrams are abstracted into rules as they appear; rules whose
//! reference count drops to one are dissolved back into their last
//! call-site. Both rewrites run to completion inside [`Sequitur::append`],
//! in amortized constant time per terminal.
//!
//! ## Example
//!
//! ```
//! use sqt::Sequitur;
//!
//! let mut seq = Sequitur::new();
//! seq.extend("abcabcabc".chars()).unwrap();
//!
//! // the grammar expands back to the input
//! let restored: String = seq.walk().collect();
//! assert_eq!(restored, "abcabcabc");
//!
//! // and the repetition was captured as rules
//! assert!(seq.rule_count() > 1);
//! ```
//!
//! Grammar state is per-instance; there are no globals and no reset
//! rituals. Terminals only need `Eq + Hash + Clone`.

mod digram;
mod error;
mod grammar;
mod id_gen;
mod iter;
mod rule;
mod sequitur;
mod symbol;

#[cfg(test)]
mod tests;

pub use error::GrammarError;
pub use iter::{RuleItem, Walk};
pub use sequitur::{Sequitur, START_RULE};
pub use symbol::RuleId;
