use crate::symbol::RuleId;

/// Fatal failures of the grammar machinery.
///
/// None of these arise from malformed input; each one means an internal
/// invariant no longer holds and the instance must be abandoned. Expected
/// no-ops of normal operation (overlapping learns, identity-mismatched
/// forgets) are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A splice or digram operation found a symbol whose links violate the
    /// operation's precondition.
    #[error("symbol links violate the operation's precondition")]
    Disconnected,

    /// A call-site was unregistered twice, or never registered at all.
    #[error("symbol is not a registered call-site of rule {rule}")]
    UnknownRef { rule: RuleId },

    /// A rule was destroyed while symbols remained in its body.
    #[error("rule {rule} destroyed with a non-empty body")]
    NonEmptyDestroy { rule: RuleId },

    /// The digram index handed out a position that no longer represents
    /// the digram it is keyed under.
    #[error("digram index entry no longer matches its recorded position")]
    IndexDesync,
}
