//! Error taxonomy for the core.
//!
//! Every fallible public operation returns a [`CoreError`]. WalkSAT's
//! incompleteness (a legitimate `None` from [`crate::sat::solve`]) is
//! deliberately *not* represented here — see the module docs on `sat`.

use thiserror::Error;

/// The single error type surfaced by the public API.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CoreError {
    /// A [`crate::base::Belief`] was constructed with an entrenchment order
    /// outside `[0, 1]`.
    #[error("entrenchment order {order} is out of range [0, 1]")]
    OutOfRange {
        /// The offending value, rendered for diagnostics.
        order: String,
    },

    /// The SAT decider was handed clauses that are not in CNF.
    #[error("clause is not in conjunctive normal form")]
    NotCnf,

    /// `BeliefBase::expand` was asked to add a belief whose negation the
    /// base already entails.
    #[error("belief contradicts the base")]
    ContradictoryBelief,

    /// `Expression::substitute` was given a model missing a free symbol.
    #[error("symbol `{symbol}` has no assignment in the model")]
    UnassignedSymbol {
        /// The unassigned atom name.
        symbol: String,
    },
}
