//! # entrench
//!
//! An epistemic-entrenchment belief base over propositional logic: a
//! collection of beliefs, each tagged with a degree of entrenchment in
//! `[0, 1]`, supporting the AGM-style operations *tell*, *ask*, *expand*,
//! *revise*, and *retract*. Queries are answered by reducing entailment to
//! propositional (un)satisfiability.
//!
//! ## Architecture Overview
//!
//! The crate is organized into three layers, leaves first:
//!
//! - **Expression kernel** ([`expr`]): propositional syntax tree, structural
//!   equality, CNF normalisation, free-symbol extraction, substitution.
//! - **SAT decider** ([`sat`]): a WalkSAT-style local-search decider and the
//!   `entails` helper built on top of it.
//! - **Belief base** ([`base`]): the entrenchment-ordered store and its
//!   `tell`/`ask`/`expand`/`revise`/`retract` operations.
//!
//! Control flow: callers build an [`expr::Expression`] via the kernel, wrap
//! it in a [`base::Belief`] with a numeric order, and submit it to a
//! [`base::BeliefBase`]; the base calls the SAT decider, which in turn
//! evaluates expressions through the kernel. Nothing in this crate performs
//! I/O, reads environment variables, or parses surface syntax — callers hand
//! over already-built [`expr::Expression`] values.
//!
//! ## Quick Start
//!
//! ```rust
//! use entrench::base::{Belief, BeliefBase};
//! use entrench::expr::Expression;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut kb = BeliefBase::new();
//!
//! let a = Expression::atom("A");
//! let b = Expression::atom("B");
//! let not_d = Expression::not(Expression::atom("D"));
//!
//! kb.tell(Belief::new(Expression::and([a.clone(), b, not_d]), 1.0).unwrap());
//!
//! assert!(kb.ask(&a, &mut rng).unwrap());
//! ```

pub mod base;
pub mod error;
pub mod expr;
pub mod order;
pub mod sat;

pub use base::{Belief, BeliefBase};
pub use error::CoreError;
pub use expr::Expression;
pub use order::Order;
pub use sat::{entails, solve, Model, WalkSatConfig};
