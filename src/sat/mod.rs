//! WalkSAT decider.
//!
//! Given a set of clauses already in CNF, [`solve`] returns either a
//! satisfying model or `None` — "no model found within the search budget".
//! WalkSAT is *incomplete*: a `None` result does not prove unsatisfiability,
//! it only means the randomised local search ran out of flips. That is a
//! legitimate value, not an error (see [`crate::error::CoreError`]'s docs) —
//! [`entails`] and [`crate::base::BeliefBase`] both treat it as "entailed" /
//! "consistent", which is the documented precision limit of the core.

use crate::error::CoreError;
use crate::expr::Expression;
use log::{debug, trace};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Parameters governing the WalkSAT search.
///
/// `max_flips` is, per the design, the core's only cancellation-equivalent
/// knob — callers wanting a stricter time bound pass a smaller value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkSatConfig {
    /// Probability of a fully random walk step versus a greedy one.
    pub p: f64,
    /// Maximum number of flips before giving up.
    pub max_flips: usize,
}

impl Default for WalkSatConfig {
    fn default() -> Self {
        WalkSatConfig {
            p: 0.5,
            max_flips: 1000,
        }
    }
}

/// A satisfying truth assignment, keyed by atom name.
pub type Model = HashMap<String, bool>;

/// Returns `true` with probability `p`.
fn prob(p: f64, rng: &mut impl Rng) -> bool {
    rng.gen_range(0.0..1.0) < p
}

/// Attempts to find a model satisfying every clause in `clauses`.
///
/// Every element of `clauses` must already be in CNF-clause form: a literal,
/// a disjunction of literals, or a constant (see [`Expression::is_clause`]).
///
/// # Errors
///
/// Returns [`CoreError::NotCnf`] if any clause is not in that form.
///
/// # Returns
///
/// `Ok(Some(model))` if a satisfying assignment was found, `Ok(None)` if the
/// search budget (`config.max_flips`) was exhausted without finding one.
pub fn solve(
    clauses: &[Expression],
    config: WalkSatConfig,
    rng: &mut impl Rng,
) -> Result<Option<Model>, CoreError> {
    for c in clauses {
        if !c.is_clause() {
            return Err(CoreError::NotCnf);
        }
    }

    let symbols: HashSet<String> = clauses
        .iter()
        .flat_map(|c| c.free_symbols())
        .collect();

    if symbols.is_empty() {
        let empty_model = Model::new();
        let all_true = clauses.iter().all(|c| eval_clause(c, &empty_model));
        return Ok(if all_true { Some(empty_model) } else { None });
    }

    let mut model: Model = symbols.iter().map(|s| (s.clone(), rng.gen())).collect();

    for flip in 0..config.max_flips {
        let unsatisfied: Vec<&Expression> = clauses
            .iter()
            .filter(|c| !eval_clause(c, &model))
            .collect();

        if unsatisfied.is_empty() {
            debug!("walksat: satisfied after {flip} flips");
            return Ok(Some(model));
        }

        let idx = rng.gen_range(0..unsatisfied.len());
        let clause = unsatisfied[idx];
        let clause_symbols: Vec<String> = clause.free_symbols().into_iter().collect();

        let chosen = if prob(config.p, rng) {
            &clause_symbols[rng.gen_range(0..clause_symbols.len())]
        } else {
            best_flip(&clause_symbols, clauses, &model)
        };

        let cur = model[chosen];
        model.insert(chosen.clone(), !cur);
        trace!("walksat: flip {flip} -> {chosen}");
    }

    debug!("walksat: exhausted {} flips, giving up", config.max_flips);
    Ok(None)
}

/// Among `symbols`, returns the one whose flip maximises the number of
/// satisfied clauses, ties broken by canonical (lexicographic) symbol order.
fn best_flip<'a>(symbols: &'a [String], clauses: &[Expression], model: &Model) -> &'a String {
    let mut model = model.clone();
    let mut best: Option<(&String, usize)> = None;
    for sym in symbols {
        let cur = model[sym];
        model.insert(sym.clone(), !cur);
        let count = clauses.iter().filter(|c| eval_clause(c, &model)).count();
        model.insert(sym.clone(), cur);

        best = Some(match best {
            None => (sym, count),
            Some((best_sym, best_count)) => {
                if count > best_count || (count == best_count && sym < best_sym) {
                    (sym, count)
                } else {
                    (best_sym, best_count)
                }
            }
        });
    }
    best.expect("clause must have at least one free symbol").0
}

fn eval_clause(clause: &Expression, model: &Model) -> bool {
    match clause.substitute(model) {
        Ok(Expression::Const(v)) => v,
        // A clause's free symbols are always a subset of `model`'s keys by
        // construction (model is built from the union of all clauses'
        // free symbols), so substitute never fails here.
        _ => unreachable!("clause should fully evaluate under a complete model"),
    }
}

/// Semantic deduction theorem: `Γ ⊨ φ` iff `Γ ∪ {¬φ}` is unsatisfiable.
///
/// Because [`solve`] is incomplete, `entails` can falsely claim entailment
/// when `Γ ∪ {¬φ}` is in fact satisfiable but WalkSAT failed to find the
/// witness within its flip budget. This is an accepted imprecision of the
/// core, not a bug.
pub fn entails(
    kb_clauses: &[Expression],
    phi: &Expression,
    config: WalkSatConfig,
    rng: &mut impl Rng,
) -> Result<bool, CoreError> {
    let negated = Expression::not(phi.clone()).to_cnf();
    if let Expression::Const(false) = negated {
        // ~phi is unsatisfiable on its own, i.e. phi is a tautology.
        return Ok(true);
    }

    let mut extended: Vec<Expression> = kb_clauses.to_vec();
    extended.extend(negated.conjuncts().into_iter().cloned());

    Ok(solve(&extended, config, rng)?.is_none())
}
