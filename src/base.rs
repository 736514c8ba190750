//! The entrenchment-ordered belief base: *tell*, *ask*, *expand*, *revise*,
//! *retract*, and the `max_degree` reasoning primitive.
//!
//! Beliefs are kept in a `Vec`, sorted so that iteration yields
//! non-increasing entrenchment order — chosen over a [`std::collections::BinaryHeap`]
//! because `max_degree` needs grouped, ordered traversal, which a sorted
//! `Vec` gives directly (see `SPEC_FULL.md` §9).

use crate::error::CoreError;
use crate::expr::Expression;
use crate::order::Order;
use crate::sat::{self, WalkSatConfig};
use log::debug;
use rand::Rng;
use std::fmt;

/// A belief: a CNF expression tagged with its entrenchment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Belief {
    expr: Expression,
    order: Order,
}

impl Belief {
    /// Builds a belief, converting `expr` to CNF.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfRange`] if `order` is outside `[0, 1]`.
    pub fn new(expr: Expression, order: f64) -> Result<Belief, CoreError> {
        Ok(Belief {
            expr: expr.to_cnf(),
            order: Order::new(order)?,
        })
    }

    fn from_parts(expr: Expression, order: Order) -> Belief {
        Belief { expr, order }
    }

    /// This belief's CNF expression.
    pub fn expr(&self) -> &Expression {
        &self.expr
    }

    /// This belief's entrenchment order.
    pub fn order(&self) -> Order {
        self.order
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.expr, self.order)
    }
}

/// An ordered collection of beliefs, maintaining entrenchment and
/// consistency invariants across `tell`/`expand`/`revise`/`retract`.
#[derive(Debug, Default, Clone)]
pub struct BeliefBase {
    beliefs: Vec<Belief>,
    config: WalkSatConfig,
}

impl BeliefBase {
    /// Builds an empty belief base with the default WalkSAT configuration.
    pub fn new() -> BeliefBase {
        BeliefBase {
            beliefs: Vec::new(),
            config: WalkSatConfig::default(),
        }
    }

    /// Builds an empty belief base with a caller-supplied WalkSAT
    /// configuration (e.g. a smaller `max_flips` for a tighter time bound).
    pub fn with_config(config: WalkSatConfig) -> BeliefBase {
        BeliefBase {
            beliefs: Vec::new(),
            config,
        }
    }

    /// Iterates beliefs in non-increasing entrenchment order.
    pub fn iter(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.iter()
    }

    /// `true` if the base holds no beliefs.
    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    /// Number of beliefs held.
    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    /// The flat list of clause expressions extracted from every belief, fed
    /// to the SAT decider by `ask`/`max_degree`.
    pub fn clauses(&self) -> Vec<Expression> {
        self.beliefs
            .iter()
            .flat_map(|b| b.expr.conjuncts().into_iter().cloned())
            .collect()
    }

    fn reheapify(&mut self) {
        self.beliefs.sort_by(|a, b| b.order.cmp(&a.order));
    }

    /// Inserts `belief` without any consistency or order-maintenance
    /// reasoning beyond preserving the ordering invariant. Intended for
    /// bootstrap and for internal use by `expand`.
    pub fn tell(&mut self, belief: Belief) {
        self.beliefs.push(belief);
        self.reheapify();
    }

    /// `true` if the base entails `phi`, using `rng` for the WalkSAT search.
    pub fn ask(&self, phi: &Expression, rng: &mut impl Rng) -> Result<bool, CoreError> {
        sat::entails(&self.clauses(), phi, self.config, rng)
    }

    /// The largest `d` in `[0, 1]` such that the beliefs with `order >= d`
    /// entail `phi` — the entrenchment of `phi` in the base.
    pub fn max_degree(&self, phi: &Expression, rng: &mut impl Rng) -> Result<Order, CoreError> {
        if sat::entails(&[], phi, self.config, rng)? {
            return Ok(Order::ONE);
        }

        let mut accumulated: Vec<Expression> = Vec::new();
        let mut i = 0;
        while i < self.beliefs.len() {
            let group_order = self.beliefs[i].order;
            let mut j = i;
            while j < self.beliefs.len() && self.beliefs[j].order == group_order {
                accumulated.extend(self.beliefs[j].expr.conjuncts().into_iter().cloned());
                j += 1;
            }
            if sat::entails(&accumulated, phi, self.config, rng)? {
                return Ok(group_order);
            }
            i = j;
        }
        Ok(Order::ZERO)
    }

    /// Adds `new` to the base, lifting or capping the entrenchment of
    /// weaker-or-equal existing beliefs per epistemic-entrenchment semantics.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContradictoryBelief`] if the base already entails
    /// `¬new.expr`.
    pub fn expand(&mut self, new: Belief, rng: &mut impl Rng) -> Result<(), CoreError> {
        let negated_new = Expression::not(new.expr.clone());
        if self.ask(&negated_new, rng)? {
            return Err(CoreError::ContradictoryBelief);
        }

        if sat::entails(&[], &new.expr, self.config, rng)? {
            debug!("expand: new belief is a tautology, order -> 1");
            self.tell(Belief::from_parts(new.expr, Order::ONE));
            return Ok(());
        }

        // max_degree queries below must see the base as it stood before this
        // expand started, not partially updated by this same loop — otherwise
        // an early lift/cap could desync the sortedness max_degree relies on
        // for grouped traversal. So read against a snapshot and apply all
        // order updates in one pass at the end.
        let snapshot = self.clone();
        let mut updates: Vec<Option<Order>> = vec![None; self.beliefs.len()];

        for i in 0..self.beliefs.len() {
            let b_order = self.beliefs[i].order;
            if b_order > new.order {
                continue;
            }
            let b_expr = self.beliefs[i].expr.clone();

            let equivalent = {
                let forward = Expression::implies(b_expr.clone(), new.expr.clone());
                let backward = Expression::implies(new.expr.clone(), b_expr.clone());
                sat::entails(&[], &forward, self.config, rng)?
                    && sat::entails(&[], &backward, self.config, rng)?
            };

            if equivalent {
                debug!("expand: belief equivalent to new belief, lifted to {}", new.order);
                updates[i] = Some(new.order);
                continue;
            }

            let implication = Expression::implies(b_expr, new.expr.clone());
            let d = snapshot.max_degree(&implication, rng)?;

            updates[i] = Some(if b_order <= new.order && new.order < d {
                debug!("expand: belief lifted from {b_order} to {}", new.order);
                new.order
            } else {
                debug!("expand: belief capped at {d}");
                d
            });
        }

        for (i, update) in updates.into_iter().enumerate() {
            if let Some(order) = update {
                self.beliefs[i].order = order;
            }
        }

        self.reheapify();
        self.tell(new);
        Ok(())
    }

    /// Contracts the base so that `target` is no longer entailed, using an
    /// entrenchment-driven partial meet policy: repeatedly drops the least
    /// entrenched non-tautological belief until `target` is no longer
    /// entailed or the base is exhausted.
    ///
    /// No-op if `target` is not currently entailed, and no-op if `target` is
    /// itself a tautology (every base entails a tautology, so there is
    /// nothing to contract — per the minimal AGM contract, `retract` only
    /// guarantees `ask(target)` is false afterward when `target` is
    /// contingent). A belief is only ever protected from removal when it is
    /// itself a tautology (`sat::entails(&[], b.expr(), ..)`), not merely
    /// pinned at `order == 1` — a contingent belief can sit at the maximum
    /// entrenchment and must still be removable to restore consistency.
    pub fn retract(&mut self, target: &Expression, rng: &mut impl Rng) -> Result<(), CoreError> {
        if sat::entails(&[], target, self.config, rng)? {
            // target is a tautology: every base entails it, so retracting it
            // is impossible and the base is left unchanged.
            return Ok(());
        }

        if !self.ask(target, rng)? {
            return Ok(());
        }

        loop {
            let mut victim = None;
            for (idx, b) in self.beliefs.iter().enumerate().rev() {
                if !sat::entails(&[], &b.expr, self.config, rng)? {
                    victim = Some(idx);
                    break;
                }
            }

            let Some(idx) = victim else {
                break;
            };

            let removed = self.beliefs.remove(idx);
            debug!("retract: dropped belief {removed}");

            if !self.ask(target, rng)? {
                break;
            }
        }
        Ok(())
    }

    /// Revises the base with `new` via Levi's identity: contracts the base
    /// so it is consistent with `new.expr`, then expands with `new`.
    ///
    /// After `revise`, `ask(new.expr)` is true modulo WalkSAT's documented
    /// incompleteness.
    pub fn revise(&mut self, new: Belief, rng: &mut impl Rng) -> Result<(), CoreError> {
        let negated = Expression::not(new.expr.clone());
        self.retract(&negated, rng)?;
        self.expand(new, rng)
    }
}

impl fmt::Display for BeliefBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.beliefs {
            writeln!(f, "{b}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn a(name: &str) -> Expression {
        Expression::atom(name)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn basic_tell_and_ask() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(
            Belief::new(
                Expression::and([a("A"), a("B"), a("C"), Expression::not(a("D"))]),
                1.0,
            )
            .unwrap(),
        );

        assert!(kb.ask(&a("A"), &mut r).unwrap());
        assert!(kb.ask(&a("B"), &mut r).unwrap());
        assert!(!kb.ask(&Expression::implies(a("A"), a("D")), &mut r).unwrap());
        assert!(kb.ask(&Expression::not(a("D")), &mut r).unwrap());
    }

    #[test]
    fn tautology_promotion_on_expand() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        let tautology = Expression::or([a("A"), Expression::not(a("A"))]);
        kb.expand(Belief::new(tautology, 0.3).unwrap(), &mut r)
            .unwrap();
        assert_eq!(kb.iter().next().unwrap().order(), Order::ONE);
    }

    #[test]
    fn contradiction_rejected_base_unchanged() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 1.0).unwrap());

        let result = kb.expand(Belief::new(Expression::not(a("A")), 0.5).unwrap(), &mut r);
        assert_eq!(result, Err(CoreError::ContradictoryBelief));
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn max_degree_layering() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 0.9).unwrap());
        kb.tell(Belief::new(Expression::implies(a("A"), a("B")), 0.6).unwrap());
        kb.tell(Belief::new(a("C"), 0.4).unwrap());

        assert_eq!(kb.max_degree(&a("B"), &mut r).unwrap(), Order::new(0.6).unwrap());
        assert_eq!(kb.max_degree(&a("A"), &mut r).unwrap(), Order::new(0.9).unwrap());
        assert_eq!(kb.max_degree(&a("C"), &mut r).unwrap(), Order::new(0.4).unwrap());
        assert_eq!(
            kb.max_degree(&Expression::or([a("A"), Expression::not(a("A"))]), &mut r)
                .unwrap(),
            Order::ONE
        );
        assert_eq!(kb.max_degree(&a("D"), &mut r).unwrap(), Order::ZERO);
    }

    #[test]
    fn expansion_lift() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 0.5).unwrap());

        kb.expand(
            Belief::new(Expression::or([a("A"), a("B")]), 0.8).unwrap(),
            &mut r,
        )
        .unwrap();

        assert_eq!(kb.len(), 2);
        assert!(kb.iter().all(|b| b.order() == Order::new(0.8).unwrap()));
    }

    #[test]
    fn revision_via_levi() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(
            Belief::new(
                Expression::and([a("A"), a("B"), a("C"), Expression::not(a("D"))]),
                1.0,
            )
            .unwrap(),
        );

        kb.revise(Belief::new(a("D"), 1.0).unwrap(), &mut r).unwrap();

        assert!(kb.ask(&a("D"), &mut r).unwrap());
        assert!(!kb.ask(&Expression::not(a("D")), &mut r).unwrap());
    }

    #[test]
    fn invariant_non_increasing_order_after_expand() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 0.3).unwrap());
        kb.tell(Belief::new(a("B"), 0.9).unwrap());
        kb.expand(Belief::new(a("C"), 0.5).unwrap(), &mut r).unwrap();

        let orders: Vec<Order> = kb.iter().map(|b| b.order()).collect();
        let mut sorted = orders.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(orders, sorted);
    }

    #[test]
    fn levi_equivalence_agrees_with_direct_revise() {
        let mut kb_a = BeliefBase::new();
        let mut kb_b = BeliefBase::new();
        let mut r = rng();
        for kb in [&mut kb_a, &mut kb_b] {
            kb.tell(
                Belief::new(Expression::and([a("A"), a("B")]), 1.0).unwrap(),
            );
        }

        let new = Belief::new(Expression::not(a("A")), 1.0).unwrap();
        kb_a.revise(new.clone(), &mut r).unwrap();

        let negated = Expression::not(new.expr().clone());
        kb_b.retract(&negated, &mut r).unwrap();
        kb_b.expand(new, &mut r).unwrap();

        for q in [a("A"), a("B"), Expression::not(a("A"))] {
            assert_eq!(
                kb_a.ask(&q, &mut r).unwrap(),
                kb_b.ask(&q, &mut r).unwrap()
            );
        }
    }

    #[test]
    fn retract_removes_contingent_belief_pinned_at_max_order() {
        // A contingent belief sitting at order 1.0 is not a tautology and
        // must still be removable, or retract can never restore consistency.
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 1.0).unwrap());

        kb.retract(&a("A"), &mut r).unwrap();

        assert!(!kb.ask(&a("A"), &mut r).unwrap());
        assert!(kb.is_empty());
    }

    #[test]
    fn retract_of_tautology_is_noop() {
        let mut kb = BeliefBase::new();
        let mut r = rng();
        kb.tell(Belief::new(a("A"), 1.0).unwrap());

        let tautology = Expression::or([a("B"), Expression::not(a("B"))]);
        kb.retract(&tautology, &mut r).unwrap();

        assert_eq!(kb.len(), 1);
        assert!(kb.ask(&a("A"), &mut r).unwrap());
    }
}
