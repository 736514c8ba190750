//! Propositional expression kernel.
//!
//! [`Expression`] is an immutable propositional formula over named atomic
//! symbols. Smart constructors ([`Expression::and`], [`Expression::or`])
//! flatten and sort their arguments as they build, so the derived
//! `PartialEq`/`Ord` on the tree already *is* canonical equality — no
//! separate canonicalisation pass is needed to compare two expressions.
//!
//! [`Expression::to_cnf`] produces a semantically equivalent conjunctive
//! normal form by eliminating `Iff`/`Implies`, pushing `Not` inward, and
//! distributing `Or` over `And`.

use crate::error::CoreError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A propositional formula.
///
/// Structural equality (`PartialEq`/`Eq`, and therefore `Hash`) is canonical
/// equality: two expressions compare equal iff their canonical forms are
/// identical. `And`/`Or` nodes are only ever built through the smart
/// constructors, which flatten nested same-operator children and sort them,
/// so every `Expression` value reachable through the public API is already
/// in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expression {
    /// A named propositional variable.
    Atom(String),
    /// Negation.
    Not(Box<Expression>),
    /// N-ary conjunction, flattened and sorted. Never empty or singleton —
    /// the smart constructor collapses those cases.
    And(Vec<Expression>),
    /// N-ary disjunction, flattened and sorted. Never empty or singleton.
    Or(Vec<Expression>),
    /// Material implication, surface form only — eliminated by `to_cnf`.
    Implies(Box<Expression>, Box<Expression>),
    /// Biconditional, surface form only — eliminated by `to_cnf`.
    Iff(Box<Expression>, Box<Expression>),
    /// A Boolean constant.
    Const(bool),
}

impl Expression {
    /// Builds an atom. `name` must be non-empty.
    pub fn atom<S: Into<String>>(name: S) -> Expression {
        let name = name.into();
        debug_assert!(!name.is_empty(), "atom name must be non-empty");
        Expression::Atom(name)
    }

    /// Builds a negation.
    pub fn not(e: Expression) -> Expression {
        match e {
            // Double-negation elimination happens here too, so it's free
            // for callers who build `Not(Not(x))` directly rather than via to_cnf.
            Expression::Not(inner) => *inner,
            Expression::Const(b) => Expression::Const(!b),
            other => Expression::Not(Box::new(other)),
        }
    }

    /// Builds a material implication `a -> b`.
    pub fn implies(a: Expression, b: Expression) -> Expression {
        Expression::Implies(Box::new(a), Box::new(b))
    }

    /// Builds a biconditional `a <-> b`.
    pub fn iff(a: Expression, b: Expression) -> Expression {
        Expression::Iff(Box::new(a), Box::new(b))
    }

    /// Smart constructor for conjunction: flattens nested `And`s, drops
    /// duplicates, collapses `Const(true)` conjuncts, short-circuits to
    /// `Const(false)` if any conjunct is `Const(false)`, and sorts the
    /// remainder into canonical order.
    pub fn and<I: IntoIterator<Item = Expression>>(args: I) -> Expression {
        let mut flat: Vec<Expression> = Vec::new();
        for a in args {
            match a {
                Expression::And(children) => flat.extend(children),
                Expression::Const(true) => continue,
                Expression::Const(false) => return Expression::Const(false),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        if flat.is_empty() {
            Expression::Const(true)
        } else if flat.len() == 1 {
            flat.into_iter().next().unwrap()
        } else {
            Expression::And(flat)
        }
    }

    /// Smart constructor for disjunction: the dual of [`Expression::and`].
    pub fn or<I: IntoIterator<Item = Expression>>(args: I) -> Expression {
        let mut flat: Vec<Expression> = Vec::new();
        for a in args {
            match a {
                Expression::Or(children) => flat.extend(children),
                Expression::Const(false) => continue,
                Expression::Const(true) => return Expression::Const(true),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        if has_complementary_literals(&flat) {
            return Expression::Const(true);
        }
        if flat.is_empty() {
            Expression::Const(false)
        } else if flat.len() == 1 {
            flat.into_iter().next().unwrap()
        } else {
            Expression::Or(flat)
        }
    }

    /// `true` if this expression is the literal `Const(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, Expression::Const(true))
    }

    /// `true` if this expression is the literal `Const(false)`.
    pub fn is_false(&self) -> bool {
        matches!(self, Expression::Const(false))
    }

    /// Returns the free atom names of this expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free_symbols(&mut out);
        out
    }

    fn collect_free_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expression::Atom(name) => {
                out.insert(name.clone());
            }
            Expression::Not(e) => e.collect_free_symbols(out),
            Expression::And(cs) | Expression::Or(cs) => {
                for c in cs {
                    c.collect_free_symbols(out);
                }
            }
            Expression::Implies(a, b) | Expression::Iff(a, b) => {
                a.collect_free_symbols(out);
                b.collect_free_symbols(out);
            }
            Expression::Const(_) => {}
        }
    }

    /// Evaluates this expression under a fully-assigned model, returning
    /// `Const(true)` or `Const(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnassignedSymbol`] if a free atom of `self` is
    /// missing from `model`.
    pub fn substitute(&self, model: &HashMap<String, bool>) -> Result<Expression, CoreError> {
        let value = self.eval(model)?;
        Ok(Expression::Const(value))
    }

    fn eval(&self, model: &HashMap<String, bool>) -> Result<bool, CoreError> {
        match self {
            Expression::Atom(name) => {
                model
                    .get(name)
                    .copied()
                    .ok_or_else(|| CoreError::UnassignedSymbol {
                        symbol: name.clone(),
                    })
            }
            Expression::Not(e) => Ok(!e.eval(model)?),
            Expression::And(cs) => {
                for c in cs {
                    if !c.eval(model)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expression::Or(cs) => {
                for c in cs {
                    if c.eval(model)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Expression::Implies(a, b) => Ok(!a.eval(model)? || b.eval(model)?),
            Expression::Iff(a, b) => Ok(a.eval(model)? == b.eval(model)?),
            Expression::Const(v) => Ok(*v),
        }
    }

    /// Flattens the outermost `And`, mirroring the original implementation's
    /// `conjuncts` helper. An expression that is not itself an `And` is
    /// treated as a single conjunct.
    pub fn conjuncts(&self) -> Vec<&Expression> {
        match self {
            Expression::And(cs) => cs.iter().collect(),
            other => vec![other],
        }
    }

    /// Flattens the outermost `Or`, mirroring the original implementation's
    /// `disjuncts` helper.
    pub fn disjuncts(&self) -> Vec<&Expression> {
        match self {
            Expression::Or(cs) => cs.iter().collect(),
            other => vec![other],
        }
    }

    /// Converts this expression to conjunctive normal form.
    ///
    /// Idempotent: `e.to_cnf().to_cnf() == e.to_cnf()`.
    pub fn to_cnf(&self) -> Expression {
        let no_iff = eliminate_iff(self);
        let no_implies = eliminate_implies(&no_iff);
        let nnf = push_not_inward(&no_implies);
        distribute(&nnf)
    }

    /// `true` if this expression, read as a CNF, is a single clause (a
    /// disjunction of literals, or a single literal, or a constant).
    pub fn is_clause(&self) -> bool {
        match self {
            Expression::Atom(_) | Expression::Const(_) => true,
            Expression::Not(e) => matches!(**e, Expression::Atom(_)),
            Expression::Or(cs) => cs.iter().all(|c| is_literal(c)),
            _ => false,
        }
    }

    /// `true` if this expression is a valid CNF: a conjunction of clauses, a
    /// single clause, or a constant.
    pub fn is_cnf(&self) -> bool {
        match self {
            Expression::And(cs) => cs.iter().all(|c| c.is_clause()),
            other => other.is_clause(),
        }
    }
}

fn is_literal(e: &Expression) -> bool {
    matches!(e, Expression::Atom(_))
        || matches!(e, Expression::Not(inner) if matches!(**inner, Expression::Atom(_)))
}

/// `true` if the (sorted, deduped) disjuncts contain both some atom `A` and
/// its negation `~A` — a clause like that is a tautology, per `to_cnf`'s
/// "clauses that contain both a literal and its negation collapse to
/// `Const(true)`" rule.
fn has_complementary_literals(disjuncts: &[Expression]) -> bool {
    let positives: BTreeSet<&str> = disjuncts
        .iter()
        .filter_map(|e| match e {
            Expression::Atom(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    disjuncts.iter().any(|e| match e {
        Expression::Not(inner) => match &**inner {
            Expression::Atom(name) => positives.contains(name.as_str()),
            _ => false,
        },
        _ => false,
    })
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Atom(name) => write!(f, "{name}"),
            Expression::Not(e) => write!(f, "~{e}"),
            Expression::And(cs) => {
                let parts: Vec<String> = cs.iter().map(|c| format!("{c}")).collect();
                write!(f, "({})", parts.join(" & "))
            }
            Expression::Or(cs) => {
                let parts: Vec<String> = cs.iter().map(|c| format!("{c}")).collect();
                write!(f, "({})", parts.join(" | "))
            }
            Expression::Implies(a, b) => write!(f, "({a} >> {b})"),
            Expression::Iff(a, b) => write!(f, "({a} <-> {b})"),
            Expression::Const(true) => write!(f, "True"),
            Expression::Const(false) => write!(f, "False"),
        }
    }
}

fn eliminate_iff(e: &Expression) -> Expression {
    match e {
        Expression::Iff(a, b) => {
            let a = eliminate_iff(a);
            let b = eliminate_iff(b);
            Expression::and([
                Expression::implies(a.clone(), b.clone()),
                Expression::implies(b, a),
            ])
        }
        Expression::Implies(a, b) => {
            Expression::implies(eliminate_iff(a), eliminate_iff(b))
        }
        Expression::Not(inner) => Expression::not(eliminate_iff(inner)),
        Expression::And(cs) => Expression::and(cs.iter().map(eliminate_iff)),
        Expression::Or(cs) => Expression::or(cs.iter().map(eliminate_iff)),
        Expression::Atom(_) | Expression::Const(_) => e.clone(),
    }
}

fn eliminate_implies(e: &Expression) -> Expression {
    match e {
        Expression::Implies(a, b) => {
            let a = eliminate_implies(a);
            let b = eliminate_implies(b);
            Expression::or([Expression::not(a), b])
        }
        Expression::Not(inner) => Expression::not(eliminate_implies(inner)),
        Expression::And(cs) => Expression::and(cs.iter().map(eliminate_implies)),
        Expression::Or(cs) => Expression::or(cs.iter().map(eliminate_implies)),
        Expression::Iff(_, _) => unreachable!("eliminate_iff runs first"),
        Expression::Atom(_) | Expression::Const(_) => e.clone(),
    }
}

/// Pushes `Not` inward via De Morgan's laws, eliminating double negation on
/// the way. Input must already be `Implies`/`Iff`-free.
fn push_not_inward(e: &Expression) -> Expression {
    match e {
        Expression::Not(inner) => push_not_inward_negated(inner),
        Expression::And(cs) => Expression::and(cs.iter().map(push_not_inward)),
        Expression::Or(cs) => Expression::or(cs.iter().map(push_not_inward)),
        Expression::Atom(_) | Expression::Const(_) => e.clone(),
        Expression::Implies(_, _) | Expression::Iff(_, _) => {
            unreachable!("Implies/Iff already eliminated")
        }
    }
}

/// Pushes a negation of `e` inward.
fn push_not_inward_negated(e: &Expression) -> Expression {
    match e {
        Expression::Not(inner) => push_not_inward(inner),
        Expression::And(cs) => Expression::or(cs.iter().map(push_not_inward_negated)),
        Expression::Or(cs) => Expression::and(cs.iter().map(push_not_inward_negated)),
        Expression::Atom(_) => Expression::Not(Box::new(e.clone())),
        Expression::Const(b) => Expression::Const(!b),
        Expression::Implies(_, _) | Expression::Iff(_, _) => {
            unreachable!("Implies/Iff already eliminated")
        }
    }
}

/// Distributes `Or` over `And` to reach CNF. Input must already be in
/// negation normal form (only `Not` directly over atoms).
fn distribute(e: &Expression) -> Expression {
    match e {
        Expression::And(cs) => Expression::and(cs.iter().map(distribute)),
        Expression::Or(cs) => {
            let distributed: Vec<Expression> = cs.iter().map(distribute).collect();
            distributed
                .into_iter()
                .fold(Expression::Const(false), |acc, next| distribute_pair(&acc, &next))
        }
        Expression::Atom(_) | Expression::Not(_) | Expression::Const(_) => e.clone(),
        Expression::Implies(_, _) | Expression::Iff(_, _) => {
            unreachable!("Implies/Iff already eliminated")
        }
    }
}

/// `or(a, b)` with `And` distributed over the result, assuming `a` and `b`
/// are themselves already in CNF.
fn distribute_pair(a: &Expression, b: &Expression) -> Expression {
    if let Expression::Const(false) = a {
        return b.clone();
    }
    match (a, b) {
        (Expression::And(a_cs), _) => {
            Expression::and(a_cs.iter().map(|c| distribute_pair(c, b)))
        }
        (_, Expression::And(b_cs)) => {
            Expression::and(b_cs.iter().map(|c| distribute_pair(a, c)))
        }
        _ => Expression::or([a.clone(), b.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(name: &str) -> Expression {
        Expression::atom(name)
    }

    #[test]
    fn and_flattens_and_sorts() {
        let e1 = Expression::and([a("B"), a("A")]);
        let e2 = Expression::and([a("A"), a("B")]);
        assert_eq!(e1, e2);
    }

    #[test]
    fn or_is_associative_after_canonicalisation() {
        let e1 = Expression::or([a("A"), Expression::or([a("B"), a("C")])]);
        let e2 = Expression::or([Expression::or([a("A"), a("B")]), a("C")]);
        assert_eq!(e1, e2);
    }

    #[test]
    fn duplicate_conjuncts_absorbed() {
        let e = Expression::and([a("A"), a("A"), a("B")]);
        assert_eq!(e, Expression::and([a("A"), a("B")]));
    }

    #[test]
    fn and_with_false_collapses() {
        let e = Expression::and([a("A"), Expression::Const(false)]);
        assert_eq!(e, Expression::Const(false));
    }

    #[test]
    fn or_with_true_collapses() {
        let e = Expression::or([a("A"), Expression::Const(true)]);
        assert_eq!(e, Expression::Const(true));
    }

    #[test]
    fn double_negation_eliminated() {
        assert_eq!(Expression::not(Expression::not(a("A"))), a("A"));
    }

    #[test]
    fn to_cnf_idempotent() {
        let e = Expression::iff(
            Expression::implies(a("A"), a("B")),
            Expression::or([a("C"), Expression::not(a("D"))]),
        );
        let once = e.to_cnf();
        let twice = once.to_cnf();
        assert_eq!(once, twice);
    }

    #[test]
    fn to_cnf_is_cnf() {
        let e = Expression::implies(
            Expression::and([a("A"), a("B")]),
            Expression::or([a("C"), a("D")]),
        );
        assert!(e.to_cnf().is_cnf());
    }

    #[test]
    fn tautological_clause_dropped_from_distribution() {
        // (A & B) | ~A distributes to (A | ~A) & (B | ~A); the first clause
        // is a tautology and is dropped, leaving just (B | ~A).
        let e = Expression::or([Expression::and([a("A"), a("B")]), Expression::not(a("A"))]);
        assert_eq!(
            e.to_cnf(),
            Expression::or([a("B"), Expression::not(a("A"))])
        );
    }

    #[test]
    fn conjunction_of_a_literal_and_its_negation_is_not_collapsed() {
        // A & ~A is unsatisfiable but is not a single clause, so to_cnf must
        // not rewrite it to Const(false) — that collapse only applies within
        // one disjunctive clause, not across the outer conjunction.
        let e = Expression::and([a("A"), Expression::not(a("A"))]);
        assert_eq!(
            e.to_cnf(),
            Expression::And(vec![a("A"), Expression::not(a("A"))])
        );
    }

    #[test]
    fn free_symbols_collects_all_atoms() {
        let e = Expression::implies(a("A"), Expression::and([a("B"), a("C")]));
        let syms: Vec<String> = e.free_symbols().into_iter().collect();
        assert_eq!(syms, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn substitute_evaluates_fully_assigned() {
        let e = Expression::implies(a("A"), a("B"));
        let mut model = HashMap::new();
        model.insert("A".to_string(), true);
        model.insert("B".to_string(), false);
        assert_eq!(e.substitute(&model).unwrap(), Expression::Const(false));
    }

    #[test]
    fn substitute_fails_on_missing_symbol() {
        let e = a("A");
        let model = HashMap::new();
        assert!(matches!(
            e.substitute(&model),
            Err(CoreError::UnassignedSymbol { .. })
        ));
    }

    #[test]
    fn conjuncts_and_disjuncts_match_original_semantics() {
        let e = Expression::and([a("A"), a("B")]);
        assert_eq!(e.conjuncts(), vec![&a("A"), &a("B")]);

        let single = a("A");
        assert_eq!(single.conjuncts(), vec![&a("A")]);
    }
}
