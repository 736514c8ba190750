//! Demo CLI exercising the belief base end to end.
//!
//! This binary is *not* the core: it builds [`entrench::Expression`] values
//! directly through kernel constructors, the way any caller must — the core
//! deliberately has no surface-syntax parser (see the crate's module docs).
//! Run with `RUST_LOG=debug` to see `expand`/`retract` decisions logged.

use entrench::{Belief, BeliefBase, Expression};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process;

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(0);
    let mut kb = BeliefBase::new();

    let a = Expression::atom("A");
    let b = Expression::atom("B");
    let c = Expression::atom("C");
    let d = Expression::atom("D");

    // (A & B & C & ~D) at full entrenchment.
    let belief = match Belief::new(
        Expression::and([a.clone(), b.clone(), c, Expression::not(d.clone())]),
        1.0,
    ) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error building belief: {e}");
            process::exit(1);
        }
    };
    kb.tell(belief);

    println!("ask(A)        = {}", ask(&kb, &a, &mut rng));
    println!("ask(B)        = {}", ask(&kb, &b, &mut rng));
    println!("ask(A >> D)   = {}", ask(&kb, &Expression::implies(a.clone(), d.clone()), &mut rng));
    println!("ask(~D)       = {}", ask(&kb, &Expression::not(d.clone()), &mut rng));

    // Revise in D: Levi's identity contracts ~D away, then expands with D.
    match Belief::new(d.clone(), 1.0).and_then(|nb| {
        kb.revise(nb, &mut rng)
    }) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error revising: {e}");
            process::exit(1);
        }
    }

    println!("\nafter revise(D):");
    println!("ask(D)        = {}", ask(&kb, &d, &mut rng));
    println!("ask(~D)       = {}", ask(&kb, &Expression::not(d), &mut rng));
    print!("\n{kb}");
}

fn ask(kb: &BeliefBase, phi: &Expression, rng: &mut StdRng) -> bool {
    kb.ask(phi, rng).expect("ask should not fail on a well-formed query")
}
