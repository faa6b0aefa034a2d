use evo_core::Fitness;

/// The user-supplied fitness function, an external collaborator the engine
/// never implements (spec section 1: "application-specific fitness
/// functions" are out of scope). This is the one seam where caller code
/// plugs in, grounded on the shape of the teacher's `Evaluator<C, T>` trait
/// (`radiate-core::evaluator::Evaluator`) but reduced to its essential
/// operation: given the genotypes in one evaluation set, produce a fitness.
///
/// `evaluate` must be `UnwindSafe` in spirit - the Worker Service Loop wraps
/// every call in `catch_unwind` per spec section 4.3's fail-fast policy, so
/// a panic here is observed, logged, and turned into a nonzero process exit
/// rather than a `Result` that could be silently swallowed.
pub trait Evaluator<G>: Send + Sync {
    fn evaluate(&self, genotypes: &[G]) -> Fitness;
}

impl<G, F> Evaluator<G> for F
where
    F: Fn(&[G]) -> Fitness + Send + Sync,
{
    fn evaluate(&self, genotypes: &[G]) -> Fitness {
        self(genotypes)
    }
}
