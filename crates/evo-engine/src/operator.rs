use evo_core::{Context, Deme};
use evo_error::EngineResult;

/// Outcome of one operator's `apply`, carrying the three early-exit signals
/// the Generational Driver must honor after every step (spec section 4.6):
/// the run stopping outright, the driver pivoting to a different deme, or
/// time advancing to a new generation. `Continue` means none of those
/// happened and the pipeline should move to the next operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Stop,
    DemeChanged,
    GenerationChanged,
}

/// One step of the bootstrap or main-loop pipeline: a fitness evaluator, a
/// selector, a mutator, a migration step, a stats calculator, a termination
/// test, or a milestone writer (spec section 4.6). Collapsing this operator
/// hierarchy into one trait with one dispatch method follows the teacher's
/// `EngineStep` trait and the spec's own design note that deep operator
/// class hierarchies flatten to a tagged variant.
pub trait Operator<G>: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, deme: &mut Deme<G>, ctx: &mut Context) -> EngineResult<StepOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopOperator;

    impl<G> Operator<G> for NoopOperator {
        fn name(&self) -> &str {
            "noop"
        }

        fn apply(&self, _deme: &mut Deme<G>, _ctx: &mut Context) -> EngineResult<StepOutcome> {
            Ok(StepOutcome::Continue)
        }
    }

    #[test]
    fn noop_operator_continues() {
        let mut deme: Deme<i32> = Deme::default();
        let mut ctx = Context::new();
        let outcome = NoopOperator.apply(&mut deme, &mut ctx).unwrap();
        assert_eq!(outcome, StepOutcome::Continue);
    }
}
