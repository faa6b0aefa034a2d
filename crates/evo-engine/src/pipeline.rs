use crate::operator::{Operator, StepOutcome};
use evo_core::{Context, Deme};
use evo_error::EngineResult;

/// An ordered sequence of operators executed once per deme per pass, grounded
/// on the teacher's `Pipeline<C>::run` (spec section 4.6): each step runs in
/// order, and the pipeline stops early the moment a step reports anything
/// other than `Continue`, handing that outcome back to the driver.
#[derive(Default)]
pub struct Pipeline<G> {
    steps: Vec<Box<dyn Operator<G>>>,
}

impl<G> Pipeline<G> {
    pub fn new() -> Self {
        Pipeline { steps: Vec::new() }
    }

    pub fn add_step(&mut self, step: Box<dyn Operator<G>>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Runs every step in order against `deme`, returning the first
    /// non-`Continue` outcome, or `Continue` if every step completed.
    pub fn run(&self, deme: &mut Deme<G>, ctx: &mut Context) -> EngineResult<StepOutcome> {
        for step in &self.steps {
            tracing::trace!(step = step.name(), "running pipeline step");
            match step.apply(deme, ctx)? {
                StepOutcome::Continue => continue,
                other => return Ok(other),
            }
        }
        Ok(StepOutcome::Continue)
    }
}

impl<G> From<Vec<Box<dyn Operator<G>>>> for Pipeline<G> {
    fn from(steps: Vec<Box<dyn Operator<G>>>) -> Self {
        Pipeline { steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StopAfter {
        outcome: StepOutcome,
    }

    impl<G> Operator<G> for StopAfter {
        fn name(&self) -> &str {
            "stop-after"
        }

        fn apply(&self, _deme: &mut Deme<G>, _ctx: &mut Context) -> EngineResult<StepOutcome> {
            Ok(self.outcome)
        }
    }

    struct CountingOperator {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl<G> Operator<G> for CountingOperator {
        fn name(&self) -> &str {
            "counting"
        }

        fn apply(&self, _deme: &mut Deme<G>, _ctx: &mut Context) -> EngineResult<StepOutcome> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(StepOutcome::Continue)
        }
    }

    #[test]
    fn pipeline_stops_at_first_non_continue_outcome() {
        let mut pipeline: Pipeline<i32> = Pipeline::new();
        pipeline.add_step(Box::new(CountingOperator {
            calls: std::sync::atomic::AtomicUsize::new(0),
        }));
        pipeline.add_step(Box::new(StopAfter {
            outcome: StepOutcome::GenerationChanged,
        }));
        pipeline.add_step(Box::new(StopAfter {
            outcome: StepOutcome::Stop,
        }));

        let mut deme = Deme::default();
        let mut ctx = Context::new();
        let outcome = pipeline.run(&mut deme, &mut ctx).unwrap();

        assert_eq!(outcome, StepOutcome::GenerationChanged);
    }

    #[test]
    fn pipeline_runs_every_step_when_all_continue() {
        let mut pipeline: Pipeline<i32> = Pipeline::new();
        pipeline.add_step(Box::new(CountingOperator {
            calls: std::sync::atomic::AtomicUsize::new(0),
        }));

        let mut deme = Deme::default();
        let mut ctx = Context::new();
        let outcome = pipeline.run(&mut deme, &mut ctx).unwrap();

        assert_eq!(outcome, StepOutcome::Continue);
    }
}
