use crate::control::RunControl;
use crate::dispatch::broadcast_shutdown;
use crate::hof::HallOfFame;
use crate::operator::StepOutcome;
use crate::pipeline::Pipeline;
use evo_core::{Context, Vivarium};
use evo_error::EngineResult;
use evo_transport::Transport;

/// Drives the bootstrap and main-loop operator pipelines on the coordinator
/// (rank 0 only) for the lifetime of the run (spec section 4.6).
/// Non-coordinator ranks never enter this loop; they run the Worker Service
/// Loop instead (see `crate::worker::run_worker`).
///
/// Grounded on the teacher's `Pipeline<C>::run` for the "sequence of steps,
/// metrics recorded per step" shape, and on its `EngineControl`/`StepGate`
/// for the stop-signal plumbing reused here as the `continue-flag` early
/// exit.
pub struct GenerationalDriver<G> {
    bootstrap: Pipeline<G>,
    main_loop: Pipeline<G>,
    control: RunControl,
    deme_hof: Vec<HallOfFame<G>>,
    vivarium_hof: HallOfFame<G>,
    population_size_vector: Vec<usize>,
}

impl<G: Clone + Default> GenerationalDriver<G> {
    /// `population_size_vector` is the configured deme-count/deme-size list
    /// (spec section 4.6, `EngineConfig::population_size_vector`); its length
    /// must match `deme_count`.
    pub fn new(
        bootstrap: Pipeline<G>,
        main_loop: Pipeline<G>,
        control: RunControl,
        deme_count: usize,
        deme_hof_size: usize,
        vivarium_hof_size: usize,
        population_size_vector: Vec<usize>,
    ) -> Self {
        assert_eq!(
            population_size_vector.len(),
            deme_count,
            "population_size_vector must have one entry per deme"
        );
        GenerationalDriver {
            bootstrap,
            main_loop,
            control,
            deme_hof: (0..deme_count).map(|_| HallOfFame::new(deme_hof_size)).collect(),
            vivarium_hof: HallOfFame::new(vivarium_hof_size),
            population_size_vector,
        }
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    pub fn deme_hof(&self, index: usize) -> &HallOfFame<G> {
        &self.deme_hof[index]
    }

    pub fn vivarium_hof(&self) -> &HallOfFame<G> {
        &self.vivarium_hof
    }

    /// Runs the generational loop to completion, then broadcasts shutdown to
    /// every worker rank. Resizes `vivarium` to the configured
    /// deme-count/deme-size list before entering the loop (spec section 4.6).
    pub fn run(
        &mut self,
        transport: &dyn Transport,
        vivarium: &mut Vivarium<G>,
        ctx: &mut Context,
    ) -> EngineResult<()> {
        vivarium.resize(&self.population_size_vector);

        'generations: loop {
            let mut deme_index = ctx.deme_index();

            loop {
                if self.control.is_stopped() || !ctx.should_continue() {
                    break 'generations;
                }
                if deme_index >= vivarium.len() {
                    break;
                }

                ctx.set_deme_index(deme_index);
                ctx.begin_deme_pass();

                let pipeline = if ctx.generation() == 0 {
                    &self.bootstrap
                } else {
                    &self.main_loop
                };
                let outcome = pipeline.run(&mut vivarium[deme_index], ctx)?;

                self.deme_hof[deme_index].update_with_deme(&vivarium[deme_index]);
                if deme_index == 0 {
                    for deme in vivarium.iter() {
                        self.vivarium_hof.update_with_deme(deme);
                    }
                }

                match outcome {
                    StepOutcome::Continue => deme_index += 1,
                    StepOutcome::Stop => {
                        ctx.stop();
                        self.control.stop();
                        break 'generations;
                    }
                    StepOutcome::DemeChanged => deme_index = ctx.deme_index(),
                    StepOutcome::GenerationChanged => break,
                }
            }

            if !ctx.should_continue() {
                break;
            }
            ctx.advance_generation();
        }

        tracing::info!(generation = ctx.generation(), "shutting down");
        broadcast_shutdown(transport)
    }
}
