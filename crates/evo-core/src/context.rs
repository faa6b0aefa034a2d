/// Run-scoped bookkeeping threaded through every generation.
///
/// Spec section 3 describes the context as living "one generation" while
/// also requiring `total-processed` counters to carry across generations
/// (seeded from prior stats if present, else zero). Modeling `Context` as a
/// single struct that persists for the whole run, with the per-generation
/// counters reset at the start of each deme pass and the totals left alone,
/// satisfies both requirements without a second bookkeeping type.
#[derive(Debug, Clone, Default)]
pub struct Context {
    generation: usize,
    deme_index: usize,
    processed: usize,
    processed_vivarium: usize,
    total_processed: usize,
    total_processed_vivarium: usize,
    continue_run: bool,
    processed_per_deme: Vec<usize>,
    total_processed_per_deme: Vec<usize>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            generation: 0,
            deme_index: 0,
            processed: 0,
            processed_vivarium: 0,
            total_processed: 0,
            total_processed_vivarium: 0,
            continue_run: true,
            processed_per_deme: Vec::new(),
            total_processed_per_deme: Vec::new(),
        }
    }

    /// Seeds the totals from a prior run's final counters, per spec section 3.
    pub fn resume_from(total_processed: usize, total_processed_vivarium: usize) -> Self {
        Context {
            total_processed,
            total_processed_vivarium,
            ..Context::new()
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn deme_index(&self) -> usize {
        self.deme_index
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn processed_vivarium(&self) -> usize {
        self.processed_vivarium
    }

    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    pub fn total_processed_vivarium(&self) -> usize {
        self.total_processed_vivarium
    }

    pub fn should_continue(&self) -> bool {
        self.continue_run
    }

    pub fn stop(&mut self) {
        self.continue_run = false;
    }

    pub fn set_deme_index(&mut self, deme_index: usize) {
        self.deme_index = deme_index;
    }

    /// Resets the per-deme counter at the start of a deme's dispatch pass.
    pub fn begin_deme_pass(&mut self) {
        self.processed = 0;
    }

    /// Resets the per-vivarium counter at the start of a co-evolution pass.
    pub fn begin_vivarium_pass(&mut self) {
        self.processed_vivarium = 0;
    }

    /// Records that `count` individuals were evaluated, updating both the
    /// per-generation and the run-long totals.
    pub fn record_processed(&mut self, count: usize) {
        self.processed += count;
        self.total_processed += count;
    }

    pub fn record_processed_vivarium(&mut self, count: usize) {
        self.processed_vivarium += count;
        self.total_processed_vivarium += count;
    }

    /// Per-generation count of individuals processed on behalf of `deme_id`,
    /// as recorded by [`Context::record_processed_for_deme`].
    pub fn processed_for_deme(&self, deme_id: usize) -> usize {
        self.processed_per_deme.get(deme_id).copied().unwrap_or(0)
    }

    /// Run-long count of individuals processed on behalf of `deme_id`.
    pub fn total_processed_for_deme(&self, deme_id: usize) -> usize {
        self.total_processed_per_deme.get(deme_id).copied().unwrap_or(0)
    }

    /// Records that `count` individuals produced by `deme_id` were
    /// evaluated. Co-evolution dispatch (spec section 4.4) attributes
    /// results to their producer deme via
    /// [`crate::EvaluationSet::producer_deme_id`] rather than by which deme
    /// happens to be `ctx.deme_index()` at the time, since multiple demes'
    /// sets are in flight together.
    pub fn record_processed_for_deme(&mut self, deme_id: usize, count: usize) {
        if self.processed_per_deme.len() <= deme_id {
            self.processed_per_deme.resize(deme_id + 1, 0);
        }
        if self.total_processed_per_deme.len() <= deme_id {
            self.total_processed_per_deme.resize(deme_id + 1, 0);
        }
        self.processed_per_deme[deme_id] += count;
        self.total_processed_per_deme[deme_id] += count;
    }

    /// Advances to the next generation, clearing per-generation state.
    pub fn advance_generation(&mut self) {
        self.generation += 1;
        self.processed = 0;
        self.processed_vivarium = 0;
        self.deme_index = 0;
        self.processed_per_deme.iter_mut().for_each(|count| *count = 0);
    }
}
