use evo_core::{Deme, Individual};

/// A bounded best-so-far archive, updated after every dispatch pass (spec
/// section 2's 5%-budget "Hall-of-Fame hooks" line, expanded per
/// SPEC_FULL.md section 4.8). Grounded on
/// `MPI_EvaluationOp.cpp`'s `mDemeHOFSize`/`mVivaHOFSize` calls into
/// `getHallOfFame().updateWithDeme(...)`, and on the teacher's novelty
/// archive (`radiate-core::fitness::novelty`, a capped `Vec`/`VecDeque`
/// sorted by score) as the idiomatic container shape.
///
/// `G` must be `Clone` since the archive keeps its own copies independent of
/// the live deme/vivarium.
pub struct HallOfFame<G> {
    capacity: usize,
    entries: Vec<Individual<G>>,
}

impl<G: Clone> HallOfFame<G> {
    pub fn new(capacity: usize) -> Self {
        HallOfFame {
            capacity,
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&Individual<G>> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Individual<G>] {
        &self.entries
    }

    /// Merges every fitness-valid individual from `deme` into the archive,
    /// keeping only the `capacity` best (highest fitness first). A no-op
    /// when `capacity == 0`.
    pub fn update_with_deme(&mut self, deme: &Deme<G>) {
        if self.capacity == 0 {
            return;
        }

        for individual in deme.iter() {
            if individual.is_fitness_valid() {
                self.entries.push(individual.clone());
            }
        }

        self.entries.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.entries.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::Fitness;

    #[test]
    fn zero_capacity_never_stores_anything() {
        let mut hof: HallOfFame<i32> = HallOfFame::new(0);
        let deme = Deme::from(vec![Individual::with_fitness(1, Fitness::new(5.0))]);
        hof.update_with_deme(&deme);
        assert!(hof.is_empty());
    }

    #[test]
    fn keeps_only_the_best_capacity_entries() {
        let mut hof: HallOfFame<i32> = HallOfFame::new(2);
        let deme = Deme::from(vec![
            Individual::with_fitness(1, Fitness::new(1.0)),
            Individual::with_fitness(2, Fitness::new(3.0)),
            Individual::with_fitness(3, Fitness::new(2.0)),
        ]);

        hof.update_with_deme(&deme);

        assert_eq!(hof.len(), 2);
        assert_eq!(hof.best().unwrap().fitness().unwrap().value(), 3.0);
    }

    #[test]
    fn invalid_fitness_individuals_are_ignored() {
        let mut hof: HallOfFame<i32> = HallOfFame::new(5);
        let deme = Deme::from(vec![Individual::new(1), Individual::with_fitness(2, Fitness::new(4.0))]);

        hof.update_with_deme(&deme);

        assert_eq!(hof.len(), 1);
    }
}
