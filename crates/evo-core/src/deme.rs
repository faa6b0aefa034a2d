use crate::Individual;
use std::ops::{Index, IndexMut};

/// One subpopulation: an ordered sequence of individuals. Indices are stable
/// within a generation between dispatch and receive (spec section 3); size
/// does not change during a dispatch pass.
#[derive(Debug, Clone, Default)]
pub struct Deme<G> {
    individuals: Vec<Individual<G>>,
}

impl<G> Deme<G> {
    pub fn new(individuals: Vec<Individual<G>>) -> Self {
        Deme { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual<G>> {
        self.individuals.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Individual<G>> {
        self.individuals.iter_mut()
    }

    /// Number of individuals in this deme whose fitness is not yet valid.
    pub fn invalid_count(&self) -> usize {
        self.individuals
            .iter()
            .filter(|ind| !ind.is_fitness_valid())
            .count()
    }

    /// Grows or shrinks this deme to exactly `size` individuals. New slots
    /// are filled with a fresh, fitness-invalid `G::default()` individual for
    /// the genetic operators to initialize; this is the per-deme half of
    /// spec section 4.6's "resize the vivarium to the configured
    /// deme-count/deme-size list" setup step.
    pub fn resize(&mut self, size: usize)
    where
        G: Default,
    {
        self.individuals
            .resize_with(size, || Individual::new(G::default()));
    }
}

impl<G> Index<usize> for Deme<G> {
    type Output = Individual<G>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl<G> IndexMut<usize> for Deme<G> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.individuals[index]
    }
}

impl<G> From<Vec<Individual<G>>> for Deme<G> {
    fn from(individuals: Vec<Individual<G>>) -> Self {
        Deme { individuals }
    }
}

impl<G> FromIterator<Individual<G>> for Deme<G> {
    fn from_iter<I: IntoIterator<Item = Individual<G>>>(iter: I) -> Self {
        Deme {
            individuals: iter.into_iter().collect(),
        }
    }
}

/// The full set of demes for a run. Deme count is fixed for the run (spec
/// section 3): `resize` is only meant to be called once, during setup.
#[derive(Debug, Clone, Default)]
pub struct Vivarium<G> {
    demes: Vec<Deme<G>>,
}

impl<G> Vivarium<G> {
    pub fn new(demes: Vec<Deme<G>>) -> Self {
        Vivarium { demes }
    }

    pub fn len(&self) -> usize {
        self.demes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Deme<G>> {
        self.demes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Deme<G>> {
        self.demes.iter_mut()
    }

    /// Resizes the vivarium to exactly `sizes.len()` demes, each holding
    /// `sizes[i]` individuals - the configured deme-count/deme-size list
    /// (spec section 4.6). Existing demes keep their current individuals up
    /// to the new size; new demes and new slots start fitness-invalid.
    /// Meant to be called once, during setup.
    pub fn resize(&mut self, sizes: &[usize])
    where
        G: Default,
    {
        self.demes.resize_with(sizes.len(), Deme::default);
        for (deme, &size) in self.demes.iter_mut().zip(sizes) {
            deme.resize(size);
        }
    }
}

impl<G> Index<usize> for Vivarium<G> {
    type Output = Deme<G>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.demes[index]
    }
}

impl<G> IndexMut<usize> for Vivarium<G> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.demes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fitness;

    #[test]
    fn invalid_count_matches_unset_fitnesses() {
        let deme: Deme<i32> = Deme::from(vec![
            Individual::with_fitness(1, Fitness::new(1.0)),
            Individual::new(2),
            Individual::new(3),
            Individual::with_fitness(4, Fitness::new(2.0)),
        ]);

        assert_eq!(deme.invalid_count(), 2);
    }

    #[test]
    fn vivarium_indexes_into_demes() {
        let mut vivarium: Vivarium<i32> =
            Vivarium::new(vec![Deme::from(vec![Individual::new(1)]), Deme::default()]);

        assert_eq!(vivarium.len(), 2);
        vivarium[1] = Deme::from(vec![Individual::new(2)]);
        assert_eq!(vivarium[1].len(), 1);
    }

    #[test]
    fn deme_resize_pads_with_invalid_individuals_and_truncates() {
        let mut deme: Deme<i32> = Deme::from(vec![
            Individual::with_fitness(1, Fitness::new(1.0)),
            Individual::new(2),
        ]);

        deme.resize(4);
        assert_eq!(deme.len(), 4);
        assert_eq!(deme[0].fitness().unwrap().value(), 1.0);
        assert!(!deme[3].is_fitness_valid());

        deme.resize(1);
        assert_eq!(deme.len(), 1);
    }

    #[test]
    fn vivarium_resize_matches_configured_deme_count_and_sizes() {
        let mut vivarium: Vivarium<i32> = Vivarium::default();

        vivarium.resize(&[3, 1]);

        assert_eq!(vivarium.len(), 2);
        assert_eq!(vivarium[0].len(), 3);
        assert_eq!(vivarium[1].len(), 1);
    }
}
