use crate::Fitness;

/// One candidate solution. `G` is the opaque genotype the caller's codec and
/// fitness function understand; the engine never inspects it.
///
/// The `fitness-valid` flag from spec section 3 collapses naturally into
/// `Option::is_none` - there is no separate boolean to keep in sync.
#[derive(Debug, Clone)]
pub struct Individual<G> {
    genotype: G,
    fitness: Option<Fitness>,
}

impl<G> Individual<G> {
    pub fn new(genotype: G) -> Self {
        Individual {
            genotype,
            fitness: None,
        }
    }

    pub fn with_fitness(genotype: G, fitness: Fitness) -> Self {
        Individual {
            genotype,
            fitness: Some(fitness),
        }
    }

    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    pub fn genotype_mut(&mut self) -> &mut G {
        &mut self.genotype
    }

    pub fn fitness(&self) -> Option<Fitness> {
        self.fitness
    }

    pub fn is_fitness_valid(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = Some(fitness);
    }

    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }
}
