use std::fmt;

/// An evaluated quality score. Opaque to the engine beyond round-trippability
/// (spec section 3) - the engine only ever clones, compares by `PartialOrd`,
/// and hands it to a `FitnessCodec` for the wire.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Fitness(pub f64);

impl Fitness {
    pub fn new(value: f64) -> Self {
        Fitness(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for Fitness {
    fn from(value: f64) -> Self {
        Fitness(value)
    }
}
