//! Core data model for the distributed fitness-evaluation engine: the
//! opaque genotype/fitness pair, the deme/vivarium population structures,
//! the run-scoped context, and the codecs that move genotypes and fitnesses
//! across the wire. Nothing in this crate knows about threads, transports,
//! or dispatch - that lives in `evo-transport` and `evo-engine`.

mod codec;
mod context;
mod deme;
mod evaluation_set;
mod fitness;
mod individual;

pub use codec::{Codec, FitnessCodec, PlainFitnessCodec};
#[cfg(feature = "serde")]
pub use codec::JsonCodec;
pub use context::Context;
pub use deme::{Deme, Vivarium};
pub use evaluation_set::{Assignment, EvaluationSet};
pub use fitness::Fitness;
pub use individual::Individual;
