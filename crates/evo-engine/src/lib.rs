//! Dispatch engine, co-evolution rendezvous, and generational driver for the
//! distributed fitness-evaluation engine. `evo-core` supplies the data
//! model and `evo-transport` the wire; this crate is the orchestration that
//! sits between them, grounded throughout on `radiate-engines`'s
//! pipeline/control/config idioms.

mod config;
mod control;
mod dispatch;
mod evaluator;
mod hof;
mod operator;
mod pipeline;
mod rendezvous;
mod wire;
mod worker;

pub mod driver;

pub use config::{EngineConfig, EngineConfigBuilder, per_rank_log_path};
pub use control::RunControl;
pub use dispatch::{broadcast_shutdown, dispatch_deme, dispatch_sets};
pub use driver::GenerationalDriver;
pub use evaluator::Evaluator;
pub use hof::HallOfFame;
pub use operator::{Operator, StepOutcome};
pub use pipeline::Pipeline;
pub use rendezvous::{JointEvaluator, RendezvousBuffer};
pub use worker::run_worker;
