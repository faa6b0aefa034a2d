//! Demonstrates the co-evolution rendezvous: two producer threads (one per
//! co-evolving deme) each contribute one evaluation set; the rendezvous
//! fires a joint evaluation once both have arrived (trigger = 2) and
//! releases both producers with their share of the result. Mirrors the
//! "co-evolution barrier T=2, assignment == 0 (all)" scenario from the
//! rendezvous's testable properties.

use evo_core::{Assignment, Context, EvaluationSet, Fitness};
use evo_engine::{RendezvousBuffer, dispatch_sets};
use evo_error::EngineResult;
use evo_transport::ChannelTransport;
use std::sync::Arc;

struct SumCodec;

impl evo_core::Codec<i32> for SumCodec {
    fn encode(&self, genotype: &i32) -> EngineResult<Vec<u8>> {
        Ok(genotype.to_le_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> EngineResult<i32> {
        let array: [u8; 4] = bytes
            .try_into()
            .map_err(|_| evo_error::evo_err!(Decode: "expected 4 bytes, got {}", bytes.len()))?;
        Ok(i32::from_le_bytes(array))
    }
}

fn main() -> EngineResult<()> {
    tracing_subscriber::fmt::init();

    let rendezvous = Arc::new(RendezvousBuffer::<i32>::new(2));

    // one-rank world: the joint evaluator's dispatch falls back to direct
    // in-process evaluation, which is safe to call from either producer
    // thread since the rendezvous itself is the only shared resource here.
    let transport = Arc::new(ChannelTransport::world(1).remove(0));
    let codec = Arc::new(SumCodec);
    let fitness_codec = Arc::new(evo_core::PlainFitnessCodec);

    let joint_evaluator = {
        let transport = Arc::clone(&transport);
        let codec = Arc::clone(&codec);
        let fitness_codec = Arc::clone(&fitness_codec);
        move |sets: &[EvaluationSet<i32>]| -> EngineResult<Vec<Vec<Fitness>>> {
            let combined_pair_score =
                |genotypes: &[i32]| Fitness::new(genotypes.iter().sum::<i32>() as f64);
            let mut ctx = Context::new();
            let mut sets = sets.to_vec();
            dispatch_sets(
                transport.as_ref(),
                codec.as_ref(),
                fitness_codec.as_ref(),
                &mut sets,
                0,
                &combined_pair_score,
                &mut ctx,
            )
        }
    };

    let deme_a = {
        let rendezvous = Arc::clone(&rendezvous);
        let joint_evaluator = joint_evaluator.clone();
        std::thread::spawn(move || {
            let set = EvaluationSet::new(vec![7], Assignment::All, 0);
            rendezvous.add_set(set, true, &joint_evaluator)
        })
    };

    let deme_b = {
        let rendezvous = Arc::clone(&rendezvous);
        let joint_evaluator = joint_evaluator.clone();
        std::thread::spawn(move || {
            let set = EvaluationSet::new(vec![5], Assignment::All, 1);
            rendezvous.add_set(set, true, &joint_evaluator)
        })
    };

    let result_a = deme_a.join().expect("deme a thread panicked")?;
    let result_b = deme_b.join().expect("deme b thread panicked")?;

    println!("deme A joint fitness: {:?}", result_a.map(|f| f[0].value()));
    println!("deme B joint fitness: {:?}", result_b.map(|f| f[0].value()));

    Ok(())
}
