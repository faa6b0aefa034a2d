//! Demonstrates a plain (non-co-evolution) dispatch pass: a four-individual
//! deme evaluated by two worker threads over `ChannelTransport`, followed by
//! the shutdown broadcast. Mirrors scenario 2 ("two workers overlap") from
//! the dispatch engine's testable properties.

use evo_core::{Codec, Context, Deme, Fitness, Individual, PlainFitnessCodec};
use evo_engine::{Evaluator, broadcast_shutdown, dispatch_deme, run_worker};
use evo_error::EngineResult;
use evo_transport::ChannelTransport;

struct SumOfDigitsCodec;

impl Codec<u32> for SumOfDigitsCodec {
    fn encode(&self, genotype: &u32) -> EngineResult<Vec<u8>> {
        Ok(genotype.to_le_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> EngineResult<u32> {
        let array: [u8; 4] = bytes
            .try_into()
            .map_err(|_| evo_error::evo_err!(Decode: "expected 4 bytes, got {}", bytes.len()))?;
        Ok(u32::from_le_bytes(array))
    }
}

fn sum_of_digits(evaluator: &[u32]) -> Fitness {
    let n = evaluator[0];
    let mut total = 0u32;
    let mut remaining = n;
    while remaining > 0 {
        total += remaining % 10;
        remaining /= 10;
    }
    Fitness::new(total as f64)
}

fn main() -> EngineResult<()> {
    tracing_subscriber::fmt::init();

    let world = ChannelTransport::world(3);
    let mut world = world;
    let worker_1 = world.remove(1);
    let worker_2 = world.remove(1);
    let coordinator = world.remove(0);

    let worker_handles: Vec<_> = [worker_1, worker_2]
        .into_iter()
        .map(|transport| {
            std::thread::spawn(move || {
                let codec = SumOfDigitsCodec;
                let fitness_codec = PlainFitnessCodec;
                run_worker(&transport, &codec, &fitness_codec, &sum_of_digits)
            })
        })
        .collect();

    let codec = SumOfDigitsCodec;
    let fitness_codec = PlainFitnessCodec;
    let mut deme: Deme<u32> = Deme::from(vec![
        Individual::new(123),
        Individual::new(9999),
        Individual::with_fitness(1, Fitness::new(42.0)), // already valid, never re-sent
        Individual::new(555),
    ]);
    let mut ctx = Context::new();

    dispatch_deme(
        &coordinator,
        &codec,
        &fitness_codec,
        &mut deme,
        ctx.generation(),
        &sum_of_digits,
        &mut ctx,
    )?;

    for (index, individual) in deme.iter().enumerate() {
        println!(
            "individual[{index}] = {:?} -> fitness {:?}",
            individual.genotype(),
            individual.fitness().map(|f| f.value())
        );
    }
    println!("processed this generation: {}", ctx.processed());

    broadcast_shutdown(&coordinator)?;
    for handle in worker_handles {
        handle.join().expect("worker thread panicked").expect("worker loop failed");
    }

    Ok(())
}
