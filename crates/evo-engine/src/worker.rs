use crate::evaluator::Evaluator;
use crate::wire::{check_len, decode_usize, encode_usize};
use evo_core::{Codec, FitnessCodec};
use evo_error::{EngineResult, evo_bail};
use evo_transport::{Source, Tag, TagFilter, Transport};
use std::panic::{self, AssertUnwindSafe};

/// Runs the Worker Service Loop for the lifetime of the process, exactly the
/// state machine in spec section 4.3: Idle -> Receiving -> Evaluating ->
/// Replying -> Idle, terminating on `EvolutionEnd`. Grounded on the
/// teacher's `Worker::new` loop in `domain::thread_pool` (`loop { recv;
/// match; }` over a channel, breaking on a termination message), generalized
/// from an in-process job queue to the cross-rank `Transport`.
///
/// Workers never initiate communication and never talk to each other; every
/// `recv` in this loop is scoped to `Source::Rank(0)`.
pub fn run_worker<G>(
    transport: &dyn Transport,
    codec: &dyn Codec<G>,
    fitness_codec: &dyn FitnessCodec,
    evaluator: &dyn Evaluator<G>,
) -> EngineResult<()>
where
    G: Send,
{
    loop {
        let header = transport.recv(Source::Rank(0), TagFilter::Any)?;

        if header.tag == Tag::EvolutionEnd {
            tracing::info!(rank = transport.rank(), "received shutdown, terminating");
            return Ok(());
        }

        let mut genotypes = Vec::new();
        match header.tag {
            Tag::MessageSize => {
                let len = decode_usize(&header.bytes)?;
                let payload = transport.recv(Source::Rank(0), TagFilter::Only(Tag::Individual))?;
                check_len(len, payload.bytes.len())?;
                genotypes.push(codec.decode(&payload.bytes)?);
            }
            Tag::NbIndividuals => {
                let k = decode_usize(&header.bytes)?;
                for _ in 0..k {
                    let size_env =
                        transport.recv(Source::Rank(0), TagFilter::Only(Tag::MessageSize))?;
                    let len = decode_usize(&size_env.bytes)?;
                    let payload =
                        transport.recv(Source::Rank(0), TagFilter::Only(Tag::Individual))?;
                    check_len(len, payload.bytes.len())?;
                    genotypes.push(codec.decode(&payload.bytes)?);
                }
            }
            other => evo_bail!(Protocol: "unexpected header tag {other}"),
        }

        // trailing generation-number message; the worker sets its local
        // notion of generation from it but otherwise only logs it (spec
        // section 4.3 does not require the worker to act on generation
        // number beyond recording it for diagnostics).
        let generation_env = transport.recv(Source::Rank(0), TagFilter::Only(Tag::MessageSize))?;
        let generation = decode_usize(&generation_env.bytes)?;
        tracing::trace!(rank = transport.rank(), generation, count = genotypes.len(), "received work unit");

        let fitness = match panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(&genotypes)))
        {
            Ok(fitness) => fitness,
            Err(panic) => {
                let message = panic_message(&panic);
                tracing::error!(rank = transport.rank(), %message, "fitness function panicked");
                std::process::exit(1);
            }
        };

        let bytes = fitness_codec.encode(&fitness)?;
        transport.send(header.source, Tag::MessageSize, encode_usize(bytes.len()))?;
        transport.send(header.source, Tag::Fitness, bytes)?;
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::{Fitness, PlainFitnessCodec};
    use evo_transport::ChannelTransport;

    struct PlainCodec;

    impl Codec<i32> for PlainCodec {
        fn encode(&self, genotype: &i32) -> EngineResult<Vec<u8>> {
            Ok(genotype.to_le_bytes().to_vec())
        }

        fn decode(&self, bytes: &[u8]) -> EngineResult<i32> {
            let array: [u8; 4] = bytes.try_into().unwrap();
            Ok(i32::from_le_bytes(array))
        }
    }

    #[test]
    fn worker_replies_with_fitness_for_a_plain_work_unit() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let encoded = codec.encode(&7).unwrap();
        coord
            .send(1, Tag::MessageSize, encode_usize(encoded.len()))
            .unwrap();
        coord.send(1, Tag::Individual, encoded).unwrap();
        coord.send(1, Tag::MessageSize, encode_usize(0)).unwrap();
        coord.send(1, Tag::EvolutionEnd, Vec::new()).unwrap();

        let double = |genotypes: &[i32]| Fitness::new(genotypes[0] as f64 * 2.0);
        run_worker(&worker, &codec, &fitness_codec, &double).unwrap();

        let size = coord
            .recv(Source::Rank(1), TagFilter::Only(Tag::MessageSize))
            .unwrap();
        let fitness_env = coord
            .recv(Source::Rank(1), TagFilter::Only(Tag::Fitness))
            .unwrap();
        let fitness = fitness_codec.decode(&fitness_env.bytes).unwrap();

        assert_eq!(decode_usize(&size.bytes).unwrap(), fitness_env.bytes.len());
        assert_eq!(fitness.value(), 14.0);
    }

    #[test]
    fn worker_terminates_on_evolution_end() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        coord.send(1, Tag::EvolutionEnd, Vec::new()).unwrap();

        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let never = |_: &[i32]| panic!("should not be called");
        let result = run_worker(&worker, &codec, &fitness_codec, &never);

        assert!(result.is_ok());
    }
}
