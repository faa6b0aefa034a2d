use crate::evaluator::Evaluator;
use crate::wire::{check_len, decode_usize, encode_usize};
use evo_core::{Assignment, Codec, Context, Deme, EvaluationSet, Fitness, FitnessCodec};
use evo_error::{EngineResult, evo_bail};
use evo_transport::{RankId, Source, Tag, TagFilter, Transport};

/// Per-worker slot state on the coordinator, replacing the `-1 / -2 / index`
/// sentinel convention from the original source with an exhaustive enum
/// (spec section 9: "deep inheritance... flattens to a tagged variant"
/// applies equally well to sentinel integers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    Coordinator,
    Busy(usize),
}

/// Runs one dispatch pass over a deme in plain mode (spec section 4.4):
/// overlapped send/receive, skip-if-already-valid, `N == 1` local fallback,
/// assignments applied in origin-index order regardless of reply-arrival
/// order. Grounded line-for-line on
/// `MPI_EvaluationOp.cpp::distributeDemeEvaluation`.
pub fn dispatch_deme<G>(
    transport: &dyn Transport,
    codec: &dyn Codec<G>,
    fitness_codec: &dyn FitnessCodec,
    deme: &mut Deme<G>,
    generation: usize,
    evaluator: &dyn Evaluator<G>,
    ctx: &mut Context,
) -> EngineResult<()> {
    if deme.is_empty() {
        return Ok(());
    }

    if transport.world_size() == 1 {
        for i in 0..deme.len() {
            if !deme[i].is_fitness_valid() {
                let fitness = evaluator.evaluate(std::slice::from_ref(deme[i].genotype()));
                deme[i].set_fitness(fitness);
                ctx.record_processed(1);
            }
        }
        return Ok(());
    }

    let n = deme.len();
    let mut slots = init_slots(transport.world_size());
    let mut cursor = 0usize;
    let mut sent = 0usize;
    let mut received = 0usize;
    let mut all_sent = false;

    while !(all_sent && received == sent) {
        let mut made_progress = false;

        if !all_sent {
            while cursor < n && deme[cursor].is_fitness_valid() {
                cursor += 1;
            }
            if cursor >= n {
                all_sent = true;
            } else if let Some(worker) = idle_worker(&slots) {
                let bytes = codec.encode(deme[cursor].genotype())?;
                send_single(transport, worker, &bytes, generation)?;
                slots[worker] = SlotState::Busy(cursor);
                sent += 1;
                cursor += 1;
                made_progress = true;
                if cursor >= n {
                    all_sent = true;
                }
            }
        }

        if let Some(source) = poll_reply(transport) {
            let fitness = recv_fitness(transport, source, fitness_codec)?;
            let origin = take_slot(&mut slots, source)?;
            received += 1;
            deme[origin].set_fitness(fitness);
            ctx.record_processed(1);
            made_progress = true;
        }

        if !made_progress {
            std::thread::yield_now();
        }
    }

    Ok(())
}

/// Runs one dispatch pass over a batch of co-evolution evaluation sets (spec
/// section 4.4, co-evolution branch), writing each set's fitness back per its
/// `Assignment`: `All` clones the fitness onto every individual in the set,
/// `Index(k)` assigns only the k-th (one-based). Every processed set also
/// increments `ctx`'s per-deme and per-vivarium `processed`/`total-processed`
/// counters, keyed by `EvaluationSet::producer_deme_id` rather than by
/// dispatch order.
pub fn dispatch_sets<G>(
    transport: &dyn Transport,
    codec: &dyn Codec<G>,
    fitness_codec: &dyn FitnessCodec,
    sets: &mut [EvaluationSet<G>],
    generation: usize,
    evaluator: &dyn Evaluator<G>,
    ctx: &mut Context,
) -> EngineResult<Vec<Vec<Fitness>>> {
    let mut results: Vec<Vec<Fitness>> = sets.iter().map(|s| vec![Fitness::default(); s.len()]).collect();

    if sets.is_empty() {
        return Ok(results);
    }

    if transport.world_size() == 1 {
        for (i, set) in sets.iter().enumerate() {
            let fitness = evaluator.evaluate(set.genotypes());
            apply_assignment(&mut results[i], set.assignment(), fitness);
            ctx.record_processed_vivarium(1);
            ctx.record_processed_for_deme(set.producer_deme_id(), 1);
        }
        return Ok(results);
    }

    let n = sets.len();
    let mut slots = init_slots(transport.world_size());
    let mut cursor = 0usize;
    let mut sent = 0usize;
    let mut received = 0usize;
    let mut all_sent = false;

    while !(all_sent && received == sent) {
        let mut made_progress = false;

        if !all_sent {
            if let Some(worker) = idle_worker(&slots) {
                let set = &sets[cursor];
                send_group(transport, worker, codec, set.genotypes(), generation)?;
                slots[worker] = SlotState::Busy(cursor);
                sent += 1;
                cursor += 1;
                made_progress = true;
                if cursor >= n {
                    all_sent = true;
                }
            }
        }

        if let Some(source) = poll_reply(transport) {
            let fitness = recv_fitness(transport, source, fitness_codec)?;
            let origin = take_slot(&mut slots, source)?;
            received += 1;
            apply_assignment(&mut results[origin], sets[origin].assignment(), fitness);
            ctx.record_processed_vivarium(1);
            ctx.record_processed_for_deme(sets[origin].producer_deme_id(), 1);
            made_progress = true;
        }

        if !made_progress {
            std::thread::yield_now();
        }
    }

    Ok(results)
}

fn apply_assignment(slot_fitnesses: &mut [Fitness], assignment: Assignment, fitness: Fitness) {
    match assignment {
        Assignment::All => slot_fitnesses.iter_mut().for_each(|f| *f = fitness),
        Assignment::Index(index) => {
            if let Some(target) = slot_fitnesses.get_mut(index.get() - 1) {
                *target = fitness;
            }
        }
    }
}

fn init_slots(world_size: usize) -> Vec<SlotState> {
    let mut slots = vec![SlotState::Idle; world_size];
    slots[0] = SlotState::Coordinator;
    slots
}

fn idle_worker(slots: &[SlotState]) -> Option<RankId> {
    slots.iter().position(|s| matches!(s, SlotState::Idle))
}

fn take_slot(slots: &mut [SlotState], source: RankId) -> EngineResult<usize> {
    match slots.get(source) {
        Some(SlotState::Busy(origin)) => {
            let origin = *origin;
            slots[source] = SlotState::Idle;
            Ok(origin)
        }
        _ => evo_bail!(Protocol: "reply from rank {source} with no outstanding work"),
    }
}

fn poll_reply(transport: &dyn Transport) -> Option<RankId> {
    transport
        .probe(Source::Any, TagFilter::Only(Tag::MessageSize))
        .map(|(source, _tag)| source)
}

fn recv_fitness(
    transport: &dyn Transport,
    source: RankId,
    fitness_codec: &dyn FitnessCodec,
) -> EngineResult<Fitness> {
    let size_env = transport.recv(Source::Rank(source), TagFilter::Only(Tag::MessageSize))?;
    let len = decode_usize(&size_env.bytes)?;
    let fitness_env = transport.recv(Source::Rank(source), TagFilter::Only(Tag::Fitness))?;
    check_len(len, fitness_env.bytes.len())?;
    fitness_codec.decode(&fitness_env.bytes)
}

fn send_single(
    transport: &dyn Transport,
    dest: RankId,
    bytes: &[u8],
    generation: usize,
) -> EngineResult<()> {
    transport.send(dest, Tag::MessageSize, encode_usize(bytes.len()))?;
    transport.send(dest, Tag::Individual, bytes.to_vec())?;
    transport.send(dest, Tag::MessageSize, encode_usize(generation))?;
    Ok(())
}

fn send_group<G>(
    transport: &dyn Transport,
    dest: RankId,
    codec: &dyn Codec<G>,
    genotypes: &[G],
    generation: usize,
) -> EngineResult<()> {
    transport.send(dest, Tag::NbIndividuals, encode_usize(genotypes.len()))?;
    for genotype in genotypes {
        let bytes = codec.encode(genotype)?;
        transport.send(dest, Tag::MessageSize, encode_usize(bytes.len()))?;
        transport.send(dest, Tag::Individual, bytes)?;
    }
    transport.send(dest, Tag::MessageSize, encode_usize(generation))?;
    Ok(())
}

/// Fire-and-forget shutdown broadcast (spec section 4.7): one zero-length
/// `EvolutionEnd` per worker rank `[1..N)`.
pub fn broadcast_shutdown(transport: &dyn Transport) -> EngineResult<()> {
    for worker in 1..transport.world_size() {
        transport.send(worker, Tag::EvolutionEnd, Vec::new())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::{Individual, PlainFitnessCodec};
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

    fn run_echo_worker(transport: ChannelTransport) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let codec = PlainCodec;
            let fitness_codec = PlainFitnessCodec;
            let double = |genotypes: &[i32]| Fitness::new(genotypes.iter().sum::<i32>() as f64 * 2.0);
            crate::worker::run_worker(&transport, &codec, &fitness_codec, &double).unwrap();
        })
    }

    #[test]
    fn single_worker_fallback_evaluates_locally() {
        let transport = ChannelTransport::world(1).remove(0);
        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let mut deme: Deme<i32> = Deme::from(vec![Individual::new(3), Individual::new(4)]);
        let mut ctx = Context::new();
        let evaluator = |g: &[i32]| Fitness::new(g[0] as f64);

        dispatch_deme(&transport, &codec, &fitness_codec, &mut deme, 0, &evaluator, &mut ctx).unwrap();

        assert_eq!(deme[0].fitness().unwrap().value(), 3.0);
        assert_eq!(deme[1].fitness().unwrap().value(), 4.0);
        assert_eq!(ctx.total_processed(), 2);
    }

    #[test]
    fn two_workers_overlap_and_assign_by_origin_index() {
        let mut world = ChannelTransport::world(3);
        let worker_a = world.remove(2);
        let worker_b = world.remove(1);
        let coord = world.remove(0);

        let handle_a = run_echo_worker(worker_a);
        let handle_b = run_echo_worker(worker_b);

        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let mut deme: Deme<i32> = Deme::from(vec![
            Individual::new(1),
            Individual::new(2),
            Individual::new(3),
            Individual::new(4),
        ]);
        let mut ctx = Context::new();
        let local_evaluator = |_: &[i32]| panic!("should dispatch, not evaluate locally");

        dispatch_deme(
            &coord,
            &codec,
            &fitness_codec,
            &mut deme,
            0,
            &local_evaluator,
            &mut ctx,
        )
        .unwrap();

        broadcast_shutdown(&coord).unwrap();
        handle_a.join().unwrap();
        handle_b.join().unwrap();

        assert_eq!(deme[0].fitness().unwrap().value(), 2.0);
        assert_eq!(deme[1].fitness().unwrap().value(), 4.0);
        assert_eq!(deme[2].fitness().unwrap().value(), 6.0);
        assert_eq!(deme[3].fitness().unwrap().value(), 8.0);
        assert_eq!(ctx.total_processed(), 4);
    }

    #[test]
    fn already_valid_individuals_are_not_resent() {
        let transport = ChannelTransport::world(1).remove(0);
        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let mut deme: Deme<i32> = Deme::from(vec![
            Individual::with_fitness(1, Fitness::new(99.0)),
            Individual::new(2),
        ]);
        let mut ctx = Context::new();
        let evaluator = |g: &[i32]| Fitness::new(g[0] as f64);

        dispatch_deme(&transport, &codec, &fitness_codec, &mut deme, 0, &evaluator, &mut ctx).unwrap();

        assert_eq!(deme[0].fitness().unwrap().value(), 99.0);
        assert_eq!(deme[1].fitness().unwrap().value(), 2.0);
        assert_eq!(ctx.total_processed(), 1);
    }

    #[test]
    fn empty_deme_returns_immediately() {
        let transport = ChannelTransport::world(2).remove(0);
        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let mut deme: Deme<i32> = Deme::default();
        let mut ctx = Context::new();
        let evaluator = |g: &[i32]| Fitness::new(g[0] as f64);

        dispatch_deme(&transport, &codec, &fitness_codec, &mut deme, 0, &evaluator, &mut ctx).unwrap();

        assert_eq!(ctx.total_processed(), 0);
    }

    #[test]
    fn dispatch_sets_attributes_processed_counts_by_producer_deme_id() {
        let transport = ChannelTransport::world(1).remove(0);
        let codec = PlainCodec;
        let fitness_codec = PlainFitnessCodec;
        let mut sets = vec![
            EvaluationSet::new(vec![1], Assignment::All, 0),
            EvaluationSet::new(vec![2], Assignment::All, 3),
            EvaluationSet::new(vec![5], Assignment::All, 0),
        ];
        let mut ctx = Context::new();
        let evaluator = |g: &[i32]| Fitness::new(g[0] as f64);

        let results = dispatch_sets(&transport, &codec, &fitness_codec, &mut sets, 0, &evaluator, &mut ctx).unwrap();

        assert_eq!(results[0][0].value(), 1.0);
        assert_eq!(results[1][0].value(), 2.0);
        assert_eq!(results[2][0].value(), 5.0);
        assert_eq!(ctx.processed_for_deme(0), 2);
        assert_eq!(ctx.processed_for_deme(3), 1);
        assert_eq!(ctx.processed_for_deme(1), 0);
        assert_eq!(ctx.total_processed_vivarium(), 3);
    }
}
