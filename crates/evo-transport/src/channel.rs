use crate::tag::{RankId, Source, Tag, TagFilter};
use crate::transport::{Envelope, Transport};
use evo_error::{EngineResult, evo_err};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// In-process `Transport` realizing every rank as a native OS thread
/// communicating over `std::sync::mpsc` channels, grounded on the teacher's
/// `domain::thread_pool` `Sender`/`Receiver` construction. One channel per
/// destination rank gives per-source FIFO ordering for free, matching the
/// ordering guarantee required by spec section 4.1.
///
/// `probe` is a true non-blocking poll: pending-but-unmatched messages are
/// drained out of the channel into a `Mutex<VecDeque<Envelope>>` buffer so
/// that probing never loses a message, and a later `recv`/`probe` still
/// observes it.
pub struct ChannelTransport {
    rank: RankId,
    senders: Arc<Vec<Sender<Envelope>>>,
    receiver: Mutex<Receiver<Envelope>>,
    pending: Mutex<VecDeque<Envelope>>,
}

impl ChannelTransport {
    /// Builds one `ChannelTransport` per rank `0..world_size`, fully wired
    /// to each other. Rank 0 is the coordinator by convention.
    pub fn world(world_size: usize) -> Vec<ChannelTransport> {
        let mut senders = Vec::with_capacity(world_size);
        let mut receivers = Vec::with_capacity(world_size);
        for _ in 0..world_size {
            let (tx, rx) = mpsc::channel();
            senders.push(tx);
            receivers.push(rx);
        }
        let senders = Arc::new(senders);

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, receiver)| ChannelTransport {
                rank,
                senders: Arc::clone(&senders),
                receiver: Mutex::new(receiver),
                pending: Mutex::new(VecDeque::new()),
            })
            .collect()
    }

    /// Drains every currently-available message out of the underlying
    /// channel into the pending buffer, without blocking.
    fn drain_available(&self) {
        let receiver = self.receiver.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        while let Ok(envelope) = receiver.try_recv() {
            pending.push_back(envelope);
        }
    }

    fn take_matching(
        pending: &mut VecDeque<Envelope>,
        source: Source,
        tag: TagFilter,
    ) -> Option<Envelope> {
        let position = pending
            .iter()
            .position(|env| source.matches(env.source) && tag.matches(env.tag))?;
        pending.remove(position)
    }
}

impl Transport for ChannelTransport {
    fn world_size(&self) -> usize {
        self.senders.len()
    }

    fn rank(&self) -> RankId {
        self.rank
    }

    fn send(&self, dest: RankId, tag: Tag, bytes: Vec<u8>) -> EngineResult<()> {
        let sender = self
            .senders
            .get(dest)
            .ok_or_else(|| evo_err!(Protocol: "send to unknown rank {dest}"))?;
        sender
            .send(Envelope {
                source: self.rank,
                tag,
                bytes,
            })
            .map_err(|_| evo_err!(Protocol: "destination rank {dest} has hung up"))?;
        tracing::trace!(dest, %tag, "sent message");
        Ok(())
    }

    fn recv(&self, source: Source, tag: TagFilter) -> EngineResult<Envelope> {
        {
            let mut pending = self.pending.lock().unwrap();
            if let Some(envelope) = Self::take_matching(&mut pending, source, tag) {
                return Ok(envelope);
            }
        }

        loop {
            let envelope = {
                let receiver = self.receiver.lock().unwrap();
                receiver
                    .recv()
                    .map_err(|_| evo_err!(Protocol: "all senders have hung up"))?
            };

            if source.matches(envelope.source) && tag.matches(envelope.tag) {
                return Ok(envelope);
            }

            self.pending.lock().unwrap().push_back(envelope);
        }
    }

    fn probe(&self, source: Source, tag: TagFilter) -> Option<(RankId, Tag)> {
        {
            let pending = self.pending.lock().unwrap();
            if let Some(envelope) = pending
                .iter()
                .find(|env| source.matches(env.source) && tag.matches(env.tag))
            {
                return Some((envelope.source, envelope.tag));
            }
        }

        self.drain_available();

        let pending = self.pending.lock().unwrap();
        pending
            .iter()
            .find(|env| source.matches(env.source) && tag.matches(env.tag))
            .map(|env| (env.source, env.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_then_recv_round_trips() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        coord
            .send(1, Tag::Individual, vec![1, 2, 3])
            .expect("send");
        let envelope = worker
            .recv(Source::Rank(0), TagFilter::Only(Tag::Individual))
            .expect("recv");

        assert_eq!(envelope.bytes, vec![1, 2, 3]);
        assert_eq!(envelope.source, 0);
    }

    #[test]
    fn probe_does_not_consume_the_message() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        coord.send(1, Tag::Fitness, vec![9]).expect("send");

        let first = worker.probe(Source::Any, TagFilter::Any);
        let second = worker.probe(Source::Any, TagFilter::Any);
        assert_eq!(first, Some((0, Tag::Fitness)));
        assert_eq!(second, Some((0, Tag::Fitness)));

        let envelope = worker.recv(Source::Any, TagFilter::Any).expect("recv");
        assert_eq!(envelope.bytes, vec![9]);
        assert_eq!(worker.probe(Source::Any, TagFilter::Any), None);
    }

    #[test]
    fn recv_buffers_non_matching_messages_for_later() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        coord.send(1, Tag::MessageSize, vec![4]).expect("send");
        coord.send(1, Tag::Individual, vec![5]).expect("send");

        let individual = worker
            .recv(Source::Any, TagFilter::Only(Tag::Individual))
            .expect("recv");
        assert_eq!(individual.bytes, vec![5]);

        let size = worker
            .recv(Source::Any, TagFilter::Only(Tag::MessageSize))
            .expect("recv");
        assert_eq!(size.bytes, vec![4]);
    }

    #[test]
    fn per_source_ordering_is_preserved() {
        let world = ChannelTransport::world(2);
        let [coord, worker]: [ChannelTransport; 2] = world.try_into().ok().unwrap();

        coord.send(1, Tag::Individual, vec![1]).expect("send");
        coord.send(1, Tag::Individual, vec![2]).expect("send");

        let first = worker
            .recv(Source::Rank(0), TagFilter::Only(Tag::Individual))
            .unwrap();
        let second = worker
            .recv(Source::Rank(0), TagFilter::Only(Tag::Individual))
            .unwrap();

        assert_eq!(first.bytes, vec![1]);
        assert_eq!(second.bytes, vec![2]);
    }
}
