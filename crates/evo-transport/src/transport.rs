use crate::tag::{RankId, Source, Tag, TagFilter};
use evo_error::EngineResult;

/// An envelope as it travels the wire: a tagged, rank-addressed byte payload.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub source: RankId,
    pub tag: Tag,
    pub bytes: Vec<u8>,
}

/// Ordered, tagged message passing between the coordinator (rank 0) and its
/// workers (spec section 4.1). Implementations must deliver messages from a
/// given source to a given destination in send order; no cross-source
/// ordering is guaranteed or assumed.
pub trait Transport: Send + Sync {
    /// Total number of ranks participating, including the coordinator.
    fn world_size(&self) -> usize;

    /// This transport handle's own rank.
    fn rank(&self) -> RankId;

    /// Blocking, ordered, reliable send to `dest`.
    fn send(&self, dest: RankId, tag: Tag, bytes: Vec<u8>) -> EngineResult<()>;

    /// Blocking receive of the next message matching `source`/`tag`.
    fn recv(&self, source: Source, tag: TagFilter) -> EngineResult<Envelope>;

    /// Non-blocking poll: returns the source/tag of a pending message
    /// matching the filter without consuming it, or `None` if nothing is
    /// waiting.
    fn probe(&self, source: Source, tag: TagFilter) -> Option<(RankId, Tag)>;
}
