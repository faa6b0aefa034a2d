use std::fmt;

/// The closed set of message tags exchanged between the coordinator and its
/// workers (spec section 6). Every envelope carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// coord -> worker: count of individuals to follow (co-evolution mode).
    NbIndividuals,
    /// both directions: byte length of the next payload.
    MessageSize,
    /// coord -> worker: opaque genotype bytes.
    Individual,
    /// worker -> coord: opaque fitness bytes.
    Fitness,
    /// coord -> worker: empty body, signals termination.
    EvolutionEnd,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::NbIndividuals => "NbIndividuals",
            Tag::MessageSize => "MessageSize",
            Tag::Individual => "Individual",
            Tag::Fitness => "Fitness",
            Tag::EvolutionEnd => "EvolutionEnd",
        };
        write!(f, "{name}")
    }
}

/// Rank addressing. A `RankId` of `0` is always the coordinator by
/// convention; ranks `1..N` are workers.
pub type RankId = usize;

/// Who a `recv`/`probe` call should accept a message from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Any,
    Rank(RankId),
}

/// Which tag a `recv`/`probe` call should accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter {
    Any,
    Only(Tag),
}

impl TagFilter {
    pub fn matches(&self, tag: Tag) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Only(expected) => *expected == tag,
        }
    }
}

impl Source {
    pub fn matches(&self, rank: RankId) -> bool {
        match self {
            Source::Any => true,
            Source::Rank(expected) => *expected == rank,
        }
    }
}
