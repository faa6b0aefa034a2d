//! Ordered, tagged message transport between the coordinator and its
//! workers. The `Transport` trait is the only contract the dispatch engine
//! depends on; `ChannelTransport` is the in-process realization used both by
//! the demo binaries and by every test in this workspace.

mod channel;
mod tag;
mod transport;

pub use channel::ChannelTransport;
pub use tag::{RankId, Source, Tag, TagFilter};
pub use transport::{Envelope, Transport};
