//! Domain-name-indexed cache. Owns CNAME
//! chasing, hosts-file ingest, and the sink-hole policy for blocked names;
//! knows nothing about sockets, transaction ids, or the event loop.

pub mod error;
pub mod facade;
pub mod hosts;
pub mod trie;

pub use error::{HostsError, HostsErrorKind};
pub use facade::{servfail_response, CacheFacade, Resolution};
pub use trie::DomainTrie;
