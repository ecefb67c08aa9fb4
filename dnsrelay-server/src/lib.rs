//! Thin UDP adapters: bind sockets, hand datagrams to the core as
//! [`prelude::Message`] values, send fire-and-forget. No framing, no
//! retries, no state — that all lives in `dnsrelay-pool`/`dnsrelay-cache`
//! and is driven by the root crate's event loop.

#[cfg(feature = "mock")]
pub mod mock;
pub mod prelude;
pub mod transport;

pub use prelude::Message;
pub use transport::{Transport, UdpEndpoint};
