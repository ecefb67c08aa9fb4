//! The in-flight query multiplexer: allocates outbound
//! transaction ids, correlates upstream replies back to their originating
//! client, and drives the per-query timeout/retry state machine. Pure
//! state-transition functions over `Action` — no socket I/O lives here.

pub mod error;
pub mod id_pool;
pub mod query_pool;

pub use error::PoolExhausted;
pub use id_pool::IdPool;
pub use query_pool::{Action, DropReason, QueryPool};
