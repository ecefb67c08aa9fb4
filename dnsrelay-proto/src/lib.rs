//! RFC 1035 message codec used by the relay.
//!
//! This crate owns the wire format only: a [`PacketBuffer`] cursor over a
//! fixed 512-byte scratch buffer, and the [`Message`]/[`Header`]/
//! [`Question`]/[`Record`] value types that parse out of it and serialize
//! back into it. It knows nothing about caching, upstream forwarding, or the
//! event loop — those live in sibling crates.

pub mod buffer;
pub mod error;
pub mod header;
pub mod message;
pub mod question;
pub mod record;

pub use buffer::reader::ReaderError;
pub use buffer::writer::WriterError;
pub use buffer::PacketBuffer;
pub use error::CodecError;
pub use header::{Header, ResponseCode};
pub use message::Message;
pub use question::{QueryType, Question};
pub use record::Record;
