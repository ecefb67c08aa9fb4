use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use std::fmt::Display;

/// Unifies the reader's and writer's failure modes. A `CodecError` is
/// always fatal to the single message being processed — the caller drops
/// the datagram and logs, it never propagates to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    TruncatedBuffer,
    NameTooLong,
    PointerCycle,
    BadRdLength,
    /// Reserved for a `Message` built with a hand-set section count that
    /// disagrees with its actual section length. Unreachable through the
    /// normal encode path, since `Message::encode` always derives counts
    /// from the section lengths rather than trusting a stored count.
    CountMismatch,
}

impl Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedBuffer => write!(f, "read past the end of the buffer"),
            Self::NameTooLong => write!(f, "domain name exceeds 255 octets"),
            Self::PointerCycle => write!(f, "compression pointer forms a cycle"),
            Self::BadRdLength => write!(f, "rdata did not match its declared rdlength"),
            Self::CountMismatch => write!(f, "section length does not match header count"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<ReaderError> for CodecError {
    fn from(value: ReaderError) -> Self {
        match value {
            ReaderError::TruncatedBuffer => Self::TruncatedBuffer,
            ReaderError::NameTooLong => Self::NameTooLong,
            ReaderError::PointerCycle => Self::PointerCycle,
            ReaderError::BadRdLength => Self::BadRdLength,
        }
    }
}

impl From<WriterError> for CodecError {
    fn from(value: WriterError) -> Self {
        match value {
            WriterError::EndOfBuffer => Self::TruncatedBuffer,
            WriterError::LabelTooLong => Self::NameTooLong,
        }
    }
}
