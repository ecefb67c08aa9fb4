use std::fmt::Display;

/// A single malformed hosts-file line. Never fatal to the load — the
/// caller logs it and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsError {
    pub line_no: usize,
    pub line: String,
    pub reason: HostsErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostsErrorKind {
    MissingName,
    BadAddress,
}

impl Display for HostsErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "line has an address but no name"),
            Self::BadAddress => write!(f, "address column did not parse as IPv4 or IPv6"),
        }
    }
}

impl Display for HostsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hosts file line {}: {} ({:?})",
            self.line_no, self.reason, self.line
        )
    }
}

impl std::error::Error for HostsError {}
