use std::fmt::Display;
use std::path::PathBuf;

/// Composes every library crate's error type into the one `main` deals
/// with, mapped to exit codes: 0 normal, 1 config/file-open failure,
/// 2 bind failure.
#[derive(Debug)]
pub enum RelayError {
    HostsFileOpen { path: PathBuf, source: std::io::Error },
    LogFileOpen { path: PathBuf, source: std::io::Error },
    Bind { addr: std::net::SocketAddr, source: std::io::Error },
}

impl RelayError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HostsFileOpen { .. } | Self::LogFileOpen { .. } => 1,
            Self::Bind { .. } => 2,
        }
    }
}

impl Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostsFileOpen { path, source } => {
                write!(f, "couldn't open hosts file {path:?}: {source}")
            }
            Self::LogFileOpen { path, source } => {
                write!(f, "couldn't open log file {path:?}: {source}")
            }
            Self::Bind { addr, source } => write!(f, "couldn't bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HostsFileOpen { source, .. }
            | Self::LogFileOpen { source, .. }
            | Self::Bind { source, .. } => Some(source),
        }
    }
}
