use std::fmt::Display;

/// "PoolExhausted" — the only failure mode the ID Pool itself surfaces;
/// everything else is upheld by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolExhausted;

impl Display for PoolExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id pool is full, 65536 ids are bound")
    }
}

impl std::error::Error for PoolExhausted {}
