pub mod reader;
pub mod writer;

/// A 512-byte scratch buffer with a cursor, mirroring the classic DNS/UDP
/// packet size limit.
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    pub buf: [u8; 512],
    pub pos: usize,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self {
            buf: [0; 512],
            pos: 0,
        }
    }
}

impl PacketBuffer {
    pub fn new(buf: [u8; 512]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current position within the buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }
}
