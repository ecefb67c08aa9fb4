use std::net::SocketAddr;

/// One received or about-to-be-sent datagram. `buffer`/`size` rather than a
/// `Vec` so a receive never allocates past the fixed 512-byte DNS/UDP limit
/// — mirrors `donos-server`'s `Message` byte-for-byte.
pub struct Message {
    pub address: SocketAddr,
    pub buffer: [u8; 512],
    pub size: usize,
}

impl Message {
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    pub fn from_payload(address: SocketAddr, payload: &[u8]) -> Self {
        let mut buffer = [0u8; 512];
        let size = payload.len().min(buffer.len());
        buffer[..size].copy_from_slice(&payload[..size]);
        Self {
            address,
            buffer,
            size,
        }
    }
}
