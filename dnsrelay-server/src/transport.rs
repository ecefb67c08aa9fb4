use crate::prelude::Message;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// A UDP endpoint capable of receiving and sending one [`Message`] at a
/// time. Abstracted behind a trait so the root crate's event loop can be driven
/// against a mock in tests, the way `donos-resolver`'s `Resolver` trait
/// lets `donos` swap in `MockResolver`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn recv(&self) -> std::io::Result<Message>;
    async fn send(&self, message: &Message) -> std::io::Result<()>;
}

/// The production transport: one `tokio::net::UdpSocket`, used for both the
/// server-side (client-facing) and client-side (upstream-facing) endpoints.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
}

impl UdpEndpoint {
    pub async fn bind(address: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(address).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait::async_trait]
impl Transport for UdpEndpoint {
    async fn recv(&self) -> std::io::Result<Message> {
        let mut buffer = [0u8; 512];
        let (size, address) = self.socket.recv_from(&mut buffer).await?;
        tracing::debug!("received {size} bytes from {address:?}");
        Ok(Message {
                address,
                buffer,
                size,
            })
    }

    /// Fire-and-forget: the caller logs a send error and tears the
    /// associated in-flight record down as `Failed` rather than retrying
    /// here.
    async fn send(&self, message: &Message) -> std::io::Result<()> {
        tracing::debug!("sending {} bytes to {:?}", message.size, message.address);
        self.socket
        .send_to(message.payload(), message.address)
        .await?;
        Ok(())
    }
}
