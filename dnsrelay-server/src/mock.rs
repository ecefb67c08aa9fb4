use crate::prelude::Message;
use crate::transport::Transport;
use std::net::SocketAddr;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

/// An in-process stand-in for a UDP socket, used by the root crate's event
/// loop tests to drive client/upstream traffic without binding a real port.
/// Mirrors `donos-resolver::mock::MockResolver`'s role for its `Resolver`
/// trait.
pub struct MockTransport {
    inbox: Mutex<mpsc::UnboundedReceiver<Message>>,
    outbox: mpsc::UnboundedSender<Message>,
}

impl MockTransport {
    /// Build a connected pair: anything fed into `deliver` on one end shows
    /// up via `recv`, and anything `send` on that end can be observed
    /// through the other end's `sent` receiver.
    pub fn pair() -> (MockTransport, mpsc::UnboundedSender<Message>, mpsc::UnboundedReceiver<Message>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (
            MockTransport {
                inbox: Mutex::new(inbound_rx),
                outbox: outbound_tx,
            },
            inbound_tx,
            outbound_rx,
        )
    }

    pub fn deliver(address: SocketAddr, payload: &[u8], tx: &mpsc::UnboundedSender<Message>) {
        let _ = tx.send(Message::from_payload(address, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_datagram_through_the_pair() {
        let (transport, inbound, mut outbound) = MockTransport::pair();
        let addr: SocketAddr = "127.0.0.1:5300".parse().unwrap();
        MockTransport::deliver(addr, &[1, 2, 3], &inbound);

        let received = transport.recv().await.unwrap();
        assert_eq!(received.payload(), &[1, 2, 3]);

        transport.send(&received).await.unwrap();
        let sent = outbound.recv().await.unwrap();
        assert_eq!(sent.payload(), &[1, 2, 3]);
        assert_eq!(sent.address, addr);
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn recv(&self) -> std::io::Result<Message> {
        self.inbox
        .lock()
        .await
        .recv()
        .await
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock closed"))
    }

    async fn send(&self, message: &Message) -> std::io::Result<()> {
        let copy = Message::from_payload(message.address, message.payload());
        self.outbox
        .send(copy)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock closed"))
    }
}
