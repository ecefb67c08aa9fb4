use crate::logging::fatal;
use dnsrelay_cache::{CacheFacade, Resolution};
use dnsrelay_pool::{Action, QueryPool};
use dnsrelay_proto::Message as ProtoMessage;
use dnsrelay_server::{Message as WireMessage, Transport};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// The single mutable value the event loop threads through every callback.
/// Owns the cache and the query pool; knows nothing about which transport
/// is the client-facing one and which is the upstream-facing one beyond
/// the addresses passed to [`Core::run`].
pub struct Core {
    cache: CacheFacade,
    pool: QueryPool,
    upstream_addr: SocketAddr,
}

/// Fallback wait when no timer is armed — just long enough that the loop
/// never busy-spins, short enough to periodically reconsider; in practice
/// a server/client recv almost always wins the race first.
const IDLE_POLL: Duration = Duration::from_secs(3600);

impl Core {
    pub fn new(cache: CacheFacade, timeout: Duration, retries: u8, upstream_addr: SocketAddr) -> Self {
        Self {
            cache,
            pool: QueryPool::new(timeout, retries),
            upstream_addr,
        }
    }

    /// Drives the three suspension points the event loop waits on:
    /// server-socket receive, client(upstream)-socket receive, and the
    /// earliest-pending timer.
    /// Runs forever; the caller's `tokio::main` owns process lifetime.
    pub async fn run(&mut self, server: &dyn Transport, client: &dyn Transport) -> ! {
        loop {
            let now = Instant::now();
            let sleep_for = self
            .pool
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(IDLE_POLL);
            let sleep = tokio::time::sleep(sleep_for);
            tokio::pin!(sleep);

            tokio::select! {
                result = server.recv() => self.on_server_recv(result, server, client).await,
                result = client.recv() => self.on_client_recv(result, server, client).await,
                _ = &mut sleep => self.on_timer(server, client).await,
            }
        }
    }

    async fn on_server_recv(
        &mut self,
        result: std::io::Result<WireMessage>,
        server: &dyn Transport,
        client: &dyn Transport,
    ) {
        let datagram = match result {
            Ok(datagram) => datagram,
            Err(error) => {
                tracing::error!("server socket recv failed: {error}");
                return;
            }
        };

        let request = match ProtoMessage::decode(datagram.payload()) {
            Ok(message) => message,
            Err(error) => {
                tracing::error!("dropping malformed query from {:?}: {error}", datagram.address);
                return;
            }
        };

        match self.cache.resolve(&request) {
            Resolution::Hit(response) => self.send(server, datagram.address, &response).await,
            Resolution::Miss => {
                let action = self.pool.on_miss(datagram.address, request, Instant::now());
                self.dispatch(action, server, client).await;
            }
        }
    }

    async fn on_client_recv(
        &mut self,
        result: std::io::Result<WireMessage>,
        server: &dyn Transport,
        client: &dyn Transport,
    ) {
        let datagram = match result {
            Ok(datagram) => datagram,
            Err(error) => {
                tracing::error!("client socket recv failed: {error}");
                return;
            }
        };

        let response = match ProtoMessage::decode(datagram.payload()) {
            Ok(message) => message,
            Err(error) => {
                tracing::error!("dropping malformed upstream reply: {error}");
                return;
            }
        };

        let action = self.pool.on_upstream_reply(response.clone());
        if matches!(action, Action::ReplyToClient { .. }) {
            self.cache.insert(&response);
        }
        self.dispatch(action, server, client).await;
    }

    async fn on_timer(&mut self, server: &dyn Transport, client: &dyn Transport) {
        let now = Instant::now();
        for (outbound_id, generation) in self.pool.drain_due(now) {
            let action = self.pool.on_timeout(outbound_id, generation, now);
            self.dispatch(action, server, client).await;
        }
    }

    async fn dispatch(&self, action: Action, server: &dyn Transport, client: &dyn Transport) {
        match action {
            Action::ReplyToClient { message, addr } => self.send(server, addr, &message).await,
            Action::ForwardUpstream { message } => {
                self.send(client, self.upstream_addr, &message).await
            }
            Action::Drop(reason) => tracing::debug!("dropped: {reason:?}"),
        }
    }

    /// RDLENGTH/count invariants are asserted inside `encode` itself;
    /// a failure here is fatal to this one message only, not the process.
    async fn send(&self, transport: &dyn Transport, addr: SocketAddr, message: &ProtoMessage) {
        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(error) => {
                fatal!("failed to encode outgoing message to {addr:?}: {error}");
                return;
            }
        };

        let wire = WireMessage::from_payload(addr, &bytes);
        if let Err(error) = transport.send(&wire).await {
            tracing::error!("send to {addr:?} failed: {error}");
        }
    }
}
