use crate::id_pool::IdPool;
use dnsrelay_proto::Message;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// "Index entry": everything the multiplexer needs to correlate an
/// upstream reply back to its originating client and to rebuild a retry or
/// a SERVFAIL. `request` is the full original client datagram (with the
/// client's own transaction id still in its header) so a retransmit or a
/// failure response can be built without reaching back into any other
/// state.
#[derive(Debug, Clone)]
struct InFlight {
    client_addr: SocketAddr,
    request: Message,
    retries_left: u8,
    generation: u64,
}

/// Why a datagram produced no response. Distinguishes a handful of
/// dispositions that all look the same from the outside — nothing sent —
/// so the caller can log them distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    PoolExhausted,
    UpstreamUnbound,
    StaleTimer,
}

/// The effect a state transition demands of the event loop. The query pool
/// itself never touches a socket — it only decides what should happen
/// next.
#[derive(Debug, Clone)]
pub enum Action {
    ReplyToClient { message: Message, addr: SocketAddr },
    ForwardUpstream { message: Message },
    Drop(DropReason),
}

/// Per-in-flight-query state machine plus its timeout heap. Owns an
/// [`IdPool`] of [`InFlight`] records; timers are a `(deadline, outbound_id,
/// generation)` min-heap so arming/firing is O(log n) against the pool's
/// O(1) bind/unbind. `generation` invalidates a timer entry whose slot was
/// freed and rebound to a different query before the timer fired.
#[derive(Debug)]
pub struct QueryPool {
    ids: IdPool<InFlight>,
    timers: BinaryHeap<Reverse<(Instant, u16, u64)>>,
    next_generation: u64,
    pub timeout: Duration,
    pub max_retries: u8,
}

impl QueryPool {
    pub fn new(timeout: Duration, max_retries: u8) -> Self {
        Self {
            ids: IdPool::new(),
            timers: BinaryHeap::new(),
            next_generation: 0,
            timeout,
            max_retries,
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.ids.len()
    }

    /// The instant the next-firing timer is due, used by the event loop to
    /// size its `tokio::select!` timeout branch.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.peek().map(|Reverse((deadline, ..))| *deadline)
    }

    /// A `New`-state entry: a client datagram was decoded and the cache
    /// was already consulted by the caller. On a miss, binds an outbound
    /// id and arms the timeout (`Pending`); on pool exhaustion, `Drop`.
    pub fn on_miss(&mut self, client_addr: SocketAddr, request: Message, now: Instant) -> Action {
        let generation = self.next_generation;
        self.next_generation += 1;

        let outbound_id = match self.ids.insert(InFlight {
                client_addr,
                request: request.clone(),
                retries_left: self.max_retries,
                generation,
            }) {
            Ok(id) => id,
            Err(_) => {
                tracing::error!("id pool exhausted, dropping query from {client_addr:?}");
                return Action::Drop(DropReason::PoolExhausted);
            }
        };

        self.timers
        .push(Reverse((now + self.timeout, outbound_id, generation)));

        Action::ForwardUpstream {
            message: rewrite_id(request, outbound_id),
        }
    }

    /// `Pending`/`Retrying` → `Resolved`: an upstream reply arrived. If its
    /// id isn't bound, it's late or spurious and is dropped silently.
    /// Otherwise the slot is freed, the client's original id is restored,
    /// and the original question section is substituted verbatim so the
    /// reply is byte-identical to what the client asked.
    pub fn on_upstream_reply(&mut self, response: Message) -> Action {
        let outbound_id = response.header.id;
        let Some(in_flight) = self.ids.delete(outbound_id) else {
            tracing::debug!("upstream reply with unbound id {outbound_id}, dropping");
            return Action::Drop(DropReason::UpstreamUnbound);
        };

        let mut reply = response;
        reply.header.id = in_flight.request.header.id;
        reply.questions = in_flight.request.questions;

        Action::ReplyToClient {
            message: reply,
            addr: in_flight.client_addr,
        }
    }

    /// A timer fired for `(outbound_id, generation)`. If the slot has since
    /// been freed, or rebound to a different query, the timer is stale and
    /// ignored.
    pub fn on_timeout(&mut self, outbound_id: u16, generation: u64, now: Instant) -> Action {
        let still_current = matches!(
            self.ids.get(outbound_id),
            Some(in_flight) if in_flight.generation == generation
        );
        if !still_current {
            return Action::Drop(DropReason::StaleTimer);
        }

        let in_flight = self.ids.get_mut(outbound_id).expect("checked above");
        if in_flight.retries_left == 0 {
            let in_flight = self.ids.delete(outbound_id).expect("checked above");
            tracing::error!(
                "upstream timed out for {:?}, retries exhausted, replying servfail to {:?}",
                in_flight.request.questions.first(),
                in_flight.client_addr,
            );
            return Action::ReplyToClient {
                message: servfail_response(&in_flight.request),
                addr: in_flight.client_addr,
            };
        }

        tracing::debug!(
            "upstream timed out for outbound id {outbound_id}, {} retries left",
            in_flight.retries_left
        );
        in_flight.retries_left -= 1;
        let request = in_flight.request.clone();
        self.timers
        .push(Reverse((now + self.timeout, outbound_id, generation)));

        Action::ForwardUpstream {
            message: rewrite_id(request, outbound_id),
        }
    }

    /// Pop every timer whose deadline is at or before `now`, for the event
    /// loop to drive through [`Self::on_timeout`] in order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(u16, u64)> {
        let mut due = Vec::new();
        while let Some(Reverse((deadline, ..))) = self.timers.peek() {
            if *deadline > now {
                break;
            }
            let Reverse((_, id, generation)) = self.timers.pop().unwrap();
            due.push((id, generation));
        }
        due
    }

    pub fn destroy(self) {
        drop(self);
    }
}

fn rewrite_id(mut message: Message, outbound_id: u16) -> Message {
    message.header.id = outbound_id;
    message
}

/// Mirrors `dnsrelay_cache::servfail_response` without adding a dependency
/// on the cache crate — the `Failed` transition only needs the same
/// response shape, not anything the cache actually owns.
fn servfail_response(request: &Message) -> Message {
    Message::response_to(request).with_response_code(dnsrelay_proto::ResponseCode::SERVFAIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsrelay_proto::{QueryType, Question};
    use std::time::Duration;

    fn request(id: u16) -> Message {
        Message::query(id, Question::new("example.com".into(), QueryType::A))
    }

    #[test]
    fn miss_binds_an_outbound_id_and_forwards() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let now = Instant::now();

        match pool.on_miss(addr, request(0x1234), now) {
            Action::ForwardUpstream { message } => {
                assert_ne!(message.header.id, 0x1234);
            }
            other => panic!("expected ForwardUpstream, got {other:?}"),
        }
        assert_eq!(pool.in_flight_count(), 1);
        assert!(pool.next_deadline().is_some());
    }

    #[test]
    fn upstream_reply_restores_client_id_and_question() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let now = Instant::now();

        let Action::ForwardUpstream { message: forwarded } =
        pool.on_miss(addr, request(0xBEEF), now)
        else {
            panic!("expected ForwardUpstream");
        };

        let mut upstream_reply = forwarded.clone();
        upstream_reply.header.response = true;

        match pool.on_upstream_reply(upstream_reply) {
            Action::ReplyToClient { message, addr: reply_addr } => {
                assert_eq!(message.header.id, 0xBEEF);
                assert_eq!(message.questions, request(0xBEEF).questions);
                assert_eq!(reply_addr, addr);
            }
            other => panic!("expected ReplyToClient, got {other:?}"),
        }
        assert_eq!(pool.in_flight_count(), 0);
    }

    #[test]
    fn unbound_reply_is_dropped_silently() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let reply = request(0xABCD);
        match pool.on_upstream_reply(reply) {
            Action::Drop(DropReason::UpstreamUnbound) => {}
            other => panic!("expected Drop(UpstreamUnbound), got {other:?}"),
        }
    }

    #[test]
    fn pool_exhaustion_drops_new_queries() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let now = Instant::now();

        for i in 0..=u16::MAX {
            pool.on_miss(addr, request(i), now);
        }
        match pool.on_miss(addr, request(0), now) {
            Action::Drop(DropReason::PoolExhausted) => {}
            other => panic!("expected Drop(PoolExhausted), got {other:?}"),
        }
    }

    #[test]
    fn timeout_retries_then_fails_to_servfail() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let mut now = Instant::now();

        let Action::ForwardUpstream { message } = pool.on_miss(addr, request(0x1), now) else {
            panic!("expected ForwardUpstream");
        };
        let outbound_id = message.header.id;

        // two retries, same outbound id each time
        for _ in 0..2 {
            now += Duration::from_secs(5);
            let due = pool.drain_due(now);
            assert_eq!(due.len(), 1);
            match pool.on_timeout(due[0].0, due[0].1, now) {
                Action::ForwardUpstream { message } => {
                    assert_eq!(message.header.id, outbound_id);
                }
                other => panic!("expected ForwardUpstream, got {other:?}"),
            }
        }

        // third timeout: retries exhausted, SERVFAIL to the client
        now += Duration::from_secs(5);
        let due = pool.drain_due(now);
        assert_eq!(due.len(), 1);
        match pool.on_timeout(due[0].0, due[0].1, now) {
            Action::ReplyToClient { message, addr: reply_addr } => {
                assert_eq!(
                    message.header.response_code,
                    dnsrelay_proto::ResponseCode::SERVFAIL
                );
                assert_eq!(reply_addr, addr);
            }
            other => panic!("expected ReplyToClient(SERVFAIL), got {other:?}"),
        }
        assert_eq!(pool.in_flight_count(), 0);
    }

    #[test]
    fn stale_timer_after_reply_is_ignored() {
        let mut pool = QueryPool::new(Duration::from_secs(5), 2);
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let now = Instant::now();

        let Action::ForwardUpstream { message } = pool.on_miss(addr, request(0x1), now) else {
            panic!("expected ForwardUpstream");
        };
        let due = pool.drain_due(now + Duration::from_secs(5));
        assert!(due.is_empty(), "timer should not be due yet");

        let mut reply = message;
        reply.header.response = true;
        pool.on_upstream_reply(reply);

        // the timer that was armed at insert time is still in the heap;
        // firing it after the reply already freed the slot must be a
        // no-op rather than touching whatever query reused the id.
        let due_far_future = pool.drain_due(now + Duration::from_secs(100));
        for (id, generation) in due_far_future {
            match pool.on_timeout(id, generation, now + Duration::from_secs(100)) {
                Action::Drop(DropReason::StaleTimer) => {}
                other => panic!("expected Drop(StaleTimer), got {other:?}"),
            }
        }
    }
}
