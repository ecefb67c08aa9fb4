use crate::trie::DomainTrie;
use dnsrelay_proto::{Message, QueryType, Record, ResponseCode};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Lookup orchestration outcome. A `Hit` is a fully-formed response
/// ready to send straight back to the client; a `Miss` means the event
/// loop must forward the original request upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Hit(Message),
    Miss,
}

/// The maximum number of CNAME hops a single resolution will follow before
/// giving up and reporting a `Miss`.
const MAX_CHASE_DEPTH: usize = 8;

/// `0.0.0.0` / `::` are the hosts-file block sentinels. A resolve
/// that lands on one of these synthesizes NXDOMAIN instead of returning the
/// sentinel address to the client.
fn is_block_sentinel(record: &Record) -> bool {
    match record {
        Record::A { addr, .. } => *addr == Ipv4Addr::UNSPECIFIED,
        Record::Aaaa { addr, .. } => *addr == Ipv6Addr::UNSPECIFIED,
        _ => false,
    }
}

/// Name-indexed cache plus the CNAME-chasing and hosts-file-seeded
/// sink-hole policy layered on top of the raw trie.
#[derive(Debug, Default)]
pub struct CacheFacade {
    trie: DomainTrie,
}

impl CacheFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the trie from a hosts file's contents, returning the malformed
    /// lines encountered.
    pub fn load_hosts(&mut self, contents: &str) -> Vec<crate::error::HostsError> {
        crate::hosts::load_into(&mut self.trie, contents)
    }

    /// The resolve algorithm: direct hit, else chase CNAMEs up to
    /// `MAX_CHASE_DEPTH` hops, else miss. `request` supplies the question
    /// and is used to
    /// build the response's header/question section verbatim (its id is
    /// whatever the caller already validated — the ID Pool owns client-id
    /// bookkeeping, not this facade).
    pub fn resolve(&mut self, request: &Message) -> Resolution {
        let Some(question) = request.questions.first() else {
            return Resolution::Miss;
        };

        let mut chain = Vec::new();
        let mut current = question.name.clone();

        for hop in 0..=MAX_CHASE_DEPTH {
            if let Some(records) = self.trie.lookup(&current, question.qtype) {
                if records.iter().any(is_block_sentinel) {
                    tracing::debug!("{} is blocked, answering nxdomain", current);
                    return Resolution::Hit(
                        Message::response_to(request).with_response_code(ResponseCode::NXDOMAIN),
                    );
                }
                tracing::debug!("{:?} {current} found in cache", question.qtype);
                chain.extend(records);
                return Resolution::Hit(Message::response_to(request).with_answers(chain));
            }

            if hop == MAX_CHASE_DEPTH {
                break;
            }

            match self.trie.lookup(&current, QueryType::Cname) {
                Some(cname_records) => {
                    let target = cname_records.iter().find_map(|record| match record {
                            Record::Cname { host, .. } => Some(host.clone()),
                            _ => None,
                        });
                    let Some(target) = target else {
                        return Resolution::Miss;
                    };
                    tracing::debug!("{current} is a cname to {target}, chasing");
                    chain.extend(cname_records);
                    current = target;
                }
                None => return Resolution::Miss,
            }
        }

        tracing::debug!("{:?} {} not found in cache", question.qtype, question.name);
        Resolution::Miss
    }

    /// Ingest an upstream response's Answer section — Authority and
    /// Additional are out of scope. Each RR is keyed by its own owner
    /// name so a CNAME chain's intermediate hops are cached individually.
    pub fn insert(&mut self, response: &Message) {
        for record in &response.answers {
            tracing::debug!("persisting {:?} {} in cache", record.qtype(), record.domain());
            let ttl = record.ttl();
            self.trie.insert(record.domain(), record.clone(), Some(ttl));
        }
    }

    pub fn destroy(self) {
        drop(self);
    }
}

/// Build a SERVFAIL reply to `request`, used by the query pool's `Failed`
/// state — not part of the resolve algorithm, but grounded in
/// the same response shape the facade uses for hits.
pub fn servfail_response(request: &Message) -> Message {
    Message::response_to(request).with_response_code(ResponseCode::SERVFAIL)
}
