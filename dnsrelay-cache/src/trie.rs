use dnsrelay_proto::{QueryType, Record};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cached RR plus the instant it stops being valid. `None` means the
/// infinite TTL used for hosts-file "blocked" entries.
#[derive(Debug, Clone)]
struct Entry {
    record: Record,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if deadline <= now)
    }

    /// The record as it should be handed back to a caller: ttl replaced by
    /// the remaining time-to-live rather than the value it was inserted
    /// with.
    fn live_record(&self, now: Instant) -> Record {
        match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_secs();
                self.record.with_ttl(remaining.min(u32::MAX as u64) as u32)
            }
            None => self.record.clone(),
        }
    }
}

/// A node owns, per query type, the set of RRs for the name it represents.
/// Labels descend right-to-left (TLD first) so siblings share prefixes
/// with the zone hierarchy.
#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    entries: HashMap<QueryType, Vec<Entry>>,
}

/// Name-indexed RR store. Mutated only from the
/// single event-loop thread — no internal locking.
#[derive(Debug, Default)]
pub struct DomainTrie {
    root: Node,
}

fn reversed_labels(name: &str) -> Vec<&str> {
    if name.is_empty() {
        return Vec::new();
    }
    let mut labels: Vec<&str> = name.split('.').collect();
    labels.reverse();
    labels
}

impl DomainTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` for `name` at `record.qtype()`, deduplicated on
    /// `(type, rdata)` per the cache-entry invariant. `ttl = None` marks
    /// an infinite-TTL blocked entry; `Some(ttl)` is the insert-time TTL in
    /// seconds.
    pub fn insert(&mut self, name: &str, record: Record, ttl: Option<u32>) {
        let deadline = ttl.map(|secs| Instant::now() + Duration::from_secs(secs as u64));
        let node = self.node_mut(name);
        let bucket = node.entries.entry(record.qtype()).or_default();

        if let Some(existing) = bucket.iter_mut().find(|e| e.record.same_data_as(&record)) {
            existing.record = record;
            existing.deadline = deadline;
        } else {
            bucket.push(Entry { record, deadline });
        }
    }

    /// Look up `name` at `qtype`, dropping any RR whose deadline has
    /// passed before returning. An empty result after eviction is reported
    /// as a miss; the node itself is left in place.
    pub fn lookup(&mut self, name: &str, qtype: QueryType) -> Option<Vec<Record>> {
        let now = Instant::now();
        let node = self.find_node_mut(name)?;
        let bucket = node.entries.get_mut(&qtype)?;
        bucket.retain(|entry| !entry.is_expired(now));

        if bucket.is_empty() {
            node.entries.remove(&qtype);
            None
        } else {
            Some(bucket.iter().map(|entry| entry.live_record(now)).collect())
        }
    }

    /// Drop expired RRs for `name` without returning anything; used by
    /// periodic housekeeping independent of a client lookup.
    pub fn remove_expired(&mut self, name: &str) {
        let now = Instant::now();
        if let Some(node) = self.find_node_mut(name) {
            node.entries
            .retain(|_, bucket| {
                    bucket.retain(|entry| !entry.is_expired(now));
                    !bucket.is_empty()
                });
        }
    }

    pub fn destroy(self) {
        drop(self);
    }

    fn node_mut(&mut self, name: &str) -> &mut Node {
        let mut node = &mut self.root;
        for label in reversed_labels(name) {
            node = node
            .children
            .entry(label.to_ascii_lowercase())
            .or_default();
        }
        node
    }

    fn find_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for label in reversed_labels(name) {
            node = node.children.get_mut(&label.to_ascii_lowercase())?;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread::sleep;

    fn a_record(domain: &str, octet: u8, ttl: u32) -> Record {
        Record::A {
            domain: domain.into(),
            addr: Ipv4Addr::new(octet, octet, octet, octet),
            ttl,
        }
    }

    #[test]
    fn misses_on_empty_trie() {
        let mut trie = DomainTrie::new();
        assert!(trie.lookup("example.com", QueryType::A).is_none());
    }

    #[test]
    fn round_trips_an_insert() {
        let mut trie = DomainTrie::new();
        trie.insert("example.com", a_record("example.com", 1, 300), Some(300));

        let found = trie.lookup("example.com", QueryType::A).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ttl(), 300);
    }

    #[test]
    fn deduplicates_on_type_and_rdata() {
        let mut trie = DomainTrie::new();
        trie.insert("example.com", a_record("example.com", 1, 300), Some(300));
        trie.insert("example.com", a_record("example.com", 1, 60), Some(60));

        let found = trie.lookup("example.com", QueryType::A).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ttl(), 60);
    }

    #[test]
    fn keeps_distinct_rdata_as_separate_entries() {
        let mut trie = DomainTrie::new();
        trie.insert("example.com", a_record("example.com", 1, 300), Some(300));
        trie.insert("example.com", a_record("example.com", 2, 300), Some(300));

        let found = trie.lookup("example.com", QueryType::A).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn blocked_entries_never_expire() {
        let mut trie = DomainTrie::new();
        trie.insert("ads.example", a_record("ads.example", 0, 0), None);
        sleep(Duration::from_millis(5));
        assert!(trie.lookup("ads.example", QueryType::A).is_some());
    }

    #[test]
    fn expires_lazily_on_read() {
        let mut trie = DomainTrie::new();
        trie.insert("example.com", a_record("example.com", 1, 0), Some(0));
        sleep(Duration::from_millis(5));
        assert!(trie.lookup("example.com", QueryType::A).is_none());
    }

    #[test]
    fn distinct_names_do_not_share_nodes() {
        let mut trie = DomainTrie::new();
        trie.insert("www.example.com", a_record("www.example.com", 1, 300), Some(300));
        assert!(trie.lookup("example.com", QueryType::A).is_none());
        assert!(trie.lookup("www.example.com", QueryType::A).is_some());
    }
}
