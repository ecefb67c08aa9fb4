use crate::error::{HostsError, HostsErrorKind};
use crate::trie::DomainTrie;
use dnsrelay_proto::Record;
use std::net::IpAddr;

/// A hosts-file-seeded entry never expires — it is inserted with an
/// infinite deadline and, when served as a real answer rather than a
/// blocked sink-hole, carries this ttl on the wire. Whether an entry is a
/// block sentinel (`0.0.0.0` / `::`) is decided at resolve time, not here —
/// see `facade::is_block_sentinel`.
const INFINITE_TTL: u32 = u32::MAX;

/// Parse `<ip> <name>` hosts-file text into the trie. Blank lines and `#`-comments are ignored; a malformed line is
/// skipped and reported rather than aborting the load.
pub fn load_into(trie: &mut DomainTrie, contents: &str) -> Vec<HostsError> {
    let mut errors = Vec::new();

    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.split_whitespace();
        let Some(ip_col) = columns.next() else {
            continue;
        };
        let Some(name) = columns.next() else {
            errors.push(HostsError {
                    line_no: idx + 1,
                    line: raw_line.to_string(),
                    reason: HostsErrorKind::MissingName,
                });
            continue;
        };

        let Ok(ip) = ip_col.parse::<IpAddr>() else {
            errors.push(HostsError {
                    line_no: idx + 1,
                    line: raw_line.to_string(),
                    reason: HostsErrorKind::BadAddress,
                });
            continue;
        };

        let name = name.trim_end_matches('.').to_ascii_lowercase();
        let record = match ip {
            IpAddr::V4(addr) => Record::A {
                domain: name.clone(),
                addr,
                ttl: INFINITE_TTL,
            },
            IpAddr::V6(addr) => Record::Aaaa {
                domain: name.clone(),
                addr,
                ttl: INFINITE_TTL,
            },
        };

        trie.insert(&name, record, None);
    }

    errors
}
