use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

fn default_upstream() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 3, 9, 4))
}

/// Recursive-style DNS relay: answers from a local cache seeded from a
/// hosts file, forwards misses to one upstream resolver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// IPv4 address of the upstream resolver.
    #[arg(long, env = "DNSRELAY_UPSTREAM", default_value_t = default_upstream())]
    pub upstream: IpAddr,

    /// Path to the hosts file used to seed the cache and sink-hole blocked
    /// names.
    #[arg(long, env = "DNSRELAY_HOSTS")]
    pub hosts: PathBuf,

    /// Log output path; stderr if absent.
    #[arg(long, env = "DNSRELAY_LOG")]
    pub log: Option<PathBuf>,

    /// Bitmask selecting which log channels are live:
    /// 1=debug, 2=info, 4=error, 8=fatal.
    #[arg(long, env = "DNSRELAY_LOG_MASK", default_value_t = 0b1110)]
    pub log_mask: u8,

    /// Address the client-facing server endpoint binds to.
    #[arg(long, env = "DNSRELAY_SERVER_ADDR", default_value = "0.0.0.0:53")]
    pub server_addr: SocketAddr,

    /// Per-in-flight-query upstream timeout, in seconds.
    #[arg(long, env = "DNSRELAY_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// Retries attempted before giving up and replying SERVFAIL.
    #[arg(long, env = "DNSRELAY_RETRIES", default_value_t = 2)]
    pub retries: u8,
}

impl Args {
    pub fn upstream_addr(&self) -> SocketAddr {
        SocketAddr::from((self.upstream, 53))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_required_hosts_flag() {
        let args = Args::parse_from(["dnsrelay", "--hosts", "/etc/dnsrelay/hosts"]);
        assert_eq!(args.hosts, PathBuf::from("/etc/dnsrelay/hosts"));
        assert_eq!(args.upstream, default_upstream());
        assert_eq!(args.server_addr, "0.0.0.0:53".parse::<SocketAddr>().unwrap());
        assert_eq!(args.timeout_secs, 5);
        assert_eq!(args.retries, 2);
    }

    #[test]
    fn overrides_the_upstream_address() {
        let args = Args::parse_from([
                "dnsrelay",
                "--hosts",
                "/etc/hosts",
                "--upstream",
                "1.1.1.1",
            ]);
        assert_eq!(args.upstream_addr(), "1.1.1.1:53".parse().unwrap());
    }
}
