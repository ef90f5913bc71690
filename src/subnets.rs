//! Expansion of published CIDR subnets into the flat IP list format.

use {
    ipnet::IpNet,
    std::{
        collections::BTreeSet,
        fmt::Write,
        net::{IpAddr, Ipv4Addr, Ipv6Addr},
    },
    tracing::warn,
};

pub const DEFAULT_MAX_SUBNET_HOSTS: u128 = 1 << 20;

#[derive(Debug, Default)]
pub struct Expansion {
    pub ipv4: BTreeSet<Ipv4Addr>,
    pub ipv6: BTreeSet<Ipv6Addr>,
    pub subnets: usize,
    pub invalid: usize,
    pub oversized: usize,
}

impl Expansion {
    pub fn total(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    /// One address per line, IPv4 first, both sorted numerically.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.total() * 16);
        for ip in &self.ipv4 {
            let _ = writeln!(out, "{ip}");
        }
        for ip in &self.ipv6 {
            let _ = writeln!(out, "{ip}");
        }
        out
    }
}

fn host_count(net: &IpNet) -> u128 {
    let free_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    1u128.checked_shl(free_bits).unwrap_or(u128::MAX)
}

/// Parse every non-blank line as a network (host bits allowed) and collect its
/// host addresses. Subnets with more than `max_hosts` addresses are skipped.
pub fn expand_subnets<I, S>(lines: I, max_hosts: u128) -> Expansion
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut expansion = Expansion::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        // A bare address is a single-host network.
        let net = match line
            .parse::<IpNet>()
            .or_else(|_| line.parse::<IpAddr>().map(IpNet::from))
        {
            Ok(net) => net,
            Err(_) => {
                expansion.invalid += 1;
                continue;
            }
        };
        expansion.subnets += 1;

        if host_count(&net) > max_hosts {
            warn!(subnet = %net, max_hosts = %max_hosts, "Subnet too large, skipping");
            expansion.oversized += 1;
            continue;
        }

        match net {
            IpNet::V4(net) => expansion.ipv4.extend(net.hosts()),
            // The Subnet-Router anycast address is not a host below /127.
            IpNet::V6(net) => {
                let network = net.network();
                let keep_network = net.prefix_len() >= 127;
                expansion
                    .ipv6
                    .extend(net.hosts().filter(|ip| keep_network || *ip != network));
            }
        }
    }

    expansion
}
