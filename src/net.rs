use get_if_addrs::{get_if_addrs, IfAddr};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

pub const FALLBACK_HOST: &str = "0.0.0.0";

fn is_valid_lan_ipv4(addr: Ipv4Addr) -> bool {
    !addr.is_loopback() && !addr.is_link_local() && !addr.is_unspecified()
}

fn interface_priority(name: &str) -> usize {
    match name {
        "eth0" | "en0" => 0,
        "wlan0" | "en1" => 1,
        _ if name.starts_with("eth") || name.starts_with("en") => 10,
        _ if name.starts_with("wl") => 15,
        _ => 30,
    }
}

fn rank_candidates<I>(addrs: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, Ipv4Addr)>,
{
    let mut buckets: Vec<(usize, String)> = Vec::new();
    let mut seen = BTreeSet::new();
    for (name, ip) in addrs {
        if !is_valid_lan_ipv4(ip) {
            continue;
        }
        let ip = ip.to_string();
        if !seen.insert(ip.clone()) {
            continue;
        }
        buckets.push((interface_priority(&name), ip));
    }
    buckets.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    buckets.into_iter().map(|(_, ip)| ip).collect()
}

pub fn lan_ipv4_candidates() -> Vec<String> {
    let Ok(addrs) = get_if_addrs() else {
        return Vec::new();
    };
    rank_candidates(addrs.into_iter().filter_map(|iface| match iface.addr {
        IfAddr::V4(v4) => Some((iface.name, v4.ip)),
        IfAddr::V6(_) => None,
    }))
}

/// Address the HTTP listener binds to when no host is configured.
pub fn default_listen_host() -> String {
    lan_ipv4_candidates()
        .into_iter()
        .next()
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}
