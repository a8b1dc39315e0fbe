//! Host fingerprint generation.
//!
//! Every field degrades to a fixed sentinel when the underlying OS query
//! fails; the agent must always be able to register and tag its metrics
//! with some identity, so `generate` cannot fail.

use hostpulse_common::types::Fingerprint;
use std::net::IpAddr;
use sysinfo::{Networks, System};

const FALLBACK_HOSTNAME: &str = "unknown-host";
const FALLBACK_MAC: &str = "00:00:00:00:00:00";
const FALLBACK_IP: &str = "127.0.0.1";

/// Derives the stable per-host identity. Reads only host-level OS
/// facilities; never fails.
pub fn generate() -> Fingerprint {
    let hostname = System::host_name().unwrap_or_else(|| FALLBACK_HOSTNAME.to_string());
    let machine_uuid = read_machine_id().unwrap_or_else(|| format!("demo-uuid-{hostname}"));

    let networks = Networks::new_with_refreshed_list();
    let interfaces: Vec<(String, String)> = networks
        .iter()
        .map(|(name, data)| (name.clone(), data.mac_address().to_string()))
        .collect();
    let primary_mac = first_usable_mac(&interfaces).unwrap_or_else(|| FALLBACK_MAC.to_string());

    let addrs: Vec<IpAddr> = networks
        .iter()
        .flat_map(|(_, data)| data.ip_networks().iter().map(|net| net.addr))
        .collect();
    let primary_ip = first_non_loopback_ipv4(&addrs).unwrap_or_else(|| FALLBACK_IP.to_string());

    Fingerprint {
        hostname,
        machine_uuid,
        primary_mac,
        primary_ip,
        os: std::env::consts::OS.to_string(),
        os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
        architecture: std::env::consts::ARCH.to_string(),
    }
}

/// Platform machine id, where one exists.
fn read_machine_id() -> Option<String> {
    for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
        if let Ok(content) = std::fs::read_to_string(path) {
            let id = content.trim();
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

fn is_loopback_name(name: &str) -> bool {
    name == "lo" || name.to_lowercase().contains("loop")
}

/// First non-loopback interface with a usable hardware address, in
/// enumeration order.
fn first_usable_mac(interfaces: &[(String, String)]) -> Option<String> {
    interfaces
        .iter()
        .find(|(name, mac)| {
            !is_loopback_name(name) && !mac.is_empty() && mac.as_str() != FALLBACK_MAC
        })
        .map(|(_, mac)| mac.clone())
}

/// First non-loopback IPv4 address, in enumeration order.
fn first_non_loopback_ipv4(addrs: &[IpAddr]) -> Option<String> {
    addrs
        .iter()
        .find(|addr| addr.is_ipv4() && !addr.is_loopback())
        .map(|addr| addr.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_never_panics_and_fills_every_field() {
        let fp = generate();
        assert!(!fp.hostname.is_empty());
        assert!(!fp.machine_uuid.is_empty());
        assert!(!fp.primary_mac.is_empty());
        assert!(!fp.primary_ip.is_empty());
        assert!(!fp.os.is_empty());
        assert!(!fp.architecture.is_empty());
        assert!(fp.composite().split(':').count() >= 4);
    }

    #[test]
    fn loopback_and_empty_macs_are_skipped() {
        let interfaces = vec![
            ("lo".to_string(), "aa:bb:cc:dd:ee:ff".to_string()),
            ("eth0".to_string(), String::new()),
            ("eth1".to_string(), "00:00:00:00:00:00".to_string()),
            ("eth2".to_string(), "de:ad:be:ef:00:01".to_string()),
        ];
        assert_eq!(
            first_usable_mac(&interfaces),
            Some("de:ad:be:ef:00:01".to_string())
        );
    }

    #[test]
    fn no_usable_interface_yields_none_for_sentinel() {
        let interfaces = vec![("lo".to_string(), "aa:bb:cc:dd:ee:ff".to_string())];
        assert_eq!(first_usable_mac(&interfaces), None);
    }

    #[test]
    fn first_ipv4_skips_loopback_and_ipv6() {
        let addrs = vec![
            "127.0.0.1".parse().unwrap(),
            "::1".parse().unwrap(),
            "fe80::1".parse().unwrap(),
            "10.0.0.5".parse().unwrap(),
            "10.0.0.6".parse().unwrap(),
        ];
        assert_eq!(first_non_loopback_ipv4(&addrs), Some("10.0.0.5".to_string()));
    }

    #[test]
    fn ipv6_only_host_yields_none_for_sentinel() {
        let addrs: Vec<IpAddr> = vec!["::1".parse().unwrap(), "fe80::1".parse().unwrap()];
        assert_eq!(first_non_loopback_ipv4(&addrs), None);
    }
}
