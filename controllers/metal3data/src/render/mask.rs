//! Prefix length to netmask conversion.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Netmask for `prefix` in dotted (IPv4) or compressed colon (IPv6) form
///
/// Prefixes longer than the address width are clamped.
pub fn translate_mask(prefix: u8, ipv4: bool) -> String {
    if ipv4 {
        let bits = u32::from(prefix.min(32));
        let mask = u32::MAX.checked_shl(32 - bits).unwrap_or(0);
        Ipv4Addr::from(mask).to_string()
    } else {
        let bits = u32::from(prefix.min(128));
        let mask = u128::MAX.checked_shl(128 - bits).unwrap_or(0);
        Ipv6Addr::from(mask).to_string()
    }
}
