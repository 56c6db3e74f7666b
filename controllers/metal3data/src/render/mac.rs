//! MAC address resolution against the host NIC inventory.

use super::RenderError;
use crds::{BareMetalHost, NetworkLinkEthernetMac};
use kube::ResourceExt;

/// MAC of the named interface in the host's hardware inventory
///
/// Entries with an empty name never match. A matching entry with an empty
/// MAC yields an empty string.
pub fn mac_from_host(interface: &str, host: &BareMetalHost) -> Result<String, RenderError> {
    let nics = host
        .nics()
        .ok_or_else(|| RenderError::NoHardwareDetails(host.name_any()))?;
    nics.iter()
        .filter(|nic| !nic.name.is_empty())
        .find(|nic| nic.name == interface)
        .map(|nic| nic.mac.clone())
        .ok_or_else(|| RenderError::InterfaceNotFound {
            interface: interface.to_string(),
            host: host.name_any(),
        })
}

/// MAC of a link: the literal when set, else the named host interface
pub fn link_mac_address(
    source: &NetworkLinkEthernetMac,
    host: &BareMetalHost,
) -> Result<String, RenderError> {
    match (&source.string, &source.from_host_interface) {
        (Some(mac), _) => Ok(mac.clone()),
        (None, Some(interface)) => mac_from_host(interface, host),
        (None, None) => Ok(String::new()),
    }
}
