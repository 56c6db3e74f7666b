//! Network-config document rendering.
//!
//! Produces the `links`, `networks` and `services` sections. Entries keep
//! their declared order within each kind; kinds are emitted in a fixed order.
//! Any unresolved pool reference aborts the whole document.

use super::mac::link_mac_address;
use super::mask::translate_mask;
use super::{pool_address, PoolAddresses, RenderError};
use crds::{
    BareMetalHost, NetworkData, NetworkDataDynamic, NetworkDataLink, NetworkDataNetwork,
    NetworkDataRoute, NetworkDataService, NetworkDataStatic,
};
use serde_yaml::{Number, Value};
use std::collections::BTreeMap;

type Entry = BTreeMap<&'static str, Value>;

fn mapping(entry: Entry) -> Value {
    Value::Mapping(
        entry
            .into_iter()
            .map(|(key, value)| (Value::String(key.to_string()), value))
            .collect(),
    )
}

fn string(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

fn number(value: impl Into<Number>) -> Value {
    Value::Number(value.into())
}

/// Render the network-config document, `None` when the template has no network data
pub fn render_network_data(
    network_data: Option<&NetworkData>,
    host: &BareMetalHost,
    pool_addresses: &PoolAddresses,
) -> Result<Option<Vec<u8>>, RenderError> {
    let Some(network_data) = network_data else {
        return Ok(None);
    };

    let mut document: BTreeMap<&str, Value> = BTreeMap::new();
    document.insert("links", Value::Sequence(render_links(&network_data.links, host)?));
    document.insert(
        "networks",
        Value::Sequence(render_networks(&network_data.networks, pool_addresses)?),
    );
    document.insert(
        "services",
        Value::Sequence(render_dns(&network_data.services, pool_addresses)?),
    );

    Ok(Some(serde_yaml::to_string(&document)?.into_bytes()))
}

/// Ethernet, then bond, then VLAN links
pub(crate) fn render_links(
    links: &NetworkDataLink,
    host: &BareMetalHost,
) -> Result<Vec<Value>, RenderError> {
    let mut rendered = Vec::new();

    for link in &links.ethernets {
        rendered.push(mapping(Entry::from([
            ("type", string(link.link_type.as_str())),
            ("id", string(link.id.as_str())),
            ("mtu", number(link.mtu)),
            ("ethernet_mac_address", string(link_mac_address(&link.mac_address, host)?)),
        ])));
    }

    for link in &links.bonds {
        rendered.push(mapping(Entry::from([
            ("type", string("bond")),
            ("id", string(link.id.as_str())),
            ("mtu", number(link.mtu)),
            ("ethernet_mac_address", string(link_mac_address(&link.mac_address, host)?)),
            ("bond_mode", string(link.bond_mode.as_str())),
            (
                "bond_links",
                Value::Sequence(link.bond_links.iter().map(|l| string(l.as_str())).collect()),
            ),
        ])));
    }

    for link in &links.vlans {
        rendered.push(mapping(Entry::from([
            ("type", string("vlan")),
            ("id", string(link.id.as_str())),
            ("mtu", number(link.mtu)),
            ("vlan_mac_address", string(link_mac_address(&link.mac_address, host)?)),
            ("vlan_id", number(link.vlan_id)),
            ("vlan_link", string(link.vlan_link.as_str())),
        ])));
    }

    Ok(rendered)
}

/// Static IPv4, static IPv6, DHCPv4, DHCPv6, then SLAAC networks
pub(crate) fn render_networks(
    networks: &NetworkDataNetwork,
    pool_addresses: &PoolAddresses,
) -> Result<Vec<Value>, RenderError> {
    let mut rendered = Vec::new();

    for network in &networks.ipv4 {
        rendered.push(render_static(network, "ipv4", true, pool_addresses)?);
    }
    for network in &networks.ipv6 {
        rendered.push(render_static(network, "ipv6", false, pool_addresses)?);
    }
    for network in &networks.ipv4_dhcp {
        rendered.push(render_dynamic(network, "ipv4_dhcp", true, pool_addresses)?);
    }
    for network in &networks.ipv6_dhcp {
        rendered.push(render_dynamic(network, "ipv6_dhcp", false, pool_addresses)?);
    }
    for network in &networks.ipv6_slaac {
        rendered.push(render_dynamic(network, "ipv6_slaac", false, pool_addresses)?);
    }

    Ok(rendered)
}

fn render_static(
    network: &NetworkDataStatic,
    network_type: &str,
    ipv4: bool,
    pool_addresses: &PoolAddresses,
) -> Result<Value, RenderError> {
    let (address, prefix) = match (&network.ip_address_from_ip_pool, &network.ip_address, network.prefix) {
        (Some(pool), _, _) => {
            let resolved = pool_address(pool_addresses, pool)?;
            (resolved.address.clone(), resolved.prefix)
        }
        (None, Some(address), Some(prefix)) => (address.clone(), prefix),
        _ => return Err(RenderError::MissingAddress(network.id.clone())),
    };

    Ok(mapping(Entry::from([
        ("type", string(network_type)),
        ("id", string(network.id.as_str())),
        ("link", string(network.link.as_str())),
        ("ip_address", string(address)),
        ("netmask", string(translate_mask(prefix, ipv4))),
        ("routes", Value::Sequence(render_routes(&network.routes, ipv4, pool_addresses)?)),
    ])))
}

fn render_dynamic(
    network: &NetworkDataDynamic,
    network_type: &str,
    ipv4: bool,
    pool_addresses: &PoolAddresses,
) -> Result<Value, RenderError> {
    Ok(mapping(Entry::from([
        ("type", string(network_type)),
        ("id", string(network.id.as_str())),
        ("link", string(network.link.as_str())),
        ("routes", Value::Sequence(render_routes(&network.routes, ipv4, pool_addresses)?)),
    ])))
}

pub(crate) fn render_routes(
    routes: &[NetworkDataRoute],
    ipv4: bool,
    pool_addresses: &PoolAddresses,
) -> Result<Vec<Value>, RenderError> {
    routes
        .iter()
        .map(|route| -> Result<Value, RenderError> {
            let gateway = match (&route.gateway.string, &route.gateway.from_ip_pool) {
                (Some(gateway), _) => gateway.clone(),
                (None, Some(pool)) => pool_address(pool_addresses, pool)?.gateway.clone(),
                (None, None) => String::new(),
            };
            Ok(mapping(Entry::from([
                ("network", string(route.network.as_str())),
                ("netmask", string(translate_mask(route.prefix, ipv4))),
                ("gateway", string(gateway)),
                ("services", Value::Sequence(render_dns(&route.services, pool_addresses)?)),
            ])))
        })
        .collect()
}

/// Literal DNS servers first, then the servers of `dnsFromIPPool`
pub(crate) fn render_dns(
    services: &NetworkDataService,
    pool_addresses: &PoolAddresses,
) -> Result<Vec<Value>, RenderError> {
    let mut servers: Vec<&str> = services.dns.iter().map(String::as_str).collect();
    if let Some(pool) = &services.dns_from_ip_pool {
        let resolved = pool_address(pool_addresses, pool)?;
        servers.extend(resolved.dns_servers.iter().map(String::as_str));
    }

    Ok(servers
        .into_iter()
        .map(|address| {
            mapping(Entry::from([
                ("type", string("dns")),
                ("address", string(address)),
            ]))
        })
        .collect())
}
