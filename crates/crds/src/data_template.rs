//! Metal3DataTemplate CRD
//!
//! Blueprint describing how to derive per-machine metadata and network
//! configuration. `metaData` is a flat list of directives producing one
//! string key each; `networkData` is the links/networks/services tree.

use crate::selector::ObjectSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Metal3DataTemplate",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct Metal3DataTemplateSpec {
    /// Name of the cluster the template belongs to
    #[serde(default)]
    pub cluster_name: String,

    /// Metadata directives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,

    /// Network configuration tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_data: Option<NetworkData>,
}

/// Metadata directives, grouped by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// Literal strings
    #[serde(default)]
    pub strings: Vec<MetaDataString>,

    /// Names of related objects
    #[serde(default)]
    pub object_names: Vec<MetaDataObjectName>,

    /// Namespace of the Metal3Data
    #[serde(default)]
    pub namespaces: Vec<MetaDataNamespace>,

    /// Counters derived from the Metal3Data index
    #[serde(default)]
    pub indexes: Vec<MetaDataIndex>,

    /// Addresses allocated from an IP pool
    #[serde(default, rename = "ipAddressesFromIPPool")]
    pub ip_addresses_from_ip_pool: Vec<FromPool>,

    /// Prefix lengths allocated from an IP pool
    #[serde(default, rename = "prefixesFromIPPool")]
    pub prefixes_from_ip_pool: Vec<FromPool>,

    /// Gateways allocated from an IP pool
    #[serde(default, rename = "gatewaysFromIPPool")]
    pub gateways_from_ip_pool: Vec<FromPool>,

    /// MAC addresses of host interfaces
    #[serde(default, rename = "fromHostInterfaces")]
    pub from_host_interfaces: Vec<MetaDataHostInterface>,

    /// Label values of related objects
    #[serde(default)]
    pub from_labels: Vec<MetaDataFromLabel>,

    /// Annotation values of related objects
    #[serde(default)]
    pub from_annotations: Vec<MetaDataFromAnnotation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataString {
    /// Metadata key
    pub key: String,
    /// Literal value
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataObjectName {
    /// Metadata key
    pub key: String,
    /// Object whose name is rendered (machine, metal3machine or baremetalhost)
    #[schemars(with = "String")]
    pub object: ObjectSelector,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataNamespace {
    /// Metadata key
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataIndex {
    /// Metadata key
    pub key: String,
    /// Value added to the scaled index
    #[serde(default)]
    pub offset: i64,
    /// Multiplier applied to the index (0 behaves as 1)
    #[serde(default)]
    pub step: i64,
    /// Rendered before the number
    #[serde(default)]
    pub prefix: String,
    /// Rendered after the number
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FromPool {
    /// Metadata key
    pub key: String,
    /// IP pool name
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataHostInterface {
    /// Metadata key
    pub key: String,
    /// Interface name in the host hardware inventory
    pub interface: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataFromLabel {
    /// Metadata key
    pub key: String,
    /// Object carrying the label
    #[schemars(with = "String")]
    pub object: ObjectSelector,
    /// Label name
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDataFromAnnotation {
    /// Metadata key
    pub key: String,
    /// Object carrying the annotation
    #[schemars(with = "String")]
    pub object: ObjectSelector,
    /// Annotation name
    pub annotation: String,
}

/// Network configuration tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkData {
    /// Layer 2 links
    #[serde(default)]
    pub links: NetworkDataLink,
    /// Layer 3 networks
    #[serde(default)]
    pub networks: NetworkDataNetwork,
    /// Global services
    #[serde(default)]
    pub services: NetworkDataService,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataLink {
    /// Physical interfaces
    #[serde(default)]
    pub ethernets: Vec<NetworkDataLinkEthernet>,
    /// Bonded interfaces
    #[serde(default)]
    pub bonds: Vec<NetworkDataLinkBond>,
    /// VLAN interfaces
    #[serde(default)]
    pub vlans: Vec<NetworkDataLinkVlan>,
}

/// MAC address source: a literal or a host interface
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLinkEthernetMac {
    /// Literal MAC address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    /// Interface name resolved through the host hardware inventory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_host_interface: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataLinkEthernet {
    /// Link type (phy, bridge, tap, ...)
    #[serde(rename = "type")]
    pub link_type: String,
    /// Link identifier
    pub id: String,
    /// MTU
    #[serde(default = "default_mtu")]
    pub mtu: u32,
    /// MAC address source
    #[serde(default)]
    pub mac_address: NetworkLinkEthernetMac,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataLinkBond {
    /// Bonding mode (802.3ad, active-backup, ...)
    pub bond_mode: String,
    /// Link identifier
    pub id: String,
    /// MTU
    #[serde(default = "default_mtu")]
    pub mtu: u32,
    /// MAC address source
    #[serde(default)]
    pub mac_address: NetworkLinkEthernetMac,
    /// Member link identifiers
    #[serde(default)]
    pub bond_links: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataLinkVlan {
    /// VLAN id
    #[serde(rename = "vlanID")]
    pub vlan_id: u16,
    /// Link identifier
    pub id: String,
    /// MTU
    #[serde(default = "default_mtu")]
    pub mtu: u32,
    /// MAC address source
    #[serde(default)]
    pub mac_address: NetworkLinkEthernetMac,
    /// Parent link identifier
    pub vlan_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataNetwork {
    /// Static IPv4 networks
    #[serde(default)]
    pub ipv4: Vec<NetworkDataStatic>,
    /// Static IPv6 networks
    #[serde(default)]
    pub ipv6: Vec<NetworkDataStatic>,
    /// DHCPv4 networks
    #[serde(default, rename = "ipv4DHCP")]
    pub ipv4_dhcp: Vec<NetworkDataDynamic>,
    /// DHCPv6 networks
    #[serde(default, rename = "ipv6DHCP")]
    pub ipv6_dhcp: Vec<NetworkDataDynamic>,
    /// SLAAC IPv6 networks
    #[serde(default, rename = "ipv6SLAAC")]
    pub ipv6_slaac: Vec<NetworkDataDynamic>,
}

/// Statically addressed network
///
/// The address comes from `ipAddressFromIPPool` when set, otherwise from the
/// literal `ipAddress`/`prefix` pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataStatic {
    /// Network identifier
    pub id: String,
    /// Link the network is attached to
    pub link: String,
    /// IP pool providing the address and prefix
    #[serde(default, rename = "ipAddressFromIPPool", skip_serializing_if = "Option::is_none")]
    pub ip_address_from_ip_pool: Option<String>,
    /// Literal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Literal prefix length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u8>,
    /// Routes
    #[serde(default)]
    pub routes: Vec<NetworkDataRoute>,
}

/// DHCP or SLAAC network
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataDynamic {
    /// Network identifier
    pub id: String,
    /// Link the network is attached to
    pub link: String,
    /// Routes
    #[serde(default)]
    pub routes: Vec<NetworkDataRoute>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataRoute {
    /// Destination network address
    pub network: String,
    /// Destination prefix length
    pub prefix: u8,
    /// Next hop
    #[serde(default)]
    pub gateway: NetworkGateway,
    /// Services reachable through the route
    #[serde(default)]
    pub services: NetworkDataService,
}

/// Gateway source: a literal or the gateway of an IP pool allocation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGateway {
    /// Literal gateway address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    /// IP pool providing the gateway
    #[serde(default, rename = "fromIPPool", skip_serializing_if = "Option::is_none")]
    pub from_ip_pool: Option<String>,
}

/// DNS services: literal servers followed by those of an IP pool allocation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDataService {
    /// Literal DNS servers
    #[serde(default)]
    pub dns: Vec<String>,
    /// IP pool providing DNS servers
    #[serde(default, rename = "dnsFromIPPool", skip_serializing_if = "Option::is_none")]
    pub dns_from_ip_pool: Option<String>,
}

fn default_mtu() -> u32 {
    1500
}
