//! Unit tests for network-config rendering

#[cfg(test)]
mod tests {
    use crate::render::network::{render_dns, render_links, render_networks, render_routes};
    use crate::render::{render_network_data, AddressFromPool, PoolAddresses, RenderError};
    use crate::test_utils::*;
    use crds::*;
    use pretty_assertions::assert_eq;

    fn pools(entries: &[(&str, &str, u8, &str, &[&str])]) -> PoolAddresses {
        entries
            .iter()
            .map(|(name, address, prefix, gateway, dns)| {
                (
                    name.to_string(),
                    AddressFromPool {
                        address: address.to_string(),
                        prefix: *prefix,
                        gateway: gateway.to_string(),
                        dns_servers: dns.iter().map(|s| s.to_string()).collect(),
                    },
                )
            })
            .collect()
    }

    fn yaml(values: &[serde_yaml::Value]) -> String {
        serde_yaml::to_string(values).unwrap()
    }

    fn literal_mac(mac: &str) -> NetworkLinkEthernetMac {
        NetworkLinkEthernetMac {
            string: Some(mac.to_string()),
            from_host_interface: None,
        }
    }

    fn route(network: &str, prefix: u8, gateway: NetworkGateway, services: NetworkDataService) -> NetworkDataRoute {
        NetworkDataRoute {
            network: network.to_string(),
            prefix,
            gateway,
            services,
        }
    }

    fn full_example() -> NetworkData {
        NetworkData {
            links: NetworkDataLink {
                ethernets: vec![NetworkDataLinkEthernet {
                    link_type: "phy".to_string(),
                    id: "eth0".to_string(),
                    mtu: 1500,
                    mac_address: literal_mac("XX:XX:XX:XX:XX:XX"),
                }],
                ..Default::default()
            },
            networks: NetworkDataNetwork {
                ipv4: vec![NetworkDataStatic {
                    id: "abc".to_string(),
                    link: "def".to_string(),
                    ip_address_from_ip_pool: Some("abc".to_string()),
                    routes: vec![route(
                        "10.0.0.0",
                        16,
                        NetworkGateway {
                            string: Some("192.168.1.1".to_string()),
                            from_ip_pool: None,
                        },
                        NetworkDataService {
                            dns: vec!["8.8.8.8".to_string()],
                            dns_from_ip_pool: None,
                        },
                    )],
                    ..Default::default()
                }],
                ..Default::default()
            },
            services: NetworkDataService {
                dns: vec!["8.8.8.8".to_string(), "2001::8888".to_string()],
                dns_from_ip_pool: None,
            },
        }
    }

    #[test]
    fn test_full_example() {
        let host = create_test_host(vec![]);
        let pool_addresses = pools(&[("abc", "192.168.0.14", 24, "", &[])]);

        let rendered = render_network_data(Some(&full_example()), &host, &pool_addresses)
            .unwrap()
            .unwrap();
        let expected = "\
links:
- ethernet_mac_address: XX:XX:XX:XX:XX:XX
  id: eth0
  mtu: 1500
  type: phy
networks:
- id: abc
  ip_address: 192.168.0.14
  link: def
  netmask: 255.255.255.0
  routes:
  - gateway: 192.168.1.1
    netmask: 255.255.0.0
    network: 10.0.0.0
    services:
    - address: 8.8.8.8
      type: dns
  type: ipv4
services:
- address: 8.8.8.8
  type: dns
- address: 2001::8888
  type: dns
";
        assert_eq!(String::from_utf8(rendered).unwrap(), expected);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let host = create_test_host(vec![]);
        let pool_addresses = pools(&[("abc", "192.168.0.14", 24, "", &[])]);
        let first = render_network_data(Some(&full_example()), &host, &pool_addresses).unwrap();
        let second = render_network_data(Some(&full_example()), &host, &pool_addresses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_network_data() {
        let host = create_test_host(vec![]);
        assert!(render_network_data(None, &host, &PoolAddresses::new()).unwrap().is_none());
    }

    #[test]
    fn test_link_error_aborts_render() {
        let mut network_data = full_example();
        network_data.links.ethernets[0].mac_address = NetworkLinkEthernetMac {
            string: None,
            from_host_interface: Some("eth0".to_string()),
        };
        let host = BareMetalHost::new(HOST_NAME, Default::default());
        let pool_addresses = pools(&[("abc", "192.168.0.14", 24, "", &[])]);
        assert!(render_network_data(Some(&network_data), &host, &pool_addresses).is_err());
    }

    #[test]
    fn test_unresolved_pool_aborts_render() {
        let host = create_test_host(vec![]);
        let err = render_network_data(Some(&full_example()), &host, &PoolAddresses::new()).unwrap_err();
        assert!(matches!(err, RenderError::PoolNotFound(pool) if pool == "abc"));
    }

    #[test]
    fn test_links_all_kinds() {
        let links = NetworkDataLink {
            ethernets: vec![NetworkDataLinkEthernet {
                link_type: "phy".to_string(),
                id: "eth0".to_string(),
                mtu: 1500,
                mac_address: NetworkLinkEthernetMac {
                    string: None,
                    from_host_interface: Some("eth1".to_string()),
                },
            }],
            bonds: vec![NetworkDataLinkBond {
                bond_mode: "802.3ad".to_string(),
                id: "bond0".to_string(),
                mtu: 9000,
                mac_address: literal_mac("XX:XX:XX:XX:XX:XX"),
                bond_links: vec!["eth0".to_string()],
            }],
            vlans: vec![NetworkDataLinkVlan {
                vlan_id: 2222,
                id: "bond0.2222".to_string(),
                mtu: 1500,
                mac_address: literal_mac("XX:XX:XX:XX:XX:XX"),
                vlan_link: "bond0".to_string(),
            }],
        };
        let host = create_test_host(vec![("eth0", "XX:XX:XX:XX:XX:XX"), ("eth1", "XX:XX:XX:XX:XX:YY")]);

        let rendered = render_links(&links, &host).unwrap();
        let expected = "\
- ethernet_mac_address: XX:XX:XX:XX:XX:YY
  id: eth0
  mtu: 1500
  type: phy
- bond_links:
  - eth0
  bond_mode: 802.3ad
  ethernet_mac_address: XX:XX:XX:XX:XX:XX
  id: bond0
  mtu: 9000
  type: bond
- id: bond0.2222
  mtu: 1500
  type: vlan
  vlan_id: 2222
  vlan_link: bond0
  vlan_mac_address: XX:XX:XX:XX:XX:XX
";
        assert_eq!(yaml(&rendered), expected);
    }

    #[test]
    fn test_networks_fixed_kind_order() {
        let v6_route = || {
            route(
                "2001::",
                64,
                NetworkGateway {
                    string: Some("fe80::2001:1".to_string()),
                    from_ip_pool: None,
                },
                NetworkDataService::default(),
            )
        };
        let dynamic = |id: &str| NetworkDataDynamic {
            id: id.to_string(),
            link: "def".to_string(),
            routes: vec![],
        };
        let networks = NetworkDataNetwork {
            ipv4: vec![],
            ipv6: vec![NetworkDataStatic {
                id: "v6".to_string(),
                link: "def".to_string(),
                ip_address_from_ip_pool: Some("v6pool".to_string()),
                routes: vec![v6_route()],
                ..Default::default()
            }],
            ipv4_dhcp: vec![dynamic("dhcp4")],
            ipv6_dhcp: vec![dynamic("dhcp6")],
            ipv6_slaac: vec![NetworkDataDynamic {
                routes: vec![v6_route()],
                ..dynamic("slaac")
            }],
        };
        let pool_addresses = pools(&[("v6pool", "fe80::2001:38", 96, "", &[])]);

        let rendered = render_networks(&networks, &pool_addresses).unwrap();
        let expected = "\
- id: v6
  ip_address: fe80::2001:38
  link: def
  netmask: 'ffff:ffff:ffff:ffff:ffff:ffff::'
  routes:
  - gateway: fe80::2001:1
    netmask: 'ffff:ffff:ffff:ffff::'
    network: '2001::'
    services: []
  type: ipv6
- id: dhcp4
  link: def
  routes: []
  type: ipv4_dhcp
- id: dhcp6
  link: def
  routes: []
  type: ipv6_dhcp
- id: slaac
  link: def
  routes:
  - gateway: fe80::2001:1
    netmask: 'ffff:ffff:ffff:ffff::'
    network: '2001::'
    services: []
  type: ipv6_slaac
";
        assert_eq!(yaml(&rendered), expected);
    }

    #[test]
    fn test_static_literal_address() {
        let networks = NetworkDataNetwork {
            ipv4: vec![NetworkDataStatic {
                id: "lit".to_string(),
                link: "eth0".to_string(),
                ip_address: Some("10.1.0.5".to_string()),
                prefix: Some(16),
                ..Default::default()
            }],
            ..Default::default()
        };
        let rendered = render_networks(&networks, &PoolAddresses::new()).unwrap();
        assert_eq!(rendered[0]["ip_address"], serde_yaml::Value::from("10.1.0.5"));
        assert_eq!(rendered[0]["netmask"], serde_yaml::Value::from("255.255.0.0"));
    }

    #[test]
    fn test_static_without_address_source() {
        let networks = NetworkDataNetwork {
            ipv4: vec![NetworkDataStatic {
                id: "none".to_string(),
                link: "eth0".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(
            render_networks(&networks, &PoolAddresses::new()),
            Err(RenderError::MissingAddress(_))
        ));
    }

    #[test]
    fn test_routes_from_pool() {
        let routes = vec![route(
            "10.0.0.0",
            16,
            NetworkGateway {
                string: None,
                from_ip_pool: Some("abc".to_string()),
            },
            NetworkDataService {
                dns: vec!["8.8.8.8".to_string()],
                dns_from_ip_pool: Some("abc".to_string()),
            },
        )];
        let pool_addresses = pools(&[("abc", "192.168.0.14", 24, "192.168.1.1", &["8.8.4.4"])]);

        let rendered = render_routes(&routes, true, &pool_addresses).unwrap();
        let expected = "\
- gateway: 192.168.1.1
  netmask: 255.255.0.0
  network: 10.0.0.0
  services:
  - address: 8.8.8.8
    type: dns
  - address: 8.8.4.4
    type: dns
";
        assert_eq!(yaml(&rendered), expected);

        assert!(render_routes(&routes, true, &PoolAddresses::new()).is_err());
    }

    #[test]
    fn test_route_without_gateway() {
        let routes = vec![route("10.0.0.0", 8, NetworkGateway::default(), NetworkDataService::default())];
        let rendered = render_routes(&routes, true, &PoolAddresses::new()).unwrap();
        assert_eq!(rendered[0]["gateway"], serde_yaml::Value::from(""));
    }

    #[test]
    fn test_services_literal_then_pool() {
        let services = NetworkDataService {
            dns: vec!["8.8.8.8".to_string(), "2001::8888".to_string()],
            dns_from_ip_pool: Some("pool1".to_string()),
        };
        let pool_addresses = pools(&[("pool1", "192.168.0.14", 24, "", &["8.8.4.4"])]);

        let rendered = render_dns(&services, &pool_addresses).unwrap();
        let addresses: Vec<&str> = rendered
            .iter()
            .map(|entry| entry["address"].as_str().unwrap())
            .collect();
        assert_eq!(addresses, vec!["8.8.8.8", "2001::8888", "8.8.4.4"]);

        let missing = NetworkDataService {
            dns: vec![],
            dns_from_ip_pool: Some("pool2".to_string()),
        };
        assert!(render_dns(&missing, &pool_addresses).is_err());
    }
}
