//! Test utilities for unit testing the manager, resolver and renderers
//!
//! This module provides helpers for creating test objects and a fully wired
//! mock store scenario.

use crds::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use kube::Resource;
use std::collections::BTreeMap;
use store_client::MockStoreClient;

pub const NAMESPACE: &str = "metal3";
pub const DATA_NAME: &str = "worker-data-2";
pub const DATA_UID: &str = "abc-def-ghi-jkl";
pub const TEMPLATE_NAME: &str = "worker-template";
pub const CLAIM_NAME: &str = "worker-claim";
pub const M3M_NAME: &str = "worker-m3m";
pub const MACHINE_NAME: &str = "worker-machine";
pub const HOST_NAME: &str = "worker-host";

/// Object metadata with name and namespace
pub fn test_meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

/// String map from literal pairs
pub fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Owner reference to an object of type `K`
pub fn owner_ref<K: Resource<DynamicType = ()>>(name: &str, uid: &str) -> OwnerReference {
    OwnerReference {
        api_version: K::api_version(&()).to_string(),
        kind: K::kind(&()).to_string(),
        name: name.to_string(),
        uid: uid.to_string(),
        ..Default::default()
    }
}

/// Metal3Data pointing at the test template and claim
pub fn create_test_data(index: i64) -> Metal3Data {
    let mut data = Metal3Data::new(
        DATA_NAME,
        Metal3DataSpec {
            index,
            template: ObjectRef::with_namespace(TEMPLATE_NAME, NAMESPACE),
            claim: ObjectRef::with_namespace(CLAIM_NAME, NAMESPACE),
        },
    );
    data.metadata.namespace = Some(NAMESPACE.to_string());
    data.metadata.uid = Some(DATA_UID.to_string());
    data
}

/// Metal3DataTemplate with the given directive sections
pub fn create_test_template(
    meta_data: Option<MetaData>,
    network_data: Option<NetworkData>,
) -> Metal3DataTemplate {
    let mut template = Metal3DataTemplate::new(
        TEMPLATE_NAME,
        Metal3DataTemplateSpec {
            cluster_name: "cluster-a".to_string(),
            meta_data,
            network_data,
        },
    );
    template.metadata.namespace = Some(NAMESPACE.to_string());
    template
}

/// Metal3DataClaim, owned by the test Metal3Machine when `owned`
pub fn create_test_data_claim(owned: bool) -> Metal3DataClaim {
    let mut claim = Metal3DataClaim::new(
        CLAIM_NAME,
        Metal3DataClaimSpec {
            template: ObjectRef::new(TEMPLATE_NAME),
        },
    );
    claim.metadata.namespace = Some(NAMESPACE.to_string());
    if owned {
        claim.metadata.owner_references = Some(vec![owner_ref::<Metal3Machine>(M3M_NAME, "m3m-uid")]);
    }
    claim
}

/// Metal3Machine owned by the test Machine and annotated with the test host
pub fn create_test_metal3_machine(data_template: Option<ObjectRef>) -> Metal3Machine {
    let mut m3m = Metal3Machine::new(
        M3M_NAME,
        Metal3MachineSpec {
            data_template,
            provider_id: None,
        },
    );
    m3m.metadata.namespace = Some(NAMESPACE.to_string());
    m3m.metadata.owner_references = Some(vec![owner_ref::<Machine>(MACHINE_NAME, "machine-uid")]);
    m3m.metadata.annotations = Some(string_map(&[(
        HOST_ANNOTATION,
        format!("{}/{}", NAMESPACE, HOST_NAME).as_str(),
    )]));
    m3m
}

pub fn create_test_machine() -> Machine {
    let mut machine = Machine::new(
        MACHINE_NAME,
        MachineSpec {
            cluster_name: "cluster-a".to_string(),
        },
    );
    machine.metadata.namespace = Some(NAMESPACE.to_string());
    machine
}

/// BareMetalHost with the given NIC inventory
pub fn create_test_host(nics: Vec<(&str, &str)>) -> BareMetalHost {
    let mut host = BareMetalHost::new(HOST_NAME, BareMetalHostSpec { online: true });
    host.metadata.namespace = Some(NAMESPACE.to_string());
    host.status = Some(BareMetalHostStatus {
        hardware: Some(HardwareDetails {
            nics: Some(
                nics.into_iter()
                    .map(|(name, mac)| Nic {
                        name: name.to_string(),
                        mac: mac.to_string(),
                    })
                    .collect(),
            ),
        }),
    });
    host
}

/// IPAddress allocation record
pub fn create_test_ip_address(
    name: &str,
    address: &str,
    prefix: u8,
    gateway: Option<&str>,
    dns_servers: &[&str],
) -> IPAddress {
    let mut ip = IPAddress::new(
        name,
        IPAddressSpec {
            claim: ObjectRef::default(),
            pool: ObjectRef::default(),
            address: address.to_string(),
            prefix,
            gateway: gateway.map(str::to_string),
            dns_servers: dns_servers.iter().map(|s| s.to_string()).collect(),
        },
    );
    ip.metadata.namespace = Some(NAMESPACE.to_string());
    ip
}

/// IPClaim as the allocator leaves it once `address_name` is allocated
pub fn create_allocated_ip_claim(pool: &str, address_name: Option<&str>) -> IPClaim {
    let mut claim = IPClaim::new(
        &format!("{}-{}", DATA_NAME, pool),
        IPClaimSpec {
            pool: ObjectRef::with_namespace(pool, NAMESPACE),
        },
    );
    claim.metadata.namespace = Some(NAMESPACE.to_string());
    claim.metadata.finalizers = Some(vec![DATA_FINALIZER.to_string()]);
    claim.metadata.owner_references = Some(vec![owner_ref::<Metal3Data>(DATA_NAME, DATA_UID)]);
    claim.status = Some(IPClaimStatus {
        address: address_name.map(ObjectRef::new),
        error_message: None,
    });
    claim
}

/// Simple network data: one literal-MAC ethernet link and one pool-backed IPv4 network
pub fn simple_network_data(pool: &str) -> NetworkData {
    NetworkData {
        links: NetworkDataLink {
            ethernets: vec![NetworkDataLinkEthernet {
                link_type: "phy".to_string(),
                id: "eth0".to_string(),
                mtu: 1500,
                mac_address: NetworkLinkEthernetMac {
                    string: Some("XX:XX:XX:XX:XX:XX".to_string()),
                    from_host_interface: None,
                },
            }],
            ..Default::default()
        },
        networks: NetworkDataNetwork {
            ipv4: vec![NetworkDataStatic {
                id: "provisioning".to_string(),
                link: "eth0".to_string(),
                ip_address_from_ip_pool: Some(pool.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        },
        services: NetworkDataService::default(),
    }
}

/// Simple metadata: one literal string
pub fn simple_meta_data() -> MetaData {
    MetaData {
        strings: vec![MetaDataString {
            key: "String-1".to_string(),
            value: "String-1".to_string(),
        }],
        ..Default::default()
    }
}

/// Mock store holding the template, claim, Metal3Machine, Machine and host
/// for the test Metal3Data
pub fn create_test_store(template: Metal3DataTemplate) -> MockStoreClient {
    let store = MockStoreClient::new();
    store.add_data_template(template);
    store.add_data_claim(create_test_data_claim(true));
    store.add_metal3_machine(create_test_metal3_machine(Some(ObjectRef::with_namespace(
        TEMPLATE_NAME,
        NAMESPACE,
    ))));
    store.add_machine(create_test_machine());
    store.add_host(create_test_host(vec![("eth0", "XX:XX:XX:XX:XX:XX")]));
    store
}

/// Deletion timestamp for objects that are being torn down
pub fn deletion_time() -> Time {
    serde_json::from_value(serde_json::json!("2024-01-01T00:00:00Z")).unwrap()
}

/// Content of one key of a stored secret
pub fn secret_content(store: &MockStoreClient, name: &str, key: &str) -> Option<String> {
    let secret = store.secret(NAMESPACE, name)?;
    let bytes = secret.data?.remove(key)?;
    String::from_utf8(bytes.0).ok()
}
