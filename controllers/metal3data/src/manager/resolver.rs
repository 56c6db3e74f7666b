//! Address claim resolution.
//!
//! Every pool a template references gets exactly one IPClaim named
//! `<data>-<pool>`, owned by the Metal3Data and carrying its finalizer. The
//! external allocator fills the claim status with an IPAddress reference or an
//! error message; this module only consumes that protocol.

use super::DataManager;
use crate::error::ControllerError;
use crate::finalizers::remove_finalizer;
use crate::render::{AddressFromPool, PoolAddresses};
use crds::{
    IPClaim, IPClaimSpec, Metal3Data, Metal3DataTemplateSpec, NetworkDataRoute, NetworkDataService,
    ObjectRef, DATA_FINALIZER,
};
use kube::{Resource, ResourceExt};
use std::collections::BTreeSet;
use store_client::{OptionalExt, StoreError};
use tracing::{debug, info};

/// Result of inspecting one pool's claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Resolved(AddressFromPool),
    /// Allocation not finished; retry later
    Pending,
}

/// IPClaim name for `pool` requested by the Metal3Data `data_name`
pub fn claim_name(data_name: &str, pool: &str) -> String {
    format!("{}-{}", data_name, pool)
}

fn route_pools<'t>(routes: &'t [NetworkDataRoute], pools: &mut BTreeSet<&'t str>) {
    for route in routes {
        pools.extend(route.gateway.from_ip_pool.as_deref());
        service_pools(&route.services, pools);
    }
}

fn service_pools<'t>(services: &'t NetworkDataService, pools: &mut BTreeSet<&'t str>) {
    pools.extend(services.dns_from_ip_pool.as_deref());
}

/// Distinct pool names referenced anywhere in the template
pub fn referenced_pools(spec: &Metal3DataTemplateSpec) -> BTreeSet<String> {
    let mut pools = BTreeSet::new();

    if let Some(meta_data) = &spec.meta_data {
        let from_pool = meta_data
            .ip_addresses_from_ip_pool
            .iter()
            .chain(&meta_data.prefixes_from_ip_pool)
            .chain(&meta_data.gateways_from_ip_pool);
        pools.extend(from_pool.map(|entry| entry.name.as_str()));
    }

    if let Some(network_data) = &spec.network_data {
        let networks = &network_data.networks;
        for network in networks.ipv4.iter().chain(&networks.ipv6) {
            pools.extend(network.ip_address_from_ip_pool.as_deref());
            route_pools(&network.routes, &mut pools);
        }
        for network in networks
            .ipv4_dhcp
            .iter()
            .chain(&networks.ipv6_dhcp)
            .chain(&networks.ipv6_slaac)
        {
            route_pools(&network.routes, &mut pools);
        }
        service_pools(&network_data.services, &mut pools);
    }

    pools
        .into_iter()
        .filter(|pool| !pool.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `claim` is owned by this exact Metal3Data object
fn owned_by(claim: &IPClaim, data: &Metal3Data) -> bool {
    claim.owner_references().iter().any(|owner| {
        owner.kind == Metal3Data::kind(&())
            && owner.name == data.name_any()
            && data.uid().is_none_or(|uid| owner.uid == uid)
    })
}

impl DataManager<'_> {
    /// Resolve every referenced pool, or requeue if any of them is pending.
    ///
    /// Hard failures on one pool are returned immediately.
    pub async fn get_addresses_from_pool(
        &mut self,
        spec: &Metal3DataTemplateSpec,
    ) -> Result<PoolAddresses, ControllerError> {
        let mut resolved = PoolAddresses::new();
        let mut pending = Vec::new();

        for pool in referenced_pools(spec) {
            match self.address_from_pool(&pool).await? {
                ClaimOutcome::Resolved(address) => {
                    resolved.insert(pool, address);
                }
                ClaimOutcome::Pending => pending.push(pool),
            }
        }

        if !pending.is_empty() {
            return Err(ControllerError::requeue(
                self.requeue_after,
                format!("waiting for IP address from pools {}", pending.join(", ")),
            ));
        }
        Ok(resolved)
    }

    /// Fetch or create the claim for `pool` and inspect it
    pub async fn address_from_pool(&mut self, pool: &str) -> Result<ClaimOutcome, ControllerError> {
        let namespace = self.namespace();
        let name = claim_name(&self.data.name_any(), pool);

        let claim = match self.client.get_ip_claim(&namespace, &name).await.optional()? {
            Some(claim) => claim,
            None => match self.client.create_ip_claim(&self.new_ip_claim(pool, &name)).await {
                Ok(claim) => {
                    info!("Created IPClaim {}/{} for pool {}", namespace, name, pool);
                    claim
                }
                Err(StoreError::AlreadyExists(_)) => {
                    debug!("IPClaim {}/{} created concurrently", namespace, name);
                    return Ok(ClaimOutcome::Pending);
                }
                Err(e) => return Err(e.into()),
            },
        };

        self.address_from_claim(pool, &claim).await
    }

    /// Translate a claim's status into an address, a pending signal or a hard error
    pub async fn address_from_claim(
        &mut self,
        pool: &str,
        claim: &IPClaim,
    ) -> Result<ClaimOutcome, ControllerError> {
        let claim_key = format!(
            "{}/{}",
            claim.namespace().unwrap_or_default(),
            claim.name_any()
        );

        if claim.metadata.deletion_timestamp.is_some() && !owned_by(claim, self.data) {
            debug!("IPClaim {} is being deleted by another owner", claim_key);
            return Ok(ClaimOutcome::Pending);
        }

        let status = claim.status.clone().unwrap_or_default();
        if let Some(message) = status.error_message.filter(|m| !m.is_empty()) {
            let err = ControllerError::AllocationFailed(format!("pool {}: {}", pool, message));
            self.set_error(err.to_string());
            return Err(err);
        }

        let Some(address_ref) = status.address.filter(|a| !a.is_empty()) else {
            debug!("IPClaim {} has no address yet", claim_key);
            return Ok(ClaimOutcome::Pending);
        };

        let namespace = claim.namespace().unwrap_or_default();
        let address_namespace = address_ref.namespace_or(&namespace);
        let Some(address) = self
            .client
            .get_ip_address(address_namespace, &address_ref.name)
            .await
            .optional()?
        else {
            debug!(
                "IPAddress {}/{} for IPClaim {} not visible yet",
                address_namespace, address_ref.name, claim_key
            );
            return Ok(ClaimOutcome::Pending);
        };

        Ok(ClaimOutcome::Resolved(AddressFromPool {
            address: address.spec.address,
            prefix: address.spec.prefix,
            gateway: address.spec.gateway.unwrap_or_default(),
            dns_servers: address.spec.dns_servers,
        }))
    }

    /// Drop the finalizer from the claim for `pool`, then delete it.
    ///
    /// The finalizer removal is kept even when the delete fails, so a claim
    /// that cannot be deleted never blocks the Metal3Data teardown.
    pub async fn release_address_from_pool(&self, pool: &str) -> Result<(), ControllerError> {
        let namespace = self.namespace();
        let name = claim_name(&self.data.name_any(), pool);

        let Some(mut claim) = self.client.get_ip_claim(&namespace, &name).await.optional()? else {
            return Ok(());
        };

        if remove_finalizer(&mut claim.metadata, DATA_FINALIZER) {
            match self.client.update_ip_claim(&claim).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        match self.client.delete_ip_claim(&namespace, &name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        info!("Released IPClaim {}/{} for pool {}", namespace, name, pool);
        Ok(())
    }

    fn new_ip_claim(&self, pool: &str, name: &str) -> IPClaim {
        let namespace = self.namespace();
        let mut claim = IPClaim::new(
            name,
            IPClaimSpec {
                pool: ObjectRef::with_namespace(pool, namespace.as_str()),
            },
        );
        claim.metadata.namespace = Some(namespace);
        claim.metadata.finalizers = Some(vec![DATA_FINALIZER.to_string()]);
        claim.metadata.owner_references = self.data.controller_owner_ref(&()).map(|owner| vec![owner]);
        claim
    }
}
