//! Metadata document rendering.
//!
//! Each directive contributes one string key. Directive kinds are applied in
//! a fixed order and a later directive overwrites an earlier one with the
//! same key; the `providerid` key is always written last.

use super::mac::mac_from_host;
use super::{pool_address, RenderContext, RenderError};
use crds::{MetaData, MetaDataIndex};
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Render the metadata document, `None` when the template has no metadata
pub fn render_meta_data(
    meta_data: Option<&MetaData>,
    ctx: &RenderContext<'_>,
) -> Result<Option<Vec<u8>>, RenderError> {
    let Some(meta_data) = meta_data else {
        return Ok(None);
    };

    let mut values: BTreeMap<String, String> = BTreeMap::new();

    for entry in &meta_data.indexes {
        values.insert(entry.key.clone(), render_index(entry, ctx.data.spec.index));
    }

    let namespace = ctx.data.namespace().unwrap_or_default();
    for entry in &meta_data.namespaces {
        values.insert(entry.key.clone(), namespace.clone());
    }

    for entry in &meta_data.object_names {
        let object = ctx.object(&entry.object)?;
        values.insert(entry.key.clone(), object.name.clone().unwrap_or_default());
    }

    for entry in &meta_data.strings {
        values.insert(entry.key.clone(), entry.value.clone());
    }

    for entry in &meta_data.from_host_interfaces {
        values.insert(entry.key.clone(), mac_from_host(&entry.interface, ctx.host)?);
    }

    for entry in &meta_data.ip_addresses_from_ip_pool {
        let pool = pool_address(ctx.pool_addresses, &entry.name)?;
        values.insert(entry.key.clone(), pool.address.clone());
    }

    for entry in &meta_data.prefixes_from_ip_pool {
        let pool = pool_address(ctx.pool_addresses, &entry.name)?;
        values.insert(entry.key.clone(), pool.prefix.to_string());
    }

    for entry in &meta_data.gateways_from_ip_pool {
        let pool = pool_address(ctx.pool_addresses, &entry.name)?;
        values.insert(entry.key.clone(), pool.gateway.clone());
    }

    for entry in &meta_data.from_labels {
        let object = ctx.object(&entry.object)?;
        let value = object
            .labels
            .as_ref()
            .and_then(|labels| labels.get(&entry.label))
            .cloned()
            .unwrap_or_default();
        values.insert(entry.key.clone(), value);
    }

    for entry in &meta_data.from_annotations {
        let object = ctx.object(&entry.object)?;
        let value = object
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(&entry.annotation))
            .cloned()
            .unwrap_or_default();
        values.insert(entry.key.clone(), value);
    }

    values.insert(
        "providerid".to_string(),
        format!(
            "{}/{}/{}",
            ctx.provider_machine.namespace().unwrap_or_default(),
            ctx.host.name_any(),
            ctx.provider_machine.name_any()
        ),
    );

    Ok(Some(serde_yaml::to_string(&values)?.into_bytes()))
}

/// `prefix + (offset + step * index) + suffix`, a zero step counting as 1
pub(crate) fn render_index(entry: &MetaDataIndex, index: i64) -> String {
    let step = if entry.step == 0 { 1 } else { entry.step };
    format!(
        "{}{}{}",
        entry.prefix,
        entry.offset.saturating_add(step.saturating_mul(index)),
        entry.suffix
    )
}
