use crate::hmc::types::{ManagedSystem, Partition};
use crate::inventory::types::{HostVars, Inventory};
use log::warn;
use std::collections::{BTreeSet, HashMap};

pub const ALL_GROUP: &str = "all";

/// Group partitions into `all`, `state_*`, `type_*` and `system_*` groups
/// and collect per-host variables.
pub fn build_inventory(partitions: &[Partition], systems: &[ManagedSystem]) -> Inventory {
    let system_names: HashMap<&str, &str> = systems
        .iter()
        .map(|s| (s.uuid.as_str(), s.name.as_str()))
        .collect();

    let mut inventory = Inventory::default();
    let mut members: HashMap<String, BTreeSet<String>> = HashMap::new();

    for partition in partitions {
        if inventory.meta.hostvars.contains_key(&partition.name) {
            warn!(
                "Duplicate partition name {}, keeping the first occurrence",
                partition.name
            );
            continue;
        }

        let system_name = match partition.managed_system_uuid.as_deref() {
            Some(uuid) => {
                let name = system_names.get(uuid).copied();
                if name.is_none() {
                    warn!(
                        "Partition {} refers to unknown managed system {}",
                        partition.name, uuid
                    );
                }
                name
            }
            None => None,
        };

        let mut groups = vec![ALL_GROUP.to_string()];
        groups.extend(classified("state", partition.state.as_deref()));
        groups.extend(classified("type", partition.partition_type.as_deref()));
        groups.extend(classified("system", system_name));

        for group in groups {
            members
                .entry(group)
                .or_default()
                .insert(partition.name.clone());
        }

        inventory
            .meta
            .hostvars
            .insert(partition.name.clone(), host_vars(partition, system_name));
    }

    // `all` is always present, even for an empty HMC.
    members.entry(ALL_GROUP.to_string()).or_default();

    for (name, hosts) in members {
        inventory
            .groups
            .entry(name)
            .or_default()
            .hosts
            .extend(hosts);
    }

    inventory
}

fn classified(prefix: &str, value: Option<&str>) -> Option<String> {
    let suffix = normalize_group_name(value?);
    if suffix.is_empty() {
        None
    } else {
        Some(format!("{}_{}", prefix, suffix))
    }
}

/// Lowercase, collapse every run of non-alphanumerics into `_`, trim `_`.
pub fn normalize_group_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn host_vars(partition: &Partition, system_name: Option<&str>) -> HostVars {
    let mut vars = HostVars::new();
    let mut set = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            vars.insert(key.to_string(), value.to_string());
        }
    };

    set("hmc_partition_id", partition.id.as_deref());
    set("hmc_partition_uuid", partition.uuid.as_deref());
    set("hmc_partition_state", partition.state.as_deref());
    set("hmc_partition_type", partition.partition_type.as_deref());
    set("hmc_os_version", partition.os_version.as_deref());
    set("hmc_managed_system", system_name);
    set("hmc_managed_system_uuid", partition.managed_system_uuid.as_deref());
    set("ansible_host", partition.ip_address.as_deref());
    vars
}
