use serde::Serialize;
use std::collections::BTreeMap;

pub type HostVars = BTreeMap<String, String>;

/// Ansible dynamic inventory document. Every map is ordered so identical
/// input always serializes to identical output.
#[derive(Debug, Default, Serialize)]
pub struct Inventory {
    #[serde(flatten)]
    pub groups: BTreeMap<String, Group>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    pub hosts: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, HostVars>,
}

impl Inventory {
    /// Variables for one host, empty when the host is unknown.
    pub fn host_vars(&self, name: &str) -> HostVars {
        self.meta.hostvars.get(name).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }
}
