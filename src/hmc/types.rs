use serde::Serialize;

/// A physical server managed by the HMC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedSystem {
    pub uuid: String,
    pub name: String,
}

/// A logical partition as reported by `rest/api/uom/LogicalPartition`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub name: String,
    pub id: Option<String>,
    pub uuid: Option<String>,
    pub state: Option<String>,
    pub partition_type: Option<String>,
    pub os_version: Option<String>,
    pub ip_address: Option<String>,
    /// UUID taken from the `AssociatedManagedSystem` link.
    pub managed_system_uuid: Option<String>,
}
