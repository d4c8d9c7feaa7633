use serde::{Deserialize, Serialize};

/// A virtual machine as seen by the rightsizing rules.
#[derive(Debug, Clone, PartialEq)]
pub struct VmDescriptor {
    pub name: String,
    pub size_label: String,
    pub resource_group: String,
}

impl VmDescriptor {
    /// Builds a descriptor from an ARM resource id such as
    /// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Compute/virtualMachines/{name}`.
    pub fn from_resource_id(
        resource_id: &str,
        name: impl Into<String>,
        size_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size_label: size_label.into(),
            resource_group: resource_group_from_id(resource_id),
        }
    }
}

/// Segment following the `resourceGroups` marker (case-insensitive), or an
/// empty string when the marker is absent or trailing.
pub fn resource_group_from_id(resource_id: &str) -> String {
    let parts: Vec<&str> = resource_id.split('/').collect();
    parts
        .iter()
        .position(|p| p.eq_ignore_ascii_case("resourcegroups"))
        .and_then(|i| parts.get(i + 1))
        .map(|rg| rg.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub resource_name: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_group: String,
    pub current_configuration: String,
    pub recommended_configuration: String,
    pub current_monthly_cost: f64,
    pub potential_savings: f64,
    pub reason: String,
}
