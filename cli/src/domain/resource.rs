//! Static resource catalog, naming rules and cloud id construction.
//!
//! The catalog lists every managed object in creation order. The
//! destruction plan is the reverse-dependency order used when a resource
//! group cannot be removed in one call.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::domain::error::CatalogError;

/// Kind of infrastructure object managed by the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ResourceGroup,
    VirtualNetwork,
    Subnet,
    PublicIp,
    SecurityGroup,
    NetworkInterface,
    VirtualMachine,
    /// Composite: links a network interface to a security group.
    NicSecurityGroupAssociation,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResourceGroup => "resource group",
            Self::VirtualNetwork => "virtual network",
            Self::Subnet => "subnet",
            Self::PublicIp => "public ip",
            Self::SecurityGroup => "network security group",
            Self::NetworkInterface => "network interface",
            Self::VirtualMachine => "virtual machine",
            Self::NicSecurityGroupAssociation => "nic/nsg association",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One infrastructure object in both the cloud and the Terraform taxonomy.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    /// Azure resource type, e.g. `Microsoft.Network/networkInterfaces`.
    pub cloud_type: &'static str,
    /// Name suffix appended to the prefix: `<prefix>-<local_name>`.
    pub local_name: &'static str,
    /// Terraform resource type, e.g. `azurerm_network_interface`.
    pub declarative_type: &'static str,
    /// Terraform resource name, e.g. `nic`.
    pub declarative_alias: &'static str,
    /// Containing resource for nested types (subnet → virtual network).
    pub parent: Option<ResourceKind>,
}

impl ResourceDescriptor {
    /// Terraform address: `<type>.<alias>`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.declarative_type, self.declarative_alias)
    }
}

/// Every simple resource, in creation order.
pub static CATALOG: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        kind: ResourceKind::ResourceGroup,
        cloud_type: "Microsoft.Resources/resourceGroups",
        local_name: "resources",
        declarative_type: "azurerm_resource_group",
        declarative_alias: "rg",
        parent: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::VirtualNetwork,
        cloud_type: "Microsoft.Network/virtualNetworks",
        local_name: "vnet",
        declarative_type: "azurerm_virtual_network",
        declarative_alias: "vnet",
        parent: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::Subnet,
        cloud_type: "Microsoft.Network/virtualNetworks/subnets",
        local_name: "subnet",
        declarative_type: "azurerm_subnet",
        declarative_alias: "subnet",
        parent: Some(ResourceKind::VirtualNetwork),
    },
    ResourceDescriptor {
        kind: ResourceKind::PublicIp,
        cloud_type: "Microsoft.Network/publicIPAddresses",
        local_name: "public-ip",
        declarative_type: "azurerm_public_ip",
        declarative_alias: "public_ip",
        parent: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::SecurityGroup,
        cloud_type: "Microsoft.Network/networkSecurityGroups",
        local_name: "nsg",
        declarative_type: "azurerm_network_security_group",
        declarative_alias: "nsg",
        parent: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::NetworkInterface,
        cloud_type: "Microsoft.Network/networkInterfaces",
        local_name: "nic",
        declarative_type: "azurerm_network_interface",
        declarative_alias: "nic",
        parent: None,
    },
    ResourceDescriptor {
        kind: ResourceKind::VirtualMachine,
        cloud_type: "Microsoft.Compute/virtualMachines",
        local_name: "vm",
        declarative_type: "azurerm_linux_virtual_machine",
        declarative_alias: "vm",
        parent: None,
    },
];

/// The interface ↔ security group link, imported after both sides.
pub static ASSOCIATION: ResourceDescriptor = ResourceDescriptor {
    kind: ResourceKind::NicSecurityGroupAssociation,
    cloud_type: "Microsoft.Network/networkInterfaces/networkSecurityGroup",
    local_name: "nic-nsg",
    declarative_type: "azurerm_network_interface_security_group_association",
    declarative_alias: "nic_nsg",
    parent: None,
};

/// Constituents of [`ASSOCIATION`]: (interface, security group).
pub const ASSOCIATION_PARTS: (ResourceKind, ResourceKind) =
    (ResourceKind::NetworkInterface, ResourceKind::SecurityGroup);

/// Reverse-dependency order: compute first, network last.
pub const DESTRUCTION_ORDER: &[ResourceKind] = &[
    ResourceKind::VirtualMachine,
    ResourceKind::NetworkInterface,
    ResourceKind::Subnet,
    ResourceKind::PublicIp,
    ResourceKind::SecurityGroup,
    ResourceKind::VirtualNetwork,
];

/// Look up a catalog entry by kind.
#[must_use]
pub fn descriptor(kind: ResourceKind) -> Option<&'static ResourceDescriptor> {
    if kind == ResourceKind::NicSecurityGroupAssociation {
        return Some(&ASSOCIATION);
    }
    CATALOG.iter().find(|d| d.kind == kind)
}

/// Check the catalog against the destruction plan and the association.
///
/// # Errors
///
/// Returns the first inconsistency found.
pub fn validate_catalog() -> Result<(), CatalogError> {
    if !CATALOG.iter().any(|d| d.kind == ResourceKind::ResourceGroup) {
        return Err(CatalogError::NoResourceGroup);
    }

    let mut names = HashSet::new();
    let mut addresses = HashSet::new();
    for d in CATALOG.iter().chain(std::iter::once(&ASSOCIATION)) {
        if !names.insert(d.local_name) {
            return Err(CatalogError::Duplicate {
                field: "name",
                value: d.local_name.to_string(),
            });
        }
        if !addresses.insert(d.address()) {
            return Err(CatalogError::Duplicate {
                field: "address",
                value: d.address(),
            });
        }
        if let Some(parent) = d.parent
            && !CATALOG.iter().any(|c| c.kind == parent)
        {
            return Err(CatalogError::MissingFromCatalog(parent.to_string()));
        }
    }

    for kind in DESTRUCTION_ORDER {
        if !CATALOG.iter().any(|d| d.kind == *kind) {
            return Err(CatalogError::MissingFromCatalog(kind.to_string()));
        }
    }

    let (nic, nsg) = ASSOCIATION_PARTS;
    for part in [nic, nsg] {
        if !CATALOG.iter().any(|d| d.kind == part) {
            return Err(CatalogError::DanglingAssociation {
                association: ASSOCIATION.address(),
                missing: part.to_string(),
            });
        }
    }
    Ok(())
}

// ── Destruction plan ──────────────────────────────────────────────────────────

/// Ordered descriptors for the per-resource delete fallback.
#[derive(Debug, Clone)]
pub struct DestructionPlan {
    steps: Vec<&'static ResourceDescriptor>,
}

impl DestructionPlan {
    /// The fixed plan built from [`DESTRUCTION_ORDER`].
    ///
    /// # Errors
    ///
    /// Returns an error if a planned kind is not in the catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        let steps = DESTRUCTION_ORDER
            .iter()
            .map(|kind| {
                CATALOG
                    .iter()
                    .find(|d| d.kind == *kind)
                    .ok_or_else(|| CatalogError::MissingFromCatalog(kind.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[&'static ResourceDescriptor] {
        &self.steps
    }
}

// ── Resource group handle ─────────────────────────────────────────────────────

/// Container keyed by `<prefix>-<product>-resources`; scopes all names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGroupHandle {
    prefix: String,
    name: String,
}

impl ResourceGroupHandle {
    #[must_use]
    pub fn new(prefix: &str, product: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: format!("{prefix}-{product}-resources"),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Concrete cloud name of `d` within this group's naming pattern.
    #[must_use]
    pub fn resource_name(&self, d: &ResourceDescriptor) -> String {
        match d.kind {
            ResourceKind::ResourceGroup => self.name.clone(),
            _ => format!("{}-{}", self.prefix, d.local_name),
        }
    }

    /// Name of the parent resource for nested kinds.
    #[must_use]
    pub fn parent_name(&self, d: &ResourceDescriptor) -> Option<String> {
        d.parent
            .and_then(descriptor)
            .map(|parent| self.resource_name(parent))
    }

    /// `/subscriptions/<sub>/resourceGroups/<group>`.
    #[must_use]
    pub fn group_id(&self, subscription: &str) -> String {
        format!("/subscriptions/{subscription}/resourceGroups/{}", self.name)
    }

    /// Fully qualified Azure id for a simple resource.
    #[must_use]
    pub fn resource_id(&self, subscription: &str, d: &ResourceDescriptor) -> String {
        if d.kind == ResourceKind::ResourceGroup {
            return self.group_id(subscription);
        }
        let (namespace, types) = d.cloud_type.split_once('/').unwrap_or((d.cloud_type, ""));
        let mut names: Vec<String> = self.parent_name(d).into_iter().collect();
        names.push(self.resource_name(d));

        let mut id = format!("{}/providers/{namespace}", self.group_id(subscription));
        for (segment, name) in types.split('/').zip(names.iter()) {
            id.push('/');
            id.push_str(segment);
            id.push('/');
            id.push_str(name);
        }
        id
    }

    /// Terraform import id of the interface ↔ security group association.
    #[must_use]
    pub fn association_id(&self, subscription: &str) -> Option<String> {
        let (nic, nsg) = ASSOCIATION_PARTS;
        let nic_id = self.resource_id(subscription, descriptor(nic)?);
        let nsg_id = self.resource_id(subscription, descriptor(nsg)?);
        Some(format!("{nic_id}|{nsg_id}"))
    }
}
