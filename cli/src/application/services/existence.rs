//! Application service — cloud existence checks.
//!
//! "Not found" is the normal answer for most of these queries, so query
//! failures are folded into `false` and only logged at debug level.

use tracing::debug;

use crate::application::ports::CloudProvider;
use crate::domain::resource::{ASSOCIATION_PARTS, descriptor};
use crate::domain::{ResourceDescriptor, ResourceGroupHandle, ResourceKind};

/// Answers "does this exist right now?" for groups, resources and links.
pub struct ExistenceChecker<'a, C: CloudProvider> {
    cloud: &'a C,
}

impl<'a, C: CloudProvider> ExistenceChecker<'a, C> {
    pub fn new(cloud: &'a C) -> Self {
        Self { cloud }
    }

    pub async fn resource_group_exists(&self, group: &ResourceGroupHandle) -> bool {
        match self.cloud.group_exists(group).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!(resource_group = %group.name(), error = %format!("{e:#}"), "group query failed");
                false
            }
        }
    }

    /// Checks the group first and skips the resource query when it is absent.
    pub async fn resource_exists(
        &self,
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
    ) -> bool {
        if !self.resource_group_exists(group).await {
            return false;
        }
        if resource.kind == ResourceKind::ResourceGroup {
            return true;
        }
        match self.cloud.resource_exists(group, resource).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!(
                    resource_group = %group.name(),
                    resource = %group.resource_name(resource),
                    error = %format!("{e:#}"),
                    "resource query failed"
                );
                false
            }
        }
    }

    /// Whether the interface currently points at `expected_nsg_id`.
    pub async fn association_exists(
        &self,
        group: &ResourceGroupHandle,
        expected_nsg_id: &str,
    ) -> bool {
        if !self.resource_group_exists(group).await {
            return false;
        }
        let Some(nic) = descriptor(ASSOCIATION_PARTS.0) else {
            return false;
        };
        match self.cloud.interface_security_group(group, nic).await {
            Ok(Some(current)) => current.trim().eq_ignore_ascii_case(expected_nsg_id),
            Ok(None) => false,
            Err(e) => {
                debug!(resource_group = %group.name(), error = %format!("{e:#}"), "nic query failed");
                false
            }
        }
    }
}
