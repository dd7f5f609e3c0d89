//! Application service — reconcile cloud reality with Terraform state.
//!
//! Resources that exist in Azure but are missing from state are imported so
//! the following plan does not try to recreate them. The loop never aborts:
//! every descriptor gets an outcome and the caller decides what to do with
//! failures.

use tracing::{debug, info, warn};

use crate::application::ports::{CloudProvider, DeclarativeTool, ProgressReporter};
use crate::application::services::existence::ExistenceChecker;
use crate::domain::resource::{ASSOCIATION_PARTS, descriptor};
use crate::domain::{
    ASSOCIATION, CATALOG, ImportReport, ImportStatus, ResourceDescriptor, ResourceGroupHandle,
    ResourceKind, RunError,
};

/// Catalog entries in creation order, association last.
#[must_use]
pub fn default_import_list() -> Vec<&'static ResourceDescriptor> {
    CATALOG.iter().chain(std::iter::once(&ASSOCIATION)).collect()
}

pub struct StateImporter<'a, C: CloudProvider, T: DeclarativeTool> {
    existence: ExistenceChecker<'a, C>,
    tool: &'a T,
    subscription: Option<&'a str>,
}

impl<'a, C: CloudProvider, T: DeclarativeTool> StateImporter<'a, C, T> {
    /// `subscription` is only needed to build import ids; without it the
    /// membership and existence checks still run.
    pub fn new(cloud: &'a C, tool: &'a T, subscription: Option<&'a str>) -> Self {
        Self {
            existence: ExistenceChecker::new(cloud),
            tool,
            subscription,
        }
    }

    /// Import every listed resource that exists but is untracked.
    pub async fn import_all(
        &self,
        group: &ResourceGroupHandle,
        resources: &[&'static ResourceDescriptor],
        reporter: &impl ProgressReporter,
    ) -> ImportReport {
        let mut report = ImportReport::default();
        let mut association = None;

        for &resource in resources {
            if resource.kind == ResourceKind::NicSecurityGroupAssociation {
                association = Some(resource);
                continue;
            }
            let status = self.import_one(group, resource).await;
            Self::announce(group, resource, &status, reporter);
            report.record(resource, status);
        }

        if let Some(resource) = association {
            let status = self.import_association(group, resource, &report).await;
            Self::announce(group, resource, &status, reporter);
            report.record(resource, status);
        }

        info!(
            resource_group = %group.name(),
            imported = report.imported(),
            failed = report.failures().count(),
            "state import finished"
        );
        report
    }

    async fn import_one(
        &self,
        group: &ResourceGroupHandle,
        resource: &'static ResourceDescriptor,
    ) -> ImportStatus {
        let address = resource.address();
        if self.is_tracked(&address).await {
            return ImportStatus::AlreadyTracked;
        }
        if !self.existence.resource_exists(group, resource).await {
            return ImportStatus::NotPresent;
        }
        let Some(subscription) = self.subscription else {
            return ImportStatus::Failed {
                detail: RunError::SubscriptionUnavailable.to_string(),
            };
        };
        let id = group.resource_id(subscription, resource);
        self.import(&address, &id).await
    }

    async fn import_association(
        &self,
        group: &ResourceGroupHandle,
        resource: &'static ResourceDescriptor,
        report: &ImportReport,
    ) -> ImportStatus {
        let (nic, nsg) = ASSOCIATION_PARTS;
        let ready = [nic, nsg].into_iter().all(|kind| {
            descriptor(kind)
                .and_then(|d| report.status_of(d))
                .is_some_and(ImportStatus::is_tracked)
        });
        if !ready {
            return ImportStatus::Skipped {
                reason: format!("{nic} and {nsg} are not both tracked"),
            };
        }

        let address = resource.address();
        if self.is_tracked(&address).await {
            return ImportStatus::AlreadyTracked;
        }
        let Some(subscription) = self.subscription else {
            return ImportStatus::Failed {
                detail: RunError::SubscriptionUnavailable.to_string(),
            };
        };
        let (Some(nsg_desc), Some(id)) = (descriptor(nsg), group.association_id(subscription))
        else {
            return ImportStatus::Failed {
                detail: "association constituents missing from catalog".to_string(),
            };
        };
        let expected_nsg = group.resource_id(subscription, nsg_desc);
        if !self.existence.association_exists(group, &expected_nsg).await {
            return ImportStatus::NotPresent;
        }
        self.import(&address, &id).await
    }

    async fn import(&self, address: &str, id: &str) -> ImportStatus {
        match self.tool.import(address, id).await {
            Ok(()) => ImportStatus::Imported,
            Err(e) => ImportStatus::Failed {
                detail: format!("{e:#}"),
            },
        }
    }

    /// `state list` prints one address per line. An address counts as
    /// tracked only when a whole line equals it: a plain substring match
    /// would treat `azurerm_subnet.subnet` as tracked when only
    /// `azurerm_subnet.subnet_2` is in state.
    ///
    /// A failing `state list` counts as "not tracked"; the import that
    /// follows will surface the real problem.
    async fn is_tracked(&self, address: &str) -> bool {
        match self.tool.state_list().await {
            Ok(listing) => listing.lines().any(|line| line.trim() == address),
            Err(e) => {
                warn!(address, error = %format!("{e:#}"), "terraform state list failed");
                false
            }
        }
    }

    fn announce(
        group: &ResourceGroupHandle,
        resource: &ResourceDescriptor,
        status: &ImportStatus,
        reporter: &impl ProgressReporter,
    ) {
        let address = resource.address();
        match status {
            ImportStatus::Imported => {
                info!(resource_group = %group.name(), address = %address, "imported");
                reporter.success(&format!("imported {address}"));
            }
            ImportStatus::Failed { detail } => {
                warn!(resource_group = %group.name(), address = %address, detail = %detail, "import failed");
                reporter.warn(&format!("could not import {address}: {detail}"));
            }
            other => {
                debug!(resource_group = %group.name(), address = %address, status = ?other, "no import needed");
            }
        }
    }
}
