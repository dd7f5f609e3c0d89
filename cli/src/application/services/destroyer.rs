//! Application service — dependency-ordered teardown with escalation.
//!
//! Per resource-group pattern:
//!
//! 1. group absent → done, nothing to delete
//! 2. direct group delete → done on success
//! 3. ordered per-resource passes (bounded by the retry policy, only
//!    failures are retried, force from pass 2, cooldown between passes);
//!    when nothing is left the pattern is done, and the emptied group gets
//!    one best-effort delete
//! 4. forced group delete
//! 5. `terraform destroy`, accepted only if the group is gone afterwards
//!
//! Only when every layer fails is the pattern reported as unresolved.

use tracing::{debug, info, warn};

use crate::application::ports::{
    Clock, CloudProvider, DeclarativeTool, DeleteMode, ProgressReporter,
};
use crate::application::services::existence::ExistenceChecker;
use crate::domain::{
    AttemptResult, DestroyReport, DestructionPlan, GroupReport, GroupResolution, PassReport,
    ResourceDescriptor, ResourceGroupHandle, RetryPolicy,
};

pub struct DependencyOrderedDestroyer<'a, C, T, K>
where
    C: CloudProvider,
    T: DeclarativeTool,
    K: Clock,
{
    cloud: &'a C,
    existence: ExistenceChecker<'a, C>,
    tool: &'a T,
    clock: &'a K,
    plan: DestructionPlan,
    policy: RetryPolicy,
}

impl<'a, C, T, K> DependencyOrderedDestroyer<'a, C, T, K>
where
    C: CloudProvider,
    T: DeclarativeTool,
    K: Clock,
{
    pub fn new(
        cloud: &'a C,
        tool: &'a T,
        clock: &'a K,
        plan: DestructionPlan,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cloud,
            existence: ExistenceChecker::new(cloud),
            tool,
            clock,
            plan,
            policy,
        }
    }

    /// Tear down every pattern independently and aggregate the outcomes.
    pub async fn destroy_all(
        &self,
        groups: &[ResourceGroupHandle],
        reporter: &impl ProgressReporter,
    ) -> DestroyReport {
        let mut report = DestroyReport::default();
        for group in groups {
            report.groups.push(self.destroy_group(group, reporter).await);
        }
        report
    }

    pub async fn destroy_group(
        &self,
        group: &ResourceGroupHandle,
        reporter: &impl ProgressReporter,
    ) -> GroupReport {
        let mut report = GroupReport {
            group: group.name().to_string(),
            prefix: group.prefix().to_string(),
            resolution: GroupResolution::Unresolved,
            passes: Vec::new(),
            remaining: Vec::new(),
        };

        if !self.existence.resource_group_exists(group).await {
            debug!(resource_group = %group.name(), "resource group absent");
            reporter.success(&format!("{} does not exist", group.name()));
            report.resolution = GroupResolution::Absent;
            return report;
        }

        reporter.step(&format!("deleting {}...", group.name()));
        if self.delete_group(group, DeleteMode::Normal).await {
            reporter.success(&format!("deleted {}", group.name()));
            report.resolution = GroupResolution::DirectDelete;
            return report;
        }

        reporter.step("deleting resources in dependency order...");
        let (passes, remaining) = self.ordered_delete(group, reporter).await;
        report.passes = passes;
        report.remaining = remaining;

        if report.remaining.is_empty() {
            if self.delete_group(group, DeleteMode::Normal).await {
                reporter.success(&format!("deleted {}", group.name()));
            } else {
                reporter.warn(&format!(
                    "{} is empty but the group itself was not deleted",
                    group.name()
                ));
            }
            report.resolution = GroupResolution::OrderedDelete;
            return report;
        }

        reporter.warn(&format!("force-deleting {}", group.name()));
        if self.delete_group(group, DeleteMode::Force).await {
            reporter.success(&format!("force-deleted {}", group.name()));
            report.resolution = GroupResolution::ForcedGroupDelete;
            return report;
        }

        reporter.warn("falling back to terraform destroy");
        match self.tool.destroy(group.prefix()).await {
            Ok(()) if self.existence.resource_group_exists(group).await => {
                warn!(resource_group = %group.name(), layer = "terraform", "group survived terraform destroy");
                reporter.warn(&format!(
                    "terraform destroy left {} in place; it needs manual cleanup",
                    group.name()
                ));
            }
            Ok(()) => {
                info!(resource_group = %group.name(), layer = "terraform", "destroyed");
                reporter.success(&format!("destroyed {} with terraform", group.name()));
                report.resolution = GroupResolution::DeclarativeDestroy;
            }
            Err(e) => {
                warn!(resource_group = %group.name(), error = %format!("{e:#}"), "all destroy layers failed");
                reporter.warn(&format!("{} needs manual cleanup", group.name()));
            }
        }
        report
    }

    /// Run up to `max_passes` passes; returns the passes and what is left.
    async fn ordered_delete(
        &self,
        group: &ResourceGroupHandle,
        reporter: &impl ProgressReporter,
    ) -> (Vec<PassReport>, Vec<&'static ResourceDescriptor>) {
        let mut pending: Vec<&'static ResourceDescriptor> = self.plan.steps().to_vec();
        let mut passes = Vec::new();

        for pass in 1..=self.policy.max_passes() {
            if pass > 1 {
                let delay = self.policy.delay_before(pass);
                info!(resource_group = %group.name(), pass, delay_secs = delay.as_secs(), "cooling down before retry");
                reporter.step(&format!(
                    "waiting {}s before retrying {} resource(s)...",
                    delay.as_secs(),
                    pending.len()
                ));
                self.clock.sleep(delay).await;
            }

            let forced = self.policy.forced(pass);
            let mode = if forced {
                DeleteMode::Force
            } else {
                DeleteMode::Normal
            };

            let mut attempts = Vec::with_capacity(pending.len());
            for &resource in &pending {
                attempts.push(self.delete_resource(group, resource, mode, pass).await);
            }

            let report = PassReport {
                pass,
                forced,
                attempts,
            };
            pending = report.failed().collect();
            passes.push(report);

            if pending.is_empty() {
                break;
            }
        }
        (passes, pending)
    }

    async fn delete_resource(
        &self,
        group: &ResourceGroupHandle,
        resource: &'static ResourceDescriptor,
        mode: DeleteMode,
        pass: u32,
    ) -> AttemptResult {
        let name = group.resource_name(resource);
        if !self.existence.resource_exists(group, resource).await {
            debug!(resource_group = %group.name(), resource = %name, pass, "already gone");
            return AttemptResult {
                resource,
                succeeded: true,
                error_detail: None,
            };
        }
        match self.cloud.delete_resource(group, resource, mode).await {
            Ok(()) => {
                info!(resource_group = %group.name(), resource = %name, pass, ?mode, "deleted");
                AttemptResult {
                    resource,
                    succeeded: true,
                    error_detail: None,
                }
            }
            Err(e) => {
                let detail = format!("{e:#}");
                warn!(resource_group = %group.name(), resource = %name, pass, ?mode, error = %detail, "delete failed");
                AttemptResult {
                    resource,
                    succeeded: false,
                    error_detail: Some(detail),
                }
            }
        }
    }

    async fn delete_group(&self, group: &ResourceGroupHandle, mode: DeleteMode) -> bool {
        match self.cloud.delete_group(group, mode).await {
            Ok(()) => {
                info!(resource_group = %group.name(), ?mode, "group deleted");
                true
            }
            Err(e) => {
                warn!(resource_group = %group.name(), ?mode, error = %format!("{e:#}"), "group delete failed");
                false
            }
        }
    }
}
