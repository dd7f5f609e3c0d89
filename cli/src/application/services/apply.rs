//! Application service — the provisioning sequence.
//!
//! `init → import → plan → apply`, then a best-effort read of the configured
//! Terraform output. Init, plan and apply halt the run on failure; the import
//! loop never does.

use std::time::Duration;

use tracing::{info, warn};

use crate::application::ports::{Clock, CloudProvider, DeclarativeTool, ProgressReporter};
use crate::application::services::importer::{StateImporter, default_import_list};
use crate::domain::{
    ApplyReport, ApplyStep, ImportReport, OwnerTag, ResourceGroupHandle, RunError,
};

/// Per-run settings for [`ApplyOrchestrator`].
#[derive(Debug, Clone)]
pub struct ApplySettings<'a> {
    pub subscription: Option<&'a str>,
    pub plan_artifact: &'a str,
    pub output_name: &'a str,
    /// Wait before the single retry of the output lookup.
    pub output_retry_delay: Duration,
}

pub struct ApplyOrchestrator<'a, C, T, K>
where
    C: CloudProvider,
    T: DeclarativeTool,
    K: Clock,
{
    cloud: &'a C,
    tool: &'a T,
    clock: &'a K,
    settings: ApplySettings<'a>,
}

impl<'a, C, T, K> ApplyOrchestrator<'a, C, T, K>
where
    C: CloudProvider,
    T: DeclarativeTool,
    K: Clock,
{
    pub fn new(cloud: &'a C, tool: &'a T, clock: &'a K, settings: ApplySettings<'a>) -> Self {
        Self {
            cloud,
            tool,
            clock,
            settings,
        }
    }

    /// Run the full provisioning sequence for `group`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::StepFailed`] naming the first of init, plan or
    /// apply that failed.
    pub async fn run(
        &self,
        group: &ResourceGroupHandle,
        owner_tag: &OwnerTag,
        reporter: &impl ProgressReporter,
    ) -> Result<ApplyReport, RunError> {
        let mut completed = Vec::with_capacity(4);

        let import = self.import(group, reporter).await?;
        completed.extend([ApplyStep::Init, ApplyStep::Import]);

        reporter.step("planning changes...");
        self.tool
            .plan(self.settings.plan_artifact)
            .await
            .map_err(|e| step_failed(ApplyStep::Plan, &e))?;
        completed.push(ApplyStep::Plan);

        reporter.step("applying plan...");
        self.tool
            .apply(self.settings.plan_artifact)
            .await
            .map_err(|e| step_failed(ApplyStep::Apply, &e))?;
        completed.push(ApplyStep::Apply);
        reporter.success("infrastructure applied");
        info!(owner_tag = %owner_tag, "apply finished");

        let output = self.read_output(reporter).await;
        Ok(ApplyReport {
            owner_tag: owner_tag.to_string(),
            import,
            completed,
            output,
        })
    }

    /// `init` followed by the import loop.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::StepFailed`] when `terraform init` fails. Import
    /// failures are recorded in the report instead.
    pub async fn import(
        &self,
        group: &ResourceGroupHandle,
        reporter: &impl ProgressReporter,
    ) -> Result<ImportReport, RunError> {
        reporter.step("initializing terraform...");
        self.tool
            .init()
            .await
            .map_err(|e| step_failed(ApplyStep::Init, &e))?;

        reporter.step(&format!("importing existing resources from {}...", group.name()));
        let importer = StateImporter::new(self.cloud, self.tool, self.settings.subscription);
        let report = importer
            .import_all(group, &default_import_list(), reporter)
            .await;
        if !report.is_clean() {
            reporter.warn(&format!(
                "{} resource(s) could not be imported; continuing",
                report.failures().count()
            ));
        }
        Ok(report)
    }

    async fn read_output(&self, reporter: &impl ProgressReporter) -> Option<String> {
        let name = self.settings.output_name;
        if let Some(value) = self.lookup_output(name).await {
            return Some(value);
        }
        let delay = self.settings.output_retry_delay;
        reporter.step(&format!(
            "{name} not available yet, retrying in {}s...",
            delay.as_secs()
        ));
        self.clock.sleep(delay).await;
        let value = self.lookup_output(name).await;
        if value.is_none() {
            reporter.warn(&format!("terraform output '{name}' is not available"));
        }
        value
    }

    async fn lookup_output(&self, name: &str) -> Option<String> {
        match self.tool.output(name).await {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!(output = name, error = %format!("{e:#}"), "terraform output failed");
                None
            }
        }
    }
}

fn step_failed(step: ApplyStep, err: &anyhow::Error) -> RunError {
    RunError::StepFailed {
        step: step.to_string(),
        detail: format!("{err:#}"),
    }
}
