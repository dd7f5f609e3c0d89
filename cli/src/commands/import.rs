//! `infractl import` — bring existing Azure resources under Terraform state.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{
    ApplyOrchestrator, ApplySettings, release_stale_locks, resolve_subscription,
};
use crate::infra::locks::LockFiles;
use crate::output::human::HumanRenderer;
use crate::output::reporter::TerminalReporter;

/// Run `infractl import`.
///
/// # Errors
///
/// Returns an error if `terraform init` fails or any resource could not be
/// imported.
pub async fn run(app: &AppContext) -> Result<()> {
    let run = super::prepare_run(app)?;
    let reporter = TerminalReporter::new(&app.output);
    let (cloud, terraform, clock) = (app.cloud(), app.terraform(), app.clock());

    let subscription = resolve_subscription(app.env.subscription.as_deref(), &cloud)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "continuing without subscription"))
        .ok();

    release_stale_locks(&LockFiles::in_dir(app.terraform_dir()), &terraform, &reporter).await;

    let settings = ApplySettings {
        subscription: subscription.as_deref(),
        plan_artifact: &app.config.plan_artifact,
        output_name: &app.config.output_name,
        output_retry_delay: app.cooldown(),
    };
    let report = ApplyOrchestrator::new(&cloud, &terraform, &clock, settings)
        .import(&run.group, &reporter)
        .await?;

    if app.is_json() {
        super::print_json(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_import(&report);
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{failed} resource(s) could not be imported");
    }
    Ok(())
}
