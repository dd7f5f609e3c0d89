//! `infractl apply` — import, plan and apply.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{
    ApplyOrchestrator, ApplySettings, release_stale_locks, resolve_subscription,
};
use crate::infra::locks::LockFiles;
use crate::output::human::HumanRenderer;
use crate::output::reporter::TerminalReporter;

/// Run `infractl apply`.
///
/// # Errors
///
/// Returns an error naming the first of init, plan or apply that failed.
pub async fn run(app: &AppContext) -> Result<()> {
    let run = super::prepare_run(app)?;
    let reporter = TerminalReporter::new(&app.output);
    let (cloud, terraform, clock) = (app.cloud(), app.terraform(), app.clock());

    if !app.output.quiet {
        app.output.header(&format!(
            "Deploying {} (owner tag from {})",
            run.group.name(),
            run.tag_source
        ));
    }

    let subscription = resolve_subscription(app.env.subscription.as_deref(), &cloud)
        .await
        .inspect_err(|e| {
            tracing::warn!(error = %e, "continuing without subscription");
            app.output.warn("no subscription found; existing resources cannot be imported");
        })
        .ok();

    release_stale_locks(&LockFiles::in_dir(app.terraform_dir()), &terraform, &reporter).await;

    let settings = ApplySettings {
        subscription: subscription.as_deref(),
        plan_artifact: &app.config.plan_artifact,
        output_name: &app.config.output_name,
        output_retry_delay: app.cooldown(),
    };
    let report = ApplyOrchestrator::new(&cloud, &terraform, &clock, settings)
        .run(&run.group, &run.owner_tag, &reporter)
        .await?;

    if app.is_json() {
        super::print_json(&report)
    } else {
        HumanRenderer::new(&app.output).render_apply(&report);
        Ok(())
    }
}
