//! `infractl destroy` — tear down every resource group pattern.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::DependencyOrderedDestroyer;
use crate::domain::{DestructionPlan, RunError};
use crate::output::human::HumanRenderer;
use crate::output::reporter::TerminalReporter;

/// Run `infractl destroy`.
///
/// # Errors
///
/// Returns [`RunError::ManualCleanupRequired`] when any group pattern
/// survives every escalation layer.
pub async fn run(app: &AppContext) -> Result<()> {
    let variables = app.variables();
    let run = app.run_context(&variables);
    let groups = app.group_patterns(&run);

    if !app.output.quiet {
        println!();
        println!("This will permanently delete:");
        for group in &groups {
            println!("  • {} and everything in it", group.name());
        }
        println!();
    }
    if !app.confirm("Continue?", false)? {
        app.output.info("Cancelled.");
        return Ok(());
    }
    super::write_variables(&variables, &run)?;

    let reporter = TerminalReporter::new(&app.output);
    let (cloud, terraform, clock) = (app.cloud(), app.terraform(), app.clock());
    let destroyer = DependencyOrderedDestroyer::new(
        &cloud,
        &terraform,
        &clock,
        DestructionPlan::standard()?,
        app.config.retry_policy(),
    );
    let report = destroyer.destroy_all(&groups, &reporter).await;

    if app.is_json() {
        super::print_json(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_destroy(&report);
    }

    if report.succeeded() {
        Ok(())
    } else {
        Err(RunError::ManualCleanupRequired {
            groups: report.unresolved_groups(),
        }
        .into())
    }
}
