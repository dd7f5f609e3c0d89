//! Command implementations

pub mod apply;
pub mod destroy;
pub mod import;
pub mod tag;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::app::{AppContext, RunContext};
use crate::application::ports::VariablesStore;
use crate::infra::variables::TfvarsFile;
use crate::output::json;

/// Resolve the owner tag and rewrite `terraform.tfvars` before anything
/// mutates infrastructure.
fn prepare_run(app: &AppContext) -> Result<RunContext> {
    let variables = app.variables();
    let run = app.run_context(&variables);
    write_variables(&variables, &run)?;
    Ok(run)
}

fn write_variables(variables: &TfvarsFile, run: &RunContext) -> Result<()> {
    variables
        .write_owner_tag(&run.owner_tag)
        .with_context(|| format!("cannot write {}", variables.path().display()))
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", json::format_report(report)?);
    Ok(())
}
