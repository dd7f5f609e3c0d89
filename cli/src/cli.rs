//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags, TargetFlags};
use crate::commands;
use crate::domain::{OwnerTag, TagError};

/// Reconcile, provision and tear down Terraform-managed Azure infrastructure
#[derive(Parser)]
#[command(
    name = "infractl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Owner tag override (namespace of every resource name)
    #[arg(long, global = true, value_parser = parse_prefix)]
    pub prefix: Option<String>,

    /// Directory holding the Terraform configuration
    #[arg(
        long,
        global = true,
        env = "INFRACTL_TERRAFORM_DIR",
        default_value = "terraform"
    )]
    pub terraform_dir: PathBuf,

    /// Configuration file [default: <terraform-dir>/infractl.yaml]
    #[arg(long, global = true, env = "INFRACTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// `--prefix` must already be a legal tag; it is never rewritten.
fn parse_prefix(value: &str) -> Result<String, TagError> {
    OwnerTag::parse(value).map(|tag| tag.as_str().to_string())
}

#[derive(Subcommand)]
pub enum Command {
    /// Import existing resources, then plan and apply
    Apply,

    /// Tear down the resource group(s) with escalating fallbacks
    Destroy,

    /// Import resources that exist in Azure but not in Terraform state
    Import,

    /// Print the resolved owner tag and where it came from
    Tag,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be built or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            prefix,
            terraform_dir,
            config,
            yes,
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            target: TargetFlags {
                prefix,
                terraform_dir,
                config,
            },
        })?;

        match command {
            Command::Apply => commands::apply::run(&app).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::Import => commands::import::run(&app).await,
            Command::Tag => commands::tag::run(&app),
        }
    }
}
