//! Application context — unified state passed to every command handler.
//!
//! Flags, environment and configuration are read exactly once here. Command
//! handlers and services receive explicit values and never consult the
//! process environment themselves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, VariablesStore};
use crate::domain::resource::validate_catalog;
use crate::domain::{
    InfraConfig, OwnerTag, OwnerTagInputs, ResourceGroupHandle, TagSource, resolve_owner_tag,
};
use crate::infra::azure::AzCli;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::config::{CONFIG_FILE, YamlConfigStore};
use crate::infra::terraform::Terraform;
use crate::infra::variables::TfvarsFile;
use crate::output::OutputContext;
use crate::output::progress::SpinnerClock;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by the `CI` env var).
    pub yes: bool,
}

/// Where the Terraform configuration lives and which prefix to use.
pub struct TargetFlags {
    pub prefix: Option<String>,
    pub terraform_dir: PathBuf,
    pub config: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
    pub target: TargetFlags,
}

/// Environment signals consulted during a run.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `GITHUB_REF`
    pub branch_ref: Option<String>,
    /// `GITHUB_ACTOR`
    pub actor: Option<String>,
    /// `ARM_SUBSCRIPTION_ID`
    pub subscription: Option<String>,
    /// `USER`, then `USERNAME`
    pub local_user: Option<String>,
    /// `CI` is set
    pub ci: bool,
}

impl Environment {
    #[must_use]
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            branch_ref: var("GITHUB_REF"),
            actor: var("GITHUB_ACTOR"),
            subscription: var("ARM_SUBSCRIPTION_ID"),
            local_user: var("USER").or_else(|| var("USERNAME")),
            ci: std::env::var("CI").is_ok(),
        }
    }
}

/// Resolved per-run values shared by every service of one command.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub owner_tag: OwnerTag,
    pub tag_source: TagSource,
    /// Primary resource group derived from `owner_tag`.
    pub group: ResourceGroupHandle,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub env: Environment,
    pub config: InfraConfig,
    terraform_dir: PathBuf,
    prefix: Option<String>,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when `CI` is present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource catalog is inconsistent or the
    /// configuration file cannot be read or is invalid.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        Self::with_env(flags, Environment::from_process())
    }

    /// Like [`AppContext::new`] with an explicit environment.
    ///
    /// # Errors
    ///
    /// See [`AppContext::new`].
    pub fn with_env(flags: &AppFlags, env: Environment) -> Result<Self> {
        validate_catalog().context("resource catalog is inconsistent")?;

        let terraform_dir = flags.target.terraform_dir.clone();
        let config_path = flags
            .target
            .config
            .clone()
            .unwrap_or_else(|| terraform_dir.join(CONFIG_FILE));
        let config = YamlConfigStore::new(config_path).load()?;

        let json = flags.output.json;
        let mode = if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || json),
            mode,
            non_interactive: flags.behaviour.yes || env.ci,
            env,
            config,
            terraform_dir,
            prefix: flags.target.prefix.clone(),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn variables(&self) -> TfvarsFile {
        TfvarsFile::in_dir(&self.terraform_dir)
    }

    /// Resolve the owner tag and derive the primary resource group.
    ///
    /// An unreadable variables file only drops rule (d) of the chain.
    #[must_use]
    pub fn run_context(&self, variables: &impl VariablesStore) -> RunContext {
        let previous = variables.previous_owner_tag().unwrap_or_else(|e| {
            tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable variables file");
            None
        });
        let inputs = OwnerTagInputs {
            explicit: self.prefix.clone(),
            branch_ref: self.env.branch_ref.clone(),
            actor: self.env.actor.clone(),
            previous,
            local_user: self.env.local_user.clone(),
        };
        let (owner_tag, tag_source) = resolve_owner_tag(&inputs, &self.config.branch_table());
        tracing::info!(owner_tag = %owner_tag, source = %tag_source, "owner tag resolved");
        let group = ResourceGroupHandle::new(owner_tag.as_str(), &self.config.product);
        RunContext {
            owner_tag,
            tag_source,
            group,
        }
    }

    /// The primary group followed by every configured legacy pattern.
    #[must_use]
    pub fn group_patterns(&self, run: &RunContext) -> Vec<ResourceGroupHandle> {
        let mut groups = vec![run.group.clone()];
        for prefix in &self.config.legacy_prefixes {
            let legacy = ResourceGroupHandle::new(prefix, &self.config.product);
            if !groups.contains(&legacy) {
                groups.push(legacy);
            }
        }
        groups
    }

    fn runner(&self) -> TokioCommandRunner {
        let runner = TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT);
        if self.output.quiet { runner.silent() } else { runner }
    }

    #[must_use]
    pub fn cloud(&self) -> AzCli<TokioCommandRunner> {
        AzCli::new(self.runner()).with_delete_timeout(self.config.delete_timeout())
    }

    #[must_use]
    pub fn terraform(&self) -> Terraform<TokioCommandRunner> {
        Terraform::new(self.runner(), &self.terraform_dir)
    }

    #[must_use]
    pub fn clock(&self) -> SpinnerClock {
        SpinnerClock::new(self.output.show_progress())
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.config.retry.cooldown_secs)
    }

    #[must_use]
    pub fn terraform_dir(&self) -> &Path {
        &self.terraform_dir
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI or `--yes`), returns `default`
    /// immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
