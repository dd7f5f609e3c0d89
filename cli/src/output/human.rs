//! Human-readable terminal renderer.

use crate::domain::{
    ApplyReport, DestroyReport, GroupResolution, ImportReport, ImportStatus, OwnerTag,
    ResourceGroupHandle, TagSource,
};
use crate::output::OutputContext;

/// Renders domain reports as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the resolved owner tag. The bare tag is printed even when quiet
    /// so scripts can capture it.
    pub fn render_tag(&self, tag: &OwnerTag, source: TagSource, group: &ResourceGroupHandle) {
        if self.ctx.quiet {
            println!("{tag}");
            return;
        }
        self.ctx.kv("Owner tag:", tag.as_str());
        self.ctx.kv("Source:", &source.to_string());
        self.ctx.kv("Resource group:", group.name());
    }

    pub fn render_import(&self, report: &ImportReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Import:");
        for outcome in &report.outcomes {
            let address = outcome.resource.address();
            match &outcome.status {
                ImportStatus::Imported => self.ctx.success(&format!("{address} imported")),
                ImportStatus::AlreadyTracked => self.ctx.kv("tracked", &address),
                ImportStatus::NotPresent => self.ctx.kv("absent ", &address),
                ImportStatus::Skipped { reason } => {
                    self.ctx.kv("skipped", &format!("{address} ({reason})"));
                }
                ImportStatus::Failed { detail } => {
                    self.ctx.warn(&format!("{address} failed: {detail}"));
                }
            }
        }
    }

    pub fn render_destroy(&self, report: &DestroyReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Destroy:");
        if report.groups.is_empty() {
            self.ctx.info("No resource groups to process");
            return;
        }
        for group in &report.groups {
            let line = format!("{}: {}", group.group, group.resolution);
            match group.resolution {
                GroupResolution::Unresolved => self.ctx.error(&line),
                GroupResolution::Absent => self.ctx.info(&line),
                _ => self.ctx.success(&line),
            }
            if let Some(last) = group.passes.last() {
                self.ctx.kv(
                    "  passes:",
                    &format!("{} (last forced: {})", group.passes.len(), last.forced),
                );
            }
            for resource in &group.remaining {
                self.ctx.kv("  left:", &resource.address());
            }
        }
    }

    pub fn render_apply(&self, report: &ApplyReport) {
        if self.ctx.quiet {
            return;
        }
        self.render_import(&report.import);
        println!();
        self.ctx.header("Apply:");
        for step in &report.completed {
            self.ctx.success(&step.to_string());
        }
        match &report.output {
            Some(value) => self.ctx.kv("Server IP:", value),
            None => self.ctx.warn("Server IP not available yet"),
        }
    }
}
