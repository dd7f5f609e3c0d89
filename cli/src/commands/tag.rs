//! `infractl tag` — show the resolved owner tag without touching anything.

use anyhow::Result;

use crate::app::AppContext;
use crate::output::human::HumanRenderer;

/// Run `infractl tag`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    let run = app.run_context(&app.variables());
    if app.is_json() {
        return super::print_json(&serde_json::json!({
            "owner_tag": run.owner_tag,
            "source": run.tag_source,
            "resource_group": run.group.name(),
        }));
    }
    HumanRenderer::new(&app.output).render_tag(&run.owner_tag, run.tag_source, &run.group);
    Ok(())
}
