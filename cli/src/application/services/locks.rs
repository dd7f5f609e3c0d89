//! Application service — stale Terraform state lock recovery.
//!
//! An interrupted run can leave a lock-info file behind, after which every
//! Terraform command refuses to start. Nothing here is fatal: a lock that
//! cannot be released is reported and the following command surfaces the
//! real error.

use tracing::{info, warn};

use crate::application::ports::{DeclarativeTool, ProgressReporter, StateLockStore};

/// Release every recorded lock and remove the lock-info files.
///
/// Returns the number of locks released.
pub async fn release_stale_locks(
    store: &impl StateLockStore,
    tool: &impl DeclarativeTool,
    reporter: &impl ProgressReporter,
) -> usize {
    let ids = match store.lock_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "could not read lock files");
            reporter.warn("could not inspect terraform lock files");
            return 0;
        }
    };

    let mut released = 0;
    for id in &ids {
        match tool.force_unlock(id).await {
            Ok(()) => {
                info!(lock_id = %id, "released stale lock");
                released += 1;
            }
            Err(e) => {
                warn!(lock_id = %id, error = %format!("{e:#}"), "force-unlock failed");
                reporter.warn(&format!("could not release state lock {id}"));
            }
        }
    }

    match store.remove_lock_files() {
        Ok(0) => {}
        Ok(removed) => {
            info!(removed, "removed lock files");
            reporter.success(&format!("cleared {removed} stale lock file(s)"));
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "could not remove lock files");
            reporter.warn("could not remove terraform lock files");
        }
    }
    released
}
