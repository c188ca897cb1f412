//! Getting the generated calendar file out of the backend and into the
//! user's hands.
//!
//! Both flows fetch the bytes first and only then involve the platform:
//! - save: fetch, then [`CalendarHandoff::persist`]
//! - open: fetch, then [`CalendarHandoff::open_external`]; if the platform
//!   can't open it, fall back to the save flow once.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::{ExtractError, ExtractResult};
use crate::protocol::{ExtractionResult, ICS_FILE_NAME};

/// Platform side of retrieval: file system, share sheet, external apps.
///
/// Failures should be reported as [`ExtractError::PlatformHandoffFailed`].
pub trait CalendarHandoff: Send + Sync {
    /// Save or share the calendar file. Returns where it ended up.
    fn persist(&self, ics: &[u8]) -> ExtractResult<PathBuf>;

    /// Open the calendar file in an external application.
    fn open_external(&self, ics: &[u8]) -> ExtractResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Saved(PathBuf),
    Opened,
    /// Opening failed, the file was saved instead.
    SavedAfterOpenFailed { path: PathBuf, reason: String },
}

/// Write `ics` to `dir/calendar_events.ics`, creating `dir` if needed.
pub fn stage_ics(dir: &Path, ics: &[u8]) -> ExtractResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ExtractError::PlatformHandoffFailed(format!("Could not create {}: {e}", dir.display()))
    })?;

    let path = dir.join(ICS_FILE_NAME);
    std::fs::write(&path, ics).map_err(|e| {
        ExtractError::PlatformHandoffFailed(format!("Could not write {}: {e}", path.display()))
    })?;

    Ok(path)
}

/// Fetch the calendar file and persist it. No fallback.
pub async fn fetch_and_persist(
    api: &ApiClient,
    result: &ExtractionResult,
    handoff: &dyn CalendarHandoff,
) -> ExtractResult<PathBuf> {
    let ics = api.download_ics(&result.ics_file_path).await?;
    debug!(bytes = ics.len(), "calendar_fetched");
    handoff.persist(&ics)
}

/// Fetch the calendar file and open it externally.
///
/// Only a handoff failure triggers the fallback; a failed fetch is returned
/// as is. The fallback runs at most once.
pub async fn open_in_external_app(
    api: &ApiClient,
    result: &ExtractionResult,
    handoff: &dyn CalendarHandoff,
) -> ExtractResult<RetrievalOutcome> {
    let ics = api.download_ics(&result.ics_file_path).await?;
    debug!(bytes = ics.len(), "calendar_fetched");

    let reason = match handoff.open_external(&ics) {
        Ok(()) => return Ok(RetrievalOutcome::Opened),
        Err(e) => e.to_string(),
    };

    warn!(reason = %reason, "open_failed_falling_back_to_save");
    let path = fetch_and_persist(api, result, handoff).await?;

    Ok(RetrievalOutcome::SavedAfterOpenFailed { path, reason })
}
