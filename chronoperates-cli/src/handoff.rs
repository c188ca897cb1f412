//! Desktop implementation of the calendar handoff: save to a directory, or
//! stage in the cache and open with the default application.

use std::path::{Path, PathBuf};

use chronoperates_core::config::ClientSettings;
use chronoperates_core::retrieval::stage_ics;
use chronoperates_core::{CalendarHandoff, ExtractError, ExtractResult};
use tracing::debug;

pub struct DesktopHandoff {
    download_dir: PathBuf,
    staging_dir: PathBuf,
}

impl DesktopHandoff {
    pub fn new(download_dir: PathBuf) -> Self {
        DesktopHandoff {
            download_dir,
            staging_dir: staging_dir(),
        }
    }
}

impl CalendarHandoff for DesktopHandoff {
    fn persist(&self, ics: &[u8]) -> ExtractResult<PathBuf> {
        stage_ics(&self.download_dir, ics)
    }

    fn open_external(&self, ics: &[u8]) -> ExtractResult<()> {
        let path = stage_ics(&self.staging_dir, ics)?;
        open_path(&path)
    }
}

fn open_path(path: &Path) -> ExtractResult<()> {
    debug!(path = %path.display(), "opening_calendar_file");
    open::that(path).map_err(|e| {
        ExtractError::PlatformHandoffFailed(format!("Could not open {}: {e}", path.display()))
    })
}

/// Settings `download_dir`, else the platform Downloads folder, else the working directory.
pub fn download_dir(settings: &ClientSettings) -> PathBuf {
    settings
        .download_dir
        .clone()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn staging_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("chronoperates")
}
