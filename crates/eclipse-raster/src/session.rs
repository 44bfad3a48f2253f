use std::path::PathBuf;

use eclipse_platform::{DesktopSession, Result, Viewport};
use tracing::{info, warn};

/// Desktop session for the headless backend: the "desktop" is a snapshot
/// directory, and restoring it only has to happen once.
pub struct HeadlessSession {
    viewport: Viewport,
    snapshot_dir: Option<PathBuf>,
    restored: bool,
}

impl HeadlessSession {
    pub fn new(viewport: Viewport, snapshot_dir: Option<PathBuf>) -> Self {
        Self {
            viewport,
            snapshot_dir,
            restored: false,
        }
    }
}

impl DesktopSession for HeadlessSession {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach(&mut self) -> Result<()> {
        if let Some(dir) = &self.snapshot_dir {
            std::fs::create_dir_all(dir)?;
            info!("Snapshots go to {}", dir.display());
        }
        info!(
            "Attached headless background {}x{}",
            self.viewport.width, self.viewport.height
        );
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            warn!("desktop already restored; ignoring");
            return Ok(());
        }
        self.restored = true;
        info!("Desktop restored");
        Ok(())
    }
}
