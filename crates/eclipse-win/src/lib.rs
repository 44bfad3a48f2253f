//! Windows desktop platform for Eclipse: the sky is drawn behind the
//! desktop icons, the cursor pushes stars around, and a tray icon quits.
#![cfg(windows)]

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use eclipse_platform::Result;
use eclipse_raster::{
    build_frame_loop, load_settings, route_termination_signals, PixmapBackend, RunOptions,
    ShellCommand, SnapshotPolicy,
};
use tracing::{info, warn};

mod blit;
mod desktop;
mod input;
mod tray;

pub use crate::blit::WinBackend;
pub use crate::desktop::{virtual_screen, WallpaperWindow, WinDesktopSession};
pub use crate::input::WinInput;
pub use crate::tray::{create_tray_icon, route_tray_quit};

/// Run the sky as the desktop wallpaper until Quit from the tray, Ctrl-C,
/// or `WM_QUIT`. The previous wallpaper is put back on the way out.
pub fn run_app(options: RunOptions) -> Result<()> {
    let settings = load_settings(&options)?;
    let viewport = virtual_screen();

    let (command_sender, command_receiver) = crossbeam_channel::unbounded::<ShellCommand>();
    route_termination_signals(command_sender.clone());
    let (tray, quit_id) = create_tray_icon()?;
    route_tray_quit(quit_id, command_sender);
    info!("tray icon created");

    let snapshots = SnapshotPolicy {
        dir: options.snapshot_dir.clone(),
        every: options.snapshot_every,
        requested: Arc::new(AtomicBool::new(false)),
    };
    // Everything fallible is built before the session attaches.
    let raster = PixmapBackend::new(viewport.width, viewport.height, snapshots)?;
    let window = WallpaperWindow::create(viewport)?;
    let backend = WinBackend::new(raster, window.hwnd());
    let input = WinInput::new(command_receiver, viewport);
    let mut frame_loop = build_frame_loop(&settings, viewport, backend, input);

    let mut session = WinDesktopSession::new(&window, viewport);
    let outcome = frame_loop.run_attached(&mut session, |_, stats| {
        info!("frame loop stopped after {} frames", stats.frames);
    });

    drop(frame_loop);
    drop(window);
    drop(tray);
    match outcome {
        Ok(stats) => {
            info!("Eclipse stopped after {} frames", stats.frames);
            Ok(())
        }
        Err(err) => {
            warn!("Eclipse stopped on error: {err}");
            Err(err)
        }
    }
}
