//! Headless platform implementation for Eclipse: a software-rasterized
//! background, a stdin command shell in place of the tray menu, and PNG
//! snapshots in place of the wallpaper.
use std::io::ErrorKind;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use eclipse_core::{FrameLoop, FramePacer, FrameStats, Settings, SettingsError, StarRng, Starfield};
use eclipse_platform::{InputSource, RenderBackend, Result, Viewport};
use tracing::{info, warn};

mod backend;
mod options;
mod session;
mod shell;
mod signals;

pub use crate::backend::{PixmapBackend, SnapshotPolicy};
pub use crate::options::{RunOptions, USAGE};
pub use crate::session::HeadlessSession;
pub use crate::shell::{forward_commands, parse_command, spawn_stdin_shell, ShellCommand, ShellInput};
pub use crate::signals::{forward_termination, route_termination_signals};

/// Settings from disk, or defaults when the file does not exist.
pub fn load_settings(options: &RunOptions) -> Result<Settings> {
    match Settings::load(&options.settings_path) {
        Ok(settings) => Ok(settings),
        Err(SettingsError::Io { path, source }) if source.kind() == ErrorKind::NotFound => {
            warn!("{} not found; using default settings", path.display());
            Ok(Settings::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Seed the sky from `settings` and build a paced frame loop over it.
pub fn build_frame_loop<B, I>(settings: &Settings, viewport: Viewport, backend: B, input: I) -> FrameLoop<B, I>
where
    B: RenderBackend,
    I: InputSource,
{
    let mut rng = match settings.seed {
        Some(seed) => StarRng::new(seed),
        None => StarRng::from_entropy(),
    };
    let starfield = Starfield::new(settings, viewport.size(), &mut rng);
    FrameLoop::new(starfield, backend, input, FramePacer::new(settings.target_interval()))
}

/// Load settings, wire stdin and termination signals into one command
/// channel, and run headless until shutdown.
pub fn run_app(options: RunOptions) -> Result<()> {
    let settings = load_settings(&options)?;

    let (command_sender, command_receiver) = crossbeam_channel::unbounded::<ShellCommand>();
    route_termination_signals(command_sender.clone());
    if options.stdin_shell {
        // Detached: the thread blocks on stdin and dies with the process.
        let _shell = spawn_stdin_shell(command_sender);
        info!("Shell ready: quit | pointer X Y | snapshot");
    } else {
        drop(command_sender);
    }

    let stats = run_headless(&settings, &options, command_receiver)?;
    info!("Eclipse stopped after {} frames", stats.frames);
    Ok(())
}

/// Run frames against a pixmap until a `Quit` arrives on `commands` or the
/// frame budget is spent. The session is restored exactly once.
pub fn run_headless(
    settings: &Settings,
    options: &RunOptions,
    commands: Receiver<ShellCommand>,
) -> Result<FrameStats> {
    let viewport = Viewport::new(options.width, options.height);
    let snapshots = SnapshotPolicy {
        dir: options.snapshot_dir.clone(),
        every: options.snapshot_every,
        requested: Arc::new(AtomicBool::new(false)),
    };
    // Everything fallible is built before the session attaches.
    let backend = PixmapBackend::new(viewport.width, viewport.height, snapshots.clone())?;
    let input = ShellInput::new(
        commands,
        viewport,
        Arc::clone(&snapshots.requested),
        options.frames,
    );
    let mut frame_loop = build_frame_loop(settings, viewport, backend, input);

    let mut session = HeadlessSession::new(viewport, options.snapshot_dir.clone());
    frame_loop.run_attached(&mut session, |backend, stats| {
        if stats.frames == 0 {
            return;
        }
        if let Err(err) = backend.write_snapshot() {
            warn!("failed to write final frame: {err}");
        }
    })
}
