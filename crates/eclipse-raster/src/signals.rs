//! Ctrl-C, SIGTERM and SIGHUP arrive as a shell `Quit`, so the frame loop
//! sees them at its next frame boundary and cleanup still runs.

use std::sync::Mutex;

use crossbeam_channel::Sender;
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::shell::ShellCommand;

static ROUTE: OnceCell<Mutex<Option<Sender<ShellCommand>>>> = OnceCell::new();

/// Send termination signals to `sender`. The OS handler is installed on the
/// first call; later calls only swap the destination.
pub fn route_termination_signals(sender: Sender<ShellCommand>) {
    let mut first = false;
    let route = ROUTE.get_or_init(|| {
        first = true;
        Mutex::new(None)
    });
    match route.lock() {
        Ok(mut slot) => *slot = Some(sender),
        Err(_) => warn!("signal route poisoned; termination signals will kill the process"),
    }
    if first {
        if let Err(err) = ctrlc::set_handler(forward_termination) {
            warn!("cannot install termination handler: {err}");
        }
    }
}

/// What the OS handler runs.
pub fn forward_termination() {
    info!("termination signal received");
    let Some(route) = ROUTE.get() else {
        return;
    };
    if let Ok(slot) = route.lock() {
        if let Some(sender) = slot.as_ref() {
            let _ = sender.send(ShellCommand::Quit);
        }
    }
}
