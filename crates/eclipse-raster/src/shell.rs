//! Stand-in for the tray menu: commands arrive as lines on stdin.
//!
//! `quit` | `exit`      stop after the current frame
//! `pointer X Y`        move the pointer (desktop coordinates)
//! `snapshot`           write the next presented frame

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use eclipse_platform::{InputSource, Viewport};
use glam::Vec2;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellCommand {
    Quit,
    Pointer(Vec2),
    Snapshot,
}

pub fn parse_command(line: &str) -> Option<ShellCommand> {
    let mut words = line.split_whitespace();
    match words.next()?.to_ascii_lowercase().as_str() {
        "quit" | "exit" => Some(ShellCommand::Quit),
        "snapshot" => Some(ShellCommand::Snapshot),
        "pointer" => {
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            Some(ShellCommand::Pointer(Vec2::new(x, y)))
        }
        _ => None,
    }
}

/// Forward commands read from `reader` until it closes or the receiver is gone.
pub fn forward_commands<R: BufRead>(reader: R, sender: &Sender<ShellCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("shell: stopped reading commands: {err}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(command) => {
                if sender.send(command).is_err() {
                    return;
                }
            }
            None => warn!("shell: unknown command {:?}", line.trim()),
        }
    }
}

pub fn spawn_stdin_shell(sender: Sender<ShellCommand>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        forward_commands(stdin.lock(), &sender);
        info!("shell: stdin closed, commands disabled");
    })
}

/// Input source fed by the shell channel, with an optional frame budget.
pub struct ShellInput {
    receiver: Receiver<ShellCommand>,
    viewport: Viewport,
    pointer: Option<Vec2>,
    snapshot_requested: Arc<AtomicBool>,
    frame_limit: Option<u64>,
    polls: u64,
    shutdown: bool,
}

impl ShellInput {
    pub fn new(
        receiver: Receiver<ShellCommand>,
        viewport: Viewport,
        snapshot_requested: Arc<AtomicBool>,
        frame_limit: Option<u64>,
    ) -> Self {
        Self {
            receiver,
            viewport,
            pointer: None,
            snapshot_requested,
            frame_limit,
            polls: 0,
            shutdown: false,
        }
    }
}

impl InputSource for ShellInput {
    fn pointer_position(&mut self) -> Option<Vec2> {
        self.pointer
    }

    fn poll_shutdown(&mut self) -> bool {
        loop {
            match self.receiver.try_recv() {
                Ok(ShellCommand::Quit) => {
                    info!("shell: quit requested");
                    self.shutdown = true;
                }
                Ok(ShellCommand::Pointer(desktop)) => {
                    self.pointer = Some(self.viewport.to_local(desktop));
                }
                Ok(ShellCommand::Snapshot) => {
                    self.snapshot_requested.store(true, Ordering::Relaxed);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        self.polls += 1;
        if let Some(limit) = self.frame_limit {
            if self.polls > limit && !self.shutdown {
                info!("frame limit of {limit} reached");
                self.shutdown = true;
            }
        }
        self.shutdown
    }
}
