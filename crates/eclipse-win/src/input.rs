use crossbeam_channel::{Receiver, TryRecvError};
use eclipse_platform::{InputSource, Viewport};
use eclipse_raster::ShellCommand;
use glam::Vec2;
use tracing::{debug, info};
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::UI::WindowsAndMessaging::*;

/// Desktop input: the cursor from `GetCursorPos`, shutdown from the thread's
/// message queue (`WM_QUIT`) or a `Quit` on the command channel.
pub struct WinInput {
    commands: Receiver<ShellCommand>,
    viewport: Viewport,
    quit: bool,
}

impl WinInput {
    pub fn new(commands: Receiver<ShellCommand>, viewport: Viewport) -> Self {
        Self {
            commands,
            viewport,
            quit: false,
        }
    }

    fn pump_messages(&mut self) {
        let mut message = MSG::default();
        unsafe {
            while PeekMessageW(&mut message, HWND(std::ptr::null_mut()), 0, 0, PM_REMOVE).into() {
                if message.message == WM_QUIT {
                    info!("WM_QUIT received");
                    self.quit = true;
                    return;
                }
                let _ = TranslateMessage(&message);
                DispatchMessageW(&message);
            }
        }
    }

    fn drain_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(ShellCommand::Quit) => self.quit = true,
                // the real cursor wins over injected positions on the desktop
                Ok(other) => debug!("ignoring {other:?} on the desktop backend"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl InputSource for WinInput {
    fn pointer_position(&mut self) -> Option<Vec2> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(self.viewport.to_local(Vec2::new(point.x as f32, point.y as f32)))
    }

    fn poll_shutdown(&mut self) -> bool {
        if !self.quit {
            self.pump_messages();
        }
        if !self.quit {
            self.drain_commands();
        }
        self.quit
    }
}
