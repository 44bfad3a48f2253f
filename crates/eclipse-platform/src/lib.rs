//! Platform abstraction traits so `eclipse-core` never touches a window, a desktop or a device.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Straight (non-premultiplied) RGBA, each channel nominally in `[0, 1]`.
pub type Rgba = Vec4;

/// Pixel rectangle the wallpaper covers. `x`/`y` are the origin of the virtual
/// desktop so pointer coordinates can be shifted into viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Translate a desktop-space point into viewport space.
    pub fn to_local(&self, desktop: Vec2) -> Vec2 {
        desktop - Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Immediate-mode 2-D drawing surface.
pub trait RenderBackend {
    fn clear(&mut self) -> Result<()>;
    /// Orthographic projection over `[0, width] x [0, height]`, y pointing down.
    fn set_projection(&mut self, width: f32, height: f32) -> Result<()>;
    /// Fill a triangle fan. `vertices[0]` is the hub; needs at least 3 vertices.
    fn fill_triangle_fan(&mut self, vertices: &[Vec2], color: Rgba) -> Result<()>;
    fn present(&mut self) -> Result<()>;
}

/// Non-blocking per-frame input.
pub trait InputSource {
    /// Pointer in viewport space, `None` when the shell cannot tell.
    fn pointer_position(&mut self) -> Option<Vec2>;
    /// Drain pending shell events; `true` once shutdown was requested.
    fn poll_shutdown(&mut self) -> bool;
}

/// Takes over the desktop background and gives it back.
pub trait DesktopSession {
    fn viewport(&self) -> Viewport;
    fn attach(&mut self) -> Result<()>;
    /// Called exactly once after the frame loop has exited.
    fn restore(&mut self) -> Result<()>;
}
