use std::ffi::c_void;
use std::mem::size_of;

use eclipse_platform::{RenderBackend, Result, Rgba};
use eclipse_raster::PixmapBackend;
use glam::Vec2;
use tracing::warn;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    GetDC, ReleaseDC, SetDIBitsToDevice, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
};

/// Rasterizes into a pixmap and copies each finished frame onto the
/// wallpaper window with GDI.
pub struct WinBackend {
    raster: PixmapBackend,
    hwnd_value: isize,
    width: u32,
    height: u32,
    bgra: Vec<u8>,
}

impl WinBackend {
    pub fn new(raster: PixmapBackend, hwnd: HWND) -> Self {
        let (width, height) = (raster.pixmap().width(), raster.pixmap().height());
        Self {
            raster,
            hwnd_value: hwnd.0 as isize,
            width,
            height,
            bgra: Vec::new(),
        }
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd_value as *mut c_void)
    }

    fn blit(&mut self) -> Result<()> {
        self.raster.copy_bgra(&mut self.bgra);
        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: self.width as i32,
                // negative height: rows run top-down
                biHeight: -(self.height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        unsafe {
            let hdc = GetDC(self.hwnd());
            if hdc.0.is_null() {
                return Err("GetDC failed for wallpaper window".into());
            }
            let lines = SetDIBitsToDevice(
                hdc,
                0,
                0,
                self.width,
                self.height,
                0,
                0,
                0,
                self.height,
                self.bgra.as_ptr().cast(),
                &info,
                DIB_RGB_COLORS,
            );
            ReleaseDC(self.hwnd(), hdc);
            if lines == 0 {
                warn!("SetDIBitsToDevice copied no scan lines");
            }
        }
        Ok(())
    }
}

impl RenderBackend for WinBackend {
    fn clear(&mut self) -> Result<()> {
        self.raster.clear()
    }

    fn set_projection(&mut self, width: f32, height: f32) -> Result<()> {
        self.raster.set_projection(width, height)
    }

    fn fill_triangle_fan(&mut self, vertices: &[Vec2], color: Rgba) -> Result<()> {
        self.raster.fill_triangle_fan(vertices, color)
    }

    fn present(&mut self) -> Result<()> {
        self.raster.present()?;
        self.blit()
    }
}
