use std::ffi::c_void;

use eclipse_platform::{DesktopSession, Result, Viewport};
use tracing::{info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{BOOL, HINSTANCE, HWND, LPARAM, LRESULT, MAX_PATH, WPARAM};
use windows::Win32::Graphics::Gdi::HBRUSH;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

pub const WALLPAPER_WINDOW_CLASS_NAME: PCWSTR = w!("EclipseFrameClass");

/// Undocumented Progman message that spawns the WorkerW behind the icons.
const SPAWN_WORKERW: u32 = 0x052C;

/// Size and origin of the whole virtual desktop, across all monitors.
pub fn virtual_screen() -> Viewport {
    unsafe {
        Viewport {
            x: GetSystemMetrics(SM_XVIRTUALSCREEN),
            y: GetSystemMetrics(SM_YVIRTUALSCREEN),
            width: GetSystemMetrics(SM_CXVIRTUALSCREEN).max(1) as u32,
            height: GetSystemMetrics(SM_CYVIRTUALSCREEN).max(1) as u32,
        }
    }
}

pub unsafe extern "system" fn handle_wallpaper_window_message(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        WM_CLOSE => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Borderless tool window covering the virtual desktop. Destroyed on drop.
pub struct WallpaperWindow {
    hwnd_value: isize,
    hinstance_value: isize,
}

impl WallpaperWindow {
    pub fn create(viewport: Viewport) -> Result<Self> {
        unsafe {
            let hinstance = HINSTANCE(GetModuleHandleW(None)?.0);
            let window_class = WNDCLASSW {
                style: CS_OWNDC,
                lpfnWndProc: Some(handle_wallpaper_window_message),
                hInstance: hinstance,
                hbrBackground: HBRUSH(std::ptr::null_mut()),
                lpszClassName: WALLPAPER_WINDOW_CLASS_NAME,
                ..Default::default()
            };
            let _atom = RegisterClassW(&window_class);

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW,
                WALLPAPER_WINDOW_CLASS_NAME,
                w!("Eclipse Frame"),
                WS_POPUP,
                0,
                0,
                viewport.width as i32,
                viewport.height as i32,
                None,
                None,
                hinstance,
                None,
            )?;
            info!(
                "Wallpaper window {}x{} @ ({}, {})",
                viewport.width, viewport.height, viewport.x, viewport.y
            );
            Ok(Self {
                hwnd_value: hwnd.0 as isize,
                hinstance_value: hinstance.0 as isize,
            })
        }
    }

    pub fn hwnd(&self) -> HWND {
        HWND(self.hwnd_value as *mut c_void)
    }
}

impl Drop for WallpaperWindow {
    fn drop(&mut self) {
        unsafe {
            if let Err(err) = DestroyWindow(self.hwnd()) {
                warn!("DestroyWindow failed for wallpaper window: {err}");
            }
            let hinstance = HINSTANCE(self.hinstance_value as *mut c_void);
            let _ = UnregisterClassW(WALLPAPER_WINDOW_CLASS_NAME, hinstance);
        }
    }
}

unsafe extern "system" fn find_worker_proc(top: HWND, lparam: LPARAM) -> BOOL {
    let has_icons = FindWindowExW(top, None, w!("SHELLDLL_DefView"), PCWSTR::null())
        .is_ok_and(|view| !view.0.is_null());
    if has_icons {
        // the WorkerW we want is the next sibling of the one hosting the icons
        if let Ok(worker) = FindWindowExW(None, top, w!("WorkerW"), PCWSTR::null()) {
            let slot = lparam.0 as *mut HWND;
            if !slot.is_null() {
                *slot = worker;
            }
        }
    }
    BOOL(1)
}

/// Window to parent the wallpaper under: the WorkerW behind the desktop
/// icons, or Progman itself when no such WorkerW shows up.
unsafe fn find_wallpaper_host() -> Result<HWND> {
    let progman = FindWindowW(w!("Progman"), PCWSTR::null())?;
    let mut result = 0usize;
    let _ = SendMessageTimeoutW(
        progman,
        SPAWN_WORKERW,
        WPARAM(0),
        LPARAM(0),
        SMTO_NORMAL,
        1000,
        Some(&mut result as *mut usize),
    );

    let mut worker = HWND(std::ptr::null_mut());
    let lparam = LPARAM(&mut worker as *mut HWND as isize);
    if let Err(err) = EnumWindows(Some(find_worker_proc), lparam) {
        warn!("EnumWindows failed while looking for WorkerW: {err}");
    }
    if worker.0.is_null() {
        warn!("no WorkerW behind the desktop icons; parenting under Progman");
        Ok(progman)
    } else {
        Ok(worker)
    }
}

/// Current wallpaper path as a nul-terminated wide string.
fn current_wallpaper() -> Result<Vec<u16>> {
    let mut path = vec![0u16; MAX_PATH as usize];
    unsafe {
        SystemParametersInfoW(
            SPI_GETDESKWALLPAPER,
            path.len() as u32,
            Some(path.as_mut_ptr().cast()),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )?;
    }
    let len = path.iter().position(|&c| c == 0).unwrap_or(path.len());
    path.truncate(len);
    path.push(0);
    Ok(path)
}

fn apply_wallpaper(path: &[u16]) -> Result<()> {
    unsafe {
        SystemParametersInfoW(
            SPI_SETDESKWALLPAPER,
            0,
            Some(path.as_ptr() as *mut c_void),
            SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
        )?;
    }
    Ok(())
}

/// Puts the wallpaper window behind the desktop icons and, on restore,
/// detaches it and re-applies the previous wallpaper so Explorer repaints.
pub struct WinDesktopSession {
    hwnd_value: isize,
    viewport: Viewport,
    original_wallpaper: Option<Vec<u16>>,
    attached: bool,
    restored: bool,
}

impl WinDesktopSession {
    pub fn new(window: &WallpaperWindow, viewport: Viewport) -> Self {
        Self {
            hwnd_value: window.hwnd().0 as isize,
            viewport,
            original_wallpaper: None,
            attached: false,
            restored: false,
        }
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd_value as *mut c_void)
    }
}

impl DesktopSession for WinDesktopSession {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach(&mut self) -> Result<()> {
        match current_wallpaper() {
            Ok(path) => {
                info!(
                    "Current wallpaper: {}",
                    String::from_utf16_lossy(&path[..path.len().saturating_sub(1)])
                );
                self.original_wallpaper = Some(path);
            }
            Err(err) => warn!("cannot read current wallpaper, it will not be restored: {err}"),
        }

        unsafe {
            let host = find_wallpaper_host()?;
            SetParent(self.hwnd(), host)?;
            self.attached = true;
            let _ = ShowWindow(self.hwnd(), SW_SHOW);
        }
        info!("Attached behind the desktop icons");
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            warn!("desktop already restored; ignoring");
            return Ok(());
        }
        self.restored = true;

        if self.attached {
            unsafe {
                let _ = ShowWindow(self.hwnd(), SW_HIDE);
                if let Err(err) = SetParent(self.hwnd(), None) {
                    warn!("SetParent(None) failed: {err}");
                }
            }
        }
        if let Some(path) = &self.original_wallpaper {
            apply_wallpaper(path)?;
        }
        info!("Desktop restored");
        Ok(())
    }
}

