use crossbeam_channel::Sender;
use eclipse_platform::Result;
use eclipse_raster::ShellCommand;
use tracing::{info, warn};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Tray icon with a single "Quit" entry. Keep the icon alive for as long as
/// it should stay in the notification area.
pub fn create_tray_icon() -> Result<(TrayIcon, MenuId)> {
    // 16x16 amber disc on transparent
    let (w, h) = (16u32, 16u32);
    let mut rgba = vec![0u8; (w * h * 4) as usize];
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        let (x, y) = ((i as u32 % w) as f32 - 7.5, (i as u32 / w) as f32 - 7.5);
        if x * x + y * y <= 49.0 {
            px.copy_from_slice(&[255, 191, 64, 255]);
        }
    }
    let icon = Icon::from_rgba(rgba, w, h).map_err(box_err)?;

    let menu = Menu::new();
    let quit_item = MenuItem::new("Quit", true, None);
    let quit_id = quit_item.id().clone();
    menu.append(&quit_item).map_err(box_err)?;

    let tray = TrayIconBuilder::new()
        .with_icon(icon)
        .with_tooltip("Eclipse")
        .with_menu(Box::new(menu))
        .build()
        .map_err(box_err)?;

    Ok((tray, quit_id))
}

/// Turn the tray's Quit entry into a `ShellCommand::Quit` on `sender`.
pub fn route_tray_quit(quit_id: MenuId, sender: Sender<ShellCommand>) {
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        if event.id() == &quit_id {
            info!("Quit selected from tray");
            if sender.send(ShellCommand::Quit).is_err() {
                warn!("command channel closed; frame loop already gone");
            }
        }
    }));
}

#[inline]
pub(crate) fn box_err<E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}
