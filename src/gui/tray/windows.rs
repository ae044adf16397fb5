// Icone systray Windows avec menu contextuel.
// Utilise tray-icon pour l'icone et une boucle de messages Win32.

use anyhow::{Context, Result};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent,
};

use super::status_label;
use crate::gui::{icon, TrayCommand, TrayEvents};

pub struct Tray {
    icon: TrayIcon,
    status_item: MenuItem,
    controls_id: MenuId,
    toggle_id: MenuId,
    quit_id: MenuId,
}

impl Tray {
    pub fn new(lit: bool) -> Result<Self> {
        // Construction du menu contextuel
        let status_item = MenuItem::new(status_label(lit), false, None);
        let controls_item = MenuItem::new(crate::t!("gui.controls"), true, None);
        let toggle_item = MenuItem::new(crate::t!("gui.toggle_light"), true, None);
        let quit_item = MenuItem::new(crate::t!("gui.quit"), true, None);

        let menu = Menu::new();
        menu.append_items(&[
            &status_item,
            &PredefinedMenuItem::separator(),
            &controls_item,
            &toggle_item,
            &PredefinedMenuItem::separator(),
            &quit_item,
        ])
        .context("tray menu")?;

        let mut builder = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .with_tooltip(crate::t!("gui.tooltip"));
        if let Some(initial) = icon::tray_icon(lit) {
            builder = builder.with_icon(initial);
        }
        let icon = builder.build().context("tray icon")?;

        Ok(Self {
            icon,
            status_item,
            controls_id: controls_item.id().clone(),
            toggle_id: toggle_item.id().clone(),
            quit_id: quit_item.id().clone(),
        })
    }

    /// Traitement des messages Windows (necessaire pour le systray)
    pub fn pump(&self) {
        unsafe {
            let mut msg: winapi::um::winuser::MSG = std::mem::zeroed();
            while winapi::um::winuser::PeekMessageW(
                &mut msg,
                std::ptr::null_mut(),
                0,
                0,
                winapi::um::winuser::PM_REMOVE,
            ) != 0
            {
                winapi::um::winuser::TranslateMessage(&msg);
                winapi::um::winuser::DispatchMessageW(&msg);
            }
        }
    }

    pub fn set_lit(&self, lit: bool) {
        if let Some(new_icon) = icon::tray_icon(lit) {
            let _ = self.icon.set_icon(Some(new_icon));
        }
        self.status_item.set_text(status_label(lit));
    }

    pub fn hide(&self) {
        let _ = self.icon.set_visible(false);
    }
}

impl TrayEvents for Tray {
    fn poll(&self) -> Vec<TrayCommand> {
        let mut commands = Vec::new();

        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            if matches!(
                event,
                TrayIconEvent::Click {
                    button: MouseButton::Left,
                    button_state: MouseButtonState::Up,
                    ..
                }
            ) {
                commands.push(TrayCommand::TogglePanel);
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            if event.id == self.controls_id {
                commands.push(TrayCommand::TogglePanel);
            } else if event.id == self.toggle_id {
                commands.push(TrayCommand::TogglePower);
            } else if event.id == self.quit_id {
                commands.push(TrayCommand::Quit);
            }
        }

        commands
    }
}
