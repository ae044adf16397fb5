// Icone systray Linux via le protocole StatusNotifierItem (KDE Plasma, GNOME avec extension).
// Le service D-Bus tourne sur son propre thread ; les clics sont relayes
// a la boucle systray du thread principal par un canal.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use ksni::menu::{MenuItem, StandardItem};

use super::status_label;
use crate::gui::{icon, TrayCommand, TrayEvents};

/// Etat expose au service StatusNotifierItem
struct StatusItem {
    lit: bool,
    sender: Sender<TrayCommand>,
}

impl StatusItem {
    fn send(&self, command: TrayCommand) {
        // La boucle principale est peut-etre deja terminee
        let _ = self.sender.send(command);
    }

    fn action(label: String, command: TrayCommand) -> MenuItem<Self> {
        StandardItem {
            label,
            activate: Box::new(move |item: &mut Self| item.send(command)),
            ..Default::default()
        }
        .into()
    }
}

impl ksni::Tray for StatusItem {
    fn id(&self) -> String {
        env!("CARGO_PKG_NAME").into()
    }

    fn title(&self) -> String {
        crate::t!("gui.window_title")
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        vec![icon::tray_pixmap(self.lit)]
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: crate::t!("gui.tooltip"),
            description: status_label(self.lit),
            ..Default::default()
        }
    }

    /// Clic gauche
    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(TrayCommand::TogglePanel);
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        vec![
            StandardItem {
                label: status_label(self.lit),
                enabled: false,
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            Self::action(crate::t!("gui.controls"), TrayCommand::TogglePanel),
            Self::action(crate::t!("gui.toggle_light"), TrayCommand::TogglePower),
            MenuItem::Separator,
            Self::action(crate::t!("gui.quit"), TrayCommand::Quit),
        ]
    }
}

pub struct Tray {
    handle: ksni::Handle<StatusItem>,
    events: Receiver<TrayCommand>,
}

impl Tray {
    pub fn new(lit: bool) -> Result<Self> {
        let (sender, events) = mpsc::channel();
        let service = ksni::TrayService::new(StatusItem {
            lit,
            sender: sender.clone(),
        });
        let handle = service.handle();

        std::thread::Builder::new()
            .name("tray".into())
            .spawn(move || {
                if let Err(e) = service.run() {
                    tracing::error!("{}", crate::t!("gui.tray_thread_failed", e));
                    let _ = sender.send(TrayCommand::Unavailable);
                }
            })
            .context("tray thread")?;

        Ok(Self { handle, events })
    }

    /// Le service D-Bus a son propre thread, rien a pomper ici
    pub fn pump(&self) {}

    pub fn set_lit(&self, lit: bool) {
        self.handle.update(|item| item.lit = lit);
    }

    pub fn hide(&self) {
        self.handle.shutdown();
    }
}

impl TrayEvents for Tray {
    fn poll(&self) -> Vec<TrayCommand> {
        self.events.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksni::Tray as _;

    fn item(lit: bool) -> (StatusItem, Receiver<TrayCommand>) {
        let (sender, events) = mpsc::channel();
        (StatusItem { lit, sender }, events)
    }

    #[test]
    fn left_click_toggles_panel() {
        let (mut tray, events) = item(false);
        tray.activate(0, 0);
        assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![TrayCommand::TogglePanel]);
    }

    #[test]
    fn menu_entries_send_commands() {
        crate::i18n::init("en");
        let (mut tray, events) = item(true);
        let menu = tray.menu();
        assert_eq!(menu.len(), 6);

        for entry in menu {
            if let MenuItem::Standard(standard) = entry {
                (standard.activate)(&mut tray);
            }
        }
        // L'entree de statut est desactivee mais son action par defaut ne fait rien
        assert_eq!(
            events.try_iter().collect::<Vec<_>>(),
            vec![TrayCommand::TogglePanel, TrayCommand::TogglePower, TrayCommand::Quit]
        );
    }

    #[test]
    fn tooltip_reports_light_state() {
        crate::i18n::init("en");
        let (tray, _events) = item(true);
        assert_eq!(tray.tool_tip().description, "Light is ON");
    }
}
