// Module GUI — dispatch selon la plateforme.
// Windows et Linux : icone systray + panneau de controle egui a la demande
// Autres plateformes : panneau de controle egui directement

pub mod icon;
pub mod state;
pub mod window;

#[cfg(any(windows, target_os = "linux"))]
pub mod tray;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use eframe::egui;

use crate::control::LightController;
use crate::litra::LitraCli;
use state::AppState;

/// Controleur de production, partage entre le systray et la fenetre (thread principal uniquement)
pub type Controller = LightController<LitraCli>;

/// Actions demandees depuis l'icone systray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub enum TrayCommand {
    /// Clic gauche ou entree "Controles" : afficher ou masquer le panneau
    TogglePanel,
    TogglePower,
    Quit,
    /// Plus aucun hote systray ne peut afficher l'icone
    Unavailable,
}

/// Source d'evenements du systray, consultee par la boucle systray et par le panneau ouvert
pub trait TrayEvents {
    fn poll(&self) -> Vec<TrayCommand>;
}

/// Lance l'interface graphique appropriee selon la plateforme.
/// Cette fonction est bloquante et doit etre appelee sur le thread principal.
pub fn run_gui(state: Arc<AppState>, controller: Controller) {
    let controller = Rc::new(RefCell::new(controller));

    #[cfg(any(windows, target_os = "linux"))]
    {
        tray::run_tray(state, Rc::clone(&controller));
    }

    #[cfg(not(any(windows, target_os = "linux")))]
    {
        window::run_window(state, Rc::clone(&controller), None);
    }

    // Les valeurs encore tamponnees partent avant la sortie
    let flushed = controller.borrow_mut().flush();
    if !flushed.is_empty() {
        tracing::info!("{}", crate::t!("gui.flushed_pending", flushed.len()));
    }
}

/// Affiche une erreur bloquante avant toute creation du systray.
/// Retourne quand l'utilisateur ferme la fenetre.
pub fn show_fatal_error(title: &str, message: &str) {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([380.0, 160.0])
            .with_resizable(false)
            .with_always_on_top()
            .with_icon(Arc::new(icon::window_icon(false))),
        ..Default::default()
    };

    let message = message.to_string();
    if let Err(e) = eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(FatalErrorApp { message }))),
    ) {
        tracing::error!("{}", crate::t!("gui.window_failed", e));
    }
}

struct FatalErrorApp {
    message: String,
}

impl eframe::App for FatalErrorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            ui.colored_label(egui::Color32::from_rgb(220, 0, 0), self.message.as_str());
            ui.add_space(16.0);
            ui.vertical_centered(|ui| {
                if ui.button(crate::t!("gui.ok")).clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }
}
