// Panneau de controle egui de la lampe.
// Bouton marche/arret, curseurs de luminosite et de temperature, ligne de statut.
// Les curseurs mettent a jour l'etat et les libelles immediatement ;
// l'envoi a la lampe est differe par les minuteries du controleur.
// La fenetre reste au-dessus des autres et possede l'icone de l'application.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::control::{Severity, Status, BRIGHTNESS_MAX, TEMPERATURE_MAX, TEMPERATURE_MIN};
use crate::gui::state::AppState;
use crate::gui::{icon, Controller, TrayCommand, TrayEvents};

/// Intervalle maximal entre deux rafraichissements (surveillance de l'arret)
const IDLE_REPAINT: Duration = Duration::from_millis(250);

const TURN_ON_FILL: egui::Color32 = egui::Color32::from_rgb(0x4c, 0xaf, 0x50);
const TURN_OFF_FILL: egui::Color32 = egui::Color32::from_rgb(0xf4, 0x43, 0x36);
const WARM_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x98, 0x00);
const COOL_COLOR: egui::Color32 = egui::Color32::from_rgb(0x21, 0x96, 0xf3);

/// Lance la fenetre de controle. Bloquant jusqu'a la fermeture de la fenetre.
/// `tray` est consulte pendant que la fenetre est ouverte, quand une icone systray existe.
pub fn run_window(
    state: Arc<AppState>,
    controller: Rc<RefCell<Controller>>,
    tray: Option<Rc<dyn TrayEvents>>,
) {
    let lit = controller.borrow().state().powered;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([350.0, 300.0])
            .with_resizable(false)
            .with_always_on_top()
            .with_icon(Arc::new(icon::window_icon(lit))),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        &crate::t!("gui.window_title"),
        options,
        Box::new(move |_cc| Ok(Box::new(ControlPanel::new(state, controller, tray)))),
    ) {
        tracing::error!("{}", crate::t!("gui.window_failed", e));
    }
}

/// Texte de la ligne de statut
fn status_text(status: &Status) -> String {
    match status {
        Status::Ready => crate::t!("gui.status_ready"),
        Status::LightOn => crate::t!("gui.status_on"),
        Status::LightOff => crate::t!("gui.status_off"),
        Status::BrightnessApplied(percentage) => crate::t!("gui.brightness_label", percentage),
        Status::TemperatureApplied(kelvin) => crate::t!("gui.temperature_label", kelvin),
        Status::BrightnessFailed(_) => crate::t!("gui.brightness_failed"),
        Status::TemperatureFailed(_) => crate::t!("gui.temperature_failed"),
        Status::PowerFailed { turning_on: true, .. } => crate::t!("gui.turn_on_failed_short"),
        Status::PowerFailed { turning_on: false, .. } => crate::t!("gui.turn_off_failed_short"),
    }
}

fn power_failure_message(turning_on: bool, stderr: &str) -> String {
    let key = if turning_on {
        "gui.turn_on_failed"
    } else {
        "gui.turn_off_failed"
    };
    crate::t!(key, stderr.trim())
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Neutral => egui::Color32::GRAY,
        Severity::Ok => egui::Color32::from_rgb(0, 160, 0),
        Severity::Warning => egui::Color32::from_rgb(255, 165, 0),
        Severity::Error => egui::Color32::from_rgb(220, 0, 0),
    }
}

/// Ce que le panneau doit faire d'un evenement systray recu pendant qu'il est ouvert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    Stay,
    /// Second clic sur l'icone : masquer le panneau
    Close,
    TogglePower,
    Quit,
}

fn panel_action(command: TrayCommand) -> PanelAction {
    match command {
        TrayCommand::TogglePanel => PanelAction::Close,
        TrayCommand::TogglePower => PanelAction::TogglePower,
        TrayCommand::Quit => PanelAction::Quit,
        // La fenetre reste ouverte ; la boucle systray n'est plus la pour la rouvrir
        TrayCommand::Unavailable => PanelAction::Stay,
    }
}

/// Application egui du panneau de controle
struct ControlPanel {
    state: Arc<AppState>,
    controller: Rc<RefCell<Controller>>,
    tray: Option<Rc<dyn TrayEvents>>,
    /// Valeurs des curseurs, resynchronisees depuis le controleur a chaque image
    brightness: u8,
    temperature: u16,
    /// Message du dialogue d'erreur d'allumage/extinction
    error_dialog: Option<String>,
}

impl ControlPanel {
    fn new(
        state: Arc<AppState>,
        controller: Rc<RefCell<Controller>>,
        tray: Option<Rc<dyn TrayEvents>>,
    ) -> Self {
        let current = controller.borrow().state();
        Self {
            state,
            controller,
            tray,
            brightness: current.brightness,
            temperature: current.temperature,
            error_dialog: None,
        }
    }

    /// Traite les evenements systray pendant que la fenetre est ouverte
    fn drain_tray_events(&mut self, ctx: &egui::Context) {
        let Some(tray) = &self.tray else {
            return;
        };

        for command in tray.poll() {
            match panel_action(command) {
                PanelAction::Close => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                PanelAction::TogglePower => {
                    let turning_on = !self.controller.borrow().state().powered;
                    if let Err(result) = self.controller.borrow_mut().toggle_power() {
                        self.error_dialog = Some(power_failure_message(turning_on, &result.stderr));
                    }
                }
                PanelAction::Quit => self.state.request_quit(),
                PanelAction::Stay => {}
            }
        }
    }

    fn show_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_dialog.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(crate::t!("gui.error_title"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(severity_color(Severity::Error), message);
                ui.add_space(6.0);
                if ui.button(crate::t!("gui.ok")).clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.error_dialog = None;
        }
    }
}

impl eframe::App for ControlPanel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.drain_tray_events(ctx);

        let controller = Rc::clone(&self.controller);
        let mut controller = controller.borrow_mut();
        controller.tick(now);

        let current = controller.state();
        self.brightness = current.brightness;
        self.temperature = current.temperature;

        egui::CentralPanel::default().show(ctx, |ui| {
            let width = ui.available_width();

            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new(crate::t!("gui.window_title")).strong());
            });
            ui.add_space(12.0);

            // Bouton marche/arret : son aspect suit toujours l'etat reel de la lampe
            let (label, fill) = if current.powered {
                (crate::t!("gui.turn_off"), TURN_OFF_FILL)
            } else {
                (crate::t!("gui.turn_on"), TURN_ON_FILL)
            };
            let power = egui::Button::new(
                egui::RichText::new(label).size(14.0).color(egui::Color32::WHITE),
            )
            .fill(fill);
            if ui.add_sized([width, 40.0], power).clicked() {
                if let Err(result) = controller.set_power(!current.powered) {
                    self.error_dialog = Some(power_failure_message(!current.powered, &result.stderr));
                }
            }

            ui.add_space(12.0);

            ui.label(egui::RichText::new(crate::t!("gui.brightness_label", self.brightness)).strong());
            let brightness = egui::Slider::new(&mut self.brightness, 0..=BRIGHTNESS_MAX).show_value(false);
            if ui.add_sized([width, 20.0], brightness).changed() {
                controller.set_brightness(self.brightness, now);
            }

            ui.add_space(12.0);

            ui.label(egui::RichText::new(crate::t!("gui.temperature_label", self.temperature)).strong());
            let temperature = egui::Slider::new(&mut self.temperature, TEMPERATURE_MIN..=TEMPERATURE_MAX)
                .step_by(100.0)
                .show_value(false);
            if ui.add_sized([width, 20.0], temperature).changed() {
                self.temperature = controller.set_temperature(u32::from(self.temperature), now);
            }
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(crate::t!("gui.warm")).small().color(WARM_COLOR));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(crate::t!("gui.cool")).small().color(COOL_COLOR));
                });
            });

            ui.add_space(10.0);

            let status = controller.status();
            ui.vertical_centered(|ui| {
                let line = ui.label(
                    egui::RichText::new(status_text(status))
                        .small()
                        .color(severity_color(status.severity())),
                );
                if let Some(detail) = status.detail() {
                    line.on_hover_text(detail);
                }
            });
        });

        // Reveiller la boucle a la prochaine echeance d'envoi
        let wake = controller
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(IDLE_REPAINT)
            .min(IDLE_REPAINT);
        drop(controller);
        ctx.request_repaint_after(wake);

        self.show_error_dialog(ctx);

        if self.state.should_quit() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_carries_values() {
        crate::i18n::init("en");
        assert_eq!(status_text(&Status::BrightnessApplied(81)), "Brightness: 81%");
        assert_eq!(status_text(&Status::TemperatureApplied(3000)), "Temperature: 3000K");
        assert_eq!(status_text(&Status::LightOn), "Light is ON");
        assert_eq!(
            status_text(&Status::BrightnessFailed("x".to_string())),
            "Brightness failed"
        );
    }

    #[test]
    fn second_tray_click_hides_panel() {
        assert_eq!(panel_action(TrayCommand::TogglePanel), PanelAction::Close);
        assert_eq!(panel_action(TrayCommand::Quit), PanelAction::Quit);
        assert_eq!(panel_action(TrayCommand::TogglePower), PanelAction::TogglePower);
        assert_eq!(panel_action(TrayCommand::Unavailable), PanelAction::Stay);
    }

    #[test]
    fn power_failure_names_direction_and_cause() {
        crate::i18n::init("en");
        let on = power_failure_message(true, "device busy\n");
        let off = power_failure_message(false, "device busy");
        assert!(on.contains("device busy"));
        assert!(!on.ends_with('\n'));
        assert_ne!(on, off);
    }

    #[test]
    fn failures_are_not_green() {
        let ok = severity_color(Severity::Ok);
        assert_ne!(severity_color(Status::TemperatureFailed(String::new()).severity()), ok);
        assert_ne!(
            severity_color(
                Status::PowerFailed {
                    turning_on: true,
                    detail: String::new()
                }
                .severity()
            ),
            ok
        );
    }
}
