// Boucle systray commune a Windows et Linux.
// L'icone change selon l'etat de la lampe (allumee/eteinte).
// Clic gauche sur l'icone ouvre le panneau de controle ; un second clic le masque.
// Les minuteries du controleur continuent d'etre servies fenetre fermee.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
use linux::Tray;
#[cfg(windows)]
use windows::Tray;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::control::LightController;
use crate::gui::state::AppState;
use crate::gui::{window, Controller, TrayCommand, TrayEvents};
use crate::litra::CommandRunner;

/// Periode de la boucle systray
const TRAY_TICK: Duration = Duration::from_millis(50);

/// Libelle de l'entree de statut du menu
fn status_label(lit: bool) -> String {
    if lit {
        crate::t!("gui.status_on")
    } else {
        crate::t!("gui.status_off")
    }
}

/// Ce que la boucle doit afficher apres traitement des evenements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelRequest {
    None,
    Open,
    /// Sans hote systray : panneau autonome, puis sortie a sa fermeture
    Standalone,
}

/// Applique les commandes recues du systray pendant que le panneau est ferme
fn dispatch<R: CommandRunner>(
    commands: Vec<TrayCommand>,
    state: &AppState,
    controller: &RefCell<LightController<R>>,
) -> PanelRequest {
    let mut request = PanelRequest::None;
    for command in commands {
        match command {
            TrayCommand::TogglePanel => {
                if request == PanelRequest::None {
                    request = PanelRequest::Open;
                }
            }
            TrayCommand::TogglePower => {
                // L'echec est deja visible dans le statut et les traces
                let _ = controller.borrow_mut().toggle_power();
            }
            TrayCommand::Quit => state.request_quit(),
            TrayCommand::Unavailable => {
                tracing::warn!("{}", crate::t!("gui.tray_unavailable"));
                request = PanelRequest::Standalone;
            }
        }
    }
    if state.should_quit() {
        PanelRequest::None
    } else {
        request
    }
}

/// Lance la boucle systray. Bloquant jusqu'a la demande de fermeture.
pub fn run_tray(state: Arc<AppState>, controller: Rc<RefCell<Controller>>) {
    let mut was_lit = controller.borrow().state().powered;

    let tray = match Tray::new(was_lit) {
        Ok(tray) => Rc::new(tray),
        Err(e) => {
            tracing::error!("{}", crate::t!("gui.tray_failed", format!("{:#}", e)));
            window::run_window(state, controller, None);
            return;
        }
    };
    let events: Rc<dyn TrayEvents> = tray.clone();

    loop {
        tray.pump();

        match dispatch(tray.poll(), &state, &controller) {
            PanelRequest::Open => {
                window::run_window(Arc::clone(&state), Rc::clone(&controller), Some(Rc::clone(&events)));
            }
            PanelRequest::Standalone => {
                window::run_window(Arc::clone(&state), Rc::clone(&controller), None);
                state.request_quit();
            }
            PanelRequest::None => {}
        }

        controller.borrow_mut().tick(Instant::now());

        if state.should_quit() {
            break;
        }

        let lit = controller.borrow().state().powered;
        if lit != was_lit {
            was_lit = lit;
            tray.set_lit(lit);
        }

        // Attendre 50ms pour ne pas saturer le CPU
        std::thread::sleep(TRAY_TICK);
    }

    // Masquer l'icone avant la sortie du processus
    tray.hide();
    tracing::info!("{}", crate::t!("gui.tray_hidden"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::litra::{CommandResult, LightCommand};

    /// Executeur qui reussit toujours et compte les commandes
    #[derive(Default)]
    struct Counter {
        calls: RefCell<Vec<LightCommand>>,
    }

    impl CommandRunner for Counter {
        fn run(&self, command: &LightCommand) -> CommandResult {
            self.calls.borrow_mut().push(*command);
            CommandResult {
                success: true,
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    fn controller() -> RefCell<LightController<Counter>> {
        RefCell::new(LightController::new(Counter::default(), &ControlConfig::default()))
    }

    #[test]
    fn click_opens_panel() {
        let state = AppState::new();
        let c = controller();
        assert_eq!(dispatch(vec![TrayCommand::TogglePanel], &state, &c), PanelRequest::Open);
        assert_eq!(dispatch(Vec::new(), &state, &c), PanelRequest::None);
    }

    #[test]
    fn menu_quit_stops_loop_without_panel() {
        let state = AppState::new();
        let c = controller();
        let request = dispatch(vec![TrayCommand::TogglePanel, TrayCommand::Quit], &state, &c);
        assert_eq!(request, PanelRequest::None);
        assert!(state.should_quit());
    }

    #[test]
    fn menu_toggle_switches_light() {
        let state = AppState::new();
        let c = controller();
        dispatch(vec![TrayCommand::TogglePower], &state, &c);
        assert!(c.borrow().state().powered);
        dispatch(vec![TrayCommand::TogglePower], &state, &c);
        assert!(!c.borrow().state().powered);
        assert_eq!(c.borrow().runner().calls.borrow()[0], LightCommand::Toggle);
    }

    #[test]
    fn lost_host_falls_back_to_panel() {
        let state = AppState::new();
        let c = controller();
        let request = dispatch(vec![TrayCommand::Unavailable, TrayCommand::TogglePanel], &state, &c);
        assert_eq!(request, PanelRequest::Standalone);
        assert!(!state.should_quit());
    }

    #[test]
    fn menu_status_follows_power() {
        crate::i18n::init("en");
        assert_eq!(status_label(true), "Light is ON");
        assert_ne!(status_label(false), status_label(true));
    }
}
