// Etat de controle de la lampe et logique d'envoi des commandes.
// Les changements de luminosite et de temperature sont appliques immediatement
// a l'etat local puis envoyes a l'outil apres 500ms d'inactivite sur l'axe.
// L'allumage/extinction est envoye sans delai.

use std::time::{Duration, Instant};

use crate::config::ControlConfig;
use crate::debounce::Debouncer;
use crate::litra::{CommandResult, CommandRunner, LightCommand};

pub const BRIGHTNESS_MAX: u8 = 100;
pub const TEMPERATURE_MIN: u16 = 2700;
pub const TEMPERATURE_MAX: u16 = 6500;
pub const TEMPERATURE_STEP: u16 = 100;

/// Ramene une temperature dans [2700, 6500] puis l'arrondit a la centaine la plus proche.
/// Les demi-centaines sont arrondies vers la centaine paire (3050 -> 3000, 3150 -> 3200).
pub fn quantize_temperature(kelvin: u32) -> u16 {
    let clamped = kelvin.clamp(u32::from(TEMPERATURE_MIN), u32::from(TEMPERATURE_MAX));
    let step = u32::from(TEMPERATURE_STEP);
    let (hundreds, rest) = (clamped / step, clamped % step);
    let rounded = if rest > step / 2 || (rest == step / 2 && hundreds % 2 == 1) {
        hundreds + 1
    } else {
        hundreds
    };
    // clamped <= 6500, donc le resultat tient dans un u16
    (rounded * step) as u16
}

/// Etat connu de la lampe, jamais persiste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub powered: bool,
    pub brightness: u8,
    pub temperature: u16,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            powered: false,
            brightness: 50,
            temperature: 4500,
        }
    }
}

/// Axes reglables independamment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Brightness,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Neutral,
    Ok,
    Warning,
    Error,
}

/// Derniere information affichee dans la ligne de statut
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    LightOn,
    LightOff,
    BrightnessApplied(u8),
    TemperatureApplied(u16),
    BrightnessFailed(String),
    TemperatureFailed(String),
    PowerFailed { turning_on: bool, detail: String },
}

impl Status {
    pub fn severity(&self) -> Severity {
        match self {
            Status::Ready => Severity::Neutral,
            Status::LightOn | Status::BrightnessApplied(_) | Status::TemperatureApplied(_) => {
                Severity::Ok
            }
            Status::LightOff | Status::PowerFailed { .. } => Severity::Error,
            Status::BrightnessFailed(_) | Status::TemperatureFailed(_) => Severity::Warning,
        }
    }

    /// Sortie d'erreur de l'outil, pour les statuts d'echec
    pub fn detail(&self) -> Option<&str> {
        match self {
            Status::BrightnessFailed(detail)
            | Status::TemperatureFailed(detail)
            | Status::PowerFailed { detail, .. } => Some(detail.trim()).filter(|d| !d.is_empty()),
            _ => None,
        }
    }
}

/// Machine a etats de controle : etat local, une minuterie par axe, et l'executeur de commandes.
pub struct LightController<R> {
    runner: R,
    state: DeviceState,
    brightness: Debouncer<u8>,
    temperature: Debouncer<u16>,
    apply_while_off: bool,
    status: Status,
}

impl<R: CommandRunner> LightController<R> {
    pub fn new(runner: R, config: &ControlConfig) -> Self {
        let delay = Duration::from_millis(config.debounce_ms);
        Self {
            runner,
            state: DeviceState {
                powered: false,
                brightness: config.brightness.min(BRIGHTNESS_MAX),
                temperature: quantize_temperature(u32::from(config.temperature)),
            },
            brightness: Debouncer::new(delay),
            temperature: Debouncer::new(delay),
            apply_while_off: config.apply_while_off,
            status: Status::Ready,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    #[cfg(test)]
    pub fn is_pending(&self, axis: Axis) -> bool {
        match axis {
            Axis::Brightness => self.brightness.is_pending(),
            Axis::Temperature => self.temperature.is_pending(),
        }
    }

    /// Prochaine echeance parmi les deux axes, pour planifier le rafraichissement de l'interface
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.brightness.deadline(), self.temperature.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn should_dispatch(&self) -> bool {
        self.state.powered || self.apply_while_off
    }

    pub fn set_brightness(&mut self, percentage: u8, now: Instant) {
        let percentage = percentage.min(BRIGHTNESS_MAX);
        self.state.brightness = percentage;
        if self.should_dispatch() {
            self.brightness.schedule(percentage, now);
        }
    }

    /// Quantifie et tamponne une temperature, retourne la valeur retenue
    pub fn set_temperature(&mut self, kelvin: u32, now: Instant) -> u16 {
        let kelvin = quantize_temperature(kelvin);
        self.state.temperature = kelvin;
        if self.should_dispatch() {
            self.temperature.schedule(kelvin, now);
        }
        kelvin
    }

    /// Envoie les valeurs dont l'echeance est passee. Retourne les axes envoyes.
    pub fn tick(&mut self, now: Instant) -> Vec<Axis> {
        let mut fired = Vec::new();
        if let Some(percentage) = self.brightness.poll(now) {
            self.apply_brightness(percentage);
            fired.push(Axis::Brightness);
        }
        if let Some(kelvin) = self.temperature.poll(now) {
            self.apply_temperature(kelvin);
            fired.push(Axis::Temperature);
        }
        fired
    }

    /// Envoie tout de suite les valeurs encore en attente, avant la sortie du processus
    pub fn flush(&mut self) -> Vec<Axis> {
        let mut fired = Vec::new();
        if let Some(percentage) = self.brightness.take() {
            self.apply_brightness(percentage);
            fired.push(Axis::Brightness);
        }
        if let Some(kelvin) = self.temperature.take() {
            self.apply_temperature(kelvin);
            fired.push(Axis::Temperature);
        }
        fired
    }

    fn apply_brightness(&mut self, percentage: u8) -> bool {
        tracing::debug!("{}", crate::t!("control.applying_brightness", percentage));
        let result = self.runner.run(&LightCommand::Brightness(percentage));
        let success = result.success;
        if success {
            self.status = Status::BrightnessApplied(percentage);
        } else {
            tracing::warn!("{}", crate::t!("control.brightness_failed", result.stderr.trim()));
            self.status = Status::BrightnessFailed(result.stderr);
        }
        success
    }

    fn apply_temperature(&mut self, kelvin: u16) -> bool {
        tracing::debug!("{}", crate::t!("control.applying_temperature", kelvin));
        let result = self.runner.run(&LightCommand::Temperature(kelvin));
        let success = result.success;
        if success {
            self.status = Status::TemperatureApplied(kelvin);
        } else {
            tracing::warn!("{}", crate::t!("control.temperature_failed", result.stderr.trim()));
            self.status = Status::TemperatureFailed(result.stderr);
        }
        success
    }

    /// Allume ou eteint la lampe sans delai.
    /// Apres un allumage reussi, les valeurs tamponnees sont reappliquees
    /// et les minuteries en attente sont annulees.
    /// En cas d'echec l'etat `powered` reste inchange.
    pub fn set_power(&mut self, on: bool) -> Result<(), CommandResult> {
        let command = if on { LightCommand::On } else { LightCommand::Off };
        self.switch(command, on)
    }

    /// Inverse l'etat via la sous-commande `toggle` de l'outil.
    /// Meme politique que `set_power` : reapplication a l'allumage, etat inchange en cas d'echec.
    pub fn toggle_power(&mut self) -> Result<(), CommandResult> {
        let on = !self.state.powered;
        self.switch(LightCommand::Toggle, on)
    }

    fn switch(&mut self, command: LightCommand, on: bool) -> Result<(), CommandResult> {
        let result = self.runner.run(&command);

        if !result.success {
            tracing::error!("{}", crate::t!("control.power_failed", result.stderr.trim()));
            self.status = Status::PowerFailed {
                turning_on: on,
                detail: result.stderr.clone(),
            };
            return Err(result);
        }

        self.state.powered = on;
        tracing::info!("{}", crate::t!(if on { "control.light_on" } else { "control.light_off" }));

        if on {
            self.brightness.cancel();
            self.temperature.cancel();
            let brightness_ok = self.apply_brightness(self.state.brightness);
            let brightness_status = self.status.clone();
            let temperature_ok = self.apply_temperature(self.state.temperature);
            if brightness_ok && temperature_ok {
                self.status = Status::LightOn;
            } else if !brightness_ok {
                // Garder le premier echec visible
                self.status = brightness_status;
            }
        } else {
            self.status = Status::LightOff;
        }
        Ok(())
    }
}
