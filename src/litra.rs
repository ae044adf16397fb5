// Passerelle vers l'outil en ligne de commande `litra`.
// Chaque appel lance un sous-processus, attend sa fin (5 secondes maximum)
// et retourne le code de sortie avec les sorties capturees. Aucun retry.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use crate::config::ToolConfig;

/// Message retourne quand le sous-processus depasse le delai
pub const TIMED_OUT: &str = "Command timed out";

/// Sous-commandes supportees par l'outil externe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    Version,
    On,
    Off,
    Toggle,
    /// Luminosite en pourcentage (0-100)
    Brightness(u8),
    /// Temperature de couleur en Kelvin (multiple de 100, 2700-6500)
    Temperature(u16),
}

impl LightCommand {
    /// Vecteur d'arguments passe a l'executable
    pub fn args(&self) -> Vec<String> {
        match self {
            LightCommand::Version => vec!["--version".to_string()],
            LightCommand::On => vec!["on".to_string()],
            LightCommand::Off => vec!["off".to_string()],
            LightCommand::Toggle => vec!["toggle".to_string()],
            LightCommand::Brightness(percentage) => vec![
                "brightness".to_string(),
                "--percentage".to_string(),
                percentage.to_string(),
            ],
            LightCommand::Temperature(kelvin) => vec![
                "temperature".to_string(),
                "--value".to_string(),
                kelvin.to_string(),
            ],
        }
    }
}

/// Resultat d'un appel a l'outil externe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Execute une commande lumiere et retourne son resultat.
/// Implemente par `LitraCli` en production et par un enregistreur dans les tests.
pub trait CommandRunner {
    fn run(&self, command: &LightCommand) -> CommandResult;
}

/// Executeur de production : lance l'executable configure.
/// Un runtime tokio mono-thread sert uniquement a borner l'attente du processus.
pub struct LitraCli {
    program: String,
    timeout: Duration,
    runtime: Runtime,
}

impl LitraCli {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context(crate::t!("litra.runtime_failed"))?;

        Ok(Self {
            program: config.program.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            runtime,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Lance `program args...` et bloque jusqu'a la fin ou l'expiration du delai.
    /// Le processus enfant est tue si le delai expire.
    pub fn invoke(&self, args: &[String]) -> CommandResult {
        tracing::debug!("{}", crate::t!("litra.invoking", &self.program, args.join(" ")));

        let mut command = tokio::process::Command::new(&self.program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let outcome = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await });

        match outcome {
            Err(_) => {
                tracing::warn!("{}", crate::t!("litra.timeout", &self.program, self.timeout.as_millis()));
                CommandResult::failure(TIMED_OUT)
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                CommandResult::failure(format!("{} command not found", self.program))
            }
            Ok(Err(e)) => CommandResult::failure(e.to_string()),
            Ok(Ok(output)) => CommandResult {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        }
    }

    /// Verifie que l'outil repond a `--version`. Appele avant toute creation d'interface.
    pub fn probe(&self) -> Result<String> {
        let result = self.run(&LightCommand::Version);
        if !result.success {
            anyhow::bail!("{}", crate::t!("litra.probe_failed", &self.program, result.stderr.trim()));
        }
        Ok(result.stdout.trim().to_string())
    }
}

impl CommandRunner for LitraCli {
    fn run(&self, command: &LightCommand) -> CommandResult {
        self.invoke(&command.args())
    }
}
