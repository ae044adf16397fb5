// Point d'entree principal de litra-tray.
// Verifie la presence de l'outil `litra`, puis lance l'interface graphique
// (systray Windows ou panneau egui Linux) sur le thread principal.
// Un thread secondaire surveille les signaux d'arret.

// En mode release sur Windows, masquer la console
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod control;
mod debounce;
mod gui;
mod i18n;
mod litra;
mod logging;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use config::{ConfigSource, LitraTrayConfig, ToolConfig};
use control::LightController;
use gui::state::AppState;
use litra::LitraCli;

#[derive(Parser, Debug)]
#[command(name = "litra-tray", about = "System tray control panel for Logitech Litra lights")]
struct Cli {
    /// Chemin vers le fichier de configuration
    #[arg(short, long, default_value = "litra-tray.toml")]
    config: PathBuf,

    /// Executable de controle de la lampe (remplace tool.program)
    #[arg(long)]
    tool: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let code = run(cli);
    std::process::exit(code);
}

/// Retourne le code de sortie du processus. Le guard de logging est libere
/// avant la sortie pour vider le fichier de traces.
fn run(cli: Cli) -> i32 {
    // Initialiser i18n avec l'anglais par defaut (avant le chargement de la config)
    i18n::init("en");

    let (mut config, source) = match LitraTrayConfig::load(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return 1;
        }
    };
    if let Some(tool) = cli.tool {
        config.tool.program = tool;
    }

    let language = config.logging.language.as_deref().unwrap_or("en");
    i18n::init(language);

    let _guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return 1;
        }
    };

    tracing::info!("{}", crate::t!("app.starting"));
    if source == ConfigSource::Defaults {
        tracing::warn!("{}", crate::t!("config.file_not_found", cli.config.display()));
    }
    tracing::info!("{}", crate::t!("app.config_loaded", language));

    let gateway = match prepare_gateway(&config.tool, gui::show_fatal_error) {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    let state = Arc::new(AppState::new());
    if let Err(e) = shutdown::spawn_signal_watcher(Arc::clone(&state)) {
        tracing::warn!("{:#}", e);
    }

    let controller = LightController::new(gateway, &config.control);

    // Thread principal : lancer l'interface graphique (bloquant)
    gui::run_gui(state, controller);

    tracing::info!("{}", crate::t!("app.shutdown"));
    0
}

/// Cree la passerelle et verifie que l'outil repond, avant toute interface.
/// En cas d'echec `on_fatal(titre, message)` est appele et le code de sortie est retourne.
fn prepare_gateway(
    tool: &ToolConfig,
    on_fatal: impl FnOnce(&str, &str),
) -> Result<LitraCli, i32> {
    let gateway = match LitraCli::new(tool) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!("{:#}", e);
            on_fatal(&crate::t!("app.startup_failed_title"), &format!("{:#}", e));
            return Err(1);
        }
    };

    match gateway.probe() {
        Ok(version) => {
            tracing::info!("{}", crate::t!("app.tool_version", gateway.program(), version));
            Ok(gateway)
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            on_fatal(
                &crate::t!("app.tool_missing_title"),
                &crate::t!("app.tool_missing", gateway.program()),
            );
            Err(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(program: &str) -> ToolConfig {
        ToolConfig {
            program: program.to_string(),
            timeout_ms: 2000,
        }
    }

    #[test]
    fn missing_tool_exits_with_status_one() {
        i18n::init("en");
        let mut shown = None;
        let result = prepare_gateway(&tool("litra-tray-missing-tool"), |title, message| {
            shown = Some((title.to_string(), message.to_string()));
        });

        assert_eq!(result.err(), Some(1));
        let (title, message) = shown.unwrap();
        assert_eq!(title, "Litra Command Not Found");
        assert!(message.contains("litra-tray-missing-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn responding_tool_starts_without_dialog() {
        i18n::init("en");
        let mut shown = false;
        let result = prepare_gateway(&tool("echo"), |_, _| shown = true);
        assert!(result.is_ok());
        assert!(!shown);
    }

    #[test]
    fn tool_flag_is_optional() {
        let cli = Cli::parse_from(["litra-tray", "--tool", "/opt/litra"]);
        assert_eq!(cli.tool.as_deref(), Some("/opt/litra"));
        assert_eq!(cli.config, PathBuf::from("litra-tray.toml"));
        assert_eq!(Cli::parse_from(["litra-tray"]).tool, None);
    }
}
