// Configuration de litra-tray.
// Deserialise le fichier TOML avec des valeurs par defaut pour chaque section.
// Aucune valeur de reglage de la lampe n'est jamais ecrite sur disque.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::control::{BRIGHTNESS_MAX, TEMPERATURE_MAX, TEMPERATURE_MIN};

/// Configuration racine de l'application
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LitraTrayConfig {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Origine de la configuration chargee, journalisee une fois le logging en place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// Fichier absent : valeurs par defaut
    Defaults,
}

/// Executable externe pilotant la lampe
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Delai maximal d'un appel, en millisecondes
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Reglages initiaux et anti-rebond des curseurs
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    #[serde(default = "default_temperature")]
    pub temperature: u16,
    /// Envoyer les changements de curseur meme lampe eteinte
    #[serde(default = "default_true")]
    pub apply_while_off: bool,
}

/// Configuration du logging (niveau, repertoire, langue)
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Langue des messages : "en", "fr", "es" (defaut : "en")
    #[serde(default)]
    pub language: Option<String>,
}

fn default_program() -> String {
    "litra".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_brightness() -> u8 {
    50
}

fn default_temperature() -> u16 {
    4500
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            brightness: default_brightness(),
            temperature: default_temperature(),
            apply_while_off: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
            language: None,
        }
    }
}

impl LitraTrayConfig {
    /// Charge la configuration depuis un fichier TOML.
    /// Si le fichier n'existe pas, utilise les valeurs par defaut.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        let (config, source) = if path.exists() {
            let content = std::fs::read_to_string(path).with_context(|| {
                crate::i18n::get_with_args("config.read_failed", &[&path.display().to_string()])
            })?;
            let config = toml::from_str::<LitraTrayConfig>(&content)
                .with_context(|| crate::t!("config.parse_failed"))?;
            (config, ConfigSource::File)
        } else {
            (Self::default(), ConfigSource::Defaults)
        };
        config.validate()?;
        Ok((config, source))
    }

    /// Rejette les valeurs hors des plages acceptees par la lampe
    pub fn validate(&self) -> Result<()> {
        if self.tool.program.trim().is_empty() {
            anyhow::bail!("{}", crate::t!("config.empty_program"));
        }
        if self.tool.timeout_ms == 0 {
            anyhow::bail!("{}", crate::t!("config.zero_timeout"));
        }
        if self.control.brightness > BRIGHTNESS_MAX {
            anyhow::bail!("{}", crate::t!("config.brightness_range", self.control.brightness));
        }
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.control.temperature) {
            anyhow::bail!("{}", crate::t!("config.temperature_range", self.control.temperature));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = LitraTrayConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.tool.program, "litra");
        assert_eq!(config.tool.timeout_ms, 5000);
        assert_eq!(config.control.debounce_ms, 500);
        assert_eq!(config.control.brightness, 50);
        assert_eq!(config.control.temperature, 4500);
        assert!(config.control.apply_while_off);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.language, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
[tool]
program = "/usr/local/bin/litra"

[control]
temperature = 3200
apply_while_off = false

[logging]
language = "fr"
"#,
        );
        let (config, source) = LitraTrayConfig::load(file.path()).unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.tool.program, "/usr/local/bin/litra");
        assert_eq!(config.tool.timeout_ms, 5000);
        assert_eq!(config.control.temperature, 3200);
        assert_eq!(config.control.brightness, 50);
        assert!(!config.control.apply_while_off);
        assert_eq!(config.logging.language.as_deref(), Some("fr"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let file = write_config("[tool\nprogram = ");
        assert!(LitraTrayConfig::load(file.path()).is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = write_config("[control]\ntemperature = 9000\n");
        assert!(LitraTrayConfig::load(file.path()).is_err());

        let file = write_config("[control]\nbrightness = 101\n");
        assert!(LitraTrayConfig::load(file.path()).is_err());

        let file = write_config("[tool]\ntimeout_ms = 0\n");
        assert!(LitraTrayConfig::load(file.path()).is_err());

        let file = write_config("[tool]\nprogram = \"  \"\n");
        assert!(LitraTrayConfig::load(file.path()).is_err());
    }
}
