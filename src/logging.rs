// Initialisation du logging : fichier journalier dans {log_dir}/AAAA/MM/,
// plus la sortie standard sauf en release Windows (pas de console).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Repertoire mensuel de logs : {log_dir}/AAAA/MM/
pub fn monthly_dir(log_dir: &Path, now: DateTime<Local>) -> PathBuf {
    log_dir
        .join(now.format("%Y").to_string())
        .join(now.format("%m").to_string())
}

/// Installe le subscriber global. Le guard retourne doit vivre jusqu'a la fin du programme.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let log_dir = monthly_dir(Path::new(&config.log_dir), Local::now());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| crate::t!("app.log_dir_failed", log_dir.display()))?;

    // Appender de fichier avec rotation quotidienne dans le repertoire mensuel
    let file_appender = tracing_appender::rolling::daily(&log_dir, "litra-tray");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking);

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(any(not(windows), debug_assertions))]
    {
        let stdout_layer = fmt::layer().with_ansi(false).with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
    }

    #[cfg(all(windows, not(debug_assertions)))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monthly_dir_uses_year_and_month() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            monthly_dir(Path::new("logs"), at),
            Path::new("logs").join("2026").join("03")
        );
    }
}
