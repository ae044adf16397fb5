// Surveillance des signaux d'arret (Ctrl+C, SIGTERM sous Unix).
// Un thread secondaire execute un runtime tokio mono-thread qui attend le signal
// puis positionne le drapeau d'arret lu par la boucle graphique.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::gui::state::AppState;

/// Demarre le thread de surveillance des signaux
pub fn spawn_signal_watcher(state: Arc<AppState>) -> Result<()> {
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("{}", crate::t!("app.signal_runtime_failed", e));
                    return;
                }
            };
            rt.block_on(async move {
                match wait_for_signal().await {
                    Ok(name) => {
                        tracing::info!("{}", crate::t!("app.signal_received", name));
                        state.request_quit();
                    }
                    Err(e) => tracing::error!("{}", crate::t!("app.signal_listen_failed", e)),
                }
            });
        })
        .context(crate::t!("app.signal_thread_failed"))?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl+C")
}
