// Etat partage entre le thread GUI et le thread de surveillance des signaux.
// Utilise des types atomiques pour la synchronisation sans verrou.

use std::sync::atomic::{AtomicBool, Ordering};

/// Etat global de l'application partage entre les threads
#[derive(Default)]
pub struct AppState {
    /// Signal de demande d'arret de l'application
    quit: AtomicBool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Relaxed);
    }
}
