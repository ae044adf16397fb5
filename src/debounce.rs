// Minuterie a coup unique avec valeur tamponnee.
// Chaque nouvelle valeur remplace la precedente et repousse l'echeance :
// seule la derniere valeur d'une rafale est liberee, une seule fois.

use std::time::{Duration, Instant};

/// Etat d'un axe : inactif (`pending == None`) ou en attente d'une echeance
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T: Copy> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Tamponne `value` et (re)demarre la minuterie a partir de `now`
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    /// Libere la valeur tamponnee sans attendre l'echeance
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Libere la valeur tamponnee si l'echeance est atteinte, puis redevient inactif
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((value, deadline)) if now >= deadline => {
                self.pending = None;
                Some(value)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn idle_until_scheduled() {
        let mut debouncer: Debouncer<u8> = Debouncer::new(DELAY);
        let now = Instant::now();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(now + DELAY * 10), None);
    }

    #[test]
    fn releases_only_last_value_once() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule(73u8, t0);
        debouncer.schedule(81u8, t0 + Duration::from_millis(200));

        // 500ms apres le premier changement, mais pas apres le dernier
        assert_eq!(debouncer.poll(t0 + DELAY), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(700)), Some(81));
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn restart_moves_deadline() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule(1u16, t0);
        assert_eq!(debouncer.deadline(), Some(t0 + DELAY));
        let t1 = t0 + Duration::from_millis(300);
        debouncer.schedule(2u16, t1);
        assert_eq!(debouncer.deadline(), Some(t1 + DELAY));
    }

    #[test]
    fn cancel_drops_pending_value() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule(50u8, t0);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + DELAY), None);
    }

    #[test]
    fn take_releases_before_deadline() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.schedule(12u8, t0);
        assert_eq!(debouncer.take(), Some(12));
        assert_eq!(debouncer.take(), None);
        assert_eq!(debouncer.poll(t0 + DELAY), None);
    }
}
