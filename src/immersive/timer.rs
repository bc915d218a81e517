use std::time::{Duration, Instant};

/// One-shot auto-hide deadline.
///
/// Holds at most one deadline; `start` replaces any armed one. The timer
/// does not run on its own: the owner asks [`AutoHideTimer::fire_if_due`]
/// whenever time has moved on, so stopping it can never race a firing.
#[derive(Debug, Clone)]
pub struct AutoHideTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutoHideTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Used by the next `start`; an armed deadline is left alone.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arms the timer for `now + delay`, replacing any armed deadline.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns `true` when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let start = Instant::now();
        let mut timer = AutoHideTimer::new(Duration::from_millis(2000));
        timer.start(start);

        assert!(!timer.fire_if_due(start + Duration::from_millis(1999)));
        assert!(timer.fire_if_due(start + Duration::from_millis(2000)));
        assert!(!timer.is_running());
        assert!(!timer.fire_if_due(start + Duration::from_millis(5000)));
    }

    #[test]
    fn restart_replaces_deadline() {
        let start = Instant::now();
        let mut timer = AutoHideTimer::new(Duration::from_millis(100));
        timer.start(start);
        timer.start(start + Duration::from_millis(80));

        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(180)));
        assert!(!timer.fire_if_due(start + Duration::from_millis(100)));
        assert!(timer.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let start = Instant::now();
        let mut timer = AutoHideTimer::new(Duration::from_millis(10));
        timer.start(start);
        timer.stop();

        assert!(!timer.fire_if_due(start + Duration::from_secs(1)));
        assert!(timer.deadline().is_none());
    }
}
