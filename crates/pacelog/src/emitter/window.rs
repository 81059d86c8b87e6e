//! Throttle window policy.
//!
//! Pure timing decisions, with the current instant passed in by the caller.
//! The emitter owns one window and consults it on every `emit`.

use std::time::Duration;

use pacelog_core::MAX_DELAY_MS;
use tokio::time::Instant;

/// Outcome of offering a payload to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// The window is closed; write the payload now.
    Immediate,
    /// Too soon; buffer the payload until `deadline`.
    Deferred { deadline: Instant },
}

/// Tracks when the sink was last written and decides whether the next
/// payload may go out now.
#[derive(Debug, Clone)]
pub(crate) struct ThrottleWindow {
    delay: Duration,
    skip_initial: bool,
    /// `None` until the first emission, flush or seeding.
    last_emit: Option<Instant>,
}

impl ThrottleWindow {
    pub(crate) fn new(delay: Duration, skip_initial: bool) -> Self {
        Self {
            delay: delay.min(Duration::from_millis(MAX_DELAY_MS)),
            skip_initial,
            last_emit: None,
        }
    }

    pub(crate) const fn delay(&self) -> Duration {
        self.delay
    }

    pub(crate) const fn skip_initial(&self) -> bool {
        self.skip_initial
    }

    pub(crate) const fn last_emit(&self) -> Option<Instant> {
        self.last_emit
    }

    /// Decide what to do with a payload offered at `now`.
    ///
    /// With `skip_initial`, the very first offer seeds the window at `now`,
    /// which makes the elapsed time zero: the first payload is therefore
    /// always deferred by a full `delay`. Elapsed time exactly equal to
    /// `delay` still counts as too soon.
    pub(crate) fn admit(&mut self, now: Instant) -> Admission {
        if self.skip_initial && self.last_emit.is_none() {
            self.last_emit = Some(now);
        }

        match self.last_emit {
            Some(last) if now.saturating_duration_since(last) <= self.delay => {
                Admission::Deferred {
                    deadline: last + self.delay,
                }
            }
            _ => Admission::Immediate,
        }
    }

    /// Restart the window at `now`.
    pub(crate) const fn mark(&mut self, now: Instant) {
        self.last_emit = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_first_offer_without_skip_is_immediate() {
        let mut window = ThrottleWindow::new(SECOND, false);
        assert_eq!(window.admit(Instant::now()), Admission::Immediate);
        // admit never records emissions by itself
        assert_eq!(window.last_emit(), None);
    }

    #[test]
    fn test_first_offer_with_skip_seeds_and_defers() {
        let t0 = Instant::now();
        let mut window = ThrottleWindow::new(SECOND, true);

        assert_eq!(
            window.admit(t0),
            Admission::Deferred {
                deadline: t0 + SECOND
            }
        );
        assert_eq!(window.last_emit(), Some(t0));
    }

    #[test]
    fn test_seed_happens_only_once() {
        let t0 = Instant::now();
        let mut window = ThrottleWindow::new(SECOND, true);
        window.admit(t0);

        // Still measured from the original seed, not re-seeded
        let later = t0 + Duration::from_millis(400);
        assert_eq!(
            window.admit(later),
            Admission::Deferred {
                deadline: t0 + SECOND
            }
        );
        assert_eq!(window.admit(t0 + Duration::from_millis(1001)), Admission::Immediate);
    }

    #[test]
    fn test_mark_before_first_offer_disables_seeding() {
        let t0 = Instant::now();
        let mut window = ThrottleWindow::new(SECOND, true);
        window.mark(t0);

        let later = t0 + Duration::from_millis(1500);
        assert_eq!(window.admit(later), Admission::Immediate);
        assert_eq!(window.last_emit(), Some(t0));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut window = ThrottleWindow::new(SECOND, false);
        window.mark(t0);

        assert_eq!(
            window.admit(t0 + SECOND),
            Admission::Deferred {
                deadline: t0 + SECOND
            }
        );
        assert_eq!(
            window.admit(t0 + SECOND + Duration::from_millis(1)),
            Admission::Immediate
        );
    }

    #[test]
    fn test_zero_delay_defers_same_instant_only() {
        let t0 = Instant::now();
        let mut window = ThrottleWindow::new(Duration::ZERO, false);
        window.mark(t0);

        assert_eq!(window.admit(t0), Admission::Deferred { deadline: t0 });
        assert_eq!(
            window.admit(t0 + Duration::from_millis(1)),
            Admission::Immediate
        );
    }

    #[test]
    fn test_delay_is_clamped() {
        let window = ThrottleWindow::new(Duration::MAX, true);
        assert_eq!(window.delay(), Duration::from_millis(MAX_DELAY_MS));
        assert!(window.skip_initial());
    }
}
