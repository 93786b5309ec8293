// Decides *when* the screen gets re-captured. Three things create demand:
// an explicit request (enable, back-to-visible), the periodic cadence, and
// debounced pointer-move pokes. All demand funnels through a gate allowing
// one provider call in flight and at most one queued behind it, so a burst
// of demand while the provider is busy collapses to a single trailing call.
//
// The scheduler never reads the clock itself; callers pass `now` in, which
// keeps every timing rule testable.

use std::time::{Duration, Instant};

pub const CAPTURE_INTERVAL: Duration = Duration::from_millis(120);
pub const POKE_DEBOUNCE: Duration = Duration::from_millis(50);

pub struct CaptureScheduler {
    interval: Duration,
    debounce: Duration,
    running: bool,
    visible: bool,
    wants: bool,     // demand exists, pre-gate
    in_flight: bool, // one provider call is outstanding
    queued: bool,    // one more call will follow the outstanding one
    next_periodic: Option<Instant>,
    debounce_at: Option<Instant>,
}

impl CaptureScheduler {
    pub fn new(interval: Duration, debounce: Duration) -> Self {
        Self {
            interval,
            debounce,
            running: false,
            visible: true,
            wants: false,
            in_flight: false,
            queued: false,
            next_periodic: None,
            debounce_at: None,
        }
    }

    /// Begin the periodic cadence and demand an immediate first capture.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.visible = true;
        self.next_periodic = Some(now + self.interval);
        self.wants = true;
    }

    /// Drop all pending work. An in-flight call is not forgotten: its
    /// completion must still release the gate.
    pub fn stop(&mut self) {
        self.running = false;
        self.wants = false;
        self.queued = false;
        self.next_periodic = None;
        self.debounce_at = None;
    }

    /// Demand a capture on the next dispatch opportunity.
    pub fn request_now(&mut self) {
        if self.running {
            self.wants = true;
        }
    }

    /// Pointer moved. The first poke arms the single debounce timer; pokes
    /// arriving while it is armed ride the same timer.
    pub fn poke(&mut self, now: Instant) {
        if !self.running || !self.visible {
            return;
        }
        if self.debounce_at.is_none() {
            self.debounce_at = Some(now + self.debounce);
        }
    }

    /// Pointer entered or left the captured monitor. Leaving pauses the
    /// cadence and cancels the pending debounce; returning restarts the
    /// cadence and demands a fresh capture right away.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if !self.running || self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.next_periodic = Some(now + self.interval);
            self.wants = true;
        } else {
            self.next_periodic = None;
            self.debounce_at = None;
        }
    }

    /// Advance timers, then decide whether the caller should dispatch one
    /// provider call right now. Demand that arrives while a call is
    /// outstanding is held as the single queued follow-up.
    pub fn due(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }

        if self.debounce_at.is_some_and(|at| now >= at) {
            self.debounce_at = None;
            self.wants = true;
        }
        if self.next_periodic.is_some_and(|at| now >= at) {
            self.next_periodic = Some(now + self.interval);
            self.wants = true;
        }

        if !self.wants {
            return false;
        }
        if self.in_flight {
            self.queued = true;
            self.wants = false;
            return false;
        }
        self.in_flight = true;
        self.wants = false;
        true
    }

    /// The provider answered (hit or miss, either way the gate opens).
    pub fn completed(&mut self) {
        self.in_flight = false;
        if self.queued {
            self.queued = false;
            if self.running {
                self.wants = true;
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sched() -> CaptureScheduler {
        CaptureScheduler::new(Duration::from_millis(120), Duration::from_millis(50))
    }

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    #[test]
    fn test_start_demands_one_immediate_capture() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0));
        assert!(!s.due(t0));
    }

    #[test]
    fn test_burst_while_busy_collapses_to_two_calls() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0)); // call 1 in flight

        for _ in 0..5 {
            s.request_now();
            assert!(!s.due(t0));
        }

        s.completed();
        assert!(s.due(t0)); // call 2, the single trailing one
        s.completed();
        assert!(!s.due(t0));
    }

    #[test]
    fn test_periodic_cadence_fires_and_reschedules() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0));
        s.completed();

        assert!(!s.due(ms(t0, 119)));
        assert!(s.due(ms(t0, 120)));
        s.completed();

        // Rescheduled from the firing time, not from t0.
        assert!(!s.due(ms(t0, 130)));
        assert!(s.due(ms(t0, 241)));
    }

    #[test]
    fn test_pokes_ride_one_debounce_timer() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0));
        s.completed();

        s.poke(ms(t0, 10));
        s.poke(ms(t0, 30)); // absorbed by the timer armed at t0+10
        assert!(!s.due(ms(t0, 59)));
        assert!(s.due(ms(t0, 60)));
        s.completed();

        // The absorbed poke did not arm a second timer.
        assert!(!s.due(ms(t0, 61)));
    }

    #[test]
    fn test_hidden_pauses_and_return_refreshes() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0));
        s.completed();

        s.set_visible(false, ms(t0, 10));
        s.poke(ms(t0, 20));
        assert!(!s.due(ms(t0, 500)));

        s.set_visible(true, ms(t0, 600));
        assert!(s.due(ms(t0, 600)));
        s.completed();
        assert!(s.due(ms(t0, 721)));
    }

    #[test]
    fn test_stop_clears_pending_but_gate_still_releases() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0)); // in flight
        s.poke(ms(t0, 5));
        s.request_now();

        s.stop();
        assert!(!s.due(ms(t0, 1000)));
        assert!(s.in_flight());

        s.completed();
        assert!(!s.in_flight());
        assert!(!s.due(ms(t0, 1001)));
    }

    #[test]
    fn test_in_flight_survives_restart_until_completed() {
        let t0 = Instant::now();
        let mut s = sched();
        s.start(t0);
        assert!(s.due(t0)); // in flight from the first run

        s.stop();
        s.start(ms(t0, 50));
        // New demand exists but waits for the old call to finish.
        assert!(!s.due(ms(t0, 50)));
        s.completed();
        assert!(s.due(ms(t0, 51)));
    }
}
