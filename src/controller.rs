// The on/off heart of the magnifier. MagnifierCore never holds a window
// handle; the binary mirrors its transitions onto the real overlay, which
// keeps "the overlay exists exactly while enabled" structural and lets the
// whole state machine run headless in tests.

use std::time::Instant;

use crate::capture::CaptureReply;
use crate::lens::{Follower, LensGeometry};
use crate::scheduler::CaptureScheduler;
use crate::types::{FrameBuffer, Point};

/// What a toggle call did, so the caller can mirror it onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    Enabled,
    Disabled,
}

/// What happened to a worker reply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplyFate {
    Applied, // fresh frame accepted
    Miss,    // provider said no; the previous frame stays
    Stale,   // stamped with an earlier generation; dropped
    Off,     // arrived while disabled; dropped
}

pub struct MagnifierCore {
    geometry: LensGeometry,
    scheduler: CaptureScheduler,
    follower: Option<Follower>,
    enabled: bool,
    epoch: u64, // bumped on every enable; stamps capture jobs
    frame: Option<FrameBuffer>,
    pointer: Option<Point>, // last surface-local sample while enabled
}

impl MagnifierCore {
    pub fn new(
        geometry: LensGeometry,
        scheduler: CaptureScheduler,
        follower: Option<Follower>,
    ) -> Self {
        Self {
            geometry,
            scheduler,
            follower,
            enabled: false,
            epoch: 0,
            frame: None,
            pointer: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn geometry(&self) -> LensGeometry {
        self.geometry
    }

    pub fn frame(&self) -> Option<&FrameBuffer> {
        self.frame.as_ref()
    }

    /// Turn the magnifier on or off. Asking for the state it is already in
    /// is a no-op, so duplicate toggle deliveries cannot double-build.
    pub fn set_enabled(&mut self, on: bool, now: Instant) -> Option<Transition> {
        if on == self.enabled {
            return None;
        }
        self.enabled = on;
        if on {
            // A new generation: replies stamped with older ones are dead.
            self.epoch += 1;
            self.frame = None;
            self.pointer = None;
            if let Some(f) = &mut self.follower {
                f.reset();
            }
            self.scheduler.start(now);
            Some(Transition::Enabled)
        } else {
            self.scheduler.stop();
            self.frame = None;
            self.pointer = None;
            Some(Transition::Disabled)
        }
    }

    /// Flip the current state. The hotkey and programmatic callers both
    /// land here.
    pub fn toggle(&mut self, now: Instant) -> Transition {
        if self.enabled {
            self.set_enabled(false, now);
            Transition::Disabled
        } else {
            self.set_enabled(true, now);
            Transition::Enabled
        }
    }

    /// Escape. Acts only while enabled; ignored otherwise.
    pub fn cancel(&mut self, now: Instant) -> Option<Transition> {
        if self.enabled {
            self.set_enabled(false, now)
        } else {
            None
        }
    }

    /// A pointer sample in surface-local coordinates. Only actual movement
    /// pokes the capture debounce; polling the same position does nothing.
    pub fn pointer_moved(&mut self, p: Point, now: Instant) {
        if !self.enabled {
            return;
        }
        if self.pointer != Some(p) {
            self.pointer = Some(p);
            self.scheduler.poke(now);
        }
    }

    /// Where the lens should aim this frame, after the optional glide.
    pub fn aim(&mut self) -> Option<Point> {
        let target = self.pointer?;
        match &mut self.follower {
            Some(f) => Some(f.step(target)),
            None => Some(target),
        }
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        self.scheduler.set_visible(visible, now);
    }

    /// Ask whether a capture should be dispatched now. The returned stamp
    /// goes onto the job and must come back on the reply.
    pub fn capture_due(&mut self, now: Instant) -> Option<u64> {
        if self.scheduler.due(now) {
            Some(self.epoch)
        } else {
            None
        }
    }

    /// Fold a worker reply in. The gate opens for every reply, but only a
    /// reply stamped with the current generation while enabled may touch
    /// the frame.
    pub fn apply_reply(&mut self, reply: CaptureReply) -> ReplyFate {
        self.scheduler.completed();

        if reply.epoch != self.epoch {
            log::debug!(
                "Dropping capture reply from epoch {} (current {})",
                reply.epoch,
                self.epoch
            );
            return ReplyFate::Stale;
        }
        if !self.enabled {
            log::debug!("Dropping capture reply that arrived after disable");
            return ReplyFate::Off;
        }
        match reply.result.image {
            Some(image) if reply.result.ok => {
                self.frame = Some(image);
                ReplyFate::Applied
            }
            _ => ReplyFate::Miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureResult;
    use std::time::Duration;

    fn core_with(interval_ms: u64, debounce_ms: u64) -> MagnifierCore {
        let scheduler = CaptureScheduler::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(debounce_ms),
        );
        MagnifierCore::new(LensGeometry::default(), scheduler, None)
    }

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    fn hit(epoch: u64, color: u32) -> CaptureReply {
        CaptureReply {
            epoch,
            result: CaptureResult::hit(FrameBuffer::filled(2, 2, color)),
        }
    }

    fn miss(epoch: u64) -> CaptureReply {
        CaptureReply {
            epoch,
            result: CaptureResult::miss(),
        }
    }

    #[test]
    fn test_toggle_parity() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);
        for i in 1..=5 {
            core.toggle(ms(t0, i));
            assert_eq!(core.enabled(), i % 2 == 1);
        }
    }

    #[test]
    fn test_duplicate_enable_is_a_noop() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);

        assert_eq!(core.set_enabled(true, t0), Some(Transition::Enabled));
        assert_eq!(core.epoch(), 1);
        assert_eq!(core.capture_due(t0), Some(1));

        assert_eq!(core.set_enabled(true, t0), None);
        assert_eq!(core.epoch(), 1);
        // No second immediate capture was demanded.
        assert_eq!(core.capture_due(t0), None);
    }

    #[test]
    fn test_epoch_bumps_on_every_enable() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);
        core.set_enabled(true, t0);
        assert_eq!(core.epoch(), 1);
        core.set_enabled(false, t0);
        core.set_enabled(true, t0);
        assert_eq!(core.epoch(), 2);
    }

    #[test]
    fn test_cancel_only_acts_while_enabled() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);
        assert_eq!(core.cancel(t0), None);
        core.set_enabled(true, t0);
        assert_eq!(core.cancel(t0), Some(Transition::Disabled));
        assert_eq!(core.cancel(t0), None);
    }

    #[test]
    fn test_stale_reply_after_reenable_is_dropped() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);

        core.set_enabled(true, t0);
        assert_eq!(core.capture_due(t0), Some(1)); // job 1 leaves
        core.set_enabled(false, ms(t0, 10));
        core.set_enabled(true, ms(t0, 20));

        // The epoch-1 job answers while the gate still remembers it.
        assert_eq!(core.apply_reply(hit(1, 0x00AA0000)), ReplyFate::Stale);
        assert!(core.frame().is_none());

        // Its completion released the gate for the epoch-2 demand.
        assert_eq!(core.capture_due(ms(t0, 21)), Some(2));
        assert_eq!(core.apply_reply(hit(2, 0x000000BB)), ReplyFate::Applied);
        assert_eq!(core.frame().unwrap().pixels[0], 0x000000BB);
    }

    #[test]
    fn test_reply_after_disable_is_dropped() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);

        core.set_enabled(true, t0);
        assert_eq!(core.capture_due(t0), Some(1));
        core.set_enabled(false, ms(t0, 5));

        assert_eq!(core.apply_reply(hit(1, 0x00112233)), ReplyFate::Off);
        assert!(core.frame().is_none());
    }

    #[test]
    fn test_miss_keeps_the_previous_frame() {
        let t0 = Instant::now();
        let mut core = core_with(120, 50);

        core.set_enabled(true, t0);
        assert_eq!(core.capture_due(t0), Some(1));
        assert_eq!(core.apply_reply(hit(1, 0x00111111)), ReplyFate::Applied);

        assert_eq!(core.capture_due(ms(t0, 120)), Some(1));
        assert_eq!(core.apply_reply(miss(1)), ReplyFate::Miss);
        assert_eq!(core.frame().unwrap().pixels[0], 0x00111111);
    }

    #[test]
    fn test_still_pointer_does_not_poke() {
        let t0 = Instant::now();
        // Long interval so only the debounce path could produce demand.
        let mut core = core_with(10_000, 50);

        core.set_enabled(true, t0);
        assert_eq!(core.capture_due(t0), Some(1));
        core.apply_reply(hit(1, 0x00222222));

        let p = Point::new(40.0, 40.0);
        core.pointer_moved(p, ms(t0, 100));
        assert_eq!(core.capture_due(ms(t0, 150)), Some(1));
        core.apply_reply(hit(1, 0x00333333));

        // Same position polled again: no debounce, no demand.
        core.pointer_moved(p, ms(t0, 200));
        assert_eq!(core.capture_due(ms(t0, 400)), None);
    }

    #[test]
    fn test_aim_glides_with_a_follower() {
        let t0 = Instant::now();
        let scheduler =
            CaptureScheduler::new(Duration::from_millis(120), Duration::from_millis(50));
        let mut core = MagnifierCore::new(
            LensGeometry::default(),
            scheduler,
            Some(Follower::new(0.5)),
        );

        core.set_enabled(true, t0);
        assert!(core.aim().is_none());

        core.pointer_moved(Point::new(10.0, 0.0), t0);
        assert_eq!(core.aim(), Some(Point::new(10.0, 0.0)));

        core.pointer_moved(Point::new(20.0, 0.0), ms(t0, 10));
        assert_eq!(core.aim(), Some(Point::new(15.0, 0.0)));
    }
}
