// Grabs monitor frames and converts them for the lens to sample.
// Visual expectation: each reply carries a Vec<u32> of 0x00RRGGBB pixels
// covering the chosen monitor, one frame per requested capture.

use crate::error::Error;
use crate::types::{FrameBuffer, PhysicalBounds};

use crossbeam_channel::{Receiver, Sender, bounded};
use image::RgbaImage;
use xcap::Monitor;

/// A provider answer. `ok` false means the grab was refused or failed;
/// whoever asked keeps showing what it already has.
#[derive(Clone)]
pub struct CaptureResult {
    pub ok: bool,
    pub image: Option<FrameBuffer>,
}

impl CaptureResult {
    pub fn hit(image: FrameBuffer) -> Self {
        Self {
            ok: true,
            image: Some(image),
        }
    }

    pub fn miss() -> Self {
        Self {
            ok: false,
            image: None,
        }
    }
}

/// Anything that can produce frames of a screen-like surface. The worker
/// owns one of these; tests substitute their own.
pub trait CaptureSource: Send {
    fn grab(&mut self) -> CaptureResult;
    fn bounds(&self) -> PhysicalBounds;
}

/// The real source: one monitor, grabbed through xcap.
pub struct MonitorSource {
    monitor: Monitor,
    bounds: PhysicalBounds,
}

impl MonitorSource {
    /// Open the monitor at `index` from `list()`, or the primary one.
    pub fn open(index: Option<usize>) -> Result<Self, Error> {
        // 1) Enumerate monitors (can fail on locked-down systems).
        let mut monitors =
            Monitor::all().map_err(|e| Error::CaptureInit(format!("List monitors: {e}")))?;
        if monitors.is_empty() {
            return Err(Error::CaptureInit("No monitors found".into()));
        }

        // 2) Pick by index when given; otherwise the primary, then the first.
        let pick = match index {
            Some(i) if i < monitors.len() => i,
            Some(i) => {
                return Err(Error::CaptureInit(format!(
                    "No monitor at index {i} ({} available)",
                    monitors.len()
                )));
            }
            None => monitors
                .iter()
                .position(|m| m.is_primary().unwrap_or(false))
                .unwrap_or(0),
        };
        let monitor = monitors.swap_remove(pick);

        // 3) Remember the rectangle; lens math maps pointer coordinates
        //    through it every frame.
        let bounds = PhysicalBounds {
            x: monitor.x().unwrap_or(0),
            y: monitor.y().unwrap_or(0),
            width: monitor.width().unwrap_or(0).max(1),
            height: monitor.height().unwrap_or(0).max(1),
        };

        Ok(Self { monitor, bounds })
    }

    /// One line per monitor, for `--list-monitors`.
    pub fn list() -> Result<Vec<String>, Error> {
        let monitors =
            Monitor::all().map_err(|e| Error::CaptureInit(format!("List monitors: {e}")))?;
        Ok(monitors
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let name = m.name().unwrap_or_else(|_| "?".into());
                let w = m.width().unwrap_or(0);
                let h = m.height().unwrap_or(0);
                let primary = if m.is_primary().unwrap_or(false) {
                    " (primary)"
                } else {
                    ""
                };
                format!("{i}: {name} {w}x{h}{primary}")
            })
            .collect())
    }
}

impl CaptureSource for MonitorSource {
    fn grab(&mut self) -> CaptureResult {
        // A denied or transiently failing grab is data, not an error.
        match self.monitor.capture_image() {
            Ok(img) => CaptureResult::hit(rgba_to_frame(&img)),
            Err(e) => {
                log::warn!("Screen grab failed: {e}");
                CaptureResult::miss()
            }
        }
    }

    fn bounds(&self) -> PhysicalBounds {
        self.bounds
    }
}

/// Convert an RGBA capture into the 0x00RRGGBB layout minifb wants.
fn rgba_to_frame(img: &RgbaImage) -> FrameBuffer {
    let (w, h) = img.dimensions();
    let mut out = Vec::with_capacity((w as usize) * (h as usize));
    for pixel in img.pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        out.push((r << 16) | (g << 8) | b);
    }
    FrameBuffer {
        width: w as usize,
        height: h as usize,
        pixels: out,
    }
}

/// A capture job stamped with the enable-generation that asked for it.
#[derive(Clone, Copy)]
pub struct CaptureJob {
    pub epoch: u64,
}

/// The worker's answer, carrying the job's stamp back unchanged.
pub struct CaptureReply {
    pub epoch: u64,
    pub result: CaptureResult,
}

/// One long-lived thread owning the capture source. Jobs are answered in
/// arrival order; the single thread is what serializes grabs against the
/// surface. Dropping the worker closes the job channel and ends the thread.
pub struct CaptureWorker {
    jobs: Sender<CaptureJob>,
    replies: Receiver<CaptureReply>,
    bounds: PhysicalBounds,
}

impl CaptureWorker {
    pub fn spawn<S: CaptureSource + 'static>(mut source: S) -> Self {
        let bounds = source.bounds();
        let (job_tx, job_rx) = bounded::<CaptureJob>(2);
        let (reply_tx, reply_rx) = bounded::<CaptureReply>(2);

        std::thread::spawn(move || {
            for job in job_rx {
                let result = source.grab();
                let reply = CaptureReply {
                    epoch: job.epoch,
                    result,
                };
                if reply_tx.send(reply).is_err() {
                    break; // main side is gone
                }
            }
        });

        Self {
            jobs: job_tx,
            replies: reply_rx,
            bounds,
        }
    }

    pub fn bounds(&self) -> PhysicalBounds {
        self.bounds
    }

    /// Hand the worker one job. The scheduler's gate keeps this to one
    /// outstanding job, so the channel never backs up in practice.
    pub fn request(&self, epoch: u64) {
        let _ = self.jobs.try_send(CaptureJob { epoch });
    }

    /// Non-blocking drain of finished work.
    pub fn try_reply(&self) -> Option<CaptureReply> {
        self.replies.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct ScriptedSource {
        grabs: u32,
    }

    impl CaptureSource for ScriptedSource {
        fn grab(&mut self) -> CaptureResult {
            self.grabs += 1;
            CaptureResult::hit(FrameBuffer::filled(4, 4, self.grabs))
        }

        fn bounds(&self) -> PhysicalBounds {
            PhysicalBounds {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            }
        }
    }

    fn wait_reply(worker: &CaptureWorker) -> CaptureReply {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(reply) = worker.try_reply() {
                return reply;
            }
            assert!(Instant::now() < deadline, "worker never answered");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_rgba_packs_to_rrggbb() {
        let img = RgbaImage::from_raw(2, 1, vec![0x11, 0x22, 0x33, 0xFF, 0xAA, 0xBB, 0xCC, 0xFF])
            .unwrap();
        let fb = rgba_to_frame(&img);
        assert_eq!(fb.width, 2);
        assert_eq!(fb.height, 1);
        assert_eq!(fb.pixels, vec![0x00112233, 0x00AABBCC]);
    }

    #[test]
    fn test_worker_round_trips_epoch_stamps() {
        let worker = CaptureWorker::spawn(ScriptedSource { grabs: 0 });

        worker.request(7);
        let reply = wait_reply(&worker);
        assert_eq!(reply.epoch, 7);
        assert!(reply.result.ok);
        assert_eq!(reply.result.image.unwrap().pixels[0], 1);

        worker.request(8);
        let reply = wait_reply(&worker);
        assert_eq!(reply.epoch, 8);
        assert_eq!(reply.result.image.unwrap().pixels[0], 2);
    }

    #[test]
    fn test_worker_reports_source_bounds() {
        let worker = CaptureWorker::spawn(ScriptedSource { grabs: 0 });
        assert_eq!(worker.bounds().width, 4);
    }
}
