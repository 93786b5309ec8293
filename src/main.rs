// The magnifier binary.
// What you SEE:
// • Nothing at first: the magnifier starts disabled.
// • F8: a square lens appears over the pointer showing a zoomed view of
//   the screen around it, refreshing as you move.
// • F8 again, or Escape: the lens vanishes without a trace.
// • Ctrl+C in the launching terminal quits.

use std::time::{Duration, Instant};

use clap::Parser;
use device_query::Keycode;

use loupe::capture::{CaptureWorker, MonitorSource};
use loupe::controller::{MagnifierCore, Transition};
use loupe::draw::OverlayWindow;
use loupe::error::Error;
use loupe::input::{EdgeLatch, GlobalInput};
use loupe::lens::{self, Follower, LensGeometry, LensRenderer};
use loupe::scheduler::{self, CaptureScheduler};
use loupe::types::{PhysicalBounds, Point};

#[derive(Parser)]
#[command(
    name = "loupe",
    about = "A screen magnifier that follows the pointer",
    version
)]
struct Args {
    /// Lens edge length in pixels (kept within 80..=400)
    #[arg(long, env = "LOUPE_SIZE", default_value_t = lens::DEFAULT_LENS_SIZE)]
    size: usize,

    /// Magnification factor (kept within 1..=6)
    #[arg(long, env = "LOUPE_ZOOM", default_value_t = lens::DEFAULT_ZOOM)]
    zoom: f32,

    /// Milliseconds between periodic captures while the lens is up
    #[arg(long, default_value_t = scheduler::CAPTURE_INTERVAL.as_millis() as u64)]
    interval_ms: u64,

    /// Debounce for movement-triggered captures, in milliseconds
    #[arg(long, default_value_t = scheduler::POKE_DEBOUNCE.as_millis() as u64)]
    debounce_ms: u64,

    /// Monitor index from --list-monitors (default: the primary one)
    #[arg(long)]
    monitor: Option<usize>,

    /// Glide fraction per frame (0 < f <= 1); omit to snap to the pointer
    #[arg(long)]
    glide: Option<f32>,

    /// Start with the lens already up
    #[arg(long)]
    start_enabled: bool,

    /// Print the monitors and exit
    #[arg(long)]
    list_monitors: bool,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_monitors {
        for line in MonitorSource::list()? {
            println!("{line}");
        }
        return Ok(());
    }

    /* --- Capture worker + core state ---
       Visual: nothing yet; the worker idles until the lens comes up. */
    let source = MonitorSource::open(args.monitor)?;
    let worker = CaptureWorker::spawn(source);
    let surface = worker.bounds();
    log::info!(
        "Magnifying the monitor at {},{} ({}x{})",
        surface.x,
        surface.y,
        surface.width,
        surface.height
    );

    let geometry = LensGeometry::new(args.size, args.zoom);
    let scheduler = CaptureScheduler::new(
        Duration::from_millis(args.interval_ms),
        Duration::from_millis(args.debounce_ms),
    );
    let follower = args.glide.map(Follower::new);
    let mut core = MagnifierCore::new(geometry, scheduler, follower);

    /* --- Global input: F8 toggles, Escape cancels --- */
    let input = GlobalInput::new();
    let mut toggle_latch = EdgeLatch::new();
    let mut cancel_latch = EdgeLatch::new();

    /* --- The lens itself; exists exactly while enabled --- */
    let mut session: Option<(OverlayWindow, LensRenderer)> = None;

    log::info!("Ready. F8 toggles the lens, Escape cancels, Ctrl+C quits.");

    if args.start_enabled {
        let t = core.toggle(Instant::now());
        mirror(t, &mut session, &core, surface)?;
    }

    /* --- FPS accounting (debug log once per second while the lens is up) --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    loop {
        let now = Instant::now();
        let keys = input.keys();

        /* 1) Hotkeys */
        if toggle_latch.rising(keys.contains(&Keycode::F8)) {
            let t = core.toggle(now);
            mirror(t, &mut session, &core, surface)?;
        }
        if cancel_latch.rising(keys.contains(&Keycode::Escape)) {
            if let Some(t) = core.cancel(now) {
                mirror(t, &mut session, &core, surface)?;
            }
        }

        /* 2) Pointer + visibility. Leaving the captured monitor pauses the
        capture cadence; returning refreshes immediately. */
        let global = input.pointer();
        let on_surface = surface.contains(global);
        core.set_visible(on_surface, now);
        if on_surface {
            core.pointer_moved(surface.to_local(global), now);
        }

        /* 3) Dispatch one capture when due, drain whatever finished */
        if let Some(epoch) = core.capture_due(now) {
            worker.request(epoch);
        }
        while let Some(reply) = worker.try_reply() {
            core.apply_reply(reply);
        }

        /* 4) If the window manager closed the lens, fold that into state */
        if session.as_ref().is_some_and(|(w, _)| !w.is_open()) {
            core.cancel(now);
            session = None;
            log::info!("Lens window was closed; magnifier off");
        }

        /* 5) Render: move the lens, then repaint its pixels */
        let aim = core.aim();
        if let Some((window, renderer)) = &mut session {
            let p = aim.unwrap_or_else(|| {
                Point::new(surface.width as f32 / 2.0, surface.height as f32 / 2.0)
            });

            let (center, moved) =
                renderer.place(p, surface.width as f32, surface.height as f32);
            if moved {
                let half = renderer.geometry().half();
                window.move_to(
                    surface.x as isize + (center.x - half).round() as isize,
                    surface.y as isize + (center.y - half).round() as isize,
                );
            }

            renderer.render(core.frame(), p, surface);
            window.present(renderer.canvas())?;

            frames_this_second += 1;
            if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
                let secs = now.duration_since(last_fps_time).as_secs_f32();
                log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
                frames_this_second = 0;
                last_fps_time = now;
            }
        } else {
            // Idle: nothing on screen, poll gently.
            std::thread::sleep(Duration::from_millis(15));
            frames_this_second = 0;
            last_fps_time = now;
        }
    }
}

/// Mirror a core transition onto the real overlay window.
fn mirror(
    transition: Transition,
    session: &mut Option<(OverlayWindow, LensRenderer)>,
    core: &MagnifierCore,
    surface: PhysicalBounds,
) -> Result<(), Error> {
    match transition {
        Transition::Enabled => {
            let geometry = core.geometry();
            let size = geometry.size();
            let mut window = OverlayWindow::open("loupe", size, size)?;

            // Until the pointer speaks, sit in the middle of the surface.
            let half = geometry.half();
            window.move_to(
                surface.x as isize + (surface.width as f32 / 2.0 - half).round() as isize,
                surface.y as isize + (surface.height as f32 / 2.0 - half).round() as isize,
            );

            *session = Some((window, LensRenderer::new(geometry)));
            log::info!("Magnifier on (epoch {})", core.epoch());
        }
        Transition::Disabled => {
            // Dropping the window tears it down.
            *session = None;
            log::info!("Magnifier off");
        }
    }
    Ok(())
}
