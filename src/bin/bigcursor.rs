// The big-cursor binary: a pointer you cannot lose.
// What you SEE:
// • F9: a large arrow appears beside the pointer and follows it across
//   the whole desktop.
// • F9 again, or Escape: it vanishes. Ctrl+C in the terminal quits.

use std::time::Duration;

use clap::Parser;
use device_query::Keycode;

use loupe::draw::{self, OverlayWindow};
use loupe::error::Error;
use loupe::input::{EdgeLatch, GlobalInput};
use loupe::types::FrameBuffer;

const ARROW_COLOR: u32 = 0x00FFFFFF;

#[derive(Parser)]
#[command(name = "loupe-cursor", about = "An enlarged pointer overlay", version)]
struct Args {
    /// Arrow scale factor (kept within 1..=8)
    #[arg(long, env = "LOUPE_CURSOR_SCALE", default_value_t = 3)]
    scale: i32,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let scale = args.scale.clamp(1, 8);

    /* --- The arrow is drawn once; afterwards only the window moves --- */
    let w = (draw::ARROW_COLS as i32 * scale + scale + 2) as usize;
    let h = (draw::ARROW_ROWS as i32 * scale + scale + 2) as usize;
    let canvas = {
        let mut c = FrameBuffer::filled(w, h, 0);
        draw::draw_cursor_arrow(&mut c, 1, 1, scale, ARROW_COLOR);
        c
    };

    let input = GlobalInput::new();
    let mut toggle_latch = EdgeLatch::new();
    let mut cancel_latch = EdgeLatch::new();

    /* --- The overlay; exists exactly while enabled --- */
    let mut overlay: Option<OverlayWindow> = None;

    log::info!("Ready. F9 toggles the big cursor, Escape hides it, Ctrl+C quits.");

    loop {
        let keys = input.keys();

        /* 1) Hotkeys */
        if toggle_latch.rising(keys.contains(&Keycode::F9)) {
            if overlay.is_some() {
                overlay = None;
                log::info!("Big cursor off");
            } else {
                overlay = Some(OverlayWindow::open("loupe cursor", w, h)?);
                log::info!("Big cursor on");
            }
        }
        if cancel_latch.rising(keys.contains(&Keycode::Escape)) && overlay.is_some() {
            overlay = None;
            log::info!("Big cursor off");
        }

        /* 2) Fold a window-manager close back into state */
        if overlay.as_ref().is_some_and(|win| !win.is_open()) {
            overlay = None;
            log::info!("Big cursor window was closed");
        }

        /* 3) Chase the pointer */
        if let Some(win) = &mut overlay {
            let p = input.pointer();
            // Sit just off the hotspot; the real pointer stays usable.
            win.move_to(p.x as isize + 6, p.y as isize + 6);
            win.present(&canvas)?;
        } else {
            std::thread::sleep(Duration::from_millis(15));
        }
    }
}
