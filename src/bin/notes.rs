// The corkboard binary.
// What you SEE:
// • A dark board; each saved note is a pale yellow card with its text.
// • Click a card to select it (orange border) and drag it around.
// • Type to append to the selected card; Backspace deletes, Enter starts
//   a new line. Insert adds a card, Delete removes the selection,
//   Ctrl+Delete wipes the board, Escape deselects.
// • Every change is saved the moment it happens.

use std::path::PathBuf;

use clap::Parser;

use loupe::draw::{self, BoardWindow};
use loupe::error::Error;
use loupe::notes::{Note, NoteStore};
use loupe::types::FrameBuffer;

const BOARD_W: usize = 960;
const BOARD_H: usize = 640;
const NOTE_W: i32 = 150;
const NOTE_H: i32 = 100;

const BOARD_BG: u32 = 0x002B2B2B;
const NOTE_FILL: u32 = 0x00F5E6A8;
const NOTE_EDGE: u32 = 0x00B9A95F;
const NOTE_EDGE_SELECTED: u32 = 0x00E07A2F;
const NOTE_TEXT: u32 = 0x00433A1E;
const CARET: u32 = 0x00804020;
const HUD_TEXT: u32 = 0x00AAAAAA;

// Text cell geometry inside a card: 6px glyph advance, 9px line height.
const PAD: i32 = 6;
const COLS: usize = ((NOTE_W - 2 * PAD) / 6) as usize;
const ROWS: usize = ((NOTE_H - 2 * PAD) / 9) as usize;

#[derive(Parser)]
#[command(name = "loupe-notes", about = "Sticky notes on a corkboard", version)]
struct Args {
    /// Notes file to use instead of the per-user default
    #[arg(long, env = "LOUPE_NOTES_FILE")]
    file: Option<PathBuf>,
}

// An active drag: which card, and where inside it the grab happened.
struct Drag {
    note: usize,
    grab_x: i32,
    grab_y: i32,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let store = match args.file {
        Some(path) => NoteStore::at(path),
        None => NoteStore::at(NoteStore::default_path()?),
    };
    let mut notes = store.load()?;
    log::info!(
        "Loaded {} notes from {}",
        notes.len(),
        store.path().display()
    );

    let mut window = BoardWindow::open("loupe notes", BOARD_W, BOARD_H)?;
    let mut screen = FrameBuffer::filled(BOARD_W, BOARD_H, BOARD_BG);

    let mut selected: Option<usize> = None;
    let mut drag: Option<Drag> = None;
    let mut was_down = false;

    while window.is_open() {
        let mut dirty = false;

        /* 1) Board commands */
        if window.insert_pressed_once() {
            notes.push(Note::fresh());
            selected = Some(notes.len() - 1);
            dirty = true;
        }
        if window.delete_pressed_once() {
            if window.ctrl_down() {
                notes.clear();
                selected = None;
                drag = None;
                dirty = true;
                log::info!("Cleared the board");
            } else if let Some(i) = selected.take() {
                notes.remove(i);
                drag = None;
                dirty = true;
            }
        }
        if window.escape_pressed_once() {
            selected = None;
        }

        /* 2) Typing edits the selected card */
        if let Some(i) = selected {
            for c in window.take_chars() {
                notes[i].text.push(c);
                dirty = true;
            }
            if window.enter_pressed() {
                notes[i].text.push('\n');
                dirty = true;
            }
            if window.backspace_pressed() && notes[i].text.pop().is_some() {
                dirty = true;
            }
        } else {
            // Drop strays so they don't replay into the next selection.
            window.take_chars();
        }

        /* 3) Mouse: select on press, drag while held, save on release */
        let down = window.left_mouse_down();
        if let Some((mx, my)) = window.mouse_pos() {
            if down && !was_down {
                // Later cards draw on top, so scan back to front.
                selected = None;
                for (i, n) in notes.iter().enumerate().rev() {
                    if mx >= n.x && mx < n.x + NOTE_W && my >= n.y && my < n.y + NOTE_H {
                        selected = Some(i);
                        drag = Some(Drag {
                            note: i,
                            grab_x: mx - n.x,
                            grab_y: my - n.y,
                        });
                        break;
                    }
                }
            }
            if down {
                if let Some(d) = &drag {
                    // Keep at least a corner of the card on the board.
                    let n = &mut notes[d.note];
                    n.x = (mx - d.grab_x).clamp(-NOTE_W + 40, BOARD_W as i32 - 40);
                    n.y = (my - d.grab_y).clamp(0, BOARD_H as i32 - 40);
                }
            }
        }
        if !down && was_down && drag.take().is_some() {
            dirty = true; // the move is final on release
        }
        was_down = down;

        /* 4) Persist every mutation as one whole collection */
        if dirty {
            store.save(&notes)?;
        }

        /* 5) Paint the board back to front */
        for px in &mut screen.pixels {
            *px = BOARD_BG;
        }
        for (i, n) in notes.iter().enumerate() {
            let is_selected = selected == Some(i);
            draw::fill_rect(&mut screen, n.x, n.y, NOTE_W, NOTE_H, NOTE_FILL);
            let (edge, thickness) = if is_selected {
                (NOTE_EDGE_SELECTED, 2)
            } else {
                (NOTE_EDGE, 1)
            };
            draw::draw_rect_border(&mut screen, n.x, n.y, NOTE_W, NOTE_H, thickness, edge);
            draw_card_text(&mut screen, n, is_selected);
        }
        draw::draw_text_5x7(
            &mut screen,
            8,
            BOARD_H as i32 - 14,
            "INSERT: NEW   DEL: REMOVE   CTRL+DEL: CLEAR   ESC: DESELECT",
            HUD_TEXT,
        );
        window.present(&screen)?;
    }

    Ok(())
}

/// Flow a card's text into fixed-width lines: explicit newlines break, and
/// anything past the card edge wraps to the next line.
fn note_lines(text: &str, cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for ch in text.chars() {
        if ch == '\n' {
            lines.push(std::mem::take(&mut cur));
            continue;
        }
        if cur.chars().count() >= cols {
            lines.push(std::mem::take(&mut cur));
        }
        cur.push(ch);
    }
    lines.push(cur);
    lines
}

fn draw_card_text(screen: &mut FrameBuffer, n: &Note, selected: bool) {
    let lines = note_lines(&n.text, COLS);
    for (row, line) in lines.iter().take(ROWS).enumerate() {
        draw::draw_text_5x7(
            screen,
            n.x + PAD,
            n.y + PAD + row as i32 * 9,
            line,
            NOTE_TEXT,
        );
    }

    // Caret after the last character of the selected card.
    if selected {
        let row = lines.len() - 1;
        if row < ROWS {
            let col = lines[row].chars().count();
            draw::draw_text_5x7(
                screen,
                n.x + PAD + col as i32 * 6,
                n.y + PAD + row as i32 * 9,
                "_",
                CARET,
            );
        }
    }
}
