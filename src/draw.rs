// Window plumbing + software drawing utilities.
// Two window flavors live here:
// 1) OverlayWindow: borderless, always on top, repositioned every frame.
//    The lens and the big cursor are both one of these.
// 2) BoardWindow: a normal titled window with keyboard/mouse helpers and
//    a typed-character sink, used by the notes board.
// Below them: bounds-checked pixel helpers, rectangles, a 5x7 bitmap font,
// and a scalable arrow silhouette.

use std::cell::RefCell;
use std::rc::Rc;

use minifb::{InputCallback, Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::FrameBuffer;

/// A chromeless window that floats above everything else.
pub struct OverlayWindow {
    window: Window,
    pos: Option<(isize, isize)>, // last position we set, to skip no-op moves
}

impl OverlayWindow {
    /// Visual: a bare square of pixels appears, no border, no title bar,
    /// above every other window.
    pub fn open(name: &str, width: usize, height: usize) -> Result<Self, Error> {
        let opts = WindowOptions {
            borderless: true,
            title: false,
            topmost: true,
            ..WindowOptions::default()
        };
        let mut window =
            Window::new(name, width, height, opts).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, pos: None })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, fb: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Move the window's top-left corner to global screen coordinates.
    /// Repeat calls with the same position do nothing.
    pub fn move_to(&mut self, x: isize, y: isize) {
        if self.pos == Some((x, y)) {
            return;
        }
        self.window.set_position(x, y);
        self.pos = Some((x, y));
    }

    /// False once the window manager has taken the window away.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

// Typed characters land here from minifb's input callback; the board
// drains them once per frame.
struct CharSink {
    chars: Rc<RefCell<Vec<char>>>,
}

impl InputCallback for CharSink {
    fn add_char(&mut self, uni_char: u32) {
        if let Some(c) = char::from_u32(uni_char) {
            if !c.is_control() {
                self.chars.borrow_mut().push(c);
            }
        }
    }
}

/// A regular titled window for the notes board.
pub struct BoardWindow {
    window: Window,
    chars: Rc<RefCell<Vec<char>>>,
}

impl BoardWindow {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);

        let chars = Rc::new(RefCell::new(Vec::new()));
        window.set_input_callback(Box::new(CharSink {
            chars: chars.clone(),
        }));
        Ok(Self { window, chars })
    }

    pub fn present(&mut self, fb: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Everything typed since the last frame, in order.
    pub fn take_chars(&mut self) -> Vec<char> {
        self.chars.borrow_mut().drain(..).collect()
    }

    /// Mouse position in window pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(i32, i32)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as i32, y.max(0.0) as i32))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    // One firing per press; used for the board commands.
    pub fn insert_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::Insert, KeyRepeat::No)
    }

    pub fn delete_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::Delete, KeyRepeat::No)
    }

    pub fn escape_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }

    // Editing keys repeat while held.
    pub fn backspace_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Backspace, KeyRepeat::Yes)
    }

    pub fn enter_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Enter, KeyRepeat::Yes)
    }

    pub fn ctrl_down(&self) -> bool {
        self.window.is_key_down(Key::LeftCtrl) || self.window.is_key_down(Key::RightCtrl)
    }
}

/* ---------- Software drawing: pixels, rectangles, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Fill an axis-aligned rectangle, clipped to the framebuffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(fb.width as i32);
    let y1 = (y + h).min(fb.height as i32);
    for yy in y0..y1 {
        for xx in x0..x1 {
            fb.pixels[yy as usize * fb.width + xx as usize] = color;
        }
    }
}

/// Draw a rectangle outline of thickness `t` just inside the given rect.
pub fn draw_rect_border(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, t: i32, color: u32) {
    fill_rect(fb, x, y, w, t, color); // top
    fill_rect(fb, x, y + h - t, w, t, color); // bottom
    fill_rect(fb, x, y, t, h, color); // left
    fill_rect(fb, x + w - t, y, t, h, color); // right
}

/* ---------- 5x7 bitmap font (digits, A-Z, punctuation for the HUD and notes) ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the
/// pixels (bit 4 = leftmost). Lowercase input is drawn with the uppercase
/// shapes; unknown characters draw nothing but still take up a cell.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase letters
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation: enough for HUD strings and note text
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00100,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b01110,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '\'' => g!(0b00100,0b00100,0b00000,0b00000,0b00000,0b00000,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph with a 1-pixel dark shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass: offset by (1,1) in black to improve readability
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32 + 1, y + ry as i32 + 1, 0x00000000);
                }
            }
        }

        // Foreground pass: actual glyph in chosen color
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

/* ---------- Arrow silhouette for the big-cursor overlay ---------- */

pub const ARROW_COLS: usize = 11;
pub const ARROW_ROWS: usize = 17;

// One u16 per row; bit (ARROW_COLS-1-x) set means the pixel is part of
// the arrow. Same encoding idea as the font rows, just wider.
const ARROW_MASK: [u16; ARROW_ROWS] = [
    0b10000000000,
    0b11000000000,
    0b11100000000,
    0b11110000000,
    0b11111000000,
    0b11111100000,
    0b11111110000,
    0b11111111000,
    0b11111111100,
    0b11111111110,
    0b11111111111,
    0b11111110000,
    0b11101110000,
    0b11001110000,
    0b10000111000,
    0b00000111000,
    0b00000011000,
];

/// Draw the arrow scaled up by `scale`, tip at (x,y).
/// Visual: a big pointer with a dark shadow half a scaled step away.
pub fn draw_cursor_arrow(fb: &mut FrameBuffer, x: i32, y: i32, scale: i32, color: u32) {
    let s = scale.max(1);
    let shadow = s / 2 + 1;
    blit_arrow(fb, x + shadow, y + shadow, s, 0x00000000);
    blit_arrow(fb, x, y, s, color);
}

fn blit_arrow(fb: &mut FrameBuffer, x: i32, y: i32, s: i32, color: u32) {
    for (ry, rowbits) in ARROW_MASK.iter().enumerate() {
        for rx in 0..ARROW_COLS {
            if (rowbits >> (ARROW_COLS - 1 - rx)) & 1 != 0 {
                fill_rect(fb, x + rx as i32 * s, y + ry as i32 * s, s, s, color);
            }
        }
    }
}
