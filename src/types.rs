// Core types shared by the magnifier, the notes board, and the cursor overlay.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// Allocate a frame of the given size filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }
}

/// A pointer position. Global or monitor-relative depending on context;
/// functions that take one say which they expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One monitor's rectangle in global screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalBounds {
    pub x: i32, // left edge in global coordinates
    pub y: i32, // top edge in global coordinates
    pub width: u32,
    pub height: u32,
}

impl PhysicalBounds {
    pub fn contains(&self, global: Point) -> bool {
        global.x >= self.x as f32
            && global.y >= self.y as f32
            && global.x < (self.x + self.width as i32) as f32
            && global.y < (self.y + self.height as i32) as f32
    }

    /// Translate a global point into this monitor's local coordinates.
    pub fn to_local(&self, global: Point) -> Point {
        Point::new(global.x - self.x as f32, global.y - self.y as f32)
    }

    /// Translate a local point back into global coordinates.
    pub fn to_global(&self, local: Point) -> Point {
        Point::new(local.x + self.x as f32, local.y + self.y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> PhysicalBounds {
        PhysicalBounds {
            x: 100,
            y: 50,
            width: 1024,
            height: 768,
        }
    }

    #[test]
    fn test_contains_interior_and_edges() {
        let b = bounds();
        assert!(b.contains(Point::new(100.0, 50.0)));
        assert!(b.contains(Point::new(500.0, 400.0)));
        // Right/bottom edges are exclusive.
        assert!(!b.contains(Point::new(1124.0, 400.0)));
        assert!(!b.contains(Point::new(500.0, 818.0)));
        assert!(!b.contains(Point::new(99.0, 50.0)));
    }

    #[test]
    fn test_local_global_round_trip() {
        let b = bounds();
        let global = Point::new(356.0, 229.0);
        let local = b.to_local(global);
        assert_eq!(local, Point::new(256.0, 179.0));
        assert_eq!(b.to_global(local), global);
    }

    #[test]
    fn test_filled_frame_dimensions() {
        let fb = FrameBuffer::filled(4, 3, 0x00112233);
        assert_eq!(fb.pixels.len(), 12);
        assert!(fb.pixels.iter().all(|&p| p == 0x00112233));
    }
}
