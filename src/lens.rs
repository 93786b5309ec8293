// Lens placement math and the magnified view itself.
// Visual expectation: a square always-on-top window whose pixels show the
// area around the pointer scaled up, with a thin ring marking the edge.

use crate::types::{FrameBuffer, PhysicalBounds, Point};

pub const MIN_LENS_SIZE: usize = 80;
pub const MAX_LENS_SIZE: usize = 400;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 6.0;

pub const DEFAULT_LENS_SIZE: usize = 180;
pub const DEFAULT_ZOOM: f32 = 2.0;

// What you see where no capture data exists yet (or past the screen edge).
const BACKDROP: u32 = 0x00202020;
// The 2-pixel ring around the lens edge.
const RING: u32 = 0x00333333;

/// Lens shape: edge length in pixels and the magnification factor.
/// Both are kept inside their working ranges no matter what callers pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensGeometry {
    size: usize,
    zoom: f32,
}

impl Default for LensGeometry {
    fn default() -> Self {
        Self {
            size: DEFAULT_LENS_SIZE,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl LensGeometry {
    pub fn new(size: usize, zoom: f32) -> Self {
        let mut g = Self::default();
        g.set_size(size);
        g.set_zoom(zoom);
        g
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size.clamp(MIN_LENS_SIZE, MAX_LENS_SIZE);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn half(&self) -> f32 {
        self.size as f32 / 2.0
    }
}

/// Clamp a lens center so the whole lens stays on the surface.
/// Each axis clamps independently; when the surface is narrower than the
/// lens on an axis, the near edge wins and the lens pins to it.
pub fn clamp_center(p: Point, size: usize, surface_w: f32, surface_h: f32) -> Point {
    let half = size as f32 / 2.0;
    Point::new(
        p.x.clamp(half, (surface_w - half).max(half)),
        p.y.clamp(half, (surface_h - half).max(half)),
    )
}

/// The translation that maps the pointer position to the lens center at
/// the current zoom. Takes the raw pointer, not the clamped center: when
/// the lens body is pinned at an edge, the magnified point stays the one
/// under the cursor.
pub fn content_offset(p: Point, geometry: LensGeometry) -> (f32, f32) {
    let half = geometry.half();
    (
        -(p.x * geometry.zoom() - half),
        -(p.y * geometry.zoom() - half),
    )
}

/// Eases the lens toward the pointer by a fixed fraction per frame.
/// Visual: the lens trails the cursor slightly instead of snapping.
pub struct Follower {
    factor: f32,
    current: Option<Point>,
}

impl Follower {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.05, 1.0),
            current: None,
        }
    }

    /// The first sample lands exactly; later samples glide toward the target.
    pub fn step(&mut self, target: Point) -> Point {
        let next = match self.current {
            None => target,
            Some(cur) => Point::new(
                cur.x + (target.x - cur.x) * self.factor,
                cur.y + (target.y - cur.y) * self.factor,
            ),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Renders the magnified view into an off-screen canvas sized to the lens.
pub struct LensRenderer {
    geometry: LensGeometry,
    canvas: FrameBuffer,
    last_center: Option<(i32, i32)>,
}

impl LensRenderer {
    pub fn new(geometry: LensGeometry) -> Self {
        let size = geometry.size();
        Self {
            geometry,
            canvas: FrameBuffer::filled(size, size, BACKDROP),
            last_center: None,
        }
    }

    pub fn geometry(&self) -> LensGeometry {
        self.geometry
    }

    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    /// Decide where the lens should sit for this pointer sample.
    /// Returns the clamped center plus whether it differs from the last
    /// placement, so callers can skip redundant window moves.
    pub fn place(&mut self, p: Point, surface_w: f32, surface_h: f32) -> (Point, bool) {
        let center = clamp_center(p, self.geometry.size(), surface_w, surface_h);
        let rounded = (center.x.round() as i32, center.y.round() as i32);
        let moved = self.last_center != Some(rounded);
        self.last_center = Some(rounded);
        (center, moved)
    }

    /// Paint the area around `p` (surface-local coordinates) from the most
    /// recent captured frame. With no frame yet, only backdrop and ring.
    pub fn render(&mut self, frame: Option<&FrameBuffer>, p: Point, surface: PhysicalBounds) {
        let size = self.geometry.size();
        let zoom = self.geometry.zoom();
        let half = self.geometry.half();

        match frame {
            None => {
                for px in &mut self.canvas.pixels {
                    *px = BACKDROP;
                }
            }
            Some(frame) => {
                // Captured frames can be larger than the monitor's reported
                // bounds on HiDPI screens; map through the measured ratio.
                let rx = frame.width as f32 / surface.width.max(1) as f32;
                let ry = frame.height as f32 / surface.height.max(1) as f32;

                for dy in 0..size {
                    let src_y = (p.y + (dy as f32 - half) / zoom) * ry;
                    let row_ok = src_y >= 0.0 && (src_y as usize) < frame.height;
                    for dx in 0..size {
                        let src_x = (p.x + (dx as f32 - half) / zoom) * rx;
                        let color = if row_ok && src_x >= 0.0 && (src_x as usize) < frame.width {
                            frame.pixels[(src_y as usize) * frame.width + src_x as usize]
                        } else {
                            BACKDROP
                        };
                        self.canvas.pixels[dy * size + dx] = color;
                    }
                }
            }
        }

        self.draw_ring();
    }

    fn draw_ring(&mut self) {
        let size = self.canvas.width;
        for t in 0..2 {
            for i in 0..size {
                self.canvas.pixels[t * size + i] = RING; // top row
                self.canvas.pixels[(size - 1 - t) * size + i] = RING; // bottom row
                self.canvas.pixels[i * size + t] = RING; // left column
                self.canvas.pixels[i * size + (size - 1 - t)] = RING; // right column
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_center_clamps_at_origin() {
        let c = clamp_center(Point::new(0.0, 0.0), 180, 1024.0, 768.0);
        assert!(approx(c.x, 90.0) && approx(c.y, 90.0));
    }

    #[test]
    fn test_center_passes_through_interior() {
        let c = clamp_center(Point::new(500.0, 400.0), 180, 1024.0, 768.0);
        assert!(approx(c.x, 500.0) && approx(c.y, 400.0));
    }

    #[test]
    fn test_center_clamps_far_edges() {
        let c = clamp_center(Point::new(1020.0, 760.0), 180, 1024.0, 768.0);
        assert!(approx(c.x, 934.0) && approx(c.y, 678.0));
    }

    #[test]
    fn test_surface_smaller_than_lens_pins_near_side() {
        let c = clamp_center(Point::new(95.0, 30.0), 180, 100.0, 768.0);
        assert!(approx(c.x, 90.0));
    }

    #[test]
    fn test_content_offset_formula() {
        let g = LensGeometry::new(180, 2.0);
        let (tx, ty) = content_offset(Point::new(200.0, 150.0), g);
        assert!(approx(tx, -310.0) && approx(ty, -210.0));
    }

    #[test]
    fn test_content_offset_uses_raw_pointer() {
        // At the surface corner the lens body clamps but the offset does not.
        let g = LensGeometry::new(180, 2.0);
        let (tx, ty) = content_offset(Point::new(0.0, 0.0), g);
        assert!(approx(tx, 90.0) && approx(ty, 90.0));
    }

    #[test]
    fn test_geometry_setters_clamp() {
        let mut g = LensGeometry::default();
        g.set_zoom(10.0);
        assert!(approx(g.zoom(), MAX_ZOOM));
        g.set_zoom(0.25);
        assert!(approx(g.zoom(), MIN_ZOOM));
        g.set_size(10);
        assert_eq!(g.size(), MIN_LENS_SIZE);
        g.set_size(4000);
        assert_eq!(g.size(), MAX_LENS_SIZE);
        g.set_size(200);
        g.set_zoom(3.0);
        assert_eq!(g.size(), 200);
        assert!(approx(g.zoom(), 3.0));
    }

    #[test]
    fn test_geometry_ignores_non_finite_zoom() {
        let mut g = LensGeometry::default();
        g.set_zoom(f32::NAN);
        assert!(approx(g.zoom(), DEFAULT_ZOOM));
    }

    #[test]
    fn test_follower_snaps_then_glides() {
        let mut f = Follower::new(0.5);
        let first = f.step(Point::new(10.0, 0.0));
        assert!(approx(first.x, 10.0));

        let second = f.step(Point::new(20.0, 0.0));
        assert!(approx(second.x, 15.0));
        let third = f.step(Point::new(20.0, 0.0));
        assert!(approx(third.x, 17.5));
    }

    #[test]
    fn test_follower_reset_snaps_again() {
        let mut f = Follower::new(0.3);
        f.step(Point::new(0.0, 0.0));
        f.reset();
        let p = f.step(Point::new(50.0, 50.0));
        assert!(approx(p.x, 50.0) && approx(p.y, 50.0));
    }

    #[test]
    fn test_place_reports_moves_once() {
        let mut r = LensRenderer::new(LensGeometry::new(180, 2.0));
        let (_, moved) = r.place(Point::new(300.0, 300.0), 1024.0, 768.0);
        assert!(moved);
        let (_, moved) = r.place(Point::new(300.0, 300.0), 1024.0, 768.0);
        assert!(!moved);
        let (_, moved) = r.place(Point::new(301.0, 300.0), 1024.0, 768.0);
        assert!(moved);
    }

    fn test_surface(w: u32, h: u32) -> PhysicalBounds {
        PhysicalBounds {
            x: 0,
            y: 0,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_render_centers_the_pointer_pixel() {
        let mut frame = FrameBuffer::filled(100, 100, 0x00FFFFFF);
        frame.pixels[40 * 100 + 30] = 0x00FF0000;

        let mut r = LensRenderer::new(LensGeometry::new(80, 2.0));
        r.render(Some(&frame), Point::new(30.0, 40.0), test_surface(100, 100));

        // The canvas center shows exactly the pixel under the pointer.
        assert_eq!(r.canvas().pixels[40 * 80 + 40], 0x00FF0000);
    }

    #[test]
    fn test_render_fills_backdrop_past_the_edge() {
        let frame = FrameBuffer::filled(100, 100, 0x00FFFFFF);
        let mut r = LensRenderer::new(LensGeometry::new(80, 2.0));
        r.render(Some(&frame), Point::new(0.0, 0.0), test_surface(100, 100));

        // Just inside the ring, samples land off-frame and get the backdrop.
        assert_eq!(r.canvas().pixels[5 * 80 + 5], BACKDROP);
    }

    #[test]
    fn test_render_without_frame_is_backdrop_and_ring() {
        let mut r = LensRenderer::new(LensGeometry::new(80, 2.0));
        r.render(None, Point::new(10.0, 10.0), test_surface(100, 100));
        assert_eq!(r.canvas().pixels[40 * 80 + 40], BACKDROP);
        assert_eq!(r.canvas().pixels[0], RING);
    }

    #[test]
    fn test_render_maps_hidpi_frames() {
        // Frame is 2x the reported surface: pointer (25,25) samples (50,50).
        let mut frame = FrameBuffer::filled(200, 200, 0x00FFFFFF);
        frame.pixels[50 * 200 + 50] = 0x0000FF00;

        let mut r = LensRenderer::new(LensGeometry::new(80, 2.0));
        r.render(Some(&frame), Point::new(25.0, 25.0), test_surface(100, 100));
        assert_eq!(r.canvas().pixels[40 * 80 + 40], 0x0000FF00);
    }
}
