/// Axis-aligned rectangle in layout (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// `max(w/h, h/w)`: 1.0 for a square, growing as the rectangle gets
    /// more elongated. Degenerate rectangles (no width or no height) are
    /// infinitely elongated.
    pub fn aspect_ratio(&self) -> f64 {
        if !(self.w > 0.0 && self.h > 0.0) {
            return f64::INFINITY;
        }
        (self.w / self.h).max(self.h / self.w)
    }

    /// Half-open containment test: left/top edges inside, right/bottom outside.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Area shared with `other` (0 when they only touch or are apart).
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }
}
