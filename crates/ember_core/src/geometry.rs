//! Axis-aligned rectangles in screen space (x grows right, y grows down).
//!
//! Every simulated body is a `Rect`. Edges follow the usual sprite
//! convention: `right = x + w`, `bottom = y + h`, and two rectangles that only
//! share an edge do NOT overlap. That last rule matters for platforming: a
//! body resting exactly on a floor tile is not "inside" it, so the next
//! gravity step is what re-establishes ground contact.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w * 0.5,
            y: center.y - h * 0.5,
            w,
            h,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w * 0.5;
        self.y = center.y - self.h * 0.5;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn offset(&self, by: Vec2) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
            ..*self
        }
    }

    /// Strict overlap test: shared edges are not an overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_position_and_size() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(0.0, 0.0, 16.0, 8.0);
        r.set_right(100.0);
        r.set_bottom(50.0);
        assert_eq!(r.x, 84.0);
        assert_eq!(r.y, 42.0);
        assert_eq!(r.w, 16.0);
        assert_eq!(r.h, 8.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let floor = Rect::new(0.0, 100.0, 32.0, 32.0);
        let body = Rect::new(0.0, 50.0, 32.0, 50.0);
        assert!(!body.overlaps(&floor));
        assert!(body.offset(Vec2::new(0.0, 0.5)).overlaps(&floor));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
    }

    #[test]
    fn from_center_round_trips_center() {
        let r = Rect::from_center(Vec2::new(64.0, 300.0), 51.0, 112.0);
        assert!((r.center() - Vec2::new(64.0, 300.0)).length() < 1e-4);
    }
}
