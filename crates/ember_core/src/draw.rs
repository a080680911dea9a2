//! Renderer contract: what the simulation hands to whoever draws the frame.
//!
//! A frame is a list of layers composited back to front. Each layer carries
//! its own blit offset (camera scroll plus screen shake for the world layer,
//! zero for screen-fixed layers) and a draw-ordered list of items. Items name a
//! [`Visual`] handle rather than pixels, so the same draw list can be fed to the
//! GPU renderer, a test recorder, or nothing at all.

use crate::geometry::Rect;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerPose {
    Walk(u8),
    Jump,
    Shoot,
    Roll(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plumage {
    Blue,
    Red,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WingColor {
    Red,
    Blue,
    Green,
}

/// Image handle. Tiles carry the color their tileset assigned; everything
/// else is resolved by the renderer's palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    Sky,
    Tile { id: u32, color: [u8; 4] },
    Player { pose: PlayerPose, facing: Facing },
    Fireball { facing: Facing },
    Bird { plumage: Plumage, facing: Facing },
    Butterfly { wings: WingColor, frame: u8 },
    Cloud,
    Fire { green: u8 },
    Dust,
    MenuOption { selected: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub visual: Visual,
    pub rect: Rect,
    /// 0.0 (invisible) ..= 1.0 (opaque)
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawLayer {
    pub offset: Vec2,
    pub items: Vec<DrawItem>,
}

impl DrawLayer {
    pub fn new(offset: Vec2) -> Self {
        Self {
            offset,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, visual: Visual, rect: Rect) {
        self.push_faded(visual, rect, 1.0);
    }

    pub fn push_faded(&mut self, visual: Visual, rect: Rect, opacity: f32) {
        self.items.push(DrawItem {
            visual,
            rect,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawList {
    pub clear_color: [u8; 4],
    pub layers: Vec<DrawLayer>,
}

impl DrawList {
    pub fn new(clear_color: [u8; 4]) -> Self {
        Self {
            clear_color,
            layers: Vec::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.layers.iter().map(|l| l.items.len()).sum()
    }
}

pub trait Renderer {
    /// Accept the composed frame. Called once per simulation tick; a renderer
    /// that presents less often simply keeps the latest list.
    fn submit(&mut self, frame: DrawList);
}

/// Renderer that discards every frame. Used by headless runs.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_submitted: u64,
}

impl Renderer for NullRenderer {
    fn submit(&mut self, _frame: DrawList) {
        self.frames_submitted += 1;
    }
}

/// Renderer that keeps the most recent frame. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub last: Option<DrawList>,
}

impl Renderer for RecordingRenderer {
    fn submit(&mut self, frame: DrawList) {
        self.last = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_faded_clamps_opacity() {
        let mut layer = DrawLayer::new(Vec2::ZERO);
        layer.push_faded(Visual::Dust, Rect::new(0.0, 0.0, 8.0, 8.0), 1.9);
        layer.push_faded(Visual::Dust, Rect::new(0.0, 0.0, 8.0, 8.0), -0.3);
        assert_eq!(layer.items[0].opacity, 1.0);
        assert_eq!(layer.items[1].opacity, 0.0);
    }

    #[test]
    fn item_count_spans_layers() {
        let mut list = DrawList::new([0, 0, 0, 255]);
        let mut a = DrawLayer::new(Vec2::ZERO);
        a.push(Visual::Sky, Rect::new(0.0, 0.0, 800.0, 640.0));
        let mut b = DrawLayer::new(Vec2::new(-10.0, 0.0));
        b.push(Visual::Cloud, Rect::new(0.0, 0.0, 10.0, 10.0));
        b.push(Visual::Dust, Rect::new(0.0, 0.0, 8.0, 8.0));
        list.layers.push(a);
        list.layers.push(b);
        assert_eq!(list.item_count(), 3);
    }

    #[test]
    fn facing_flip_and_sign() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
    }
}
