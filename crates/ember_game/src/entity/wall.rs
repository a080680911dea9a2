use ember_core::draw::Visual;
use ember_core::geometry::Rect;

use super::{Collidable, Expirable};

/// A static tile. Also used for the non-colliding detail layers, where
/// `dead` marks foliage burned away by a fireball.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub rect: Rect,
    /// Solid only from above (platforms).
    pub top_solid: bool,
    pub dead: bool,
    /// `None` for invisible level borders.
    pub visual: Option<Visual>,
}

impl Wall {
    pub fn new(rect: Rect, top_solid: bool, visual: Option<Visual>) -> Self {
        Self {
            rect,
            top_solid,
            dead: false,
            visual,
        }
    }

    pub fn solid(rect: Rect) -> Self {
        Self::new(rect, false, None)
    }

    pub fn platform(rect: Rect) -> Self {
        Self::new(rect, true, None)
    }
}

impl Collidable for Wall {
    fn rect(&self) -> &Rect {
        &self.rect
    }
}

impl Expirable for Wall {
    fn is_dead(&self) -> bool {
        self.dead
    }
}

