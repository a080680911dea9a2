use ember_core::draw::Visual;
use ember_core::geometry::Rect;
use glam::Vec2;

use super::{Animated, Expirable, Movable};

pub const CLOUD_SIZE: [f32; 2] = [128.0, 64.0];

/// Background cloud drifting left in screen space.
#[derive(Debug, Clone)]
pub struct Cloud {
    pub rect: Rect,
    pub speed: f32,
    pub dead: bool,
}

impl Cloud {
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Self {
            rect: Rect::new(x, y, CLOUD_SIZE[0], CLOUD_SIZE[1]),
            speed,
            dead: false,
        }
    }

    pub fn update(&mut self) {
        self.rect.x -= self.speed;
        if self.rect.right() <= 0.0 {
            self.dead = true;
        }
    }
}

impl Movable for Cloud {
    fn velocity(&self) -> Vec2 {
        Vec2::new(-self.speed, 0.0)
    }
}

impl Expirable for Cloud {
    fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Animated for Cloud {
    fn visual(&self) -> Visual {
        Visual::Cloud
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_once_fully_off_screen() {
        let mut cloud = Cloud::new(-CLOUD_SIZE[0] + 3.0, 10.0, 2.0);
        cloud.update();
        assert!(!cloud.dead);
        cloud.update();
        assert!(cloud.dead);
    }
}
