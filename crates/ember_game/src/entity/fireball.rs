use ember_core::draw::{Facing, Visual};
use ember_core::geometry::Rect;
use glam::Vec2;

use super::{overlapping_mut, Animal, Animated, Collidable, Expirable, Movable};
use crate::collision::contacts;
use crate::config::GameConfig;
use crate::entity::Wall;

/// Horizontal projectile fired by the player.
#[derive(Debug, Clone)]
pub struct Fireball {
    pub rect: Rect,
    pub facing: Facing,
    /// Signed; positive travels right.
    pub speed: f32,
    pub dead: bool,
    wall_tolerance: f32,
}

impl Fireball {
    pub fn new(center: Vec2, facing: Facing, config: &GameConfig) -> Self {
        let [w, h] = config.fireball_size;
        Self {
            rect: Rect::from_center(center, w, h),
            facing,
            speed: config.fireball_speed * facing.sign(),
            dead: false,
            wall_tolerance: config.fireball_wall_tolerance,
        }
    }

    /// Advance, then burn details and strike animals. A dead fireball stays
    /// where it died until culled.
    pub fn update(&mut self, walls: &[Wall], details: &mut [Wall], animals: &mut [Animal]) {
        if self.dead {
            return;
        }
        self.rect.x += self.speed;

        for index in contacts(&self.rect, walls) {
            let wall = &walls[index].rect;
            // Skimming along the top of a floor tile does not count as a hit.
            let skimming = (self.rect.bottom() - wall.top()).abs() <= self.wall_tolerance;
            if !skimming && self.penetration(wall) > self.wall_tolerance {
                self.dead = true;
            }
        }

        for detail in overlapping_mut(&self.rect, details) {
            detail.dead = true;
        }

        for animal in overlapping_mut(&self.rect, animals) {
            animal.strike();
            self.dead = true;
        }
    }
}

impl Fireball {
    /// How far the leading edge has travelled past the wall's near face.
    fn penetration(&self, wall: &Rect) -> f32 {
        match self.facing {
            Facing::Right => self.rect.right() - wall.left(),
            Facing::Left => wall.right() - self.rect.left(),
        }
    }
}

impl Collidable for Fireball {
    fn rect(&self) -> &Rect {
        &self.rect
    }
}

impl Movable for Fireball {
    fn velocity(&self) -> Vec2 {
        Vec2::new(self.speed, 0.0)
    }
}

impl Expirable for Fireball {
    fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Animated for Fireball {
    fn visual(&self) -> Visual {
        Visual::Fireball {
            facing: self.facing,
        }
    }
}
