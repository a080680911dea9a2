//! The player character: acceleration, jumping, rolling and the animation
//! counters that drive footsteps and landing dust.
//!
//! Motion is a two-state tag (grounded / airborne). Rolling, shooting and
//! knockback are independent overlays on top of it, since any of them can
//! coexist with either motion state.

use ember_core::audio::{AudioSink, Sound};
use ember_core::draw::{Facing, PlayerPose, Visual};
use ember_core::geometry::Rect;
use glam::Vec2;

use super::{apply_gravity, Animated, Collidable, Movable};
use crate::collision::{any_contact, resolve_horizontal, resolve_vertical, VerticalContact};
use crate::config::GameConfig;
use crate::entity::Wall;

const WALK_FRAMES: u8 = 4;
const WALK_PERIOD: u8 = 9;
const FOOTSTEP_PERIOD: u8 = 20;
const FOOTSTEP_CUE: u8 = 5;
const ROLL_PERIOD: u8 = 5;
const ROLL_FRAMES: u8 = 5;
/// Deceleration runs at this multiple of the acceleration until near zero.
const BRAKE_FACTOR: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Grounded,
    Airborne,
}

/// Landing dust is armed by leaving the ground and spent over a few ticks
/// after touching down again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingDust {
    Idle,
    Pending,
    Emitting(u8),
}

impl LandingDust {
    fn on_airborne(&mut self) {
        *self = Self::Pending;
    }

    fn on_landing(&mut self, ticks: u8) {
        if *self == Self::Pending {
            *self = if ticks > 0 { Self::Emitting(ticks) } else { Self::Idle };
        }
    }

    /// Consume one tick of emission; true when a puff should spawn.
    pub fn take_tick(&mut self) -> bool {
        match *self {
            Self::Emitting(n) if n > 1 => {
                *self = Self::Emitting(n - 1);
                true
            }
            Self::Emitting(_) => {
                *self = Self::Idle;
                true
            }
            _ => false,
        }
    }
}

/// Held movement state sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump_held: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Roll {
    index: u8,
    counter: u8,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub rect: Rect,
    pub velocity: Vec2,
    pub facing: Facing,
    pub motion: Motion,
    /// Set while a horizontal key is applied or the player is still sliding.
    pub moving: bool,
    pub shooting: bool,
    /// One-tick recoil after a shot.
    pub knockback: bool,
    /// A jump was pressed just before landing; it fires on touchdown.
    pub jump_latched: bool,
    pub landing_dust: LandingDust,
    /// Sits directly under the player; used to detect near-ground jump presses.
    pub jump_probe: Rect,
    jump_held: bool,
    left_lock: bool,
    right_lock: bool,
    roll: Option<Roll>,
    walk_index: u8,
    walk_counter: u8,
    footstep_counter: u8,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let [w, h] = config.player_size;
        let rect = Rect::from_center(Vec2::from(config.player_start), w, h);
        let mut player = Self {
            rect,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            motion: Motion::Grounded,
            moving: false,
            shooting: false,
            knockback: false,
            jump_latched: false,
            landing_dust: LandingDust::Idle,
            jump_probe: Rect::new(0.0, 0.0, w, config.jump_probe_height),
            jump_held: false,
            left_lock: false,
            right_lock: false,
            roll: None,
            walk_index: 0,
            walk_counter: 0,
            footstep_counter: 0,
        };
        player.place_probe();
        player
    }

    pub fn place_at(&mut self, center: Vec2) {
        self.rect.set_center(center);
        self.place_probe();
    }

    pub fn is_rolling(&self) -> bool {
        self.roll.is_some()
    }

    /// Jump press. Grounded jumps immediately; a falling player latches the
    /// jump if the ground is close enough underfoot. Presses while still
    /// rising are dropped.
    pub fn request_jump(&mut self, walls: &[Wall], config: &GameConfig) {
        match self.motion {
            Motion::Grounded => self.jump(config),
            Motion::Airborne => {
                if self.velocity.y >= 0.0 && any_contact(&self.jump_probe, walls) {
                    self.jump_latched = true;
                }
            }
        }
    }

    fn jump(&mut self, config: &GameConfig) {
        if self.motion == Motion::Grounded {
            self.motion = Motion::Airborne;
            self.velocity.y = config.jump_impulse;
        }
    }

    pub fn update(
        &mut self,
        input: PlayerInput,
        walls: &[Wall],
        config: &GameConfig,
        audio: &mut dyn AudioSink,
    ) {
        self.read_input(input, config);

        if self.velocity.x > 0.0 {
            self.facing = Facing::Right;
        } else if self.velocity.x < 0.0 {
            self.facing = Facing::Left;
        }

        if self.moving {
            self.rect.x += self.velocity.x;
        }
        if self.knockback {
            self.rect.x -= self.facing.sign() * config.knockback_push;
            self.facing = self.facing.flipped();
        }
        resolve_horizontal(
            &mut self.rect,
            &mut self.velocity,
            self.facing,
            walls,
            config.player_acceleration,
        );
        if self.knockback {
            self.facing = self.facing.flipped();
        }

        self.velocity.y = apply_gravity(self.velocity.y, config.gravity, config.y_top_speed);
        self.rect.y += self.velocity.y;
        if self.velocity.y < config.jump_cut_speed && !self.jump_held {
            self.velocity.y = config.jump_cut_speed;
        }

        match resolve_vertical(
            &mut self.rect,
            &mut self.velocity,
            walls,
            config.landing_tolerance,
            config.gravity,
        ) {
            VerticalContact::Landed { impact_speed, .. } => {
                self.land(impact_speed, config, audio);
            }
            VerticalContact::Ceiling { .. } | VerticalContact::Airborne => {
                self.motion = Motion::Airborne;
            }
        }

        self.animate(audio);
        self.knockback = false;
        self.place_probe();
    }

    fn read_input(&mut self, input: PlayerInput, config: &GameConfig) {
        let acceleration = config.player_acceleration;
        self.moving = false;

        // Whichever direction was pressed first keeps control while both are held.
        if input.left && !self.left_lock {
            self.right_lock = true;
            self.moving = true;
            self.accelerate(-acceleration, config);
        } else {
            self.right_lock = false;
        }
        if input.right && !self.right_lock {
            self.left_lock = true;
            self.moving = true;
            self.accelerate(acceleration, config);
        } else {
            self.left_lock = false;
        }
        if !input.left && !input.right {
            if self.velocity.x != 0.0 {
                self.moving = true;
            }
            self.accelerate(0.0, config);
        }

        self.jump_held = input.jump_held;
    }

    fn accelerate(&mut self, acceleration: f32, config: &GameConfig) {
        let top = config.x_top_speed;
        let vx = self.velocity.x;
        self.velocity.x = if acceleration != 0.0 {
            (vx + acceleration).clamp(-top, top)
        } else {
            let step = config.player_acceleration;
            let brake = step * BRAKE_FACTOR;
            if vx > 0.0 {
                if vx - brake > 0.0 {
                    vx - brake
                } else {
                    (vx - step).max(0.0)
                }
            } else if vx < 0.0 {
                if vx + brake < 0.0 {
                    vx + brake
                } else {
                    (vx + step).min(0.0)
                }
            } else {
                0.0
            }
        };
    }

    fn land(&mut self, impact_speed: f32, config: &GameConfig, audio: &mut dyn AudioSink) {
        if self.roll.is_none()
            && impact_speed > config.roll_fall_speed
            && self.velocity.x.abs() == config.x_top_speed
        {
            self.roll = Some(Roll::default());
            audio.play(Sound::Roll);
        }
        self.landing_dust.on_landing(config.landing_dust_ticks);
        self.motion = Motion::Grounded;
        if self.jump_latched {
            self.jump_latched = false;
            self.jump(config);
        }
    }

    fn animate(&mut self, audio: &mut dyn AudioSink) {
        if self.velocity.x != 0.0 && self.motion == Motion::Grounded {
            self.walk_counter = (self.walk_counter + 1) % WALK_PERIOD;
            if self.walk_counter == WALK_PERIOD - 1 {
                self.walk_index = (self.walk_index + 1) % WALK_FRAMES;
            }
            self.footstep_counter = (self.footstep_counter + 1) % FOOTSTEP_PERIOD;
            if self.footstep_counter == FOOTSTEP_CUE {
                audio.play(Sound::Footstep);
            }
        } else {
            self.walk_index = 0;
        }

        if self.motion == Motion::Airborne {
            self.landing_dust.on_airborne();
        }

        if let Some(roll) = self.roll.as_mut() {
            roll.counter = (roll.counter + 1) % ROLL_PERIOD;
            if roll.counter == ROLL_PERIOD - 1 {
                roll.index += 1;
            }
            if roll.index >= ROLL_FRAMES {
                self.roll = None;
            }
        }
    }

    fn place_probe(&mut self) {
        self.jump_probe.set_center(self.rect.center());
        self.jump_probe.set_top(self.rect.bottom());
    }

    pub fn pose(&self) -> PlayerPose {
        if let Some(roll) = self.roll {
            PlayerPose::Roll(roll.index)
        } else if self.shooting {
            PlayerPose::Shoot
        } else if self.motion == Motion::Airborne {
            PlayerPose::Jump
        } else {
            PlayerPose::Walk(self.walk_index)
        }
    }
}

impl Collidable for Player {
    fn rect(&self) -> &Rect {
        &self.rect
    }
}

impl Movable for Player {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

impl Animated for Player {
    fn visual(&self) -> Visual {
        Visual::Player {
            pose: self.pose(),
            facing: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::audio::RecordingAudio;

    const FLOOR_TOP: f32 = 500.0;

    fn floor() -> Vec<Wall> {
        vec![Wall::solid(Rect::new(-1000.0, FLOOR_TOP, 4000.0, 32.0))]
    }

    fn standing_player(config: &GameConfig) -> Player {
        let mut player = Player::new(config);
        player.rect.set_bottom(FLOOR_TOP);
        player.velocity.y = config.gravity;
        player.place_probe();
        player
    }

    fn step(player: &mut Player, input: PlayerInput, walls: &[Wall], config: &GameConfig) {
        let mut audio = RecordingAudio::default();
        player.update(input, walls, config, &mut audio);
    }

    #[test]
    fn standing_on_floor_stays_grounded() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        for _ in 0..10 {
            step(&mut player, PlayerInput::default(), &walls, &config);
        }
        assert_eq!(player.motion, Motion::Grounded);
        assert_eq!(player.rect.bottom(), FLOOR_TOP);
        assert_eq!(player.velocity.y, config.gravity);
    }

    #[test]
    fn jump_then_release_cuts_rise() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        step(&mut player, PlayerInput::default(), &walls, &config);

        player.request_jump(&walls, &config);
        assert_eq!(player.motion, Motion::Airborne);
        assert_eq!(player.velocity.y, -15.0);

        let held = PlayerInput {
            jump_held: true,
            ..PlayerInput::default()
        };
        step(&mut player, held, &walls, &config);
        assert_eq!(player.velocity.y, -14.0);

        step(&mut player, PlayerInput::default(), &walls, &config);
        assert_eq!(player.velocity.y, config.jump_cut_speed);
    }

    #[test]
    fn full_jump_returns_to_ground() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        step(&mut player, PlayerInput::default(), &walls, &config);
        player.request_jump(&walls, &config);

        let held = PlayerInput {
            jump_held: true,
            ..PlayerInput::default()
        };
        let mut ticks = 0;
        loop {
            step(&mut player, held, &walls, &config);
            ticks += 1;
            if player.motion == Motion::Grounded || ticks > 100 {
                break;
            }
        }
        assert_eq!(player.motion, Motion::Grounded);
        assert_eq!(player.rect.bottom(), FLOOR_TOP);
        assert!(ticks > 20);
        assert!(matches!(player.landing_dust, LandingDust::Emitting(5)));
    }

    #[test]
    fn speed_never_exceeds_caps() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        let right = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        for _ in 0..40 {
            step(&mut player, right, &walls, &config);
            assert!(player.velocity().x.abs() <= config.x_top_speed);
            assert!(player.velocity().y <= config.y_top_speed);
        }
        assert_eq!(player.velocity.x, config.x_top_speed);
    }

    #[test]
    fn release_brakes_at_triple_rate() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.velocity.x = 6.0;
        player.accelerate(0.0, &config);
        assert_eq!(player.velocity.x, 4.5);
        player.velocity.x = 1.0;
        player.accelerate(0.0, &config);
        assert_eq!(player.velocity.x, 0.5);
        player.accelerate(0.0, &config);
        assert_eq!(player.velocity.x, 0.0);
        player.velocity.x = -3.0;
        player.accelerate(0.0, &config);
        assert_eq!(player.velocity.x, -1.5);
    }

    #[test]
    fn first_pressed_direction_wins() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        let right = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        step(&mut player, right, &walls, &config);
        let both = PlayerInput {
            left: true,
            right: true,
            jump_held: false,
        };
        step(&mut player, both, &walls, &config);
        step(&mut player, both, &walls, &config);
        assert!(player.velocity.x > 0.0);
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn jump_pressed_just_above_ground_fires_on_landing() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        player.motion = Motion::Airborne;
        player.rect.set_bottom(FLOOR_TOP - 20.0);
        player.velocity.y = 4.0;
        player.place_probe();

        player.request_jump(&walls, &config);
        assert!(player.jump_latched);

        let held = PlayerInput {
            jump_held: true,
            ..PlayerInput::default()
        };
        for _ in 0..10 {
            step(&mut player, held, &walls, &config);
            if player.velocity.y < 0.0 {
                break;
            }
        }
        assert!(!player.jump_latched);
        assert_eq!(player.motion, Motion::Airborne);
        assert_eq!(player.velocity.y, config.jump_impulse);
    }

    #[test]
    fn jump_from_rest_on_a_platform() {
        let config = GameConfig::default();
        let walls = vec![Wall::platform(Rect::new(-1000.0, FLOOR_TOP, 4000.0, 32.0))];
        let mut player = standing_player(&config);

        step(&mut player, PlayerInput::default(), &walls, &config);
        assert_eq!(player.motion, Motion::Grounded);
        assert_eq!(player.rect.bottom(), FLOOR_TOP);

        player.request_jump(&walls, &config);
        assert_eq!(player.velocity.y, config.jump_impulse);
        assert_eq!(player.motion, Motion::Airborne);

        // The jump sensor still touches the platform, but a rising press is dropped.
        player.request_jump(&walls, &config);
        assert!(!player.jump_latched);

        let held = PlayerInput {
            jump_held: true,
            ..PlayerInput::default()
        };
        step(&mut player, held, &walls, &config);
        assert!(player.velocity.y < 0.0);
        player.request_jump(&walls, &config);
        assert!(!player.jump_latched);
    }

    #[test]
    fn jump_pressed_high_in_the_air_is_ignored() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        player.motion = Motion::Airborne;
        player.rect.set_bottom(FLOOR_TOP - 200.0);
        player.place_probe();

        player.request_jump(&walls, &config);
        assert!(!player.jump_latched);
        assert_eq!(player.motion, Motion::Airborne);
    }

    #[test]
    fn hard_landing_at_top_speed_rolls() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        player.motion = Motion::Airborne;
        player.velocity = Vec2::new(config.x_top_speed, 20.0);
        player.rect.set_bottom(FLOOR_TOP - 10.0);

        let mut audio = RecordingAudio::default();
        let right = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        player.update(right, &walls, &config, &mut audio);
        assert!(player.is_rolling());
        assert!(audio.played.contains(&Sound::Roll));
        assert!(matches!(player.pose(), PlayerPose::Roll(0)));

        for _ in 0..30 {
            player.update(right, &walls, &config, &mut audio);
        }
        assert!(!player.is_rolling());
    }

    #[test]
    fn knockback_pushes_against_facing() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        let x = player.rect.x;
        player.knockback = true;
        step(&mut player, PlayerInput::default(), &walls, &config);
        assert_eq!(player.rect.x, x - config.knockback_push);
        assert_eq!(player.facing, Facing::Right);
        assert!(!player.knockback);
    }

    #[test]
    fn wall_contact_snaps_and_rebounds() {
        let config = GameConfig::default();
        let mut walls = floor();
        let start_right = standing_player(&config).rect.right();
        walls.push(Wall::solid(Rect::new(start_right + 3.0, 0.0, 32.0, FLOOR_TOP)));
        let mut player = standing_player(&config);
        player.velocity.x = 5.0;
        let right = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        step(&mut player, right, &walls, &config);
        assert_eq!(player.rect.right(), start_right + 3.0);
        assert_eq!(player.velocity.x, config.player_acceleration);
    }

    #[test]
    fn walking_cues_footsteps() {
        let config = GameConfig::default();
        let walls = floor();
        let mut player = standing_player(&config);
        let mut audio = RecordingAudio::default();
        let right = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        for _ in 0..40 {
            player.update(right, &walls, &config, &mut audio);
        }
        assert_eq!(
            audio
                .played
                .iter()
                .filter(|s| **s == Sound::Footstep)
                .count(),
            2
        );
    }

    #[test]
    fn landing_dust_spends_its_ticks() {
        let mut dust = LandingDust::Pending;
        dust.on_landing(2);
        assert!(dust.take_tick());
        assert!(dust.take_tick());
        assert!(!dust.take_tick());
        assert_eq!(dust, LandingDust::Idle);

        let mut idle = LandingDust::Idle;
        idle.on_landing(5);
        assert_eq!(idle, LandingDust::Idle);
    }
}
