//! The playing state: owns every entity collection and advances them one
//! fixed tick at a time.
//!
//! Order within a tick matters and is fixed:
//! 1. entity updates (player, particles, clouds, projectiles, animals)
//! 2. continuous fire from the held pointer
//! 3. shooting pose from the cooldown
//! 4. camera follow and clamp
//! 5. fall-out reset (ends the tick early)
//! 6. cloud spawn
//! 7. derived effects: fireball trails, burning details, burning animals
//! 8. cull, with impact dust for expired fireballs
//! 9. landing dust, then ambient movement dust
//! 10. shake decay

use ember_core::audio::{AudioSink, Sound};
use ember_core::draw::{DrawLayer, DrawList, Facing, Plumage, Renderer, Visual, WingColor};
use ember_core::geometry::Rect;
use ember_core::input::{InputEvent, Key, MouseBtn};
use glam::Vec2;
use rand::Rng;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::entity::particles::{BURST_FADE, DEFAULT_FADE};
use crate::entity::{
    cull, Animal, Animated, Bird, Butterfly, Cloud, Collidable, Dust, Fire, Fireball, Motion,
    Player, PlayerInput, Wall,
};
use crate::level::{build_level, LevelContent, LevelError};
use crate::rng::{one_in, SimRng};
use crate::states::{State, StateContext, StateFlow, StateId};
use crate::tileset::TilesetRegistry;

pub const SKY_COLOR: [u8; 4] = [120, 180, 235, 255];

const PARTICLE_SIZE: f32 = 8.0;
const TRAIL_OFFSET: f32 = 8.0;
const TRAIL_SPREAD: i32 = 16;
const TRAIL_SLOWDOWN: f32 = 5.0;
const BURST_COUNT: usize = 5;
const BURST_SPREAD: i32 = 4;
const IMPACT_DUST_COUNT: usize = 5;
const IMPACT_DUST_SPEED: f32 = 4.0;
const IMPACT_DUST_SPREAD: i32 = 4;
const PLAYER_DUST_SPREAD: i32 = 5;
const PLAYER_DUST_LIFT: f32 = -3.0;
const FIREBALL_JITTER: i32 = 10;
const CLOUD_MAX_Y: i32 = 300;

/// Static content shared by every reset of the level.
#[derive(Debug, Clone)]
pub struct GameContent {
    pub tiles: TilesetRegistry,
    pub level: LevelContent,
}

/// Held input sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub player: PlayerInput,
    pub fire_held: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The player fell out of the level; the world must be rebuilt.
    Reset,
}

#[derive(Debug, Clone)]
pub struct World {
    pub player: Player,
    pub walls: Vec<Wall>,
    pub background_details: Vec<Wall>,
    pub details: Vec<Wall>,
    pub projectiles: Vec<Fireball>,
    pub fires: Vec<Fire>,
    pub dust: Vec<Dust>,
    pub animals: Vec<Animal>,
    pub clouds: Vec<Cloud>,
    pub camera_x: f32,
    pub shake: f32,
    pub last_shot_us: Option<u64>,
    pub columns: usize,
}

impl World {
    pub fn build(
        content: &GameContent,
        config: &GameConfig,
        rng: &mut SimRng,
    ) -> Result<Self, LevelError> {
        let level = build_level(&content.level, &content.tiles, config)?;

        let mut player = Player::new(config);
        player.place_at(level.player_start);

        let mut animals = Vec::with_capacity(level.birds.len() + level.butterflies.len());
        for position in &level.birds {
            let plumage = match rng.cosmetic.gen_range(0..3) {
                0 => Plumage::Blue,
                1 => Plumage::Red,
                _ => Plumage::Yellow,
            };
            animals.push(Animal::Bird(Bird::new(*position, plumage)));
        }
        for position in &level.butterflies {
            let wings = match rng.cosmetic.gen_range(0..3) {
                0 => WingColor::Red,
                1 => WingColor::Blue,
                _ => WingColor::Green,
            };
            animals.push(Animal::Butterfly(Butterfly::new(*position, wings)));
        }

        Ok(Self {
            player,
            walls: level.walls,
            background_details: level.background_details,
            details: level.details,
            projectiles: Vec::new(),
            fires: Vec::new(),
            dust: Vec::new(),
            animals,
            clouds: Vec::new(),
            camera_x: 0.0,
            shake: config.shake_on_start,
            last_shot_us: None,
            columns: level.columns,
        })
    }

    pub fn request_jump(&mut self, config: &GameConfig) {
        self.player.request_jump(&self.walls, config);
    }

    /// Fire if the cooldown allows. Returns whether a fireball spawned.
    pub fn try_shoot(
        &mut self,
        now_us: u64,
        config: &GameConfig,
        rng: &mut SimRng,
        audio: &mut dyn AudioSink,
    ) -> bool {
        if !self.cooldown_elapsed(now_us, config) {
            return false;
        }
        let jitter = rng.gameplay.gen_range(-FIREBALL_JITTER..=FIREBALL_JITTER) as f32;
        let center = self.player.rect.center() + Vec2::new(0.0, jitter);
        self.projectiles
            .push(Fireball::new(center, self.player.facing, config));
        self.player.knockback = true;
        self.shake = config.shake_on_fire;
        audio.play(Sound::Fireball);
        self.last_shot_us = Some(now_us);
        log::debug!("Fireball fired at t={}us facing {:?}", now_us, self.player.facing);
        true
    }

    fn cooldown_elapsed(&self, now_us: u64, config: &GameConfig) -> bool {
        match self.last_shot_us {
            Some(last) => now_us.saturating_sub(last) >= config.fire_cooldown_us(),
            None => true,
        }
    }

    pub fn tick(
        &mut self,
        input: TickInput,
        now_us: u64,
        config: &GameConfig,
        rng: &mut SimRng,
        audio: &mut dyn AudioSink,
    ) -> TickOutcome {
        self.player
            .update(input.player, &self.walls, config, &mut *audio);
        for fire in &mut self.fires {
            fire.update(&self.walls);
        }
        for dust in &mut self.dust {
            dust.update(config.gravity);
        }
        for cloud in &mut self.clouds {
            cloud.update();
        }
        for fireball in &mut self.projectiles {
            fireball.update(&self.walls, &mut self.details, &mut self.animals);
        }
        for animal in &mut self.animals {
            animal.update(&self.walls, config, &mut rng.gameplay);
        }

        if input.fire_held {
            self.try_shoot(now_us, config, rng, &mut *audio);
        }
        self.player.shooting = self
            .last_shot_us
            .is_some_and(|last| now_us.saturating_sub(last) < config.fire_cooldown_us());

        self.camera_x = camera_offset(self.player.rect.x, self.columns, config);

        if self.player.rect.y > config.respawn_y {
            log::info!("Player fell out of the level; resetting");
            return TickOutcome::Reset;
        }

        if one_in(&mut rng.cosmetic, config.cloud_odds) {
            let y = rng.cosmetic.gen_range(0..=CLOUD_MAX_Y) as f32;
            let speed = rng.cosmetic.gen_range(1..3) as f32;
            self.clouds
                .push(Cloud::new(config.display_width as f32, y, speed));
        }

        self.spawn_derived_effects(rng);
        self.cull(rng);
        self.spawn_player_dust(rng, config);

        if self.shake > 0.0 {
            self.shake = (self.shake - config.shake_decay).max(0.0);
        }
        TickOutcome::Continue
    }

    fn spawn_derived_effects(&mut self, rng: &mut SimRng) {
        let cosmetic = &mut rng.cosmetic;

        for fireball in self.projectiles.iter().filter(|f| !f.dead) {
            let center = fireball.rect.center();
            let x = match fireball.facing {
                Facing::Right => center.x - TRAIL_OFFSET,
                Facing::Left => center.x + TRAIL_OFFSET,
            };
            let y = center.y + cosmetic.gen_range(-TRAIL_SPREAD..=TRAIL_SPREAD) as f32;
            let width = cosmetic.gen_range(1..=3) as f32 * PARTICLE_SIZE;
            let speed = fireball.speed - TRAIL_SLOWDOWN * fireball.facing.sign();
            self.fires.push(Fire::new(
                x,
                y,
                Vec2::new(width, PARTICLE_SIZE),
                Vec2::new(speed, 0.0),
                DEFAULT_FADE,
                cosmetic,
            ));
        }

        for detail in self.details.iter().filter(|d| d.dead) {
            for _ in 0..BURST_COUNT {
                self.fires.push(burning_ember(&detail.rect, cosmetic));
            }
        }

        for animal in self.animals.iter().filter(|a| a.is_hit()) {
            self.fires.push(burning_ember(animal.rect(), cosmetic));
        }
    }

    /// Remove everything flagged dead. Expired fireballs leave impact dust.
    /// Returns the number of entities removed; a second call in the same
    /// tick removes nothing.
    pub fn cull(&mut self, rng: &mut SimRng) -> usize {
        let cosmetic = &mut rng.cosmetic;
        for fireball in self.projectiles.iter().filter(|f| f.dead) {
            let (x, vx) = match fireball.facing {
                Facing::Right => (fireball.rect.right(), -IMPACT_DUST_SPEED),
                Facing::Left => (fireball.rect.left(), IMPACT_DUST_SPEED),
            };
            let y = fireball.rect.center().y;
            for _ in 0..IMPACT_DUST_COUNT {
                let vy = cosmetic.gen_range(-IMPACT_DUST_SPREAD..=IMPACT_DUST_SPREAD) as f32;
                self.dust
                    .push(Dust::new(x, y, PARTICLE_SIZE, Vec2::new(vx, vy), cosmetic));
            }
        }

        cull(&mut self.fires)
            + cull(&mut self.dust)
            + cull(&mut self.details)
            + cull(&mut self.animals)
            + cull(&mut self.projectiles)
            + cull(&mut self.clouds)
    }

    fn spawn_player_dust(&mut self, rng: &mut SimRng, config: &GameConfig) {
        let cosmetic = &mut rng.cosmetic;
        let x = self.player.rect.center().x;
        let bottom = self.player.rect.bottom();

        if self.player.landing_dust.take_tick() {
            let vx = cosmetic.gen_range(-PLAYER_DUST_SPREAD..=PLAYER_DUST_SPREAD) as f32;
            self.dust.push(Dust::new(
                x,
                bottom,
                PARTICLE_SIZE,
                Vec2::new(vx, PLAYER_DUST_LIFT),
                cosmetic,
            ));
        }

        let roll = one_in(cosmetic, config.move_dust_odds);
        if self.player.moving && self.player.motion == Motion::Grounded && roll {
            let vx = cosmetic.gen_range(-PLAYER_DUST_SPREAD..=PLAYER_DUST_SPREAD) as f32;
            self.dust.push(Dust::new(
                x,
                bottom,
                PARTICLE_SIZE,
                Vec2::new(vx, PLAYER_DUST_LIFT),
                cosmetic,
            ));
        }
    }

    /// Build this tick's frame: screen-fixed sky, then the scrolled world.
    pub fn compose(&self, config: &GameConfig, rng: &mut SimRng) -> DrawList {
        let mut frame = DrawList::new(SKY_COLOR);

        let mut sky = DrawLayer::new(Vec2::ZERO);
        sky.push(
            Visual::Sky,
            Rect::new(
                0.0,
                0.0,
                config.display_width as f32,
                config.display_height as f32,
            ),
        );
        for cloud in &self.clouds {
            sky.push(cloud.visual(), cloud.rect);
        }
        frame.layers.push(sky);

        let shake = if self.shake > 0.0 {
            let s = self.shake as i32;
            Vec2::new(
                rng.cosmetic.gen_range(-s..=s) as f32,
                rng.cosmetic.gen_range(-s..=s) as f32,
            )
        } else {
            Vec2::ZERO
        };
        let mut world = DrawLayer::new(Vec2::new(-self.camera_x, 0.0) + shake);
        push_tiles(&mut world, &self.background_details);
        for fireball in &self.projectiles {
            world.push(fireball.visual(), fireball.rect);
        }
        for dust in &self.dust {
            world.push_faded(dust.visual(), dust.rect, dust.opacity());
        }
        push_tiles(&mut world, &self.walls);
        world.push(self.player.visual(), self.player.rect);
        push_tiles(&mut world, &self.details);
        for animal in &self.animals {
            world.push(animal.visual(), *animal.rect());
        }
        for fire in &self.fires {
            world.push_faded(fire.visual(), fire.rect, fire.opacity());
        }
        frame.layers.push(world);

        frame
    }
}

fn push_tiles(layer: &mut DrawLayer, tiles: &[Wall]) {
    for tile in tiles {
        if let Some(visual) = tile.visual {
            layer.push(visual, tile.rect);
        }
    }
}

fn burning_ember<R: Rng + ?Sized>(source: &Rect, rng: &mut R) -> Fire {
    let x = source.center().x + rng.gen_range(-BURST_SPREAD..=BURST_SPREAD) as f32;
    let height = rng.gen_range(1..=3) as f32 * PARTICLE_SIZE;
    let vy = -2.0 + rng.gen_range(-1..=1) as f32;
    Fire::new(
        x,
        source.bottom(),
        Vec2::new(PARTICLE_SIZE, height),
        Vec2::new(0.0, vy),
        BURST_FADE,
        rng,
    )
}

/// Horizontal scroll that keeps the player near mid-screen without showing
/// anything past either end of the level.
pub fn camera_offset(player_x: f32, columns: usize, config: &GameConfig) -> f32 {
    let max = config.max_camera_x(columns).max(0.0);
    (player_x - config.display_width as f32 / 2.0).clamp(0.0, max)
}

/// The playing state.
pub struct Game {
    content: Rc<GameContent>,
    world: Option<World>,
    flow: StateFlow,
}

impl Game {
    pub fn new(content: Rc<GameContent>) -> Self {
        Self {
            content,
            world: None,
            flow: StateFlow::new(StateId::Menu),
        }
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    fn sample_input(ctx: &StateContext<'_>) -> TickInput {
        let input = ctx.input;
        TickInput {
            player: PlayerInput {
                left: input.is_held(Key::A),
                right: input.is_held(Key::D),
                jump_held: input.is_held(Key::J) || input.is_held(Key::Space),
            },
            fire_held: input.is_mouse_held(MouseBtn::Left),
        }
    }
}

impl State for Game {
    fn startup(&mut self, ctx: &mut StateContext<'_>) -> Result<(), LevelError> {
        self.world = Some(World::build(&self.content, ctx.config, ctx.rng)?);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.world = None;
    }

    fn get_event(&mut self, event: InputEvent, ctx: &mut StateContext<'_>) {
        match event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => self.flow.quit = true,
            InputEvent::KeyDown(Key::J | Key::Space) => {
                if let Some(world) = self.world.as_mut() {
                    world.request_jump(ctx.config);
                }
            }
            InputEvent::KeyDown(Key::K) => {
                if let Some(world) = self.world.as_mut() {
                    world.try_shoot(ctx.now_us, ctx.config, ctx.rng, &mut *ctx.audio);
                }
            }
            _ => {}
        }
    }

    fn update(
        &mut self,
        ctx: &mut StateContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), LevelError> {
        let input = Self::sample_input(ctx);
        let Some(world) = self.world.as_mut() else {
            return Ok(());
        };
        let outcome = world.tick(input, ctx.now_us, ctx.config, ctx.rng, &mut *ctx.audio);
        if outcome == TickOutcome::Reset {
            self.startup(ctx)?;
        }
        if let Some(world) = self.world.as_ref() {
            renderer.submit(world.compose(ctx.config, ctx.rng));
        }
        Ok(())
    }

    fn flow(&self) -> &StateFlow {
        &self.flow
    }

    fn flow_mut(&mut self) -> &mut StateFlow {
        &mut self.flow
    }
}
