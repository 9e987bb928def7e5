//! # Rex — The Walking Boss
//!
//! Rex is a 4×4-tile dinosaur that wanders the level and, every few tiles,
//! stops to attack whoever is around.
//!
//! ## State Machine
//!
//! ```text
//!            start_ms
//!   Start ───────────▶ Walking ◀──────────────────────────┐
//!                        │ aligned on a tile              │
//!                        │ and an attack is viable        │
//!                        ▼                                │
//!                     Attacking(stomp | flame | missiles) │
//!                        Entering → Windup → Damage       │
//!                                 → Recover → Exiting ────┘
//!
//!   any state ── life reaches 0 ──▶ Dying
//! ```
//!
//! ## Choosing an Attack
//!
//! Checked each time Rex sits aligned on a tile while walking, once he has
//! walked `min_steps_before_attack` tiles since the last attack:
//!
//! ```text
//! flame     a player is inside the 4×4-tile box straight ahead
//! stomp     a player is within one tile of Rex's body
//! missiles  fewer than two of the above, and at least
//!           max_steps_before_attack tiles walked
//! ```
//!
//! One viable attack is picked at random. Rex stops, and the attack runs on a
//! [`TimedPhase`]:
//!
//! - **Stomp**: a hazard collider one tile wider than the body on every side,
//!   active exactly while the phase is `Damage`.
//! - **Flame**: a hazard `flame_tile_width` tiles long appears ahead of Rex
//!   (in the last direction he walked) when `Damage` starts and lasts until
//!   it ends.
//! - **Missiles**: `n_missiles` free bullets spread evenly over `Damage`.
//!   Each player is targeted once, the remaining missiles fall 1 to 4 tiles
//!   around them.
//!
//! ## Walking
//!
//! Rex keeps his direction for `min_steps` tiles, then turns to a random
//! open direction other than back. A closed way ahead makes him turn at
//! once.

use std::time::Duration;

use crate::ai::FreeSighted;
use crate::ai::behavior::random_open;
use crate::collision::{Collider, Layer};
use crate::components::{AxisMoving, Killable, Lifed, Position, Scored, Temporary};
use crate::config::{RexConfig, SimConfig};
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::entities::bullet::free_bullet_to;
use crate::entities::hazard::{Hazard, timed_hazard};
use crate::entities::player::Player;
use crate::error::Result;
use crate::math::{IVec2, Rect, TILE_SIZE, Vec2, is_aligned, tile_origin};
use crate::phase::{Phase, PhaseDurations, TimedPhase};
use crate::rng::DeterministicRng;
use crate::time::Timer;
use crate::world::World;

use super::Boss;

/// Side of Rex's body, in tiles.
pub const REX_TILES: i32 = 4;

/// Side of the box ahead of Rex where a player triggers the flame, in tiles.
const AHEAD_CHECK_TILES: f32 = 4.0;

/// How far around Rex's body a player triggers the stomp, in tiles.
const NEARBY_CHECK_TILES: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RexAttack {
    Stomp,
    Flame,
    Missiles,
}

impl RexAttack {
    fn durations(self, cfg: &RexConfig) -> PhaseDurations {
        match self {
            RexAttack::Stomp => PhaseDurations::from_millis(
                cfg.stomp_windup_ms,
                cfg.stomp_damage_ms,
                cfg.stomp_recover_ms,
            ),
            RexAttack::Flame => PhaseDurations::from_millis(
                cfg.flame_windup_ms,
                cfg.flame_damage_ms,
                cfg.flame_recover_ms,
            ),
            RexAttack::Missiles => PhaseDurations::from_millis(
                cfg.missiles_windup_ms,
                cfg.missiles_damage_ms,
                cfg.missiles_recover_ms,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RexState {
    Start,
    Walking,
    Attacking(RexAttack),
    Dying,
}

#[derive(Debug, Clone)]
pub struct Rex {
    state: RexState,
    start: Timer,
    /// Tiles walked since the last attack.
    steps: u32,
    /// Tiles walked since the last turn.
    consecutive: u32,
    /// Where the next flame goes: the last direction Rex walked.
    flame_dir: Direction,
    phase: TimedPhase,
    missile_targets: Vec<Vec2>,
    missiles_shot: usize,
    stomp: Option<Entity>,
}

impl Rex {
    pub fn new(cfg: &RexConfig) -> Self {
        Self {
            state: RexState::Start,
            start: Timer::new(Duration::from_millis(cfg.start_ms)),
            steps: 0,
            consecutive: 0,
            flame_dir: Direction::Left,
            phase: TimedPhase::default(),
            missile_targets: Vec::new(),
            missiles_shot: 0,
            stomp: None,
        }
    }

    pub fn state(&self) -> RexState {
        self.state
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// The running attack's phase. Meaningless outside `Attacking`.
    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    /// The entity carrying the stomp collider.
    pub fn stomp(&self) -> Option<Entity> {
        self.stomp
    }

    /// Switch to `attack` from its first phase. Doesn't stop Rex.
    pub fn start_attack(&mut self, attack: RexAttack, cfg: &RexConfig) {
        self.state = RexState::Attacking(attack);
        self.phase.restart_with(attack.durations(cfg));
        self.missile_targets.clear();
        self.missiles_shot = 0;
    }

    fn choose_attack(
        &self,
        body: &Body,
        players: &[Rect],
        cfg: &RexConfig,
        rng: &mut DeterministicRng,
    ) -> Option<RexAttack> {
        if self.steps < cfg.min_steps_before_attack {
            return None;
        }
        let mut viable = Vec::new();
        if let Some(ahead) = ahead_box(body) {
            if players.iter().any(|p| ahead.intersects(p)) {
                viable.push(RexAttack::Flame);
            }
        }
        let nearby = body.rect.inflated(NEARBY_CHECK_TILES * TILE_SIZE);
        if players.iter().any(|p| nearby.intersects(p)) {
            viable.push(RexAttack::Stomp);
        }
        if viable.len() < 2 && self.steps >= cfg.max_steps_before_attack {
            viable.push(RexAttack::Missiles);
        }
        rng.pick(&viable).copied()
    }
}

/// What the state machine needs to know about Rex's body this frame.
struct Body {
    pos: Vec2,
    rect: Rect,
    direction: Direction,
    moving: bool,
    entered_new_tile: bool,
    killed: bool,
}

fn body_of(world: &World, rex: Entity) -> Option<Body> {
    let pos = world.entities.get::<Position>(rex)?.0;
    let collider = world.entities.get::<Collider>(rex)?;
    let moving = world.entities.get::<AxisMoving>(rex)?;
    Some(Body {
        pos,
        rect: collider.rect(pos),
        direction: moving.direction(),
        moving: moving.is_moving(),
        entered_new_tile: moving.entered_new_tile(),
        killed: world
            .entities
            .get::<Killable>(rex)
            .is_some_and(Killable::is_killed),
    })
}

/// The box straight ahead of Rex where a player calls for the flame.
fn ahead_box(body: &Body) -> Option<Rect> {
    let side = AHEAD_CHECK_TILES * TILE_SIZE;
    let mut pos = body.pos;
    match body.direction {
        Direction::Left => pos.x -= side,
        Direction::Right => pos.x += body.rect.size.x,
        Direction::Up => pos.y -= side,
        Direction::Down => pos.y += body.rect.size.y,
        Direction::None => return None,
    }
    Some(Rect::new(pos, Vec2::splat(side)))
}

/// Where the flame goes when Rex faces `dir`.
fn flame_rect(body: &Body, dir: Direction, cfg: &RexConfig) -> Rect {
    let long = cfg.flame_tile_width as f32 * TILE_SIZE;
    let thick = cfg.flame_tile_height as f32 * TILE_SIZE;
    let mut pos = body.pos;
    match dir {
        Direction::Left | Direction::None => pos.x -= long,
        Direction::Right => pos.x += body.rect.size.x,
        Direction::Up => pos.y -= long,
        Direction::Down => pos.y += body.rect.size.y,
    }
    let size = if dir.is_vertical() {
        Vec2::new(thick, long)
    } else {
        Vec2::new(long, thick)
    };
    Rect::new(pos, size)
}

/// Tile rectangles of the live players Rex sees.
fn players_seen(world: &World, rex: Entity) -> Vec<Rect> {
    let Some(sighted) = world.entities.get::<FreeSighted>(rex) else {
        return Vec::new();
    };
    sighted
        .seen()
        .iter()
        .filter(|&&(e, _)| world.entities.has::<Player>(e))
        .filter_map(|&(e, _)| world.entities.get::<Position>(e))
        .map(|p| Rect::new(p.0, Vec2::splat(TILE_SIZE)))
        .collect()
}

fn shuffled_directions(rng: &mut DeterministicRng) -> Vec<Direction> {
    let mut dirs = Direction::ALL.to_vec();
    rng.shuffle(&mut dirs);
    dirs
}

/// `n` missile targets: each player first, then points 1 to 4 tiles away
/// from them, taking players in turn and never repeating a direction for a
/// player before all four were used.
pub(crate) fn missile_targets(
    players: &[Vec2],
    n: usize,
    rng: &mut DeterministicRng,
) -> Vec<Vec2> {
    let mut targets: Vec<Vec2> = players.iter().copied().take(n).collect();
    if players.is_empty() {
        return targets;
    }
    let mut remaining: Vec<Vec<Direction>> =
        players.iter().map(|_| shuffled_directions(rng)).collect();
    let mut pid = 0;
    while targets.len() < n {
        if remaining[pid].is_empty() {
            remaining[pid] = shuffled_directions(rng);
        }
        let Some(dir) = remaining[pid].pop() else {
            break;
        };
        let distance = rng.range_inclusive(1, 4) as f32 * TILE_SIZE;
        targets.push(players[pid] + dir.unit_vec() * distance);
        pid = (pid + 1) % players.len();
    }
    targets
}

/// Rex standing with his top-left tile on `tile`.
pub fn rex(tile: IVec2, config: &SimConfig) -> Result<Components> {
    let cfg = &config.rex;
    let pos = tile_origin(tile);
    let mut moving = AxisMoving::at(pos, cfg.speed * config.enemy_base_speed, Direction::None);
    moving.set_auto_realign(false);
    moving.set_dist_travelled(1.0);
    Ok(Components::new()
        .with(Position(pos))
        .with(Collider::new(Layer::Bosses, Vec2::splat(REX_TILES as f32 * TILE_SIZE)))
        .with(moving)
        .with(Lifed::new(cfg.life)?)
        .with(Killable::new(config.death_time()))
        .with(Scored::new(cfg.value))
        .with(FreeSighted::new(None))
        .with(Boss)
        .with(Rex::new(cfg)))
}

/// Links the stomp collider to its Rex.
#[derive(Debug, Clone, Copy)]
pub struct RexStomp {
    pub owner: Entity,
    orphaned: bool,
}

fn stomp(owner: Entity, pos: Vec2, body: Vec2, cfg: &RexConfig) -> Components {
    let reach = cfg.stomp_tile_radius as f32 * TILE_SIZE;
    Components::new()
        .with(Position(pos))
        .with(
            Collider::new(Layer::Hazards, body + Vec2::splat(2.0 * reach))
                .with_offset(Vec2::splat(-reach))
                .inactive(),
        )
        .with(Hazard::new(cfg.stomp_damage, Some(owner)))
        .with(RexStomp {
            owner,
            orphaned: false,
        })
        .with(Temporary::new(|c| c.get::<RexStomp>().is_none_or(|s| s.orphaned)))
}

/// Spawn Rex and his stomp collider. Not from inside a system.
pub fn spawn_rex(world: &mut World, tile: IVec2) -> Result<Entity> {
    let body = rex(tile, &world.ctx.config)?;
    let e = world.spawn(body);
    let size = Vec2::splat(REX_TILES as f32 * TILE_SIZE);
    let child = stomp(e, tile_origin(tile), size, &world.ctx.config.rex);
    let child = world.spawn(child);
    if let Some(r) = world.entities.get_mut::<Rex>(e) {
        r.stomp = Some(child);
    }
    log::info!("rex enters at {tile}");
    Ok(e)
}

// ── Frame ────────────────────────────────────────────────────────────

fn stop(world: &mut World, rex: Entity) {
    world
        .entities
        .query_one::<(&mut AxisMoving, &mut Position), _>(rex, |(moving, pos)| {
            moving.stop(&mut pos.0)
        });
}

fn go(world: &mut World, rex: Entity, dir: Direction) {
    world
        .entities
        .query_one::<(&mut AxisMoving, &mut Position), _>(rex, |(moving, pos)| {
            if dir == Direction::None {
                moving.stop(&mut pos.0);
            } else {
                moving.move_in(dir);
            }
        });
}

fn walk(r: &mut Rex, world: &mut World, e: Entity, body: &Body) {
    if !body.moving {
        return;
    }
    let forward_open = world.can_go(e, body.direction);
    if r.consecutive > world.ctx.config.rex.min_steps || !forward_open {
        r.consecutive = 0;
        let viable = Direction::ALL.map(|d| world.can_go(e, d));
        let dir = random_open(&viable, body.direction.opposite(), &mut world.ctx.rng);
        go(world, e, dir);
    } else if body.entered_new_tile {
        r.consecutive += 1;
    }
}

fn walking(r: &mut Rex, world: &mut World, e: Entity, body: &Body) {
    if body.entered_new_tile {
        r.steps += 1;
    }
    if !is_aligned(body.pos) {
        return;
    }
    if body.direction != Direction::None {
        r.flame_dir = body.direction;
    }
    let players = players_seen(world, e);
    let chosen = r.choose_attack(body, &players, &world.ctx.config.rex, &mut world.ctx.rng);
    match chosen {
        Some(attack) => {
            log::debug!("rex {e} attacks: {attack:?} after {} steps", r.steps);
            r.start_attack(attack, &world.ctx.config.rex);
            stop(world, e);
        }
        None => walk(r, world, e, body),
    }
}

fn shoot_missiles(
    r: &mut Rex,
    world: &mut World,
    e: Entity,
    body: &Body,
    since_damage: Duration,
) {
    let n = r.missile_targets.len();
    if n == 0 {
        return;
    }
    let interval = r.phase.durations().damage / n as u32;
    let due = if interval.is_zero() {
        n
    } else {
        ((since_damage.as_nanos() / interval.as_nanos()) as usize).min(n)
    };
    let bullet_id = world.ctx.config.rex.missile_bullet;
    while r.missiles_shot < due {
        let from = Vec2::new(
            body.pos.x + world.ctx.rng.range_f32(0.0, body.rect.size.x - TILE_SIZE / 2.0),
            body.pos.y + TILE_SIZE / 2.0,
        );
        let target = r.missile_targets[r.missiles_shot];
        r.missiles_shot += 1;
        match free_bullet_to(bullet_id, from, target, Some(e), &world.ctx.config) {
            Ok(missile) => {
                world.spawn_deferred(missile);
                world.ctx.play_sound("missile");
            }
            Err(err) => log::warn!("rex {e} can't fire a missile: {err}"),
        }
    }
}

fn attacking(
    r: &mut Rex,
    world: &mut World,
    e: Entity,
    body: &Body,
    attack: RexAttack,
    dt: Duration,
) {
    let before = r.phase.phase();
    let changed = r.phase.update(dt);
    let after = r.phase.phase();
    if let Some(p) = changed {
        log::trace!("rex {e}: {attack:?} {p:?}");
    }
    let entered_damage = before < Phase::Damage && after >= Phase::Damage;

    match attack {
        RexAttack::Stomp => {
            if entered_damage {
                if let Some(h) = r.stomp.and_then(|s| world.entities.get_mut::<Hazard>(s)) {
                    h.rearm();
                }
                world.ctx.play_sound("rex_stomp");
            }
        }
        RexAttack::Flame => {
            if entered_damage && after == Phase::Damage {
                let cfg = &world.ctx.config.rex;
                let rect = flame_rect(body, r.flame_dir, cfg);
                let lasts = r.phase.durations().damage.saturating_sub(r.phase.elapsed());
                let flame = timed_hazard(rect.pos, rect.size, cfg.flame_damage, Some(e), lasts);
                world.spawn_deferred(flame);
                world.ctx.play_sound("rex_flame");
            }
        }
        RexAttack::Missiles => {
            if entered_damage {
                let players: Vec<Vec2> = players_seen(world, e).iter().map(Rect::center).collect();
                let n = world.ctx.config.rex.n_missiles as usize;
                r.missile_targets = missile_targets(&players, n, &mut world.ctx.rng);
                r.missiles_shot = 0;
                if r.missile_targets.is_empty() {
                    log::debug!("rex {e}: no one to fire missiles at");
                }
            }
            let since_damage = match after {
                Phase::Damage => r.phase.elapsed(),
                Phase::Recover | Phase::Exiting => r.phase.durations().damage,
                Phase::Entering | Phase::Windup => Duration::ZERO,
            };
            shoot_missiles(r, world, e, body, since_damage);
        }
    }

    if r.phase.is_over() {
        let dir = *world.ctx.rng.pick(&Direction::ALL).unwrap_or(&Direction::Left);
        r.state = RexState::Walking;
        r.steps = 0;
        r.consecutive = 0;
        go(world, e, dir);
        log::debug!("rex {e} walks on, {dir}");
    }
}

fn step(r: &mut Rex, world: &mut World, e: Entity, dt: Duration) {
    let Some(body) = body_of(world, e) else {
        return;
    };
    if body.killed {
        if r.state != RexState::Dying {
            r.state = RexState::Dying;
            stop(world, e);
            world.ctx.play_sound("rex_death");
            log::info!("rex {e} is dying");
        }
        return;
    }
    match r.state {
        RexState::Start => {
            r.start.tick(dt);
            if r.start.finished() {
                r.state = RexState::Walking;
                go(world, e, Direction::Left);
            }
        }
        RexState::Walking => walking(r, world, e, &body),
        RexState::Attacking(attack) => attacking(r, world, e, &body, attack, dt),
        RexState::Dying => {}
    }
}

/// Run every Rex, then keep the stomp colliders on their owners.
pub fn update_rex(world: &mut World) {
    let dt = world.time.delta();
    for e in world.entities.entities_with::<Rex>() {
        // Taken out while it runs, so the state machine can borrow the world.
        let Some(mut r) = world.entities.remove::<Rex>(e) else {
            continue;
        };
        step(&mut r, world, e, dt);
        world.entities.insert(e, r);
    }

    let mut sync = Vec::new();
    for (child, s) in world.entities.iter::<RexStomp>() {
        let owner = world.entities.components(s.owner);
        let pos = owner.and_then(|c| c.get::<Position>()).map(|p| p.0);
        let active = owner.and_then(|c| c.get::<Rex>()).is_some_and(|r| {
            r.state == RexState::Attacking(RexAttack::Stomp) && r.phase.is_damaging()
        });
        let dead = owner.is_none_or(|c| c.get::<Killable>().is_some_and(Killable::is_killed));
        sync.push((child, pos, active, dead));
    }
    for (child, pos, active, dead) in sync {
        world
            .entities
            .query_one::<(&mut RexStomp, &mut Position, &mut Collider), _>(child, |(s, p, c)| {
                if let Some(pos) = pos {
                    p.0 = pos;
                }
                c.active = active && !dead;
                s.orphaned = dead;
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::update_sight;
    use crate::context::GameContext;
    use crate::ecs::Schedule;
    use crate::entities::bullet::Bullet;
    use crate::entities::hazard::hazards;
    use crate::entities::player::player;
    use crate::nav::TileOccupancy;

    const FRAME: Duration = Duration::from_millis(100);

    fn world() -> World {
        let mut schedule = Schedule::new();
        schedule
            .add_system(|w: &mut World| w.refresh_occupancy())
            .add_system(update_sight)
            .add_system(update_rex)
            .add_system(|w: &mut World| w.detect_collisions())
            .add_system(hazards);
        let mut w = World::with_schedule(GameContext::default(), schedule);
        w.insert_resource(TileOccupancy::new(w.level_size()));
        w
    }

    fn rex_of(w: &World, e: Entity) -> &Rex {
        w.entities.get::<Rex>(e).unwrap()
    }

    fn run(w: &mut World, frames: usize) {
        for _ in 0..frames {
            w.update(FRAME);
        }
    }

    #[test]
    fn starts_walking_left_after_the_intro() {
        let mut w = world();
        let e = spawn_rex(&mut w, IVec2::new(5, 4)).unwrap();
        run(&mut w, 19);
        assert_eq!(rex_of(&w, e).state(), RexState::Start);
        run(&mut w, 1);
        assert_eq!(rex_of(&w, e).state(), RexState::Walking);
        assert_eq!(w.entities.get::<AxisMoving>(e).unwrap().direction(), Direction::Left);
    }

    #[test]
    fn stomp_hits_exactly_when_damage_starts() {
        let mut w = world();
        let cfg = w.ctx.config.clone();
        w.ctx.config.rex.stomp_windup_ms = 500;
        let e = spawn_rex(&mut w, IVec2::new(4, 4)).unwrap();
        let p = w.entities.spawn_unowned(player(1, IVec2::new(8, 5), &cfg).unwrap());
        let stomp = rex_of(&w, e).stomp().unwrap();
        let rex_cfg = w.ctx.config.rex.clone();
        w.entities.get_mut::<Rex>(e).unwrap().start_attack(RexAttack::Stomp, &rex_cfg);
        let active = |w: &World| w.entities.get::<Collider>(stomp).unwrap().active;

        run(&mut w, 1);
        assert_eq!(rex_of(&w, e).phase(), Phase::Windup);
        for _ in 0..4 {
            run(&mut w, 1);
            assert_eq!(rex_of(&w, e).phase(), Phase::Windup);
            assert!(!active(&w));
        }

        // 500 ms of windup elapse in this frame.
        run(&mut w, 1);
        assert_eq!(rex_of(&w, e).phase(), Phase::Damage);
        assert!(active(&w));
        let life = w.entities.get::<Lifed>(p).unwrap().life();
        assert_eq!(life, cfg.player_max_life - cfg.rex.stomp_damage);

        run(&mut w, 2);
        assert_eq!(rex_of(&w, e).phase(), Phase::Recover);
        assert!(!active(&w));

        run(&mut w, 8);
        assert_eq!(rex_of(&w, e).state(), RexState::Walking);
        assert_eq!(rex_of(&w, e).steps(), 0);
    }

    #[test]
    fn player_ahead_calls_for_the_flame() {
        let mut w = world();
        let cfg = w.ctx.config.clone();
        let e = spawn_rex(&mut w, IVec2::new(2, 4)).unwrap();
        // Just past the nearby ring, inside the box ahead.
        let p = w.entities.spawn_unowned(player(1, IVec2::new(7, 5), &cfg).unwrap());
        {
            let r = w.entities.get_mut::<Rex>(e).unwrap();
            r.state = RexState::Walking;
            r.steps = cfg.rex.min_steps_before_attack;
        }
        w.entities.get_mut::<AxisMoving>(e).unwrap().move_in(Direction::Right);

        run(&mut w, 1);
        assert_eq!(rex_of(&w, e).state(), RexState::Attacking(RexAttack::Flame));
        assert!(!w.entities.get::<AxisMoving>(e).unwrap().is_moving());

        // Entering, then 800 ms of windup.
        run(&mut w, 9);
        assert_eq!(rex_of(&w, e).phase(), Phase::Damage);
        let flames: Vec<Entity> = w
            .entities
            .iter::<Hazard>()
            .filter(|&(h, _)| !w.entities.has::<RexStomp>(h))
            .map(|(h, _)| h)
            .collect();
        assert_eq!(flames.len(), 1);
        let flame = w.entities.components(flames[0]).unwrap();
        let rect = flame.get::<Collider>().unwrap().rect(flame.get::<Position>().unwrap().0);
        assert_eq!(rect, Rect::from_tiles(IVec2::new(6, 4), IVec2::new(4, 2)));

        run(&mut w, 1);
        let life = w.entities.get::<Lifed>(p).unwrap().life();
        assert_eq!(life, cfg.player_max_life - cfg.rex.flame_damage);
    }

    #[test]
    fn vertical_flame_is_turned() {
        let cfg = RexConfig::default();
        let body = Body {
            pos: tile_origin(IVec2::new(4, 4)),
            rect: Rect::from_tiles(IVec2::new(4, 4), IVec2::splat(REX_TILES)),
            direction: Direction::Down,
            moving: true,
            entered_new_tile: false,
            killed: false,
        };
        assert_eq!(
            flame_rect(&body, Direction::Down, &cfg),
            Rect::from_tiles(IVec2::new(4, 8), IVec2::new(2, 4))
        );
        assert_eq!(
            flame_rect(&body, Direction::Up, &cfg),
            Rect::from_tiles(IVec2::new(4, 0), IVec2::new(2, 4))
        );
    }

    #[test]
    fn missiles_target_players_then_around_them() {
        let mut rng = DeterministicRng::new(3);
        let players = [Vec2::new(100.0, 100.0), Vec2::new(300.0, 200.0)];
        let targets = missile_targets(&players, 8, &mut rng);
        assert_eq!(targets.len(), 8);
        assert_eq!(&targets[..2], &players);

        for (pid, p) in players.iter().enumerate() {
            let mut dirs = Vec::new();
            for t in targets[2..].iter().skip(pid).step_by(2) {
                let d = *t - *p;
                assert!(d.x == 0.0 || d.y == 0.0);
                let len = d.length();
                assert!((TILE_SIZE..=4.0 * TILE_SIZE).contains(&len));
                assert_eq!(len % TILE_SIZE, 0.0);
                dirs.push((d.x.signum() as i32, d.y.signum() as i32));
            }
            let before = dirs.len();
            dirs.sort();
            dirs.dedup();
            assert_eq!(dirs.len(), before, "a direction was repeated");
        }
        assert!(missile_targets(&[], 8, &mut rng).is_empty());
    }

    #[test]
    fn missiles_are_spread_over_the_damage_phase() {
        let mut w = world();
        let cfg = w.ctx.config.clone();
        let e = spawn_rex(&mut w, IVec2::new(5, 4)).unwrap();
        w.entities.spawn_unowned(player(1, IVec2::new(1, 1), &cfg).unwrap());
        run(&mut w, 1);
        let rex_cfg = w.ctx.config.rex.clone();
        w.entities.get_mut::<Rex>(e).unwrap().start_attack(RexAttack::Missiles, &rex_cfg);
        let fired = |w: &World| {
            w.entities
                .iter::<Bullet>()
                .filter(|(_, b)| b.source() == Some(e))
                .count()
        };

        // Entering, 700 ms of windup, then half of the damage phase.
        run(&mut w, 1 + 7 + 10);
        assert_eq!(rex_of(&w, e).phase(), Phase::Damage);
        assert_eq!(fired(&w), cfg.rex.n_missiles as usize / 2);

        run(&mut w, 10);
        assert_eq!(rex_of(&w, e).phase(), Phase::Recover);
        assert_eq!(fired(&w), cfg.rex.n_missiles as usize);
    }

    #[test]
    fn closed_way_makes_him_turn_but_not_back() {
        let mut w = world();
        let e = spawn_rex(&mut w, IVec2::new(0, 4)).unwrap();
        w.entities.get_mut::<Rex>(e).unwrap().state = RexState::Walking;
        w.entities.get_mut::<AxisMoving>(e).unwrap().move_in(Direction::Left);
        run(&mut w, 1);
        let d = w.entities.get::<AxisMoving>(e).unwrap().direction();
        assert!(d == Direction::Up || d == Direction::Down, "turned {d}");
    }

    #[test]
    fn dying_rex_drops_his_stomp() {
        let mut w = world();
        let e = spawn_rex(&mut w, IVec2::new(5, 4)).unwrap();
        let stomp = rex_of(&w, e).stomp().unwrap();
        w.entities.get_mut::<Killable>(e).unwrap().kill();
        run(&mut w, 1);
        assert_eq!(rex_of(&w, e).state(), RexState::Dying);
        assert!(!w.entities.is_alive(stomp));
        assert_eq!(super::super::bosses_left(&w), 0);
    }
}
