/// Encounter orchestration.
///
/// `step` advances an encounter in place by one tick in a fixed order:
/// player, enemies, boss, projectiles, collisions, spawning, sweep.
/// `tick` is the pure wrapper: it takes an immutable reference to the current
/// `Encounter` and returns a brand-new one. Side effects are limited to the
/// injected RNG.

use glam::Vec2;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::abilities::{self, AbilityLedger};
use crate::boss;
use crate::combat;
use crate::config::CombatConfig;
use crate::enemies;
use crate::entities::{
    BossLifecycle, Encounter, EncounterState, EnemyKind, Facing, Intent, Outcome, Player,
    ProjectileKind, Side, SpawnTimer, PLAYER_FLY_ACCEL, PLAYER_GRAVITY,
};
use crate::events::Notification;
use crate::health;
use crate::projectiles;
use crate::spawn;

pub const WAVE_BANNER_TEXT: &str = "Aliens descend in droves!";
/// Level whose aliens arrive without the opening banner.
const SILENT_LEVEL: u32 = 3;
/// Flying this far above the top edge hurts.
const CEILING_Y: f32 = -50.0;
const CEILING_DAMAGE: f32 = 0.5;
/// Horizontal distance from the player's edge to the muzzle.
const MUZZLE_OFFSET: f32 = 16.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncounterError {
    #[error("level {0} does not exist")]
    UnknownLevel(u32),
}

// ── Player intent ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Horizontal {
    #[default]
    Idle,
    Left,
    Right,
}

/// Input sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    pub horizontal: Horizontal,
    pub fly: bool,
    /// Aim point in arena coordinates.
    pub aim: Vec2,
    pub fire: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh encounter for `level`, with the ledger's abilities applied
/// to the player.
pub fn init_state(
    level: u32,
    ledger: &AbilityLedger,
    config: CombatConfig,
    now_ms: u64,
) -> Result<Encounter, EncounterError> {
    if EnemyKind::for_level(level).is_none() {
        return Err(EncounterError::UnknownLevel(level));
    }

    let mut player = Player::new(&config);
    abilities::apply_all(&mut player, ledger);

    let mut notifications = Vec::new();
    if level != SILENT_LEVEL {
        notifications.push(Notification::WarningBanner {
            text: WAVE_BANNER_TEXT.to_string(),
            pos: config.center(),
        });
    }

    info!(
        level,
        health = player.health.max,
        damage = player.gun.damage,
        cooldown_ms = player.gun.cooldown_ms,
        "encounter started"
    );

    Ok(Encounter {
        player,
        enemies: Vec::new(),
        boss: None,
        projectiles: Vec::new(),
        pending_projectiles: Vec::new(),
        state: EncounterState {
            level,
            death: 0,
            max_death: spawn::max_death(level),
            boss: BossLifecycle::None,
            outcome: Outcome::InProgress,
            started_ms: now_ms,
            elapsed_ms: 0,
        },
        spawner: SpawnTimer::new(config.base_spawn_interval_ms, level, now_ms),
        notifications,
        config,
        frame: 0,
    })
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance `enc` by one tick.
///
/// A lost encounter is frozen. A won one keeps moving so the victory burst
/// plays out, but nothing can hurt the player and nothing new spawns.
pub fn step(enc: &mut Encounter, intent: &PlayerIntent, now_ms: u64, rng: &mut impl Rng) {
    if enc.state.outcome == Outcome::Lost {
        return;
    }
    enc.frame += 1;
    enc.state.elapsed_ms = now_ms.saturating_sub(enc.state.started_ms);

    // ── 1. Player ────────────────────────────────────────────────────────────
    update_player(enc, intent, now_ms, rng);

    // ── 2. Enemies ───────────────────────────────────────────────────────────
    let player_pos = enc.player.pos;
    let mut intents = Vec::new();
    for enemy in enc.enemies.iter_mut() {
        intents.extend(enemies::update_enemy(enemy, player_pos, now_ms));
    }
    apply_intents(enc, intents, rng);

    // ── 3. Boss ──────────────────────────────────────────────────────────────
    if let Some(b) = enc.boss.as_mut() {
        let intents = boss::update_boss(b, &enc.player, now_ms, &enc.config);
        apply_intents(enc, intents, rng);
    }

    // ── 4. Projectiles ───────────────────────────────────────────────────────
    let player_pos = enc.player.pos;
    for p in enc.projectiles.iter_mut() {
        if let Some(secondary) = projectiles::integrate(p, player_pos, &enc.config) {
            enc.pending_projectiles.push(secondary);
        }
    }

    // ── 5. Collisions ────────────────────────────────────────────────────────
    combat::resolve_collisions(enc, rng);

    // ── 6. Spawning and boss lifecycle ───────────────────────────────────────
    spawn::update(enc, now_ms, rng);

    // ── 7. Sweep ─────────────────────────────────────────────────────────────
    sweep(enc);
}

/// Pure variant of [`step`]: returns the next encounter, leaving `enc` as is.
pub fn tick(enc: &Encounter, intent: &PlayerIntent, now_ms: u64, rng: &mut impl Rng) -> Encounter {
    let mut next = enc.clone();
    step(&mut next, intent, now_ms, rng);
    next
}

/// Movement, gravity, ground and ceiling, horizontal wrap, then the gun.
pub fn update_player(enc: &mut Encounter, intent: &PlayerIntent, now_ms: u64, rng: &mut impl Rng) {
    let config = &enc.config;
    let player = &mut enc.player;

    player.vel.x = match intent.horizontal {
        Horizontal::Left => -player.speed,
        Horizontal::Right => player.speed,
        Horizontal::Idle => 0.0,
    };
    player.gravity = if intent.fly {
        PLAYER_FLY_ACCEL
    } else {
        PLAYER_GRAVITY
    };
    player.vel.y += player.gravity;
    player.pos += player.vel;

    player.facing = if player.vel.x > 0.0 {
        Facing::Right
    } else if player.vel.x < 0.0 {
        Facing::Left
    } else {
        Facing::Idle
    };

    let mut bounds = player.bounds();
    let ground = config.ground_y();
    let mut above_ceiling = false;
    if bounds.bottom() >= ground {
        player.vel.y = 0.0;
        player.gravity = 0.0;
        player.pos.y = ground - bounds.half.y;
    } else if bounds.bottom() < CEILING_Y {
        above_ceiling = true;
    }

    bounds = player.bounds();
    if bounds.right() < 0.0 {
        player.pos.x = config.arena_width + bounds.half.x;
    } else if bounds.left() > config.arena_width {
        player.pos.x = -bounds.half.x;
    }

    if above_ceiling {
        health::damage_player(enc, CEILING_DAMAGE, rng);
    }

    fire_gun(enc, intent, now_ms);
}

/// Fire toward the aim point from the muzzle on the side being aimed at.
fn fire_gun(enc: &mut Encounter, intent: &PlayerIntent, now_ms: u64) {
    let player = &mut enc.player;
    player.gun.aim = intent.aim;
    if !intent.fire {
        return;
    }
    if !enemies::fire_due(&mut player.gun.last_fire_ms, player.gun.cooldown_ms, now_ms) {
        return;
    }

    let half = player.bounds().half.x + MUZZLE_OFFSET;
    let muzzle = if intent.aim.x > player.pos.x {
        player.pos + Vec2::new(half, 0.0)
    } else {
        player.pos - Vec2::new(half, 0.0)
    };
    let mut bullet = projectiles::spawn(muzzle, intent.aim, ProjectileKind::PlayerBullet, Side::Player);
    bullet.damage = player.gun.damage;
    enc.projectiles.push(bullet);
}

/// Apply side effects requested by enemy and boss updates.
pub fn apply_intents(enc: &mut Encounter, intents: Vec<Intent>, rng: &mut impl Rng) {
    for intent in intents {
        match intent {
            Intent::Fire {
                kind,
                from,
                to,
                speed_scale,
                faded,
            } => {
                let mut p = projectiles::spawn_scaled(from, to, kind, Side::Enemy, speed_scale);
                p.faded = faded;
                enc.projectiles.push(p);
            }
            Intent::SpawnEnemy { kind, at } => {
                let e = enemies::spawn_enemy(kind, Some(at), &enc.config, rng);
                enc.enemies.push(e);
            }
            Intent::ContactDamage { amount } => {
                combat::contact_damage(enc, amount, rng);
            }
        }
    }
}

/// Drop dead entities and destroyed projectiles, then append projectiles
/// created mid-walk.
pub fn sweep(enc: &mut Encounter) {
    enc.enemies.retain(|e| e.alive);
    enc.projectiles.retain(|p| p.alive);
    let pending = std::mem::take(&mut enc.pending_projectiles);
    if !pending.is_empty() {
        debug!(count = pending.len(), frame = enc.frame, "projectiles queued");
    }
    enc.projectiles.extend(pending);
}

/// Hand the queued notifications to the caller.
pub fn drain_notifications(enc: &mut Encounter) -> Vec<Notification> {
    std::mem::take(&mut enc.notifications)
}
