//! Common enemies: construction plus the chase-and-fire base behaviour that
//! bosses reuse.

use glam::Vec2;
use rand::Rng;

use crate::config::CombatConfig;
use crate::entities::{Enemy, EnemyKind, Health, Intent, ENEMY_SIZE};

/// Create an enemy at `at`, or at a random x with its bottom edge just above
/// the arena when `at` is `None`.
pub fn spawn_enemy(
    kind: EnemyKind,
    at: Option<Vec2>,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> Enemy {
    let pos = at.unwrap_or_else(|| above_arena(ENEMY_SIZE, config, rng));
    let speed = match kind {
        EnemyKind::Enemy2 => rng.gen_range(1.8..=3.5),
        EnemyKind::Enemy5 => rng.gen_range(3.0..=4.0),
        _ => kind.base_speed(),
    };
    Enemy {
        kind,
        pos,
        speed,
        health: Health::full(kind.base_health()),
        last_fire_ms: 0,
        alive: true,
    }
}

/// Random centre x in `[0, width]`, bottom edge at y = -1.
pub fn above_arena(size: Vec2, config: &CombatConfig, rng: &mut impl Rng) -> Vec2 {
    let x = rng.gen_range(0..=config.arena_width as i32) as f32;
    Vec2::new(x, -1.0 - size.y / 2.0)
}

/// Step `pos` toward `target` by `speed`.  No-op when already on target.
pub fn chase(pos: &mut Vec2, target: Vec2, speed: f32) {
    if let Some(dir) = (target - *pos).try_normalize() {
        *pos += dir * speed;
    }
}

/// "Reset to now" cooldown: true when `interval_ms` has elapsed since
/// `*last_ms`, in which case `*last_ms` becomes `now_ms`.
pub fn fire_due(last_ms: &mut u64, interval_ms: u64, now_ms: u64) -> bool {
    if now_ms.saturating_sub(*last_ms) >= interval_ms {
        *last_ms = now_ms;
        true
    } else {
        false
    }
}

/// Move toward the player, then fire at the player when the cooldown allows.
pub fn update_enemy(enemy: &mut Enemy, player_pos: Vec2, now_ms: u64) -> Option<Intent> {
    if !enemy.alive {
        return None;
    }

    chase(&mut enemy.pos, player_pos, enemy.speed);

    if !fire_due(&mut enemy.last_fire_ms, enemy.kind.fire_interval_ms(), now_ms) {
        return None;
    }
    Some(Intent::Fire {
        kind: enemy.kind.projectile(),
        from: enemy.pos,
        to: player_pos,
        speed_scale: 1.0,
        faded: enemy.kind == EnemyKind::Enemy3,
    })
}
