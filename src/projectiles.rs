//! Projectile spawning, per-tick integration and collision tests.

use glam::Vec2;

use crate::config::CombatConfig;
use crate::entities::{Bounds, Projectile, ProjectileKind, Side};

/// Travel angle in degrees, measured the way the renderer rotates sprites
/// (counter-clockwise on screen, y down).
pub fn travel_angle(vel: Vec2) -> f32 {
    -vel.y.atan2(vel.x).to_degrees()
}

/// Create a projectile at `origin` flying toward `target` at the kind's speed.
///
/// A zero-length direction falls back to +x.
pub fn spawn(origin: Vec2, target: Vec2, kind: ProjectileKind, side: Side) -> Projectile {
    let dir = (target - origin).try_normalize().unwrap_or(Vec2::X);
    let vel = dir * kind.speed();
    Projectile {
        kind,
        side,
        pos: origin,
        vel,
        damage: kind.base_damage(),
        lifetime: kind.lifetime_ticks(),
        angle_deg: travel_angle(vel),
        faded: false,
        alive: true,
    }
}

/// Like [`spawn`] with the velocity multiplied by `scale`.
pub fn spawn_scaled(
    origin: Vec2,
    target: Vec2,
    kind: ProjectileKind,
    side: Side,
    scale: f32,
) -> Projectile {
    let mut p = spawn(origin, target, kind, side);
    p.vel *= scale;
    p
}

/// Mark `p` destroyed and return whether it was alive.  Destroying twice is a
/// bug and trips a debug assertion.
pub fn destroy(p: &mut Projectile) -> bool {
    debug_assert!(p.alive, "projectile {:?} destroyed twice", p.kind);
    std::mem::replace(&mut p.alive, false)
}

/// Advance one tick.
///
/// Homing kinds retarget toward `player_pos` first. Returns the secondary
/// projectile a lifetime kind leaves behind when it expires.
pub fn integrate(p: &mut Projectile, player_pos: Vec2, config: &CombatConfig) -> Option<Projectile> {
    if !p.alive {
        return None;
    }

    if p.kind.is_homing() {
        if let Some(dir) = (player_pos - p.pos).try_normalize() {
            p.vel = dir * p.kind.speed();
        }
    }

    p.pos += p.vel;

    let spin = p.kind.spin();
    if spin != 0.0 {
        p.angle_deg = (p.angle_deg + spin) % 360.0;
    }

    if out_of_bounds(p, config) {
        destroy(p);
        return None;
    }

    let remaining = p.lifetime.as_mut()?;
    *remaining = remaining.saturating_sub(1);
    if *remaining > 0 {
        return None;
    }

    destroy(p);
    Some(spawn_scaled(
        p.pos,
        player_pos,
        ProjectileKind::EnemyBullet1,
        p.side,
        2.0,
    ))
}

/// Upward-travelling projectiles die once fully above the top edge; anything
/// else dies past the left, right or bottom edge.
fn out_of_bounds(p: &Projectile, config: &CombatConfig) -> bool {
    let b = p.bounds();
    if b.bottom() < 0.0 && p.vel.y < 0.0 {
        return true;
    }
    b.right() < 0.0 || b.left() > config.arena_width || b.top() > config.arena_height
}

pub fn test_collision(p: &Projectile, target: &Bounds) -> bool {
    p.alive && p.bounds().overlaps(target)
}
