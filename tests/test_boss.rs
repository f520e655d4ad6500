use glam::Vec2;
use planet_raid::abilities::AbilityLedger;
use planet_raid::boss::*;
use planet_raid::combat;
use planet_raid::compute::{init_state, step, PlayerIntent};
use planet_raid::config::CombatConfig;
use planet_raid::enemies;
use planet_raid::entities::*;
use planet_raid::projectiles;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn config() -> CombatConfig {
    CombatConfig::default()
}

fn boss(kind: BossKind) -> Boss {
    spawn_boss(kind, &config(), 0, &mut seeded_rng())
}

fn fires(intents: &[Intent], of: ProjectileKind) -> usize {
    intents
        .iter()
        .filter(|i| matches!(i, Intent::Fire { kind, .. } if *kind == of))
        .count()
}

fn spawns(intents: &[Intent], of: EnemyKind) -> usize {
    intents
        .iter()
        .filter(|i| matches!(i, Intent::SpawnEnemy { kind, .. } if *kind == of))
        .count()
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn bosses_spawn_at_full_health_above_arena() {
    for kind in [BossKind::Boss1, BossKind::Boss3, BossKind::Boss4, BossKind::Boss5] {
        let b = boss(kind);
        assert_eq!(b.health, Health::full(kind.base_health()));
        assert_eq!(b.health_fraction, 1.0);
        assert!(b.bounds().bottom() < 0.0);
    }
}

#[test]
fn boss2_spawns_at_top_centre() {
    let b = boss(BossKind::Boss2);
    assert_eq!(b.pos.x, 500.0);
    assert_eq!(b.bounds().top(), 2.0);
}

// ── Boss1 ─────────────────────────────────────────────────────────────────────

#[test]
fn boss1_fires_homing_shot_on_interval() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss1);

    let intents = update_boss(&mut b, &player, 2999, &cfg);
    assert!(intents.is_empty());
    let intents = update_boss(&mut b, &player, 3000, &cfg);
    assert_eq!(fires(&intents, ProjectileKind::BossBullet1), 1);
    let intents = update_boss(&mut b, &player, 5999, &cfg);
    assert!(intents.is_empty());
}

#[test]
fn boss1_chases_player() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss1);
    let before = (player.pos - b.pos).length();
    update_boss(&mut b, &player, 0, &cfg);
    let after = (player.pos - b.pos).length();
    assert!((before - after - 1.5).abs() < 1e-3);
}

#[test]
fn boss1_death_cascade_in_one_tick() {
    let mut enc = init_state(1, &AbilityLedger::new(), config(), 0).unwrap();
    let mut rng = seeded_rng();
    for x in [100.0, 300.0, 700.0] {
        let e = enemies::spawn_enemy(EnemyKind::Enemy1, Some(Vec2::new(x, 100.0)), &enc.config, &mut rng);
        enc.enemies.push(e);
    }
    let mut b = spawn_boss(BossKind::Boss1, &enc.config, 0, &mut rng);
    b.pos = Vec2::new(500.0, 300.0);
    b.health.current = 10.0;
    enc.boss = Some(b);
    enc.state.boss = BossLifecycle::Active;
    enc.projectiles.push(projectiles::spawn(
        Vec2::new(500.0, 300.0),
        Vec2::new(501.0, 300.0),
        ProjectileKind::PlayerBullet,
        Side::Player,
    ));

    step(&mut enc, &PlayerIntent::default(), 0, &mut rng);

    assert_eq!(enc.state.outcome, Outcome::Won);
    assert_eq!(enc.state.boss, BossLifecycle::Defeated);
    assert!(enc.boss.is_none());
    assert!(enc.enemies.is_empty());
    assert_eq!(enc.state.death, 0);
    assert_eq!(enc.projectiles.len(), BOSS1_BURST_COUNT as usize);
    assert!(enc
        .projectiles
        .iter()
        .all(|p| p.kind == ProjectileKind::EnemyBullet1 && p.side == Side::Enemy));
    assert!(enc.pending_projectiles.is_empty());
}

#[test]
fn only_boss1_bursts() {
    assert_eq!(death_burst(&boss(BossKind::Boss1)).len(), 36);
    for kind in [BossKind::Boss2, BossKind::Boss3, BossKind::Boss4, BossKind::Boss5] {
        assert!(death_burst(&boss(kind)).is_empty());
    }
}

#[test]
fn radial_directions_are_evenly_spaced_units() {
    let dirs: Vec<Vec2> = radial(4, 0.0).collect();
    assert_eq!(dirs.len(), 4);
    assert!((dirs[0] - Vec2::X).length() < 1e-5);
    assert!((dirs[1] - Vec2::Y).length() < 1e-5);
    assert!(dirs.iter().all(|d| (d.length() - 1.0).abs() < 1e-5));
}

// ── Boss2 ─────────────────────────────────────────────────────────────────────

#[test]
fn boss2_ping_pongs_between_walls() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss2);
    for _ in 0..159 {
        update_boss(&mut b, &player, 0, &cfg);
    }
    assert!(matches!(b.pattern, BossPattern::PingPong { direction } if direction == 1.0));
    update_boss(&mut b, &player, 0, &cfg);
    assert_eq!(b.pos.x, 900.0);
    assert!(matches!(b.pattern, BossPattern::PingPong { direction } if direction == -1.0));
    update_boss(&mut b, &player, 0, &cfg);
    assert_eq!(b.pos.x, 897.5);
}

#[test]
fn boss2_spawns_minions_instead_of_firing() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss2);
    let intents = update_boss(&mut b, &player, 1600, &cfg);
    assert_eq!(spawns(&intents, EnemyKind::Enemy2), 1);
    assert_eq!(intents.len(), 1);
}

// ── Boss3 ─────────────────────────────────────────────────────────────────────

#[test]
fn boss3_first_toggle_two_periods_after_arrival() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss3);

    update_boss(&mut b, &player, 4999, &cfg);
    assert!(is_collidable(&b));
    assert!(!is_faded(&b));

    update_boss(&mut b, &player, 5000, &cfg);
    assert!(!is_collidable(&b));
    assert!(is_faded(&b));

    update_boss(&mut b, &player, 7500, &cfg);
    assert!(is_collidable(&b));
    assert!(!is_faded(&b));
}

#[test]
fn boss3_visibility_and_fade_are_independent() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss3);
    update_boss(&mut b, &player, 5000, &cfg);

    set_visible(&mut b, true);
    assert!(is_collidable(&b));
    assert!(is_faded(&b));

    // The shared timer flips both flags, so they now stay out of phase.
    update_boss(&mut b, &player, 7500, &cfg);
    assert!(!is_collidable(&b));
    assert!(!is_faded(&b));
}

#[test]
fn invisible_boss3_lets_shots_through() {
    let mut enc = init_state(3, &AbilityLedger::new(), config(), 0).unwrap();
    let mut b = spawn_boss(BossKind::Boss3, &enc.config, 0, &mut seeded_rng());
    b.pos = Vec2::new(500.0, 300.0);
    set_visible(&mut b, false);
    enc.boss = Some(b);
    enc.projectiles.push(projectiles::spawn(
        Vec2::new(500.0, 300.0),
        Vec2::new(501.0, 300.0),
        ProjectileKind::PlayerBullet,
        Side::Player,
    ));
    assert_eq!(combat::find_target(&enc, 0), None);
}

#[test]
fn boss3_volley_is_ten_shots() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss3);
    let mut shots = 0;
    for _ in 0..150 {
        shots += fires(
            &update_boss(&mut b, &player, 5000, &cfg),
            ProjectileKind::EnemyBullet3,
        );
    }
    assert_eq!(shots, 10);
    assert!(matches!(b.pattern, BossPattern::Phantom { fire_counter: 0, .. }));
}

// ── Boss4 ─────────────────────────────────────────────────────────────────────

#[test]
fn boss4_rushes_periodically() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss4);
    for _ in 0..150 {
        update_boss(&mut b, &player, 0, &cfg);
    }
    assert_eq!(b.speed, BossKind::Boss4.base_speed());
    update_boss(&mut b, &player, 0, &cfg);
    assert_eq!(b.speed, BOSS4_RUSH_SPEED);
    for _ in 0..99 {
        update_boss(&mut b, &player, 0, &cfg);
    }
    assert_eq!(b.speed, BossKind::Boss4.base_speed());
}

#[test]
fn boss4_contact_damage_when_touching() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss4);
    b.pos = player.pos;
    let intents = update_boss(&mut b, &player, 0, &cfg);
    assert!(intents.contains(&Intent::ContactDamage { amount: 1.0 }));

    let mut far = boss(BossKind::Boss4);
    let intents = update_boss(&mut far, &player, 0, &cfg);
    assert!(!intents
        .iter()
        .any(|i| matches!(i, Intent::ContactDamage { .. })));
}

#[test]
fn boss4_fires_spinning_shards() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss4);
    let intents = update_boss(&mut b, &player, 1000, &cfg);
    assert_eq!(fires(&intents, ProjectileKind::EnemyBullet4), 1);
    assert!((b.angle_deg - 6.0).abs() < 1e-5);
}

// ── Boss5 ─────────────────────────────────────────────────────────────────────

#[test]
fn boss5_cycle_of_volleys_and_minions() {
    let cfg = config();
    let player = Player::new(&cfg);
    let mut b = boss(BossKind::Boss5);
    let mut volley_shots = 0;
    let mut minions = 0;
    for k in 1..=100u64 {
        let intents = update_boss(&mut b, &player, k * 80, &cfg);
        volley_shots += fires(&intents, ProjectileKind::EnemyBullet5);
        minions += spawns(&intents, EnemyKind::Enemy5);
    }
    // Counter values 41..=49 fire volleys, 96..=99 spawn minions.
    assert_eq!(volley_shots, 9 * BOSS5_BURST_COUNT as usize);
    assert_eq!(minions, 4);
    assert!(matches!(b.pattern, BossPattern::Carousel { fire_counter: 100 }));
}
