use planet_raid::abilities::AbilityLedger;
use planet_raid::compute::init_state;
use planet_raid::config::CombatConfig;
use planet_raid::entities::*;
use planet_raid::events::{Notification, SoundCue};
use planet_raid::spawn::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn fresh(level: u32) -> Encounter {
    let mut enc = init_state(level, &AbilityLedger::new(), CombatConfig::default(), 0).unwrap();
    enc.notifications.clear();
    enc
}

fn warnings(enc: &Encounter) -> usize {
    enc.notifications
        .iter()
        .filter(|n| matches!(n, Notification::WarningBanner { text, .. } if text == BOSS_WARNING_TEXT))
        .count()
}

// ── Formulas ──────────────────────────────────────────────────────────────────

#[test]
fn interval_shrinks_geometrically() {
    assert_eq!(spawn_interval_ms(4300.0, 0), 4300.0);
    assert_eq!(spawn_interval_ms(4300.0, 1), 3440.0);
    assert!((spawn_interval_ms(4300.0, 2) - 2752.0).abs() < 1e-9);
}

#[test]
fn bonus_chance_and_threshold() {
    assert!((bonus_spawn_chance(1) - 0.2).abs() < 1e-12);
    assert!((bonus_spawn_chance(5) - 0.6).abs() < 1e-12);
    assert_eq!(bonus_spawn_chance(20), 1.0);
    assert_eq!(max_death(1), 15);
    assert_eq!(max_death(5), 35);
}

// ── Ordinary spawning ─────────────────────────────────────────────────────────

#[test]
fn first_wave_arrives_after_one_interval() {
    let mut enc = fresh(1);
    let mut rng = seeded_rng();
    update(&mut enc, 3439, &mut rng);
    assert!(enc.enemies.is_empty());

    update(&mut enc, 3440, &mut rng);
    assert!((1..=2).contains(&enc.enemies.len()));
    assert_eq!(enc.spawner.last_spawn_ms, 3440);
    for e in &enc.enemies {
        assert_eq!(e.kind, EnemyKind::Enemy1);
        assert!(e.bounds().bottom() < 0.0);
        assert!((0.0..=1000.0).contains(&e.pos.x));
    }
}

#[test]
fn timer_resets_once_per_wave() {
    let mut enc = fresh(1);
    let mut rng = seeded_rng();
    update(&mut enc, 3440, &mut rng);
    let after_first = enc.enemies.len();
    update(&mut enc, 6879, &mut rng);
    assert_eq!(enc.enemies.len(), after_first);
    update(&mut enc, 6880, &mut rng);
    assert!(enc.enemies.len() > after_first);
}

#[test]
fn bonus_spawn_rate_matches_level() {
    let mut enc = fresh(5);
    let mut rng = seeded_rng();
    let waves = 4000;
    let mut doubles = 0;
    for _ in 0..waves {
        enc.enemies.clear();
        spawn_wave(&mut enc, 0, &mut rng);
        if enc.enemies.len() == 2 {
            doubles += 1;
        }
    }
    let rate = doubles as f64 / waves as f64;
    assert!((0.55..0.65).contains(&rate), "bonus rate {rate}");
}

#[test]
fn spawning_suspended_while_boss_pending_or_active() {
    for lifecycle in [BossLifecycle::Pending { since_ms: 0 }, BossLifecycle::Active] {
        let mut enc = fresh(1);
        enc.state.boss = lifecycle;
        enc.state.death = 0;
        assert!(!spawning_allowed(&enc));
        update(&mut enc, 1, &mut seeded_rng());
        update(&mut enc, 10_000, &mut seeded_rng());
        assert!(enc.enemies.is_empty());
    }
}

#[test]
fn no_spawning_after_victory() {
    let mut enc = fresh(1);
    enc.state.outcome = Outcome::Won;
    enc.state.boss = BossLifecycle::Defeated;
    update(&mut enc, 10_000, &mut seeded_rng());
    assert!(enc.enemies.is_empty());
}

// ── Boss activation ───────────────────────────────────────────────────────────

#[test]
fn threshold_must_be_exceeded() {
    let mut enc = fresh(1);
    enc.state.death = 15;
    update(&mut enc, 100, &mut seeded_rng());
    assert_eq!(enc.state.boss, BossLifecycle::None);
}

#[test]
fn boss_activates_exactly_once_after_warning() {
    let mut enc = fresh(1);
    let mut rng = seeded_rng();
    enc.state.death = 16;

    update(&mut enc, 100, &mut rng);
    assert_eq!(enc.state.boss, BossLifecycle::Pending { since_ms: 100 });
    assert_eq!(warnings(&enc), 1);
    assert!(enc
        .notifications
        .contains(&Notification::Sound(SoundCue::Warning)));

    enc.state.death = 30;
    update(&mut enc, 3099, &mut rng);
    assert!(enc.boss.is_none());
    assert_eq!(warnings(&enc), 1);

    update(&mut enc, 3100, &mut rng);
    assert_eq!(enc.state.boss, BossLifecycle::Active);
    assert_eq!(enc.boss.as_ref().map(|b| b.kind), Some(BossKind::Boss1));

    update(&mut enc, 9000, &mut rng);
    assert_eq!(warnings(&enc), 1);
    assert_eq!(enc.state.boss, BossLifecycle::Active);
}

#[test]
fn boss_matches_level() {
    for level in 1..=5 {
        let mut enc = fresh(level);
        enc.state.boss = BossLifecycle::Pending { since_ms: 0 };
        activate_boss(&mut enc, 0, &mut seeded_rng()).unwrap();
        assert_eq!(enc.boss.as_ref().map(|b| b.kind), BossKind::for_level(level));
    }
}

#[test]
fn scheduling_twice_is_rejected() {
    let mut enc = fresh(1);
    enc.state.boss = BossLifecycle::Active;
    assert_eq!(
        begin_boss_warning(&mut enc, 0),
        Err(SpawnError::BossAlreadyScheduled(BossLifecycle::Active))
    );

    let mut idle = fresh(1);
    assert_eq!(
        activate_boss(&mut idle, 0, &mut seeded_rng()),
        Err(SpawnError::BossNotPending)
    );
}
