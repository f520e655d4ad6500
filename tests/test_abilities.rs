use planet_raid::abilities::*;
use planet_raid::config::CombatConfig;
use planet_raid::entities::Player;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn player() -> Player {
    Player::new(&CombatConfig::default())
}

fn ledger(entries: &[(Ability, u32)]) -> AbilityLedger {
    entries.iter().copied().collect()
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[test]
fn get_stronger_compounds_exactly() {
    let mut p = player();
    apply_all(&mut p, &ledger(&[(Ability::GetStronger, 3)]));
    let expected = 10.0 * 1.4f32 * 1.4 * 1.4;
    assert!((p.gun.damage - expected).abs() < 1e-4, "damage {}", p.gun.damage);
    assert!((p.gun.damage - 27.44).abs() < 1e-3);
}

#[test]
fn strong_defense_does_not_stack() {
    let mut p = player();
    apply(&mut p, Ability::StrongDefense);
    apply(&mut p, Ability::StrongDefense);
    assert_eq!(p.defense_rate, 0.15);
}

#[test]
fn speed_up_rounds_to_one_decimal() {
    let mut p = player();
    apply(&mut p, Ability::SpeedUp);
    assert_eq!(p.speed, 6.5);
}

#[test]
fn energy_boost_compounds_on_current_max() {
    let mut p = player();
    let mut maxes = Vec::new();
    for _ in 0..4 {
        apply(&mut p, Ability::EnergyBoost);
        maxes.push(p.health.max);
    }
    assert_eq!(maxes, vec![125.0, 156.0, 195.0, 243.0]);
    assert_eq!(p.health.current, p.health.max);
}

#[test]
fn rush_attack_floors_cooldown() {
    let mut p = player();
    apply_all(&mut p, &ledger(&[(Ability::RushAttack, 3)]));
    assert_eq!(p.gun.cooldown_ms, 137);
}

#[test]
fn flag_abilities_set_fixed_values() {
    let mut p = player();
    apply_all(
        &mut p,
        &ledger(&[(Ability::Vampire, 1), (Ability::CriticalHit, 1)]),
    );
    assert_eq!(p.vampire, 0.02);
    assert_eq!(p.critical_hit, 0.2);
}

#[test]
fn empty_ledger_leaves_player_untouched() {
    let mut p = player();
    apply_all(&mut p, &AbilityLedger::new());
    assert_eq!(p, player());
}

// ── Ledger ────────────────────────────────────────────────────────────────────

#[test]
fn add_respects_cap() {
    let mut l = AbilityLedger::new();
    assert_eq!(l.add(Ability::StrongDefense), Ok(1));
    assert_eq!(
        l.add(Ability::StrongDefense),
        Err(AbilityError::AtCap(Ability::StrongDefense))
    );
    assert_eq!(l.count(Ability::StrongDefense), 1);
}

#[test]
fn unlimited_ability_never_caps() {
    let mut l = AbilityLedger::new();
    for n in 1..=20 {
        assert_eq!(l.add(Ability::GetStronger), Ok(n));
    }
}

#[test]
fn validate_rejects_over_cap() {
    let l = ledger(&[(Ability::Vampire, 2)]);
    assert_eq!(
        l.validate(),
        Err(AbilityError::OverCap {
            ability: Ability::Vampire,
            count: 2
        })
    );
    assert!(ledger(&[(Ability::SpeedUp, 2)]).validate().is_ok());
}

#[test]
fn ledger_serialises_by_name() {
    let l = ledger(&[(Ability::GetStronger, 3), (Ability::CriticalHit, 1)]);
    let json = serde_json::to_string(&l).unwrap();
    assert!(json.contains("\"get stronger\":3"), "{json}");
    assert!(json.contains("\"critical hit\":1"), "{json}");
    let back: AbilityLedger = serde_json::from_str(&json).unwrap();
    assert_eq!(back, l);
}

// ── Selection ─────────────────────────────────────────────────────────────────

#[test]
fn selects_distinct_eligible_abilities() {
    let mut rng = seeded_rng();
    let l = ledger(&[(Ability::SpeedUp, 2), (Ability::Vampire, 1)]);
    for _ in 0..500 {
        let picks = select_upgrades(&l, 3, &mut rng).unwrap();
        assert_eq!(picks.len(), 3);
        assert!(!picks.contains(&Ability::SpeedUp));
        assert!(!picks.contains(&Ability::Vampire));
        let mut sorted = picks.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }
}

#[test]
fn exhausted_pool_fails() {
    let l = ledger(&[
        (Ability::SpeedUp, 2),
        (Ability::StrongDefense, 1),
        (Ability::EnergyBoost, 4),
        (Ability::RushAttack, 3),
        (Ability::Vampire, 1),
        (Ability::CriticalHit, 1),
    ]);
    assert_eq!(eligible(&l), vec![Ability::GetStronger]);
    assert_eq!(
        select_upgrades(&l, 3, &mut seeded_rng()),
        Err(AbilityError::Exhausted {
            requested: 3,
            available: 1
        })
    );
    assert_eq!(
        select_upgrades(&l, 1, &mut seeded_rng()),
        Ok(vec![Ability::GetStronger])
    );
}

#[test]
fn selection_is_roughly_uniform() {
    let mut rng = seeded_rng();
    let l = AbilityLedger::new();
    let mut hits = std::collections::HashMap::new();
    for _ in 0..7000 {
        for a in select_upgrades(&l, 1, &mut rng).unwrap() {
            *hits.entry(a).or_insert(0u32) += 1;
        }
    }
    for a in Ability::ALL {
        let n = hits.get(&a).copied().unwrap_or(0);
        assert!((800..1200).contains(&n), "{a:?} drawn {n} times");
    }
}
