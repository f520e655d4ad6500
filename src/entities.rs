/// All combat entity types and their per-kind stat tables. Pure data, no
/// simulation logic.

use glam::Vec2;

use crate::config::CombatConfig;
use crate::events::Notification;

// ── Sizes ─────────────────────────────────────────────────────────────────────

pub const PLAYER_SIZE: Vec2 = Vec2::new(36.0, 48.0);
pub const ENEMY_SIZE: Vec2 = Vec2::new(48.0, 48.0);

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned box centred on an entity position (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vec2,
    pub half: Vec2,
}

impl Bounds {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, half: size * 0.5 }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    PlayerBullet,
    EnemyBullet1,
    /// Homing; expires into an `EnemyBullet1` at double speed.
    BossBullet1,
    EnemyBullet2,
    EnemyBullet3,
    /// Spinning shard that deals a fixed penalty instead of its damage.
    EnemyBullet4,
    EnemyBullet5,
}

/// What a projectile does to the entity it reaches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitEffect {
    Damage,
    FixedPenalty(f32),
}

impl ProjectileKind {
    pub fn speed(self) -> f32 {
        match self {
            ProjectileKind::PlayerBullet | ProjectileKind::EnemyBullet4 => 8.0,
            ProjectileKind::EnemyBullet1 | ProjectileKind::EnemyBullet3 => 4.0,
            ProjectileKind::BossBullet1 | ProjectileKind::EnemyBullet2 => 4.2,
            ProjectileKind::EnemyBullet5 => 7.0,
        }
    }

    pub fn base_damage(self) -> f32 {
        match self {
            ProjectileKind::BossBullet1 => 20.0,
            _ => 10.0,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            ProjectileKind::PlayerBullet => Vec2::new(10.0, 10.0),
            ProjectileKind::BossBullet1 | ProjectileKind::EnemyBullet3 => Vec2::new(24.0, 24.0),
            ProjectileKind::EnemyBullet4 => Vec2::new(16.0, 16.0),
            _ => Vec2::new(12.0, 12.0),
        }
    }

    /// Remaining ticks before expiry, for kinds that expire.
    pub fn lifetime_ticks(self) -> Option<u32> {
        match self {
            ProjectileKind::BossBullet1 => Some(200),
            _ => None,
        }
    }

    pub fn is_homing(self) -> bool {
        matches!(self, ProjectileKind::BossBullet1)
    }

    /// Cosmetic spin in degrees per tick.
    pub fn spin(self) -> f32 {
        match self {
            ProjectileKind::EnemyBullet4 => 12.0,
            _ => 0.0,
        }
    }

    pub fn hit_effect(self) -> HitEffect {
        match self {
            ProjectileKind::EnemyBullet4 => HitEffect::FixedPenalty(1.0),
            _ => HitEffect::Damage,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub lifetime: Option<u32>,
    /// Travel angle in degrees (cosmetic).
    pub angle_deg: f32,
    /// Near-transparent rendering (cosmetic).
    pub faded: bool,
    pub alive: bool,
}

impl Projectile {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.kind.size())
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_HEALTH: f32 = 100.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_FLY_ACCEL: f32 = -0.2;
pub const PLAYER_GRAVITY: f32 = 0.5;
pub const GUN_DAMAGE: f32 = 10.0;
pub const GUN_COOLDOWN_MS: u64 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Idle,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gun {
    pub damage: f32,
    pub cooldown_ms: u64,
    pub last_fire_ms: u64,
    /// Last aim position in arena coordinates.
    pub aim: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: Health,
    /// Probability of negating a hit entirely.
    pub defense_rate: f64,
    /// Fraction of max health restored per common-enemy kill.
    pub vampire: f32,
    /// Probability of a double-damage shot.
    pub critical_hit: f64,
    pub speed: f32,
    pub gravity: f32,
    pub facing: Facing,
    pub gun: Gun,
}

impl Player {
    pub fn new(config: &CombatConfig) -> Self {
        let pos = Vec2::new(config.arena_width / 2.0, config.arena_height - 30.0);
        Self {
            pos,
            vel: Vec2::ZERO,
            health: Health::full(PLAYER_HEALTH),
            defense_rate: 0.0,
            vampire: 0.0,
            critical_hit: 0.0,
            speed: PLAYER_SPEED,
            gravity: 0.0,
            facing: Facing::Idle,
            gun: Gun {
                damage: GUN_DAMAGE,
                cooldown_ms: GUN_COOLDOWN_MS,
                last_fire_ms: 0,
                aim: pos,
            },
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, PLAYER_SIZE)
    }
}

// ── Common enemies ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Enemy1,
    Enemy2,
    Enemy3,
    Enemy4,
    Enemy5,
}

impl EnemyKind {
    /// The enemy type a level spawns.
    pub fn for_level(level: u32) -> Option<Self> {
        match level {
            1 => Some(EnemyKind::Enemy1),
            2 => Some(EnemyKind::Enemy2),
            3 => Some(EnemyKind::Enemy3),
            4 => Some(EnemyKind::Enemy4),
            5 => Some(EnemyKind::Enemy5),
            _ => None,
        }
    }

    pub fn base_health(self) -> f32 {
        match self {
            EnemyKind::Enemy3 => 25.0,
            EnemyKind::Enemy5 => 22.0,
            _ => 20.0,
        }
    }

    /// Fixed speed; Enemy2 and Enemy5 roll theirs at spawn instead.
    pub fn base_speed(self) -> f32 {
        match self {
            EnemyKind::Enemy4 => 1.5,
            _ => 2.0,
        }
    }

    pub fn fire_interval_ms(self) -> u64 {
        match self {
            EnemyKind::Enemy4 => 2000,
            EnemyKind::Enemy5 => 1500,
            _ => 3000,
        }
    }

    pub fn projectile(self) -> ProjectileKind {
        match self {
            EnemyKind::Enemy1 => ProjectileKind::EnemyBullet1,
            EnemyKind::Enemy2 => ProjectileKind::EnemyBullet2,
            EnemyKind::Enemy3 => ProjectileKind::EnemyBullet3,
            EnemyKind::Enemy4 => ProjectileKind::EnemyBullet4,
            EnemyKind::Enemy5 => ProjectileKind::EnemyBullet5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub speed: f32,
    pub health: Health,
    pub last_fire_ms: u64,
    pub alive: bool,
}

impl Enemy {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, ENEMY_SIZE)
    }
}

// ── Bosses ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossKind {
    Boss1,
    Boss2,
    Boss3,
    Boss4,
    Boss5,
}

pub const BOSS4_RUSH_SPEED: f32 = 15.0;

impl BossKind {
    pub fn for_level(level: u32) -> Option<Self> {
        match level {
            1 => Some(BossKind::Boss1),
            2 => Some(BossKind::Boss2),
            3 => Some(BossKind::Boss3),
            4 => Some(BossKind::Boss4),
            5 => Some(BossKind::Boss5),
            _ => None,
        }
    }

    pub fn base_health(self) -> f32 {
        match self {
            BossKind::Boss1 => 500.0,
            BossKind::Boss2 | BossKind::Boss5 => 600.0,
            BossKind::Boss3 | BossKind::Boss4 => 550.0,
        }
    }

    pub fn base_speed(self) -> f32 {
        match self {
            BossKind::Boss1 | BossKind::Boss4 => 1.5,
            BossKind::Boss2 => 2.5,
            BossKind::Boss3 => 1.2,
            BossKind::Boss5 => 1.0,
        }
    }

    pub fn fire_interval_ms(self) -> u64 {
        match self {
            BossKind::Boss1 => 3000,
            BossKind::Boss2 => 1600,
            BossKind::Boss3 => 5000,
            BossKind::Boss4 => 1000,
            BossKind::Boss5 => 80,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            BossKind::Boss1 => Vec2::new(120.0, 120.0),
            BossKind::Boss2 => Vec2::new(200.0, 120.0),
            BossKind::Boss3 => Vec2::new(140.0, 140.0),
            BossKind::Boss4 => Vec2::new(110.0, 110.0),
            BossKind::Boss5 => Vec2::new(150.0, 150.0),
        }
    }
}

/// Per-variant state layered on top of the shared chase-and-fire base.
#[derive(Clone, Debug, PartialEq)]
pub enum BossPattern {
    /// Boss1: homing shots, radial burst on death.
    Homing,
    /// Boss2: horizontal ping-pong, spawns minions instead of firing.
    PingPong { direction: f32 },
    /// Boss3: timed fade cycle and 10-shot volleys.
    ///
    /// `visible` gates collision and `faded` drives rendering. Both flip on the
    /// same timer but are stored separately and can be set independently.
    Phantom {
        fire_counter: u32,
        visible: bool,
        faded: bool,
        last_toggle_ms: u64,
    },
    /// Boss4: spins, deals contact damage, rushes periodically.
    Spinner { rush_counter: u32 },
    /// Boss5: radial volleys and minion waves driven by one counter.
    Carousel { fire_counter: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub kind: BossKind,
    pub pos: Vec2,
    pub speed: f32,
    pub health: Health,
    /// Mirrors `health.fraction()` for the boss bar.
    pub health_fraction: f32,
    pub last_fire_ms: u64,
    /// Cosmetic rotation in degrees.
    pub angle_deg: f32,
    pub pattern: BossPattern,
}

impl Boss {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.kind.size())
    }
}

// ── Intents ───────────────────────────────────────────────────────────────────

/// Side effects requested by enemy and boss updates, applied by the encounter.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Fire {
        kind: ProjectileKind,
        from: Vec2,
        to: Vec2,
        /// Multiplier applied to the kind's speed.
        speed_scale: f32,
        faded: bool,
    },
    SpawnEnemy {
        kind: EnemyKind,
        at: Vec2,
    },
    ContactDamage {
        amount: f32,
    },
}

// ── Encounter ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossLifecycle {
    None,
    /// Warning shown; the boss arrives once the delay has elapsed.
    Pending { since_ms: u64 },
    Active,
    Defeated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

/// Per-playthrough counters.
#[derive(Clone, Debug, PartialEq)]
pub struct EncounterState {
    pub level: u32,
    /// Cumulative common-enemy kills.
    pub death: u32,
    /// Kill threshold for boss activation.
    pub max_death: u32,
    pub boss: BossLifecycle,
    pub outcome: Outcome,
    pub started_ms: u64,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnTimer {
    pub interval_ms: f64,
    pub last_spawn_ms: u64,
}

/// The entire encounter.  Cloneable so the pure `tick` can return a new copy
/// without mutating the original.
#[derive(Clone, Debug)]
pub struct Encounter {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    /// Projectiles created while `projectiles` is being walked; appended at
    /// end of tick.
    pub pending_projectiles: Vec<Projectile>,
    pub state: EncounterState,
    pub spawner: SpawnTimer,
    /// UI notifications produced since the last drain.
    pub notifications: Vec<Notification>,
    pub config: CombatConfig,
    pub frame: u64,
}
