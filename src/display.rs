/// Rendering layer. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// encounter.  No game logic is performed; this module only translates arena
/// coordinates into terminal cells and queues terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use planet_raid::abilities::Ability;
use planet_raid::boss;
use planet_raid::entities::{
    Boss, BossKind, BossLifecycle, Encounter, Enemy, EnemyKind, Facing, Outcome, Projectile,
    ProjectileKind, Side,
};
use planet_raid::events::Notification;
use planet_raid::progression::{self, ProgressionState};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_GROUND: Color = Color::DarkGreen;
const C_HUD_HEALTH: Color = Color::Green;
const C_HUD_BOSS: Color = Color::Red;
const C_HUD_KILLS: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_FADED: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;
const C_AIM: Color = Color::DarkYellow;

/// Frames a floating number stays on screen.
const FLOAT_FRAMES: u32 = 30;
/// Frames a banner stays on screen.
const BANNER_FRAMES: u32 = 180;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps arena units onto the terminal's play area (rows 2 .. height-3).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    arena: Vec2,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, arena: Vec2) -> Self {
        Self { cols, rows, arena }
    }

    fn play_rows(&self) -> f32 {
        self.rows.saturating_sub(4).max(1) as f32
    }

    fn play_cols(&self) -> f32 {
        self.cols.saturating_sub(2).max(1) as f32
    }

    /// Terminal cell for an arena point, or `None` when it is off the board.
    pub fn cell(&self, pos: Vec2) -> Option<(u16, u16)> {
        let x = pos.x / self.arena.x * self.play_cols();
        let y = pos.y / self.arena.y * self.play_rows();
        if x < 0.0 || y < 0.0 || x >= self.play_cols() || y >= self.play_rows() {
            return None;
        }
        Some((x as u16 + 1, y as u16 + 2))
    }

    /// Arena point under a terminal cell (used for mouse aim).
    pub fn arena_point(&self, col: u16, row: u16) -> Vec2 {
        let x = (col.saturating_sub(1) as f32 + 0.5) / self.play_cols() * self.arena.x;
        let y = (row.saturating_sub(2) as f32 + 0.5) / self.play_rows() * self.arena.y;
        Vec2::new(x, y)
    }
}

// ── Floating text ─────────────────────────────────────────────────────────────

/// Short-lived text spawned from encounter notifications.
#[derive(Clone, Debug)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub color: Color,
    pub frames_left: u32,
    pub banner: bool,
}

/// Turn drained notifications into overlay text.  Sound cues have no visual.
pub fn push_notifications(floats: &mut Vec<FloatingText>, notifications: &[Notification]) {
    for n in notifications {
        let float = match n {
            Notification::DamageNumber {
                amount,
                pos,
                critical,
            } => FloatingText {
                text: format_amount(*amount),
                pos: *pos,
                color: if *critical { Color::Red } else { Color::White },
                frames_left: FLOAT_FRAMES,
                banner: false,
            },
            Notification::Miss { pos } => FloatingText {
                text: "Miss".to_string(),
                pos: *pos,
                color: Color::Grey,
                frames_left: FLOAT_FRAMES,
                banner: false,
            },
            Notification::Heal { amount, pos } => FloatingText {
                text: format!("+{}", format_amount(*amount)),
                pos: *pos,
                color: Color::Green,
                frames_left: FLOAT_FRAMES,
                banner: false,
            },
            Notification::WarningBanner { text, pos } => FloatingText {
                text: text.clone(),
                pos: *pos,
                color: Color::Red,
                frames_left: BANNER_FRAMES,
                banner: true,
            },
            Notification::VictoryBanner { text, pos } => FloatingText {
                text: text.clone(),
                pos: *pos,
                color: Color::Yellow,
                frames_left: u32::MAX,
                banner: true,
            },
            Notification::Defeat { .. } | Notification::Sound(_) => continue,
        };
        floats.push(float);
    }
}

/// Drift numbers upward and expire old entries.
pub fn age_floats(floats: &mut Vec<FloatingText>) {
    for f in floats.iter_mut() {
        f.frames_left = f.frames_left.saturating_sub(1);
        if !f.banner {
            f.pos.y -= 2.0;
        }
    }
    floats.retain(|f| f.frames_left > 0);
}

fn format_amount(amount: f32) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.1}", amount)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    enc: &Encounter,
    floats: &[FloatingText],
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_ground(out, enc, view)?;
    draw_hud(out, enc, view)?;

    for enemy in &enc.enemies {
        draw_enemy(out, enemy, view)?;
    }
    if let Some(b) = &enc.boss {
        draw_boss(out, b, view)?;
    }
    for p in &enc.projectiles {
        draw_projectile(out, p, view)?;
    }

    draw_player(out, enc, view)?;
    draw_floats(out, floats, view)?;
    draw_controls_hint(out, view)?;

    if enc.state.outcome == Outcome::Lost {
        draw_game_over(out, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_ground<W: Write>(out: &mut W, enc: &Encounter, view: &Viewport) -> std::io::Result<()> {
    let Some((_, row)) = view.cell(Vec2::new(0.0, enc.config.ground_y())) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(Print("▔".repeat(view.cols.saturating_sub(2) as usize)))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "█".repeat(filled), "·".repeat(width - filled))
}

fn draw_hud<W: Write>(out: &mut W, enc: &Encounter, view: &Viewport) -> std::io::Result<()> {
    // Health, left
    let h = &enc.player.health;
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!(
        "HP {} {:>3}/{}",
        bar(h.fraction(), 12),
        h.current.ceil() as i64,
        h.max as i64
    )))?;

    // Level name, centre
    let name = progression::level_info(enc.state.level)
        .map(|l| l.name)
        .unwrap_or("Unknown World");
    let label = format!("[ {} ]", name);
    let lx = (view.cols / 2).saturating_sub(label.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(&label))?;

    // Kill counter or boss bar, right
    let right = match (&enc.boss, enc.state.boss) {
        (Some(b), _) => format!("BOSS {}", bar(b.health_fraction, 16)),
        (None, BossLifecycle::Pending { .. }) => "BOSS INCOMING".to_string(),
        _ => format!("Kills {:>2}/{}", enc.state.death, enc.state.max_death + 1),
    };
    let color = if enc.state.boss == BossLifecycle::None {
        C_HUD_KILLS
    } else {
        C_HUD_BOSS
    };
    let rx = view.cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(&right))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, enc: &Encounter, view: &Viewport) -> std::io::Result<()> {
    let p = &enc.player;
    if let Some((x, y)) = view.cell(p.pos) {
        let sprite = match p.facing {
            Facing::Idle => "◆",
            Facing::Left => "◀",
            Facing::Right => "▶",
        };
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(style::SetForegroundColor(C_PLAYER))?;
        out.queue(Print(sprite))?;
    }
    if let Some((x, y)) = view.cell(p.gun.aim) {
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(style::SetForegroundColor(C_AIM))?;
        out.queue(Print("+"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    let Some((x, y)) = view.cell(enemy.pos) else {
        return Ok(());
    };
    let (sprite, color) = match enemy.kind {
        EnemyKind::Enemy1 => ("«▼»", Color::Green),
        EnemyKind::Enemy2 => ("(◎)", Color::Blue),
        EnemyKind::Enemy3 => ("{░}", Color::DarkMagenta),
        EnemyKind::Enemy4 => ("<■>", Color::DarkRed),
        EnemyKind::Enemy5 => ("\\▲/", Color::Yellow),
    };
    out.queue(cursor::MoveTo(x.saturating_sub(1).max(1), y))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_boss<W: Write>(out: &mut W, b: &Boss, view: &Viewport) -> std::io::Result<()> {
    let Some((x, y)) = view.cell(b.pos) else {
        return Ok(());
    };
    let (rows, color): (&[&str], Color) = match b.kind {
        BossKind::Boss1 => (&["╔═▼═╗", "╚═◉═╝"], Color::Red),
        BossKind::Boss2 => (&["◢███████◣", "◥██◉◉◉██◤"], Color::Blue),
        BossKind::Boss3 => (&["░▒▓▒░", "▒◉ ◉▒"], Color::Magenta),
        BossKind::Boss4 => (&["✶✶✶", "✶◉✶"], Color::DarkRed),
        BossKind::Boss5 => (&["☼☼☼☼☼", "☼ ◉ ☼"], Color::Yellow),
    };
    let color = if boss::is_faded(b) { C_FADED } else { color };
    out.queue(style::SetForegroundColor(color))?;
    for (i, row) in rows.iter().enumerate() {
        let col = x.saturating_sub(row.chars().count() as u16 / 2).max(1);
        out.queue(cursor::MoveTo(col, y + i as u16))?;
        out.queue(Print(*row))?;
    }
    Ok(())
}

fn draw_projectile<W: Write>(out: &mut W, p: &Projectile, view: &Viewport) -> std::io::Result<()> {
    let Some((x, y)) = view.cell(p.pos) else {
        return Ok(());
    };
    let glyph = match p.kind {
        ProjectileKind::PlayerBullet => "•",
        ProjectileKind::BossBullet1 => "◉",
        ProjectileKind::EnemyBullet4 => {
            // Spin frame from the cosmetic angle.
            ["|", "/", "─", "\\"][((p.angle_deg.rem_euclid(180.0)) / 45.0) as usize % 4]
        }
        ProjectileKind::EnemyBullet5 => "*",
        _ => "o",
    };
    let color = match (p.side, p.faded) {
        (_, true) => C_FADED,
        (Side::Player, _) => C_BULLET_PLAYER,
        (Side::Enemy, _) => C_BULLET_ENEMY,
    };
    out.queue(cursor::MoveTo(x, y))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_floats<W: Write>(out: &mut W, floats: &[FloatingText], view: &Viewport) -> std::io::Result<()> {
    for f in floats {
        let (col, row) = if f.banner {
            let col = (view.cols / 2).saturating_sub(f.text.chars().count() as u16 / 2);
            (col, view.rows / 3)
        } else {
            match view.cell(f.pos) {
                Some(cell) => cell,
                None => continue,
            }
        };
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(f.color))?;
        out.queue(Print(&f.text))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("A D : Move   W : Fly   Mouse : Aim   Click / SPACE : Fire   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        ("R - Back to Menu  Q - Quit".to_string(), Color::White),
    ];
    draw_centered(out, view, &lines)
}

/// Level screen: world name, flavour text and how to start.
pub fn render_menu<W: Write>(
    out: &mut W,
    progress: &ProgressionState,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut lines = vec![
        ("★  PLANET  RAID  ★".to_string(), Color::Cyan),
        (String::new(), Color::White),
    ];
    if let Some(info) = progression::level_info(progress.level) {
        let planet = "●".repeat((info.planet_scale * 3.0).round() as usize);
        lines.push((format!("Level {}: {}", progress.level, info.name), Color::Yellow));
        lines.push((planet, Color::Blue));
        lines.push((info.description.to_string(), Color::Grey));
    }
    let held: Vec<String> = progress
        .abilities
        .iter()
        .map(|(a, c)| format!("{} x{}", a.name(), c))
        .collect();
    if !held.is_empty() {
        lines.push((String::new(), Color::White));
        lines.push((format!("Abilities: {}", held.join(", ")), Color::Green));
    }
    lines.push((String::new(), Color::White));
    lines.push(("ENTER - Start   Q - Quit".to_string(), Color::White));
    draw_centered(out, view, &lines)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Post-victory upgrade picker.
pub fn render_upgrades<W: Write>(
    out: &mut W,
    level_name: &str,
    choices: &[Ability],
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut lines = vec![
        (format!("You beat the boss of {}!", level_name), Color::Yellow),
        ("Select your ability:".to_string(), Color::Yellow),
        (String::new(), Color::White),
    ];
    for (i, a) in choices.iter().enumerate() {
        lines.push((format!("[{}] {:<16} {}", i + 1, a.name(), a.description()), Color::White));
    }
    draw_centered(out, view, &lines)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Final screen once every world is cleared.
pub fn render_congratulations<W: Write>(
    out: &mut W,
    progress: &ProgressionState,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (min, s) = progress.playtime();
    let lines = [
        ("Congratulations!".to_string(), Color::Yellow),
        ("You Win!".to_string(), Color::Yellow),
        (String::new(), Color::White),
        (format!("total playtime: {}min {}s", min, s), Color::White),
        (String::new(), Color::White),
        ("Press any key".to_string(), Color::DarkGrey),
    ];
    draw_centered(out, view, &lines)?;
    out.queue(style::ResetColor)?;
    out.flush()
}
