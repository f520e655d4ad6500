mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use glam::Vec2;
use rand::rngs::ThreadRng;
use rand::thread_rng;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use planet_raid::abilities::{self, Ability, AbilityError};
use planet_raid::compute::{drain_notifications, init_state, step, Horizontal, PlayerIntent};
use planet_raid::config::{CombatConfig, CONFIG_FILE};
use planet_raid::entities::{Encounter, Outcome};
use planet_raid::events::Notification;
use planet_raid::progression::{self, JsonFileStore, ProgressionState, ProgressionStore};

use display::{FloatingText, Viewport};

/// Upgrades offered after each victory.
const UPGRADE_CHOICES: usize = 3;

/// Frames the victory screen keeps running before the upgrade picker.
const VICTORY_HOLD_FRAMES: u32 = 120;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈130 ms at
/// 60 FPS) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file: the terminal belongs to the game.  `RUST_LOG` overrides the
/// default `info` level.
fn init_logging() -> std::io::Result<WorkerGuard> {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(home).join(".planet_raid").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "planet_raid.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    info!(dir = %log_dir.display(), "logging initialized");
    Ok(guard)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn viewport(config: &CombatConfig) -> std::io::Result<Viewport> {
    let (cols, rows) = terminal::size()?;
    Ok(Viewport::new(
        cols,
        rows,
        Vec2::new(config.arena_width, config.arena_height),
    ))
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    progress: &ProgressionState,
    config: &CombatConfig,
) -> std::io::Result<MenuResult> {
    display::render_menu(out, progress, &viewport(config)?)?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        })) = rx.recv()
        {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Encounter loop ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EncounterEnd {
    Won,
    Lost,
    Quit,
}

/// Run one encounter to its end.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key, and each frame the keys still "fresh"
/// are sampled into a single `PlayerIntent`.  The mouse sets the aim point and
/// a held left button fires; Space fires as well.
fn game_loop<W: Write>(
    out: &mut W,
    enc: &mut Encounter,
    rx: &mpsc::Receiver<Event>,
    clock: &Instant,
    rng: &mut ThreadRng,
) -> std::io::Result<EncounterEnd> {
    let frame_time = Duration::from_millis(enc.config.frame_ms.max(1));
    let mut view = viewport(&enc.config)?;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse_down = false;
    let mut aim = enc.config.center();
    let mut floats: Vec<FloatingText> = Vec::new();
    let mut frame: u64 = 0;
    let mut victory_frames: u32 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(EncounterEnd::Quit);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(EncounterEnd::Quit);
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if enc.state.outcome == Outcome::Lost =>
                            {
                                return Ok(EncounterEnd::Lost);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => {
                    aim = view.arena_point(column, row);
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => mouse_down = true,
                        MouseEventKind::Up(MouseButton::Left) => mouse_down = false,
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    view = Viewport::new(
                        cols,
                        rows,
                        Vec2::new(enc.config.arena_width, enc.config.arena_height),
                    );
                }
                _ => {}
            }
        }

        // ── Sample held keys into this tick's intent ──────────────────────────
        let left = any_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
        let right = any_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
        let intent = PlayerIntent {
            horizontal: match (left, right) {
                (true, _) => Horizontal::Left,
                (false, true) => Horizontal::Right,
                _ => Horizontal::Idle,
            },
            fly: any_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame),
            aim,
            fire: mouse_down || is_held(&key_frame, &KeyCode::Char(' '), frame),
        };

        let now_ms = clock.elapsed().as_millis() as u64;
        step(enc, &intent, now_ms, rng);

        let notifications = drain_notifications(enc);
        log_notifications(&notifications);
        display::age_floats(&mut floats);
        display::push_notifications(&mut floats, &notifications);

        display::render(out, enc, &floats, &view)?;

        if enc.state.outcome == Outcome::Won {
            victory_frames += 1;
            if victory_frames >= VICTORY_HOLD_FRAMES {
                return Ok(EncounterEnd::Won);
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}

/// Sound cues have no audio backend in the terminal; record them instead.
fn log_notifications(notifications: &[Notification]) {
    for n in notifications {
        if let Notification::Sound(cue) = n {
            tracing::trace!(cue = cue.name(), "sound");
        }
    }
}

// ── Upgrades ──────────────────────────────────────────────────────────────────

fn offer_upgrades(progress: &ProgressionState, rng: &mut ThreadRng) -> Vec<Ability> {
    match abilities::select_upgrades(&progress.abilities, UPGRADE_CHOICES, rng) {
        Ok(choices) => choices,
        Err(AbilityError::Exhausted { available, .. }) => {
            warn!(available, "fewer upgrades left than offered");
            abilities::select_upgrades(&progress.abilities, available, rng).unwrap_or_default()
        }
        Err(e) => {
            error!(error = %e, "upgrade selection failed");
            Vec::new()
        }
    }
}

fn pick_upgrade<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    progress: &mut ProgressionState,
    beaten_level: u32,
    config: &CombatConfig,
    rng: &mut ThreadRng,
) -> std::io::Result<bool> {
    let choices = offer_upgrades(progress, rng);
    if choices.is_empty() {
        return Ok(false);
    }
    let name = progression::level_info(beaten_level)
        .map(|l| l.name)
        .unwrap_or("this world");
    display::render_upgrades(out, name, &choices, &viewport(config)?)?;

    loop {
        if let Ok(Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        })) = rx.recv()
        {
            let index = match code {
                KeyCode::Char(c @ '1'..='9') => c as usize - '1' as usize,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
                _ => continue,
            };
            let Some(&ability) = choices.get(index) else {
                continue;
            };
            match progress.choose_ability(ability) {
                Ok(count) => info!(ability = ability.name(), count, "upgrade chosen"),
                Err(e) => warn!(error = %e, "upgrade rejected"),
            }
            return Ok(false);
        }
    }
}

fn wait_for_key(rx: &mpsc::Receiver<Event>) {
    while let Ok(ev) = rx.recv() {
        if let Event::Key(KeyEvent {
            kind: KeyEventKind::Press,
            ..
        }) = ev
        {
            return;
        }
    }
}

fn save(store: &JsonFileStore, progress: &ProgressionState) {
    if let Err(e) = store.save(progress) {
        error!(error = %e, path = %store.path().display(), "failed to save progression");
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let _log_guard = init_logging()?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        error!(error = %e, "terminal error");
    }
    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let config = CombatConfig::load(CONFIG_FILE).unwrap_or_else(|e| {
        warn!(error = %e, "bad config, using defaults");
        CombatConfig::default()
    });

    let store = JsonFileStore::new(JsonFileStore::default_path());
    let mut progress = progression::load_or_first_run(&store).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable progression, starting fresh");
        ProgressionState::first_run()
    });

    let clock = Instant::now();
    let mut rng = thread_rng();

    loop {
        if progress.is_campaign_complete() {
            display::render_congratulations(out, &progress, &viewport(&config)?)?;
            wait_for_key(rx);
            break;
        }

        match show_menu(out, rx, &progress, &config)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let now_ms = clock.elapsed().as_millis() as u64;
                let mut enc = match init_state(progress.level, &progress.abilities, config.clone(), now_ms) {
                    Ok(enc) => enc,
                    Err(e) => {
                        error!(error = %e, "cannot start encounter");
                        break;
                    }
                };

                let level = progress.level;
                match game_loop(out, &mut enc, rx, &clock, &mut rng)? {
                    EncounterEnd::Won => {
                        progress.record_victory(enc.state.elapsed_ms);
                        let quit = if progress.is_campaign_complete() {
                            false
                        } else {
                            pick_upgrade(out, rx, &mut progress, level, &config, &mut rng)?
                        };
                        save(&store, &progress);
                        if quit {
                            break;
                        }
                    }
                    EncounterEnd::Lost => progress.record_defeat(enc.state.elapsed_ms),
                    EncounterEnd::Quit => {
                        match enc.state.outcome {
                            Outcome::Won => {
                                progress.record_victory(enc.state.elapsed_ms);
                                save(&store, &progress);
                            }
                            Outcome::Lost => progress.record_defeat(enc.state.elapsed_ms),
                            Outcome::InProgress => {}
                        }
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
