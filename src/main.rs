//! QUADFALL - a falling-block puzzle for the terminal

mod audio;
mod board;
mod clock;
mod game;
mod input;
mod save;
mod settings;
mod tetromino;
mod ui;

use audio::{AudioManager, Sfx};
use clock::Clock;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::{BASE_SPEED, Game, Intent, TickEvent};
use input::InputHandler;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate, matching one simulation frame every 20ms
const TARGET_FPS: u64 = 50;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// How long save/load feedback stays on screen
const STATUS_DURATION: Duration = Duration::from_secs(2);

/// Get the quadfall temp directory, creating it if needed
fn quadfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("quadfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Setup tracing to a log file so the TUI stays clean
    let log_dir = quadfall_temp_dir();
    let file_appender = tracing_appender::rolling::never(&log_dir, "quadfall.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quadfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!("quadfall starting up, log={}", log_dir.join("quadfall.log").display());

    // Load settings
    let settings = Settings::load();

    // Initialize audio (optional - the game works without a device)
    let mut audio = AudioManager::new();
    if let Some(a) = &mut audio {
        a.set_bgm_volume(settings.audio.bgm_volume as f32 / 100.0);
        a.set_sfx_volume(settings.audio.sfx_volume as f32 / 100.0);
        a.play_bgm();
    }

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &settings, &mut audio);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Save settings
    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if let Ok((score, level)) = &result {
        println!("\nThanks for playing QUADFALL!");
        println!("Final Score: {} | Level: {}", score, level);
    }

    result.map(|_| ())
}

enum Flow {
    Continue,
    Quit,
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
    audio: &mut Option<AudioManager>,
) -> io::Result<(i32, i32)> {
    let mut game = Game::new();
    let mut input = InputHandler::from_settings(settings);
    // Held until the player starts the first game
    let mut clock = Clock::new(BASE_SPEED);
    clock.set_paused(true);
    let mut status: Option<(String, Instant)> = None;

    loop {
        // Drop expired feedback, then render
        if status
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() > STATUS_DURATION)
        {
            status = None;
        }
        let message = status.as_ref().map(|(text, _)| text.clone());
        terminal.draw(|frame| ui::render_game(frame, &game, settings, message.as_deref()))?;

        // Handle input; the poll timeout doubles as the frame budget
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                let intents = match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => input.key_down(key),
                    KeyEventKind::Release => input.key_up(key),
                };
                for intent in intents {
                    if let Flow::Quit = dispatch(intent, &mut game, &mut clock, &mut status) {
                        return Ok((game.score(), game.level()));
                    }
                    if intent == Intent::TogglePause {
                        // Entering a pause drops held keys and the music;
                        // leaving it picks the music back up.
                        if game.is_paused() {
                            for released in input.clear() {
                                let _ = dispatch(released, &mut game, &mut clock, &mut status);
                            }
                            if let Some(a) = audio {
                                a.pause_bgm();
                            }
                        } else if let Some(a) = audio {
                            a.resume_bgm();
                        }
                    }
                }
            }
        }

        // Held-key repeats and synthesized soft-drop releases
        for intent in input.update() {
            if let Flow::Quit = dispatch(intent, &mut game, &mut clock, &mut status) {
                return Ok((game.score(), game.level()));
            }
        }

        // Drain the elapsed simulation cycles into ticks
        clock.update();
        while clock.has_elapsed_cycle() {
            if let TickEvent::Locked { cleared } = game.tick() {
                // A lock drops the rate back to the standing speed and
                // restarts the accumulator for the fresh piece.
                clock.reset();
                if let Some(a) = audio {
                    a.play_sfx(Sfx::PieceLock);
                    if cleared > 0 {
                        a.play_sfx(Sfx::LineClear);
                    }
                }
                if game.is_game_over() {
                    tracing::info!(
                        "game over: score={} level={}",
                        game.score(),
                        game.level()
                    );
                }
            }
        }
        game.decay_drop_cooldown();

        // Mirror the session's pacing onto the clock
        clock.set_cycles_per_second(game.tick_rate());
        clock.set_paused(game.timer_paused());
    }
}

/// Route one intent: session intents go to the game, save/load to the
/// persistence layer, quit back to the caller.
fn dispatch(
    intent: Intent,
    game: &mut Game,
    clock: &mut Clock,
    status: &mut Option<(String, Instant)>,
) -> Flow {
    match intent {
        Intent::Quit => return Flow::Quit,
        Intent::Save => {
            let Some(state) = game.save_state() else {
                return Flow::Continue;
            };
            match save::save_to_file(&state, &save::default_path()) {
                Ok(()) => show(status, "Game saved"),
                Err(e) => {
                    tracing::warn!("save failed: {}", e);
                    show(status, &format!("Save failed: {}", e));
                }
            }
        }
        Intent::Load => match save::load_from_file(&save::default_path()) {
            Ok(state) => match game.restore_state(&state) {
                Ok(()) => {
                    clock.reset();
                    show(status, "Game loaded");
                }
                Err(e) => {
                    tracing::warn!("load rejected: {}", e);
                    show(status, &format!("Load failed: {}", e));
                }
            },
            Err(e) => {
                tracing::warn!("load failed: {}", e);
                show(status, &format!("Load failed: {}", e));
            }
        },
        Intent::Start => {
            let starting = game.is_new_game() || game.is_game_over();
            game.apply(intent);
            if starting {
                clock.reset();
            }
        }
        Intent::SoftDropStop => {
            // Restoring the standing rate also clears any tick backlog
            // accumulated at drop speed.
            game.apply(intent);
            clock.reset();
        }
        other => game.apply(other),
    }
    Flow::Continue
}

fn show(status: &mut Option<(String, Instant)>, message: &str) {
    *status = Some((message.to_string(), Instant::now()));
}
