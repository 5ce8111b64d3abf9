use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use arena_shooter::display::TerminalPort;
use arena_shooter::geometry::RngSource;
use arena_shooter::motion::Arena;
use arena_shooter::port::{present, RenderPort};
use arena_shooter::{GameConfig, Round};

const FRAME: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(name = "arena_shooter")]
#[command(about = "Clear the arena of wandering targets before one reaches you")]
struct Args {
    /// JSON file overriding any game setting
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible round
    #[arg(short, long)]
    seed: Option<u64>,

    /// Arena width in pixels
    #[arg(long)]
    width: Option<i32>,

    /// Arena height in pixels
    #[arg(long)]
    height: Option<i32>,
}

fn load_config(args: &Args) -> Result<GameConfig, arena_shooter::ConfigError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = args.width {
        config.arena_width = width;
    }
    if let Some(height) = args.height {
        config.arena_height = height;
    }
    config.validate()?;
    Ok(config)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.  Enter starts a round from the prompt and
/// restarts after a win or loss; held keys are read through the port each
/// frame and fed to the round.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    rng: &mut RngSource<StdRng>,
) -> std::io::Result<()> {
    let mut port = TerminalPort::new(config.arena_width, config.arena_height);
    let tolerance = config.tolerance;
    let mut round = Round::new(config);
    present(&mut port, round.drain_events());

    let mut last = Instant::now();
    loop {
        let frame_start = Instant::now();
        port.next_frame();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            if kind == KeyEventKind::Press {
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Enter if !round.is_running() => {
                        let (width, height) = port.arena_size();
                        port.clear_result();
                        if let Err(e) = round.restart(Arena::new(width, height, tolerance)) {
                            warn!("{e}");
                        }
                        continue;
                    }
                    _ => {}
                }
            }
            port.record_key(code, kind);
        }

        round.set_controls(port.held_controls());
        let now = Instant::now();
        round.advance(now.duration_since(last).as_millis() as u64, rng);
        last = now;

        present(&mut port, round.drain_events());
        port.render(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    let mut rng = RngSource(match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    });
    info!("starting with seed {:?}", args.seed);

    if let Err(e) = run(config, &mut rng) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config: GameConfig, rng: &mut RngSource<StdRng>) -> std::io::Result<()> {
    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &rx, config, rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
