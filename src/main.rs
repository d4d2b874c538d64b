// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod droplet;
mod error;
mod frame;
mod glyph;
mod host;
mod logging;
mod palette;
mod rain;
mod surface;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Canvas;
use crate::config::{color_enabled_stdout, print_list_glyphs, Args, ColorBg, SURFACE_ID};
use crate::error::RainError;
use crate::frame::Frame;
use crate::host::{Clock, FrameQueue, MonotonicClock, ResizeEvents, Viewport};
use crate::palette::ColorMode;
use crate::rain::{FrameOutcome, FrameStats, RainAnimator};
use crate::surface::SurfaceRegistry;
use crate::terminal::{restore_terminal_best_effort, Terminal};

/// Repaint cadence of the emulated display; frame callbacks run at most this often.
const DISPLAY_HZ: f64 = 60.0;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> String {
    let sha = env!("DIGIRAIN_GIT_SHA");
    if sha.is_empty() {
        env!("DIGIRAIN_BUILD").to_string()
    } else {
        format!("{} ({})", env!("DIGIRAIN_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn detect_color_mode(args: &Args) -> Result<ColorMode, RainError> {
    match args.colormode {
        Some(bits) => ColorMode::from_bits(bits).ok_or(RainError::ColorMode(bits)),
        None => Ok(ColorMode::detect(
            &env::var("COLORTERM").unwrap_or_default(),
            &env::var("TERM").unwrap_or_default(),
        )),
    }
}

fn print_bitcolor_check(args: &Args) -> Result<(), RainError> {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    let auto = ColorMode::detect(&colorterm, &term);
    let effective = detect_color_mode(args)?;
    let or_unset = |s: &str| if s.is_empty() { "(unset)".to_string() } else { s.to_string() };

    println!("BITCOLOR CHECK:");
    println!("  COLORTERM: {}", or_unset(&colorterm));
    println!("  TERM: {}", or_unset(&term));
    println!("  auto_detected: {}", auto.label());
    if args.colormode.is_some() {
        println!("  forced: {}", effective.label());
    }
    println!("  effective: {}", effective.label());
    Ok(())
}

fn print_frame_stats(stats: FrameStats, requested: u64, elapsed: Duration) {
    let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
    println!("FRAME STATS:");
    println!("  elapsed_s: {:.3}", elapsed_s);
    println!("  callbacks_requested: {}", requested);
    println!("  drawn: {} ({:.3} fps)", stats.drawn, stats.drawn as f64 / elapsed_s);
    println!("  throttled: {}", stats.throttled);
    println!("  recycled_drops: {}", stats.recycled);
}

fn is_quit_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn run(args: &Args) -> Result<(), RainError> {
    let config = args.rain_config()?;
    let run_for = args.run_for()?;
    let color_mode = detect_color_mode(args)?;
    if let Some(path) = &args.log_file {
        logging::init_file_logging(path)?;
    }

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let bg = palette::background(color_mode, args.color_bg == ColorBg::DefaultBackground);

    let mut term = Terminal::new()?;
    let (cols, rows) = term.size()?;

    let mut doc = SurfaceRegistry::new();
    let canvas = doc.insert(SURFACE_ID, Canvas::new(config.glyph_size));
    let clock = MonotonicClock::new();
    let events = ResizeEvents::new();
    let mut frames = FrameQueue::new();

    let animator = RainAnimator::launch(
        &doc,
        SURFACE_ID,
        Viewport::for_terminal(cols, rows, config.glyph_size),
        clock.now(),
        config,
        rng,
        &events,
        &mut frames,
    )?;
    tracing::debug!(
        grid = ?canvas.borrow().grid_size(),
        columns = animator.borrow().columns(),
        resize_listeners = events.listener_count(),
        cols,
        rows,
        "canvas bound"
    );

    let mut frame = Frame::new(cols, rows, bg);
    let refresh = Duration::from_secs_f64(1.0 / DISPLAY_HZ);
    let start = Instant::now();
    let deadline = run_for.map(|d| start + d);
    let mut next_tick = start;

    loop {
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut quit = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        quit = args.screensaver || is_quit_key(k.code, k.modifiers);
                    }
                    _ => {}
                }
                if quit {
                    break;
                }
            }

            if quit || pending_resize.is_some() {
                break;
            }
            let now = Instant::now();
            if now >= next_tick {
                break;
            }
            let _ = Terminal::poll_event(next_tick - now)?;
        }

        if quit {
            animator.borrow_mut().stop();
            break;
        }
        if deadline.is_some_and(|end| Instant::now() >= end) {
            animator.borrow_mut().stop();
        }

        if let Some((nw, nh)) = pending_resize {
            events.emit(Viewport::for_terminal(nw, nh, config.glyph_size));
            frame = Frame::new(nw, nh, bg);
        }

        if !frames.take() {
            break;
        }
        let outcome = animator.borrow_mut().render_frame(clock.now(), &mut frames);
        if outcome == FrameOutcome::Drawn || pending_resize.is_some() {
            canvas.borrow().present(&mut frame, color_mode, bg);
        }
        if frame.has_changes() {
            term.draw(&mut frame)?;
        }

        next_tick += refresh;
        let now = Instant::now();
        if now > next_tick {
            next_tick = now;
        }
    }

    let stats = animator.borrow().stats();
    drop(term);
    if args.perf_stats {
        print_frame_stats(stats, frames.requests(), start.elapsed());
    }
    Ok(())
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command().styles(clap_styles());
    cmd = cmd.help_template(if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    });
    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_glyphs {
        print_list_glyphs();
        return;
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return;
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return;
    }

    let res = if args.check_bitcolor {
        print_bitcolor_check(&args)
    } else {
        run(&args)
    };

    if let Err(e) = res {
        restore_terminal_best_effort();
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
