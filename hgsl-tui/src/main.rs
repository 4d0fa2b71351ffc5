//! TUI entrypoint: renders a diffusion heat raster (time on X, node indices on Y)
//! Controls: [s] Step, [r] Run/Pause, [c] Restart, [q] Quit

mod app;
mod backend;
mod ui;

use anyhow::{Context, Result};
use app::App;
use backend::{DiffusionBackend, OperatorKind, RuntimeBackend};
use clap::Parser;
use hgsl_core::Hypergraph;
use hgsl_data::{load_hypergraph, NodeLabel};
use ui::draw;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event as CEvent, KeyCode},
    execute, terminal,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "hgsl-tui", version, about = "Watch a hyperedge source diffuse over a hypergraph")]
struct Args {
    /// JSON hyperedge file; a chain of overlapping triples when omitted.
    hyperedges: Option<PathBuf>,
    /// Hyperedge whose indicator is the initial signal.
    #[arg(long, default_value_t = 0)]
    source: usize,
    #[arg(long, value_enum, default_value_t = OperatorKind::Energy)]
    operator: OperatorKind,
    /// Raster width (columns in the time window).
    #[arg(long, default_value_t = 80)]
    width: usize,
    /// Milliseconds between ticks while running.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Write logs here; nothing is logged otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// 25 nodes, hyperedges {0,1,2}, {2,3,4}, ... sharing one node with their neighbour.
fn demo_hypergraph() -> Hypergraph<NodeLabel> {
    Hypergraph::new((0..12i64).map(|k| (2 * k..=2 * k + 2).map(NodeLabel::Id).collect::<Vec<_>>()))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn restore_terminal() -> Result<()> {
    terminal::disable_raw_mode()?;
    // Leave alternate screen and show cursor
    execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // Everything that can fail on bad input happens before the terminal is touched
    let hg = match &args.hyperedges {
        Some(path) => load_hypergraph(path)
            .with_context(|| format!("loading hyperedges from {}", path.display()))?,
        None => demo_hypergraph(),
    };
    let backend = RuntimeBackend::new(&hg, args.source, args.operator)?;
    info!(
        nodes = hg.n(),
        hyperedges = hg.m(),
        source = args.source,
        operator = args.operator.label(),
        "viewer starting"
    );

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    // Ensure terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));

    let mut app = App::new(backend, args.width);
    let tick_rate = Duration::from_millis(args.tick_ms.max(1));

    let outcome = run(&mut terminal, &mut app, tick_rate, args.operator.label());

    // Cleanup
    restore_terminal()?;
    outcome
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<RuntimeBackend>,
    tick_rate: Duration,
    operator: &str,
) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        draw(terminal, app, operator)?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if handle_key(app, key.code) == Control::Quit {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if app.running {
                step_logged(app);
            }
            last_tick = Instant::now();
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

fn handle_key<B: DiffusionBackend>(app: &mut App<B>, code: KeyCode) -> Control {
    match code {
        KeyCode::Char('q') => return Control::Quit,
        KeyCode::Char('s') => step_logged(app),
        KeyCode::Char('r') => app.toggle_running(),
        KeyCode::Char('c') => {
            app.restart();
            info!("diffusion restarted from x(0)");
        }
        _ => {}
    }
    Control::Continue
}

fn step_logged<B: DiffusionBackend>(app: &mut App<B>) {
    if let Err(e) = app.step() {
        error!(tick = app.tick(), "diffusion step failed: {:#}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_drive_the_app() {
        let hg = demo_hypergraph();
        assert_eq!(hg.n(), 25);
        let backend = RuntimeBackend::new(&hg, 0, OperatorKind::Energy).unwrap();
        let mut app = App::new(backend, 8);

        assert_eq!(handle_key(&mut app, KeyCode::Char('s')), Control::Continue);
        assert_eq!(handle_key(&mut app, KeyCode::Char('s')), Control::Continue);
        assert_eq!(app.tick(), 2);

        handle_key(&mut app, KeyCode::Char('r'));
        assert!(app.running);

        handle_key(&mut app, KeyCode::Char('c'));
        assert_eq!(app.tick(), 0);
        assert_eq!(app.raster[0][0], '█');
        assert!(app.raster.iter().all(|row| row[1..].iter().all(|&c| c == ' ')));

        assert_eq!(handle_key(&mut app, KeyCode::Char('x')), Control::Continue);
        assert_eq!(handle_key(&mut app, KeyCode::Char('q')), Control::Quit);
    }
}
