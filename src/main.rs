use std::io::{self, stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use podboard::app::LogicThread;
use podboard::backend::{Backend, FakeBackend, PodmanCli};
use podboard::config::Config;
use podboard::render::RenderState;
use podboard::{plog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// podboard - terminal dashboard for podman containers, pods, images,
/// networks and volumes
#[derive(Parser, Debug)]
#[command(name = "podboard")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    PODBOARD_DEBUG=1     Enable debug logging (alternative to --debug)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.podboard/podboard.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Run against built-in sample data instead of podman
    #[arg(long)]
    pub demo: bool,

    /// Resource list refresh interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub refresh: Option<u64>,

    /// Podman system connection to use
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    podboard::log::init(cli.debug);

    if cli.debug {
        plog!("podboard starting (debug mode enabled)");
    } else {
        plog!("podboard starting");
    }

    let mut config = Config::load()?;
    if let Some(ms) = cli.refresh {
        config.refresh_interval_ms = Some(ms);
    }
    if cli.connection.is_some() {
        config.connection = cli.connection.clone();
    }

    let backend: Arc<dyn Backend> = if cli.demo {
        Arc::new(FakeBackend::demo())
    } else {
        let podman = PodmanCli::detect(&config)?;
        match podman.version() {
            Ok(version) => plog!("using podman {}", version),
            Err(e) => plog!("podman version unavailable: {}", e),
        }
        Arc::new(podman)
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, backend, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;

    if let Ok(Err(e)) = logic_result {
        plog!("logic thread failed: {}", e);
        return Err(e);
    }
    result
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
