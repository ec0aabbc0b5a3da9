//! Interactive terminal view.
//!
//! Runs on a single-threaded tokio runtime. Fetches are handed to the
//! blocking pool and their results come back over a channel, tagged with
//! the ticket the controller issued for them.

mod events;
mod ui;

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::stdout,
    process::{Command, Stdio},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    controller::{Controller, Effect, FetchTicket},
    entry::Corpus,
    remote::{self, FetchError, RecordSource},
};
use events::{KeyboardListener, RotationTimer};

const KEY_POLL_RATE: Duration = Duration::from_millis(100);
const TICK_RATE: Duration = Duration::from_millis(50);

type FetchOutcome = (FetchTicket, Result<Corpus, FetchError>);

/// Raw mode and the alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> std::io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            log::error!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(stdout(), LeaveAlternateScreen, cursor::Show) {
            log::error!("failed to leave alternate screen: {err}");
        }
    }
}

pub fn start(config: &Config, source: Arc<dyn RecordSource>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run_view(config, source));

    // an in-flight fetch must not keep the process alive
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

fn spawn_fetch(
    source: &Arc<dyn RecordSource>,
    ticket: FetchTicket,
    tx: mpsc::UnboundedSender<FetchOutcome>,
) {
    let source = source.clone();
    tokio::task::spawn_blocking(move || {
        let result = remote::fetch_all(source.as_ref(), &ticket.query);
        // receiver is gone once the view closed
        let _ = tx.send((ticket, result));
    });
}

fn open_url(url: &str) -> std::io::Result<()> {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    log::info!("opening {url}");
    Command::new(program)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(())
}

async fn run_view(config: &Config, source: Arc<dyn RecordSource>) -> anyhow::Result<()> {
    let (mut controller, ticket) = Controller::new(config, Instant::now())?;

    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchOutcome>();
    spawn_fetch(&source, ticket, fetch_tx.clone());

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut keyboard = KeyboardListener::start(KEY_POLL_RATE);
    let mut timer = RotationTimer::new(TICK_RATE);

    loop {
        terminal.draw(|frame| ui::draw(frame, &controller, Instant::now()))?;

        let effects = tokio::select! {
            key = keyboard.next() => match key {
                Some(key) => controller.handle_key(key, Instant::now()),
                None => break,
            },
            Some((ticket, result)) = fetch_rx.recv() => {
                controller.complete_fetch(&ticket, result, Instant::now());
                vec![]
            },
            _ = timer.tick() => controller.tick(Instant::now()),
        };

        for effect in effects {
            match effect {
                Effect::Fetch(ticket) => spawn_fetch(&source, ticket, fetch_tx.clone()),
                Effect::Open(url) => {
                    if let Err(err) = open_url(&url) {
                        log::error!("failed to open {url}: {err}");
                        controller.set_status(format!("could not open {url}: {err}"));
                    }
                }
                Effect::Quit => return Ok(()),
            }
        }
    }

    Ok(())
}
