//! Terminal input and timers for the interactive view.
//!
//! Both are scoped to the view: dropping them stops the reader thread and
//! the interval.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};
use tokio::{sync::mpsc, time::MissedTickBehavior};

use crate::controller::Key;

pub fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let key = match event.code {
        KeyCode::Char(c) if ctrl => Key::Ctrl(c.to_ascii_lowercase()),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        _ => return None,
    };

    Some(key)
}

/// Global key handler. A background thread polls crossterm and forwards
/// key presses until the listener is dropped.
pub struct KeyboardListener {
    rx: mpsc::UnboundedReceiver<Key>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyboardListener {
    pub fn start(poll_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        let handle = std::thread::spawn({
            let stop = stop.clone();
            move || {
                while !stop.load(Ordering::Relaxed) {
                    match event::poll(poll_rate) {
                        Ok(true) => match event::read() {
                            Ok(CrosstermEvent::Key(key)) => {
                                let Some(key) = map_key(key) else {
                                    continue;
                                };
                                if tx.send(key).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(err) => {
                                log::error!("reading terminal event failed: {err}");
                                break;
                            }
                        },
                        Ok(false) => {}
                        Err(err) => {
                            log::error!("polling terminal events failed: {err}");
                            break;
                        }
                    }
                }
                log::debug!("keyboard listener stopped");
            }
        });

        KeyboardListener {
            rx,
            stop,
            handle: Some(handle),
        }
    }

    /// `None` once the reader thread has gone away.
    pub async fn next(&mut self) -> Option<Key> {
        self.rx.recv().await
    }
}

impl Drop for KeyboardListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.join() {
                log::error!("keyboard listener panicked: {err:?}");
            }
        }
    }
}

/// Periodic wake-up for suggestion rotation and debounce deadlines.
pub struct RotationTimer {
    interval: tokio::time::Interval,
}

impl RotationTimer {
    /// Must be created inside a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        RotationTimer { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
