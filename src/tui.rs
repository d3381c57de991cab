//! Terminal front end
//!
//! Owns the terminal for the lifetime of the program. Key presses become
//! controller commands; snapshots and signals from the controller drive
//! redraws.

mod app;
mod render;

pub use app::{Action, App};

use crate::controller::ChatHandle;
use crossterm::{
    event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stderr};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

const TICK_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Merges terminal input with an animation tick
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(event) = reader.next().await {
                let app_event = match event {
                    // Release events would double every keystroke on some platforms
                    Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Some(AppEvent::Key(key))
                    }
                    Ok(TermEvent::Resize(..)) => Some(AppEvent::Resize),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "Terminal event stream failed");
                        break;
                    }
                };
                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stderr()))
}

pub fn restore() -> io::Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Restore the terminal before the default hook prints the panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Drive the UI until the user quits or the controller goes away
pub async fn run(terminal: &mut Tui, handle: &ChatHandle, endpoint: &str) -> io::Result<()> {
    let mut snapshots = handle.snapshots();
    let mut signals = handle.subscribe_signals();
    let mut events = EventHandler::new();
    let mut app = App::new(endpoint, snapshots.borrow_and_update().clone());

    loop {
        terminal.draw(|frame| render::draw(&mut app, frame))?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                match event {
                    AppEvent::Key(key) => match app.handle_key(key) {
                        Action::Submit(text) => handle.submit(text).await,
                        Action::Clear => handle.clear().await,
                        Action::Quit => break,
                        Action::None => {}
                    },
                    AppEvent::Tick => app.tick(),
                    AppEvent::Resize => {}
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::warn!("Controller stopped; leaving the UI");
                    break;
                }
                app.apply_snapshot(snapshots.borrow_and_update().clone());
            }
            signal = signals.recv() => match signal {
                Ok(signal) => app.apply_signal(&signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "UI signals lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}
