//! Chat controller runtime
//!
//! Owns the live conversation (state, session, transcript) and executes the
//! effects produced by the state machine. Commands from the UI and events
//! from spawned work are processed one at a time in a single task, so the
//! conversation never needs a lock.

#[cfg(test)]
pub mod testing;

use crate::client::{ChatBackend, ChatError};
use crate::session::{SessionManager, TurnTag};
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event, TransitionError};
use crate::transcript::{Message, Transcript};
use crate::view_sync::ViewKey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Requests from the UI
#[derive(Debug, Clone)]
pub enum Command {
    Submit(String),
    Clear,
    Shutdown,
}

/// One-shot notifications for the input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiSignal {
    ClearInput,
    FocusInput,
    Rejected(String),
}

/// Everything a renderer needs, published after every processed step
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub conversation_id: String,
    pub generation: u64,
    pub messages: Arc<[Message]>,
    /// A request is outstanding
    pub pending: bool,
    /// The thinking indicator should show. Outlives `pending` by the
    /// smoothing delay.
    pub typing: bool,
}

impl ChatSnapshot {
    pub fn view_key(&self) -> ViewKey {
        ViewKey {
            len: self.messages.len(),
            typing: self.typing,
        }
    }
}

/// UI side of a running controller
pub struct ChatHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<ChatSnapshot>,
    signals: broadcast::Sender<UiSignal>,
}

impl ChatHandle {
    pub async fn submit(&self, text: impl Into<String>) {
        self.send(Command::Submit(text.into())).await;
    }

    pub async fn clear(&self) {
        self.send(Command::Clear).await;
    }

    pub async fn shutdown(&self) {
        self.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            tracing::warn!("Chat controller has stopped; command dropped");
        }
    }

    pub fn snapshots(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe_signals(&self) -> broadcast::Receiver<UiSignal> {
        self.signals.subscribe()
    }
}

pub struct ChatController<B: ChatBackend + 'static> {
    state: ChatState,
    session: SessionManager,
    transcript: Transcript,
    backend: Arc<B>,
    smoothing_delay: Duration,
    command_rx: mpsc::Receiver<Command>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
    signal_tx: broadcast::Sender<UiSignal>,
    /// Token for the request in flight
    request_cancel: Option<CancellationToken>,
    /// Tokens for smoothing timers that have not fired yet
    reveals: HashMap<TurnTag, CancellationToken>,
}

impl<B: ChatBackend + 'static> ChatController<B> {
    pub fn new(backend: B, smoothing_delay: Duration) -> (Self, ChatHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(32);
        let (signal_tx, _) = broadcast::channel(64);

        let session = SessionManager::new();
        let transcript = Transcript::default();
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSnapshot {
            conversation_id: session.id().to_string(),
            generation: session.generation(),
            messages: transcript.snapshot(),
            pending: false,
            typing: false,
        });

        let handle = ChatHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            signals: signal_tx.clone(),
        };

        let controller = Self {
            state: ChatState::Idle,
            session,
            transcript,
            backend: Arc::new(backend),
            smoothing_delay,
            command_rx,
            event_rx,
            event_tx,
            snapshot_tx,
            signal_tx,
            request_cancel: None,
            reveals: HashMap::new(),
        };

        (controller, handle)
    }

    pub async fn run(mut self) {
        tracing::info!(
            conversation_id = %self.session.id(),
            endpoint = %self.backend.endpoint(),
            "Starting chat controller"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Submit(text)) => self.submit(&text),
                    Some(Command::Clear) => self.clear(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = self.event_rx.recv() => self.process_event(event),
            }
        }

        self.shutdown();
        tracing::info!(conversation_id = %self.session.id(), "Chat controller stopped");
    }

    pub fn submit(&mut self, text: &str) {
        let turn = self.session.next_turn();
        self.process_event(Event::Submit {
            text: text.to_string(),
            turn,
        });
    }

    pub fn clear(&mut self) {
        self.process_event(Event::Clear);
    }

    /// Wait for the next event from spawned work and process it
    #[cfg(test)]
    pub async fn next_event(&mut self) -> bool {
        match self.event_rx.recv().await {
            Some(event) => {
                self.process_event(event);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            conversation_id: self.session.id().to_string(),
            generation: self.session.generation(),
            messages: self.transcript.snapshot(),
            pending: self.state.is_sending(),
            typing: self.state.is_sending() || !self.reveals.is_empty(),
        }
    }

    fn process_event(&mut self, event: Event) {
        let name = event.name();
        if let Event::RevealElapsed { turn, .. } = &event {
            self.reveals.remove(turn);
        }

        let context = ChatContext::new(
            self.session.id(),
            self.session.generation(),
            self.smoothing_delay,
        );

        match transition(&self.state, &context, event) {
            Ok(result) => {
                self.state = result.new_state;
                for effect in result.effects {
                    self.execute_effect(effect);
                }
            }
            Err(e @ (TransitionError::EmptyInput | TransitionError::Busy)) => {
                tracing::debug!(event = name, reason = %e, "Submission dropped");
                let _ = self.signal_tx.send(UiSignal::Rejected(e.to_string()));
            }
            Err(TransitionError::StaleTurn) => {
                tracing::debug!(event = name, "Discarding result for a stale turn");
            }
        }

        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                tracing::debug!(
                    sender = ?message.sender,
                    is_error = message.is_error,
                    len = self.transcript.len() + 1,
                    "Appending message"
                );
                self.transcript = self.transcript.append(message);
            }

            Effect::ResetTranscript { seed } => {
                self.transcript = self.transcript.reset(seed);
            }

            Effect::ResetSession => {
                self.session.reset();
            }

            Effect::ClearInput => {
                let _ = self.signal_tx.send(UiSignal::ClearInput);
            }

            Effect::FocusInput => {
                let _ = self.signal_tx.send(UiSignal::FocusInput);
            }

            Effect::DispatchRequest {
                turn,
                text,
                conversation_id,
            } => {
                let cancel_token = CancellationToken::new();
                self.request_cancel = Some(cancel_token.clone());

                let backend = Arc::clone(&self.backend);
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::debug!(
                        conversation_id = %conversation_id,
                        seq = turn.seq,
                        "Dispatching chat request"
                    );

                    // The call runs in its own task so a panic inside the
                    // backend still produces a failure event.
                    let mut call =
                        tokio::spawn(async move { backend.send(&text, &conversation_id).await });

                    tokio::select! {
                        biased;

                        () = cancel_token.cancelled() => {
                            call.abort();
                            tracing::info!(seq = turn.seq, "Chat request cancelled");
                        }

                        joined = &mut call => {
                            let event = match joined {
                                Ok(Ok(reply)) => Event::ReplyReceived { turn, text: reply.text },
                                Ok(Err(error)) => Event::RequestFailed { turn, error },
                                Err(e) => Event::RequestFailed {
                                    turn,
                                    error: ChatError::connection(format!("Request task failed: {e}")),
                                },
                            };
                            let _ = event_tx.send(event).await;
                        }
                    }
                });
            }

            Effect::AbortRequest => {
                if let Some(token) = self.request_cancel.take() {
                    token.cancel();
                }
            }

            Effect::ScheduleReveal {
                turn,
                reveal,
                delay,
            } => {
                self.request_cancel = None;

                let cancel_token = CancellationToken::new();
                self.reveals.insert(turn, cancel_token.clone());
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        biased;

                        () = cancel_token.cancelled() => {}

                        () = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(Event::RevealElapsed { turn, reveal }).await;
                        }
                    }
                });
            }

            Effect::CancelReveals => {
                for (_, token) in self.reveals.drain() {
                    token.cancel();
                }
            }
        }
    }

    /// Cancel all outstanding work
    fn shutdown(&mut self) {
        if let Some(token) = self.request_cancel.take() {
            token.cancel();
        }
        for (_, token) in self.reveals.drain() {
            token.cancel();
        }
    }
}
