//! UI-side state: input buffer, latest snapshot, scroll pane

use crate::controller::{ChatSnapshot, UiSignal};
use crate::view_sync::{TranscriptPane, ViewKey, ViewSync};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(String),
    Clear,
    Quit,
}

pub struct App {
    pub endpoint: String,
    pub snapshot: ChatSnapshot,
    pub input: String,
    pub input_focused: bool,
    /// Latest refusal from the controller, shown until the next key press
    pub notice: Option<String>,
    /// Attached on first draw, once the viewport size is known
    pub pane: Option<TranscriptPane>,
    pub animation_frame: u8,
    last_synced: Option<ViewKey>,
}

impl App {
    pub fn new(endpoint: &str, snapshot: ChatSnapshot) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            snapshot,
            input: String::new(),
            input_focused: true,
            notice: None,
            pane: None,
            animation_frame: 0,
            last_synced: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Char('l') if ctrl => Action::Clear,
            // Routed even while pending; the controller decides
            KeyCode::Enter => Action::Submit(self.input.clone()),
            // Focus moves to the transcript; a focus signal brings it back
            KeyCode::Tab => {
                self.input_focused = !self.input_focused;
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                if self.editable() {
                    self.input.push(c);
                }
                Action::None
            }
            KeyCode::Backspace => {
                if self.editable() {
                    self.input.pop();
                }
                Action::None
            }
            KeyCode::Up => self.scroll(|pane| pane.scroll_up(1)),
            KeyCode::Down => self.scroll(|pane| pane.scroll_down(1)),
            KeyCode::PageUp => self.scroll(|pane| pane.scroll_up(pane.viewport_lines)),
            KeyCode::PageDown => self.scroll(|pane| pane.scroll_down(pane.viewport_lines)),
            _ => Action::None,
        }
    }

    /// The input behaves like a disabled text area while a reply is pending
    pub fn editable(&self) -> bool {
        self.input_focused && !self.snapshot.pending
    }

    fn scroll(&mut self, f: impl FnOnce(&mut TranscriptPane)) -> Action {
        if let Some(pane) = self.pane.as_mut() {
            f(pane);
        }
        Action::None
    }

    pub fn apply_snapshot(&mut self, snapshot: ChatSnapshot) {
        if snapshot.generation != self.snapshot.generation {
            self.notice = None;
        }
        self.snapshot = snapshot;
    }

    pub fn apply_signal(&mut self, signal: &UiSignal) {
        match signal {
            UiSignal::ClearInput => self.input.clear(),
            UiSignal::FocusInput => self.input_focused = true,
            UiSignal::Rejected(reason) => self.notice = Some(reason.clone()),
        }
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    /// Attach or resize the pane, then keep the newest line visible when
    /// the transcript or typing indicator changed
    pub fn layout_pane(&mut self, content_lines: u16, viewport_lines: u16) {
        let pane = self.pane.get_or_insert_with(TranscriptPane::default);
        pane.content_lines = content_lines;
        pane.viewport_lines = viewport_lines;
        let max = content_lines.saturating_sub(viewport_lines);
        pane.offset = pane.offset.min(max);
        self.follow_tail();
    }

    pub fn follow_tail(&mut self) {
        let key = self.snapshot.view_key();
        ViewSync::sync(self.last_synced, key, self.pane.as_mut());
        if self.pane.is_some() {
            self.last_synced = Some(key);
        }
    }
}
