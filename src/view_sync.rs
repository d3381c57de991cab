//! Follow-tail scrolling for the transcript pane

/// The two inputs that decide whether the pane must jump to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewKey {
    pub len: usize,
    pub typing: bool,
}

/// Scroll geometry of the visible transcript container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranscriptPane {
    pub content_lines: u16,
    pub viewport_lines: u16,
    pub offset: u16,
}

impl TranscriptPane {
    pub fn scroll_to_end(&mut self) {
        self.offset = self.content_lines.saturating_sub(self.viewport_lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.content_lines.saturating_sub(self.viewport_lines);
        self.offset = self.offset.saturating_add(lines).min(max);
    }
}

/// Stateless: callers keep the previous key themselves.
pub struct ViewSync;

impl ViewSync {
    /// Jump to the end when the transcript length or typing flag changed.
    /// A pane that is not attached yet is left alone.
    pub fn sync(previous: Option<ViewKey>, current: ViewKey, pane: Option<&mut TranscriptPane>) {
        if previous == Some(current) {
            return;
        }
        if let Some(pane) = pane {
            pane.scroll_to_end();
        }
    }
}
