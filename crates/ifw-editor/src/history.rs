//! Sent-message history with a draft slot.
//!
//! `cursor == entries.len()` means the draft is being viewed. Leaving the
//! draft snapshots the live buffer; coming back restores it as it was.

/// Append-only log of sent messages plus the unsent draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<String>,
    draft: String,
    cursor: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn at_draft(&self) -> bool {
        self.cursor == self.entries.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        !self.at_draft()
    }

    /// One-based position and total slot count (entries plus the draft),
    /// e.g. `(3, 3)` while on the draft after two sends. `None` with no history.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.entries.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.entries.len() + 1))
        }
    }

    /// Step towards older entries. `current` is the live buffer, saved into
    /// the draft slot when leaving the draft.
    ///
    /// Returns the text to show, or `None` when already at the oldest entry.
    pub fn back(&mut self, current: &str) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        if self.at_draft() {
            self.draft = current.to_string();
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].as_str())
    }

    /// Step towards newer entries, ending at the draft.
    ///
    /// Returns the text to show, or `None` when already on the draft.
    pub fn forward(&mut self) -> Option<&str> {
        if self.at_draft() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries.get(self.cursor).unwrap_or(&self.draft).as_str())
    }

    /// Append a sent message. Always appends, including exact re-sends of the
    /// entry being viewed; the view returns to an empty draft.
    pub fn record_sent(&mut self, text: impl Into<String>) {
        self.entries.push(text.into());
        self.cursor = self.entries.len();
        self.draft.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(entries: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::new();
        for e in entries {
            log.record_sent(*e);
        }
        log
    }

    #[test]
    fn test_navigation_round_trip_restores_draft() {
        let mut log = log_with(&["a", "b"]);
        assert_eq!(log.cursor(), 2);
        assert!(log.at_draft());

        assert_eq!(log.back("c"), Some("b"));
        assert_eq!(log.cursor(), 1);
        assert_eq!(log.back("b"), Some("a"));
        assert_eq!(log.cursor(), 0);
        assert_eq!(log.back("a"), None);
        assert_eq!(log.cursor(), 0);

        assert_eq!(log.forward(), Some("b"));
        assert_eq!(log.forward(), Some("c"));
        assert!(log.at_draft());
        assert_eq!(log.forward(), None);
    }

    #[test]
    fn test_back_only_snapshots_when_leaving_draft() {
        let mut log = log_with(&["a", "b"]);
        log.back("draft text");
        // Edits made while viewing history do not overwrite the draft.
        log.back("b edited");
        assert_eq!(log.draft(), "draft text");
        log.forward();
        assert_eq!(log.forward(), Some("draft text"));
    }

    #[test]
    fn test_record_sent_always_appends() {
        let mut log = log_with(&["a", "a"]);
        assert_eq!(log.entries(), &["a".to_string(), "a".to_string()]);

        // Re-send a viewed entry.
        assert_eq!(log.back("draft"), Some("a"));
        log.record_sent("a");
        assert_eq!(log.len(), 3);
        assert!(log.at_draft());
        assert_eq!(log.draft(), "");
    }

    #[test]
    fn test_empty_log_is_noop() {
        let mut log = HistoryLog::new();
        assert_eq!(log.back("typing"), None);
        assert_eq!(log.forward(), None);
        assert_eq!(log.draft(), "");
        assert_eq!(log.position(), None);
        assert!(!log.can_go_back());
        assert!(!log.can_go_forward());
    }

    #[test]
    fn test_position() {
        let mut log = log_with(&["a", "b"]);
        assert_eq!(log.position(), Some((3, 3)));
        log.back("");
        assert_eq!(log.position(), Some((2, 3)));
        assert!(log.can_go_back());
        assert!(log.can_go_forward());
    }
}
