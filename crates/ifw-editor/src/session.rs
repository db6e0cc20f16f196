//! Draft session: the live buffer and the pipeline that runs on every edit.

use std::sync::Arc;
use std::time::Instant;

use ifw_core::config::Profile;
use ifw_core::error::Result;
use ifw_core::types::TriggerAction;

use crate::clock::Clock;
use crate::history::HistoryLog;
use crate::substitution::SubstitutionEngine;
use crate::trigger::VoiceTrigger;

/// What an edit did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    /// The substitution engine rewrote the buffer.
    pub substituted: bool,
    /// A voice trigger was armed by this edit.
    pub armed: Option<TriggerAction>,
}

/// One client's editing state.
///
/// Owns the draft buffer exclusively; every mutation goes through a method
/// here so the debouncer sees each change.
pub struct DraftSession {
    buffer: String,
    cursor: usize,
    engine: SubstitutionEngine,
    trigger: VoiceTrigger,
    history: HistoryLog,
    clock: Arc<dyn Clock>,
    in_flight: Option<String>,
}

impl std::fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSession")
            .field("buffer_len", &self.buffer.len())
            .field("cursor", &self.cursor)
            .field("trigger", self.trigger.state())
            .field("history_len", &self.history.len())
            .field("sending", &self.in_flight.is_some())
            .finish()
    }
}

impl DraftSession {
    /// Build a session from the profile's substitution table and voice settings.
    pub fn new(profile: &Profile, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            buffer: String::new(),
            cursor: 0,
            engine: SubstitutionEngine::new(&profile.substitutions)?,
            trigger: VoiceTrigger::new(profile.voice_send.clone()),
            history: HistoryLog::new(),
            clock,
            in_flight: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor as a char index into `text()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn trigger(&self) -> &VoiceTrigger {
        &self.trigger
    }

    /// Deadline of the pending voice trigger, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.trigger.deadline()
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replace the buffer with user-edited text and run the pipeline.
    pub fn edit(&mut self, text: impl Into<String>, cursor: usize) -> EditOutcome {
        let text = text.into();
        let (rewritten, cursor) = self.engine.apply(&text, cursor);
        let substituted = rewritten != text;
        self.buffer = rewritten;
        self.cursor = cursor;
        let armed = self
            .trigger
            .on_edit(&self.buffer, self.clock.now())
            .map(|p| p.action);
        EditOutcome { substituted, armed }
    }

    /// Append typed text at the end of the buffer, separated by one space.
    pub fn append(&mut self, chunk: &str) -> EditOutcome {
        let mut text = self.buffer.clone();
        if !text.is_empty() && !text.ends_with(char::is_whitespace) && !chunk.is_empty() {
            text.push(' ');
        }
        text.push_str(chunk);
        let end = text.chars().count();
        self.edit(text, end)
    }

    /// Run a due voice trigger.
    ///
    /// The trigger word is stripped from the buffer. A clear empties it; a
    /// send leaves the stripped text for the caller to submit with
    /// [`begin_send`](Self::begin_send).
    pub fn poll(&mut self) -> Option<TriggerAction> {
        let fired = self.trigger.poll(&self.buffer, self.clock.now())?;
        match fired.action {
            TriggerAction::Send => {
                self.set_buffer(fired.text);
            }
            TriggerAction::Clear => self.clear(),
        }
        Some(fired.action)
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.set_buffer(String::new());
    }

    /// Show the previous history entry. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        let Some(text) = self.history.back(&self.buffer).map(str::to_string) else {
            return false;
        };
        self.set_buffer(text);
        true
    }

    /// Show the next history entry or the draft. Returns `false` on the draft.
    pub fn forward(&mut self) -> bool {
        let Some(text) = self.history.forward().map(str::to_string) else {
            return false;
        };
        self.set_buffer(text);
        true
    }

    /// Take the buffer for submission.
    ///
    /// Returns `None` for an empty buffer or while another send is in flight;
    /// a second send is rejected, never queued.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.in_flight.is_some() {
            tracing::debug!("Send rejected, request already in flight");
            return None;
        }
        if self.buffer.is_empty() {
            return None;
        }
        self.in_flight = Some(self.buffer.clone());
        self.in_flight.clone()
    }

    /// Complete the in-flight send. On delivery the text is recorded in
    /// history and the buffer cleared; on failure the buffer is kept.
    pub fn finish_send(&mut self, delivered: bool) {
        let Some(text) = self.in_flight.take() else {
            return;
        };
        if delivered {
            self.history.record_sent(text);
            self.set_buffer(String::new());
        }
    }

    /// Programmatic buffer change: cancels any pending trigger without re-arming.
    fn set_buffer(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.buffer = text;
        self.trigger.cancel();
    }
}
