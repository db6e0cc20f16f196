//! Voice-trigger debouncer.
//!
//! A debounced action moves through two states:
//! - Idle -> Pending (the last word of the buffer is a trigger word)
//! - Pending -> Idle (any buffer change, or the deadline passes and the action fires)
//!
//! Deadlines are monotonic instants; callers pass `now` in, so the state
//! machine never reads a clock itself.

use std::fmt;
use std::time::Instant;

use ifw_core::config::VoiceSendConfig;
use ifw_core::types::TriggerAction;

/// The single outstanding debounced action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrigger {
    pub deadline: Instant,
    /// Lowercase trigger word to strip when the action fires.
    pub word: String,
    pub action: TriggerAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Idle,
    Pending(PendingTrigger),
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerState::Idle => write!(f, "Idle"),
            TriggerState::Pending(p) => write!(f, "Pending({} on '{}')", p.action, p.word),
        }
    }
}

/// Result of a trigger firing: the action and the buffer with the word removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    pub action: TriggerAction,
    pub text: String,
}

/// Per-session debouncer for voice-trigger words.
#[derive(Debug, Clone)]
pub struct VoiceTrigger {
    config: VoiceSendConfig,
    state: TriggerState,
}

impl VoiceTrigger {
    pub fn new(config: VoiceSendConfig) -> Self {
        Self {
            config,
            state: TriggerState::Idle,
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingTrigger> {
        match &self.state {
            TriggerState::Pending(p) => Some(p),
            TriggerState::Idle => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending().map(|p| p.deadline)
    }

    /// Drop any pending action. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            TriggerState::Pending(p) => {
                tracing::debug!(action = %p.action, "Voice trigger cancelled");
                true
            }
            TriggerState::Idle => false,
        }
    }

    /// React to a buffer change.
    ///
    /// The pending action (if any) is always cancelled first; a trigger word
    /// at the end of `buffer` then arms a fresh one.
    pub fn on_edit(&mut self, buffer: &str, now: Instant) -> Option<&PendingTrigger> {
        self.cancel();
        if !self.config.enabled {
            return None;
        }
        let word = trailing_word(buffer)?;
        let action = self.config.action_for(&word)?;
        let Some(deadline) = now.checked_add(self.config.delay()) else {
            tracing::warn!(delay_secs = self.config.delay_seconds, "Voice trigger delay out of range, not arming");
            return None;
        };
        tracing::debug!(action = %action, delay_secs = self.config.delay_seconds, "Voice trigger armed");
        self.state = TriggerState::Pending(PendingTrigger {
            deadline,
            word,
            action,
        });
        self.pending()
    }

    /// Fire the pending action once its deadline has passed.
    ///
    /// Returns `None` while idle or before the deadline. If the buffer no
    /// longer ends with the trigger word the action is dropped.
    pub fn poll(&mut self, buffer: &str, now: Instant) -> Option<Fired> {
        let due = self.pending().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        let TriggerState::Pending(pending) = std::mem::take(&mut self.state) else {
            return None;
        };
        match strip_trailing_word(buffer, &pending.word) {
            Some(text) => {
                tracing::debug!(action = %pending.action, "Voice trigger fired");
                Some(Fired {
                    action: pending.action,
                    text,
                })
            }
            None => {
                tracing::debug!(action = %pending.action, "Voice trigger dropped, word no longer last");
                None
            }
        }
    }
}

/// Last whitespace-separated token of `buffer`, lowercased.
pub fn trailing_word(buffer: &str) -> Option<String> {
    buffer
        .split_whitespace()
        .next_back()
        .map(|w| w.to_lowercase())
}

/// Remove the trailing `word` (case-insensitive) and the whitespace around it.
///
/// Returns `None` if `buffer` does not end with `word` as a whole token.
pub fn strip_trailing_word(buffer: &str, word: &str) -> Option<String> {
    let trimmed = buffer.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    if trimmed[start..].to_lowercase() != word {
        return None;
    }
    Some(trimmed[..start].trim_end().to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> VoiceSendConfig {
        VoiceSendConfig {
            enabled: true,
            delay_seconds: 1.5,
            send_words: vec!["send".into()],
            clear_words: vec!["clear".into()],
        }
    }

    #[test]
    fn test_huge_delay_does_not_panic() {
        for delay_seconds in [1e300, f64::MAX, f64::INFINITY] {
            let mut vs = config();
            vs.delay_seconds = delay_seconds;
            let mut trigger = VoiceTrigger::new(vs);
            let t0 = Instant::now();
            let pending = trigger.on_edit("hello send", t0).cloned();
            if let Some(p) = pending {
                assert!(p.deadline <= t0 + Duration::from_secs(86_400));
            }
            assert!(trigger.poll("hello send", t0 + Duration::from_secs(3600)).is_none());
        }
    }

    #[test]
    fn test_trailing_word() {
        assert_eq!(trailing_word("hello Send  ").as_deref(), Some("send"));
        assert_eq!(trailing_word("one\ntwo").as_deref(), Some("two"));
        assert_eq!(trailing_word("   "), None);
        assert_eq!(trailing_word(""), None);
    }

    #[test]
    fn test_strip_trailing_word() {
        assert_eq!(strip_trailing_word("hello SEND ", "send").as_deref(), Some("hello"));
        assert_eq!(strip_trailing_word("send", "send").as_deref(), Some(""));
        assert_eq!(strip_trailing_word("a .\n send", "send").as_deref(), Some("a ."));
        assert_eq!(strip_trailing_word("resend", "send"), None);
        assert_eq!(strip_trailing_word("send it", "send"), None);
    }

    #[test]
    fn test_send_fires_after_delay() {
        let mut trigger = VoiceTrigger::new(config());
        let t0 = Instant::now();
        let armed = trigger.on_edit("hello send", t0).cloned().unwrap();
        assert_eq!(armed.action, TriggerAction::Send);
        assert_eq!(armed.deadline, t0 + Duration::from_millis(1500));

        assert_eq!(trigger.poll("hello send", t0 + Duration::from_millis(1499)), None);
        let fired = trigger
            .poll("hello send", t0 + Duration::from_millis(1500))
            .unwrap();
        assert_eq!(
            fired,
            Fired {
                action: TriggerAction::Send,
                text: "hello".into()
            }
        );
        assert_eq!(trigger.state(), &TriggerState::Idle);
        // Fires once.
        assert_eq!(trigger.poll("hello send", t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_edit_before_deadline_cancels() {
        let mut trigger = VoiceTrigger::new(config());
        let t0 = Instant::now();
        trigger.on_edit("hello send", t0);
        assert!(trigger
            .on_edit("hello sendx", t0 + Duration::from_millis(500))
            .is_none());
        assert_eq!(trigger.state(), &TriggerState::Idle);
        assert_eq!(trigger.poll("hello sendx", t0 + Duration::from_secs(3)), None);
    }

    #[test]
    fn test_rearm_is_fresh_deadline() {
        let mut trigger = VoiceTrigger::new(config());
        let t0 = Instant::now();
        trigger.on_edit("hello send", t0);
        let t1 = t0 + Duration::from_secs(1);
        let again = trigger.on_edit("hello  send", t1).cloned().unwrap();
        assert_eq!(again.deadline, t1 + Duration::from_millis(1500));
        assert_eq!(trigger.poll("hello  send", t0 + Duration::from_millis(1600)), None);
        assert!(trigger.poll("hello  send", t1 + Duration::from_millis(1500)).is_some());
    }

    #[test]
    fn test_clear_word_and_send_priority() {
        let mut vs = config();
        vs.clear_words.push("send".into());
        let mut trigger = VoiceTrigger::new(vs);
        let t0 = Instant::now();
        assert_eq!(trigger.on_edit("x send", t0).unwrap().action, TriggerAction::Send);
        assert_eq!(trigger.on_edit("x clear", t0).unwrap().action, TriggerAction::Clear);
        let fired = trigger.poll("x clear", t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(fired.action, TriggerAction::Clear);
        assert_eq!(fired.text, "x");
    }

    #[test]
    fn test_disabled_never_arms() {
        let mut vs = config();
        vs.enabled = false;
        let mut trigger = VoiceTrigger::new(vs);
        assert!(trigger.on_edit("hello send", Instant::now()).is_none());
        assert_eq!(trigger.deadline(), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let mut vs = config();
        vs.delay_seconds = 0.0;
        let mut trigger = VoiceTrigger::new(vs);
        let t0 = Instant::now();
        trigger.on_edit("go send", t0);
        assert_eq!(trigger.poll("go send", t0).unwrap().text, "go");
    }

    #[test]
    fn test_changed_buffer_drops_action() {
        let mut trigger = VoiceTrigger::new(config());
        let t0 = Instant::now();
        trigger.on_edit("hello send", t0);
        assert_eq!(trigger.poll("something else", t0 + Duration::from_secs(2)), None);
        assert_eq!(trigger.state(), &TriggerState::Idle);
    }

    #[test]
    fn test_cancel_reports_pending() {
        let mut trigger = VoiceTrigger::new(config());
        assert!(!trigger.cancel());
        trigger.on_edit("send", Instant::now());
        assert!(trigger.cancel());
        assert!(!trigger.cancel());
    }

    #[test]
    fn test_state_display() {
        let mut trigger = VoiceTrigger::new(config());
        assert_eq!(trigger.state().to_string(), "Idle");
        trigger.on_edit("send", Instant::now());
        assert_eq!(trigger.state().to_string(), "Pending(send on 'send')");
    }
}
