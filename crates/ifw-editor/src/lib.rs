//! Client-side editing pipeline for input-from-web.
//!
//! Every edit of the draft buffer runs through the same steps:
//! substitution -> voice-trigger check -> (after the delay) send or clear.
//! Sent messages land in an append-only history that can be browsed without
//! losing the unsent draft.

pub mod clock;
pub mod history;
pub mod session;
pub mod substitution;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::HistoryLog;
pub use session::{DraftSession, EditOutcome};
pub use substitution::SubstitutionEngine;
pub use trigger::{Fired, PendingTrigger, TriggerState, VoiceTrigger};
