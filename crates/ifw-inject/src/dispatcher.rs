//! Injection dispatcher.

use std::sync::Arc;
use std::time::Duration;

use ifw_core::types::InjectionMethod;
use tokio::sync::Mutex;

use crate::backend::InjectionBackend;
use crate::error::DispatchError;

/// Upper bounds for each backend step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTimeouts {
    pub typing: Duration,
    pub clipboard: Duration,
    pub paste: Duration,
    /// Pause between the clipboard write and the paste keystroke.
    pub settle: Duration,
}

impl Default for DispatchTimeouts {
    fn default() -> Self {
        Self {
            typing: Duration::from_secs(30),
            clipboard: Duration::from_secs(5),
            paste: Duration::from_secs(5),
            settle: Duration::from_millis(100),
        }
    }
}

/// Routes validated text to the backend for the configured method.
///
/// One injection runs at a time per dispatcher; concurrent callers wait on
/// the gate in arrival order.
pub struct Dispatcher {
    backend: Arc<dyn InjectionBackend>,
    timeouts: DispatchTimeouts,
    gate: Mutex<()>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn InjectionBackend>) -> Self {
        Self::with_timeouts(backend, DispatchTimeouts::default())
    }

    pub fn with_timeouts(backend: Arc<dyn InjectionBackend>, timeouts: DispatchTimeouts) -> Self {
        Self {
            backend,
            timeouts,
            gate: Mutex::new(()),
        }
    }

    pub fn timeouts(&self) -> &DispatchTimeouts {
        &self.timeouts
    }

    /// Inject `text` into the focused input.
    ///
    /// Empty text is rejected before any backend call. A failed step aborts
    /// the rest; nothing is retried.
    pub async fn inject(&self, text: &str, method: InjectionMethod) -> Result<(), DispatchError> {
        if text.is_empty() {
            return Err(DispatchError::Empty);
        }

        let _guard = self.gate.lock().await;
        tracing::info!(method = %method, chars = text.chars().count(), "Injecting text");

        match method {
            InjectionMethod::Type => {
                self.backend.type_text(text, self.timeouts.typing).await?;
            }
            InjectionMethod::Clipboard { auto_paste } => {
                self.backend
                    .copy_to_clipboard(text, self.timeouts.clipboard)
                    .await?;
                if auto_paste {
                    tokio::time::sleep(self.timeouts.settle).await;
                    self.backend.paste(self.timeouts.paste).await?;
                }
            }
        }

        tracing::debug!(method = %method, "Injection complete");
        Ok(())
    }
}
