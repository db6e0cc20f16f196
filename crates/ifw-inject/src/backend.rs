//! Injection backends.
//!
//! `CommandBackend` drives the Wayland tools (`ydotool`, `wl-copy`) as child
//! processes; `RecordingBackend` records calls for tests and dry runs.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::InjectionError;

/// An OS-level way of delivering text to the focused input.
#[async_trait]
pub trait InjectionBackend: Send + Sync {
    /// Type `text` with simulated keystrokes.
    async fn type_text(&self, text: &str, timeout: Duration) -> Result<(), InjectionError>;

    /// Put `text` on the system clipboard.
    async fn copy_to_clipboard(&self, text: &str, timeout: Duration) -> Result<(), InjectionError>;

    /// Send the paste shortcut to the focused window.
    async fn paste(&self, timeout: Duration) -> Result<(), InjectionError>;
}

/// Backend that runs `ydotool` and `wl-copy`.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    typer: String,
    clipboard: String,
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBackend {
    pub fn new() -> Self {
        Self::with_programs("ydotool", "wl-copy")
    }

    /// Use other executables with the same command-line interface.
    pub fn with_programs(typer: impl Into<String>, clipboard: impl Into<String>) -> Self {
        Self {
            typer: typer.into(),
            clipboard: clipboard.into(),
        }
    }
}

#[async_trait]
impl InjectionBackend for CommandBackend {
    async fn type_text(&self, text: &str, timeout: Duration) -> Result<(), InjectionError> {
        run_program(
            &self.typer,
            &["type", "--key-delay", "0", "--", text],
            timeout,
            Output::Inherit,
        )
        .await
    }

    async fn copy_to_clipboard(&self, text: &str, timeout: Duration) -> Result<(), InjectionError> {
        // wl-copy leaves a child serving the selection; it must not hold our pipes.
        run_program(&self.clipboard, &["-o", "--", text], timeout, Output::Discard).await
    }

    async fn paste(&self, timeout: Duration) -> Result<(), InjectionError> {
        run_program(
            &self.typer,
            &["key", "--delay", "100", "ctrl+v"],
            timeout,
            Output::Inherit,
        )
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum Output {
    Inherit,
    Discard,
}

/// Run `program` to completion, killing it if it outlives `timeout`.
async fn run_program(
    program: &str,
    args: &[&str],
    timeout: Duration,
    output: Output,
) -> Result<(), InjectionError> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
    if let Output::Discard = output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    tracing::debug!(program, "spawning injection command");

    let mut child = cmd.spawn().map_err(|source| InjectionError::Spawn {
        program: program.to_string(),
        source,
    })?;

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(InjectionError::Failed {
            program: program.to_string(),
            status: status.to_string(),
        }),
        Ok(Err(source)) => Err(InjectionError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(program, timeout_ms = timeout.as_millis() as u64, "injection command timed out");
            let _ = child.start_kill();
            Err(InjectionError::Timeout {
                program: program.to_string(),
                timeout,
            })
        }
    }
}

/// A backend call as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Type(String),
    Copy(String),
    Paste,
}

/// Backend that records every call and optionally fails one kind of call.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    fail_on: Option<fn(&BackendCall) -> bool>,
}

impl std::fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("calls", &self.calls())
            .field("failing", &self.fail_on.is_some())
            .finish()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call matching `predicate` with an exit-status error.
    pub fn failing(predicate: fn(&BackendCall) -> bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(predicate),
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, call: BackendCall) -> Result<(), InjectionError> {
        let fails = self.fail_on.is_some_and(|f| f(&call));
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if fails {
            Err(InjectionError::Failed {
                program: "recording-backend".to_string(),
                status: "exit status: 1".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InjectionBackend for RecordingBackend {
    async fn type_text(&self, text: &str, _timeout: Duration) -> Result<(), InjectionError> {
        self.record(BackendCall::Type(text.to_string()))
    }

    async fn copy_to_clipboard(&self, text: &str, _timeout: Duration) -> Result<(), InjectionError> {
        self.record(BackendCall::Copy(text.to_string()))
    }

    async fn paste(&self, _timeout: Duration) -> Result<(), InjectionError> {
        self.record(BackendCall::Paste)
    }
}
