//! Text injection into the focused desktop input.
//!
//! The [`Dispatcher`] validates a payload and delegates to an
//! [`InjectionBackend`]: simulated typing, or a clipboard write with an
//! optional paste keystroke. Backend calls are bounded by timeouts and never
//! retried here.

pub mod backend;
pub mod dispatcher;
pub mod error;

pub use backend::{BackendCall, CommandBackend, InjectionBackend, RecordingBackend};
pub use dispatcher::{DispatchTimeouts, Dispatcher};
pub use error::{DispatchError, InjectionError};
