//! Shared building blocks for input-from-web: the error taxonomy, the
//! injection method and trigger action types, and profile configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigFile, ConfigStore, MemoryStore, Profile, ProfileStore, SubstitutionTable, VoiceSendConfig};
pub use error::{IfwError, Result};
pub use types::*;
