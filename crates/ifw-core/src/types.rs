//! Shared domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IfwError;

/// Injection backend selector as written in a profile (`"type"` or `"clipboard"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Simulated keystrokes.
    #[default]
    Type,
    /// Clipboard write, optionally followed by a paste keystroke.
    Clipboard,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Type => write!(f, "type"),
            MethodKind::Clipboard => write!(f, "clipboard"),
        }
    }
}

impl FromStr for MethodKind {
    type Err = IfwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type" => Ok(MethodKind::Type),
            "clipboard" => Ok(MethodKind::Clipboard),
            other => Err(IfwError::Config(format!(
                "unknown injection method '{}', expected 'type' or 'clipboard'",
                other
            ))),
        }
    }
}

/// Resolved injection method. Each case carries its own parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectionMethod {
    /// Type the text with simulated keystrokes.
    Type,
    /// Write the text to the clipboard; paste it when `auto_paste` is set.
    Clipboard { auto_paste: bool },
}

impl InjectionMethod {
    /// Build the method from a profile selector; `auto_paste` only matters for the clipboard.
    pub fn from_kind(kind: MethodKind, auto_paste: bool) -> Self {
        match kind {
            MethodKind::Type => InjectionMethod::Type,
            MethodKind::Clipboard => InjectionMethod::Clipboard { auto_paste },
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            InjectionMethod::Type => MethodKind::Type,
            InjectionMethod::Clipboard { .. } => MethodKind::Clipboard,
        }
    }
}

impl fmt::Display for InjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionMethod::Type => write!(f, "type"),
            InjectionMethod::Clipboard { auto_paste: true } => write!(f, "clipboard+paste"),
            InjectionMethod::Clipboard { auto_paste: false } => write!(f, "clipboard"),
        }
    }
}

/// Action performed when a voice-trigger word fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerAction {
    /// Submit the buffer.
    Send,
    /// Empty the buffer.
    Clear,
}

impl fmt::Display for TriggerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerAction::Send => write!(f, "send"),
            TriggerAction::Clear => write!(f, "clear"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_kind_serialization() {
        assert_eq!(serde_json::to_string(&MethodKind::Clipboard).unwrap(), "\"clipboard\"");
        let kind: MethodKind = serde_json::from_str("\"type\"").unwrap();
        assert_eq!(kind, MethodKind::Type);
    }

    #[test]
    fn test_method_kind_from_str() {
        assert_eq!("Clipboard".parse::<MethodKind>().unwrap(), MethodKind::Clipboard);
        assert_eq!(" type ".parse::<MethodKind>().unwrap(), MethodKind::Type);
        let err = "paste".parse::<MethodKind>().unwrap_err();
        assert!(err.to_string().contains("paste"));
    }

    #[test]
    fn test_injection_method_from_kind() {
        assert_eq!(InjectionMethod::from_kind(MethodKind::Type, true), InjectionMethod::Type);
        assert_eq!(
            InjectionMethod::from_kind(MethodKind::Clipboard, true),
            InjectionMethod::Clipboard { auto_paste: true }
        );
        assert_eq!(
            InjectionMethod::Clipboard { auto_paste: false }.kind(),
            MethodKind::Clipboard
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(InjectionMethod::Type.to_string(), "type");
        assert_eq!(
            InjectionMethod::Clipboard { auto_paste: true }.to_string(),
            "clipboard+paste"
        );
        assert_eq!(TriggerAction::Send.to_string(), "send");
        assert_eq!(TriggerAction::Clear.to_string(), "clear");
    }
}
