//! The editing page served at `GET /`.
//!
//! The HTML is embedded at compile time via `include_str!`. Profile settings
//! the page needs are serialised into a `<script type="application/json">`
//! block; the token is never part of it.

use ifw_core::config::{Profile, VoiceSendConfig};
use serde::{Deserialize, Serialize};

/// Page template. `{{PAGE_CONFIG}}` is replaced with the serialised config.
pub const INDEX_HTML: &str = include_str!("../assets/index.html");

const CONFIG_PLACEHOLDER: &str = "{{PAGE_CONFIG}}";

/// Client-side settings embedded in the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// `(phrase, replacement)` pairs in declaration order.
    pub substitutions: Vec<(String, String)>,
    pub voice_send: VoiceSendConfig,
    /// Cache the URL token in the browser and accept a bare bookmark URL.
    pub permanent_link: bool,
}

impl PageConfig {
    pub fn from_profile(profile: &Profile, permanent_link: bool) -> Self {
        Self {
            substitutions: profile.substitutions.entries().to_vec(),
            voice_send: profile.voice_send.clone(),
            permanent_link,
        }
    }

    /// JSON safe to place inside a `<script>` element.
    pub fn to_script_json(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json.replace('<', "\\u003c"))
    }

    /// The full page with this config embedded.
    pub fn render(&self) -> serde_json::Result<String> {
        Ok(INDEX_HTML.replacen(CONFIG_PLACEHOLDER, &self.to_script_json()?, 1))
    }
}
