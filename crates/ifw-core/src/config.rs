use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::error::{IfwError, Result};
use crate::types::{InjectionMethod, MethodKind, TriggerAction};

/// Default TCP port for the web server.
pub const DEFAULT_PORT: u16 = 5123;

/// Default voice-trigger delay in seconds.
pub const DEFAULT_DELAY_SECONDS: f64 = 1.5;

/// Longest accepted voice-trigger delay (one day).
pub const MAX_DELAY_SECONDS: f64 = 86_400.0;

/// Name of the profile created in a fresh configuration file.
pub const DEFAULT_PROFILE: &str = "default";

/// Top-level configuration file.
///
/// Loaded from `~/.input-from-web/config.toml` by default. Holds any number of
/// named profiles; `default_profile` picks one when none is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_profile_name")]
    pub default_profile: String,
    #[serde(default, with = "ordered_map")]
    pub profiles: Vec<(String, Profile)>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            default_profile: DEFAULT_PROFILE.to_string(),
            profiles: vec![(DEFAULT_PROFILE.to_string(), Profile::default())],
        }
    }
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| IfwError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, writing the default file first when none exists.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.save(path)?;
        info!("Created default config: {}", path.display());
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Save with owner-only permissions. The file is never readable by
    /// others, not even between the write and a later `chmod`.
    pub fn save_private(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        write_private(path, content.as_bytes())?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Names of all profiles, in file order.
    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Resolve a profile by name, or the `default_profile` when `name` is `None`.
    ///
    /// The returned profile is validated and normalised.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile)> {
        let name = name.unwrap_or(&self.default_profile);
        let profile = self
            .profiles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| {
                IfwError::Config(format!(
                    "profile '{}' not found (available profiles: {})",
                    name,
                    self.profile_names().join(", ")
                ))
            })?;
        let profile = profile.normalized()?;
        Ok((name.to_string(), profile))
    }

    fn profile_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_true() -> bool {
    true
}

fn default_delay() -> f64 {
    DEFAULT_DELAY_SECONDS
}

/// A named configuration bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Injection backend: `type` (simulated keystrokes) or `clipboard`.
    #[serde(default)]
    pub method: MethodKind,
    /// Paste after the clipboard write. Ignored for `type`.
    #[serde(default)]
    pub auto_paste: bool,
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Require the shared secret on requests.
    #[serde(default = "default_true")]
    pub use_security_token: bool,
    /// Persisted token for permanent-link mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_token: Option<String>,
    #[serde(default)]
    pub voice_send: VoiceSendConfig,
    #[serde(default)]
    pub substitutions: SubstitutionTable,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            method: MethodKind::Type,
            auto_paste: false,
            port: DEFAULT_PORT,
            use_security_token: true,
            permanent_token: None,
            voice_send: VoiceSendConfig::dictation_defaults(),
            substitutions: SubstitutionTable::dictation_defaults(),
        }
    }
}

impl Profile {
    /// The resolved injection method, with `auto_paste` attached to the clipboard case.
    pub fn injection_method(&self) -> InjectionMethod {
        InjectionMethod::from_kind(self.method, self.auto_paste)
    }

    /// Validate field ranges and lowercase the trigger words.
    pub fn normalized(mut self) -> Result<Self> {
        if self.port == 0 {
            return Err(IfwError::Config("port must be between 1 and 65535".into()));
        }
        let delay = self.voice_send.delay_seconds;
        if !delay.is_finite() || !(0.0..=MAX_DELAY_SECONDS).contains(&delay) {
            return Err(IfwError::Config(format!(
                "voice_send.delay_seconds must be between 0 and {}, got {}",
                MAX_DELAY_SECONDS, delay
            )));
        }
        self.voice_send.send_words = normalize_words(&self.voice_send.send_words);
        self.voice_send.clear_words = normalize_words(&self.voice_send.clear_words);
        if self
            .permanent_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            self.permanent_token = None;
        }
        Ok(self)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    // `mode` only applies on creation; tighten an existing file first.
    if path.exists() {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

fn normalize_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Voice command settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSendConfig {
    /// Toggle voice command detection.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds without edits before a trigger word fires.
    #[serde(default = "default_delay")]
    pub delay_seconds: f64,
    /// Words that send the buffer when typed last.
    #[serde(default)]
    pub send_words: Vec<String>,
    /// Words that clear the buffer when typed last.
    #[serde(default)]
    pub clear_words: Vec<String>,
}

impl Default for VoiceSendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            send_words: Vec::new(),
            clear_words: Vec::new(),
        }
    }
}

impl VoiceSendConfig {
    /// Enabled with `send` / `clear` as trigger words.
    pub fn dictation_defaults() -> Self {
        Self {
            enabled: true,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            send_words: vec!["send".to_string()],
            clear_words: vec!["clear".to_string()],
        }
    }

    /// Action bound to a lowercase word. Send words are checked before clear words.
    pub fn action_for(&self, word: &str) -> Option<TriggerAction> {
        if self.send_words.iter().any(|w| w == word) {
            Some(TriggerAction::Send)
        } else if self.clear_words.iter().any(|w| w == word) {
            Some(TriggerAction::Clear)
        } else {
            None
        }
    }

    /// The delay as a `Duration`, clamped to `[0, MAX_DELAY_SECONDS]`.
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(self.delay_seconds.clamp(0.0, MAX_DELAY_SECONDS))
            .unwrap_or(std::time::Duration::ZERO)
    }
}

/// Phrase → replacement table for dictation.
///
/// Phrases are stored lowercase in declaration order; empty phrases are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new<I, P, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: Into<String>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(phrase, replacement)| {
                let phrase = phrase.as_ref().trim().to_lowercase();
                (!phrase.is_empty()).then(|| (phrase, replacement.into()))
            })
            .collect();
        Self { entries }
    }

    /// Punctuation and line-break phrases for spoken dictation.
    pub fn dictation_defaults() -> Self {
        Self::new([
            ("full stop", "."),
            ("question mark", "?"),
            ("exclamation mark", "!"),
            ("comma", ","),
            ("colon", ":"),
            ("semicolon", ";"),
            ("quote", "\""),
            ("new line", "\n"),
            ("new paragraph", "\n\n"),
        ])
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Entries ordered for matching: longest phrase first, ties in declaration order.
    pub fn by_priority(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(p, r)| (p.as_str(), r.as_str()))
            .collect();
        ordered.sort_by_key(|(phrase, _)| std::cmp::Reverse(phrase.chars().count()));
        ordered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SubstitutionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ordered_map::serialize(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for SubstitutionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries: Vec<(String, String)> = ordered_map::deserialize(deserializer)?;
        Ok(Self::new(entries))
    }
}

/// (De)serialize `Vec<(String, T)>` as a map, keeping document order.
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
            type Value = Vec<(String, T)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Write-back target for the permanent token.
///
/// The configuration is otherwise read-only for the process lifetime.
pub trait ProfileStore {
    /// Token previously persisted for the active profile.
    fn stored_token(&self) -> Option<String>;

    /// Persist `token` as the active profile's permanent token.
    fn persist_token(&mut self, token: &str) -> Result<()>;
}

/// `ProfileStore` backed by the configuration file on disk.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: ConfigFile,
    profile_name: String,
}

impl ConfigStore {
    pub fn new(path: PathBuf, config: ConfigFile, profile_name: String) -> Self {
        Self {
            path,
            config,
            profile_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for ConfigStore {
    fn stored_token(&self) -> Option<String> {
        self.config
            .profiles
            .iter()
            .find(|(n, _)| *n == self.profile_name)
            .and_then(|(_, p)| p.permanent_token.clone())
            .filter(|t| !t.trim().is_empty())
    }

    fn persist_token(&mut self, token: &str) -> Result<()> {
        let profile = self.config.profile_mut(&self.profile_name).ok_or_else(|| {
            IfwError::Config(format!("profile '{}' not found", self.profile_name))
        })?;
        profile.permanent_token = Some(token.to_string());
        // The file now holds a secret.
        self.config.save_private(&self.path)
    }
}

/// In-memory `ProfileStore`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub token: Option<String>,
    /// Number of `persist_token` calls.
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            writes: 0,
        }
    }
}

impl ProfileStore for MemoryStore {
    fn stored_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn persist_token(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        self.writes += 1;
        Ok(())
    }
}
