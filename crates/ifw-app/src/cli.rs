//! CLI argument definitions.
//!
//! Priority resolution: CLI args > env vars > profile > defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ifw_api::LinkMode;
use ifw_core::types::MethodKind;

/// Type on your phone, land it in the focused desktop input.
#[derive(Parser, Debug)]
#[command(name = "input-from-web", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Profile to load from the configuration file.
    #[arg(long = "profile", global = true)]
    pub profile: Option<String>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG wins if set.
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose messages from this terminal and send them to a running server.
    Compose(ComposeArgs),
}

/// Server options. Used when no subcommand is given.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Injection method: type or clipboard.
    #[arg(short = 'm', long = "method")]
    pub method: Option<MethodKind>,

    /// Port to listen on.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Address to bind and advertise. Defaults to the LAN address.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Keep the token across restarts so a bookmarked URL keeps working.
    #[arg(long = "permanent-link")]
    pub permanent_link: bool,

    /// Replace the stored permanent token. Implies --permanent-link.
    #[arg(long = "permanent-link-refresh")]
    pub permanent_link_refresh: bool,
}

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Server base URL, e.g. http://192.168.1.20:5123
    #[arg(long = "url")]
    pub url: String,

    /// Security token printed by the server.
    #[arg(long = "token")]
    pub token: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > IFW_CONFIG env var > ~/.input-from-web/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_value("IFW_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --profile flag > IFW_PROFILE env var. `None` selects the default profile.
    pub fn resolve_profile(&self) -> Option<String> {
        self.profile.clone().or_else(|| env_value("IFW_PROFILE"))
    }

    /// Priority: --method flag > IFW_METHOD env var > profile value.
    pub fn resolve_method(&self, profile_method: MethodKind) -> MethodKind {
        if let Some(m) = self.serve.method {
            return m;
        }
        match env_value("IFW_METHOD").map(|v| v.parse::<MethodKind>()) {
            Some(Ok(m)) => m,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring IFW_METHOD");
                profile_method
            }
            None => profile_method,
        }
    }

    /// Priority: --port flag > IFW_PORT env var > profile value.
    pub fn resolve_port(&self, profile_port: u16) -> u16 {
        if let Some(p) = self.serve.port {
            return p;
        }
        env_value("IFW_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(profile_port)
    }

    /// Priority: --host flag > IFW_HOST env var. `None` means detect the LAN address.
    pub fn resolve_host(&self) -> Option<String> {
        self.serve.host.clone().or_else(|| env_value("IFW_HOST"))
    }

    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    pub fn link_mode(&self) -> LinkMode {
        if self.serve.permanent_link_refresh {
            LinkMode::Permanent { refresh: true }
        } else if self.serve.permanent_link {
            LinkMode::Permanent { refresh: false }
        } else {
            LinkMode::Ephemeral
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".input-from-web").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".input-from-web").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("input-from-web").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_serve_flags() {
        let args = parse(&[
            "--method",
            "clipboard",
            "--port",
            "8080",
            "--host",
            "10.0.0.5",
            "--profile",
            "work",
        ]);
        assert!(args.command.is_none());
        assert_eq!(args.resolve_method(MethodKind::Type), MethodKind::Clipboard);
        assert_eq!(args.resolve_port(5123), 8080);
        assert_eq!(args.resolve_host().as_deref(), Some("10.0.0.5"));
        assert_eq!(args.resolve_profile().as_deref(), Some("work"));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let result = CliArgs::try_parse_from(["input-from-web", "--method", "telepathy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_link_mode() {
        assert_eq!(parse(&[]).link_mode(), LinkMode::Ephemeral);
        assert_eq!(
            parse(&["--permanent-link"]).link_mode(),
            LinkMode::Permanent { refresh: false }
        );
        // Refresh implies permanent.
        assert_eq!(
            parse(&["--permanent-link-refresh"]).link_mode(),
            LinkMode::Permanent { refresh: true }
        );
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args = parse(&["--config", "/tmp/ifw.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/ifw.toml"));
    }

    #[test]
    fn test_compose_subcommand() {
        let args = parse(&[
            "compose",
            "--url",
            "http://127.0.0.1:5123",
            "--token",
            "abc",
            "--profile",
            "phone",
        ]);
        match args.command {
            Some(Command::Compose(c)) => {
                assert_eq!(c.url, "http://127.0.0.1:5123");
                assert_eq!(c.token.as_deref(), Some("abc"));
            }
            other => panic!("Expected compose, got {:?}", other),
        }
        assert_eq!(args.profile.as_deref(), Some("phone"));
    }

    #[test]
    fn test_compose_requires_url() {
        assert!(CliArgs::try_parse_from(["input-from-web", "compose"]).is_err());
    }
}
