//! input-from-web binary - composition root.
//!
//! 1. Parse the CLI and install tracing
//! 2. Load (or create) the configuration file and select a profile
//! 3. Either run the terminal compose client, or:
//! 4. Establish the token, build the dispatcher and serve the page and `/send`

mod cli;
mod compose;
mod startup;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ifw_api::{AppState, PageConfig, TokenAuthority};
use ifw_core::config::{ConfigFile, ConfigStore, Profile};
use ifw_core::error::IfwError;
use ifw_core::types::InjectionMethod;
use ifw_inject::{CommandBackend, Dispatcher};

use crate::cli::{CliArgs, Command};

fn init_tracing(level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.unwrap_or("info"))),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn serve(
    args: &CliArgs,
    config_path: PathBuf,
    config: ConfigFile,
    profile_name: String,
    profile: Profile,
) -> Result<(), IfwError> {
    let method = InjectionMethod::from_kind(args.resolve_method(profile.method), profile.auto_paste);
    let port = args.resolve_port(profile.port);
    let host = match args.resolve_host() {
        Some(h) => h
            .parse::<IpAddr>()
            .map_err(|e| IfwError::Config(format!("invalid --host '{}': {}", h, e)))?,
        None => startup::lan_ip(),
    };
    let addr = SocketAddr::new(host, port);

    let mut store = ConfigStore::new(config_path, config, profile_name.clone());
    let authority = TokenAuthority::establish(profile.use_security_token, args.link_mode(), &mut store)?;
    if !authority.enforced() {
        eprintln!("{}", startup::insecure_banner());
    }

    let base = startup::base_url(addr);
    println!("input-from-web v{}", env!("CARGO_PKG_VERSION"));
    println!("  Profile: {}", profile_name);
    println!("  Method:  {}", method);
    for link in startup::startup_links(&base, &authority) {
        println!("  {}: {}", link.label, link.url);
    }

    let page = PageConfig::from_profile(&profile, authority.link().is_permanent());
    let dispatcher = Dispatcher::new(Arc::new(CommandBackend::new()));
    let state = AppState::new(authority, dispatcher, method, page)?;

    tracing::info!(profile = %profile_name, %method, %addr, "Starting server");
    ifw_api::start_server(addr, state, shutdown_signal()).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    init_tracing(args.resolve_log_level().as_deref());

    let config_path = args.resolve_config_path();
    let config = ConfigFile::load_or_create(&config_path)?;
    tracing::info!(path = %config_path.display(), "Configuration loaded");

    let profile_selector = args.resolve_profile();
    let (profile_name, profile) = config.profile(profile_selector.as_deref())?;

    match &args.command {
        Some(Command::Compose(compose_args)) => compose::run(compose_args, &profile).await?,
        None => serve(&args, config_path, config, profile_name, profile).await?,
    }
    Ok(())
}
