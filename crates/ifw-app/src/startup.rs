//! Startup output: advertised address, URLs and the no-token banner.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use ifw_api::TokenAuthority;

/// Address other devices on the network can reach us at.
///
/// Connecting a UDP socket sends nothing; it only asks the OS which local
/// address routes outwards. Falls back to loopback if there is no route.
pub fn lan_ip() -> IpAddr {
    let detect = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    };
    match detect() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!(error = %e, "LAN address detection failed, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// `http://host:port/`, with IPv6 hosts bracketed.
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}/", addr)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupLink {
    pub label: &'static str,
    pub url: String,
}

/// URLs to print for the current token mode.
pub fn startup_links(base: &str, authority: &TokenAuthority) -> Vec<StartupLink> {
    let Some(token) = authority.token() else {
        return vec![StartupLink {
            label: "Open",
            url: base.to_string(),
        }];
    };
    let with_token = format!("{}?token={}", base, token);

    if !authority.link().is_permanent() {
        return vec![StartupLink {
            label: "Open",
            url: with_token,
        }];
    }

    if authority.first_run() {
        vec![
            StartupLink {
                label: "Setup (open once on each device)",
                url: with_token,
            },
            StartupLink {
                label: "Bookmark",
                url: base.to_string(),
            },
        ]
    } else {
        vec![
            StartupLink {
                label: "Bookmark",
                url: base.to_string(),
            },
            StartupLink {
                label: "Setup for a new device",
                url: with_token,
            },
        ]
    }
}

/// Red inverse banner on stderr shown when the token check is off.
pub fn insecure_banner() -> String {
    let line = "  WARNING: security token disabled. Anyone on this network can type into your desktop.  ";
    format!("\x1b[1;7;31m{}\x1b[0m", line)
}
