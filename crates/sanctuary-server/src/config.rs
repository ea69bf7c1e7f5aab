use std::net::{IpAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Configuration for the sanctuary server.
#[derive(Parser, Debug, Clone)]
#[command(name = "sanctuary")]
#[command(about = "Browse, edit and preview a local directory tree from the browser")]
pub struct Config {
    /// Host for the main interface
    #[arg(long, default_value = "127.0.0.1", env = "SANCTUARY_HOST")]
    pub host: String,

    /// Port for the main interface
    #[arg(long, default_value = "8080", env = "SANCTUARY_PORT")]
    pub port: u16,

    /// Host for the static preview server
    #[arg(long, default_value = "127.0.0.1", env = "SANCTUARY_PREVIEW_HOST")]
    pub preview_host: String,

    /// Port for the static preview server
    #[arg(long, default_value = "8081", env = "SANCTUARY_PREVIEW_PORT")]
    pub preview_port: u16,

    /// Directory to start browsing from (defaults to the current directory)
    #[arg(long, env = "SANCTUARY_ROOT")]
    pub root: Option<PathBuf>,

    /// Analyzer command line; the file path is appended as the last argument
    #[arg(long, default_value = "go vet", env = "SANCTUARY_ANALYZER")]
    pub analyzer: String,

    /// How long stopping the preview waits for open connections to drain (milliseconds)
    #[arg(long, default_value = "1000", env = "SANCTUARY_PREVIEW_GRACE_MS")]
    pub preview_grace_ms: u64,

    /// Do not open the interface in the desktop browser
    #[arg(long, env = "SANCTUARY_NO_BROWSER")]
    pub no_browser: bool,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn preview_addr(&self) -> String {
        format!("{}:{}", self.preview_host, self.preview_port)
    }

    pub fn preview_grace(&self) -> Duration {
        Duration::from_millis(self.preview_grace_ms)
    }

    /// The preview listener must never share the main interface's address.
    ///
    /// Equal ports collide when the hosts resolve to a common address or either
    /// host is a wildcard (`0.0.0.0`, `::`).
    pub fn validate(&self) -> Result<(), String> {
        if self.port != self.preview_port || self.port == 0 {
            return Ok(());
        }
        if hosts_overlap(&self.host, &self.preview_host) {
            return Err(format!(
                "preview address {} collides with the main address {}",
                self.preview_addr(),
                self.listen_addr()
            ));
        }
        Ok(())
    }
}

fn resolve_host(host: &str) -> Vec<IpAddr> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    (host, 0)
        .to_socket_addrs()
        .map(|addrs| addrs.map(|a| a.ip()).collect())
        .unwrap_or_default()
}

fn hosts_overlap(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    let a_ips = resolve_host(a);
    let b_ips = resolve_host(b);
    if a_ips.iter().chain(&b_ips).any(IpAddr::is_unspecified) {
        return true;
    }
    a_ips.iter().any(|ip| b_ips.contains(ip))
}
