//! Open the interface in the desktop browser.

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

/// Delay so the listener is accepting before the browser connects.
const LAUNCH_DELAY: Duration = Duration::from_millis(500);

/// Spawn a background task that opens `url` with the platform opener.
/// Failures are logged; the server keeps running either way.
pub fn open_browser(url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(LAUNCH_DELAY).await;
        let mut command = opener_command(&url);
        match command.spawn() {
            Ok(_) => debug!("Opened {} in the browser", url),
            Err(e) => warn!("Could not open a browser for {}: {}", url, e),
        }
    });
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    if std::env::var_os("DISPLAY").is_none() {
        command.env("DISPLAY", ":0");
    }
    command
}
