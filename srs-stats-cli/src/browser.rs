//! Opening the export page in the user's browser

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Where jpdb serves the review export
pub const EXPORT_URL: &str = "https://jpdb.io/export/reviews.json";

fn launcher(url: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Hand `url` to the platform's default browser without waiting for it
pub fn open_url(url: &str) -> Result<()> {
    log::info!("Opening {} in the default browser", url);
    launcher(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch a browser for {}", url))?;
    Ok(())
}
