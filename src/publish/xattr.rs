//! Records a file's source URL in an extended attribute.
//!
//! Uses the platform tools (`setfattr` on Linux, `xattr` on macOS) so no
//! native bindings are needed. Tagging is best effort: failures are logged
//! and never abort a download.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(target_os = "macos")]
fn tag_command(path: &Path, url: &str) -> Command {
    let mut cmd = Command::new("xattr");
    cmd.arg("-w")
        .arg("com.apple.metadata:kMDItemWhereFroms")
        .arg(url)
        .arg(path);
    cmd
}

#[cfg(not(target_os = "macos"))]
fn tag_command(path: &Path, url: &str) -> Command {
    let mut cmd = Command::new("setfattr");
    cmd.arg("-n").arg("user.url").arg("-v").arg(url).arg(path);
    cmd
}

pub async fn tag_source_url(path: &Path, url: &str) {
    match tag_command(path, url).output().await {
        Ok(output) if output.status.success() => {
            debug!(path = %path.display(), url, "Tagged source url");
        }
        Ok(output) => {
            warn!(
                path = %path.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Failed to set extended attribute"
            );
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Extended attribute tool unavailable");
        }
    }
}
