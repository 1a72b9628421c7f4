//! Opening URIs through the platform opener
//!
//! Every intent that maps to an OS action goes through a `UriLauncher`.
//! The production launcher shells out to the platform opener; tests
//! substitute a recording double.

use tracing::debug;

/// Boundary for handing a URI to the operating system
pub trait UriLauncher: Send {
    /// Ask the OS to open the given URI
    fn open(&self, uri: &str) -> Result<(), LaunchError>;
}

/// The URI could not be handed to the OS (opener missing, app not installed)
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct LaunchError(pub String);

/// Launcher that spawns the platform opener command
pub struct OsLauncher;

impl OsLauncher {
    fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl UriLauncher for OsLauncher {
    fn open(&self, uri: &str) -> Result<(), LaunchError> {
        debug!(%uri, "opening via platform opener");

        // tokio reaps the child once it exits; we do not wait for it
        tokio::process::Command::new(Self::opener())
            .arg(uri)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| LaunchError(e.to_string()))
    }
}
