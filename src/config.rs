//! Configuration loading and management

use std::path::PathBuf;

use anyhow::Result;

/// Default recognition locale; use "ru-RU" for Russian
const DEFAULT_LOCALE: &str = "en-US";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// BCP-47-like locale tag passed verbatim to the recognizer
    pub locale: String,

    /// Treat the microphone permission as granted until the UI reports
    /// otherwise; disable for headless testing of the denied path
    pub assume_mic_permission: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("voicehelper");

        let socket_path = data_dir.join("daemon.sock");

        let locale =
            std::env::var("VOICEHELPER_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());

        let assume_mic_permission = std::env::var("VOICEHELPER_ASSUME_MIC_PERMISSION")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            socket_path,
            data_dir,
            locale,
            assume_mic_permission,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config
            .socket_path
            .to_string_lossy()
            .contains("voicehelper"));
        assert!(!config.locale.is_empty());
    }
}
