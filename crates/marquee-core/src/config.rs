//! Controller configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and policy knobs for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Forced exit from loading if the embed stays silent (ms)
    pub liveness_timeout_ms: u64,
    /// Idle window before on-screen controls hide (ms)
    pub controls_hide_delay_ms: u64,
    /// Delay between play-start and the desktop unmute attempt (ms)
    pub unmute_delay_ms: u64,
    /// Touch points above this on a desktop-class platform mean a tablet
    pub tablet_touch_threshold: u32,
    /// Retry a rejected unmuted play once with forced mute
    pub muted_retry: bool,
    /// Quality requested on desktop; highest reported when unset
    pub preferred_quality: Option<String>,
    /// Localization tag for embeds and catalog calls
    pub language: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            liveness_timeout_ms: 3_000,
            controls_hide_delay_ms: 3_000,
            unmute_delay_ms: 1_500,
            tablet_touch_threshold: 1,
            muted_retry: true,
            preferred_quality: None,
            language: "en-US".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Parse from JSON, missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.liveness_timeout_ms == 0 {
            return Err(Error::InvalidConfig("liveness_timeout_ms must be non-zero".into()));
        }
        if self.controls_hide_delay_ms == 0 {
            return Err(Error::InvalidConfig("controls_hide_delay_ms must be non-zero".into()));
        }
        if self.language.trim().is_empty() {
            return Err(Error::InvalidConfig("language must not be empty".into()));
        }
        Ok(())
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn unmute_delay(&self) -> Duration {
        Duration::from_millis(self.unmute_delay_ms)
    }

    /// Primary language subtag ("en-US" -> "en")
    pub fn language_code(&self) -> &str {
        self.language.split(['-', '_']).next().unwrap_or(&self.language)
    }
}
