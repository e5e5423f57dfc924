//! Core types for Marquee

use serde::{Deserialize, Serialize};

/// Device class derived once from the environment at mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceClass {
    /// Mobile and tablet devices are subject to platform autoplay restrictions
    pub fn is_touch_first(&self) -> bool {
        matches!(self, DeviceClass::Mobile | DeviceClass::Tablet)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceClass {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(DeviceClass::Desktop),
            "mobile" => Ok(DeviceClass::Mobile),
            "tablet" => Ok(DeviceClass::Tablet),
            other => Err(crate::Error::InvalidConfig(format!("unknown device class '{}'", other))),
        }
    }
}

/// Environment signals read from the host at mount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Browser user-agent string
    pub user_agent: String,
    /// Maximum simultaneous touch points reported by the host
    pub max_touch_points: u32,
    /// Platform identifier (e.g. "MacIntel", "Win32", "iPhone")
    pub platform: String,
}

impl EnvironmentSignals {
    pub fn new(user_agent: impl Into<String>, max_touch_points: u32, platform: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            max_touch_points,
            platform: platform.into(),
        }
    }
}

/// How the embedded player should start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackIntent {
    pub autoplay: bool,
    pub start_muted: bool,
    pub inline_playback: bool,
    pub show_native_controls: bool,
    pub background_mode: bool,
}

impl PlaybackIntent {
    /// Deterministic intent for a device class
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => Self {
                autoplay: true,
                start_muted: false,
                inline_playback: false,
                show_native_controls: false,
                background_mode: false,
            },
            DeviceClass::Mobile | DeviceClass::Tablet => Self {
                autoplay: true,
                start_muted: true,
                inline_playback: true,
                show_native_controls: false,
                background_mode: false,
            },
        }
    }
}

/// Playback state of the negotiated embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Embed mounted, no signal yet
    Loading,
    /// Play command issued, waiting for the embed to start
    AutoplayPending,
    /// Embed reported playback
    Playing,
    /// Automatic playback refused, a user gesture is required
    PlaybackBlocked,
    /// Embed reported a fault
    Error,
}

impl PlaybackState {
    /// Check if transition to new state is valid
    pub fn can_transition_to(&self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        matches!(
            (self, next),
            (Loading, AutoplayPending)
                | (Loading, Playing)
                | (Loading, PlaybackBlocked)
                | (Loading, Error)
                | (AutoplayPending, Playing)
                | (AutoplayPending, PlaybackBlocked)
                | (AutoplayPending, Error)
                | (PlaybackBlocked, AutoplayPending)
                | (PlaybackBlocked, Playing)
                | (PlaybackBlocked, Error)
                | (Playing, Error)
        )
    }

    /// Loading indicator is shown while the embed has not settled
    pub fn is_loading(&self) -> bool {
        matches!(self, PlaybackState::Loading | PlaybackState::AutoplayPending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Error)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Loading => write!(f, "Loading"),
            PlaybackState::AutoplayPending => write!(f, "AutoplayPending"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::PlaybackBlocked => write!(f, "PlaybackBlocked"),
            PlaybackState::Error => write!(f, "Error"),
        }
    }
}

/// Hosted player the media reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedProvider {
    /// Hosted player with the full command/event control surface
    Vimeo,
    /// Trailer host used by catalog video listings
    YouTube,
    /// Plain file served next to the page
    LocalFile,
}

impl std::str::FromStr for EmbedProvider {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vimeo" => Ok(EmbedProvider::Vimeo),
            "youtube" => Ok(EmbedProvider::YouTube),
            "file" | "local" | "local_file" => Ok(EmbedProvider::LocalFile),
            other => Err(crate::Error::InvalidConfig(format!("unknown embed provider '{}'", other))),
        }
    }
}

/// Reference to a playable media item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub provider: EmbedProvider,
    /// Provider video id, or file path for local files
    pub id: String,
}

impl MediaRef {
    pub fn new(provider: EmbedProvider, id: impl Into<String>) -> Self {
        Self {
            provider,
            id: id.into(),
        }
    }

    pub fn vimeo(id: impl Into<String>) -> Self {
        Self::new(EmbedProvider::Vimeo, id)
    }

    pub fn youtube(key: impl Into<String>) -> Self {
        Self::new(EmbedProvider::YouTube, key)
    }

    pub fn local_file(path: impl Into<String>) -> Self {
        Self::new(EmbedProvider::LocalFile, path)
    }
}

/// Source string handed to the frame or video tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbedUrl(pub String);

impl EmbedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmbedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Command issued to the embedded player's control surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Set the mute flag, then play
    Play { muted: bool },
    Pause,
    SetMuted(bool),
    SetVolume(f32),
    GetQualities,
    SetQuality(String),
}

/// Signals consumed by the negotiator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Embed reported "loaded"
    Loaded,
    /// Embed reported "playing"
    Playing,
    /// Embed reported "error"
    Fault(String),
    /// A play command was rejected by the host
    PlayRejected(String),
    /// An unmute command was rejected by the host
    UnmuteRejected(String),
    /// Completion of a `GetQualities` command
    Qualities(Vec<String>),
    /// User pressed the manual play affordance
    ManualPlay,
    /// No signal, only expire due timers
    Tick,
}

/// Qualifying input for the controls overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Click,
    Touch,
    PointerMove,
}

impl std::str::FromStr for InputKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "click" => Ok(InputKind::Click),
            "touch" | "tap" | "touchstart" => Ok(InputKind::Touch),
            "move" | "pointermove" | "mousemove" | "pointer_move" => Ok(InputKind::PointerMove),
            other => Err(crate::Error::InvalidConfig(format!("unknown input kind '{}'", other))),
        }
    }
}

/// Navigation emitted when the playback view exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationAction {
    Back,
}
