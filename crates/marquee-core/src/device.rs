//! Device Classifier
//!
//! Sorts the host into desktop, mobile or tablet from injected environment
//! signals. Rules are applied in priority order:
//!
//! 1. Tablet user-agent signature, or more touch points than the threshold
//!    on a desktop-class platform (iPadOS reporting "MacIntel", convertibles)
//! 2. Mobile user-agent signature
//! 3. Desktop
//!
//! Classification happens once per playback view and is never revisited.

use crate::types::{DeviceClass, EnvironmentSignals};
use tracing::debug;

/// User-agent tokens that identify a tablet (lowercase)
const TABLET_TOKENS: &[&str] = &["ipad", "tablet", "playbook", "silk", "kindle", "kfapwi", "sm-t", "nexus 7", "nexus 10"];

/// User-agent tokens that identify a phone (lowercase)
const MOBILE_TOKENS: &[&str] = &[
    "iphone",
    "ipod",
    "android",
    "mobile",
    "blackberry",
    "bb10",
    "iemobile",
    "windows phone",
    "opera mini",
    "webos",
];

/// Platform prefixes reported by desktop-class hosts (lowercase)
const DESKTOP_PLATFORMS: &[&str] = &["mac", "win", "linux x86", "linux i686", "x11"];

/// Default touch-point threshold for the hybrid-device rule
pub const DEFAULT_TABLET_TOUCH_THRESHOLD: u32 = 1;

/// Classifier with a configurable touch-point threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceClassifier {
    tablet_touch_threshold: u32,
}

impl Default for DeviceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TABLET_TOUCH_THRESHOLD)
    }
}

impl DeviceClassifier {
    pub fn new(tablet_touch_threshold: u32) -> Self {
        Self { tablet_touch_threshold }
    }

    /// Classify the environment
    pub fn classify(&self, signals: &EnvironmentSignals) -> DeviceClass {
        let ua = signals.user_agent.to_ascii_lowercase();
        let platform = signals.platform.to_ascii_lowercase();

        let class = if is_tablet_agent(&ua) || self.is_hybrid_touch(&platform, signals.max_touch_points) {
            DeviceClass::Tablet
        } else if is_mobile_agent(&ua) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        };

        debug!(
            device = %class,
            touch_points = signals.max_touch_points,
            platform = %signals.platform,
            "Device classified"
        );

        class
    }

    fn is_hybrid_touch(&self, platform: &str, touch_points: u32) -> bool {
        touch_points > self.tablet_touch_threshold
            && DESKTOP_PLATFORMS.iter().any(|p| platform.starts_with(p))
    }
}

/// Classify with the default threshold
pub fn classify(signals: &EnvironmentSignals) -> DeviceClass {
    DeviceClassifier::default().classify(signals)
}

fn is_tablet_agent(ua: &str) -> bool {
    if TABLET_TOKENS.iter().any(|t| ua.contains(t)) {
        return true;
    }
    // Android tablets omit the "mobile" token that Android phones carry
    ua.contains("android") && !ua.contains("mobile")
}

fn is_mobile_agent(ua: &str) -> bool {
    MOBILE_TOKENS.iter().any(|t| ua.contains(t))
}
