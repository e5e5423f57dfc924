//! Marquee Core - Adaptive Playback Controller
//!
//! This crate provides the playback logic behind a title's full-screen
//! playback view:
//! - Device classification (desktop, mobile, tablet) from injected signals
//! - Embed configuration and URL building per device class
//! - Autoplay negotiation with muted retry and manual play fallback
//! - Transient on-screen controls with idle hide
//! - Catalog lookups for a selected title's trailer (optional)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Marquee Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Device    │─►│  Embed URL   │  │   Catalog    │           │
//! │  │  Classifier  │  │   Builder    │◄─│   Client     │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────┘           │
//! │         │                 │                                     │
//! │         └────────┬────────┘                                     │
//! │                  │                                              │
//! │           ┌──────┴──────┐                                       │
//! │           │  Playback   │                                       │
//! │           │   Session   │                                       │
//! │           └──────┬──────┘                                       │
//! │                  │                                              │
//! │  ┌──────────────┐│┌──────────────┐  ┌──────────────┐            │
//! │  │   Playback   │┴│   Controls   │  │    Timers    │            │
//! │  │  Negotiator  │ │   Overlay    │──│              │            │
//! │  └──────────────┘ └──────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The negotiator, overlay and timers are plain state machines driven by
//! explicit timestamps, so they run unchanged in the browser (see the
//! `marquee-wasm` crate). The `runtime` feature adds the tokio-driven
//! [`PlaybackSession`]; the `catalog` feature adds the HTTP catalog client.

pub mod error;
pub mod types;
pub mod config;
pub mod device;
pub mod embed;
pub mod timer;
pub mod negotiator;
pub mod controls;
#[cfg(feature = "runtime")]
pub mod session;
#[cfg(feature = "catalog")]
pub mod catalog;

pub use error::{Error, Result};
pub use types::*;
pub use config::ControllerConfig;
pub use device::{classify, DeviceClassifier};
pub use embed::{build_playback_config, EmbedConfig, EmbedUrlBuilder};
pub use timer::{TimerKind, Timers};
pub use negotiator::{PlaybackNegotiator, Transition};
pub use controls::ControlsOverlay;
#[cfg(feature = "runtime")]
pub use session::{EmbeddedPlayer, PlaybackSession, PlayerSignal, SessionId, SessionSnapshot};
#[cfg(feature = "catalog")]
pub use catalog::{CatalogClient, CatalogConfig, MediaType, Row, Title, TitleDetails};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Marquee Core initialized");
}
