//! Marquee WASM - Playback controller for the browser
//!
//! Runs the device classifier, embed builder, autoplay negotiator and
//! controls overlay inside the page. The page owns the embedded player and
//! the event loop; this module tells it which commands to issue and when to
//! call back.
//!
//! ## Integration with a hosted player
//!
//! ```javascript
//! import init, { MarqueeController } from '@marquee/wasm';
//!
//! await init();
//! const ctl = new MarqueeController('vimeo', '76979871');
//! iframe.src = ctl.embedUrl;
//!
//! const player = new Vimeo.Player(iframe);
//! const run = async (commands) => { for (const c of commands) await apply(player, ctl, c); };
//! player.on('loaded', () => run(ctl.onLoaded()));
//! player.on('playing', () => run(ctl.onPlaying()));
//! player.on('error', (e) => run(ctl.onError(e.message)));
//! ```

use wasm_bindgen::prelude::*;

mod controller;
mod environment;

pub use controller::MarqueeController;
pub use environment::{detect_environment, BrowserEnvironment};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&format!("[Marquee WASM] Initialized v{}", marquee_core::VERSION).into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Classify explicit signals: "desktop", "mobile" or "tablet"
#[wasm_bindgen(js_name = classifyDevice)]
pub fn classify_device(user_agent: &str, max_touch_points: u32, platform: &str) -> String {
    let signals = marquee_core::EnvironmentSignals::new(user_agent, max_touch_points, platform);
    marquee_core::classify(&signals).to_string()
}

/// Build an embed URL for a device class and media reference
#[wasm_bindgen(js_name = buildEmbedUrl)]
pub fn build_embed_url(device: &str, provider: &str, media_id: &str) -> Result<String, JsValue> {
    let device: marquee_core::DeviceClass = device.parse().map_err(to_js_error)?;
    let provider: marquee_core::EmbedProvider = provider.parse().map_err(to_js_error)?;
    let media = marquee_core::MediaRef::new(provider, media_id);
    let config = marquee_core::build_playback_config(device, &media).map_err(to_js_error)?;
    Ok(config.url.0)
}

pub(crate) fn to_js_error(e: marquee_core::Error) -> JsValue {
    JsValue::from_str(&format!("{} ({})", e, e.error_code()))
}
