//! Playback controller exposed to JavaScript
//!
//! Every method returns the list of player commands the page must issue,
//! serialized as `{ command, value }` objects. Time is read from
//! `performance.now()` relative to construction.

use crate::environment::{detect_environment, now_ms};
use crate::to_js_error;
use marquee_core::{
    ControllerConfig, ControlsOverlay, DeviceClass, DeviceClassifier, EmbedConfig,
    EmbedUrlBuilder, InputKind, MediaRef, PlaybackEvent, PlaybackNegotiator, PlayerCommand,
};
use std::time::Duration;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct MarqueeController {
    embed: EmbedConfig,
    negotiator: PlaybackNegotiator,
    overlay: ControlsOverlay,
    mounted_at: f64,
}

#[wasm_bindgen]
impl MarqueeController {
    /// Classify the current browser and mount a controller for `media_id`
    #[wasm_bindgen(constructor)]
    pub fn new(provider: &str, media_id: &str) -> Result<MarqueeController, JsValue> {
        Self::with_config(provider, media_id, None)
    }

    /// Same as the constructor, with a JSON `ControllerConfig`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        provider: &str,
        media_id: &str,
        config_json: Option<String>,
    ) -> Result<MarqueeController, JsValue> {
        let config = match config_json {
            Some(json) => ControllerConfig::from_json_str(&json).map_err(to_js_error)?,
            None => ControllerConfig::default(),
        };

        let env = detect_environment()?;
        let device = DeviceClassifier::new(config.tablet_touch_threshold).classify(&env.signals());
        let media = MediaRef::new(provider.parse().map_err(to_js_error)?, media_id);
        Self::mount(device, &media, &config)
    }

    /// Mount for an explicit device class, bypassing the navigator
    #[wasm_bindgen(js_name = forDevice)]
    pub fn for_device(device: &str, provider: &str, media_id: &str) -> Result<MarqueeController, JsValue> {
        let device: DeviceClass = device.parse().map_err(to_js_error)?;
        let media = MediaRef::new(provider.parse().map_err(to_js_error)?, media_id);
        Self::mount(device, &media, &ControllerConfig::default())
    }

    #[wasm_bindgen(getter, js_name = embedUrl)]
    pub fn embed_url(&self) -> String {
        self.embed.url.0.clone()
    }

    #[wasm_bindgen(getter, js_name = deviceClass)]
    pub fn device_class(&self) -> String {
        self.embed.device.to_string()
    }

    #[wasm_bindgen(getter, js_name = startMuted)]
    pub fn start_muted(&self) -> bool {
        self.embed.intent.start_muted
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.negotiator.state().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn loading(&self) -> bool {
        self.negotiator.is_loading()
    }

    #[wasm_bindgen(getter, js_name = manualPlayVisible)]
    pub fn manual_play_visible(&self) -> bool {
        self.negotiator.manual_play_visible()
    }

    #[wasm_bindgen(getter, js_name = controlsVisible)]
    pub fn controls_visible(&self) -> bool {
        self.overlay.is_visible()
    }

    #[wasm_bindgen(js_name = onLoaded)]
    pub fn on_loaded(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::Loaded)
    }

    #[wasm_bindgen(js_name = onPlaying)]
    pub fn on_playing(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::Playing)
    }

    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&mut self, reason: String) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::Fault(reason))
    }

    /// The promise returned by `play()` rejected
    #[wasm_bindgen(js_name = onPlayRejected)]
    pub fn on_play_rejected(&mut self, reason: String) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::PlayRejected(reason))
    }

    /// The promise returned by `setMuted(false)` rejected
    #[wasm_bindgen(js_name = onUnmuteRejected)]
    pub fn on_unmute_rejected(&mut self, reason: String) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::UnmuteRejected(reason))
    }

    /// Result of `getQualities()`, as an array of quality ids
    #[wasm_bindgen(js_name = onQualities)]
    pub fn on_qualities(&mut self, qualities: JsValue) -> Result<JsValue, JsValue> {
        let qualities: Vec<String> = serde_wasm_bindgen::from_value(qualities)?;
        self.dispatch(PlaybackEvent::Qualities(qualities))
    }

    /// User pressed the manual play affordance
    #[wasm_bindgen(js_name = manualPlay)]
    pub fn manual_play(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(PlaybackEvent::ManualPlay)
    }

    /// "click", "touch" or "pointermove". Returns true if the input revealed the controls
    #[wasm_bindgen(js_name = onInput)]
    pub fn on_input(&mut self, kind: &str) -> Result<bool, JsValue> {
        let kind: InputKind = kind.parse().map_err(to_js_error)?;
        let now = self.now();
        Ok(self.overlay.on_input(kind, now))
    }

    /// Apply elapsed timers. Call when `nextDeadline` passes
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let now = self.now();
        self.overlay.tick(now);
        self.dispatch(PlaybackEvent::Tick)
    }

    /// Milliseconds until the next timer, for `setTimeout`
    #[wasm_bindgen(js_name = msUntilNextDeadline)]
    pub fn ms_until_next_deadline(&self) -> Option<f64> {
        let deadline = match (self.negotiator.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => return None,
        };
        let remaining = deadline.saturating_sub(self.now());
        Some(remaining.as_secs_f64() * 1000.0)
    }

    /// Blocking or fault error, e.g. "Autoplay blocked: liveness timeout"
    #[wasm_bindgen(getter)]
    pub fn failure(&self) -> Option<String> {
        self.negotiator.failure().map(|e| e.to_string())
    }

    /// Tear down: no timer fires and no command is produced afterwards.
    /// Returns the commands to issue before the player is removed
    #[wasm_bindgen]
    pub fn unmount(&mut self) -> Result<JsValue, JsValue> {
        let commands = self.negotiator.unmount();
        self.overlay.unmount();
        Ok(serde_wasm_bindgen::to_value(&commands)?)
    }
}

impl MarqueeController {
    fn mount(device: DeviceClass, media: &MediaRef, config: &ControllerConfig) -> Result<Self, JsValue> {
        let embed = EmbedUrlBuilder::new(config.language.clone())
            .build(device, media)
            .map_err(to_js_error)?;

        let mut negotiator = PlaybackNegotiator::new(device, config);
        let mut overlay = ControlsOverlay::new(device, config.controls_hide_delay());
        negotiator.mount(Duration::ZERO);
        overlay.mount(Duration::ZERO);

        Ok(Self {
            embed,
            negotiator,
            overlay,
            mounted_at: now_ms(),
        })
    }

    fn now(&self) -> Duration {
        Duration::from_secs_f64(((now_ms() - self.mounted_at) / 1000.0).max(0.0))
    }

    fn dispatch(&mut self, event: PlaybackEvent) -> Result<JsValue, JsValue> {
        let now = self.now();
        let commands: Vec<PlayerCommand> = self.negotiator.handle(event, now);
        Ok(serde_wasm_bindgen::to_value(&commands)?)
    }
}
