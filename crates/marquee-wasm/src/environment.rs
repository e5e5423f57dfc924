//! Browser environment probing

use marquee_core::EnvironmentSignals;
use wasm_bindgen::prelude::*;

/// Signals read from `navigator`
#[wasm_bindgen]
#[derive(Clone)]
pub struct BrowserEnvironment {
    user_agent: String,
    platform: String,
    /// Maximum simultaneous touch points
    pub max_touch_points: u32,
}

#[wasm_bindgen]
impl BrowserEnvironment {
    #[wasm_bindgen(getter, js_name = userAgent)]
    pub fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn platform(&self) -> String {
        self.platform.clone()
    }

    /// Device class for these signals
    #[wasm_bindgen(js_name = deviceClass)]
    pub fn device_class(&self) -> String {
        marquee_core::classify(&self.signals()).to_string()
    }
}

impl BrowserEnvironment {
    pub(crate) fn signals(&self) -> EnvironmentSignals {
        EnvironmentSignals::new(self.user_agent.clone(), self.max_touch_points, self.platform.clone())
    }
}

/// Read the current page's navigator. Missing values read as empty
#[wasm_bindgen(js_name = detectEnvironment)]
pub fn detect_environment() -> Result<BrowserEnvironment, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let navigator = window.navigator();

    Ok(BrowserEnvironment {
        user_agent: navigator.user_agent().unwrap_or_default(),
        platform: navigator.platform().unwrap_or_default(),
        max_touch_points: navigator.max_touch_points().max(0) as u32,
    })
}

/// Milliseconds since page load
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
