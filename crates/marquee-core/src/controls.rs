//! Transient Controls Overlay
//!
//! On-screen buttons are revealed by qualifying input and hidden again after
//! an idle window. Every qualifying input reschedules the hide. Pointer
//! movement only counts on desktop; on touch devices incidental scrolling
//! would keep the overlay flickering.

use crate::{
    timer::{TimerKind, Timers},
    types::{DeviceClass, InputKind},
};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ControlsOverlay {
    device: DeviceClass,
    hide_delay: Duration,
    visible: bool,
    mounted: bool,
    timers: Timers,
}

impl ControlsOverlay {
    pub fn new(device: DeviceClass, hide_delay: Duration) -> Self {
        Self {
            device,
            hide_delay,
            visible: false,
            mounted: false,
            timers: Timers::new(),
        }
    }

    /// Show the controls on mount and start the idle window
    pub fn mount(&mut self, now: Duration) {
        self.mounted = true;
        self.reveal(now);
    }

    /// Cancel the pending hide; visibility is frozen from here on
    pub fn unmount(&mut self) {
        self.timers.cancel_all();
        self.mounted = false;
    }

    /// Feed a user input. Returns true if it qualified
    pub fn on_input(&mut self, input: InputKind, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }
        self.tick(now);

        let qualifies = match input {
            InputKind::Click | InputKind::Touch => true,
            InputKind::PointerMove => !self.device.is_touch_first(),
        };
        if qualifies {
            self.reveal(now);
        }
        qualifies
    }

    /// Apply an elapsed hide deadline. Returns true if visibility changed
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }
        let expired = self.timers.expire(now);
        if expired.contains(&TimerKind::HideControls) && self.visible {
            self.visible = false;
            debug!(at_ms = now.as_millis() as u64, "Controls hidden");
            return true;
        }
        false
    }

    fn reveal(&mut self, now: Duration) {
        self.visible = true;
        self.timers.schedule(TimerKind::HideControls, now + self.hide_delay);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide_pending(&self) -> bool {
        self.timers.is_pending(TimerKind::HideControls)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }
}
