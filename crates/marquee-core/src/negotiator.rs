//! Playback Negotiator
//!
//! Drives the embedded player toward a playing state despite platform
//! autoplay restrictions. The negotiator does no I/O: every signal from the
//! embed, every command completion and every clock tick goes through
//! [`PlaybackNegotiator::handle`], which returns the commands to issue.
//!
//! ```text
//!            Loaded              Playing
//!  Loading ─────────► AutoplayPending ─────────► Playing
//!     │                    │  ▲                     │
//!     │ liveness timeout   │  │ ManualPlay          │ Fault
//!     ▼                    ▼  │                     ▼
//!  PlaybackBlocked ◄───────┘──┘                   Error
//! ```
//!
//! A rejected unmuted play is retried once with forced mute. A second
//! rejection surfaces the manual play affordance. Faults are terminal.

use crate::{
    config::ControllerConfig,
    timer::{TimerKind, Timers},
    types::{DeviceClass, PlaybackEvent, PlaybackIntent, PlaybackState, PlayerCommand},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A recorded state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PlaybackState,
    pub to: PlaybackState,
    /// Offset from mount
    pub at: Duration,
}

/// Autoplay state machine for a single playback view
#[derive(Debug, Clone)]
pub struct PlaybackNegotiator {
    device: DeviceClass,
    intent: PlaybackIntent,
    liveness_timeout: Duration,
    unmute_delay: Duration,
    muted_retry: bool,
    preferred_quality: Option<String>,

    state: PlaybackState,
    loading: bool,
    manual_play_visible: bool,
    muted: bool,
    retry_available: bool,
    unmute_scheduled: bool,
    qualities_requested: bool,
    mounted: bool,
    /// Why playback last stopped short of Playing
    failure_reason: Option<String>,
    timers: Timers,
    history: Vec<Transition>,
}

impl PlaybackNegotiator {
    /// Create a negotiator for a classified device
    pub fn new(device: DeviceClass, config: &ControllerConfig) -> Self {
        let intent = PlaybackIntent::for_device(device);
        Self {
            device,
            intent,
            liveness_timeout: config.liveness_timeout(),
            unmute_delay: config.unmute_delay(),
            muted_retry: config.muted_retry,
            preferred_quality: config.preferred_quality.clone(),
            state: PlaybackState::Loading,
            loading: true,
            manual_play_visible: false,
            muted: intent.start_muted,
            retry_available: config.muted_retry,
            unmute_scheduled: false,
            qualities_requested: false,
            mounted: false,
            failure_reason: None,
            timers: Timers::new(),
            history: Vec::new(),
        }
    }

    /// Arm the liveness guard. `now` is the mount instant, normally zero
    pub fn mount(&mut self, now: Duration) {
        self.mounted = true;
        self.timers.schedule(TimerKind::Liveness, now + self.liveness_timeout);
        info!(device = %self.device, "Playback negotiator mounted");
    }

    /// Cancel every pending timer and ignore all later signals.
    /// Returns the commands that stop audible output before the player
    /// handle is released.
    pub fn unmount(&mut self) -> Vec<PlayerCommand> {
        if !self.mounted {
            return Vec::new();
        }
        self.timers.cancel_all();
        self.mounted = false;
        debug!(state = %self.state, "Playback negotiator unmounted");

        if self.state == PlaybackState::Playing {
            vec![PlayerCommand::Pause]
        } else {
            Vec::new()
        }
    }

    /// Single dispatch entry point. Due timers are expired before the event
    pub fn handle(&mut self, event: PlaybackEvent, now: Duration) -> Vec<PlayerCommand> {
        let mut commands = Vec::new();
        if !self.mounted {
            debug!(?event, "Event after unmount ignored");
            return commands;
        }

        for timer in self.timers.expire(now) {
            self.on_timer(timer, now, &mut commands);
        }

        match event {
            PlaybackEvent::Tick => {}
            PlaybackEvent::Loaded => self.on_loaded(now, &mut commands),
            PlaybackEvent::Playing => self.on_playing(now, &mut commands),
            PlaybackEvent::Fault(reason) => self.on_fault(&reason, now),
            PlaybackEvent::PlayRejected(reason) => self.on_play_rejected(&reason, now, &mut commands),
            PlaybackEvent::UnmuteRejected(reason) => {
                warn!(reason = %reason, "Unmute rejected, staying muted");
                self.muted = true;
            }
            PlaybackEvent::Qualities(qualities) => self.on_qualities(&qualities, &mut commands),
            PlaybackEvent::ManualPlay => self.on_manual_play(now, &mut commands),
        }

        for command in &commands {
            debug!(?command, "Player command");
        }
        commands
    }

    /// Shorthand for `handle(PlaybackEvent::Tick, now)`
    pub fn tick(&mut self, now: Duration) -> Vec<PlayerCommand> {
        self.handle(PlaybackEvent::Tick, now)
    }

    fn on_loaded(&mut self, now: Duration, commands: &mut Vec<PlayerCommand>) {
        if self.state != PlaybackState::Loading {
            debug!(state = %self.state, "Duplicate loaded signal ignored");
            return;
        }

        if !self.intent.autoplay {
            self.block("autoplay disabled", now);
            return;
        }

        self.muted = self.intent.start_muted;
        self.transition(PlaybackState::AutoplayPending, now);
        commands.push(PlayerCommand::Play { muted: self.muted });
    }

    fn on_playing(&mut self, now: Duration, commands: &mut Vec<PlayerCommand>) {
        if !matches!(
            self.state,
            PlaybackState::Loading | PlaybackState::AutoplayPending | PlaybackState::PlaybackBlocked
        ) {
            return;
        }

        self.transition(PlaybackState::Playing, now);
        self.loading = false;
        self.manual_play_visible = false;
        self.failure_reason = None;
        self.timers.cancel(TimerKind::Liveness);

        if !self.device.is_touch_first() {
            if !self.unmute_scheduled {
                self.unmute_scheduled = true;
                self.timers.schedule(TimerKind::DelayedUnmute, now + self.unmute_delay);
            }
            if !self.qualities_requested {
                self.qualities_requested = true;
                commands.push(PlayerCommand::GetQualities);
            }
        }
    }

    fn on_play_rejected(&mut self, reason: &str, now: Duration, commands: &mut Vec<PlayerCommand>) {
        if self.state != PlaybackState::AutoplayPending {
            debug!(state = %self.state, "Stale play rejection ignored");
            return;
        }

        if !self.muted && self.retry_available {
            warn!(reason = %reason, "Unmuted play rejected, retrying muted");
            self.retry_available = false;
            self.muted = true;
            commands.push(PlayerCommand::Play { muted: true });
            return;
        }

        warn!(reason = %reason, muted = self.muted, "Autoplay blocked");
        self.block(reason, now);
    }

    fn on_fault(&mut self, reason: &str, now: Duration) {
        if self.state.is_terminal() {
            return;
        }
        warn!(reason = %reason, "Embed fault");
        self.failure_reason = Some(reason.to_string());
        self.transition(PlaybackState::Error, now);
        self.loading = false;
        self.manual_play_visible = false;
        self.timers.cancel_all();
    }

    fn on_qualities(&mut self, qualities: &[String], commands: &mut Vec<PlayerCommand>) {
        if self.device.is_touch_first() || self.state != PlaybackState::Playing {
            return;
        }
        if let Some(quality) = select_quality(qualities, self.preferred_quality.as_deref()) {
            commands.push(PlayerCommand::SetQuality(quality));
        }
    }

    fn on_manual_play(&mut self, now: Duration, commands: &mut Vec<PlayerCommand>) {
        if self.state != PlaybackState::PlaybackBlocked {
            debug!(state = %self.state, "Manual play ignored");
            return;
        }

        // A user gesture permits audible playback; no automatic retry follows
        self.manual_play_visible = false;
        self.failure_reason = None;
        self.loading = true;
        self.muted = false;
        self.retry_available = false;
        self.transition(PlaybackState::AutoplayPending, now);
        self.timers.schedule(TimerKind::Liveness, now + self.liveness_timeout);
        commands.push(PlayerCommand::Play { muted: false });
    }

    fn on_timer(&mut self, timer: TimerKind, now: Duration, commands: &mut Vec<PlayerCommand>) {
        match timer {
            TimerKind::Liveness => {
                if self.state.is_loading() {
                    warn!(state = %self.state, "Embed silent, leaving loading");
                    self.block("liveness timeout", now);
                }
            }
            TimerKind::DelayedUnmute => {
                if self.state == PlaybackState::Playing {
                    self.muted = false;
                    commands.push(PlayerCommand::SetMuted(false));
                    commands.push(PlayerCommand::SetVolume(1.0));
                }
            }
            TimerKind::HideControls => {}
        }
    }

    fn block(&mut self, reason: &str, now: Duration) {
        self.failure_reason = Some(reason.to_string());
        self.transition(PlaybackState::PlaybackBlocked, now);
        self.loading = false;
        self.manual_play_visible = true;
        self.timers.cancel(TimerKind::Liveness);
    }

    fn transition(&mut self, to: PlaybackState, now: Duration) {
        if let Err(e) = self.try_transition(to, now) {
            warn!(error = %e, "Transition refused");
        }
    }

    fn try_transition(&mut self, to: PlaybackState, now: Duration) -> Result<()> {
        let from = self.state;
        if !from.can_transition_to(to) {
            return Err(Error::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.state = to;
        self.history.push(Transition { from, to, at: now });
        info!(from = %from, to = %to, at_ms = now.as_millis() as u64, "State transition");
        Ok(())
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn intent(&self) -> &PlaybackIntent {
        &self.intent
    }

    /// Loading indicator visibility
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn manual_play_visible(&self) -> bool {
        self.manual_play_visible
    }

    /// Mute state the negotiator last requested
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn muted_retry_enabled(&self) -> bool {
        self.muted_retry
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Why the view is not playing: `AutoplayBlocked` while the manual play
    /// affordance is up, `EmbedFault` once the embed has failed
    pub fn failure(&self) -> Option<Error> {
        let reason = self.failure_reason.clone().unwrap_or_default();
        match self.state {
            PlaybackState::PlaybackBlocked => Some(Error::AutoplayBlocked(reason)),
            PlaybackState::Error => Some(Error::EmbedFault(reason)),
            _ => None,
        }
    }
}

/// Pick the preferred quality if offered, else the highest numeric one
pub fn select_quality(qualities: &[String], preferred: Option<&str>) -> Option<String> {
    if let Some(preferred) = preferred {
        if let Some(found) = qualities.iter().find(|q| q.eq_ignore_ascii_case(preferred)) {
            return Some(found.clone());
        }
    }

    qualities
        .iter()
        .filter_map(|q| quality_height(q).map(|h| (h, q)))
        .max_by_key(|(h, _)| *h)
        .map(|(_, q)| q.clone())
}

/// "1080p" -> 1080, "4K" -> 2160, "auto" -> None
fn quality_height(quality: &str) -> Option<u32> {
    let q = quality.trim().to_ascii_lowercase();
    match q.as_str() {
        "4k" => return Some(2160),
        "8k" => return Some(4320),
        _ => {}
    }
    let digits: String = q.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
