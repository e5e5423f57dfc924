//! Playback Session - async driver for a single playback view
//!
//! Owns:
//! - The embedded player handle (exclusively)
//! - The negotiator and controls overlay state machines
//! - The only clock both of them see
//!
//! All inputs (embed signals, user input, manual play, unmount) arrive on
//! one channel and are applied in delivery order by a single task. Player
//! commands run on a separate task that owns the player handle, so a slow
//! or hung command never holds up timers, signals or teardown. Command
//! completions are translated back into negotiator events; player failures
//! never reach the caller.

use crate::{
    config::ControllerConfig,
    controls::ControlsOverlay,
    device::DeviceClassifier,
    embed::{EmbedConfig, EmbedUrlBuilder},
    negotiator::PlaybackNegotiator,
    types::{
        DeviceClass, EnvironmentSignals, InputKind, MediaRef, NavigationAction, PlaybackEvent,
        PlaybackState, PlayerCommand,
    },
    Error, Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a playback view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Control surface of the embedded player
#[async_trait]
pub trait EmbeddedPlayer: Send {
    async fn play(&mut self) -> Result<()>;
    async fn pause(&mut self) -> Result<()>;
    async fn set_muted(&mut self, muted: bool) -> Result<()>;
    /// Volume in 0.0..=1.0
    async fn set_volume(&mut self, volume: f32) -> Result<()>;
    async fn get_qualities(&mut self) -> Result<Vec<String>>;
    async fn set_quality(&mut self, quality: &str) -> Result<()>;
}

/// Named events emitted by the embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSignal {
    Loaded,
    Playing,
    Error(String),
}

impl From<PlayerSignal> for PlaybackEvent {
    fn from(signal: PlayerSignal) -> Self {
        match signal {
            PlayerSignal::Loaded => PlaybackEvent::Loaded,
            PlayerSignal::Playing => PlaybackEvent::Playing,
            PlayerSignal::Error(reason) => PlaybackEvent::Fault(reason),
        }
    }
}

/// View-visible state published after every input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub loading: bool,
    pub manual_play_visible: bool,
    pub controls_visible: bool,
    pub muted: bool,
    /// Display form of the blocking or fault error, if any
    pub failure: Option<String>,
}

enum SessionInput {
    Signal(PlayerSignal),
    Input(InputKind),
    ManualPlay,
    Unmount(oneshot::Sender<()>),
}

/// Handle to a mounted playback view
pub struct PlaybackSession {
    id: SessionId,
    embed: EmbedConfig,
    tx: mpsc::UnboundedSender<SessionInput>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Classify the device, build the embed and start the driver task.
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all, fields(media = %media.id))]
    pub fn mount<P>(
        env: &EnvironmentSignals,
        media: &MediaRef,
        config: ControllerConfig,
        player: P,
    ) -> Result<Self>
    where
        P: EmbeddedPlayer + 'static,
    {
        config.validate()?;

        let device = DeviceClassifier::new(config.tablet_touch_threshold).classify(env);
        let embed = EmbedUrlBuilder::new(config.language.clone()).build(device, media)?;
        Ok(Self::mount_classified(device, embed, config, player))
    }

    /// Start the driver task for an already built embed
    pub fn mount_classified<P>(
        device: DeviceClass,
        embed: EmbedConfig,
        config: ControllerConfig,
        player: P,
    ) -> Self
    where
        P: EmbeddedPlayer + 'static,
    {
        let id = SessionId::new();
        let mut negotiator = PlaybackNegotiator::new(device, &config);
        let mut overlay = ControlsOverlay::new(device, config.controls_hide_delay());
        negotiator.mount(Duration::ZERO);
        overlay.mount(Duration::ZERO);

        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&negotiator, &overlay));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        let mut player_task = JoinSet::new();
        player_task.spawn(run_player(player, command_rx, outcome_tx));

        let driver = Driver {
            negotiator,
            overlay,
            origin: Instant::now(),
            rx,
            snapshot_tx,
            commands,
            outcomes,
            player_task,
        };
        let task = tokio::spawn(driver.run());

        info!(session_id = %id, device = %device, url = %embed.url, "Playback view mounted");

        Self {
            id,
            embed,
            tx,
            snapshot_rx,
            task: Some(task),
        }
    }

    /// Get session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Intent and URL the view renders
    pub fn embed(&self) -> &EmbedConfig {
        &self.embed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Forward an embed event
    pub fn signal(&self, signal: PlayerSignal) -> Result<()> {
        self.send(SessionInput::Signal(signal))
    }

    /// Forward a user input (click, tap, pointer move)
    pub fn input(&self, input: InputKind) -> Result<()> {
        self.send(SessionInput::Input(input))
    }

    /// User pressed the manual play affordance
    pub fn manual_play(&self) -> Result<()> {
        self.send(SessionInput::ManualPlay)
    }

    fn send(&self, input: SessionInput) -> Result<()> {
        self.tx.send(input).map_err(|_| Error::SessionClosed)
    }

    /// Tear the view down: timers cancelled, player handle dropped
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn unmount(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SessionInput::Unmount(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
        if let Err(e) = task.await {
            warn!(error = %e, "Playback driver ended abnormally");
        }
        info!("Playback view unmounted");
    }

    /// The single exit path of the playback view
    pub async fn back(self) -> NavigationAction {
        self.unmount().await;
        NavigationAction::Back
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("embed", &self.embed)
            .field("snapshot", &*self.snapshot_rx.borrow())
            .finish()
    }
}

/// How long teardown waits for queued commands before aborting the player task
const TEARDOWN_GRACE: Duration = Duration::from_millis(250);

struct Driver {
    negotiator: PlaybackNegotiator,
    overlay: ControlsOverlay,
    origin: Instant,
    rx: mpsc::UnboundedReceiver<SessionInput>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    commands: mpsc::UnboundedSender<PlayerCommand>,
    outcomes: mpsc::UnboundedReceiver<PlaybackEvent>,
    /// Holds the player task; dropping the driver aborts it
    player_task: JoinSet<()>,
}

impl Driver {
    async fn run(mut self) {
        let mut done = None;

        loop {
            let deadline = earliest(self.negotiator.next_deadline(), self.overlay.next_deadline())
                .map(|d| self.origin + d);

            tokio::select! {
                input = self.rx.recv() => match input {
                    None => break,
                    Some(SessionInput::Unmount(tx)) => {
                        done = Some(tx);
                        break;
                    }
                    Some(SessionInput::Signal(signal)) => self.dispatch(signal.into()),
                    Some(SessionInput::Input(kind)) => {
                        let now = self.now();
                        self.overlay.on_input(kind, now);
                    }
                    Some(SessionInput::ManualPlay) => self.dispatch(PlaybackEvent::ManualPlay),
                },
                Some(event) = self.outcomes.recv() => self.dispatch(event),
                _ = sleep_until(deadline) => {
                    let now = self.now();
                    self.overlay.tick(now);
                    self.dispatch(PlaybackEvent::Tick);
                }
            }

            self.publish();
        }

        let farewell = self.negotiator.unmount();
        self.overlay.unmount();
        self.rx.close();
        for command in farewell {
            let _ = self.commands.send(command);
        }
        drop(self.commands);

        // Queued commands drain, anything still in flight after the grace is aborted
        if tokio::time::timeout(TEARDOWN_GRACE, self.player_task.join_next())
            .await
            .is_err()
        {
            warn!("Player command still in flight at unmount, aborting");
        }
        self.player_task.shutdown().await;
        debug!(state = %self.negotiator.state(), "Playback driver stopped");

        if let Some(tx) = done {
            let _ = tx.send(());
        }
    }

    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    /// Apply an event and hand the resulting commands to the player task
    fn dispatch(&mut self, event: PlaybackEvent) {
        let now = self.now();
        for command in self.negotiator.handle(event, now) {
            if self.commands.send(command).is_err() {
                warn!("Player task gone, command dropped");
            }
        }
    }

    fn publish(&self) {
        let snapshot = snapshot_of(&self.negotiator, &self.overlay);
        self.snapshot_tx.send_if_modified(|current| {
            if *current != snapshot {
                *current = snapshot;
                true
            } else {
                false
            }
        });
    }
}

/// Owns the player handle and runs commands one at a time, in issue order
async fn run_player<P: EmbeddedPlayer>(
    mut player: P,
    mut commands: mpsc::UnboundedReceiver<PlayerCommand>,
    outcomes: mpsc::UnboundedSender<PlaybackEvent>,
) {
    while let Some(command) = commands.recv().await {
        if let Some(event) = execute(&mut player, command).await {
            if outcomes.send(event).is_err() {
                break;
            }
        }
    }
}

/// Run one command, translating failures the negotiator cares about into events
async fn execute<P: EmbeddedPlayer>(player: &mut P, command: PlayerCommand) -> Option<PlaybackEvent> {
    match command {
        PlayerCommand::Play { muted } => {
            if let Err(e) = player.set_muted(muted).await {
                warn!(error = %e, muted, "set_muted before play failed");
            }
            match player.play().await {
                Ok(()) => None,
                Err(Error::AutoplayBlocked(reason)) => Some(PlaybackEvent::PlayRejected(reason)),
                Err(e) => Some(PlaybackEvent::PlayRejected(e.to_string())),
            }
        }
        PlayerCommand::Pause => {
            if let Err(e) = player.pause().await {
                warn!(error = %e, "pause failed");
            }
            None
        }
        PlayerCommand::SetMuted(muted) => match player.set_muted(muted).await {
            Ok(()) => None,
            Err(e) if !muted => Some(PlaybackEvent::UnmuteRejected(e.to_string())),
            Err(e) => {
                warn!(error = %e, "mute failed");
                None
            }
        },
        PlayerCommand::SetVolume(volume) => {
            if let Err(e) = player.set_volume(volume.clamp(0.0, 1.0)).await {
                warn!(error = %e, volume, "set_volume failed");
            }
            None
        }
        PlayerCommand::GetQualities => match player.get_qualities().await {
            Ok(qualities) => Some(PlaybackEvent::Qualities(qualities)),
            Err(e) => {
                warn!(error = %e, "get_qualities failed");
                None
            }
        },
        PlayerCommand::SetQuality(quality) => {
            if let Err(e) = player.set_quality(&quality).await {
                warn!(error = %e, quality = %quality, "set_quality failed");
            }
            None
        }
    }
}

fn snapshot_of(negotiator: &PlaybackNegotiator, overlay: &ControlsOverlay) -> SessionSnapshot {
    SessionSnapshot {
        state: negotiator.state(),
        loading: negotiator.is_loading(),
        manual_play_visible: negotiator.manual_play_visible(),
        controls_visible: overlay.is_visible(),
        muted: negotiator.is_muted(),
        failure: negotiator.failure().map(|e| e.to_string()),
    }
}

fn earliest(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentPlayer;

    #[async_trait]
    impl EmbeddedPlayer for SilentPlayer {
        async fn play(&mut self) -> Result<()> {
            Ok(())
        }
        async fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        async fn set_muted(&mut self, _muted: bool) -> Result<()> {
            Ok(())
        }
        async fn set_volume(&mut self, _volume: f32) -> Result<()> {
            Ok(())
        }
        async fn get_qualities(&mut self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn set_quality(&mut self, _quality: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_earliest() {
        let a = Some(Duration::from_millis(5));
        let b = Some(Duration::from_millis(3));
        assert_eq!(earliest(a, b), b);
        assert_eq!(earliest(a, None), a);
        assert_eq!(earliest(None, None), None);
    }

    #[tokio::test]
    async fn test_session_creation() {
        let env = EnvironmentSignals::new("Mozilla/5.0 (Windows NT 10.0; Win64; x64)", 0, "Win32");
        let session = PlaybackSession::mount(
            &env,
            &MediaRef::vimeo("76979871"),
            ControllerConfig::default(),
            SilentPlayer,
        )
        .unwrap();

        assert_eq!(session.embed().device, DeviceClass::Desktop);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Loading);
        assert!(snapshot.loading);
        assert!(snapshot.controls_visible);

        assert_eq!(session.back().await, NavigationAction::Back);
    }

    #[tokio::test]
    async fn test_invalid_media_ref_fails_mount() {
        let env = EnvironmentSignals::default();
        let err = PlaybackSession::mount(&env, &MediaRef::vimeo("not-a-number"), ControllerConfig::default(), SilentPlayer)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MEDIA_REF");
    }
}
