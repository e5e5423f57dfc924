//! Integration tests for Marquee Core

use async_trait::async_trait;
use marquee_core::{
    build_playback_config, classify, ControllerConfig, ControlsOverlay, DeviceClass,
    EmbeddedPlayer, EnvironmentSignals, Error, InputKind, MediaRef, PlaybackEvent,
    PlaybackNegotiator, PlaybackSession, PlaybackState, PlayerCommand, PlayerSignal, Result,
    TitleDetails,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
const KINDLE_ANDROID_MOBILE: &str = "Mozilla/5.0 (Linux; Android 11; KFTRWI) AppleWebKit/537.36 (KHTML, like Gecko) Silk/112.2.1 like Chrome/112.0.5615.213 Mobile Safari/537.36";
const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
const LINUX_FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn desktop_env() -> EnvironmentSignals {
    EnvironmentSignals::new(MAC_SAFARI, 0, "MacIntel")
}

fn mobile_env() -> EnvironmentSignals {
    EnvironmentSignals::new(IPHONE, 5, "iPhone")
}

fn negotiator(device: DeviceClass) -> PlaybackNegotiator {
    let mut negotiator = PlaybackNegotiator::new(device, &ControllerConfig::default());
    negotiator.mount(Duration::ZERO);
    negotiator
}

// =============================================================================
// Device Classifier Tests
// =============================================================================

#[test]
fn test_classification_is_pure() {
    let inputs = [
        EnvironmentSignals::new(IPHONE, 5, "iPhone"),
        EnvironmentSignals::new(IPAD, 5, "iPad"),
        EnvironmentSignals::new(MAC_SAFARI, 5, "MacIntel"),
        EnvironmentSignals::new(MAC_SAFARI, 0, "MacIntel"),
        EnvironmentSignals::new(LINUX_FIREFOX, 0, "Linux x86_64"),
        EnvironmentSignals::new(KINDLE_ANDROID_MOBILE, 10, "Linux armv8l"),
        EnvironmentSignals::default(),
    ];

    for signals in &inputs {
        let first = classify(signals);
        for _ in 0..3 {
            assert_eq!(classify(signals), first, "{:?}", signals);
        }
    }
}

#[test]
fn test_tablet_signature_beats_mobile_signature() {
    // Both carry "Mobile"; both carry a tablet token
    assert_eq!(classify(&EnvironmentSignals::new(IPAD, 5, "iPad")), DeviceClass::Tablet);
    assert_eq!(
        classify(&EnvironmentSignals::new(KINDLE_ANDROID_MOBILE, 10, "Linux armv8l")),
        DeviceClass::Tablet
    );
}

#[test]
fn test_hybrid_touch_on_desktop_platform() {
    assert_eq!(classify(&EnvironmentSignals::new(MAC_SAFARI, 5, "MacIntel")), DeviceClass::Tablet);
    assert_eq!(classify(&EnvironmentSignals::new(LINUX_FIREFOX, 0, "Linux x86_64")), DeviceClass::Desktop);
}

// =============================================================================
// Embed URL Builder Tests
// =============================================================================

#[test]
fn test_build_is_idempotent() {
    let refs = [
        MediaRef::vimeo("76979871"),
        MediaRef::youtube("vKQi3bBA1y8"),
        MediaRef::local_file("/test.mp4"),
    ];
    for device in [DeviceClass::Desktop, DeviceClass::Mobile, DeviceClass::Tablet] {
        for media in &refs {
            let first = build_playback_config(device, media).unwrap();
            let second = build_playback_config(device, media).unwrap();
            assert_eq!(first.url.as_str().as_bytes(), second.url.as_str().as_bytes());
            assert_eq!(first.intent, second.intent);
        }
    }
}

#[test]
fn test_touch_devices_embed_muted_inline() {
    for device in [DeviceClass::Mobile, DeviceClass::Tablet] {
        let config = build_playback_config(device, &MediaRef::vimeo("1")).unwrap();
        assert!(config.url.as_str().contains("muted=1"));
        assert!(config.url.as_str().contains("playsinline=1"));
        assert!(config.url.as_str().contains("controls=0"));
    }
    let desktop = build_playback_config(DeviceClass::Desktop, &MediaRef::vimeo("1")).unwrap();
    assert!(desktop.url.as_str().contains("muted=0"));
    assert!(!desktop.url.as_str().contains("playsinline"));
}

#[test]
fn test_trailer_to_embed() {
    let details: TitleDetails = serde_json::from_str(
        r#"{"id": 66732, "name": "Stranger Things", "videos": {"results": [
            {"key": "b9EkMc79ZSU", "site": "YouTube", "type": "Trailer"}
        ]}}"#,
    )
    .unwrap();

    let media = details.trailer_ref().unwrap();
    let config = build_playback_config(DeviceClass::Mobile, &media).unwrap();
    assert!(config
        .url
        .as_str()
        .starts_with("https://www.youtube.com/embed/b9EkMc79ZSU?autoplay=1&mute=1&playsinline=1"));
}

// =============================================================================
// Playback Negotiator Tests
// =============================================================================

#[test]
fn test_no_state_is_skipped() {
    let mut n = negotiator(DeviceClass::Desktop);

    // Ticks alone never reach Playing
    for t in (0..3_000).step_by(100) {
        assert!(n.tick(ms(t)).is_empty());
        assert_eq!(n.state(), PlaybackState::Loading);
    }

    n.handle(PlaybackEvent::Loaded, ms(2_950));
    assert_eq!(n.state(), PlaybackState::AutoplayPending);
    n.handle(PlaybackEvent::Playing, ms(2_990));
    assert_eq!(n.state(), PlaybackState::Playing);

    let history = n.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].from, PlaybackState::Loading);
    for pair in history.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    for t in history {
        assert!(t.from.can_transition_to(t.to));
    }
}

#[test]
fn test_double_rejection_ends_blocked_not_error() {
    let mut n = negotiator(DeviceClass::Desktop);

    assert_eq!(
        n.handle(PlaybackEvent::Loaded, ms(100)),
        vec![PlayerCommand::Play { muted: false }]
    );
    assert_eq!(
        n.handle(PlaybackEvent::PlayRejected("NotAllowedError".into()), ms(120)),
        vec![PlayerCommand::Play { muted: true }]
    );
    assert!(n
        .handle(PlaybackEvent::PlayRejected("NotAllowedError".into()), ms(140))
        .is_empty());

    assert_eq!(n.state(), PlaybackState::PlaybackBlocked);
    assert!(n.manual_play_visible());
    assert!(!n.is_loading());
}

#[test]
fn test_desktop_unmute_exactly_once_at_delay() {
    let mut n = negotiator(DeviceClass::Desktop);
    n.handle(PlaybackEvent::Loaded, ms(100));
    n.handle(PlaybackEvent::Playing, ms(400));
    assert_eq!(n.state(), PlaybackState::Playing);
    assert!(!n.is_loading());

    let mut unmutes = Vec::new();
    for t in (400..10_000).step_by(50) {
        for command in n.tick(ms(t)) {
            if command == PlayerCommand::SetMuted(false) {
                unmutes.push(t);
            }
        }
    }
    // A second play-start signal must not schedule another unmute
    n.handle(PlaybackEvent::Playing, ms(10_000));
    for command in n.tick(ms(20_000)) {
        assert_ne!(command, PlayerCommand::SetMuted(false));
    }

    assert_eq!(unmutes, vec![1_900]);
}

#[test]
fn test_mobile_never_unmutes() {
    let mut n = negotiator(DeviceClass::Mobile);
    n.handle(PlaybackEvent::Loaded, ms(0));
    n.handle(PlaybackEvent::Playing, ms(100));
    assert!(n.tick(ms(30_000)).is_empty());
    assert!(n.is_muted());
}

#[test]
fn test_mobile_liveness_timeout() {
    let mut n = negotiator(DeviceClass::Mobile);

    n.tick(ms(2_999));
    assert_eq!(n.state(), PlaybackState::Loading);
    assert!(n.is_loading());

    n.tick(ms(3_000));
    assert_ne!(n.state(), PlaybackState::Loading);
    assert_eq!(n.state(), PlaybackState::PlaybackBlocked);
    assert!(!n.is_loading());
    assert!(n.manual_play_visible());
    assert!(n.history().iter().all(|t| t.to != PlaybackState::Playing));
}

#[test]
fn test_fault_clears_loading_without_recovery() {
    let mut n = negotiator(DeviceClass::Tablet);
    n.handle(PlaybackEvent::Fault("embed failed".into()), ms(500));
    assert_eq!(n.state(), PlaybackState::Error);
    assert!(!n.is_loading());
    assert!(!n.manual_play_visible());
    assert!(n.tick(ms(60_000)).is_empty());
}

// =============================================================================
// Controls Overlay Tests
// =============================================================================

#[test]
fn test_click_reveals_then_hides_after_idle() {
    let mut overlay = ControlsOverlay::new(DeviceClass::Desktop, Duration::from_secs(3));
    overlay.mount(Duration::ZERO);
    overlay.tick(ms(3_000));
    assert!(!overlay.is_visible());

    assert!(overlay.on_input(InputKind::Click, ms(10_000)));
    assert!(overlay.is_visible());
    overlay.tick(ms(12_999));
    assert!(overlay.is_visible());
    overlay.tick(ms(13_000));
    assert!(!overlay.is_visible());
}

#[test]
fn test_second_click_resets_window() {
    let mut overlay = ControlsOverlay::new(DeviceClass::Mobile, Duration::from_secs(3));
    overlay.mount(Duration::ZERO);

    overlay.on_input(InputKind::Click, ms(1_000));
    overlay.on_input(InputKind::Touch, ms(2_500));

    // First window would have closed at 4000
    overlay.tick(ms(4_000));
    assert!(overlay.is_visible());
    overlay.tick(ms(5_499));
    assert!(overlay.is_visible());
    overlay.tick(ms(5_500));
    assert!(!overlay.is_visible());
}

#[test]
fn test_unmount_cancels_hide_timer() {
    let mut overlay = ControlsOverlay::new(DeviceClass::Desktop, Duration::from_secs(3));
    overlay.mount(Duration::ZERO);
    overlay.on_input(InputKind::PointerMove, ms(1_000));
    assert!(overlay.hide_pending());

    overlay.unmount();
    assert!(!overlay.hide_pending());
    assert_eq!(overlay.next_deadline(), None);
    assert!(!overlay.tick(ms(60_000)));
    assert!(overlay.is_visible());
}

// =============================================================================
// Playback Session Tests
// =============================================================================

/// Records every call made on the player, with its time
#[derive(Clone)]
struct Spy {
    origin: Instant,
    calls: Arc<Mutex<Vec<(Duration, String)>>>,
}

impl Spy {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, call: impl Into<String>) {
        let at = Instant::now().duration_since(self.origin);
        self.calls.lock().unwrap().push((at, call.into()));
    }

    fn times_of(&self, call: &str) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| c == call)
            .map(|(at, _)| *at)
            .collect()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

struct FakePlayer {
    spy: Spy,
    play_rejections: usize,
}

impl FakePlayer {
    fn new(spy: &Spy) -> Self {
        Self {
            spy: spy.clone(),
            play_rejections: 0,
        }
    }

    fn rejecting(spy: &Spy, times: usize) -> Self {
        Self {
            spy: spy.clone(),
            play_rejections: times,
        }
    }
}

#[async_trait]
impl EmbeddedPlayer for FakePlayer {
    async fn play(&mut self) -> Result<()> {
        self.spy.record("play");
        if self.play_rejections > 0 {
            self.play_rejections -= 1;
            return Err(Error::AutoplayBlocked("NotAllowedError".into()));
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.spy.record("pause");
        Ok(())
    }

    async fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.spy.record(format!("set_muted({})", muted));
        Ok(())
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.spy.record(format!("set_volume({})", volume));
        Ok(())
    }

    async fn get_qualities(&mut self) -> Result<Vec<String>> {
        self.spy.record("get_qualities");
        Ok(vec!["auto".into(), "720p".into(), "1080p".into()])
    }

    async fn set_quality(&mut self, quality: &str) -> Result<()> {
        self.spy.record(format!("set_quality({})", quality));
        Ok(())
    }
}

/// Player whose `play()` never completes. Flags when its handle is released
struct HungPlayer {
    spy: Spy,
    released: Arc<AtomicBool>,
}

impl HungPlayer {
    fn new(spy: &Spy) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let player = Self {
            spy: spy.clone(),
            released: released.clone(),
        };
        (player, released)
    }
}

impl Drop for HungPlayer {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddedPlayer for HungPlayer {
    async fn play(&mut self) -> Result<()> {
        self.spy.record("play");
        std::future::pending().await
    }

    async fn pause(&mut self) -> Result<()> {
        self.spy.record("pause");
        Ok(())
    }

    async fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.spy.record(format!("set_muted({})", muted));
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

/// Let the session tasks drain their queues without moving the clock
async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_desktop_play_start_unmutes_once() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &desktop_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    )
    .unwrap();

    session.signal(PlayerSignal::Loaded).unwrap();
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::AutoplayPending);

    tokio::time::advance(ms(200)).await;
    session.signal(PlayerSignal::Playing).unwrap();
    settle().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert!(!snapshot.loading);
    assert!(spy.calls().contains(&"set_quality(1080p)".to_string()));

    let unmutes_after_start = |spy: &Spy| {
        spy.times_of("set_muted(false)")
            .into_iter()
            .filter(|at| *at >= ms(200))
            .collect::<Vec<_>>()
    };

    tokio::time::advance(ms(1_499)).await;
    settle().await;
    assert!(unmutes_after_start(&spy).is_empty());

    tokio::time::advance(ms(1)).await;
    settle().await;
    assert_eq!(unmutes_after_start(&spy), vec![ms(1_700)]);

    tokio::time::advance(ms(10_000)).await;
    settle().await;
    assert_eq!(unmutes_after_start(&spy).len(), 1);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_mobile_silent_embed_times_out() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &mobile_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    )
    .unwrap();
    assert!(session.embed().intent.start_muted);

    tokio::time::advance(ms(2_999)).await;
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::Loading);
    assert!(session.snapshot().loading);

    tokio::time::advance(ms(1)).await;
    settle().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::PlaybackBlocked);
    assert!(!snapshot.loading);
    assert!(snapshot.manual_play_visible);
    assert!(spy.times_of("play").is_empty());

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_double_rejection_blocks() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &desktop_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::rejecting(&spy, 2),
    )
    .unwrap();

    session.signal(PlayerSignal::Loaded).unwrap();
    settle().await;

    assert_eq!(session.snapshot().state, PlaybackState::PlaybackBlocked);
    assert_eq!(
        spy.calls(),
        vec!["set_muted(false)", "play", "set_muted(true)", "play"]
    );
    assert_eq!(
        session.snapshot().failure.as_deref(),
        Some("Autoplay blocked: NotAllowedError")
    );

    // User gesture recovers
    session.manual_play().unwrap();
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::AutoplayPending);
    session.signal(PlayerSignal::Playing).unwrap();
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::Playing);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_fault_is_terminal() {
    let spy = Spy::new();
    let session = assert_ok!(PlaybackSession::mount(
        &mobile_env(),
        &MediaRef::youtube("vKQi3bBA1y8"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    ));

    session.signal(PlayerSignal::Error("privacy restricted".into())).unwrap();
    settle().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Error);
    assert!(!snapshot.loading);
    assert!(!snapshot.manual_play_visible);

    session.signal(PlayerSignal::Loaded).unwrap();
    tokio::time::advance(ms(10_000)).await;
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::Error);
    assert!(spy.calls().is_empty());

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_unmount_with_pending_hide() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &desktop_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    )
    .unwrap();
    let mut snapshots = session.subscribe();

    tokio::time::advance(ms(1_000)).await;
    session.input(InputKind::Click).unwrap();
    settle().await;
    assert!(session.snapshot().controls_visible);
    snapshots.borrow_and_update();

    session.unmount().await;

    tokio::time::advance(ms(30_000)).await;
    settle().await;
    // Sender is gone; the last published value still shows the controls
    assert!(snapshots.borrow().controls_visible);
    assert_eq!(snapshots.borrow().state, PlaybackState::Loading);
    assert!(snapshots.has_changed().is_err());
}

#[tokio::test]
async fn test_session_rejects_bad_config() {
    let config = ControllerConfig {
        controls_hide_delay_ms: 0,
        ..Default::default()
    };
    let spy = Spy::new();
    let err = assert_err!(PlaybackSession::mount(
        &desktop_env(),
        &MediaRef::vimeo("1"),
        config,
        FakePlayer::new(&spy),
    ));
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}

#[tokio::test(start_paused = true)]
async fn test_session_pointer_move_ignored_on_mobile() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &mobile_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    )
    .unwrap();

    tokio::time::advance(ms(2_000)).await;
    settle().await;
    session.signal(PlayerSignal::Loaded).unwrap();
    session.signal(PlayerSignal::Playing).unwrap();
    settle().await;

    tokio::time::advance(ms(1_000)).await;
    settle().await;
    assert!(!session.snapshot().controls_visible);

    session.input(InputKind::PointerMove).unwrap();
    settle().await;
    assert!(!session.snapshot().controls_visible);

    session.input(InputKind::Touch).unwrap();
    settle().await;
    assert!(session.snapshot().controls_visible);

    session.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_liveness_fires_while_play_hangs() {
    let spy = Spy::new();
    let (player, released) = HungPlayer::new(&spy);
    let session = PlaybackSession::mount(
        &desktop_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        player,
    )
    .unwrap();

    session.signal(PlayerSignal::Loaded).unwrap();
    settle().await;
    // The pending attempt is visible while play() is still outstanding
    assert_eq!(session.snapshot().state, PlaybackState::AutoplayPending);
    assert_eq!(spy.calls(), vec!["set_muted(false)", "play"]);

    tokio::time::advance(ms(2_999)).await;
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::AutoplayPending);
    assert!(session.snapshot().loading);
    assert!(session.snapshot().controls_visible);

    tokio::time::advance(ms(1)).await;
    settle().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::PlaybackBlocked);
    assert!(!snapshot.loading);
    assert!(snapshot.manual_play_visible);
    assert!(!snapshot.controls_visible);
    assert_eq!(snapshot.failure.as_deref(), Some("Autoplay blocked: liveness timeout"));

    let unmounted = tokio::time::timeout(ms(60_000), session.unmount()).await;
    assert!(unmounted.is_ok());
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_session_signals_flow_while_play_hangs() {
    let spy = Spy::new();
    let (player, released) = HungPlayer::new(&spy);
    let session = PlaybackSession::mount(
        &mobile_env(),
        &MediaRef::youtube("vKQi3bBA1y8"),
        ControllerConfig::default(),
        player,
    )
    .unwrap();

    session.signal(PlayerSignal::Loaded).unwrap();
    session.signal(PlayerSignal::Playing).unwrap();
    settle().await;
    assert_eq!(session.snapshot().state, PlaybackState::Playing);

    session.signal(PlayerSignal::Error("stalled".into())).unwrap();
    settle().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Error);
    assert_eq!(snapshot.failure.as_deref(), Some("Embed fault: stalled"));

    session.input(InputKind::Touch).unwrap();
    settle().await;
    assert!(session.snapshot().controls_visible);

    let unmounted = tokio::time::timeout(ms(60_000), session.back()).await;
    assert!(unmounted.is_ok());
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_session_unmount_pauses_playing_view() {
    let spy = Spy::new();
    let session = PlaybackSession::mount(
        &mobile_env(),
        &MediaRef::vimeo("76979871"),
        ControllerConfig::default(),
        FakePlayer::new(&spy),
    )
    .unwrap();

    session.signal(PlayerSignal::Loaded).unwrap();
    session.signal(PlayerSignal::Playing).unwrap();
    settle().await;
    assert!(!spy.calls().contains(&"pause".to_string()));

    session.unmount().await;
    assert_eq!(spy.calls().last().map(String::as_str), Some("pause"));
}

