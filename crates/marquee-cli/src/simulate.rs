//! Scripted replay of a playback view
//!
//! Script steps are `event@ms`, comma separated:
//!
//! | step | meaning |
//! |---|---|
//! | `loaded` / `playing` | embed signals |
//! | `error:<reason>` | embed fault |
//! | `rejected` | the last play command was rejected |
//! | `unmute-rejected` | the last unmute was rejected |
//! | `qualities:720p|1080p` | completion of a quality query |
//! | `manual` | manual play affordance pressed |
//! | `click` / `touch` / `move` | user input |
//!
//! Timers fire at their exact deadlines between steps.

use crate::output::{self, OutputFormat};
use anyhow::{bail, Context};
use marquee_core::{
    ControllerConfig, ControlsOverlay, DeviceClass, InputKind, PlaybackEvent, PlaybackNegotiator,
    PlayerCommand,
};
use serde::Serialize;
use std::time::Duration;
use tabled::Tabled;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Event(PlaybackEvent),
    Input(InputKind),
}

#[derive(Debug, Clone, PartialEq)]
struct TimedStep {
    at: Duration,
    step: Step,
}

#[derive(Debug, Serialize, Tabled)]
struct LogRow {
    at_ms: u64,
    input: String,
    state: String,
    loading: bool,
    controls: bool,
    commands: String,
}

fn parse_step(raw: &str) -> anyhow::Result<TimedStep> {
    let (name, at) = raw
        .rsplit_once('@')
        .with_context(|| format!("step '{}' has no @ms offset", raw))?;
    let at: u64 = at
        .trim()
        .parse()
        .with_context(|| format!("bad offset in step '{}'", raw))?;

    let (name, arg) = match name.trim().split_once(':') {
        Some((n, a)) => (n, Some(a)),
        None => (name.trim(), None),
    };

    let step = match name {
        "loaded" => Step::Event(PlaybackEvent::Loaded),
        "playing" => Step::Event(PlaybackEvent::Playing),
        "error" => Step::Event(PlaybackEvent::Fault(arg.unwrap_or("error").to_string())),
        "rejected" => Step::Event(PlaybackEvent::PlayRejected(arg.unwrap_or("NotAllowedError").to_string())),
        "unmute-rejected" => Step::Event(PlaybackEvent::UnmuteRejected(
            arg.unwrap_or("NotAllowedError").to_string(),
        )),
        "qualities" => Step::Event(PlaybackEvent::Qualities(
            arg.unwrap_or_default()
                .split('|')
                .filter(|q| !q.is_empty())
                .map(String::from)
                .collect(),
        )),
        "manual" => Step::Event(PlaybackEvent::ManualPlay),
        other => match other.parse::<InputKind>() {
            Ok(kind) => Step::Input(kind),
            Err(_) => bail!("unknown step '{}'", other),
        },
    };

    Ok(TimedStep {
        at: Duration::from_millis(at),
        step,
    })
}

fn parse_script(script: &str) -> anyhow::Result<Vec<TimedStep>> {
    let mut steps = script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect::<anyhow::Result<Vec<_>>>()?;
    // Stable: steps at the same offset keep script order
    steps.sort_by_key(|s| s.at);
    Ok(steps)
}

struct Replay {
    negotiator: PlaybackNegotiator,
    overlay: ControlsOverlay,
    log: Vec<LogRow>,
}

impl Replay {
    fn new(device: DeviceClass, config: &ControllerConfig) -> Self {
        let mut negotiator = PlaybackNegotiator::new(device, config);
        let mut overlay = ControlsOverlay::new(device, config.controls_hide_delay());
        negotiator.mount(Duration::ZERO);
        overlay.mount(Duration::ZERO);
        Self {
            negotiator,
            overlay,
            log: Vec::new(),
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        match (self.negotiator.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Fire every timer due up to and including `until`
    fn run_timers(&mut self, until: Duration) {
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= until) {
            self.overlay.tick(deadline);
            let commands = self.negotiator.tick(deadline);
            self.record(deadline, "timer".to_string(), &commands);
        }
    }

    fn apply(&mut self, step: TimedStep) {
        self.run_timers(step.at);
        match step.step {
            Step::Event(event) => {
                let label = format!("{:?}", event);
                let commands = self.negotiator.handle(event, step.at);
                self.record(step.at, label, &commands);
            }
            Step::Input(kind) => {
                let qualified = self.overlay.on_input(kind, step.at);
                let label = if qualified {
                    format!("{:?}", kind)
                } else {
                    format!("{:?} (ignored)", kind)
                };
                self.record(step.at, label, &[]);
            }
        }
    }

    fn unmount(&mut self, at: Duration) {
        let commands = self.negotiator.unmount();
        self.overlay.unmount();
        self.record(at, "unmount".to_string(), &commands);
    }

    fn record(&mut self, at: Duration, input: String, commands: &[PlayerCommand]) {
        debug!(at_ms = at.as_millis() as u64, input = %input, commands = commands.len(), "Replay step");
        self.log.push(LogRow {
            at_ms: at.as_millis() as u64,
            input,
            state: self.negotiator.state().to_string(),
            loading: self.negotiator.is_loading(),
            controls: self.overlay.is_visible(),
            commands: commands
                .iter()
                .map(|c| format!("{:?}", c))
                .collect::<Vec<_>>()
                .join("; "),
        });
    }
}

/// Replay a script and print the resulting log
pub fn run(
    device: &str,
    script: &str,
    until: u64,
    config: &ControllerConfig,
    format: &str,
) -> anyhow::Result<()> {
    let device: DeviceClass = device.parse()?;
    let steps = parse_script(script)?;
    info!(device = %device, steps = steps.len(), "Replaying script");

    let mut replay = Replay::new(device, config);
    for step in steps {
        replay.apply(step);
    }
    let until = Duration::from_millis(until);
    replay.run_timers(until);
    replay.unmount(until);

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&replay.log)),
        OutputFormat::Table => println!("{}", output::table(&replay.log)),
        OutputFormat::Text => {
            println!("Device: {}", device);
            for row in &replay.log {
                println!(
                    "{:>6}ms  {:<28} -> {:<16} loading={:<5} controls={:<5} {}",
                    row.at_ms, row.input, row.state, row.loading, row.controls, row.commands
                );
            }
            println!(
                "Final: {} (manual play {})",
                replay.negotiator.state(),
                if replay.negotiator.manual_play_visible() { "shown" } else { "hidden" }
            );
            if let Some(failure) = replay.negotiator.failure() {
                println!("Failure: {} [{}]", failure, failure.error_code());
            }
        }
    }

    Ok(())
}
