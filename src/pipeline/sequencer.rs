//! Animation Sequencer
//!
//! Runs the fixed pipeline `Script` as one spawned task. The task is the only
//! writer of `SequencerState`; observers read the latest value through a
//! `watch` channel. Every step suspends through the injected `Clock`, so the
//! same script replays instantly under `InstantClock`.
//!
//! Two states: idle and running. `start` moves idle to running and is a
//! no-op while a run is in progress; the task moves back to idle once the last
//! step completes. There is no cancellation besides dropping the sequencer,
//! which aborts the task and discards its state.

use super::clock::Clock;
use super::script::{ramp_values, Gauge, Script, Step};
use super::stage::{Point, Stage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Marker positions are published at this interval while it moves.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub struct SequencerState {
    pub is_running: bool,
    pub status_message: String,
    pub tokenize_progress: u8,
    pub attention_score: u8,
    pub marker: Point,
    /// Stage the marker rests at, or is travelling towards.
    pub current_stage: Stage,
}

impl Default for SequencerState {
    fn default() -> Self {
        Self {
            is_running: false,
            status_message: String::new(),
            tokenize_progress: 0,
            attention_score: 0,
            marker: Stage::InputText.position(),
            current_stage: Stage::InputText,
        }
    }
}

impl SequencerState {
    pub fn gauge(&self, gauge: Gauge) -> u8 {
        match gauge {
            Gauge::Tokenize => self.tokenize_progress,
            Gauge::Attention => self.attention_score,
        }
    }

    fn set_gauge(&mut self, gauge: Gauge, value: u8) {
        match gauge {
            Gauge::Tokenize => self.tokenize_progress = value,
            Gauge::Attention => self.attention_score = value,
        }
    }

    /// True when the marker sits exactly on a stage coordinate.
    pub fn marker_at_rest(&self) -> bool {
        self.marker == self.current_stage.position()
    }
}

fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

async fn move_marker<F>(
    to: Stage,
    duration: Duration,
    clock: &dyn Clock,
    state: &mut SequencerState,
    publish: &mut F,
) where
    F: FnMut(&SequencerState),
{
    let from = state.marker;
    let target = to.position();
    state.current_stage = to;

    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        let frame = FRAME_INTERVAL.min(duration - elapsed);
        clock.sleep(frame).await;
        elapsed += frame;
        state.marker = if elapsed >= duration {
            target
        } else {
            from.lerp(target, ease_in_out(elapsed.as_secs_f64() / duration.as_secs_f64()))
        };
        publish(state);
    }

    if state.marker != target {
        state.marker = target;
        publish(state);
    }
}

/// Execute `script` step by step, calling `publish` after every observable change.
pub async fn perform<F>(script: &Script, clock: &dyn Clock, state: &mut SequencerState, mut publish: F)
where
    F: FnMut(&SequencerState),
{
    state.is_running = true;
    state.status_message.clear();
    state.tokenize_progress = 0;
    state.attention_score = 0;
    publish(state);

    for (index, step) in script.steps().iter().enumerate() {
        debug!(index, ?step, "Sequencer step");

        if let Some(status) = step.status() {
            state.status_message = status.to_string();
            publish(state);
        }

        match step {
            Step::Move { to, duration, .. } => {
                move_marker(*to, *duration, clock, state, &mut publish).await;
            }
            Step::Ramp {
                gauge,
                delta,
                interval,
            } => {
                for value in ramp_values(*delta) {
                    state.set_gauge(*gauge, value);
                    publish(state);
                    clock.sleep(*interval).await;
                }
            }
            Step::Pause { duration, .. } => {
                // Zero-length pauses still suspend so observers see the status.
                clock.sleep(*duration).await;
            }
        }
    }

    state.is_running = false;
    publish(state);
}

pub struct Sequencer {
    script: Arc<Script>,
    clock: Arc<dyn Clock>,
    state: Arc<watch::Sender<SequencerState>>,
    task: Option<JoinHandle<()>>,
}

impl Sequencer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_script(Script::llm_pipeline(), clock)
    }

    pub fn with_script(script: Script, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(SequencerState::default());
        Self {
            script: Arc::new(script),
            clock,
            state: Arc::new(state),
            task: None,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn subscribe(&self) -> watch::Receiver<SequencerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SequencerState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running
    }

    /// Begin a run. Returns false, and does nothing, while a run is in progress.
    pub fn start(&mut self) -> bool {
        let claimed = self.state.send_if_modified(|s| {
            if s.is_running {
                false
            } else {
                s.is_running = true;
                true
            }
        });
        if !claimed {
            debug!("Sequencer already running, ignoring start");
            return false;
        }

        info!("Starting LLM pipeline run");
        let script = Arc::clone(&self.script);
        let clock = Arc::clone(&self.clock);
        let tx = Arc::clone(&self.state);
        let mut state = self.snapshot();

        self.task = Some(tokio::spawn(async move {
            perform(&script, clock.as_ref(), &mut state, |s| {
                tx.send_replace(s.clone());
            })
            .await;
            info!("LLM pipeline run complete");
        }));
        true
    }

    /// Start a run and hand every state change seen on the channel to
    /// `observe` until the run completes. Returns false if a run was already
    /// in progress.
    pub async fn run_observed<F>(&mut self, mut observe: F) -> bool
    where
        F: FnMut(&SequencerState),
    {
        let mut rx = self.subscribe();
        if !self.start() {
            return false;
        }
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().clone();
            observe(&current);
            if !current.is_running {
                break;
            }
        }
        self.finished().await;
        true
    }

    /// Wait for the current run, if any, to finish.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
