//! Recorder: a cancellable, time-driven capture state machine.
//!
//! States: `Idle -> Countdown(n) -> Capturing -> Idle`, driven once per
//! scheduling tick by the external driver. Cancellation is polled at each
//! tick and takes effect at the next tick boundary. Every exit from
//! `Capturing` (end of clip, external stop, cancel) funnels through the same
//! finalize step, so state restoration happens on all paths.

use thiserror::Error;

use crate::clip::Clip;
use crate::targets::AnimationTarget;

/// Default number of one-second countdown ticks before capture begins.
pub const DEFAULT_COUNTDOWN_TICKS: u32 = 5;

#[derive(Clone, Debug, PartialEq)]
enum RecorderState {
    Idle,
    Countdown { ticks_left: u32, tick_elapsed: f32 },
    Capturing { elapsed: f32 },
}

/// What the state machine did this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RecorderStatus {
    Idle,
    CountingDown { seconds_left: u32 },
    Capturing,
    Finished,
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("the clip is currently playing")]
    ClipPlaying,
}

/// Per-tick context supplied by the external driver.
pub struct TickContext<'a> {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// External cancel signal (e.g. a key press), polled once per tick.
    pub cancel_requested: bool,
    /// Rebuild hook, invoked after keyframes are cleared so downstream
    /// consumers see empty targets before capture begins.
    pub rebuild: &'a mut dyn FnMut(),
}

pub struct Recorder {
    state: RecorderState,
    countdown_ticks: u32,
    controllers: Vec<String>,
    float_params: Vec<String>,
}

impl Recorder {
    /// `controllers` and `float_params` name the targets to record; names
    /// with no matching target in the clip are skipped.
    pub fn new(controllers: Vec<String>, float_params: Vec<String>) -> Self {
        Self {
            state: RecorderState::Idle,
            countdown_ticks: DEFAULT_COUNTDOWN_TICKS,
            controllers,
            float_params,
        }
    }

    pub fn with_countdown(mut self, ticks: u32) -> Self {
        self.countdown_ticks = ticks;
        self
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecorderState::Idle
    }

    /// Arm the countdown. The owning clip must not be playing.
    pub fn start(&mut self, clip: &Clip) -> Result<(), RecordError> {
        if self.state != RecorderState::Idle {
            return Err(RecordError::AlreadyRecording);
        }
        if clip.is_playing() {
            return Err(RecordError::ClipPlaying);
        }
        // With a zero countdown, capture begins on the first tick.
        self.state = RecorderState::Countdown {
            ticks_left: self.countdown_ticks,
            tick_elapsed: 0.0,
        };
        Ok(())
    }

    /// Drive the state machine by one scheduling tick.
    pub fn tick(&mut self, clip: &mut Clip, ctx: &mut TickContext<'_>) -> RecorderStatus {
        let state = std::mem::replace(&mut self.state, RecorderState::Idle);
        match state {
            RecorderState::Idle => RecorderStatus::Idle,

            RecorderState::Countdown {
                mut ticks_left,
                mut tick_elapsed,
            } => {
                // Cancelling during the countdown has no side effects.
                if ctx.cancel_requested {
                    return RecorderStatus::Cancelled;
                }
                tick_elapsed += ctx.dt;
                while tick_elapsed >= 1.0 && ticks_left > 0 {
                    tick_elapsed -= 1.0;
                    ticks_left -= 1;
                }
                if ticks_left == 0 {
                    self.begin_capture(clip, ctx);
                    self.state = RecorderState::Capturing { elapsed: 0.0 };
                    return RecorderStatus::Capturing;
                }
                self.state = RecorderState::Countdown {
                    ticks_left,
                    tick_elapsed,
                };
                RecorderStatus::CountingDown {
                    seconds_left: ticks_left,
                }
            }

            RecorderState::Capturing { elapsed } => {
                if ctx.cancel_requested {
                    return self.finalize(clip, true);
                }
                if !clip.is_playing() || elapsed > clip.animation_length {
                    return self.finalize(clip, false);
                }
                let time = elapsed.min(clip.animation_length);
                clip.seek(time);
                self.for_each_selected(clip, |target| target.record_current(time));
                self.state = RecorderState::Capturing {
                    elapsed: elapsed + ctx.dt,
                };
                RecorderStatus::Capturing
            }
        }
    }

    /// Recording always replaces: clear the selected targets, let downstream
    /// consumers rebuild against the empty targets, then switch every target
    /// into the batched recording protocol and start playback from zero.
    fn begin_capture(&mut self, clip: &mut Clip, ctx: &mut TickContext<'_>) {
        self.for_each_selected(clip, |target| target.clear_keyframes());
        (ctx.rebuild)();
        self.for_each_selected(clip, |target| target.base_mut().begin_recording());
        clip.reset();
        clip.play();
    }

    /// Mandatory cleanup on every exit path: stop and reset playback, leave
    /// recording mode (marking targets dirty so validation/rebuild runs).
    fn finalize(&mut self, clip: &mut Clip, cancelled: bool) -> RecorderStatus {
        clip.stop();
        clip.reset();
        self.for_each_selected(clip, |target| target.base_mut().end_recording());
        self.state = RecorderState::Idle;
        if cancelled {
            RecorderStatus::Cancelled
        } else {
            RecorderStatus::Finished
        }
    }

    fn for_each_selected(&self, clip: &mut Clip, mut op: impl FnMut(&mut dyn AnimationTarget)) {
        for name in &self.controllers {
            if let Some(target) = clip.controller_mut(name) {
                op(target);
            }
        }
        for name in &self.float_params {
            if let Some(target) = clip.float_param_mut(name) {
                op(target);
            }
        }
    }
}
