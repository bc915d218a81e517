//! Show/hide slide animation.
//!
//! A single progress value in `[0, 1]` (0 = hidden, 1 = shown) moves toward
//! one of two targets. Asking for the current direction again is a no-op;
//! asking for the other direction reverses in place from wherever the value
//! is, and the remaining time shrinks with the remaining distance.
//!
//! The animation never calls back. The owner steps it with
//! [`SlideAnimation::step`] and reacts to the returned [`AnimationTick`].

use std::time::{Duration, Instant};

/// Interval between animation frames, roughly 60 fps.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const HIDDEN: f64 = 0.0;
const SHOWN: f64 = 1.0;

/// Which transition the controller has requested, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    None,
    ShowingUi,
    HidingUi,
}

/// Outcome of starting or stepping an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationTick {
    /// Nothing to report.
    Idle,
    /// Value moved but the target is not reached yet.
    Progressed(f64),
    /// Target reached; carries the final value.
    Ended(f64),
}

#[derive(Debug, Clone, Copy)]
struct Run {
    from: f64,
    started_at: Instant,
    span: Duration,
    last_frame: Instant,
}

#[derive(Debug, Clone)]
pub struct SlideAnimation {
    duration: Duration,
    value: f64,
    target: f64,
    run: Option<Run>,
}

impl SlideAnimation {
    pub fn new(duration: Duration, initial_value: f64) -> Self {
        let value = initial_value.clamp(HIDDEN, SHOWN);
        Self {
            duration,
            value,
            target: value,
            run: None,
        }
    }

    /// Applies to the next run; a run in flight keeps its span.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Value as of the last start or step.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.run.is_some()
    }

    /// True when the current (or last) direction is toward shown.
    pub fn is_showing(&self) -> bool {
        self.target == SHOWN
    }

    pub fn show(&mut self, now: Instant) -> AnimationTick {
        self.animate_to(SHOWN, now)
    }

    pub fn hide(&mut self, now: Instant) -> AnimationTick {
        self.animate_to(HIDDEN, now)
    }

    fn animate_to(&mut self, target: f64, now: Instant) -> AnimationTick {
        if self.run.is_some() && self.target == target {
            return AnimationTick::Idle;
        }

        let from = self.value_at(now);
        self.target = target;
        self.value = from;

        let distance = (target - from).abs();
        if distance <= f64::EPSILON || self.duration.is_zero() {
            self.value = target;
            self.run = None;
            return AnimationTick::Ended(target);
        }

        self.run = Some(Run {
            from,
            started_at: now,
            span: if distance >= SHOWN {
                self.duration
            } else {
                self.duration.mul_f64(distance)
            },
            last_frame: now,
        });
        AnimationTick::Progressed(from)
    }

    /// Advances to `now`.
    pub fn step(&mut self, now: Instant) -> AnimationTick {
        let Some(run) = self.run.as_mut() else {
            return AnimationTick::Idle;
        };
        run.last_frame = now;

        self.value = self.value_at(now);
        if self.value == self.target {
            self.run = None;
            AnimationTick::Ended(self.value)
        } else {
            AnimationTick::Progressed(self.value)
        }
    }

    /// Jumps straight to the target.
    pub fn end(&mut self) {
        self.value = self.target;
        self.run = None;
    }

    /// Stops any run and parks the value.
    pub fn reset(&mut self, value: f64) {
        self.value = value.clamp(HIDDEN, SHOWN);
        self.target = self.value;
        self.run = None;
    }

    /// When the next frame is due, if a run is in flight.
    pub fn next_frame_at(&self) -> Option<Instant> {
        self.run.map(|run| {
            let end = run.started_at + run.span;
            (run.last_frame + FRAME_INTERVAL).min(end)
        })
    }

    fn value_at(&self, now: Instant) -> f64 {
        let Some(run) = self.run else {
            return self.value;
        };

        let elapsed = now.saturating_duration_since(run.started_at);
        if elapsed >= run.span {
            return self.target;
        }

        let t = elapsed.as_secs_f64() / run.span.as_secs_f64();
        run.from + (self.target - run.from) * ease_in_out(t)
    }
}

fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
