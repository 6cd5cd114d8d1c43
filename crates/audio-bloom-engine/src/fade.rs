//! Stop transition: opacity ramps from 1 to 0 over a fixed duration.

use std::time::{Duration, Instant};

pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeState {
    /// Normal rendering
    Idle,
    /// Stop was requested at `started_at`
    FadingOut { started_at: Instant },
}

pub struct FadeController {
    state: FadeState,
    duration: Duration,
}

impl Default for FadeController {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_DURATION)
    }
}

impl FadeController {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: FadeState::Idle,
            duration,
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.state, FadeState::FadingOut { .. })
    }

    /// Begin fading at `now`. A fade already in flight keeps its start time.
    pub fn request_stop(&mut self, now: Instant) {
        if let FadeState::Idle = self.state {
            self.state = FadeState::FadingOut { started_at: now };
        }
    }

    /// Opacity multiplier at `now` and whether the fade has finished.
    ///
    /// Once finished the controller is back to `Idle`; the caller is expected
    /// to tear down the frame loop when `done` is true.
    pub fn current_alpha(&mut self, now: Instant) -> (f32, bool) {
        let started_at = match self.state {
            FadeState::Idle => return (1.0, false),
            FadeState::FadingOut { started_at } => started_at,
        };

        let alpha = if self.duration.is_zero() {
            0.0
        } else {
            let elapsed = now.saturating_duration_since(started_at);
            (1.0 - elapsed.as_secs_f32() / self.duration.as_secs_f32()).max(0.0)
        };

        let done = alpha <= 0.0;
        if done {
            self.state = FadeState::Idle;
        }
        (alpha, done)
    }

    /// Force `Idle`, abandoning any fade in flight
    pub fn reset(&mut self) {
        self.state = FadeState::Idle;
    }
}
