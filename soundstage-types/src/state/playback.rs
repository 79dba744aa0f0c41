//! Per-sound transport state.
//!
//! Time is never advanced by a timer. While playing, the current position is
//! derived from the wall clock each time it is read; `now` is always passed in
//! as seconds so the machine stays deterministic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    Paused,
    Playing,
    Scrubbing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub mode: TransportMode,
    /// Held position in seconds. Authoritative unless `mode` is `Playing`.
    pub current_time: f64,
    pub duration: f64,
    /// Wall-clock seconds at which position 0 would have started.
    pub started_at: f64,
    pub paused_at_ms: f64,
}

impl PlaybackState {
    pub fn new(duration: f64) -> Self {
        Self {
            mode: TransportMode::Paused,
            current_time: 0.0,
            duration: duration.max(0.0),
            started_at: 0.0,
            paused_at_ms: 0.0,
        }
    }

    pub fn is_audio_paused(&self) -> bool {
        self.mode != TransportMode::Playing
    }

    pub fn is_scrubbing(&self) -> bool {
        self.mode == TransportMode::Scrubbing
    }

    /// Position at wall-clock `now`.
    pub fn time_at(&self, now: f64) -> f64 {
        match self.mode {
            TransportMode::Playing if self.duration > 0.0 => {
                (now - self.started_at).rem_euclid(self.duration)
            }
            _ => self.current_time,
        }
    }

    /// Copy the derived position into `current_time` for display.
    pub fn refresh(&mut self, now: f64) {
        if self.mode == TransportMode::Playing {
            self.current_time = self.time_at(now);
        }
    }

    /// Paused → Playing. Returns false if already playing or scrubbing.
    pub fn play(&mut self, now: f64) -> bool {
        if self.mode != TransportMode::Paused {
            return false;
        }
        self.started_at = now - self.current_time;
        self.mode = TransportMode::Playing;
        true
    }

    /// Playing → Paused, holding the derived position.
    pub fn pause(&mut self, now: f64) -> bool {
        if self.mode != TransportMode::Playing {
            return false;
        }
        self.current_time = self.time_at(now);
        self.paused_at_ms = self.current_time * 1000.0;
        self.mode = TransportMode::Paused;
        true
    }

    /// Any → Scrubbing, pausing first when playing.
    pub fn begin_scrub(&mut self, now: f64) {
        if self.mode == TransportMode::Playing {
            self.pause(now);
        }
        self.mode = TransportMode::Scrubbing;
    }

    /// Move the held position by `delta` seconds, clamped to `[0, duration]`
    /// and floored to whole seconds. Returns the new position.
    pub fn scrub_by(&mut self, delta: f64) -> f64 {
        let time = (self.current_time + delta).floor().clamp(0.0, self.duration);
        self.current_time = time;
        self.paused_at_ms = time * 1000.0;
        time
    }

    /// Scrubbing → Playing when the user wants playback, otherwise Paused.
    pub fn end_scrub(&mut self, now: f64, user_wants_playing: bool) -> bool {
        if self.mode != TransportMode::Scrubbing {
            return false;
        }
        self.mode = TransportMode::Paused;
        if user_wants_playing {
            self.play(now);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_at(duration: f64, started_at: f64) -> PlaybackState {
        let mut p = PlaybackState::new(duration);
        p.play(started_at);
        p
    }

    #[test]
    fn derived_time_wraps_modulo_duration() {
        let p = playing_at(120.0, 100.0);
        assert!((p.time_at(130.0) - 30.0).abs() < 1e-9);
        assert!((p.time_at(250.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn pause_holds_derived_time() {
        let mut p = playing_at(120.0, 0.0);
        assert!(p.pause(42.5));
        assert!(p.is_audio_paused());
        assert!((p.time_at(1000.0) - 42.5).abs() < 1e-9);
        assert!((p.paused_at_ms - 42_500.0).abs() < 1e-6);
    }

    #[test]
    fn play_resumes_from_held_time() {
        let mut p = PlaybackState::new(60.0);
        p.current_time = 10.0;
        p.play(500.0);
        assert!((p.time_at(505.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn scrub_from_playing_then_resume() {
        let mut p = playing_at(120.0, 0.0);
        p.begin_scrub(30.0);
        assert_eq!(p.mode, TransportMode::Scrubbing);
        assert!((p.current_time - 30.0).abs() < 1e-9);

        let t = p.scrub_by(15.0);
        assert!((t - 45.0).abs() < 1e-9);

        assert!(p.end_scrub(31.0, true));
        assert_eq!(p.mode, TransportMode::Playing);
        assert!((p.time_at(31.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn end_scrub_without_intent_stays_paused() {
        let mut p = playing_at(120.0, 0.0);
        p.begin_scrub(10.0);
        p.end_scrub(12.0, false);
        assert_eq!(p.mode, TransportMode::Paused);
        assert!((p.time_at(99.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn scrub_clamps_to_duration() {
        let mut p = PlaybackState::new(20.0);
        p.begin_scrub(0.0);
        assert_eq!(p.scrub_by(1000.0), 20.0);
        assert_eq!(p.scrub_by(-1000.0), 0.0);
    }

    #[test]
    fn end_scrub_is_noop_outside_scrub() {
        let mut p = PlaybackState::new(20.0);
        assert!(!p.end_scrub(1.0, true));
        assert_eq!(p.mode, TransportMode::Paused);
    }
}
