//! Frame clock producing millisecond ticks

use spark_core::Millis;
use std::time::Instant;

/// Default frame interval in milliseconds (about 30 fps)
pub const DEFAULT_FRAME_INTERVAL: Millis = 33;

/// How the clock advances between ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockMode {
    /// Evenly spaced ticks, one `frame_interval` apart
    #[default]
    Timer,
    /// Ticks follow wall-clock time, so intervals are irregular
    Animation,
}

/// Delivers the increasing tick sequence a particle system is advanced with
pub struct FrameClock {
    /// Time of the next tick to deliver, in milliseconds
    pub current_time: Millis,
    /// Spacing between timer ticks
    pub frame_interval: Millis,
    mode: ClockMode,
    /// Wall-clock time carried over from sub-millisecond frames
    carry: f64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            current_time: 0,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            mode: ClockMode::Timer,
            carry: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    /// Create a timer clock with the default 33ms interval
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer clock with a custom interval (clamped to at least 1ms)
    pub fn with_interval(frame_interval: Millis) -> Self {
        Self {
            frame_interval: frame_interval.max(1),
            ..Self::default()
        }
    }

    /// Create a timer clock ticking at roughly `fps` frames per second
    pub fn with_fps(fps: f64) -> Self {
        Self::with_interval(interval_for_fps(fps))
    }

    /// Create a clock that follows wall-clock time
    pub fn animation() -> Self {
        Self {
            mode: ClockMode::Animation,
            ..Self::default()
        }
    }

    /// Start delivering ticks from `time` instead of zero
    pub fn starting_at(mut self, time: Millis) -> Self {
        self.current_time = time;
        self
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Produce the next tick.
    ///
    /// Timer mode returns the current time and then advances it by one
    /// interval. Animation mode returns the start time on the first call and
    /// afterwards adds the real time elapsed since the previous call.
    pub fn tick(&mut self) -> Millis {
        match self.mode {
            ClockMode::Timer => {
                let tick = self.current_time;
                self.current_time += self.frame_interval;
                tick
            }
            ClockMode::Animation => {
                let now = Instant::now();
                if self.first_tick {
                    self.first_tick = false;
                    self.last_instant = now;
                    return self.current_time;
                }
                let elapsed = now.duration_since(self.last_instant).as_secs_f64() * 1000.0;
                self.last_instant = now;
                self.advance_fractional(elapsed)
            }
        }
    }

    /// Advance by an explicit delta and return the new time.
    /// Used by hosts that measure frame time themselves.
    pub fn advance(&mut self, delta: Millis) -> Millis {
        self.current_time += delta;
        self.current_time
    }

    fn advance_fractional(&mut self, elapsed_ms: f64) -> Millis {
        self.carry += elapsed_ms;
        let whole = self.carry.floor();
        self.carry -= whole;
        self.current_time += whole as Millis;
        self.current_time
    }
}

/// Frame interval for a target frame rate, rounded to whole milliseconds
pub fn interval_for_fps(fps: f64) -> Millis {
    if fps <= 0.0 {
        return DEFAULT_FRAME_INTERVAL;
    }
    ((1000.0 / fps).round() as Millis).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_interval, DEFAULT_FRAME_INTERVAL);
        assert_eq!(clock.current_time, 0);
        assert_eq!(clock.mode(), ClockMode::Timer);
    }

    #[test]
    fn test_timer_ticks_evenly() {
        let mut clock = FrameClock::with_interval(10).starting_at(500);
        assert_eq!(clock.tick(), 500);
        assert_eq!(clock.tick(), 510);
        assert_eq!(clock.tick(), 520);
    }

    #[test]
    fn test_fps_interval() {
        assert_eq!(FrameClock::with_fps(30.0).frame_interval, 33);
        assert_eq!(FrameClock::with_fps(60.0).frame_interval, 17);
        assert_eq!(FrameClock::with_fps(0.0).frame_interval, DEFAULT_FRAME_INTERVAL);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let clock = FrameClock::with_interval(0);
        assert_eq!(clock.frame_interval, 1);
    }

    #[test]
    fn test_animation_first_tick_is_start() {
        let mut clock = FrameClock::animation().starting_at(40);
        assert_eq!(clock.tick(), 40);
        assert!(clock.tick() >= 40);
    }

    #[test]
    fn test_fractional_carry() {
        let mut clock = FrameClock::animation();
        assert_eq!(clock.advance_fractional(0.6), 0);
        assert_eq!(clock.advance_fractional(0.6), 1);
        assert_eq!(clock.advance_fractional(2.0), 3);
    }

    #[test]
    fn test_manual_advance() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(250), 250);
        assert_eq!(clock.advance(1), 251);
    }
}
