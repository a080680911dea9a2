use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Wall-clock accumulator that turns variable frame times into fixed ticks.
pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
}

impl TimeState {
    pub fn new(tick_rate: u32) -> Self {
        let fixed_dt = 1.0 / f64::from(tick_rate.max(1));
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: f64::from(tick_rate.max(1)),
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Monotonic simulation clock in integer microseconds.
///
/// Advances by exactly one tick length per fixed step and never reads the wall
/// clock, so cooldowns measured against it replay identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    tick_us: u64,
    now_us: u64,
}

impl SimClock {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_us: 1_000_000 / u64::from(tick_rate.max(1)),
            now_us: 0,
        }
    }

    pub fn advance(&mut self) {
        self.now_us += self.tick_us;
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn tick_us(&self) -> u64 {
        self.tick_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_clock_advances_by_tick_length() {
        let mut clock = SimClock::new(60);
        assert_eq!(clock.tick_us(), 16_666);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now_us(), 33_332);
    }

    #[test]
    fn should_step_consumes_whole_ticks_only() {
        let mut time = TimeState::new(60);
        time.accumulator = time.fixed_dt * 2.5;
        assert!(time.should_step());
        assert!(time.should_step());
        assert!(!time.should_step());
        assert_eq!(time.fixed_step_count, 2);
        assert_eq!(time.steps_this_frame, 2);
    }

    #[test]
    fn zero_tick_rate_is_treated_as_one() {
        let time = TimeState::new(0);
        assert_eq!(time.fixed_dt, 1.0);
        assert_eq!(SimClock::new(0).tick_us(), 1_000_000);
    }
}
