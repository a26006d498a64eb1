use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Seconds accumulated since the clock started; fed to shaders as `time`.
    pub elapsed: f32,
    pub frame_index: u64,
    /// Frames per second averaged over the last sampling window.
    pub fps: f32,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so that a debugger pause or a minimised window does not
/// throw the camera across the scene on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    elapsed: f32,
    dt_min: Duration,
    dt_max: Duration,
    fps: FpsCounter,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            elapsed: 0.0,
            dt_min,
            dt_max,
            fps: FpsCounter::default(),
        }
    }

    /// Resets the baseline, e.g. after the surface was reconfigured.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();
        self.last = now;
        self.advance(dt)
    }

    fn advance(&mut self, dt: f32) -> FrameTime {
        self.elapsed += dt;
        let fps = self.fps.record(dt);
        let time = FrameTime {
            dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
            fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
struct FpsCounter {
    window: f32,
    frames: u32,
    current: f32,
}

impl FpsCounter {
    const WINDOW: f32 = 0.5;

    fn record(&mut self, dt: f32) -> f32 {
        self.window += dt;
        self.frames += 1;
        if self.window >= Self::WINDOW {
            self.current = self.frames as f32 / self.window;
            self.window = 0.0;
            self.frames = 0;
        }
        self.current
    }
}
