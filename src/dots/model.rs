use rand::Rng;
use std::f32::consts::TAU;

pub const DEFAULT_DOT_COUNT: usize = 60;
pub const DEFAULT_SPEED_RANGE: (f32, f32) = (10.0, 120.0);
pub const DEFAULT_RADIUS_RANGE: (f32, f32) = (3.0, 9.0);
pub const DEFAULT_OPACITY_RANGE: (f32, f32) = (0.25, 0.9);

/// Substituted for a non-positive or missing frame delta, in seconds.
pub const FALLBACK_DT: f32 = 0.016;

/// Simulation bounds in window-local points. The origin is always `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: (f32, f32)) -> bool {
        (0.0..=self.width).contains(&point.0) && (0.0..=self.height).contains(&point.1)
    }
}

/// Inclusive sampling ranges used when a particle is (re)spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRanges {
    pub speed: (f32, f32),
    pub radius: (f32, f32),
    pub opacity: (f32, f32),
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED_RANGE,
            radius: DEFAULT_RADIUS_RANGE,
            opacity: DEFAULT_OPACITY_RANGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: (f32, f32),
    pub velocity: (f32, f32),
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(viewport: Viewport, ranges: &SpawnRanges, rng: &mut R) -> Self {
        let mut particle = Self::default();
        particle.reset(viewport, ranges, rng);
        particle
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, viewport: Viewport, ranges: &SpawnRanges, rng: &mut R) {
        self.position = (
            rng.gen_range(0.0..=viewport.width.max(0.0)),
            rng.gen_range(0.0..=viewport.height.max(0.0)),
        );
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(ranges.speed.0..=ranges.speed.1);
        self.velocity = (speed * angle.cos(), speed * angle.sin());
        self.radius = rng.gen_range(ranges.radius.0..=ranges.radius.1);
        self.opacity = rng.gen_range(ranges.opacity.0..=ranges.opacity.1);
    }

    /// Moves the particle by `velocity * dt` and bounces it off the viewport
    /// edges, one axis at a time.
    ///
    /// `dt == 0.0` leaves the particle untouched. Negative or non-finite values
    /// are replaced with [`FALLBACK_DT`].
    pub fn advance(&mut self, dt: f32, viewport: Viewport) {
        let dt = effective_dt(dt);
        if dt == 0.0 {
            return;
        }

        self.position.0 += self.velocity.0 * dt;
        self.position.1 += self.velocity.1 * dt;

        bounce_axis(&mut self.position.0, &mut self.velocity.0, viewport.width);
        bounce_axis(&mut self.position.1, &mut self.velocity.1, viewport.height);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.0.hypot(self.velocity.1)
    }

    pub fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0) as u8
    }
}

pub fn effective_dt(dt: f32) -> f32 {
    if dt == 0.0 {
        0.0
    } else if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        FALLBACK_DT
    }
}

fn bounce_axis(position: &mut f32, velocity: &mut f32, extent: f32) {
    if *position < 0.0 {
        *position = 0.0;
        *velocity = -*velocity;
    }
    if *position > extent {
        *position = extent;
        *velocity = -*velocity;
    }
}
