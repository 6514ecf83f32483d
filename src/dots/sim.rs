use crate::dots::model::{Particle, SpawnRanges, Viewport, FALLBACK_DT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Fixed-size set of dots bouncing inside one viewport.
///
/// A seeded field always produces the same initial layout.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    viewport: Viewport,
}

impl ParticleField {
    pub fn new(count: usize, viewport: Viewport, ranges: SpawnRanges, mut rng: StdRng) -> Self {
        let particles = (0..count)
            .map(|_| Particle::spawn(viewport, &ranges, &mut rng))
            .collect();
        Self {
            particles,
            viewport,
        }
    }

    /// Create a field using randomness from the operating system.
    pub fn from_entropy(count: usize, viewport: Viewport, ranges: SpawnRanges) -> Self {
        Self::new(count, viewport, ranges, StdRng::from_entropy())
    }

    /// Create a field with a fixed seed (useful for deterministic tests).
    pub fn from_seed(count: usize, viewport: Viewport, ranges: SpawnRanges, seed: u64) -> Self {
        Self::new(count, viewport, ranges, StdRng::seed_from_u64(seed))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn advance(&mut self, dt: f32) {
        let viewport = self.viewport;
        for particle in &mut self.particles {
            particle.advance(dt, viewport);
        }
    }
}

/// Measures wall-clock time between ticks.
#[derive(Debug, Default)]
pub struct TickClock {
    last: Option<Instant>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick, and any tick where no
    /// time has measurably passed, reports [`FALLBACK_DT`].
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32());
        self.last = Some(now);
        match elapsed {
            Some(dt) if dt > 0.0 => dt,
            _ => FALLBACK_DT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sixty_dots_start_inside_800_by_600() {
        let viewport = Viewport::new(800.0, 600.0);
        let field = ParticleField::from_entropy(60, viewport, SpawnRanges::default());

        assert_eq!(field.len(), 60);
        for p in field.particles() {
            assert!(viewport.contains(p.position), "{:?} outside", p.position);
        }
    }

    #[test]
    fn positions_stay_in_bounds_across_many_ticks() {
        let viewport = Viewport::new(320.0, 200.0);
        let mut field = ParticleField::from_seed(200, viewport, SpawnRanges::default(), 42);

        for step in 0..2_000 {
            let dt = match step % 4 {
                0 => 0.0,
                1 => 0.016,
                2 => 0.25,
                _ => 3.0,
            };
            field.advance(dt);
            for p in field.particles() {
                assert!(viewport.contains(p.position), "{:?} outside", p.position);
            }
        }
    }

    #[test]
    fn advance_preserves_speed() {
        let viewport = Viewport::new(500.0, 500.0);
        let mut field = ParticleField::from_seed(30, viewport, SpawnRanges::default(), 3);
        let speeds: Vec<f32> = field.particles().iter().map(Particle::speed).collect();

        for _ in 0..300 {
            field.advance(0.05);
        }

        for (p, speed) in field.particles().iter().zip(speeds) {
            assert!((p.speed() - speed).abs() < 1e-3);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let viewport = Viewport::new(640.0, 480.0);
        let a = ParticleField::from_seed(10, viewport, SpawnRanges::default(), 99);
        let b = ParticleField::from_seed(10, viewport, SpawnRanges::default(), 99);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn clock_reports_fallback_then_elapsed() {
        let mut clock = TickClock::new();
        let start = Instant::now();

        assert_eq!(clock.tick(start), FALLBACK_DT);
        let dt = clock.tick(start + Duration::from_millis(40));
        assert!((dt - 0.040).abs() < 1e-6);
        assert_eq!(clock.tick(start + Duration::from_millis(40)), FALLBACK_DT);
    }

    #[test]
    fn clock_going_backwards_uses_fallback() {
        let mut clock = TickClock::new();
        let start = Instant::now() + Duration::from_secs(1);
        clock.tick(start);
        assert_eq!(clock.tick(start - Duration::from_millis(10)), FALLBACK_DT);
    }
}
