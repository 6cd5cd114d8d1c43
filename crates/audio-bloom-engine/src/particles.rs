//! Band-driven particle field.
//!
//! Each frame, louder bands spawn more ring-shaped particles clustered
//! around the surface center. Particles fade over a fixed lifetime and are
//! evicted in the same pass that draws them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::{Band, BandAverages, Extent, Rgba, Surface};

/// Tunables for spawning and drawing particles
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSettings {
    /// How long each particle lives
    pub lifetime: Duration,
    /// One particle per this much band amplitude (0-255 scale)
    pub spawn_divisor: f32,
    /// Peak opacity of a freshly spawned particle
    pub opacity: f32,
    /// Radius at zero amplitude
    pub min_radius: f32,
    /// Extra radius at full (255) amplitude
    pub radius_span: f32,
    /// Outline thickness
    pub stroke_weight: f32,
    /// Uniform draws averaged per axis; more draws cluster tighter
    pub center_draws: u32,
    /// Color per band, indexed by [`Band::index`]
    pub palette: [Rgba; 3],
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_millis(1500),
            spawn_divisor: 60.0,
            opacity: 0.3,
            min_radius: 2.0,
            radius_span: 6.0,
            stroke_weight: 2.0,
            center_draws: 6,
            palette: [
                Rgba::rgb8(0x44, 0x01, 0x54, 1.0),
                Rgba::rgb8(0x21, 0x91, 0x8c, 1.0),
                Rgba::rgb8(0xfd, 0xe7, 0x25, 1.0),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position in surface pixels
    pub x: f32,
    pub y: f32,
    /// Always > 0
    pub radius: f32,
    pub band: Band,
    pub color: Rgba,
    pub created_at: Instant,
    pub lifetime: Duration,
}

impl Particle {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// A particle at exactly `age == lifetime` is still alive
    pub fn is_expired(&self, now: Instant) -> bool {
        self.age(now) > self.lifetime
    }

    /// Remaining opacity fraction, 1.0 at spawn down to 0.0 at end of life
    pub fn life_fraction(&self, now: Instant) -> f32 {
        if self.lifetime.is_zero() {
            return 0.0;
        }
        (1.0 - self.age(now).as_secs_f32() / self.lifetime.as_secs_f32()).clamp(0.0, 1.0)
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    settings: ParticleSettings,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(settings: ParticleSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Deterministic placement, for reproducible output
    pub fn with_seed(settings: ParticleSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: ParticleSettings, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            settings,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles a band average produces in one frame
    pub fn spawn_count(&self, amplitude: f32) -> usize {
        if !amplitude.is_finite() || amplitude <= 0.0 || self.settings.spawn_divisor <= 0.0 {
            return 0;
        }
        // At most 255 per band per frame
        (amplitude.min(255.0) / self.settings.spawn_divisor.max(1.0)).floor() as usize
    }

    /// Radius for a band amplitude on the 0-255 scale
    pub fn radius_for(&self, amplitude: f32) -> f32 {
        let amplitude = amplitude.clamp(0.0, 255.0);
        self.settings.min_radius + (amplitude / 255.0) * self.settings.radius_span
    }

    /// Spawn `floor(average / spawn_divisor)` particles per band.
    /// There is no cap; lifetime expiry is the only limit on live count.
    /// Returns how many particles were added.
    pub fn spawn(&mut self, bands: &BandAverages, extent: Extent, now: Instant) -> usize {
        let mut spawned = 0;

        for band in Band::ALL {
            let amplitude = bands.get(band);
            let count = self.spawn_count(amplitude);
            if count == 0 {
                continue;
            }

            let radius = self.radius_for(amplitude);
            let color = self.settings.palette[band.index()];
            self.particles.reserve(count);

            for _ in 0..count {
                let x = self.center_weighted() * extent.width;
                let y = self.center_weighted() * extent.height;
                self.particles.push(Particle {
                    x,
                    y,
                    radius,
                    band,
                    color,
                    created_at: now,
                    lifetime: self.settings.lifetime,
                });
            }
            spawned += count;
        }

        spawned
    }

    /// Evict expired particles and stroke the survivors in one in-place pass.
    /// Returns the number of survivors.
    pub fn age_and_render<S: Surface + ?Sized>(
        &mut self,
        now: Instant,
        fade_alpha: f32,
        surface: &mut S,
    ) -> usize {
        let Self {
            particles,
            settings,
            ..
        } = self;

        particles.retain(|p| {
            if p.is_expired(now) {
                return false;
            }
            let alpha = p.life_fraction(now) * settings.opacity * fade_alpha;
            surface.stroke_circle(
                p.x,
                p.y,
                p.radius,
                settings.stroke_weight,
                p.color.with_alpha(alpha.clamp(0.0, 1.0)),
            );
            true
        });

        particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Mean of several uniform draws in [0, 1): a soft bell around 0.5
    fn center_weighted(&mut self) -> f32 {
        let draws = self.settings.center_draws.max(1);
        let total: f32 = (0..draws).map(|_| self.rng.random::<f32>()).sum();
        total / draws as f32
    }
}
