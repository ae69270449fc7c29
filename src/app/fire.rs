//! The particle fire mode.

use glam::Vec2;

use crate::{
    assets::{AssetId, ParticleSettings, Resources},
    canvas::Canvas,
    random,
    sprite::DrawParams,
};

/// A continuously emitting fire made of short-lived particles.
///
/// Alpha, scale, color and speed interpolate from their start to their end
/// value over every particle's randomized lifetime.
pub struct FireMode {
    /// Emitter center in buffer pixels.
    position: Vec2,
    /// Emitter parameters, loaded from the `particles` asset when available.
    settings: ParticleSettings,
    /// Sprite every particle is drawn with.
    sprite: AssetId,
    /// Particles currently alive.
    particles: Vec<Particle>,
    /// Accumulated seconds towards the next spawn.
    spawn_accumulator: f32,
    /// Whether new particles are spawned.
    emitting: bool,
}

/// A single particle instance to draw.
struct Particle {
    /// Position relative to the emitter.
    offset: Vec2,
    /// Unit launch direction.
    direction: Vec2,
    /// Seconds the particle has lived.
    age: f32,
    /// Seconds the particle lives in total.
    lifetime: f32,
}

impl FireMode {
    /// Create an emitting fire at the position.
    #[must_use]
    pub fn new(position: Vec2, sprite: AssetId, settings: ParticleSettings) -> Self {
        Self {
            position,
            settings,
            sprite,
            particles: Vec::new(),
            spawn_accumulator: 0.0,
            emitting: true,
        }
    }

    /// Move the emitter, existing particles travel along.
    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Emitter center in buffer pixels.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Toggle spawning of new particles, existing ones live on.
    #[inline]
    pub fn set_emitting(&mut self, emitting: bool) {
        self.emitting = emitting;
    }

    /// Amount of particles currently alive.
    #[inline]
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Advance all particles and spawn new ones.
    pub fn update(&mut self, delta_time: f32) {
        let [speed_start, speed_end] = self.settings.speed;

        // Age, move and retire the existing particles
        for particle in &mut self.particles {
            particle.age += delta_time;

            let t = (particle.age / particle.lifetime).clamp(0.0, 1.0);
            let speed = lerp(speed_start, speed_end, t);
            particle.offset += particle.direction * speed * delta_time;
        }
        self.particles
            .retain(|particle| particle.age < particle.lifetime);

        if !self.emitting {
            return;
        }

        // Spawn on a fixed interval, with a sane lower bound
        let interval = self.settings.spawn_interval.max(0.001);
        self.spawn_accumulator += delta_time;
        while self.spawn_accumulator >= interval {
            self.spawn_accumulator -= interval;
            self.spawn();
        }
    }

    /// Draw all particles, skipped entirely when the sprite failed to load.
    pub fn draw(&self, canvas: &mut Canvas, resources: &Resources) {
        let Some(sprite) = resources.sprite(&self.sprite) else {
            return;
        };

        let settings = &self.settings;
        for particle in &self.particles {
            let t = (particle.age / particle.lifetime).clamp(0.0, 1.0);

            sprite.draw_with(
                canvas,
                self.position + particle.offset,
                DrawParams {
                    scale: lerp(settings.scale[0], settings.scale[1], t),
                    alpha: lerp(settings.alpha[0], settings.alpha[1], t),
                    tint: [
                        lerp(settings.color_start[0], settings.color_end[0], t),
                        lerp(settings.color_start[1], settings.color_end[1], t),
                        lerp(settings.color_start[2], settings.color_end[2], t),
                    ],
                },
            );
        }
    }

    /// Launch a single particle from the spawn circle.
    fn spawn(&mut self) {
        let settings = &self.settings;

        let angle = random(settings.angle[0], settings.angle[1]).to_radians();
        let direction = Vec2::new(angle.cos(), angle.sin());

        // Uniformly distributed inside the spawn circle
        let jitter_angle = random(0.0, std::f32::consts::TAU);
        let jitter_radius = settings.spawn_radius * fastrand::f32().sqrt();
        let offset = Vec2::new(jitter_angle.cos(), jitter_angle.sin()) * jitter_radius;

        self.particles.push(Particle {
            offset,
            direction,
            age: 0.0,
            lifetime: random(settings.lifetime[0], settings.lifetime[1]),
        });
    }
}

/// Interpolate between two values.
#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use smol_str::SmolStr;

    use super::FireMode;
    use crate::assets::ParticleSettings;

    /// Deterministic settings for the spawn-rate assertions.
    fn settings() -> ParticleSettings {
        ParticleSettings {
            spawn_interval: 0.1,
            lifetime: [1.0, 1.0],
            ..ParticleSettings::default()
        }
    }

    fn fire() -> FireMode {
        FireMode::new(Vec2::new(100.0, 200.0), SmolStr::new("infire"), settings())
    }

    #[test]
    fn spawns_on_the_fixed_interval() {
        let mut fire = fire();

        fire.update(0.05);
        assert_eq!(fire.particle_count(), 0);

        fire.update(0.05);
        assert_eq!(fire.particle_count(), 1);

        // Half a second more means five more particles
        for _ in 0..10 {
            fire.update(0.05);
        }
        assert_eq!(fire.particle_count(), 6);
    }

    #[test]
    fn particles_die_after_their_lifetime() {
        let mut fire = fire();

        fire.update(0.1);
        assert_eq!(fire.particle_count(), 1);

        fire.set_emitting(false);
        fire.update(0.5);
        assert_eq!(fire.particle_count(), 1);

        fire.update(0.6);
        assert_eq!(fire.particle_count(), 0);
    }

    #[test]
    fn stopped_emitter_spawns_nothing() {
        let mut fire = fire();
        fire.set_emitting(false);

        fire.update(5.0);
        assert_eq!(fire.particle_count(), 0);
    }

    #[test]
    fn particles_rise() {
        let mut fire = fire();

        // Spawn a batch and let it travel
        for _ in 0..10 {
            fire.update(0.05);
        }

        // The launch angle spread points upwards, so offsets must not sink
        // (up is negative y in buffer coordinates)
        assert!(fire.particle_count() > 0);
        assert!(fire.particles.iter().all(|particle| particle.direction.y <= 0.0));
    }

    #[test]
    fn moving_the_emitter_keeps_particles_relative() {
        let mut fire = fire();
        fire.update(0.1);

        fire.set_position(Vec2::new(5.0, 5.0));
        assert_eq!(fire.position(), Vec2::new(5.0, 5.0));
    }
}
