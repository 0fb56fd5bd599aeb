//! Streak aura: a slowly spinning, floating ring of particles.
use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

const RING_INNER_RADIUS: f32 = 1.0;
const RING_OUTER_RADIUS: f32 = 1.6;
const RING_MAX_HEIGHT: f32 = 0.8;
const FLOAT_TILT: f32 = 0.1;

/// Root of the aura ring; particles are its children.
#[derive(Component, Debug, Default)]
pub struct AuraRing {
    spin: f32,
    phase: f32,
}

impl AuraRing {
    /// Advances spin and float phase, returning the ring's local transform.
    pub fn advance(
        &mut self,
        delta_secs: f32,
        spin_speed: f32,
        float_speed: f32,
        float_height: f32,
    ) -> Transform {
        self.spin = (self.spin + delta_secs * spin_speed) % TAU;
        self.phase = (self.phase + delta_secs * float_speed) % TAU;
        let tilt = Quat::from_rotation_z(self.phase.cos() * FLOAT_TILT);
        Transform::from_translation(Vec3::Y * (self.phase.sin() * float_height))
            .with_rotation(Quat::from_rotation_y(self.spin) * tilt)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn spin(&self) -> f32 {
        self.spin
    }
}

#[derive(Component, Debug)]
pub struct AuraParticle;

/// Particle offsets on a ring around the origin.
pub fn ring_offsets(count: usize, rng: &mut impl Rng) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let radius = rng.random_range(RING_INNER_RADIUS..RING_OUTER_RADIUS);
            let angle = rng.random_range(0.0..TAU);
            let height = rng.random_range(0.0..RING_MAX_HEIGHT);
            Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn offsets_lie_on_the_ring() {
        let offsets = ring_offsets(250, &mut StdRng::seed_from_u64(9));
        assert_eq!(offsets.len(), 250);
        for offset in offsets {
            let radius = Vec2::new(offset.x, offset.z).length();
            assert!(radius >= RING_INNER_RADIUS - 1e-4 && radius < RING_OUTER_RADIUS + 1e-4);
            assert!((0.0..RING_MAX_HEIGHT).contains(&offset.y));
        }
    }

    #[test]
    fn ring_spins_at_the_configured_rate() {
        let mut ring = AuraRing::default();
        ring.advance(2.0, 0.15, 1.0, 0.1);
        assert!((ring.spin() - 0.3).abs() < 1e-6);

        let still = ring.advance(0.0, 0.15, 0.0, 0.0);
        assert_eq!(still.translation, Vec3::ZERO);
    }
}
