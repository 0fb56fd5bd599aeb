//! Pure mapping from progress to rendering parameters.
use bevy::{color::Color, math::Vec3};

use super::tiers::ObjectTier;

pub const BACKGROUND_HUE: f32 = 120.0;
pub const BACKGROUND_SATURATION: f32 = 0.5;
const AURA_MIN_STREAK: f32 = 3.0;
const AURA_HIGH_STREAK: f32 = 10.0;

/// Aura colour band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuraColorTier {
    #[default]
    Low,
    High,
}

impl AuraColorTier {
    pub fn color(self) -> Color {
        match self {
            // #60a5fa
            Self::Low => Color::srgb_u8(0x60, 0xa5, 0xfa),
            // #34d399
            Self::High => Color::srgb_u8(0x34, 0xd3, 0x99),
        }
    }
}

/// Everything the scene needs to render a given progress snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualParameters {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    /// Height of the sun target at `(100, elevation, 100)`.
    pub sun_elevation: f32,
    pub sky_turbidity: f32,
    pub background_hue: f32,
    pub background_lightness: f32,
    pub aura_visible: bool,
    pub aura_color_tier: AuraColorTier,
    pub aura_particle_size: f32,
    pub unlocked_tiers: Vec<ObjectTier>,
}

/// Treats negative and non-finite readings as zero.
fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl VisualParameters {
    pub fn from_progress(xp: f32, streak: f32) -> Self {
        let xp = sanitize(xp);
        let streak = sanitize(streak);
        let aura_color_tier = if streak > AURA_HIGH_STREAK {
            AuraColorTier::High
        } else {
            AuraColorTier::Low
        };

        Self {
            ambient_intensity: 0.6 + (xp / 500.0).min(0.8),
            directional_intensity: 1.0 + (xp / 400.0).min(0.5),
            sun_elevation: 10.0 + (xp / 100.0).min(40.0),
            sky_turbidity: 8.0 - (xp / 200.0).min(4.0),
            background_hue: BACKGROUND_HUE,
            background_lightness: 0.35 + (xp / 1000.0).min(0.4),
            aura_visible: streak >= AURA_MIN_STREAK,
            aura_color_tier,
            aura_particle_size: 0.06 + (streak / 100.0).min(0.05),
            // Float-to-int casts saturate, so huge xp still unlocks everything.
            unlocked_tiers: ObjectTier::unlocked_at(xp as u32),
        }
    }

    pub fn for_snapshot(xp: u32, streak: u32) -> Self {
        Self::from_progress(xp as f32, streak as f32)
    }

    pub fn background_color(&self) -> Color {
        Color::hsl(
            self.background_hue,
            BACKGROUND_SATURATION,
            self.background_lightness,
        )
    }

    /// Sky dome tint: a hazier sky is greyer, a higher sun is brighter.
    pub fn sky_color(&self) -> Color {
        let saturation = (0.95 - self.sky_turbidity * 0.08).clamp(0.0, 1.0);
        let lightness = (0.45 + self.sun_elevation / 125.0).clamp(0.0, 0.9);
        Color::hsl(205.0, saturation, lightness)
    }

    /// Unit vector from the origin towards the sun.
    pub fn sun_direction(&self) -> Vec3 {
        Vec3::new(100.0, self.sun_elevation, 100.0).normalize()
    }

    pub fn is_unlocked(&self, tier: ObjectTier) -> bool {
        self.unlocked_tiers.contains(&tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn zero_progress_is_the_baseline_world() {
        let params = VisualParameters::for_snapshot(0, 0);
        assert!(close(params.ambient_intensity, 0.6));
        assert!(close(params.directional_intensity, 1.0));
        assert!(close(params.sun_elevation, 10.0));
        assert!(close(params.sky_turbidity, 8.0));
        assert!(close(params.background_lightness, 0.35));
        assert!(!params.aura_visible);
        assert!(params.unlocked_tiers.is_empty());
        assert!(close(params.aura_particle_size, 0.06));
    }

    #[test]
    fn high_progress_hits_every_cap() {
        let params = VisualParameters::for_snapshot(1000, 15);
        assert!(close(params.ambient_intensity, 1.4));
        assert!(close(params.directional_intensity, 1.5));
        assert!(close(params.sun_elevation, 50.0));
        assert!(close(params.sky_turbidity, 4.0));
        assert!(close(params.background_lightness, 0.75));
        assert!(params.aura_visible);
        assert_eq!(params.aura_color_tier, AuraColorTier::High);
        assert_eq!(params.unlocked_tiers, ObjectTier::ALL.to_vec());
        assert!(close(params.aura_particle_size, 0.11));
    }

    #[test]
    fn aura_streak_boundaries() {
        assert!(!VisualParameters::for_snapshot(0, 2).aura_visible);
        let at_three = VisualParameters::for_snapshot(0, 3);
        assert!(at_three.aura_visible);
        assert_eq!(at_three.aura_color_tier, AuraColorTier::Low);
        assert_eq!(
            VisualParameters::for_snapshot(0, 10).aura_color_tier,
            AuraColorTier::Low
        );
        assert_eq!(
            VisualParameters::for_snapshot(0, 11).aura_color_tier,
            AuraColorTier::High
        );
    }

    #[test]
    fn bad_inputs_clamp_to_zero() {
        let baseline = VisualParameters::for_snapshot(0, 0);
        assert_eq!(VisualParameters::from_progress(-40.0, -2.0), baseline);
        assert_eq!(VisualParameters::from_progress(f32::NAN, f32::INFINITY), baseline);
    }

    #[test]
    fn more_xp_never_dims_or_hides_anything() {
        let mut previous = VisualParameters::for_snapshot(0, 5);
        for xp in (0..=1200).step_by(7) {
            let next = VisualParameters::for_snapshot(xp, 5);
            assert!(next.ambient_intensity >= previous.ambient_intensity);
            assert!(next.directional_intensity >= previous.directional_intensity);
            assert!(next.sun_elevation >= previous.sun_elevation);
            assert!(next.sky_turbidity <= previous.sky_turbidity);
            assert!(next.background_lightness >= previous.background_lightness);
            assert!(previous
                .unlocked_tiers
                .iter()
                .all(|tier| next.unlocked_tiers.contains(tier)));
            previous = next;
        }
    }
}
