//! World tunables loaded from `config/world.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/world.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawWorldConfig {
    #[serde(default)]
    lighting: RawLightingSection,
    #[serde(default)]
    fog: RawFogSection,
    #[serde(default)]
    camera: RawCameraSection,
    #[serde(default)]
    aura: RawAuraSection,
    #[serde(default)]
    placement: RawPlacementSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLightingSection {
    ambient_brightness_per_unit: f32,
    directional_lux_per_unit: f32,
}

impl Default for RawLightingSection {
    fn default() -> Self {
        Self {
            ambient_brightness_per_unit: 400.0,
            directional_lux_per_unit: 6_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawFogSection {
    color: [u8; 3],
    start: f32,
    end: f32,
}

impl Default for RawFogSection {
    fn default() -> Self {
        Self {
            color: [0x0f, 0x17, 0x2a],
            start: 10.0,
            end: 35.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawCameraSection {
    fov_degrees: f32,
    offset: [f32; 3],
    follow_factor: f32,
}

impl Default for RawCameraSection {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            offset: [0.0, 3.0, 6.0],
            follow_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawAuraSection {
    particle_count: usize,
    spin_speed: f32,
    float_speed: f32,
    float_height: f32,
}

impl Default for RawAuraSection {
    fn default() -> Self {
        Self {
            particle_count: 250,
            spin_speed: 0.15,
            float_speed: 1.0,
            float_height: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPlacementSection {
    seed: Option<u64>,
}

/// Rendering tunables that are not part of the progress mapping.
#[derive(Resource, Debug, Clone)]
pub struct WorldSettings {
    pub ambient_brightness_per_unit: f32,
    pub directional_lux_per_unit: f32,
    pub fog_color: Color,
    pub fog_start: f32,
    pub fog_end: f32,
    pub camera_fov: f32,
    pub camera_offset: Vec3,
    /// Fraction of the remaining distance the camera covers each frame.
    pub camera_follow_factor: f32,
    pub aura_particle_count: usize,
    pub aura_spin_speed: f32,
    pub aura_float_speed: f32,
    pub aura_float_height: f32,
    /// Fixed scatter seed; `None` scatters differently on every mount.
    pub placement_seed: Option<u64>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        RawWorldConfig::default().into()
    }
}

impl WorldSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml(&data).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawWorldConfig>(data).map(Self::from)
    }
}

impl From<RawWorldConfig> for WorldSettings {
    fn from(value: RawWorldConfig) -> Self {
        let lighting = value.lighting;
        let fog = value.fog;
        let camera = value.camera;
        let aura = value.aura;

        let fog_start = fog.start.max(0.0);
        Self {
            ambient_brightness_per_unit: lighting.ambient_brightness_per_unit.max(0.0),
            directional_lux_per_unit: lighting.directional_lux_per_unit.max(0.0),
            fog_color: Color::srgb_u8(fog.color[0], fog.color[1], fog.color[2]),
            fog_start,
            fog_end: fog.end.max(fog_start),
            camera_fov: camera.fov_degrees.clamp(10.0, 120.0).to_radians(),
            camera_offset: Vec3::from_array(camera.offset),
            camera_follow_factor: camera.follow_factor.clamp(0.0, 1.0),
            aura_particle_count: aura.particle_count,
            aura_spin_speed: aura.spin_speed,
            aura_float_speed: aura.float_speed.max(0.0),
            aura_float_height: aura.float_height.max(0.0),
            placement_seed: value.placement.seed,
        }
    }
}
