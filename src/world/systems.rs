//! Systems that build the world scene and keep it in step with progress.
use bevy::{asset::LoadState, prelude::*};

use crate::core::{plugin::FrameClock, state::AppScreen};
use crate::progress::snapshot::ProgressSnapshot;

use super::{
    aura::{ring_offsets, AuraParticle, AuraRing},
    components::{
        CurrentVisuals, DecorInstance, FadeMaterial, Ground, SkyDome, SunDisc, TierGroup,
        WorldCamera, WorldSun,
    },
    entrance::EntranceAnimation,
    placement::{scatter, PlacementRng, GROUND_Y},
    settings::WorldSettings,
    tiers::ObjectTier,
    visuals::VisualParameters,
};

const GROUND_SIZE: f32 = 20.0;
const SUN_POSITION: Vec3 = Vec3::new(5.0, 10.0, 5.0);
const SKY_RADIUS: f32 = 80.0;
const SUN_DISC_RADIUS: f32 = 3.0;
const SUN_DISC_DISTANCE: f32 = SKY_RADIUS * 0.9;

/// Material shared by every aura particle.
#[derive(Resource)]
pub struct AuraAssets {
    material: Handle<StandardMaterial>,
}

/// Spawns the static scene: camera, lights, ground, sky, and the aura ring.
pub fn spawn_world_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<PlacementRng>,
    settings: Res<WorldSettings>,
    snapshot: Res<ProgressSnapshot>,
) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: settings.camera_fov,
            ..default()
        }),
        Transform::from_translation(settings.camera_offset).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: settings.fog_color,
            falloff: FogFalloff::Linear {
                start: settings.fog_start,
                end: settings.fog_end,
            },
            ..default()
        },
        WorldCamera,
        DespawnOnExit(AppScreen::World),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        WorldSun,
        DespawnOnExit(AppScreen::World),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            // #ab8c51
            base_color: Color::srgb_u8(0xab, 0x8c, 0x51),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_Y, 0.0),
        Ground,
        DespawnOnExit(AppScreen::World),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(SKY_RADIUS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            unlit: true,
            cull_mode: None,
            fog_enabled: false,
            ..default()
        })),
        Transform::default(),
        SkyDome,
        DespawnOnExit(AppScreen::World),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(SUN_DISC_RADIUS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.96, 0.84),
            unlit: true,
            fog_enabled: false,
            ..default()
        })),
        Transform::default(),
        SunDisc,
        DespawnOnExit(AppScreen::World),
    ));

    let particle_mesh = meshes.add(Sphere::new(1.0));
    let particle_material = materials.add(StandardMaterial {
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let offsets = ring_offsets(settings.aura_particle_count, &mut rng.0);
    commands
        .spawn((
            Transform::default(),
            Visibility::Hidden,
            AuraRing::default(),
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|ring| {
            for offset in offsets {
                ring.spawn((
                    Mesh3d(particle_mesh.clone()),
                    MeshMaterial3d(particle_material.clone()),
                    Transform::from_translation(offset),
                    AuraParticle,
                ));
            }
        });
    commands.insert_resource(AuraAssets {
        material: particle_material,
    });

    let visuals = VisualParameters::for_snapshot(snapshot.xp, snapshot.streak);
    info!(
        target: "world",
        "World mounted: xp={} streak={} tiers={:?}",
        snapshot.xp, snapshot.streak, visuals.unlocked_tiers
    );
    commands.insert_resource(CurrentVisuals(visuals));
}

pub fn release_world_resources(mut commands: Commands) {
    commands.remove_resource::<CurrentVisuals>();
    commands.remove_resource::<AuraAssets>();
}

/// Re-derives the visual parameters whenever the snapshot changes.
pub fn derive_visual_parameters(
    snapshot: Res<ProgressSnapshot>,
    mut visuals: ResMut<CurrentVisuals>,
) {
    if snapshot.is_changed() {
        visuals.set_if_neq(CurrentVisuals(VisualParameters::for_snapshot(
            snapshot.xp,
            snapshot.streak,
        )));
    }
}

pub fn apply_lighting(
    visuals: Res<CurrentVisuals>,
    settings: Res<WorldSettings>,
    mut ambient: ResMut<AmbientLight>,
    mut clear_color: ResMut<ClearColor>,
    mut suns: Query<&mut DirectionalLight, With<WorldSun>>,
) {
    let params = &visuals.0;
    ambient.color = Color::WHITE;
    ambient.brightness = params.ambient_intensity * settings.ambient_brightness_per_unit;
    clear_color.0 = params.background_color();
    for mut light in suns.iter_mut() {
        light.illuminance = params.directional_intensity * settings.directional_lux_per_unit;
    }
}

pub fn apply_sky(
    visuals: Res<CurrentVisuals>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    domes: Query<&MeshMaterial3d<StandardMaterial>, With<SkyDome>>,
    mut discs: Query<&mut Transform, With<SunDisc>>,
) {
    let params = &visuals.0;
    for dome in domes.iter() {
        if let Some(material) = materials.get_mut(&dome.0) {
            material.base_color = params.sky_color();
        }
    }
    for mut transform in discs.iter_mut() {
        transform.translation = params.sun_direction() * SUN_DISC_DISTANCE;
    }
}

pub fn apply_aura(
    visuals: Res<CurrentVisuals>,
    assets: Res<AuraAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rings: Query<&mut Visibility, With<AuraRing>>,
    mut particles: Query<&mut Transform, With<AuraParticle>>,
) {
    let params = &visuals.0;
    for mut visibility in rings.iter_mut() {
        *visibility = if params.aura_visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
    if let Some(material) = materials.get_mut(&assets.material) {
        material.base_color = params.aura_color_tier.color().with_alpha(0.85);
    }
    for mut transform in particles.iter_mut() {
        transform.scale = Vec3::splat(params.aura_particle_size);
    }
}

pub fn animate_aura(
    clock: Res<FrameClock>,
    settings: Res<WorldSettings>,
    mut rings: Query<(&mut AuraRing, &mut Transform)>,
) {
    let delta = clock.delta_secs();
    for (mut ring, mut transform) in rings.iter_mut() {
        *transform = ring.advance(
            delta,
            settings.aura_spin_speed,
            settings.aura_float_speed,
            settings.aura_float_height,
        );
    }
}

/// Tiers to add and remove so the scene shows exactly `unlocked`.
pub fn tier_changes(
    present: &[ObjectTier],
    unlocked: &[ObjectTier],
) -> (Vec<ObjectTier>, Vec<ObjectTier>) {
    let added = unlocked
        .iter()
        .filter(|tier| !present.contains(tier))
        .copied()
        .collect();
    let removed = present
        .iter()
        .filter(|tier| !unlocked.contains(tier))
        .copied()
        .collect();
    (added, removed)
}

pub fn sync_tier_groups(
    mut commands: Commands,
    visuals: Res<CurrentVisuals>,
    asset_server: Res<AssetServer>,
    mut rng: ResMut<PlacementRng>,
    groups: Query<(Entity, &TierGroup)>,
) {
    let present: Vec<ObjectTier> = groups.iter().map(|(_, group)| group.tier).collect();
    let (added, removed) = tier_changes(&present, &visuals.0.unlocked_tiers);

    for (entity, group) in groups.iter() {
        if removed.contains(&group.tier) {
            debug!(target: "world", "Removing {}", group.tier.label());
            commands.entity(entity).despawn();
        }
    }

    for tier in added {
        let placement = tier.placement();
        let instances = scatter(&placement, &mut rng.0);
        let scene: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(tier.model_path()));
        info!(
            target: "world",
            "Growing {} {} (unlocked at {} xp)",
            instances.len(),
            tier.label(),
            tier.threshold()
        );

        commands
            .spawn((
                Transform::default(),
                Visibility::default(),
                TierGroup { tier },
                DespawnOnExit(AppScreen::World),
            ))
            .with_children(|group| {
                for instance in instances {
                    let entrance = EntranceAnimation::new(placement.delay);
                    let mut transform = instance.transform();
                    entrance.apply(instance.position, instance.scale, &mut transform);
                    group.spawn((
                        SceneRoot(scene.clone()),
                        transform,
                        DecorInstance {
                            tier,
                            rest: instance.position,
                            rest_scale: instance.scale,
                        },
                        entrance,
                    ));
                }
            });
    }
}

pub fn animate_entrances(
    clock: Res<FrameClock>,
    mut instances: Query<(&mut EntranceAnimation, &DecorInstance, &mut Transform)>,
) {
    let delta = clock.delta_secs();
    for (mut entrance, instance, mut transform) in instances.iter_mut() {
        if entrance.is_finished() {
            continue;
        }
        entrance.advance(delta);
        entrance.apply(instance.rest, instance.rest_scale, &mut transform);
    }
}

/// Gives every mesh under a growing instance its own blended material and
/// drives its alpha from the entrance opacity.
pub fn fade_entering_instances(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    instances: Query<(Entity, &EntranceAnimation), With<DecorInstance>>,
    children: Query<&Children>,
    mut meshes: Query<(&mut MeshMaterial3d<StandardMaterial>, Option<&FadeMaterial>)>,
) {
    for (entity, entrance) in instances.iter() {
        let opacity = entrance.opacity();
        for descendant in children.iter_descendants(entity) {
            let Ok((mut handle, fade)) = meshes.get_mut(descendant) else {
                continue;
            };

            let resting_alpha_mode = match fade {
                Some(fade) => fade.resting_alpha_mode,
                None => {
                    if entrance.is_finished() {
                        continue;
                    }
                    let Some(mut copy) = materials.get(&handle.0).cloned() else {
                        continue;
                    };
                    let resting_alpha_mode = copy.alpha_mode;
                    copy.alpha_mode = AlphaMode::Blend;
                    handle.0 = materials.add(copy);
                    commands
                        .entity(descendant)
                        .insert(FadeMaterial { resting_alpha_mode });
                    resting_alpha_mode
                }
            };

            if let Some(material) = materials.get_mut(&handle.0) {
                material.base_color.set_alpha(opacity);
                if entrance.is_finished() {
                    material.alpha_mode = resting_alpha_mode;
                }
            }
            if entrance.is_finished() {
                commands.entity(descendant).remove::<FadeMaterial>();
            }
        }
    }
}

/// A model that fails to load renders nothing; the rest of the scene carries on.
pub fn drop_failed_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    instances: Query<(Entity, &SceneRoot, &DecorInstance)>,
) {
    for (entity, scene, instance) in instances.iter() {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(scene.0.id()) {
            warn!(
                target: "world",
                "Could not load {} ({}); skipping instance",
                instance.tier.model_path(),
                err
            );
            commands.entity(entity).despawn();
        }
    }
}
