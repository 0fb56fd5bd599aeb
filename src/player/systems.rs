//! Systems that spawn the character and move it from keyboard input.
use bevy::{
    input::{keyboard::KeyboardInput, ButtonState},
    prelude::*,
};

use crate::core::{plugin::FrameClock, state::AppScreen};
use crate::world::{components::WorldCamera, settings::WorldSettings};

use super::{
    animator::CHARACTER_MODEL_PATH,
    components::{CharacterModel, InputState, KeyboardCapture, MoveKey, Player, PlayerState},
    controller::{follow_camera, step},
};

const MODEL_OFFSET: Vec3 = Vec3::new(0.0, 0.8, 0.0);
const MODEL_SCALE: f32 = 0.7;

pub fn spawn_player(mut commands: Commands, asset_server: Res<AssetServer>) {
    let state = PlayerState::default();
    commands
        .spawn((
            Transform::from_translation(state.position),
            Visibility::default(),
            Player,
            state,
            DespawnOnExit(AppScreen::World),
        ))
        .with_children(|root| {
            root.spawn((
                SceneRoot(
                    asset_server.load(GltfAssetLabel::Scene(0).from_asset(CHARACTER_MODEL_PATH)),
                ),
                Transform::from_translation(MODEL_OFFSET).with_scale(Vec3::splat(MODEL_SCALE)),
                CharacterModel,
            ));
        });
}

/// The only writer of `InputState`.
pub fn record_movement_keys(
    mut events: MessageReader<KeyboardInput>,
    capture: Res<KeyboardCapture>,
    mut input: ResMut<InputState>,
) {
    if capture.captured {
        events.clear();
        if !input.is_empty() {
            input.clear();
        }
        return;
    }

    for event in events.read() {
        let Some(key) = MoveKey::from_key_code(event.key_code) else {
            continue;
        };
        match event.state {
            ButtonState::Pressed => input.press(key),
            ButtonState::Released => input.release(key),
        }
    }
}

pub fn move_player(
    clock: Res<FrameClock>,
    input: Res<InputState>,
    mut players: Query<(&mut PlayerState, &mut Transform), With<Player>>,
) {
    let delta = clock.delta_secs();
    for (mut state, mut transform) in players.iter_mut() {
        step(&mut state, &input, delta);
        transform.translation = state.position;
        transform.rotation = Quat::from_rotation_y(state.facing);
    }
}

pub fn follow_player_with_camera(
    settings: Res<WorldSettings>,
    players: Query<&PlayerState, With<Player>>,
    mut cameras: Query<&mut Transform, With<WorldCamera>>,
) {
    let Ok(state) = players.single() else {
        return;
    };
    for mut camera in cameras.iter_mut() {
        camera.translation = follow_camera(
            camera.translation,
            state.position,
            settings.camera_offset,
            settings.camera_follow_factor,
        );
        camera.look_at(state.position, Vec3::Y);
    }
}

pub fn clear_input_state(mut input: ResMut<InputState>) {
    input.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::keyboard::Key;

    fn key_event(key_code: KeyCode, state: ButtonState) -> KeyboardInput {
        KeyboardInput {
            key_code,
            logical_key: Key::Character("w".into()),
            state,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        }
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<KeyboardInput>()
            .init_resource::<InputState>()
            .init_resource::<KeyboardCapture>()
            .add_systems(Update, record_movement_keys);
        app
    }

    #[test]
    fn key_events_toggle_held_keys() {
        let mut app = app();
        app.world_mut()
            .write_message(key_event(KeyCode::KeyW, ButtonState::Pressed));
        app.world_mut()
            .write_message(key_event(KeyCode::ArrowRight, ButtonState::Pressed));
        app.update();
        let input = app.world().resource::<InputState>();
        assert!(input.is_pressed(MoveKey::Forward));
        assert!(input.is_pressed(MoveKey::Right));

        app.world_mut()
            .write_message(key_event(KeyCode::KeyW, ButtonState::Released));
        app.update();
        assert!(!app.world().resource::<InputState>().is_pressed(MoveKey::Forward));
    }

    #[test]
    fn captured_keyboard_drops_movement() {
        let mut app = app();
        app.world_mut()
            .write_message(key_event(KeyCode::KeyD, ButtonState::Pressed));
        app.update();
        app.world_mut().resource_mut::<KeyboardCapture>().captured = true;
        app.world_mut()
            .write_message(key_event(KeyCode::KeyA, ButtonState::Pressed));
        app.update();
        assert!(app.world().resource::<InputState>().is_empty());
    }

    #[test]
    fn player_moves_on_the_frame_clock_only() {
        let mut app = App::new();
        app.init_resource::<FrameClock>()
            .insert_resource({
                let mut input = InputState::default();
                input.press(MoveKey::Right);
                input
            })
            .add_systems(Update, move_player);
        let player = app
            .world_mut()
            .spawn((Player, PlayerState::default(), Transform::default()))
            .id();

        app.update();
        let state = *app.world().get::<PlayerState>(player).expect("state");
        assert!(!state.is_moving || state.position.x == 0.0);

        {
            let mut clock = app.world_mut().resource_mut::<FrameClock>();
            clock.start();
            clock.tick(std::time::Duration::from_millis(200));
        }
        app.update();
        let state = *app.world().get::<PlayerState>(player).expect("state");
        assert!((state.position.x - 0.5).abs() < 1e-5);
        let transform = app.world().get::<Transform>(player).expect("transform");
        assert_eq!(transform.translation, state.position);
    }
}
