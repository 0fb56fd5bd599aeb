//! Movement and camera-follow maths for the player.
use bevy::prelude::*;

use super::components::{InputState, MoveKey, PlayerState};

pub const SPEED: f32 = 2.5;
pub const PLAYER_Y: f32 = -1.3;

/// Raw direction from held keys; opposite keys cancel out.
pub fn movement_vector(input: &InputState) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if input.is_pressed(MoveKey::Forward) {
        direction.z -= 1.0;
    }
    if input.is_pressed(MoveKey::Back) {
        direction.z += 1.0;
    }
    if input.is_pressed(MoveKey::Left) {
        direction.x -= 1.0;
    }
    if input.is_pressed(MoveKey::Right) {
        direction.x += 1.0;
    }
    direction
}

/// Advances the player by one frame of `delta_secs`.
pub fn step(state: &mut PlayerState, input: &InputState, delta_secs: f32) {
    let direction = movement_vector(input);
    state.is_moving = direction.length_squared() > 0.0;

    if state.is_moving {
        let direction = direction.normalize();
        state.position += direction * SPEED * delta_secs;
        state.facing = direction.x.atan2(direction.z);
    }
    state.position.y = PLAYER_Y;
}

/// Camera position after one frame of smoothing towards `player + offset`.
pub fn follow_camera(camera: Vec3, player: Vec3, offset: Vec3, factor: f32) -> Vec3 {
    camera.lerp(player + offset, factor.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[MoveKey]) -> InputState {
        let mut input = InputState::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut state = PlayerState::default();
        step(&mut state, &held(&[MoveKey::Forward, MoveKey::Back]), 0.016);
        assert_eq!(state.position, PlayerState::default().position);
        assert!(!state.is_moving);
    }

    #[test]
    fn holding_right_for_a_second_moves_by_speed() {
        let mut state = PlayerState::default();
        step(&mut state, &held(&[MoveKey::Right]), 1.0);
        assert!(state
            .position
            .abs_diff_eq(Vec3::new(2.5, PLAYER_Y, 0.0), 1e-6));
        assert!(state.is_moving);
        assert!((state.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn facing_follows_held_keys_on_a_zero_length_frame() {
        let mut state = PlayerState::default();
        step(&mut state, &held(&[MoveKey::Right]), 0.0);
        assert!(state.is_moving);
        assert_eq!(state.position, PlayerState::default().position);
        assert!((state.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn diagonal_movement_is_normalised() {
        let mut state = PlayerState::default();
        step(&mut state, &held(&[MoveKey::Forward, MoveKey::Left]), 1.0);
        let travelled = Vec2::new(state.position.x, state.position.z).length();
        assert!((travelled - SPEED).abs() < 1e-5);
        assert_eq!(state.position.y, PLAYER_Y);
    }

    #[test]
    fn releasing_keys_keeps_the_last_facing() {
        let mut state = PlayerState::default();
        step(&mut state, &held(&[MoveKey::Back]), 0.1);
        let facing = state.facing;
        step(&mut state, &InputState::default(), 0.1);
        assert!(!state.is_moving);
        assert_eq!(state.facing, facing);
    }

    #[test]
    fn camera_covers_ten_percent_per_frame() {
        let camera = Vec3::new(0.0, 3.0, 6.0);
        let player = Vec3::new(10.0, PLAYER_Y, 0.0);
        let offset = Vec3::new(0.0, 3.0, 6.0);
        let next = follow_camera(camera, player, offset, 0.1);

        let target = player + offset;
        let expected = camera + (target - camera) * 0.1;
        assert!(next.abs_diff_eq(expected, 1e-5));
        assert!(next.distance(target) < camera.distance(target));
        assert!(next.distance(target) > 0.0);
    }
}
