//! Components and resources for the player character.
use std::collections::HashSet;

use bevy::prelude::*;

/// Root entity of the walkable character.
#[derive(Component, Debug)]
pub struct Player;

/// The glTF scene under the player root.
#[derive(Component, Debug)]
pub struct CharacterModel;

/// Controller-owned pose, rebuilt every time the world mounts.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Yaw in radians, `atan2(x, z)` of the last movement.
    pub facing: f32,
    pub is_moving: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, super::controller::PLAYER_Y, 0.0),
            facing: 0.0,
            is_moving: false,
        }
    }
}

/// Movement intent of a held key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

impl MoveKey {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Self::Back),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::Right),
            _ => None,
        }
    }
}

/// Held movement keys.
///
/// Written only by the keyboard handler, read once per frame by the
/// controller, cleared when the world unmounts.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    pressed: HashSet<MoveKey>,
}

impl InputState {
    pub fn press(&mut self, key: MoveKey) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: MoveKey) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

/// Set while a text panel owns the keyboard; movement keys are ignored.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardCapture {
    pub captured: bool,
}
