// src/ui/focus.rs
//
// Which panel owns the keyboard, and helpers for reading typed text.

use bevy::{
    input::{
        keyboard::{Key, KeyboardInput},
        ButtonState,
    },
    prelude::*,
};

use crate::player::components::KeyboardCapture;

use super::popups::components::AlertQueue;

/// Panel currently receiving keyboard input.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UiFocus {
    #[default]
    World,
    HabitPanel,
    AccountPanel,
    FactsPanel,
}

impl UiFocus {
    pub fn is_world(self) -> bool {
        self == Self::World
    }
}

/// Printable text produced by a key press, if any.
pub fn typed_text(event: &KeyboardInput) -> Option<&str> {
    if event.state != ButtonState::Pressed {
        return None;
    }
    match &event.logical_key {
        Key::Character(text) => Some(text.as_str()),
        Key::Space => Some(" "),
        _ => None,
    }
}

/// Fresh press of `code`, ignoring key repeat.
pub fn just_pressed(event: &KeyboardInput, code: KeyCode) -> bool {
    event.state == ButtonState::Pressed && !event.repeat && event.key_code == code
}

/// Movement is blocked while any panel or alert owns the keyboard.
pub fn sync_keyboard_capture(
    focus: Res<UiFocus>,
    alerts: Res<AlertQueue>,
    mut capture: ResMut<KeyboardCapture>,
) {
    capture.set_if_neq(KeyboardCapture {
        captured: !focus.is_world() || alerts.is_showing(),
    });
}

pub fn reset_focus(mut focus: ResMut<UiFocus>) {
    *focus = UiFocus::World;
}
