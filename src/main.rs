use std::path::Path;

use bevy::prelude::*;

mod backend;
mod core;
mod facts;
mod habits;
mod player;
mod profile;
mod progress;
mod ui;
mod world;

use crate::{
    backend::BackendPlugin, core::CorePlugin, player::PlayerPlugin, progress::ProgressPlugin,
    ui::UiPlugin, world::WorldPlugin,
};

fn main() {
    load_secrets_env();

    App::new()
        .insert_resource(ClearColor(Color::srgb_u8(15, 23, 42)))
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "HealthVerse".to_string(),
                    ..default()
                }),
                ..default()
            }),
            CorePlugin,
            BackendPlugin,
            ProgressPlugin,
            WorldPlugin,
            PlayerPlugin,
            UiPlugin, // After BackendPlugin so its messages are registered
        ))
        .run();
}

fn load_secrets_env() {
    const SECRETS_FILE: &str = "secrets.env";

    let path = Path::new(SECRETS_FILE);
    if !path.exists() {
        return;
    }

    if let Err(err) = dotenvy::from_filename(path) {
        eprintln!("Failed to load {}: {}", SECRETS_FILE, err);
    }
}
