//! CorePlugin wires the frame clock, screen states, and debug logging.
use bevy::{prelude::*, state::state::StateTransitionEvent};
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

use crate::core::state::AppScreen;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Per-frame tick source for the mounted scene.
///
/// Scene logic reads its delta from here instead of from `Time`, so the
/// update loop only advances between `start` (scene mount) and `stop`
/// (scene unmount).
#[derive(Resource, Debug, Default)]
pub struct FrameClock {
    running: bool,
    last_delta: Duration,
    elapsed: Duration,
    frames: u64,
}

impl FrameClock {
    /// Starts ticking and resets the accumulated time.
    pub fn start(&mut self) {
        self.running = true;
        self.last_delta = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
    }

    /// Stops ticking; subsequent deltas read as zero.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_delta = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Delta of the most recent frame in seconds (zero while stopped).
    pub fn delta_secs(&self) -> f32 {
        self.last_delta.as_secs_f32()
    }

    /// Total time the clock has run since the last `start`.
    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Records one rendered frame.
    pub fn tick(&mut self, real_delta: Duration) {
        if !self.running {
            return;
        }
        self.last_delta = real_delta;
        self.elapsed += self.last_delta;
        self.frames = self.frames.saturating_add(1);
    }
}

/// Registers the frame clock and the screen state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppScreen>()
            .init_resource::<FrameClock>()
            .add_systems(OnEnter(AppScreen::World), start_frame_clock)
            .add_systems(OnExit(AppScreen::World), stop_frame_clock)
            .add_systems(First, update_frame_clock)
            .add_systems(Update, log_screen_transitions);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_frame_ticks);
        }
    }
}

fn start_frame_clock(mut clock: ResMut<FrameClock>) {
    clock.start();
    info!("Frame clock started");
}

fn stop_frame_clock(mut clock: ResMut<FrameClock>) {
    clock.stop();
    info!("Frame clock stopped");
}

fn update_frame_clock(mut clock: ResMut<FrameClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_screen_transitions(mut transitions: MessageReader<StateTransitionEvent<AppScreen>>) {
    for transition in transitions.read() {
        debug!(
            "Screen transition: {:?} -> {:?}",
            transition.exited, transition.entered
        );
    }
}

#[cfg(feature = "core_debug")]
fn log_frame_ticks(mut timer: ResMut<DebugTickTimer>, clock: Res<FrameClock>, time: Res<Time>) {
    if timer.timer.tick(time.delta()).just_finished() {
        info!(
            target: "core_debug",
            "Scene elapsed: {:.2}s | frames: {} | dt: {:.4}s | running: {}",
            clock.elapsed().as_secs_f32(),
            clock.frames(),
            clock.delta_secs(),
            clock.is_running(),
        );
    }
}
