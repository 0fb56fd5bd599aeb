//! Spring-driven grow-in for decorative instances.
use bevy::prelude::*;

const STEP_SECS: f32 = 0.001;
const PRECISION: f32 = 0.001;
const START_OFFSET_Y: f32 = -1.5;

/// Damped spring constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub tension: f32,
    pub friction: f32,
    pub mass: f32,
}

pub const ENTRANCE_SPRING: Spring = Spring {
    tension: 80.0,
    friction: 15.0,
    mass: 1.0,
};

/// Per-instance entrance progress, started after a delay and run once.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct EntranceAnimation {
    spring: Spring,
    delay_remaining: f32,
    value: f32,
    velocity: f32,
    finished: bool,
}

impl EntranceAnimation {
    pub fn new(delay_secs: f32) -> Self {
        Self::with_spring(ENTRANCE_SPRING, delay_secs)
    }

    pub fn with_spring(spring: Spring, delay_secs: f32) -> Self {
        Self {
            spring,
            delay_remaining: delay_secs.max(0.0),
            value: 0.0,
            velocity: 0.0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Raw spring value; may overshoot 1 slightly.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn progress(&self) -> f32 {
        self.value
    }

    pub fn scale(&self) -> f32 {
        self.value.max(0.0)
    }

    pub fn opacity(&self) -> f32 {
        self.value.clamp(0.0, 1.0)
    }

    /// Vertical offset from the resting height, −1.5 at the start and 0 at rest.
    pub fn offset_y(&self) -> f32 {
        START_OFFSET_Y * (1.0 - self.value)
    }

    /// Advances by `delta_secs` of scene time.
    pub fn advance(&mut self, delta_secs: f32) {
        if self.finished || !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }

        let mut remaining = delta_secs;
        if self.delay_remaining > 0.0 {
            let waited = remaining.min(self.delay_remaining);
            self.delay_remaining -= waited;
            remaining -= waited;
        }

        while remaining > 0.0 && !self.finished {
            let step = remaining.min(STEP_SECS);
            let displacement = self.value - 1.0;
            let force = -self.spring.tension * displacement - self.spring.friction * self.velocity;
            self.velocity += force / self.spring.mass * step;
            self.value += self.velocity * step;
            remaining -= step;

            if (self.value - 1.0).abs() < PRECISION && self.velocity.abs() < PRECISION {
                self.value = 1.0;
                self.velocity = 0.0;
                self.finished = true;
            }
        }
    }

    /// Transform for an instance resting at `rest` with full scale `rest_scale`.
    pub fn apply(&self, rest: Vec3, rest_scale: f32, transform: &mut Transform) {
        transform.translation = rest + Vec3::Y * self.offset_y();
        transform.scale = Vec3::splat(rest_scale * self.scale());
    }
}
