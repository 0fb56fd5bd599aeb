// src/ui/popups/components.rs
//
// Components and resources for fact popups and alerts.

use std::collections::VecDeque;

use bevy::prelude::*;

/// How long a fact popup stays on screen.
pub const FACT_POPUP_SECS: f32 = 4.0;

/// Seconds of fade at the end of a popup's life.
const FACT_FADE_SECS: f32 = 0.5;

/// Fact card shown after a habit is logged.
#[derive(Component, Debug)]
pub struct FactPopup {
    lifetime: Timer,
}

impl FactPopup {
    pub fn new(lifetime_secs: f32) -> Self {
        Self {
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
        }
    }

    pub fn tick(&mut self, delta: std::time::Duration) {
        self.lifetime.tick(delta);
    }

    pub fn is_finished(&self) -> bool {
        self.lifetime.is_finished()
    }

    pub fn fade_alpha(&self) -> f32 {
        let remaining = self.lifetime.remaining_secs();
        if remaining < FACT_FADE_SECS {
            remaining / FACT_FADE_SECS
        } else {
            1.0
        }
    }
}

/// Only one fact popup is visible at a time.
#[derive(Resource, Debug, Default)]
pub struct FactPopupTracker {
    pub active: Option<Entity>,
}

/// Failed writes waiting to be acknowledged, oldest first.
#[derive(Resource, Debug, Default)]
pub struct AlertQueue {
    pending: VecDeque<String>,
}

impl AlertQueue {
    pub fn push(&mut self, message: impl Into<String>) {
        self.pending.push_back(message.into());
    }

    pub fn current(&self) -> Option<&str> {
        self.pending.front().map(String::as_str)
    }

    pub fn is_showing(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops the visible alert, revealing the next one.
    pub fn dismiss(&mut self) -> Option<String> {
        self.pending.pop_front()
    }
}

/// Full-screen overlay that blocks input while an alert is pending.
#[derive(Component, Debug)]
pub struct AlertOverlay;

#[derive(Component, Debug)]
pub struct AlertText;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn alerts_are_dismissed_in_order() {
        let mut alerts = AlertQueue::default();
        assert!(!alerts.is_showing());
        alerts.push("first");
        alerts.push("second");
        assert_eq!(alerts.current(), Some("first"));
        assert_eq!(alerts.dismiss().as_deref(), Some("first"));
        assert_eq!(alerts.current(), Some("second"));
        alerts.dismiss();
        assert!(!alerts.is_showing());
        assert_eq!(alerts.dismiss(), None);
    }

    #[test]
    fn popup_fades_out_at_the_end() {
        let mut popup = FactPopup::new(FACT_POPUP_SECS);
        popup.tick(Duration::from_secs(3));
        assert_eq!(popup.fade_alpha(), 1.0);
        popup.tick(Duration::from_millis(750));
        assert!((popup.fade_alpha() - 0.5).abs() < 1e-3);
        assert!(!popup.is_finished());
        popup.tick(Duration::from_millis(250));
        assert!(popup.is_finished());
    }
}
