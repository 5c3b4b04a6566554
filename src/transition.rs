//! Timed mode transitions
//!
//! A transition carries the requested target until its midpoint, then hands it
//! back exactly once so the caller can swap modes under a fully opaque overlay.
//! Requests made while one is running are dropped.

use serde::{Deserialize, Serialize};

use crate::consts::TRANSITION_TICKS;

/// Presentation of a transition (the core only tracks progress)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionStyle {
    #[default]
    Fade,
    SlideLeft,
    SlideRight,
    Zoom,
    Dissolve,
}

#[derive(Debug, Clone)]
pub struct TransitionManager<T> {
    duration: u32,
    frame: u32,
    style: TransitionStyle,
    active: bool,
    /// Held until the midpoint swap
    target: Option<T>,
}

impl<T> Default for TransitionManager<T> {
    fn default() -> Self {
        Self::new(TRANSITION_TICKS)
    }
}

impl<T> TransitionManager<T> {
    /// Create a manager whose transitions last `duration` ticks (at least 2)
    pub fn new(duration: u32) -> Self {
        Self {
            duration: duration.max(2),
            frame: 0,
            style: TransitionStyle::default(),
            active: false,
            target: None,
        }
    }

    /// Start a transition toward `target`
    ///
    /// Returns false (and drops the request) if a transition is already running.
    pub fn request(&mut self, target: T, style: TransitionStyle) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.frame = 0;
        self.style = style;
        self.target = Some(target);
        true
    }

    /// Advance one tick; yields the target on the midpoint tick
    pub fn update(&mut self) -> Option<T> {
        if !self.active {
            return None;
        }
        self.frame += 1;

        let swap = if self.frame >= self.duration / 2 {
            self.target.take()
        } else {
            None
        };
        if self.frame >= self.duration {
            self.active = false;
            self.frame = 0;
        }
        swap
    }

    pub fn is_transitioning(&self) -> bool {
        self.active
    }

    pub fn style(&self) -> TransitionStyle {
        self.style
    }

    /// Progress through the current transition in [0, 1]
    pub fn progress(&self) -> f32 {
        if !self.active {
            return 0.0;
        }
        self.frame as f32 / self.duration as f32
    }

    /// Overlay opacity: rises to 1 at the midpoint, then falls back to 0
    pub fn overlay_alpha(&self) -> f32 {
        let p = self.progress();
        if p < 0.5 { p * 2.0 } else { (1.0 - p) * 2.0 }
    }
}
