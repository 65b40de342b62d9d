//! Rail camera
//!
//! The camera only moves along x. Timeline `camera_pan` events hand it a
//! target and a duration; it eases toward the target over that duration.
//! Pans are advisory: nothing in the timeline waits for one to finish.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{ease_in_out_cubic, lerp};

/// An in-flight eased pan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPan {
    pub from: f32,
    pub target: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl CameraPan {
    /// Seconds until the pan lands
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RailCamera {
    x: f32,
    pan: Option<CameraPan>,
}

impl RailCamera {
    pub fn new(x: f32) -> Self {
        Self { x, pan: None }
    }

    /// Current left edge of the view in world x
    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Pan still in flight, for the renderer
    pub fn pending_pan(&self) -> Option<&CameraPan> {
        self.pan.as_ref()
    }

    /// Start easing toward `target` over `duration` seconds.
    ///
    /// A new pan replaces any pan in flight and starts from the current x.
    pub fn start_pan(&mut self, target: f32, duration: f32) {
        if duration <= 0.0 {
            self.x = target;
            self.pan = None;
            return;
        }
        self.pan = Some(CameraPan {
            from: self.x,
            target,
            duration,
            elapsed: 0.0,
        });
    }

    pub fn update(&mut self, dt: f32) {
        let Some(pan) = self.pan.as_mut() else {
            return;
        };
        pan.elapsed += dt;
        if pan.elapsed >= pan.duration {
            self.x = pan.target;
            self.pan = None;
        } else {
            let t = ease_in_out_cubic(pan.elapsed / pan.duration);
            self.x = lerp(pan.from, pan.target, t);
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x + self.x, screen.y)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x - self.x, world.y)
    }
}
