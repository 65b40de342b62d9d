//! Axis-aligned hitboxes for shot resolution
//!
//! Everything on the rail is a box: actor bodies, enemy heads, hostage ropes
//! and boss weak spots. Shots are points (optionally inflated by a spread
//! radius), so the only queries needed are point containment and
//! point-to-box distance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of `size` standing on `anchor` (anchor is the bottom-center point)
    pub fn from_midbottom(anchor: Vec2, size: Vec2) -> Self {
        let min = Vec2::new(anchor.x - size.x / 2.0, anchor.y - size.y);
        Self::new(min, min + size)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Point containment (min edge inclusive, max edge exclusive)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Distance from `p` to the nearest point of the box (0 inside)
    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        clamped.distance(p)
    }

    /// Whether a circle of `radius` around `p` touches the box
    pub fn within_radius(&self, p: Vec2, radius: f32) -> bool {
        self.contains_point(p) || self.distance_to_point(p) <= radius
    }

    /// Sub-box at `offset` from this box's top-left corner
    pub fn sub_rect(&self, offset: Vec2, size: Vec2) -> Hitbox {
        let min = self.min + offset;
        Hitbox::new(min, min + size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midbottom_anchor() {
        let hb = Hitbox::from_midbottom(Vec2::new(900.0, 620.0), Vec2::new(64.0, 64.0));
        assert_eq!(hb.min, Vec2::new(868.0, 556.0));
        assert_eq!(hb.max, Vec2::new(932.0, 620.0));
        assert_eq!(hb.center(), Vec2::new(900.0, 588.0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let hb = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(hb.contains_point(Vec2::ZERO));
        assert!(hb.contains_point(Vec2::new(9.99, 5.0)));
        assert!(!hb.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_within_radius() {
        let hb = Hitbox::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(hb.within_radius(Vec2::new(13.0, 5.0), 3.0));
        assert!(!hb.within_radius(Vec2::new(13.5, 5.0), 3.0));
        assert_eq!(hb.distance_to_point(Vec2::new(5.0, 5.0)), 0.0);
    }

    #[test]
    fn test_sub_rect() {
        let body = Hitbox::new(Vec2::new(100.0, 100.0), Vec2::new(300.0, 300.0));
        let weak = body.sub_rect(Vec2::new(60.0, 40.0), Vec2::splat(40.0));
        assert_eq!(weak.min, Vec2::new(160.0, 140.0));
        assert_eq!(weak.max, Vec2::new(200.0, 180.0));
        assert!(body.contains_point(weak.center()));
    }
}
