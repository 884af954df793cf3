//! Collision shapes
//!
//! Bodies collide through whatever shapes the host hands us via
//! [`ShapeProvider`]. Overlap tests are exact for every pair of the three
//! supported shapes; oriented boxes use the separating axis theorem.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Projectile, Ship};
use crate::config::Tuning;
use crate::heading;

/// A collision shape in playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned rectangle
    Rect { min: Vec2, max: Vec2 },
    /// Rectangle rotated by `angle` (same convention as ship headings)
    Oriented { center: Vec2, half_extents: Vec2, angle: f32 },
}

/// Box in center/half-extent/axes form for SAT
#[derive(Debug, Clone, Copy)]
struct Obb {
    center: Vec2,
    half: Vec2,
    /// Local x axis (heading direction)
    u: Vec2,
    /// Local y axis
    v: Vec2,
}

impl Obb {
    fn new(center: Vec2, half: Vec2, angle: f32) -> Self {
        let u = heading(angle);
        Self {
            center,
            half,
            u,
            v: Vec2::new(-u.y, u.x),
        }
    }

    /// Half-width of the box projected onto `axis`
    fn projected_radius(&self, axis: Vec2) -> f32 {
        self.half.x * self.u.dot(axis).abs() + self.half.y * self.v.dot(axis).abs()
    }

    fn to_local(&self, p: Vec2) -> Vec2 {
        let d = p - self.center;
        Vec2::new(d.dot(self.u), d.dot(self.v))
    }
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Shape::Rect {
            min: min.min(max),
            max: min.max(max),
        }
    }

    fn as_obb(&self) -> Option<Obb> {
        match *self {
            Shape::Circle { .. } => None,
            Shape::Rect { min, max } => Some(Obb::new((min + max) * 0.5, (max - min) * 0.5, 0.0)),
            Shape::Oriented {
                center,
                half_extents,
                angle,
            } => Some(Obb::new(center, half_extents.abs(), angle)),
        }
    }

    /// Whether two shapes overlap; touching counts as overlapping
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (
                Shape::Circle { center: a, radius: ra },
                Shape::Circle { center: b, radius: rb },
            ) => a.distance_squared(b) <= (ra + rb) * (ra + rb),
            (Shape::Circle { center, radius }, _) => match other.as_obb() {
                Some(obb) => circle_obb(center, radius, &obb),
                None => false,
            },
            (_, Shape::Circle { center, radius }) => match self.as_obb() {
                Some(obb) => circle_obb(center, radius, &obb),
                None => false,
            },
            _ => match (self.as_obb(), other.as_obb()) {
                (Some(a), Some(b)) => obb_obb(&a, &b),
                _ => false,
            },
        }
    }
}

fn circle_obb(center: Vec2, radius: f32, obb: &Obb) -> bool {
    let local = obb.to_local(center);
    let closest = local.clamp(-obb.half, obb.half);
    local.distance_squared(closest) <= radius * radius
}

fn obb_obb(a: &Obb, b: &Obb) -> bool {
    let d = b.center - a.center;
    [a.u, a.v, b.u, b.v]
        .into_iter()
        .all(|axis| d.dot(axis).abs() <= a.projected_radius(axis) + b.projected_radius(axis))
}

/// Source of collision shapes for live bodies
pub trait ShapeProvider {
    fn ship_shape(&self, ship: &Ship) -> Shape;
    fn projectile_shape(&self, projectile: &Projectile) -> Shape;
}

/// Shapes matching the default sprites: a box hull for ships (grown by the
/// shield while invulnerable) and a round bullet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteShapes {
    /// Ship hull half length (along the heading) and half height
    pub ship_half: Vec2,
    pub shield_scale: f32,
    pub bullet_radius: f32,
}

impl SpriteShapes {
    pub fn new(tuning: &Tuning, height: f32) -> Self {
        let ship_h = tuning.ship_size_r * height;
        Self {
            ship_half: Vec2::new(tuning.ship_aspect * ship_h, ship_h) * 0.5,
            shield_scale: tuning.shield_img_r,
            bullet_radius: tuning.bullet_size_r * height * 0.5,
        }
    }

    /// Full hull length, used to place the engine flame behind the ship
    pub fn ship_length(&self) -> f32 {
        self.ship_half.x * 2.0
    }
}

impl ShapeProvider for SpriteShapes {
    fn ship_shape(&self, ship: &Ship) -> Shape {
        let half = if ship.collide {
            self.ship_half
        } else {
            self.ship_half * self.shield_scale
        };
        Shape::Oriented {
            center: ship.pos,
            half_extents: half,
            angle: ship.angle,
        }
    }

    fn projectile_shape(&self, projectile: &Projectile) -> Shape {
        Shape::circle(projectile.pos, self.bullet_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_circles() {
        let a = Shape::circle(Vec2::ZERO, 5.0);
        assert!(a.overlaps(&Shape::circle(Vec2::new(9.0, 0.0), 5.0)));
        assert!(!a.overlaps(&Shape::circle(Vec2::new(11.0, 0.0), 5.0)));
    }

    #[test]
    fn test_circle_rect_corner() {
        let rect = Shape::rect(Vec2::ZERO, Vec2::splat(10.0));
        // Near the corner diagonally: inside the AABB of the circle but not touching
        assert!(!rect.overlaps(&Shape::circle(Vec2::new(13.0, 13.0), 4.0)));
        assert!(rect.overlaps(&Shape::circle(Vec2::new(12.0, 12.0), 3.0)));
        assert!(Shape::circle(Vec2::new(5.0, -2.0), 3.0).overlaps(&rect));
    }

    #[test]
    fn test_rotated_box_misses_where_aabb_would_hit() {
        // A diamond (square rotated 45 degrees) against a box near its corner gap
        let diamond = Shape::Oriented {
            center: Vec2::ZERO,
            half_extents: Vec2::splat(10.0),
            angle: FRAC_PI_4,
        };
        let corner = Shape::rect(Vec2::new(9.0, 9.0), Vec2::new(12.0, 12.0));
        assert!(!diamond.overlaps(&corner));
        let tip = Shape::rect(Vec2::new(13.0, -1.0), Vec2::new(16.0, 1.0));
        assert!(diamond.overlaps(&tip));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let shapes = [
            Shape::circle(Vec2::new(3.0, 4.0), 2.0),
            Shape::rect(Vec2::ZERO, Vec2::new(4.0, 4.0)),
            Shape::Oriented {
                center: Vec2::new(5.0, 1.0),
                half_extents: Vec2::new(3.0, 1.0),
                angle: 0.3,
            },
        ];
        for a in &shapes {
            for b in &shapes {
                assert_eq!(a.overlaps(b), b.overlaps(a));
            }
        }
    }

    #[test]
    fn test_shield_grows_ship_hull() {
        let tuning = Tuning::default();
        let shapes = SpriteShapes::new(&tuning, 1000.0);
        let mut ship = Ship::new(0);
        ship.pos = Vec2::new(100.0, 100.0);
        let bullet = Shape::circle(Vec2::new(100.0 + 45.0, 100.0), 1.0);

        ship.collide = true;
        assert!(!shapes.ship_shape(&ship).overlaps(&bullet));
        ship.collide = false;
        assert!(shapes.ship_shape(&ship).overlaps(&bullet));
    }
}
