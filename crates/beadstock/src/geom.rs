use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Cartesian point for a polar coordinate around the origin.
    pub fn polar(angle: f64, distance: f64) -> Self {
        Self {
            x: angle.cos() * distance,
            y: angle.sin() * distance,
        }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the ray from `self` to `other`, in `[-PI, PI]`.
    pub fn angle_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn translated(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    /// Rotation around the origin.
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Maps any angle into `[0, TAU)`.
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Shortest signed arc from `from` to `to`, in `(-PI, PI]`.
pub fn wrap_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from + PI).rem_euclid(TAU) - PI;
    if delta == -PI { PI } else { delta }
}
