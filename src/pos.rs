use serde::Deserialize;
use std::ops::{Add, Mul, Sub};

/// Offset in screen units, y pointing up like nannou's coordinate system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Pos { x, y }
    }

    pub fn distance(&self, other: &Pos) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Distance from the origin.
    pub fn length(&self) -> f32 {
        self.distance(&Pos::ORIGIN)
    }

    /// Clamps each axis independently to `[-limit, limit]`.
    pub fn clamp_axes(self, limit: f32) -> Self {
        Pos::new(self.x.clamp(-limit, limit), self.y.clamp(-limit, limit))
    }
}

impl Add for Pos {
    type Output = Pos;
    fn add(self, other: Self) -> Self::Output {
        Pos::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Pos {
    type Output = Pos;
    fn sub(self, other: Self) -> Self::Output {
        Pos::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Pos {
    type Output = Pos;
    fn mul(self, other: f32) -> Self::Output {
        Pos::new(self.x * other, self.y * other)
    }
}
