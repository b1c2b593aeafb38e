use serde::{Deserialize, Serialize};

/// A point or direction on the ground plane. The vertical axis is fixed, so
/// `z` is the depth axis (a world point `(x, 0, z)`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub z: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, z: 0.0 };
    pub const FORWARD: Vector2D = Vector2D { x: 0.0, z: 1.0 };

    pub fn new(x: f64, z: f64) -> Self {
        Vector2D { x, z }
    }

    pub fn from_angle(angle: f64) -> Self {
        Vector2D::new(angle.cos(), angle.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.z * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.z + other.z)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.z - other.z)
    }

    pub fn dot(&self, other: Vector2D) -> f64 {
        self.x * other.x + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn distance(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction, or `None` when the vector is too
    /// short to have a meaningful direction.
    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(self.scale(1.0 / len))
        } else {
            None
        }
    }

    /// Clamp both axes into the square `[-half_extent, half_extent]`.
    pub fn clamp_to_arena(&self, half_extent: f64) -> Self {
        Vector2D::new(
            self.x.clamp(-half_extent, half_extent),
            self.z.clamp(-half_extent, half_extent),
        )
    }
}
