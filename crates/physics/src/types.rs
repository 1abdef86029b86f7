//! Plain data types shared by the simulation, builder and integrator.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// 2D vector in world units.
///
/// The engine follows screen conventions: `+y` points down, so a positive
/// gravity `y` component pulls bodies "down".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of `self` and `other`.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Rotates counter-clockwise (in a y-up frame) by `angle` radians.
    #[must_use]
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Component-wise product.
    #[must_use]
    pub fn scale(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Index of a body inside a [`crate::PhysicsSim`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

/// Point-mass rigid body.
#[derive(Copy, Clone, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angular_vel: f64,
    /// `f64::INFINITY` makes the body kinematic: it keeps its velocity and
    /// ignores gravity, forces and constraint corrections.
    pub mass: f64,
    /// Non-rotating body; angular velocity is pinned to zero.
    pub infinite_moment: bool,
    /// Force accumulated for the next step, cleared afterwards.
    pub force: Vec2,
}

impl Body {
    #[must_use]
    pub fn new(pos: Vec2, mass: f64) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            mass,
            infinite_moment: false,
            force: Vec2::ZERO,
        }
    }

    #[must_use]
    pub fn inv_mass(&self) -> f64 {
        if self.mass.is_finite() && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }
}

/// Distance constraint keeping two bodies `length` apart.
#[derive(Copy, Clone, Debug)]
pub struct PinJoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub length: f64,
}

/// Keeps a body on the horizontal line `y`, free to slide along x.
#[derive(Copy, Clone, Debug)]
pub struct GrooveJoint {
    pub body: BodyHandle,
    pub y: f64,
}

/// Global world parameters.
#[derive(Copy, Clone, Debug)]
pub struct PhysParams {
    pub gravity: Vec2,
    /// Fraction of velocity kept after one second (`1.0` disables damping).
    pub damping: f64,
    /// Integration substeps per call to `step`.
    pub substeps: usize,
    /// Constraint projection passes per substep.
    pub iterations: usize,
}

impl Default for PhysParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 981.0),
            damping: 1.0,
            substeps: 4,
            iterations: 8,
        }
    }
}
