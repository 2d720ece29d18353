use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::FixedNum;

/// 2D vector over [`FixedNum`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };

    pub fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub fn from_f32(x: f32, y: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
        }
    }

    /// Unit vector at `radians`, computed in f64 and quantized once.
    pub fn from_angle(radians: f64) -> Self {
        Self {
            x: FixedNum::from_num(radians.cos()),
            y: FixedNum::from_num(radians.sin()),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_num(), self.y.to_num())
    }

    pub fn is_zero(self) -> bool {
        self.x == FixedNum::ZERO && self.y == FixedNum::ZERO
    }

    /// Euclidean length.
    ///
    /// Computed on the vector scaled by its largest component, so short
    /// vectors keep their precision and long ones do not overflow.
    pub fn length(self) -> FixedNum {
        match self.scaled() {
            Some((scale, unitish)) => scale * unitish.length_squared().sqrt(),
            None => FixedNum::ZERO,
        }
    }

    /// `(max(|x|, |y|), self / max(|x|, |y|))`, or `None` for the zero vector.
    fn scaled(self) -> Option<(FixedNum, Self)> {
        let scale = self.x.abs().max(self.y.abs());
        if scale == FixedNum::ZERO {
            return None;
        }
        Some((scale, self / scale))
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (other - self).length()
    }

    pub fn distance_squared(self, other: Self) -> FixedNum {
        (other - self).length_squared()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalize(self) -> Self {
        let Some((_, unitish)) = self.scaled() else {
            return Self::ZERO;
        };
        // One component is exactly ±1, so the length lies in [1, √2].
        unitish / unitish.length_squared().sqrt()
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Self) -> FixedNum {
        self.x * other.y - self.y * other.x
    }

    /// Left-hand normal `(-y, x)`.
    pub fn perp(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    /// Scale down to `max_length` if longer; shorter vectors pass through.
    pub fn clamp_length(self, max_length: FixedNum) -> Self {
        let len_sq = self.length_squared();
        if len_sq <= max_length * max_length {
            return self;
        }
        self.normalize() * max_length
    }

    /// Step from `self` toward `target` by at most `max_delta`.
    pub fn move_towards(self, target: Self, max_delta: FixedNum) -> Self {
        let offset = target - self;
        let dist = offset.length();
        if dist <= max_delta || dist == FixedNum::ZERO {
            target
        } else {
            self + offset / dist * max_delta
        }
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for FixedVec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}
