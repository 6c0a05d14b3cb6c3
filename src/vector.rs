use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("expected {expected} components, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("vector has zero magnitude")]
    DegenerateVector,
    #[error("operation needs at least one vector")]
    EmptyInput,
}

/// Fixed-arity numeric vector. The arity is part of the type, so component-wise
/// operators can only combine vectors of equal length.
#[derive(Clone, Copy, PartialEq)]
pub struct Vector<const N: usize> {
    values: [f64; N],
}

pub type Vec2 = Vector<2>;

impl<const N: usize> Vector<N> {
    pub const ZERO: Self = Self { values: [0.0; N] };

    pub fn from_slice(values: &[f64]) -> Result<Self, VectorError> {
        let values = <[f64; N]>::try_from(values).map_err(|_| VectorError::DimensionMismatch {
            expected: N,
            found: values.len(),
        })?;
        Ok(Self { values })
    }

    pub const fn to_array(self) -> [f64; N] {
        self.values
    }

    pub fn dot(self, other: Self) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn unit(self) -> Result<Self, VectorError> {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Err(VectorError::DegenerateVector);
        }
        Ok(self / magnitude)
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    pub fn is_finite(self) -> bool {
        self.values.iter().all(|value| value.is_finite())
    }

    pub fn sum(vectors: &[Self]) -> Result<Self, VectorError> {
        let (first, rest) = vectors.split_first().ok_or(VectorError::EmptyInput)?;
        Ok(rest.iter().fold(*first, |acc, vector| acc + *vector))
    }

    pub fn average(vectors: &[Self]) -> Result<Self, VectorError> {
        Ok(Self::sum(vectors)? / vectors.len() as f64)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.map(f),
        }
    }

    fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut values = self.values;
        for (value, other) in values.iter_mut().zip(other.values) {
            *value = f(*value, other);
        }
        Self { values }
    }
}

impl Vector<2> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { values: [x, y] }
    }

    pub const fn x(self) -> f64 {
        self.values[0]
    }

    pub const fn y(self) -> f64 {
        self.values[1]
    }

    /// Counter-clockwise rotation by `angle` radians about `pivot`.
    pub fn rotated(self, angle: f64, pivot: Self) -> Self {
        let (sin, cos) = angle.sin_cos();
        let offset = self - pivot;
        Self::new(
            offset.x() * cos - offset.y() * sin,
            offset.x() * sin + offset.y() * cos,
        ) + pivot
    }

    /// Vector from this point to the line `y = slope * x + intercept`, measured
    /// along the line's normal.
    pub fn project_onto_line(self, slope: f64, intercept: f64) -> Self {
        let point = Self::new(self.x(), self.y() - intercept);
        let direction = Self::new(1.0, slope);

        direction * (point.dot(direction) / direction.dot(direction)) - point
    }
}

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> fmt::Debug for Vector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ">")
    }
}

impl<const N: usize> Add for Vector<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<const N: usize> AddAssign for Vector<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> Sub for Vector<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<const N: usize> SubAssign for Vector<N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const N: usize> Neg for Vector<N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|value| -value)
    }
}

impl<const N: usize> Mul<f64> for Vector<N> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.map(|value| value * rhs)
    }
}

impl<const N: usize> Div<f64> for Vector<N> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.map(|value| value / rhs)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(a.distance(b) < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn arithmetic_is_component_wise() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -4.0);

        assert_eq!(a + b, Vec2::new(4.0, -2.0));
        assert_eq!(a - b, Vec2::new(-2.0, 6.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert_eq!(b * 0.5, Vec2::new(1.5, -2.0));
        assert_eq!(a.dot(b), -5.0);
        assert_eq!(b.magnitude(), 5.0);
    }

    #[test]
    fn unit_of_zero_vector_is_degenerate() {
        assert_eq!(Vec2::ZERO.unit(), Err(VectorError::DegenerateVector));
        assert_close(Vec2::new(0.0, 3.0).unit().unwrap(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn from_slice_checks_arity() {
        assert_eq!(
            Vec2::from_slice(&[1.0, 2.0, 3.0]),
            Err(VectorError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            Vector::<3>::from_slice(&[1.0, 2.0, 3.0]).unwrap().to_array(),
            [1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn rotation_is_counter_clockwise_about_pivot() {
        let rotated = Vec2::new(2.0, 1.0).rotated(FRAC_PI_2, Vec2::new(1.0, 1.0));
        assert_close(rotated, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn average_of_nothing_fails() {
        assert_eq!(Vec2::average(&[]), Err(VectorError::EmptyInput));
        assert_eq!(
            Vec2::average(&[Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0)]).unwrap(),
            Vec2::new(1.0, 2.0)
        );
    }

    #[test]
    fn projection_reaches_the_line() {
        let point = Vec2::new(0.0, 2.0);
        let offset = point.project_onto_line(1.0, 0.0);
        let foot = point + offset;

        assert_close(foot, Vec2::new(1.0, 1.0));
    }
}
